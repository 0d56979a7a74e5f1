// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Textual scene-graph dumps.

use std::fmt::Write;

use strata_core::node::{NodeContent, NodeId, Scene};

/// Renders the subtree under `root` as indented text, one node per line.
///
/// Each line names the node's content and any state that differs from a
/// fresh node:
///
/// ```text
/// group #0
///   shape #1 at (10, 0) opacity=0.5
///   text #2 "Hello" hidden
/// ```
#[must_use]
pub fn dump(scene: &Scene, root: NodeId) -> String {
    let mut out = String::new();
    dump_node(scene, root, 0, &mut out);
    out
}

fn dump_node(scene: &Scene, id: NodeId, depth: usize, out: &mut String) {
    let _ = write!(out, "{:indent$}", "", indent = depth * 2);
    let _ = match scene.content(id) {
        NodeContent::Group => write!(out, "group #{}", id.index()),
        NodeContent::Shape(_) => write!(out, "shape #{}", id.index()),
        NodeContent::Text { text, .. } => write!(out, "text #{} {text:?}", id.index()),
        NodeContent::Image { width, height } => {
            write!(out, "image #{} {width}x{height}", id.index())
        }
        NodeContent::Dom { width, height } => write!(out, "dom #{} {width}x{height}", id.index()),
        NodeContent::Canvas { bounds, .. } => write!(
            out,
            "canvas #{} {}x{}",
            id.index(),
            bounds.width(),
            bounds.height()
        ),
    };

    let translation = scene.translation(id);
    if translation.x != 0.0 || translation.y != 0.0 {
        let _ = write!(out, " at ({}, {})", translation.x, translation.y);
    }
    let opacity = scene.opacity(id);
    if opacity != 1.0 {
        let _ = write!(out, " opacity={opacity}");
    }
    if !scene.is_visible(id) {
        out.push_str(" hidden");
    }
    if let Some(renderer) = scene.renderer(id) {
        let _ = write!(out, " renderer={renderer}");
    }
    if scene.layer_split(id) {
        out.push_str(" split");
    }
    if scene.pickable(id) == Some(false) {
        out.push_str(" unpickable");
    }
    if scene.clip_area(id).is_some() {
        out.push_str(" clipped");
    }
    out.push('\n');

    for child in scene.children(id) {
        dump_node(scene, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::geom::Area;
    use strata_core::renderer::Renderer;

    #[test]
    fn dump_lists_children_with_state() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let shape = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 5.0, 5.0)));
        scene.set_x(shape, 10.0);
        scene.set_opacity(shape, 0.5);
        let label = scene.create_with_content(NodeContent::Text {
            text: "Hello".into(),
            font_size: 12.0,
        });
        scene.set_visible(label, false);
        scene.set_renderer(label, Some(Renderer::Svg));
        scene.add_child(root, shape);
        scene.add_child(root, label);

        assert_eq!(
            dump(&scene, root),
            "group #0\n  shape #1 at (10, 0) opacity=0.5\n  text #2 \"Hello\" hidden renderer=svg\n"
        );
    }
}
