// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit-test precedence, bounds caching, and the frame pipeline.

use kurbo::{Point, Rect};
use strata_core::geom::Area;
use strata_core::layer::{Layer, LayerStack, Painter};
use strata_core::node::{HitOptions, NodeContent, Scene};
use strata_core::paint::Color;
use strata_core::property::Property;

#[test]
fn clip_area_beats_touch_area() {
    let mut scene = Scene::new();
    let node = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 100.0, 50.0)));
    scene.set_fill(node, Color::BLACK);
    scene.set_touch_area(node, Some(Area::rect(0.0, 0.0, 100.0, 50.0).dilated(50.0)));
    scene.set_clip_area(node, Some(Area::rect(0.0, 0.0, 50.0, 50.0)));

    assert!(
        scene
            .trail_under_point(node, Point::new(90.0, 10.0), HitOptions::TOUCH)
            .is_none()
    );
    let hit = scene
        .trail_under_point(node, Point::new(10.0, 10.0), HitOptions::TOUCH)
        .unwrap();
    assert_eq!(hit.last_node(), Some(node));
}

#[test]
fn paint_changes_keep_bounds_and_scale_changes_do_not() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let group = scene.create_node();
    let leaf = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 10.0, 10.0)));
    scene.set_fill(leaf, Color::BLACK);
    scene.add_child(root, group);
    scene.add_child(group, leaf);

    let before = scene.bounds(root).unwrap();
    assert_eq!(before, Rect::new(0.0, 0.0, 10.0, 10.0));

    scene.set_fill(leaf, Color::WHITE);
    assert!(scene.has_valid_bounds(root));
    assert_eq!(scene.bounds(root), Some(before));

    scene.scale(leaf, 2.0);
    assert!(!scene.has_valid_bounds(root));
    assert_eq!(scene.bounds(root), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
}

#[derive(Default)]
struct LayerLog {
    painted: Vec<usize>,
}

impl Painter for LayerLog {
    fn paint_layer(&mut self, _scene: &Scene, layer: &Layer) {
        self.painted.push(layer.nodes.len());
    }
}

#[test]
fn property_drives_repaint_of_one_layer() {
    let mut scene = Scene::new();
    let root = scene.create_node();
    let background = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 100.0, 100.0)));
    scene.set_fill(background, Color::WHITE);
    let label = scene.create_with_content(NodeContent::Dom {
        width: 40.0,
        height: 10.0,
    });
    scene.set_fill(label, Color::BLACK);
    scene.add_child(root, background);
    scene.add_child(root, label);

    let mut stack = LayerStack::new(root);
    let mut painter = LayerLog::default();
    let changes = scene.evaluate();
    stack.update(&scene, &changes);
    assert_eq!(stack.layers().len(), 2);
    assert_eq!(stack.repaint(&scene, &mut painter), 2);

    // A model property moves the label; only the DOM layer repaints.
    let position = Property::new(0.0_f64);
    let pending = std::rc::Rc::new(std::cell::Cell::new(None));
    let target = pending.clone();
    position.lazy_link(move |x: &f64, _| target.set(Some(*x)));
    position.set(25.0);
    if let Some(x) = pending.take() {
        scene.set_x(label, x);
    }

    let changes = scene.evaluate();
    let update = stack.update(&scene, &changes);
    assert!(!update.rebuilt);
    assert_eq!(update.dirty, [1]);
    painter.painted.clear();
    assert_eq!(stack.repaint(&scene, &mut painter), 1);
}
