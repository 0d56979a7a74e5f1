// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: the ordered draw items of one layer.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};
use strata_core::canvas::CanvasContext;
use strata_core::geom::Area;
use strata_core::layer::Layer;
use strata_core::node::{INVALID, NodeContent, NodeId, Scene};
use strata_core::paint::Paint;
use strata_core::renderer::Renderer;

/// A clip area of the node or one of its ancestors.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipItem {
    /// World transform of the clipping node.
    pub transform: Affine,
    /// Clip area in the clipping node's local frame.
    pub area: Area,
}

/// A single draw command in a render plan.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    /// The node this item draws.
    pub node: NodeId,
    /// What the node paints, in its local frame.
    pub content: NodeContent,
    /// Fill paint.
    pub fill: Paint,
    /// Stroke paint.
    pub stroke: Paint,
    /// Stroke width.
    pub line_width: f64,
    /// Local-to-world transform.
    pub world_transform: Affine,
    /// Effective opacity (accumulated from ancestors).
    pub effective_opacity: f32,
    /// Clips along the trail, outermost first.
    pub clips: Vec<ClipItem>,
}

impl RenderItem {
    /// World-space bounding box of the item, limited by its clips.
    #[must_use]
    pub fn world_bounds(&self) -> Option<Rect> {
        let local = self.content.bounds(&self.stroke, self.line_width)?;
        let mut bounds = self.world_transform.transform_rect_bbox(local);
        for clip in &self.clips {
            let clip_bounds = clip.transform.transform_rect_bbox(clip.area.bounding_box());
            bounds = bounds.intersect(clip_bounds);
        }
        Some(bounds)
    }

    /// Runs the drawing callback of [`Canvas`](NodeContent::Canvas) content
    /// against `context`, which must already be in the item's local frame.
    ///
    /// Returns `false` for every other kind of content.
    pub fn paint_canvas(&self, context: &mut dyn CanvasContext) -> bool {
        match &self.content {
            NodeContent::Canvas { painting, .. } => {
                painting.paint(context);
                true
            }
            _ => false,
        }
    }
}

/// The draw items of one layer, back to front.
///
/// Backends translate a plan into canvas calls, SVG elements, or positioned
/// DOM elements depending on [`renderer`](Self::renderer).
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    /// The renderer the layer is drawn with.
    pub renderer: Renderer,
    /// Draw items in paint order.
    pub items: Vec<RenderItem>,
}

impl RenderPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            items: Vec::new(),
        }
    }

    /// Flattens the painted nodes of `layer`.
    ///
    /// Reads world transforms and effective opacities, so the scene must
    /// have been evaluated.
    #[must_use]
    pub fn for_layer(scene: &Scene, layer: &Layer) -> Self {
        let mut plan = Self::new(layer.renderer);
        plan.fill(scene, layer);
        plan
    }

    /// Refills the plan from `layer`, reusing its allocation.
    pub fn fill(&mut self, scene: &Scene, layer: &Layer) {
        self.renderer = layer.renderer;
        self.items.clear();
        for &idx in &layer.nodes {
            let (fill, stroke, line_width) = scene.paints_at(idx);
            self.items.push(RenderItem {
                node: scene.id_at(idx),
                content: scene.content_at(idx).clone(),
                fill,
                stroke,
                line_width,
                world_transform: scene.world_transform_at(idx),
                effective_opacity: scene.effective_opacity_at(idx),
                clips: clips_of(scene, idx),
            });
        }
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns `true` if the plan draws nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Union of the items' world bounds.
    #[must_use]
    pub fn world_bounds(&self) -> Option<Rect> {
        self.items
            .iter()
            .filter_map(RenderItem::world_bounds)
            .reduce(|a, b| a.union(b))
    }
}

fn clips_of(scene: &Scene, idx: u32) -> Vec<ClipItem> {
    let mut clips = Vec::new();
    let mut current = idx;
    while current != INVALID {
        if let Some(area) = scene.clip_area_at(current) {
            clips.push(ClipItem {
                transform: scene.world_transform_at(current),
                area: area.clone(),
            });
        }
        current = scene.parent_at(current);
    }
    clips.reverse();
    clips
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::layer::LayerStack;
    use strata_core::paint::Color;

    #[test]
    fn plan_flattens_world_state() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        scene.set_translation(root, kurbo::Vec2::new(10.0, 0.0));
        scene.set_clip_area(root, Some(Area::rect(0.0, 0.0, 5.0, 5.0)));
        scene.set_opacity(root, 0.5);
        let leaf = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 20.0, 20.0)));
        scene.set_fill(leaf, Color::BLACK);
        scene.add_child(root, leaf);

        let changes = scene.evaluate();
        let mut stack = LayerStack::new(root);
        stack.update(&scene, &changes);
        let plan = RenderPlan::for_layer(&scene, &stack.layers()[0]);

        assert_eq!(plan.renderer, Renderer::Canvas);
        assert_eq!(plan.items.len(), 1);
        let item = &plan.items[0];
        assert_eq!(item.node, leaf);
        assert_eq!(item.world_transform, Affine::translate((10.0, 0.0)));
        assert_eq!(item.effective_opacity, 0.5);
        assert_eq!(item.clips.len(), 1);
        assert_eq!(
            plan.world_bounds(),
            Some(Rect::new(10.0, 0.0, 15.0, 5.0))
        );
    }

    #[test]
    fn empty_plan_has_no_bounds() {
        let plan = RenderPlan::new(Renderer::Svg);
        assert!(plan.is_empty());
        assert_eq!(plan.world_bounds(), None);
    }

    #[test]
    fn gradient_paints_and_canvas_content_reach_the_plan() {
        use crate::canvas::{CanvasCommand, CanvasRecording};
        use kurbo::Shape as _;
        use strata_core::canvas::CanvasPainting;
        use strata_core::paint::{LinearGradient, RadialGradient};

        let mut scene = Scene::new();
        let root = scene.create_node();
        let sky = LinearGradient::new(0.0, 0.0, 0.0, 100.0)
            .add_color_stop(0.0, Color::rgb(120, 180, 255))
            .add_color_stop(1.0, Color::WHITE);
        let background = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 200.0, 100.0)));
        scene.set_fill(background, sky.clone());
        let glow = RadialGradient::new(0.0, 0.0, 0.0, 0.0, 0.0, 10.0)
            .add_color_stop(0.0, Color::WHITE)
            .add_color_stop(1.0, Color::TRANSPARENT);
        let sketch = scene.create_with_content(NodeContent::Canvas {
            bounds: Rect::new(0.0, 0.0, 20.0, 20.0),
            painting: CanvasPainting::new(move |context| {
                context.transform(Affine::translate((10.0, 10.0)));
                context.fill_path(
                    &kurbo::Circle::new((0.0, 0.0), 10.0).to_path(0.1),
                    &glow.clone().into(),
                );
            }),
        });
        scene.add_child(root, background);
        scene.add_child(root, sketch);

        let changes = scene.evaluate();
        let mut stack = LayerStack::new(root);
        stack.update(&scene, &changes);
        assert_eq!(stack.layers().len(), 1);
        let plan = RenderPlan::for_layer(&scene, &stack.layers()[0]);
        assert_eq!(plan.renderer, Renderer::Canvas);
        assert_eq!(plan.items[0].fill, Paint::from(sky));
        assert!(!plan.items[0].paint_canvas(&mut CanvasRecording::new()));

        let mut recording = CanvasRecording::new();
        assert!(plan.items[1].paint_canvas(&mut recording));
        assert_eq!(recording.commands.len(), 2);
        assert_eq!(
            recording.commands[0],
            CanvasCommand::Transform(Affine::translate((10.0, 10.0)))
        );
        assert!(matches!(
            &recording.commands[1],
            CanvasCommand::FillPath { paint: Paint::RadialGradient(g), .. } if g.end_radius == 10.0
        ));
    }
}
