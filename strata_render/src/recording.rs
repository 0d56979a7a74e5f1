// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A painter that records render plans instead of drawing.

use alloc::vec::Vec;

use strata_core::layer::{Layer, LayerBoundary, Painter};
use strata_core::node::{Scene, Trail};

use crate::damage::{DamageRegion, DamageTracker};
use crate::plan::RenderPlan;

/// One recorded [`Painter::paint_layer`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintRecord {
    /// Index of the layer in the stack, if it matched a known layer.
    pub layer_index: Option<usize>,
    /// The flattened layer.
    pub plan: RenderPlan,
    /// What the repaint damaged.
    pub damage: DamageRegion,
}

/// Records every layer it is asked to paint.
///
/// Useful as a test double and for headless runs: the records show exactly
/// which layers a frame repainted and what they contained.
#[derive(Debug, Default)]
pub struct RecordingPainter {
    layer_starts: Vec<Trail>,
    structure_changes: usize,
    records: Vec<PaintRecord>,
    damage: DamageTracker,
}

impl RecordingPainter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded paints, oldest first.
    #[must_use]
    pub fn records(&self) -> &[PaintRecord] {
        &self.records
    }

    /// Removes and returns the recorded paints.
    pub fn take_records(&mut self) -> Vec<PaintRecord> {
        core::mem::take(&mut self.records)
    }

    /// How many times the layer structure was rebuilt.
    #[must_use]
    pub fn structure_changes(&self) -> usize {
        self.structure_changes
    }

    /// Number of layers in the last structure seen.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layer_starts.len()
    }
}

impl Painter for RecordingPainter {
    fn layers_changed(&mut self, layers: &[Layer], boundaries: &[LayerBoundary]) {
        debug_assert_eq!(
            boundaries.len(),
            layers.len() + 1,
            "a stack of n layers has n + 1 boundaries"
        );
        self.structure_changes += 1;
        self.layer_starts = layers.iter().map(|layer| layer.start.clone()).collect();
        self.damage.reset(layers.len());
    }

    fn paint_layer(&mut self, scene: &Scene, layer: &Layer) {
        let layer_index = self.layer_starts.iter().position(|start| *start == layer.start);
        let plan = RenderPlan::for_layer(scene, layer);
        let damage = match layer_index {
            Some(index) => self.damage.repaint(index, &plan),
            None => DamageRegion::Full,
        };
        log::trace!(
            "painted {} layer {layer_index:?} with {} items",
            plan.renderer,
            plan.items.len()
        );
        self.records.push(PaintRecord {
            layer_index,
            plan,
            damage,
        });
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use kurbo::{Rect, Vec2};
    use strata_core::geom::Area;
    use strata_core::layer::LayerStack;
    use strata_core::node::NodeContent;
    use strata_core::paint::Color;

    #[test]
    fn records_only_dirty_layers_with_damage() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 10.0, 10.0)));
        let b = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 10.0, 10.0)));
        scene.set_fill(a, Color::BLACK);
        scene.set_fill(b, Color::BLACK);
        scene.set_layer_split(b, true);
        scene.add_child(root, a);
        scene.add_child(root, b);

        let mut stack = LayerStack::new(root);
        let mut painter = RecordingPainter::new();
        let changes = scene.evaluate();
        stack.update(&scene, &changes);
        stack.repaint(&scene, &mut painter);
        assert_eq!(painter.structure_changes(), 1);
        assert_eq!(painter.layer_count(), 2);
        let first = painter.take_records();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|r| r.damage == DamageRegion::Full));

        scene.set_translation(b, Vec2::new(20.0, 0.0));
        let changes = scene.evaluate();
        stack.update(&scene, &changes);
        stack.repaint(&scene, &mut painter);

        let second = painter.take_records();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].layer_index, Some(1));
        assert_eq!(
            second[0].damage,
            DamageRegion::Rects(vec![
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Rect::new(20.0, 0.0, 30.0, 10.0),
            ])
        );
        assert_eq!(painter.structure_changes(), 1);
    }
}
