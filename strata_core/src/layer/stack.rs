// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer stack and incremental repaint.

use alloc::vec;
use alloc::vec::Vec;

use super::assign::effective_renderers;
use super::{Layer, LayerBoundary, Painter};
use crate::node::{INVALID, NodeId, Scene, SceneChanges, Trail};
use crate::renderer::Renderer;

/// Result of [`LayerStack::update`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerUpdate {
    /// Whether the layers were rebuilt from scratch.
    pub rebuilt: bool,
    /// Indices of layers that need repainting.
    pub dirty: Vec<usize>,
}

/// Partitions the painted nodes under one root into renderer layers.
///
/// Painted, visible nodes are grouped in paint order. A new layer opens
/// whenever the effective renderer changes and before and after every
/// `layer_split` subtree.
#[derive(Debug)]
pub struct LayerStack {
    root: NodeId,
    layers: Vec<Layer>,
    boundaries: Vec<LayerBoundary>,
    /// Layer index per slot, or [`INVALID`].
    layer_of: Vec<u32>,
    /// Effective renderer per slot.
    renderers: Vec<Option<Renderer>>,
    structure_changed: bool,
}

impl LayerStack {
    /// Creates an empty stack for the subtree under `root`.
    ///
    /// The first [`update`](Self::update) builds the layers.
    #[must_use]
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            layers: Vec::new(),
            boundaries: Vec::new(),
            layer_of: Vec::new(),
            renderers: Vec::new(),
            structure_changed: true,
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current layers, bottom-most first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Boundaries before, between, and after the layers; one more than the
    /// layer count.
    #[must_use]
    pub fn boundaries(&self) -> &[LayerBoundary] {
        &self.boundaries
    }

    /// Layer containing the painted node `id`.
    #[must_use]
    pub fn layer_of(&self, id: NodeId) -> Option<usize> {
        let layer = *self.layer_of.get(id.index() as usize)?;
        (layer != INVALID).then_some(layer as usize)
    }

    /// Effective renderer of `id` as of the last rebuild.
    #[must_use]
    pub fn renderer_of(&self, id: NodeId) -> Option<Renderer> {
        self.renderers.get(id.index() as usize).copied().flatten()
    }

    /// Indices of layers waiting for a repaint.
    #[must_use]
    pub fn dirty_layers(&self) -> Vec<usize> {
        self.layers
            .iter()
            .enumerate()
            .filter_map(|(i, layer)| layer.dirty.then_some(i))
            .collect()
    }

    /// Brings the layers up to date with an evaluated scene.
    ///
    /// Structural changes (topology, renderer requirements, visibility, node
    /// lifecycle, or a node starting or stopping to paint) rebuild every
    /// layer. Other changes dirty only the layers holding affected nodes.
    pub fn update(&mut self, scene: &Scene, changes: &SceneChanges) -> LayerUpdate {
        if self.needs_rebuild(scene, changes) {
            self.rebuild(scene);
            return LayerUpdate {
                rebuilt: true,
                dirty: (0..self.layers.len()).collect(),
            };
        }

        for &idx in changes
            .transforms
            .iter()
            .chain(&changes.opacities)
            .chain(&changes.paints)
        {
            self.mark_node(idx);
        }
        for &idx in &changes.clips {
            self.mark_subtree(scene, idx);
        }
        LayerUpdate {
            rebuilt: false,
            dirty: self.dirty_layers(),
        }
    }

    /// Repaints dirty layers and returns how many were painted.
    ///
    /// After a rebuild the painter first receives the new layer structure.
    pub fn repaint(&mut self, scene: &Scene, painter: &mut dyn Painter) -> usize {
        if self.structure_changed {
            painter.layers_changed(&self.layers, &self.boundaries);
            self.structure_changed = false;
        }
        let mut painted = 0;
        for layer in &mut self.layers {
            if layer.dirty {
                painter.paint_layer(scene, layer);
                layer.dirty = false;
                painted += 1;
            }
        }
        painted
    }

    /// Rebuilds every layer from the current scene.
    pub fn rebuild(&mut self, scene: &Scene) {
        self.layers.clear();
        self.boundaries.clear();
        self.layer_of.clear();
        self.layer_of.resize(scene.len as usize, INVALID);
        self.structure_changed = true;

        if !scene.is_alive(self.root) {
            self.renderers.clear();
            self.boundaries.push(LayerBoundary::default());
            return;
        }
        self.renderers = effective_renderers(scene, self.root);

        let mut split_pending = true;
        self.collect(scene, self.root.index(), &mut split_pending);
        self.build_boundaries();
        log::debug!(
            "rebuilt {} layers under {:?}",
            self.layers.len(),
            self.root
        );
    }

    fn collect(&mut self, scene: &Scene, idx: u32, split_pending: &mut bool) {
        let i = idx as usize;
        if !scene.visible[i] {
            return;
        }
        let split = scene.layer_split[i];
        if split {
            *split_pending = true;
        }

        if scene.is_painted_at(idx) {
            if let Some(renderer) = self.renderers[i] {
                let open_new = *split_pending
                    || self
                        .layers
                        .last()
                        .is_none_or(|layer| layer.renderer != renderer);
                if open_new {
                    let trail = Trail::from_node(scene, scene.id_at(idx));
                    self.layers.push(Layer {
                        renderer,
                        nodes: Vec::new(),
                        start: trail.clone(),
                        end: trail,
                        dirty: true,
                    });
                    *split_pending = false;
                }
                let index = self.layers.len() - 1;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "layer count is bounded by node count"
                )]
                let stored = index as u32;
                self.layer_of[i] = stored;
                let layer = &mut self.layers[index];
                if !layer.nodes.is_empty() {
                    layer.end = Trail::from_node(scene, scene.id_at(idx));
                }
                layer.nodes.push(idx);
            }
        }

        let mut child = scene.first_child[i];
        while child != INVALID {
            self.collect(scene, child, split_pending);
            child = scene.next_sibling[child as usize];
        }

        if split {
            *split_pending = true;
        }
    }

    fn build_boundaries(&mut self) {
        let mut previous: Option<&Layer> = None;
        for layer in self.layers.iter().map(Some).chain([None]) {
            self.boundaries.push(LayerBoundary {
                previous_renderer: previous.map(|l| l.renderer),
                next_renderer: layer.map(|l| l.renderer),
                previous_painted: previous.map(|l| l.end.clone()),
                next_painted: layer.map(|l| l.start.clone()),
            });
            previous = layer;
        }
    }

    fn needs_rebuild(&self, scene: &Scene, changes: &SceneChanges) -> bool {
        if self.structure_changed && self.layers.is_empty() && self.boundaries.is_empty() {
            return true;
        }
        if changes.topology_changed
            || !changes.renderer_changed.is_empty()
            || !changes.added.is_empty()
            || !changes.removed.is_empty()
            || !changes.hidden.is_empty()
            || !changes.shown.is_empty()
        {
            return true;
        }
        // A node that started or stopped painting changes layer membership.
        changes.paints.iter().any(|&idx| {
            let in_layer = self
                .layer_of
                .get(idx as usize)
                .is_some_and(|layer| *layer != INVALID);
            let in_subtree = self.renderers.get(idx as usize).is_some_and(Option::is_some);
            in_subtree && in_layer != scene.is_painted_at(idx)
        })
    }

    fn mark_node(&mut self, idx: u32) {
        if let Some(&layer) = self.layer_of.get(idx as usize) {
            if layer != INVALID {
                self.layers[layer as usize].dirty = true;
            }
        }
    }

    fn mark_subtree(&mut self, scene: &Scene, idx: u32) {
        self.mark_node(idx);
        let mut child = scene.first_child[idx as usize];
        while child != INVALID {
            self.mark_subtree(scene, child);
            child = scene.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::geom::Area;
    use crate::node::NodeContent;
    use crate::paint::Color;

    #[derive(Default)]
    struct CountingPainter {
        structures: usize,
        painted: Vec<usize>,
    }

    impl Painter for CountingPainter {
        fn layers_changed(&mut self, _: &[Layer], _: &[LayerBoundary]) {
            self.structures += 1;
        }

        fn paint_layer(&mut self, _: &Scene, layer: &Layer) {
            self.painted.push(layer.nodes.len());
        }
    }

    fn painted(scene: &mut Scene, content: NodeContent) -> NodeId {
        let id = scene.create_with_content(content);
        scene.set_fill(id, Color::BLACK);
        id
    }

    fn rect(scene: &mut Scene) -> NodeId {
        painted(scene, NodeContent::Shape(Area::rect(0.0, 0.0, 1.0, 1.0)))
    }

    #[test]
    fn renderer_changes_open_layers() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = rect(&mut scene);
        let b = rect(&mut scene);
        let c = rect(&mut scene);
        for id in [a, b, c] {
            scene.add_child(root, id);
        }
        scene.set_renderer(b, Some(Renderer::Svg));

        let mut stack = LayerStack::new(root);
        let changes = scene.evaluate();
        let update = stack.update(&scene, &changes);
        assert!(update.rebuilt);
        let renderers: Vec<_> = stack.layers().iter().map(|l| l.renderer).collect();
        assert_eq!(
            renderers,
            vec![Renderer::Canvas, Renderer::Svg, Renderer::Canvas]
        );
        assert_eq!(stack.boundaries().len(), 4);
        let middle = &stack.boundaries()[1];
        assert_eq!(middle.previous_renderer, Some(Renderer::Canvas));
        assert_eq!(middle.next_renderer, Some(Renderer::Svg));
        assert_eq!(
            middle.previous_painted.as_ref().and_then(Trail::last_node),
            Some(a)
        );
        assert_eq!(middle.next_painted.as_ref().and_then(Trail::last_node), Some(b));
        assert_eq!(stack.boundaries()[0].previous_renderer, None);
        assert_eq!(stack.boundaries()[3].next_painted, None);
    }

    #[test]
    fn layer_split_isolates_subtree() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = rect(&mut scene);
        let group = scene.create_node();
        let b = rect(&mut scene);
        let c = rect(&mut scene);
        let d = rect(&mut scene);
        scene.add_child(root, a);
        scene.add_child(root, group);
        scene.add_child(group, b);
        scene.add_child(group, c);
        scene.add_child(root, d);
        scene.set_layer_split(group, true);

        let mut stack = LayerStack::new(root);
        let changes = scene.evaluate();
        stack.update(&scene, &changes);
        let sizes: Vec<_> = stack.layers().iter().map(|l| l.nodes.len()).collect();
        assert_eq!(sizes, vec![1, 2, 1]);
        assert_eq!(stack.layer_of(c), Some(1));
        assert_eq!(stack.layer_of(group), None);
    }

    #[test]
    fn paint_changes_repaint_only_their_layer() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = rect(&mut scene);
        let b = rect(&mut scene);
        scene.add_child(root, a);
        scene.add_child(root, b);
        scene.set_layer_split(b, true);

        let mut stack = LayerStack::new(root);
        let mut painter = CountingPainter::default();
        let changes = scene.evaluate();
        stack.update(&scene, &changes);
        assert_eq!(stack.repaint(&scene, &mut painter), 2);
        assert_eq!(painter.structures, 1);

        scene.set_fill(b, Color::WHITE);
        let changes = scene.evaluate();
        let update = stack.update(&scene, &changes);
        assert!(!update.rebuilt);
        assert_eq!(update.dirty, vec![1]);
        assert_eq!(stack.repaint(&scene, &mut painter), 1);
        assert_eq!(painter.structures, 1);

        let changes = scene.evaluate();
        stack.update(&scene, &changes);
        assert_eq!(stack.repaint(&scene, &mut painter), 0);
    }

    #[test]
    fn hidden_and_unpainted_nodes_rebuild() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = rect(&mut scene);
        let b = rect(&mut scene);
        scene.add_child(root, a);
        scene.add_child(root, b);
        let mut stack = LayerStack::new(root);
        let changes = scene.evaluate();
        stack.update(&scene, &changes);
        assert_eq!(stack.layers()[0].nodes.len(), 2);

        scene.set_visible(a, false);
        let changes = scene.evaluate();
        assert!(stack.update(&scene, &changes).rebuilt);
        assert_eq!(stack.layers()[0].nodes, vec![b.index()]);

        scene.set_fill(b, crate::paint::Paint::None);
        let changes = scene.evaluate();
        assert!(stack.update(&scene, &changes).rebuilt);
        assert!(stack.layers().is_empty());
        assert_eq!(stack.boundaries().len(), 1);
    }

    #[test]
    fn moving_a_group_dirties_descendant_layers() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let group = scene.create_node();
        let a = rect(&mut scene);
        scene.add_child(root, group);
        scene.add_child(group, a);
        let mut stack = LayerStack::new(root);
        let mut painter = CountingPainter::default();
        let changes = scene.evaluate();
        stack.update(&scene, &changes);
        stack.repaint(&scene, &mut painter);

        scene.translate(group, kurbo::Vec2::new(1.0, 0.0));
        let changes = scene.evaluate();
        assert_eq!(stack.update(&scene, &changes).dirty, vec![0]);
    }
}
