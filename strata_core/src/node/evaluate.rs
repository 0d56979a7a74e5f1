// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene evaluation and change tracking.
//!
//! Evaluation drains each dirty channel and recomputes what depends on it:
//!
//! 1. **TRANSFORM**: recompute `world_transform` as
//!    `parent_world * local_transform` and `effective_visible` as
//!    `parent_visible && visible`.
//! 2. **OPACITY**: recompute `effective_opacity` as
//!    `parent_effective * opacity`.
//! 3. **PAINT** / **CLIP** / **RENDERER**: collect only; layers and painters
//!    read current values from the store.
//! 4. **TOPOLOGY**: consumed; the traversal order was already rebuilt.
//!
//! [`SceneChanges`] carries raw slot indices so consumers can use the
//! `*_at()` accessors without generation checks.

use alloc::vec::Vec;

use kurbo::Affine;

use super::id::INVALID;
use super::store::Scene;
use crate::dirty;

/// Changes produced by one [`Scene::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Nodes whose world transform was recomputed.
    pub transforms: Vec<u32>,
    /// Nodes whose effective opacity was recomputed.
    pub opacities: Vec<u32>,
    /// Nodes whose content or paints changed.
    pub paints: Vec<u32>,
    /// Nodes whose clip area changed.
    pub clips: Vec<u32>,
    /// Nodes whose renderer requirements changed (content kind, override,
    /// or layer split).
    pub renderer_changed: Vec<u32>,
    /// Nodes that became effectively hidden.
    pub hidden: Vec<u32>,
    /// Nodes that became effectively visible again.
    pub shown: Vec<u32>,
    /// Nodes created since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes destroyed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the traversal order was rebuilt.
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.opacities.clear();
        self.paints.clear();
        self.clips.clear();
        self.renderer_changed.clear();
        self.hidden.clear();
        self.shown.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
            && self.opacities.is_empty()
            && self.paints.is_empty()
            && self.clips.is_empty()
            && self.renderer_changed.is_empty()
            && self.hidden.is_empty()
            && self.shown.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl Scene {
    /// Recomputes dirty state and returns what changed.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_transforms: Vec<u32> = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_transforms {
            let i = idx as usize;
            let parent = self.parent[i];
            let (parent_world, parent_visible) = if parent == INVALID {
                (Affine::IDENTITY, true)
            } else {
                (
                    self.world_transform[parent as usize],
                    self.effective_visible[parent as usize],
                )
            };
            self.world_transform[i] = parent_world * self.local_transform[i];

            let visible = parent_visible && self.visible[i];
            if visible != self.effective_visible[i] {
                if visible {
                    changes.shown.push(idx);
                } else {
                    changes.hidden.push(idx);
                }
                self.effective_visible[i] = visible;
            }
        }
        changes.transforms = dirty_transforms;

        let dirty_opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for &idx in &dirty_opacities {
            let parent = self.parent[idx as usize];
            let parent_opacity = if parent == INVALID {
                1.0
            } else {
                self.effective_opacity[parent as usize]
            };
            self.effective_opacity[idx as usize] = parent_opacity * self.opacity[idx as usize];
        }
        changes.opacities = dirty_opacities;

        changes.paints = self.dirty.drain(dirty::PAINT).deterministic().run().collect();
        changes.clips = self.dirty.drain(dirty::CLIP).deterministic().run().collect();
        changes.renderer_changed = self
            .dirty
            .drain(dirty::RENDERER)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Depth-first pre-order of every live node, roots in slot order.
    ///
    /// Only current after [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        for idx in 0..self.len {
            if self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx) {
                self.dfs_collect(idx);
            }
        }
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Vec2;

    use super::*;
    use crate::paint::Color;

    #[test]
    fn world_transforms_compose_parent_first() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_node();
        scene.set_translation(parent, Vec2::new(10.0, 0.0));
        scene.set_translation(child, Vec2::new(0.0, 5.0));
        scene.add_child(parent, child);

        let changes = scene.evaluate();
        assert!(changes.topology_changed);
        assert_eq!(
            scene.world_transform(child),
            Affine::translate((10.0, 5.0))
        );
    }

    #[test]
    fn effective_opacity_multiplies() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_node();
        scene.set_opacity(parent, 0.5);
        scene.set_opacity(child, 0.5);
        scene.add_child(parent, child);
        let _ = scene.evaluate();
        assert!((scene.effective_opacity(child) - 0.25).abs() < 1e-6);

        scene.set_opacity(parent, 1.0);
        let changes = scene.evaluate();
        assert!(changes.opacities.contains(&child.index()));
        assert!((scene.effective_opacity(child) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hiding_reports_transitions_for_subtree() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_node();
        scene.add_child(parent, child);
        let _ = scene.evaluate();

        scene.set_visible(parent, false);
        let changes = scene.evaluate();
        assert_eq!(changes.hidden, vec![parent.index(), child.index()]);
        assert!(!scene.effective_visible(child));

        scene.set_visible(parent, true);
        let changes = scene.evaluate();
        assert_eq!(changes.shown, vec![parent.index(), child.index()]);
    }

    #[test]
    fn paint_and_lifecycle_lists() {
        let mut scene = Scene::new();
        let a = scene.create_node();
        let changes = scene.evaluate();
        assert_eq!(changes.added, vec![a.index()]);

        scene.set_fill(a, Color::BLACK);
        let changes = scene.evaluate();
        assert_eq!(changes.paints, vec![a.index()]);
        assert!(!changes.topology_changed);

        scene.destroy_node(a);
        let changes = scene.evaluate();
        assert_eq!(changes.removed, vec![a.index()]);
        assert!(scene.traversal_order().is_empty());

        let changes = scene.evaluate();
        assert!(changes.is_empty());
    }

    #[test]
    fn traversal_is_pre_order() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        let a1 = scene.create_node();
        scene.add_child(root, a);
        scene.add_child(root, b);
        scene.add_child(a, a1);
        let _ = scene.evaluate();
        assert_eq!(
            scene.traversal_order(),
            &[root.index(), a.index(), a1.index(), b.index()]
        );
    }
}
