// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::Scene;

/// An iterator over the direct children of a node, bottom-most first.
///
/// Created by [`Scene::children`].
#[derive(Debug)]
pub struct Children<'a> {
    scene: &'a Scene,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(scene: &'a Scene, first: u32) -> Self {
        Self {
            scene,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.scene.next_sibling[idx as usize];
        Some(NodeId {
            idx,
            generation: self.scene.generation[idx as usize],
        })
    }
}

impl Scene {
    /// Visits `root` and its descendants in paint order (pre-order, bottom-most
    /// child first), passing each node's depth below `root`.
    pub fn walk(&self, root: NodeId, mut visit: impl FnMut(NodeId, usize)) {
        self.validate(root);
        self.walk_from(root.idx, 0, &mut visit);
    }

    fn walk_from(&self, idx: u32, depth: usize, visit: &mut impl FnMut(NodeId, usize)) {
        visit(
            NodeId {
                idx,
                generation: self.generation[idx as usize],
            },
            depth,
        );
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.walk_from(child, depth + 1, visit);
            child = self.next_sibling[child as usize];
        }
    }
}
