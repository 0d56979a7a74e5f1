// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily cached node bounds.
//!
//! A node's bounds are the smallest rectangle in its local frame that
//! contains its own content and the transformed bounds of every child,
//! limited to the bounding box of the node's clip area when it has one. They
//! are cached per node; a geometry change invalidates the node and each
//! ancestor, and the next read recomputes only invalid nodes.
//!
//! Paint-only changes (fill, opacity, visibility, cursor, pickability) keep the
//! cache intact. Invisible children still contribute to their parent's bounds.

use kurbo::{Affine, Rect};

use super::id::{INVALID, NodeId};
use super::store::Scene;

impl Scene {
    /// Bounds of the node's subtree in its local frame; `None` if nothing in
    /// the subtree has extent.
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.bounds_at(id.idx)
    }

    /// Bounds of the node's own content in its local frame.
    #[must_use]
    pub fn self_bounds(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        let i = id.idx as usize;
        self.content[i].bounds(&self.stroke[i], self.line_width[i])
    }

    /// Bounds of the node's subtree in its parent's frame.
    #[must_use]
    pub fn bounds_in_parent(&self, id: NodeId) -> Option<Rect> {
        self.bounds(id)
            .map(|rect| self.local_transform[id.idx as usize].transform_rect_bbox(rect))
    }

    /// Bounds of the node's subtree in the frame of its root.
    #[must_use]
    pub fn global_bounds(&self, id: NodeId) -> Option<Rect> {
        self.bounds(id)
            .map(|rect| self.local_to_global_matrix(id).transform_rect_bbox(rect))
    }

    /// Returns whether the node's cached bounds are current.
    #[must_use]
    pub fn has_valid_bounds(&self, id: NodeId) -> bool {
        self.validate(id);
        self.bounds_valid[id.idx as usize].get()
    }

    /// Product of local transforms from the root down to and including `id`.
    #[must_use]
    pub fn local_to_global_matrix(&self, id: NodeId) -> Affine {
        self.validate(id);
        let mut matrix = self.local_transform[id.idx as usize];
        let mut idx = self.parent[id.idx as usize];
        while idx != INVALID {
            matrix = self.local_transform[idx as usize] * matrix;
            idx = self.parent[idx as usize];
        }
        matrix
    }

    pub(crate) fn bounds_at(&self, idx: u32) -> Option<Rect> {
        let i = idx as usize;
        if self.bounds_valid[i].get() {
            return self.bounds[i].get();
        }

        let mut acc = self.content[i].bounds(&self.stroke[i], self.line_width[i]);
        let mut child = self.first_child[i];
        while child != INVALID {
            if let Some(rect) = self.bounds_at(child) {
                let rect = self.local_transform[child as usize].transform_rect_bbox(rect);
                acc = Some(match acc {
                    Some(existing) => existing.union(rect),
                    None => rect,
                });
            }
            child = self.next_sibling[child as usize];
        }

        if let Some(clip) = &self.clip_area[i] {
            acc = acc.and_then(|rect| clipped(rect, clip.bounding_box()));
        }

        self.bounds[i].set(acc);
        self.bounds_valid[i].set(true);
        acc
    }
}

/// `None` when the rectangles do not touch.
fn clipped(rect: Rect, clip: Rect) -> Option<Rect> {
    if rect.x1 < clip.x0 || rect.x0 > clip.x1 || rect.y1 < clip.y0 || rect.y0 > clip.y1 {
        return None;
    }
    Some(rect.intersect(clip))
}
