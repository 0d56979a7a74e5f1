// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial damage tracking for partial re-rendering.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

use crate::plan::RenderPlan;

/// A region of a layer that needs redrawing.
///
/// Backends can use this to clear and redraw only the areas that changed
/// since the last paint of the layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire layer needs redrawing.
    #[default]
    Full,
    /// World-space rectangles that need redrawing.
    Rects(Vec<Rect>),
    /// Nothing changed; the previous paint can be reused.
    None,
}

impl DamageRegion {
    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Adds a rectangle to the region.
    pub fn add_rect(&mut self, rect: Rect) {
        match self {
            Self::Full => {}
            Self::Rects(rects) => rects.push(rect),
            Self::None => *self = Self::Rects(vec![rect]),
        }
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&*self, other) {
            (Self::Full, _) | (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (_, Self::None) => {}
            (Self::Rects(a), Self::Rects(b)) => {
                let mut merged = a.clone();
                merged.extend_from_slice(b);
                *self = Self::Rects(merged);
            }
        }
    }

    /// Smallest rectangle covering the region, or `None` for
    /// [`Full`](Self::Full) and [`None`](Self::None).
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            Self::Full | Self::None => None,
        }
    }
}

/// Remembers what each layer covered when it was last painted.
///
/// Repainting a layer damages both its old and its new footprint: the old
/// one must be cleared and the new one drawn.
#[derive(Clone, Debug, Default)]
pub struct DamageTracker {
    previous: Vec<Option<Rect>>,
}

impl DamageTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets all layers; the next paint of each layer is a full repaint.
    pub fn reset(&mut self, layer_count: usize) {
        self.previous.clear();
        self.previous.resize(layer_count, None);
    }

    /// Records a repaint of layer `index` with `plan` and returns the damage.
    pub fn repaint(&mut self, index: usize, plan: &RenderPlan) -> DamageRegion {
        if index >= self.previous.len() {
            self.previous.resize(index + 1, None);
        }
        let new = plan.world_bounds();
        let old = core::mem::replace(&mut self.previous[index], new);
        match (old, new) {
            (None, None) => DamageRegion::None,
            (None, Some(_)) => DamageRegion::Full,
            (Some(old), None) => DamageRegion::Rects(vec![old]),
            (Some(old), Some(new)) if old == new => DamageRegion::Rects(vec![new]),
            (Some(old), Some(new)) => DamageRegion::Rects(vec![old, new]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_rules() {
        let mut region = DamageRegion::None;
        region.merge(&DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0)]));
        region.add_rect(Rect::new(2.0, 2.0, 3.0, 3.0));
        assert_eq!(region.bounding_box(), Some(Rect::new(0.0, 0.0, 3.0, 3.0)));

        region.merge(&DamageRegion::None);
        assert!(matches!(region, DamageRegion::Rects(ref r) if r.len() == 2));

        region.merge(&DamageRegion::Full);
        assert_eq!(region, DamageRegion::Full);
        region.add_rect(Rect::ZERO);
        assert_eq!(region, DamageRegion::Full);
    }

    #[test]
    fn empty_is_only_none() {
        assert!(DamageRegion::None.is_empty());
        assert!(!DamageRegion::Full.is_empty());
        assert!(!DamageRegion::Rects(Vec::new()).is_empty());
    }

    #[test]
    fn empty_plans_damage_nothing() {
        use strata_core::renderer::Renderer;

        let mut tracker = DamageTracker::new();
        let empty = RenderPlan::new(Renderer::Canvas);
        assert_eq!(tracker.repaint(0, &empty), DamageRegion::None);
        assert_eq!(tracker.repaint(3, &empty), DamageRegion::None);
    }
}
