// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing.
//!
//! Precedence at each node, from first to last:
//!
//! 1. Invisible nodes and nodes with `pickable == Some(false)` are pruned
//!    together with their subtree.
//! 2. A clip area that does not contain the point rejects the whole subtree.
//! 3. Children are tested topmost (last) first.
//! 4. The node's own area: the touch area for touch input when set, else the
//!    mouse area for mouse input when set, else the painted content.

use kurbo::Point;

use super::id::{INVALID, NodeId};
use super::store::Scene;
use super::trail::Trail;

/// Options for [`Scene::trail_under_point`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitOptions {
    /// Use touch areas instead of mouse areas.
    pub is_touch: bool,
}

impl HitOptions {
    /// Options for a mouse (or pen) pointer.
    pub const MOUSE: Self = Self { is_touch: false };
    /// Options for a touch pointer.
    pub const TOUCH: Self = Self { is_touch: true };
}

impl Scene {
    /// Finds the deepest node under `point` within the subtree of `root`.
    ///
    /// `point` is in `root`'s parent frame. The returned trail starts at
    /// `root`.
    #[must_use]
    pub fn trail_under_point(
        &self,
        root: NodeId,
        point: Point,
        options: HitOptions,
    ) -> Option<Trail> {
        self.validate(root);
        let mut trail = Trail::default();
        if self.hit_at(root.idx, point, options, &mut trail) {
            Some(trail)
        } else {
            None
        }
    }

    /// Returns whether `point` (in the node's parent frame) hits the node or
    /// one of its descendants, using mouse areas.
    #[must_use]
    pub fn contains_point(&self, id: NodeId, point: Point) -> bool {
        self.trail_under_point(id, point, HitOptions::MOUSE).is_some()
    }

    /// On a hit, fills `trail` root first and returns `true`.
    fn hit_at(&self, idx: u32, point: Point, options: HitOptions, trail: &mut Trail) -> bool {
        let i = idx as usize;
        if !self.visible[i] || self.pickable[i] == Some(false) {
            return false;
        }

        let local = self.local_transform[i].inverse() * point;
        if let Some(clip) = &self.clip_area[i] {
            if !clip.contains(local) {
                return false;
            }
        }

        let mut child = self.last_child(idx);
        while child != INVALID {
            if self.hit_at(child, local, options, trail) {
                trail.push_root(self.id_at(idx));
                return true;
            }
            child = self.prev_sibling[child as usize];
        }

        let hit = match (&self.touch_area[i], &self.mouse_area[i]) {
            (Some(area), _) if options.is_touch => area.contains(local),
            (_, Some(area)) if !options.is_touch => area.contains(local),
            _ => self.content[i].contains(local, &self.stroke[i], self.line_width[i]),
        };
        if hit {
            trail.push(self.id_at(idx));
        }
        hit
    }

    fn last_child(&self, idx: u32) -> u32 {
        let mut child = self.first_child[idx as usize];
        if child == INVALID {
            return INVALID;
        }
        while self.next_sibling[child as usize] != INVALID {
            child = self.next_sibling[child as usize];
        }
        child
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;
    use crate::geom::Area;
    use crate::node::NodeContent;
    use crate::paint::Color;

    fn rect_node(scene: &mut Scene, x: f64, y: f64, w: f64, h: f64) -> NodeId {
        let id = scene.create_with_content(NodeContent::Shape(Area::rect(x, y, w, h)));
        scene.set_fill(id, Color::BLACK);
        id
    }

    #[test]
    fn topmost_child_wins() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let bottom = rect_node(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let top = rect_node(&mut scene, 0.0, 0.0, 10.0, 10.0);
        scene.add_child(root, bottom);
        scene.add_child(root, top);

        let trail = scene
            .trail_under_point(root, Point::new(5.0, 5.0), HitOptions::MOUSE)
            .unwrap();
        assert_eq!(trail.nodes(), &[root, top]);

        scene.set_pickable(top, Some(false));
        let trail = scene
            .trail_under_point(root, Point::new(5.0, 5.0), HitOptions::MOUSE)
            .unwrap();
        assert_eq!(trail.last_node(), Some(bottom));
    }

    #[test]
    fn invisible_subtrees_are_pruned() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let leaf = rect_node(&mut scene, 0.0, 0.0, 10.0, 10.0);
        scene.add_child(root, leaf);
        scene.set_visible(root, false);
        assert!(!scene.contains_point(root, Point::new(5.0, 5.0)));
    }

    #[test]
    fn point_is_in_parent_frame() {
        let mut scene = Scene::new();
        let root = rect_node(&mut scene, 0.0, 0.0, 10.0, 10.0);
        scene.set_translation(root, Vec2::new(100.0, 0.0));
        assert!(scene.contains_point(root, Point::new(105.0, 5.0)));
        assert!(!scene.contains_point(root, Point::new(5.0, 5.0)));
    }

    #[test]
    fn mouse_and_touch_areas_replace_content() {
        let mut scene = Scene::new();
        let node = rect_node(&mut scene, 0.0, 0.0, 10.0, 10.0);
        scene.set_mouse_area(node, Some(Area::rect(0.0, 0.0, 20.0, 20.0)));
        scene.set_touch_area(node, Some(Area::rect(-10.0, -10.0, 5.0, 5.0)));

        let p = Point::new(15.0, 15.0);
        assert!(scene.trail_under_point(node, p, HitOptions::MOUSE).is_some());
        assert!(scene.trail_under_point(node, p, HitOptions::TOUCH).is_none());
        let q = Point::new(-8.0, -8.0);
        assert!(scene.trail_under_point(node, q, HitOptions::TOUCH).is_some());
        assert!(scene.trail_under_point(node, q, HitOptions::MOUSE).is_none());
    }

    #[test]
    fn clip_beats_touch_area() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = rect_node(&mut scene, 0.0, 0.0, 100.0, 50.0);
        scene.add_child(parent, child);
        scene.set_touch_area(parent, Some(Area::rect(-50.0, -50.0, 100.0, 100.0)));
        scene.set_clip_area(parent, Some(Area::rect(0.0, 0.0, 50.0, 50.0)));

        let hit = |x: f64, y: f64| {
            scene
                .trail_under_point(parent, Point::new(x, y), HitOptions::TOUCH)
                .is_some()
        };
        assert!(hit(10.0, 10.0));
        assert!(!hit(90.0, 10.0));
        assert!(!hit(-10.0, 10.0));
    }

    #[test]
    fn plane_catches_points_behind_a_popup() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let button = rect_node(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let plane = scene.create_plane(Color::rgba(0, 0, 0, 0.3));
        let popup = rect_node(&mut scene, 200.0, 200.0, 50.0, 50.0);
        scene.add_child(root, button);
        scene.add_child(root, plane);
        scene.add_child(root, popup);

        let under = |x: f64, y: f64| {
            scene
                .trail_under_point(root, Point::new(x, y), HitOptions::MOUSE)
                .and_then(|trail| trail.last_node())
        };
        assert_eq!(under(5.0, 5.0), Some(plane));
        assert_eq!(under(-1500.0, 3000.0), Some(plane));
        assert_eq!(under(210.0, 210.0), Some(popup));
    }

    #[test]
    fn canvas_content_hits_inside_its_bounds() {
        let mut scene = Scene::new();
        let canvas = scene.create_with_content(NodeContent::Canvas {
            bounds: kurbo::Rect::new(0.0, 0.0, 30.0, 30.0),
            painting: crate::canvas::CanvasPainting::new(|_| {}),
        });
        scene.set_translation(canvas, Vec2::new(10.0, 10.0));
        assert!(scene.contains_point(canvas, Point::new(35.0, 35.0)));
        assert!(!scene.contains_point(canvas, Point::new(5.0, 5.0)));
    }
}
