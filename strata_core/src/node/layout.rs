// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform mutators and bounds-based positioning.
//!
//! Translations, rotations, and scales applied here change a node's local
//! transform. Rotation and scale are appended (they act in the node's own
//! frame and keep its translation); translations are prepended (they act in
//! the parent frame).
//!
//! The positioning accessors (`left`, `center_x`, ...) read and write the
//! node's bounds in its parent frame. A node with empty bounds positions as
//! a zero-size rectangle at its translation.

use kurbo::{Affine, Point, Rect, Vec2};
use understory_dirty::EagerPolicy;

use super::id::{INVALID, NodeId};
use super::store::Scene;
use crate::dirty;

impl Scene {
    /// Returns the local transform.
    #[must_use]
    pub fn transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Replaces the local transform.
    ///
    /// Marks the TRANSFORM channel with eager propagation to descendants and
    /// invalidates the bounds of every ancestor.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) {
        self.validate(id);
        let idx = id.idx;
        self.local_transform[idx as usize] = transform;
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        let parent = self.parent[idx as usize];
        if parent != INVALID {
            self.invalidate_bounds(parent);
        }
    }

    /// Moves the node by `delta` in its parent's frame.
    pub fn translate(&mut self, id: NodeId, delta: Vec2) {
        let transform = Affine::translate(delta) * self.transform(id);
        self.set_transform(id, transform);
    }

    /// Returns the translation component of the local transform.
    #[must_use]
    pub fn translation(&self, id: NodeId) -> Vec2 {
        self.transform(id).translation()
    }

    /// Replaces the translation component, keeping rotation and scale.
    pub fn set_translation(&mut self, id: NodeId, translation: Vec2) {
        let transform = self.transform(id).with_translation(translation);
        self.set_transform(id, transform);
    }

    /// Horizontal translation.
    #[must_use]
    pub fn x(&self, id: NodeId) -> f64 {
        self.translation(id).x
    }

    /// Sets the horizontal translation.
    pub fn set_x(&mut self, id: NodeId, x: f64) {
        let translation = self.translation(id);
        self.set_translation(id, Vec2::new(x, translation.y));
    }

    /// Vertical translation.
    #[must_use]
    pub fn y(&self, id: NodeId) -> f64 {
        self.translation(id).y
    }

    /// Sets the vertical translation.
    pub fn set_y(&mut self, id: NodeId, y: f64) {
        let translation = self.translation(id);
        self.set_translation(id, Vec2::new(translation.x, y));
    }

    /// Length of the transformed x unit vector.
    #[must_use]
    pub fn scale_magnitude(&self, id: NodeId) -> f64 {
        let [a, b, ..] = self.transform(id).as_coeffs();
        libm::hypot(a, b)
    }

    /// Appends a uniform scale.
    ///
    /// # Panics
    ///
    /// Panics if `scale` is zero or not finite.
    pub fn scale(&mut self, id: NodeId, scale: f64) {
        assert!(
            scale.is_finite() && scale != 0.0,
            "invalid scale {scale}"
        );
        let transform = self.transform(id) * Affine::scale(scale);
        self.set_transform(id, transform);
    }

    /// Rescales so that [`scale_magnitude`](Self::scale_magnitude) becomes
    /// `magnitude`.
    ///
    /// # Panics
    ///
    /// Panics if `magnitude` is zero or not finite, or if the current
    /// transform is degenerate.
    pub fn set_scale_magnitude(&mut self, id: NodeId, magnitude: f64) {
        let current = self.scale_magnitude(id);
        assert!(current != 0.0, "cannot rescale a degenerate transform");
        self.scale(id, magnitude / current);
    }

    /// Rotation of the local transform, in radians.
    #[must_use]
    pub fn rotation(&self, id: NodeId) -> f64 {
        let [a, b, ..] = self.transform(id).as_coeffs();
        libm::atan2(b, a)
    }

    /// Appends a rotation by `angle` radians.
    pub fn rotate(&mut self, id: NodeId, angle: f64) {
        let transform = self.transform(id) * Affine::rotate(angle);
        self.set_transform(id, transform);
    }

    /// Rotates so that [`rotation`](Self::rotation) becomes `angle`.
    pub fn set_rotation(&mut self, id: NodeId, angle: f64) {
        let delta = angle - self.rotation(id);
        self.rotate(id, delta);
    }

    /// Maps a point from the node's local frame to its parent's frame.
    #[must_use]
    pub fn local_to_parent_point(&self, id: NodeId, point: Point) -> Point {
        self.transform(id) * point
    }

    /// Maps a point from the parent's frame into the node's local frame.
    #[must_use]
    pub fn parent_to_local_point(&self, id: NodeId, point: Point) -> Point {
        self.transform(id).inverse() * point
    }

    /// Maps a point from the node's local frame to its root's frame.
    #[must_use]
    pub fn local_to_global_point(&self, id: NodeId, point: Point) -> Point {
        self.local_to_global_matrix(id) * point
    }

    /// Maps a point from the root's frame into the node's local frame.
    #[must_use]
    pub fn global_to_local_point(&self, id: NodeId, point: Point) -> Point {
        self.local_to_global_matrix(id).inverse() * point
    }

    /// Maps a point from the root's frame into the node's parent frame.
    #[must_use]
    pub fn global_to_parent_point(&self, id: NodeId, point: Point) -> Point {
        match self.parent(id) {
            Some(parent) => self.global_to_local_point(parent, point),
            None => point,
        }
    }

    // -- Bounds-based positioning --

    /// Left edge of the bounds in the parent frame.
    #[must_use]
    pub fn left(&self, id: NodeId) -> f64 {
        self.layout_rect(id).x0
    }

    /// Moves the node horizontally so its left edge is at `left`.
    pub fn set_left(&mut self, id: NodeId, left: f64) {
        let delta = left - self.left(id);
        self.translate(id, Vec2::new(delta, 0.0));
    }

    /// Right edge of the bounds in the parent frame.
    #[must_use]
    pub fn right(&self, id: NodeId) -> f64 {
        self.layout_rect(id).x1
    }

    /// Moves the node horizontally so its right edge is at `right`.
    pub fn set_right(&mut self, id: NodeId, right: f64) {
        let delta = right - self.right(id);
        self.translate(id, Vec2::new(delta, 0.0));
    }

    /// Top edge of the bounds in the parent frame.
    #[must_use]
    pub fn top(&self, id: NodeId) -> f64 {
        self.layout_rect(id).y0
    }

    /// Moves the node vertically so its top edge is at `top`.
    pub fn set_top(&mut self, id: NodeId, top: f64) {
        let delta = top - self.top(id);
        self.translate(id, Vec2::new(0.0, delta));
    }

    /// Bottom edge of the bounds in the parent frame.
    #[must_use]
    pub fn bottom(&self, id: NodeId) -> f64 {
        self.layout_rect(id).y1
    }

    /// Moves the node vertically so its bottom edge is at `bottom`.
    pub fn set_bottom(&mut self, id: NodeId, bottom: f64) {
        let delta = bottom - self.bottom(id);
        self.translate(id, Vec2::new(0.0, delta));
    }

    /// Horizontal center of the bounds in the parent frame.
    #[must_use]
    pub fn center_x(&self, id: NodeId) -> f64 {
        self.layout_rect(id).center().x
    }

    /// Moves the node horizontally so its center is at `center_x`.
    pub fn set_center_x(&mut self, id: NodeId, center_x: f64) {
        let delta = center_x - self.center_x(id);
        self.translate(id, Vec2::new(delta, 0.0));
    }

    /// Vertical center of the bounds in the parent frame.
    #[must_use]
    pub fn center_y(&self, id: NodeId) -> f64 {
        self.layout_rect(id).center().y
    }

    /// Moves the node vertically so its center is at `center_y`.
    pub fn set_center_y(&mut self, id: NodeId, center_y: f64) {
        let delta = center_y - self.center_y(id);
        self.translate(id, Vec2::new(0.0, delta));
    }

    /// Moves the node so its bounds center is at `center`.
    pub fn set_center(&mut self, id: NodeId, center: Point) {
        let current = self.layout_rect(id).center();
        self.translate(id, center - current);
    }

    fn layout_rect(&self, id: NodeId) -> Rect {
        self.bounds_in_parent(id).unwrap_or_else(|| {
            let origin = self.translation(id).to_point();
            Rect::from_points(origin, origin)
        })
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::geom::Area;
    use crate::node::NodeContent;

    fn rect_node(scene: &mut Scene, w: f64, h: f64) -> NodeId {
        scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, w, h)))
    }

    #[test]
    fn translation_accessors() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        scene.set_x(id, 5.0);
        scene.set_y(id, -3.0);
        scene.translate(id, Vec2::new(1.0, 1.0));
        assert_eq!(scene.translation(id), Vec2::new(6.0, -2.0));
    }

    #[test]
    fn rotation_and_scale_keep_translation() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        scene.set_translation(id, Vec2::new(10.0, 20.0));
        scene.set_rotation(id, FRAC_PI_2);
        scene.set_scale_magnitude(id, 3.0);

        assert_relative_eq!(scene.rotation(id), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(scene.scale_magnitude(id), 3.0, epsilon = 1e-12);
        assert_relative_eq!(scene.x(id), 10.0, epsilon = 1e-12);
        assert_relative_eq!(scene.y(id), 20.0, epsilon = 1e-12);

        scene.rotate(id, -FRAC_PI_2);
        assert_relative_eq!(scene.rotation(id), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bounds_positioning() {
        let mut scene = Scene::new();
        let id = rect_node(&mut scene, 40.0, 20.0);
        scene.set_scale_magnitude(id, 0.5);

        scene.set_left(id, 10.0);
        scene.set_bottom(id, 100.0);
        assert_relative_eq!(scene.left(id), 10.0);
        assert_relative_eq!(scene.right(id), 30.0);
        assert_relative_eq!(scene.top(id), 90.0);

        scene.set_center_x(id, 0.0);
        scene.set_center_y(id, 0.0);
        assert_relative_eq!(scene.left(id), -10.0);
        assert_relative_eq!(scene.top(id), -5.0);

        scene.set_right(id, 50.0);
        scene.set_top(id, 1.0);
        assert_relative_eq!(scene.x(id), 30.0);
        assert_relative_eq!(scene.y(id), 1.0);
    }

    #[test]
    fn empty_nodes_position_by_translation() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        scene.set_left(id, 7.0);
        scene.set_center_y(id, 3.0);
        assert_eq!(scene.translation(id), Vec2::new(7.0, 3.0));
    }

    #[test]
    fn point_conversions_round_trip_through_ancestors() {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let child = scene.create_node();
        scene.add_child(root, child);
        scene.set_translation(root, Vec2::new(100.0, 0.0));
        scene.scale(child, 2.0);

        let global = scene.local_to_global_point(child, Point::new(1.0, 1.0));
        assert_eq!(global, Point::new(102.0, 2.0));
        let back = scene.global_to_local_point(child, global);
        assert_relative_eq!(back.x, 1.0);
        assert_relative_eq!(back.y, 1.0);
        assert_eq!(
            scene.global_to_parent_point(child, Point::new(110.0, 5.0)),
            Point::new(10.0, 5.0)
        );
    }

    #[test]
    #[should_panic(expected = "invalid scale")]
    fn zero_scale_panics() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        scene.scale(id, 0.0);
    }
}
