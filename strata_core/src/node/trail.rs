// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root-to-node paths through the scene.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Write as _;

use kurbo::{Affine, Point, Rect};

use super::id::NodeId;
use super::store::Scene;

/// A path of nodes from a root (first) down to a target (last), where each
/// node is a child of the one before it.
///
/// Trails are values: they are not updated when the scene changes. Matrix
/// and visibility queries read the scene's current local state, so they do
/// not require an [`evaluate`](Scene::evaluate) pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Trail {
    nodes: Vec<NodeId>,
}

impl Trail {
    /// Creates a trail from a root-first node list.
    #[must_use]
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    /// Builds the trail from `node` up through its ancestors.
    #[must_use]
    pub fn from_node(scene: &Scene, node: NodeId) -> Self {
        let mut nodes = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            nodes.push(id);
            current = scene.parent(id);
        }
        nodes.reverse();
        Self { nodes }
    }

    /// Appends a child of the current last node.
    pub fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    /// Prepends a parent of the current root node.
    pub fn push_root(&mut self, node: NodeId) {
        self.nodes.insert(0, node);
    }

    /// Number of nodes on the trail.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the trail has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes, root first.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// First node.
    #[must_use]
    pub fn root_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Last node (the target).
    #[must_use]
    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Returns whether `node` is on the trail.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Product of every node's local transform, root first.
    #[must_use]
    pub fn matrix(&self, scene: &Scene) -> Affine {
        self.product(scene, self.nodes.len())
    }

    /// Like [`matrix`](Self::matrix) but excluding the last node's transform.
    #[must_use]
    pub fn parent_matrix(&self, scene: &Scene) -> Affine {
        self.product(scene, self.nodes.len().saturating_sub(1))
    }

    /// Maps a point in the last node's local frame to the root's parent frame.
    #[must_use]
    pub fn local_to_global_point(&self, scene: &Scene, point: Point) -> Point {
        self.matrix(scene) * point
    }

    /// Maps a point in the root's parent frame to the last node's local frame.
    #[must_use]
    pub fn global_to_local_point(&self, scene: &Scene, point: Point) -> Point {
        self.matrix(scene).inverse() * point
    }

    /// Maps a point in the root's parent frame to the last node's parent
    /// frame.
    #[must_use]
    pub fn global_to_parent_point(&self, scene: &Scene, point: Point) -> Point {
        self.parent_matrix(scene).inverse() * point
    }

    /// Bounding box of `bounds`, in the last node's local frame, mapped to
    /// the root's parent frame.
    #[must_use]
    pub fn local_to_global_bounds(&self, scene: &Scene, bounds: Rect) -> Rect {
        self.matrix(scene).transform_rect_bbox(bounds)
    }

    /// Bounding box of `bounds`, in the root's parent frame, mapped to the
    /// last node's local frame.
    #[must_use]
    pub fn global_to_local_bounds(&self, scene: &Scene, bounds: Rect) -> Rect {
        self.matrix(scene).inverse().transform_rect_bbox(bounds)
    }

    /// Bounding box of `bounds`, in the last node's parent frame, mapped to
    /// the root's parent frame.
    #[must_use]
    pub fn parent_to_global_bounds(&self, scene: &Scene, bounds: Rect) -> Rect {
        self.parent_matrix(scene).transform_rect_bbox(bounds)
    }

    /// Index of the first node that differs between the two trails.
    ///
    /// Both trails must share a root.
    #[must_use]
    pub fn branch_index_to(&self, other: &Self) -> usize {
        debug_assert_eq!(
            self.root_node(),
            other.root_node(),
            "branching trails must share a root"
        );
        self.nodes
            .iter()
            .zip(&other.nodes)
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Maps this trail's last local frame to `other`'s last local frame.
    ///
    /// Only the transforms below the shared prefix contribute.
    #[must_use]
    pub fn matrix_to(&self, scene: &Scene, other: &Self) -> Affine {
        let branch = self.branch_index_to(other);
        let up = self.nodes[branch..]
            .iter()
            .fold(Affine::IDENTITY, |acc, id| acc * scene.transform(*id));
        let down = other.nodes[branch..]
            .iter()
            .fold(Affine::IDENTITY, |acc, id| acc * scene.transform(*id));
        down.inverse() * up
    }

    /// Orders two trails with a shared root by paint order.
    ///
    /// An ancestor comes before its descendants, and earlier siblings (and
    /// their subtrees) come before later ones.
    ///
    /// # Panics
    ///
    /// Debug builds panic if either trail is empty or the roots differ.
    #[must_use]
    pub fn compare(&self, scene: &Scene, other: &Self) -> Ordering {
        debug_assert!(
            !self.is_empty() && !other.is_empty(),
            "cannot compare an empty trail"
        );
        let branch = self.branch_index_to(other);
        if branch == 0 || branch == self.nodes.len() || branch == other.nodes.len() {
            return self.nodes.len().cmp(&other.nodes.len());
        }
        let parent = self.nodes[branch - 1];
        let ours = scene.index_of_child(parent, self.nodes[branch]);
        let theirs = scene.index_of_child(parent, other.nodes[branch]);
        ours.cmp(&theirs)
    }

    /// Returns whether this trail is painted before (under) `other`.
    #[must_use]
    pub fn is_before(&self, scene: &Scene, other: &Self) -> bool {
        self.compare(scene, other) == Ordering::Less
    }

    /// Returns whether this trail is painted after (over) `other`.
    #[must_use]
    pub fn is_after(&self, scene: &Scene, other: &Self) -> bool {
        self.compare(scene, other) == Ordering::Greater
    }

    /// The trail after this one in paint order under the same root.
    ///
    /// That is the first child when there is one, else the next sibling of
    /// the deepest node that has one.
    #[must_use]
    pub fn next(&self, scene: &Scene) -> Option<Self> {
        let last = self.last_node()?;
        if let Some(first) = scene.children(last).next() {
            let mut nodes = self.nodes.clone();
            nodes.push(first);
            return Some(Self::new(nodes));
        }
        let mut nodes = self.nodes.clone();
        while nodes.len() > 1 {
            let node = nodes.pop()?;
            let parent = *nodes.last()?;
            let index = scene.index_of_child(parent, node)?;
            if let Some(sibling) = scene.children(parent).nth(index + 1) {
                nodes.push(sibling);
                return Some(Self::new(nodes));
            }
        }
        None
    }

    /// The trail before this one in paint order under the same root.
    ///
    /// That is the deepest last descendant of the previous sibling, or the
    /// parent for a first child.
    #[must_use]
    pub fn previous(&self, scene: &Scene) -> Option<Self> {
        if self.nodes.len() <= 1 {
            return None;
        }
        let mut nodes = self.nodes.clone();
        let node = nodes.pop()?;
        let parent = *nodes.last()?;
        let index = scene.index_of_child(parent, node)?;
        if index == 0 {
            return Some(Self::new(nodes));
        }
        let mut current = scene.children(parent).nth(index - 1)?;
        nodes.push(current);
        while let Some(child) = scene.children(current).last() {
            nodes.push(child);
            current = child;
        }
        Some(Self::new(nodes))
    }

    /// Like [`next`](Self::next), skipping trails to unpainted nodes.
    #[must_use]
    pub fn next_painted(&self, scene: &Scene) -> Option<Self> {
        let mut result = self.next(scene);
        while let Some(trail) = &result {
            if trail.last_node().is_some_and(|id| scene.is_painted(id)) {
                break;
            }
            result = trail.next(scene);
        }
        result
    }

    /// Like [`previous`](Self::previous), skipping trails to unpainted nodes.
    #[must_use]
    pub fn previous_painted(&self, scene: &Scene) -> Option<Self> {
        let mut result = self.previous(scene);
        while let Some(trail) = &result {
            if trail.last_node().is_some_and(|id| scene.is_painted(id)) {
                break;
            }
            result = trail.previous(scene);
        }
        result
    }

    /// Calls `visit` with this trail and each trail extending it, in paint
    /// order.
    ///
    /// When `visit` returns `true` the trails below the visited one are
    /// skipped.
    pub fn each_trail_under(&self, scene: &Scene, mut visit: impl FnMut(&Self) -> bool) {
        let mut trail = self.clone();
        trail.visit_under(scene, &mut visit);
    }

    fn visit_under(&mut self, scene: &Scene, visit: &mut impl FnMut(&Self) -> bool) {
        if visit(self) {
            return;
        }
        let Some(last) = self.last_node() else {
            return;
        };
        let children: Vec<NodeId> = scene.children(last).collect();
        for child in children {
            self.nodes.push(child);
            self.visit_under(scene, visit);
            self.nodes.pop();
        }
    }

    /// Returns whether hit testing can reach the last node through this
    /// trail.
    ///
    /// Any invisible node or `pickable == Some(false)` on the trail prevents
    /// it.
    #[must_use]
    pub fn is_pickable(&self, scene: &Scene) -> bool {
        self.nodes
            .iter()
            .all(|id| scene.is_visible(*id) && scene.pickable(*id) != Some(false))
    }

    /// Returns whether every node on the trail is visible.
    #[must_use]
    pub fn is_visible(&self, scene: &Scene) -> bool {
        self.nodes.iter().all(|id| scene.is_visible(*id))
    }

    /// Product of every node's opacity.
    #[must_use]
    pub fn opacity(&self, scene: &Scene) -> f32 {
        self.nodes.iter().map(|id| scene.opacity(*id)).product()
    }

    /// Returns whether this trail starts with all of `other`.
    ///
    /// Equal trails count only when `allow_same` is set.
    #[must_use]
    pub fn is_extension_of(&self, other: &Self, allow_same: bool) -> bool {
        if other.nodes.len() > self.nodes.len()
            || (!allow_same && other.nodes.len() == self.nodes.len())
        {
            return false;
        }
        self.nodes.starts_with(&other.nodes)
    }

    /// The prefix ending at `node`, or just before it when `exclude` is set.
    ///
    /// Returns `None` if `node` is not on the trail.
    #[must_use]
    pub fn subtrail_to(&self, node: NodeId, exclude: bool) -> Option<Self> {
        let position = self.nodes.iter().position(|id| *id == node)?;
        let end = if exclude { position } else { position + 1 };
        Some(Self::new(self.nodes[..end].to_vec()))
    }

    /// String key built from the slot indices, e.g. `"0-3-7"`.
    #[must_use]
    pub fn unique_id(&self) -> String {
        let mut out = String::new();
        for (i, id) in self.nodes.iter().enumerate() {
            if i > 0 {
                out.push('-');
            }
            let _ = write!(out, "{}", id.index());
        }
        out
    }

    fn product(&self, scene: &Scene, count: usize) -> Affine {
        self.nodes[..count]
            .iter()
            .fold(Affine::IDENTITY, |acc, id| acc * scene.transform(*id))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Vec2;

    use super::*;
    use crate::geom::Area;
    use crate::node::NodeContent;
    use crate::paint::Color;

    fn chain(scene: &mut Scene) -> (NodeId, NodeId, NodeId) {
        let root = scene.create_node();
        let mid = scene.create_node();
        let leaf = scene.create_node();
        scene.add_child(root, mid);
        scene.add_child(mid, leaf);
        (root, mid, leaf)
    }

    #[test]
    fn from_node_walks_to_root() {
        let mut scene = Scene::new();
        let (root, mid, leaf) = chain(&mut scene);
        let trail = Trail::from_node(&scene, leaf);
        assert_eq!(trail.nodes(), &[root, mid, leaf]);
        assert_eq!(trail.root_node(), Some(root));
        assert_eq!(trail.last_node(), Some(leaf));
        assert_eq!(
            trail.unique_id(),
            alloc::format!("{}-{}-{}", root.index(), mid.index(), leaf.index())
        );
    }

    #[test]
    fn matrices_and_points() {
        let mut scene = Scene::new();
        let (root, mid, leaf) = chain(&mut scene);
        scene.set_translation(root, Vec2::new(10.0, 0.0));
        scene.set_translation(mid, Vec2::new(0.0, 10.0));
        scene.scale(leaf, 2.0);
        let trail = Trail::from_node(&scene, leaf);

        assert_eq!(
            trail.local_to_global_point(&scene, Point::new(1.0, 1.0)),
            Point::new(12.0, 12.0)
        );
        assert_eq!(
            trail.global_to_parent_point(&scene, Point::new(15.0, 15.0)),
            Point::new(5.0, 5.0)
        );
        assert_eq!(
            trail.global_to_local_point(&scene, Point::new(12.0, 12.0)),
            Point::new(1.0, 1.0)
        );
    }

    #[test]
    fn extension_and_subtrails() {
        let mut scene = Scene::new();
        let (root, mid, leaf) = chain(&mut scene);
        let full = Trail::from_node(&scene, leaf);
        let short = Trail::new(vec![root, mid]);

        assert!(full.is_extension_of(&short, false));
        assert!(!short.is_extension_of(&full, true));
        assert!(!full.is_extension_of(&full, false));
        assert!(full.is_extension_of(&full, true));

        assert_eq!(full.subtrail_to(mid, false), Some(short.clone()));
        assert_eq!(full.subtrail_to(mid, true), Some(Trail::new(vec![root])));
    }

    /// `root` with children `a` (holding `a1`, `a2`) and `b`.
    fn branched(scene: &mut Scene) -> [NodeId; 5] {
        let root = scene.create_node();
        let a = scene.create_node();
        let a1 = scene.create_node();
        let a2 = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a);
        scene.add_child(root, b);
        scene.add_child(a, a1);
        scene.add_child(a, a2);
        [root, a, a1, a2, b]
    }

    #[test]
    fn compare_follows_paint_order() {
        let mut scene = Scene::new();
        let [root, a, a1, a2, b] = branched(&mut scene);
        let trail = |id| Trail::from_node(&scene, id);

        assert_eq!(trail(a1).compare(&scene, &trail(a1)), Ordering::Equal);
        assert!(trail(root).is_before(&scene, &trail(a)));
        assert!(trail(a).is_before(&scene, &trail(a1)));
        assert!(trail(a1).is_before(&scene, &trail(a2)));
        assert!(trail(a2).is_before(&scene, &trail(b)));
        assert!(trail(b).is_after(&scene, &trail(a1)));
        assert!(!trail(a1).is_after(&scene, &trail(b)));
    }

    #[test]
    fn next_and_previous_walk_the_whole_tree() {
        let mut scene = Scene::new();
        let [root, a, a1, a2, b] = branched(&mut scene);
        let order = [root, a, a1, a2, b];

        let mut forward = vec![root];
        let mut current = Trail::from_node(&scene, root);
        while let Some(next) = current.next(&scene) {
            forward.push(next.last_node().unwrap());
            current = next;
        }
        assert_eq!(forward, order);

        let mut backward = vec![b];
        let mut current = Trail::from_node(&scene, b);
        while let Some(previous) = current.previous(&scene) {
            assert_eq!(previous, Trail::from_node(&scene, previous.last_node().unwrap()));
            backward.push(previous.last_node().unwrap());
            current = previous;
        }
        backward.reverse();
        assert_eq!(backward, order);
    }

    #[test]
    fn painted_neighbours_skip_empty_nodes() {
        let mut scene = Scene::new();
        let [root, _a, a1, _a2, b] = branched(&mut scene);
        scene.set_content(a1, NodeContent::Shape(Area::rect(0.0, 0.0, 1.0, 1.0)));
        scene.set_content(b, NodeContent::Shape(Area::rect(0.0, 0.0, 1.0, 1.0)));
        scene.set_fill(a1, Color::BLACK);
        scene.set_fill(b, Color::BLACK);

        let from_root = Trail::from_node(&scene, root);
        assert_eq!(from_root.next_painted(&scene), Some(Trail::from_node(&scene, a1)));
        let from_b = Trail::from_node(&scene, b);
        assert_eq!(from_b.previous_painted(&scene), Some(Trail::from_node(&scene, a1)));
        assert_eq!(from_b.next_painted(&scene), None);
    }

    #[test]
    fn each_trail_under_can_skip_subtrees() {
        let mut scene = Scene::new();
        let [root, a, _a1, _a2, b] = branched(&mut scene);
        let mut seen = Vec::new();
        Trail::from_node(&scene, root).each_trail_under(&scene, |trail| {
            let last = trail.last_node().unwrap();
            seen.push(last);
            last == a
        });
        assert_eq!(seen, [root, a, b]);
    }

    #[test]
    fn matrix_to_crosses_branches() {
        let mut scene = Scene::new();
        let [root, a, a1, _a2, b] = branched(&mut scene);
        scene.set_translation(root, Vec2::new(100.0, 100.0));
        scene.set_translation(a, Vec2::new(10.0, 0.0));
        scene.scale(a1, 2.0);
        scene.set_translation(b, Vec2::new(0.0, 5.0));
        let from = Trail::from_node(&scene, a1);
        let to = Trail::from_node(&scene, b);

        assert_eq!(from.branch_index_to(&to), 1);
        let mapped = from.matrix_to(&scene, &to) * Point::new(1.0, 1.0);
        let global = from.local_to_global_point(&scene, Point::new(1.0, 1.0));
        let expected = to.global_to_local_point(&scene, global);
        assert!((mapped - expected).hypot() < 1e-9);
        assert_eq!(mapped, Point::new(12.0, -3.0));
    }

    #[test]
    fn bounds_convert_between_frames() {
        let mut scene = Scene::new();
        let [root, a, a1, _a2, _b] = branched(&mut scene);
        scene.set_translation(root, Vec2::new(5.0, 0.0));
        scene.scale(a, 2.0);
        scene.set_translation(a1, Vec2::new(0.0, 1.0));
        let trail = Trail::from_node(&scene, a1);

        let local = Rect::new(0.0, 0.0, 1.0, 1.0);
        let global = trail.local_to_global_bounds(&scene, local);
        assert_eq!(global, Rect::new(5.0, 2.0, 7.0, 4.0));
        assert_eq!(trail.global_to_local_bounds(&scene, global), local);
        assert_eq!(
            trail.parent_to_global_bounds(&scene, local),
            Rect::new(5.0, 0.0, 7.0, 2.0)
        );
    }

    #[test]
    fn pickability_prunes_on_any_node() {
        let mut scene = Scene::new();
        let [_root, a, a1, _a2, _b] = branched(&mut scene);
        let trail = Trail::from_node(&scene, a1);
        assert!(trail.is_pickable(&scene));
        scene.set_pickable(a, Some(false));
        assert!(!trail.is_pickable(&scene));
        scene.set_pickable(a, None);
        scene.set_visible(a1, false);
        assert!(!trail.is_pickable(&scene));
    }

    #[test]
    fn visibility_and_opacity_span_the_trail() {
        let mut scene = Scene::new();
        let (root, mid, leaf) = chain(&mut scene);
        scene.set_opacity(root, 0.5);
        scene.set_opacity(mid, 0.5);
        let trail = Trail::from_node(&scene, leaf);
        assert!((trail.opacity(&scene) - 0.25).abs() < 1e-6);
        assert!(trail.is_visible(&scene));
        scene.set_visible(mid, false);
        assert!(!trail.is_visible(&scene));
    }
}
