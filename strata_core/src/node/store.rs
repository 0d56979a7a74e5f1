// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and attribute management.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use kurbo::{Affine, Rect};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::content::NodeContent;
use super::id::{INVALID, NodeId};
use super::traverse::Children;
use crate::dirty;
use crate::geom::Area;
use crate::input::InputListener;
use crate::paint::Paint;
use crate::renderer::{Renderer, RendererMask};

/// Struct-of-arrays storage for every node of a scene graph.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays; destroyed nodes are recycled through a free list, and
/// generation counters make stale handles panic instead of aliasing a new
/// node.
///
/// Attribute setters mark the matching [`dirty`](crate::dirty) channel and
/// invalidate cached bounds when the attribute affects geometry. Computed
/// state (world transform, effective opacity and visibility) is refreshed by
/// [`evaluate`](Self::evaluate).
pub struct Scene {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local attributes (set by callers) --
    pub(crate) local_transform: Vec<Affine>,
    pub(crate) opacity: Vec<f32>,
    pub(crate) visible: Vec<bool>,
    pub(crate) pickable: Vec<Option<bool>>,
    pub(crate) content: Vec<NodeContent>,
    pub(crate) fill: Vec<Paint>,
    pub(crate) stroke: Vec<Paint>,
    pub(crate) line_width: Vec<f64>,
    pub(crate) cursor: Vec<Option<String>>,
    pub(crate) clip_area: Vec<Option<Area>>,
    pub(crate) touch_area: Vec<Option<Area>>,
    pub(crate) mouse_area: Vec<Option<Area>>,
    pub(crate) renderer: Vec<Option<Renderer>>,
    pub(crate) layer_split: Vec<bool>,
    pub(crate) input_listeners: Vec<Vec<Rc<dyn InputListener>>>,

    // -- Bounds cache (recomputed lazily on read) --
    pub(crate) bounds: Vec<Cell<Option<Rect>>>,
    pub(crate) bounds_valid: Vec<Cell<bool>>,

    // -- Computed attributes (written by evaluate) --
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) effective_opacity: Vec<f32>,
    pub(crate) effective_visible: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("traversal_order", &self.traversal_order)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            opacity: Vec::new(),
            visible: Vec::new(),
            pickable: Vec::new(),
            content: Vec::new(),
            fill: Vec::new(),
            stroke: Vec::new(),
            line_width: Vec::new(),
            cursor: Vec::new(),
            clip_area: Vec::new(),
            touch_area: Vec::new(),
            mouse_area: Vec::new(),
            renderer: Vec::new(),
            layer_split: Vec::new(),
            input_listeners: Vec::new(),
            bounds: Vec::new(),
            bounds_valid: Vec::new(),
            world_transform: Vec::new(),
            effective_opacity: Vec::new(),
            effective_visible: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new node and returns its handle.
    ///
    /// The node starts as an empty visible group with an identity transform,
    /// full opacity, no paints, and no parent.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.local_transform[i] = Affine::IDENTITY;
            self.opacity[i] = 1.0;
            self.visible[i] = true;
            self.pickable[i] = None;
            self.content[i] = NodeContent::Group;
            self.fill[i] = Paint::None;
            self.stroke[i] = Paint::None;
            self.line_width[i] = 1.0;
            self.cursor[i] = None;
            self.clip_area[i] = None;
            self.touch_area[i] = None;
            self.mouse_area[i] = None;
            self.renderer[i] = None;
            self.layer_split[i] = false;
            self.input_listeners[i].clear();
            self.bounds[i].set(None);
            self.bounds_valid[i].set(false);
            self.world_transform[i] = Affine::IDENTITY;
            self.effective_opacity[i] = 1.0;
            self.effective_visible[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_transform.push(Affine::IDENTITY);
            self.opacity.push(1.0);
            self.visible.push(true);
            self.pickable.push(None);
            self.content.push(NodeContent::Group);
            self.fill.push(Paint::None);
            self.stroke.push(Paint::None);
            self.line_width.push(1.0);
            self.cursor.push(None);
            self.clip_area.push(None);
            self.touch_area.push(None);
            self.mouse_area.push(None);
            self.renderer.push(None);
            self.layer_split.push(false);
            self.input_listeners.push(Vec::new());
            self.bounds.push(Cell::new(None));
            self.bounds_valid.push(Cell::new(false));
            self.world_transform.push(Affine::IDENTITY);
            self.effective_opacity.push(1.0);
            self.effective_visible.push(true);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a node painting `content`.
    pub fn create_with_content(&mut self, content: NodeContent) -> NodeId {
        let id = self.create_node();
        self.set_content(id, content);
        id
    }

    /// Creates a node filling [`Area::plane`] with `fill`.
    ///
    /// Planes are pickable, so a plane under a popup swallows pointer input
    /// aimed at what lies behind it.
    pub fn create_plane(&mut self, fill: impl Into<Paint>) -> NodeId {
        let id = self.create_with_content(NodeContent::Shape(Area::plane()));
        self.set_fill(id, fill);
        self.set_pickable(id, Some(true));
        id
    }

    /// Destroys a node, dropping its input listeners and freeing its slot.
    ///
    /// A node still attached to a parent is detached first.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            let p = self.parent[idx as usize];
            self.unlink_from_parent(idx);
            self.invalidate_bounds(p);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        self.dirty.remove_key(idx);
        self.input_listeners[idx as usize].clear();
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last (topmost) child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if `child` is `parent` or one of its ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let count = self.child_count(parent);
        self.insert_child(parent, count, child);
    }

    /// Inserts `child` so that it becomes the child at `index` of `parent`.
    ///
    /// Index `0` is painted first (bottom-most).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, if
    /// the insertion would create a cycle, or if `index` exceeds the child
    /// count.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            !self.is_self_or_ancestor(c, p),
            "adding {child:?} under {parent:?} would create a cycle"
        );

        let before = self.nth_child(p, index);
        self.parent[c as usize] = p;
        match before {
            Some(s) => {
                let prev = self.prev_sibling[s as usize];
                self.next_sibling[c as usize] = s;
                self.prev_sibling[c as usize] = prev;
                if prev == INVALID {
                    self.first_child[p as usize] = c;
                } else {
                    self.next_sibling[prev as usize] = c;
                }
                self.prev_sibling[s as usize] = c;
            }
            None => {
                let count = self.child_count_raw(p);
                assert!(
                    index == count,
                    "child index {index} out of range (child count {count})"
                );
                self.next_sibling[c as usize] = INVALID;
                self.prev_sibling[c as usize] = INVALID;
                if self.first_child[p as usize] == INVALID {
                    self.first_child[p as usize] = c;
                } else {
                    let mut last = self.first_child[p as usize];
                    while self.next_sibling[last as usize] != INVALID {
                        last = self.next_sibling[last as usize];
                    }
                    self.next_sibling[last as usize] = c;
                    self.prev_sibling[c as usize] = last;
                }
            }
        }

        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        let _ = self.dirty.add_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.invalidate_bounds(p);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `child` from `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == p,
            "{child:?} is not a child of {parent:?}"
        );

        self.unlink_from_parent(c);
        self.dirty.remove_dependency(c, p, dirty::TRANSFORM);
        self.dirty.remove_dependency(c, p, dirty::OPACITY);

        self.mark_subtree_inherited_dirty(c);
        self.invalidate_bounds(p);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes every child of `parent`, first to last.
    pub fn remove_all_children(&mut self, parent: NodeId) {
        let children: Vec<NodeId> = self.children(parent).collect();
        for child in children {
            self.remove_child(parent, child);
        }
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.handle(self.parent[id.idx as usize])
    }

    /// Returns an iterator over the direct children of a node, bottom-most first.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.validate(id);
        self.child_count_raw(id.idx)
    }

    /// Index of `child` among its parent's children.
    #[must_use]
    pub fn index_of_child(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).position(|other| other == child)
    }

    /// Returns whether `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.validate(ancestor);
        self.validate(id);
        self.is_self_or_ancestor(ancestor.idx, id.idx)
    }

    /// Returns all live nodes that have no parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|idx| self.parent[*idx as usize] == INVALID && !self.free_list.contains(idx))
            .map(|idx| NodeId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    /// Returns the live handle for raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> NodeId {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    // -- Attribute getters (no dirty marking) --

    /// Returns the node's own painted content.
    #[must_use]
    pub fn content(&self, id: NodeId) -> &NodeContent {
        self.validate(id);
        &self.content[id.idx as usize]
    }

    /// Returns the fill paint.
    #[must_use]
    pub fn fill(&self, id: NodeId) -> Paint {
        self.validate(id);
        self.fill[id.idx as usize].clone()
    }

    /// Returns the stroke paint.
    #[must_use]
    pub fn stroke(&self, id: NodeId) -> Paint {
        self.validate(id);
        self.stroke[id.idx as usize].clone()
    }

    /// Returns the stroke width.
    #[must_use]
    pub fn line_width(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.line_width[id.idx as usize]
    }

    /// Returns the node's own opacity.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.opacity[id.idx as usize]
    }

    /// Returns the node's own visibility flag.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Returns the pickability override; `None` means inherit the default.
    #[must_use]
    pub fn pickable(&self, id: NodeId) -> Option<bool> {
        self.validate(id);
        self.pickable[id.idx as usize]
    }

    /// Returns the cursor shown while hovering this node.
    #[must_use]
    pub fn cursor(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.cursor[id.idx as usize].as_deref()
    }

    /// Returns the clip area in the node's local frame.
    #[must_use]
    pub fn clip_area(&self, id: NodeId) -> Option<&Area> {
        self.validate(id);
        self.clip_area[id.idx as usize].as_ref()
    }

    /// Returns the touch hit area in the node's local frame.
    #[must_use]
    pub fn touch_area(&self, id: NodeId) -> Option<&Area> {
        self.validate(id);
        self.touch_area[id.idx as usize].as_ref()
    }

    /// Returns the mouse hit area in the node's local frame.
    #[must_use]
    pub fn mouse_area(&self, id: NodeId) -> Option<&Area> {
        self.validate(id);
        self.mouse_area[id.idx as usize].as_ref()
    }

    /// Returns the explicit renderer override.
    #[must_use]
    pub fn renderer(&self, id: NodeId) -> Option<Renderer> {
        self.validate(id);
        self.renderer[id.idx as usize]
    }

    /// Returns whether the node's subtree is forced into layers of its own.
    #[must_use]
    pub fn layer_split(&self, id: NodeId) -> bool {
        self.validate(id);
        self.layer_split[id.idx as usize]
    }

    /// Returns whether the node paints anything itself.
    #[must_use]
    pub fn is_painted(&self, id: NodeId) -> bool {
        self.validate(id);
        self.is_painted_at(id.idx)
    }

    /// Returns the computed world transform.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the computed product of ancestor opacities.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_opacity(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.effective_opacity[id.idx as usize]
    }

    /// Returns whether the node and all its ancestors are visible.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn effective_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.effective_visible[id.idx as usize]
    }

    // -- Mutation API (auto-marks dirty) --

    /// Replaces the node's painted content.
    pub fn set_content(&mut self, id: NodeId, content: NodeContent) {
        self.validate(id);
        self.content[id.idx as usize] = content;
        self.invalidate_bounds(id.idx);
        self.dirty.mark(id.idx, dirty::PAINT);
        self.dirty.mark(id.idx, dirty::RENDERER);
    }

    /// Sets the fill paint. Does not affect bounds.
    ///
    /// Switching between solid colors and gradients changes which renderers
    /// can draw the node.
    pub fn set_fill(&mut self, id: NodeId, fill: impl Into<Paint>) {
        self.validate(id);
        let fill = fill.into();
        let old = core::mem::replace(&mut self.fill[id.idx as usize], fill);
        if old.renderer_mask() != self.fill[id.idx as usize].renderer_mask() {
            self.dirty.mark(id.idx, dirty::RENDERER);
        }
        self.dirty.mark(id.idx, dirty::PAINT);
    }

    /// Sets the stroke paint.
    pub fn set_stroke(&mut self, id: NodeId, stroke: impl Into<Paint>) {
        self.validate(id);
        let stroke = stroke.into();
        let old = core::mem::replace(&mut self.stroke[id.idx as usize], stroke);
        if old.renderer_mask() != self.stroke[id.idx as usize].renderer_mask() {
            self.dirty.mark(id.idx, dirty::RENDERER);
        }
        self.invalidate_bounds(id.idx);
        self.dirty.mark(id.idx, dirty::PAINT);
    }

    /// Sets the stroke width.
    pub fn set_line_width(&mut self, id: NodeId, line_width: f64) {
        self.validate(id);
        debug_assert!(line_width >= 0.0, "negative line width {line_width}");
        self.line_width[id.idx as usize] = line_width;
        self.invalidate_bounds(id.idx);
        self.dirty.mark(id.idx, dirty::PAINT);
    }

    /// Sets the node's own opacity.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        self.validate(id);
        debug_assert!(
            (0.0..=1.0).contains(&opacity),
            "opacity {opacity} out of range"
        );
        self.opacity[id.idx as usize] = opacity;
        self.dirty.mark_with(id.idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Shows or hides the node and its subtree. Does not affect bounds.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        self.visible[id.idx as usize] = visible;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Sets the pickability override.
    pub fn set_pickable(&mut self, id: NodeId, pickable: Option<bool>) {
        self.validate(id);
        self.pickable[id.idx as usize] = pickable;
    }

    /// Sets the hover cursor.
    pub fn set_cursor(&mut self, id: NodeId, cursor: Option<String>) {
        self.validate(id);
        self.cursor[id.idx as usize] = cursor;
    }

    /// Sets the clip area, in the node's local frame.
    pub fn set_clip_area(&mut self, id: NodeId, area: Option<Area>) {
        self.validate(id);
        self.clip_area[id.idx as usize] = area;
        self.invalidate_bounds(id.idx);
        self.dirty.mark(id.idx, dirty::CLIP);
    }

    /// Sets the area that accepts touch input instead of the painted content.
    pub fn set_touch_area(&mut self, id: NodeId, area: Option<Area>) {
        self.validate(id);
        self.touch_area[id.idx as usize] = area;
    }

    /// Sets the area that accepts mouse input instead of the painted content.
    pub fn set_mouse_area(&mut self, id: NodeId, area: Option<Area>) {
        self.validate(id);
        self.mouse_area[id.idx as usize] = area;
    }

    /// Forces a renderer for this node and its descendants.
    pub fn set_renderer(&mut self, id: NodeId, renderer: Option<Renderer>) {
        self.validate(id);
        self.renderer[id.idx as usize] = renderer;
        self.dirty.mark(id.idx, dirty::RENDERER);
    }

    /// Isolates the node's subtree in its own layers.
    pub fn set_layer_split(&mut self, id: NodeId, split: bool) {
        self.validate(id);
        self.layer_split[id.idx as usize] = split;
        self.dirty.mark(id.idx, dirty::RENDERER);
    }

    /// Attaches an input listener. Listeners run in attachment order.
    pub fn add_input_listener(&mut self, id: NodeId, listener: Rc<dyn InputListener>) {
        self.validate(id);
        self.input_listeners[id.idx as usize].push(listener);
    }

    /// Detaches a listener previously passed to
    /// [`add_input_listener`](Self::add_input_listener).
    ///
    /// Returns `false` if it was not attached to this node.
    pub fn remove_input_listener(&mut self, id: NodeId, listener: &Rc<dyn InputListener>) -> bool {
        self.validate(id);
        let listeners = &mut self.input_listeners[id.idx as usize];
        let position = listeners.iter().position(|other| Rc::ptr_eq(other, listener));
        debug_assert!(position.is_some(), "input listener not attached to {id:?}");
        position.map(|index| listeners.remove(index)).is_some()
    }

    /// Returns a snapshot of the node's input listeners.
    #[must_use]
    pub fn input_listeners(&self, id: NodeId) -> Vec<Rc<dyn InputListener>> {
        self.validate(id);
        self.input_listeners[id.idx as usize].clone()
    }

    // -- Raw-index accessors for layer builders and painters --
    //
    // These accept raw slot indices (as found in `SceneChanges` or
    // `traversal_order()`) and skip generation validation.

    /// Returns the computed world transform at raw slot `idx`.
    #[must_use]
    pub fn world_transform_at(&self, idx: u32) -> Affine {
        self.world_transform[idx as usize]
    }

    /// Returns the computed effective opacity at raw slot `idx`.
    #[must_use]
    pub fn effective_opacity_at(&self, idx: u32) -> f32 {
        self.effective_opacity[idx as usize]
    }

    /// Returns whether the node at raw slot `idx` is effectively visible.
    #[must_use]
    pub fn effective_visible_at(&self, idx: u32) -> bool {
        self.effective_visible[idx as usize]
    }

    /// Returns the content at raw slot `idx`.
    #[must_use]
    pub fn content_at(&self, idx: u32) -> &NodeContent {
        &self.content[idx as usize]
    }

    /// Returns `(fill, stroke, line_width)` at raw slot `idx`.
    #[must_use]
    pub fn paints_at(&self, idx: u32) -> (Paint, Paint, f64) {
        let i = idx as usize;
        (self.fill[i].clone(), self.stroke[i].clone(), self.line_width[i])
    }

    /// Renderers able to draw the node at raw slot `idx`, from its content
    /// and the paints it is drawn with.
    #[must_use]
    pub fn renderer_mask_at(&self, idx: u32) -> RendererMask {
        let i = idx as usize;
        let content = &self.content[i];
        let mask = content.renderer_mask();
        match content {
            NodeContent::Shape(_) | NodeContent::Text { .. } => mask
                .intersection(self.fill[i].renderer_mask())
                .intersection(self.stroke[i].renderer_mask()),
            _ => mask,
        }
    }

    /// Returns the clip area at raw slot `idx`.
    #[must_use]
    pub fn clip_area_at(&self, idx: u32) -> Option<&Area> {
        self.clip_area[idx as usize].as_ref()
    }

    /// Returns the parent slot of `idx`, or [`INVALID`].
    #[must_use]
    pub fn parent_at(&self, idx: u32) -> u32 {
        self.parent[idx as usize]
    }

    /// Returns whether the node at raw slot `idx` paints anything itself.
    #[must_use]
    pub fn is_painted_at(&self, idx: u32) -> bool {
        let i = idx as usize;
        self.content[i].is_painted(&self.fill[i], &self.stroke[i])
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn handle(&self, idx: u32) -> Option<NodeId> {
        (idx != INVALID).then(|| NodeId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    fn child_count_raw(&self, idx: u32) -> usize {
        let mut count = 0;
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            count += 1;
            child = self.next_sibling[child as usize];
        }
        count
    }

    fn nth_child(&self, idx: u32, n: usize) -> Option<u32> {
        let mut child = self.first_child[idx as usize];
        for _ in 0..n {
            if child == INVALID {
                return None;
            }
            child = self.next_sibling[child as usize];
        }
        (child != INVALID).then_some(child)
    }

    fn is_self_or_ancestor(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev == INVALID {
            self.first_child[p as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Marks the subtree rooted at `idx` dirty for inherited channels.
    fn mark_subtree_inherited_dirty(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::OPACITY, &EagerPolicy);
    }

    /// Invalidates cached bounds of `idx` and every ancestor.
    ///
    /// An invalid node always has invalid ancestors, so the walk stops at the
    /// first node that is already invalid.
    pub(crate) fn invalidate_bounds(&self, mut idx: u32) {
        while idx != INVALID && self.bounds_valid[idx as usize].get() {
            self.bounds_valid[idx as usize].set(false);
            idx = self.parent[idx as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::paint::Color;

    #[test]
    fn create_and_destroy() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        assert!(scene.is_alive(id));
        assert_eq!(scene.node_count(), 1);
        scene.destroy_node(id);
        assert!(!scene.is_alive(id));
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut scene = Scene::new();
        let first = scene.create_node();
        scene.destroy_node(first);
        let second = scene.create_node();
        assert!(!scene.is_alive(first));
        assert!(scene.is_alive(second));
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
    }

    #[test]
    fn insert_child_orders_siblings() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();

        scene.add_child(parent, c);
        scene.insert_child(parent, 0, a);
        scene.insert_child(parent, 1, b);

        assert_eq!(scene.children(parent).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(scene.index_of_child(parent, b), Some(1));
        assert_eq!(scene.parent(b), Some(parent));
    }

    #[test]
    fn remove_child_detaches() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(parent, a);
        scene.add_child(parent, b);

        scene.remove_child(parent, a);
        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.children(parent).collect::<Vec<_>>(), vec![b]);

        scene.remove_all_children(parent);
        assert_eq!(scene.child_count(parent), 0);
        assert_eq!(scene.roots().len(), 3);
    }

    #[test]
    #[should_panic(expected = "child already has a parent")]
    fn double_parenting_panics() {
        let mut scene = Scene::new();
        let p1 = scene.create_node();
        let p2 = scene.create_node();
        let child = scene.create_node();
        scene.add_child(p1, child);
        scene.add_child(p2, child);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn cycles_are_rejected() {
        let mut scene = Scene::new();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(a, b);
        scene.add_child(b, a);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn insert_past_end_panics() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_node();
        scene.insert_child(parent, 2, child);
    }

    #[test]
    #[should_panic(expected = "is not a child of")]
    fn remove_non_child_panics() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let other = scene.create_node();
        scene.remove_child(parent, other);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_node();
        scene.add_child(parent, child);
        scene.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_read() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        scene.destroy_node(id);
        let _ = scene.opacity(id);
    }

    #[test]
    fn destroy_detaches_from_parent() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let child = scene.create_node();
        scene.add_child(parent, child);
        scene.destroy_node(child);
        assert_eq!(scene.child_count(parent), 0);
    }

    #[test]
    fn painted_state_follows_content_and_paint() {
        let mut scene = Scene::new();
        let id = scene.create_with_content(NodeContent::Shape(crate::geom::Area::rect(
            0.0, 0.0, 1.0, 1.0,
        )));
        assert!(!scene.is_painted(id));
        scene.set_fill(id, Color::BLACK);
        assert!(scene.is_painted(id));
    }
}
