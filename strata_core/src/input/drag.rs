// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragging a node with a pointer.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Vec2};

use super::{CaptureId, InputEvent, InputListener, PointerKind};
use crate::node::{NodeId, Scene, Trail};

/// A drag callback.
pub type DragCallback = Box<dyn Fn(&mut Scene, &DragEvent)>;

/// A translate callback.
pub type TranslateCallback = Box<dyn Fn(&mut Scene, &TranslateEvent)>;

/// Pointer position during a drag, in the dragged node's parent frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DragEvent {
    /// The node the handler is attached to.
    pub node: NodeId,
    /// Trail from the root to `node`, as captured at the start of the drag.
    pub trail: Trail,
    /// The dragging pointer.
    pub pointer_id: u32,
    /// Pointer position in the root's parent frame.
    pub global_point: Point,
    /// Pointer position in `node`'s parent frame.
    pub parent_point: Point,
    /// Movement since the previous event, in `node`'s parent frame.
    pub delta: Vec2,
}

/// A requested translation, in the dragged node's parent frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TranslateEvent {
    /// The node the handler is attached to.
    pub node: NodeId,
    /// Movement since the previous event.
    pub delta: Vec2,
    /// The node's translation before the move.
    pub old_position: Vec2,
    /// `old_position + delta`.
    pub position: Vec2,
}

struct ActiveDrag {
    pointer_id: u32,
    capture: CaptureId,
    node: NodeId,
    trail: Trail,
    last: Point,
}

/// Callbacks and settings for a [`SimpleDragHandler`].
#[derive(Default)]
pub struct DragOptions {
    /// Called when a drag starts.
    pub start: Option<DragCallback>,
    /// Called on every pointer move during a drag.
    pub drag: Option<DragCallback>,
    /// Called when the drag ends by release or cancellation.
    pub end: Option<DragCallback>,
    /// Replaces the default node translation.
    pub translate: Option<TranslateCallback>,
    /// Lets a touch that is already down start a drag by sliding onto the
    /// node.
    pub allow_touch_snag: bool,
    /// Mouse button that starts a drag.
    pub mouse_button: u8,
}

impl fmt::Debug for DragOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragOptions")
            .field("start", &self.start.is_some())
            .field("drag", &self.drag.is_some())
            .field("end", &self.end.is_some())
            .field("translate", &self.translate.is_some())
            .field("allow_touch_snag", &self.allow_touch_snag)
            .field("mouse_button", &self.mouse_button)
            .finish()
    }
}

struct DragInner {
    options: DragOptions,
    active: RefCell<Option<ActiveDrag>>,
    dragging: Cell<bool>,
}

/// Moves a node, or reports movement, while a pointer drags it.
///
/// Attach the handler to the node to drag. Pressing a pointer on the node
/// starts a drag and captures the pointer, so moves are tracked wherever
/// the pointer goes until it is released or cancelled.
///
/// Positions and deltas are in the dragged node's parent frame. With no
/// `translate` and no `drag` callback the node itself follows the pointer;
/// a `translate` callback replaces that default.
///
/// ```
/// use std::rc::Rc;
///
/// use kurbo::{Point, Vec2};
/// use strata_core::geom::Area;
/// use strata_core::input::{Input, PointerKind, SimpleDragHandler};
/// use strata_core::node::{NodeContent, Scene};
/// use strata_core::paint::Color;
///
/// let mut scene = Scene::new();
/// let knob = scene.create_with_content(NodeContent::Shape(Area::circle(0.0, 0.0, 5.0)));
/// scene.set_fill(knob, Color::BLACK);
/// scene.add_input_listener(knob, Rc::new(SimpleDragHandler::default()));
///
/// let mut input = Input::new(knob);
/// input.pointer_down(&mut scene, 1, PointerKind::Mouse, Point::new(0.0, 0.0));
/// input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(30.0, 4.0));
/// input.pointer_up(&mut scene, 1, PointerKind::Mouse, Point::new(30.0, 4.0));
/// assert_eq!(scene.translation(knob), Vec2::new(30.0, 4.0));
/// ```
#[derive(Clone)]
pub struct SimpleDragHandler {
    inner: Rc<DragInner>,
}

impl fmt::Debug for SimpleDragHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleDragHandler")
            .field("options", &self.inner.options)
            .field("dragging", &self.inner.dragging.get())
            .finish_non_exhaustive()
    }
}

impl Default for SimpleDragHandler {
    fn default() -> Self {
        Self::new(DragOptions::default())
    }
}

impl SimpleDragHandler {
    /// Creates a handler. Clones share drag state.
    #[must_use]
    pub fn new(options: DragOptions) -> Self {
        Self {
            inner: Rc::new(DragInner {
                options,
                active: RefCell::new(None),
                dragging: Cell::new(false),
            }),
        }
    }

    /// Returns whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.inner.dragging.get()
    }
}

impl InputListener for SimpleDragHandler {
    fn down(&self, event: &mut InputEvent<'_>) {
        let options = &self.inner.options;
        if event.pointer_kind == PointerKind::Mouse && event.button != options.mouse_button {
            return;
        }
        DragInner::begin(&self.inner, event);
    }

    fn enter(&self, event: &mut InputEvent<'_>) {
        if self.inner.options.allow_touch_snag
            && event.pointer_kind == PointerKind::Touch
            && event.is_pointer_down()
        {
            DragInner::begin(&self.inner, event);
        }
    }
}

impl DragInner {
    fn begin(this: &Rc<Self>, event: &mut InputEvent<'_>) {
        if this.dragging.get() {
            return;
        }
        let Some(node) = event.current_target else {
            return;
        };
        let trail = event
            .trail
            .as_ref()
            .and_then(|t| t.subtrail_to(node, false))
            .unwrap_or_else(|| Trail::from_node(event.scene, node));
        let parent_point = trail.global_to_parent_point(event.scene, event.point);

        let listener: Rc<dyn InputListener> = this.clone();
        let capture = event.attach_pointer_listener(listener);
        this.active.replace(Some(ActiveDrag {
            pointer_id: event.pointer_id,
            capture,
            node,
            trail: trail.clone(),
            last: parent_point,
        }));
        this.dragging.set(true);
        event.handle();

        if let Some(start) = &this.options.start {
            start(event.scene, &DragEvent {
                node,
                trail,
                pointer_id: event.pointer_id,
                global_point: event.point,
                parent_point,
                delta: Vec2::ZERO,
            });
        }
    }

    /// Advances the drag to the event's point and returns the drag event.
    fn advance(&self, event: &mut InputEvent<'_>) -> Option<DragEvent> {
        let mut active = self.active.borrow_mut();
        let drag = active.as_mut().filter(|a| a.pointer_id == event.pointer_id)?;
        if !event.scene.is_alive(drag.node) {
            return None;
        }
        let parent_point = drag.trail.global_to_parent_point(event.scene, event.point);
        let delta = parent_point - drag.last;
        drag.last = parent_point;
        Some(DragEvent {
            node: drag.node,
            trail: drag.trail.clone(),
            pointer_id: event.pointer_id,
            global_point: event.point,
            parent_point,
            delta,
        })
    }

    fn finish(&self, event: &mut InputEvent<'_>) {
        let Some(drag) = self.active.borrow_mut().take() else {
            return;
        };
        if drag.pointer_id != event.pointer_id {
            self.active.replace(Some(drag));
            return;
        }
        event.detach_pointer_listener(drag.capture);
        self.dragging.set(false);

        if let Some(end) = &self.options.end {
            let parent_point = if event.scene.is_alive(drag.node) {
                drag.trail.global_to_parent_point(event.scene, event.point)
            } else {
                drag.last
            };
            end(event.scene, &DragEvent {
                node: drag.node,
                trail: drag.trail,
                pointer_id: event.pointer_id,
                global_point: event.point,
                parent_point,
                delta: parent_point - drag.last,
            });
        }
    }
}

impl InputListener for DragInner {
    fn moved(&self, event: &mut InputEvent<'_>) {
        let Some(drag) = self.advance(event) else {
            return;
        };

        if let Some(translate) = &self.options.translate {
            let old_position = event.scene.translation(drag.node);
            translate(event.scene, &TranslateEvent {
                node: drag.node,
                delta: drag.delta,
                old_position,
                position: old_position + drag.delta,
            });
        } else if self.options.drag.is_none() {
            event.scene.translate(drag.node, drag.delta);
        }
        if let Some(on_drag) = &self.options.drag {
            on_drag(event.scene, &drag);
        }
    }

    fn up(&self, event: &mut InputEvent<'_>) {
        if event.pointer_kind == PointerKind::Mouse && event.button != self.options.mouse_button {
            return;
        }
        self.finish(event);
    }

    fn cancel(&self, event: &mut InputEvent<'_>) {
        self.finish(event);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::geom::Area;
    use crate::input::Input;
    use crate::node::NodeContent;
    use crate::paint::Color;

    fn scene_with_knob() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let parent = scene.create_node();
        let knob = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 10.0, 10.0)));
        scene.set_fill(knob, Color::BLACK);
        scene.add_child(root, parent);
        scene.add_child(parent, knob);
        // Parent frame is scaled so deltas differ from global deltas.
        scene.scale(parent, 2.0);
        (scene, root, knob)
    }

    #[test]
    fn default_translation_follows_pointer_in_parent_frame() {
        let (mut scene, root, knob) = scene_with_knob();
        let handler = SimpleDragHandler::default();
        scene.add_input_listener(knob, Rc::new(handler.clone()));
        let mut input = Input::new(root);

        input.pointer_down(&mut scene, 1, PointerKind::Mouse, Point::new(4.0, 4.0));
        assert!(handler.is_dragging());
        // Far outside the knob: the captured pointer still drives the drag.
        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(104.0, 24.0));
        assert_eq!(scene.translation(knob), Vec2::new(50.0, 10.0));
        input.pointer_up(&mut scene, 1, PointerKind::Mouse, Point::new(104.0, 24.0));
        assert!(!handler.is_dragging());

        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(200.0, 24.0));
        assert_eq!(scene.translation(knob), Vec2::new(50.0, 10.0));
    }

    #[test]
    fn callbacks_receive_parent_frame_positions() {
        let (mut scene, root, knob) = scene_with_knob();
        let log: Rc<RefCell<Vec<(&'static str, Point, Vec2)>>> = Rc::default();
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
        let handler = SimpleDragHandler::new(DragOptions {
            start: Some(Box::new(move |_, e| {
                l1.borrow_mut().push(("start", e.parent_point, e.delta));
            })),
            drag: Some(Box::new(move |_, e| {
                l2.borrow_mut().push(("drag", e.parent_point, e.delta));
            })),
            end: Some(Box::new(move |_, e| {
                l3.borrow_mut().push(("end", e.parent_point, e.delta));
            })),
            ..DragOptions::default()
        });
        scene.add_input_listener(knob, Rc::new(handler));
        let mut input = Input::new(root);

        input.pointer_down(&mut scene, 1, PointerKind::Mouse, Point::new(2.0, 2.0));
        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(6.0, 2.0));
        input.pointer_up(&mut scene, 1, PointerKind::Mouse, Point::new(6.0, 2.0));

        assert_eq!(
            *log.borrow(),
            [
                ("start", Point::new(1.0, 1.0), Vec2::ZERO),
                ("drag", Point::new(3.0, 1.0), Vec2::new(2.0, 0.0)),
                ("end", Point::new(3.0, 1.0), Vec2::ZERO),
            ]
        );
        // A drag callback without translate leaves the node in place.
        assert_eq!(scene.translation(knob), Vec2::ZERO);
    }

    #[test]
    fn translate_callback_replaces_default() {
        let (mut scene, root, knob) = scene_with_knob();
        let moves: Rc<RefCell<Vec<TranslateEvent>>> = Rc::default();
        let sink = moves.clone();
        let handler = SimpleDragHandler::new(DragOptions {
            translate: Some(Box::new(move |_, e| sink.borrow_mut().push(*e))),
            ..DragOptions::default()
        });
        scene.add_input_listener(knob, Rc::new(handler));
        let mut input = Input::new(root);

        input.pointer_down(&mut scene, 1, PointerKind::Mouse, Point::new(2.0, 2.0));
        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(2.0, 12.0));
        let moves = moves.borrow();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].delta, Vec2::new(0.0, 5.0));
        assert_eq!(moves[0].position, Vec2::new(0.0, 5.0));
        assert_eq!(scene.translation(knob), Vec2::ZERO);
    }

    #[test]
    fn touch_snag_starts_drag_on_enter() {
        let (mut scene, root, knob) = scene_with_knob();
        let handler = SimpleDragHandler::new(DragOptions {
            allow_touch_snag: true,
            ..DragOptions::default()
        });
        scene.add_input_listener(knob, Rc::new(handler.clone()));
        let mut input = Input::new(root);

        input.pointer_down(&mut scene, 3, PointerKind::Touch, Point::new(-50.0, -50.0));
        assert!(!handler.is_dragging());
        input.pointer_move(&mut scene, 3, PointerKind::Touch, Point::new(4.0, 4.0));
        assert!(handler.is_dragging());
        input.pointer_cancel(&mut scene, 3);
        assert!(!handler.is_dragging());
    }

    #[test]
    fn other_mouse_buttons_are_ignored() {
        let (mut scene, root, knob) = scene_with_knob();
        let handler = SimpleDragHandler::default();
        scene.add_input_listener(knob, Rc::new(handler.clone()));
        let mut input = Input::new(root);
        input.dispatch(&mut scene, crate::input::PointerEvent {
            kind: crate::input::PointerEventKind::Down,
            pointer_id: 1,
            pointer_kind: PointerKind::Mouse,
            point: Point::new(4.0, 4.0),
            button: 2,
        });
        assert!(!handler.is_dragging());
    }
}
