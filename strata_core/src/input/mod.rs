// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer input: listeners, events, and dispatch.
//!
//! [`Input`] turns raw pointer events into listener calls:
//!
//! - Each event is hit tested from the root with
//!   [`Scene::trail_under_point`]; touch pointers use touch areas.
//! - Changes of the hovered trail fire `exit` (deepest first) and `enter`
//!   (root first) on the nodes that left or joined it. These do not bubble.
//! - `down`, `up`, `moved`, and `cancel` go first to listeners attached to
//!   the pointer itself (see [`InputEvent::attach_pointer_listener`]), then
//!   bubble from the deepest hit node to the root. Calling
//!   [`InputEvent::handle`] stops the bubbling after the current node.
//!
//! Listener lists are snapshotted before each call, so listeners may add or
//! remove listeners (and nodes) while an event is being dispatched.

mod down_up;
mod drag;

use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::Point;

use crate::node::{HitOptions, NodeId, Scene, Trail};

pub use down_up::{DownUpCallback, DownUpEvent, DownUpListener, DownUpOptions};
pub use drag::{
    DragCallback, DragEvent, DragOptions, SimpleDragHandler, TranslateCallback, TranslateEvent,
};

/// The primary mouse button.
pub const PRIMARY_BUTTON: u8 = 0;

/// Receives pointer events for a node or a pointer.
///
/// Every method defaults to doing nothing.
pub trait InputListener {
    /// A pointer was pressed.
    fn down(&self, event: &mut InputEvent<'_>) {
        _ = event;
    }

    /// A pointer was released.
    fn up(&self, event: &mut InputEvent<'_>) {
        _ = event;
    }

    /// A pointer moved.
    fn moved(&self, event: &mut InputEvent<'_>) {
        _ = event;
    }

    /// A pointer started hovering the node.
    fn enter(&self, event: &mut InputEvent<'_>) {
        _ = event;
    }

    /// A pointer stopped hovering the node.
    fn exit(&self, event: &mut InputEvent<'_>) {
        _ = event;
    }

    /// The pointer was cancelled by the platform.
    fn cancel(&self, event: &mut InputEvent<'_>) {
        _ = event;
    }
}

/// What produced a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A mouse.
    Mouse,
    /// A finger on a touch surface.
    Touch,
    /// A stylus.
    Pen,
}

/// Kinds of raw pointer events fed to [`Input::dispatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Pressed.
    Down,
    /// Released.
    Up,
    /// Moved.
    Move,
    /// Cancelled.
    Cancel,
}

/// A raw pointer event in the root's parent frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Event kind.
    pub kind: PointerEventKind,
    /// Platform pointer identifier.
    pub pointer_id: u32,
    /// Device kind.
    pub pointer_kind: PointerKind,
    /// Position.
    pub point: Point,
    /// Mouse button for down and up events.
    pub button: u8,
}

/// Identifies a listener attached to a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CaptureId(u64);

/// Per-pointer dispatch state.
pub(crate) struct PointerState {
    id: u32,
    kind: PointerKind,
    point: Point,
    trail: Option<Trail>,
    is_down: bool,
    listeners: Vec<(CaptureId, Rc<dyn InputListener>)>,
    next_capture: u64,
}

impl PointerState {
    fn new(id: u32, kind: PointerKind) -> Self {
        Self {
            id,
            kind,
            point: Point::ZERO,
            trail: None,
            is_down: false,
            listeners: Vec::new(),
            next_capture: 0,
        }
    }

    fn is_attached(&self, listener: &Rc<dyn InputListener>) -> bool {
        self.listeners.iter().any(|(_, l)| Rc::ptr_eq(l, listener))
    }
}

/// An event as seen by an [`InputListener`].
pub struct InputEvent<'a> {
    /// The scene, for reading and mutating nodes.
    pub scene: &'a mut Scene,
    /// Platform pointer identifier.
    pub pointer_id: u32,
    /// Device kind.
    pub pointer_kind: PointerKind,
    /// Mouse button for down and up events.
    pub button: u8,
    /// Pointer position in the root's parent frame.
    pub point: Point,
    /// Trail to the deepest node under the pointer, if any.
    pub trail: Option<Trail>,
    /// The node whose listener is running; `None` for pointer listeners.
    pub current_target: Option<NodeId>,
    handled: bool,
    pointer: &'a mut PointerState,
}

impl core::fmt::Debug for InputEvent<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InputEvent")
            .field("pointer_id", &self.pointer_id)
            .field("pointer_kind", &self.pointer_kind)
            .field("button", &self.button)
            .field("point", &self.point)
            .field("trail", &self.trail)
            .field("current_target", &self.current_target)
            .field("handled", &self.handled)
            .finish_non_exhaustive()
    }
}

impl InputEvent<'_> {
    /// Stops bubbling after the current node's listeners.
    pub fn handle(&mut self) {
        self.handled = true;
    }

    /// Returns whether [`handle`](Self::handle) was called.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Returns whether the pointer is pressed.
    #[must_use]
    pub fn is_pointer_down(&self) -> bool {
        self.pointer.is_down
    }

    /// Attaches a listener to the pointer so it receives every later event
    /// of this pointer, wherever it is.
    pub fn attach_pointer_listener(&mut self, listener: Rc<dyn InputListener>) -> CaptureId {
        let id = CaptureId(self.pointer.next_capture);
        self.pointer.next_capture += 1;
        self.pointer.listeners.push((id, listener));
        id
    }

    /// Detaches a pointer listener; returns `false` if it was not attached.
    pub fn detach_pointer_listener(&mut self, id: CaptureId) -> bool {
        let before = self.pointer.listeners.len();
        self.pointer.listeners.retain(|(other, _)| *other != id);
        self.pointer.listeners.len() != before
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Down,
    Up,
    Move,
    Cancel,
    Enter,
    Exit,
}

impl Phase {
    fn call(self, listener: &dyn InputListener, event: &mut InputEvent<'_>) {
        match self {
            Self::Down => listener.down(event),
            Self::Up => listener.up(event),
            Self::Move => listener.moved(event),
            Self::Cancel => listener.cancel(event),
            Self::Enter => listener.enter(event),
            Self::Exit => listener.exit(event),
        }
    }
}

impl From<PointerEventKind> for Phase {
    fn from(kind: PointerEventKind) -> Self {
        match kind {
            PointerEventKind::Down => Self::Down,
            PointerEventKind::Up => Self::Up,
            PointerEventKind::Move => Self::Move,
            PointerEventKind::Cancel => Self::Cancel,
        }
    }
}

/// Dispatches pointer events into a scene rooted at one node.
pub struct Input {
    root: NodeId,
    pointers: Vec<PointerState>,
}

impl core::fmt::Debug for Input {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Input")
            .field("root", &self.root)
            .field("pointers", &self.pointers.len())
            .finish()
    }
}

impl Input {
    /// Creates a dispatcher for the subtree under `root`.
    #[must_use]
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            pointers: Vec::new(),
        }
    }

    /// The root node events are hit tested against.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Trail currently hovered by a pointer.
    #[must_use]
    pub fn hover_trail(&self, pointer_id: u32) -> Option<&Trail> {
        self.pointer(pointer_id)?.trail.as_ref()
    }

    /// Returns whether a pointer is pressed.
    #[must_use]
    pub fn is_pointer_down(&self, pointer_id: u32) -> bool {
        self.pointer(pointer_id).is_some_and(|p| p.is_down)
    }

    /// Last known position of a pointer.
    #[must_use]
    pub fn pointer_point(&self, pointer_id: u32) -> Option<Point> {
        self.pointer(pointer_id).map(|p| p.point)
    }

    /// Cursor of the deepest hovered node that sets one.
    #[must_use]
    pub fn cursor<'s>(&self, scene: &'s Scene, pointer_id: u32) -> Option<&'s str> {
        let trail = self.hover_trail(pointer_id)?;
        trail
            .nodes()
            .iter()
            .rev()
            .filter(|id| scene.is_alive(**id))
            .find_map(|id| scene.cursor(*id))
    }

    /// Presses a pointer with the primary button.
    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        pointer_id: u32,
        pointer_kind: PointerKind,
        point: Point,
    ) -> bool {
        self.dispatch(scene, PointerEvent {
            kind: PointerEventKind::Down,
            pointer_id,
            pointer_kind,
            point,
            button: PRIMARY_BUTTON,
        })
    }

    /// Releases a pointer's primary button.
    pub fn pointer_up(
        &mut self,
        scene: &mut Scene,
        pointer_id: u32,
        pointer_kind: PointerKind,
        point: Point,
    ) -> bool {
        self.dispatch(scene, PointerEvent {
            kind: PointerEventKind::Up,
            pointer_id,
            pointer_kind,
            point,
            button: PRIMARY_BUTTON,
        })
    }

    /// Moves a pointer.
    pub fn pointer_move(
        &mut self,
        scene: &mut Scene,
        pointer_id: u32,
        pointer_kind: PointerKind,
        point: Point,
    ) -> bool {
        self.dispatch(scene, PointerEvent {
            kind: PointerEventKind::Move,
            pointer_id,
            pointer_kind,
            point,
            button: PRIMARY_BUTTON,
        })
    }

    /// Cancels a pointer at its last known position.
    pub fn pointer_cancel(&mut self, scene: &mut Scene, pointer_id: u32) -> bool {
        let Some(state) = self.pointer(pointer_id) else {
            return false;
        };
        let (pointer_kind, point) = (state.kind, state.point);
        self.dispatch(scene, PointerEvent {
            kind: PointerEventKind::Cancel,
            pointer_id,
            pointer_kind,
            point,
            button: PRIMARY_BUTTON,
        })
    }

    /// Dispatches one raw event; returns whether a listener handled it.
    pub fn dispatch(&mut self, scene: &mut Scene, event: PointerEvent) -> bool {
        let root = self.root;
        let index = self.pointer_index(event.pointer_id, event.pointer_kind);
        let state = &mut self.pointers[index];
        state.point = event.point;

        let trail = if event.kind == PointerEventKind::Cancel || !scene.is_alive(root) {
            state.trail.clone()
        } else {
            let options = HitOptions {
                is_touch: event.pointer_kind == PointerKind::Touch,
            };
            scene.trail_under_point(root, event.point, options)
        };
        match event.kind {
            PointerEventKind::Down => state.is_down = true,
            PointerEventKind::Up | PointerEventKind::Cancel => state.is_down = false,
            PointerEventKind::Move => {}
        }

        let previous = core::mem::replace(&mut state.trail, trail.clone());
        update_hover(scene, state, &event, previous.as_ref(), trail.as_ref());
        let handled = dispatch_event(scene, state, &event, trail);

        let ended = matches!(
            event.kind,
            PointerEventKind::Up | PointerEventKind::Cancel
        );
        if ended && event.pointer_kind == PointerKind::Touch {
            // Lifted fingers stop hovering and release their state.
            let state = &mut self.pointers[index];
            let hovered = state.trail.take();
            update_hover(scene, state, &event, hovered.as_ref(), None);
            self.pointers.remove(index);
        }
        handled
    }

    fn pointer(&self, pointer_id: u32) -> Option<&PointerState> {
        self.pointers.iter().find(|p| p.id == pointer_id)
    }

    fn pointer_index(&mut self, pointer_id: u32, kind: PointerKind) -> usize {
        if let Some(index) = self.pointers.iter().position(|p| p.id == pointer_id) {
            return index;
        }
        self.pointers.push(PointerState::new(pointer_id, kind));
        self.pointers.len() - 1
    }
}

/// Fires `exit` and `enter` on nodes that left or joined the hovered trail.
fn update_hover(
    scene: &mut Scene,
    pointer: &mut PointerState,
    event: &PointerEvent,
    previous: Option<&Trail>,
    current: Option<&Trail>,
) {
    let old = previous.map(Trail::nodes).unwrap_or_default();
    let new = current.map(Trail::nodes).unwrap_or_default();
    let common = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    if common == old.len() && common == new.len() {
        return;
    }

    let exits: Vec<NodeId> = old[common..].iter().rev().copied().collect();
    let enters: Vec<NodeId> = new[common..].to_vec();
    for node in exits {
        dispatch_to_node(scene, pointer, event, current.cloned(), node, Phase::Exit);
    }
    for node in enters {
        dispatch_to_node(scene, pointer, event, current.cloned(), node, Phase::Enter);
    }
}

/// Runs one node's listeners; returns whether one of them handled the event.
fn dispatch_to_node(
    scene: &mut Scene,
    pointer: &mut PointerState,
    raw: &PointerEvent,
    trail: Option<Trail>,
    node: NodeId,
    phase: Phase,
) -> bool {
    if !scene.is_alive(node) {
        return false;
    }
    let listeners = scene.input_listeners(node);
    if listeners.is_empty() {
        return false;
    }
    let mut event = InputEvent {
        scene,
        pointer_id: raw.pointer_id,
        pointer_kind: raw.pointer_kind,
        button: raw.button,
        point: raw.point,
        trail,
        current_target: Some(node),
        handled: false,
        pointer,
    };
    for listener in &listeners {
        if !event.scene.is_alive(node) {
            break;
        }
        phase.call(listener.as_ref(), &mut event);
    }
    event.handled
}

/// Pointer listeners first, then bubbling from the deepest node.
fn dispatch_event(
    scene: &mut Scene,
    pointer: &mut PointerState,
    raw: &PointerEvent,
    trail: Option<Trail>,
) -> bool {
    let phase = Phase::from(raw.kind);
    let captured: Vec<Rc<dyn InputListener>> =
        pointer.listeners.iter().map(|(_, l)| l.clone()).collect();
    let path: Vec<NodeId> = trail
        .as_ref()
        .map(|t| t.nodes().to_vec())
        .unwrap_or_default();

    let mut event = InputEvent {
        scene,
        pointer_id: raw.pointer_id,
        pointer_kind: raw.pointer_kind,
        button: raw.button,
        point: raw.point,
        trail,
        current_target: None,
        handled: false,
        pointer,
    };
    for listener in &captured {
        if event.pointer.is_attached(listener) {
            phase.call(listener.as_ref(), &mut event);
        }
    }

    for node in path.into_iter().rev() {
        if event.handled {
            break;
        }
        if !event.scene.is_alive(node) {
            continue;
        }
        event.current_target = Some(node);
        for listener in event.scene.input_listeners(node) {
            if !event.scene.is_alive(node) {
                break;
            }
            phase.call(listener.as_ref(), &mut event);
        }
    }
    event.handled
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;
    use crate::geom::Area;
    use crate::node::NodeContent;
    use crate::paint::Color;

    struct Log {
        name: &'static str,
        calls: Rc<RefCell<Vec<String>>>,
        handle_down: bool,
    }

    impl Log {
        fn record(&self, what: &str) {
            self.calls
                .borrow_mut()
                .push(alloc::format!("{}:{what}", self.name));
        }
    }

    impl InputListener for Log {
        fn down(&self, event: &mut InputEvent<'_>) {
            self.record("down");
            if self.handle_down {
                event.handle();
            }
        }
        fn up(&self, _: &mut InputEvent<'_>) {
            self.record("up");
        }
        fn enter(&self, _: &mut InputEvent<'_>) {
            self.record("enter");
        }
        fn exit(&self, _: &mut InputEvent<'_>) {
            self.record("exit");
        }
    }

    fn square(scene: &mut Scene, x: f64) -> NodeId {
        let id = scene.create_with_content(NodeContent::Shape(Area::rect(x, 0.0, 10.0, 10.0)));
        scene.set_fill(id, Color::BLACK);
        id
    }

    fn setup() -> (Scene, NodeId, NodeId, NodeId, Rc<RefCell<Vec<String>>>) {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let a = square(&mut scene, 0.0);
        let b = square(&mut scene, 20.0);
        scene.add_child(root, a);
        scene.add_child(root, b);
        let calls = Rc::new(RefCell::new(Vec::new()));
        for (node, name) in [(root, "root"), (a, "a"), (b, "b")] {
            scene.add_input_listener(
                node,
                Rc::new(Log {
                    name,
                    calls: calls.clone(),
                    handle_down: false,
                }),
            );
        }
        (scene, root, a, b, calls)
    }

    #[test]
    fn events_bubble_to_root() {
        let (mut scene, root, _, _, calls) = setup();
        let mut input = Input::new(root);
        input.pointer_down(&mut scene, 1, PointerKind::Mouse, Point::new(5.0, 5.0));
        assert_eq!(
            *calls.borrow(),
            vec!["root:enter", "a:enter", "a:down", "root:down"]
        );
    }

    #[test]
    fn handled_events_stop_bubbling() {
        let (mut scene, root, a, _, calls) = setup();
        scene.add_input_listener(
            a,
            Rc::new(Log {
                name: "a2",
                calls: calls.clone(),
                handle_down: true,
            }),
        );
        let mut input = Input::new(root);
        assert!(input.pointer_down(&mut scene, 1, PointerKind::Mouse, Point::new(5.0, 5.0)));
        let calls = calls.borrow();
        assert_eq!(calls.last().map(String::as_str), Some("a2:down"));
        assert!(!calls.iter().any(|c| c == "root:down"));
    }

    #[test]
    fn hover_changes_fire_exit_then_enter() {
        let (mut scene, root, _, b, calls) = setup();
        let mut input = Input::new(root);
        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(5.0, 5.0));
        calls.borrow_mut().clear();
        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(25.0, 5.0));
        assert_eq!(*calls.borrow(), vec!["a:exit", "b:enter"]);
        assert_eq!(input.hover_trail(1).and_then(Trail::last_node), Some(b));

        calls.borrow_mut().clear();
        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(50.0, 50.0));
        assert_eq!(*calls.borrow(), vec!["b:exit", "root:exit"]);
        assert!(input.hover_trail(1).is_none());
    }

    #[test]
    fn lifted_touch_exits_and_forgets_pointer() {
        let (mut scene, root, _, _, calls) = setup();
        let mut input = Input::new(root);
        input.pointer_down(&mut scene, 7, PointerKind::Touch, Point::new(5.0, 5.0));
        calls.borrow_mut().clear();
        input.pointer_up(&mut scene, 7, PointerKind::Touch, Point::new(5.0, 5.0));
        assert_eq!(
            *calls.borrow(),
            vec!["a:up", "root:up", "a:exit", "root:exit"]
        );
        assert!(input.pointer_point(7).is_none());
    }

    #[test]
    fn cursor_comes_from_deepest_hovered_node() {
        let (mut scene, root, a, _, _) = setup();
        scene.set_cursor(root, Some("default".into()));
        scene.set_cursor(a, Some("pointer".into()));
        let mut input = Input::new(root);
        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(5.0, 5.0));
        assert_eq!(input.cursor(&scene, 1), Some("pointer"));
        input.pointer_move(&mut scene, 1, PointerKind::Mouse, Point::new(25.0, 5.0));
        assert_eq!(input.cursor(&scene, 1), Some("default"));
    }
}
