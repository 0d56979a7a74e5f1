// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press/release tracking for button-like nodes.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use kurbo::Point;

use super::{CaptureId, InputEvent, InputListener, PointerKind};
use crate::node::{NodeId, Scene, Trail};

/// A down/up callback.
pub type DownUpCallback = Box<dyn Fn(&mut Scene, &DownUpEvent)>;

/// Passed to [`DownUpListener`] callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct DownUpEvent {
    /// The node the listener is attached to.
    pub node: NodeId,
    /// Trail from the root to `node`, captured on press.
    pub trail: Trail,
    /// The pressing pointer.
    pub pointer_id: u32,
    /// Pointer position in the root's parent frame.
    pub point: Point,
}

/// Callbacks and settings for a [`DownUpListener`].
#[derive(Default)]
pub struct DownUpOptions {
    /// The pointer was pressed on the node.
    pub down: Option<DownUpCallback>,
    /// The pointer was released, wherever it is. Runs after `up_inside` or
    /// `up_outside`.
    pub up: Option<DownUpCallback>,
    /// Released while the node (or a descendant) is the topmost node under
    /// the pointer.
    pub up_inside: Option<DownUpCallback>,
    /// Released anywhere else, or cancelled.
    pub up_outside: Option<DownUpCallback>,
    /// Mouse button to track.
    pub mouse_button: u8,
}

impl fmt::Debug for DownUpOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownUpOptions")
            .field("down", &self.down.is_some())
            .field("up", &self.up.is_some())
            .field("up_inside", &self.up_inside.is_some())
            .field("up_outside", &self.up_outside.is_some())
            .field("mouse_button", &self.mouse_button)
            .finish()
    }
}

struct Pressed {
    pointer_id: u32,
    capture: CaptureId,
    node: NodeId,
    trail: Trail,
}

struct DownUpInner {
    options: DownUpOptions,
    pressed: RefCell<Option<Pressed>>,
}

/// Reports presses and releases on a node, such as a button.
///
/// Only one pointer at a time can press the node. On press the listener
/// captures the pointer, so the release is seen wherever it happens.
#[derive(Clone)]
pub struct DownUpListener {
    inner: Rc<DownUpInner>,
}

impl fmt::Debug for DownUpListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownUpListener")
            .field("options", &self.inner.options)
            .field("is_down", &self.is_down())
            .finish()
    }
}

impl DownUpListener {
    /// Creates a listener. Clones share press state.
    #[must_use]
    pub fn new(options: DownUpOptions) -> Self {
        Self {
            inner: Rc::new(DownUpInner {
                options,
                pressed: RefCell::new(None),
            }),
        }
    }

    /// Returns whether a pointer is pressing the node.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.inner.pressed.borrow().is_some()
    }
}

impl InputListener for DownUpListener {
    fn down(&self, event: &mut InputEvent<'_>) {
        let inner = &self.inner;
        if inner.pressed.borrow().is_some() {
            return;
        }
        if event.pointer_kind == PointerKind::Mouse && event.button != inner.options.mouse_button
        {
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

        let listener: Rc<dyn InputListener> = inner.clone();
        let capture = event.attach_pointer_listener(listener);
        inner.pressed.replace(Some(Pressed {
            pointer_id: event.pointer_id,
            capture,
            node,
            trail: trail.clone(),
        }));

        if let Some(down) = &inner.options.down {
            down(event.scene, &DownUpEvent {
                node,
                trail,
                pointer_id: event.pointer_id,
                point: event.point,
            });
        }
    }
}

impl DownUpInner {
    fn release(&self, event: &mut InputEvent<'_>, cancelled: bool) {
        let Some(pressed) = self.pressed.borrow_mut().take() else {
            return;
        };
        if pressed.pointer_id != event.pointer_id {
            self.pressed.replace(Some(pressed));
            return;
        }
        event.detach_pointer_listener(pressed.capture);

        let inside = !cancelled
            && event
                .trail
                .as_ref()
                .is_some_and(|under| under.is_extension_of(&pressed.trail, true));
        let info = DownUpEvent {
            node: pressed.node,
            trail: pressed.trail,
            pointer_id: event.pointer_id,
            point: event.point,
        };
        let side = if inside {
            &self.options.up_inside
        } else {
            &self.options.up_outside
        };
        if let Some(callback) = side {
            callback(event.scene, &info);
        }
        if let Some(up) = &self.options.up {
            up(event.scene, &info);
        }
    }
}

impl InputListener for DownUpInner {
    fn up(&self, event: &mut InputEvent<'_>) {
        if event.pointer_kind == PointerKind::Mouse && event.button != self.options.mouse_button {
            return;
        }
        self.release(event, false);
    }

    fn cancel(&self, event: &mut InputEvent<'_>) {
        self.release(event, true);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::geom::Area;
    use crate::input::Input;
    use crate::node::NodeContent;
    use crate::paint::Color;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(log: &Log, name: &'static str) -> Option<DownUpCallback> {
        let log = log.clone();
        Some(Box::new(move |_, _| log.borrow_mut().push(name)))
    }

    fn button_scene(log: &Log) -> (Scene, NodeId, DownUpListener) {
        let mut scene = Scene::new();
        let root = scene.create_node();
        let button = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 10.0, 10.0)));
        scene.set_fill(button, Color::BLACK);
        let cover = scene.create_with_content(NodeContent::Shape(Area::rect(20.0, 0.0, 10.0, 10.0)));
        scene.set_fill(cover, Color::BLACK);
        scene.add_child(root, button);
        scene.add_child(root, cover);

        let listener = DownUpListener::new(DownUpOptions {
            down: recorder(log, "down"),
            up: recorder(log, "up"),
            up_inside: recorder(log, "up_inside"),
            up_outside: recorder(log, "up_outside"),
            ..DownUpOptions::default()
        });
        scene.add_input_listener(button, Rc::new(listener.clone()));
        (scene, root, listener)
    }

    #[test]
    fn release_inside() {
        let log = Log::default();
        let (mut scene, root, listener) = button_scene(&log);
        let mut input = Input::new(root);
        input.pointer_down(&mut scene, 1, PointerKind::Mouse, Point::new(5.0, 5.0));
        assert!(listener.is_down());
        input.pointer_up(&mut scene, 1, PointerKind::Mouse, Point::new(6.0, 6.0));
        assert!(!listener.is_down());
        assert_eq!(*log.borrow(), vec!["down", "up_inside", "up"]);
    }

    #[test]
    fn release_over_another_node_is_outside() {
        let log = Log::default();
        let (mut scene, root, _) = button_scene(&log);
        let mut input = Input::new(root);
        input.pointer_down(&mut scene, 1, PointerKind::Mouse, Point::new(5.0, 5.0));
        input.pointer_up(&mut scene, 1, PointerKind::Mouse, Point::new(25.0, 5.0));
        assert_eq!(*log.borrow(), vec!["down", "up_outside", "up"]);
    }

    #[test]
    fn cancel_counts_as_outside() {
        let log = Log::default();
        let (mut scene, root, _) = button_scene(&log);
        let mut input = Input::new(root);
        input.pointer_down(&mut scene, 4, PointerKind::Touch, Point::new(5.0, 5.0));
        input.pointer_cancel(&mut scene, 4);
        assert_eq!(*log.borrow(), vec!["down", "up_outside", "up"]);
    }

    #[test]
    fn second_pointer_is_ignored_while_down() {
        let log = Log::default();
        let (mut scene, root, _) = button_scene(&log);
        let mut input = Input::new(root);
        input.pointer_down(&mut scene, 1, PointerKind::Touch, Point::new(5.0, 5.0));
        input.pointer_down(&mut scene, 2, PointerKind::Touch, Point::new(5.0, 5.0));
        input.pointer_up(&mut scene, 2, PointerKind::Touch, Point::new(5.0, 5.0));
        assert_eq!(*log.borrow(), vec!["down"]);
        input.pointer_up(&mut scene, 1, PointerKind::Touch, Point::new(5.0, 5.0));
        assert_eq!(*log.borrow(), vec!["down", "up_inside", "up"]);
    }
}
