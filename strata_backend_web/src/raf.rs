// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame loop.
//!
//! [`RafLoop`] drives a simulation using the browser's
//! `requestAnimationFrame` API. Each callback receives a
//! [`DOMHighResTimeStamp`][mdn] (milliseconds from `performance.now()`),
//! which is turned into a [`RafFrame`]: the elapsed time since the previous
//! frame in seconds and a microsecond timestamp for tracing.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods, so no
// Window object is fetched (and unwrapped) on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// One animation frame delivered by a [`RafLoop`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RafFrame {
    /// Frames delivered since the loop was created, starting at zero.
    pub frame_index: u64,
    /// The rAF timestamp in microseconds.
    pub timestamp_us: u64,
    /// Seconds since the previous frame; zero on the first frame after
    /// [`RafLoop::start`].
    pub dt: f64,
}

/// Seconds between two rAF timestamps given in milliseconds.
///
/// Returns zero without a previous timestamp and never goes negative.
pub(crate) fn frame_dt(previous_ms: Option<f64>, now_ms: f64) -> f64 {
    match previous_ms {
        Some(previous) => ((now_ms - previous) / 1000.0).max(0.0),
        None => 0.0,
    }
}

/// Converts a millisecond browser timestamp to whole microseconds.
pub(crate) fn ms_to_us(ms: f64) -> u64 {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "browser timestamps are small positive f64; µs fits in u64"
    )]
    let us = (ms * 1000.0) as u64;
    us
}

/// A `requestAnimationFrame` loop that emits [`RafFrame`]s.
///
/// Create with [`RafLoop::new`], then call [`start`](Self::start) to begin
/// receiving callbacks. The loop re-registers itself each frame until
/// [`stop`](Self::stop) is called or the `RafLoop` is dropped.
///
/// ```rust,ignore
/// let raf = RafLoop::new(move |frame| {
///     sim.step_frame(frame.dt, &mut presenter, &mut Tracer::none());
/// });
/// raf.start();
/// ```
pub struct RafLoop {
    inner: Rc<RafInner>,
}

type RafClosure = Closure<dyn FnMut(f64)>;

struct RafInner {
    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Kept in its own `RefCell` so it can reference itself from inside
    /// without conflicting with `callback`.
    closure: RefCell<Option<RafClosure>>,
    callback: RefCell<Box<dyn FnMut(RafFrame)>>,
    frame_counter: Cell<u64>,
    /// Timestamp of the previous frame; cleared on start so a paused
    /// period does not show up as one long frame.
    last_ms: Cell<Option<f64>>,
    running: Cell<bool>,
    /// ID of the most recent `requestAnimationFrame` call.
    raf_id: Cell<i32>,
}

impl RafLoop {
    /// Creates a new `RafLoop` that is **not yet running**.
    pub fn new(callback: impl FnMut(RafFrame) + 'static) -> Self {
        Self {
            inner: Rc::new(RafInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                frame_counter: Cell::new(0),
                last_ms: Cell::new(None),
                running: Cell::new(false),
                raf_id: Cell::new(0),
            }),
        }
    }

    /// Starts the animation loop.
    ///
    /// If already running, this is a no-op.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);
        self.inner.last_ms.set(None);

        if self.inner.closure.borrow().is_none() {
            let inner = Rc::clone(&self.inner);
            let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
                if !inner.running.get() {
                    return;
                }

                let frame_index = inner.frame_counter.get();
                inner.frame_counter.set(frame_index + 1);
                let dt = frame_dt(inner.last_ms.get(), timestamp_ms);
                inner.last_ms.set(Some(timestamp_ms));

                let frame = RafFrame {
                    frame_index,
                    timestamp_us: ms_to_us(timestamp_ms),
                    dt,
                };
                inner.callback.borrow_mut()(frame);

                if inner.running.get()
                    && let Some(ref closure) = *inner.closure.borrow()
                {
                    let id = request_animation_frame(closure.as_ref().unchecked_ref());
                    inner.raf_id.set(id);
                }
            }) as Box<dyn FnMut(f64)>);
            *self.inner.closure.borrow_mut() = Some(closure);
        }

        if let Some(ref closure) = *self.inner.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.inner.raf_id.set(id);
        }
    }

    /// Stops the animation loop.
    ///
    /// The pending `requestAnimationFrame` callback is cancelled. Can be
    /// restarted by calling [`start`](Self::start) again.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        cancel_animation_frame(self.inner.raf_id.get());
    }

    /// Returns `true` if the loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Frames delivered so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.inner.frame_counter.get()
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        // The closure holds an Rc to `inner`; dropping it breaks the cycle.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("running", &self.inner.running.get())
            .field("frame_counter", &self.inner.frame_counter.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_no_elapsed_time() {
        assert_eq!(frame_dt(None, 1_000.0), 0.0);
    }

    #[test]
    fn elapsed_time_is_in_seconds() {
        assert_eq!(frame_dt(Some(1_000.0), 1_250.0), 0.25);
        assert_eq!(frame_dt(Some(1_000.0), 990.0), 0.0);
    }

    #[test]
    fn timestamps_convert_to_microseconds() {
        assert_eq!(ms_to_us(16.5), 16_500);
        assert_eq!(ms_to_us(0.0), 0);
    }
}
