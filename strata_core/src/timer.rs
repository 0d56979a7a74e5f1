// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driven timer.
//!
//! A [`Timer`] is stepped once per animation frame with the elapsed time in
//! seconds. Step listeners run in registration order; timeouts and intervals
//! are step listeners that count elapsed time, so their granularity is one
//! frame.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use strata_core::timer::Timer;
//!
//! let timer = Timer::new();
//! let fired = Rc::new(Cell::new(0));
//! let counter = fired.clone();
//! timer.set_interval(0.5, move || counter.set(counter.get() + 1));
//!
//! timer.step(1.25);
//! assert_eq!(fired.get(), 2);
//! timer.step(0.25);
//! assert_eq!(fired.get(), 3);
//! ```

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

/// Identifies a step listener, timeout, or interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

type StepListener = Rc<dyn Fn(f64)>;

#[derive(Default)]
struct TimerInner {
    listeners: RefCell<Vec<(TimerId, StepListener)>>,
    next_id: Cell<u64>,
    elapsed: Cell<f64>,
}

impl TimerInner {
    fn next_id(&self) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TimerId(id)
    }

    fn contains(&self, id: TimerId) -> bool {
        self.listeners.borrow().iter().any(|(i, _)| *i == id)
    }

    fn remove(&self, id: TimerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|(i, _)| *i == id) {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Per-frame step listener registry with timeout and interval helpers.
///
/// Cloning a `Timer` produces another handle to the same registry, so
/// listeners can hold a handle and unregister themselves.
#[derive(Clone, Default)]
pub struct Timer {
    inner: Rc<TimerInner>,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("listeners", &self.listener_count())
            .field("elapsed", &self.inner.elapsed.get())
            .finish_non_exhaustive()
    }
}

impl Timer {
    /// Creates an empty timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances time by `dt` seconds, calling every step listener.
    ///
    /// Listeners are called in registration order over a snapshot of the
    /// registry: a listener added during the step first runs on the next
    /// step, and a listener removed during the step is not called after its
    /// removal.
    ///
    /// A negative or non-finite `dt` is ignored: nothing is called and no
    /// time elapses.
    pub fn step(&self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring timer step of {dt}s");
            return;
        }
        self.inner.elapsed.set(self.inner.elapsed.get() + dt);
        let snapshot: Vec<(TimerId, StepListener)> = self.inner.listeners.borrow().clone();
        for (id, listener) in snapshot {
            if self.inner.contains(id) {
                listener(dt);
            }
        }
    }

    /// Total time stepped so far, in seconds.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.inner.elapsed.get()
    }

    /// Number of registered listeners, including pending timeouts and
    /// intervals.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Registers a listener called with `dt` on every step.
    pub fn add_step_listener(&self, listener: impl Fn(f64) + 'static) -> TimerId {
        let id = self.inner.next_id();
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Removes a step listener.
    ///
    /// Returns `false` if `id` is not registered; debug builds also fail an
    /// assertion.
    pub fn remove_step_listener(&self, id: TimerId) -> bool {
        let removed = self.inner.remove(id);
        debug_assert!(removed, "removing a step listener that is not registered");
        removed
    }

    /// Returns whether `id` is still registered.
    #[must_use]
    pub fn has_step_listener(&self, id: TimerId) -> bool {
        self.inner.contains(id)
    }

    /// Calls `callback` once, on the first step at which at least `delay`
    /// seconds have elapsed.
    pub fn set_timeout(&self, delay: f64, callback: impl FnOnce() + 'static) -> TimerId {
        let id = self.inner.next_id();
        let weak: Weak<TimerInner> = Rc::downgrade(&self.inner);
        let elapsed = Cell::new(0.0);
        let callback = RefCell::new(Some(callback));
        let listener = move |dt: f64| {
            elapsed.set(elapsed.get() + dt);
            if elapsed.get() < delay {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.remove(id);
            }
            if let Some(callback) = callback.borrow_mut().take() {
                callback();
            }
        };
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Cancels a timeout that has not fired yet.
    ///
    /// Returns `false` if it already fired or was cleared.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.inner.remove(id)
    }

    /// Calls `callback` every `interval` seconds.
    ///
    /// A long step fires the callback several times. The time left over after
    /// the last firing carries into the next step, so intervals do not drift.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is not strictly positive and finite.
    pub fn set_interval(&self, interval: f64, callback: impl Fn() + 'static) -> TimerId {
        assert!(
            interval > 0.0 && interval.is_finite(),
            "interval must be positive and finite, got {interval}"
        );
        let id = self.inner.next_id();
        let weak: Weak<TimerInner> = Rc::downgrade(&self.inner);
        let elapsed = Cell::new(0.0);
        let listener = move |dt: f64| {
            elapsed.set(elapsed.get() + dt);
            while elapsed.get() >= interval && weak.upgrade().is_some_and(|inner| inner.contains(id))
            {
                callback();
                elapsed.set(elapsed.get() - interval);
            }
        };
        self.inner.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Cancels an interval.
    ///
    /// Returns `false` if it was already cleared.
    pub fn clear_interval(&self, id: TimerId) -> bool {
        self.inner.remove(id)
    }
}
