// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed event series that are independent of the frame rate.
//!
//! An [`EventTimer`] fires a callback for every event that would have occurred
//! during a step, passing how long ago (relative to the end of the step) the
//! event should have happened. The spacing of events comes from an
//! [`EventModel`].
//!
//! ```
//! use strata_core::event_timer::{ConstantEventModel, EventTimer};
//!
//! let mut fired = Vec::new();
//! let mut timer = EventTimer::new(ConstantEventModel::new(1.0));
//! timer.step(1.5, |late| fired.push(late));
//! timer.step(6.0, |late| fired.push(late));
//! assert_eq!(fired, [0.5, 5.5, 4.5, 3.5, 2.5, 1.5, 0.5]);
//! ```

use core::fmt;

/// Decides the time between consecutive events.
pub trait EventModel {
    /// Returns the time before the next event. Must be positive.
    fn period_before_next_event(&mut self) -> f64;
}

impl<F: FnMut() -> f64> EventModel for F {
    fn period_before_next_event(&mut self) -> f64 {
        self()
    }
}

/// Events at a fixed rate: one every `1 / rate` time units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantEventModel {
    rate: f64,
}

impl ConstantEventModel {
    /// Creates a model firing `rate` events per time unit.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not strictly positive.
    #[must_use]
    pub fn new(rate: f64) -> Self {
        assert!(rate > 0.0, "event rate must be positive, got {rate}");
        Self { rate }
    }

    /// Events per time unit.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl EventModel for ConstantEventModel {
    fn period_before_next_event(&mut self) -> f64 {
        1.0 / self.rate
    }
}

/// Events averaging `rate` per time unit, with uniformly distributed spacing
/// in `[0, 2 / rate)`.
///
/// `random` must return uniformly distributed numbers in `[0, 1)`.
pub struct UniformEventModel<R> {
    rate: f64,
    random: R,
}

impl<R> fmt::Debug for UniformEventModel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformEventModel")
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}

impl<R: FnMut() -> f64> UniformEventModel<R> {
    /// Creates a model with the given average rate and random source.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not strictly positive.
    #[must_use]
    pub fn new(rate: f64, random: R) -> Self {
        assert!(rate > 0.0, "event rate must be positive, got {rate}");
        Self { rate, random }
    }
}

impl<R: FnMut() -> f64> EventModel for UniformEventModel<R> {
    fn period_before_next_event(&mut self) -> f64 {
        let u = (self.random)();
        debug_assert!((0.0..1.0).contains(&u), "random value {u} outside [0, 1)");
        u * 2.0 / self.rate
    }
}

/// Events of a Poisson process with the given rate.
///
/// The spacing between events is exponentially distributed. `random` must
/// return uniformly distributed numbers in `[0, 1)`.
pub struct PoissonEventModel<R> {
    rate: f64,
    random: R,
}

impl<R> fmt::Debug for PoissonEventModel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoissonEventModel")
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}

impl<R: FnMut() -> f64> PoissonEventModel<R> {
    /// Creates a model with the given rate and random source.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is not strictly positive.
    #[must_use]
    pub fn new(rate: f64, random: R) -> Self {
        assert!(rate > 0.0, "event rate must be positive, got {rate}");
        Self { rate, random }
    }
}

impl<R: FnMut() -> f64> EventModel for PoissonEventModel<R> {
    fn period_before_next_event(&mut self) -> f64 {
        let u = (self.random)();
        debug_assert!((0.0..1.0).contains(&u), "random value {u} outside [0, 1)");
        // 1 - u lies in (0, 1], so the log stays finite.
        -libm::log(1.0 - u) / self.rate
    }
}

/// Fires callbacks for the events an [`EventModel`] places in each step.
#[derive(Debug)]
pub struct EventTimer<M> {
    model: M,
    time_before_next_event: f64,
}

impl<M: EventModel> EventTimer<M> {
    /// Creates a timer and draws the time before its first event.
    #[must_use]
    pub fn new(mut model: M) -> Self {
        let time_before_next_event = model.period_before_next_event();
        Self {
            model,
            time_before_next_event,
        }
    }

    /// Advances by `dt`, calling `on_event(time_since_event)` once per event.
    ///
    /// An event landing exactly at the end of the step fires with `0.0`.
    /// A negative or non-finite `dt` is ignored.
    pub fn step(&mut self, mut dt: f64, mut on_event: impl FnMut(f64)) {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring event timer step of {dt}s");
            return;
        }
        while dt >= self.time_before_next_event {
            dt -= self.time_before_next_event;
            self.time_before_next_event = self.model.period_before_next_event();
            debug_assert!(
                self.time_before_next_event > 0.0,
                "event models must produce positive periods"
            );
            on_event(dt);
        }
        self.time_before_next_event -= dt;
    }

    /// Time left until the next event.
    #[must_use]
    pub fn time_before_next_event(&self) -> f64 {
        self.time_before_next_event
    }

    /// The event model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn collect<M: EventModel>(timer: &mut EventTimer<M>, dt: f64) -> Vec<f64> {
        let mut out = Vec::new();
        timer.step(dt, |late| out.push(late));
        out
    }

    #[test]
    fn constant_rate_fires_per_period() {
        let mut timer = EventTimer::new(ConstantEventModel::new(1.0));
        assert_eq!(collect(&mut timer, 1.5), vec![0.5]);
        assert_eq!(collect(&mut timer, 6.0), vec![5.5, 4.5, 3.5, 2.5, 1.5, 0.5]);
        assert!(collect(&mut timer, 0.0).is_empty());
        assert_eq!(collect(&mut timer, 1.5), vec![1.0, 0.0]);
    }

    #[test]
    fn uniform_model_scales_random_value() {
        let mut model = UniformEventModel::new(2.0, || 0.5);
        assert_eq!(model.period_before_next_event(), 0.5);
    }

    #[test]
    fn poisson_model_is_exponential() {
        let mut model = PoissonEventModel::new(2.0, || 0.0);
        assert_eq!(model.period_before_next_event(), 0.0);
        let mut model = PoissonEventModel::new(1.0, || 1.0 - 1.0 / core::f64::consts::E);
        approx::assert_relative_eq!(model.period_before_next_event(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn closure_models() {
        let mut periods = [0.25, 0.5].into_iter().cycle();
        let mut timer = EventTimer::new(move || periods.next().unwrap_or(1.0));
        assert_eq!(collect(&mut timer, 1.0), vec![0.75, 0.25, 0.0]);
    }

    #[test]
    fn non_finite_steps_fire_nothing() {
        let mut timer = EventTimer::new(ConstantEventModel::new(1.0));
        assert!(collect(&mut timer, f64::INFINITY).is_empty());
        assert!(collect(&mut timer, f64::NAN).is_empty());
        assert_eq!(timer.time_before_next_event(), 1.0);
        assert_eq!(collect(&mut timer, 1.0), vec![0.0]);
    }

    #[test]
    #[should_panic(expected = "event rate must be positive")]
    fn zero_rate_is_rejected() {
        let _ = ConstantEventModel::new(0.0);
    }
}
