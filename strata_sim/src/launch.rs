// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Launching a simulation once its assets are in.

use std::cell::Cell;
use std::rc::Rc;

use crate::asset::{AssetGate, AssetReport, WaitId};

/// Errors from launching or building a simulation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    /// [`LaunchGuard::launch`] was called a second time.
    #[error("the simulation was already launched")]
    AlreadyLaunched,
    /// A simulation needs at least one screen.
    #[error("a simulation needs at least one screen")]
    NoScreens,
    /// The initial screen index does not name a screen.
    #[error("screen index {index} is out of range for {count} screens")]
    ScreenIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of screens.
        count: usize,
    },
}

/// Makes sure a simulation is launched exactly once.
///
/// Create one guard at startup and hand it to the code that boots the
/// simulation. The first [`launch`](Self::launch) succeeds; later calls
/// fail with [`LaunchError::AlreadyLaunched`].
#[derive(Debug, Default)]
pub struct LaunchGuard {
    launched: bool,
}

impl LaunchGuard {
    /// Creates a guard that has not launched anything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` after a successful [`launch`](Self::launch).
    #[must_use]
    pub fn is_launched(&self) -> bool {
        self.launched
    }

    /// Runs `start` once every asset declared on `gate` has resolved.
    ///
    /// Failed assets do not stop the launch; they are listed in the
    /// [`AssetReport`] passed to `start`.
    pub fn launch(
        &mut self,
        gate: &AssetGate,
        start: impl FnOnce(&AssetReport) + 'static,
    ) -> Result<PendingLaunch, LaunchError> {
        if self.launched {
            return Err(LaunchError::AlreadyLaunched);
        }
        self.launched = true;

        let started = Rc::new(Cell::new(false));
        let flag = started.clone();
        let wait = gate.on_ready(move |report| {
            if !report.is_complete() {
                log::warn!(
                    "launching with {} missing assets",
                    report.failed.len()
                );
            }
            flag.set(true);
            start(report);
        });
        Ok(PendingLaunch {
            gate: gate.clone(),
            wait,
            started,
        })
    }
}

/// A launch waiting on its assets.
#[derive(Debug)]
pub struct PendingLaunch {
    gate: AssetGate,
    wait: WaitId,
    started: Rc<Cell<bool>>,
}

impl PendingLaunch {
    /// Returns `true` once the start callback has run.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.started.get()
    }

    /// Drops the start callback if it has not run.
    ///
    /// Returns `false` when the simulation already started.
    pub fn cancel(self) -> bool {
        self.gate.cancel(self.wait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_launch_is_rejected() {
        let mut guard = LaunchGuard::new();
        let gate = AssetGate::new();
        let launch = guard.launch(&gate, |_| {}).unwrap();
        assert!(launch.has_started());
        assert!(guard.is_launched());
        assert_eq!(
            guard.launch(&gate, |_| {}).unwrap_err(),
            LaunchError::AlreadyLaunched
        );
    }

    #[test]
    fn start_waits_for_assets_and_tolerates_failures() {
        let mut guard = LaunchGuard::new();
        let gate = AssetGate::new();
        let icon = gate.declare("icon.png");
        let failures = Rc::new(Cell::new(usize::MAX));
        let seen = failures.clone();
        let launch = guard
            .launch(&gate, move |report| seen.set(report.failed.len()))
            .unwrap();
        assert!(!launch.has_started());

        gate.resolve(icon, Err("decode error".into()), 0);
        assert!(launch.has_started());
        assert_eq!(failures.get(), 1);
        assert!(!launch.cancel());
    }

    #[test]
    fn cancelled_launch_never_starts() {
        let mut guard = LaunchGuard::new();
        let gate = AssetGate::new();
        let icon = gate.declare("icon.png");
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let launch = guard.launch(&gate, move |_| flag.set(true)).unwrap();
        assert!(launch.cancel());
        gate.resolve(icon, Ok(()), 0);
        assert!(!ran.get());
    }

    #[test]
    fn errors_describe_themselves() {
        let err = LaunchError::ScreenIndexOutOfRange { index: 3, count: 2 };
        assert_eq!(
            err.to_string(),
            "screen index 3 is out of range for 2 screens"
        );
    }
}
