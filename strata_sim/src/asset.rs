// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gating simulation start on asset loading.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use strata_core::trace::AssetResolvedEvent;

/// Handle to a declared asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(u32);

impl AssetId {
    /// Position of the asset in declaration order.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Identifies a callback registered with [`AssetGate::on_ready`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaitId(u64);

/// Load state of one asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetStatus {
    /// Still loading.
    Pending,
    /// Loaded successfully.
    Loaded,
    /// Failed with a message.
    Failed(String),
}

/// Outcome of loading every declared asset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetReport {
    /// Number of assets that loaded.
    pub loaded: usize,
    /// Names and messages of assets that failed.
    pub failed: Vec<(String, String)>,
}

impl AssetReport {
    /// Returns `true` if nothing failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

type ReadyFn = Box<dyn FnOnce(&AssetReport)>;

struct Asset {
    name: String,
    status: AssetStatus,
}

#[derive(Default)]
struct GateInner {
    assets: RefCell<Vec<Asset>>,
    waiters: RefCell<Vec<(WaitId, ReadyFn)>>,
    next_wait: Cell<u64>,
}

/// Waits for a set of assets to load.
///
/// Loaders [`declare`](Self::declare) each asset up front and
/// [`resolve`](Self::resolve) it when its load finishes. Once nothing is
/// pending, the ready callbacks run with an [`AssetReport`]. A failed load
/// is logged and reported but does not hold up the gate.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct AssetGate {
    inner: Rc<GateInner>,
}

impl fmt::Debug for AssetGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetGate")
            .field("assets", &self.inner.assets.borrow().len())
            .field("pending", &self.pending())
            .field("waiters", &self.inner.waiters.borrow().len())
            .finish()
    }
}

impl AssetGate {
    /// Creates a gate with no assets; it is ready immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an asset that must resolve before the gate opens.
    pub fn declare(&self, name: impl Into<String>) -> AssetId {
        let mut assets = self.inner.assets.borrow_mut();
        let id = u32::try_from(assets.len()).unwrap_or(u32::MAX);
        assets.push(Asset {
            name: name.into(),
            status: AssetStatus::Pending,
        });
        AssetId(id)
    }

    /// Name of a declared asset.
    #[must_use]
    pub fn name(&self, id: AssetId) -> Option<String> {
        let assets = self.inner.assets.borrow();
        assets.get(id.0 as usize).map(|a| a.name.clone())
    }

    /// Current status of a declared asset.
    #[must_use]
    pub fn status(&self, id: AssetId) -> Option<AssetStatus> {
        let assets = self.inner.assets.borrow();
        assets.get(id.0 as usize).map(|a| a.status.clone())
    }

    /// Number of assets still loading.
    #[must_use]
    pub fn pending(&self) -> usize {
        let assets = self.inner.assets.borrow();
        assets
            .iter()
            .filter(|a| a.status == AssetStatus::Pending)
            .count()
    }

    /// Returns `true` once no declared asset is pending.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pending() == 0
    }

    /// Records the outcome of loading `id`.
    ///
    /// `timestamp_us` is only used for the returned trace event. If this was
    /// the last pending asset, the ready callbacks run before this returns.
    pub fn resolve(
        &self,
        id: AssetId,
        result: Result<(), String>,
        timestamp_us: u64,
    ) -> AssetResolvedEvent {
        let loaded = result.is_ok();
        {
            let mut assets = self.inner.assets.borrow_mut();
            let Some(asset) = assets.get_mut(id.0 as usize) else {
                debug_assert!(false, "asset {id:?} was never declared");
                return AssetResolvedEvent {
                    asset_index: id.0,
                    loaded,
                    timestamp_us,
                };
            };
            debug_assert!(
                asset.status == AssetStatus::Pending,
                "asset {} resolved twice",
                asset.name
            );
            asset.status = match result {
                Ok(()) => AssetStatus::Loaded,
                Err(message) => {
                    log::warn!("failed to load asset {}: {message}", asset.name);
                    AssetStatus::Failed(message)
                }
            };
        }
        self.notify_if_ready();
        AssetResolvedEvent {
            asset_index: id.0,
            loaded,
            timestamp_us,
        }
    }

    /// Runs `f` once the gate is ready; immediately if it already is.
    ///
    /// The returned id can [`cancel`](Self::cancel) a callback that has not
    /// run yet.
    pub fn on_ready(&self, f: impl FnOnce(&AssetReport) + 'static) -> WaitId {
        let id = WaitId(self.inner.next_wait.get());
        self.inner.next_wait.set(id.0 + 1);
        self.inner.waiters.borrow_mut().push((id, Box::new(f)));
        self.notify_if_ready();
        id
    }

    /// Drops a pending ready callback. Returns `false` if it already ran or
    /// was cancelled.
    pub fn cancel(&self, id: WaitId) -> bool {
        let mut waiters = self.inner.waiters.borrow_mut();
        let before = waiters.len();
        waiters.retain(|(wait, _)| *wait != id);
        waiters.len() != before
    }

    /// Summary of the assets resolved so far.
    #[must_use]
    pub fn report(&self) -> AssetReport {
        let assets = self.inner.assets.borrow();
        let mut report = AssetReport::default();
        for asset in assets.iter() {
            match &asset.status {
                AssetStatus::Pending => {}
                AssetStatus::Loaded => report.loaded += 1,
                AssetStatus::Failed(message) => {
                    report.failed.push((asset.name.clone(), message.clone()));
                }
            }
        }
        report
    }

    fn notify_if_ready(&self) {
        if !self.is_ready() {
            return;
        }
        let waiters = core::mem::take(&mut *self.inner.waiters.borrow_mut());
        if waiters.is_empty() {
            return;
        }
        let report = self.report();
        for (_, f) in waiters {
            f(&report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_gate_is_ready_at_once() {
        let gate = AssetGate::new();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        gate.on_ready(move |report| {
            assert!(report.is_complete());
            flag.set(true);
        });
        assert!(ran.get());
    }

    #[test]
    fn waits_for_every_asset_and_reports_failures() {
        let gate = AssetGate::new();
        let a = gate.declare("a.png");
        let b = gate.declare("b.png");
        let report = Rc::new(RefCell::new(None));
        let slot = report.clone();
        gate.on_ready(move |r| *slot.borrow_mut() = Some(r.clone()));

        let event = gate.resolve(b, Err("404".into()), 7);
        assert_eq!(event.asset_index, 1);
        assert!(!event.loaded);
        assert_eq!(event.timestamp_us, 7);
        assert!(report.borrow().is_none());
        assert_eq!(gate.pending(), 1);

        gate.resolve(a, Ok(()), 9);
        let report = report.borrow().clone().unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.failed, [("b.png".to_owned(), "404".to_owned())]);
        assert_eq!(gate.status(b), Some(AssetStatus::Failed("404".into())));
    }

    #[test]
    fn cancelled_callbacks_never_run() {
        let gate = AssetGate::new();
        let a = gate.declare("a.png");
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let wait = gate.on_ready(move |_| flag.set(true));
        assert!(gate.cancel(wait));
        assert!(!gate.cancel(wait));
        gate.resolve(a, Ok(()), 0);
        assert!(!ran.get());
    }
}
