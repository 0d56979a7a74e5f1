// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for strata.
//!
//! This crate connects a [`Sim`](strata_sim::Sim) to browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` frame loop producing `dt`
//! - [`ImageLoader`]: image preloading that resolves assets on an
//!   [`AssetGate`](strata_sim::AssetGate)
//! - [`LayerPresenter`]: a [`Painter`] that draws each renderer layer onto
//!   its own canvas, SVG or DOM surface
//!
//! A page typically preloads its images, launches once the gate is ready,
//! and then steps the simulation from the frame loop:
//!
//! ```rust,ignore
//! let gate = AssetGate::new();
//! let mut loader = ImageLoader::new(gate.clone());
//! let (_, ball) = loader.load("images/ball.png")?;
//!
//! let mut guard = LaunchGuard::new();
//! let pending = guard.launch(&gate, move |_report| {
//!     let mut sim = Sim::new("Bounce", screens(), SimOptions::default()).unwrap();
//!     let mut presenter = LayerPresenter::new(container).unwrap();
//!     presenter.resize(1024.0, 618.0, device_pixel_ratio);
//!     sim.resize(1024.0, 618.0);
//!     sim.set_clock(strata_backend_web::now_us);
//!     let raf = RafLoop::new(move |frame| {
//!         sim.step_frame(frame.dt, &mut presenter, &mut Tracer::none());
//!     });
//!     raf.start();
//!     core::mem::forget(raf);
//! })?;
//! ```

#![no_std]

extern crate alloc;

mod path;
mod preload;
mod presenter;
mod raf;

pub use preload::ImageLoader;
pub use presenter::LayerPresenter;
pub use raf::{RafFrame, RafLoop};
pub use strata_core::layer::Painter;

/// Returns the current host time in microseconds, from `performance.now()`.
///
/// Pass this to [`Sim::set_clock`](strata_sim::Sim::set_clock) so trace
/// timestamps follow the browser clock.
#[must_use]
pub fn now_us() -> u64 {
    raf::ms_to_us(raf::performance_now())
}
