// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulation lifecycle for strata.
//!
//! A simulation is a list of [`Screen`]s, each pairing a [`ScreenModel`]
//! with a [`ScreenView`] that draws it into the shared scene. [`Sim`] builds
//! them, adds a home screen and a navigation bar when there is more than one
//! screen, and runs the frame loop:
//!
//! ```text
//! host frame ──► Sim::step_frame(dt)
//!                  ├─ step      Timer listeners, then the showing screen
//!                  ├─ evaluate  Scene::evaluate
//!                  ├─ layer     LayerStack::update
//!                  └─ paint     LayerStack::repaint ──► Painter
//! ```
//!
//! Start-up is gated on assets: loaders declare and resolve assets on an
//! [`AssetGate`], and a [`LaunchGuard`] runs the start callback once they
//! are all in, exactly once per guard.
//!
//! ```
//! use strata_core::layer::{Layer, Painter};
//! use strata_core::node::{NodeId, Scene};
//! use strata_core::trace::Tracer;
//! use strata_sim::{AssetGate, LaunchGuard, Screen, ScreenOptions, ScreenView, Sim, SimOptions};
//!
//! struct Empty(NodeId);
//!
//! impl ScreenView for Empty {
//!     fn root(&self) -> NodeId {
//!         self.0
//!     }
//! }
//!
//! struct Discard;
//!
//! impl Painter for Discard {
//!     fn paint_layer(&mut self, _scene: &Scene, _layer: &Layer) {}
//! }
//!
//! let gate = AssetGate::new();
//! let mut guard = LaunchGuard::new();
//! let launch = guard
//!     .launch(&gate, |report| assert!(report.is_complete()))
//!     .unwrap();
//! assert!(launch.has_started());
//!
//! let screen = Screen::new(
//!     "Intro",
//!     Scene::create_node,
//!     || (),
//!     |_: &(), scene: &mut Scene| Empty(scene.create_node()),
//!     ScreenOptions::default(),
//! );
//! let mut sim = Sim::new("demo", vec![screen], SimOptions::default()).unwrap();
//! let summary = sim.step_frame(1.0 / 60.0, &mut Discard, &mut Tracer::none());
//! assert!(summary.rebuilt);
//! ```

mod asset;
mod home;
mod launch;
mod navigation;
mod screen;
mod sim;

pub use asset::{AssetGate, AssetId, AssetReport, AssetStatus, WaitId};
pub use launch::{LaunchError, LaunchGuard, PendingLaunch};
pub use navigation::NAVIGATION_BAR_HEIGHT;
pub use screen::{
    DEFAULT_LAYOUT_BOUNDS, IconFactory, MIN_LAYOUT_SCALE, Screen, ScreenModel, ScreenOptions,
    ScreenView, layout_transform,
};
pub use sim::{DEFAULT_MAX_DT, Sim, SimOptions};
