// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reactive properties and a retained-mode scene graph for interactive
//! simulations.
//!
//! `strata_core` provides the substrate simulations are built on: observable
//! state, a 2D scene graph with lazily cached bounds and hit testing, pointer
//! input listeners, and a partitioner that splits the scene into layers per
//! rendering technology. It is `no_std` compatible (with `alloc`), and the
//! scene uses struct-of-arrays storage with generational handles.
//!
//! # Architecture
//!
//! Everything runs on one thread, driven by user input and a per-frame tick:
//!
//! ```text
//!   pointer events ──► Input ──► InputListener ──┐
//!                                                ▼
//!   Timer::step(dt) ──► step listeners ──► Property::set ──► observers
//!                                                               │
//!                 ┌─────────────────────────────────────────────┘
//!                 ▼
//!   Scene setters ──► dirty channels ──► Scene::evaluate() ──► SceneChanges
//!                                                                  │
//!                 ┌────────────────────────────────────────────────┘
//!                 ▼
//!   LayerStack::update() ──► LayerStack::repaint() ──► Painter
//! ```
//!
//! **[`property`]**: [`Property`](property::Property),
//! [`PropertySet`](property::PropertySet), multilinks, and derived
//! properties. **[`observable_array`]**: an ordered collection with
//! add/remove notifications.
//!
//! **[`geom`]** and **[`paint`]**: hit regions, linear maps, CSS colors and
//! gradients. **[`canvas`]**: callbacks for custom-drawn content.
//!
//! **[`node`]**: the [`Scene`](node::Scene) store. Setters mark dirty
//! channels and invalidate cached bounds up the ancestor chain; evaluation
//! computes world transforms, effective opacities, and visibility.
//!
//! **[`input`]**: pointer dispatch with bubbling and capture, plus drag and
//! press listeners.
//!
//! **[`renderer`]** and **[`layer`]**: renderer capabilities, effective
//! renderer assignment, and layer splitting with partial repaint.
//!
//! **[`dirty`]**: the dirty channels (via `understory_dirty`).
//!
//! **[`timer`]** and **[`event_timer`]**: frame-driven timeouts, intervals,
//! and rate-based event series.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-layer
//!   change events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod canvas;
pub mod dirty;
pub mod event_timer;
pub mod geom;
pub mod input;
pub mod layer;
pub mod node;
pub mod observable_array;
pub mod paint;
pub mod property;
pub mod renderer;
pub mod timer;
pub mod trace;
