// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans and damage tracking for strata.
//!
//! This crate sits between [`strata_core`]'s layer stack and backend-specific
//! drawing. It defines:
//!
//! - [`RenderItem`]: one painted node, flattened to world space
//! - [`RenderPlan`]: the ordered draw items of one layer
//! - [`DamageRegion`] and [`DamageTracker`]: which areas of a layer need
//!   redrawing
//! - [`RecordingPainter`]: a [`Painter`](strata_core::layer::Painter) that
//!   records plans instead of drawing, for tests and headless runs
//! - [`CanvasRecording`]: a [`CanvasContext`](strata_core::canvas::CanvasContext)
//!   that records custom canvas drawing

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod canvas;
mod damage;
mod plan;
mod recording;

pub use canvas::{CanvasCommand, CanvasRecording};
pub use damage::{DamageRegion, DamageTracker};
pub use plan::{ClipItem, RenderItem, RenderPlan};
pub use recording::{PaintRecord, RecordingPainter};
