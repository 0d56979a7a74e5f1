// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry primitives layered on [`kurbo`].

mod area;
mod linear;

pub use area::{Area, PATH_TOLERANCE, PLANE_RECT};
pub use linear::LinearFunction;
