// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path and transform serialization shared by the SVG and DOM surfaces.

use alloc::format;
use alloc::string::String;
use core::fmt::Write as _;

use kurbo::{Affine, BezPath, PathEl};

/// SVG path data (`d` attribute) for `path`.
pub(crate) fn svg_path_data(path: &BezPath) -> String {
    let mut d = String::new();
    for el in path.elements() {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match *el {
            PathEl::MoveTo(p) => write!(d, "M{},{}", p.x, p.y),
            PathEl::LineTo(p) => write!(d, "L{},{}", p.x, p.y),
            PathEl::QuadTo(c, p) => write!(d, "Q{},{} {},{}", c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => {
                write!(d, "C{},{} {},{} {},{}", c1.x, c1.y, c2.x, c2.y, p.x, p.y)
            }
            PathEl::ClosePath => write!(d, "Z"),
        };
    }
    d
}

/// A 2D transform as a CSS `matrix()` value.
pub(crate) fn css_matrix(transform: Affine) -> String {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    format!("matrix({a},{b},{c},{d},{e},{f})")
}

/// A 2D transform as an SVG `transform` attribute value.
pub(crate) fn svg_matrix(transform: Affine) -> String {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}
