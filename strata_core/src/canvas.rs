// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Custom-drawn node content.
//!
//! A [`NodeContent::Canvas`](crate::node::NodeContent::Canvas) node declares
//! the local-frame bounds it draws within and a [`CanvasPainting`] callback.
//! Painters call the callback with a [`CanvasContext`] already set up in the
//! node's local frame; the callback only issues drawing commands.

use alloc::rc::Rc;
use core::fmt;

use kurbo::{Affine, BezPath, Point, Rect, Shape};

use crate::geom::PATH_TOLERANCE;
use crate::paint::Paint;

/// Immediate-mode drawing target handed to a [`CanvasPainting`].
///
/// Coordinates are in the painted node's local frame. Implementations draw
/// to a browser canvas or record the commands.
pub trait CanvasContext {
    /// Pushes the current transform onto a stack.
    fn save(&mut self);

    /// Pops the transform pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    /// Post-multiplies the current transform by `transform`.
    fn transform(&mut self, transform: Affine);

    /// Fills `path` with the non-zero rule.
    fn fill_path(&mut self, path: &BezPath, paint: &Paint);

    /// Strokes `path` with a centered line of `line_width`.
    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, line_width: f64);

    /// Draws one line of text with its baseline starting at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint);

    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.fill_path(&rect.to_path(PATH_TOLERANCE), paint);
    }
}

/// A shared drawing callback for canvas content.
///
/// Two paintings compare equal only if they share the same callback.
#[derive(Clone)]
pub struct CanvasPainting(Rc<dyn Fn(&mut dyn CanvasContext)>);

impl CanvasPainting {
    /// Wraps a drawing callback.
    pub fn new(paint: impl Fn(&mut dyn CanvasContext) + 'static) -> Self {
        Self(Rc::new(paint))
    }

    /// Runs the callback against `context`.
    pub fn paint(&self, context: &mut dyn CanvasContext) {
        (self.0)(context);
    }
}

impl fmt::Debug for CanvasPainting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CanvasPainting(..)")
    }
}

impl PartialEq for CanvasPainting {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::paint::Color;

    #[derive(Default)]
    struct Areas(Vec<Rect>);

    impl CanvasContext for Areas {
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn transform(&mut self, _: Affine) {}
        fn fill_path(&mut self, path: &BezPath, _: &Paint) {
            self.0.push(path.bounding_box());
        }
        fn stroke_path(&mut self, _: &BezPath, _: &Paint, _: f64) {}
        fn fill_text(&mut self, _: &str, _: Point, _: f64, _: &Paint) {}
    }

    #[test]
    fn fill_rect_defaults_to_a_path() {
        let painting = CanvasPainting::new(|context| {
            context.fill_rect(Rect::new(1.0, 2.0, 3.0, 4.0), &Color::BLACK.into());
        });
        let mut areas = Areas::default();
        painting.paint(&mut areas);
        assert_eq!(areas.0, [Rect::new(1.0, 2.0, 3.0, 4.0)]);
    }

    #[test]
    fn paintings_compare_by_identity() {
        let painting = CanvasPainting::new(|_| {});
        assert_eq!(painting, painting.clone());
        assert_ne!(painting, CanvasPainting::new(|_| {}));
    }
}
