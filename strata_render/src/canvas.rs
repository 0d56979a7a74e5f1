// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording of custom canvas drawing.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Affine, BezPath, Point};
use strata_core::canvas::CanvasContext;
use strata_core::paint::Paint;

/// One call made on a [`CanvasRecording`].
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasCommand {
    /// [`CanvasContext::save`].
    Save,
    /// [`CanvasContext::restore`].
    Restore,
    /// [`CanvasContext::transform`].
    Transform(Affine),
    /// [`CanvasContext::fill_path`].
    FillPath {
        /// The filled path.
        path: BezPath,
        /// Its paint.
        paint: Paint,
    },
    /// [`CanvasContext::stroke_path`].
    StrokePath {
        /// The stroked path.
        path: BezPath,
        /// Its paint.
        paint: Paint,
        /// Line width.
        line_width: f64,
    },
    /// [`CanvasContext::fill_text`].
    FillText {
        /// The text.
        text: String,
        /// Baseline start.
        origin: Point,
        /// Font size.
        font_size: f64,
        /// Its paint.
        paint: Paint,
    },
}

/// A [`CanvasContext`] that records every call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CanvasRecording {
    /// Calls in the order they were made.
    pub commands: Vec<CanvasCommand>,
}

impl CanvasRecording {
    /// Creates an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CanvasContext for CanvasRecording {
    fn save(&mut self) {
        self.commands.push(CanvasCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(CanvasCommand::Restore);
    }

    fn transform(&mut self, transform: Affine) {
        self.commands.push(CanvasCommand::Transform(transform));
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint) {
        self.commands.push(CanvasCommand::FillPath {
            path: path.clone(),
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, path: &BezPath, paint: &Paint, line_width: f64) {
        self.commands.push(CanvasCommand::StrokePath {
            path: path.clone(),
            paint: paint.clone(),
            line_width,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f64, paint: &Paint) {
        self.commands.push(CanvasCommand::FillText {
            text: text.to_string(),
            origin,
            font_size,
            paint: paint.clone(),
        });
    }
}
