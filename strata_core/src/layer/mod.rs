// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer layers.
//!
//! Painted nodes are drawn by one of several renderers (see
//! [`Renderer`]). Consecutive painted nodes that share a renderer are
//! grouped into a [`Layer`]; each layer becomes one drawing surface in a
//! backend (a canvas, an SVG element, or a DOM container).
//!
//! [`LayerStack::update`] keeps the layers in step with an evaluated scene,
//! and [`LayerStack::repaint`] hands only dirty layers to a [`Painter`].
//!
//! # Frame pipeline
//!
//! ```rust,ignore
//! fn on_frame(dt: f64) {
//!     timer.step(dt);                          // models and views mutate nodes
//!     let changes = scene.evaluate();          // drain dirty channels
//!     stack.update(&scene, &changes);          // rebuild or dirty layers
//!     stack.repaint(&scene, &mut painter);     // redraw dirty layers only
//! }
//! ```

mod assign;
mod stack;

pub use assign::effective_renderers;
pub use stack::{LayerStack, LayerUpdate};

use alloc::vec::Vec;

use crate::node::{Scene, Trail};
use crate::renderer::Renderer;

/// A run of painted nodes drawn by one renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// The renderer drawing every node of the layer.
    pub renderer: Renderer,
    /// Slot indices of the painted nodes, in paint order.
    pub nodes: Vec<u32>,
    /// Trail to the first painted node.
    pub start: Trail,
    /// Trail to the last painted node.
    pub end: Trail,
    /// Whether the layer waits for a repaint.
    pub dirty: bool,
}

/// The seam before, between, or after layers.
///
/// A stack with `n` layers has `n + 1` boundaries; the first has no
/// previous side and the last has no next side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerBoundary {
    /// Renderer of the layer before the boundary.
    pub previous_renderer: Option<Renderer>,
    /// Renderer of the layer after the boundary.
    pub next_renderer: Option<Renderer>,
    /// Trail to the last painted node before the boundary.
    pub previous_painted: Option<Trail>,
    /// Trail to the first painted node after the boundary.
    pub next_painted: Option<Trail>,
}

/// Draws layers onto a backend surface.
///
/// Backends and test doubles implement this so a frame loop can drive any
/// of them.
pub trait Painter {
    /// The layer structure was rebuilt; backends recreate their surfaces.
    fn layers_changed(&mut self, layers: &[Layer], boundaries: &[LayerBoundary]) {
        _ = (layers, boundaries);
    }

    /// Redraws one layer, reading node state from `scene`.
    fn paint_layer(&mut self, scene: &Scene, layer: &Layer);
}
