// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! A frame runs four phases: [`Step`](PhaseKind::Step) (timer and model
//! listeners), [`Evaluate`](PhaseKind::Evaluate) (dirty channels drained into
//! [`SceneChanges`]), [`Layer`](PhaseKind::Layer) (layer stack update), and
//! [`Paint`](PhaseKind::Paint) (dirty layers repainted).
//!
//! Instrumentation calls a [`TraceSink`] at each stage. All sink methods
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Timestamps are microseconds from a host-supplied monotonic clock.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies.
//! - `trace-rich` (implies `trace`): adds [`LayerChange`] events and the
//!   matching `TraceSink` method.

use crate::node::SceneChanges;
use crate::renderer::Renderer;

/// Which phase of the frame loop is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Timer step: models and views run their step listeners.
    Step,
    /// Scene evaluation (dirty propagation, world transforms).
    Evaluate,
    /// Layer stack update.
    Layer,
    /// Repainting dirty layers.
    Paint,
}

impl PhaseKind {
    /// All phases, in frame order.
    pub const ALL: [Self; 4] = [Self::Step, Self::Evaluate, Self::Layer, Self::Paint];

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Evaluate => "eval",
            Self::Layer => "layer",
            Self::Paint => "paint",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Step => 0,
            Self::Evaluate => 1,
            Self::Layer => 2,
            Self::Paint => 3,
        }
    }
}

/// Which aspect of a layer's nodes changed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerField {
    /// A world transform.
    Transform,
    /// An effective opacity.
    Opacity,
    /// Fill, stroke, or content.
    Paint,
    /// A clip area.
    Clip,
}

/// Emitted when the frame loop starts a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStepEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Seconds since the previous frame, after clamping.
    pub dt: f64,
    /// Host time at the start of the frame.
    pub timestamp_us: u64,
}

/// Marks the beginning of a frame-loop phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp_us: u64,
}

/// Marks the end of a frame-loop phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp_us: u64,
}

/// Counts of what a scene evaluation changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluateEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Nodes whose world transform changed.
    pub transforms: u32,
    /// Nodes whose effective opacity changed.
    pub opacities: u32,
    /// Nodes whose paint or content changed.
    pub paints: u32,
    /// Nodes whose clip changed.
    pub clips: u32,
    /// Nodes that became hidden.
    pub hidden: u32,
    /// Nodes that became visible.
    pub shown: u32,
    /// Nodes created since the last evaluation.
    pub added: u32,
    /// Nodes destroyed since the last evaluation.
    pub removed: u32,
    /// Whether parent/child links changed.
    pub topology_changed: bool,
}

impl EvaluateEvent {
    /// Summarizes `changes`.
    #[must_use]
    pub fn new(frame_index: u64, changes: &SceneChanges) -> Self {
        Self {
            frame_index,
            transforms: count(changes.transforms.len()),
            opacities: count(changes.opacities.len()),
            paints: count(changes.paints.len()),
            clips: count(changes.clips.len()),
            hidden: count(changes.hidden.len()),
            shown: count(changes.shown.len()),
            added: count(changes.added.len()),
            removed: count(changes.removed.len()),
            topology_changed: changes.topology_changed,
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "counts are capped at u32::MAX for tracing"
)]
fn count(n: usize) -> u32 {
    n.min(u32::MAX as usize) as u32
}

/// Emitted when the layer stack is rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayersRebuiltEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Number of layers after the rebuild.
    pub layers: u32,
    /// Number of painted nodes across all layers.
    pub painted_nodes: u32,
}

/// Emitted for each layer handed to a painter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerRepaintEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Index of the layer in the stack.
    pub layer_index: u32,
    /// The layer's renderer.
    pub renderer: Renderer,
    /// Number of painted nodes in the layer.
    pub nodes: u32,
}

/// Emitted when a declared asset finishes loading or fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetResolvedEvent {
    /// Index of the asset in declaration order.
    pub asset_index: u32,
    /// `false` when loading failed.
    pub loaded: bool,
    /// Host time of the resolution.
    pub timestamp_us: u64,
}

/// Per-frame timing summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Seconds stepped this frame.
    pub dt: f64,
    /// Step phase duration (0 if not measured).
    pub step_us: u64,
    /// Evaluate phase duration (0 if not measured).
    pub evaluate_us: u64,
    /// Layer phase duration (0 if not measured).
    pub layer_us: u64,
    /// Paint phase duration (0 if not measured).
    pub paint_us: u64,
    /// Number of layers repainted.
    pub layers_repainted: u32,
    /// Whether the layer stack was rebuilt.
    pub rebuilt: bool,
}

/// A per-frame layer change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerChange {
    /// Index of the layer that changed.
    pub layer_index: u32,
    /// Which aspect changed.
    pub field: LayerField,
}

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_step(&mut self, e: &FrameStepEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame-loop phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame-loop phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after the scene is evaluated.
    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        _ = e;
    }

    /// Called when the layer stack is rebuilt.
    fn on_layers_rebuilt(&mut self, e: &LayersRebuiltEvent) {
        _ = e;
    }

    /// Called for each repainted layer.
    fn on_layer_repaint(&mut self, e: &LayerRepaintEvent) {
        _ = e;
    }

    /// Called when an asset resolves.
    fn on_asset_resolved(&mut self, e: &AssetResolvedEvent) {
        _ = e;
    }

    /// Called with a per-frame timing summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }

    /// Called with per-frame layer changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        _ = (frame_index, changes);
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident, $event:ty, $method:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns whether events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    dispatch!(
        /// Emits a [`FrameStepEvent`].
        frame_step, FrameStepEvent, on_frame_step
    );
    dispatch!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin, PhaseBeginEvent, on_phase_begin
    );
    dispatch!(
        /// Emits a [`PhaseEndEvent`].
        phase_end, PhaseEndEvent, on_phase_end
    );
    dispatch!(
        /// Emits an [`EvaluateEvent`].
        evaluate, EvaluateEvent, on_evaluate
    );
    dispatch!(
        /// Emits a [`LayersRebuiltEvent`].
        layers_rebuilt, LayersRebuiltEvent, on_layers_rebuilt
    );
    dispatch!(
        /// Emits a [`LayerRepaintEvent`].
        layer_repaint, LayerRepaintEvent, on_layer_repaint
    );
    dispatch!(
        /// Emits an [`AssetResolvedEvent`].
        asset_resolved, AssetResolvedEvent, on_asset_resolved
    );
    dispatch!(
        /// Emits a [`FrameSummary`].
        frame_summary, FrameSummary, on_frame_summary
    );

    /// Emits layer changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        if let Some(s) = &mut self.sink {
            s.on_layer_changes(frame_index, changes);
        }
    }
}

/// Collects phase timestamps during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    frame_index: u64,
    dt: f64,
    phase_starts: [Option<u64>; 4],
    phase_ends: [Option<u64>; 4],
    layers_repainted: u32,
    rebuilt: bool,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given step.
    #[must_use]
    pub fn new(step: &FrameStepEvent) -> Self {
        Self {
            frame_index: step.frame_index,
            dt: step.dt,
            phase_starts: [None; 4],
            phase_ends: [None; 4],
            layers_repainted: 0,
            rebuilt: false,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, timestamp_us: u64) {
        self.phase_starts[phase.index()] = Some(timestamp_us);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, timestamp_us: u64) {
        self.phase_ends[phase.index()] = Some(timestamp_us);
    }

    /// Sets how many layers were repainted.
    pub fn set_layers_repainted(&mut self, layers: u32) {
        self.layers_repainted = layers;
    }

    /// Sets whether the layer stack was rebuilt.
    pub fn set_rebuilt(&mut self, rebuilt: bool) {
        self.rebuilt = rebuilt;
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.frame_index,
            dt: self.dt,
            step_us: self.phase_duration(PhaseKind::Step),
            evaluate_us: self.phase_duration(PhaseKind::Evaluate),
            layer_us: self.phase_duration(PhaseKind::Layer),
            paint_us: self.phase_duration(PhaseKind::Paint),
            layers_repainted: self.layers_repainted,
            rebuilt: self.rebuilt,
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase.index();
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }
}
