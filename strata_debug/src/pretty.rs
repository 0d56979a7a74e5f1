// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::trace::{
    AssetResolvedEvent, EvaluateEvent, FrameStepEvent, FrameSummary, LayerChange,
    LayerRepaintEvent, LayersRebuiltEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_step(&mut self, e: &FrameStepEvent) {
        let _ = writeln!(
            self.writer,
            "[step] frame={} dt={:.4}s at {}µs",
            e.frame_index, e.dt, e.timestamp_us,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {}µs",
            e.frame_index,
            e.phase.name(),
            e.timestamp_us,
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {}µs",
            e.frame_index,
            e.phase.name(),
            e.timestamp_us,
        );
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        let _ = writeln!(
            self.writer,
            "[eval] frame={} transforms={} opacities={} paints={} clips={} \
             hidden={} shown={} added={} removed={} topology={}",
            e.frame_index,
            e.transforms,
            e.opacities,
            e.paints,
            e.clips,
            e.hidden,
            e.shown,
            e.added,
            e.removed,
            e.topology_changed,
        );
    }

    fn on_layers_rebuilt(&mut self, e: &LayersRebuiltEvent) {
        let _ = writeln!(
            self.writer,
            "[rebuild] frame={} layers={} nodes={}",
            e.frame_index, e.layers, e.painted_nodes,
        );
    }

    fn on_layer_repaint(&mut self, e: &LayerRepaintEvent) {
        let _ = writeln!(
            self.writer,
            "[repaint] frame={} layer={} {} nodes={}",
            e.frame_index, e.layer_index, e.renderer, e.nodes,
        );
    }

    fn on_asset_resolved(&mut self, e: &AssetResolvedEvent) {
        let status = if e.loaded { "loaded" } else { "FAILED" };
        let _ = writeln!(
            self.writer,
            "[asset] #{} {status} at {}µs",
            e.asset_index, e.timestamp_us,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let rebuilt = if s.rebuilt { " rebuilt" } else { "" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} dt={:.4}s step={}µs eval={}µs layer={}µs \
             paint={}µs repainted={}{rebuilt}",
            s.frame_index,
            s.dt,
            s.step_us,
            s.evaluate_us,
            s.layer_us,
            s.paint_us,
            s.layers_repainted,
        );
    }

    fn on_layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        let _ = writeln!(
            self.writer,
            "[layers] frame={frame_index} changes={}",
            changes.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::renderer::Renderer;

    #[test]
    fn pretty_print_step() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_step(&FrameStepEvent {
            frame_index: 1,
            dt: 0.5,
            timestamp_us: 1_000,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output, "[step] frame=1 dt=0.5000s at 1000µs\n");
    }

    #[test]
    fn pretty_print_repaint_and_summary() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_layer_repaint(&LayerRepaintEvent {
            frame_index: 3,
            layer_index: 1,
            renderer: Renderer::Dom,
            nodes: 4,
        });
        sink.on_frame_summary(&FrameSummary {
            frame_index: 3,
            dt: 0.25,
            step_us: 10,
            evaluate_us: 20,
            layer_us: 30,
            paint_us: 40,
            layers_repainted: 1,
            rebuilt: true,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2, "got: {output}");
        assert!(lines[0].starts_with("[repaint] frame=3 layer=1"), "got: {output}");
        assert!(lines[1].ends_with("repainted=1 rebuilt"), "got: {output}");
    }
}
