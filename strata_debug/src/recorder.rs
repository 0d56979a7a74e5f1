// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Rich events ([`on_layer_changes`](TraceSink::on_layer_changes)) store only
//! the count.

use strata_core::renderer::Renderer;
use strata_core::trace::{
    AssetResolvedEvent, EvaluateEvent, FrameStepEvent, FrameSummary, LayerChange,
    LayerRepaintEvent, LayersRebuiltEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_STEP: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_EVALUATE: u8 = 4;
const TAG_LAYERS_REBUILT: u8 = 5;
const TAG_LAYER_REPAINT: u8 = 6;
const TAG_ASSET_RESOLVED: u8 = 7;
const TAG_FRAME_SUMMARY: u8 = 8;
const TAG_LAYER_CHANGES_COUNT: u8 = 9;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Step => 0,
            PhaseKind::Evaluate => 1,
            PhaseKind::Layer => 2,
            PhaseKind::Paint => 3,
        });
    }

    fn write_renderer(&mut self, r: Renderer) {
        self.write_u8(match r {
            Renderer::Canvas => 0,
            Renderer::Svg => 1,
            Renderer::Dom => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_step(&mut self, e: &FrameStepEvent) {
        self.write_u8(TAG_FRAME_STEP);
        self.write_u64(e.frame_index);
        self.write_f64(e.dt);
        self.write_u64(e.timestamp_us);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp_us);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp_us);
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        self.write_u8(TAG_EVALUATE);
        self.write_u64(e.frame_index);
        self.write_u32(e.transforms);
        self.write_u32(e.opacities);
        self.write_u32(e.paints);
        self.write_u32(e.clips);
        self.write_u32(e.hidden);
        self.write_u32(e.shown);
        self.write_u32(e.added);
        self.write_u32(e.removed);
        self.write_bool(e.topology_changed);
    }

    fn on_layers_rebuilt(&mut self, e: &LayersRebuiltEvent) {
        self.write_u8(TAG_LAYERS_REBUILT);
        self.write_u64(e.frame_index);
        self.write_u32(e.layers);
        self.write_u32(e.painted_nodes);
    }

    fn on_layer_repaint(&mut self, e: &LayerRepaintEvent) {
        self.write_u8(TAG_LAYER_REPAINT);
        self.write_u64(e.frame_index);
        self.write_u32(e.layer_index);
        self.write_renderer(e.renderer);
        self.write_u32(e.nodes);
    }

    fn on_asset_resolved(&mut self, e: &AssetResolvedEvent) {
        self.write_u8(TAG_ASSET_RESOLVED);
        self.write_u32(e.asset_index);
        self.write_bool(e.loaded);
        self.write_u64(e.timestamp_us);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_f64(s.dt);
        self.write_u64(s.step_us);
        self.write_u64(s.evaluate_us);
        self.write_u64(s.layer_us);
        self.write_u64(s.paint_us);
        self.write_u32(s.layers_repainted);
        self.write_bool(s.rebuilt);
    }

    fn on_layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        self.write_u8(TAG_LAYER_CHANGES_COUNT);
        self.write_u64(frame_index);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "layer change count capped at u32::MAX for recording"
        )]
        self.write_u32(changes.len().min(u32::MAX as usize) as u32);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`FrameStepEvent`].
    FrameStep(FrameStepEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// An [`EvaluateEvent`].
    Evaluate(EvaluateEvent),
    /// A [`LayersRebuiltEvent`].
    LayersRebuilt(LayersRebuiltEvent),
    /// A [`LayerRepaintEvent`].
    LayerRepaint(LayerRepaintEvent),
    /// An [`AssetResolvedEvent`].
    AssetResolved(AssetResolvedEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
    /// Layer-change count for a frame.
    LayerChangesCount {
        /// Frame counter.
        frame_index: u64,
        /// Number of layer changes.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Step,
            1 => PhaseKind::Evaluate,
            2 => PhaseKind::Layer,
            _ => PhaseKind::Paint,
        })
    }

    fn read_renderer(&mut self) -> Option<Renderer> {
        Some(match self.read_u8()? {
            0 => Renderer::Canvas,
            1 => Renderer::Svg,
            _ => Renderer::Dom,
        })
    }

    fn decode_frame_step(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameStep(FrameStepEvent {
            frame_index: self.read_u64()?,
            dt: self.read_f64()?,
            timestamp_us: self.read_u64()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp_us: self.read_u64()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp_us: self.read_u64()?,
        }))
    }

    fn decode_evaluate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Evaluate(EvaluateEvent {
            frame_index: self.read_u64()?,
            transforms: self.read_u32()?,
            opacities: self.read_u32()?,
            paints: self.read_u32()?,
            clips: self.read_u32()?,
            hidden: self.read_u32()?,
            shown: self.read_u32()?,
            added: self.read_u32()?,
            removed: self.read_u32()?,
            topology_changed: self.read_bool()?,
        }))
    }

    fn decode_layers_rebuilt(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LayersRebuilt(LayersRebuiltEvent {
            frame_index: self.read_u64()?,
            layers: self.read_u32()?,
            painted_nodes: self.read_u32()?,
        }))
    }

    fn decode_layer_repaint(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LayerRepaint(LayerRepaintEvent {
            frame_index: self.read_u64()?,
            layer_index: self.read_u32()?,
            renderer: self.read_renderer()?,
            nodes: self.read_u32()?,
        }))
    }

    fn decode_asset_resolved(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AssetResolved(AssetResolvedEvent {
            asset_index: self.read_u32()?,
            loaded: self.read_bool()?,
            timestamp_us: self.read_u64()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            dt: self.read_f64()?,
            step_us: self.read_u64()?,
            evaluate_us: self.read_u64()?,
            layer_us: self.read_u64()?,
            paint_us: self.read_u64()?,
            layers_repainted: self.read_u32()?,
            rebuilt: self.read_bool()?,
        }))
    }

    fn decode_layer_changes_count(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::LayerChangesCount { frame_index, count })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_STEP => self.decode_frame_step(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_EVALUATE => self.decode_evaluate(),
            TAG_LAYERS_REBUILT => self.decode_layers_rebuilt(),
            TAG_LAYER_REPAINT => self.decode_layer_repaint(),
            TAG_ASSET_RESOLVED => self.decode_asset_resolved(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            TAG_LAYER_CHANGES_COUNT => self.decode_layer_changes_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
