// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Phases become duration slices; everything else becomes instant events.
/// Events without a timestamp of their own (evaluation, layer and repaint
/// events) are placed at the start of the most recent frame.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut frame_start_us = 0_u64;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameStep(e) => {
                frame_start_us = e.timestamp_us;
                events.push(json!({
                    "ph": "i",
                    "name": "FrameStep",
                    "cat": "Frame",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "dt": e.dt,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::Evaluate(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Evaluate",
                    "cat": "Scene",
                    "ts": frame_start_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "transforms": e.transforms,
                        "opacities": e.opacities,
                        "paints": e.paints,
                        "clips": e.clips,
                        "hidden": e.hidden,
                        "shown": e.shown,
                        "added": e.added,
                        "removed": e.removed,
                        "topology_changed": e.topology_changed,
                    }
                }));
            }
            RecordedEvent::LayersRebuilt(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "LayersRebuilt",
                    "cat": "Layer",
                    "ts": frame_start_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "layers": e.layers,
                        "painted_nodes": e.painted_nodes,
                    }
                }));
            }
            RecordedEvent::LayerRepaint(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "LayerRepaint",
                    "cat": "Layer",
                    "ts": frame_start_us,
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "layer_index": e.layer_index,
                        "renderer": e.renderer.name(),
                        "nodes": e.nodes,
                    }
                }));
            }
            RecordedEvent::AssetResolved(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "AssetResolved",
                    "cat": "Assets",
                    "ts": e.timestamp_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "asset_index": e.asset_index,
                        "loaded": e.loaded,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": frame_start_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": s.frame_index,
                        "dt": s.dt,
                        "step_us": s.step_us,
                        "eval_us": s.evaluate_us,
                        "layer_us": s.layer_us,
                        "paint_us": s.paint_us,
                        "layers_repainted": s.layers_repainted,
                        "rebuilt": s.rebuilt,
                    }
                }));
            }
            RecordedEvent::LayerChangesCount { frame_index, count } => {
                events.push(json!({
                    "ph": "i",
                    "name": "LayerChanges",
                    "cat": "Rich",
                    "ts": frame_start_us,
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "frame_index": frame_index,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use strata_core::renderer::Renderer;
    use strata_core::trace::{
        FrameStepEvent, LayerRepaintEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_step(&FrameStepEvent {
            frame_index: 0,
            dt: 1.0 / 60.0,
            timestamp_us: 1_000,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Paint,
            timestamp_us: 1_000,
        });
        rec.on_layer_repaint(&LayerRepaintEvent {
            frame_index: 0,
            layer_index: 2,
            renderer: Renderer::Canvas,
            nodes: 5,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Paint,
            timestamp_us: 1_100,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "FrameStep");

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Paint");

        // Repaints sit at the start of their frame.
        assert_eq!(parsed[2]["name"], "LayerRepaint");
        assert_eq!(parsed[2]["ts"], 1_000);
        assert_eq!(parsed[2]["args"]["renderer"], "canvas");

        assert_eq!(parsed[3]["ph"], "E");
        assert_eq!(parsed[3]["ts"], 1_100);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
