// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless simulation run that exercises the tracing and diagnostics
//! pipeline.
//!
//! Launches a two-screen simulation behind an asset gate, runs 60 frames
//! through the frame pipeline with scripted clicks, and records every event
//! to both a [`PrettyPrintSink`] and a [`RecorderSink`]. Afterwards it
//! prints the scene tree of the showing screen and exports a Chrome trace
//! JSON file.

use std::cell::Cell;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::{Point, Vec2};
use strata_core::geom::Area;
use strata_core::input::PointerKind;
use strata_core::node::{NodeContent, NodeId, Scene};
use strata_core::paint::{Color, Paint};
use strata_core::property::Property;
use strata_core::trace::{
    AssetResolvedEvent, EvaluateEvent, FrameStepEvent, FrameSummary, LayerChange,
    LayerRepaintEvent, LayersRebuiltEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink, Tracer,
};
use strata_debug::pretty::PrettyPrintSink;
use strata_debug::recorder::RecorderSink;
use strata_debug::{chrome, tree};
use strata_render::RecordingPainter;
use strata_sim::{
    AssetGate, LaunchGuard, Screen, ScreenModel, ScreenOptions, ScreenView, Sim, SimOptions,
};

const FRAME_COUNT: u64 = 60;
const FRAME_US: u64 = 16_667;
const DT: f64 = 1.0 / 60.0;

// Click targets in the default 768x544 window.
const PENDULUM_ICON: Point = Point::new(294.0, 259.0);
const LAMP_BUTTON: Point = Point::new(414.0, 524.0);

const PIVOT: Vec2 = Vec2::new(384.0, 80.0);
const ROD_LENGTH: f64 = 260.0;
const GRAVITY: f64 = 9.81;

struct Pendulum {
    angle: Property<f64>,
    velocity: f64,
}

impl ScreenModel for Pendulum {
    fn step(&mut self, dt: f64) {
        let length = ROD_LENGTH / 100.0;
        self.velocity -= GRAVITY / length * self.angle.get().sin() * dt;
        self.angle.set(self.angle.get() + self.velocity * dt);
    }

    fn reset(&mut self) {
        self.angle.reset();
        self.velocity = 0.0;
    }
}

struct PendulumView {
    root: NodeId,
    bob: NodeId,
    angle: Property<f64>,
}

impl PendulumView {
    fn build(model: &Pendulum, scene: &mut Scene) -> Self {
        let root = scene.create_node();
        let pivot = scene.create_with_content(NodeContent::Shape(Area::circle(0.0, 0.0, 6.0)));
        scene.set_fill(pivot, Color::BLACK);
        scene.set_translation(pivot, PIVOT);
        let bob = scene.create_with_content(NodeContent::Shape(Area::circle(0.0, 0.0, 24.0)));
        scene.set_fill(bob, Color::rgb(200, 40, 40));
        scene.set_stroke(bob, Color::BLACK);
        scene.set_line_width(bob, 2.0);
        // The bob moves every frame; keep it out of the static layer.
        scene.set_layer_split(bob, true);
        scene.add_child(root, pivot);
        scene.add_child(root, bob);

        let mut view = Self {
            root,
            bob,
            angle: model.angle.clone(),
        };
        view.place_bob(scene);
        view
    }

    fn place_bob(&mut self, scene: &mut Scene) {
        let angle = self.angle.get();
        let offset = Vec2::new(angle.sin(), angle.cos()) * ROD_LENGTH;
        let position = PIVOT + offset;
        if scene.translation(self.bob) != position {
            scene.set_translation(self.bob, position);
        }
    }
}

impl ScreenView for PendulumView {
    fn root(&self) -> NodeId {
        self.root
    }

    fn step(&mut self, scene: &mut Scene, _dt: f64) {
        self.place_bob(scene);
    }

    fn reset(&mut self, scene: &mut Scene) {
        self.place_bob(scene);
    }
}

struct LampView {
    root: NodeId,
    bulb: NodeId,
    on: Property<bool>,
}

impl LampView {
    fn color(on: bool) -> Color {
        if on {
            Color::rgb(255, 210, 0)
        } else {
            Color::rgb(80, 80, 80)
        }
    }
}

impl ScreenView for LampView {
    fn root(&self) -> NodeId {
        self.root
    }

    fn step(&mut self, scene: &mut Scene, _dt: f64) {
        let color = Self::color(self.on.get());
        if scene.fill(self.bulb) != Paint::from(color) {
            scene.set_fill(self.bulb, color);
        }
    }
}

fn icon(color: Color) -> impl Fn(&mut Scene) -> NodeId {
    move |scene| {
        let id = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 60.0, 40.0)));
        scene.set_fill(id, color);
        id
    }
}

fn pendulum_screen() -> Screen {
    Screen::new(
        "Pendulum",
        icon(Color::rgb(200, 40, 40)),
        || Pendulum {
            angle: Property::new(0.8),
            velocity: 0.0,
        },
        PendulumView::build,
        ScreenOptions::default(),
    )
}

fn lamp_screen(on: Property<bool>) -> Screen {
    Screen::new(
        "Lamp",
        icon(Color::rgb(255, 210, 0)),
        || (),
        move |_: &(), scene: &mut Scene| {
            let root = scene.create_node();
            let bulb = scene.create_with_content(NodeContent::Shape(Area::circle(0.0, 0.0, 60.0)));
            scene.set_fill(bulb, LampView::color(on.get()));
            scene.set_translation(bulb, Vec2::new(384.0, 252.0));
            let label = scene.create_with_content(NodeContent::Text {
                text: "Lamp".into(),
                font_size: 24.0,
            });
            scene.set_fill(label, Color::BLACK);
            scene.set_translation(label, Vec2::new(356.0, 360.0));
            scene.add_child(root, bulb);
            scene.add_child(root, label);
            LampView { root, bulb, on }
        },
        ScreenOptions {
            background_color: Color::rgb(230, 230, 250),
            ..ScreenOptions::default()
        },
    )
}

/// Forwards every event to two sinks.
struct Tee<'a> {
    first: &'a mut dyn TraceSink,
    second: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_frame_step(&mut self, e: &FrameStepEvent) {
        self.first.on_frame_step(e);
        self.second.on_frame_step(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.first.on_phase_begin(e);
        self.second.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.first.on_phase_end(e);
        self.second.on_phase_end(e);
    }

    fn on_evaluate(&mut self, e: &EvaluateEvent) {
        self.first.on_evaluate(e);
        self.second.on_evaluate(e);
    }

    fn on_layers_rebuilt(&mut self, e: &LayersRebuiltEvent) {
        self.first.on_layers_rebuilt(e);
        self.second.on_layers_rebuilt(e);
    }

    fn on_layer_repaint(&mut self, e: &LayerRepaintEvent) {
        self.first.on_layer_repaint(e);
        self.second.on_layer_repaint(e);
    }

    fn on_asset_resolved(&mut self, e: &AssetResolvedEvent) {
        self.first.on_asset_resolved(e);
        self.second.on_asset_resolved(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.first.on_frame_summary(s);
        self.second.on_frame_summary(s);
    }

    fn on_layer_changes(&mut self, frame_index: u64, changes: &[LayerChange]) {
        self.first.on_layer_changes(frame_index, changes);
        self.second.on_layer_changes(frame_index, changes);
    }
}

fn click(sim: &mut Sim, point: Point) {
    sim.pointer_down(1, PointerKind::Mouse, point);
    sim.pointer_up(1, PointerKind::Mouse, point);
}

fn main() -> Result<(), Box<dyn Error>> {
    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    // Simulated host clock: each read advances 40µs, each frame 16.667ms.
    let clock = Rc::new(Cell::new(1_000_000_u64));
    let read_clock = {
        let clock = Rc::clone(&clock);
        move || {
            let now = clock.get() + 40;
            clock.set(now);
            now
        }
    };

    // -- launch ------------------------------------------------------------
    let gate = AssetGate::new();
    let icons = gate.declare("icons.png");
    let sounds = gate.declare("click.ogg");
    let started = Rc::new(Cell::new(false));
    let mut guard = LaunchGuard::new();
    let launch = guard.launch(&gate, {
        let started = Rc::clone(&started);
        move |report| {
            println!(
                "Launching with {} assets loaded, {} failed",
                report.loaded,
                report.failed.len()
            );
            started.set(true);
        }
    })?;
    {
        let mut tee = Tee {
            first: &mut pretty,
            second: &mut recorder,
        };
        let mut tracer = Tracer::new(&mut tee);
        tracer.asset_resolved(&gate.resolve(icons, Ok(()), clock.get()));
        tracer.asset_resolved(&gate.resolve(
            sounds,
            Err("audio is not supported headless".into()),
            clock.get() + 500,
        ));
    }
    debug_assert!(launch.has_started(), "all assets settled");
    if !started.get() {
        return Err("launch did not start".into());
    }

    // -- simulation --------------------------------------------------------
    let lamp_on = Property::new(false);
    let mut sim = Sim::new(
        "Trace Demo",
        vec![pendulum_screen(), lamp_screen(lamp_on.clone())],
        SimOptions::default(),
    )?;
    sim.set_clock(read_clock);
    sim.timer().set_interval(0.25, move || lamp_on.toggle());

    let mut painter = RecordingPainter::new();
    for frame in 0..FRAME_COUNT {
        match frame {
            // The first screen's icon starts selected, so one click enters it.
            5 => click(&mut sim, PENDULUM_ICON),
            // Switch to the lamp through the navigation bar.
            40 => click(&mut sim, LAMP_BUTTON),
            _ => {}
        }

        let mut tee = Tee {
            first: &mut pretty,
            second: &mut recorder,
        };
        sim.step_frame(DT, &mut painter, &mut Tracer::new(&mut tee));
        clock.set(clock.get() + FRAME_US);
    }

    if let Some(root) = sim.screen_view_root(sim.screen_index().get()) {
        println!("\nScene of {}:", sim.screen_name(sim.screen_index().get()).unwrap_or("?"));
        print!("{}", tree::dump(sim.scene(), root));
    }
    println!(
        "{} paints recorded over {} layer rebuilds",
        painter.records().len(),
        painter.structure_changes()
    );

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    chrome::export(recorder.as_bytes(), &mut writer)?;

    println!("Wrote {path} ({FRAME_COUNT} frames)");
    Ok(())
}
