// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen selection, frame stepping, and incremental repaint of a whole
//! simulation.

use std::cell::Cell;
use std::rc::Rc;

use kurbo::Point;
use strata_core::geom::Area;
use strata_core::input::PointerKind;
use strata_core::node::{NodeContent, NodeId, Scene};
use strata_core::paint::Color;
use strata_core::property::Property;
use strata_core::trace::Tracer;
use strata_render::RecordingPainter;
use strata_sim::{LaunchError, Screen, ScreenModel, ScreenOptions, ScreenView, Sim, SimOptions};

struct BallModel {
    x: Property<f64>,
    speed: f64,
}

impl ScreenModel for BallModel {
    fn step(&mut self, dt: f64) {
        self.x.set(self.x.get() + self.speed * dt);
    }

    fn reset(&mut self) {
        self.x.reset();
    }
}

struct BallView {
    root: NodeId,
    ball: NodeId,
    x: Property<f64>,
}

impl ScreenView for BallView {
    fn root(&self) -> NodeId {
        self.root
    }

    fn step(&mut self, scene: &mut Scene, _dt: f64) {
        let x = self.x.get();
        if scene.x(self.ball) != x {
            scene.set_x(self.ball, x);
        }
    }

    fn reset(&mut self, scene: &mut Scene) {
        scene.set_x(self.ball, self.x.get());
    }
}

fn icon(scene: &mut Scene) -> NodeId {
    let id = scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, 30.0, 20.0)));
    scene.set_fill(id, Color::BLACK);
    id
}

fn ball_screen(name: &str, speed: f64) -> Screen {
    Screen::new(
        name,
        icon,
        move || BallModel {
            x: Property::new(0.0),
            speed,
        },
        |model: &BallModel, scene: &mut Scene| {
            let root = scene.create_node();
            let ball = scene.create_with_content(NodeContent::Shape(Area::circle(0.0, 0.0, 10.0)));
            scene.set_fill(ball, Color::BLACK);
            scene.set_layer_split(ball, true);
            scene.add_child(root, ball);
            BallView {
                root,
                ball,
                x: model.x.clone(),
            }
        },
        ScreenOptions::default(),
    )
}

fn click(sim: &mut Sim, point: Point) {
    sim.pointer_down(1, PointerKind::Mouse, point);
    sim.pointer_up(1, PointerKind::Mouse, point);
}

#[test]
fn construction_errors() {
    assert_eq!(
        Sim::new("empty", Vec::new(), SimOptions::default()).unwrap_err(),
        LaunchError::NoScreens
    );
    let options = SimOptions {
        screen_index: 2,
        ..SimOptions::default()
    };
    assert_eq!(
        Sim::new("one", vec![ball_screen("a", 0.0)], options).unwrap_err(),
        LaunchError::ScreenIndexOutOfRange { index: 2, count: 1 }
    );
}

#[test]
fn only_the_moving_layer_repaints() {
    let mut sim = Sim::new("ball", vec![ball_screen("a", 60.0)], SimOptions::default()).unwrap();
    assert!(sim.is_screen_showing(0));
    assert!(!sim.show_home_screen().get());
    assert_eq!(sim.home_screen_icon(0), None);
    assert_eq!(sim.home_button(), None);

    let mut painter = RecordingPainter::new();
    let first = sim.step_frame(0.5, &mut painter, &mut Tracer::none());
    assert!(first.rebuilt);
    // Screen background, the ball, and the navigation bar.
    assert_eq!(sim.layers().layers().len(), 3);
    assert_eq!(first.layers_repainted, 3);
    painter.take_records();

    let second = sim.step_frame(0.25, &mut painter, &mut Tracer::none());
    assert!(!second.rebuilt);
    assert_eq!(second.layers_repainted, 1);
    let records = painter.take_records();
    assert_eq!(records[0].layer_index, Some(1));
    let ball = sim.scene().children(sim.screen_view_root(0).unwrap()).next().unwrap();
    assert_eq!(sim.scene().x(ball), 45.0);

    let idle = sim.step_frame(0.0, &mut painter, &mut Tracer::none());
    assert_eq!(idle.layers_repainted, 0);
    assert_eq!(sim.frame_index(), 3);
}

#[test]
fn long_frames_are_clamped() {
    let mut sim = Sim::new("ball", vec![ball_screen("a", 2.0)], SimOptions::default()).unwrap();
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    sim.timer().set_timeout(0.4, move || flag.set(true));

    let mut painter = RecordingPainter::new();
    let summary = sim.step_frame(10.0, &mut painter, &mut Tracer::none());
    assert_eq!(summary.dt, 0.5);
    assert_eq!(sim.timer().elapsed(), 0.5);
    assert!(fired.get());

    let summary = sim.step_frame(-1.0, &mut painter, &mut Tracer::none());
    assert_eq!(summary.dt, 0.0);
}

#[test]
fn home_screen_selects_then_enters() {
    let screens = vec![ball_screen("a", 0.0), ball_screen("b", 0.0)];
    let mut sim = Sim::new("two", screens, SimOptions::default()).unwrap();
    assert!(sim.show_home_screen().get());
    assert!(!sim.is_screen_showing(0));
    assert!(!sim.is_screen_showing(1));
    let second = sim.home_screen_icon(1).unwrap();
    assert_eq!(sim.scene().opacity(second), 0.5);

    // The second icon's cell is centered at (474, 259) in the default window.
    click(&mut sim, Point::new(474.0, 259.0));
    assert_eq!(sim.screen_index().get(), 1);
    assert!(sim.show_home_screen().get());
    assert_eq!(sim.scene().opacity(second), 1.0);

    click(&mut sim, Point::new(474.0, 259.0));
    assert!(!sim.show_home_screen().get());
    assert!(sim.is_screen_showing(1));
    assert!(!sim.is_screen_showing(0));
}

#[test]
fn a_touch_tap_enters_directly() {
    let screens = vec![ball_screen("a", 0.0), ball_screen("b", 0.0)];
    let mut sim = Sim::new("two", screens, SimOptions::default()).unwrap();
    let center = Point::new(474.0, 259.0);
    sim.pointer_down(7, PointerKind::Touch, center);
    sim.pointer_up(7, PointerKind::Touch, center);
    assert_eq!(sim.screen_index().get(), 1);
    assert!(sim.is_screen_showing(1));
}

#[test]
fn navigation_bar_switches_screens_and_goes_home() {
    let screens = vec![ball_screen("a", 0.0), ball_screen("b", 0.0)];
    let options = SimOptions {
        show_home_screen: false,
        screen_index: 1,
        ..SimOptions::default()
    };
    let mut sim = Sim::new("two", screens, options).unwrap();
    assert!(sim.is_screen_showing(1));
    assert_eq!(sim.home_button(), None);

    // First navigation button: x 329..379, y 509..539.
    click(&mut sim, Point::new(354.0, 524.0));
    assert_eq!(sim.screen_index().get(), 0);
    assert!(sim.is_screen_showing(0));
    assert_eq!(sim.scene().opacity(sim.navigation_button(1).unwrap()), 0.4);
}

#[test]
fn home_button_returns_and_reset_all_restores() {
    let screens = vec![ball_screen("a", 10.0), ball_screen("b", 0.0)];
    let mut sim = Sim::new("two", screens, SimOptions::default()).unwrap();
    let icon = Point::new(294.0, 259.0);
    click(&mut sim, icon);
    assert!(sim.is_screen_showing(0));

    let mut painter = RecordingPainter::new();
    sim.step_frame(0.5, &mut painter, &mut Tracer::none());
    let ball = sim.scene().children(sim.screen_view_root(0).unwrap()).next().unwrap();
    assert_eq!(sim.scene().x(ball), 5.0);

    // Home button: x 734..758, y 512..536.
    click(&mut sim, Point::new(746.0, 524.0));
    assert!(sim.show_home_screen().get());
    assert!(!sim.is_screen_showing(0));

    sim.reset_all();
    assert_eq!(sim.scene().x(ball), 0.0);
    assert_eq!(sim.screen_index().get(), 0);
    assert!(sim.show_home_screen().get());
}

#[test]
fn resize_fits_each_screen() {
    let mut sim = Sim::new("ball", vec![ball_screen("a", 0.0)], SimOptions::default()).unwrap();
    sim.resize(1536.0, 1048.0);
    let transform = sim.screen_transform(0).unwrap();
    assert_eq!(transform * Point::new(768.0, 504.0), Point::new(1536.0, 1008.0));
    assert_eq!(sim.size(), (1536.0, 1048.0));
}

#[test]
fn empty_resize_keeps_the_last_layout() {
    let screens = vec![ball_screen("a", 0.0), ball_screen("b", 0.0)];
    let mut sim = Sim::new("two", screens, SimOptions::default()).unwrap();
    let before = sim.screen_transform(0).unwrap();
    let size = sim.size();

    sim.resize(0.0, 0.0);
    sim.resize(f64::NAN, 600.0);
    assert_eq!(sim.size(), size);
    assert_eq!(sim.screen_transform(0).unwrap(), before);

    // Hit testing still works after the ignored resizes.
    click(&mut sim, Point::new(474.0, 259.0));
    assert_eq!(sim.screen_index().get(), 1);
}

#[test]
fn a_window_shorter_than_the_navigation_bar_stays_invertible() {
    let mut sim = Sim::new("ball", vec![ball_screen("a", 0.0)], SimOptions::default()).unwrap();
    sim.resize(800.0, 10.0);
    let transform = sim.screen_transform(0).unwrap();
    assert!(transform.determinant() > 0.0);
    sim.pointer_down(1, PointerKind::Mouse, Point::new(5.0, 5.0));
    sim.pointer_up(1, PointerKind::Mouse, Point::new(5.0, 5.0));
}

#[cfg(feature = "trace")]
#[test]
fn frames_are_traced() {
    use strata_core::trace::{FrameSummary, LayerRepaintEvent, PhaseBeginEvent, TraceSink};

    #[derive(Default)]
    struct Counts {
        phases: usize,
        repaints: usize,
        summaries: usize,
    }

    impl TraceSink for Counts {
        fn on_phase_begin(&mut self, _e: &PhaseBeginEvent) {
            self.phases += 1;
        }

        fn on_layer_repaint(&mut self, _e: &LayerRepaintEvent) {
            self.repaints += 1;
        }

        fn on_frame_summary(&mut self, _s: &FrameSummary) {
            self.summaries += 1;
        }
    }

    let mut sim = Sim::new("ball", vec![ball_screen("a", 1.0)], SimOptions::default()).unwrap();
    let mut counts = Counts::default();
    let mut painter = RecordingPainter::new();
    sim.step_frame(0.1, &mut painter, &mut Tracer::new(&mut counts));
    sim.step_frame(0.1, &mut painter, &mut Tracer::new(&mut counts));
    assert_eq!(counts.phases, 8);
    assert_eq!(counts.repaints, 4);
    assert_eq!(counts.summaries, 2);
}
