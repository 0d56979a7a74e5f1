// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The simulation: screens, chrome, and the frame loop.

use std::fmt;

use kurbo::{Affine, Point, Rect};
use strata_core::geom::Area;
use strata_core::input::{Input, PointerEvent, PointerKind};
use strata_core::layer::{LayerStack, Painter};
use strata_core::node::{NodeContent, NodeId, Scene};
use strata_core::property::Property;
use strata_core::timer::Timer;
use strata_core::trace::{
    EvaluateEvent, FrameStepEvent, FrameSummary, FrameSummaryBuilder, LayerRepaintEvent,
    LayersRebuiltEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, Tracer,
};

use crate::home::{HomeScreen, show};
use crate::launch::LaunchError;
use crate::navigation::{NAVIGATION_BAR_HEIGHT, NavigationBar};
use crate::screen::{DEFAULT_LAYOUT_BOUNDS, RunningScreen, Screen, layout_transform};

/// Longest step a single frame may take, in seconds.
pub const DEFAULT_MAX_DT: f64 = 0.5;

/// Simulation-wide settings.
#[derive(Clone, Debug, PartialEq)]
pub struct SimOptions {
    /// Start on the home screen. Ignored for single-screen simulations.
    pub show_home_screen: bool,
    /// Screen selected at startup.
    pub screen_index: usize,
    /// Frame steps are clamped to this many seconds, so a stalled or
    /// backgrounded page does not make models jump.
    pub max_dt: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            show_home_screen: true,
            screen_index: 0,
            max_dt: DEFAULT_MAX_DT,
        }
    }
}

struct ScreenSlot {
    name: String,
    /// Split into its own layer; hidden unless the screen is showing.
    container: NodeId,
    background: NodeId,
    /// Carries the layout transform above the view root.
    frame: NodeId,
    running: Box<dyn RunningScreen>,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// A running simulation.
///
/// Owns the scene, the screens built into it, the home screen and
/// navigation bar, the frame [`Timer`], pointer [`Input`], and the
/// [`LayerStack`] painters draw from.
///
/// The host drives it: [`step_frame`](Self::step_frame) once per display
/// frame, the pointer methods for input, and [`resize`](Self::resize) when
/// the window changes.
pub struct Sim {
    name: String,
    scene: Scene,
    root: NodeId,
    screens: Vec<ScreenSlot>,
    home: Option<HomeScreen>,
    navigation: NavigationBar,
    screen_index: Property<usize>,
    show_home_screen: Property<bool>,
    timer: Timer,
    input: Input,
    layers: LayerStack,
    max_dt: f64,
    frame_index: u64,
    clock: Option<Box<dyn FnMut() -> u64>>,
    size: (f64, f64),
}

impl fmt::Debug for Sim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sim")
            .field("name", &self.name)
            .field("screens", &self.screens.len())
            .field("screen_index", &self.screen_index.get())
            .field("show_home_screen", &self.show_home_screen.get())
            .field("frame_index", &self.frame_index)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl Sim {
    /// Builds every screen's model and view and the surrounding chrome.
    ///
    /// The window starts at the default layout size plus the navigation
    /// bar; call [`resize`](Self::resize) to match the host.
    pub fn new(
        name: impl Into<String>,
        screens: Vec<Screen>,
        options: SimOptions,
    ) -> Result<Self, LaunchError> {
        let name = name.into();
        if screens.is_empty() {
            return Err(LaunchError::NoScreens);
        }
        if options.screen_index >= screens.len() {
            return Err(LaunchError::ScreenIndexOutOfRange {
                index: options.screen_index,
                count: screens.len(),
            });
        }
        let max_dt = if options.max_dt > 0.0 {
            options.max_dt
        } else {
            log::warn!(
                "ignoring max_dt {}, using {DEFAULT_MAX_DT}",
                options.max_dt
            );
            DEFAULT_MAX_DT
        };

        let mut scene = Scene::new();
        let root = scene.create_node();
        let multi_screen = screens.len() > 1;
        let with_home = options.show_home_screen && multi_screen;

        let mut slots = Vec::with_capacity(screens.len());
        let mut home_entries = Vec::new();
        let mut nav_icons = Vec::new();
        for screen in screens {
            let (screen_name, icon, screen_options, build) = screen.into_parts();
            let running = build(&mut scene);

            let container = scene.create_node();
            scene.set_layer_split(container, true);
            let background = scene.create_with_content(NodeContent::Shape(Area::Rect(
                running.layout_bounds(),
            )));
            scene.set_fill(background, screen_options.background_color);
            let frame = scene.create_node();
            scene.add_child(container, background);
            scene.add_child(container, frame);
            scene.add_child(frame, running.root());
            scene.add_child(root, container);

            if multi_screen {
                if with_home {
                    home_entries.push((icon(&mut scene), screen_name.clone()));
                }
                let nav_icon = match &screen_options.navigation_bar_icon {
                    Some(factory) => factory(&mut scene),
                    None => icon(&mut scene),
                };
                nav_icons.push(nav_icon);
            }

            slots.push(ScreenSlot {
                name: screen_name,
                container,
                background,
                frame,
                running,
            });
        }

        let screen_index = Property::new(options.screen_index);
        let show_home_screen = Property::new(with_home);
        let home = with_home.then(|| {
            let home = HomeScreen::build(&mut scene, home_entries, &screen_index, &show_home_screen);
            scene.add_child(root, home.root);
            home
        });
        let navigation = NavigationBar::build(
            &mut scene,
            nav_icons,
            with_home,
            &screen_index,
            &show_home_screen,
        );
        scene.add_child(root, navigation.root);

        log::debug!("built simulation {name} with {} screens", slots.len());
        let mut sim = Self {
            name,
            scene,
            root,
            screens: slots,
            home,
            navigation,
            screen_index,
            show_home_screen,
            timer: Timer::new(),
            input: Input::new(root),
            layers: LayerStack::new(root),
            max_dt,
            frame_index: 0,
            clock: None,
            size: (0.0, 0.0),
        };
        sim.resize(
            DEFAULT_LAYOUT_BOUNDS.width(),
            DEFAULT_LAYOUT_BOUNDS.height() + NAVIGATION_BAR_HEIGHT,
        );
        sim.sync();
        Ok(sim)
    }

    /// The simulation's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scene holding every screen.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Root of the whole display.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of screens.
    #[must_use]
    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    /// Name of screen `index`.
    #[must_use]
    pub fn screen_name(&self, index: usize) -> Option<&str> {
        self.screens.get(index).map(|s| s.name.as_str())
    }

    /// Root node of screen `index`'s view.
    #[must_use]
    pub fn screen_view_root(&self, index: usize) -> Option<NodeId> {
        self.screens.get(index).map(|s| s.running.root())
    }

    /// Whether screen `index` is the one on display.
    #[must_use]
    pub fn is_screen_showing(&self, index: usize) -> bool {
        self.screens
            .get(index)
            .is_some_and(|s| self.scene.is_visible(s.container))
    }

    /// The selected screen.
    #[must_use]
    pub fn screen_index(&self) -> &Property<usize> {
        &self.screen_index
    }

    /// Whether the home screen is up.
    #[must_use]
    pub fn show_home_screen(&self) -> &Property<bool> {
        &self.show_home_screen
    }

    /// Home screen button for screen `index`, if there is a home screen.
    #[must_use]
    pub fn home_screen_icon(&self, index: usize) -> Option<NodeId> {
        self.home.as_ref()?.icons.get(index).copied()
    }

    /// Navigation bar button for screen `index`.
    #[must_use]
    pub fn navigation_button(&self, index: usize) -> Option<NodeId> {
        self.navigation.buttons.get(index).copied()
    }

    /// Navigation bar button that returns to the home screen.
    #[must_use]
    pub fn home_button(&self) -> Option<NodeId> {
        self.navigation.home_button
    }

    /// The frame timer. Clones share listeners.
    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Pointer dispatch state.
    #[must_use]
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// The layer partition of the display.
    #[must_use]
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Number of frames stepped so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Current window size.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    /// Uses `clock` (microseconds, monotonic) to timestamp trace events.
    ///
    /// Without a clock, timestamps follow the timer's elapsed time, so phase
    /// durations read as zero.
    pub fn set_clock(&mut self, clock: impl FnMut() -> u64 + 'static) {
        self.clock = Some(Box::new(clock));
    }

    /// Cursor for the hovered node under a pointer.
    #[must_use]
    pub fn cursor(&self, pointer_id: u32) -> Option<&str> {
        self.input.cursor(&self.scene, pointer_id)
    }

    /// Lays the display out for a `width` by `height` window.
    ///
    /// Screens fill the area above the navigation bar, scaled to fit their
    /// layout bounds and centered. Empty or non-finite sizes, as reported by
    /// a minimized window, keep the previous layout.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            log::debug!("ignoring resize of {} to {width}x{height}", self.name);
            return;
        }
        if self.size == (width, height) {
            return;
        }
        self.size = (width, height);
        let screen_height = (height - NAVIGATION_BAR_HEIGHT).max(0.0);
        for slot in &self.screens {
            let transform = layout_transform(slot.running.layout_bounds(), width, screen_height);
            self.scene.set_transform(slot.frame, transform);
            self.scene.set_content(
                slot.background,
                NodeContent::Shape(Area::Rect(Rect::new(0.0, 0.0, width, screen_height))),
            );
        }
        if let Some(home) = &self.home {
            home.layout(&mut self.scene, width, height);
        }
        self.navigation.layout(&mut self.scene, width, height);
        log::trace!("laid out {} at {width}x{height}", self.name);
    }

    /// Layout transform of screen `index`'s view.
    #[must_use]
    pub fn screen_transform(&self, index: usize) -> Option<Affine> {
        self.screens
            .get(index)
            .map(|s| self.scene.transform(s.frame))
    }

    /// Resets every screen and returns to the startup selection.
    pub fn reset_all(&mut self) {
        for slot in &mut self.screens {
            slot.running.reset(&mut self.scene);
        }
        self.screen_index.reset();
        self.show_home_screen.reset();
        self.sync();
    }

    /// Runs one frame and repaints the layers it dirtied.
    ///
    /// `dt` is clamped to `[0, max_dt]`. The phases are:
    ///
    /// 1. **step**: the timer, then the showing screen's model and view
    /// 2. **evaluate**: dirty channels drained into scene changes
    /// 3. **layer**: the layer stack brought up to date
    /// 4. **paint**: dirty layers handed to `painter`
    pub fn step_frame(
        &mut self,
        dt: f64,
        painter: &mut dyn Painter,
        tracer: &mut Tracer<'_>,
    ) -> FrameSummary {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.max_dt)
        } else {
            0.0
        };
        let frame_index = self.frame_index;
        let step = FrameStepEvent {
            frame_index,
            dt,
            timestamp_us: self.now_us(),
        };
        tracer.frame_step(&step);
        let mut summary = FrameSummaryBuilder::new(&step);

        self.begin_phase(PhaseKind::Step, tracer, &mut summary);
        self.timer.step(dt);
        if !self.show_home_screen.get() {
            let index = self.screen_index.get();
            if let Some(slot) = self.screens.get_mut(index) {
                slot.running.step(&mut self.scene, dt);
            }
        }
        self.sync();
        self.end_phase(PhaseKind::Step, tracer, &mut summary);

        self.begin_phase(PhaseKind::Evaluate, tracer, &mut summary);
        let changes = self.scene.evaluate();
        tracer.evaluate(&EvaluateEvent::new(frame_index, &changes));
        self.end_phase(PhaseKind::Evaluate, tracer, &mut summary);

        self.begin_phase(PhaseKind::Layer, tracer, &mut summary);
        let update = self.layers.update(&self.scene, &changes);
        if update.rebuilt {
            let layers = self.layers.layers();
            tracer.layers_rebuilt(&LayersRebuiltEvent {
                frame_index,
                layers: count(layers.len()),
                painted_nodes: count(layers.iter().map(|l| l.nodes.len()).sum()),
            });
        }
        #[cfg(feature = "trace-rich")]
        if tracer.is_enabled() {
            let layer_changes = self.layer_changes(&changes);
            if !layer_changes.is_empty() {
                tracer.layer_changes(frame_index, &layer_changes);
            }
        }
        summary.set_rebuilt(update.rebuilt);
        self.end_phase(PhaseKind::Layer, tracer, &mut summary);

        self.begin_phase(PhaseKind::Paint, tracer, &mut summary);
        for &index in &update.dirty {
            let layer = &self.layers.layers()[index];
            tracer.layer_repaint(&LayerRepaintEvent {
                frame_index,
                layer_index: count(index),
                renderer: layer.renderer,
                nodes: count(layer.nodes.len()),
            });
        }
        let painted = self.layers.repaint(&self.scene, painter);
        summary.set_layers_repainted(count(painted));
        self.end_phase(PhaseKind::Paint, tracer, &mut summary);

        self.frame_index += 1;
        let summary = summary.finish();
        tracer.frame_summary(&summary);
        summary
    }

    /// Presses a pointer. Returns whether a listener handled it.
    pub fn pointer_down(&mut self, pointer_id: u32, kind: PointerKind, point: Point) -> bool {
        let handled = self
            .input
            .pointer_down(&mut self.scene, pointer_id, kind, point);
        self.sync();
        handled
    }

    /// Releases a pointer.
    pub fn pointer_up(&mut self, pointer_id: u32, kind: PointerKind, point: Point) -> bool {
        let handled = self
            .input
            .pointer_up(&mut self.scene, pointer_id, kind, point);
        self.sync();
        handled
    }

    /// Moves a pointer.
    pub fn pointer_move(&mut self, pointer_id: u32, kind: PointerKind, point: Point) -> bool {
        let handled = self
            .input
            .pointer_move(&mut self.scene, pointer_id, kind, point);
        self.sync();
        handled
    }

    /// Cancels a pointer.
    pub fn pointer_cancel(&mut self, pointer_id: u32) -> bool {
        let handled = self.input.pointer_cancel(&mut self.scene, pointer_id);
        self.sync();
        handled
    }

    /// Dispatches a raw pointer event.
    pub fn dispatch(&mut self, event: PointerEvent) -> bool {
        let handled = self.input.dispatch(&mut self.scene, event);
        self.sync();
        handled
    }

    /// Brings screen visibility and highlights in line with the selection.
    fn sync(&mut self) {
        let showing_home = self.show_home_screen.get();
        let mut selected = self.screen_index.get();
        if selected >= self.screens.len() {
            log::warn!("screen index {selected} out of range, selecting 0");
            selected = 0;
            self.screen_index.set(0);
        }
        for (index, slot) in self.screens.iter().enumerate() {
            show(
                &mut self.scene,
                slot.container,
                !showing_home && index == selected,
            );
        }
        if let Some(home) = &self.home {
            show(&mut self.scene, home.root, showing_home);
            home.highlight(&mut self.scene, selected);
        }
        self.navigation
            .sync(&mut self.scene, showing_home, selected);
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "elapsed microseconds fit in u64 for any realistic run"
    )]
    fn now_us(&mut self) -> u64 {
        match &mut self.clock {
            Some(clock) => clock(),
            None => (self.timer.elapsed() * 1_000_000.0) as u64,
        }
    }

    fn begin_phase(
        &mut self,
        phase: PhaseKind,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
    ) {
        let timestamp_us = self.now_us();
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            timestamp_us,
        });
        summary.phase_begin(phase, timestamp_us);
    }

    fn end_phase(
        &mut self,
        phase: PhaseKind,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
    ) {
        let timestamp_us = self.now_us();
        tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            timestamp_us,
        });
        summary.phase_end(phase, timestamp_us);
    }

    #[cfg(feature = "trace-rich")]
    fn layer_changes(
        &self,
        changes: &strata_core::node::SceneChanges,
    ) -> Vec<strata_core::trace::LayerChange> {
        use strata_core::trace::{LayerChange, LayerField};

        let mut out = Vec::new();
        for (field, slots) in [
            (LayerField::Transform, &changes.transforms),
            (LayerField::Opacity, &changes.opacities),
            (LayerField::Paint, &changes.paints),
            (LayerField::Clip, &changes.clips),
        ] {
            for &idx in slots {
                let Some(layer) = self.layers.layer_of(self.scene.id_at(idx)) else {
                    continue;
                };
                let change = LayerChange {
                    layer_index: count(layer),
                    field,
                };
                if !out.contains(&change) {
                    out.push(change);
                }
            }
        }
        out
    }
}
