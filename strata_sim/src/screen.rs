// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screens: a model paired with the view that draws it.

use std::fmt;

use kurbo::{Affine, Rect};
use strata_core::node::{NodeId, Scene};
use strata_core::paint::Color;

/// Layout bounds a view is designed for, unless it says otherwise.
pub const DEFAULT_LAYOUT_BOUNDS: Rect = Rect::new(0.0, 0.0, 768.0, 504.0);

/// Smallest scale [`layout_transform`] produces, so the transform stays
/// invertible for hit testing.
pub const MIN_LAYOUT_SCALE: f64 = 1e-6;

/// Builds an icon node in a scene.
pub type IconFactory = Box<dyn Fn(&mut Scene) -> NodeId>;

/// The state of one screen.
///
/// Models must not touch the scene; views observe them.
pub trait ScreenModel {
    /// Advances the model by `dt` seconds.
    fn step(&mut self, dt: f64) {
        _ = dt;
    }

    /// Returns the model to its initial state.
    fn reset(&mut self) {}
}

/// Scene-graph presentation of a screen's model.
pub trait ScreenView {
    /// Root of the view's subtree.
    fn root(&self) -> NodeId;

    /// Area, in the view's local frame, that layout fits into the window.
    fn layout_bounds(&self) -> Rect {
        DEFAULT_LAYOUT_BOUNDS
    }

    /// Advances view-only animation by `dt` seconds, after the model step.
    fn step(&mut self, scene: &mut Scene, dt: f64) {
        _ = (scene, dt);
    }

    /// Returns view-only state to its initial values.
    fn reset(&mut self, scene: &mut Scene) {
        _ = scene;
    }
}

impl ScreenModel for () {}

/// Optional per-screen settings.
pub struct ScreenOptions {
    /// Fill behind the view.
    pub background_color: Color,
    /// Icon for the navigation bar; the home screen icon is used when unset.
    pub navigation_bar_icon: Option<IconFactory>,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            background_color: Color::WHITE,
            navigation_bar_icon: None,
        }
    }
}

impl fmt::Debug for ScreenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenOptions")
            .field("background_color", &self.background_color)
            .field("navigation_bar_icon", &self.navigation_bar_icon.is_some())
            .finish()
    }
}

/// A model and view that were built in a scene.
pub(crate) trait RunningScreen {
    fn root(&self) -> NodeId;
    fn layout_bounds(&self) -> Rect;
    fn step(&mut self, scene: &mut Scene, dt: f64);
    fn reset(&mut self, scene: &mut Scene);
}

struct Running<M, V> {
    model: M,
    view: V,
}

impl<M: ScreenModel, V: ScreenView> RunningScreen for Running<M, V> {
    fn root(&self) -> NodeId {
        self.view.root()
    }

    fn layout_bounds(&self) -> Rect {
        self.view.layout_bounds()
    }

    fn step(&mut self, scene: &mut Scene, dt: f64) {
        self.model.step(dt);
        self.view.step(scene, dt);
    }

    fn reset(&mut self, scene: &mut Scene) {
        self.model.reset();
        self.view.reset(scene);
    }
}

type BuildFn = Box<dyn FnOnce(&mut Scene) -> Box<dyn RunningScreen>>;

/// One screen of a simulation.
///
/// The model and view are not created until the simulation builds its
/// scene. The view factory receives the freshly made model so it can link
/// to the model's properties.
pub struct Screen {
    name: String,
    icon: IconFactory,
    options: ScreenOptions,
    build: BuildFn,
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Screen {
    /// Creates a screen from its name, home screen icon, and factories.
    pub fn new<M, V>(
        name: impl Into<String>,
        icon: impl Fn(&mut Scene) -> NodeId + 'static,
        model_factory: impl FnOnce() -> M + 'static,
        view_factory: impl FnOnce(&M, &mut Scene) -> V + 'static,
        options: ScreenOptions,
    ) -> Self
    where
        M: ScreenModel + 'static,
        V: ScreenView + 'static,
    {
        Self {
            name: name.into(),
            icon: Box::new(icon),
            options,
            build: Box::new(move |scene| {
                let model = model_factory();
                let view = view_factory(&model, scene);
                Box::new(Running { model, view })
            }),
        }
    }

    /// The screen's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The screen's options.
    #[must_use]
    pub fn options(&self) -> &ScreenOptions {
        &self.options
    }

    pub(crate) fn into_parts(self) -> (String, IconFactory, ScreenOptions, BuildFn) {
        (self.name, self.icon, self.options, self.build)
    }
}

/// Transform that fits `layout_bounds` into a `width` by `height` area.
///
/// Scales uniformly by the smaller of the two ratios and centers the
/// leftover space along the other axis. The scale never drops below
/// [`MIN_LAYOUT_SCALE`].
#[must_use]
pub fn layout_transform(layout_bounds: Rect, width: f64, height: f64) -> Affine {
    if layout_bounds.width() <= 0.0 || layout_bounds.height() <= 0.0 {
        return Affine::IDENTITY;
    }
    let scale_x = width / layout_bounds.width();
    let scale_y = height / layout_bounds.height();
    let scale = scale_x.min(scale_y).max(MIN_LAYOUT_SCALE);
    let (dx, dy) = if scale_x <= scale_y {
        (0.0, (height - layout_bounds.height() * scale) / 2.0)
    } else {
        ((width - layout_bounds.width() * scale) / 2.0, 0.0)
    };
    Affine::translate((dx, dy))
        * Affine::scale(scale)
        * Affine::translate((-layout_bounds.x0, -layout_bounds.y0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn wide_windows_center_horizontally() {
        let t = layout_transform(DEFAULT_LAYOUT_BOUNDS, 1536.0 + 200.0, 1008.0);
        assert_eq!(t * Point::ZERO, Point::new(100.0, 0.0));
        assert_eq!(t * Point::new(768.0, 504.0), Point::new(1636.0, 1008.0));
    }

    #[test]
    fn tall_windows_center_vertically() {
        let t = layout_transform(DEFAULT_LAYOUT_BOUNDS, 384.0, 352.0);
        assert_eq!(t * Point::ZERO, Point::new(0.0, 50.0));
        assert_eq!(t * Point::new(768.0, 504.0), Point::new(384.0, 302.0));
    }

    #[test]
    fn offset_layout_bounds_map_to_the_corner() {
        let bounds = Rect::new(100.0, 100.0, 200.0, 200.0);
        let t = layout_transform(bounds, 200.0, 200.0);
        assert_eq!(t * Point::new(100.0, 100.0), Point::ZERO);
    }

    #[test]
    fn screen_builds_lazily() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct View(NodeId);
        impl ScreenView for View {
            fn root(&self) -> NodeId {
                self.0
            }
        }

        let built = Rc::new(Cell::new(false));
        let flag = built.clone();
        let screen = Screen::new(
            "Intro",
            Scene::create_node,
            || (),
            move |_: &(), scene: &mut Scene| {
                flag.set(true);
                View(scene.create_node())
            },
            ScreenOptions::default(),
        );
        assert_eq!(screen.name(), "Intro");
        assert!(!built.get());

        let mut scene = Scene::new();
        let (_, _, _, build) = screen.into_parts();
        let running = build(&mut scene);
        assert!(built.get());
        assert_eq!(running.layout_bounds(), DEFAULT_LAYOUT_BOUNDS);
        assert!(scene.is_alive(running.root()));
    }

    #[test]
    fn empty_areas_keep_an_invertible_transform() {
        let t = layout_transform(DEFAULT_LAYOUT_BOUNDS, 0.0, 0.0);
        assert!(t.determinant() > 0.0);
        let back = t.inverse() * Point::new(1.0, 1.0);
        assert!(back.x.is_finite() && back.y.is_finite());
    }
}
