// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The bar along the bottom of the window.

use std::rc::Rc;

use kurbo::{Rect, Vec2};
use strata_core::geom::Area;
use strata_core::input::{DownUpListener, DownUpOptions};
use strata_core::node::{NodeContent, NodeId, Scene};
use strata_core::paint::Color;
use strata_core::property::Property;

use crate::home::{fade, fit_node, show};

/// Height of the navigation bar in window pixels.
pub const NAVIGATION_BAR_HEIGHT: f64 = 40.0;

const BUTTON_WIDTH: f64 = 50.0;
const BUTTON_HEIGHT: f64 = 30.0;
const BUTTON_SPACING: f64 = 10.0;
const HOME_BUTTON_SIZE: f64 = 24.0;
const UNSELECTED_OPACITY: f32 = 0.4;

fn button(scene: &mut Scene, icon: NodeId, width: f64, height: f64) -> NodeId {
    let button = scene.create_node();
    let frame =
        scene.create_with_content(NodeContent::Shape(Area::rect(0.0, 0.0, width, height)));
    scene.set_fill(frame, Color::TRANSPARENT);
    scene.add_child(button, frame);
    fit_node(scene, icon, width, height);
    scene.add_child(button, icon);
    scene.set_cursor(button, Some("pointer".into()));
    button
}

/// Screen buttons and the home button.
#[derive(Debug)]
pub(crate) struct NavigationBar {
    pub(crate) root: NodeId,
    background: NodeId,
    pub(crate) buttons: Vec<NodeId>,
    pub(crate) home_button: Option<NodeId>,
}

impl NavigationBar {
    /// Builds the bar. `icons` are the per-screen button icons; a
    /// single-screen simulation passes none.
    pub(crate) fn build(
        scene: &mut Scene,
        icons: Vec<NodeId>,
        with_home_button: bool,
        screen_index: &Property<usize>,
        show_home_screen: &Property<bool>,
    ) -> Self {
        let root = scene.create_node();
        let background = scene.create_with_content(NodeContent::Shape(Area::rect(
            0.0,
            0.0,
            0.0,
            NAVIGATION_BAR_HEIGHT,
        )));
        scene.set_fill(background, Color::BLACK);
        scene.add_child(root, background);

        let mut buttons = Vec::with_capacity(icons.len());
        for (index, icon) in icons.into_iter().enumerate() {
            let button = button(scene, icon, BUTTON_WIDTH, BUTTON_HEIGHT);
            let selected = screen_index.clone();
            let listener = DownUpListener::new(DownUpOptions {
                up_inside: Some(Box::new(move |_, _| selected.set(index))),
                ..DownUpOptions::default()
            });
            scene.add_input_listener(button, Rc::new(listener));
            scene.add_child(root, button);
            buttons.push(button);
        }

        let home_button = with_home_button.then(|| {
            let house = scene.create_with_content(NodeContent::Shape(Area::rect(
                0.0,
                0.0,
                HOME_BUTTON_SIZE,
                HOME_BUTTON_SIZE,
            )));
            scene.set_fill(house, Color::WHITE);
            let button = button(scene, house, HOME_BUTTON_SIZE, HOME_BUTTON_SIZE);
            let show_home = show_home_screen.clone();
            let listener = DownUpListener::new(DownUpOptions {
                up_inside: Some(Box::new(move |_, _| show_home.set(true))),
                ..DownUpOptions::default()
            });
            scene.add_input_listener(button, Rc::new(listener));
            scene.add_child(root, button);
            button
        });

        Self {
            root,
            background,
            buttons,
            home_button,
        }
    }

    /// Stretches the bar along the bottom of a `width` by `height` window.
    pub(crate) fn layout(&self, scene: &mut Scene, width: f64, height: f64) {
        scene.set_translation(
            self.root,
            Vec2::new(0.0, (height - NAVIGATION_BAR_HEIGHT).max(0.0)),
        );
        scene.set_content(
            self.background,
            NodeContent::Shape(Area::Rect(Rect::new(
                0.0,
                0.0,
                width,
                NAVIGATION_BAR_HEIGHT,
            ))),
        );

        let count = self.buttons.len() as f64;
        let row_width = count * BUTTON_WIDTH + (count - 1.0).max(0.0) * BUTTON_SPACING;
        let left = (width - row_width) / 2.0;
        let top = (NAVIGATION_BAR_HEIGHT - BUTTON_HEIGHT) / 2.0;
        for (index, &button) in self.buttons.iter().enumerate() {
            let x = left + index as f64 * (BUTTON_WIDTH + BUTTON_SPACING);
            scene.set_translation(button, Vec2::new(x, top));
        }
        if let Some(home) = self.home_button {
            scene.set_translation(
                home,
                Vec2::new(
                    width - HOME_BUTTON_SIZE - BUTTON_SPACING,
                    (NAVIGATION_BAR_HEIGHT - HOME_BUTTON_SIZE) / 2.0,
                ),
            );
        }
    }

    /// Hides the bar over the home screen and dims unselected buttons.
    pub(crate) fn sync(&self, scene: &mut Scene, showing_home: bool, selected: usize) {
        show(scene, self.root, !showing_home);
        for (index, &button) in self.buttons.iter().enumerate() {
            let opacity = if index == selected {
                1.0
            } else {
                UNSELECTED_OPACITY
            };
            fade(scene, button, opacity);
        }
    }
}
