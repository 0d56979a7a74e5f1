// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The home screen: one large icon per screen.

use std::rc::Rc;

use kurbo::{Affine, Rect, Vec2};
use strata_core::geom::Area;
use strata_core::input::{InputEvent, InputListener, PointerKind};
use strata_core::node::{NodeContent, NodeId, Scene};
use strata_core::paint::Color;
use strata_core::property::Property;

use crate::screen::{DEFAULT_LAYOUT_BOUNDS, layout_transform};

const ICON_WIDTH: f64 = 150.0;
const ICON_HEIGHT: f64 = 100.0;
const ICON_SPACING: f64 = 30.0;
const LABEL_SIZE: f64 = 18.0;
const LABEL_GAP: f64 = 8.0;
const UNSELECTED_OPACITY: f32 = 0.5;

/// Scales and moves `id` so its bounds fill `width` by `height` at the
/// origin of its parent, keeping the aspect ratio.
pub(crate) fn fit_node(scene: &mut Scene, id: NodeId, width: f64, height: f64) {
    let Some(bounds) = scene.bounds(id) else {
        return;
    };
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return;
    }
    let scale = (width / bounds.width()).min(height / bounds.height());
    let dx = (width - bounds.width() * scale) / 2.0;
    let dy = (height - bounds.height() * scale) / 2.0;
    scene.set_transform(
        id,
        Affine::translate((dx, dy))
            * Affine::scale(scale)
            * Affine::translate((-bounds.x0, -bounds.y0)),
    );
}

/// Sets visibility only when it changes, so an unchanged scene stays clean.
pub(crate) fn show(scene: &mut Scene, id: NodeId, visible: bool) {
    if scene.is_visible(id) != visible {
        scene.set_visible(id, visible);
    }
}

/// Sets opacity only when it changes.
pub(crate) fn fade(scene: &mut Scene, id: NodeId, opacity: f32) {
    if scene.opacity(id) != opacity {
        scene.set_opacity(id, opacity);
    }
}

struct HomeIconListener {
    index: usize,
    screen_index: Property<usize>,
    show_home_screen: Property<bool>,
}

impl InputListener for HomeIconListener {
    fn down(&self, event: &mut InputEvent<'_>) {
        if self.screen_index.get() == self.index {
            self.show_home_screen.set(false);
        } else {
            self.screen_index.set(self.index);
        }
        event.handle();
    }

    fn enter(&self, event: &mut InputEvent<'_>) {
        if event.pointer_kind == PointerKind::Touch {
            self.screen_index.set(self.index);
        }
    }
}

/// Screen picker shown before entering a screen.
///
/// Pressing an icon selects its screen; pressing the selected icon enters
/// it. A touch sliding onto an icon selects it.
#[derive(Debug)]
pub(crate) struct HomeScreen {
    pub(crate) root: NodeId,
    background: NodeId,
    content: NodeId,
    pub(crate) icons: Vec<NodeId>,
}

impl HomeScreen {
    /// Builds the picker from already created icon nodes and their names.
    pub(crate) fn build(
        scene: &mut Scene,
        entries: Vec<(NodeId, String)>,
        screen_index: &Property<usize>,
        show_home_screen: &Property<bool>,
    ) -> Self {
        let root = scene.create_node();
        let background = scene.create_with_content(NodeContent::Shape(Area::Rect(
            DEFAULT_LAYOUT_BOUNDS,
        )));
        scene.set_fill(background, Color::BLACK);
        let content = scene.create_node();
        scene.add_child(root, background);
        scene.add_child(root, content);

        let count = entries.len() as f64;
        let row_width = count * ICON_WIDTH + (count - 1.0).max(0.0) * ICON_SPACING;
        let left = DEFAULT_LAYOUT_BOUNDS.center().x - row_width / 2.0;
        let top = DEFAULT_LAYOUT_BOUNDS.center().y - (ICON_HEIGHT + LABEL_GAP + LABEL_SIZE) / 2.0;

        let mut icons = Vec::with_capacity(entries.len());
        for (index, (icon, name)) in entries.into_iter().enumerate() {
            let button = scene.create_node();
            // A transparent frame keeps the whole cell pressable.
            let frame = scene.create_with_content(NodeContent::Shape(Area::rect(
                0.0,
                0.0,
                ICON_WIDTH,
                ICON_HEIGHT,
            )));
            scene.set_fill(frame, Color::TRANSPARENT);
            scene.add_child(button, frame);

            fit_node(scene, icon, ICON_WIDTH, ICON_HEIGHT);
            scene.add_child(button, icon);

            let label = scene.create_with_content(NodeContent::Text {
                text: name,
                font_size: LABEL_SIZE,
            });
            scene.set_fill(label, Color::WHITE);
            scene.set_pickable(label, Some(false));
            scene.add_child(button, label);
            scene.set_y(label, ICON_HEIGHT + LABEL_GAP + LABEL_SIZE);
            scene.set_center_x(label, ICON_WIDTH / 2.0);

            scene.set_cursor(button, Some("pointer".into()));
            scene.add_input_listener(
                button,
                Rc::new(HomeIconListener {
                    index,
                    screen_index: screen_index.clone(),
                    show_home_screen: show_home_screen.clone(),
                }),
            );
            scene.set_translation(
                button,
                Vec2::new(left + index as f64 * (ICON_WIDTH + ICON_SPACING), top),
            );
            scene.add_child(content, button);
            icons.push(button);
        }

        Self {
            root,
            background,
            content,
            icons,
        }
    }

    /// Fits the picker into a `width` by `height` window.
    pub(crate) fn layout(&self, scene: &mut Scene, width: f64, height: f64) {
        scene.set_content(
            self.background,
            NodeContent::Shape(Area::Rect(Rect::new(0.0, 0.0, width, height))),
        );
        scene.set_transform(
            self.content,
            layout_transform(DEFAULT_LAYOUT_BOUNDS, width, height),
        );
    }

    /// Dims every icon except the selected one.
    pub(crate) fn highlight(&self, scene: &mut Scene, selected: usize) {
        for (index, &icon) in self.icons.iter().enumerate() {
            let opacity = if index == selected {
                1.0
            } else {
                UNSELECTED_OPACITY
            };
            fade(scene, icon, opacity);
        }
    }
}
