// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bulk node configuration.
//!
//! [`NodeOptions`] names every attribute a node can be configured with.
//! [`Scene::mutate`] validates the whole set before applying any of it, so a
//! rejected set leaves the node untouched.
//!
//! Options apply in a fixed order: interaction and paint state first, then
//! the transform (`transform`, `translation`, `x`, `y`, `rotation`, `scale`),
//! then content and paints, and bounds-based positioning (`left`, `right`,
//! `center_x`, `top`, `bottom`, `center_y`) last so that it sees the final
//! bounds.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Affine, Vec2};

use super::content::NodeContent;
use super::id::NodeId;
use super::store::Scene;
use crate::geom::Area;
use crate::input::InputListener;
use crate::paint::{Color, ColorParseError, Paint};
use crate::renderer::Renderer;

/// Why a [`NodeOptions`] set was rejected.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum OptionsError {
    /// The key is not a node option.
    #[error("unknown node option `{0}`")]
    UnknownKey(String),
    /// The same key appeared twice in an entry list.
    #[error("node option `{0}` given more than once")]
    DuplicateKey(String),
    /// The value has the wrong kind for its key.
    #[error("node option `{key}` expects {expected}")]
    WrongType {
        /// The offending key.
        key: String,
        /// Description of the accepted value kinds.
        expected: &'static str,
    },
    /// Two keys set the same part of the node's placement.
    #[error("node options `{0}` and `{1}` overlap")]
    ConflictingKeys(&'static str, &'static str),
    /// A scale of zero or a non-finite scale, or a scale applied to a
    /// degenerate transform.
    #[error("invalid scale {0}")]
    InvalidScale(f64),
    /// Opacity outside `[0, 1]`.
    #[error("opacity {0} out of range [0, 1]")]
    OpacityOutOfRange(f32),
    /// Negative stroke width.
    #[error("negative line width {0}")]
    NegativeLineWidth(f64),
    /// A NaN or infinite number.
    #[error("node option `{0}` is not finite")]
    NonFinite(&'static str),
    /// A color string failed to parse.
    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),
}

/// A dynamically typed option value, for [`NodeOptions::from_entries`].
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    /// A number.
    Number(f64),
    /// A flag.
    Bool(bool),
    /// A string: cursor names, renderer names, and CSS colors.
    Text(String),
    /// A paint.
    Paint(Paint),
    /// An area.
    Area(Area),
    /// A renderer.
    Renderer(Renderer),
    /// A vector.
    Vec2(Vec2),
    /// A transform.
    Affine(Affine),
    /// Node content.
    Content(NodeContent),
    /// Input listeners to attach.
    Listeners(InputListeners),
}

/// A list of shared input listeners, comparing by identity.
#[derive(Clone, Default)]
pub struct InputListeners(pub Vec<Rc<dyn InputListener>>);

impl fmt::Debug for InputListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputListeners({})", self.0.len())
    }
}

impl PartialEq for InputListeners {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self.0.iter().zip(&other.0).all(|(a, b)| Rc::ptr_eq(a, b))
    }
}

/// Every attribute a node can be configured with; `None` leaves it alone.
#[derive(Clone, Default)]
pub struct NodeOptions {
    /// Hover cursor.
    pub cursor: Option<String>,
    /// Visibility.
    pub visible: Option<bool>,
    /// Pickability override.
    pub pickable: Option<bool>,
    /// Listeners to attach.
    pub input_listeners: Vec<Rc<dyn InputListener>>,
    /// Own opacity in `[0, 1]`.
    pub opacity: Option<f32>,
    /// Full local transform.
    pub transform: Option<Affine>,
    /// Translation.
    pub translation: Option<Vec2>,
    /// Horizontal translation.
    pub x: Option<f64>,
    /// Vertical translation.
    pub y: Option<f64>,
    /// Rotation in radians.
    pub rotation: Option<f64>,
    /// Scale magnitude.
    pub scale: Option<f64>,
    /// Renderer override.
    pub renderer: Option<Renderer>,
    /// Layer isolation.
    pub layer_split: Option<bool>,
    /// Painted content.
    pub content: Option<NodeContent>,
    /// Fill paint.
    pub fill: Option<Paint>,
    /// Stroke paint.
    pub stroke: Option<Paint>,
    /// Stroke width.
    pub line_width: Option<f64>,
    /// Clip area.
    pub clip_area: Option<Area>,
    /// Touch hit area.
    pub touch_area: Option<Area>,
    /// Mouse hit area.
    pub mouse_area: Option<Area>,
    /// Left edge of the bounds in the parent frame.
    pub left: Option<f64>,
    /// Right edge of the bounds in the parent frame.
    pub right: Option<f64>,
    /// Horizontal center of the bounds in the parent frame.
    pub center_x: Option<f64>,
    /// Top edge of the bounds in the parent frame.
    pub top: Option<f64>,
    /// Bottom edge of the bounds in the parent frame.
    pub bottom: Option<f64>,
    /// Vertical center of the bounds in the parent frame.
    pub center_y: Option<f64>,
}

impl fmt::Debug for NodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeOptions")
            .field("cursor", &self.cursor)
            .field("visible", &self.visible)
            .field("pickable", &self.pickable)
            .field("input_listeners", &self.input_listeners.len())
            .field("opacity", &self.opacity)
            .field("transform", &self.transform)
            .field("translation", &self.translation)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("renderer", &self.renderer)
            .field("layer_split", &self.layer_split)
            .field("content", &self.content)
            .field("fill", &self.fill)
            .field("stroke", &self.stroke)
            .field("line_width", &self.line_width)
            .field("clip_area", &self.clip_area)
            .field("touch_area", &self.touch_area)
            .field("mouse_area", &self.mouse_area)
            .field("left", &self.left)
            .field("right", &self.right)
            .field("center_x", &self.center_x)
            .field("top", &self.top)
            .field("bottom", &self.bottom)
            .field("center_y", &self.center_y)
            .finish()
    }
}

impl NodeOptions {
    /// Recognized keys, in application order.
    pub const KEYS: &'static [&'static str] = &[
        "cursor",
        "visible",
        "pickable",
        "input_listeners",
        "opacity",
        "transform",
        "translation",
        "x",
        "y",
        "rotation",
        "scale",
        "renderer",
        "layer_split",
        "content",
        "fill",
        "stroke",
        "line_width",
        "clip_area",
        "touch_area",
        "mouse_area",
        "left",
        "right",
        "center_x",
        "top",
        "bottom",
        "center_y",
    ];

    /// Builds options from key/value pairs.
    ///
    /// Colors may be given as CSS strings and renderers by name. The result
    /// is validated before it is returned.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, OptionValue)>,
    ) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        let mut seen: Vec<&str> = Vec::new();
        for (key, value) in entries {
            if seen.contains(&key) {
                return Err(OptionsError::DuplicateKey(key.to_string()));
            }
            seen.push(key);
            options.set_entry(key, value)?;
        }
        options.validate()?;
        Ok(options)
    }

    /// Checks every option without touching a scene.
    ///
    /// `transform` replaces the whole placement and `translation` both axes,
    /// so neither combines with the finer keys it covers.
    pub fn validate(&self) -> Result<(), OptionsError> {
        exclusive(&[
            ("transform", self.transform.is_some()),
            ("translation", self.translation.is_some()),
        ])?;
        exclusive(&[
            ("translation", self.translation.is_some()),
            ("x", self.x.is_some()),
        ])?;
        exclusive(&[
            ("translation", self.translation.is_some()),
            ("y", self.y.is_some()),
        ])?;
        exclusive(&[
            ("x", self.x.is_some()),
            ("left", self.left.is_some()),
            ("right", self.right.is_some()),
            ("center_x", self.center_x.is_some()),
        ])?;
        exclusive(&[
            ("y", self.y.is_some()),
            ("top", self.top.is_some()),
            ("bottom", self.bottom.is_some()),
            ("center_y", self.center_y.is_some()),
        ])?;

        for (key, value) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation),
            ("left", self.left),
            ("right", self.right),
            ("center_x", self.center_x),
            ("top", self.top),
            ("bottom", self.bottom),
            ("center_y", self.center_y),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(OptionsError::NonFinite(key));
            }
        }
        if self.translation.is_some_and(|t| !t.is_finite()) {
            return Err(OptionsError::NonFinite("translation"));
        }
        if self.transform.is_some_and(|t| !t.is_finite()) {
            return Err(OptionsError::NonFinite("transform"));
        }
        if let Some(scale) = self.scale {
            if !scale.is_finite() || scale == 0.0 {
                return Err(OptionsError::InvalidScale(scale));
            }
        }
        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(OptionsError::OpacityOutOfRange(opacity));
            }
        }
        if let Some(line_width) = self.line_width {
            if !line_width.is_finite() {
                return Err(OptionsError::NonFinite("line_width"));
            }
            if line_width < 0.0 {
                return Err(OptionsError::NegativeLineWidth(line_width));
            }
        }
        Ok(())
    }

    fn set_entry(&mut self, key: &str, value: OptionValue) -> Result<(), OptionsError> {
        use OptionValue as V;

        let wrong = |expected: &'static str| OptionsError::WrongType {
            key: key.to_string(),
            expected,
        };
        let number = |value: OptionValue| -> Result<f64, OptionsError> {
            match value {
                V::Number(n) => Ok(n),
                _ => Err(wrong("a number")),
            }
        };
        let flag = |value: OptionValue| -> Result<bool, OptionsError> {
            match value {
                V::Bool(b) => Ok(b),
                _ => Err(wrong("a bool")),
            }
        };
        let paint = |value: OptionValue| -> Result<Paint, OptionsError> {
            match value {
                V::Paint(p) => Ok(p),
                V::Text(css) => Ok(Paint::Color(Color::parse(&css)?)),
                _ => Err(wrong("a paint or CSS color")),
            }
        };
        let area = |value: OptionValue| -> Result<Area, OptionsError> {
            match value {
                V::Area(a) => Ok(a),
                _ => Err(wrong("an area")),
            }
        };

        match key {
            "cursor" => match value {
                V::Text(name) => self.cursor = Some(name),
                _ => return Err(wrong("a cursor name")),
            },
            "visible" => self.visible = Some(flag(value)?),
            "pickable" => self.pickable = Some(flag(value)?),
            "input_listeners" => match value {
                V::Listeners(listeners) => self.input_listeners = listeners.0,
                _ => return Err(wrong("input listeners")),
            },
            "opacity" => {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "opacity is stored as f32"
                )]
                let opacity = number(value)? as f32;
                self.opacity = Some(opacity);
            }
            "transform" => match value {
                V::Affine(t) => self.transform = Some(t),
                _ => return Err(wrong("a transform")),
            },
            "translation" => match value {
                V::Vec2(v) => self.translation = Some(v),
                _ => return Err(wrong("a vector")),
            },
            "x" => self.x = Some(number(value)?),
            "y" => self.y = Some(number(value)?),
            "rotation" => self.rotation = Some(number(value)?),
            "scale" => self.scale = Some(number(value)?),
            "renderer" => match value {
                V::Renderer(r) => self.renderer = Some(r),
                V::Text(name) => {
                    self.renderer =
                        Some(Renderer::from_name(&name).ok_or_else(|| wrong("a renderer name"))?);
                }
                _ => return Err(wrong("a renderer")),
            },
            "layer_split" => self.layer_split = Some(flag(value)?),
            "content" => match value {
                V::Content(c) => self.content = Some(c),
                V::Area(a) => self.content = Some(NodeContent::Shape(a)),
                _ => return Err(wrong("node content or an area")),
            },
            "fill" => self.fill = Some(paint(value)?),
            "stroke" => self.stroke = Some(paint(value)?),
            "line_width" => self.line_width = Some(number(value)?),
            "clip_area" => self.clip_area = Some(area(value)?),
            "touch_area" => self.touch_area = Some(area(value)?),
            "mouse_area" => self.mouse_area = Some(area(value)?),
            "left" => self.left = Some(number(value)?),
            "right" => self.right = Some(number(value)?),
            "center_x" => self.center_x = Some(number(value)?),
            "top" => self.top = Some(number(value)?),
            "bottom" => self.bottom = Some(number(value)?),
            "center_y" => self.center_y = Some(number(value)?),
            _ => return Err(OptionsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn exclusive(keys: &[(&'static str, bool)]) -> Result<(), OptionsError> {
    let mut present = keys.iter().filter(|(_, set)| *set).map(|(key, _)| *key);
    match (present.next(), present.next()) {
        (Some(first), Some(second)) => Err(OptionsError::ConflictingKeys(first, second)),
        _ => Ok(()),
    }
}

impl Scene {
    /// Applies every option in `options` to `id`, or none of them.
    pub fn mutate(&mut self, id: NodeId, options: &NodeOptions) -> Result<(), OptionsError> {
        self.validate(id);
        options.validate()?;
        if let Some(scale) = options.scale {
            let base = options.transform.unwrap_or_else(|| self.transform(id));
            let [a, b, ..] = base.as_coeffs();
            if libm::hypot(a, b) == 0.0 {
                return Err(OptionsError::InvalidScale(scale));
            }
        }

        if let Some(cursor) = &options.cursor {
            self.set_cursor(id, Some(cursor.clone()));
        }
        if let Some(visible) = options.visible {
            self.set_visible(id, visible);
        }
        if let Some(pickable) = options.pickable {
            self.set_pickable(id, Some(pickable));
        }
        for listener in &options.input_listeners {
            self.add_input_listener(id, listener.clone());
        }
        if let Some(opacity) = options.opacity {
            self.set_opacity(id, opacity);
        }

        if let Some(transform) = options.transform {
            self.set_transform(id, transform);
        }
        if let Some(translation) = options.translation {
            self.set_translation(id, translation);
        }
        if let Some(x) = options.x {
            self.set_x(id, x);
        }
        if let Some(y) = options.y {
            self.set_y(id, y);
        }
        if let Some(rotation) = options.rotation {
            self.set_rotation(id, rotation);
        }
        if let Some(scale) = options.scale {
            self.set_scale_magnitude(id, scale);
        }

        if let Some(renderer) = options.renderer {
            self.set_renderer(id, Some(renderer));
        }
        if let Some(split) = options.layer_split {
            self.set_layer_split(id, split);
        }
        if let Some(content) = &options.content {
            self.set_content(id, content.clone());
        }
        if let Some(fill) = &options.fill {
            self.set_fill(id, fill.clone());
        }
        if let Some(stroke) = &options.stroke {
            self.set_stroke(id, stroke.clone());
        }
        if let Some(line_width) = options.line_width {
            self.set_line_width(id, line_width);
        }
        if let Some(area) = &options.clip_area {
            self.set_clip_area(id, Some(area.clone()));
        }
        if let Some(area) = &options.touch_area {
            self.set_touch_area(id, Some(area.clone()));
        }
        if let Some(area) = &options.mouse_area {
            self.set_mouse_area(id, Some(area.clone()));
        }

        if let Some(left) = options.left {
            self.set_left(id, left);
        }
        if let Some(right) = options.right {
            self.set_right(id, right);
        }
        if let Some(center_x) = options.center_x {
            self.set_center_x(id, center_x);
        }
        if let Some(top) = options.top {
            self.set_top(id, top);
        }
        if let Some(bottom) = options.bottom {
            self.set_bottom(id, bottom);
        }
        if let Some(center_y) = options.center_y {
            self.set_center_y(id, center_y);
        }
        Ok(())
    }
}
