// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Colors and fill/stroke paints.
//!
//! [`Color`] parses the CSS color syntaxes simulations use in practice:
//! `transparent`, the basic CSS keywords, `#rgb`, `#rrggbb`, `rgb()`,
//! `rgba()`, `hsl()`, and `hsla()`. Whitespace is ignored and matching is
//! case-insensitive.
//!
//! A [`Paint`] is either nothing, a solid color, or a [`LinearGradient`] /
//! [`RadialGradient`] defined in the local frame of the node it paints.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use kurbo::Point;

use crate::renderer::RendererMask;

/// Default factor for [`Color::brighter_color`] and [`Color::darker_color`].
pub const DEFAULT_COLOR_FACTOR: f64 = 0.7;

/// A string could not be parsed as a color.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unable to parse color string `{0}`")]
pub struct ColorParseError(pub String);

/// An sRGB color with 8-bit channels and a floating-point alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `[0, 1]`.
    pub a: f32,
}

const BASIC_KEYWORDS: &[(&str, [u8; 3])] = &[
    ("aqua", [0x00, 0xff, 0xff]),
    ("black", [0x00, 0x00, 0x00]),
    ("blue", [0x00, 0x00, 0xff]),
    ("cyan", [0x00, 0xff, 0xff]),
    ("fuchsia", [0xff, 0x00, 0xff]),
    ("gray", [0x80, 0x80, 0x80]),
    ("green", [0x00, 0x80, 0x00]),
    ("grey", [0x80, 0x80, 0x80]),
    ("lightgray", [0xd3, 0xd3, 0xd3]),
    ("lime", [0x00, 0xff, 0x00]),
    ("magenta", [0xff, 0x00, 0xff]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
    ("olive", [0x80, 0x80, 0x00]),
    ("orange", [0xff, 0xa5, 0x00]),
    ("pink", [0xff, 0xc0, 0xcb]),
    ("purple", [0x80, 0x00, 0x80]),
    ("red", [0xff, 0x00, 0x00]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("teal", [0x00, 0x80, 0x80]),
    ("white", [0xff, 0xff, 0xff]),
    ("yellow", [0xff, 0xff, 0x00]),
];

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0.0);

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// A color with alpha; `a` is clamped to `[0, 1]`.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// A color from hue in degrees, saturation and lightness in percent.
    #[must_use]
    pub fn hsla(hue: f64, saturation: f64, lightness: f64, alpha: f32) -> Self {
        let h = (hue % 360.0) / 360.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);
        let m2 = if l < 0.5 { l * (s + 1.0) } else { l + s - l * s };
        let m1 = l * 2.0 - m2;
        Self::rgba(
            channel(hue_to_rgb(m1, m2, h + 1.0 / 3.0) * 255.0),
            channel(hue_to_rgb(m1, m2, h) * 255.0),
            channel(hue_to_rgb(m1, m2, h - 1.0 / 3.0) * 255.0),
            alpha,
        )
    }

    /// Returns this color with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Returns whether the color is fully transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.a == 0.0
    }

    /// Brightens in RGB space by dividing each channel by `factor`.
    ///
    /// `factor` defaults to [`DEFAULT_COLOR_FACTOR`].
    ///
    /// # Panics
    ///
    /// Panics if `factor` is outside `[0, 1]`.
    #[must_use]
    pub fn brighter_color(&self, factor: Option<f64>) -> Self {
        let factor = check_factor(factor);
        let brighten = |c: u8| channel(libm::floor(f64::from(c) / factor).min(255.0));
        Self::rgba(brighten(self.r), brighten(self.g), brighten(self.b), self.a)
    }

    /// Darkens in RGB space by multiplying each channel by `factor`.
    ///
    /// `factor` defaults to [`DEFAULT_COLOR_FACTOR`].
    ///
    /// # Panics
    ///
    /// Panics if `factor` is outside `[0, 1]`.
    #[must_use]
    pub fn darker_color(&self, factor: Option<f64>) -> Self {
        let factor = check_factor(factor);
        let darken = |c: u8| channel(libm::floor(factor * f64::from(c)).max(0.0));
        Self::rgba(darken(self.r), darken(self.g), darken(self.b), self.a)
    }

    /// Formats the color for a CSS or canvas style property.
    #[must_use]
    pub fn to_css(&self) -> String {
        if self.a == 1.0 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        parse_normalized(&normalized).ok_or_else(|| ColorParseError(input.to_string()))
    }
}

impl Color {
    /// Parses a CSS color string.
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError`] if no supported syntax matches.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        input.parse()
    }
}

fn parse_normalized(s: &str) -> Option<Color> {
    if s == "transparent" {
        return Some(Color::TRANSPARENT);
    }
    if let Some((_, [r, g, b])) = BASIC_KEYWORDS.iter().find(|(name, _)| *name == s) {
        return Some(Color::rgb(*r, *g, *b));
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = function_args(s, "rgba") {
        let [r, g, b, a] = split_args::<4>(args)?;
        return Some(Color::rgba(
            rgb_number(r)?,
            rgb_number(g)?,
            rgb_number(b)?,
            alpha_number(a)?,
        ));
    }
    if let Some(args) = function_args(s, "rgb") {
        let [r, g, b] = split_args::<3>(args)?;
        return Some(Color::rgb(rgb_number(r)?, rgb_number(g)?, rgb_number(b)?));
    }
    if let Some(args) = function_args(s, "hsla") {
        let [h, sat, l, a] = split_args::<4>(args)?;
        return Some(Color::hsla(
            raw_number(h)?,
            raw_number(sat.strip_suffix('%')?)?,
            raw_number(l.strip_suffix('%')?)?,
            alpha_number(a)?,
        ));
    }
    if let Some(args) = function_args(s, "hsl") {
        let [h, sat, l] = split_args::<3>(args)?;
        return Some(Color::hsla(
            raw_number(h)?,
            raw_number(sat.strip_suffix('%')?)?,
            raw_number(l.strip_suffix('%')?)?,
            1.0,
        ));
    }
    None
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
            Some(Color::rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?))
        }
        _ => None,
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')
}

fn split_args<const N: usize>(args: &str) -> Option<[&str; N]> {
    let mut out = [""; N];
    let mut parts = args.split(',');
    for slot in &mut out {
        *slot = parts.next()?;
    }
    parts.next().is_none().then_some(out)
}

/// An integer channel of up to three digits, optionally negative or a
/// percentage; the result is clamped to `[0, 255]`.
fn rgb_number(s: &str) -> Option<u8> {
    let (digits, multiplier) = match s.strip_suffix('%') {
        Some(digits) => (digits, 2.55),
        None => (s, 1.0),
    };
    let magnitude = digits.strip_prefix('-').unwrap_or(digits);
    if magnitude.is_empty() || magnitude.len() > 3 {
        return None;
    }
    let value: i32 = digits.parse().ok()?;
    Some(channel(f64::from(value) * multiplier))
}

fn raw_number(s: &str) -> Option<f64> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u16>().ok().map(f64::from)
}

fn alpha_number(s: &str) -> Option<f32> {
    if s.is_empty() || s.starts_with('-') {
        return None;
    }
    s.parse::<f32>().ok()
}

fn channel(value: f64) -> u8 {
    libm::round(value.clamp(0.0, 255.0)) as u8
}

fn check_factor(factor: Option<f64>) -> f64 {
    let factor = factor.unwrap_or(DEFAULT_COLOR_FACTOR);
    assert!(
        (0.0..=1.0).contains(&factor),
        "factor must be between 0 and 1: {factor}"
    );
    factor
}

fn hue_to_rgb(m1: f64, m2: f64, mut h: f64) -> f64 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

/// A color at a position along a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Position from the gradient's start (`0`) to its end (`1`).
    pub ratio: f64,
    /// Color at that position.
    pub color: Color,
}

fn push_stop(stops: &mut Vec<ColorStop>, ratio: f64, color: Color) {
    debug_assert!(
        (0.0..=1.0).contains(&ratio),
        "color stop ratio {ratio} out of range [0, 1]"
    );
    debug_assert!(
        stops.last().is_none_or(|last| last.ratio <= ratio),
        "color stops must be added in increasing ratio order"
    );
    stops.push(ColorStop {
        ratio: ratio.clamp(0.0, 1.0),
        color,
    });
}

/// A gradient along the line from `start` to `end`.
///
/// Coordinates are in the local frame of the painted node.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    /// Where ratio `0` lies.
    pub start: Point,
    /// Where ratio `1` lies.
    pub end: Point,
    /// Stops in increasing ratio order.
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    /// A gradient from `(x0, y0)` to `(x1, y1)` with no stops yet.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
            stops: Vec::new(),
        }
    }

    /// Appends a stop. Ratios must be in `[0, 1]` and non-decreasing.
    #[must_use]
    pub fn add_color_stop(mut self, ratio: f64, color: Color) -> Self {
        push_stop(&mut self.stops, ratio, color);
        self
    }
}

/// A two-circle radial gradient.
///
/// Ratio `0` lies on the start circle and ratio `1` on the end circle.
/// One circle must contain the focal point of the cone they span, which SVG
/// needs to express the gradient.
#[derive(Clone, Debug, PartialEq)]
pub struct RadialGradient {
    /// Center of the start circle.
    pub start: Point,
    /// Radius of the start circle.
    pub start_radius: f64,
    /// Center of the end circle.
    pub end: Point,
    /// Radius of the end circle.
    pub end_radius: f64,
    /// Stops in increasing ratio order.
    pub stops: Vec<ColorStop>,
}

/// A [`RadialGradient`] expressed with SVG's single circle and focal point.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgRadialGradient {
    /// Center of the larger circle (`cx`, `cy`).
    pub center: Point,
    /// Radius of the larger circle (`r`).
    pub radius: f64,
    /// Focal point (`fx`, `fy`).
    pub focal_point: Point,
    /// Stops remapped to run from the focal point outward.
    pub stops: Vec<ColorStop>,
}

impl RadialGradient {
    /// A gradient between the circles `(x0, y0, r0)` and `(x1, y1, r1)`.
    #[must_use]
    pub fn new(x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64) -> Self {
        let gradient = Self {
            start: Point::new(x0, y0),
            start_radius: r0,
            end: Point::new(x1, y1),
            end_radius: r1,
            stops: Vec::new(),
        };
        debug_assert!(
            if r0 >= r1 {
                gradient.focal_point().distance(gradient.start) <= r0
            } else {
                gradient.focal_point().distance(gradient.end) <= r1
            },
            "focal point of the radial gradient lies outside its larger circle"
        );
        gradient
    }

    /// Appends a stop. Ratios must be in `[0, 1]` and non-decreasing.
    #[must_use]
    pub fn add_color_stop(mut self, ratio: f64, color: Color) -> Self {
        push_stop(&mut self.stops, ratio, color);
        self
    }

    /// Apex of the cone through both circles.
    ///
    /// Concentric circles of equal radius have no apex; their shared center
    /// is returned.
    #[must_use]
    pub fn focal_point(&self) -> Point {
        let spread = self.start_radius - self.end_radius;
        if spread == 0.0 {
            return self.start;
        }
        self.start + (self.end - self.start) * (self.start_radius / spread)
    }

    /// Converts to SVG's form: the larger circle, the focal point, and stops
    /// that increase outward from the focal point.
    #[must_use]
    pub fn to_svg(&self) -> SvgRadialGradient {
        let start_is_larger = self.start_radius > self.end_radius;
        let max_radius = self.start_radius.max(self.end_radius);
        let min_radius = self.start_radius.min(self.end_radius);
        let map = |stop: &ColorStop| {
            let mut ratio = if start_is_larger {
                1.0 - stop.ratio
            } else {
                stop.ratio
            };
            if min_radius > 0.0 {
                let inner = min_radius / max_radius;
                ratio = inner + ratio * (1.0 - inner);
            }
            ColorStop {
                ratio,
                color: stop.color,
            }
        };
        let stops = if start_is_larger {
            self.stops.iter().rev().map(map).collect()
        } else {
            self.stops.iter().map(map).collect()
        };
        SvgRadialGradient {
            center: if start_is_larger { self.start } else { self.end },
            radius: max_radius,
            focal_point: self.focal_point(),
            stops,
        }
    }
}

/// How a shape's interior or outline is painted.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Paint {
    /// Nothing is painted.
    #[default]
    None,
    /// A solid color.
    Color(Color),
    /// A linear gradient.
    LinearGradient(LinearGradient),
    /// A radial gradient.
    RadialGradient(RadialGradient),
}

impl Paint {
    /// Returns whether this paint produces visible output.
    ///
    /// A gradient is visible if any of its stops is.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        match self {
            Self::None => false,
            Self::Color(color) => !color.is_transparent(),
            Self::LinearGradient(LinearGradient { stops, .. })
            | Self::RadialGradient(RadialGradient { stops, .. }) => {
                stops.iter().any(|stop| !stop.color.is_transparent())
            }
        }
    }

    /// The solid color, if this is one.
    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }

    /// Returns whether this is a linear or radial gradient.
    #[must_use]
    pub fn is_gradient(&self) -> bool {
        matches!(self, Self::LinearGradient(_) | Self::RadialGradient(_))
    }

    /// Renderers able to draw this paint. DOM elements only take solid
    /// colors.
    #[must_use]
    pub fn renderer_mask(&self) -> RendererMask {
        if self.is_gradient() {
            RendererMask::CANVAS.union(RendererMask::SVG)
        } else {
            RendererMask::ALL
        }
    }

    /// CSS color text for solid paints: `none` when nothing is painted.
    ///
    /// Gradients have no CSS color text and return `None`.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::None => Some("none".to_string()),
            Self::Color(color) => Some(color.to_css()),
            Self::LinearGradient(_) | Self::RadialGradient(_) => None,
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Color(color)
    }
}

impl From<LinearGradient> for Paint {
    fn from(gradient: LinearGradient) -> Self {
        Self::LinearGradient(gradient)
    }
}

impl From<RadialGradient> for Paint {
    fn from(gradient: RadialGradient) -> Self {
        Self::RadialGradient(gradient)
    }
}
