// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What a node paints itself.

use alloc::string::String;

use kurbo::{Point, Rect};

use crate::canvas::CanvasPainting;
use crate::geom::Area;
use crate::paint::Paint;
use crate::renderer::RendererMask;

/// Approximate advance width of one character, as a fraction of font size.
const CHAR_WIDTH_EM: f64 = 0.6;
/// Ascent above the baseline, as a fraction of font size.
const ASCENT_EM: f64 = 0.8;
/// Descent below the baseline, as a fraction of font size.
const DESCENT_EM: f64 = 0.2;

/// A node's own painted content, independent of its children.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NodeContent {
    /// Paints nothing; only groups children.
    #[default]
    Group,
    /// A filled and/or stroked shape.
    Shape(Area),
    /// A single line of text with its baseline at `y = 0`.
    Text {
        /// The string to draw.
        text: String,
        /// Font size in local units.
        font_size: f64,
    },
    /// A bitmap drawn with its top-left corner at the origin.
    Image {
        /// Width in local units.
        width: f64,
        /// Height in local units.
        height: f64,
    },
    /// An embedded DOM element positioned at the origin.
    Dom {
        /// Width in local units.
        width: f64,
        /// Height in local units.
        height: f64,
    },
    /// Custom drawing on a canvas, confined to `bounds`.
    ///
    /// Nothing outside `bounds` is guaranteed to be repainted. The bounds
    /// also serve as the hit region.
    Canvas {
        /// Local-frame area the painting draws within.
        bounds: Rect,
        /// Draws the content.
        painting: CanvasPainting,
    },
}

impl NodeContent {
    /// Renderers able to draw this content.
    #[must_use]
    pub fn renderer_mask(&self) -> RendererMask {
        match self {
            Self::Group | Self::Text { .. } | Self::Image { .. } => RendererMask::ALL,
            Self::Shape(Area::Rect(_)) => RendererMask::ALL,
            Self::Shape(_) => RendererMask::CANVAS.union(RendererMask::SVG),
            Self::Dom { .. } => RendererMask::DOM,
            Self::Canvas { .. } => RendererMask::CANVAS,
        }
    }

    /// Returns whether this content produces any pixels with the given paints.
    #[must_use]
    pub fn is_painted(&self, fill: &Paint, stroke: &Paint) -> bool {
        match self {
            Self::Group => false,
            Self::Shape(_) => fill.is_visible() || stroke.is_visible(),
            Self::Text { text, .. } => !text.is_empty() && fill.is_visible(),
            Self::Image { .. } | Self::Dom { .. } | Self::Canvas { .. } => true,
        }
    }

    /// Local-frame bounds of the content, including half the stroke width for
    /// stroked shapes. `None` when the content has no extent.
    #[must_use]
    pub fn bounds(&self, stroke: &Paint, line_width: f64) -> Option<Rect> {
        match self {
            Self::Group => None,
            Self::Shape(area) => {
                let rect = area.bounding_box();
                if stroke.is_visible() && line_width > 0.0 {
                    Some(rect.inflate(line_width / 2.0, line_width / 2.0))
                } else {
                    Some(rect)
                }
            }
            Self::Text { text, font_size } => {
                if text.is_empty() {
                    return None;
                }
                let width = text.chars().count() as f64 * CHAR_WIDTH_EM * font_size;
                Some(Rect::new(
                    0.0,
                    -ASCENT_EM * font_size,
                    width,
                    DESCENT_EM * font_size,
                ))
            }
            Self::Image { width, height } | Self::Dom { width, height } => {
                Some(Rect::new(0.0, 0.0, *width, *height))
            }
            Self::Canvas { bounds, .. } => Some(*bounds),
        }
    }

    /// Returns whether `point` (local frame) hits the content.
    ///
    /// Shapes hit on their interior regardless of fill; everything else hits
    /// within its bounds.
    #[must_use]
    pub fn contains(&self, point: Point, stroke: &Paint, line_width: f64) -> bool {
        match self {
            Self::Group => false,
            Self::Shape(area) => {
                area.contains(point)
                    || (stroke.is_visible()
                        && line_width > 0.0
                        && area.dilated(line_width / 2.0).contains(point))
            }
            _ => self
                .bounds(stroke, line_width)
                .is_some_and(|rect| rect.contains(point)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::paint::Color;

    use super::*;

    #[test]
    fn text_bounds_are_approximated_from_font_size() {
        let text = NodeContent::Text {
            text: "abcd".into(),
            font_size: 10.0,
        };
        let bounds = text.bounds(&Paint::None, 1.0).unwrap();
        assert!((bounds.width() - 24.0).abs() < 1e-9);
        assert!((bounds.y0 + 8.0).abs() < 1e-9);
        assert!((bounds.y1 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn stroke_inflates_shape_bounds() {
        let shape = NodeContent::Shape(Area::rect(0.0, 0.0, 10.0, 10.0));
        let stroke = Paint::from(Color::BLACK);
        assert_eq!(
            shape.bounds(&stroke, 4.0),
            Some(Rect::new(-2.0, -2.0, 12.0, 12.0))
        );
        assert_eq!(
            shape.bounds(&Paint::None, 4.0),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn canvas_content_uses_declared_bounds() {
        let canvas = NodeContent::Canvas {
            bounds: Rect::new(0.0, 0.0, 50.0, 20.0),
            painting: CanvasPainting::new(|_| {}),
        };
        let stroke = Paint::from(Color::BLACK);
        assert_eq!(canvas.bounds(&stroke, 8.0), Some(Rect::new(0.0, 0.0, 50.0, 20.0)));
        assert!(canvas.is_painted(&Paint::None, &Paint::None));
        assert!(canvas.contains(Point::new(49.0, 1.0), &Paint::None, 0.0));
        assert!(!canvas.contains(Point::new(51.0, 1.0), &Paint::None, 0.0));
        assert_eq!(canvas.renderer_mask(), RendererMask::CANVAS);
    }

    #[test]
    fn painted_state() {
        let shape = NodeContent::Shape(Area::circle(0.0, 0.0, 1.0));
        assert!(!shape.is_painted(&Paint::None, &Paint::None));
        assert!(shape.is_painted(&Color::BLACK.into(), &Paint::None));
        assert!(!NodeContent::Group.is_painted(&Color::BLACK.into(), &Paint::None));
        assert_eq!(
            NodeContent::Dom {
                width: 1.0,
                height: 1.0
            }
            .renderer_mask(),
            RendererMask::DOM
        );
    }
}
