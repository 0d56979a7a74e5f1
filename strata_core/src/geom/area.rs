// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed regions used for node content, clipping, and pointer areas.

use kurbo::{BezPath, Circle, Ellipse, Point, Rect, RoundedRect, Shape};

/// Curve flattening tolerance used when an area is converted to a path.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Extent of [`Area::plane`]: large enough to cover any window at the
/// layout scales simulations use.
pub const PLANE_RECT: Rect = Rect::new(-2000.0, -2000.0, 4000.0, 4000.0);

/// A closed region in some local coordinate frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Area {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A rectangle with rounded corners.
    RoundedRect(RoundedRect),
    /// A circle.
    Circle(Circle),
    /// A possibly rotated ellipse.
    Ellipse(Ellipse),
    /// An arbitrary closed path, filled with the non-zero rule.
    Path(BezPath),
}

impl Area {
    /// A rectangle from its top-left corner and size.
    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::Rect(Rect::new(x, y, x + width, y + height))
    }

    /// A circle centered at `(x, y)`.
    #[must_use]
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self::Circle(Circle::new((x, y), radius))
    }

    /// A rectangle covering the whole window, for backgrounds and for
    /// catching pointer events behind a popup.
    #[must_use]
    pub fn plane() -> Self {
        Self::Rect(PLANE_RECT)
    }

    /// Returns whether `point` lies inside the area.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(point),
            Self::RoundedRect(rect) => rect.contains(point),
            Self::Circle(circle) => circle.contains(point),
            Self::Ellipse(ellipse) => ellipse.contains(point),
            Self::Path(path) => path.contains(point),
        }
    }

    /// Returns the smallest axis-aligned rectangle containing the area.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Rect(rect) => *rect,
            Self::RoundedRect(rect) => rect.bounding_box(),
            Self::Circle(circle) => circle.bounding_box(),
            Self::Ellipse(ellipse) => ellipse.bounding_box(),
            Self::Path(path) => path.bounding_box(),
        }
    }

    /// Grows the area outward by `amount` on every side.
    ///
    /// Paths grow to their inflated bounding box.
    #[must_use]
    pub fn dilated(&self, amount: f64) -> Self {
        match self {
            Self::Rect(rect) => Self::Rect(rect.inflate(amount, amount)),
            Self::RoundedRect(rect) => {
                let radii = rect.radii();
                Self::RoundedRect(RoundedRect::from_rect(
                    rect.rect().inflate(amount, amount),
                    (
                        radii.top_left + amount,
                        radii.top_right + amount,
                        radii.bottom_right + amount,
                        radii.bottom_left + amount,
                    ),
                ))
            }
            Self::Circle(circle) => Self::Circle(Circle::new(circle.center, circle.radius + amount)),
            Self::Ellipse(ellipse) => {
                let radii = ellipse.radii();
                Self::Ellipse(Ellipse::new(
                    ellipse.center(),
                    (radii.x + amount, radii.y + amount),
                    ellipse.rotation(),
                ))
            }
            Self::Path(path) => Self::Rect(path.bounding_box().inflate(amount, amount)),
        }
    }

    /// Converts the area to a Bézier path.
    #[must_use]
    pub fn to_path(&self) -> BezPath {
        match self {
            Self::Rect(rect) => rect.to_path(PATH_TOLERANCE),
            Self::RoundedRect(rect) => rect.to_path(PATH_TOLERANCE),
            Self::Circle(circle) => circle.to_path(PATH_TOLERANCE),
            Self::Ellipse(ellipse) => ellipse.to_path(PATH_TOLERANCE),
            Self::Path(path) => path.clone(),
        }
    }
}

impl From<Rect> for Area {
    fn from(rect: Rect) -> Self {
        Self::Rect(rect)
    }
}

impl From<RoundedRect> for Area {
    fn from(rect: RoundedRect) -> Self {
        Self::RoundedRect(rect)
    }
}

impl From<Circle> for Area {
    fn from(circle: Circle) -> Self {
        Self::Circle(circle)
    }
}

impl From<Ellipse> for Area {
    fn from(ellipse: Ellipse) -> Self {
        Self::Ellipse(ellipse)
    }
}

impl From<BezPath> for Area {
    fn from(path: BezPath) -> Self {
        Self::Path(path)
    }
}
