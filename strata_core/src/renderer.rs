// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering back-ends and capability masks.

use core::fmt;

/// A rendering technology a layer can be drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Renderer {
    /// An immediate-mode 2D canvas.
    Canvas,
    /// Retained SVG elements.
    Svg,
    /// Positioned DOM elements.
    Dom,
}

impl Renderer {
    /// All renderers, in preference order.
    pub const ALL: [Self; 3] = [Self::Canvas, Self::Svg, Self::Dom];

    /// Lowercase name, as used in option maps and diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Svg => "svg",
            Self::Dom => "dom",
        }
    }

    /// Looks up a renderer by its [`name`](Self::name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// The single-renderer mask.
    #[must_use]
    pub const fn mask(self) -> RendererMask {
        match self {
            Self::Canvas => RendererMask::CANVAS,
            Self::Svg => RendererMask::SVG,
            Self::Dom => RendererMask::DOM,
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of renderers that can draw some content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RendererMask(u8);

impl RendererMask {
    /// No renderer.
    pub const NONE: Self = Self(0);
    /// Canvas only.
    pub const CANVAS: Self = Self(0b001);
    /// SVG only.
    pub const SVG: Self = Self(0b010);
    /// DOM only.
    pub const DOM: Self = Self(0b100);
    /// Every renderer.
    pub const ALL: Self = Self(0b111);

    /// Returns whether `renderer` is in the set.
    #[must_use]
    pub const fn supports(self, renderer: Renderer) -> bool {
        self.0 & renderer.mask().0 != 0
    }

    /// Renderers present in both sets.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Renderers present in either set.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if no renderer is in the set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The most preferred renderer in the set.
    #[must_use]
    pub fn preferred(self) -> Option<Renderer> {
        Renderer::ALL.into_iter().find(|r| self.supports(*r))
    }
}

impl fmt::Debug for RendererMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(Renderer::ALL.into_iter().filter(|r| self.supports(*r)))
            .finish()
    }
}

impl From<Renderer> for RendererMask {
    fn from(renderer: Renderer) -> Self {
        renderer.mask()
    }
}
