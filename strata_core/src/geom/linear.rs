// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// A linear mapping from the domain `[a1, a2]` to the range `[b1, b2]`.
///
/// Used for model-to-view coordinate conversion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFunction {
    a1: f64,
    a2: f64,
    b1: f64,
    b2: f64,
    clamp: bool,
}

impl LinearFunction {
    /// Maps `a1 -> b1` and `a2 -> b2`.
    ///
    /// With `clamp`, results are limited to the range between `b1` and `b2`.
    #[must_use]
    pub fn new(a1: f64, a2: f64, b1: f64, b2: f64, clamp: bool) -> Self {
        debug_assert!(a1 != a2, "degenerate domain [{a1}, {a2}]");
        Self {
            a1,
            a2,
            b1,
            b2,
            clamp,
        }
    }

    /// Evaluates the mapping at `a`.
    #[must_use]
    pub fn evaluate(&self, a: f64) -> f64 {
        let b = map(self.a1, self.a2, self.b1, self.b2, a);
        if self.clamp {
            clamp_between(b, self.b1, self.b2)
        } else {
            b
        }
    }

    /// Maps a range value back into the domain.
    #[must_use]
    pub fn inverse(&self, b: f64) -> f64 {
        let a = map(self.b1, self.b2, self.a1, self.a2, b);
        if self.clamp {
            clamp_between(a, self.a1, self.a2)
        } else {
            a
        }
    }

    /// Returns the inverse mapping as a function of its own.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self::new(self.b1, self.b2, self.a1, self.a2, self.clamp)
    }
}

fn map(a1: f64, a2: f64, b1: f64, b2: f64, a: f64) -> f64 {
    b1 + (a - a1) * (b2 - b1) / (a2 - a1)
}

fn clamp_between(value: f64, bound1: f64, bound2: f64) -> f64 {
    value.clamp(bound1.min(bound2), bound1.max(bound2))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn maps_and_inverts() {
        let f = LinearFunction::new(0.0, 10.0, 100.0, 200.0, false);
        assert_relative_eq!(f.evaluate(5.0), 150.0);
        assert_relative_eq!(f.evaluate(20.0), 300.0);
        assert_relative_eq!(f.inverse(125.0), 2.5);
        assert_relative_eq!(f.inverted().evaluate(200.0), 10.0);
    }

    #[test]
    fn clamps_to_range_with_reversed_bounds() {
        let f = LinearFunction::new(0.0, 1.0, 400.0, 0.0, true);
        assert_relative_eq!(f.evaluate(0.25), 300.0);
        assert_relative_eq!(f.evaluate(2.0), 0.0);
        assert_relative_eq!(f.evaluate(-1.0), 400.0);
        assert_relative_eq!(f.inverse(500.0), 0.0);
    }
}
