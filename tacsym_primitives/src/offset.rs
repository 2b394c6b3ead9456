// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Vec2;

/// How one axis of an [`Offset`] is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Units {
    /// A fraction of the reference dimension, `0.0` at the minimum edge and `1.0` at the maximum.
    #[default]
    Fraction,
    /// An absolute distance in pixels from the minimum edge.
    Pixels,
    /// An absolute distance in pixels measured inward from the maximum edge.
    InsetPixels,
}

impl Units {
    fn resolve(self, value: f64, extent: f64) -> f64 {
        match self {
            Self::Fraction => value * extent,
            Self::Pixels => value,
            Self::InsetPixels => extent - value,
        }
    }
}

/// A point inside (or near) a rectangle, expressed independently of the rectangle's size.
///
/// Layout uses offsets in pairs: an *offset* picks the anchor on a reference rectangle and a
/// *hot spot* picks which point of the item being placed lands on that anchor. Coordinates are
/// y-up, so `(0.5, 1.0)` in fraction units is the top centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Offset {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
    /// Units of [`Offset::x`].
    pub x_units: Units,
    /// Units of [`Offset::y`].
    pub y_units: Units,
}

impl Offset {
    /// The centre of the reference rectangle.
    pub const CENTER: Self = Self::fraction(0.5, 0.5);

    /// The middle of the bottom edge.
    pub const BOTTOM_CENTER: Self = Self::fraction(0.5, 0.0);

    /// The middle of the top edge.
    pub const TOP_CENTER: Self = Self::fraction(0.5, 1.0);

    /// The middle of the left edge.
    pub const LEFT_CENTER: Self = Self::fraction(0.0, 0.5);

    /// The middle of the right edge.
    pub const RIGHT_CENTER: Self = Self::fraction(1.0, 0.5);

    /// The bottom left corner.
    pub const BOTTOM_LEFT: Self = Self::fraction(0.0, 0.0);

    /// The top right corner.
    pub const TOP_RIGHT: Self = Self::fraction(1.0, 1.0);

    /// Creates an offset with explicit units on each axis.
    pub const fn new(x: f64, y: f64, x_units: Units, y_units: Units) -> Self {
        Self {
            x,
            y,
            x_units,
            y_units,
        }
    }

    /// Creates an offset with both axes in [`Units::Fraction`].
    pub const fn fraction(x: f64, y: f64) -> Self {
        Self::new(x, y, Units::Fraction, Units::Fraction)
    }

    /// Creates an offset with both axes in [`Units::Pixels`].
    pub const fn pixels(x: f64, y: f64) -> Self {
        Self::new(x, y, Units::Pixels, Units::Pixels)
    }

    /// Resolves this offset against a `width` × `height` rectangle.
    ///
    /// The optional scale factors are applied after resolution.
    pub fn compute(&self, width: f64, height: f64, x_scale: Option<f64>, y_scale: Option<f64>) -> Vec2 {
        let mut dx = self.x_units.resolve(self.x, width);
        let mut dy = self.y_units.resolve(self.y, height);
        if let Some(sx) = x_scale {
            dx *= sx;
        }
        if let Some(sy) = y_scale {
            dy *= sy;
        }
        Vec2::new(dx, dy)
    }
}

impl Default for Offset {
    fn default() -> Self {
        Self::CENTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_offsets() {
        let v = Offset::TOP_CENTER.compute(40.0, 20.0, None, None);
        assert_eq!(v, Vec2::new(20.0, 20.0));
        let v = Offset::fraction(1.0, -0.1).compute(40.0, 20.0, None, None);
        assert_eq!(v.x, 40.0);
        assert!((v.y + 2.0).abs() < 1e-12, "unexpected y {}", v.y);
    }

    #[test]
    fn test_inset_pixels_and_scale() {
        let offset = Offset::new(5.0, 5.0, Units::InsetPixels, Units::Pixels);
        let v = offset.compute(40.0, 20.0, Some(2.0), None);
        assert_eq!(v, Vec2::new(70.0, 5.0));
    }
}
