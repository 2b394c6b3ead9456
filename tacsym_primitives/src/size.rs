// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::Units;
use peniko::kurbo::Size;

/// How one dimension of a [`SizeRule`] is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Dimension {
    /// Keep the native dimension of the image.
    #[default]
    Native,
    /// Derive this dimension from the other one, preserving the image's aspect ratio.
    MaintainAspectRatio,
    /// Use an explicit value, in pixels or as a fraction of the container.
    Explicit(f64, Units),
}

/// Rule for sizing an image within a container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeRule {
    /// Rule for the width.
    pub width: Dimension,
    /// Rule for the height.
    pub height: Dimension,
}

impl SizeRule {
    /// A rule that keeps the native image size.
    pub const NATIVE: Self = Self {
        width: Dimension::Native,
        height: Dimension::Native,
    };

    /// An explicit size in pixels.
    pub fn from_pixels(width: f64, height: f64) -> Self {
        Self {
            width: Dimension::Explicit(width, Units::Pixels),
            height: Dimension::Explicit(height, Units::Pixels),
        }
    }

    /// An explicit height in pixels with the width following the aspect ratio.
    pub fn from_height(height: f64) -> Self {
        Self {
            width: Dimension::MaintainAspectRatio,
            height: Dimension::Explicit(height, Units::Pixels),
        }
    }

    /// Computes the size of a `rect` inside a `container`.
    ///
    /// Both results are truncated to whole pixels.
    pub fn compute(&self, rect: Size, container: Size) -> Size {
        let aspect = if rect.height != 0.0 {
            rect.width / rect.height
        } else {
            0.0
        };
        let (width, height) = match (self.width, self.height) {
            (
                Dimension::Native | Dimension::MaintainAspectRatio,
                Dimension::Native | Dimension::MaintainAspectRatio,
            ) => (rect.width, rect.height),
            (Dimension::MaintainAspectRatio, Dimension::Explicit(h, units)) => {
                let height = resolve(h, units, container.height);
                (height * aspect, height)
            }
            (Dimension::Explicit(w, units), Dimension::MaintainAspectRatio) => {
                let width = resolve(w, units, container.width);
                let height = if aspect != 0.0 { width / aspect } else { 0.0 };
                (width, height)
            }
            (width, height) => {
                let w = match width {
                    Dimension::Explicit(w, units) => resolve(w, units, container.width),
                    _ => rect.width,
                };
                let h = match height {
                    Dimension::Explicit(h, units) => resolve(h, units, container.height),
                    _ => rect.height,
                };
                (w, h)
            }
        };
        Size::new(width.trunc(), height.trunc())
    }
}

fn resolve(value: f64, units: Units, container: f64) -> f64 {
    match units {
        Units::Fraction => value * container,
        Units::Pixels | Units::InsetPixels => value,
    }
}
