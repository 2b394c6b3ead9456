// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::color::{AlphaColor, Srgb, palette};
use tacsym_draw::FontSpec;

use crate::{Error, ErrorKind};

/// Appearance of a symbol.
///
/// Every field is optional; a missing field is taken from the
/// [`SymbolContext`](crate::SymbolContext) defaults when the symbol is rendered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolAttributes {
    scale: Option<f64>,
    opacity: Option<f64>,
    interior_color: Option<AlphaColor<Srgb>>,
    text_color: Option<AlphaColor<Srgb>>,
    text_font: Option<FontSpec>,
}

impl SymbolAttributes {
    /// Creates attributes with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// The attributes used when nothing else is configured: scale 1, fully opaque, black
    /// text in the default font.
    pub fn defaults() -> Self {
        Self {
            scale: Some(1.0),
            opacity: Some(1.0),
            interior_color: None,
            text_color: Some(palette::css::BLACK),
            text_font: Some(FontSpec::default()),
        }
    }

    /// Icon scale factor.
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// Sets the icon scale factor. It must be finite and greater than zero.
    pub fn set_scale(&mut self, scale: Option<f64>) -> Result<(), Error> {
        if let Some(s) = scale {
            if !s.is_finite() || s <= 0.0 {
                return Err(Error::new(ErrorKind::InvalidScale, Some(s)));
            }
        }
        self.scale = scale;
        Ok(())
    }

    /// Opacity applied to the icon, glyphs and labels.
    pub fn opacity(&self) -> Option<f64> {
        self.opacity
    }

    /// Sets the opacity. It must lie in `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: Option<f64>) -> Result<(), Error> {
        if let Some(o) = opacity {
            if !(0.0..=1.0).contains(&o) {
                return Err(Error::new(ErrorKind::OpacityOutOfRange, Some(o)));
            }
        }
        self.opacity = opacity;
        Ok(())
    }

    /// Fill color passed to the icon retriever.
    pub fn interior_color(&self) -> Option<AlphaColor<Srgb>> {
        self.interior_color
    }

    /// Sets the fill color passed to the icon retriever.
    pub fn set_interior_color(&mut self, color: Option<AlphaColor<Srgb>>) {
        self.interior_color = color;
    }

    /// Label color. Its alpha is replaced by the opacity.
    pub fn text_color(&self) -> Option<AlphaColor<Srgb>> {
        self.text_color
    }

    /// Sets the label color.
    pub fn set_text_color(&mut self, color: Option<AlphaColor<Srgb>>) {
        self.text_color = color;
    }

    /// Label font.
    pub fn text_font(&self) -> Option<&FontSpec> {
        self.text_font.as_ref()
    }

    /// Sets the label font. Its size must be finite and greater than zero.
    pub fn set_text_font(&mut self, font: Option<FontSpec>) -> Result<(), Error> {
        if let Some(f) = &font {
            if !f.size.is_finite() || f.size <= 0.0 {
                return Err(Error::new(ErrorKind::InvalidFontSize, Some(f.size.into())));
            }
        }
        self.text_font = font;
        Ok(())
    }

    /// Returns these attributes with unset fields taken from `defaults`.
    #[must_use]
    pub fn merged_with(&self, defaults: &Self) -> Self {
        Self {
            scale: self.scale.or(defaults.scale),
            opacity: self.opacity.or(defaults.opacity),
            interior_color: self.interior_color.or(defaults.interior_color),
            text_color: self.text_color.or(defaults.text_color),
            text_font: self.text_font.clone().or_else(|| defaults.text_font.clone()),
        }
    }

    /// Resolves the attributes used for one frame, or `None` if a required field is unset.
    pub(crate) fn resolve(&self) -> Option<ActiveAttributes> {
        Some(ActiveAttributes {
            scale: self.scale?,
            opacity: self.opacity?,
            interior_color: self.interior_color,
            text_color: self.text_color?,
            text_font: self.text_font.clone()?,
        })
    }
}

/// Fully resolved attributes for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ActiveAttributes {
    pub(crate) scale: f64,
    pub(crate) opacity: f64,
    pub(crate) interior_color: Option<AlphaColor<Srgb>>,
    pub(crate) text_color: AlphaColor<Srgb>,
    pub(crate) text_font: FontSpec,
}

impl ActiveAttributes {
    /// Whether switching from `self` to `other` invalidates a cached layout.
    pub(crate) fn affects_layout(&self, other: &Self) -> bool {
        self.scale != other.scale
            || self.opacity != other.opacity
            || self.text_font != other.text_font
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "opacity lies in [0, 1] and only feeds a color channel"
    )]
    pub(crate) fn opacity_f32(&self) -> f32 {
        self.opacity as f32
    }

    /// The label color: the text color with its alpha replaced by the opacity.
    pub(crate) fn label_color(&self) -> AlphaColor<Srgb> {
        self.text_color.with_alpha(self.opacity_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_out_of_range_is_rejected() {
        let mut attrs = SymbolAttributes::new();
        attrs.set_opacity(Some(0.25)).unwrap();
        let err = attrs.set_opacity(Some(1.5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OpacityOutOfRange);
        assert_eq!(attrs.opacity(), Some(0.25));
        attrs.set_opacity(Some(0.5)).unwrap();
        assert_eq!(attrs.opacity(), Some(0.5));
    }

    #[test]
    fn test_invalid_scale_and_font() {
        let mut attrs = SymbolAttributes::new();
        assert!(attrs.set_scale(Some(0.0)).is_err());
        assert!(attrs.set_scale(Some(f64::INFINITY)).is_err());
        let font = FontSpec {
            size: -1.0,
            ..FontSpec::default()
        };
        assert_eq!(
            attrs.set_text_font(Some(font)).unwrap_err().kind(),
            ErrorKind::InvalidFontSize
        );
        assert_eq!(attrs, SymbolAttributes::new());
    }

    #[test]
    fn test_merge_fills_unset_fields() {
        let mut attrs = SymbolAttributes::new();
        attrs.set_scale(Some(2.0)).unwrap();
        let active = attrs
            .merged_with(&SymbolAttributes::defaults())
            .resolve()
            .unwrap();
        assert_eq!(active.scale, 2.0);
        assert_eq!(active.opacity, 1.0);
        assert!(SymbolAttributes::new().resolve().is_none());
    }
}
