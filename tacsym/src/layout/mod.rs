// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-space layout of a symbol's icon and modifiers.
//!
//! Layout happens in local pixels with y increasing upward and the icon at the origin of its
//! own rectangle. Items are positioned with an offset/hot-spot pair: the offset picks an anchor
//! on a reference rectangle and the hot spot picks the point of the item that lands on it. The
//! [`LayoutMode`] chooses the reference rectangle and whether the item grows the layout
//! envelope that later relative items stack against.
//!
//! Glyphs and lines are drawn at icon scale. Labels are placed against rectangles scaled by the
//! symbol's scale factor but are drawn unscaled, so text stays readable while the icon shrinks.

mod layouter;

use peniko::color::{AlphaColor, Srgb};
use peniko::kurbo::{Point, Rect};
use smallvec::SmallVec;
use tacsym_draw::{FontSpec, IconSourceKey};

pub use layouter::Layouter;
pub(crate) use layouter::LayoutResources;

/// Reference rectangle and envelope participation of a placed item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
    /// Anchored to the icon rectangle; grows the layout envelope.
    Absolute,
    /// Anchored to the layout envelope so far, stacking outward; grows the envelope.
    Relative,
    /// Anchored to the icon rectangle without growing the layout envelope, for overlays that
    /// must not push later items outward.
    #[default]
    Overlay,
}

/// A modifier glyph placed in local pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedGlyph {
    /// Atlas key of the glyph image.
    pub source: IconSourceKey,
    /// Where the glyph is drawn, at icon scale.
    pub rect: Rect,
}

/// A text label placed against the scaled layout.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLabel {
    /// The text.
    pub text: String,
    /// Text origin (baseline start), in scaled local pixels.
    pub origin: Point,
    /// Font.
    pub font: FontSpec,
    /// Color, with the symbol opacity applied.
    pub color: AlphaColor<Srgb>,
}

/// A line strip in local pixels, drawn at icon scale.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    /// The vertices.
    pub points: SmallVec<[Point; 3]>,
}

/// The cached static layout of a symbol.
///
/// Valid only for the icon key and active modifiers that produced it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutResult {
    /// The icon, in local pixels.
    pub icon_rect: Option<Rect>,
    /// Envelope of the icon, glyphs and lines.
    pub screen_rect: Option<Rect>,
    /// Envelope of the items in [`LayoutMode::Absolute`] or [`LayoutMode::Relative`].
    pub layout_rect: Option<Rect>,
    /// The icon rectangle after scaling, grown to fit the expected label lines.
    pub icon_rect_scaled: Option<Rect>,
    /// The layout rectangle after scaling, grown to fit the expected label lines.
    pub layout_rect_scaled: Option<Rect>,
    /// Placed glyphs.
    pub glyphs: Vec<PlacedGlyph>,
    /// Placed labels.
    pub labels: Vec<PlacedLabel>,
}

/// Scales `rect`, growing each axis about its centre to at least `min_width` x `min_height`.
///
/// The origin is truncated and the size rounded up to whole pixels.
pub fn scale_rect(rect: Rect, min_width: f64, min_height: f64, sx: f64, sy: f64) -> Rect {
    let mut x = rect.x0 * sx;
    let mut y = rect.y0 * sy;
    let mut width = rect.width() * sx;
    let mut height = rect.height() * sy;
    if width < min_width {
        x += (width - min_width) / 2.0;
        width = min_width;
    }
    if height < min_height {
        y += (height - min_height) / 2.0;
        height = min_height;
    }
    let (x, y) = (x.trunc(), y.trunc());
    Rect::new(x, y, x + width.ceil(), y + height.ceil())
}

pub(crate) fn union(into: &mut Option<Rect>, rect: Rect) {
    *into = Some(into.map_or(rect, |r| r.union(rect)));
}

pub(crate) fn union_pt(into: &mut Option<Rect>, point: Point) {
    *into = Some(into.map_or_else(
        || Rect::from_points(point, point),
        |r| r.union_pt(point),
    ));
}
