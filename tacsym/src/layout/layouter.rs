// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use peniko::color::{AlphaColor, Srgb};
use peniko::kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;
use tacsym_draw::{
    FontSpec, GlyphAtlas, GlyphReferences, IconLoader, IconRetriever, IconSourceKey, TextMetrics,
};
use tacsym_primitives::{Modifiers, Offset};

use super::{
    LayoutMode, LayoutResult, PlacedGlyph, PlacedLabel, PlacedLine, scale_rect, union, union_pt,
};

/// Shared caches and per-symbol inputs borrowed for one layout pass.
pub(crate) struct LayoutResources<'a> {
    pub(crate) atlas: &'a mut GlyphAtlas,
    pub(crate) loader: &'a IconLoader,
    pub(crate) glyph_refs: &'a mut GlyphReferences,
    pub(crate) modifier_retriever: Option<&'a Arc<dyn IconRetriever>>,
    pub(crate) text: &'a mut dyn TextMetrics,
    pub(crate) font: &'a FontSpec,
    pub(crate) label_color: AlphaColor<Srgb>,
    pub(crate) now: Duration,
}

/// Places glyphs, labels and lines around a symbol's icon.
///
/// A [`SymbolKind`](crate::SymbolKind) receives a layouter in its layout hooks. Each placement
/// grows the screen rectangle used for culling; placements in [`LayoutMode::Absolute`] or
/// [`LayoutMode::Relative`] also grow the layout rectangle.
pub struct Layouter<'a> {
    res: LayoutResources<'a>,
    scale: Vec2,
    result: LayoutResult,
    lines: Vec<PlacedLine>,
    unresolved_glyph: bool,
}

impl<'a> Layouter<'a> {
    /// Starts a static layout pass with no icon.
    pub(crate) fn new(res: LayoutResources<'a>, scale: Vec2) -> Self {
        Self {
            res,
            scale,
            result: LayoutResult::default(),
            lines: Vec::new(),
            unresolved_glyph: false,
        }
    }

    /// Starts a dynamic pass over the rectangles of a cached static layout.
    pub(crate) fn dynamic(res: LayoutResources<'a>, scale: Vec2, cached: &LayoutResult) -> Self {
        let result = LayoutResult {
            icon_rect: cached.icon_rect,
            screen_rect: cached.screen_rect,
            layout_rect: cached.layout_rect,
            icon_rect_scaled: cached.icon_rect_scaled,
            layout_rect_scaled: cached.layout_rect_scaled,
            glyphs: Vec::new(),
            labels: Vec::new(),
        };
        Self {
            res,
            scale,
            result,
            lines: Vec::new(),
            unresolved_glyph: false,
        }
    }

    /// The icon rectangle, in local pixels.
    pub fn icon_rect(&self) -> Option<Rect> {
        self.result.icon_rect
    }

    /// The layout rectangle so far.
    pub fn layout_rect(&self) -> Option<Rect> {
        self.result.layout_rect
    }

    /// Scale applied to the icon for this frame.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Timestamp of the frame being laid out.
    pub fn now(&self) -> Duration {
        self.res.now
    }

    /// Measures `text` in `font`, or in the label font when `None`.
    pub fn measure_text(&mut self, text: &str, font: Option<&FontSpec>) -> Rect {
        let font = font.unwrap_or(self.res.font);
        self.res.text.measure_text(text, font)
    }

    pub(crate) fn set_icon_rect(&mut self, rect: Rect) {
        self.result.icon_rect = Some(rect);
        union(&mut self.result.screen_rect, rect);
        union(&mut self.result.layout_rect, rect);
    }

    /// Places a `size` item at icon scale and returns its rectangle.
    pub fn place_rect(
        &mut self,
        offset: Offset,
        hot_spot: Offset,
        size: Size,
        mode: LayoutMode,
    ) -> Rect {
        let icon = self.result.icon_rect.unwrap_or_default();
        let reference = match mode {
            LayoutMode::Relative => self.result.layout_rect.unwrap_or(icon),
            LayoutMode::Absolute | LayoutMode::Overlay => icon,
        };
        let rect = anchor(reference, offset, hot_spot, size);
        union(&mut self.result.screen_rect, rect);
        if mode != LayoutMode::Overlay {
            union(&mut self.result.layout_rect, rect);
        }
        rect
    }

    /// Places a `size` label against the scaled rectangles and returns its rectangle in scaled
    /// pixels.
    ///
    /// In [`LayoutMode::Absolute`] or [`LayoutMode::Relative`] the label also grows the layout
    /// rectangle by its unscaled footprint, so graphics placed later at icon scale do not
    /// overlap it.
    pub fn place_label_rect(
        &mut self,
        offset: Offset,
        hot_spot: Offset,
        size: Size,
        mode: LayoutMode,
    ) -> Rect {
        let icon = self
            .result
            .icon_rect_scaled
            .or(self.result.icon_rect)
            .unwrap_or_default();
        let reference = match mode {
            LayoutMode::Relative => self.result.layout_rect_scaled.unwrap_or(icon),
            LayoutMode::Absolute | LayoutMode::Overlay => icon,
        };
        let rect = anchor(reference, offset, hot_spot, size);
        if mode != LayoutMode::Overlay {
            union(&mut self.result.layout_rect_scaled, rect);
            let unscaled = scale_rect(
                rect,
                rect.width(),
                rect.height(),
                1.0 / self.scale.x,
                1.0 / self.scale.y,
            );
            union(&mut self.result.layout_rect, unscaled);
        }
        rect
    }

    /// Moves `points` so their origin sits at `offset` on the icon (or layout, in
    /// [`LayoutMode::Relative`]) rectangle.
    ///
    /// Every point grows the screen rectangle; the first `points_in_layout` also grow the layout
    /// rectangle.
    pub fn place_points(
        &mut self,
        offset: Offset,
        points: &mut [Point],
        mode: LayoutMode,
        points_in_layout: usize,
    ) {
        let icon = self.result.icon_rect.unwrap_or_default();
        let reference = match mode {
            LayoutMode::Relative => self.result.layout_rect.unwrap_or(icon),
            LayoutMode::Absolute | LayoutMode::Overlay => icon,
        };
        let p = offset.compute(reference.width(), reference.height(), None, None);
        let origin = Vec2::new((reference.x0 + p.x).trunc(), (reference.y0 + p.y).trunc());
        for (i, point) in points.iter_mut().enumerate() {
            *point += origin;
            union_pt(&mut self.result.screen_rect, *point);
            if i < points_in_layout && mode != LayoutMode::Overlay {
                union_pt(&mut self.result.layout_rect, *point);
            }
        }
    }

    /// Places the glyph for a modifier `code`.
    ///
    /// The glyph is looked up in the symbol's glyph references and loaded into the shared atlas
    /// on first use. A glyph that is not available yet, or failed to load, is left out and the
    /// layout is marked unresolved, so it is recomputed next frame. Without a modifier retriever
    /// nothing is placed.
    pub fn add_glyph(
        &mut self,
        offset: Offset,
        hot_spot: Offset,
        code: &str,
        params: Option<Modifiers>,
        mode: LayoutMode,
    ) {
        let Some(retriever) = self.res.modifier_retriever else {
            return;
        };
        let element = self.res.glyph_refs.get(
            code,
            || IconSourceKey::new(retriever, code, params.unwrap_or_default()),
            self.res.now,
        );
        if !element.load(self.res.atlas, self.res.loader) {
            self.unresolved_glyph = true;
            return;
        }
        let source = element.source().clone();
        let Some(size) = self.res.atlas.size(&source) else {
            self.unresolved_glyph = true;
            return;
        };
        let rect = self.place_rect(offset, hot_spot, size, mode);
        self.result.glyphs.push(PlacedGlyph { source, rect });
    }

    /// Places a text label. Empty text is ignored.
    pub fn add_label(
        &mut self,
        offset: Offset,
        hot_spot: Offset,
        text: &str,
        font: Option<&FontSpec>,
        mode: LayoutMode,
    ) {
        if text.is_empty() {
            return;
        }
        let font = font.unwrap_or(self.res.font).clone();
        let bounds = self.res.text.measure_text(text, &font);
        let rect = self.place_label_rect(offset, hot_spot, bounds.size(), mode);
        self.result.labels.push(PlacedLabel {
            text: text.to_owned(),
            origin: Point::new(rect.x0, rect.y0 - bounds.y0),
            font,
            color: self.res.label_color,
        });
    }

    /// Places a line strip; see [`place_points`](Self::place_points).
    pub fn add_line(
        &mut self,
        offset: Offset,
        points: impl IntoIterator<Item = Point>,
        mode: LayoutMode,
        points_in_layout: usize,
    ) {
        let mut points: SmallVec<[Point; 3]> = points.into_iter().collect();
        self.place_points(offset, &mut points, mode, points_in_layout);
        self.lines.push(PlacedLine { points });
    }

    /// Scales the icon and layout rectangles, reserving room for `label_lines` lines of text.
    pub(crate) fn compute_scaled_bounds(&mut self, label_lines: u32) {
        let sample = self.res.text.measure_text("E", self.res.font);
        let min = (sample.height() * f64::from(label_lines) * 1.5).trunc();
        let (sx, sy) = (self.scale.x, self.scale.y);
        self.result.icon_rect_scaled = self
            .result
            .icon_rect
            .map(|r| scale_rect(r, min, min, sx, sy));
        self.result.layout_rect_scaled = self
            .result
            .layout_rect
            .map(|r| scale_rect(r, min, min, sx, sy));
    }

    /// Ends the pass, returning the layout, the placed lines, and whether a glyph is missing.
    pub(crate) fn finish(self) -> (LayoutResult, Vec<PlacedLine>, bool) {
        (self.result, self.lines, self.unresolved_glyph)
    }
}

/// Positions a `size` item so its `hot_spot` lands on `offset` within `reference`, snapping to
/// whole pixels.
fn anchor(reference: Rect, offset: Offset, hot_spot: Offset, size: Size) -> Rect {
    let p = offset.compute(reference.width(), reference.height(), None, None);
    let h = hot_spot.compute(size.width, size.height, None, None);
    let x = ((reference.x0 + p.x).trunc() - h.x).trunc();
    let y = ((reference.y0 + p.y).trunc() - h.y).trunc();
    Rect::from_origin_size((x, y), size)
}

impl fmt::Debug for Layouter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layouter")
            .field("scale", &self.scale)
            .field("result", &self.result)
            .field("lines", &self.lines)
            .field("unresolved_glyph", &self.unresolved_glyph)
            .finish_non_exhaustive()
    }
}
