// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between symbol drawing and a GPU or text backend.

use core::fmt::{Debug, Formatter};
use core::ops::{Deref, DerefMut};
use std::sync::Arc;

use peniko::color::{AlphaColor, Srgb};
use peniko::kurbo::{Affine, Point, Rect};

use crate::{AtlasSurface, IconImage, TexCoords};

/// Font used for modifier labels.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Family name.
    pub family: Arc<str>,
    /// Size in pixels.
    pub size: f32,
    /// Bold weight.
    pub bold: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: Arc::from("Arial"),
            size: 14.0,
            bold: true,
        }
    }
}

/// Text measurement, needed while laying out labels.
pub trait TextMetrics {
    /// Pixel bounds of `text` in `font`, relative to the text origin with y increasing upward.
    fn measure_text(&mut self, text: &str, font: &FontSpec) -> Rect;
}

/// Drawing operations used by symbols.
///
/// Transforms map unit-square or local pixel coordinates to screen pixels with y increasing
/// upward. Depths are window depths in `[0, 1]`.
pub trait DrawBackend: TextMetrics {
    /// Starts a drawing scope, setting up blend and depth state once for a batch.
    fn begin_drawing(&mut self, picking: bool);

    /// Ends a drawing scope, restoring the state changed by [`begin_drawing`](Self::begin_drawing).
    fn end_drawing(&mut self);

    /// Sets the polygon depth offset, in depth units, for subsequent quads.
    fn set_depth_offset(&mut self, units: f64);

    /// Makes `image` the current texture. Returns `false` if it cannot be used.
    fn bind_icon(&mut self, image: &IconImage) -> bool;

    /// Makes the glyph atlas the current texture, uploading its dirty area.
    fn bind_atlas(&mut self, surface: AtlasSurface<'_>) -> bool;

    /// Draws the unit square through `transform`, textured with `tex_coords` of the current
    /// texture and modulated by `color`.
    fn draw_unit_quad(
        &mut self,
        transform: Affine,
        depth: f64,
        tex_coords: TexCoords,
        color: AlphaColor<Srgb>,
    );

    /// Draws a line strip through `points`, in local pixels mapped by `transform`.
    fn draw_line_strip(
        &mut self,
        transform: Affine,
        depth: f64,
        points: &[Point],
        color: AlphaColor<Srgb>,
    );

    /// Draws `text` with its origin at the screen point `origin`, unscaled.
    fn draw_text(
        &mut self,
        origin: Point,
        depth: f64,
        text: &str,
        font: &FontSpec,
        color: AlphaColor<Srgb>,
    );

    /// Reads back the pick color under a screen point, as `0xRRGGBB`.
    fn read_pick_color(&mut self, point: Point) -> Option<u32>;
}

/// A drawing scope: [`begin_drawing`] on creation, [`end_drawing`] on drop.
///
/// [`begin_drawing`]: DrawBackend::begin_drawing
/// [`end_drawing`]: DrawBackend::end_drawing
pub struct DrawScope<'a, B: DrawBackend + ?Sized> {
    backend: &'a mut B,
    picking: bool,
}

impl<'a, B: DrawBackend + ?Sized> DrawScope<'a, B> {
    /// Begins drawing on `backend`.
    pub fn new(backend: &'a mut B, picking: bool) -> Self {
        backend.begin_drawing(picking);
        Self { backend, picking }
    }

    /// Whether this scope draws pick colors.
    pub fn is_picking(&self) -> bool {
        self.picking
    }
}

impl<B: DrawBackend + ?Sized> Deref for DrawScope<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: DrawBackend + ?Sized> DerefMut for DrawScope<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: DrawBackend + ?Sized> Drop for DrawScope<'_, B> {
    fn drop(&mut self) {
        self.backend.end_drawing();
    }
}

impl<B: DrawBackend + ?Sized> Debug for DrawScope<'_, B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawScope")
            .field("picking", &self.picking)
            .finish_non_exhaustive()
    }
}
