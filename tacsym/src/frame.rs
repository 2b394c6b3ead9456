// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The globe and camera seen from a symbol, and the state a symbol computes once per frame.

use core::time::Duration;

use peniko::kurbo::{Point, Rect, Vec2};
use tacsym_primitives::Vec3;

/// What a symbol needs from the globe and camera for one frame.
///
/// Model-space points are whatever the globe uses; screen points are pixels with y increasing
/// upward and the window depth in `z`.
pub trait FrameContext {
    /// Monotonic frame counter. Per-frame state is reused while it stays the same.
    fn frame_id(&self) -> u64;

    /// Whether frames are not discrete (e.g. a continuously scrolling 2D map), which disables
    /// per-frame caching.
    fn is_continuous(&self) -> bool {
        false
    }

    /// Whether the globe is a flat 2D projection. Flat globes have no horizon.
    fn is_flat_globe(&self) -> bool {
        false
    }

    /// Whether this is a pick pass.
    fn is_picking(&self) -> bool {
        false
    }

    /// Time stamp of the frame, used to age glyph references.
    fn now(&self) -> Duration;

    /// Vertical exaggeration applied to absolute altitudes.
    fn vertical_exaggeration(&self) -> f64 {
        1.0
    }

    /// The point `height` meters above the terrain at a location.
    fn terrain_point(&self, latitude: f64, longitude: f64, height: f64) -> Option<Vec3>;

    /// The point `height` meters above the ellipsoid at a location.
    fn globe_point(&self, latitude: f64, longitude: f64, height: f64) -> Option<Vec3>;

    /// Projects a model point to the screen.
    fn project(&self, point: Vec3) -> Option<Vec3>;

    /// Model-space position of the eye.
    fn eye_point(&self) -> Vec3;

    /// Distance from the eye to the horizon.
    fn horizon_distance(&self) -> f64;

    /// Whether a model point lies between the near and far clip planes.
    fn depth_range_contains(&self, point: Vec3) -> bool;

    /// The viewport in screen pixels.
    fn viewport(&self) -> Rect;

    /// The screen rectangles of the pick frustums, during a pick pass.
    fn pick_rects(&self) -> &[Rect] {
        &[]
    }

    /// A model-space unit vector pointing along `heading` degrees (clockwise from north) in the
    /// surface plane at `point`.
    fn surface_direction(&self, point: Vec3, heading: f64) -> Vec3;

    /// Size in model units of one screen pixel at `distance` from the eye.
    fn pixel_size_at_distance(&self, distance: f64) -> f64;
}

/// Placement of a symbol for one frame.
///
/// Computed on the first render of a frame and reused by later renders of the same frame; a
/// copy travels in the [`DrawQueue`](crate::DrawQueue) so drawing does not recompute it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerFrameSymbolState {
    /// Frame this state was computed for.
    pub frame_id: u64,
    /// Model-space anchor.
    pub place_point: Vec3,
    /// Projected anchor, with depth in `z`.
    pub screen_point: Vec3,
    /// Distance from the eye to the anchor.
    pub eye_distance: f64,
    /// Scale applied to the icon and glyphs.
    pub scale: Vec2,
    /// Translation from the icon's local space to the anchor, before scaling.
    pub offset: Vec2,
    /// Envelope of everything drawn, in local pixels.
    pub screen_rect: Option<Rect>,
    /// Envelope of the icon and the modifiers that take part in layout, in local pixels.
    pub layout_rect: Option<Rect>,
}

impl PerFrameSymbolState {
    pub(crate) fn new(place_point: Vec3, screen_point: Vec3, eye_distance: f64) -> Self {
        Self {
            frame_id: 0,
            place_point,
            screen_point,
            eye_distance,
            scale: Vec2::new(1.0, 1.0),
            offset: Vec2::ZERO,
            screen_rect: None,
            layout_rect: None,
        }
    }

    /// The screen-space bounds of the symbol.
    ///
    /// Before the first layout there is no screen rectangle; a square of `max_dimension` pixels
    /// centred on the screen point stands in for it.
    pub fn screen_extent(&self, max_dimension: f64) -> Rect {
        let sp = Point::new(self.screen_point.x, self.screen_point.y);
        let (x, y, w, h) = match self.screen_rect {
            Some(r) => (
                sp.x + self.scale.x * (self.offset.x + r.x0),
                sp.y + self.scale.y * (self.offset.y + r.y0),
                self.scale.x * r.width(),
                self.scale.y * r.height(),
            ),
            None => (
                sp.x - max_dimension / 2.0,
                sp.y - max_dimension / 2.0,
                max_dimension,
                max_dimension,
            ),
        };
        let (x, y) = (x.trunc(), y.trunc());
        Rect::new(x, y, x + w.ceil(), y + h.ceil())
    }

    /// Whether the symbol is inside the view, or inside a pick frustum during a pick pass.
    pub fn intersects_frustum(&self, frame: &dyn FrameContext, max_dimension: f64) -> bool {
        if !frame.depth_range_contains(self.place_point) {
            return false;
        }
        let extent = self.screen_extent(max_dimension);
        if frame.is_picking() {
            frame.pick_rects().iter().any(|r| overlaps(*r, extent))
        } else {
            overlaps(frame.viewport(), extent)
        }
    }
}

/// Whether two rectangles share interior area or touch along a degenerate edge.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_extent_is_centred() {
        let state = PerFrameSymbolState::new(Vec3::ZERO, Vec3::new(100.0, 50.0, 0.5), 10.0);
        assert_eq!(state.screen_extent(256.0), Rect::new(-28.0, -78.0, 228.0, 178.0));
    }

    #[test]
    fn test_extent_applies_scale_and_offset() {
        let mut state = PerFrameSymbolState::new(Vec3::ZERO, Vec3::new(100.0, 50.0, 0.5), 10.0);
        state.screen_rect = Some(Rect::new(0.0, 0.0, 32.0, 20.0));
        state.offset = Vec2::new(-16.0, -10.0);
        state.scale = Vec2::new(0.5, 0.5);
        assert_eq!(state.screen_extent(256.0), Rect::new(92.0, 45.0, 108.0, 55.0));
    }
}
