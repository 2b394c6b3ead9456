// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Symbol kinds: the per-family rules for implicit modifiers and modifier layout.

mod graphic;
mod unit;

use core::fmt::Debug;

use peniko::kurbo::{Point, Rect, Vec2};
use tacsym_primitives::{AltitudeMode, Modifiers, Offset, Position, SizeRule, UnitsFormat, keys};

use crate::layout::Layouter;
use crate::{FrameContext, PerFrameSymbolState};

pub use graphic::{LabelLayout, LabelLayouts, PointGraphic};
pub use unit::UnitSymbol;

/// Number of label lines reserved when a kind does not say otherwise.
pub const DEFAULT_LABEL_LINES: u32 = 5;

/// Symbol state visible to [`SymbolKind::apply_implicit_modifiers`].
#[derive(Clone, Copy, Debug)]
pub struct SymbolInfo<'a> {
    /// The symbol's position.
    pub position: Option<&'a Position>,
    /// How the altitude is interpreted.
    pub altitude_mode: AltitudeMode,
    /// Whether the location and altitude modifiers are derived from the position.
    pub show_location: bool,
    /// Whether hostile symbols get the `ENY` indicator.
    pub show_hostile_indicator: bool,
    /// The formatted position, when `show_location` is set.
    pub formatted_position: Option<&'a str>,
    /// Formatting rules for locations and altitudes.
    pub units_format: &'a UnitsFormat,
}

/// Inputs to [`SymbolKind::adjust_transform`].
#[derive(Clone, Copy, Debug)]
pub struct TransformInfo {
    /// Whether the symbol has an explicit offset.
    pub has_offset: bool,
    /// The icon rectangle.
    pub icon_rect: Rect,
    /// The layout rectangle, including dynamic modifiers.
    pub layout_rect: Option<Rect>,
}

/// The rules of one symbol family.
///
/// A [`TacticalSymbol`](crate::TacticalSymbol) owns one kind and calls its hooks while it lays
/// itself out. Every hook has a default that does nothing.
pub trait SymbolKind: Debug + Send {
    /// Symbol identifier passed to the icon retriever.
    fn identifier(&self) -> &str;

    /// Altitude mode of a new symbol.
    fn initial_altitude_mode(&self) -> AltitudeMode {
        AltitudeMode::Absolute
    }

    /// Offset of a new symbol.
    fn default_offset(&self) -> Option<Offset> {
        None
    }

    /// Where the icon sits in the layout and how large it is drawn.
    fn icon_layout(&self) -> (Option<Offset>, Option<SizeRule>) {
        (None, None)
    }

    /// Whether a new symbol shows the hostile indicator.
    fn default_show_hostile_indicator(&self) -> bool {
        false
    }

    /// Adds the modifiers implied by the symbol code and state. Values already in `modifiers`
    /// win.
    fn apply_implicit_modifiers(&self, _info: &SymbolInfo<'_>, _modifiers: &mut Modifiers) {}

    /// Adds kind-specific icon retriever parameters taken from the caller's `modifiers`.
    fn assemble_icon_params(&self, _modifiers: &Modifiers, _params: &mut Modifiers) {}

    /// Places graphic modifiers at icon scale.
    fn layout_graphic_modifiers(&self, _layout: &mut Layouter<'_>, _modifiers: &Modifiers) {}

    /// Places text modifiers against the scaled layout.
    fn layout_text_modifiers(&self, _layout: &mut Layouter<'_>, _modifiers: &Modifiers) {}

    /// Places modifiers that depend on the camera. Runs every frame and is never cached.
    fn layout_dynamic_modifiers(
        &self,
        _layout: &mut Layouter<'_>,
        _modifiers: &Modifiers,
        _frame: &dyn FrameContext,
        _state: &PerFrameSymbolState,
    ) {
    }

    /// Number of label lines to reserve room for.
    fn max_label_lines(&self, _modifiers: &Modifiers) -> u32 {
        DEFAULT_LABEL_LINES
    }

    /// Overrides the translation from the icon's local space to the screen point.
    fn adjust_transform(&self, _info: &TransformInfo) -> Option<Vec2> {
        None
    }
}

/// The implicit altitude text: `GL` on the ground, otherwise the altitude and its datum.
pub(crate) fn altitude_text(info: &SymbolInfo<'_>) -> String {
    let altitude = info.position.map_or(0.0, |p| p.altitude);
    match info.altitude_mode {
        AltitudeMode::ClampToGround => "GL".to_owned(),
        AltitudeMode::RelativeToGround => format!("{} AGL", info.units_format.altitude(altitude)),
        AltitudeMode::Absolute => format!("{} AMSL", info.units_format.altitude(altitude)),
    }
}

/// Adds the hostile indicator and the location and altitude modifiers.
pub(crate) fn apply_common_implicit_modifiers(
    info: &SymbolInfo<'_>,
    hostile: bool,
    modifiers: &mut Modifiers,
) {
    if hostile && info.show_hostile_indicator && !modifiers.contains_key(keys::HOSTILE_ENEMY) {
        modifiers.insert(keys::HOSTILE_ENEMY, keys::HOSTILE_ENEMY_VALUE);
    }
    if !info.show_location {
        return;
    }
    if !modifiers.contains_key(keys::LOCATION) {
        if let Some(location) = info.formatted_position {
            modifiers.insert(keys::LOCATION, location);
        }
    }
    if !modifiers.contains_key(keys::ALTITUDE_DEPTH) {
        modifiers.insert(keys::ALTITUDE_DEPTH, altitude_text(info));
    }
}

/// Screen-space displacement of a direction-of-movement line `length` pixels long.
fn heading_delta(
    frame: &dyn FrameContext,
    state: &PerFrameSymbolState,
    heading: f64,
    length: f64,
) -> Option<Vec2> {
    let place = state.place_point;
    let pixel_size = frame.pixel_size_at_distance(frame.eye_point().distance(place));
    let dir = frame.surface_direction(place, heading).normalize() * (length * pixel_size);
    let p1 = frame.project(place)?;
    let p2 = frame.project(place + dir)?;
    Some(Vec2::new(p2.x - p1.x, p2.y - p1.y))
}

/// A two-point direction line starting at the origin.
pub(crate) fn center_heading_points(
    frame: &dyn FrameContext,
    state: &PerFrameSymbolState,
    heading: f64,
    length: f64,
) -> Option<[Point; 2]> {
    let d = heading_delta(frame, state, heading, length)?;
    Some([Point::ORIGIN, Point::new(d.x, d.y)])
}

/// A direction line that first drops half a frame below the origin, for ground symbols.
pub(crate) fn ground_heading_points(
    frame: &dyn FrameContext,
    state: &PerFrameSymbolState,
    heading: f64,
    length: f64,
    frame_height: f64,
) -> Option<[Point; 3]> {
    let d = heading_delta(frame, state, heading, length)?;
    let drop = -frame_height / 2.0;
    Some([
        Point::ORIGIN,
        Point::new(0.0, drop),
        Point::new(d.x, drop + d.y),
    ])
}
