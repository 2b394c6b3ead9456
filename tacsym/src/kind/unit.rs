// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Vec2;
use tacsym_primitives::{AltitudeMode, Modifiers, Offset, SizeRule, keys};

use super::{
    SymbolInfo, SymbolKind, TransformInfo, apply_common_implicit_modifiers,
    center_heading_points, ground_heading_points,
};
use crate::layout::{LayoutMode, Layouter};
use crate::{Error, FrameContext, PerFrameSymbolState, SymbolCode};

/// A unit, equipment or installation symbol with a frame and the full set of unit modifiers.
///
/// Ground symbols are clamped to the ground, anchored at the bottom of their layout and draw
/// the direction of movement as a ground heading indicator.
#[derive(Clone, Debug)]
pub struct UnitSymbol {
    code: SymbolCode,
    identifier: String,
    icon_offset: Option<Offset>,
    icon_size: Option<SizeRule>,
    offset: Option<Offset>,
}

impl UnitSymbol {
    /// Creates a unit symbol from its 15-character code.
    pub fn new(code: &str) -> Result<Self, Error> {
        let code = SymbolCode::parse(code)?;
        Ok(Self {
            identifier: code.as_str().to_owned(),
            code,
            icon_offset: None,
            icon_size: None,
            offset: None,
        })
    }

    /// Sets where the frame sits within the retrieved icon image and how large it is drawn.
    ///
    /// Frame shapes differ per identity and dimension; the caller supplies the values for this
    /// code.
    #[must_use]
    pub fn with_icon_layout(mut self, icon_offset: Offset, icon_size: SizeRule) -> Self {
        self.icon_offset = Some(icon_offset);
        self.icon_size = Some(icon_size);
        self
    }

    /// Sets the default offset of symbols of this kind.
    #[must_use]
    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The parsed symbol code.
    pub fn code(&self) -> &SymbolCode {
        &self.code
    }

    /// Whether the symbol is on the ground.
    pub fn is_ground(&self) -> bool {
        self.code.is_ground()
    }

    fn uses_ground_heading_indicator(&self) -> bool {
        self.is_ground() && self.offset.is_none()
    }

    fn uses_alternate_operational_condition(&self, modifiers: &Modifiers) -> bool {
        self.code.scheme() == 'E' || modifiers.contains_key(keys::OPERATIONAL_CONDITION_ALTERNATE)
    }
}

/// Appends `key`'s text to `text`, truncated to `max_len` characters and separated by a space.
fn append_text(text: &mut String, modifiers: &Modifiers, key: &str, max_len: Option<usize>) {
    let Some(value) = modifiers.get(key).filter(|v| !v.is_empty()) else {
        return;
    };
    let value = value.to_string();
    if !text.is_empty() {
        text.push(' ');
    }
    match max_len {
        Some(n) => text.extend(value.chars().take(n)),
        None => text.push_str(&value),
    }
}

fn reinforced_reduced(modifiers: &Modifiers) -> Option<&'static str> {
    let value = modifiers.get(keys::REINFORCED_REDUCED)?;
    let items = value.as_list().unwrap_or(core::slice::from_ref(value));
    let has = |name: &str| {
        items
            .iter()
            .any(|v| v.as_text().is_some_and(|t| t.eq_ignore_ascii_case(name)))
    };
    match (has("reinforced"), has("reduced")) {
        (true, true) => Some("+-"),
        (true, false) => Some("+"),
        (false, true) => Some("-"),
        (false, false) => None,
    }
}

/// Places `text` and clears it, if it is not empty.
fn flush_label(
    layout: &mut Layouter<'_>,
    text: &mut String,
    offset: Offset,
    hot_spot: Offset,
    mode: LayoutMode,
) {
    if !text.is_empty() {
        layout.add_label(offset, hot_spot, text, None, mode);
        text.clear();
    }
}

impl SymbolKind for UnitSymbol {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn initial_altitude_mode(&self) -> AltitudeMode {
        if self.is_ground() {
            AltitudeMode::ClampToGround
        } else {
            AltitudeMode::Absolute
        }
    }

    fn default_offset(&self) -> Option<Offset> {
        self.offset
    }

    fn icon_layout(&self) -> (Option<Offset>, Option<SizeRule>) {
        (self.icon_offset, self.icon_size)
    }

    fn apply_implicit_modifiers(&self, info: &SymbolInfo<'_>, modifiers: &mut Modifiers) {
        if !modifiers.contains_key(keys::ECHELON) {
            if let Some(echelon) = self.code.echelon() {
                modifiers.insert(keys::ECHELON, echelon.to_string());
            }
        }
        if !modifiers.contains_key(keys::FRAME_SHAPE) {
            let shape = if self.code.is_exercise() {
                Some(keys::FRAME_SHAPE_EXERCISE)
            } else {
                match self.code.standard_identity() {
                    'J' => Some(keys::FRAME_SHAPE_JOKER),
                    'K' => Some(keys::FRAME_SHAPE_FAKER),
                    _ => None,
                }
            };
            if let Some(shape) = shape {
                modifiers.insert(keys::FRAME_SHAPE, shape);
            }
        }
        apply_common_implicit_modifiers(info, self.code.is_hostile(), modifiers);
    }

    fn assemble_icon_params(&self, modifiers: &Modifiers, params: &mut Modifiers) {
        for key in [keys::SHOW_FILL, keys::SHOW_FRAME, keys::SHOW_ICON] {
            if let Some(value) = modifiers.get(key) {
                params.insert(key, value.clone());
            }
        }
    }

    fn layout_graphic_modifiers(&self, layout: &mut Layouter<'_>, modifiers: &Modifiers) {
        let Some(icon) = layout.icon_rect() else {
            return;
        };
        let width_params = Modifiers::new().with(keys::PARAM_WIDTH, icon.width());
        let code = |key| self.code.modifier_code(modifiers, key);

        if let Some(c) = code(keys::FEINT_DUMMY) {
            layout.add_glyph(
                Offset::TOP_CENTER,
                Offset::BOTTOM_CENTER,
                &c,
                Some(width_params.clone()),
                LayoutMode::Overlay,
            );
        }
        if let Some(c) = code(keys::INSTALLATION) {
            layout.add_glyph(
                Offset::TOP_CENTER,
                Offset::BOTTOM_CENTER,
                &c,
                None,
                LayoutMode::Relative,
            );
        }
        if let Some(c) = code(keys::TASK_FORCE).or_else(|| code(keys::ECHELON)) {
            layout.add_glyph(
                Offset::TOP_CENTER,
                Offset::BOTTOM_CENTER,
                &c,
                None,
                LayoutMode::Relative,
            );
        }
        for key in [keys::MOBILITY, keys::AUXILIARY_EQUIPMENT] {
            if let Some(c) = code(key) {
                layout.add_glyph(
                    Offset::BOTTOM_CENTER,
                    Offset::TOP_CENTER,
                    &c,
                    None,
                    LayoutMode::Relative,
                );
            }
        }
        if self.uses_alternate_operational_condition(modifiers) {
            if let Some(c) = code(keys::OPERATIONAL_CONDITION_ALTERNATE) {
                layout.add_glyph(
                    Offset::BOTTOM_CENTER,
                    Offset::TOP_CENTER,
                    &c,
                    Some(width_params),
                    LayoutMode::Relative,
                );
            }
        } else if let Some(c) = code(keys::OPERATIONAL_CONDITION) {
            layout.add_glyph(
                Offset::CENTER,
                Offset::CENTER,
                &c,
                None,
                LayoutMode::Overlay,
            );
        }
    }

    fn layout_text_modifiers(&self, layout: &mut Layouter<'_>, modifiers: &Modifiers) {
        let mut text = String::new();
        let right = |y| Offset::fraction(1.0, y);
        let left = |y| Offset::fraction(0.0, y);

        append_text(&mut text, modifiers, keys::QUANTITY, Some(9));
        flush_label(
            layout,
            &mut text,
            Offset::TOP_CENTER,
            Offset::BOTTOM_CENTER,
            LayoutMode::Relative,
        );

        append_text(&mut text, modifiers, keys::SPECIAL_C2_HEADQUARTERS, Some(9));
        flush_label(
            layout,
            &mut text,
            Offset::CENTER,
            Offset::CENTER,
            LayoutMode::Overlay,
        );

        append_text(&mut text, modifiers, keys::FRAME_SHAPE, None);
        if let Some(s) = reinforced_reduced(modifiers) {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(s);
        }
        flush_label(layout, &mut text, right(1.1), Offset::LEFT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::STAFF_COMMENTS, Some(20));
        flush_label(layout, &mut text, right(0.8), Offset::LEFT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::ADDITIONAL_INFORMATION, Some(20));
        flush_label(layout, &mut text, right(0.5), Offset::LEFT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::HIGHER_FORMATION, Some(21));
        flush_label(layout, &mut text, right(0.2), Offset::LEFT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::EVALUATION_RATING, Some(2));
        append_text(&mut text, modifiers, keys::COMBAT_EFFECTIVENESS, Some(3));
        append_text(&mut text, modifiers, keys::SIGNATURE_EQUIPMENT, Some(1));
        append_text(&mut text, modifiers, keys::HOSTILE_ENEMY, Some(3));
        append_text(&mut text, modifiers, keys::IFF_SIF, Some(5));
        flush_label(layout, &mut text, right(-0.1), Offset::LEFT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::DATE_TIME_GROUP, Some(16));
        flush_label(layout, &mut text, left(1.1), Offset::RIGHT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::ALTITUDE_DEPTH, Some(14));
        append_text(&mut text, modifiers, keys::LOCATION, Some(19));
        flush_label(layout, &mut text, left(0.8), Offset::RIGHT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::TYPE, Some(24));
        flush_label(layout, &mut text, left(0.5), Offset::RIGHT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::UNIQUE_DESIGNATION, Some(21));
        flush_label(layout, &mut text, left(0.2), Offset::RIGHT_CENTER, LayoutMode::Overlay);

        append_text(&mut text, modifiers, keys::SPEED, Some(8));
        flush_label(layout, &mut text, left(-0.1), Offset::RIGHT_CENTER, LayoutMode::Overlay);
    }

    fn layout_dynamic_modifiers(
        &self,
        layout: &mut Layouter<'_>,
        modifiers: &Modifiers,
        frame: &dyn FrameContext,
        state: &PerFrameSymbolState,
    ) {
        let (Some(heading), Some(icon)) =
            (modifiers.angle(keys::DIRECTION_OF_MOVEMENT), layout.icon_rect())
        else {
            return;
        };
        let mut length = icon.height();
        if let Some(scale) = modifiers.number(keys::SPEED_LEADER_SCALE) {
            length *= scale;
        }
        if self.uses_ground_heading_indicator() {
            if let Some(points) = ground_heading_points(frame, state, heading, length, icon.height())
            {
                let in_layout = points.len() - 1;
                layout.add_line(Offset::BOTTOM_CENTER, points, LayoutMode::Relative, in_layout);
            }
        } else if let Some(points) = center_heading_points(frame, state, heading, length) {
            layout.add_line(Offset::CENTER, points, LayoutMode::Overlay, 0);
        }
    }

    fn max_label_lines(&self, modifiers: &Modifiers) -> u32 {
        let has = |key| modifiers.contains_key(key);
        let left = [
            has(keys::DATE_TIME_GROUP),
            has(keys::ALTITUDE_DEPTH) || has(keys::LOCATION),
            has(keys::TYPE),
            has(keys::UNIQUE_DESIGNATION),
            has(keys::SPEED),
        ];
        let right = [
            has(keys::FRAME_SHAPE) || has(keys::REINFORCED_REDUCED),
            has(keys::STAFF_COMMENTS),
            has(keys::ADDITIONAL_INFORMATION),
            has(keys::HIGHER_FORMATION),
            has(keys::COMBAT_EFFECTIVENESS)
                || has(keys::SIGNATURE_EQUIPMENT)
                || has(keys::HOSTILE_ENEMY)
                || has(keys::IFF_SIF),
        ];
        let count = |lines: [bool; 5]| lines.into_iter().map(u32::from).sum::<u32>();
        count(left).max(count(right))
    }

    fn adjust_transform(&self, info: &TransformInfo) -> Option<Vec2> {
        if info.has_offset {
            return None;
        }
        let icon = info.icon_rect;
        match info.layout_rect {
            Some(layout) if self.is_ground() => Some(Vec2::new(-icon.center().x, -layout.y0)),
            _ => Some(Vec2::new(-icon.center().x, -icon.center().y)),
        }
    }
}
