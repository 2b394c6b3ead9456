// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use hashbrown::HashMap;
use peniko::kurbo::Vec2;
use tacsym_primitives::{AltitudeMode, ModifierValue, Modifiers, Offset, keys};

use super::{
    SymbolInfo, SymbolKind, TransformInfo, apply_common_implicit_modifiers, ground_heading_points,
};
use crate::layout::{LayoutMode, Layouter};
use crate::{Error, FrameContext, PerFrameSymbolState, SymbolCode};

const BIOLOGICAL_EVENT: &str = "G-M-NEB--------";
const CHEMICAL_EVENT: &str = "G-M-NEC--------";
const NUCLEAR_DETONATION: &str = "G-M-NZ---------";
const FALLOUT_PRODUCING: &str = "G-M-NF---------";

const BELOW_BOTTOM_CENTER: Offset = Offset::fraction(0.5, -0.1);

/// Where the values of one text modifier are drawn around a point graphic.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelLayout {
    modifier: String,
    offsets: Vec<(Offset, Offset)>,
}

impl LabelLayout {
    /// Creates an empty layout for `modifier`.
    pub fn new(modifier: impl Into<String>) -> Self {
        Self {
            modifier: modifier.into(),
            offsets: Vec::new(),
        }
    }

    /// Adds a position: `offset` on the icon and the `hot_spot` of the label placed there.
    ///
    /// A list-valued modifier uses one position per value, in order.
    #[must_use]
    pub fn with(mut self, offset: Offset, hot_spot: Offset) -> Self {
        self.offsets.push((offset, hot_spot));
        self
    }

    /// The modifier key.
    pub fn modifier(&self) -> &str {
        &self.modifier
    }

    /// The offset and hot spot pairs.
    pub fn offsets(&self) -> &[(Offset, Offset)] {
        &self.offsets
    }
}

/// Label layouts for point graphics, keyed by masked symbol code.
#[derive(Clone, Debug, Default)]
pub struct LabelLayouts {
    layouts: HashMap<String, Vec<LabelLayout>>,
}

impl LabelLayouts {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the layouts of the graphic with `masked_code`, replacing any previous entry.
    pub fn insert(&mut self, masked_code: &str, layouts: Vec<LabelLayout>) {
        self.layouts.insert(masked_code.to_ascii_uppercase(), layouts);
    }

    /// The layouts of the graphic with `masked_code`; empty if it has none.
    pub fn get(&self, masked_code: &str) -> &[LabelLayout] {
        self.layouts.get(masked_code).map_or(&[], Vec::as_slice)
    }
}

/// A tactical point graphic: a single-point control measure drawn as an icon with labels from a
/// per-graphic layout table.
///
/// Chemical, biological, radiological and nuclear graphics also show a direction of movement
/// line below the icon.
#[derive(Clone, Debug)]
pub struct PointGraphic {
    code: SymbolCode,
    masked: String,
    layouts: Arc<LabelLayouts>,
    offset: Option<Offset>,
}

impl PointGraphic {
    /// Creates a point graphic whose labels are placed per `layouts`.
    pub fn new(code: &str, layouts: Arc<LabelLayouts>) -> Result<Self, Error> {
        let code = SymbolCode::parse(code)?;
        Ok(Self {
            masked: code.masked(),
            code,
            layouts,
            offset: None,
        })
    }

    /// Sets the graphic's default offset.
    #[must_use]
    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The parsed symbol code.
    pub fn code(&self) -> &SymbolCode {
        &self.code
    }

    /// The code with the fields that do not select the graphic masked out.
    pub fn masked_code(&self) -> &str {
        &self.masked
    }

    fn shows_direction_of_movement(&self) -> bool {
        matches!(
            self.masked.as_str(),
            NUCLEAR_DETONATION | FALLOUT_PRODUCING | BIOLOGICAL_EVENT | CHEMICAL_EVENT
        )
    }
}

/// Turns a two-date list into a range by appending a hyphen to the first date.
fn date_range(values: &[ModifierValue]) -> Vec<String> {
    match values {
        [first, second, ..] => vec![format!("{first}-"), second.to_string()],
        _ => values.iter().map(ToString::to_string).collect(),
    }
}

impl SymbolKind for PointGraphic {
    fn identifier(&self) -> &str {
        self.code.as_str()
    }

    fn initial_altitude_mode(&self) -> AltitudeMode {
        AltitudeMode::ClampToGround
    }

    fn default_offset(&self) -> Option<Offset> {
        self.offset
    }

    fn default_show_hostile_indicator(&self) -> bool {
        true
    }

    fn apply_implicit_modifiers(&self, info: &SymbolInfo<'_>, modifiers: &mut Modifiers) {
        apply_common_implicit_modifiers(info, self.code.is_hostile(), modifiers);
        if !modifiers.contains_key(keys::TYPE) {
            let event = match self.masked.as_str() {
                BIOLOGICAL_EVENT => Some("BIO"),
                CHEMICAL_EVENT => Some("CML"),
                _ => None,
            };
            if let Some(event) = event {
                modifiers.insert(keys::TYPE, event);
            }
        }
    }

    fn layout_text_modifiers(&self, layout: &mut Layouter<'_>, modifiers: &Modifiers) {
        for label in self.layouts.get(&self.masked) {
            let offsets = label.offsets();
            let Some(&(offset, hot_spot)) = offsets.first() else {
                continue;
            };
            let Some(value) = modifiers.get(label.modifier()).filter(|v| !v.is_empty()) else {
                continue;
            };
            let mode = if label.modifier() == keys::LOCATION {
                LayoutMode::Relative
            } else {
                LayoutMode::Overlay
            };
            match value.as_list() {
                Some(values) => {
                    let texts = if label.modifier() == keys::DATE_TIME_GROUP && offsets.len() == 2 {
                        date_range(values)
                    } else {
                        values.iter().map(ToString::to_string).collect()
                    };
                    for (&(offset, hot_spot), text) in offsets.iter().zip(&texts) {
                        layout.add_label(offset, hot_spot, text, None, mode);
                    }
                }
                None => layout.add_label(offset, hot_spot, &value.to_string(), None, mode),
            }
        }
    }

    fn layout_dynamic_modifiers(
        &self,
        layout: &mut Layouter<'_>,
        modifiers: &Modifiers,
        frame: &dyn FrameContext,
        state: &PerFrameSymbolState,
    ) {
        if !self.shows_direction_of_movement() {
            return;
        }
        let (Some(heading), Some(icon)) =
            (modifiers.angle(keys::DIRECTION_OF_MOVEMENT), layout.icon_rect())
        else {
            return;
        };
        let height = icon.height();
        if let Some(points) = ground_heading_points(frame, state, heading, height, height) {
            let in_layout = points.len() - 1;
            layout.add_line(BELOW_BOTTOM_CENTER, points, LayoutMode::Relative, in_layout);
        }
    }

    fn max_label_lines(&self, _modifiers: &Modifiers) -> u32 {
        2
    }

    fn adjust_transform(&self, info: &TransformInfo) -> Option<Vec2> {
        if !self.shows_direction_of_movement() {
            return None;
        }
        let layout = info.layout_rect?;
        Some(Vec2::new(-info.icon_rect.center().x, -layout.y0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::kurbo::Rect;
    use tacsym_primitives::{Position, UnitsFormat};

    #[test]
    fn test_cbrn_events_get_a_type() {
        let graphic = PointGraphic::new("GHMPNEB----AUSX", Arc::default()).unwrap();
        assert_eq!(graphic.masked_code(), BIOLOGICAL_EVENT);
        let position = Position::new(1.0, 2.0, 0.0);
        let format = UnitsFormat::default();
        let info = SymbolInfo {
            position: Some(&position),
            altitude_mode: graphic.initial_altitude_mode(),
            show_location: false,
            show_hostile_indicator: graphic.default_show_hostile_indicator(),
            formatted_position: None,
            units_format: &format,
        };
        let mut modifiers = Modifiers::new();
        graphic.apply_implicit_modifiers(&info, &mut modifiers);
        assert_eq!(modifiers.text(keys::TYPE), Some("BIO"));
        assert_eq!(modifiers.text(keys::HOSTILE_ENEMY), Some("ENY"));
        assert_eq!(modifiers.get(keys::LOCATION), None);
    }

    #[test]
    fn test_date_range_hyphen() {
        let values = [ModifierValue::from("d1"), ModifierValue::from("d2")];
        assert_eq!(date_range(&values), ["d1-", "d2"]);
        let single = [ModifierValue::from("d1")];
        assert_eq!(date_range(&single), ["d1"]);
    }

    #[test]
    fn test_transform_only_for_direction_of_movement_graphics() {
        let info = TransformInfo {
            has_offset: true,
            icon_rect: Rect::new(0.0, 0.0, 20.0, 10.0),
            layout_rect: Some(Rect::new(0.0, -4.0, 20.0, 10.0)),
        };
        let nuclear = PointGraphic::new("G-M-NZ---------", Arc::default()).unwrap();
        assert_eq!(nuclear.adjust_transform(&info), Some(Vec2::new(-10.0, 4.0)));
        let other = PointGraphic::new("G-G-GPP--------", Arc::default()).unwrap();
        assert_eq!(other.adjust_transform(&info), None);
    }

    #[test]
    fn test_layout_table_lookup() {
        let mut table = LabelLayouts::new();
        table.insert(
            "g-g-gpp--------",
            vec![
                LabelLayout::new(keys::UNIQUE_DESIGNATION)
                    .with(Offset::RIGHT_CENTER, Offset::LEFT_CENTER),
            ],
        );
        assert_eq!(table.get("G-G-GPP--------").len(), 1);
        assert!(table.get(BIOLOGICAL_EVENT).is_empty());
    }
}
