// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Well-known modifier and retriever parameter keys.
//!
//! Graphic modifiers resolve to glyphs from the modifier retriever; text modifiers become
//! labels. Keys are plain strings so applications can add their own.

/// Feint/dummy indicator (graphic).
pub const FEINT_DUMMY: &str = "feint_dummy";
/// Installation indicator (graphic).
pub const INSTALLATION: &str = "installation";
/// Task force indicator (graphic).
pub const TASK_FORCE: &str = "task_force";
/// Echelon indicator (graphic).
pub const ECHELON: &str = "echelon";
/// Mobility indicator (graphic).
pub const MOBILITY: &str = "mobility";
/// Auxiliary equipment indicator (graphic).
pub const AUXILIARY_EQUIPMENT: &str = "auxiliary_equipment";
/// Operational condition, drawn across the icon (graphic).
pub const OPERATIONAL_CONDITION: &str = "operational_condition";
/// Operational condition, drawn as a bar below the icon (graphic).
pub const OPERATIONAL_CONDITION_ALTERNATE: &str = "operational_condition_alternate";
/// Direction of movement, an angle (dynamic graphic).
pub const DIRECTION_OF_MOVEMENT: &str = "direction_of_movement";
/// Multiplier applied to the direction of movement line length.
pub const SPEED_LEADER_SCALE: &str = "speed_leader_scale";

/// Quantity (text).
pub const QUANTITY: &str = "quantity";
/// Special C2 headquarters (text).
pub const SPECIAL_C2_HEADQUARTERS: &str = "special_c2_headquarters";
/// Frame shape letter (text).
pub const FRAME_SHAPE: &str = "frame_shape";
/// Reinforced/reduced flags, a list of `"reinforced"`/`"reduced"` (text).
pub const REINFORCED_REDUCED: &str = "reinforced_reduced";
/// Staff comments (text).
pub const STAFF_COMMENTS: &str = "staff_comments";
/// Additional information (text).
pub const ADDITIONAL_INFORMATION: &str = "additional_information";
/// Higher formation (text).
pub const HIGHER_FORMATION: &str = "higher_formation";
/// Evaluation rating (text).
pub const EVALUATION_RATING: &str = "evaluation_rating";
/// Combat effectiveness (text).
pub const COMBAT_EFFECTIVENESS: &str = "combat_effectiveness";
/// Signature equipment (text).
pub const SIGNATURE_EQUIPMENT: &str = "signature_equipment";
/// Hostile indicator, `"ENY"` (text).
pub const HOSTILE_ENEMY: &str = "hostile_enemy";
/// IFF/SIF (text).
pub const IFF_SIF: &str = "iff_sif";
/// Date-time group (text, may be a list).
pub const DATE_TIME_GROUP: &str = "date_time_group";
/// Altitude or depth (text).
pub const ALTITUDE_DEPTH: &str = "altitude_depth";
/// Location (text).
pub const LOCATION: &str = "location";
/// Type (text).
pub const TYPE: &str = "type";
/// Unique designation (text, may be a list).
pub const UNIQUE_DESIGNATION: &str = "unique_designation";
/// Speed (text).
pub const SPEED: &str = "speed";
/// Additional text lines used by point graphics (text, may be a list).
pub const ADDITIONAL_TEXT: &str = "additional_text";

/// Whether the retriever draws the frame fill.
pub const SHOW_FILL: &str = "show_fill";
/// Whether the retriever draws the frame.
pub const SHOW_FRAME: &str = "show_frame";
/// Whether the retriever draws the inner icon.
pub const SHOW_ICON: &str = "show_icon";

/// Retriever parameter: fill color.
pub const PARAM_COLOR: &str = "color";
/// Retriever parameter: requested width in pixels.
pub const PARAM_WIDTH: &str = "width";

/// Frame shape value for exercise identities.
pub const FRAME_SHAPE_EXERCISE: &str = "X";
/// Frame shape value for the joker identity.
pub const FRAME_SHAPE_JOKER: &str = "J";
/// Frame shape value for the faker identity.
pub const FRAME_SHAPE_FAKER: &str = "K";
/// Value of [`HOSTILE_ENEMY`] when set implicitly.
pub const HOSTILE_ENEMY_VALUE: &str = "ENY";
