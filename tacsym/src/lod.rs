// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;

use crate::error::{Error, ErrorKind};
use crate::{FrameContext, TacticalSymbol};

/// Adjusts a symbol's level of detail before it is laid out.
///
/// Called once per frame for each visible symbol, after its placement is known and before
/// attributes are resolved. Implementations typically toggle modifier visibility by eye
/// distance; a change that affects layout triggers a fresh layout.
pub trait LodSelector: Debug + Send + Sync {
    /// Adjusts `symbol` for a camera `eye_distance` meters away.
    fn select_lod(&self, frame: &dyn FrameContext, symbol: &mut TacticalSymbol, eye_distance: f64);
}

/// Hides text modifiers beyond a distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceLod {
    max_text_distance: f64,
}

impl DistanceLod {
    /// Shows text modifiers only within `max_text_distance` meters of the eye.
    pub fn new(max_text_distance: f64) -> Result<Self, Error> {
        if !(max_text_distance.is_finite() && max_text_distance > 0.0) {
            return Err(Error::new(
                ErrorKind::InvalidDimension,
                Some(max_text_distance),
            ));
        }
        Ok(Self { max_text_distance })
    }

    /// The distance beyond which text modifiers are hidden.
    pub fn max_text_distance(&self) -> f64 {
        self.max_text_distance
    }
}

impl LodSelector for DistanceLod {
    fn select_lod(&self, _frame: &dyn FrameContext, symbol: &mut TacticalSymbol, eye_distance: f64) {
        symbol.set_show_text_modifiers(eye_distance <= self.max_text_distance);
    }
}
