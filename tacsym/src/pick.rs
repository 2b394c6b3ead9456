// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color-coded picking.

use core::any::Any;
use std::sync::Arc;

use hashbrown::HashMap;
use peniko::kurbo::Point;
use tacsym_draw::DrawBackend;
use tacsym_primitives::Position;

use crate::{LayerId, SymbolId};

/// What a pick resolves to.
#[derive(Clone, Debug)]
pub enum PickOwner {
    /// The symbol itself.
    Symbol(SymbolId),
    /// An application object the symbol was drawn on behalf of.
    Delegate(Arc<dyn Any + Send + Sync>),
}

/// An object under the pick point.
#[derive(Clone, Debug)]
pub struct PickedObject {
    /// The unique color the object was drawn with.
    pub color: u32,
    /// The object.
    pub owner: PickOwner,
    /// The layer the object was drawn in, once resolved.
    pub layer: Option<LayerId>,
    /// The symbol's geographic position.
    pub position: Option<Position>,
}

/// Hands out unique pick colors for one pick pass and maps the color read back to its object.
#[derive(Debug, Default)]
pub struct PickSupport {
    next_color: u32,
    candidates: HashMap<u32, PickedObject>,
}

impl PickSupport {
    /// Largest pick color; colors are `0xRRGGBB`.
    const MAX_COLOR: u32 = 0x00FF_FFFF;

    /// Creates an empty pick support.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a pick pass, forgetting every candidate and color.
    pub fn begin_frame(&mut self) {
        self.next_color = 0;
        self.candidates.clear();
    }

    /// Returns a color not handed out since [`begin_frame`](Self::begin_frame). Never returns
    /// zero, the clear color.
    pub fn unique_color(&mut self) -> u32 {
        self.next_color = if self.next_color >= Self::MAX_COLOR {
            1
        } else {
            self.next_color + 1
        };
        self.next_color
    }

    /// Registers the object drawn with `object.color`.
    pub fn add_candidate(&mut self, object: PickedObject) {
        self.candidates.insert(object.color, object);
    }

    /// Number of registered candidates.
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Forgets every candidate.
    pub fn clear_candidates(&mut self) {
        self.candidates.clear();
    }

    /// Reads the color under `point` and returns the candidate drawn with it, tagged with
    /// `layer`. Candidates are cleared either way.
    pub fn resolve<B: DrawBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        point: Point,
        layer: Option<LayerId>,
    ) -> Option<PickedObject> {
        let color = backend.read_pick_color(point);
        let picked = color.and_then(|c| self.candidates.remove(&c)).map(|mut object| {
            object.layer = layer;
            object
        });
        self.candidates.clear();
        if let Some(object) = &picked {
            log::debug!("picked {:?} at {point:?}", object.owner);
        }
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_colors_skip_zero() {
        let mut pick = PickSupport::new();
        assert_eq!(pick.unique_color(), 1);
        assert_eq!(pick.unique_color(), 2);
        pick.next_color = PickSupport::MAX_COLOR;
        assert_eq!(pick.unique_color(), 1);
        pick.begin_frame();
        assert_eq!(pick.unique_color(), 1);
    }
}
