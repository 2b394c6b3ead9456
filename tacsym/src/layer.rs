// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::Point;
use tacsym_draw::{DrawBackend, TextMetrics};

use crate::pick::{PickSupport, PickedObject};
use crate::queue::{DrawQueue, DrawStep, PickStep};
use crate::{FrameContext, SymbolContext, TacticalSymbol};

/// Identifies a layer of symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u32);

/// Identifies a symbol within its layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId {
    /// The layer holding the symbol.
    pub layer: LayerId,
    /// Slot within the layer.
    pub index: u32,
}

/// Finds queued symbols when the queue is drained.
pub trait SymbolLookup {
    /// The symbol with `id`, if it still exists.
    fn symbol(&self, id: SymbolId) -> Option<&TacticalSymbol>;
}

/// A set of symbols rendered and picked together.
///
/// Removing a symbol leaves its slot empty, so the ids of the others stay valid.
#[derive(Debug)]
pub struct SymbolLayer {
    id: LayerId,
    symbols: Vec<Option<TacticalSymbol>>,
}

impl SymbolLayer {
    /// Creates an empty layer.
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            symbols: Vec::new(),
        }
    }

    /// The layer's id.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Adds a symbol, returning its id.
    pub fn add(&mut self, symbol: TacticalSymbol) -> SymbolId {
        let index = u32::try_from(self.symbols.len()).unwrap_or(u32::MAX);
        self.symbols.push(Some(symbol));
        SymbolId {
            layer: self.id,
            index,
        }
    }

    /// The symbol with `id`.
    pub fn get(&self, id: SymbolId) -> Option<&TacticalSymbol> {
        if id.layer != self.id {
            return None;
        }
        self.symbols.get(usize::try_from(id.index).ok()?)?.as_ref()
    }

    /// Mutable access to the symbol with `id`.
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut TacticalSymbol> {
        if id.layer != self.id {
            return None;
        }
        self.symbols.get_mut(usize::try_from(id.index).ok()?)?.as_mut()
    }

    /// Removes the symbol with `id`, returning it.
    pub fn remove(&mut self, id: SymbolId) -> Option<TacticalSymbol> {
        if id.layer != self.id {
            return None;
        }
        self.symbols.get_mut(usize::try_from(id.index).ok()?)?.take()
    }

    /// Number of symbols in the layer.
    pub fn len(&self) -> usize {
        self.symbols.iter().flatten().count()
    }

    /// Whether the layer holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the symbols with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &TacticalSymbol)> + '_ {
        let layer = self.id;
        self.symbols.iter().zip(0_u32..).filter_map(move |(slot, index)| {
            slot.as_ref().map(|symbol| (SymbolId { layer, index }, symbol))
        })
    }

    /// Renders every symbol into `queue`, returning how many were queued.
    pub fn render(
        &mut self,
        cx: &mut SymbolContext,
        frame: &dyn FrameContext,
        text: &mut dyn TextMetrics,
        queue: &mut DrawQueue,
    ) -> usize {
        let layer = self.id;
        let mut queued = 0;
        for (slot, index) in self.symbols.iter_mut().zip(0_u32..) {
            if let Some(symbol) = slot {
                if symbol.render(SymbolId { layer, index }, cx, frame, text, queue) {
                    queued += 1;
                }
            }
        }
        queued
    }

    /// Renders the layer and draws it back to front, returning the number of symbols drawn.
    pub fn draw<B: DrawBackend>(
        &mut self,
        cx: &mut SymbolContext,
        frame: &dyn FrameContext,
        backend: &mut B,
    ) -> usize {
        let mut queue = DrawQueue::new();
        self.render(cx, frame, backend, &mut queue);
        queue.sort_back_to_front();
        let mut drawn = 0;
        while let Some(step) = queue.draw_next(self, cx, backend) {
            if let DrawStep::Batch(n) = step {
                drawn += n;
            }
        }
        drawn
    }

    /// Renders the layer in pick colors and returns the frontmost symbol under `point`.
    pub fn pick<B: DrawBackend>(
        &mut self,
        cx: &mut SymbolContext,
        frame: &dyn FrameContext,
        backend: &mut B,
        point: Point,
    ) -> Option<PickedObject> {
        let mut queue = DrawQueue::new();
        self.render(cx, frame, backend, &mut queue);
        queue.sort_back_to_front();
        let mut pick = PickSupport::new();
        pick.begin_frame();
        let mut top = None;
        while let Some(step) = queue.pick_next(self, cx, backend, &mut pick, point) {
            if let PickStep::Batch {
                picked: Some(picked),
                ..
            } = step
            {
                top = Some(picked);
            }
        }
        top
    }
}

impl SymbolLookup for SymbolLayer {
    fn symbol(&self, id: SymbolId) -> Option<&TacticalSymbol> {
        self.get(id)
    }
}
