// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered draw queue and its batching scheduler.

use std::collections::VecDeque;

use log::trace;
use peniko::kurbo::Point;
use tacsym_draw::{DrawBackend, DrawScope};

use crate::pick::{PickSupport, PickedObject};
use crate::{LayerId, PerFrameSymbolState, SymbolContext, SymbolId, SymbolLookup};

/// A symbol queued for drawing, with the state computed for it this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderedSymbol {
    /// The symbol.
    pub id: SymbolId,
    /// This frame's placement and layout rectangles.
    pub state: PerFrameSymbolState,
    /// Whether the symbol may be drawn in a batch started by another symbol.
    pub batch_rendering: bool,
    /// Whether the symbol may be picked in a batch started by another symbol.
    pub batch_picking: bool,
    /// The layer pick results resolve to.
    pub pick_layer: Option<LayerId>,
}

/// An entry in a [`DrawQueue`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QueuedItem {
    /// A tactical symbol.
    Symbol(OrderedSymbol),
    /// Something else the host draws itself, ordered by its eye distance.
    Foreign {
        /// Host-defined handle.
        id: u64,
        /// Distance from the eye, in meters.
        eye_distance: f64,
    },
}

impl QueuedItem {
    /// Distance from the eye, in meters.
    pub fn eye_distance(&self) -> f64 {
        match self {
            Self::Symbol(symbol) => symbol.state.eye_distance,
            Self::Foreign { eye_distance, .. } => *eye_distance,
        }
    }
}

/// The outcome of [`DrawQueue::draw_next`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawStep {
    /// This many symbols were popped and drawn in one scope.
    Batch(usize),
    /// A foreign item was popped; the host draws it.
    Foreign(u64),
}

/// The outcome of [`DrawQueue::pick_next`].
#[derive(Clone, Debug)]
pub enum PickStep {
    /// This many symbols were popped and drawn in pick colors in one scope.
    Batch {
        /// Number of symbols drawn.
        drawn: usize,
        /// The symbol under the pick point, if it was one of them.
        picked: Option<PickedObject>,
    },
    /// A foreign item was popped; the host picks it.
    Foreign(u64),
}

/// Symbols and host items waiting to be drawn this frame.
///
/// [`TacticalSymbol::render`](crate::TacticalSymbol::render) pushes visible symbols. The host
/// sorts the queue and drains it with [`draw_next`](Self::draw_next) or
/// [`pick_next`](Self::pick_next). Each call opens one [`DrawScope`] for the item at the front
/// and keeps drawing the following symbols in that scope while they allow batching; the first
/// item that does not is left at the front for the next call.
#[derive(Clone, Debug, Default)]
pub struct DrawQueue {
    items: VecDeque<QueuedItem>,
}

impl DrawQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a symbol.
    pub fn push_symbol(&mut self, symbol: OrderedSymbol) {
        self.items.push_back(QueuedItem::Symbol(symbol));
    }

    /// Queues a host item.
    pub fn push_foreign(&mut self, id: u64, eye_distance: f64) {
        self.items.push_back(QueuedItem::Foreign { id, eye_distance });
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item at the front.
    pub fn peek(&self) -> Option<&QueuedItem> {
        self.items.front()
    }

    /// Removes the item at the front.
    pub fn pop(&mut self) -> Option<QueuedItem> {
        self.items.pop_front()
    }

    /// Removes every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Orders items farthest first. Items at equal distance keep their queue order.
    pub fn sort_back_to_front(&mut self) {
        self.items
            .make_contiguous()
            .sort_by(|a, b| b.eye_distance().total_cmp(&a.eye_distance()));
    }

    /// Draws the item at the front and every following symbol that joins its batch.
    ///
    /// Returns `None` once the queue is empty.
    pub fn draw_next<B: DrawBackend + ?Sized>(
        &mut self,
        lookup: &dyn SymbolLookup,
        cx: &mut SymbolContext,
        backend: &mut B,
    ) -> Option<DrawStep> {
        let first = match self.items.pop_front()? {
            QueuedItem::Symbol(symbol) => symbol,
            QueuedItem::Foreign { id, .. } => return Some(DrawStep::Foreign(id)),
        };
        let mut scope = DrawScope::new(backend, false);
        scope.set_depth_offset(cx.config().default_depth_offset);

        let mut drawn = draw_one(lookup, cx, &mut scope, &first, None);
        if first.batch_rendering {
            while let Some(next) = self.pop_batchable(|next| next.batch_rendering) {
                drawn += draw_one(lookup, cx, &mut scope, &next, None);
            }
        }
        Some(DrawStep::Batch(drawn))
    }

    /// Draws the item at the front in pick colors, with every following symbol in the same pick
    /// layer that joins its batch, then resolves the color under `point`.
    ///
    /// Returns `None` once the queue is empty.
    pub fn pick_next<B: DrawBackend + ?Sized>(
        &mut self,
        lookup: &dyn SymbolLookup,
        cx: &mut SymbolContext,
        backend: &mut B,
        pick: &mut PickSupport,
        point: Point,
    ) -> Option<PickStep> {
        let first = match self.items.pop_front()? {
            QueuedItem::Symbol(symbol) => symbol,
            QueuedItem::Foreign { id, .. } => return Some(PickStep::Foreign(id)),
        };
        let drawn = {
            let mut scope = DrawScope::new(&mut *backend, true);
            scope.set_depth_offset(cx.config().default_depth_offset);

            let mut drawn = draw_one(lookup, cx, &mut scope, &first, Some(&mut *pick));
            if first.batch_rendering && first.batch_picking {
                while let Some(next) = self.pop_batchable(|next| {
                    next.batch_rendering && next.batch_picking && next.pick_layer == first.pick_layer
                }) {
                    drawn += draw_one(lookup, cx, &mut scope, &next, Some(&mut *pick));
                }
            }
            drawn
        };
        let picked = pick.resolve(backend, point, first.pick_layer);
        Some(PickStep::Batch { drawn, picked })
    }

    /// Pops the front item if it is a symbol accepted by `joins`.
    fn pop_batchable(&mut self, joins: impl Fn(&OrderedSymbol) -> bool) -> Option<OrderedSymbol> {
        match self.items.front() {
            Some(QueuedItem::Symbol(next)) if joins(next) => {
                let next = *next;
                self.items.pop_front();
                Some(next)
            }
            _ => None,
        }
    }
}

/// Draws one queued symbol, returning how many were drawn.
fn draw_one<B: DrawBackend + ?Sized>(
    lookup: &dyn SymbolLookup,
    cx: &mut SymbolContext,
    scope: &mut DrawScope<'_, B>,
    item: &OrderedSymbol,
    pick: Option<&mut PickSupport>,
) -> usize {
    let Some(symbol) = lookup.symbol(item.id) else {
        trace!("queued symbol {:?} no longer exists", item.id);
        return 0;
    };
    symbol.draw(item.id, cx, scope, &item.state, pick);
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacsym_primitives::Vec3;

    fn item(index: u32, eye_distance: f64) -> OrderedSymbol {
        OrderedSymbol {
            id: SymbolId {
                layer: LayerId(0),
                index,
            },
            state: PerFrameSymbolState::new(Vec3::ZERO, Vec3::ZERO, eye_distance),
            batch_rendering: true,
            batch_picking: true,
            pick_layer: Some(LayerId(0)),
        }
    }

    #[test]
    fn test_sort_is_back_to_front_and_stable() {
        let mut queue = DrawQueue::new();
        queue.push_symbol(item(0, 10.0));
        queue.push_foreign(7, 30.0);
        queue.push_symbol(item(1, 10.0));
        queue.push_symbol(item(2, 20.0));
        queue.sort_back_to_front();

        let order: Vec<_> = core::iter::from_fn(|| queue.pop())
            .map(|item| match item {
                QueuedItem::Symbol(s) => i64::from(s.id.index),
                QueuedItem::Foreign { id, .. } => -i64::try_from(id).unwrap(),
            })
            .collect();
        assert_eq!(order, [-7, 2, 0, 1]);
    }
}
