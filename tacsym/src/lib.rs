// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tacsym lays out, caches and draws tactical point symbols on a globe.
//!
//! A [`TacticalSymbol`] is a geographic position, a symbol code, and a set of [`Modifiers`]
//! rendered as an icon surrounded by modifier glyphs and labels. Rendering happens in two steps:
//!
//! 1. [`TacticalSymbol::render`] computes the symbol's per-frame state (placement, projection,
//!    culling) and, when the symbol is visible, pushes an [`OrderedSymbol`] onto a
//!    [`DrawQueue`]. The expensive static layout is computed once and reused until the icon, the
//!    active modifiers, or the attributes change.
//! 2. The host sorts the queue and drains it with [`DrawQueue::draw_next`] or
//!    [`DrawQueue::pick_next`], which draw runs of consecutive symbols inside a single
//!    [`DrawScope`](tacsym_draw::DrawScope).
//!
//! Shared state (the glyph atlas, the icon loader, default attributes and configuration) lives
//! in a [`SymbolContext`] created once per scene. The globe and camera are supplied through the
//! [`FrameContext`] trait; the GPU and text backend through [`DrawBackend`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use tacsym::{SymbolConfig, SymbolContext, TacticalSymbol, UnitSymbol};
//! use tacsym::draw::IconLoader;
//! use tacsym::primitives::{keys, Position};
//!
//! let cx = SymbolContext::new(SymbolConfig::default(), IconLoader::immediate()).unwrap();
//! let kind = UnitSymbol::new("SFGPUCI----D---").unwrap();
//! let mut symbol = TacticalSymbol::new(kind, Position::new(34.2, -118.2, 0.0), &cx);
//! symbol.set_modifier(keys::UNIQUE_DESIGNATION, "A-1");
//! assert_eq!(symbol.identifier(), "SFGPUCI----D---");
//! ```
//!
//! [`Modifiers`]: tacsym_primitives::Modifiers
//! [`DrawBackend`]: tacsym_draw::DrawBackend

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use tacsym_draw as draw;
pub use tacsym_primitives as primitives;

mod attributes;
mod code;
mod config;
mod context;
mod error;
mod frame;
mod layer;
mod lod;
mod pick;
mod queue;
mod symbol;

pub mod kind;
pub mod layout;

#[cfg(test)]
mod tests;

pub use attributes::SymbolAttributes;
pub use code::SymbolCode;
pub use config::SymbolConfig;
pub use context::SymbolContext;
pub use error::{Error, ErrorKind};
pub use frame::{FrameContext, PerFrameSymbolState};
pub use kind::{PointGraphic, SymbolKind, UnitSymbol};
pub use layer::{LayerId, SymbolId, SymbolLayer, SymbolLookup};
pub use lod::{DistanceLod, LodSelector};
pub use pick::{PickOwner, PickSupport, PickedObject};
pub use queue::{DrawQueue, DrawStep, OrderedSymbol, PickStep, QueuedItem};
pub use symbol::TacticalSymbol;
