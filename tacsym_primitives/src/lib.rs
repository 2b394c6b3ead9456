// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fundamental tactical symbol vocabulary types.
//!
//! This crate is the small, dependency-light layer shared by the drawing caches and the symbol
//! layout engine: offsets and size rules used for placement, modifier values and ordered
//! modifier sets, the well-known modifier keys, and geographic positions.
//!
//! ## Example
//!
//! ```
//! use tacsym_primitives::{keys, Modifiers, Offset};
//!
//! let modifiers = Modifiers::new()
//!     .with(keys::UNIQUE_DESIGNATION, "A-1")
//!     .with(keys::SPEED_LEADER_SCALE, 2.0);
//! assert_eq!(modifiers.text(keys::UNIQUE_DESIGNATION), Some("A-1"));
//!
//! let anchor = Offset::TOP_CENTER.compute(32.0, 16.0, None, None);
//! assert_eq!((anchor.x, anchor.y), (16.0, 16.0));
//! ```
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

mod geo;
pub mod keys;
mod modifier;
mod offset;
mod size;

pub use geo::{AltitudeMode, AltitudeUnits, Position, UnitsFormat, Vec3};
pub use modifier::{ModifierValue, Modifiers};
pub use offset::{Offset, Units};
pub use size::{Dimension, SizeRule};
