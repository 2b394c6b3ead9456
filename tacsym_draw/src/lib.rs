// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tacsym Draw provides the image side of tactical symbol rendering.
//!
//! - [`IconRetriever`] and [`IconSourceKey`]: where images come from, and a structural key naming
//!   one image.
//! - [`IconLoader`]: runs retrievals inline or on a worker pool; results are installed on the
//!   render thread and stale requests are cancelled by dropping them.
//! - [`IconTexture`]: a symbol's main icon with a sticky failed state.
//! - [`GlyphAtlas`], [`AtlasElement`] and [`GlyphReferences`]: small modifier glyphs from all
//!   symbols packed into one shared image with LRU eviction.
//! - [`DrawBackend`] and [`DrawScope`]: the drawing operations a GPU backend provides.

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

pub use peniko;
pub use peniko::{color, kurbo};

mod atlas;
mod backend;
mod error;
mod image;
mod load;
mod source;
mod texture;

pub use atlas::{
    AtlasConfig, AtlasElement, AtlasRegion, AtlasSurface, ELEMENT_BORDER, GlyphAtlas,
    GlyphReferences, TexCoords,
};
pub use backend::{DrawBackend, DrawScope, FontSpec, TextMetrics};
pub use error::{Error, ErrorKind};
pub use image::IconImage;
pub use load::{IconLoader, ImmediateExecutor, LoadExecutor, LoadState, LoadTask, WorkerPool};
pub use source::{IconRetriever, IconSourceKey, RetrieveError};
pub use texture::IconTexture;
