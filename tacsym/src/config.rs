// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use tacsym_draw::{AtlasConfig, IconImage};
use tacsym_primitives::UnitsFormat;

/// Settings shared by every symbol in a [`SymbolContext`](crate::SymbolContext).
#[derive(Clone, Debug)]
pub struct SymbolConfig {
    /// How long a symbol keeps a glyph reference it no longer uses.
    pub max_time_since_last_used: Duration,
    /// Edge length, in pixels, of the box used to cull a symbol that has never been laid out.
    pub max_symbol_dimension: f64,
    /// Polygon depth offset applied while drawing symbols.
    pub default_depth_offset: f64,
    /// Depth subtracted from direction lines so they draw over their icon.
    pub line_depth_bias: f64,
    /// Configuration of the shared glyph atlas.
    pub atlas: AtlasConfig,
    /// Whether new symbols draw in batches with their neighbours in the queue.
    pub batch_rendering: bool,
    /// Whether new symbols are picked in batches with their neighbours in the queue.
    pub batch_picking: bool,
    /// Formatting of the implicit location and altitude modifiers.
    pub units_format: UnitsFormat,
    /// Drawn while a symbol's first icon is loading.
    pub placeholder: Option<IconImage>,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            max_time_since_last_used: Duration::from_millis(10_000),
            max_symbol_dimension: 256.0,
            default_depth_offset: -8200.0,
            line_depth_bias: 8.0 * 0.000_488_758_09,
            atlas: AtlasConfig::default(),
            batch_rendering: true,
            batch_picking: true,
            units_format: UnitsFormat::default(),
            placeholder: None,
        }
    }
}
