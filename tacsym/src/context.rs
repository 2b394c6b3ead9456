// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use tacsym_draw::{GlyphAtlas, IconLoader, IconSourceKey};

use crate::{SymbolAttributes, SymbolConfig};

/// State shared by all symbols of a scene: configuration, the glyph atlas, the icon loader and
/// default attributes.
///
/// Create one per scene and pass it to every render, draw and pick call.
#[derive(Debug)]
pub struct SymbolContext {
    config: SymbolConfig,
    pub(crate) atlas: GlyphAtlas,
    pub(crate) loader: IconLoader,
    defaults: SymbolAttributes,
}

impl SymbolContext {
    /// Creates a context. Fails if the atlas configuration is invalid.
    pub fn new(config: SymbolConfig, loader: IconLoader) -> Result<Self, tacsym_draw::Error> {
        let atlas = GlyphAtlas::new(config.atlas)?;
        Ok(Self {
            config,
            atlas,
            loader,
            defaults: SymbolAttributes::defaults(),
        })
    }

    /// The configuration.
    pub fn config(&self) -> &SymbolConfig {
        &self.config
    }

    /// The shared glyph atlas.
    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    /// Mutable access to the shared glyph atlas.
    pub fn atlas_mut(&mut self) -> &mut GlyphAtlas {
        &mut self.atlas
    }

    /// The icon loader.
    pub fn loader(&self) -> &IconLoader {
        &self.loader
    }

    /// Attributes used for fields a symbol leaves unset.
    pub fn defaults(&self) -> &SymbolAttributes {
        &self.defaults
    }

    /// Replaces the default attributes.
    pub fn set_defaults(&mut self, defaults: SymbolAttributes) {
        self.defaults = defaults;
    }

    /// Drains the keys of icons that finished loading since the last call.
    ///
    /// A non-empty result means some symbol can swap in a real icon on the next frame.
    pub fn take_ready_icons(&self) -> Vec<IconSourceKey> {
        self.loader.take_ready()
    }
}
