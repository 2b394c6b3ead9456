// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Icon retrievers and the value-comparable key naming one retrieved image.

use core::fmt::{Debug, Formatter};
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use tacsym_primitives::Modifiers;

use crate::IconImage;

/// Error type reported by an [`IconRetriever`].
pub type RetrieveError = Box<dyn core::error::Error + Send + Sync>;

/// Produces icon images from symbol identifiers.
///
/// Implementations may be called from loader worker threads.
pub trait IconRetriever: Send + Sync {
    /// A stable identifier for this retriever.
    ///
    /// Two retrievers with the same id are assumed to produce the same images, so the id takes
    /// part in [`IconSourceKey`] equality.
    fn retriever_id(&self) -> &str;

    /// Creates the image for `symbol_id`.
    ///
    /// `Ok(None)` means there is nothing to draw, either because the symbol is unknown or because
    /// it is deliberately blank. Both outcomes, and errors, are final for the key.
    fn create_icon(
        &self,
        symbol_id: &str,
        params: &Modifiers,
    ) -> Result<Option<IconImage>, RetrieveError>;
}

/// The `{retriever, symbol id, parameters}` triple naming one icon image.
///
/// Equality and hashing are structural: the retriever id, the symbol id and every parameter take
/// part. The parameters are copied in on construction and never change afterwards.
#[derive(Clone)]
pub struct IconSourceKey {
    retriever: Arc<dyn IconRetriever>,
    retriever_id: Arc<str>,
    symbol_id: Arc<str>,
    params: Arc<Modifiers>,
}

impl IconSourceKey {
    /// Creates a key.
    pub fn new(
        retriever: &Arc<dyn IconRetriever>,
        symbol_id: impl Into<Arc<str>>,
        params: Modifiers,
    ) -> Self {
        Self {
            retriever_id: retriever.retriever_id().into(),
            retriever: Arc::clone(retriever),
            symbol_id: symbol_id.into(),
            params: Arc::new(params),
        }
    }

    /// The retriever id.
    pub fn retriever_id(&self) -> &str {
        &self.retriever_id
    }

    /// The symbol id.
    pub fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    /// The retrieval parameters.
    pub fn params(&self) -> &Modifiers {
        &self.params
    }

    /// Runs the retriever for this key.
    pub fn retrieve(&self) -> Result<Option<IconImage>, RetrieveError> {
        self.retriever.create_icon(&self.symbol_id, &self.params)
    }
}

impl PartialEq for IconSourceKey {
    fn eq(&self, other: &Self) -> bool {
        self.retriever_id == other.retriever_id
            && self.symbol_id == other.symbol_id
            && self.params == other.params
    }
}

impl Eq for IconSourceKey {}

impl Hash for IconSourceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.retriever_id.hash(state);
        self.symbol_id.hash(state);
        self.params.hash(state);
    }
}

impl Debug for IconSourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IconSourceKey")
            .field("retriever_id", &self.retriever_id)
            .field("symbol_id", &self.symbol_id)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
