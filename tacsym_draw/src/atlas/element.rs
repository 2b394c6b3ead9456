// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::task::Poll;
use core::time::Duration;

use hashbrown::HashMap;
use log::{error, warn};

use crate::load::{LoadOutcome, PendingLoad};
use crate::{GlyphAtlas, IconImage, IconLoader, IconSourceKey};

/// One modifier glyph stored in the shared [`GlyphAtlas`].
///
/// The element requests its image on first use and places it into the atlas once retrieved. If
/// the atlas later evicts it, the next [`load`](Self::load) requests it again. A failed retrieval
/// is sticky.
#[derive(Debug)]
pub struct AtlasElement {
    source: IconSourceKey,
    last_used: Duration,
    failed: bool,
    pending: Option<PendingLoad>,
}

impl AtlasElement {
    /// Creates an element for `source`, last used at `now`.
    pub fn new(source: IconSourceKey, now: Duration) -> Self {
        Self {
            source,
            last_used: now,
            failed: false,
            pending: None,
        }
    }

    /// The atlas key of this element.
    pub fn source(&self) -> &IconSourceKey {
        &self.source
    }

    /// Timestamp of the last lookup.
    pub fn last_used(&self) -> Duration {
        self.last_used
    }

    /// Records a lookup at `now`.
    pub fn touch(&mut self, now: Duration) {
        self.last_used = now;
    }

    /// Whether retrieval or atlas placement failed.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Ensures the image is in `atlas`. Returns `true` if it is available for drawing.
    pub fn load(&mut self, atlas: &mut GlyphAtlas, loader: &IconLoader) -> bool {
        if self.failed {
            return false;
        }
        if atlas.contains(&self.source) {
            return true;
        }
        if self.pending.is_none() {
            self.pending = loader.request(&self.source);
        }
        let Some(pending) = &self.pending else {
            return false;
        };
        let Poll::Ready(outcome) = pending.poll() else {
            return false;
        };
        self.pending = None;
        match outcome {
            LoadOutcome::Loaded(image) => return self.place(atlas, &image),
            LoadOutcome::NotFound => warn!("modifier glyph not found: {:?}", self.source),
            LoadOutcome::Failed(err) => {
                error!("failed to load modifier glyph {:?}: {err}", self.source);
            }
            LoadOutcome::Lost => {
                error!(
                    "modifier glyph load for {:?} ended without a result",
                    self.source
                );
            }
        }
        self.failed = true;
        false
    }

    fn place(&mut self, atlas: &mut GlyphAtlas, image: &IconImage) -> bool {
        match atlas.add(self.source.clone(), image) {
            Ok(()) => true,
            Err(err) => {
                warn!("cannot place modifier glyph {:?}: {err}", self.source);
                self.failed = true;
                false
            }
        }
    }
}

/// A symbol's glyph elements, keyed by modifier code.
///
/// Elements unused for longer than a maximum age are dropped by
/// [`remove_dead`](Self::remove_dead). Dropping a reference does not remove the glyph from the
/// atlas.
#[derive(Debug, Default)]
pub struct GlyphReferences {
    elements: HashMap<String, AtlasElement>,
}

impl GlyphReferences {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the element for `code`, creating it from `source` if absent, and stamps it as
    /// used at `now`.
    ///
    /// `source` is only called for a new code; an existing element keeps its key.
    pub fn get(
        &mut self,
        code: &str,
        source: impl FnOnce() -> IconSourceKey,
        now: Duration,
    ) -> &mut AtlasElement {
        let element = self
            .elements
            .entry_ref(code)
            .or_insert_with(|| AtlasElement::new(source(), now));
        element.touch(now);
        element
    }

    /// Looks up the element for `code` without touching it.
    pub fn peek(&self, code: &str) -> Option<&AtlasElement> {
        self.elements.get(code)
    }

    /// Drops every element last used more than `max_age` before `now`.
    pub fn remove_dead(&mut self, now: Duration, max_age: Duration) {
        self.elements
            .retain(|_, element| element.last_used + max_age >= now);
    }

    /// Number of referenced elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no elements are referenced.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use peniko::color::palette;
    use tacsym_primitives::Modifiers;

    use crate::{AtlasConfig, IconRetriever, RetrieveError};

    #[derive(Default)]
    struct Glyphs {
        calls: AtomicUsize,
    }

    impl IconRetriever for Glyphs {
        fn retriever_id(&self) -> &str {
            "glyphs"
        }

        fn create_icon(
            &self,
            symbol_id: &str,
            _params: &Modifiers,
        ) -> Result<Option<IconImage>, RetrieveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol_id == "missing" {
                return Ok(None);
            }
            Ok(IconImage::solid(4, 4, palette::css::BLACK))
        }
    }

    fn source(retriever: &Arc<Glyphs>, code: &str) -> IconSourceKey {
        let retriever: Arc<dyn IconRetriever> = retriever.clone();
        IconSourceKey::new(&retriever, code, Modifiers::new())
    }

    #[test]
    fn test_element_loads_into_atlas_once() {
        let retriever = Arc::new(Glyphs::default());
        let loader = IconLoader::immediate();
        let mut atlas = GlyphAtlas::new(AtlasConfig::default()).unwrap();
        let mut element = AtlasElement::new(source(&retriever, "echelon:E"), Duration::ZERO);
        assert!(element.load(&mut atlas, &loader));
        assert!(element.load(&mut atlas, &loader));
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
        assert_eq!(atlas.len(), 1);
    }

    #[test]
    fn test_element_reloads_after_atlas_eviction() {
        let retriever = Arc::new(Glyphs::default());
        let loader = IconLoader::immediate();
        let mut atlas = GlyphAtlas::new(AtlasConfig::default()).unwrap();
        let mut element = AtlasElement::new(source(&retriever, "echelon:E"), Duration::ZERO);
        assert!(element.load(&mut atlas, &loader));
        atlas.clear();
        assert!(element.load(&mut atlas, &loader));
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_glyph_fails_once() {
        let retriever = Arc::new(Glyphs::default());
        let loader = IconLoader::immediate();
        let mut atlas = GlyphAtlas::new(AtlasConfig::default()).unwrap();
        let mut element = AtlasElement::new(source(&retriever, "missing"), Duration::ZERO);
        assert!(!element.load(&mut atlas, &loader));
        assert!(!element.load(&mut atlas, &loader));
        assert!(element.is_failed());
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_dead_drops_only_expired_references() {
        let retriever = Arc::new(Glyphs::default());
        let loader = IconLoader::immediate();
        let mut atlas = GlyphAtlas::new(AtlasConfig::default()).unwrap();
        let mut refs = GlyphReferences::new();
        let max_age = Duration::from_millis(10_000);

        refs.get("old", || source(&retriever, "old"), Duration::from_millis(0))
            .load(&mut atlas, &loader);
        refs.get("fresh", || source(&retriever, "fresh"), Duration::from_millis(0));
        // Lookup restamps an existing element.
        refs.get("fresh", || unreachable!(), Duration::from_millis(5_000));

        refs.remove_dead(Duration::from_millis(10_000), max_age);
        assert_eq!(refs.len(), 2);
        refs.remove_dead(Duration::from_millis(10_001), max_age);
        assert!(refs.peek("old").is_none());
        assert!(refs.peek("fresh").is_some());

        // The atlas keeps the glyph, so a new reference is a hit without retrieval.
        let calls = retriever.calls.load(Ordering::SeqCst);
        assert!(
            refs.get("old", || source(&retriever, "old"), Duration::from_millis(10_002))
                .load(&mut atlas, &loader)
        );
        assert_eq!(retriever.calls.load(Ordering::SeqCst), calls);
    }
}
