// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::task::Poll;

use log::{error, warn};
use peniko::kurbo::Size;

use crate::load::{LoadOutcome, PendingLoad};
use crate::{IconImage, IconLoader, IconSourceKey, LoadState};

/// A symbol's main icon image and its load state.
///
/// Failure is sticky: once retrieval fails or finds nothing, [`load`](Self::load) returns
/// `false` without asking the retriever again.
#[derive(Debug)]
pub struct IconTexture {
    source: IconSourceKey,
    state: LoadState,
    image: Option<IconImage>,
    pending: Option<PendingLoad>,
}

impl IconTexture {
    /// Creates an unloaded texture for `source`.
    pub fn new(source: IconSourceKey) -> Self {
        Self {
            source,
            state: LoadState::Unloaded,
            image: None,
            pending: None,
        }
    }

    /// The key this texture loads.
    pub fn source(&self) -> &IconSourceKey {
        &self.source
    }

    /// The current load state.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The image, once loaded.
    pub fn image(&self) -> Option<&IconImage> {
        self.image.as_ref()
    }

    /// The image size, once loaded.
    pub fn size(&self) -> Option<Size> {
        self.image.as_ref().map(IconImage::size)
    }

    /// Whether the image is available.
    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Starts or advances loading and reports whether the image is available.
    ///
    /// An unloaded texture issues a request; if the loader cannot take it right now the texture
    /// stays unloaded and asks again next time. A loading texture checks for the result.
    pub fn load(&mut self, loader: &IconLoader) -> bool {
        match self.state {
            LoadState::Loaded => return true,
            LoadState::Failed => return false,
            LoadState::Unloaded => {
                let Some(pending) = loader.request(&self.source) else {
                    return false;
                };
                self.pending = Some(pending);
                self.state = LoadState::Loading;
            }
            LoadState::Loading => {}
        }
        self.poll()
    }

    /// Installs a finished result, if any, and reports whether the image is available.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = &self.pending else {
            return self.is_loaded();
        };
        let Poll::Ready(outcome) = pending.poll() else {
            return false;
        };
        self.pending = None;
        match outcome {
            LoadOutcome::Loaded(image) => {
                self.image = Some(image);
                self.state = LoadState::Loaded;
                return true;
            }
            LoadOutcome::NotFound => {
                warn!("icon not found: {:?}", self.source);
            }
            LoadOutcome::Failed(err) => {
                error!("failed to load icon {:?}: {err}", self.source);
            }
            LoadOutcome::Lost => {
                error!("icon load for {:?} ended without a result", self.source);
            }
        }
        self.state = LoadState::Failed;
        false
    }

    /// Abandons an in-flight request. The texture returns to the unloaded state.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.state = LoadState::Unloaded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use peniko::color::palette;
    use tacsym_primitives::Modifiers;

    use crate::{IconRetriever, RetrieveError};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl IconRetriever for Counting {
        fn retriever_id(&self) -> &str {
            "counting"
        }

        fn create_icon(
            &self,
            symbol_id: &str,
            _params: &Modifiers,
        ) -> Result<Option<IconImage>, RetrieveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match symbol_id {
                "missing" => Ok(None),
                "broken" => Err("decoder exploded".into()),
                _ => Ok(IconImage::solid(8, 6, palette::css::WHITE)),
            }
        }
    }

    fn texture(retriever: &Arc<Counting>, symbol_id: &str) -> IconTexture {
        let retriever: Arc<dyn IconRetriever> = retriever.clone();
        IconTexture::new(IconSourceKey::new(&retriever, symbol_id, Modifiers::new()))
    }

    #[test]
    fn test_load_success() {
        let retriever = Arc::new(Counting::default());
        let loader = IconLoader::immediate();
        let mut texture = texture(&retriever, "ok");
        assert!(texture.load(&loader));
        assert!(texture.load(&loader));
        assert_eq!(texture.size(), Some(Size::new(8.0, 6.0)));
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_sticky() {
        let retriever = Arc::new(Counting::default());
        let loader = IconLoader::immediate();
        for symbol_id in ["missing", "broken"] {
            let mut texture = texture(&retriever, symbol_id);
            let before = retriever.calls.load(Ordering::SeqCst);
            for _ in 0..5 {
                assert!(!texture.load(&loader));
            }
            assert_eq!(texture.state(), LoadState::Failed);
            assert_eq!(retriever.calls.load(Ordering::SeqCst), before + 1);
        }
    }
}
