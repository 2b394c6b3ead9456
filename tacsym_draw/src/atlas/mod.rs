// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared glyph atlas for modifier glyphs.
//!
//! This module provides:
//! - [`GlyphAtlas`], a single RGBA8 image holding many small glyphs packed on shelves, keyed by
//!   [`IconSourceKey`], with least-recently-used eviction when full
//! - [`AtlasElement`], one glyph's load state, placing the image into the atlas once retrieved
//! - [`GlyphReferences`], a symbol's map from modifier code to element with age-based expiry
//!
//! Reference expiry and atlas eviction are independent: forgetting a reference leaves the pixels
//! in the atlas, so a later lookup of the same glyph is a fast hit.

mod element;
mod packer;

use core::fmt::{Debug, Formatter};

use hashbrown::HashMap;
use log::debug;
use peniko::kurbo::Size;

use crate::{DrawBackend, Error, ErrorKind, IconImage, IconSourceKey};
use packer::ShelfPacker;

pub use element::{AtlasElement, GlyphReferences};

/// Border in pixels around each element, replicated from the element's edge pixels.
pub const ELEMENT_BORDER: u32 = 1;

// ---------------------------------------------------------------------------
// Configuration and value types
// ---------------------------------------------------------------------------

/// Sizing and eviction policy for a [`GlyphAtlas`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Initial backing width in pixels, rounded up to a power of two.
    pub initial_width: u32,
    /// Initial backing height in pixels, rounded up to a power of two.
    pub initial_height: u32,
    /// Maximum backing width in pixels.
    pub max_width: u32,
    /// Maximum backing height in pixels.
    pub max_height: u32,
    /// Evict the least recently used element when an addition does not fit.
    pub evict_old_elements: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            initial_width: 1024,
            initial_height: 128,
            max_width: 2048,
            max_height: 2048,
            evict_old_elements: true,
        }
    }
}

/// A pixel rectangle within the atlas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtlasRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl AtlasRegion {
    /// Creates a region.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest region containing both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// Normalized texture coordinates of an image, `(u0, v0)` top-left and `(u1, v1)` bottom-right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexCoords {
    /// Left.
    pub u0: f32,
    /// Top.
    pub v0: f32,
    /// Right.
    pub u1: f32,
    /// Bottom.
    pub v1: f32,
}

impl TexCoords {
    /// Coordinates covering a whole texture.
    pub const FULL: Self = Self {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };
}

/// The atlas pixels handed to a backend on [`GlyphAtlas::bind`].
#[derive(Clone, Copy, Debug)]
pub struct AtlasSurface<'a> {
    /// Changes whenever the backing image is reallocated; the whole image must be uploaded.
    pub generation: u64,
    /// Backing width in pixels.
    pub width: u32,
    /// Backing height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels.
    pub pixels: &'a [u8],
    /// Area changed since the previous bind, if any.
    pub dirty: Option<AtlasRegion>,
}

#[derive(Clone, Copy, Debug)]
struct AtlasEntry {
    /// Allocated area including the border.
    region: AtlasRegion,
    /// Use serial for LRU eviction.
    serial: u64,
}

impl AtlasEntry {
    fn image_size(&self) -> Size {
        Size::new(
            f64::from(self.region.width - 2 * ELEMENT_BORDER),
            f64::from(self.region.height - 2 * ELEMENT_BORDER),
        )
    }
}

// ---------------------------------------------------------------------------
// GlyphAtlas
// ---------------------------------------------------------------------------

/// A shared RGBA8 image packing many small glyph images.
///
/// The backing image starts at the configured initial size and doubles, one dimension at a time,
/// up to the maximum. When an addition still does not fit and eviction is enabled, the least
/// recently used element is removed and the addition retried.
pub struct GlyphAtlas {
    config: AtlasConfig,
    packer: ShelfPacker,
    pixels: Vec<u8>,
    entries: HashMap<IconSourceKey, AtlasEntry>,
    /// Incremented on every use; entries remember the serial of their last use.
    serial: u64,
    generation: u64,
    dirty: Option<AtlasRegion>,
    cache_hits: u64,
    cache_misses: u64,
}

impl GlyphAtlas {
    /// Creates an empty atlas.
    pub fn new(config: AtlasConfig) -> Result<Self, Error> {
        if config.initial_width == 0
            || config.initial_height == 0
            || config.max_width < config.initial_width
            || config.max_height < config.initial_height
        {
            return Err(Error::new(
                ErrorKind::InvalidDimensions,
                config.initial_width,
                config.initial_height,
            ));
        }
        let width = config.initial_width.next_power_of_two().min(config.max_width);
        let height = config
            .initial_height
            .next_power_of_two()
            .min(config.max_height);
        Ok(Self {
            config,
            packer: ShelfPacker::new(width, height),
            pixels: vec![0; width as usize * height as usize * 4],
            entries: HashMap::new(),
            serial: 0,
            generation: 0,
            dirty: None,
            cache_hits: 0,
            cache_misses: 0,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Current backing width in pixels.
    pub fn width(&self) -> u32 {
        self.packer.width()
    }

    /// Current backing height in pixels.
    pub fn height(&self) -> u32 {
        self.packer.height()
    }

    /// Adds `image` under `key`, replacing any existing image for the key.
    pub fn add(&mut self, key: IconSourceKey, image: &IconImage) -> Result<(), Error> {
        let width = image.width() + 2 * ELEMENT_BORDER;
        let height = image.height() + 2 * ELEMENT_BORDER;
        if width > self.config.max_width || height > self.config.max_height {
            return Err(Error::new(
                ErrorKind::ImageTooLarge,
                image.width(),
                image.height(),
            ));
        }
        self.remove(&key);
        let region = loop {
            if let Some(region) = self.packer.allocate(width, height) {
                break region;
            }
            if self.grow() {
                continue;
            }
            if self.config.evict_old_elements && self.evict_least_recently_used() {
                continue;
            }
            return Err(Error::new(
                ErrorKind::AtlasFull,
                image.width(),
                image.height(),
            ));
        };
        self.blit(region, image);
        self.serial += 1;
        self.entries.insert(
            key,
            AtlasEntry {
                region,
                serial: self.serial,
            },
        );
        Ok(())
    }

    /// Removes the image for `key`, clearing its pixels. Returns whether it was present.
    pub fn remove(&mut self, key: &IconSourceKey) -> bool {
        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        self.packer.deallocate(entry.region);
        self.fill(entry.region, [0; 4]);
        true
    }

    /// Whether an image for `key` is present. Marks it as used.
    pub fn contains(&mut self, key: &IconSourceKey) -> bool {
        self.touch(key).is_some()
    }

    /// Size of the image for `key`, without its border. Marks it as used.
    pub fn size(&mut self, key: &IconSourceKey) -> Option<Size> {
        self.touch(key).map(|entry| entry.image_size())
    }

    /// Texture coordinates of the image for `key`, excluding its border. Marks it as used.
    ///
    /// Counts towards the hit/miss statistics.
    pub fn tex_coords(&mut self, key: &IconSourceKey) -> Option<TexCoords> {
        let Some(entry) = self.touch(key) else {
            self.cache_misses += 1;
            return None;
        };
        self.cache_hits += 1;
        let w = self.width() as f32;
        let h = self.height() as f32;
        let r = entry.region;
        Some(TexCoords {
            u0: (r.x + ELEMENT_BORDER) as f32 / w,
            v0: (r.y + ELEMENT_BORDER) as f32 / h,
            u1: (r.x + r.width - ELEMENT_BORDER) as f32 / w,
            v1: (r.y + r.height - ELEMENT_BORDER) as f32 / h,
        })
    }

    /// Removes every image.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.packer.clear();
        self.pixels.fill(0);
        self.dirty = Some(AtlasRegion::new(0, 0, self.width(), self.height()));
    }

    /// Number of images held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the atlas holds no images.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of [`tex_coords`](Self::tex_coords) hits since the last [`clear_stats`](Self::clear_stats).
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    /// Number of [`tex_coords`](Self::tex_coords) misses since the last [`clear_stats`](Self::clear_stats).
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses
    }

    /// Resets the hit/miss statistics.
    pub fn clear_stats(&mut self) {
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    /// Makes the atlas the backend's current texture, uploading pending changes.
    pub fn bind<B: DrawBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        let surface = AtlasSurface {
            generation: self.generation,
            width: self.width(),
            height: self.height(),
            pixels: &self.pixels,
            dirty: self.dirty,
        };
        let bound = backend.bind_atlas(surface);
        if bound {
            self.dirty = None;
        }
        bound
    }

    fn touch(&mut self, key: &IconSourceKey) -> Option<AtlasEntry> {
        let entry = self.entries.get_mut(key)?;
        self.serial += 1;
        entry.serial = self.serial;
        Some(*entry)
    }

    fn evict_least_recently_used(&mut self) -> bool {
        let Some(key) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.serial)
            .map(|(key, _)| key.clone())
        else {
            return false;
        };
        debug!("evicting {:?} from the glyph atlas", key.symbol_id());
        self.remove(&key)
    }

    /// Doubles one backing dimension, height first. Returns `false` at the maximum size.
    fn grow(&mut self) -> bool {
        let (old_width, old_height) = (self.width(), self.height());
        let (width, height) = if old_height < self.config.max_height {
            (old_width, (old_height * 2).min(self.config.max_height))
        } else if old_width < self.config.max_width {
            ((old_width * 2).min(self.config.max_width), old_height)
        } else {
            return false;
        };
        let mut pixels = vec![0; width as usize * height as usize * 4];
        let old_stride = old_width as usize * 4;
        let stride = width as usize * 4;
        for (src, dst) in self
            .pixels
            .chunks_exact(old_stride)
            .zip(pixels.chunks_exact_mut(stride))
        {
            dst[..old_stride].copy_from_slice(src);
        }
        self.pixels = pixels;
        self.packer.grow(width, height);
        self.generation += 1;
        self.dirty = Some(AtlasRegion::new(0, 0, width, height));
        debug!("glyph atlas grew from {old_width}x{old_height} to {width}x{height}");
        true
    }

    fn mark_dirty(&mut self, region: AtlasRegion) {
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(region),
            None => region,
        });
    }

    fn fill(&mut self, region: AtlasRegion, pixel: [u8; 4]) {
        let stride = self.width() as usize * 4;
        for y in region.y..region.y + region.height {
            let start = y as usize * stride + region.x as usize * 4;
            let row = &mut self.pixels[start..start + region.width as usize * 4];
            for chunk in row.chunks_exact_mut(4) {
                chunk.copy_from_slice(&pixel);
            }
        }
        self.mark_dirty(region);
    }

    /// Copies `image` into `region` with its edge pixels replicated into the border.
    fn blit(&mut self, region: AtlasRegion, image: &IconImage) {
        let stride = self.width() as usize * 4;
        let b = ELEMENT_BORDER;
        for y in 0..region.height {
            let src_y = y.saturating_sub(b).min(image.height() - 1);
            let src = image.row(src_y);
            let start = (region.y + y) as usize * stride + region.x as usize * 4;
            let dst = &mut self.pixels[start..start + region.width as usize * 4];
            let inner = b as usize * 4..(b + image.width()) as usize * 4;
            dst[inner.clone()].copy_from_slice(src);
            let first: [u8; 4] = [src[0], src[1], src[2], src[3]];
            let last_start = src.len() - 4;
            let last: [u8; 4] = [
                src[last_start],
                src[last_start + 1],
                src[last_start + 2],
                src[last_start + 3],
            ];
            for chunk in dst[..inner.start].chunks_exact_mut(4) {
                chunk.copy_from_slice(&first);
            }
            for chunk in dst[inner.end..].chunks_exact_mut(4) {
                chunk.copy_from_slice(&last);
            }
        }
        self.mark_dirty(region);
    }
}

impl Debug for GlyphAtlas {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphAtlas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("entries", &self.entries.len())
            .field("generation", &self.generation)
            .field("cache_hits", &self.cache_hits)
            .field("cache_misses", &self.cache_misses)
            .finish_non_exhaustive()
    }
}
