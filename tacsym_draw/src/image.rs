// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use peniko::Blob;
use peniko::color::{AlphaColor, Srgb};
use peniko::kurbo::Size;

use crate::{Error, ErrorKind};

/// A decoded RGBA8 image produced by an [`IconRetriever`].
///
/// Pixel data is shared, so cloning is cheap. The blob id identifies the pixel data for backends
/// that keep their own GPU texture cache.
///
/// [`IconRetriever`]: crate::IconRetriever
#[derive(Clone)]
pub struct IconImage {
    width: u32,
    height: u32,
    data: Blob<u8>,
}

impl IconImage {
    /// Creates an image from tightly packed, row-major RGBA8 pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, Error> {
        Self::from_blob(width, height, Blob::new(Arc::new(pixels)))
    }

    /// Creates an image from an existing blob of RGBA8 pixels.
    pub fn from_blob(width: u32, height: u32, data: Blob<u8>) -> Result<Self, Error> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(Error::new(ErrorKind::InvalidPixelData, width, height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates an image filled with a single color.
    ///
    /// Returns `None` if either dimension is zero.
    pub fn solid(width: u32, height: u32, color: AlphaColor<Srgb>) -> Option<Self> {
        let rgba = color.to_rgba8();
        let pixel = [rgba.r, rgba.g, rgba.b, rgba.a];
        let pixels = pixel.repeat(width as usize * height as usize);
        Self::new(width, height, pixels).ok()
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size in pixels.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Row-major RGBA8 pixel data.
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Identifier of the underlying pixel blob.
    pub fn id(&self) -> u64 {
        self.data.id()
    }

    /// Returns one row of pixels.
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data()[start..start + stride]
    }
}

impl core::fmt::Debug for IconImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IconImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("id", &self.data.id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peniko::color::palette;

    #[test]
    fn test_rejects_mismatched_length() {
        let err = IconImage::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPixelData);
        assert!(IconImage::new(0, 2, Vec::new()).is_err());
    }

    #[test]
    fn test_solid_fills_every_pixel() {
        let image = IconImage::solid(3, 2, palette::css::RED).unwrap();
        assert_eq!(image.data().len(), 24);
        assert_eq!(image.row(1), &[255, 0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255]);
    }
}
