// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Error raised while creating images or placing them in a [`GlyphAtlas`].
///
/// Carries a non-exhaustive [`ErrorKind`] plus the dimensions involved.
///
/// [`GlyphAtlas`]: crate::GlyphAtlas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// Width of the offending image or atlas, in pixels.
    width: u32,

    /// Height of the offending image or atlas, in pixels.
    height: u32,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The width involved, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height involved, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn new(kind: ErrorKind, width: u32, height: u32) -> Self {
        Self {
            kind,
            width,
            height,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::InvalidDimensions => write!(
                f,
                "invalid atlas dimensions {}x{}: sizes must be at least 1 and max must not be below initial",
                self.width, self.height
            ),
            ErrorKind::InvalidPixelData => write!(
                f,
                "pixel data does not match a {}x{} RGBA8 image",
                self.width, self.height
            ),
            ErrorKind::ImageTooLarge => write!(
                f,
                "image {}x{} does not fit within the atlas maximum size",
                self.width, self.height
            ),
            ErrorKind::AtlasFull => write!(
                f,
                "no space left in the atlas for a {}x{} image",
                self.width, self.height
            ),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An atlas was configured with a zero size or a maximum below its initial size.
    InvalidDimensions,

    /// The pixel buffer length does not equal `width * height * 4`, or a dimension is zero.
    InvalidPixelData,

    /// The image plus its border is larger than the atlas maximum size.
    ImageTooLarge,

    /// The atlas is at its maximum size and no entry could be evicted to make room.
    AtlasFull,
}
