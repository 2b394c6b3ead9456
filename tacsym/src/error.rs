// Copyright 2026 the Tacsym Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Error returned when a mutating call receives invalid input.
///
/// The object being modified is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The rejected value, when it is numeric.
    value: Option<f64>,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The rejected value, if the input was a number.
    ///
    /// For [`ErrorKind::InvalidSymbolCode`] this is the length of the rejected code.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub(crate) fn new(kind: ErrorKind, value: Option<f64>) -> Self {
        Self { kind, value }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let value = self.value.unwrap_or(f64::NAN);
        match self.kind {
            ErrorKind::OpacityOutOfRange => {
                write!(f, "opacity {value} is outside the range [0, 1]")
            }
            ErrorKind::InvalidScale => write!(f, "scale {value} must be finite and positive"),
            ErrorKind::InvalidFontSize => {
                write!(f, "font size {value} must be finite and positive")
            }
            ErrorKind::EmptySymbolCode => f.write_str("symbol code is empty"),
            ErrorKind::InvalidSymbolCode => write!(
                f,
                "symbol code has {value} characters, expected {} ASCII characters",
                crate::SymbolCode::LEN
            ),
            ErrorKind::InvalidDimension => {
                write!(f, "dimension {value} must be finite and positive")
            }
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An opacity outside `[0, 1]`.
    OpacityOutOfRange,

    /// A scale that is not finite or not greater than zero.
    InvalidScale,

    /// A font size that is not finite or not greater than zero.
    InvalidFontSize,

    /// An empty symbol code.
    EmptySymbolCode,

    /// A symbol code that is not 15 ASCII characters long.
    InvalidSymbolCode,

    /// A size or distance that is not finite or not greater than zero.
    InvalidDimension,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_value() {
        let err = Error::new(ErrorKind::OpacityOutOfRange, Some(1.5));
        assert_eq!(err.to_string(), "opacity 1.5 is outside the range [0, 1]");
        assert_eq!(err.value(), Some(1.5));
    }
}
