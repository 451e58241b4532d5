//! Error types

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

use thiserror::Error;

use crate::Dsq;

/// Errors raised while building alphabets, digitizing sequences or
/// reading genetic codes.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed construction parameters or arguments, e.g. a symbol string
    /// whose length doesn't match `Kp`, or a synonym for a symbol that isn't
    /// in the alphabet.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Text couldn't be digitized cleanly; the best-effort [`Dsq`] is kept.
    #[error(transparent)]
    Digitize(#[from] DigitizeError),

    /// Malformed genetic code description.
    #[error("genetic code format error at line {line}: {message}")]
    Format {
        /// 1-based line number where parsing stopped, or 0 if no line was read
        line: usize,
        /// Human-readable description of the problem
        message: String,
    },

    /// No NCBI translation table with this id is available.
    #[error("no such NCBI translation table: {0}")]
    NotFound(u32),

    /// Allocation of a digital sequence failed.
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    /// Reading or writing a genetic code failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}

/// Text contained bytes that aren't in an alphabet's input map.
///
/// This is a recoverable condition: digitization still completes, writing the
/// alphabet's "any" code in place of each offending byte.
#[derive(Clone, PartialEq, Eq)]
pub struct InvalidSymbols {
    pub(crate) byte: u8,
    pub(crate) pos: usize,
    pub(crate) count: usize,
}

impl InvalidSymbols {
    /// The 1-based position of the first invalid byte.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The first invalid byte.
    #[must_use]
    pub fn byte(&self) -> u8 {
        self.byte
    }

    /// How many invalid bytes were seen in total.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Display for InvalidSymbols {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let Self { byte, pos, count } = self;
        let chr = char::from(*byte).escape_default();
        if *count == 1 {
            write!(f, "invalid char '{chr}' at position {pos}")
        } else {
            write!(f, "{count} invalid chars (including '{chr}' at position {pos})")
        }
    }
}

impl std::error::Error for InvalidSymbols {}

impl Debug for InvalidSymbols {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("InvalidSymbols")
            .field("byte", &char::from(self.byte))
            .field("pos", &self.pos)
            .field("count", &self.count)
            .finish()
    }
}

/// Digitizing a new sequence hit invalid bytes.
///
/// The degraded [`Dsq`] (invalid bytes replaced by the "any" code) travels with
/// the error so callers can decide whether to keep it.
///
/// ```
/// use digiseq::{Alphabet, Error};
///
/// let dna = Alphabet::dna();
/// let Err(Error::Digitize(err)) = dna.digitize("AC!T") else { panic!() };
/// assert_eq!(err.invalid().position(), 3);
/// assert_eq!(dna.textize(&err.into_dsq()).unwrap(), "ACNT");
/// ```
#[derive(Clone, PartialEq, Eq, Error)]
#[error("{invalid}")]
pub struct DigitizeError {
    pub(crate) dsq: Dsq,
    pub(crate) invalid: InvalidSymbols,
}

impl DigitizeError {
    /// What was wrong with the input.
    #[must_use]
    pub fn invalid(&self) -> &InvalidSymbols {
        &self.invalid
    }

    /// Borrow the best-effort digital sequence.
    #[must_use]
    pub fn dsq(&self) -> &Dsq {
        &self.dsq
    }

    /// Take the best-effort digital sequence.
    #[must_use]
    pub fn into_dsq(self) -> Dsq {
        self.dsq
    }
}

impl Debug for DigitizeError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_struct("DigitizeError")
            .field("invalid", &self.invalid)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_invalid_symbol_message() {
        let err = InvalidSymbols {
            byte: b'!',
            pos: 3,
            count: 1,
        };
        assert_eq!(err.to_string(), "invalid char '!' at position 3");
    }

    #[test]
    fn multiple_invalid_symbols_message() {
        let err = InvalidSymbols {
            byte: b'\t',
            pos: 7,
            count: 4,
        };
        assert_eq!(
            err.to_string(),
            "4 invalid chars (including '\\t' at position 7)"
        );
    }

    #[test]
    fn format_error_names_line() {
        let err = Error::format(2, "Expected 64 char of Starts data");
        assert_eq!(
            err.to_string(),
            "genetic code format error at line 2: Expected 64 char of Starts data"
        );
    }
}
