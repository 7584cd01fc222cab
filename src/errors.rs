//! Error type for everything this crate can fail at.
//!
//! Mirrors the split used throughout the rest of the crate: a region that
//! does not fit the text it is supposed to cover, an allocation that could
//! not be satisfied, and a caller-supplied writer that failed.

use std::fmt;

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or rendering a [`crate::MarkedText`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// `start > end`, or `end` exceeds the length of the text, or the
    /// region could not be represented in `u32`.
    #[error("region {start}..{end} is invalid for text of length {text_len}")]
    InvalidRegion {
        /// Start of the offending region.
        start: usize,
        /// End of the offending region.
        end: usize,
        /// Length of the text the region was checked against.
        text_len: usize,
    },

    /// An internal allocation could not be satisfied. The mark store is left
    /// unchanged; no partial mark was inserted.
    #[error("allocation failed while growing the mark store")]
    OutOfMemory,

    /// The caller-supplied [`crate::BodyWriter`] reported a failure. Some
    /// output may already have reached the sink before this was raised.
    #[error("writer failed: {0}")]
    WriterError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Build an [`Error::InvalidRegion`] from a `start..end` pair and the
    /// length of the text it was checked against.
    pub(crate) fn invalid_region(start: usize, end: usize, text_len: usize) -> Self {
        Self::InvalidRegion {
            start,
            end,
            text_len,
        }
    }

    /// Wrap an arbitrary writer failure.
    pub fn writer<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WriterError(Box::new(err))
    }
}

/// A minimal writer error for callers whose sink only ever fails with a
/// message (e.g. an in-memory buffer that enforces a size cap).
#[derive(Debug)]
pub struct WriteFailure(
    /// the failure message.
    pub String,
);

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for WriteFailure {}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn invalid_region_carries_fields() {
        let e = Error::invalid_region(5, 3, 10);
        assert_matches!(e, Error::InvalidRegion { start: 5, end: 3, text_len: 10 });
    }

    #[test]
    fn writer_error_displays_inner_message() {
        let e = Error::writer(WriteFailure("disk full".to_owned()));
        assert_eq!(e.to_string(), "writer failed: disk full");
    }
}
