//! Crate-wide error type.

use thiserror::Error;

/// Errors returned when opening, building, or writing database and index
/// regions.
///
/// The query path never fails: a missing k-mer is reported as `None`, not
/// as an error, and no allocation happens on error-free lookups.
#[derive(Debug, Error)]
pub enum DbError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Magic mismatch, unsupported field value, or truncated byte region.
    #[error("invalid database format: {0}")]
    BadFormat(String),
    /// Byte outside `{A,C,G,T,a,c,g,t}` passed to [`crate::kmer::encode`].
    #[error("invalid nucleotide {0:#04x} in k-mer string")]
    InvalidBase(u8),
}
