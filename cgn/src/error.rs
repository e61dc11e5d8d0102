//! Structured error taxonomy for the steganographic codec and ledger.
//!
//! Every fallible operation in this crate returns [`Result`], never panics
//! on caller-supplied input. Partial output files are the caller's
//! responsibility to clean up; see [`crate::output_guard::OutputGuard`] for
//! the RAII helper that does this for the encode/decode entry points.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CgnError>;

/// The error taxonomy surfaced to callers of the codec and ledger.
#[derive(Debug, Error)]
pub enum CgnError {
    /// The payload or PGN input file does not exist or is empty.
    #[error("input missing: {0}")]
    InputMissing(String),

    /// The PGN does not parse, a required header is missing, or `Seed` is
    /// not an integer.
    #[error("malformed input: {0}")]
    InputMalformed(String),

    /// During decode, a played move was not found in the permuted
    /// legal-move list at its ply.
    #[error("desynchronized at game {game}, ply {ply}: {detail}")]
    Desync {
        game: usize,
        ply: usize,
        detail: String,
    },

    /// The current time exceeds `ExpiryTime` or a ledger `ExpiryEntry`.
    #[error("expired: {0}")]
    Expired(String),

    /// Ledger `verify_chain` failed, or the on-disk PGN differs from the
    /// ledger's stored copy.
    #[error("tampered: {0}")]
    Tampered(String),

    /// A computed move index was out of range for the legal-move count.
    #[error("overflow computing move index: {0}")]
    Overflow(String),

    /// Underlying filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
