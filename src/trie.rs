//! The contract shared by both trie engines, and construction errors.

use core::fmt;
use std::io;

use crate::intvec::WidthError;

/// Construction-time failure. Once built, an engine never errors: duplicate
/// inserts and missed searches are ordinary `false` returns, and sizing
/// violations mid-operation are panics (the table is the caller's contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// The packed slot layout needs more than 64 bits per cell; the
    /// alphabet/collision configuration is too wide for one table cell.
    CellWidth(u32),
    /// The composite key domain (alphabet x collision capacity x slots)
    /// exceeds 64 bits, so no prime/multiplier pair can scramble it.
    DomainOverflow,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::CellWidth(w) => {
                write!(f, "slot layout needs {w} bits per cell, more than the 64 available")
            }
            BuildError::DomainOverflow => {
                write!(f, "composite key domain exceeds 64 bits; shrink the alphabet, collision capacity, or slot count")
            }
        }
    }
}

impl std::error::Error for BuildError {}

impl From<WidthError> for BuildError {
    fn from(e: WidthError) -> Self {
        BuildError::CellWidth(e.0)
    }
}

/// A growing set of byte strings with prefix sharing.
///
/// Both engines implement this identically from the outside: `insert` feeds
/// one key through the per-character transition loop and stamps a terminal
/// marker, `search` replays it read-only. Keys are arbitrary byte slices;
/// callers that store line-oriented text append the NUL terminator
/// themselves so no stored key is a prefix of another.
pub trait Trie {
    /// Short engine name for benchmark banners.
    fn name() -> &'static str
    where
        Self: Sized;

    /// Adds `key`; returns `true` when it was newly inserted, `false` when
    /// it was already present.
    fn insert(&mut self, key: &[u8]) -> bool;

    /// Returns `true` iff `key` was previously inserted.
    fn search(&self, key: &[u8]) -> bool;

    /// Number of keys successfully inserted so far.
    fn num_strs(&self) -> u64;

    /// Writes human-readable diagnostic lines to `out`.
    fn show_stat(&self, out: &mut dyn io::Write) -> io::Result<()>;
}
