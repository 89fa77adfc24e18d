//! Compact dynamic tries over bit-packed open-addressing tables.
//!
//! Two engines store a growing set of strings in space close to the
//! information-theoretic lower bound for their node count, sharing one
//! outward contract (insert a key, test membership) while differing in how
//! slots are addressed:
//!
//! * [`DcwTrie`], the Darragh-Cleary-Witten scheme: collision groups
//!   delimited by virgin/change bits, displaced by cyclic shift-and-copy;
//! * [`PrTrie`], the Poyias-Raman scheme: linear probing with an explicit
//!   per-slot displacement and a small overflow map for the long tail.
//!
//! Neither stores keys or pointers. Every (parent node, symbol) edge hashes
//! to a (remainder, quotient) pair; the remainder names a home slot, the
//! quotient is written there as proof of identity, and the child's identity
//! is derived from where the probe settled. Tables are sized once at
//! construction; there is no rehashing, deletion, or iteration.
//!
//! The `bonsai` binary benchmarks either engine over a line-oriented key
//! file; see [`cli`].

pub mod alphabet;
pub mod cli;
pub mod dcw;
pub mod hash;
pub mod intvec;
pub mod keyset;
pub mod notify;
pub mod pr;
pub mod timefn;
pub mod trie;

pub use dcw::DcwTrie;
pub use intvec::IntVector;
pub use pr::PrTrie;
pub use trie::{BuildError, Trie};
