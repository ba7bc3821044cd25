//! File system writes.
//!
//! Provides the staged, atomic go.mod write used by `add` and `drop`.

pub mod transaction;

pub use transaction::Transaction;
