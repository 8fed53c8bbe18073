//! Test utilities shared by the sweep crates.
//!
//! These are mostly generators of arbitrary values for types from external libraries, where
//! implementing `Arbitrary` is not possible due to the orphan rule.

pub mod arbitrary_generator;

pub use arbitrary_generator::{arb_outpoint, arb_outpoints, arb_txid, ArbitraryGenerator};
