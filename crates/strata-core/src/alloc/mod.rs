//! Allocation and collection types shared across Strata crates.
//!
//! This module provides:
//! - Re-exports of hash collections using AHash
//! - SparseSet data structure for generational indices

pub mod sparse_set;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
