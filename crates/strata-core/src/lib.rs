//! Shared foundation for the Strata content pipeline.
//!
//! - [`alloc`]: hash collections and the generational [`alloc::sparse_set::SparseSet`]
//! - [`graphics`]: vertex layout engine and the GPU backend abstraction
//! - [`math`]: color type and vector re-exports
//! - [`logging`] and [`profiling`]: ambient diagnostics

pub mod alloc;
pub mod graphics;
pub mod logging;
pub mod math;
pub mod profiling;
