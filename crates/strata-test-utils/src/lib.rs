//! Test utilities for the Strata content pipeline.
//!
//! [`MockGpu`] implements [`GpuContext`](strata_core::graphics::GpuContext)
//! without a device: it records every call into a shared [`CallLog`] and can be
//! told to fail program compilation.
//!
//! ```rust
//! use strata_core::graphics::{BufferUsage, GpuContext};
//! use strata_test_utils::{GpuCall, MockGpu};
//!
//! let mut gpu = MockGpu::new();
//! let log = gpu.log();
//! gpu.create_buffer(BufferUsage::Vertex, &[0; 36]).unwrap();
//! assert!(matches!(log.calls()[0], GpuCall::CreateBuffer { size: 36, .. }));
//! ```

mod mock_gpu;

pub use mock_gpu::{CallLog, GpuCall, MockGpu};
