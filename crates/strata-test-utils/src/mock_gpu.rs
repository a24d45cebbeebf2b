use std::num::NonZeroU64;
use std::sync::Arc;

use parking_lot::Mutex;
use strata_core::graphics::{
    BufferUsage, GpuContext, GpuError, GpuId, PixelFormat, TextureDescriptor, VertexDeclaration,
};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuCall {
    CreateTexture {
        id: GpuId,
        width: u32,
        height: u32,
        format: PixelFormat,
    },
    CreateBuffer {
        id: GpuId,
        usage: BufferUsage,
        size: usize,
    },
    CreateVertexArray {
        id: GpuId,
        stride: u32,
        vertices: GpuId,
        indices: GpuId,
    },
    CreateProgram {
        id: GpuId,
        vertex_len: usize,
        fragment_len: usize,
    },
    Destroy {
        id: GpuId,
    },
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<GpuCall>,
    live: Vec<GpuId>,
    next: u64,
    fail_programs: bool,
}

/// Shared view of a [`MockGpu`]'s state that survives boxing the backend.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<State>>);

impl CallLog {
    pub fn calls(&self) -> Vec<GpuCall> {
        self.0.lock().calls.clone()
    }

    pub fn clear(&self) {
        self.0.lock().calls.clear();
    }

    /// Resources created and not destroyed yet.
    pub fn live(&self) -> usize {
        self.0.lock().live.len()
    }

    pub fn is_live(&self, id: GpuId) -> bool {
        self.0.lock().live.contains(&id)
    }

    pub fn count(&self, pred: impl Fn(&GpuCall) -> bool) -> usize {
        self.0.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Make every following `create_program` fail with a compile error.
    pub fn fail_programs(&self, fail: bool) {
        self.0.lock().fail_programs = fail;
    }
}

/// Recording GPU backend for tests.
#[derive(Debug, Default)]
pub struct MockGpu {
    log: CallLog,
}

impl MockGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn record(&self, make: impl FnOnce(GpuId) -> GpuCall) -> Result<GpuId, GpuError> {
        let mut state = self.log.0.lock();
        state.next += 1;
        let id = GpuId::new(NonZeroU64::new(state.next).ok_or(GpuError::OutOfMemory)?);
        state.live.push(id);
        state.calls.push(make(id));
        Ok(id)
    }
}

impl GpuContext for MockGpu {
    fn create_texture(&mut self, desc: &TextureDescriptor, _pixels: &[u8]) -> Result<GpuId, GpuError> {
        self.record(|id| GpuCall::CreateTexture {
            id,
            width: desc.width,
            height: desc.height,
            format: desc.format,
        })
    }

    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> Result<GpuId, GpuError> {
        self.record(|id| GpuCall::CreateBuffer {
            id,
            usage,
            size: data.len(),
        })
    }

    fn create_vertex_array(
        &mut self,
        declaration: &VertexDeclaration,
        vertices: GpuId,
        indices: GpuId,
    ) -> Result<GpuId, GpuError> {
        self.record(|id| GpuCall::CreateVertexArray {
            id,
            stride: declaration.stride(),
            vertices,
            indices,
        })
    }

    fn create_program(&mut self, vertex_source: &[u8], fragment_source: &[u8]) -> Result<GpuId, GpuError> {
        if self.log.0.lock().fail_programs {
            return Err(GpuError::Compile("mock compile failure".to_string()));
        }
        self.record(|id| GpuCall::CreateProgram {
            id,
            vertex_len: vertex_source.len(),
            fragment_len: fragment_source.len(),
        })
    }

    fn destroy(&mut self, id: GpuId) {
        let mut state = self.log.0.lock();
        state.live.retain(|live| *live != id);
        state.calls.push(GpuCall::Destroy { id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_destroys() {
        let mut gpu = MockGpu::new();
        let log = gpu.log();
        let id = gpu
            .create_texture(
                &TextureDescriptor {
                    width: 4,
                    height: 2,
                    format: PixelFormat::Rgba8,
                    mipmaps: true,
                },
                &[0; 32],
            )
            .unwrap();
        assert!(log.is_live(id));
        gpu.destroy(id);
        assert_eq!(log.live(), 0);
        assert_eq!(log.calls().len(), 2);
    }

    #[test]
    fn test_program_failure_injection() {
        let mut gpu = MockGpu::new();
        gpu.log().fail_programs(true);
        assert!(matches!(gpu.create_program(b"v", b"f"), Err(GpuError::Compile(_))));
        assert_eq!(gpu.log().live(), 0);
    }
}
