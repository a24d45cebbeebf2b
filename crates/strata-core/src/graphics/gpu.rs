//! GPU backend abstraction.
//!
//! Content types upload through a [`GpuContext`] and only ever hold the
//! opaque [`GpuId`]s it hands back.

use std::fmt;
use std::num::NonZeroU64;

use super::vertex::VertexDeclaration;

/// Opaque handle to a resource owned by a [`GpuContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuId(NonZeroU64);

impl GpuId {
    pub fn new(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn from_depth(depth: u8) -> Option<Self> {
        match depth {
            24 => Some(PixelFormat::Rgb8),
            32 => Some(PixelFormat::Rgba8),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub mipmaps: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    /// The backend could not allocate the resource.
    OutOfMemory,
    /// Program compilation or linking failed, with the backend's log.
    Compile(String),
    /// The resource id is unknown to this backend.
    UnknownResource(GpuId),
    Backend(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::OutOfMemory => write!(f, "GPU out of memory"),
            GpuError::Compile(log) => write!(f, "shader compilation failed: {}", log),
            GpuError::UnknownResource(id) => write!(f, "unknown GPU resource {}", id.get()),
            GpuError::Backend(msg) => write!(f, "GPU backend error: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {}

/// Create/upload/destroy surface invoked by asset residency operations.
///
/// Calls are expected on the thread that owns the graphics context.
pub trait GpuContext {
    fn create_texture(&mut self, desc: &TextureDescriptor, pixels: &[u8]) -> Result<GpuId, GpuError>;

    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> Result<GpuId, GpuError>;

    /// Bind a vertex and index buffer together with the attribute layout.
    fn create_vertex_array(
        &mut self,
        declaration: &VertexDeclaration,
        vertices: GpuId,
        indices: GpuId,
    ) -> Result<GpuId, GpuError>;

    fn create_program(&mut self, vertex_source: &[u8], fragment_source: &[u8]) -> Result<GpuId, GpuError>;

    fn destroy(&mut self, id: GpuId);
}

/// Backend that allocates ids without any device behind it.
///
/// Used by offline processing where nothing is ever drawn.
#[derive(Debug, Default)]
pub struct HeadlessGpu {
    next: u64,
    live: usize,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources created and not yet destroyed.
    pub fn live_resources(&self) -> usize {
        self.live
    }

    fn allocate(&mut self) -> Result<GpuId, GpuError> {
        self.next += 1;
        let raw = NonZeroU64::new(self.next).ok_or(GpuError::OutOfMemory)?;
        self.live += 1;
        Ok(GpuId::new(raw))
    }
}

impl GpuContext for HeadlessGpu {
    fn create_texture(&mut self, _desc: &TextureDescriptor, _pixels: &[u8]) -> Result<GpuId, GpuError> {
        self.allocate()
    }

    fn create_buffer(&mut self, _usage: BufferUsage, _data: &[u8]) -> Result<GpuId, GpuError> {
        self.allocate()
    }

    fn create_vertex_array(
        &mut self,
        _declaration: &VertexDeclaration,
        _vertices: GpuId,
        _indices: GpuId,
    ) -> Result<GpuId, GpuError> {
        self.allocate()
    }

    fn create_program(&mut self, _vertex: &[u8], _fragment: &[u8]) -> Result<GpuId, GpuError> {
        self.allocate()
    }

    fn destroy(&mut self, _id: GpuId) {
        self.live = self.live.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_ids_are_unique() {
        let mut gpu = HeadlessGpu::new();
        let a = gpu.create_buffer(BufferUsage::Vertex, &[0; 4]).unwrap();
        let b = gpu.create_buffer(BufferUsage::Index, &[0; 2]).unwrap();
        assert_ne!(a, b);
        assert_eq!(gpu.live_resources(), 2);
        gpu.destroy(a);
        assert_eq!(gpu.live_resources(), 1);
    }

    #[test]
    fn test_pixel_format_from_depth() {
        assert_eq!(PixelFormat::from_depth(24), Some(PixelFormat::Rgb8));
        assert_eq!(PixelFormat::from_depth(32), Some(PixelFormat::Rgba8));
        assert_eq!(PixelFormat::from_depth(16), None);
    }
}
