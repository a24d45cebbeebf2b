//! Raw vertex and index storage with CPU/GPU residency.

use strata_core::graphics::{BufferUsage, GpuContext, GpuId, VertexDeclaration};

use crate::error::{AssetError, AssetResult};

/// Width of one index in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U8 = 1,
    U16 = 2,
    U32 = 4,
}

impl IndexWidth {
    /// Width for a byte count of 1, 2 or 4.
    pub fn from_bytes(bytes: u8) -> Option<Self> {
        match bytes {
            1 => Some(IndexWidth::U8),
            2 => Some(IndexWidth::U16),
            4 => Some(IndexWidth::U32),
            _ => None,
        }
    }

    /// Size of one index in bytes.
    pub fn bytes(self) -> u8 {
        self as u8
    }
}

fn upload(gpu: &mut dyn GpuContext, usage: BufferUsage, data: &[u8]) -> Option<GpuId> {
    match gpu.create_buffer(usage, data) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::error!("Unable to upload {:?} buffer: {}", usage, e);
            None
        }
    }
}

#[derive(Debug)]
pub struct VertexBuffer {
    declaration: VertexDeclaration,
    vertex_count: u32,
    data: Vec<u8>,
    gpu: Option<GpuId>,
}

impl VertexBuffer {
    /// Allocate `vertex_count * stride` zeroed bytes.
    pub fn create(vertex_count: u32, declaration: VertexDeclaration) -> AssetResult<Self> {
        if vertex_count == 0 {
            return Err(AssetError::invalid("vertex buffer needs at least one vertex"));
        }
        if declaration.is_empty() {
            return Err(AssetError::invalid("vertex buffer needs at least one element"));
        }
        let len = vertex_count as usize * declaration.stride() as usize;
        Ok(Self {
            declaration,
            vertex_count,
            data: vec![0; len],
            gpu: None,
        })
    }

    /// Build from existing vertex bytes laid out per `declaration`.
    pub fn from_bytes(declaration: VertexDeclaration, data: Vec<u8>) -> AssetResult<Self> {
        let stride = declaration.stride() as usize;
        if stride == 0 || data.is_empty() || data.len() % stride != 0 {
            return Err(AssetError::invalid(format!(
                "{} vertex bytes do not divide into stride {}",
                data.len(),
                stride
            )));
        }
        let vertex_count = u32::try_from(data.len() / stride)
            .map_err(|_| AssetError::invalid("vertex count does not fit in 32 bits"))?;
        Ok(Self {
            declaration,
            vertex_count,
            data,
            gpu: None,
        })
    }

    /// Layout every vertex in this buffer follows.
    pub fn declaration(&self) -> &VertexDeclaration {
        &self.declaration
    }

    /// Number of vertices, recorded at creation.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Length the bytes have while not purged.
    pub fn data_len(&self) -> usize {
        self.vertex_count as usize * self.declaration.stride() as usize
    }

    /// Vertex bytes; empty once purged.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable vertex bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Uploaded buffer, if any.
    pub fn gpu_id(&self) -> Option<GpuId> {
        self.gpu
    }

    /// Whether the CPU bytes have been discarded.
    pub fn is_purged(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the buffer is resident on the GPU.
    pub fn is_loaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Upload the bytes. Fails once purged.
    pub fn load(&mut self, gpu: &mut dyn GpuContext) -> bool {
        if self.is_purged() {
            return false;
        }
        if self.gpu.is_none() {
            self.gpu = upload(gpu, BufferUsage::Vertex, &self.data);
        }
        self.gpu.is_some()
    }

    /// Destroy the uploaded buffer, keeping the CPU bytes.
    pub fn unload(&mut self, gpu: &mut dyn GpuContext) {
        if let Some(id) = self.gpu.take() {
            gpu.destroy(id);
        }
    }

    /// Discard the CPU bytes, keeping any uploaded buffer.
    pub fn purge(&mut self) {
        self.data = Vec::new();
    }
}

impl Clone for VertexBuffer {
    // The copy owns no GPU resource until it is loaded itself.
    fn clone(&self) -> Self {
        Self {
            declaration: self.declaration.clone(),
            vertex_count: self.vertex_count,
            data: self.data.clone(),
            gpu: None,
        }
    }
}

#[derive(Debug)]
pub struct IndexBuffer {
    index_count: u32,
    width: IndexWidth,
    data: Vec<u8>,
    gpu: Option<GpuId>,
}

impl IndexBuffer {
    /// Allocate `index_count * width` zeroed bytes; `width` must be 1, 2 or 4.
    pub fn create(index_count: u32, width: u8) -> AssetResult<Self> {
        if index_count == 0 {
            return Err(AssetError::invalid("index buffer needs at least one index"));
        }
        let width = IndexWidth::from_bytes(width)
            .ok_or_else(|| AssetError::invalid(format!("index width {} is not 1, 2 or 4", width)))?;
        Ok(Self {
            index_count,
            width,
            data: vec![0; index_count as usize * width.bytes() as usize],
            gpu: None,
        })
    }

    /// Build from raw index bytes of the given `width`.
    pub fn from_bytes(width: u8, data: Vec<u8>) -> AssetResult<Self> {
        let width = IndexWidth::from_bytes(width)
            .ok_or_else(|| AssetError::invalid(format!("index width {} is not 1, 2 or 4", width)))?;
        let bytes = width.bytes() as usize;
        if data.is_empty() || data.len() % bytes != 0 {
            return Err(AssetError::invalid(format!(
                "{} index bytes do not divide into width {}",
                data.len(),
                bytes
            )));
        }
        let index_count = u32::try_from(data.len() / bytes)
            .map_err(|_| AssetError::invalid("index count does not fit in 32 bits"))?;
        Ok(Self {
            index_count,
            width,
            data,
            gpu: None,
        })
    }

    /// One-byte indices.
    pub fn from_u8(indices: &[u8]) -> AssetResult<Self> {
        let mut buffer = Self::create(indices.len() as u32, 1)?;
        buffer.data.copy_from_slice(indices);
        Ok(buffer)
    }

    /// Two-byte indices.
    pub fn from_u16(indices: &[u16]) -> AssetResult<Self> {
        let mut buffer = Self::create(indices.len() as u32, 2)?;
        buffer.data.copy_from_slice(bytemuck::cast_slice(indices));
        Ok(buffer)
    }

    /// Four-byte indices.
    pub fn from_u32(indices: &[u32]) -> AssetResult<Self> {
        let mut buffer = Self::create(indices.len() as u32, 4)?;
        buffer.data.copy_from_slice(bytemuck::cast_slice(indices));
        Ok(buffer)
    }

    /// Number of indices, recorded at creation.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Width of each index.
    pub fn width(&self) -> IndexWidth {
        self.width
    }

    /// Length the bytes have while not purged.
    pub fn data_len(&self) -> usize {
        self.index_count as usize * self.width.bytes() as usize
    }

    /// Index bytes; empty once purged.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable index bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Uploaded buffer, if any.
    pub fn gpu_id(&self) -> Option<GpuId> {
        self.gpu
    }

    /// Whether the CPU bytes have been discarded.
    pub fn is_purged(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the buffer is resident on the GPU.
    pub fn is_loaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Upload the bytes. Fails once purged.
    pub fn load(&mut self, gpu: &mut dyn GpuContext) -> bool {
        if self.is_purged() {
            return false;
        }
        if self.gpu.is_none() {
            self.gpu = upload(gpu, BufferUsage::Index, &self.data);
        }
        self.gpu.is_some()
    }

    /// Destroy the uploaded buffer, keeping the CPU bytes.
    pub fn unload(&mut self, gpu: &mut dyn GpuContext) {
        if let Some(id) = self.gpu.take() {
            gpu.destroy(id);
        }
    }

    /// Discard the CPU bytes, keeping any uploaded buffer.
    pub fn purge(&mut self) {
        self.data = Vec::new();
    }
}

impl Clone for IndexBuffer {
    fn clone(&self) -> Self {
        Self {
            index_count: self.index_count,
            width: self.width,
            data: self.data.clone(),
            gpu: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::graphics::{HeadlessGpu, Vertex, VertexPositionTexture};

    #[test]
    fn test_vertex_buffer_size() {
        let buffer = VertexBuffer::create(4, VertexPositionTexture::declaration()).unwrap();
        assert_eq!(buffer.data().len(), 4 * 24);
        assert!(VertexBuffer::create(0, VertexPositionTexture::declaration()).is_err());
    }

    #[test]
    fn test_index_widths() {
        assert_eq!(IndexBuffer::create(6, 2).unwrap().data().len(), 12);
        assert!(IndexBuffer::create(6, 3).is_err());
        assert!(IndexBuffer::create(0, 1).is_err());
        let wide = IndexBuffer::from_u32(&[1, 2, 3]).unwrap();
        assert_eq!(wide.width(), IndexWidth::U32);
        assert_eq!(&wide.data()[4..8], &2u32.to_ne_bytes());
    }

    #[test]
    fn test_purge_blocks_load() {
        let mut gpu = HeadlessGpu::new();
        let mut buffer = IndexBuffer::from_u8(&[0, 1, 2]).unwrap();
        buffer.purge();
        assert!(buffer.is_purged());
        assert!(!buffer.load(&mut gpu));
    }

    #[test]
    fn test_unload_when_not_loaded_is_noop() {
        let mut gpu = HeadlessGpu::new();
        let mut buffer = VertexBuffer::create(1, VertexPositionTexture::declaration()).unwrap();
        buffer.unload(&mut gpu);
        assert!(buffer.load(&mut gpu));
        buffer.unload(&mut gpu);
        assert_eq!(gpu.live_resources(), 0);
    }

    #[test]
    fn test_clone_drops_gpu_id() {
        let mut gpu = HeadlessGpu::new();
        let mut buffer = VertexBuffer::create(3, VertexPositionTexture::declaration()).unwrap();
        assert!(buffer.load(&mut gpu));
        let copy = buffer.clone();
        assert!(!copy.is_loaded());
        assert_eq!(copy.data(), buffer.data());
    }
}
