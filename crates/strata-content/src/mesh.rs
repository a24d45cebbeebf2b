use strata_core::graphics::{GpuContext, GpuId, Vertex, VertexPositionTexture};

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::error::AssetResult;

/// Vertex and index buffers drawn with one material.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    /// Index into the owning model's materials, or -1.
    pub material: i32,
    vertices: VertexBuffer,
    indices: IndexBuffer,
    vertex_array: Option<GpuId>,
}

impl Mesh {
    pub fn new(vertices: VertexBuffer, indices: IndexBuffer) -> Self {
        Self {
            name: String::new(),
            material: -1,
            vertices,
            indices,
            vertex_array: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Unit-textured quad spanning `(x1, y1)`..`(x2, y2)` at z = 0.
    pub fn create_quad(x1: f32, y1: f32, x2: f32, y2: f32) -> AssetResult<Self> {
        let vertices = [
            VertexPositionTexture {
                position: [x1, y2, 0.0, 1.0],
                texture: [0.0, 1.0],
            },
            VertexPositionTexture {
                position: [x2, y2, 0.0, 1.0],
                texture: [1.0, 1.0],
            },
            VertexPositionTexture {
                position: [x1, y1, 0.0, 1.0],
                texture: [0.0, 0.0],
            },
            VertexPositionTexture {
                position: [x2, y1, 0.0, 1.0],
                texture: [1.0, 0.0],
            },
        ];
        let vertices = VertexBuffer::from_bytes(
            VertexPositionTexture::declaration(),
            bytemuck::cast_slice(&vertices[..]).to_vec(),
        )?;
        let indices = IndexBuffer::from_u8(&[0, 2, 1, 2, 3, 1])?;
        Ok(Self::new(vertices, indices))
    }

    pub fn vertices(&self) -> &VertexBuffer {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut VertexBuffer {
        &mut self.vertices
    }

    pub fn indices(&self) -> &IndexBuffer {
        &self.indices
    }

    pub fn vertex_array(&self) -> Option<GpuId> {
        self.vertex_array
    }

    pub fn is_purged(&self) -> bool {
        self.vertices.is_purged() || self.indices.is_purged()
    }

    pub fn is_loaded(&self) -> bool {
        self.vertex_array.is_some()
    }

    pub fn load(&mut self, gpu: &mut dyn GpuContext) -> bool {
        if self.is_loaded() {
            return true;
        }
        if !self.vertices.load(gpu) || !self.indices.load(gpu) {
            self.unload(gpu);
            return false;
        }
        let (Some(vb), Some(ib)) = (self.vertices.gpu_id(), self.indices.gpu_id()) else {
            return false;
        };
        match gpu.create_vertex_array(self.vertices.declaration(), vb, ib) {
            Ok(id) => {
                self.vertex_array = Some(id);
                true
            }
            Err(e) => {
                tracing::error!("Unable to create vertex array for mesh '{}': {}", self.name, e);
                self.unload(gpu);
                false
            }
        }
    }

    pub fn unload(&mut self, gpu: &mut dyn GpuContext) {
        if let Some(id) = self.vertex_array.take() {
            gpu.destroy(id);
        }
        self.vertices.unload(gpu);
        self.indices.unload(gpu);
    }

    pub fn purge(&mut self) {
        self.vertices.purge();
        self.indices.purge();
    }
}

impl Clone for Mesh {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            material: self.material,
            vertices: self.vertices.clone(),
            indices: self.indices.clone(),
            vertex_array: None,
        }
    }
}
