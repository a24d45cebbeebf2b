use strata_core::graphics::GpuContext;

use crate::asset::{AssetInfo, AssetType};
use crate::error::{AssetError, AssetResult};
use crate::handle::Handle;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::texture::Texture;

/// Meshes with their materials, the textures those materials index, and an
/// optional collision mesh.
///
/// Every texture handle is one reference held on the cache entry; the cache
/// releases them when the model is destroyed.
#[derive(Debug, Default)]
pub struct Model {
    pub(crate) info: AssetInfo,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    textures: Vec<Handle<Texture>>,
    physics: Option<Mesh>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn textures(&self) -> &[Handle<Texture>] {
        &self.textures
    }

    /// Take ownership of one reference to `texture`, returning its index for
    /// material channels. The cache releases it when the model is destroyed.
    pub fn push_texture(&mut self, texture: Handle<Texture>) -> i32 {
        self.textures.push(texture);
        self.textures.len() as i32 - 1
    }

    pub fn physics_mesh(&self) -> Option<&Mesh> {
        self.physics.as_ref()
    }

    pub fn set_physics_mesh(&mut self, mesh: Option<Mesh>) {
        self.physics = mesh;
    }

    pub fn find_mesh_mut(&mut self, name: &str) -> Option<&mut Mesh> {
        self.meshes.iter_mut().find(|m| m.name == name)
    }

    /// Geometry state follows the first mesh.
    pub fn is_geometry_loaded(&self) -> bool {
        self.meshes.first().is_some_and(Mesh::is_loaded)
    }

    pub fn is_geometry_purged(&self) -> bool {
        self.meshes.first().is_some_and(Mesh::is_purged)
    }

    pub fn load_geometry(&mut self, gpu: &mut dyn GpuContext) -> bool {
        if self.is_geometry_purged() {
            tracing::error!("Model geometry is purged");
            return false;
        }
        let mut ok = true;
        for mesh in &mut self.meshes {
            ok &= mesh.load(gpu);
        }
        ok
    }

    pub fn unload_geometry(&mut self, gpu: &mut dyn GpuContext, force: bool) -> bool {
        if !self.info.may_release(force) {
            return false;
        }
        for mesh in &mut self.meshes {
            mesh.unload(gpu);
        }
        true
    }

    pub fn purge_geometry(&mut self, force: bool) -> bool {
        if !self.info.may_release(force) {
            return false;
        }
        for mesh in &mut self.meshes {
            mesh.purge();
        }
        if let Some(physics) = &mut self.physics {
            physics.purge();
        }
        true
    }

    pub(crate) fn ensure_present(&self) -> AssetResult<()> {
        if self.is_geometry_purged() {
            Err(AssetError::Purged {
                kind: AssetType::Model,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::graphics::HeadlessGpu;

    fn quad_model() -> Model {
        let mut model = Model::new();
        model.meshes.push(Mesh::create_quad(0.0, 0.0, 1.0, 1.0).unwrap());
        model.meshes.push(Mesh::create_quad(1.0, 1.0, 2.0, 2.0).unwrap());
        model
    }

    #[test]
    fn test_geometry_residency() {
        let mut gpu = HeadlessGpu::new();
        let mut model = quad_model();
        assert!(!model.is_geometry_loaded());
        assert!(model.load_geometry(&mut gpu));
        assert!(model.is_geometry_loaded());
        assert!(model.unload_geometry(&mut gpu, false));
        assert_eq!(gpu.live_resources(), 0);
    }

    #[test]
    fn test_purged_geometry_refuses_load() {
        let mut gpu = HeadlessGpu::new();
        let mut model = quad_model();
        model.set_physics_mesh(Some(Mesh::create_quad(0.0, 0.0, 1.0, 1.0).unwrap()));
        assert!(model.purge_geometry(false));
        assert!(model.is_geometry_purged());
        assert!(model.physics_mesh().unwrap().is_purged());
        assert!(!model.load_geometry(&mut gpu));
        assert!(model.ensure_present().is_err());
    }

    #[test]
    fn test_empty_model_is_not_purged() {
        let model = Model::new();
        assert!(!model.is_geometry_purged());
        assert!(!model.is_geometry_loaded());
    }
}
