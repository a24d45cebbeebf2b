use strata_core::graphics::GpuContext;
use strata_core::math::{Color, Vec3};

use crate::asset::AssetInfo;
use crate::error::AssetResult;
use crate::handle::Handle;
use crate::mesh::Mesh;
use crate::texture::Texture;

/// Fixed parameter block of a particle system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    pub position: Vec3,
    pub diffuse: Color,
    pub alpha: f32,
    pub speed: f32,
    pub spread: f32,
    pub shape: f32,
    pub size: f32,
    pub gravity: f32,
    pub system_height: f32,
    pub system_shape: f32,
    pub fade_in: f32,
    pub fade_out: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            diffuse: Color::WHITE,
            alpha: 1.0,
            speed: 1.0,
            spread: 1.0,
            shape: 1.0,
            size: 1.0,
            gravity: 0.0,
            system_height: 1.0,
            system_shape: 1.0,
            fade_in: 0.0,
            fade_out: 1.0,
        }
    }
}

/// Billboard particles sharing one texture.
#[derive(Debug, Default)]
pub struct ParticleSystem {
    pub(crate) info: AssetInfo,
    pub params: ParticleParams,
    texture: Option<Handle<Texture>>,
    particles: Vec<Mesh>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerate `quantity` unit quads stacked along z at `i / quantity`.
    ///
    /// A quantity of zero clears the particles.
    pub fn create(&mut self, quantity: u16) -> AssetResult<()> {
        let mut particles = Vec::with_capacity(quantity as usize);
        for i in 0..quantity {
            let mut quad = Mesh::create_quad(-1.0, -1.0, 1.0, 1.0)?;
            let z = i as f32 / quantity as f32;
            set_quad_depth(&mut quad, z);
            particles.push(quad);
        }
        self.particles = particles;
        Ok(())
    }

    pub fn quantity(&self) -> u16 {
        self.particles.len() as u16
    }

    pub fn particles(&self) -> &[Mesh] {
        &self.particles
    }

    pub fn texture(&self) -> Option<Handle<Texture>> {
        self.texture
    }

    /// Swap the held texture reference, taking ownership of the new one and
    /// returning the previous one for the caller to release.
    pub fn replace_texture(
        &mut self,
        texture: Option<Handle<Texture>>,
    ) -> Option<Handle<Texture>> {
        std::mem::replace(&mut self.texture, texture)
    }

    pub fn is_purged(&self) -> bool {
        self.particles.first().is_some_and(Mesh::is_purged)
    }

    pub fn is_loaded(&self) -> bool {
        self.particles.first().is_some_and(Mesh::is_loaded)
    }

    pub fn load(&mut self, gpu: &mut dyn GpuContext) -> bool {
        if self.is_loaded() {
            return true;
        }
        if self.particles.is_empty() {
            return false;
        }
        let mut ok = true;
        for particle in &mut self.particles {
            ok &= particle.load(gpu);
        }
        if !ok {
            self.unload(gpu, true);
        }
        ok
    }

    pub fn unload(&mut self, gpu: &mut dyn GpuContext, force: bool) -> bool {
        if !self.info.may_release(force) {
            return false;
        }
        for particle in &mut self.particles {
            particle.unload(gpu);
        }
        true
    }

    pub fn purge(&mut self, force: bool) -> bool {
        if !self.info.may_release(force) {
            return false;
        }
        for particle in &mut self.particles {
            particle.purge();
        }
        true
    }
}

// Position is the first element: four f32 per vertex, z at byte 8.
fn set_quad_depth(quad: &mut Mesh, z: f32) {
    let stride = quad.vertices().declaration().stride() as usize;
    for vertex in quad.vertices_mut().data_mut().chunks_exact_mut(stride) {
        vertex[8..12].copy_from_slice(&z.to_ne_bytes());
    }
}
