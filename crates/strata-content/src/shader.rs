use strata_core::graphics::{GpuContext, GpuId};

use crate::asset::{AssetInfo, AssetType};
use crate::error::{AssetError, AssetResult};

/// Vertex and fragment source text plus the compiled program.
#[derive(Debug, Default)]
pub struct Shader {
    pub(crate) info: AssetInfo,
    vertex: Vec<u8>,
    fragment: Vec<u8>,
    program: Option<GpuId>,
}

impl Shader {
    /// Empty shader, which counts as purged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shader from the source text of both stages.
    pub fn create(vertex: impl Into<Vec<u8>>, fragment: impl Into<Vec<u8>>) -> Self {
        Self {
            info: AssetInfo::default(),
            vertex: vertex.into(),
            fragment: fragment.into(),
            program: None,
        }
    }

    /// Vertex stage source text.
    pub fn vertex_source(&self) -> &[u8] {
        &self.vertex
    }

    /// Fragment stage source text.
    pub fn fragment_source(&self) -> &[u8] {
        &self.fragment
    }

    /// Replace the vertex stage source.
    pub fn set_vertex_source(&mut self, source: impl Into<Vec<u8>>) {
        self.vertex = source.into();
    }

    /// Replace the fragment stage source.
    pub fn set_fragment_source(&mut self, source: impl Into<Vec<u8>>) {
        self.fragment = source.into();
    }

    /// Compiled program, if loaded.
    pub fn program(&self) -> Option<GpuId> {
        self.program
    }

    /// Purged when neither stage has any source.
    pub fn is_purged(&self) -> bool {
        self.vertex.is_empty() && self.fragment.is_empty()
    }

    /// Whether a program has been compiled.
    pub fn is_loaded(&self) -> bool {
        self.program.is_some()
    }

    /// Compile both stages into a program. Fails once purged.
    pub fn load(&mut self, gpu: &mut dyn GpuContext) -> bool {
        if self.is_purged() {
            tracing::error!("Shader is purged");
            return false;
        }
        if self.is_loaded() {
            return true;
        }
        match gpu.create_program(&self.vertex, &self.fragment) {
            Ok(id) => {
                self.program = Some(id);
                true
            }
            Err(e) => {
                tracing::error!("Unable to build shader program: {}", e);
                false
            }
        }
    }

    /// Destroy the program if this is the last owner or `force` is set.
    pub fn unload(&mut self, gpu: &mut dyn GpuContext, force: bool) -> bool {
        if !self.info.may_release(force) {
            return false;
        }
        if let Some(id) = self.program.take() {
            gpu.destroy(id);
        }
        true
    }

    /// Discard both sources if this is the last owner or `force` is set.
    pub fn purge(&mut self, force: bool) -> bool {
        if !self.info.may_release(force) {
            return false;
        }
        self.vertex = Vec::new();
        self.fragment = Vec::new();
        true
    }

    pub(crate) fn ensure_present(&self) -> AssetResult<()> {
        if self.is_purged() {
            Err(AssetError::Purged {
                kind: AssetType::Shader,
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

    #[test]
    fn test_load_compiles_program() {
        let mut gpu = HeadlessGpu::new();
        let mut shader = Shader::create("void main() {}", "void main() {}");
        assert!(shader.load(&mut gpu));
        assert!(shader.program().is_some());
        assert!(shader.unload(&mut gpu, false));
        assert!(!shader.is_loaded());
    }

    #[test]
    fn test_empty_shader_is_purged() {
        let mut gpu = HeadlessGpu::new();
        let mut shader = Shader::new();
        assert!(shader.is_purged());
        assert!(!shader.load(&mut gpu));
    }

    #[test]
    fn test_one_stage_is_enough() {
        let shader = Shader::create("void main() {}", "");
        assert!(!shader.is_purged());
    }
}
