//! Asset kinds and the bookkeeping every kind carries.

use std::fmt;

use strata_core::graphics::GpuContext;

use crate::handle::UntypedHandle;
use crate::model::Model;
use crate::particle::ParticleSystem;
use crate::shader::Shader;
use crate::texture::Texture;

/// Closed set of asset kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Texture,
    Model,
    Shader,
    ParticleSystem,
}

impl AssetType {
    pub const ALL: [AssetType; 4] = [
        AssetType::Texture,
        AssetType::Model,
        AssetType::Shader,
        AssetType::ParticleSystem,
    ];

    /// Code stored in the container header.
    pub const fn type_code(self) -> u16 {
        match self {
            AssetType::Texture => 10,
            AssetType::Model => 20,
            AssetType::Shader => 30,
            AssetType::ParticleSystem => 40,
        }
    }

    pub fn from_type_code(code: u16) -> Option<Self> {
        AssetType::ALL.into_iter().find(|t| t.type_code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            AssetType::Texture => "Texture",
            AssetType::Model => "Model",
            AssetType::Shader => "Shader",
            AssetType::ParticleSystem => "ParticleSystem",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity and sharing state of an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub(crate) references: u32,
    pub(crate) source: String,
    pub(crate) managed: bool,
}

impl AssetInfo {
    pub fn references(&self) -> u32 {
        self.references
    }

    /// Normalized path the asset was loaded from; empty when not cached.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    /// Whether residency changes may go ahead: forced, or no other holder.
    pub(crate) fn may_release(&self, force: bool) -> bool {
        force || self.references <= 1
    }
}

impl Default for AssetInfo {
    fn default() -> Self {
        Self {
            references: 1,
            source: String::new(),
            managed: false,
        }
    }
}

/// Any asset the cache can hold.
#[derive(Debug)]
pub enum Asset {
    Texture(Texture),
    Model(Model),
    Shader(Shader),
    ParticleSystem(ParticleSystem),
}

impl Asset {
    pub fn asset_type(&self) -> AssetType {
        match self {
            Asset::Texture(_) => AssetType::Texture,
            Asset::Model(_) => AssetType::Model,
            Asset::Shader(_) => AssetType::Shader,
            Asset::ParticleSystem(_) => AssetType::ParticleSystem,
        }
    }

    pub fn info(&self) -> &AssetInfo {
        match self {
            Asset::Texture(a) => &a.info,
            Asset::Model(a) => &a.info,
            Asset::Shader(a) => &a.info,
            Asset::ParticleSystem(a) => &a.info,
        }
    }

    pub(crate) fn info_mut(&mut self) -> &mut AssetInfo {
        match self {
            Asset::Texture(a) => &mut a.info,
            Asset::Model(a) => &mut a.info,
            Asset::Shader(a) => &mut a.info,
            Asset::ParticleSystem(a) => &mut a.info,
        }
    }

    /// Cache entries this asset holds a reference to.
    pub fn dependencies(&self) -> Vec<UntypedHandle> {
        match self {
            Asset::Texture(_) | Asset::Shader(_) => Vec::new(),
            Asset::Model(model) => model.textures().iter().map(|t| t.untyped()).collect(),
            Asset::ParticleSystem(system) => {
                system.texture().map(|t| t.untyped()).into_iter().collect()
            }
        }
    }

    pub fn is_purged(&self) -> bool {
        match self {
            Asset::Texture(a) => a.is_purged(),
            Asset::Model(a) => a.is_geometry_purged(),
            Asset::Shader(a) => a.is_purged(),
            Asset::ParticleSystem(a) => a.is_purged(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        match self {
            Asset::Texture(a) => a.is_loaded(),
            Asset::Model(a) => a.is_geometry_loaded(),
            Asset::Shader(a) => a.is_loaded(),
            Asset::ParticleSystem(a) => a.is_loaded(),
        }
    }

    /// Upload to the GPU. Models upload geometry only.
    pub fn load(&mut self, gpu: &mut dyn GpuContext) -> bool {
        match self {
            Asset::Texture(a) => a.load(gpu),
            Asset::Model(a) => a.load_geometry(gpu),
            Asset::Shader(a) => a.load(gpu),
            Asset::ParticleSystem(a) => a.load(gpu),
        }
    }

    pub fn unload(&mut self, gpu: &mut dyn GpuContext, force: bool) -> bool {
        match self {
            Asset::Texture(a) => a.unload(gpu, force),
            Asset::Model(a) => a.unload_geometry(gpu, force),
            Asset::Shader(a) => a.unload(gpu, force),
            Asset::ParticleSystem(a) => a.unload(gpu, force),
        }
    }

    pub fn purge(&mut self, force: bool) -> bool {
        match self {
            Asset::Texture(a) => a.purge(force),
            Asset::Model(a) => a.purge_geometry(force),
            Asset::Shader(a) => a.purge(force),
            Asset::ParticleSystem(a) => a.purge(force),
        }
    }

    /// Replace the contents with `fresh`, keeping this asset's identity.
    ///
    /// Returns `fresh` unchanged when the kinds differ.
    pub(crate) fn refresh_from(&mut self, mut fresh: Asset) -> Result<(), Asset> {
        if fresh.asset_type() != self.asset_type() {
            return Err(fresh);
        }
        std::mem::swap(fresh.info_mut(), self.info_mut());
        *self = fresh;
        Ok(())
    }
}

/// A concrete asset kind stored inside [`Asset`].
pub trait AssetKind: Sized + 'static {
    const TYPE: AssetType;

    fn from_asset(asset: &Asset) -> Option<&Self>;

    fn from_asset_mut(asset: &mut Asset) -> Option<&mut Self>;

    fn into_asset(self) -> Asset;

    fn info(&self) -> &AssetInfo;
}

macro_rules! impl_asset_kind {
    ($ty:ident) => {
        impl AssetKind for $ty {
            const TYPE: AssetType = AssetType::$ty;

            fn from_asset(asset: &Asset) -> Option<&Self> {
                match asset {
                    Asset::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_asset_mut(asset: &mut Asset) -> Option<&mut Self> {
                match asset {
                    Asset::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_asset(self) -> Asset {
                Asset::$ty(self)
            }

            fn info(&self) -> &AssetInfo {
                &self.info
            }
        }

        impl From<$ty> for Asset {
            fn from(value: $ty) -> Self {
                Asset::$ty(value)
            }
        }
    };
}

impl_asset_kind!(Texture);
impl_asset_kind!(Model);
impl_asset_kind!(Shader);
impl_asset_kind!(ParticleSystem);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_are_stable() {
        assert_eq!(AssetType::Texture.type_code(), 10);
        assert_eq!(AssetType::Model.type_code(), 20);
        assert_eq!(AssetType::Shader.type_code(), 30);
        assert_eq!(AssetType::ParticleSystem.type_code(), 40);
        for ty in AssetType::ALL {
            assert_eq!(AssetType::from_type_code(ty.type_code()), Some(ty));
        }
        assert_eq!(AssetType::from_type_code(50), None);
    }

    #[test]
    fn test_every_instance_shares_its_kind_tag() {
        let a: Asset = Texture::create(2, 2, 24).unwrap().into();
        let b: Asset = Texture::create(4, 8, 32).unwrap().into();
        assert_eq!(a.asset_type(), b.asset_type());
        assert_eq!(a.asset_type(), Texture::TYPE);
    }

    #[test]
    fn test_fresh_asset_info() {
        let asset: Asset = Shader::new().into();
        assert_eq!(asset.info().references(), 1);
        assert!(!asset.info().is_managed());
        assert!(asset.info().source().is_empty());
    }

    #[test]
    fn test_refresh_keeps_identity_info() {
        let mut asset: Asset = Texture::create(2, 2, 24).unwrap().into();
        asset.info_mut().references = 3;
        asset.info_mut().source = "Sky.ast".to_string();
        let fresh: Asset = Texture::create(8, 4, 32).unwrap().into();
        asset.refresh_from(fresh).unwrap();
        assert_eq!(asset.info().references(), 3);
        assert_eq!(asset.info().source(), "Sky.ast");
        let Asset::Texture(texture) = &asset else { panic!("kind changed") };
        assert_eq!(texture.width(), 8);
    }

    #[test]
    fn test_refresh_rejects_other_kind() {
        let mut asset: Asset = Texture::create(2, 2, 24).unwrap().into();
        assert!(asset.refresh_from(Shader::new().into()).is_err());
        assert_eq!(asset.asset_type(), AssetType::Texture);
    }
}
