//! Format processors and the extension registry that selects them.

use std::sync::Arc;

use strata_core::alloc::HashMap;

use crate::asset::{Asset, AssetKind};
use crate::config::ContentConfig;
use crate::content::Content;
use crate::error::{AssetError, AssetResult};
use crate::handle::{Handle, UntypedHandle};
use crate::model::Model;
use crate::source::{self, SourceFile};
use crate::texture::Texture;

/// A format-specific import/export handler.
pub trait Processor {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Lower-case extensions this processor handles, without the dot.
    fn extensions(&self) -> &[&'static str];

    /// Decode `file` into a fresh asset. Nested files go through `ctx`.
    fn import(&self, ctx: &mut ImportContext<'_>, file: &SourceFile) -> AssetResult<Asset>;

    /// Encode `asset` into this processor's format.
    fn export(&self, ctx: &ExportContext<'_>, asset: &Asset) -> AssetResult<Vec<u8>> {
        let _ = (ctx, asset);
        Err(AssetError::Unsupported {
            reason: format!("{} processor cannot export", self.name()),
        })
    }
}

/// Maps lower-case extensions to processors.
#[derive(Default, Clone)]
pub struct ProcessorRegistry {
    by_extension: HashMap<String, Arc<dyn Processor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `processor` for every extension it declares, replacing any
    /// processor previously registered for them.
    pub fn register(&mut self, processor: Arc<dyn Processor>) {
        for ext in processor.extensions() {
            self.register_for(ext, processor.clone());
        }
    }

    /// Register `processor` for one extension, whether or not it declares it.
    pub fn register_for(&mut self, extension: &str, processor: Arc<dyn Processor>) {
        let name = processor.name();
        if let Some(previous) = self
            .by_extension
            .insert(extension.to_ascii_lowercase(), processor)
        {
            tracing::debug!(
                "Processor '{}' replaces '{}' for .{}",
                name,
                previous.name(),
                extension
            );
        }
    }

    pub fn find(&self, extension: &str) -> Option<Arc<dyn Processor>> {
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .cloned()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.by_extension.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.by_extension.iter().map(|(ext, p)| (ext, p.name())))
            .finish()
    }
}

/// Cache access for a processor while it imports one file.
pub struct ImportContext<'a> {
    content: &'a mut Content,
    source: String,
}

impl<'a> ImportContext<'a> {
    pub(crate) fn new(content: &'a mut Content, source: impl Into<String>) -> Self {
        Self {
            content,
            source: source.into(),
        }
    }

    /// Normalized path of the file being imported.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path of `name` relative to the directory of the file being imported.
    pub fn sibling(&self, name: &str) -> String {
        source::sibling(&self.source, name)
    }

    pub fn config(&self) -> &ContentConfig {
        self.content.config()
    }

    /// Load a nested file through the cache; the caller owns one reference.
    pub fn load(&mut self, path: &str) -> AssetResult<UntypedHandle> {
        self.content.load(path).map_err(|e| dependency(path, e))
    }

    pub fn load_as<T: AssetKind>(&mut self, path: &str) -> AssetResult<Handle<T>> {
        self.content.load_as::<T>(path).map_err(|e| dependency(path, e))
    }

    pub fn load_texture(&mut self, path: &str) -> AssetResult<Handle<Texture>> {
        self.load_as::<Texture>(path)
    }

    pub fn load_model(&mut self, path: &str) -> AssetResult<Handle<Model>> {
        self.load_as::<Model>(path)
    }

    pub fn retain(&mut self, handle: impl Into<UntypedHandle>) -> bool {
        self.content.retain(handle)
    }

    pub fn release(&mut self, handle: impl Into<UntypedHandle>) {
        self.content.release(handle, false);
    }

    /// Drop a private asset built during this import, releasing what it holds.
    pub fn discard(&mut self, asset: impl Into<Asset>) {
        self.content.discard(asset.into());
    }

    pub fn get<T: AssetKind>(&self, handle: Handle<T>) -> Option<&T> {
        self.content.get(handle)
    }

    /// Read raw bytes of a file that is not itself an asset.
    pub fn read(&self, path: &str) -> AssetResult<Vec<u8>> {
        self.content.open(&source::normalize_path(path), true).map(|file| file.bytes)
    }
}

fn dependency(path: &str, err: AssetError) -> AssetError {
    match err {
        err @ (AssetError::Dependency { .. } | AssetError::Cycle { .. }) => err,
        err => AssetError::Dependency {
            path: path.to_string(),
            source: Box::new(err),
        },
    }
}

/// Read-only cache access while exporting.
pub struct ExportContext<'a> {
    content: &'a Content,
}

impl<'a> ExportContext<'a> {
    pub(crate) fn new(content: &'a Content) -> Self {
        Self { content }
    }

    pub fn config(&self) -> &ContentConfig {
        self.content.config()
    }

    /// Source path of a cached texture, if the cache created it.
    pub fn managed_source(&self, handle: Handle<Texture>) -> Option<&str> {
        let texture = self.content.get(handle)?;
        texture.info.is_managed().then(|| texture.info.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(&'static str);

    impl Processor for Dummy {
        fn name(&self) -> &'static str {
            self.0
        }

        fn extensions(&self) -> &[&'static str] {
            &["png", "JPG"]
        }

        fn import(&self, _ctx: &mut ImportContext<'_>, _file: &SourceFile) -> AssetResult<Asset> {
            Err(AssetError::Unsupported {
                reason: "dummy".to_string(),
            })
        }
    }

    #[test]
    fn test_registry_is_case_insensitive() {
        let mut registry = ProcessorRegistry::new();
        registry.register(Arc::new(Dummy("images")));
        assert_eq!(registry.find("PNG").unwrap().name(), "images");
        assert_eq!(registry.find("jpg").unwrap().name(), "images");
        assert!(registry.find("tga").is_none());
    }

    #[test]
    fn test_registry_replaces() {
        let mut registry = ProcessorRegistry::new();
        registry.register(Arc::new(Dummy("first")));
        registry.register(Arc::new(Dummy("second")));
        assert_eq!(registry.find("png").unwrap().name(), "second");
        assert_eq!(registry.extensions().count(), 2);
    }

    #[test]
    fn test_register_for_extra_extension() {
        let mut registry = ProcessorRegistry::new();
        registry.register(Arc::new(Dummy("images")));
        registry.register_for("Bundle", Arc::new(Dummy("bundles")));
        assert_eq!(registry.find("bundle").unwrap().name(), "bundles");
        assert_eq!(registry.find("png").unwrap().name(), "images");
    }
}
