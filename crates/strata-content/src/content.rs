//! The content cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use strata_core::alloc::HashMap;
use strata_core::alloc::sparse_set::{IndexSlot, SparseSet};
use strata_core::graphics::{GpuContext, HeadlessGpu};
use strata_core::profiling::profile_function;

use crate::asset::{Asset, AssetKind};
use crate::config::ContentConfig;
use crate::error::{AssetError, AssetResult};
use crate::handle::{Handle, UntypedHandle};
use crate::io::{DiskFileSystem, FileSystem};
use crate::model::Model;
use crate::processor::{ExportContext, ImportContext, Processor, ProcessorRegistry};
use crate::processors::{ContainerProcessor, MarkupProcessor, ObjProcessor, TgaProcessor};
use crate::source::{self, SourceFile};

/// Path-keyed, reference-counted store of live assets.
///
/// Each normalized path maps to at most one entry. Loading a cached path
/// retains the existing entry; releasing the last reference destroys it.
pub struct Content {
    config: ContentConfig,
    fs: Box<dyn FileSystem>,
    gpu: Box<dyn GpuContext>,
    processors: ProcessorRegistry,
    entries: SparseSet<Asset>,
    paths: HashMap<String, IndexSlot>,
    in_flight: Vec<String>,
}

impl Content {
    /// Create a cache with the built-in processors registered.
    pub fn new(
        config: ContentConfig,
        fs: impl FileSystem + 'static,
        gpu: impl GpuContext + 'static,
    ) -> Self {
        let mut processors = ProcessorRegistry::new();
        let container: Arc<dyn Processor> = Arc::new(ContainerProcessor::new(
            config.compression_quality,
            config.compression_window,
        ));
        processors.register(container.clone());
        processors.register_for(&config.container_extension, container);
        processors.register(Arc::new(MarkupProcessor));
        processors.register(Arc::new(TgaProcessor));
        processors.register(Arc::new(ObjProcessor));

        Self {
            config,
            fs: Box::new(fs),
            gpu: Box::new(gpu),
            processors,
            entries: SparseSet::new(),
            paths: HashMap::new(),
            in_flight: Vec::new(),
        }
    }

    /// Disk-backed cache relative to the working directory.
    pub fn with_defaults(gpu: impl GpuContext + 'static) -> Self {
        Self::new(ContentConfig::default(), DiskFileSystem::default(), gpu)
    }

    /// Disk-backed cache without a graphics device, for offline processing.
    pub fn headless(config: ContentConfig) -> Self {
        Self::new(config, DiskFileSystem::default(), HeadlessGpu::new())
    }

    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    pub fn gpu_mut(&mut self) -> &mut dyn GpuContext {
        self.gpu.as_mut()
    }

    // ==========================================================================
    // Processors
    // ==========================================================================

    pub fn register_processor(&mut self, processor: Arc<dyn Processor>) {
        self.processors.register(processor);
    }

    pub fn find_processor(&self, extension: &str) -> Option<Arc<dyn Processor>> {
        self.processors.find(extension)
    }

    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }

    // ==========================================================================
    // Loading
    // ==========================================================================

    /// Load `path`, or retain the cached entry for it.
    pub fn load(&mut self, path: &str) -> AssetResult<UntypedHandle> {
        profile_function!();
        let key = source::normalize_path(path);

        if let Some(&slot) = self.paths.get(&key) {
            if let Some(asset) = self.entries.get_mut(slot) {
                asset.info_mut().references += 1;
                return Ok(UntypedHandle::new(slot, asset.asset_type()));
            }
        }

        match self.import_file(&key, true) {
            Ok((mut asset, _)) => {
                let kind = asset.asset_type();
                let info = asset.info_mut();
                info.references = 1;
                info.source = key.clone();
                info.managed = true;
                let slot = self.entries.push(asset);
                self.paths.insert(key, slot);
                Ok(UntypedHandle::new(slot, kind))
            }
            Err(e) => {
                tracing::error!("Unable to load '{}': {}", key, e);
                Err(e)
            }
        }
    }

    /// Load `path` and check that it holds a `T`.
    pub fn load_as<T: AssetKind>(&mut self, path: &str) -> AssetResult<Handle<T>> {
        let handle = self.load(path)?;
        match handle.typed::<T>() {
            Some(typed) => Ok(typed),
            None => {
                self.release(handle, false);
                Err(AssetError::TypeMismatch {
                    expected: T::TYPE,
                    actual: handle.kind(),
                })
            }
        }
    }

    /// Re-import a cached asset from its source and refresh it in place.
    ///
    /// The handle, reference count and source stay the same. On failure the
    /// previous contents are kept.
    pub fn reload(&mut self, handle: impl Into<UntypedHandle>) -> AssetResult<UntypedHandle> {
        profile_function!();
        let handle = handle.into();
        let asset = self.entries.get(handle.slot()).ok_or(AssetError::InvalidHandle)?;
        if !asset.info().is_managed() {
            return Err(AssetError::NotManaged);
        }
        let key = asset.info().source().to_string();

        let fresh = match self.import_file(&key, self.config.reload_uses_data_root) {
            Ok((fresh, _)) => fresh,
            Err(e) => {
                tracing::error!("Unable to reload '{}': {}", key, e);
                return Err(e);
            }
        };
        if fresh.asset_type() != handle.kind() {
            let actual = fresh.asset_type();
            self.discard(fresh);
            return Err(AssetError::TypeMismatch {
                expected: handle.kind(),
                actual,
            });
        }
        self.refresh(handle, fresh)?;
        tracing::info!("Reloaded file: {}", key);
        Ok(handle)
    }

    fn refresh(&mut self, handle: UntypedHandle, fresh: Asset) -> AssetResult<()> {
        if !self.entries.contains(handle.slot()) {
            self.discard(fresh);
            return Err(AssetError::InvalidHandle);
        }
        let gpu = self.gpu.as_mut();
        let Some(entry) = self.entries.get_mut(handle.slot()) else {
            return Err(AssetError::InvalidHandle);
        };

        let was_loaded = entry.is_loaded();
        entry.unload(gpu, true);
        let previous = entry.dependencies();
        if let Err(fresh) = entry.refresh_from(fresh) {
            self.discard(fresh);
            return Err(AssetError::InvalidHandle);
        }
        if was_loaded && !entry.load(gpu) {
            tracing::warn!("Reloaded asset could not be uploaded again");
        }

        for dependency in previous {
            self.release(dependency, false);
        }
        Ok(())
    }

    /// Import `path` and write it as a container next to the source.
    ///
    /// Returns the written path. A file that already is a container is left
    /// alone and its own path returned.
    pub fn process(&mut self, path: &str) -> AssetResult<PathBuf> {
        profile_function!();
        let key = source::normalize_path(path);
        let container_ext = self.config.container_extension.to_ascii_lowercase();

        if source::extension(&key).as_deref() == Some(container_ext.as_str()) {
            tracing::warn!("'{}' is already processed", key);
            return Ok(PathBuf::from(key));
        }

        tracing::info!("Processing file: {}", key);
        let (asset, resolved) = self.import_file(&key, true).inspect_err(|e| {
            tracing::error!("Unable to import '{}': {}", key, e);
        })?;

        let output = resolved.with_extension(&container_ext);
        let result = self.export_asset(&asset, &output);
        self.discard(asset);

        match result {
            Ok(()) => {
                tracing::info!("Wrote {}", output.display());
                Ok(output)
            }
            Err(e) => {
                tracing::error!("Unable to export '{}': {}", key, e);
                Err(e)
            }
        }
    }

    /// Write a cached asset to `path` as a container.
    pub fn export(&self, handle: impl Into<UntypedHandle>, path: impl AsRef<Path>) -> AssetResult<()> {
        let asset = self.asset(handle).ok_or(AssetError::InvalidHandle)?;
        self.export_asset(asset, path.as_ref())
    }

    /// Encode any asset, cached or private, as container bytes.
    pub fn encode(&self, asset: &Asset) -> AssetResult<Vec<u8>> {
        let ext = &self.config.container_extension;
        let processor = self
            .find_processor(ext)
            .ok_or_else(|| AssetError::NoProcessor {
                extension: ext.clone(),
            })?;
        processor.export(&ExportContext::new(self), asset)
    }

    fn export_asset(&self, asset: &Asset, path: &Path) -> AssetResult<()> {
        let bytes = self.encode(asset)?;
        self.fs.write(path, &bytes)
    }

    pub(crate) fn open(&self, key: &str, use_data_root: bool) -> AssetResult<SourceFile> {
        let verbatim = PathBuf::from(key);
        let resolved = if self.fs.exists(&verbatim) {
            verbatim
        } else {
            let rooted = self.config.data_root.join(key);
            if use_data_root && self.fs.exists(&rooted) {
                rooted
            } else {
                return Err(AssetError::NotFound {
                    path: key.to_string(),
                });
            }
        };
        let bytes = self.fs.read(&resolved)?;
        Ok(SourceFile::new(key, resolved, bytes))
    }

    fn import_file(&mut self, key: &str, use_data_root: bool) -> AssetResult<(Asset, PathBuf)> {
        if self.in_flight.iter().any(|k| k == key) {
            return Err(AssetError::Cycle {
                path: key.to_string(),
            });
        }

        let file = self.open(key, use_data_root)?;
        tracing::info!("Loading file: {}", file.resolved.display());

        let extension = file.extension().unwrap_or_default();
        let processor = self
            .find_processor(&extension)
            .ok_or(AssetError::NoProcessor { extension })?;

        self.in_flight.push(key.to_string());
        let result = {
            let mut ctx = ImportContext::new(self, key);
            processor.import(&mut ctx, &file)
        };
        self.in_flight.pop();

        result.map(|asset| (asset, file.resolved))
    }

    // ==========================================================================
    // Sharing
    // ==========================================================================

    /// Register a programmatically built asset. It is not tied to a path and
    /// cannot be reloaded.
    pub fn insert(&mut self, asset: impl Into<Asset>) -> UntypedHandle {
        let mut asset = asset.into();
        let kind = asset.asset_type();
        let info = asset.info_mut();
        info.references = 1;
        info.managed = false;
        info.source.clear();
        UntypedHandle::new(self.entries.push(asset), kind)
    }

    pub fn retain(&mut self, handle: impl Into<UntypedHandle>) -> bool {
        match self.entries.get_mut(handle.into().slot()) {
            Some(asset) => {
                asset.info_mut().references += 1;
                true
            }
            None => false,
        }
    }

    /// Drop one reference, destroying the entry when none remain or when
    /// `force` is set. Returns whether the entry was destroyed.
    pub fn release(&mut self, handle: impl Into<UntypedHandle>, force: bool) -> bool {
        let slot = handle.into().slot();
        let Some(asset) = self.entries.get_mut(slot) else {
            return false;
        };
        let info = asset.info_mut();
        info.references = info.references.saturating_sub(1);
        if info.references == 0 || force {
            self.destroy(slot);
            true
        } else {
            false
        }
    }

    fn destroy(&mut self, slot: IndexSlot) {
        let Some(asset) = self.entries.remove(slot) else {
            return;
        };
        let info = asset.info();
        if info.is_managed() && self.paths.get(info.source()) == Some(&slot) {
            self.paths.remove(info.source());
        }
        tracing::debug!("Destroying {} '{}'", asset.asset_type(), info.source());
        self.discard(asset);
    }

    /// Free a private asset's resources and release everything it holds.
    pub fn discard(&mut self, mut asset: Asset) {
        asset.unload(self.gpu.as_mut(), true);
        asset.purge(true);
        for dependency in asset.dependencies() {
            self.release(dependency, false);
        }
    }

    /// Destroy every entry regardless of outstanding references.
    pub fn unload_all(&mut self) {
        let count = self.entries.len();
        for mut asset in self.entries.drain() {
            asset.unload(self.gpu.as_mut(), true);
            asset.purge(true);
        }
        self.paths.clear();
        if count > 0 {
            tracing::info!("Unloaded {} assets", count);
        }
    }

    // ==========================================================================
    // Access
    // ==========================================================================

    pub fn asset(&self, handle: impl Into<UntypedHandle>) -> Option<&Asset> {
        self.entries.get(handle.into().slot())
    }

    pub fn get<T: AssetKind>(&self, handle: Handle<T>) -> Option<&T> {
        self.entries.get(handle.slot()).and_then(T::from_asset)
    }

    pub fn get_mut<T: AssetKind>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.entries.get_mut(handle.slot()).and_then(T::from_asset_mut)
    }

    pub fn contains(&self, handle: impl Into<UntypedHandle>) -> bool {
        self.entries.contains(handle.into().slot())
    }

    pub fn references(&self, handle: impl Into<UntypedHandle>) -> Option<u32> {
        self.asset(handle).map(|a| a.info().references())
    }

    pub fn source(&self, handle: impl Into<UntypedHandle>) -> Option<&str> {
        self.asset(handle).map(|a| a.info().source())
    }

    pub fn is_managed(&self, handle: impl Into<UntypedHandle>) -> bool {
        self.asset(handle).is_some_and(|a| a.info().is_managed())
    }

    /// Cached entry for `path`, without taking a reference.
    pub fn handle_for_path(&self, path: &str) -> Option<UntypedHandle> {
        let slot = *self.paths.get(&source::normalize_path(path))?;
        let asset = self.entries.get(slot)?;
        Some(UntypedHandle::new(slot, asset.asset_type()))
    }

    /// Live cached entries with their source paths.
    pub fn cached(&self) -> impl Iterator<Item = (&str, UntypedHandle)> + '_ {
        self.paths.iter().filter_map(|(path, &slot)| {
            let asset = self.entries.get(slot)?;
            Some((path.as_str(), UntypedHandle::new(slot, asset.asset_type())))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ==========================================================================
    // Residency
    // ==========================================================================

    /// Upload an entry to the GPU. Fails once its CPU data is purged.
    pub fn load_resources(&mut self, handle: impl Into<UntypedHandle>) -> bool {
        let gpu = self.gpu.as_mut();
        self.entries
            .get_mut(handle.into().slot())
            .is_some_and(|asset| asset.load(gpu))
    }

    pub fn unload_resources(&mut self, handle: impl Into<UntypedHandle>, force: bool) -> bool {
        let gpu = self.gpu.as_mut();
        self.entries
            .get_mut(handle.into().slot())
            .is_some_and(|asset| asset.unload(gpu, force))
    }

    /// Discard CPU-side data of an entry.
    pub fn purge(&mut self, handle: impl Into<UntypedHandle>, force: bool) -> bool {
        self.entries
            .get_mut(handle.into().slot())
            .is_some_and(|asset| asset.purge(force))
    }

    fn model_textures(&self, handle: Handle<Model>) -> Vec<UntypedHandle> {
        self.get(handle)
            .map(|model| model.textures().iter().map(|t| t.untyped()).collect())
            .unwrap_or_default()
    }

    pub fn load_model_textures(&mut self, handle: Handle<Model>) -> bool {
        let mut ok = self.contains(handle);
        for texture in self.model_textures(handle) {
            ok &= self.load_resources(texture);
        }
        ok
    }

    pub fn unload_model_textures(&mut self, handle: Handle<Model>, force: bool) -> bool {
        let mut ok = self.contains(handle);
        for texture in self.model_textures(handle) {
            ok &= self.unload_resources(texture, force);
        }
        ok
    }

    pub fn purge_model_textures(&mut self, handle: Handle<Model>, force: bool) -> bool {
        let mut ok = self.contains(handle);
        for texture in self.model_textures(handle) {
            ok &= self.purge(texture, force);
        }
        ok
    }

    // ==========================================================================
    // Hot reload
    // ==========================================================================

    /// Reload every cached entry whose file changed since the last poll.
    ///
    /// Returns how many entries were refreshed.
    #[cfg(feature = "hot-reload")]
    pub fn apply_changes(&mut self, watcher: &mut crate::hot_reload::ContentWatcher) -> usize {
        let mut refreshed = 0;
        for path in watcher.poll_changes() {
            for handle in self.handles_for_watched_path(&path) {
                if self.reload(handle).is_ok() {
                    refreshed += 1;
                }
            }
        }
        refreshed
    }

    /// Entries whose source names `changed`.
    ///
    /// Watchers report absolute paths while sources are relative, so a source
    /// matches when it (or its data-root form) is a trailing part of
    /// `changed`. Only the entries with the longest match are returned:
    /// `Data/Textures/Grass.ast` selects `Textures/Grass.ast`, not `Grass.ast`.
    #[cfg(feature = "hot-reload")]
    fn handles_for_watched_path(&self, changed: &Path) -> Vec<UntypedHandle> {
        let mut best = 0;
        let mut matches = Vec::new();
        for (source, handle) in self.cached() {
            let verbatim = PathBuf::from(source);
            let rooted = self.config.data_root.join(source);
            let Some(len) = [verbatim, rooted]
                .iter()
                .filter(|candidate| changed.ends_with(candidate))
                .map(|candidate| candidate.components().count())
                .max()
            else {
                continue;
            };
            if len > best {
                best = len;
                matches.clear();
            }
            if len == best {
                matches.push(handle);
            }
        }
        matches
    }
}

impl Drop for Content {
    fn drop(&mut self) {
        self.unload_all();
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Content")
            .field("config", &self.config)
            .field("processors", &self.processors)
            .field("entries", &self.entries.len())
            .finish()
    }
}
