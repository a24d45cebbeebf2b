//! Content pipeline for Strata.
//!
//! A [`Content`] cache maps normalized paths to reference-counted assets and
//! dispatches each file to a [`Processor`] chosen by extension:
//!
//! - `.ast`: the versioned, brotli-compressed binary container
//! - `.xml`: authoring documents that compose other files
//! - `.tga`: uncompressed truecolor images
//! - `.obj`: Wavefront scenes
//!
//! ```no_run
//! use strata_content::{Content, ContentConfig, Texture};
//!
//! let mut content = Content::headless(ContentConfig::default());
//! let sky = content.load_as::<Texture>("Textures/Sky.ast")?;
//! content.load_resources(sky);
//! content.release(sky, false);
//! # Ok::<(), strata_content::AssetError>(())
//! ```

pub mod asset;
pub mod buffer;
pub mod config;
pub mod content;
pub mod error;
pub mod handle;
#[cfg(feature = "hot-reload")]
pub mod hot_reload;
pub mod io;
pub mod material;
pub mod mesh;
pub mod model;
pub mod particle;
pub mod processor;
pub mod processors;
pub mod shader;
pub mod source;
pub mod texture;

pub use asset::{Asset, AssetInfo, AssetKind, AssetType};
pub use buffer::{IndexBuffer, IndexWidth, VertexBuffer};
pub use config::ContentConfig;
pub use content::Content;
pub use error::{AssetError, AssetResult};
pub use handle::{Handle, UntypedHandle};
#[cfg(feature = "hot-reload")]
pub use hot_reload::ContentWatcher;
pub use io::{DiskFileSystem, FileSystem, MemoryFileSystem};
pub use material::{Channel, Material};
pub use mesh::Mesh;
pub use model::Model;
pub use particle::{ParticleParams, ParticleSystem};
pub use processor::{ExportContext, ImportContext, Processor, ProcessorRegistry};
pub use shader::Shader;
pub use source::SourceFile;
pub use texture::Texture;
