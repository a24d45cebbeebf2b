use std::path::PathBuf;

/// Settings for a [`Content`](crate::Content) cache.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Fallback directory tried when a path does not exist verbatim.
    pub data_root: PathBuf,
    /// Whether `reload` applies the `data_root` fallback like `load` does.
    pub reload_uses_data_root: bool,
    /// Brotli quality, 0..=11.
    pub compression_quality: u32,
    /// Brotli window size as log2 bytes, 10..=24.
    pub compression_window: u32,
    /// Extension written by `process` and read by the container processor,
    /// without the dot.
    pub container_extension: String,
}

impl ContentConfig {
    pub fn with_data_root(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            ..Self::default()
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            data_root: PathBuf::from("Data"),
            reload_uses_data_root: true,
            compression_quality: 11,
            compression_window: 22,
            container_extension: "ast".to_string(),
        }
    }
}
