//! Source paths and the raw file handed to processors.

use std::path::{Path, PathBuf};

/// Normalize a path for use as a cache key.
///
/// Purely lexical: backslashes become `/`, empty and `.` segments are dropped
/// and `..` pops the previous segment where one exists. Case is preserved.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute { format!("/{}", joined) } else { joined }
}

/// Lower-cased extension of `path`, without the dot.
pub fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Join `name` onto the directory containing `base`, then normalize.
pub fn sibling(base: &str, name: &str) -> String {
    let parent = Path::new(base)
        .parent()
        .and_then(|p| p.to_str())
        .unwrap_or("");
    if parent.is_empty() {
        normalize_path(name)
    } else {
        normalize_path(&format!("{}/{}", parent, name))
    }
}

/// An opened input file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Normalized path the file was requested under; the cache key.
    pub source: String,
    /// Location the bytes were actually read from.
    pub resolved: PathBuf,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(source: impl Into<String>, resolved: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            resolved: resolved.into(),
            bytes,
        }
    }

    pub fn extension(&self) -> Option<String> {
        extension(&self.source)
    }

    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_segments() {
        assert_eq!(normalize_path("Models/./Trees/../Jungle.xml"), "Models/Jungle.xml");
        assert_eq!(normalize_path("Models//Jungle.xml"), "Models/Jungle.xml");
        assert_eq!(normalize_path("Models\\Jungle.xml"), "Models/Jungle.xml");
        assert_eq!(normalize_path("../Shared/Sky.ast"), "../Shared/Sky.ast");
        assert_eq!(normalize_path("/data/../Sky.ast"), "/Sky.ast");
    }

    #[test]
    fn test_normalize_keeps_case() {
        assert_ne!(normalize_path("Sky.AST"), normalize_path("sky.ast"));
    }

    #[test]
    fn test_extension_lowercased() {
        assert_eq!(extension("Textures/Grass.TGA").as_deref(), Some("tga"));
        assert_eq!(extension("Makefile"), None);
    }

    #[test]
    fn test_sibling() {
        assert_eq!(sibling("Models/Jungle.xml", "Trees/Palm.ast"), "Models/Trees/Palm.ast");
        assert_eq!(sibling("Jungle.xml", "Palm.ast"), "Palm.ast");
        assert_eq!(sibling("Models/Jungle.xml", "../Shaders/Phong.vert"), "Shaders/Phong.vert");
    }
}
