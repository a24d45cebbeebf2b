//! Authoring documents that compose other files through the cache.
//!
//! The root tag selects the asset kind and must carry `Version="1.0"`.
//! Nested loads that fail are logged and skipped; the document itself still
//! imports.

mod model;
mod particle;
mod shader;

use roxmltree::{Document, Node};
use strata_core::math::{Color, Vec3};
use strata_core::profiling::profile_function;

use crate::asset::Asset;
use crate::error::{AssetError, AssetResult};
use crate::processor::{ImportContext, Processor};
use crate::source::SourceFile;

/// Protocol version every root element must declare.
pub const VERSION: &str = "1.0";

/// Import-only processor for `.xml` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupProcessor;

impl Processor for MarkupProcessor {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn extensions(&self) -> &[&'static str] {
        &["xml"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>, file: &SourceFile) -> AssetResult<Asset> {
        profile_function!();
        let text = file
            .text()
            .ok_or_else(|| AssetError::markup("document is not valid UTF-8"))?;
        let document = Document::parse(text)
            .map_err(|e| AssetError::markup(format!("unable to read XML file: {}", e)))?;
        let root = document.root_element();

        let kind = root.tag_name().name();
        if !matches!(kind, "Model" | "Shader" | "ParticleSystem") {
            return Err(AssetError::markup(format!(
                "root element <{}> is not Model, Shader or ParticleSystem",
                kind
            )));
        }
        match root.attribute("Version") {
            Some(VERSION) => {}
            version => {
                return Err(AssetError::markup(format!(
                    "unsupported file version {:?}",
                    version.unwrap_or("")
                )));
            }
        }

        match kind {
            "Model" => Ok(Asset::Model(model::import(ctx, root))),
            "Shader" => Ok(Asset::Shader(shader::import(ctx, root))),
            _ => particle::import(ctx, root).map(Asset::ParticleSystem),
        }
    }
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

/// Comma separated floats; empty entries are skipped, bad numbers read as 0.
fn parse_floats(text: &str) -> Vec<f32> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().unwrap_or(0.0))
        .collect()
}

fn parse_color(text: &str) -> Option<Color> {
    match parse_floats(text)[..] {
        [r, g, b, a, ..] => Some(Color::new(r, g, b, a)),
        _ => None,
    }
}

fn parse_vec3(text: &str) -> Option<Vec3> {
    match parse_floats(text)[..] {
        [x, y, z, ..] => Some(Vec3::new(x, y, z)),
        _ => None,
    }
}

/// `attr` as a float, or `fallback` when missing or malformed.
fn float_attr(node: Node<'_, '_>, attr: &str, fallback: f32) -> f32 {
    node.attribute(attr)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(
            parse_color("0.5, 1,,0.25,1"),
            Some(Color::new(0.5, 1.0, 0.25, 1.0))
        );
        assert_eq!(parse_color("1,1,1"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1,2,3,4"), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(parse_vec3("x,2,3"), Some(Vec3::new(0.0, 2.0, 3.0)));
    }

    #[test]
    fn test_float_attr_fallback() {
        let doc = Document::parse(r#"<Alpha Value="abc" Other="0.5"/>"#).unwrap();
        let node = doc.root_element();
        assert_eq!(float_attr(node, "Value", 1.0), 1.0);
        assert_eq!(float_attr(node, "Other", 1.0), 0.5);
        assert_eq!(float_attr(node, "Missing", 2.0), 2.0);
    }
}
