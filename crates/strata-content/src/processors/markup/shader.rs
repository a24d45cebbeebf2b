use roxmltree::Node;

use super::elements;
use crate::processor::ImportContext;
use crate::shader::Shader;

pub(super) fn import(ctx: &mut ImportContext<'_>, root: Node<'_, '_>) -> Shader {
    let mut shader = Shader::new();
    for element in elements(root) {
        match element.tag_name().name() {
            "Vertex" => {
                if let Some(source) = stage(ctx, element) {
                    shader.set_vertex_source(source);
                }
            }
            "Fragment" => {
                if let Some(source) = stage(ctx, element) {
                    shader.set_fragment_source(source);
                }
            }
            other => tracing::warn!("Skipping unknown shader element <{}>", other),
        }
    }
    shader
}

/// Read one stage's source file, relative to the document.
fn stage(ctx: &mut ImportContext<'_>, element: Node<'_, '_>) -> Option<Vec<u8>> {
    let file = element.attribute("File").unwrap_or("");
    let path = ctx.sibling(file);
    let mut source = match ctx.read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Unable to open shader file '{}': {}", path, e);
            return None;
        }
    };
    if let Some(entry) = element.attribute("Entry").filter(|e| !e.is_empty()) {
        append_entry(&mut source, entry);
    }
    Some(source)
}

/// Append a `main` that calls `entry`.
pub(super) fn append_entry(source: &mut Vec<u8>, entry: &str) {
    source.extend_from_slice(b"\nvoid main (void)\n{");
    source.extend_from_slice(entry.as_bytes());
    source.extend_from_slice(b";\n}\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wrapper() {
        let mut source = b"vec4 shade() { return vec4(1.0); }".to_vec();
        append_entry(&mut source, "gl_FragColor = shade()");
        assert_eq!(
            String::from_utf8(source).unwrap(),
            "vec4 shade() { return vec4(1.0); }\nvoid main (void)\n{gl_FragColor = shade();\n}\n"
        );
    }
}
