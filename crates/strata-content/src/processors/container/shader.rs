use crate::error::{AssetError, AssetResult};
use crate::processors::bytes::{ByteReader, ByteWriter};
use crate::shader::Shader;

pub(super) fn decode(r: &mut ByteReader<'_>) -> AssetResult<Shader> {
    let vertex_len = r.u32("shader header")? as usize;
    let fragment_len = r.u32("shader header")? as usize;
    let vertex = r.take(vertex_len, "vertex source")?;
    let fragment = r.take(fragment_len, "fragment source")?;
    Ok(Shader::create(vertex, fragment))
}

pub(super) fn encode(w: &mut ByteWriter, shader: &Shader) -> AssetResult<()> {
    let len = |src: &[u8]| {
        u32::try_from(src.len()).map_err(|_| AssetError::invalid("shader source is too long"))
    };
    w.u32(len(shader.vertex_source())?);
    w.u32(len(shader.fragment_source())?);
    w.bytes(shader.vertex_source());
    w.bytes(shader.fragment_source());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_payload() {
        let shader = Shader::create("attribute vec4 p;", "uniform sampler2D t;");
        let mut w = ByteWriter::new();
        encode(&mut w, &shader).unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[..4], &17u32.to_le_bytes());

        let decoded = decode(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(decoded.vertex_source(), b"attribute vec4 p;");
        assert_eq!(decoded.fragment_source(), b"uniform sampler2D t;");
    }

    #[test]
    fn test_truncated_source() {
        let mut w = ByteWriter::new();
        w.u32(10);
        w.u32(0);
        w.bytes(b"short");
        let bytes = w.into_inner();
        assert!(decode(&mut ByteReader::new(&bytes)).unwrap_err().is_corrupt());
    }
}
