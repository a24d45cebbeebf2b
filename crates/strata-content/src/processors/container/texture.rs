use crate::error::{AssetError, AssetResult};
use crate::processors::bytes::{ByteReader, ByteWriter};
use crate::texture::Texture;

pub(super) fn decode(r: &mut ByteReader<'_>) -> AssetResult<Texture> {
    let width = r.u16("texture header")?;
    let height = r.u16("texture header")?;
    let depth = r.u8("texture header")?;

    // The pixel bytes must be present before the header is allowed to size
    // an allocation.
    let len = width as usize * height as usize * (depth as usize / 8);
    let pixels = r.take(len, "texture data")?.to_vec();
    Texture::from_pixels(width, height, depth, pixels)
        .map_err(|e| AssetError::corrupt(format!("texture header rejected: {}", e)))
}

pub(super) fn encode(w: &mut ByteWriter, texture: &Texture) -> AssetResult<()> {
    w.u16(texture.width());
    w.u16(texture.height());
    w.u8(texture.depth());
    w.bytes(texture.data());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::math::Color;

    #[test]
    fn test_texture_payload() {
        let mut texture = Texture::create(2, 4, 32).unwrap();
        texture.set_pixel(1, 3, Color::from_rgba8(9, 8, 7, 6));

        let mut w = ByteWriter::new();
        encode(&mut w, &texture).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), 5 + 2 * 4 * 4);
        assert_eq!(&bytes[..5], &[2, 0, 4, 0, 32]);

        let decoded = decode(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!((decoded.width(), decoded.height(), decoded.depth()), (2, 4, 32));
        assert_eq!(decoded.data(), texture.data());
    }

    #[test]
    fn test_truncated_pixels() {
        let bytes = [4, 0, 4, 0, 24, 1, 2, 3];
        assert!(decode(&mut ByteReader::new(&bytes)).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_bad_dimensions() {
        let bytes = [3, 0, 4, 0, 24];
        assert!(decode(&mut ByteReader::new(&bytes)).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_large_header_with_short_data() {
        let mut w = ByteWriter::new();
        w.u16(32768);
        w.u16(32768);
        w.u8(32);
        w.bytes(&[0; 16]);
        let bytes = w.into_inner();
        let err = decode(&mut ByteReader::new(&bytes)).unwrap_err();
        assert!(err.is_corrupt());
    }
}
