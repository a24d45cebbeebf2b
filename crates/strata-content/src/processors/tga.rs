//! Truecolor TGA images.
//!
//! Only the uncompressed 24 and 32 bit subset is read, with power-of-two
//! dimensions and no origin flip bits.

use strata_core::profiling::profile_function;

use super::bytes::ByteReader;
use crate::asset::Asset;
use crate::error::{AssetError, AssetResult};
use crate::processor::{ImportContext, Processor};
use crate::source::SourceFile;
use crate::texture::Texture;

pub const HEADER_SIZE: usize = 18;

const IMAGE_TYPE_TRUECOLOR: u8 = 2;
const FLIP_BITS: u8 = 0x10 | 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TgaHeader {
    pub id_length: u8,
    pub color_map_type: u8,
    pub image_type: u8,
    pub color_map_start: u16,
    pub color_map_length: u16,
    pub color_map_bits: u8,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub depth: u8,
    pub descriptor: u8,
}

impl TgaHeader {
    pub fn read(bytes: &[u8]) -> AssetResult<Self> {
        let mut r = ByteReader::new(bytes);
        let what = "TGA header";
        Ok(Self {
            id_length: r.u8(what)?,
            color_map_type: r.u8(what)?,
            image_type: r.u8(what)?,
            color_map_start: r.u16(what)?,
            color_map_length: r.u16(what)?,
            color_map_bits: r.u8(what)?,
            x: r.u16(what)?,
            y: r.u16(what)?,
            width: r.u16(what)?,
            height: r.u16(what)?,
            depth: r.u8(what)?,
            descriptor: r.u8(what)?,
        })
    }

    fn check(&self) -> AssetResult<()> {
        let unsupported = |reason: &str| {
            Err(AssetError::Unsupported {
                reason: reason.to_string(),
            })
        };
        if self.image_type != IMAGE_TYPE_TRUECOLOR {
            return unsupported("TGA image type must be uncompressed truecolor");
        }
        if self.descriptor & FLIP_BITS != 0 {
            return unsupported("TGA image flipping is not supported");
        }
        if self.depth != 24 && self.depth != 32 {
            return unsupported("TGA depth must be 24 or 32");
        }
        if !self.width.is_power_of_two() || !self.height.is_power_of_two() {
            return unsupported("TGA dimensions must be powers of two");
        }
        Ok(())
    }
}

/// Decode a TGA file into a texture with RGB(A) pixel order.
pub fn decode(bytes: &[u8]) -> AssetResult<Texture> {
    profile_function!();
    let header = TgaHeader::read(bytes)?;
    header.check()?;

    let mut texture = Texture::create(header.width, header.height, header.depth)?;
    let bpp = texture.bytes_per_pixel();
    let len = texture.data().len();

    let mut r = ByteReader::new(bytes);
    r.take(HEADER_SIZE + header.id_length as usize, "TGA image ID")?;
    let pixels = r.take(len, "TGA pixel data")?;

    let data = texture.data_mut();
    data.copy_from_slice(pixels);
    for px in data.chunks_exact_mut(bpp) {
        px.swap(0, 2);
    }
    Ok(texture)
}

/// Import-only processor for `.tga` images.
#[derive(Debug, Clone, Copy, Default)]
pub struct TgaProcessor;

impl Processor for TgaProcessor {
    fn name(&self) -> &'static str {
        "tga"
    }

    fn extensions(&self) -> &[&'static str] {
        &["tga"]
    }

    fn import(&self, _ctx: &mut ImportContext<'_>, file: &SourceFile) -> AssetResult<Asset> {
        decode(&file.bytes).map(Asset::Texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::math::Color;

    fn tga(width: u16, height: u16, depth: u8, image_type: u8, descriptor: u8) -> Vec<u8> {
        let mut bytes = vec![3, 0, image_type, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.push(depth);
        bytes.push(descriptor);
        bytes.extend_from_slice(b"id!");
        let bpp = depth as usize / 8;
        for i in 0..(width as usize * height as usize) {
            bytes.extend_from_slice(&[i as u8, 100, 200, 255][..bpp]);
        }
        bytes
    }

    #[test]
    fn test_swaps_bgr() {
        let texture = decode(&tga(2, 2, 24, 2, 0)).unwrap();
        assert_eq!(texture.depth(), 24);
        assert_eq!(texture.pixel(1, 0), Some(Color::from_rgba8(200, 100, 1, 255)));
    }

    #[test]
    fn test_keeps_alpha() {
        let texture = decode(&tga(4, 2, 32, 2, 8)).unwrap();
        assert_eq!(&texture.data()[..4], &[200, 100, 0, 255]);
    }

    #[test]
    fn test_unsupported_subsets() {
        for bytes in [
            tga(2, 2, 24, 10, 0),
            tga(2, 2, 24, 2, 0x20),
            tga(2, 2, 24, 2, 0x10),
            tga(2, 2, 16, 2, 0),
            tga(3, 2, 24, 2, 0),
        ] {
            assert!(matches!(decode(&bytes), Err(AssetError::Unsupported { .. })));
        }
    }

    #[test]
    fn test_short_pixels() {
        let mut bytes = tga(2, 2, 24, 2, 0);
        bytes.truncate(bytes.len() - 1);
        assert!(decode(&bytes).unwrap_err().is_corrupt());
        assert!(decode(&bytes[..10]).unwrap_err().is_corrupt());
    }
}
