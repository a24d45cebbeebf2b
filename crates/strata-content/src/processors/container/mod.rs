//! The binary container: a fixed header, a brotli payload and a trailer.
//!
//! ```text
//! u32 magic | u16 major | u16 minor | u16 type | u64 length | payload | u16 trailer
//! ```
//!
//! All integers are little-endian. The payload is the compressed output of
//! one of the per-kind sub-codecs; `type` selects which.

mod model;
mod particle;
mod shader;
mod texture;

use std::io::Cursor;

use strata_core::profiling::profile_function;

use super::bytes::{ByteReader, ByteWriter};
use crate::asset::{Asset, AssetType};
use crate::error::{AssetError, AssetResult};
use crate::processor::{ExportContext, ImportContext, Processor};
use crate::source::SourceFile;

/// `"TSA"` packed into the low three bytes.
pub const MAGIC: u32 = ((b'T' as u32) << 16) | ((b'S' as u32) << 8) | (b'A' as u32);
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;
pub const TRAILER: u16 = 0x4815;
pub const HEADER_SIZE: usize = 18;

/// Decoded container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major: u16,
    pub minor: u16,
    pub kind: AssetType,
    pub length: u64,
}

impl Header {
    fn write(&self, w: &mut ByteWriter) {
        w.u32(MAGIC);
        w.u16(self.major);
        w.u16(self.minor);
        w.u16(self.kind.type_code());
        w.u64(self.length);
    }

    fn read(r: &mut ByteReader<'_>) -> AssetResult<Self> {
        let magic = r.u32("header")?;
        if magic != MAGIC {
            return Err(AssetError::corrupt(format!("bad magic {:#010x}", magic)));
        }
        let major = r.u16("header")?;
        let minor = r.u16("header")?;
        if major != VERSION_MAJOR || minor != VERSION_MINOR {
            return Err(AssetError::corrupt(format!(
                "version {}.{} does not match {}.{}",
                major, minor, VERSION_MAJOR, VERSION_MINOR
            )));
        }
        let code = r.u16("header")?;
        let kind = AssetType::from_type_code(code)
            .ok_or_else(|| AssetError::corrupt(format!("unknown type code {}", code)))?;
        let length = r.u64("header")?;
        Ok(Self {
            major,
            minor,
            kind,
            length,
        })
    }
}

/// Import and export of `.ast` containers.
#[derive(Debug, Clone, Copy)]
pub struct ContainerProcessor {
    quality: u32,
    window: u32,
}

impl Default for ContainerProcessor {
    fn default() -> Self {
        Self::new(11, 22)
    }
}

impl ContainerProcessor {
    /// `quality` is the brotli level 0..=11, `window` the log2 window size.
    pub fn new(quality: u32, window: u32) -> Self {
        Self {
            quality: quality.min(11),
            window: window.clamp(10, 24),
        }
    }

    pub fn compress(&self, data: &[u8]) -> AssetResult<Vec<u8>> {
        profile_function!();
        let mut compressed = Vec::new();
        brotli::BrotliCompress(
            &mut Cursor::new(data),
            &mut compressed,
            &brotli::enc::BrotliEncoderParams {
                quality: self.quality as i32,
                lgwin: self.window as i32,
                ..Default::default()
            },
        )
        .map_err(|e| AssetError::invalid(format!("compression failed: {}", e)))?;
        Ok(compressed)
    }

    pub fn decompress(data: &[u8]) -> AssetResult<Vec<u8>> {
        profile_function!();
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(data), &mut decompressed)
            .map_err(|e| AssetError::corrupt(format!("decompression failed: {}", e)))?;
        if decompressed.is_empty() {
            return Err(AssetError::corrupt("payload decompressed to nothing"));
        }
        Ok(decompressed)
    }

    /// Frame an uncompressed sub-codec payload as a complete container.
    pub fn wrap(&self, kind: AssetType, payload: &[u8]) -> AssetResult<Vec<u8>> {
        let compressed = self.compress(payload)?;
        let mut w = ByteWriter::new();
        Header {
            major: VERSION_MAJOR,
            minor: VERSION_MINOR,
            kind,
            length: compressed.len() as u64,
        }
        .write(&mut w);
        w.bytes(&compressed);
        w.u16(TRAILER);
        Ok(w.into_inner())
    }

    /// Validate a container and return its kind with the decompressed payload.
    pub fn unwrap(bytes: &[u8]) -> AssetResult<(AssetType, Vec<u8>)> {
        let mut r = ByteReader::new(bytes);
        let header = Header::read(&mut r)?;
        let length = usize::try_from(header.length)
            .map_err(|_| AssetError::corrupt("payload length does not fit in memory"))?;
        let payload = Self::decompress(r.take(length, "payload")?)?;
        let trailer = r.u16("trailer")?;
        if trailer != TRAILER {
            return Err(AssetError::corrupt(format!("bad trailer {:#06x}", trailer)));
        }
        Ok((header.kind, payload))
    }
}

impl Processor for ContainerProcessor {
    fn name(&self) -> &'static str {
        "container"
    }

    fn extensions(&self) -> &[&'static str] {
        &["ast"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>, file: &SourceFile) -> AssetResult<Asset> {
        profile_function!();
        let (kind, payload) = Self::unwrap(&file.bytes)?;
        let mut r = ByteReader::new(&payload);
        match kind {
            AssetType::Texture => texture::decode(&mut r).map(Asset::Texture),
            AssetType::Model => model::decode(ctx, &mut r).map(Asset::Model),
            AssetType::Shader => shader::decode(&mut r).map(Asset::Shader),
            AssetType::ParticleSystem => particle::decode(ctx, &mut r).map(Asset::ParticleSystem),
        }
    }

    fn export(&self, ctx: &ExportContext<'_>, asset: &Asset) -> AssetResult<Vec<u8>> {
        profile_function!();
        let mut w = ByteWriter::new();
        match asset {
            Asset::Texture(texture) => {
                texture.ensure_present()?;
                texture::encode(&mut w, texture)?;
            }
            Asset::Model(model) => {
                model.ensure_present()?;
                model::encode(ctx, &mut w, model)?;
            }
            Asset::Shader(shader) => {
                shader.ensure_present()?;
                shader::encode(&mut w, shader)?;
            }
            Asset::ParticleSystem(system) => particle::encode(ctx, &mut w, system)?,
        }
        self.wrap(asset.asset_type(), &w.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> ContainerProcessor {
        ContainerProcessor::new(5, 22)
    }

    #[test]
    fn test_magic_spells_tsa() {
        assert_eq!(&MAGIC.to_le_bytes(), &[b'A', b'S', b'T', 0]);
    }

    #[test]
    fn test_compress_roundtrip() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 7) as u8).collect();
        let compressed = container().compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(ContainerProcessor::decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_header_layout() {
        let bytes = container().wrap(AssetType::Shader, b"payload").unwrap();
        assert_eq!(&bytes[4..6], &VERSION_MAJOR.to_le_bytes());
        assert_eq!(&bytes[6..8], &VERSION_MINOR.to_le_bytes());
        assert_eq!(&bytes[8..10], &30u16.to_le_bytes());
        let length = u64::from_le_bytes(bytes[10..18].try_into().unwrap());
        assert_eq!(bytes.len(), HEADER_SIZE + length as usize + 2);
        assert_eq!(&bytes[bytes.len() - 2..], &TRAILER.to_le_bytes());

        let (kind, payload) = ContainerProcessor::unwrap(&bytes).unwrap();
        assert_eq!(kind, AssetType::Shader);
        assert_eq!(payload, b"payload");
    }

    #[test]
    fn test_any_version_mismatch_rejected() {
        let good = container().wrap(AssetType::Texture, b"x").unwrap();

        let mut major = good.clone();
        major[4..6].copy_from_slice(&(VERSION_MAJOR + 1).to_le_bytes());
        assert!(ContainerProcessor::unwrap(&major).unwrap_err().is_corrupt());

        let mut minor = good.clone();
        minor[6..8].copy_from_slice(&(VERSION_MINOR + 1).to_le_bytes());
        assert!(ContainerProcessor::unwrap(&minor).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_malformed_containers_are_corrupt() {
        let good = container().wrap(AssetType::Texture, b"texture").unwrap();

        let mut magic = good.clone();
        magic[0] ^= 0xFF;
        let mut kind = good.clone();
        kind[8..10].copy_from_slice(&99u16.to_le_bytes());
        let mut trailer = good.clone();
        let end = trailer.len() - 1;
        trailer[end] ^= 0xFF;
        let short = good[..good.len() - 4].to_vec();
        let mut garbage = good.clone();
        for byte in &mut garbage[HEADER_SIZE..end - 1] {
            *byte = 0xFF;
        }

        for bad in [magic, kind, trailer, short, garbage, Vec::new()] {
            assert!(ContainerProcessor::unwrap(&bad).unwrap_err().is_corrupt());
        }
    }
}
