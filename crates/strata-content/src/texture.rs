use strata_core::graphics::{GpuContext, GpuId, PixelFormat, TextureDescriptor};
use strata_core::math::Color;

use crate::asset::{AssetInfo, AssetType};
use crate::error::{AssetError, AssetResult};

/// A power-of-two pixel buffer with 24 or 32 bits per pixel.
#[derive(Debug)]
pub struct Texture {
    pub(crate) info: AssetInfo,
    width: u16,
    height: u16,
    depth: u8,
    data: Vec<u8>,
    gpu: Option<GpuId>,
}

impl Texture {
    /// Allocate a zeroed texture.
    pub fn create(width: u16, height: u16, depth: u8) -> AssetResult<Self> {
        let len = Self::data_len(width, height, depth)?;
        Ok(Self {
            info: AssetInfo::default(),
            width,
            height,
            depth,
            data: vec![0; len],
            gpu: None,
        })
    }

    /// Wrap existing pixel bytes; `pixels` must be exactly the computed size.
    pub fn from_pixels(width: u16, height: u16, depth: u8, pixels: Vec<u8>) -> AssetResult<Self> {
        let len = Self::data_len(width, height, depth)?;
        if pixels.len() != len {
            return Err(AssetError::invalid(format!(
                "texture {}x{}x{} needs {} bytes, got {}",
                width,
                height,
                depth,
                len,
                pixels.len()
            )));
        }
        Ok(Self {
            info: AssetInfo::default(),
            width,
            height,
            depth,
            data: pixels,
            gpu: None,
        })
    }

    fn data_len(width: u16, height: u16, depth: u8) -> AssetResult<usize> {
        if depth != 24 && depth != 32 {
            return Err(AssetError::invalid(format!("texture depth {} is not 24 or 32", depth)));
        }
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(AssetError::invalid(format!(
                "texture size {}x{} is not a power of two",
                width, height
            )));
        }
        Ok(width as usize * height as usize * (depth as usize / 8))
    }

    /// Width in pixels, a power of two.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels, a power of two.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Bits per pixel, 24 or 32.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Bytes per pixel, 3 or 4.
    pub fn bytes_per_pixel(&self) -> usize {
        self.depth as usize / 8
    }

    /// Pixel bytes; empty once purged.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixel bytes in RGB(A) order.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Uploaded texture, if any.
    pub fn gpu_id(&self) -> Option<GpuId> {
        self.gpu
    }

    /// Whether the pixel bytes have been discarded.
    pub fn is_purged(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the texture is resident on the GPU.
    pub fn is_loaded(&self) -> bool {
        self.gpu.is_some()
    }

    fn pixel_offset(&self, x: u16, y: u16) -> Option<usize> {
        if self.is_purged() || x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * self.bytes_per_pixel())
    }

    /// Read a pixel; 24-bit textures report an opaque alpha.
    pub fn pixel(&self, x: u16, y: u16) -> Option<Color> {
        let at = self.pixel_offset(x, y)?;
        let px = &self.data[at..at + self.bytes_per_pixel()];
        let alpha = if self.depth == 32 { px[3] } else { u8::MAX };
        Some(Color::from_rgba8(px[0], px[1], px[2], alpha))
    }

    /// Write a pixel; 24-bit textures drop the alpha channel.
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Color) -> bool {
        let Some(at) = self.pixel_offset(x, y) else {
            return false;
        };
        let bpp = self.bytes_per_pixel();
        let rgba = color.to_rgba8();
        self.data[at..at + bpp].copy_from_slice(&rgba[..bpp]);
        true
    }

    /// Upload the pixels. Fails once purged.
    pub fn load(&mut self, gpu: &mut dyn GpuContext) -> bool {
        if self.is_purged() {
            tracing::error!("Texture is purged");
            return false;
        }
        if self.is_loaded() {
            return true;
        }
        let Some(format) = PixelFormat::from_depth(self.depth) else {
            return false;
        };
        let desc = TextureDescriptor {
            width: self.width as u32,
            height: self.height as u32,
            format,
            mipmaps: true,
        };
        match gpu.create_texture(&desc, &self.data) {
            Ok(id) => {
                self.gpu = Some(id);
                true
            }
            Err(e) => {
                tracing::error!("Unable to upload texture: {}", e);
                false
            }
        }
    }

    /// Destroy the uploaded texture if this is the last owner or `force` is set.
    pub fn unload(&mut self, gpu: &mut dyn GpuContext, force: bool) -> bool {
        if !self.info.may_release(force) {
            return false;
        }
        if let Some(id) = self.gpu.take() {
            gpu.destroy(id);
        }
        true
    }

    /// Discard the pixel bytes if this is the last owner or `force` is set.
    pub fn purge(&mut self, force: bool) -> bool {
        if !self.info.may_release(force) {
            return false;
        }
        self.data = Vec::new();
        true
    }

    pub(crate) fn ensure_present(&self) -> AssetResult<()> {
        if self.is_purged() {
            Err(AssetError::Purged {
                kind: AssetType::Texture,
            })
        } else {
            Ok(())
        }
    }
}
