use strata_core::math::Color;

/// Color plus optional texture index into the owning model's texture list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    pub color: Color,
    /// Index into the model's textures, or -1.
    pub texture: i32,
}

impl Channel {
    pub const fn new(color: Color) -> Self {
        Self { color, texture: -1 }
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Channel,
    pub diffuse: Channel,
    pub specular: Channel,
    pub emissive: Channel,
    pub alpha: f32,
    pub shininess: f32,
    /// Normal map index into the model's textures, or -1.
    pub normal: i32,
}

impl Material {
    /// Size of the packed record: four channels of five 32-bit words, then
    /// alpha, shininess and the normal index.
    pub const RECORD_SIZE: usize = 4 * 20 + 12;

    pub fn channels(&self) -> [&Channel; 4] {
        [&self.ambient, &self.diffuse, &self.specular, &self.emissive]
    }

    pub fn channels_mut(&mut self) -> [&mut Channel; 4] {
        [
            &mut self.ambient,
            &mut self.diffuse,
            &mut self.specular,
            &mut self.emissive,
        ]
    }

    /// Shift every texture reference by `by`, leaving -1 untouched.
    pub(crate) fn offset_textures(&mut self, by: i32) {
        for channel in self.channels_mut() {
            if channel.texture >= 0 {
                channel.texture += by;
            }
        }
        if self.normal >= 0 {
            self.normal += by;
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Channel::new(Color::BLACK),
            diffuse: Channel::default(),
            specular: Channel::new(Color::BLACK),
            emissive: Channel::new(Color::BLACK),
            alpha: 1.0,
            shininess: 2.0,
            normal: -1,
        }
    }
}
