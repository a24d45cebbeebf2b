//! Vertex layout engine.
//!
//! A [`VertexDeclaration`] lays out an ordered list of [`VertexElement`]s
//! left to right. Plain elements reserve `format.size()` bytes at the running
//! stride; aliased elements reuse the bytes of an earlier element.

use std::fmt;

use bytemuck::{Pod, Zeroable};

use crate::profiling::profile_function;

/// Numeric format of a single vertex attribute.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float = 10,
    /// Four 8-bit channels packed into one 32-bit word.
    Color = 20,
    Vec2 = 30,
    Vec3 = 40,
    Vec4 = 50,
}

impl VertexFormat {
    pub const fn size(self) -> u32 {
        match self {
            VertexFormat::Float => 4,
            VertexFormat::Color => 4,
            VertexFormat::Vec2 => 8,
            VertexFormat::Vec3 => 12,
            VertexFormat::Vec4 => 16,
        }
    }

    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Result<Self, LayoutError> {
        Ok(match code {
            10 => VertexFormat::Float,
            20 => VertexFormat::Color,
            30 => VertexFormat::Vec2,
            40 => VertexFormat::Vec3,
            50 => VertexFormat::Vec4,
            other => return Err(LayoutError::UnknownFormat(other)),
        })
    }
}

/// Semantic meaning of a vertex attribute.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Binormal = 10,
    Color = 20,
    Depth = 30,
    Normal = 40,
    PointSize = 50,
    Position = 60,
    Sample = 70,
    Tangent = 80,
    TessellateFactor = 90,
    TextureUV = 100,
}

impl VertexSemantic {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Result<Self, LayoutError> {
        Ok(match code {
            10 => VertexSemantic::Binormal,
            20 => VertexSemantic::Color,
            30 => VertexSemantic::Depth,
            40 => VertexSemantic::Normal,
            50 => VertexSemantic::PointSize,
            60 => VertexSemantic::Position,
            70 => VertexSemantic::Sample,
            80 => VertexSemantic::Tangent,
            90 => VertexSemantic::TessellateFactor,
            100 => VertexSemantic::TextureUV,
            other => return Err(LayoutError::UnknownSemantic(other)),
        })
    }
}

/// Size of one element descriptor on the wire: alias u8, offset u16,
/// format u32, semantic u32.
pub const DESCRIPTOR_SIZE: usize = 11;

/// Most elements a declaration can hold; the element count is stored in a byte.
pub const MAX_ELEMENTS: usize = u8::MAX as usize;

/// One attribute of a vertex.
///
/// `alias` is 0 for an attribute with its own bytes, or the 1-based position
/// of an earlier element whose bytes it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    format: VertexFormat,
    semantic: VertexSemantic,
    alias: u8,
    offset: u32,
}

impl VertexElement {
    pub const fn new(format: VertexFormat, semantic: VertexSemantic) -> Self {
        Self {
            format,
            semantic,
            alias: 0,
            offset: 0,
        }
    }

    /// An element reading the bytes of the element at 1-based position `index`.
    pub const fn aliased(format: VertexFormat, semantic: VertexSemantic, index: u8) -> Self {
        Self {
            format,
            semantic,
            alias: index,
            offset: 0,
        }
    }

    pub fn format(&self) -> VertexFormat {
        self.format
    }

    pub fn semantic(&self) -> VertexSemantic {
        self.semantic
    }

    pub fn alias(&self) -> u8 {
        self.alias
    }

    pub fn is_aliased(&self) -> bool {
        self.alias != 0
    }

    /// Byte offset within a vertex. Only meaningful once the element belongs
    /// to a [`VertexDeclaration`].
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Bytes this element adds to the vertex stride.
    pub fn reserved_size(&self) -> u32 {
        if self.is_aliased() { 0 } else { self.format.size() }
    }

    pub fn to_descriptor(&self) -> [u8; DESCRIPTOR_SIZE] {
        let mut out = [0u8; DESCRIPTOR_SIZE];
        out[0] = self.alias;
        out[1..3].copy_from_slice(&(self.offset as u16).to_le_bytes());
        out[3..7].copy_from_slice(&self.format.code().to_le_bytes());
        out[7..11].copy_from_slice(&self.semantic.code().to_le_bytes());
        out
    }

    /// Decode a raw descriptor. The stored offset is ignored; the declaration
    /// recomputes it.
    pub fn from_descriptor(raw: &[u8; DESCRIPTOR_SIZE]) -> Result<Self, LayoutError> {
        let format = VertexFormat::from_code(u32::from_le_bytes([raw[3], raw[4], raw[5], raw[6]]))?;
        let semantic =
            VertexSemantic::from_code(u32::from_le_bytes([raw[7], raw[8], raw[9], raw[10]]))?;
        Ok(Self::aliased(format, semantic, raw[0]))
    }
}

/// Computed byte layout of one vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexDeclaration {
    elements: Vec<VertexElement>,
    stride: u32,
}

impl VertexDeclaration {
    pub fn new(elements: impl Into<Vec<VertexElement>>) -> Result<Self, LayoutError> {
        profile_function!();
        let mut elements = elements.into();
        if elements.is_empty() {
            return Err(LayoutError::Empty);
        }
        if elements.len() > MAX_ELEMENTS {
            return Err(LayoutError::TooManyElements(elements.len()));
        }

        let mut stride = 0;
        for i in 0..elements.len() {
            let alias = elements[i].alias as usize;
            if alias == 0 {
                elements[i].offset = stride;
                stride += elements[i].format.size();
            } else if alias <= i {
                elements[i].offset = elements[alias - 1].offset;
            } else {
                return Err(LayoutError::InvalidAlias {
                    position: i + 1,
                    alias: alias as u8,
                });
            }
        }

        Ok(Self { elements, stride })
    }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn find(&self, semantic: VertexSemantic) -> Option<&VertexElement> {
        self.elements.iter().find(|e| e.semantic == semantic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    Empty,
    TooManyElements(usize),
    /// `alias` at 1-based `position` does not name an earlier element.
    InvalidAlias { position: usize, alias: u8 },
    UnknownFormat(u32),
    UnknownSemantic(u32),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Empty => write!(f, "vertex declaration has no elements"),
            LayoutError::TooManyElements(n) => {
                write!(f, "vertex declaration has {} elements, at most {} allowed", n, MAX_ELEMENTS)
            }
            LayoutError::InvalidAlias { position, alias } => write!(
                f,
                "element {} aliases element {}, which does not precede it",
                position, alias
            ),
            LayoutError::UnknownFormat(code) => write!(f, "unknown vertex format code {}", code),
            LayoutError::UnknownSemantic(code) => write!(f, "unknown vertex semantic code {}", code),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Vertex types with a fixed, known declaration.
pub trait Vertex: Pod {
    const ELEMENTS: &'static [VertexElement];

    fn declaration() -> VertexDeclaration {
        // Every predefined element list is non-empty and alias free.
        match VertexDeclaration::new(Self::ELEMENTS.to_vec()) {
            Ok(declaration) => declaration,
            Err(_) => unreachable!("predefined vertex declarations are valid"),
        }
    }
}

use VertexFormat as F;
use VertexSemantic as S;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPosition {
    pub position: [f32; 4],
}

impl Vertex for VertexPosition {
    const ELEMENTS: &'static [VertexElement] = &[VertexElement::new(F::Vec4, S::Position)];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPositionColor {
    pub position: [f32; 4],
    pub color: [u8; 4],
}

impl Vertex for VertexPositionColor {
    const ELEMENTS: &'static [VertexElement] = &[
        VertexElement::new(F::Vec4, S::Position),
        VertexElement::new(F::Color, S::Color),
    ];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPositionNormal {
    pub position: [f32; 4],
    pub normal: [f32; 3],
}

impl Vertex for VertexPositionNormal {
    const ELEMENTS: &'static [VertexElement] = &[
        VertexElement::new(F::Vec4, S::Position),
        VertexElement::new(F::Vec3, S::Normal),
    ];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPositionTexture {
    pub position: [f32; 4],
    pub texture: [f32; 2],
}

impl Vertex for VertexPositionTexture {
    const ELEMENTS: &'static [VertexElement] = &[
        VertexElement::new(F::Vec4, S::Position),
        VertexElement::new(F::Vec2, S::TextureUV),
    ];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPositionColorTexture {
    pub position: [f32; 4],
    pub color: [u8; 4],
    pub texture: [f32; 2],
}

impl Vertex for VertexPositionColorTexture {
    const ELEMENTS: &'static [VertexElement] = &[
        VertexElement::new(F::Vec4, S::Position),
        VertexElement::new(F::Color, S::Color),
        VertexElement::new(F::Vec2, S::TextureUV),
    ];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexPositionNormalTexture {
    pub position: [f32; 4],
    pub normal: [f32; 3],
    pub texture: [f32; 2],
}

impl Vertex for VertexPositionNormalTexture {
    const ELEMENTS: &'static [VertexElement] = &[
        VertexElement::new(F::Vec4, S::Position),
        VertexElement::new(F::Vec3, S::Normal),
        VertexElement::new(F::Vec2, S::TextureUV),
    ];
}

static_assertions::const_assert_eq!(std::mem::size_of::<VertexPositionColor>(), 20);
static_assertions::const_assert_eq!(std::mem::size_of::<VertexPositionTexture>(), 24);
static_assertions::const_assert_eq!(std::mem::size_of::<VertexPositionNormalTexture>(), 36);

#[cfg(test)]
mod tests {
    use super::*;

    fn pos_normal_uv() -> Vec<VertexElement> {
        vec![
            VertexElement::new(F::Vec4, S::Position),
            VertexElement::new(F::Vec3, S::Normal),
            VertexElement::new(F::Vec2, S::TextureUV),
        ]
    }

    #[test]
    fn test_offsets_and_stride() {
        let decl = VertexDeclaration::new(pos_normal_uv()).unwrap();
        assert_eq!(decl.stride(), 36);
        let offsets: Vec<_> = decl.elements().iter().map(|e| e.offset()).collect();
        assert_eq!(offsets, vec![0, 16, 28]);
    }

    #[test]
    fn test_alias_reuses_offset() {
        let mut elements = pos_normal_uv();
        elements.push(VertexElement::aliased(F::Vec4, S::Color, 1));
        let decl = VertexDeclaration::new(elements).unwrap();
        assert_eq!(decl.stride(), 36);
        assert_eq!(decl.elements()[3].offset(), 0);
        assert_eq!(decl.elements()[3].reserved_size(), 0);
    }

    #[test]
    fn test_alias_of_alias() {
        let elements = vec![
            VertexElement::new(F::Float, S::Depth),
            VertexElement::new(F::Vec3, S::Normal),
            VertexElement::aliased(F::Vec3, S::Tangent, 2),
            VertexElement::aliased(F::Vec3, S::Binormal, 3),
        ];
        let decl = VertexDeclaration::new(elements).unwrap();
        assert_eq!(decl.stride(), 16);
        assert_eq!(decl.elements()[3].offset(), 4);
    }

    #[test]
    fn test_forward_alias_rejected() {
        let elements = vec![
            VertexElement::aliased(F::Vec4, S::Position, 1),
            VertexElement::new(F::Vec2, S::TextureUV),
        ];
        assert_eq!(
            VertexDeclaration::new(elements),
            Err(LayoutError::InvalidAlias { position: 1, alias: 1 })
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(VertexDeclaration::new(Vec::new()), Err(LayoutError::Empty));
    }

    #[test]
    fn test_descriptor_layout() {
        let decl = VertexDeclaration::new(pos_normal_uv()).unwrap();
        let raw = decl.elements()[2].to_descriptor();
        assert_eq!(raw[0], 0);
        assert_eq!(u16::from_le_bytes([raw[1], raw[2]]), 28);
        assert_eq!(u32::from_le_bytes([raw[3], raw[4], raw[5], raw[6]]), 30);
        assert_eq!(u32::from_le_bytes([raw[7], raw[8], raw[9], raw[10]]), 100);
        let decoded = VertexElement::from_descriptor(&raw).unwrap();
        assert_eq!(decoded.format(), F::Vec2);
        assert_eq!(decoded.semantic(), S::TextureUV);
    }

    #[test]
    fn test_unknown_format_code() {
        let mut raw = VertexElement::new(F::Vec2, S::TextureUV).to_descriptor();
        raw[3] = 11;
        assert_eq!(
            VertexElement::from_descriptor(&raw),
            Err(LayoutError::UnknownFormat(11))
        );
    }

    #[test]
    fn test_predefined_strides_match_structs() {
        assert_eq!(VertexPosition::declaration().stride() as usize, size_of::<VertexPosition>());
        assert_eq!(
            VertexPositionColor::declaration().stride() as usize,
            size_of::<VertexPositionColor>()
        );
        assert_eq!(
            VertexPositionNormal::declaration().stride() as usize,
            size_of::<VertexPositionNormal>()
        );
        assert_eq!(
            VertexPositionTexture::declaration().stride() as usize,
            size_of::<VertexPositionTexture>()
        );
        assert_eq!(
            VertexPositionColorTexture::declaration().stride() as usize,
            size_of::<VertexPositionColorTexture>()
        );
        assert_eq!(
            VertexPositionNormalTexture::declaration().stride() as usize,
            size_of::<VertexPositionNormalTexture>()
        );
    }
}
