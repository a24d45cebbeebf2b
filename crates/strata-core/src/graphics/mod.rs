pub mod gpu;
pub mod vertex;

pub use gpu::{BufferUsage, GpuContext, GpuError, GpuId, HeadlessGpu, PixelFormat, TextureDescriptor};
pub use vertex::{
    DESCRIPTOR_SIZE, LayoutError, MAX_ELEMENTS, Vertex, VertexDeclaration, VertexElement,
    VertexFormat, VertexPosition, VertexPositionColor, VertexPositionColorTexture,
    VertexPositionNormal, VertexPositionNormalTexture, VertexPositionTexture, VertexSemantic,
};
