//! Built-in format processors.

pub(crate) mod bytes;
pub mod container;
pub mod markup;
pub mod obj;
pub mod tga;

pub use container::ContainerProcessor;
pub use markup::MarkupProcessor;
pub use obj::ObjProcessor;
pub use tga::TgaProcessor;
