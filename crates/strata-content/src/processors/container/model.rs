use strata_core::graphics::{DESCRIPTOR_SIZE, VertexDeclaration, VertexElement};
use strata_core::math::Color;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::error::{AssetError, AssetResult};
use crate::material::{Channel, Material};
use crate::mesh::Mesh;
use crate::model::Model;
use crate::processor::{ExportContext, ImportContext};
use crate::processors::bytes::{ByteReader, ByteWriter};

/// Decode a model, loading its textures through the cache.
///
/// Any failure, including a texture that cannot be loaded, aborts the whole
/// model and releases the textures already taken.
pub(super) fn decode(ctx: &mut ImportContext<'_>, r: &mut ByteReader<'_>) -> AssetResult<Model> {
    let mut model = Model::new();
    match decode_into(ctx, r, &mut model) {
        Ok(()) => Ok(model),
        Err(e) => {
            ctx.discard(model);
            Err(e)
        }
    }
}

fn decode_into(
    ctx: &mut ImportContext<'_>,
    r: &mut ByteReader<'_>,
    model: &mut Model,
) -> AssetResult<()> {
    let texture_count = r.u16("model header")?;
    let material_count = r.u16("model header")?;
    let mesh_count = r.u16("model header")?;

    for _ in 0..texture_count {
        let name = r.short_string("texture filename")?;
        let texture = ctx.load_texture(&name)?;
        model.push_texture(texture);
    }

    for _ in 0..material_count {
        model.materials.push(read_material(r)?);
    }

    for _ in 0..mesh_count {
        if r.bool("mesh validity")? {
            model.meshes.push(read_mesh(r)?);
        }
    }

    if r.bool("physics mesh validity")? {
        model.set_physics_mesh(Some(read_mesh(r)?));
    }
    Ok(())
}

pub(super) fn encode(ctx: &ExportContext<'_>, w: &mut ByteWriter, model: &Model) -> AssetResult<()> {
    w.count16(model.textures().len(), "textures")?;
    w.count16(model.materials.len(), "materials")?;
    w.count16(model.meshes.len(), "meshes")?;

    for &texture in model.textures() {
        let source = ctx.managed_source(texture).ok_or(AssetError::NotManaged)?;
        w.short_string(source)?;
    }

    for material in &model.materials {
        write_material(w, material);
    }

    for mesh in &model.meshes {
        w.bool(true);
        write_mesh(w, mesh)?;
    }

    match model.physics_mesh() {
        Some(physics) => {
            w.bool(true);
            write_mesh(w, physics)?;
        }
        None => w.bool(false),
    }
    Ok(())
}

fn read_color(r: &mut ByteReader<'_>) -> AssetResult<Color> {
    Ok(Color::new(
        r.f32("material")?,
        r.f32("material")?,
        r.f32("material")?,
        r.f32("material")?,
    ))
}

fn read_material(r: &mut ByteReader<'_>) -> AssetResult<Material> {
    let mut material = Material::default();
    for channel in material.channels_mut() {
        *channel = Channel {
            color: read_color(r)?,
            texture: r.i32("material")?,
        };
    }
    material.alpha = r.f32("material")?;
    material.shininess = r.f32("material")?;
    material.normal = r.i32("material")?;
    Ok(material)
}

fn write_material(w: &mut ByteWriter, material: &Material) {
    for channel in material.channels() {
        for component in channel.color.to_array() {
            w.f32(component);
        }
        w.i32(channel.texture);
    }
    w.f32(material.alpha);
    w.f32(material.shininess);
    w.i32(material.normal);
}

fn read_mesh(r: &mut ByteReader<'_>) -> AssetResult<Mesh> {
    let vertex_count = r.u32("mesh vertex count")?;
    let element_count = r.u8("mesh vertex element count")?;

    let mut elements = Vec::with_capacity(element_count as usize);
    for _ in 0..element_count {
        let raw = r.descriptor::<DESCRIPTOR_SIZE>("vertex element")?;
        elements.push(VertexElement::from_descriptor(&raw).map_err(layout)?);
    }
    let declaration = VertexDeclaration::new(elements).map_err(layout)?;

    let index_count = r.u32("index count and size")?;
    let index_width = r.u8("index count and size")?;
    let material = r.i32("material reference")?;

    // Counts come from the file; size them against what is left before
    // allocating anything.
    let vertex_len = sized(vertex_count, declaration.stride() as usize, "vertices")?;
    let vertex_bytes = r.take(vertex_len, "vertices")?.to_vec();
    let index_len = sized(index_count, index_width as usize, "indices")?;
    let index_bytes = r.take(index_len, "indices")?.to_vec();

    let vertices = VertexBuffer::from_bytes(declaration, vertex_bytes).map_err(rejected)?;
    let indices = IndexBuffer::from_bytes(index_width, index_bytes).map_err(rejected)?;

    let mut mesh = Mesh::new(vertices, indices);
    mesh.material = material;
    Ok(mesh)
}

fn write_mesh(w: &mut ByteWriter, mesh: &Mesh) -> AssetResult<()> {
    let vertices = mesh.vertices();
    let indices = mesh.indices();
    if vertices.is_purged() || indices.is_purged() {
        return Err(AssetError::invalid(format!("mesh '{}' is purged", mesh.name)));
    }
    let declaration = vertices.declaration();
    let element_count = u8::try_from(declaration.len())
        .map_err(|_| AssetError::invalid("too many vertex elements"))?;

    w.u32(vertices.vertex_count());
    w.u8(element_count);
    for element in declaration.elements() {
        w.bytes(&element.to_descriptor());
    }
    w.u32(indices.index_count());
    w.u8(indices.width().bytes());
    w.i32(mesh.material);
    w.bytes(vertices.data());
    w.bytes(indices.data());
    Ok(())
}

fn sized(count: u32, unit: usize, what: &str) -> AssetResult<usize> {
    (count as usize)
        .checked_mul(unit)
        .ok_or_else(|| AssetError::corrupt(format!("Unable to read {}", what)))
}

fn layout(err: strata_core::graphics::LayoutError) -> AssetError {
    AssetError::corrupt(format!("vertex layout: {}", err))
}

fn rejected(err: AssetError) -> AssetError {
    AssetError::corrupt(format!("mesh header rejected: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::graphics::{VertexFormat, VertexSemantic};

    #[test]
    fn test_material_record_size() {
        let mut w = ByteWriter::new();
        write_material(&mut w, &Material::default());
        assert_eq!(w.into_inner().len(), Material::RECORD_SIZE);
    }

    #[test]
    fn test_material_record() {
        let mut material = Material::default();
        material.diffuse = Channel {
            color: Color::new(0.5, 0.25, 1.0, 1.0),
            texture: 2,
        };
        material.normal = 1;
        material.shininess = 16.0;

        let mut w = ByteWriter::new();
        write_material(&mut w, &material);
        let bytes = w.into_inner();
        let decoded = read_material(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(decoded, material);
    }

    #[test]
    fn test_mesh_body() {
        let mut quad = Mesh::create_quad(-1.0, -1.0, 1.0, 1.0).unwrap();
        quad.material = 3;

        let mut w = ByteWriter::new();
        write_mesh(&mut w, &quad).unwrap();
        let bytes = w.into_inner();
        // counts, two descriptors, index header, material, 4 * 24 + 6 bytes.
        assert_eq!(bytes.len(), 4 + 1 + 2 * DESCRIPTOR_SIZE + 5 + 4 + 96 + 6);

        let decoded = read_mesh(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(decoded.material, 3);
        assert_eq!(decoded.vertices().declaration(), quad.vertices().declaration());
        assert_eq!(decoded.vertices().data(), quad.vertices().data());
        assert_eq!(decoded.indices().data(), &[0, 2, 1, 2, 3, 1]);
    }

    #[test]
    fn test_bad_index_width() {
        let quad = Mesh::create_quad(0.0, 0.0, 1.0, 1.0).unwrap();
        let mut w = ByteWriter::new();
        write_mesh(&mut w, &quad).unwrap();
        let mut bytes = w.into_inner();
        let width_at = 4 + 1 + 2 * DESCRIPTOR_SIZE + 4;
        bytes[width_at] = 3;
        assert!(read_mesh(&mut ByteReader::new(&bytes)).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_purged_mesh_not_written() {
        let mut quad = Mesh::create_quad(0.0, 0.0, 1.0, 1.0).unwrap();
        quad.purge();
        assert!(write_mesh(&mut ByteWriter::new(), &quad).is_err());
    }

    #[test]
    fn test_huge_vertex_count_with_short_body() {
        let element = VertexElement::new(VertexFormat::Vec4, VertexSemantic::Position);
        let mut w = ByteWriter::new();
        w.u32(u32::MAX);
        w.u8(1);
        w.bytes(&element.to_descriptor());
        w.u32(3);
        w.u8(1);
        w.i32(-1);
        w.bytes(&[0; 16]);
        let bytes = w.into_inner();

        let err = read_mesh(&mut ByteReader::new(&bytes)).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_huge_index_count_with_short_body() {
        let quad = Mesh::create_quad(0.0, 0.0, 1.0, 1.0).unwrap();
        let mut w = ByteWriter::new();
        write_mesh(&mut w, &quad).unwrap();
        let mut bytes = w.into_inner();
        let count_at = 4 + 1 + 2 * DESCRIPTOR_SIZE;
        bytes[count_at..count_at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[count_at + 4] = 4;

        let err = read_mesh(&mut ByteReader::new(&bytes)).unwrap_err();
        assert!(err.is_corrupt());
    }
}
