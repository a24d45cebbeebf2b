//! Wavefront OBJ scenes through `tobj`.
//!
//! Every object becomes one triangulated mesh of
//! [`VertexPositionNormalTexture`]. Materials come from the `.mtl` libraries
//! next to the object file; their texture maps load through the cache.

use std::io::Cursor;
use std::path::Path;

use strata_core::alloc::HashMap;
use strata_core::graphics::{Vertex, VertexPositionNormalTexture};
use strata_core::math::Color;
use strata_core::profiling::profile_function;

use crate::asset::Asset;
use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::error::{AssetError, AssetResult};
use crate::material::{Channel, Material};
use crate::mesh::Mesh;
use crate::model::Model;
use crate::processor::{ImportContext, Processor};
use crate::source::SourceFile;

#[derive(Debug, Clone, Copy, Default)]
pub struct ObjProcessor;

impl Processor for ObjProcessor {
    fn name(&self) -> &'static str {
        "obj"
    }

    fn extensions(&self) -> &[&'static str] {
        &["obj"]
    }

    fn import(&self, ctx: &mut ImportContext<'_>, file: &SourceFile) -> AssetResult<Asset> {
        profile_function!();
        let (objects, materials) = {
            let ctx = &*ctx;
            tobj::load_obj_buf(
                &mut Cursor::new(&file.bytes),
                &tobj::LoadOptions {
                    triangulate: true,
                    single_index: true,
                    ..Default::default()
                },
                |mtl: &Path| {
                    let path = ctx.sibling(&mtl.to_string_lossy());
                    match ctx.read(&path) {
                        Ok(bytes) => tobj::load_mtl_buf(&mut Cursor::new(bytes)),
                        Err(_) => Err(tobj::LoadError::OpenFileFailed),
                    }
                },
            )
            .map_err(|e| AssetError::invalid(format!("unable to parse OBJ file: {}", e)))?
        };

        if objects.is_empty() {
            return Err(AssetError::invalid("OBJ file has no objects"));
        }
        let materials = materials.unwrap_or_else(|e| {
            tracing::warn!("Ignoring materials of '{}': {}", ctx.source(), e);
            Vec::new()
        });

        let mut model = Model::new();
        for object in &objects {
            match mesh(object) {
                Ok(mesh) => model.meshes.push(mesh),
                Err(e) => {
                    tracing::warn!("Skipping object '{}': {}", object.name, e);
                }
            }
        }

        let mut textures = HashMap::new();
        for material in &materials {
            let converted = convert_material(ctx, &mut model, &mut textures, material);
            model.materials.push(converted);
        }

        Ok(Asset::Model(model))
    }
}

fn mesh(object: &tobj::Model) -> AssetResult<Mesh> {
    let source = &object.mesh;
    let count = source.positions.len() / 3;

    let vertices: Vec<VertexPositionNormalTexture> = (0..count)
        .map(|i| {
            let p = &source.positions[i * 3..i * 3 + 3];
            let normal = source
                .normals
                .get(i * 3..i * 3 + 3)
                .map_or([0.0; 3], |n| [n[0], n[1], n[2]]);
            let texture = source
                .texcoords
                .get(i * 2..i * 2 + 2)
                .map_or([0.0; 2], |t| [t[0], t[1]]);
            VertexPositionNormalTexture {
                position: [p[0], p[1], p[2], 1.0],
                normal,
                texture,
            }
        })
        .collect();

    let vertices = VertexBuffer::from_bytes(
        VertexPositionNormalTexture::declaration(),
        bytemuck::cast_slice(&vertices[..]).to_vec(),
    )?;
    let indices = if count <= u16::MAX as usize + 1 {
        let narrow: Vec<u16> = source.indices.iter().map(|&i| i as u16).collect();
        IndexBuffer::from_u16(&narrow)?
    } else {
        IndexBuffer::from_u32(&source.indices)?
    };

    let mut mesh = Mesh::new(vertices, indices).with_name(object.name.clone());
    mesh.material = source.material_id.map_or(-1, |id| id as i32);
    Ok(mesh)
}

fn convert_material(
    ctx: &mut ImportContext<'_>,
    model: &mut Model,
    textures: &mut HashMap<String, i32>,
    material: &tobj::Material,
) -> Material {
    let rgb = |c: Option<[f32; 3]>, fallback: Color| {
        c.map_or(fallback, |[r, g, b]| Color::new(r, g, b, 1.0))
    };
    let mut texture = |name: &Option<String>| -> i32 {
        let Some(name) = name.as_deref().filter(|n| !n.is_empty()) else {
            return -1;
        };
        let path = ctx.sibling(name);
        if let Some(&index) = textures.get(&path) {
            return index;
        }
        match ctx.load_texture(&path) {
            Ok(handle) => {
                let index = model.push_texture(handle);
                textures.insert(path, index);
                index
            }
            Err(e) => {
                tracing::warn!("Skipping texture '{}': {}", path, e);
                -1
            }
        }
    };

    let defaults = Material::default();
    Material {
        ambient: Channel {
            color: rgb(material.ambient, defaults.ambient.color),
            texture: texture(&material.ambient_texture),
        },
        diffuse: Channel {
            color: rgb(material.diffuse, defaults.diffuse.color),
            texture: texture(&material.diffuse_texture),
        },
        specular: Channel {
            color: rgb(material.specular, defaults.specular.color),
            texture: texture(&material.specular_texture),
        },
        emissive: defaults.emissive,
        alpha: material.dissolve.unwrap_or(defaults.alpha),
        shininess: material.shininess.unwrap_or(defaults.shininess),
        normal: texture(&material.normal_texture),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(positions: Vec<f32>, indices: Vec<u32>) -> tobj::Model {
        tobj::Model::new(
            tobj::Mesh {
                positions,
                indices,
                material_id: Some(0),
                ..Default::default()
            },
            "Crate".to_string(),
        )
    }

    #[test]
    fn test_mesh_layout() {
        let mesh = mesh(&object(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2]))
            .unwrap();
        assert_eq!(mesh.name, "Crate");
        assert_eq!(mesh.material, 0);
        assert_eq!(mesh.vertices().vertex_count(), 3);
        assert_eq!(mesh.vertices().declaration().stride(), 36);
        assert_eq!(mesh.indices().index_count(), 3);
        let second: VertexPositionNormalTexture =
            bytemuck::pod_read_unaligned(&mesh.vertices().data()[36..72]);
        assert_eq!(second.position, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_empty_object_rejected() {
        assert!(mesh(&object(Vec::new(), Vec::new())).is_err());
    }
}
