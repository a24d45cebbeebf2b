use roxmltree::Node;
use strata_core::alloc::HashMap;

use super::{elements, float_attr, parse_color};
use crate::handle::Handle;
use crate::material::{Channel, Material};
use crate::mesh::Mesh;
use crate::model::Model;
use crate::processor::ImportContext;
use crate::texture::Texture;

/// Meshes, materials and texture references taken from one sub-model.
///
/// Each texture handle is one reference owned by the part.
#[derive(Default)]
struct Part {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    textures: Vec<Handle<Texture>>,
}

pub(super) fn import(ctx: &mut ImportContext<'_>, root: Node<'_, '_>) -> Model {
    let mut model = Model::new();

    for element in elements(root) {
        let tag = element.tag_name().name();
        if !matches!(tag, "Reference" | "Physics" | "Animation") {
            tracing::warn!("Skipping unknown model element <{}>", tag);
            continue;
        }
        let Some(file) = element.attribute("File") else {
            tracing::warn!("<{}> has no File attribute", tag);
            continue;
        };
        let path = ctx.sibling(file);
        let handle = match ctx.load_model(&path) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Skipping <{}> '{}': {}", tag, path, e);
                continue;
            }
        };

        match tag {
            "Reference" => {
                let part = reference(ctx, handle, element);
                merge(&mut model, part);
            }
            "Physics" => {
                let physics = ctx.get(handle).and_then(|m| m.physics_mesh().cloned());
                if physics.is_none() {
                    tracing::warn!("'{}' has no physics mesh", path);
                }
                model.set_physics_mesh(physics);
            }
            _ => tracing::warn!("Animation in '{}' is not supported, skipping", path),
        }

        ctx.release(handle);
    }

    model
}

/// Copy the sub-model's contents. Child elements, when present, replace its
/// textures and materials with ones defined in the document.
fn reference(ctx: &mut ImportContext<'_>, handle: Handle<Model>, element: Node<'_, '_>) -> Part {
    let Some(sub) = ctx.get(handle) else {
        return Part::default();
    };
    let mut part = Part {
        meshes: sub.meshes.clone(),
        materials: sub.materials.clone(),
        textures: sub.textures().to_vec(),
    };

    if elements(element).next().is_none() {
        for &texture in &part.textures {
            ctx.retain(texture);
        }
        return part;
    }

    part.textures.clear();
    part.materials.clear();
    for mesh in &mut part.meshes {
        mesh.material = -1;
    }
    apply_overrides(ctx, element, &mut part);
    part
}

fn apply_overrides(ctx: &mut ImportContext<'_>, element: Node<'_, '_>, part: &mut Part) {
    let mut textures: HashMap<&str, i32> = HashMap::new();
    let mut materials: HashMap<&str, i32> = HashMap::new();

    for child in elements(element) {
        match child.tag_name().name() {
            "Texture" => {
                let name = child.attribute("Name").unwrap_or("");
                let Some(file) = child.attribute("File") else {
                    tracing::warn!("Texture '{}' has no File attribute", name);
                    continue;
                };
                match ctx.load_texture(file) {
                    Ok(texture) => {
                        textures.insert(name, part.textures.len() as i32);
                        part.textures.push(texture);
                    }
                    Err(e) => tracing::warn!("Skipping texture '{}': {}", name, e),
                }
            }
            "Material" => {
                let name = child.attribute("Name").unwrap_or("");
                materials.insert(name, part.materials.len() as i32);
                part.materials.push(material(child, &textures));
            }
            "Assign" => {
                let object = child.attribute("Object").unwrap_or("");
                let name = child.attribute("Material").unwrap_or("");
                let index = materials.get(name).copied().unwrap_or_else(|| {
                    tracing::warn!("Material '{}' is not defined", name);
                    -1
                });
                match part.meshes.iter_mut().find(|m| m.name == object) {
                    Some(mesh) => mesh.material = index,
                    None => tracing::warn!("No mesh named '{}'", object),
                }
            }
            other => tracing::warn!("Skipping unknown material element <{}>", other),
        }
    }
}

fn material(element: Node<'_, '_>, textures: &HashMap<&str, i32>) -> Material {
    let texture = |node: Node<'_, '_>| {
        node.attribute("Texture")
            .and_then(|name| textures.get(name).copied())
            .unwrap_or(-1)
    };
    let channel = |node: Node<'_, '_>, channel: &mut Channel| {
        if let Some(color) = node.attribute("Color").and_then(parse_color) {
            channel.color = color;
        }
        channel.texture = texture(node);
    };

    let mut material = Material::default();
    for child in elements(element) {
        match child.tag_name().name() {
            "Ambient" => channel(child, &mut material.ambient),
            "Diffuse" => channel(child, &mut material.diffuse),
            "Specular" => channel(child, &mut material.specular),
            "Emissive" => channel(child, &mut material.emissive),
            "Alpha" => material.alpha = float_attr(child, "Value", 1.0),
            "Shininess" => material.shininess = float_attr(child, "Value", 2.0),
            "Normal" => material.normal = texture(child),
            _ => {}
        }
    }
    material
}

/// Append `part` to `model`, shifting its texture and material indices past
/// what the model already holds.
fn merge(model: &mut Model, part: Part) {
    let texture_base = model.textures().len() as i32;
    let material_base = model.materials.len() as i32;

    for texture in part.textures {
        model.push_texture(texture);
    }
    for mut material in part.materials {
        material.offset_textures(texture_base);
        model.materials.push(material);
    }
    for mut mesh in part.meshes {
        if mesh.material >= 0 {
            mesh.material += material_base;
        }
        model.meshes.push(mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;
    use strata_core::math::Color;

    #[test]
    fn test_material_element() {
        let doc = Document::parse(
            r#"<Material Name="Rock">
                <Diffuse Color="0.5,0.5,0.5,1" Texture="Albedo"/>
                <Specular Color="1,1,1,1"/>
                <Alpha Value="0.75"/>
                <Shininess Value="bad"/>
                <Normal Texture="Bump"/>
            </Material>"#,
        )
        .unwrap();
        let mut textures = HashMap::new();
        textures.insert("Albedo", 0);
        textures.insert("Bump", 1);

        let material = material(doc.root_element(), &textures);
        assert_eq!(material.diffuse.color, Color::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(material.diffuse.texture, 0);
        assert_eq!(material.specular.color, Color::WHITE);
        assert_eq!(material.specular.texture, -1);
        assert_eq!(material.alpha, 0.75);
        assert_eq!(material.shininess, 2.0);
        assert_eq!(material.normal, 1);
        assert_eq!(material.ambient, Channel::new(Color::BLACK));
    }

    #[test]
    fn test_merge_shifts_indices() {
        let mut model = Model::new();
        model.materials.push(Material::default());

        let mut mesh = Mesh::create_quad(0.0, 0.0, 1.0, 1.0).unwrap();
        mesh.material = 0;
        let unassigned = Mesh::create_quad(0.0, 0.0, 1.0, 1.0).unwrap();
        let mut material = Material::default();
        material.diffuse.texture = 0;

        let part = Part {
            meshes: vec![mesh, unassigned],
            materials: vec![material],
            textures: Vec::new(),
        };
        merge(&mut model, part);

        assert_eq!(model.materials.len(), 2);
        assert_eq!(model.meshes[0].material, 1);
        assert_eq!(model.meshes[1].material, -1);
        assert_eq!(model.materials[1].diffuse.texture, 0);
    }
}
