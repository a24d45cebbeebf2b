use roxmltree::Node;

use super::{elements, float_attr, parse_color, parse_vec3};
use crate::error::AssetResult;
use crate::particle::ParticleSystem;
use crate::processor::ImportContext;

pub(super) fn import(ctx: &mut ImportContext<'_>, root: Node<'_, '_>) -> AssetResult<ParticleSystem> {
    let mut system = ParticleSystem::new();
    match parse_into(ctx, root, &mut system) {
        Ok(()) => Ok(system),
        Err(e) => {
            ctx.discard(system);
            Err(e)
        }
    }
}

fn parse_into(
    ctx: &mut ImportContext<'_>,
    root: Node<'_, '_>,
    system: &mut ParticleSystem,
) -> AssetResult<()> {
    for element in elements(root) {
        let value = element.attribute("Value");
        match element.tag_name().name() {
            "Position" => {
                if let Some(position) = value.and_then(parse_vec3) {
                    system.params.position = position;
                }
            }
            "Diffuse" => {
                if let Some(diffuse) = value.and_then(parse_color) {
                    system.params.diffuse = diffuse;
                }
            }
            "Alpha" => system.params.alpha = float_attr(element, "Value", 1.0),
            "Speed" => system.params.speed = float_attr(element, "Value", 1.0),
            "Spread" => system.params.spread = float_attr(element, "Value", 1.0),
            "Shape" => system.params.shape = float_attr(element, "Value", 1.0),
            "Size" => system.params.size = float_attr(element, "Value", 1.0),
            "Gravity" => system.params.gravity = float_attr(element, "Value", 0.0),
            "SystemHeight" => system.params.system_height = float_attr(element, "Value", 1.0),
            "SystemShape" => system.params.system_shape = float_attr(element, "Value", 1.0),
            "FadeInTime" => system.params.fade_in = float_attr(element, "Value", 1.0),
            "FadeOutTime" => system.params.fade_out = float_attr(element, "Value", 1.0),
            "Quantity" => {
                match value.and_then(|v| v.trim().parse::<f32>().ok()) {
                    Some(quantity) => system.create(quantity.clamp(0.0, u16::MAX as f32) as u16)?,
                    None => tracing::warn!("Quantity {:?} is not a number", value.unwrap_or("")),
                }
            }
            "Texture" => {
                let path = value.unwrap_or("");
                let texture = match ctx.load_texture(path) {
                    Ok(texture) => Some(texture),
                    Err(e) => {
                        tracing::warn!("Skipping particle texture '{}': {}", path, e);
                        None
                    }
                };
                if let Some(previous) = system.replace_texture(texture) {
                    ctx.release(previous);
                }
            }
            other => tracing::warn!("Skipping unknown particle element <{}>", other),
        }
    }
    Ok(())
}
