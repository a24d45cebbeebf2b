use strata_core::math::{Color, Vec3};

use crate::error::AssetResult;
use crate::particle::{ParticleParams, ParticleSystem};
use crate::processor::{ExportContext, ImportContext};
use crate::processors::bytes::{ByteReader, ByteWriter};

/// Parameter record: quantity, position, diffuse, then ten scalars.
pub(super) const RECORD_SIZE: usize = 2 + 3 * 4 + 4 * 4 + 10 * 4;

pub(super) fn decode(
    ctx: &mut ImportContext<'_>,
    r: &mut ByteReader<'_>,
) -> AssetResult<ParticleSystem> {
    let quantity = r.u16("particle system header")?;
    let params = read_params(r)?;
    let texture = r.short_string("texture filename")?;

    let mut system = ParticleSystem::new();
    system.params = params;
    system.create(quantity)?;
    if !texture.is_empty() {
        let handle = ctx.load_texture(&texture)?;
        system.replace_texture(Some(handle));
    }
    Ok(system)
}

/// An unmanaged texture is written as no texture.
pub(super) fn encode(
    ctx: &ExportContext<'_>,
    w: &mut ByteWriter,
    system: &ParticleSystem,
) -> AssetResult<()> {
    w.u16(system.quantity());
    write_params(w, &system.params);

    let source = match system.texture() {
        Some(texture) => match ctx.managed_source(texture) {
            Some(source) => source,
            None => {
                tracing::warn!("Cannot export unmanaged texture");
                ""
            }
        },
        None => "",
    };
    w.short_string(source)
}

fn read_params(r: &mut ByteReader<'_>) -> AssetResult<ParticleParams> {
    let mut f = || r.f32("particle system header");
    Ok(ParticleParams {
        position: Vec3::new(f()?, f()?, f()?),
        diffuse: Color::new(f()?, f()?, f()?, f()?),
        alpha: f()?,
        speed: f()?,
        spread: f()?,
        shape: f()?,
        size: f()?,
        gravity: f()?,
        system_height: f()?,
        system_shape: f()?,
        fade_in: f()?,
        fade_out: f()?,
    })
}

fn write_params(w: &mut ByteWriter, params: &ParticleParams) {
    for v in params.position.to_array() {
        w.f32(v);
    }
    for v in params.diffuse.to_array() {
        w.f32(v);
    }
    for v in [
        params.alpha,
        params.speed,
        params.spread,
        params.shape,
        params.size,
        params.gravity,
        params.system_height,
        params.system_shape,
        params.fade_in,
        params.fade_out,
    ] {
        w.f32(v);
    }
}
