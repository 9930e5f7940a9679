//! Fire
//!
//! `life` is the remaining burn time (counted down by the generic
//! physics). Each tick fire looks at two random neighbours and may set
//! flammable ones alight, pushing a little pressure into the air.

use crate::core::parts::Particle;
use crate::elements::{ElementProps, EL_FIRE};
use crate::reactions::react;
use crate::spatial::fields::{Field, FieldGrid};

use super::{ElementBehavior, PixelDirectives, UpdateContext, UpdateOutcome};

/// Pressure released when something catches fire
const IGNITION_PRESSURE: f32 = 0.25;
const IGNITION_ROLLS: usize = 2;

pub struct FireBehavior;

impl FireBehavior {
    fn ignite(ctx: &mut UpdateContext, victim: usize) {
        let fire = ctx.content.element(EL_FIRE);
        let (life, temp) = (fire.default_life, fire.default_temp);
        if !ctx.change_type(victim, EL_FIRE) {
            return;
        }
        let extra = ctx.rng.below(50) as i32;
        let (vx, vy) = {
            let p = ctx.parts.part_mut(victim);
            p.life = life + extra;
            p.temp = p.temp.max(temp);
            p.pixel()
        };
        let (cx, cy) = FieldGrid::cell_of(vx, vy);
        ctx.fields.add(Field::Pressure, cx, cy, IGNITION_PRESSURE);
    }
}

impl ElementBehavior for FireBehavior {
    fn update(&self, ctx: &mut UpdateContext) -> UpdateOutcome {
        let (x, y) = ctx.pixel();
        for _ in 0..IGNITION_ROLLS {
            let (dx, dy) = ctx.rng.neighbour();
            let Some(o) = ctx.plain_at(x + dx, y + dy) else {
                continue;
            };
            let flammable = ctx.content.element(ctx.parts.part(o).element).flammable as u32;
            if flammable > 0 && ctx.rng.below(1000) < flammable {
                Self::ignite(ctx, o);
            }
        }
        react(ctx)
    }

    fn graphics(&self, p: &Particle, props: &ElementProps) -> PixelDirectives {
        // fades toward dark red as it burns out
        let heat = (p.life.clamp(0, 120) as u32 * 255) / 120;
        let base = PixelDirectives::base(p, props).color;
        let g = ((base >> 8) & 0xFF) * heat / 255;
        let color = (base & 0xFFFF_00FF) | (g << 8);
        PixelDirectives { color, glow: true }
    }
}
