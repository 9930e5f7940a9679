//! Energy particles: photons and sparks
//!
//! Both share pixels with plain particles. Photons fly straight until their
//! life runs out; sparks ride conductors and spread to touching ones.

use std::f32::consts::FRAC_PI_4;

use crate::core::parts::{Particle, SlotHint};
use crate::domain::walls::wall_props;
use crate::elements::{ElementId, ElementProps, PROP_CONDUCTS};
use crate::spatial::fields::FieldGrid;
use crate::spatial::occupancy::Category;

use super::{ElementBehavior, PixelDirectives, UpdateContext, UpdateOutcome, NEIGHBOURS};

/// Initial photon speed in pixels per tick
pub const PHOTON_SPEED: f32 = 3.0;
/// Heat a photon hands to the plain particle it passes through
const PHOTON_HEATING: f32 = 0.5;
/// Ticks a conductor rests after carrying a spark
const CONDUCTOR_REST: i32 = 8;

pub struct PhotonBehavior;

impl ElementBehavior for PhotonBehavior {
    fn create(&self, ctx: &mut UpdateContext) {
        let p = ctx.part();
        if p.vx != 0.0 || p.vy != 0.0 {
            return;
        }
        let a = ctx.rng.below(8) as f32 * FRAC_PI_4;
        let p = ctx.part_mut();
        p.vx = PHOTON_SPEED * a.cos();
        p.vy = PHOTON_SPEED * a.sin();
    }

    fn update(&self, ctx: &mut UpdateContext) -> UpdateOutcome {
        let p = *ctx.part();
        if p.vx.abs() < 0.01 && p.vy.abs() < 0.01 {
            let slot = ctx.slot;
            ctx.kill(slot);
            return UpdateOutcome::Changed;
        }
        let (x, y) = p.pixel();
        if let Some(host) = ctx.plain_at(x, y) {
            let conducts = ctx.content.element(ctx.parts.part(host).element).heat_conduct > 0;
            if conducts {
                ctx.parts.part_mut(host).temp += PHOTON_HEATING;
            }
        }
        UpdateOutcome::Unchanged
    }

    fn graphics(&self, p: &Particle, props: &ElementProps) -> PixelDirectives {
        PixelDirectives { glow: true, ..PixelDirectives::base(p, props) }
    }
}

/// `ctype` holds the conductor the spark was born on; `tmp` is set once the
/// spark has spread.
pub struct SparkBehavior;

impl SparkBehavior {
    fn host(ctx: &UpdateContext) -> Option<usize> {
        let (x, y) = ctx.pixel();
        ctx.plain_at(x, y)
            .filter(|&o| ctx.content.element(ctx.parts.part(o).element).has(PROP_CONDUCTS))
    }

    fn rested(ctx: &UpdateContext, conductor: usize) -> bool {
        ctx.frame as i64 >= ctx.parts.part(conductor).tmp2 as i64
    }
}

impl ElementBehavior for SparkBehavior {
    fn create(&self, ctx: &mut UpdateContext) {
        if let Some(host) = Self::host(ctx) {
            let element = ctx.parts.part(host).element;
            ctx.part_mut().ctype = element as i32;
        }
    }

    fn update(&self, ctx: &mut UpdateContext) -> UpdateOutcome {
        let Some(host) = Self::host(ctx) else {
            let slot = ctx.slot;
            ctx.kill(slot);
            return UpdateOutcome::Changed;
        };
        if ctx.part().tmp != 0 {
            return UpdateOutcome::Unchanged;
        }
        ctx.part_mut().tmp = 1;
        let rest_until = (ctx.frame as i64 + CONDUCTOR_REST as i64).min(i32::MAX as i64) as i32;
        ctx.parts.part_mut(host).tmp2 = rest_until;

        let spark: ElementId = ctx.part().element;
        let (x, y) = ctx.pixel();
        for (dx, dy) in NEIGHBOURS {
            let (nx, ny) = (x + dx, y + dy);
            if !ctx.parts.in_bounds(nx, ny) {
                continue;
            }
            let (cx, cy) = FieldGrid::cell_of(nx, ny);
            if wall_props(ctx.fields.wall_at(cx, cy)).conductive {
                ctx.fields.power(cx, cy);
            }
            let Some(o) = ctx.plain_at(nx, ny) else {
                continue;
            };
            let conducts = ctx.content.element(ctx.parts.part(o).element).has(PROP_CONDUCTS);
            let sparked = ctx
                .parts
                .query(nx, ny, Category::Energy)
                .any(|e| ctx.parts.part(e).element == spark);
            if conducts && !sparked && Self::rested(ctx, o) {
                // store exhaustion just stops the spread
                let _ = ctx.create(SlotHint::Auto, nx, ny, spark);
            }
        }
        UpdateOutcome::Unchanged
    }

    fn graphics(&self, p: &Particle, props: &ElementProps) -> PixelDirectives {
        PixelDirectives { glow: true, ..PixelDirectives::base(p, props) }
    }
}
