//! Per-slot update dispatch
//!
//! Slots are visited in ascending index order, re-reading the high-water
//! mark every iteration: particles spawned above the current slot this tick
//! are updated this tick, particles spawned below it are not. Callback
//! writes are visible to every later slot.

use crate::core::parts::{FLAG_MOVABLE, FLAG_SKIPMOVE};
use crate::elements::{
    clamp_temp, ElementProps, EL_NONE, PROP_LIFE_DEC, PROP_LIFE_KILL, PROP_LIFE_KILL_DEC,
};
use crate::physics::{accelerate, drag_air};
use crate::spatial::fields::{Field, FieldGrid};
use crate::systems::behaviors::{UpdateContext, UpdateOutcome};
use crate::systems::movement::Resolver;
use crate::temperature::{conduct, couple_air, transition_target};

use super::Simulation;

#[derive(Clone, Copy, Debug, Default)]
pub(super) struct DispatchCounts {
    pub(super) processed: u32,
    pub(super) moved: u32,
    pub(super) changed: u32,
}

/// Borrow the simulation as a callback context for `slot`
pub(super) fn context(sim: &mut Simulation, slot: usize) -> UpdateContext<'_> {
    UpdateContext {
        parts: &mut sim.parts,
        fields: &mut sim.fields,
        content: &*sim.content,
        rules: &sim.rules,
        behaviors: &sim.behaviors,
        rng: &mut sim.rng,
        config: &sim.config,
        frame: sim.frame,
        slot,
        spawn_failures: &mut sim.spawn_failures,
    }
}

pub(super) fn dispatch(sim: &mut Simulation) -> DispatchCounts {
    let mut counts = DispatchCounts::default();
    let mut ctx = context(sim, 0);

    let mut slot = 0;
    while slot < ctx.parts.high_water() {
        if ctx.parts.is_alive(slot) {
            ctx.slot = slot;
            counts.processed += 1;
            update_slot(&mut ctx, &mut counts);
        }
        slot += 1;
    }
    counts
}

fn update_slot(ctx: &mut UpdateContext, counts: &mut DispatchCounts) {
    let content = ctx.content;
    let slot = ctx.slot;
    let mut props = content.element(ctx.part().element);

    if !age(ctx, props) {
        return;
    }

    let (x, y) = ctx.pixel();
    let (cx, cy) = FieldGrid::cell_of(x, y);

    // walls
    if !ctx.fields.wall_allows(cx, cy, props.category_bit()) {
        ctx.kill(slot);
        return;
    }
    if ctx.fields.wall_props_at(cx, cy).detector {
        ctx.fields.power(cx, cy);
    }

    // air coupling and velocity
    let p = *ctx.part();
    drag_air(ctx.fields, (cx, cy), &p, props);
    let air = (ctx.fields.get(Field::VelocityX, cx, cy), ctx.fields.get(Field::VelocityY, cx, cy));
    let gravity = ctx.config.gravity.accel(props.gravity);
    accelerate(ctx.parts.part_mut(slot), props, air, gravity, ctx.rng);

    // heat
    if ctx.config.heat && !ctx.legacy_heat() {
        conduct(ctx.parts, content, ctx.rng, slot);
        if ctx.config.ambient_heat {
            couple_air(ctx.parts, ctx.fields, props, slot);
        }
    }

    // transitions
    let temp = clamp_temp(ctx.part().temp);
    ctx.part_mut().temp = temp;
    let pressure = ctx.fields.get(Field::Pressure, cx, cy);
    if let Some(to) = transition_target(props, temp, pressure, ctx.config.heat) {
        if to == EL_NONE {
            ctx.kill(slot);
            return;
        }
        if ctx.change_type(slot, to) {
            counts.changed += 1;
        }
        if !ctx.parts.is_alive(slot) {
            return;
        }
        props = content.element(ctx.part().element);
    }

    {
        let p = ctx.part_mut();
        p.pavg[0] = p.pavg[1];
        p.pavg[1] = pressure;
    }

    // movement
    let flags = ctx.part().flags;
    if flags & FLAG_MOVABLE != 0 {
        if flags & FLAG_SKIPMOVE != 0 {
            ctx.part_mut().flags &= !FLAG_SKIPMOVE;
        } else {
            let gravity = ctx.config.gravity.accel(props.gravity);
            let path = Resolver::new(ctx.parts, ctx.fields, content, ctx.rules).integrate(slot, gravity, ctx.rng);
            if path.moved {
                counts.moved += 1;
            }
        }
    }
    if !ctx.parts.is_alive(slot) {
        return;
    }

    // element callback for whatever the slot is now
    let behaviors = ctx.behaviors;
    let element = ctx.part().element;
    if behaviors.get(element).update(ctx) == UpdateOutcome::Changed {
        counts.changed += 1;
    }
}

/// Pull every live particle back into `[MIN_TEMP, MAX_TEMP]`. Callbacks may
/// heat any particle, including ones the loop already passed.
pub(super) fn clamp_temperatures(sim: &mut Simulation) {
    for slot in 0..sim.parts.high_water() {
        if sim.parts.is_alive(slot) {
            let p = sim.parts.part_mut(slot);
            p.temp = clamp_temp(p.temp);
        }
    }
}

/// Life countdown. Returns false when the particle died of it.
fn age(ctx: &mut UpdateContext, props: &ElementProps) -> bool {
    let slot = ctx.slot;
    let p = ctx.part_mut();
    if p.life > 0 && props.has(PROP_LIFE_DEC) {
        p.life -= 1;
        if p.life <= 0 && props.has(PROP_LIFE_KILL_DEC | PROP_LIFE_KILL) {
            ctx.kill(slot);
            return false;
        }
    } else if p.life <= 0 && props.has(PROP_LIFE_KILL) {
        ctx.kill(slot);
        return false;
    }
    true
}
