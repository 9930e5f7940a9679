use std::sync::Arc;

use log::info;

use crate::core::error::{CreateError, EngineError};
use crate::core::parts::SlotHint;
use crate::domain::content::ContentRegistry;
use crate::domain::walls::WallId;
use crate::elements::{BehaviorKind, ElementId, ElementProps};
use crate::reactions::Reaction;
use crate::spatial::fields::{FieldGrid, CELL};
use crate::spatial::occupancy::Category;
use crate::systems::behaviors::{behavior_for, BehaviorRegistry};

use super::dispatch::context;
use super::Simulation;

pub(super) fn create(sim: &mut Simulation, x: i32, y: i32, element: ElementId) -> Result<usize, CreateError> {
    if !sim.content.is_particle(element) {
        return Err(CreateError::UnknownElement);
    }
    context(sim, 0).create(SlotHint::Auto, x, y, element)
}

pub(super) fn kill(sim: &mut Simulation, slot: usize) {
    if slot < sim.parts.capacity() {
        sim.parts.kill(slot);
    }
}

pub(super) fn kill_at(sim: &mut Simulation, x: i32, y: i32) -> usize {
    if !sim.parts.in_bounds(x, y) {
        return 0;
    }
    let mut n = 0;
    for slot in sim.parts.query(x, y, Category::All) {
        sim.parts.kill(slot);
        n += 1;
    }
    n
}

fn disc(cx: i32, cy: i32, radius: i32) -> impl Iterator<Item = (i32, i32)> {
    let r2 = radius * radius;
    (-radius..=radius).flat_map(move |dy| {
        (-radius..=radius)
            .filter(move |dx| dx * dx + dy * dy <= r2)
            .map(move |dx| (cx + dx, cy + dy))
    })
}

pub(super) fn create_in_radius(sim: &mut Simulation, cx: i32, cy: i32, radius: i32, element: ElementId) -> usize {
    let mut n = 0;
    for (x, y) in disc(cx, cy, radius) {
        match create(sim, x, y, element) {
            Ok(_) => n += 1,
            Err(CreateError::NoCapacity) | Err(CreateError::UnknownElement) => break,
            Err(_) => {}
        }
    }
    n
}

pub(super) fn kill_in_radius(sim: &mut Simulation, cx: i32, cy: i32, radius: i32) -> usize {
    disc(cx, cy, radius).map(|(x, y)| kill_at(sim, x, y)).sum()
}

pub(super) fn clear(sim: &mut Simulation) {
    sim.parts.clear();
    sim.spawn_failures = 0;
}

pub(super) fn reset(sim: &mut Simulation) {
    clear(sim);
    sim.fields.reset(sim.config.ambient_temp);
    sim.rng = crate::core::random::SimRng::new(sim.config.seed);
    sim.frame = 0;
}

pub(super) fn compact(sim: &mut Simulation) -> Vec<Option<usize>> {
    sim.parts.compact()
}

pub(super) fn set_wall(sim: &mut Simulation, cx: u32, cy: u32, wall: WallId) {
    if !sim.fields.in_bounds(cx as i32, cy as i32) {
        return;
    }
    sim.fields.set_wall(cx, cy, wall);

    // evict what the new wall does not admit
    let (x0, y0) = ((cx * CELL) as i32, (cy * CELL) as i32);
    for y in y0..y0 + CELL as i32 {
        for x in x0..x0 + CELL as i32 {
            if !sim.parts.in_bounds(x, y) {
                continue;
            }
            for slot in sim.parts.query(x, y, Category::All) {
                let bit = sim.content.element(sim.parts.part(slot).element).category_bit();
                if !sim.fields.wall_allows(cx, cy, bit) {
                    sim.parts.kill(slot);
                }
            }
        }
    }
}

pub(super) fn set_fan_velocity(sim: &mut Simulation, cx: u32, cy: u32, fvx: f32, fvy: f32) {
    if sim.fields.in_bounds(cx as i32, cy as i32) {
        sim.fields.set_fan_velocity(cx, cy, fvx, fvy);
    }
}

pub(super) fn register_element(
    sim: &mut Simulation,
    key: &str,
    props: ElementProps,
    behavior: BehaviorKind,
) -> Result<ElementId, EngineError> {
    let id = Arc::make_mut(&mut sim.content).register_element(key, props, behavior)?;
    sim.rules.rebuild(&sim.content);
    sim.behaviors.register(id, behavior_for(behavior));
    Ok(id)
}

pub(super) fn set_reaction(sim: &mut Simulation, aggressor: ElementId, victim: ElementId, reaction: Reaction) {
    Arc::make_mut(&mut sim.content).set_reaction(aggressor, victim, reaction);
}

pub(super) fn load_content_bundle_json(sim: &mut Simulation, json: &str) -> Result<(), EngineError> {
    let content = ContentRegistry::from_bundle_json(json)?;
    sim.rules.rebuild(&content);
    sim.behaviors = BehaviorRegistry::for_content(&content);
    sim.content = Arc::new(content);
    clear(sim);
    info!("content replaced, particles cleared");
    Ok(())
}

/// Coarse cell holding fine pixel `(x, y)`, `None` off-grid
pub(super) fn cell_at(fields: &FieldGrid, x: i32, y: i32) -> Option<(u32, u32)> {
    if x < 0 || y < 0 {
        return None;
    }
    let (cx, cy) = FieldGrid::cell_of(x, y);
    fields.in_bounds(cx as i32, cy as i32).then_some((cx, cy))
}
