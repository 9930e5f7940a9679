use log::warn;

use crate::systems::movement::{reset_movement_perf_counters, take_movement_perf_counters};
use crate::temperature::{reset_heat_perf_counters, take_heat_perf_counters};

use super::dispatch::{clamp_temperatures, dispatch, DispatchCounts};
use super::{PerfTimer, Simulation};

/// One tick: walls and electricity, air, air heat, particles, clamping of
/// fields and particle temperatures
pub(super) fn step(sim: &mut Simulation) {
    let perf_on = sim.perf_enabled;
    if perf_on {
        sim.perf_stats.reset();
        reset_movement_perf_counters();
        reset_heat_perf_counters();
    }
    let step_start = if perf_on { Some(PerfTimer::start()) } else { None };
    sim.spawn_failures = 0;

    // walls see last tick's electricity
    sim.fields.refresh_wall_masks();
    sim.fields.decay_emap();

    if perf_on {
        let t0 = PerfTimer::start();
        sim.air.update_air(&mut sim.fields, sim.config.air_mode);
        sim.perf_stats.air_ms = t0.elapsed_ms();
    } else {
        sim.air.update_air(&mut sim.fields, sim.config.air_mode);
    }

    if sim.config.ambient_heat {
        let vertical = sim.config.gravity.is_vertical();
        if perf_on {
            let t0 = PerfTimer::start();
            sim.air.update_air_heat(&mut sim.fields, vertical);
            sim.perf_stats.air_heat_ms = t0.elapsed_ms();
        } else {
            sim.air.update_air_heat(&mut sim.fields, vertical);
        }
    }

    let counts = if perf_on {
        let t0 = PerfTimer::start();
        let counts = dispatch(sim);
        sim.perf_stats.dispatch_ms = t0.elapsed_ms();
        counts
    } else {
        dispatch(sim)
    };

    sim.fields.clamp_fields();
    clamp_temperatures(sim);
    sim.frame += 1;

    if sim.spawn_failures > 0 {
        warn!(
            "particle store full ({} slots): {} spawns dropped on frame {}",
            sim.parts.capacity(),
            sim.spawn_failures,
            sim.frame
        );
    }

    if perf_on {
        record_perf(sim, counts);
        if let Some(start) = step_start {
            sim.perf_stats.step_ms = start.elapsed_ms();
        }
    }
}

fn record_perf(sim: &mut Simulation, counts: DispatchCounts) {
    let stats = &mut sim.perf_stats;
    stats.particles_processed = counts.processed;
    stats.particles_moved = counts.moved;
    stats.type_changes = counts.changed;
    let (steps, collisions) = take_movement_perf_counters();
    stats.path_steps = steps as u32;
    stats.collisions = collisions as u32;
    let (transitions, conductions) = take_heat_perf_counters();
    stats.transitions = transitions as u32;
    stats.conductions = conductions as u32;
    stats.spawn_failures = sim.spawn_failures;
    stats.particle_count = sim.parts.live_count() as u32;
    stats.high_water = sim.parts.high_water() as u32;
    stats.grid_cells = sim.fields.size() as u32;
    // particle records + occupancy words + 9 f32 / 1 u8 field arrays per cell
    stats.memory_bytes = (sim.parts.capacity() * std::mem::size_of::<crate::core::parts::Particle>()
        + (sim.width * sim.height) as usize * 4 * 5
        + sim.fields.size() * (9 * 4 + 4))
        .min(u32::MAX as usize) as u32;
}
