use log::debug;

use crate::core::config::{AirMode, GravityMode, SimConfig};
use crate::core::random::SimRng;

use super::Simulation;

pub(super) fn set_config(sim: &mut Simulation, config: SimConfig) {
    if config.seed != sim.config.seed {
        sim.rng = SimRng::new(config.seed);
    }
    if config.ambient_temp != sim.config.ambient_temp {
        sim.fields.ambient.fill(config.ambient_temp);
    }
    sim.config = config;
    debug!("config set: {}", sim.config.to_json());
}

pub(super) fn set_gravity(sim: &mut Simulation, gravity: GravityMode) {
    sim.config.gravity = gravity;
}

pub(super) fn set_air_mode(sim: &mut Simulation, mode: AirMode) {
    sim.config.air_mode = mode;
}

pub(super) fn set_ambient_heat(sim: &mut Simulation, enabled: bool) {
    sim.config.ambient_heat = enabled;
}

/// New baseline for the air heat field. Current air heat is left alone and
/// relaxes towards it from the edges.
pub(super) fn set_ambient_temperature(sim: &mut Simulation, temp: f32) {
    sim.config.ambient_temp = temp;
    sim.fields.ambient.fill(temp);
}

pub(super) fn set_heat(sim: &mut Simulation, enabled: bool) {
    sim.config.heat = enabled;
}

pub(super) fn set_legacy_heat(sim: &mut Simulation, enabled: bool) {
    sim.config.legacy_heat = enabled;
}

pub(super) fn enable_perf_metrics(sim: &mut Simulation, enabled: bool) {
    sim.perf_enabled = enabled;
    if !enabled {
        sim.perf_stats.reset();
    }
}
