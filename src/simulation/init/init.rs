use std::sync::Arc;

use log::info;

use crate::core::config::SimConfig;
use crate::core::error::EngineError;
use crate::core::parts::ParticleStore;
use crate::core::random::SimRng;
use crate::domain::content::ContentRegistry;
use crate::spatial::fields::FieldGrid;
use crate::systems::air::AirSolver;
use crate::systems::behaviors::BehaviorRegistry;
use crate::systems::movement::MoveRules;

use super::perf_stats::PerfStats;
use super::Simulation;

pub(super) fn create_simulation(
    width: u32,
    height: u32,
    capacity: usize,
    config: SimConfig,
    content: ContentRegistry,
) -> Result<Simulation, EngineError> {
    let mut fields = FieldGrid::new(width, height)?;
    fields.reset(config.ambient_temp);

    let rules = MoveRules::build(&content);
    let behaviors = BehaviorRegistry::for_content(&content);
    let air = AirSolver::new(fields.size());
    let rng = SimRng::new(config.seed);

    info!(
        "simulation {}x{} ({}x{} cells), capacity {}, {} elements",
        width,
        height,
        fields.cells_x(),
        fields.cells_y(),
        capacity,
        content.element_count()
    );

    Ok(Simulation {
        content: Arc::new(content),
        parts: ParticleStore::new(width, height, capacity),
        fields,
        rules,
        behaviors,
        air,
        rng,
        config,
        width,
        height,
        frame: 0,
        spawn_failures: 0,
        colors: vec![0u32; (width * height) as usize],
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    })
}
