//! Simulation - the engine context object
//!
//! Owns every array the tick touches: the particle store (with its
//! occupancy index), the coarse field grid, the move table, the behavior
//! table and the RNG. Element callbacks never see `Simulation` itself; the
//! dispatch loop lends them an `UpdateContext` over the same data.
//!
//! `&mut Simulation` is the only synchronisation boundary: hosts read the
//! arrays between ticks, never during one.

use std::sync::Arc;

use crate::core::config::SimConfig;
use crate::core::error::{CreateError, EngineError};
use crate::core::parts::ParticleStore;
use crate::core::random::SimRng;
use crate::domain::content::ContentRegistry;
use crate::elements::{BehaviorKind, ElementId, ElementProps};
use crate::reactions::Reaction;
use crate::spatial::fields::FieldGrid;
use crate::systems::air::AirSolver;
use crate::systems::behaviors::{BehaviorRegistry, ElementBehavior};
use crate::systems::movement::{MoveHook, MoveRule, MoveRules};
use crate::domain::walls::WallId;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "step/dispatch.rs"]
mod dispatch;
#[path = "step/step.rs"]
mod step;
#[path = "commands/commands.rs"]
mod commands;
#[path = "render/render_extract.rs"]
mod render_extract;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::{AbiLayout, World};
pub use perf_stats::PerfStats;

use perf_timer::PerfTimer;

pub struct Simulation {
    content: Arc<ContentRegistry>,
    parts: ParticleStore,
    fields: FieldGrid,
    rules: MoveRules,
    behaviors: BehaviorRegistry,
    air: AirSolver,
    rng: SimRng,
    config: SimConfig,

    width: u32,
    height: u32,
    frame: u64,
    /// Spawns dropped this tick because the store was full
    spawn_failures: u32,

    /// ARGB per fine pixel, filled by `render`
    colors: Vec<u32>,

    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl Simulation {
    /// Built-in content, default settings, one slot per pixel
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        Self::with_config(width, height, (width * height) as usize, SimConfig::default())
    }

    pub fn with_config(
        width: u32,
        height: u32,
        capacity: usize,
        config: SimConfig,
    ) -> Result<Self, EngineError> {
        init::create_simulation(width, height, capacity, config, ContentRegistry::from_builtin())
    }

    pub fn with_content(
        width: u32,
        height: u32,
        capacity: usize,
        config: SimConfig,
        content: ContentRegistry,
    ) -> Result<Self, EngineError> {
        init::create_simulation(width, height, capacity, config, content)
    }

    pub fn width(&self) -> u32 { self.width }

    pub fn height(&self) -> u32 { self.height }

    pub fn frame(&self) -> u64 { self.frame }

    pub fn particle_count(&self) -> usize { self.parts.live_count() }

    pub fn capacity(&self) -> usize { self.parts.capacity() }

    pub fn config(&self) -> &SimConfig { &self.config }

    pub fn content(&self) -> &ContentRegistry { &self.content }

    pub fn parts(&self) -> &ParticleStore { &self.parts }

    pub fn fields(&self) -> &FieldGrid { &self.fields }

    /// Direct field access between ticks (pressure brushes, heat guns)
    pub fn fields_mut(&mut self) -> &mut FieldGrid { &mut self.fields }

    pub fn rng_state(&self) -> u32 { self.rng.state() }

    // === Settings ===

    pub fn set_config(&mut self, config: SimConfig) {
        settings::set_config(self, config);
    }

    pub fn set_gravity(&mut self, gravity: crate::core::config::GravityMode) {
        settings::set_gravity(self, gravity);
    }

    pub fn set_air_mode(&mut self, mode: crate::core::config::AirMode) {
        settings::set_air_mode(self, mode);
    }

    pub fn set_ambient_heat(&mut self, enabled: bool) {
        settings::set_ambient_heat(self, enabled);
    }

    pub fn set_ambient_temperature(&mut self, temp: f32) {
        settings::set_ambient_temperature(self, temp);
    }

    pub fn set_heat(&mut self, enabled: bool) {
        settings::set_heat(self, enabled);
    }

    pub fn set_legacy_heat(&mut self, enabled: bool) {
        settings::set_legacy_heat(self, enabled);
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last step perf snapshot (zeros when perf disabled)
    pub fn perf_stats(&self) -> PerfStats {
        self.perf_stats.clone()
    }

    // === Commands ===

    /// Spawn `element` at pixel `(x, y)` with its descriptor defaults
    pub fn create(&mut self, x: i32, y: i32, element: ElementId) -> Result<usize, CreateError> {
        commands::create(self, x, y, element)
    }

    pub fn kill(&mut self, slot: usize) {
        commands::kill(self, slot);
    }

    /// Kill everything registered at pixel `(x, y)`. Returns how many died.
    pub fn kill_at(&mut self, x: i32, y: i32) -> usize {
        commands::kill_at(self, x, y)
    }

    /// Fill a disc; returns the number of particles created
    pub fn create_in_radius(&mut self, cx: i32, cy: i32, radius: i32, element: ElementId) -> usize {
        commands::create_in_radius(self, cx, cy, radius, element)
    }

    pub fn kill_in_radius(&mut self, cx: i32, cy: i32, radius: i32) -> usize {
        commands::kill_in_radius(self, cx, cy, radius)
    }

    /// Remove every particle; fields and walls stay
    pub fn clear(&mut self) {
        commands::clear(self);
    }

    /// Particles, fields, walls and frame counter back to their initial state
    pub fn reset(&mut self) {
        commands::reset(self);
    }

    /// Pack live particles into the lowest slots. Returns old slot -> new slot.
    pub fn compact(&mut self) -> Vec<Option<usize>> {
        commands::compact(self)
    }

    /// Place a wall on coarse cell `(cx, cy)`; particles it does not admit die
    pub fn set_wall(&mut self, cx: u32, cy: u32, wall: WallId) {
        commands::set_wall(self, cx, cy, wall);
    }

    pub fn set_fan_velocity(&mut self, cx: u32, cy: u32, fvx: f32, fvy: f32) {
        commands::set_fan_velocity(self, cx, cy, fvx, fvy);
    }

    // === Content ===

    pub fn register_element(
        &mut self,
        key: &str,
        props: ElementProps,
        behavior: BehaviorKind,
    ) -> Result<ElementId, EngineError> {
        commands::register_element(self, key, props, behavior)
    }

    /// Swap in a custom behavior for one element
    pub fn set_behavior(&mut self, id: ElementId, behavior: Arc<dyn ElementBehavior>) {
        self.behaviors.register(id, behavior);
    }

    pub fn set_reaction(&mut self, aggressor: ElementId, victim: ElementId, reaction: Reaction) {
        commands::set_reaction(self, aggressor, victim, reaction);
    }

    pub fn set_move_rule(&mut self, mover: ElementId, occupant: ElementId, rule: MoveRule) {
        self.rules.set_rule(mover, occupant, rule);
    }

    pub fn set_move_hook(&mut self, mover: ElementId, occupant: ElementId, hook: MoveHook) {
        self.rules.set_hook(mover, occupant, hook);
    }

    /// Replace all content; particles are cleared since ids may change meaning
    pub fn load_content_bundle_json(&mut self, json: &str) -> Result<(), EngineError> {
        commands::load_content_bundle_json(self, json)
    }

    pub fn content_manifest_json(&self) -> String {
        self.content.manifest_json()
    }

    // === Tick ===

    /// Advance one tick
    pub fn step(&mut self) {
        step::step(self);
    }

    // === Read-back ===

    /// Redraw the ARGB frame buffer from walls and particle graphics
    pub fn render(&mut self) -> &[u32] {
        render_extract::render(self);
        &self.colors
    }

    pub fn colors(&self) -> &[u32] {
        &self.colors
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
