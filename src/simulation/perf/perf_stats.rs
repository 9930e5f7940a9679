use wasm_bindgen::prelude::*;

/// Per-step timings and counters, collected only while perf metrics are on
#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) step_ms: f64,
    pub(super) air_ms: f64,
    pub(super) air_heat_ms: f64,
    pub(super) dispatch_ms: f64,
    pub(super) particles_processed: u32,
    pub(super) particles_moved: u32,
    pub(super) type_changes: u32,
    pub(super) path_steps: u32,
    pub(super) collisions: u32,
    pub(super) transitions: u32,
    pub(super) conductions: u32,
    pub(super) spawn_failures: u32,
    pub(super) particle_count: u32,
    pub(super) high_water: u32,
    pub(super) grid_cells: u32,
    pub(super) memory_bytes: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn air_ms(&self) -> f64 { self.air_ms }
    #[wasm_bindgen(getter)]
    pub fn air_heat_ms(&self) -> f64 { self.air_heat_ms }
    #[wasm_bindgen(getter)]
    pub fn dispatch_ms(&self) -> f64 { self.dispatch_ms }
    #[wasm_bindgen(getter)]
    pub fn particles_processed(&self) -> u32 { self.particles_processed }
    #[wasm_bindgen(getter)]
    pub fn particles_moved(&self) -> u32 { self.particles_moved }
    #[wasm_bindgen(getter)]
    pub fn type_changes(&self) -> u32 { self.type_changes }
    #[wasm_bindgen(getter)]
    pub fn path_steps(&self) -> u32 { self.path_steps }
    #[wasm_bindgen(getter)]
    pub fn collisions(&self) -> u32 { self.collisions }
    #[wasm_bindgen(getter)]
    pub fn transitions(&self) -> u32 { self.transitions }
    #[wasm_bindgen(getter)]
    pub fn conductions(&self) -> u32 { self.conductions }
    #[wasm_bindgen(getter)]
    pub fn spawn_failures(&self) -> u32 { self.spawn_failures }
    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.particle_count }
    #[wasm_bindgen(getter)]
    pub fn high_water(&self) -> u32 { self.high_water }
    #[wasm_bindgen(getter)]
    pub fn grid_cells(&self) -> u32 { self.grid_cells }
    #[wasm_bindgen(getter)]
    pub fn memory_bytes(&self) -> u32 { self.memory_bytes }
}
