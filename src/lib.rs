//! Powder Engine - particle + coarse field simulation core in WASM
//!
//! Architecture:
//! - core/        - safety macros, config, errors, logging, RNG, particle store
//! - domain/      - element descriptors, content registry, wall catalog
//! - spatial/     - coarse field grid, fine occupancy index
//! - systems/     - movement resolver, air solver, heat, behaviors, reactions
//! - simulation/  - the context object, tick loop and the wasm facade

// Utils with safety macros (must be first for macro export!)
#[macro_use]
pub mod core;
pub mod spatial;
pub mod domain;
pub mod systems;
pub mod simulation;

// Short paths used across the crate
pub use domain::elements;
pub use systems::behaviors;
pub use systems::physics;
pub use systems::reactions;
pub use systems::temperature;

use wasm_bindgen::prelude::*;

// Re-export wasm-bindgen-rayon for thread pool initialization
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

pub use core::config::{AirMode, GravityMode, SimConfig};
pub use core::error::{CreateError, EngineError};
pub use simulation::{Simulation, World};

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine: panic hook plus console logging at `log_level`
/// ("error", "warn", "info", "debug", "trace")
#[wasm_bindgen]
pub fn init(log_level: &str) {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    core::logging::init(core::logging::parse_level(log_level));
    log::info!("powder engine {} initialized", env!("CARGO_PKG_VERSION"));
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Export element constants for JS
#[wasm_bindgen]
pub fn el_none() -> u8 { elements::EL_NONE }
#[wasm_bindgen]
pub fn el_dust() -> u8 { elements::EL_DUST }
#[wasm_bindgen]
pub fn el_water() -> u8 { elements::EL_WATER }
#[wasm_bindgen]
pub fn el_ice() -> u8 { elements::EL_ICE }
#[wasm_bindgen]
pub fn el_steam() -> u8 { elements::EL_STEAM }
#[wasm_bindgen]
pub fn el_stone() -> u8 { elements::EL_STONE }
#[wasm_bindgen]
pub fn el_lava() -> u8 { elements::EL_LAVA }
#[wasm_bindgen]
pub fn el_metal() -> u8 { elements::EL_METAL }
#[wasm_bindgen]
pub fn el_glass() -> u8 { elements::EL_GLASS }
#[wasm_bindgen]
pub fn el_gas() -> u8 { elements::EL_GAS }
#[wasm_bindgen]
pub fn el_fire() -> u8 { elements::EL_FIRE }
#[wasm_bindgen]
pub fn el_photon() -> u8 { elements::EL_PHOTON }
#[wasm_bindgen]
pub fn el_spark() -> u8 { elements::EL_SPARK }
#[wasm_bindgen]
pub fn el_clone() -> u8 { elements::EL_CLONE }
#[wasm_bindgen]
pub fn el_void() -> u8 { elements::EL_VOID }
