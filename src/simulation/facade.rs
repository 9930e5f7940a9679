use wasm_bindgen::prelude::*;

use crate::core::config::{AirMode, GravityMode, SimConfig};
use crate::core::parts::Particle;
use crate::spatial::fields::Field;

use super::commands::cell_at;
use super::perf_stats::PerfStats;
use super::Simulation;

/// Pointers and lengths of every array a host may read between ticks.
/// Pointers are offsets into wasm linear memory.
#[wasm_bindgen]
pub struct AbiLayout {
    parts_ptr: u32,
    parts_len_elements: u32,
    parts_stride_bytes: u32,
    colors_ptr: u32,
    colors_len_elements: u32,
    pressure_ptr: u32,
    velocity_x_ptr: u32,
    velocity_y_ptr: u32,
    heat_ptr: u32,
    walls_ptr: u32,
    cells_len_elements: u32,
}

#[wasm_bindgen]
impl AbiLayout {
    #[wasm_bindgen(getter)]
    pub fn parts_ptr(&self) -> u32 { self.parts_ptr }
    /// Slots below the high-water mark; dead records have element 0
    #[wasm_bindgen(getter)]
    pub fn parts_len_elements(&self) -> u32 { self.parts_len_elements }
    #[wasm_bindgen(getter)]
    pub fn parts_stride_bytes(&self) -> u32 { self.parts_stride_bytes }

    #[wasm_bindgen(getter)]
    pub fn colors_ptr(&self) -> u32 { self.colors_ptr }
    #[wasm_bindgen(getter)]
    pub fn colors_len_elements(&self) -> u32 { self.colors_len_elements }

    #[wasm_bindgen(getter)]
    pub fn pressure_ptr(&self) -> u32 { self.pressure_ptr }
    #[wasm_bindgen(getter)]
    pub fn velocity_x_ptr(&self) -> u32 { self.velocity_x_ptr }
    #[wasm_bindgen(getter)]
    pub fn velocity_y_ptr(&self) -> u32 { self.velocity_y_ptr }
    #[wasm_bindgen(getter)]
    pub fn heat_ptr(&self) -> u32 { self.heat_ptr }
    #[wasm_bindgen(getter)]
    pub fn walls_ptr(&self) -> u32 { self.walls_ptr }
    /// Entries in each coarse field array
    #[wasm_bindgen(getter)]
    pub fn cells_len_elements(&self) -> u32 { self.cells_len_elements }
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn air_mode_from_u8(mode: u8) -> Option<AirMode> {
    Some(match mode {
        0 => AirMode::On,
        1 => AirMode::NoPressure,
        2 => AirMode::NoVelocity,
        3 => AirMode::Off,
        4 => AirMode::NoUpdate,
        _ => return None,
    })
}

#[wasm_bindgen]
pub struct World {
    core: Simulation,
}

#[wasm_bindgen]
impl World {
    /// Built-in content, one particle slot per pixel
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<World, JsValue> {
        Ok(Self {
            core: Simulation::new(width, height).map_err(js_err)?,
        })
    }

    /// `config_json` uses the camelCase `SimConfig` layout
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(width: u32, height: u32, capacity: usize, config_json: &str) -> Result<World, JsValue> {
        let config = SimConfig::from_json(config_json).map_err(js_err)?;
        Ok(Self {
            core: Simulation::with_config(width, height, capacity, config).map_err(js_err)?,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 { self.core.width() }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 { self.core.height() }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.core.particle_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.core.frame() }

    #[wasm_bindgen(getter)]
    pub fn cells_x(&self) -> u32 { self.core.fields().cells_x() }

    #[wasm_bindgen(getter)]
    pub fn cells_y(&self) -> u32 { self.core.fields().cells_y() }

    // === Settings ===

    pub fn set_config_json(&mut self, json: &str) -> Result<(), JsValue> {
        let config = SimConfig::from_json(json).map_err(js_err)?;
        self.core.set_config(config);
        Ok(())
    }

    pub fn get_config_json(&self) -> String {
        self.core.config().to_json()
    }

    /// Gravity along an arbitrary direction, scaled by each element's own gravity
    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.core.set_gravity(GravityMode::Custom { x, y });
    }

    pub fn set_gravity_vertical(&mut self) {
        self.core.set_gravity(GravityMode::Vertical);
    }

    pub fn set_gravity_off(&mut self) {
        self.core.set_gravity(GravityMode::Off);
    }

    /// 0 on, 1 no pressure, 2 no velocity, 3 off, 4 frozen
    pub fn set_air_mode(&mut self, mode: u8) -> Result<(), JsValue> {
        let mode = air_mode_from_u8(mode).ok_or_else(|| JsValue::from_str("unknown air mode"))?;
        self.core.set_air_mode(mode);
        Ok(())
    }

    pub fn set_ambient_heat(&mut self, enabled: bool) {
        self.core.set_ambient_heat(enabled);
    }

    pub fn set_ambient_temperature(&mut self, temp: f32) {
        self.core.set_ambient_temperature(temp);
    }

    pub fn set_heat(&mut self, enabled: bool) {
        self.core.set_heat(enabled);
    }

    pub fn set_legacy_heat(&mut self, enabled: bool) {
        self.core.set_legacy_heat(enabled);
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.perf_stats()
    }

    // === Commands ===

    /// Slot of the new particle, or -1 when nothing was created
    pub fn create(&mut self, x: i32, y: i32, element: u8) -> i32 {
        match self.core.create(x, y, element) {
            Ok(slot) => slot as i32,
            Err(_) => -1,
        }
    }

    pub fn kill(&mut self, slot: u32) {
        self.core.kill(slot as usize);
    }

    pub fn kill_at(&mut self, x: i32, y: i32) -> u32 {
        self.core.kill_at(x, y) as u32
    }

    /// Brush
    pub fn create_in_radius(&mut self, cx: i32, cy: i32, radius: i32, element: u8) -> u32 {
        self.core.create_in_radius(cx, cy, radius, element) as u32
    }

    pub fn kill_in_radius(&mut self, cx: i32, cy: i32, radius: i32) -> u32 {
        self.core.kill_in_radius(cx, cy, radius) as u32
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn reset(&mut self) {
        self.core.reset();
    }

    /// Pack particles into the lowest slots; slot numbers held by the host
    /// are invalid afterwards
    pub fn compact(&mut self) {
        self.core.compact();
    }

    pub fn set_wall(&mut self, cx: u32, cy: u32, wall: u8) {
        self.core.set_wall(cx, cy, wall);
    }

    pub fn set_fan_velocity(&mut self, cx: u32, cy: u32, fvx: f32, fvy: f32) {
        self.core.set_fan_velocity(cx, cy, fvx, fvy);
    }

    /// Add `delta` to the pressure under fine pixel `(x, y)`
    pub fn add_pressure(&mut self, x: i32, y: i32, delta: f32) {
        if let Some((cx, cy)) = cell_at(self.core.fields(), x, y) {
            self.core.fields_mut().add(Field::Pressure, cx, cy, delta);
        }
    }

    pub fn pressure_at(&self, x: i32, y: i32) -> f32 {
        cell_at(self.core.fields(), x, y)
            .map(|(cx, cy)| self.core.fields().get(Field::Pressure, cx, cy))
            .unwrap_or(0.0)
    }

    // === Content ===

    pub fn load_content_bundle(&mut self, json: String) -> Result<(), JsValue> {
        self.core.load_content_bundle_json(&json).map_err(js_err)
    }

    pub fn get_content_manifest_json(&self) -> String {
        self.core.content_manifest_json()
    }

    // === Tick / read-back ===

    pub fn step(&mut self) {
        self.core.step();
    }

    /// Repaint the color buffer; read it through `abi_layout().colors_ptr`
    pub fn render(&mut self) {
        self.core.render();
    }

    pub fn abi_layout(&self) -> AbiLayout {
        let fields = self.core.fields();
        AbiLayout {
            parts_ptr: self.core.parts().as_ptr() as u32,
            parts_len_elements: self.core.parts().high_water() as u32,
            parts_stride_bytes: std::mem::size_of::<Particle>() as u32,
            colors_ptr: self.core.colors().as_ptr() as u32,
            colors_len_elements: self.core.colors().len() as u32,
            pressure_ptr: fields.field_ptr(Field::Pressure) as u32,
            velocity_x_ptr: fields.field_ptr(Field::VelocityX) as u32,
            velocity_y_ptr: fields.field_ptr(Field::VelocityY) as u32,
            heat_ptr: fields.field_ptr(Field::Heat) as u32,
            walls_ptr: fields.walls_slice().as_ptr() as u32,
            cells_len_elements: fields.size() as u32,
        }
    }
}
