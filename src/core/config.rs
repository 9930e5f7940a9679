//! Simulation settings
//!
//! Everything a host can tune without recompiling. Loaded from JSON (same
//! camelCase convention as the content bundle) or built in code and then
//! adjusted through the `Simulation` setters.

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;

/// Ambient air temperature at startup (22 °C on the Kelvin scale)
pub const DEFAULT_AMBIENT_TEMP: f32 = 295.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AirMode {
    /// Pressure and velocity both simulated
    On,
    /// Pressure forced to zero every tick
    NoPressure,
    /// Velocity forced to zero every tick
    NoVelocity,
    /// Both forced to zero
    Off,
    /// Fields are frozen (not updated at all)
    NoUpdate,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum GravityMode {
    /// Each element falls with its own `gravity` along +y
    Vertical,
    /// No gravity at all
    Off,
    /// Per-element gravity scaled onto an arbitrary direction
    Custom { x: f32, y: f32 },
}

impl GravityMode {
    /// Acceleration applied to an element whose descriptor gravity is `g`
    #[inline]
    pub fn accel(&self, g: f32) -> (f32, f32) {
        match *self {
            GravityMode::Vertical => (0.0, g),
            GravityMode::Off => (0.0, 0.0),
            GravityMode::Custom { x, y } => (x * g, y * g),
        }
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        matches!(self, GravityMode::Vertical)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfig {
    pub gravity: GravityMode,
    pub air_mode: AirMode,
    /// Couple particle temperature into the coarse air heat field
    pub ambient_heat: bool,
    /// Baseline the air heat relaxes towards
    pub ambient_temp: f32,
    /// Particle heat conduction / temperature transitions
    pub heat: bool,
    /// Older heat rules: no conduction and no air coupling. Element
    /// behaviors read this through `UpdateContext::legacy_heat`.
    pub legacy_heat: bool,
    pub seed: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: GravityMode::Vertical,
            air_mode: AirMode::On,
            ambient_heat: false,
            ambient_temp: DEFAULT_AMBIENT_TEMP,
            heat: true,
            legacy_heat: false,
            seed: 12345,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let cfg: SimConfig = serde_json::from_str(json)?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SimConfig::from_json(r#"{"airMode":"noPressure","seed":9}"#).unwrap();
        assert_eq!(cfg.air_mode, AirMode::NoPressure);
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.gravity, GravityMode::Vertical);
        assert!(cfg.heat);
    }

    #[test]
    fn custom_gravity_parses() {
        let cfg = SimConfig::from_json(r#"{"gravity":{"kind":"custom","x":1.0,"y":0.0}}"#).unwrap();
        assert_eq!(cfg.gravity.accel(0.5), (0.5, 0.0));
    }

    #[test]
    fn roundtrips_through_json() {
        let cfg = SimConfig {
            legacy_heat: true,
            ..SimConfig::default()
        };
        assert_eq!(SimConfig::from_json(&cfg.to_json()).unwrap(), cfg);
    }

    #[test]
    fn rejects_garbage() {
        assert!(SimConfig::from_json("{not json").is_err());
    }
}
