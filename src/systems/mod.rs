//! Systems: movement resolution, air, heat, per-particle physics and the
//! element behaviors dispatched every tick.

pub mod air;
pub mod behaviors;
pub mod movement;
pub mod physics;
pub mod reactions;
pub mod temperature;
