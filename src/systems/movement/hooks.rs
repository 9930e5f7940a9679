use std::sync::Arc;

use crate::core::parts::Particle;
use crate::domain::walls::WallId;

use super::MoveVerdict;

/// Everything a dynamic rule may look at
pub struct MoveQuery<'a> {
    pub x: i32,
    pub y: i32,
    pub mover_slot: usize,
    pub mover: &'a Particle,
    pub occupant_slot: usize,
    pub occupant: &'a Particle,
    pub wall: WallId,
    /// Pressure of the destination's coarse cell
    pub pressure: f32,
}

/// Runtime decision for a `MoveRule::Dynamic` pair. `None` blocks.
pub type MoveHook = Arc<dyn Fn(&MoveQuery) -> Option<MoveVerdict> + Send + Sync>;

/// Box a closure as a `MoveHook`
pub fn move_hook<F>(f: F) -> MoveHook
where
    F: Fn(&MoveQuery) -> Option<MoveVerdict> + Send + Sync + 'static,
{
    Arc::new(f)
}
