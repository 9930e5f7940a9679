//! Movement & Collision Resolver
//!
//! Decides whether a particle may enter a pixel and performs the move,
//! keeping the occupancy index in step with every position change.
//!
//! Check order for `can_move`: out of bounds, own pixel, destination wall,
//! then the (mover, occupant) rule table. Table entries marked `Dynamic`
//! defer to a registered hook that sees the full context; a hook with no
//! answer blocks.

mod hooks;
mod path;
mod perf;
mod resolve;
mod table;

pub use hooks::{move_hook, MoveHook, MoveQuery};
pub use path::{PathResult, ISTP, LIQUID_SPREAD};
pub use perf::{reset_movement_perf_counters, take_movement_perf_counters};
pub use resolve::{ChainMove, Resolver};
pub use table::MoveRules;

/// Answer of `can_move`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveVerdict {
    Allow,
    /// Allowed, but the mover loses half its velocity (powder sinking
    /// through liquid)
    AllowButSlow,
    Block,
}

impl MoveVerdict {
    #[inline]
    pub fn allows(self) -> bool {
        self != MoveVerdict::Block
    }
}

/// Table entry for an (mover, occupant) element pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveRule {
    Allow,
    AllowButSlow,
    Block,
    /// Ask the registered hook
    Dynamic,
}
