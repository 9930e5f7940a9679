//! Element behaviors
//!
//! Per-element callbacks plugged into the dispatch loop. Each element id maps
//! to one `ElementBehavior` strategy object in a fixed-size table, so
//! dispatch is a single indexed load regardless of how many elements are
//! registered. Every hook has a no-op default.

mod context;
mod energy;
mod fire;
mod utility;

use std::sync::Arc;

pub use context::UpdateContext;
pub use energy::{PhotonBehavior, SparkBehavior};
pub use fire::FireBehavior;
pub use utility::{CloneBehavior, VoidBehavior};

use crate::core::parts::Particle;
use crate::domain::content::ContentRegistry;
use crate::elements::{BehaviorKind, ElementId, ElementProps, MAX_ELEMENTS};
use crate::reactions::ReactionBehavior;

/// What `update` did to its own slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    Unchanged,
    /// The slot was killed, replaced or moved; the loop must not reuse any
    /// local copy of it
    Changed,
}

/// Draw instructions returned by `graphics`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelDirectives {
    /// ARGB
    pub color: u32,
    /// Additive glow around the pixel
    pub glow: bool,
}

impl PixelDirectives {
    /// Descriptor color, with the decoration layered over it when set
    pub fn base(p: &Particle, props: &ElementProps) -> Self {
        let color = if p.dcolour >> 24 != 0 { blend_argb(props.color, p.dcolour) } else { props.color };
        Self { color, glow: false }
    }
}

/// Alpha-blend `over` onto `under`, keeping `under`'s alpha
pub fn blend_argb(under: u32, over: u32) -> u32 {
    let a = over >> 24;
    let mix = |shift: u32| {
        let u = (under >> shift) & 0xFF;
        let o = (over >> shift) & 0xFF;
        ((o * a + u * (255 - a)) / 255) << shift
    };
    (under & 0xFF00_0000) | mix(16) | mix(8) | mix(0)
}

/// Callbacks for one element. Implementations must be stateless (or keep
/// their state in the particle's scratch fields) since one instance serves
/// every particle of the element.
pub trait ElementBehavior: Send + Sync {
    /// Runs once per tick after the generic physics
    fn update(&self, _ctx: &mut UpdateContext) -> UpdateOutcome {
        UpdateOutcome::Unchanged
    }

    fn graphics(&self, p: &Particle, props: &ElementProps) -> PixelDirectives {
        PixelDirectives::base(p, props)
    }

    /// Runs right after a particle of this element is spawned; `ctx.slot`
    /// is the new particle
    fn create(&self, _ctx: &mut UpdateContext) {}

    /// Runs after `ctx.slot` turned into this element
    fn change_type(&self, _ctx: &mut UpdateContext, _from: ElementId, _to: ElementId) {}
}

/// Behavior table indexed by element id
#[derive(Clone)]
pub struct BehaviorRegistry {
    table: Vec<Arc<dyn ElementBehavior>>,
}

impl BehaviorRegistry {
    /// Wire every registered element to the behavior its content names
    pub fn for_content(content: &ContentRegistry) -> Self {
        let reactive: Arc<dyn ElementBehavior> = Arc::new(ReactionBehavior);
        let mut table = vec![Arc::clone(&reactive); MAX_ELEMENTS];
        for id in 0..content.element_count() {
            table[id] = match content.behavior_kind(id as ElementId) {
                // elements without their own behavior still take part in
                // table reactions
                BehaviorKind::None | BehaviorKind::Reactive => Arc::clone(&reactive),
                kind => behavior_for(kind),
            };
        }
        Self { table }
    }

    #[inline]
    pub fn get(&self, id: ElementId) -> &dyn ElementBehavior {
        fast!(self.table, [id as usize]).as_ref()
    }

    /// Replace the behavior of one element
    pub fn register(&mut self, id: ElementId, behavior: Arc<dyn ElementBehavior>) {
        self.table[id as usize] = behavior;
    }
}

/// Built-in strategy object for a behavior kind
pub fn behavior_for(kind: BehaviorKind) -> Arc<dyn ElementBehavior> {
    match kind {
        BehaviorKind::None | BehaviorKind::Reactive => Arc::new(ReactionBehavior),
        BehaviorKind::Fire => Arc::new(FireBehavior),
        BehaviorKind::Photon => Arc::new(PhotonBehavior),
        BehaviorKind::Spark => Arc::new(SparkBehavior),
        BehaviorKind::UtilityClone => Arc::new(CloneBehavior),
        BehaviorKind::UtilityVoid => Arc::new(VoidBehavior),
    }
}

/// The 8-neighbour ring, row by row. Fixed order so reaction scans are
/// deterministic.
pub const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoration_blends_over_base() {
        let under = 0xFF00_0000;
        assert_eq!(blend_argb(under, 0xFFFF_FFFF), 0xFFFF_FFFF);
        assert_eq!(blend_argb(0xFF12_3456, 0x00FF_FFFF), 0xFF12_3456);
    }

    #[test]
    fn every_id_has_a_behavior() {
        let content = ContentRegistry::from_builtin();
        let reg = BehaviorRegistry::for_content(&content);
        for id in 0..=255u8 {
            let _ = reg.get(id);
        }
    }
}
