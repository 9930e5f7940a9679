//! Table-driven reactions
//!
//! One lookup table, `aggressor x victim`, 65536 entries. A reaction is
//! bilateral: the victim turns into `victim_becomes` and the aggressor into
//! `aggressor_becomes` (or stays as it is with `NO_CHANGE`), optionally
//! leaving a byproduct where the victim was.

use crate::core::parts::SlotHint;
use crate::elements::{ElementId, EL_NONE, EL_RESERVED};
use crate::systems::behaviors::{ElementBehavior, UpdateContext, UpdateOutcome, NEIGHBOURS};

pub const REACTION_LUT_SIZE: usize = 256 * 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reaction {
    /// `EL_NONE` destroys the victim
    pub victim_becomes: ElementId,
    /// `NO_CHANGE` leaves the aggressor alone, `EL_NONE` destroys it
    pub aggressor_becomes: ElementId,
    /// Out of 256 per tick; 255 always fires
    pub chance: u8,
    /// Byproduct spawned in the victim's pixel once it is gone
    pub spawn: ElementId,
}

impl Reaction {
    pub const NO_CHANGE: ElementId = EL_RESERVED;
    pub const ALWAYS: u8 = 255;

    pub const fn new(
        victim_becomes: ElementId,
        aggressor_becomes: ElementId,
        chance: u8,
        spawn: ElementId,
    ) -> Self {
        Self {
            victim_becomes,
            aggressor_becomes,
            chance,
            spawn,
        }
    }

    #[inline]
    fn fires(&self, roll: u8) -> bool {
        self.chance == Self::ALWAYS || roll < self.chance
    }
}

/// Scan the 8 neighbours in fixed order and apply the first reaction that
/// fires. Only the aggressor's own fate decides the outcome.
pub fn react(ctx: &mut UpdateContext) -> UpdateOutcome {
    let me = ctx.part().element;
    if !ctx.content.has_reactions(me) {
        return UpdateOutcome::Unchanged;
    }
    let (x, y) = ctx.pixel();

    for (dx, dy) in NEIGHBOURS {
        let (nx, ny) = (x + dx, y + dy);
        let Some(victim) = ctx.plain_at(nx, ny) else {
            continue;
        };
        let Some(r) = ctx.content.reaction(me, ctx.parts.part(victim).element).copied() else {
            continue;
        };
        let roll = (ctx.rng.next_u32() & 0xFF) as u8;
        if !r.fires(roll) {
            continue;
        }
        return apply(ctx, victim, (nx, ny), &r);
    }
    UpdateOutcome::Unchanged
}

fn apply(ctx: &mut UpdateContext, victim: usize, at: (i32, i32), r: &Reaction) -> UpdateOutcome {
    if r.victim_becomes != Reaction::NO_CHANGE {
        ctx.change_type(victim, r.victim_becomes);
    }
    if r.spawn != EL_NONE && !ctx.parts.is_alive(victim) {
        // a full store just means no byproduct
        let _ = ctx.create(SlotHint::Auto, at.0, at.1, r.spawn);
    }

    match r.aggressor_becomes {
        Reaction::NO_CHANGE => UpdateOutcome::Unchanged,
        to => {
            let slot = ctx.slot;
            ctx.change_type(slot, to);
            UpdateOutcome::Changed
        }
    }
}

/// Default behavior: reactions only
pub struct ReactionBehavior;

impl ElementBehavior for ReactionBehavior {
    fn update(&self, ctx: &mut UpdateContext) -> UpdateOutcome {
        react(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_ignores_the_roll() {
        let r = Reaction::new(EL_NONE, Reaction::NO_CHANGE, Reaction::ALWAYS, EL_NONE);
        assert!(r.fires(255));
        let r = Reaction::new(EL_NONE, Reaction::NO_CHANGE, 10, EL_NONE);
        assert!(r.fires(9));
        assert!(!r.fires(10));
        let never = Reaction::new(EL_NONE, Reaction::NO_CHANGE, 0, EL_NONE);
        assert!(!never.fires(0));
    }
}
