//! Clone and Void
//!
//! Clone: `ctype` is the element it duplicates. It learns it from the first
//! touching non-utility particle, then spawns one copy per tick into a
//! random free neighbour pixel.
//! Void: destroys every touching particle that is not itself a utility.

use crate::core::parts::SlotHint;
use crate::elements::{BehaviorKind, ElementId, EL_NONE};
use crate::spatial::occupancy::Category;

use super::{ElementBehavior, UpdateContext, UpdateOutcome, NEIGHBOURS};

/// Neighbor directions
const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[inline]
fn is_utility(ctx: &UpdateContext, element: ElementId) -> bool {
    matches!(
        ctx.content.behavior_kind(element),
        BehaviorKind::UtilityClone | BehaviorKind::UtilityVoid
    )
}

pub struct CloneBehavior;

impl CloneBehavior {
    fn find_donor(ctx: &UpdateContext, x: i32, y: i32) -> Option<ElementId> {
        NEIGHBOURS.iter().find_map(|&(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            if !ctx.parts.in_bounds(nx, ny) {
                return None;
            }
            ctx.parts
                .query(nx, ny, Category::All)
                .map(|o| ctx.parts.part(o).element)
                .find(|&el| !is_utility(ctx, el))
        })
    }
}

impl ElementBehavior for CloneBehavior {
    fn update(&self, ctx: &mut UpdateContext) -> UpdateOutcome {
        let (x, y) = ctx.pixel();
        let ctype = ctx.part().ctype;
        if ctype <= EL_NONE as i32 || !ctx.content.is_particle(ctype as ElementId) {
            if let Some(donor) = Self::find_donor(ctx, x, y) {
                ctx.part_mut().ctype = donor as i32;
            }
            return UpdateOutcome::Unchanged;
        }

        let (dx, dy) = ctx.rng.neighbour();
        // Occupied / out of bounds / full store all just skip this tick
        let _ = ctx.create(SlotHint::Auto, x + dx, y + dy, ctype as ElementId);
        UpdateOutcome::Unchanged
    }
}

pub struct VoidBehavior;

impl ElementBehavior for VoidBehavior {
    fn update(&self, ctx: &mut UpdateContext) -> UpdateOutcome {
        let (x, y) = ctx.pixel();
        for (dx, dy) in DIRECTIONS {
            let (nx, ny) = (x + dx, y + dy);
            if !ctx.parts.in_bounds(nx, ny) {
                continue;
            }
            // snapshot iterator: killing while visiting is fine
            let occupants = ctx.parts.query(nx, ny, Category::All);
            for o in occupants {
                let element = ctx.parts.part(o).element;
                if !is_utility(ctx, element) {
                    ctx.kill(o);
                }
            }
        }
        UpdateOutcome::Unchanged
    }
}
