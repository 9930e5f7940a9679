use crate::core::config::SimConfig;
use crate::core::error::CreateError;
use crate::core::parts::{Particle, ParticleStore, SlotHint, FLAG_MOVABLE};
use crate::core::random::SimRng;
use crate::domain::content::ContentRegistry;
use crate::elements::{ElementId, ElementProps, EL_NONE};
use crate::spatial::fields::FieldGrid;
use crate::spatial::occupancy::Category;
use crate::systems::movement::{MoveRules, Resolver};

use super::BehaviorRegistry;

/// Everything an element callback may touch, plus the slot it runs for.
///
/// Callbacks use the same store/field/resolver entry points the core does;
/// nothing here is buffered, so writes are visible to particles processed
/// later in the same tick.
pub struct UpdateContext<'a> {
    pub parts: &'a mut ParticleStore,
    pub fields: &'a mut FieldGrid,
    pub content: &'a ContentRegistry,
    pub rules: &'a MoveRules,
    pub behaviors: &'a BehaviorRegistry,
    pub rng: &'a mut SimRng,
    pub config: &'a SimConfig,
    pub frame: u64,
    /// Slot being updated
    pub slot: usize,
    /// Spawns dropped because the store was full
    pub(crate) spawn_failures: &'a mut u32,
}

impl<'a> UpdateContext<'a> {
    #[inline]
    pub fn part(&self) -> &Particle {
        self.parts.part(self.slot)
    }

    #[inline]
    pub fn part_mut(&mut self) -> &mut Particle {
        self.parts.part_mut(self.slot)
    }

    #[inline]
    pub fn props(&self) -> &ElementProps {
        self.content.element(self.part().element)
    }

    #[inline]
    pub fn pixel(&self) -> (i32, i32) {
        self.part().pixel()
    }

    /// Legacy heat rules are a per-simulation switch
    #[inline]
    pub fn legacy_heat(&self) -> bool {
        self.config.legacy_heat
    }

    /// Plain occupant of `(x, y)`, `None` when empty or out of bounds
    #[inline]
    pub fn plain_at(&self, x: i32, y: i32) -> Option<usize> {
        if !self.parts.in_bounds(x, y) {
            return None;
        }
        self.parts.occupancy().plain_at(x, y)
    }

    /// Element of the plain occupant at `(x, y)`
    #[inline]
    pub fn element_at(&self, x: i32, y: i32) -> Option<ElementId> {
        self.plain_at(x, y).map(|o| self.parts.part(o).element)
    }

    #[inline]
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.parts.in_bounds(x, y) && self.parts.occupancy().count(x, y, Category::All) == 0
    }

    /// Coarse cell under the current particle
    #[inline]
    pub fn cell(&self) -> (u32, u32) {
        let (x, y) = self.pixel();
        FieldGrid::cell_of(x, y)
    }

    pub fn resolver(&mut self) -> Resolver<'_> {
        Resolver::new(&mut *self.parts, &*self.fields, self.content, self.rules)
    }

    /// Spawn `element` at `(x, y)` with its descriptor defaults and run its
    /// create hook. Walls refuse categories they do not admit. Store
    /// exhaustion is counted, not fatal.
    pub fn create(
        &mut self,
        hint: SlotHint,
        x: i32,
        y: i32,
        element: ElementId,
    ) -> Result<usize, CreateError> {
        let Some(props) = self.content.props(element).copied() else {
            return Err(CreateError::UnknownElement);
        };
        if self.parts.in_bounds(x, y) {
            let (cx, cy) = FieldGrid::cell_of(x, y);
            if !self.fields.wall_allows(cx, cy, props.category_bit()) {
                return Err(CreateError::Walled);
            }
        }
        let slot = match self.parts.create(hint, x, y, element, props.is_energy()) {
            Ok(slot) => slot,
            Err(err) => {
                if err == CreateError::NoCapacity {
                    *self.spawn_failures += 1;
                }
                return Err(err);
            }
        };
        {
            let p = self.parts.part_mut(slot);
            p.temp = props.default_temp;
            p.life = props.default_life;
            p.tmp = props.default_tmp;
            if !props.is_solid() {
                p.flags |= FLAG_MOVABLE;
            }
        }

        let behaviors = self.behaviors;
        let saved = self.slot;
        self.slot = slot;
        behaviors.get(element).create(self);
        self.slot = saved;
        Ok(slot)
    }

    #[inline]
    pub fn kill(&mut self, slot: usize) {
        self.parts.kill(slot);
    }

    /// Turn `slot` into `to`, keeping position, velocity and temperature.
    /// `EL_NONE` kills. Returns false (and leaves the particle alone) when
    /// the new occupancy class has no room at its pixel.
    pub fn change_type(&mut self, slot: usize, to: ElementId) -> bool {
        if !self.parts.is_alive(slot) {
            return false;
        }
        if to == EL_NONE {
            self.parts.kill(slot);
            return true;
        }
        let Some(props) = self.content.props(to).copied() else {
            return false;
        };
        let from = self.parts.part(slot).element;
        if from == to {
            return true;
        }
        if !self.parts.reclassify(slot, props.is_energy()) {
            return false;
        }
        {
            let p = self.parts.part_mut(slot);
            p.element = to;
            if props.is_solid() {
                p.flags &= !FLAG_MOVABLE;
                p.vx = 0.0;
                p.vy = 0.0;
            } else {
                p.flags |= FLAG_MOVABLE;
            }
        }

        let behaviors = self.behaviors;
        let saved = self.slot;
        self.slot = slot;
        behaviors.get(to).change_type(self, from, to);
        self.slot = saved;
        true
    }
}
