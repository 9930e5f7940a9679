use crate::core::parts::{pixel_of, Particle, ParticleStore};
use crate::domain::content::ContentRegistry;
use crate::elements::ElementProps;
use crate::spatial::fields::FieldGrid;
use crate::spatial::occupancy::{Category, MAX_ENERGY_PER_PIXEL};

use super::hooks::MoveQuery;
use super::table::MoveRules;
use super::MoveVerdict;

/// One step of a multi-particle push
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainMove {
    pub slot: usize,
    pub x: i32,
    pub y: i32,
}

/// Borrowed view over everything a move needs. Built per call site; cheap.
pub struct Resolver<'a> {
    pub parts: &'a mut ParticleStore,
    pub fields: &'a FieldGrid,
    pub content: &'a ContentRegistry,
    pub rules: &'a MoveRules,
}

impl<'a> Resolver<'a> {
    pub fn new(
        parts: &'a mut ParticleStore,
        fields: &'a FieldGrid,
        content: &'a ContentRegistry,
        rules: &'a MoveRules,
    ) -> Self {
        Self { parts, fields, content, rules }
    }

    /// May `slot` enter pixel `(x, y)`?
    pub fn can_move(&self, slot: usize, x: i32, y: i32) -> MoveVerdict {
        if !self.parts.in_bounds(x, y) {
            return MoveVerdict::Block;
        }
        let mover = self.parts.part(slot);
        if mover.pixel() == (x, y) {
            return MoveVerdict::Allow;
        }
        let props = self.content.element(mover.element);
        if !self.wall_allows(props, x, y) {
            return MoveVerdict::Block;
        }
        let occupant = self.parts.occupancy().plain_at(x, y).filter(|&o| o != slot);
        self.particle_verdict(slot, mover, props, x, y, occupant)
    }

    #[inline]
    fn wall_allows(&self, props: &ElementProps, x: i32, y: i32) -> bool {
        let (cx, cy) = FieldGrid::cell_of(x, y);
        self.fields.wall_allows(cx, cy, props.category_bit())
    }

    fn particle_verdict(
        &self,
        slot: usize,
        mover: &Particle,
        props: &ElementProps,
        x: i32,
        y: i32,
        occupant: Option<usize>,
    ) -> MoveVerdict {
        if props.is_energy()
            && self.parts.occupancy().count(x, y, Category::Energy) >= MAX_ENERGY_PER_PIXEL
        {
            return MoveVerdict::Block;
        }
        let Some(o) = occupant else {
            return MoveVerdict::Allow;
        };
        let other = self.parts.part(o);
        // a displaced occupant lands on the mover's pixel; its wall must take it
        if !props.is_energy() {
            let (ox, oy) = mover.pixel();
            if !self.wall_allows(self.content.element(other.element), ox, oy) {
                return MoveVerdict::Block;
            }
        }
        let rule = self.rules.rule(mover.element, other.element);
        let (cx, cy) = FieldGrid::cell_of(x, y);
        let query = MoveQuery {
            x,
            y,
            mover_slot: slot,
            mover,
            occupant_slot: o,
            occupant: other,
            wall: self.fields.wall_at(cx, cy),
            pressure: self.fields.pressure_at_pixel(x, y),
        };
        self.rules.resolve(rule, &query)
    }

    /// Unconditional relocation. Legality was checked by the caller; only a
    /// full destination pixel makes this fail.
    #[inline]
    pub fn move_particle(&mut self, slot: usize, x: f32, y: f32) -> bool {
        self.parts.relocate(slot, x, y)
    }

    /// Exchange two Plain particles
    #[inline]
    pub fn swap_particles(&mut self, a: usize, b: usize) {
        self.parts.swap_plain(a, b);
    }

    /// Checked move to continuous position `(x, y)`. A displaceable Plain
    /// occupant swaps into the mover's old spot.
    pub fn try_move(&mut self, slot: usize, x: f32, y: f32) -> bool {
        let (px, py) = pixel_of(x, y);
        let verdict = self.can_move(slot, px, py);
        if verdict == MoveVerdict::Block {
            return false;
        }
        let energy = self.content.element(self.parts.part(slot).element).is_energy();
        if !energy {
            if let Some(o) = self.parts.occupancy().plain_at(px, py) {
                if o != slot {
                    self.parts.swap_plain(slot, o);
                }
            }
        }
        if !self.parts.relocate(slot, x, y) {
            return false;
        }
        if verdict == MoveVerdict::AllowButSlow {
            let p = self.parts.part_mut(slot);
            p.vx *= 0.5;
            p.vy *= 0.5;
        }
        true
    }

    /// All-or-nothing pre-check for a push chain, moves given in commit
    /// order. A destination is free if empty or vacated by an earlier move
    /// in the chain; chains never swap.
    pub fn can_move_chain(&self, moves: &[ChainMove]) -> bool {
        let mut claimed: Vec<(i32, i32)> = Vec::with_capacity(moves.len());
        for (i, m) in moves.iter().enumerate() {
            if !self.parts.is_alive(m.slot) || !self.parts.in_bounds(m.x, m.y) {
                return false;
            }
            let mover = self.parts.part(m.slot);
            let props = self.content.element(mover.element);
            if !self.wall_allows(props, m.x, m.y) {
                return false;
            }
            if props.is_energy() {
                if self.particle_verdict(m.slot, mover, props, m.x, m.y, None) == MoveVerdict::Block {
                    return false;
                }
                continue;
            }
            if claimed.contains(&(m.x, m.y)) {
                return false;
            }
            let vacated = |o: usize| o == m.slot || moves[..i].iter().any(|e| e.slot == o);
            if let Some(o) = self.parts.occupancy().plain_at(m.x, m.y) {
                if !vacated(o) {
                    return false;
                }
            }
            claimed.push((m.x, m.y));
        }
        true
    }

    /// Validate then commit a push chain
    pub fn move_chain(&mut self, moves: &[ChainMove]) -> bool {
        if !self.can_move_chain(moves) {
            return false;
        }
        for m in moves {
            let ok = self.parts.relocate(m.slot, m.x as f32, m.y as f32);
            debug_assert!(ok, "validated chain move failed for slot {}", m.slot);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parts::SlotHint;
    use crate::domain::walls::{WL_ALLOW_POWDER, WL_WALL};
    use crate::elements::{EL_DUST, EL_GLASS, EL_METAL, EL_PHOTON, EL_STONE, EL_WATER};
    use crate::systems::movement::move_hook;

    struct Rig {
        parts: ParticleStore,
        fields: FieldGrid,
        content: ContentRegistry,
        rules: MoveRules,
    }

    impl Rig {
        fn new() -> Self {
            let content = ContentRegistry::from_builtin();
            let rules = MoveRules::build(&content);
            Self {
                parts: ParticleStore::new(32, 32, 64),
                fields: FieldGrid::new(32, 32).unwrap(),
                content,
                rules,
            }
        }

        fn spawn(&mut self, x: i32, y: i32, el: u8) -> usize {
            let energy = self.content.element(el).is_energy();
            self.parts.create(SlotHint::Auto, x, y, el, energy).unwrap()
        }

        fn resolver(&mut self) -> Resolver<'_> {
            Resolver::new(&mut self.parts, &self.fields, &self.content, &self.rules)
        }
    }

    #[test]
    fn bounds_self_and_walls() {
        let mut rig = Rig::new();
        let a = rig.spawn(1, 1, EL_DUST);
        rig.fields.set_wall(1, 0, WL_WALL);
        let r = rig.resolver();
        assert_eq!(r.can_move(a, -1, 1), MoveVerdict::Block);
        assert_eq!(r.can_move(a, 1, 1), MoveVerdict::Allow);
        assert_eq!(r.can_move(a, 5, 1), MoveVerdict::Block);
        assert_eq!(r.can_move(a, 1, 2), MoveVerdict::Allow);
    }

    #[test]
    fn heavier_powder_sinks_through_liquid() {
        let mut rig = Rig::new();
        let dust = rig.spawn(5, 5, EL_DUST);
        let water = rig.spawn(5, 6, EL_WATER);
        rig.parts.part_mut(dust).vy = 1.0;
        let mut r = rig.resolver();
        assert_eq!(r.can_move(dust, 5, 6), MoveVerdict::AllowButSlow);
        assert!(r.try_move(dust, 5.0, 6.0));
        assert_eq!(rig.parts.part(dust).pixel(), (5, 6));
        assert_eq!(rig.parts.part(water).pixel(), (5, 5));
        assert_eq!(rig.parts.part(dust).vy, 0.5);
        rig.parts.check_consistency().unwrap();
    }

    #[test]
    fn no_swap_into_a_wall_the_occupant_cannot_enter() {
        let mut rig = Rig::new();
        // dust in a powder-only cell, water right below it in open space
        rig.fields.set_wall(1, 2, WL_ALLOW_POWDER);
        let dust = rig.spawn(5, 11, EL_DUST);
        let water = rig.spawn(5, 12, EL_WATER);
        rig.parts.part_mut(dust).vy = 1.0;
        let mut r = rig.resolver();
        assert_eq!(r.can_move(dust, 5, 12), MoveVerdict::Block);
        assert!(!r.try_move(dust, 5.0, 12.0));
        assert_eq!(rig.parts.part(dust).pixel(), (5, 11));
        assert_eq!(rig.parts.part(water).pixel(), (5, 12));
        rig.parts.check_consistency().unwrap();
    }

    #[test]
    fn light_cannot_displace_heavy() {
        let mut rig = Rig::new();
        let water = rig.spawn(5, 5, EL_WATER);
        rig.spawn(5, 6, EL_STONE);
        let mut r = rig.resolver();
        assert!(!r.try_move(water, 5.0, 6.0));
        assert_eq!(rig.parts.part(water).pixel(), (5, 5));
    }

    #[test]
    fn photons_pass_glass_but_not_metal() {
        let mut rig = Rig::new();
        let ph = rig.spawn(2, 2, EL_PHOTON);
        rig.spawn(3, 2, EL_GLASS);
        rig.spawn(2, 3, EL_METAL);
        let mut r = rig.resolver();
        assert_eq!(r.can_move(ph, 2, 3), MoveVerdict::Block);
        assert!(r.try_move(ph, 3.0, 2.0));
        assert_eq!(rig.parts.occupancy().count(3, 2, Category::All), 2);
        rig.parts.check_consistency().unwrap();
    }

    #[test]
    fn dynamic_hook_without_answer_blocks() {
        let mut rig = Rig::new();
        let dust = rig.spawn(1, 1, EL_DUST);
        rig.spawn(1, 2, EL_WATER);
        rig.rules.set_hook(EL_DUST, EL_WATER, move_hook(|_q| None));
        assert_eq!(rig.resolver().can_move(dust, 1, 2), MoveVerdict::Block);

        rig.rules.set_hook(
            EL_DUST,
            EL_WATER,
            move_hook(|q| (q.pressure >= 0.0).then_some(MoveVerdict::Allow)),
        );
        assert_eq!(rig.resolver().can_move(dust, 1, 2), MoveVerdict::Allow);
    }

    #[test]
    fn chain_push_is_all_or_nothing() {
        let mut rig = Rig::new();
        let a = rig.spawn(1, 1, EL_STONE);
        let b = rig.spawn(2, 1, EL_STONE);
        let chain = [ChainMove { slot: b, x: 3, y: 1 }, ChainMove { slot: a, x: 2, y: 1 }];
        assert!(rig.resolver().move_chain(&chain));
        assert_eq!(rig.parts.part(a).pixel(), (2, 1));
        assert_eq!(rig.parts.part(b).pixel(), (3, 1));

        // blocked at the far end: nothing moves
        rig.spawn(4, 1, EL_METAL);
        let chain = [ChainMove { slot: b, x: 4, y: 1 }, ChainMove { slot: a, x: 3, y: 1 }];
        assert!(!rig.resolver().move_chain(&chain));
        assert_eq!(rig.parts.part(a).pixel(), (2, 1));
        assert_eq!(rig.parts.part(b).pixel(), (3, 1));
        rig.parts.check_consistency().unwrap();
    }
}
