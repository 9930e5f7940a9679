//! Velocity integration
//!
//! Walks a particle along `(vx, vy)` in sub-steps no longer than `ISTP`,
//! checking every new pixel with the resolver. When the path is blocked the
//! element's `falldown` decides what happens next: powders try the two
//! diagonals, liquids additionally scan sideways through their own kind,
//! energy reflects off the blocking axis, everything else just loses
//! velocity through its `collision` coefficient.

use crate::core::parts::{pixel_of, FLAG_STAGNANT};
use crate::core::random::SimRng;
use crate::elements::ElementProps;

use super::perf::count_steps;
use super::resolve::Resolver;
use super::MoveVerdict;

/// Longest sub-step along the velocity vector, in pixels
pub const ISTP: f32 = 0.5;

/// How far a falling liquid looks sideways for somewhere to go
pub const LIQUID_SPREAD: i32 = 30;
const LIQUID_SPREAD_STAGNANT: i32 = 10;

/// Cap on sub-steps so runaway velocities cannot stall a tick
const MAX_PATH_STEPS: u32 = 128;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathResult {
    pub moved: bool,
    pub collided: bool,
    /// Ended by displacing a Plain occupant
    pub swapped: bool,
    pub steps: u32,
}

impl<'a> Resolver<'a> {
    /// Move `slot` along its velocity for one tick
    pub fn integrate(&mut self, slot: usize, gravity: (f32, f32), rng: &mut SimRng) -> PathResult {
        let p = *self.parts.part(slot);
        let props = *self.content.element(p.element);
        let mut result = PathResult::default();

        if !p.vx.is_finite() || !p.vy.is_finite() {
            let q = self.parts.part_mut(slot);
            q.vx = 0.0;
            q.vy = 0.0;
            return result;
        }

        let mv = p.vx.abs().max(p.vy.abs());
        if mv < 1e-4 {
            return result;
        }
        let steps = if mv < ISTP {
            1
        } else {
            ((mv / ISTP).ceil() as u32).min(MAX_PATH_STEPS)
        };
        let (sx, sy) = (p.vx / steps as f32, p.vy / steps as f32);

        let (mut cx, mut cy) = (p.x, p.y);
        for _ in 0..steps {
            result.steps += 1;
            let (nx, ny) = (cx + sx, cy + sy);
            let target = pixel_of(nx, ny);
            if target == pixel_of(cx, cy) {
                cx = nx;
                cy = ny;
                continue;
            }
            match self.can_move(slot, target.0, target.1) {
                MoveVerdict::Block => {
                    result.collided = true;
                    break;
                }
                _ => {
                    let occupied = !props.is_energy()
                        && self.parts.occupancy().plain_at(target.0, target.1).is_some();
                    if occupied {
                        // settle where we are, then displace the occupant
                        self.parts.relocate(slot, cx, cy);
                        if self.try_move(slot, nx, ny) {
                            result.swapped = true;
                            result.moved = true;
                            count_steps(result.steps, false);
                            return result;
                        }
                        result.collided = true;
                        break;
                    }
                    cx = nx;
                    cy = ny;
                }
            }
        }

        if (cx, cy) != (p.x, p.y) && self.parts.relocate(slot, cx, cy) {
            result.moved = true;
        }

        if result.collided {
            self.collide(slot, &props, gravity, rng, &mut result);
        } else {
            self.parts.part_mut(slot).flags &= !FLAG_STAGNANT;
        }
        count_steps(result.steps, result.collided);
        result
    }

    fn collide(
        &mut self,
        slot: usize,
        props: &ElementProps,
        gravity: (f32, f32),
        rng: &mut SimRng,
        result: &mut PathResult,
    ) {
        if props.is_energy() {
            self.reflect(slot, props.collision);
            return;
        }

        if props.falldown == 0 {
            self.damp(slot, props.collision);
            return;
        }

        if self.slide_diagonal(slot, rng) {
            result.moved = true;
            self.damp(slot, props.collision);
            return;
        }

        if props.falldown > 1 && self.spread_liquid(slot, gravity, rng) {
            result.moved = true;
            self.parts.part_mut(slot).flags &= !FLAG_STAGNANT;
        } else if props.falldown > 1 {
            self.parts.part_mut(slot).flags |= FLAG_STAGNANT;
        }
        self.damp(slot, props.collision);
    }

    #[inline]
    fn damp(&mut self, slot: usize, collision: f32) {
        let p = self.parts.part_mut(slot);
        p.vx *= collision;
        p.vy *= collision;
    }

    /// Flip (and scale) the velocity components that point into a blocker
    fn reflect(&mut self, slot: usize, collision: f32) {
        let p = *self.parts.part(slot);
        let (px, py) = p.pixel();
        let step_x = if p.vx > 0.0 { 1 } else if p.vx < 0.0 { -1 } else { 0 };
        let step_y = if p.vy > 0.0 { 1 } else if p.vy < 0.0 { -1 } else { 0 };

        let blocked_x = step_x != 0 && self.can_move(slot, px + step_x, py) == MoveVerdict::Block;
        let blocked_y = step_y != 0 && self.can_move(slot, px, py + step_y) == MoveVerdict::Block;

        let q = self.parts.part_mut(slot);
        match (blocked_x, blocked_y) {
            (true, false) => q.vx *= collision,
            (false, true) => q.vy *= collision,
            // corner, or only the diagonal is blocked
            _ => {
                q.vx *= collision;
                q.vy *= collision;
            }
        }
    }

    /// Rotate the velocity 45 degrees either way (random order) and try to
    /// take one pixel in that direction
    fn slide_diagonal(&mut self, slot: usize, rng: &mut SimRng) -> bool {
        let p = *self.parts.part(slot);
        if p.vx.abs() <= 0.01 && p.vy.abs() <= 0.01 {
            return false;
        }
        let r = if rng.next_u32() & 1 == 0 { 1.0 } else { -1.0 };
        for r in [r, -r] {
            let dx = p.vx - p.vy * r;
            let dy = p.vy + p.vx * r;
            let mv = dx.abs().max(dy.abs());
            if self.try_move(slot, p.x + dx / mv, p.y + dy / mv) {
                return true;
            }
        }
        false
    }

    /// Falling liquid: walk sideways through its own kind looking for a
    /// pixel it can enter, either level or one step down
    fn spread_liquid(&mut self, slot: usize, gravity: (f32, f32), rng: &mut SimRng) -> bool {
        let p = *self.parts.part(slot);
        let (gx, gy) = gravity;
        if gx == 0.0 && gy == 0.0 {
            return false;
        }
        // down along gravity, scan across it
        let (down, across) = if gy.abs() >= gx.abs() {
            ((0, gy.signum() as i32), (1, 0))
        } else {
            ((gx.signum() as i32, 0), (0, 1))
        };
        let along = p.vx * down.0 as f32 + p.vy * down.1 as f32;
        let cross = (p.vx * across.0 as f32 + p.vy * across.1 as f32).abs();
        if along <= cross {
            return false;
        }

        let reach = if p.flags & FLAG_STAGNANT != 0 { LIQUID_SPREAD_STAGNANT } else { LIQUID_SPREAD };
        let r = if rng.next_u32() & 1 == 0 { 1 } else { -1 };
        let (x0, y0) = p.pixel();
        let own = p.element;

        for k in 1..reach {
            let jx = x0 + across.0 * r * k;
            let jy = y0 + across.1 * r * k;
            if !self.parts.in_bounds(jx, jy) {
                break;
            }
            let level = self.plain_element(jx, jy);
            if level != Some(own) && self.try_move(slot, jx as f32, jy as f32) {
                return true;
            }
            let (bx, by) = (jx + down.0, jy + down.1);
            if self.parts.in_bounds(bx, by)
                && self.plain_element(bx, by) != Some(own)
                && self.try_move(slot, bx as f32, by as f32)
            {
                return true;
            }
            if level != Some(own) {
                break;
            }
        }
        false
    }

    #[inline]
    fn plain_element(&self, x: i32, y: i32) -> Option<u8> {
        self.parts
            .occupancy()
            .plain_at(x, y)
            .map(|o| self.parts.part(o).element)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::parts::{ParticleStore, SlotHint};
    use crate::core::random::SimRng;
    use crate::domain::content::ContentRegistry;
    use crate::elements::{EL_DUST, EL_METAL, EL_PHOTON, EL_WATER};
    use crate::spatial::fields::FieldGrid;
    use crate::systems::movement::{MoveRules, Resolver};

    struct Rig {
        parts: ParticleStore,
        fields: FieldGrid,
        content: ContentRegistry,
        rules: MoveRules,
        rng: SimRng,
    }

    impl Rig {
        fn new() -> Self {
            let content = ContentRegistry::from_builtin();
            let rules = MoveRules::build(&content);
            Self {
                parts: ParticleStore::new(64, 64, 256),
                fields: FieldGrid::new(64, 64).unwrap(),
                content,
                rules,
                rng: SimRng::new(99),
            }
        }

        fn spawn(&mut self, x: i32, y: i32, el: u8) -> usize {
            let energy = self.content.element(el).is_energy();
            self.parts.create(SlotHint::Auto, x, y, el, energy).unwrap()
        }

        fn integrate(&mut self, slot: usize) -> super::PathResult {
            let mut r = Resolver::new(&mut self.parts, &self.fields, &self.content, &self.rules);
            r.integrate(slot, (0.0, 1.0), &mut self.rng)
        }
    }

    #[test]
    fn free_fall_follows_velocity() {
        let mut rig = Rig::new();
        let a = rig.spawn(10, 10, EL_DUST);
        rig.parts.part_mut(a).vy = 3.0;
        let res = rig.integrate(a);
        assert!(res.moved && !res.collided);
        assert_eq!(res.steps, 6);
        assert_eq!(rig.parts.part(a).pixel(), (10, 13));
        rig.parts.check_consistency().unwrap();
    }

    #[test]
    fn blocked_path_stops_before_obstacle() {
        let mut rig = Rig::new();
        let a = rig.spawn(10, 10, EL_DUST);
        for x in 8..13 {
            rig.spawn(x, 12, EL_METAL);
        }
        rig.parts.part_mut(a).vy = 4.0;
        let res = rig.integrate(a);
        assert!(res.collided);
        assert_eq!(rig.parts.part(a).pixel(), (10, 11));
        // dust has no bounce
        assert_eq!(rig.parts.part(a).vy, 0.0);
    }

    #[test]
    fn powder_slides_off_a_single_pillar() {
        let mut rig = Rig::new();
        let a = rig.spawn(10, 10, EL_DUST);
        rig.spawn(10, 11, EL_METAL);
        rig.parts.part_mut(a).vy = 1.0;
        let res = rig.integrate(a);
        assert!(res.collided && res.moved);
        let (x, y) = rig.parts.part(a).pixel();
        assert_eq!(y, 11);
        assert!(x == 9 || x == 11);
    }

    #[test]
    fn liquid_spreads_on_a_floor() {
        let mut rig = Rig::new();
        let w = rig.spawn(10, 10, EL_WATER);
        for x in 0..64 {
            rig.spawn(x, 11, EL_METAL);
        }
        rig.parts.part_mut(w).vy = 1.0;
        let res = rig.integrate(w);
        assert!(res.moved);
        let (x, y) = rig.parts.part(w).pixel();
        assert_eq!(y, 10);
        assert_ne!(x, 10);
        rig.parts.check_consistency().unwrap();
    }

    #[test]
    fn photon_reflects_off_metal() {
        let mut rig = Rig::new();
        let ph = rig.spawn(10, 10, EL_PHOTON);
        rig.spawn(11, 10, EL_METAL);
        rig.parts.part_mut(ph).vx = 2.0;
        let res = rig.integrate(ph);
        assert!(res.collided);
        assert!(rig.parts.part(ph).vx < 0.0);
        assert_eq!(rig.parts.part(ph).pixel(), (10, 10));
    }

    #[test]
    fn sub_pixel_motion_stays_registered() {
        let mut rig = Rig::new();
        let a = rig.spawn(5, 5, EL_WATER);
        rig.parts.part_mut(a).vy = 0.1;
        let res = rig.integrate(a);
        assert!(res.moved);
        assert!((rig.parts.part(a).y - 5.1).abs() < 1e-6);
        assert_eq!(rig.parts.occupancy().plain_at(5, 5), Some(a));
    }
}
