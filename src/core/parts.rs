//! Particle Store
//!
//! Fixed-capacity array of particle records. Slot `i` is live when
//! `parts[i].element != EL_NONE`. Free slots below the high-water mark are
//! tracked in a bitset so `create` always takes the lowest free index.
//!
//! The store owns the occupancy index: every create/kill/relocate updates
//! both in the same call, so the two can never disagree.

mod free_slots;
mod compact;

use crate::core::error::CreateError;
use crate::elements::{ElementId, EL_NONE};
use crate::spatial::occupancy::{Category, OccupancyIndex, Occupants};

use free_slots::FreeSlots;

/// Skip movement for one dispatch pass
pub const FLAG_SKIPMOVE: u32 = 1 << 0;
/// Liquid found nowhere to go last tick
pub const FLAG_STAGNANT: u32 = 1 << 1;
/// Set on every particle the resolver may move
pub const FLAG_MOVABLE: u32 = 1 << 2;

/// One particle record. Fixed size; `tmp`, `tmp2`, `ctype` and `life` mean
/// whatever the element's descriptor says they mean.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Particle {
    pub element: ElementId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub temp: f32,
    pub life: i32,
    pub tmp: i32,
    pub tmp2: i32,
    pub ctype: i32,
    pub dcolour: u32,
    pub pavg: [f32; 2],
    pub flags: u32,
}

impl Particle {
    pub const DEAD: Particle = Particle {
        element: EL_NONE,
        x: 0.0,
        y: 0.0,
        vx: 0.0,
        vy: 0.0,
        temp: 0.0,
        life: 0,
        tmp: 0,
        tmp2: 0,
        ctype: 0,
        dcolour: 0,
        pavg: [0.0; 2],
        flags: 0,
    };

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.element != EL_NONE
    }

    /// Pixel the particle is registered at
    #[inline]
    pub fn pixel(&self) -> (i32, i32) {
        pixel_of(self.x, self.y)
    }

    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// Round a continuous position to its fine pixel
#[inline]
pub fn pixel_of(x: f32, y: f32) -> (i32, i32) {
    ((x + 0.5).floor() as i32, (y + 0.5).floor() as i32)
}

/// Slot selection for `create`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotHint {
    /// Lowest free slot, else grow the high-water mark
    Auto,
    /// Overwrite this live slot in place (dead slots fall back to `Auto`)
    Replace(usize),
}

pub struct ParticleStore {
    parts: Vec<Particle>,
    free: FreeSlots,
    high_water: usize,
    live: usize,
    occupancy: OccupancyIndex,
}

impl ParticleStore {
    pub fn new(width: u32, height: u32, capacity: usize) -> Self {
        Self {
            parts: vec![Particle::DEAD; capacity],
            free: FreeSlots::new(capacity),
            high_water: 0,
            live: 0,
            occupancy: OccupancyIndex::new(width, height),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.parts.len()
    }

    /// One past the highest slot that may be live. Dispatch re-reads this
    /// every iteration.
    #[inline]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_alive(&self, slot: usize) -> bool {
        slot < self.high_water && fast!(self.parts, [slot]).is_alive()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&Particle> {
        self.parts.get(slot).filter(|p| p.is_alive())
    }

    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Particle> {
        self.parts.get_mut(slot).filter(|p| p.is_alive())
    }

    /// Unchecked-in-release record access; `slot < capacity` is the caller's
    /// obligation.
    #[inline(always)]
    pub fn part(&self, slot: usize) -> &Particle {
        fast!(self.parts, [slot])
    }

    /// Mutable record access. Position must not be written through this; use
    /// `relocate` so the occupancy index follows.
    #[inline(always)]
    pub fn part_mut(&mut self, slot: usize) -> &mut Particle {
        fast_mut!(self.parts, [slot])
    }

    /// Raw records, `capacity()` long, for bulk serialization
    pub fn as_slice(&self) -> &[Particle] {
        &self.parts
    }

    pub fn as_ptr(&self) -> *const Particle {
        self.parts.as_ptr()
    }

    #[inline]
    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.occupancy.in_bounds(x, y)
    }

    #[inline]
    pub fn query(&self, x: i32, y: i32, category: Category) -> Occupants {
        self.occupancy.query(x, y, category)
    }

    /// Live slots in ascending order
    pub fn live_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.high_water).filter(move |&i| self.parts[i].is_alive())
    }

    /// Allocate a slot for `element` at pixel `(x, y)`.
    ///
    /// The new record is blank apart from element and position; callers
    /// apply descriptor defaults. `energy` picks the occupancy class.
    pub fn create(
        &mut self,
        hint: SlotHint,
        x: i32,
        y: i32,
        element: ElementId,
        energy: bool,
    ) -> Result<usize, CreateError> {
        if element == EL_NONE {
            return Err(CreateError::UnknownElement);
        }
        if !self.occupancy.in_bounds(x, y) {
            return Err(CreateError::OutOfBounds);
        }

        if let SlotHint::Replace(slot) = hint {
            if self.is_alive(slot) {
                return self.replace_in_place(slot, x, y, element, energy);
            }
        }

        if !self.occupancy.has_room(x, y, energy, None) {
            return Err(CreateError::Occupied);
        }
        let slot = self.allocate().ok_or(CreateError::NoCapacity)?;

        self.parts[slot] = Particle {
            element,
            x: x as f32,
            y: y as f32,
            ..Particle::DEAD
        };
        self.live += 1;
        self.occupancy.add(x, y, slot, energy);
        Ok(slot)
    }

    fn replace_in_place(
        &mut self,
        slot: usize,
        x: i32,
        y: i32,
        element: ElementId,
        energy: bool,
    ) -> Result<usize, CreateError> {
        if !self.occupancy.has_room(x, y, energy, Some(slot)) {
            return Err(CreateError::Occupied);
        }
        let (ox, oy) = self.parts[slot].pixel();
        self.occupancy.remove(ox, oy, slot);
        self.parts[slot] = Particle {
            element,
            x: x as f32,
            y: y as f32,
            ..Particle::DEAD
        };
        self.occupancy.add(x, y, slot, energy);
        Ok(slot)
    }

    fn allocate(&mut self) -> Option<usize> {
        if let Some(slot) = self.free.take_lowest(self.high_water) {
            return Some(slot);
        }
        if self.high_water < self.parts.len() {
            let slot = self.high_water;
            self.high_water += 1;
            return Some(slot);
        }
        None
    }

    /// Mark dead, deregister, free the slot. Dead slots are ignored.
    pub fn kill(&mut self, slot: usize) {
        if !self.is_alive(slot) {
            return;
        }
        let (x, y) = self.parts[slot].pixel();
        let found = self.occupancy.remove(x, y, slot);
        debug_assert!(found.is_some(), "live slot {} missing from occupancy at ({}, {})", slot, x, y);

        self.parts[slot] = Particle::DEAD;
        self.live -= 1;
        self.free.release(slot);

        // shrink the mark past any dead tail
        while self.high_water > 0 && !self.parts[self.high_water - 1].is_alive() {
            self.high_water -= 1;
            self.free.forget(self.high_water);
        }
    }

    /// Set a particle's continuous position and move its registration if the
    /// pixel changes. Legality is the caller's business; returns false (and
    /// leaves the particle where it was) only when the target pixel is
    /// already full.
    pub fn relocate(&mut self, slot: usize, nx: f32, ny: f32) -> bool {
        let p = fast!(self.parts, [slot]);
        let from = p.pixel();
        let to = pixel_of(nx, ny);
        if from != to {
            if !self.occupancy.in_bounds(to.0, to.1) {
                return false;
            }
            let energy = self.occupancy.plain_at(from.0, from.1) != Some(slot);
            if !self.occupancy.has_room(to.0, to.1, energy, None) {
                return false;
            }
            if !self.occupancy.relocate(slot, from, to) {
                return false;
            }
        }
        let p = fast_mut!(self.parts, [slot]);
        p.x = nx;
        p.y = ny;
        true
    }

    /// Exchange the positions of two Plain particles
    pub fn swap_plain(&mut self, a: usize, b: usize) {
        let pa = self.parts[a].pixel();
        let pb = self.parts[b].pixel();
        debug_assert_eq!(self.occupancy.plain_at(pa.0, pa.1), Some(a));
        debug_assert_eq!(self.occupancy.plain_at(pb.0, pb.1), Some(b));

        let (ax, ay) = (self.parts[a].x, self.parts[a].y);
        let (bx, by) = (self.parts[b].x, self.parts[b].y);
        self.parts[a].x = bx;
        self.parts[a].y = by;
        self.parts[b].x = ax;
        self.parts[b].y = ay;
        self.occupancy.swap_plain(pa, pb);
    }

    /// Switch the occupancy class of a live particle (element changed
    /// between energy and non-energy). False when the new class has no room.
    pub fn reclassify(&mut self, slot: usize, energy: bool) -> bool {
        let (x, y) = self.parts[slot].pixel();
        let currently_plain = self.occupancy.plain_at(x, y) == Some(slot);
        if currently_plain != energy {
            return true;
        }
        if !self.occupancy.has_room(x, y, energy, None) {
            return false;
        }
        self.occupancy.remove(x, y, slot);
        self.occupancy.add(x, y, slot, energy);
        true
    }

    /// Drop every particle
    pub fn clear(&mut self) {
        self.parts.fill(Particle::DEAD);
        self.free.clear();
        self.high_water = 0;
        self.live = 0;
        self.occupancy.clear();
    }

    /// Debug helper: every live record registered at its rounded position,
    /// every registration pointing at a live record.
    pub fn check_consistency(&self) -> Result<(), String> {
        let mut registered = 0;
        for slot in self.live_slots() {
            let (x, y) = self.parts[slot].pixel();
            if !self.occupancy.query(x, y, Category::All).any(|s| s == slot) {
                return Err(format!("slot {} not registered at ({}, {})", slot, x, y));
            }
            registered += 1;
        }
        if registered != self.live {
            return Err(format!("live count {} but {} live records", self.live, registered));
        }
        if self.occupancy.total() != registered {
            return Err(format!(
                "occupancy holds {} entries for {} live particles",
                self.occupancy.total(),
                registered
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUST: ElementId = 1;
    const PHOT: ElementId = 11;

    fn store(cap: usize) -> ParticleStore {
        ParticleStore::new(16, 16, cap)
    }

    #[test]
    fn create_takes_lowest_free_slot() {
        let mut s = store(8);
        let a = s.create(SlotHint::Auto, 0, 0, DUST, false).unwrap();
        let b = s.create(SlotHint::Auto, 1, 0, DUST, false).unwrap();
        let c = s.create(SlotHint::Auto, 2, 0, DUST, false).unwrap();
        assert_eq!((a, b, c), (0, 1, 2));

        s.kill(b);
        assert_eq!(s.high_water(), 3);
        let d = s.create(SlotHint::Auto, 3, 0, DUST, false).unwrap();
        assert_eq!(d, 1);
        assert_eq!(s.live_count(), 3);
    }

    #[test]
    fn killing_the_tail_shrinks_high_water() {
        let mut s = store(8);
        for x in 0..4 {
            s.create(SlotHint::Auto, x, 0, DUST, false).unwrap();
        }
        s.kill(2);
        s.kill(3);
        assert_eq!(s.high_water(), 2);
        // slot 2 is reachable again via growth, not the free list
        assert_eq!(s.create(SlotHint::Auto, 9, 9, DUST, false), Ok(2));
    }

    #[test]
    fn full_store_reports_no_capacity() {
        let mut s = store(2);
        s.create(SlotHint::Auto, 0, 0, DUST, false).unwrap();
        s.create(SlotHint::Auto, 1, 0, DUST, false).unwrap();
        assert_eq!(
            s.create(SlotHint::Auto, 2, 0, DUST, false),
            Err(CreateError::NoCapacity)
        );
        assert_eq!(s.live_count(), 2);
        s.check_consistency().unwrap();
    }

    #[test]
    fn plain_pixel_accepts_one_particle_but_energy_stacks() {
        let mut s = store(8);
        s.create(SlotHint::Auto, 4, 4, DUST, false).unwrap();
        assert_eq!(
            s.create(SlotHint::Auto, 4, 4, DUST, false),
            Err(CreateError::Occupied)
        );
        assert!(s.create(SlotHint::Auto, 4, 4, PHOT, true).is_ok());
        assert!(s.create(SlotHint::Auto, 4, 4, PHOT, true).is_ok());
        assert_eq!(s.query(4, 4, Category::All).count(), 3);
    }

    #[test]
    fn replace_overwrites_live_slot_in_place() {
        let mut s = store(8);
        let a = s.create(SlotHint::Auto, 2, 2, DUST, false).unwrap();
        s.part_mut(a).temp = 500.0;
        let r = s.create(SlotHint::Replace(a), 2, 2, 5, false).unwrap();
        assert_eq!(r, a);
        assert_eq!(s.part(a).element, 5);
        assert_eq!(s.part(a).temp, 0.0);
        assert_eq!(s.live_count(), 1);
        s.check_consistency().unwrap();
    }

    #[test]
    fn replace_of_dead_slot_falls_back_to_auto() {
        let mut s = store(8);
        let r = s.create(SlotHint::Replace(5), 0, 0, DUST, false).unwrap();
        assert_eq!(r, 0);
    }

    #[test]
    fn out_of_bounds_and_unknown_are_rejected() {
        let mut s = store(8);
        assert_eq!(s.create(SlotHint::Auto, -1, 0, DUST, false), Err(CreateError::OutOfBounds));
        assert_eq!(s.create(SlotHint::Auto, 0, 16, DUST, false), Err(CreateError::OutOfBounds));
        assert_eq!(s.create(SlotHint::Auto, 0, 0, EL_NONE, false), Err(CreateError::UnknownElement));
    }

    #[test]
    fn kill_twice_is_a_noop() {
        let mut s = store(4);
        let a = s.create(SlotHint::Auto, 0, 0, DUST, false).unwrap();
        s.kill(a);
        s.kill(a);
        assert_eq!(s.live_count(), 0);
        s.check_consistency().unwrap();
    }

    #[test]
    fn relocate_moves_registration() {
        let mut s = store(4);
        let a = s.create(SlotHint::Auto, 0, 0, DUST, false).unwrap();
        assert!(s.relocate(a, 0.4, 0.3));
        assert_eq!(s.occupancy().plain_at(0, 0), Some(a));
        assert!(s.relocate(a, 3.0, 2.6));
        assert_eq!(s.occupancy().plain_at(3, 3), Some(a));
        assert_eq!(s.occupancy().plain_at(0, 0), None);
        s.check_consistency().unwrap();
    }

    #[test]
    fn swap_exchanges_positions() {
        let mut s = store(4);
        let a = s.create(SlotHint::Auto, 0, 0, DUST, false).unwrap();
        let b = s.create(SlotHint::Auto, 0, 1, 2, false).unwrap();
        s.swap_plain(a, b);
        assert_eq!(s.part(a).pixel(), (0, 1));
        assert_eq!(s.part(b).pixel(), (0, 0));
        s.check_consistency().unwrap();
    }
}
