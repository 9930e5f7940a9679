//! Occupancy index: fine pixel -> slot(s) living there
//!
//! Each pixel has one Plain slot (every category except energy) and a
//! small stack of Energy slots. Slots are stored as `slot + 1` so zero means
//! empty and the arrays can be cleared with a fill.
//!
//! Only the particle store and the movement resolver mutate this index.

mod occupants;

pub use occupants::Occupants;

/// Energy particles that may share one pixel
pub const MAX_ENERGY_PER_PIXEL: usize = 4;

const EMPTY: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Plain,
    Energy,
    All,
}

impl Category {
    #[inline]
    pub fn of(energy: bool) -> Self {
        if energy { Category::Energy } else { Category::Plain }
    }
}

#[derive(Clone)]
pub struct OccupancyIndex {
    width: u32,
    height: u32,
    plain: Vec<u32>,
    energy: Vec<[u32; MAX_ENERGY_PER_PIXEL]>,
    energy_len: Vec<u8>,
}

impl OccupancyIndex {
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            plain: vec![EMPTY; size],
            energy: vec![[EMPTY; MAX_ENERGY_PER_PIXEL]; size],
            energy_len: vec![0; size],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Pixel index; `(x, y)` must be in bounds
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.in_bounds(x, y), "pixel ({}, {}) out of bounds", x, y);
        y as usize * self.width as usize + x as usize
    }

    /// Snapshot of the slots at `(x, y)`. The snapshot does not borrow the
    /// index, so callers may kill or move what they visit.
    #[inline]
    pub fn query(&self, x: i32, y: i32, category: Category) -> Occupants {
        let mut out = Occupants::empty();
        if !self.in_bounds(x, y) {
            return out;
        }
        let idx = self.index(x, y);
        if category != Category::Energy {
            let p = *fast!(self.plain, [idx]);
            if p != EMPTY {
                out.push((p - 1) as usize);
            }
        }
        if category != Category::Plain {
            let len = *fast!(self.energy_len, [idx]) as usize;
            let stack = &self.energy[idx];
            for &e in &stack[..len] {
                out.push((e - 1) as usize);
            }
        }
        out
    }

    /// The Plain occupant of `(x, y)`, if any
    #[inline]
    pub fn plain_at(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let p = *fast!(self.plain, [self.index(x, y)]);
        if p == EMPTY { None } else { Some((p - 1) as usize) }
    }

    #[inline]
    pub fn count(&self, x: i32, y: i32, category: Category) -> usize {
        if !self.in_bounds(x, y) {
            return 0;
        }
        let idx = self.index(x, y);
        let plain = (*fast!(self.plain, [idx]) != EMPTY) as usize;
        let energy = *fast!(self.energy_len, [idx]) as usize;
        match category {
            Category::Plain => plain,
            Category::Energy => energy,
            Category::All => plain + energy,
        }
    }

    /// Would a particle of this class fit at `(x, y)`? `ignore` is treated
    /// as absent (used when a slot is replaced in place).
    pub fn has_room(&self, x: i32, y: i32, energy: bool, ignore: Option<usize>) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        let ignore = ignore.map(|s| s as u32 + 1).unwrap_or(EMPTY);
        if energy {
            let len = *fast!(self.energy_len, [idx]) as usize;
            len < MAX_ENERGY_PER_PIXEL || self.energy[idx][..len].contains(&ignore)
        } else {
            let p = *fast!(self.plain, [idx]);
            p == EMPTY || p == ignore
        }
    }

    /// Register `slot` at `(x, y)`. Returns false (and changes nothing) when
    /// the pixel has no room; the store checks first, so in practice a false
    /// here is a logic error.
    pub fn add(&mut self, x: i32, y: i32, slot: usize, energy: bool) -> bool {
        let idx = self.index(x, y);
        let tagged = slot as u32 + 1;
        if energy {
            let len = *fast!(self.energy_len, [idx]) as usize;
            debug_assert!(
                !self.energy[idx][..len].contains(&tagged),
                "slot {} registered twice at ({}, {})", slot, x, y
            );
            if len >= MAX_ENERGY_PER_PIXEL {
                debug_assert!(false, "energy stack overflow at ({}, {})", x, y);
                return false;
            }
            self.energy[idx][len] = tagged;
            fast!(self.energy_len, [idx] = (len + 1) as u8);
        } else {
            let p = *fast!(self.plain, [idx]);
            if p != EMPTY {
                debug_assert!(false, "second plain occupant {} at ({}, {}), holder {}", slot, x, y, p - 1);
                return false;
            }
            fast!(self.plain, [idx] = tagged);
        }
        true
    }

    /// Remove `slot` from `(x, y)`, whichever class it was registered in.
    /// Returns the class it was found in.
    pub fn remove(&mut self, x: i32, y: i32, slot: usize) -> Option<Category> {
        let idx = self.index(x, y);
        let tagged = slot as u32 + 1;
        if *fast!(self.plain, [idx]) == tagged {
            fast!(self.plain, [idx] = EMPTY);
            return Some(Category::Plain);
        }
        let len = *fast!(self.energy_len, [idx]) as usize;
        let stack = &mut self.energy[idx];
        if let Some(pos) = stack[..len].iter().position(|&e| e == tagged) {
            // keep the stack packed, order preserved
            stack.copy_within(pos + 1..len, pos);
            stack[len - 1] = EMPTY;
            fast!(self.energy_len, [idx] = (len - 1) as u8);
            return Some(Category::Energy);
        }
        None
    }

    /// Move a registration between pixels, keeping its class
    pub fn relocate(&mut self, slot: usize, from: (i32, i32), to: (i32, i32)) -> bool {
        if from == to {
            return true;
        }
        match self.remove(from.0, from.1, slot) {
            Some(cat) => {
                let energy = cat == Category::Energy;
                if self.add(to.0, to.1, slot, energy) {
                    true
                } else {
                    // put it back so the index stays consistent
                    self.add(from.0, from.1, slot, energy);
                    false
                }
            }
            None => {
                debug_assert!(false, "slot {} not registered at {:?}", slot, from);
                false
            }
        }
    }

    /// Swap the Plain registrations of two pixels
    pub fn swap_plain(&mut self, a: (i32, i32), b: (i32, i32)) {
        let ia = self.index(a.0, a.1);
        let ib = self.index(b.0, b.1);
        self.plain.swap(ia, ib);
    }

    pub fn clear(&mut self) {
        self.plain.fill(EMPTY);
        self.energy_len.fill(0);
        for stack in self.energy.iter_mut() {
            *stack = [EMPTY; MAX_ENERGY_PER_PIXEL];
        }
    }

    /// Total registrations (tests and debug checks)
    pub fn total(&self) -> usize {
        let plain = self.plain.iter().filter(|&&p| p != EMPTY).count();
        let energy: usize = self.energy_len.iter().map(|&n| n as usize).sum();
        plain + energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_energy_coexist() {
        let mut occ = OccupancyIndex::new(8, 8);
        assert!(occ.add(3, 3, 0, false));
        assert!(occ.add(3, 3, 1, true));
        assert!(occ.add(3, 3, 2, true));

        assert_eq!(occ.count(3, 3, Category::Plain), 1);
        assert_eq!(occ.count(3, 3, Category::Energy), 2);
        assert_eq!(occ.query(3, 3, Category::All).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(occ.query(3, 3, Category::Energy).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(occ.plain_at(3, 3), Some(0));
    }

    #[test]
    fn room_checks_respect_limits() {
        let mut occ = OccupancyIndex::new(4, 4);
        occ.add(1, 1, 5, false);
        assert!(!occ.has_room(1, 1, false, None));
        assert!(occ.has_room(1, 1, false, Some(5)));
        for s in 0..MAX_ENERGY_PER_PIXEL {
            assert!(occ.has_room(1, 1, true, None));
            occ.add(1, 1, 10 + s, true);
        }
        assert!(!occ.has_room(1, 1, true, None));
        assert!(!occ.has_room(-1, 0, false, None));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn second_plain_occupant_is_a_defect() {
        let mut occ = OccupancyIndex::new(4, 4);
        occ.add(0, 0, 0, false);
        occ.add(0, 0, 1, false);
    }

    #[test]
    fn query_snapshot_survives_removal() {
        let mut occ = OccupancyIndex::new(4, 4);
        occ.add(2, 2, 7, true);
        occ.add(2, 2, 8, true);
        let snapshot = occ.query(2, 2, Category::Energy);
        let mut seen = Vec::new();
        for slot in snapshot.clone() {
            occ.remove(2, 2, slot);
            seen.push(slot);
        }
        assert_eq!(seen, vec![7, 8]);
        assert_eq!(occ.count(2, 2, Category::All), 0);
        // restartable
        assert_eq!(snapshot.count(), 2);
    }

    #[test]
    fn relocate_keeps_class() {
        let mut occ = OccupancyIndex::new(4, 4);
        occ.add(0, 0, 3, true);
        assert!(occ.relocate(3, (0, 0), (1, 0)));
        assert_eq!(occ.count(1, 0, Category::Energy), 1);
        assert_eq!(occ.count(0, 0, Category::All), 0);
    }

    #[test]
    fn out_of_bounds_queries_are_empty() {
        let occ = OccupancyIndex::new(4, 4);
        assert_eq!(occ.query(-1, 2, Category::All).count(), 0);
        assert_eq!(occ.count(4, 0, Category::All), 0);
        assert_eq!(occ.plain_at(0, 9), None);
    }
}
