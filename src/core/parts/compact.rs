use super::{Particle, ParticleStore};

impl ParticleStore {
    /// Pack live particles into `0..live_count()` keeping their relative
    /// order. Returns `remap[old] = Some(new)` for every slot below the old
    /// high-water mark (`None` for dead ones).
    ///
    /// Only valid between ticks: any slot index cached by a caller is stale
    /// afterwards and must be translated through the remap.
    pub fn compact(&mut self) -> Vec<Option<usize>> {
        let old_high = self.high_water;
        let mut remap = vec![None; old_high];
        let mut next = 0usize;

        for old in 0..old_high {
            if !self.parts[old].is_alive() {
                continue;
            }
            if old != next {
                let (x, y) = self.parts[old].pixel();
                let cat = self.occupancy.remove(x, y, old);
                debug_assert!(cat.is_some(), "live slot {} missing from occupancy", old);
                let energy = cat == Some(crate::spatial::occupancy::Category::Energy);

                self.parts[next] = self.parts[old];
                self.parts[old] = Particle::DEAD;
                self.occupancy.add(x, y, next, energy);
            }
            remap[old] = Some(next);
            next += 1;
        }

        self.high_water = next;
        debug_assert_eq!(next, self.live);
        let parts = &self.parts;
        self.free.rebuild(next, |slot| parts[slot].is_alive());
        remap
    }
}

#[cfg(test)]
mod tests {
    use crate::core::parts::{ParticleStore, SlotHint};

    #[test]
    fn compact_packs_and_preserves_order() {
        let mut s = ParticleStore::new(8, 8, 8);
        for x in 0..6 {
            s.create(SlotHint::Auto, x, 0, 1 + (x as u8 % 2), false).unwrap();
        }
        s.create(SlotHint::Auto, 0, 1, 11, true).unwrap();
        s.kill(1);
        s.kill(4);

        let remap = s.compact();
        assert_eq!(remap, vec![Some(0), None, Some(1), Some(2), None, Some(3), Some(4)]);
        assert_eq!(s.high_water(), 5);
        assert_eq!(s.live_count(), 5);
        assert_eq!(s.part(1).pixel(), (2, 0));
        assert_eq!(s.part(4).element, 11);
        s.check_consistency().unwrap();

        // no holes left, next create grows
        assert_eq!(s.create(SlotHint::Auto, 7, 7, 1, false), Ok(5));
    }
}
