//! Free-slot bitset below the high-water mark
//!
//! Bit set = slot free. `hint` is the lowest word that may still contain a
//! set bit, so the common "take lowest" scan starts where the last one left
//! off.

pub(super) struct FreeSlots {
    bits: Vec<u64>,
    hint: usize,
}

impl FreeSlots {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            bits: vec![0u64; capacity.div_ceil(64)],
            hint: usize::MAX,
        }
    }

    #[inline(always)]
    fn set_bit(bits: &mut [u64], idx: usize) {
        let word = idx >> 6;
        let bit = idx & 63;
        if word < bits.len() {
            bits[word] |= 1u64 << bit;
        }
    }

    #[inline(always)]
    fn clear_bit(bits: &mut [u64], idx: usize) {
        let word = idx >> 6;
        let bit = idx & 63;
        if word < bits.len() {
            bits[word] &= !(1u64 << bit);
        }
    }

    #[inline(always)]
    pub(super) fn check_bit(&self, idx: usize) -> bool {
        let word = idx >> 6;
        let bit = idx & 63;
        word < self.bits.len() && (self.bits[word] & (1u64 << bit)) != 0
    }

    /// Mark `slot` free
    #[inline]
    pub(super) fn release(&mut self, slot: usize) {
        Self::set_bit(&mut self.bits, slot);
        let word = slot >> 6;
        if word < self.hint {
            self.hint = word;
        }
    }

    /// Drop `slot` from the set without handing it out (it fell above the
    /// high-water mark)
    #[inline]
    pub(super) fn forget(&mut self, slot: usize) {
        Self::clear_bit(&mut self.bits, slot);
    }

    /// Claim the lowest free slot below `limit`
    pub(super) fn take_lowest(&mut self, limit: usize) -> Option<usize> {
        if self.hint == usize::MAX {
            return None;
        }
        let words = limit.div_ceil(64).min(self.bits.len());
        for w in self.hint..words {
            let word = self.bits[w];
            if word != 0 {
                let slot = (w << 6) | word.trailing_zeros() as usize;
                if slot >= limit {
                    return None;
                }
                Self::clear_bit(&mut self.bits, slot);
                self.hint = w;
                return Some(slot);
            }
        }
        self.hint = usize::MAX;
        None
    }

    pub(super) fn clear(&mut self) {
        self.bits.fill(0);
        self.hint = usize::MAX;
    }

    /// Rebuild from the liveness of `0..high_water`
    pub(super) fn rebuild(&mut self, high_water: usize, alive: impl Fn(usize) -> bool) {
        self.clear();
        for slot in 0..high_water {
            if !alive(slot) {
                self.release(slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_slot_first() {
        let mut f = FreeSlots::new(200);
        f.release(130);
        f.release(7);
        f.release(64);
        assert!(f.check_bit(64));
        assert_eq!(f.take_lowest(200), Some(7));
        assert_eq!(f.take_lowest(200), Some(64));
        assert_eq!(f.take_lowest(200), Some(130));
        assert_eq!(f.take_lowest(200), None);
    }

    #[test]
    fn limit_hides_forgotten_tail() {
        let mut f = FreeSlots::new(64);
        f.release(10);
        f.forget(10);
        assert_eq!(f.take_lowest(64), None);
        f.release(3);
        assert_eq!(f.take_lowest(3), None);
    }
}
