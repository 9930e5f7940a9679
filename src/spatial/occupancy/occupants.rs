use super::MAX_ENERGY_PER_PIXEL;

const CAP: usize = MAX_ENERGY_PER_PIXEL + 1;

/// Slots found at one pixel, copied out of the index.
///
/// Plain occupant first, then energy occupants in registration order.
/// `Clone` gives a fresh pass over the same snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Occupants {
    slots: [u32; CAP],
    len: u8,
    pos: u8,
}

impl Occupants {
    #[inline]
    pub(super) fn empty() -> Self {
        Self { slots: [0; CAP], len: 0, pos: 0 }
    }

    #[inline]
    pub(super) fn push(&mut self, slot: usize) {
        fast!(self.slots, [self.len as usize] = slot as u32);
        self.len += 1;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.len
    }
}

impl Iterator for Occupants {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.pos >= self.len {
            return None;
        }
        let slot = self.slots[self.pos as usize] as usize;
        self.pos += 1;
        Some(slot)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.len - self.pos) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Occupants {}
