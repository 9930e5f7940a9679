//! Deterministic RNG owned by the simulation.
//!
//! Same xorshift32 the engine always used; seeded from `SimConfig::seed` so
//! two runs over the same initial state produce identical particle arrays.

/// Xorshift32 random number generator
#[inline]
pub fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

#[derive(Clone, Debug)]
pub struct SimRng {
    state: u32,
}

impl SimRng {
    pub fn new(seed: u32) -> Self {
        // xorshift has a fixed point at zero
        let state = if seed == 0 { 0x9E37_79B9 } else { seed };
        Self { state }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        xorshift32(&mut self.state)
    }

    /// Uniform in `[0, n)`; `n == 0` yields 0.
    #[inline]
    pub fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.next_u32() % n
    }

    /// Uniform in `[-1.0, 1.0)`
    #[inline]
    pub fn signed_unit(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 23) as f32 - 1.0
    }

    /// Random neighbour offset in the 3x3 ring (never (0, 0))
    #[inline]
    pub fn neighbour(&mut self) -> (i32, i32) {
        const RING: [(i32, i32); 8] = [
            (-1, -1), (0, -1), (1, -1),
            (-1, 0),           (1, 0),
            (-1, 1),  (0, 1),  (1, 1),
        ];
        RING[(self.next_u32() & 7) as usize]
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}
