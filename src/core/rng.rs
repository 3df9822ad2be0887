//! Deterministic RNG (xorshift32)
//!
//! The whole generator state is a single `u32`, so a saved simulation can
//! resume with bit-identical randomness. Every probabilistic decision inside a
//! tick draws from the one `Rng` owned by the simulation.

/// Xorshift has a fixed point at zero; a zero seed/state is remapped here.
const ZERO_STATE_REPLACEMENT: u32 = 0x9E37_79B9;

/// 2^-24: converts the top 24 bits of a draw into an f32 in [0, 1).
const F32_UNIT: f32 = 1.0 / 16_777_216.0;

/// Xorshift32 step
#[inline]
pub fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { state: sanitize(seed) }
    }

    /// Entire internal state.
    #[inline]
    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    pub fn set_state(&mut self, state: u32) {
        self.state = sanitize(state);
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        xorshift32(&mut self.state)
    }

    /// Uniform float in [0, 1).
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 * F32_UNIT
    }

    /// Uniform integer in [0, n). `n == 0` yields 0.
    #[inline]
    pub fn below(&mut self, n: u32) -> u32 {
        ((self.next_u32() as u64 * n as u64) >> 32) as u32
    }

    /// One draw, true with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

#[inline]
fn sanitize(state: u32) -> u32 {
    if state == 0 {
        ZERO_STATE_REPLACEMENT
    } else {
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::new(12345);
        let mut b = Rng::new(12345);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn restored_state_resumes_identically() {
        let mut a = Rng::new(7);
        for _ in 0..17 {
            a.next_f32();
        }
        let saved = a.state();
        let expected: Vec<u32> = (0..32).map(|_| a.next_u32()).collect();

        let mut b = Rng::new(999);
        b.set_state(saved);
        let resumed: Vec<u32> = (0..32).map(|_| b.next_u32()).collect();
        assert_eq!(expected, resumed);
    }

    #[test]
    fn zero_seed_does_not_stick() {
        let mut rng = Rng::new(0);
        assert_ne!(rng.state(), 0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn floats_stay_in_unit_interval() {
        let mut rng = Rng::new(42);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn below_respects_bound() {
        let mut rng = Rng::new(3);
        for n in [1u32, 2, 3, 8, 17, 255] {
            for _ in 0..500 {
                assert!(rng.below(n) < n);
            }
        }
        assert_eq!(rng.below(0), 0);
    }
}
