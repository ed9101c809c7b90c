//! A simple pseudorandom number generator.
//!
//! Specifically, the *really* minimal C PCG32 implementation from
//! <https://www.pcg-random.org/> behind the [rand_core] traits.
//!
//! PCG(32) is the default source of (pseudo)random numbers for a solver as it is simple, fast,
//! and --- important for reproducing solver behaviour --- entirely determined by the seed taken
//! from the [configuration](crate::config::Config::random_seed).
//! A [solver](crate::solver::GenericSolver) is generic over its source of randomness, so
//! swapping the generator is a matter of a different type parameter.

use rand_core::{impls, RngCore, SeedableRng};

/// Multiplier from the reference PCG32 implementation.
const MULTIPLIER: u64 = 6364136223846793005;

/// An increment, odd as PCG requires, and otherwise unmotivated.
const INCREMENT: u64 = 1442695040888963407;

/// State of the generator.
pub struct MinimalPcg32 {
    state: u64,
}

impl RngCore for MinimalPcg32 {
    fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);

        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rotation = (old_state >> 59) as u32;
        xorshifted.rotate_right(rotation)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for MinimalPcg32 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        let mut rng = Self {
            state: u64::from_le_bytes(seed).wrapping_add(INCREMENT),
        };
        // Discard the first output, as the reference implementation does on initialisation.
        rng.next_u32();
        rng
    }
}

impl Default for MinimalPcg32 {
    fn default() -> Self {
        Self::from_seed(u64::default().to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determined_by_seed() {
        let mut first = MinimalPcg32::from_seed(2_u64.to_le_bytes());
        let mut second = MinimalPcg32::from_seed(2_u64.to_le_bytes());
        for _ in 0..64 {
            assert_eq!(first.next_u32(), second.next_u32());
        }
    }

    #[test]
    fn seeds_diverge() {
        let mut first = MinimalPcg32::from_seed(2_u64.to_le_bytes());
        let mut second = MinimalPcg32::from_seed(73_u64.to_le_bytes());
        let first_run: Vec<u32> = (0..8).map(|_| first.next_u32()).collect();
        let second_run: Vec<u32> = (0..8).map(|_| second.next_u32()).collect();
        assert_ne!(first_run, second_run);
    }
}
