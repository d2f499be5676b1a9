//! Deterministic random number generation.
//!
//! RULE: nothing in the pipeline may call any platform RNG.
//! All randomness flows through StratumRng instances derived from the
//! single split seed stored on the run record.
//!
//! Each stratum gets its own stream, seeded from
//! (seed XOR stratum_index * golden ratio). Adding rows to one stratum
//! never changes another stratum's draws.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

pub struct StratumRng {
    inner: Pcg64Mcg,
}

impl StratumRng {
    /// The index must never change once assigned to a stratum.
    pub fn new(seed: u64, stratum_index: u64) -> Self {
        let derived_seed = seed ^ (stratum_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_u64_below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }
}
