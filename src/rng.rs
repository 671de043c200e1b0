//! Seeded random source for the randomize transform.
//!
//! Scans that visit positions in random order must be reproducible in tests,
//! so the generator is injected rather than taken from thread-local state.
//! `ScanRng::new(Some(seed))` always yields the same sequence of permutations.

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Thread-safe, seedable RNG shared by the engine.
pub struct ScanRng {
    inner: Mutex<ChaCha8Rng>,
}

impl ScanRng {
    /// Create a new RNG with optional seed.
    /// If seed is None, uses a random seed from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            inner: Mutex::new(rng),
        }
    }

    /// Uniformly random permutation of `0..len`.
    pub fn permutation(&self, len: usize) -> Vec<usize> {
        let mut rng = self.inner.lock();
        crate::transform::random_permutation(len, &mut *rng)
    }
}

impl Default for ScanRng {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for ScanRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanRng")
            .field("inner", &"<Mutex<ChaCha8Rng>>")
            .finish()
    }
}
