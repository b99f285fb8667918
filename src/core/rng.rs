//! Seedable random source passed explicitly through the search.
//!
//! Every random decision in the search (which untried action to expand,
//! which opponent reply to sample, every roll-out move, the random tree
//! policy) draws from a `SearchRng` owned by the driver. Two searches built
//! with the same seed over the same game produce identical trees.
//!
//! ```
//! use ocba_mcts::core::SearchRng;
//!
//! let mut rng = SearchRng::new(42);
//! let mut rollout_rng = rng.fork();
//!
//! // Forks are deterministic: same parent seed, same fork count.
//! let mut again = SearchRng::new(42).fork();
//! assert_eq!(rollout_rng.pick_index(100), again.pick_index(100));
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Golden-ratio increment used to spread fork seeds apart.
const FORK_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic random source for tree search.
///
/// ChaCha8 keeps the stream portable across platforms, so a seed recorded in
/// a `SearchConfig` reproduces the same tree anywhere.
#[derive(Clone, Debug)]
pub struct SearchRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl SearchRng {
    /// Create a random source from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Seed this source was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent stream, e.g. for a single roll-out.
    ///
    /// The parent only advances its fork counter, so drawing from the fork
    /// never perturbs the parent's own sequence.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        Self::new(self.seed.wrapping_add(self.fork_counter.wrapping_mul(FORK_STRIDE)))
    }

    /// Uniform index in `0..len`, or `None` when `len == 0`.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.inner.gen_range(0..len))
        }
    }

    /// Uniformly chosen element of a slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Capture the current position in the stream.
    #[must_use]
    pub fn state(&self) -> SearchRngState {
        SearchRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
            fork_counter: self.fork_counter,
        }
    }

    /// Resume a stream captured with [`SearchRng::state`].
    #[must_use]
    pub fn from_state(state: &SearchRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
            fork_counter: state.fork_counter,
        }
    }
}

/// Serializable snapshot of a [`SearchRng`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRngState {
    /// Seed of the stream.
    pub seed: u64,
    /// ChaCha8 word position.
    pub word_pos: u128,
    /// Number of forks taken so far.
    pub fork_counter: u64,
}
