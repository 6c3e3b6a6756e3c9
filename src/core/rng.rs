//! Seeded randomness for shuffles, scatter positions and jitter.
//!
//! A deck keeps one stream per purpose, so drawing a random last card never
//! changes what the next shuffle looks like. Streams are derived from the
//! deck seed and a name; the same seed replays a whole session.
//!
//! ## Usage
//!
//! ```
//! use tarot_deck::core::DeckRng;
//!
//! let deck = DeckRng::new(42);
//! let mut shuffles = deck.for_context("shuffle");
//! let mut again = DeckRng::new(42).for_context("shuffle");
//! assert_eq!(shuffles.gen_range(0..1000), again.gen_range(0..1000));
//! ```

use std::hash::{Hash, Hasher};
use std::ops::Range;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// A ChaCha8 stream tagged with the seed it started from.
#[derive(Clone, Debug)]
pub struct DeckRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl DeckRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Stream named `context`, derived from this stream's seed.
    ///
    /// Deriving does not consume any values from `self`.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `range`, which must not be empty.
    pub fn gen_range(&mut self, range: Range<i32>) -> i32 {
        self.inner.gen_range(range)
    }

    /// Uniform permutation in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Uniform pick, `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Position in the stream, for replaying a session from a snapshot.
    #[must_use]
    pub fn state(&self) -> DeckRngState {
        DeckRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    #[must_use]
    pub fn from_state(state: &DeckRngState) -> Self {
        let mut rng = Self::new(state.seed);
        rng.inner.set_word_pos(state.word_pos);
        rng
    }
}

/// Seed and ChaCha word position of a [`DeckRng`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRngState {
    pub seed: u64,
    pub word_pos: u128,
}
