//! Per-epoch visiting order.

use crate::config::LoaderConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// How an epoch's indices are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingOrder {
    /// 0, 1, 2, ...
    Sequential,

    /// A fresh permutation each epoch.
    ///
    /// With a seed, epoch `e` is shuffled by `StdRng::seed_from_u64(seed + e)`
    /// and is therefore reproducible.
    Shuffled {
        /// Base seed (None = OS entropy)
        seed: Option<u64>,
    },
}

/// Produces the order in which sequences are visited.
#[derive(Debug, Clone)]
pub struct IndexSampler {
    len: usize,
    order: SamplingOrder,
}

impl IndexSampler {
    /// Visit `0..len` in order.
    pub fn sequential(len: usize) -> Self {
        Self {
            len,
            order: SamplingOrder::Sequential,
        }
    }

    /// Visit a permutation of `0..len`.
    pub fn shuffled(len: usize, seed: Option<u64>) -> Self {
        Self {
            len,
            order: SamplingOrder::Shuffled { seed },
        }
    }

    /// Build the sampler described by a loader configuration.
    pub fn from_config(len: usize, config: &LoaderConfig) -> Self {
        if config.shuffle {
            Self::shuffled(len, config.seed)
        } else {
            Self::sequential(len)
        }
    }

    /// Number of indices per epoch.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sampler yields nothing.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sampling order.
    pub fn order(&self) -> SamplingOrder {
        self.order
    }

    /// Indices for one epoch.
    pub fn epoch_indices(&self, epoch: u64) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.len).collect();

        if let SamplingOrder::Shuffled { seed } = self.order {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(epoch)),
                None => StdRng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }

        indices
    }
}
