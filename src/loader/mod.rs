//! Minibatch iteration over a [`SequenceDataset`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        SequenceLoader                        │
//! │                                                              │
//! │  IndexSampler ──► epoch order ──► chunks of batch_size      │
//! │                                        │                     │
//! │                    num_workers == 0    │    num_workers > 0  │
//! │                   ┌────────────────────┴──────────────────┐  │
//! │                   ▼                                       ▼  │
//! │           gather on caller            rayon pool gathers the │
//! │                                       next num_workers chunks│
//! │                   └────────────────────┬──────────────────┘  │
//! │                                        ▼                     │
//! │                                  SequenceBatch               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Batches come out in sampler order whether or not workers are used. The
//! dataset is only ever read, so workers share it by reference.
//!
//! # Example
//!
//! ```
//! use ndarray::Array3;
//! use sequence_loader::{LoaderConfig, SequenceDataset, SequenceLoader};
//!
//! let dataset = SequenceDataset::new(Array3::zeros((10, 8, 3)), 1, 1, 1).unwrap();
//! let loader = SequenceLoader::new(dataset, LoaderConfig::new(4, true).with_seed(0)).unwrap();
//!
//! assert_eq!(loader.len(), 3);
//! for batch in &loader {
//!     assert_eq!(&batch.targets.shape()[1..], &[8, 1]);
//! }
//! ```

mod batch;
mod sampler;

pub use batch::SequenceBatch;
pub use sampler::{IndexSampler, SamplingOrder};

use crate::config::LoaderConfig;
use crate::dataset::SequenceDataset;
use crate::error::{Result, SequenceError};
use rayon::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Batch-producing wrapper around a [`SequenceDataset`].
///
/// Each call to [`SequenceLoader::iter`] starts a new epoch; with shuffling
/// enabled every epoch visits the sequences in a new order.
pub struct SequenceLoader {
    dataset: SequenceDataset,
    config: LoaderConfig,
    sampler: IndexSampler,
    pool: Option<rayon::ThreadPool>,
    next_epoch: AtomicU64,
}

impl std::fmt::Debug for SequenceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceLoader")
            .field("sequences", &self.dataset.len())
            .field("config", &self.config)
            .field("next_epoch", &self.next_epoch.load(Ordering::Relaxed))
            .finish()
    }
}

impl SequenceLoader {
    /// Wrap a dataset for batch iteration.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidConfig`] if the configuration is invalid or the
    /// worker pool cannot be created.
    pub fn new(dataset: SequenceDataset, config: LoaderConfig) -> Result<Self> {
        config.validate()?;

        let pool = if config.num_workers > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.num_workers)
                .thread_name(|i| format!("sequence-loader-{i}"))
                .build()
                .map_err(|e| {
                    SequenceError::InvalidConfig(format!("failed to create worker pool: {e}"))
                })?;
            Some(pool)
        } else {
            None
        };

        let sampler = IndexSampler::from_config(dataset.len(), &config);

        Ok(Self {
            dataset,
            config,
            sampler,
            pool,
            next_epoch: AtomicU64::new(0),
        })
    }

    /// The wrapped dataset.
    pub fn dataset(&self) -> &SequenceDataset {
        &self.dataset
    }

    /// Loader configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Sequences per batch.
    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    /// Batches per epoch.
    pub fn len(&self) -> usize {
        let n = self.dataset.len();
        if self.config.drop_last {
            n / self.config.batch_size
        } else {
            n.div_ceil(self.config.batch_size)
        }
    }

    /// Whether an epoch yields no batches.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the next epoch.
    pub fn iter(&self) -> BatchIter<'_> {
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        self.epoch(epoch)
    }

    /// Iterate over a specific epoch.
    ///
    /// With a fixed seed the same epoch number always yields the same batches.
    pub fn epoch(&self, epoch: u64) -> BatchIter<'_> {
        let indices = self.sampler.epoch_indices(epoch);
        let chunks: VecDeque<Vec<usize>> = indices
            .chunks(self.config.batch_size)
            .filter(|chunk| !self.config.drop_last || chunk.len() == self.config.batch_size)
            .map(<[usize]>::to_vec)
            .collect();

        log::debug!(
            "Epoch {epoch}: {} batches of up to {} sequences (shuffle={}, workers={})",
            chunks.len(),
            self.config.batch_size,
            self.config.shuffle,
            self.config.num_workers
        );

        BatchIter {
            loader: self,
            pending: chunks,
            ready: VecDeque::new(),
        }
    }

    fn gather_chunks(&self, chunks: Vec<Vec<usize>>) -> Vec<SequenceBatch> {
        let dataset = &self.dataset;
        match &self.pool {
            Some(pool) => pool.install(|| {
                chunks
                    .par_iter()
                    .map(|chunk| SequenceBatch::gather_unchecked(dataset, chunk))
                    .collect()
            }),
            None => chunks
                .iter()
                .map(|chunk| SequenceBatch::gather_unchecked(dataset, chunk))
                .collect(),
        }
    }
}

/// Iterator over one epoch of batches.
pub struct BatchIter<'a> {
    loader: &'a SequenceLoader,
    pending: VecDeque<Vec<usize>>,
    ready: VecDeque<SequenceBatch>,
}

impl Iterator for BatchIter<'_> {
    type Item = SequenceBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ready.is_empty() {
            let take = self.loader.config.num_workers.max(1).min(self.pending.len());
            if take == 0 {
                return None;
            }
            let chunks: Vec<Vec<usize>> = self.pending.drain(..take).collect();
            self.ready.extend(self.loader.gather_chunks(chunks));
        }
        self.ready.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pending.len() + self.ready.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchIter<'_> {}

impl<'a> IntoIterator for &'a SequenceLoader {
    type Item = SequenceBatch;
    type IntoIter = BatchIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
