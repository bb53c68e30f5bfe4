//! Minibatch tensors gathered from a [`SequenceDataset`].

use crate::dataset::SequenceDataset;
use crate::error::{Result, SequenceError};
use ndarray::{s, Array3, Axis};

/// One minibatch, stacked along a leading batch axis.
///
/// # Shapes
///
/// | Field | Shape |
/// |-------|-------|
/// | `dynamic_features` | (B, T, n_dynamic) |
/// | `static_features` | (B, T, n_static) |
/// | `targets` | (B, T, n_depths) |
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceBatch {
    /// Dataset indices of the sequences in this batch, in batch order
    pub indices: Vec<usize>,
    /// (B, T, n_dynamic)
    pub dynamic_features: Array3<f32>,
    /// (B, T, n_static)
    pub static_features: Array3<f32>,
    /// (B, T, n_depths)
    pub targets: Array3<f32>,
}

impl SequenceBatch {
    /// Gather the given sequences into a batch.
    ///
    /// # Errors
    ///
    /// [`SequenceError::OutOfRange`] if any index is outside the dataset.
    pub fn gather(dataset: &SequenceDataset, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= dataset.len()) {
            return Err(SequenceError::OutOfRange {
                index: i64::try_from(bad).unwrap_or(i64::MAX),
                len: dataset.len(),
            });
        }
        Ok(Self::gather_unchecked(dataset, indices))
    }

    /// Gather without bounds checks; indices must come from `0..dataset.len()`.
    pub(crate) fn gather_unchecked(dataset: &SequenceDataset, indices: &[usize]) -> Self {
        let stacked = dataset.sequences().select(Axis(0), indices);
        let width = stacked.len_of(Axis(2));
        let n_depths = dataset.n_depths();
        let dynamic_end = n_depths + dataset.n_dynamic();

        Self {
            indices: indices.to_vec(),
            dynamic_features: stacked.slice(s![.., .., n_depths..dynamic_end]).to_owned(),
            static_features: stacked
                .slice(s![.., .., width - dataset.n_static()..])
                .to_owned(),
            targets: stacked.slice(s![.., .., ..n_depths]).to_owned(),
        }
    }

    /// Number of sequences in the batch.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Timesteps per sequence.
    pub fn sequence_length(&self) -> usize {
        self.targets.len_of(Axis(1))
    }

    /// Split into `(dynamic_features, static_features, targets)`.
    pub fn into_parts(self) -> (Array3<f32>, Array3<f32>, Array3<f32>) {
        (self.dynamic_features, self.static_features, self.targets)
    }
}
