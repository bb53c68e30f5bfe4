//! Indexable sequence container.
//!
//! [`SequenceDataset`] owns a (sequence, timestep, column) array whose column
//! axis is laid out as targets, then dynamic features, then static features.
//! Retrieval hands out [`SequenceSample`] views; nothing is copied until a
//! batch is gathered or [`SequenceSample::into_owned`] is called.
//!
//! # Example
//!
//! ```
//! use ndarray::Array3;
//! use sequence_loader::SequenceDataset;
//!
//! // 10 sequences × 400 timesteps × (49 depths + 9 dynamic + 4 static)
//! let sequences = Array3::<f32>::zeros((10, 400, 62));
//! let dataset = SequenceDataset::new(sequences, 49, 9, 4).unwrap();
//!
//! let sample = dataset.get(0).unwrap();
//! assert_eq!(sample.dynamic_features.shape(), &[400, 9]);
//! assert_eq!(sample.static_features.shape(), &[400, 4]);
//! assert_eq!(sample.targets.shape(), &[400, 49]);
//! ```

use crate::error::{Result, SequenceError};
use ndarray::{s, Array2, Array3, ArrayView2, Axis};

/// One sequence, split into its three column groups.
///
/// Views borrow from the owning [`SequenceDataset`].
#[derive(Debug, Clone)]
pub struct SequenceSample<'a> {
    /// (timesteps, n_dynamic)
    pub dynamic_features: ArrayView2<'a, f32>,
    /// (timesteps, n_static)
    pub static_features: ArrayView2<'a, f32>,
    /// (timesteps, n_depths)
    pub targets: ArrayView2<'a, f32>,
}

impl SequenceSample<'_> {
    /// Copy the views into owned arrays.
    pub fn into_owned(self) -> OwnedSequenceSample {
        OwnedSequenceSample {
            dynamic_features: self.dynamic_features.to_owned(),
            static_features: self.static_features.to_owned(),
            targets: self.targets.to_owned(),
        }
    }
}

/// Owned copy of a [`SequenceSample`].
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedSequenceSample {
    /// (timesteps, n_dynamic)
    pub dynamic_features: Array2<f32>,
    /// (timesteps, n_static)
    pub static_features: Array2<f32>,
    /// (timesteps, n_depths)
    pub targets: Array2<f32>,
}

/// Fixed-size, randomly indexable collection of sequences.
#[derive(Debug, Clone)]
pub struct SequenceDataset {
    sequences: Array3<f32>,
    n_depths: usize,
    n_dynamic: usize,
    n_static: usize,
}

impl SequenceDataset {
    /// Wrap a column-subset array.
    ///
    /// # Arguments
    ///
    /// * `sequences` - (n_sequences, sequence_length, n_depths + n_dynamic + n_static)
    /// * `n_depths` - Number of leading target columns
    /// * `n_dynamic` - Number of dynamic feature columns following the targets
    /// * `n_static` - Number of trailing static feature columns
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidLayout`] if the counts do not sum to the
    /// third-axis length.
    pub fn new(
        sequences: Array3<f32>,
        n_depths: usize,
        n_dynamic: usize,
        n_static: usize,
    ) -> Result<Self> {
        let width = sequences.len_of(Axis(2));
        if n_depths + n_dynamic + n_static != width {
            return Err(SequenceError::InvalidLayout {
                width,
                n_depths,
                n_dynamic,
                n_static,
            });
        }

        Ok(Self {
            sequences,
            n_depths,
            n_dynamic,
            n_static,
        })
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.sequences.len_of(Axis(0))
    }

    /// Whether the dataset holds no sequences.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timesteps per sequence.
    pub fn sequence_length(&self) -> usize {
        self.sequences.len_of(Axis(1))
    }

    /// Number of target columns.
    pub fn n_depths(&self) -> usize {
        self.n_depths
    }

    /// Number of dynamic feature columns.
    pub fn n_dynamic(&self) -> usize {
        self.n_dynamic
    }

    /// Number of static feature columns.
    pub fn n_static(&self) -> usize {
        self.n_static
    }

    /// The underlying array.
    pub fn sequences(&self) -> &Array3<f32> {
        &self.sequences
    }

    /// Retrieve the sequence at `index`.
    ///
    /// # Errors
    ///
    /// [`SequenceError::OutOfRange`] if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<SequenceSample<'_>> {
        if index >= self.len() {
            return Err(SequenceError::OutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len: self.len(),
            });
        }

        let width = self.sequences.len_of(Axis(2));
        let dynamic_end = self.n_depths + self.n_dynamic;

        Ok(SequenceSample {
            dynamic_features: self.sequences.slice(s![index, .., self.n_depths..dynamic_end]),
            static_features: self.sequences.slice(s![index, .., width - self.n_static..]),
            targets: self.sequences.slice(s![index, .., ..self.n_depths]),
        })
    }

    /// Retrieve a sequence by signed index.
    ///
    /// Negative indices are rejected rather than counted from the end.
    pub fn get_signed(&self, index: i64) -> Result<SequenceSample<'_>> {
        match usize::try_from(index) {
            Ok(i) => self.get(i),
            Err(_) => Err(SequenceError::OutOfRange {
                index,
                len: self.len(),
            }),
        }
    }

    /// Iterate over all sequences in order.
    pub fn iter(&self) -> impl Iterator<Item = SequenceSample<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i).ok())
    }
}
