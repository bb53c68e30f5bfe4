//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use sequence_loader::prelude::*;
//!
//! let loader = SequenceLoaderBuilder::new("train.npz")
//!     .depths([0.0, 1.0])
//!     .dynamic_features(["AirTemp"])
//!     .build()?;
//! ```
//!
//! # What's Included
//!
//! - [`SequenceLoaderBuilder`], [`build_loader`] - Archive to loader
//! - [`SequenceLoader`], [`SequenceBatch`] - Batch iteration
//! - [`SequenceDataset`], [`SequenceSample`] - Indexed samples
//! - [`SequenceArchive`] - Archive decoding
//! - [`FeatureSelection`], [`LoaderConfig`], [`ExperimentConfig`] - Configuration
//! - [`SequenceError`], [`Result`] - Errors

pub use crate::archive::SequenceArchive;
pub use crate::builder::{build_loader, SequenceLoaderBuilder};
pub use crate::config::{ExperimentConfig, LoaderConfig};
pub use crate::dataset::{SequenceDataset, SequenceSample};
pub use crate::error::{Result, SequenceError};
pub use crate::loader::{SequenceBatch, SequenceLoader};
pub use crate::schema::FeatureSelection;
