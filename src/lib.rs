//! Sequence Loader
//!
//! Feature-selected minibatches from multi-depth environmental sequence archives.
//!
//! # Overview
//!
//! An upstream preprocessing stage writes a `.npz` archive holding a
//! (sequence, timestep, column) array of lake observations. The column axis
//! holds temperatures at every depth, then dynamic drivers (weather, ice
//! flags, clarity), then static site attributes. This crate:
//!
//! - decodes the archive into memory
//! - resolves requested depths and features by name
//! - copies out only those columns, in the requested order
//! - serves (dynamic, static, targets) samples by index
//! - batches and shuffles them for training
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Sequence Loader                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  archive/  - .npz decoding (numeric + string entries)           │
//! │  schema/   - Canonical column names, depth naming, selection    │
//! │  dataset   - Indexable container, per-sample column split       │
//! │  loader/   - Sampling order, batch gathering, worker pool       │
//! │  builder   - Archive + selection + config → loader              │
//! │  config    - Loader/experiment configuration (TOML, JSON)       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sequence_loader::{build_loader, LoaderConfig};
//!
//! let loader = build_loader(
//!     "2_process/out/mntoha/train.npz",
//!     &["ShortWave", "LongWave", "AirTemp"],
//!     &["area", "elevation"],
//!     &[0.0, 0.5, 1.0],
//!     &LoaderConfig::new(32, true),
//! )?;
//!
//! for batch in &loader {
//!     // (32, T, 3), (32, T, 2), (32, T, 3)
//!     let (dynamic, stat, targets) = batch.into_parts();
//! }
//! ```

pub mod archive;
pub mod builder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod prelude;
pub mod schema;

// Re-exports - Errors
pub use error::{Result, SequenceError};

// Re-exports - Archive
pub use archive::{ArchiveSummary, SequenceArchive};

// Re-exports - Schema
pub use schema::{ColumnDef, ColumnGroup, ColumnSchema, FeatureSelection, ResolvedColumns};

// Re-exports - Dataset
pub use dataset::{OwnedSequenceSample, SequenceDataset, SequenceSample};

// Re-exports - Loader
pub use loader::{BatchIter, IndexSampler, SamplingOrder, SequenceBatch, SequenceLoader};

// Re-exports - Config
pub use config::{ExperimentConfig, ExperimentMetadata, LoaderConfig};

// Re-exports - Builder
pub use builder::{build_loader, dataset_from_archive, SequenceLoaderBuilder};
