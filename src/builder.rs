//! Fluent builder turning an archive plus a column selection into a loader.
//!
//! # Quick Start
//!
//! ```ignore
//! use sequence_loader::SequenceLoaderBuilder;
//!
//! let loader = SequenceLoaderBuilder::new("2_process/out/mntoha/train.npz")
//!     .depths([0.0, 0.5, 1.0])
//!     .dynamic_features(["ShortWave", "LongWave", "AirTemp", "RelHum"])
//!     .static_features(["area", "lon", "lat", "elevation"])
//!     .batch_size(32)
//!     .shuffle(true)
//!     .build()?;
//!
//! for batch in &loader {
//!     let (dynamic, stat, targets) = batch.into_parts();
//!     // dynamic: (32, T, 4), stat: (32, T, 4), targets: (32, T, 3)
//! }
//! ```
//!
//! # Build Steps
//!
//! | Step | Action | Failure |
//! |------|--------|---------|
//! | 1 | Decode the archive | `ArchiveNotFound`, `ArchiveCorrupt` |
//! | 2 | Build canonical names: `depth_<d>…`, dynamic…, static… | – |
//! | 3 | Resolve every requested identifier | `FeatureNotFound` |
//! | 4 | Copy the resolved columns, in requested order | – |
//! | 5 | Wrap in a [`SequenceDataset`] | – |
//! | 6 | Wrap in a [`SequenceLoader`] | `InvalidConfig` |
//!
//! Resolution completes before any column is copied, and nothing is
//! returned unless every step succeeds.

use crate::archive::SequenceArchive;
use crate::config::LoaderConfig;
use crate::dataset::SequenceDataset;
use crate::error::Result;
use crate::loader::SequenceLoader;
use crate::schema::FeatureSelection;
use std::path::{Path, PathBuf};

/// Fluent builder for [`SequenceLoader`]s backed by an archive.
#[derive(Debug, Clone)]
pub struct SequenceLoaderBuilder {
    archive_path: PathBuf,
    selection: FeatureSelection,
    loader: LoaderConfig,
}

impl SequenceLoaderBuilder {
    /// Start a builder for the archive at `archive_path`.
    pub fn new<P: AsRef<Path>>(archive_path: P) -> Self {
        Self {
            archive_path: archive_path.as_ref().to_path_buf(),
            selection: FeatureSelection::default(),
            loader: LoaderConfig::default(),
        }
    }

    // ========================================================================
    // Column selection
    // ========================================================================

    /// Target depths, in output order.
    pub fn depths<I, D>(mut self, depths: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<f64>,
    {
        self.selection = self.selection.with_depths(depths);
        self
    }

    /// Dynamic features, in output order.
    pub fn dynamic_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = self.selection.with_dynamic_features(names);
        self
    }

    /// Static features, in output order.
    pub fn static_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = self.selection.with_static_features(names);
        self
    }

    /// Replace the whole selection.
    pub fn with_selection(mut self, selection: FeatureSelection) -> Self {
        self.selection = selection;
        self
    }

    // ========================================================================
    // Batching
    // ========================================================================

    /// Sequences per batch.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.loader.batch_size = batch_size;
        self
    }

    /// Reshuffle every epoch.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.loader.shuffle = shuffle;
        self
    }

    /// Worker threads for batch gathering.
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.loader.num_workers = num_workers;
        self
    }

    /// Drop an incomplete final batch.
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.loader.drop_last = drop_last;
        self
    }

    /// Fix the shuffle seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.loader.seed = Some(seed);
        self
    }

    /// Replace the whole loader configuration.
    pub fn with_loader_config(mut self, config: LoaderConfig) -> Self {
        self.loader = config;
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Current column selection.
    pub fn selection(&self) -> &FeatureSelection {
        &self.selection
    }

    /// Current loader configuration.
    pub fn loader_config(&self) -> &LoaderConfig {
        &self.loader
    }

    /// Load the archive and build the dataset only.
    pub fn build_dataset(&self) -> Result<SequenceDataset> {
        let archive = SequenceArchive::load(&self.archive_path)?;
        dataset_from_archive(&archive, &self.selection)
    }

    /// Load the archive and build the loader.
    pub fn build(self) -> Result<SequenceLoader> {
        self.loader.validate()?;
        let dataset = self.build_dataset()?;
        let loader = SequenceLoader::new(dataset, self.loader)?;

        log::info!(
            "Built loader for {}: {} sequences × {} timesteps, {} depths / {} dynamic / {} static, {} batches per epoch",
            self.archive_path.display(),
            loader.dataset().len(),
            loader.dataset().sequence_length(),
            loader.dataset().n_depths(),
            loader.dataset().n_dynamic(),
            loader.dataset().n_static(),
            loader.len()
        );

        Ok(loader)
    }

    /// Human-readable description of what will be built.
    pub fn summary(&self) -> String {
        format!(
            "archive={} depths={:?} dynamic={:?} static={:?} batch_size={} shuffle={} workers={}",
            self.archive_path.display(),
            self.selection.depths,
            self.selection.dynamic_features,
            self.selection.static_features,
            self.loader.batch_size,
            self.loader.shuffle,
            self.loader.num_workers
        )
    }
}

/// Subset an in-memory archive to a selection.
///
/// # Errors
///
/// [`crate::SequenceError::FeatureNotFound`] for the first identifier that is
/// not in the archive; no columns are copied in that case.
pub fn dataset_from_archive(
    archive: &SequenceArchive,
    selection: &FeatureSelection,
) -> Result<SequenceDataset> {
    let resolved = archive.column_schema().resolve_selection(selection)?;

    log::debug!(
        "Resolved {} columns: depths {:?}, dynamic {:?}, static {:?}",
        resolved.indices.len(),
        resolved.depth_indices(),
        resolved.dynamic_indices(),
        resolved.static_indices()
    );

    let sequences = archive.select_columns(&resolved);
    SequenceDataset::new(
        sequences,
        resolved.n_depths,
        resolved.n_dynamic,
        resolved.n_static,
    )
}

/// Load an archive and build a loader in one call.
///
/// # Arguments
///
/// * `archive_path` - Path to the `.npz` archive
/// * `dynamic_features` - Dynamic feature names, in output order
/// * `static_features` - Static feature names, in output order
/// * `depths` - Target depths, in output order
/// * `config` - Batch size, shuffle and worker settings
pub fn build_loader<P, D, S>(
    archive_path: P,
    dynamic_features: &[D],
    static_features: &[S],
    depths: &[f64],
    config: &LoaderConfig,
) -> Result<SequenceLoader>
where
    P: AsRef<Path>,
    D: AsRef<str>,
    S: AsRef<str>,
{
    SequenceLoaderBuilder::new(archive_path)
        .depths(depths.iter().copied())
        .dynamic_features(dynamic_features.iter().map(|s| s.as_ref().to_string()))
        .static_features(static_features.iter().map(|s| s.as_ref().to_string()))
        .with_loader_config(config.clone())
        .build()
}
