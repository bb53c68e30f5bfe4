//! Loader and experiment configuration.
//!
//! This module provides the explicit configuration consumed when building a
//! loader, with serialization support for experiment reproducibility.
//!
//! # Features
//!
//! - **Explicit batching**: batch size, shuffle and worker count are passed in,
//!   never read from global state
//! - **Serialization**: Save/load experiment configurations to TOML or JSON
//! - **Validation**: Configurations are checked before use
//!
//! # Example
//!
//! ```ignore
//! use sequence_loader::config::{ExperimentConfig, LoaderConfig};
//! use sequence_loader::FeatureSelection;
//!
//! let config = ExperimentConfig::new(
//!     "2_process/out/mntoha/train.npz",
//!     FeatureSelection::new()
//!         .with_depths([0.0, 0.5, 1.0])
//!         .with_dynamic_features(["ShortWave", "LongWave", "AirTemp"])
//!         .with_static_features(["area", "lon", "lat", "elevation"]),
//!     LoaderConfig::new(32, true),
//! );
//! config.save_toml("configs/train.toml")?;
//!
//! let loader = ExperimentConfig::load_toml("configs/train.toml")?.build_loader()?;
//! ```

use crate::builder::SequenceLoaderBuilder;
use crate::error::{Result, SequenceError};
use crate::loader::SequenceLoader;
use crate::schema::FeatureSelection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of sequences per batch.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Batch iteration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Sequences per batch (must be > 0)
    pub batch_size: usize,

    /// Visit sequences in a new random order every epoch
    pub shuffle: bool,

    /// Worker threads used to gather batches (0 = gather on the calling thread)
    pub num_workers: usize,

    /// Drop the final batch when it is smaller than `batch_size`
    pub drop_last: bool,

    /// Seed for shuffling; epoch `e` uses `seed + e`. `None` draws from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            shuffle: false,
            num_workers: 0,
            drop_last: false,
            seed: None,
        }
    }
}

impl LoaderConfig {
    /// Create a configuration with the given batch size and shuffle flag.
    pub fn new(batch_size: usize, shuffle: bool) -> Self {
        Self {
            batch_size,
            shuffle,
            ..Default::default()
        }
    }

    /// Set the number of gathering worker threads.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Drop an incomplete final batch.
    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// Fix the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SequenceError::InvalidConfig(
                "batch_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Experiment metadata for tracking and reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    /// Experiment name
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Tags for categorization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ExperimentMetadata {
    /// Create metadata stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            created_at: Some(Utc::now()),
            tags: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Everything needed to build a loader: archive, column selection, batching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Path to the `.npz` archive
    pub archive: PathBuf,

    /// Depths and features to load
    pub selection: FeatureSelection,

    /// Batch iteration settings
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Experiment metadata (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExperimentMetadata>,
}

impl ExperimentConfig {
    /// Create a configuration without metadata.
    pub fn new(
        archive: impl Into<PathBuf>,
        selection: FeatureSelection,
        loader: LoaderConfig,
    ) -> Self {
        Self {
            archive: archive.into(),
            selection,
            loader,
            metadata: None,
        }
    }

    /// Attach experiment metadata.
    pub fn with_metadata(mut self, metadata: ExperimentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.archive.as_os_str().is_empty() {
            return Err(SequenceError::InvalidConfig(
                "archive path must not be empty".to_string(),
            ));
        }
        self.loader.validate()
    }

    /// Build the loader this configuration describes.
    pub fn build_loader(&self) -> Result<SequenceLoader> {
        self.validate()?;
        SequenceLoaderBuilder::new(&self.archive)
            .with_selection(self.selection.clone())
            .with_loader_config(self.loader.clone())
            .build()
    }

    /// Save configuration to TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ExperimentConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ExperimentConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
