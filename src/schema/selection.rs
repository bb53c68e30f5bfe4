//! Caller-facing column selection and its resolved form.

use serde::{Deserialize, Serialize};

/// Which depths and features to pull out of an archive.
///
/// Order matters: the output columns follow the order given here within
/// each group, not the archive's native order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSelection {
    /// Target depths, in output order
    #[serde(default)]
    pub depths: Vec<f64>,

    /// Dynamic (per-timestep) covariates, in output order
    #[serde(default)]
    pub dynamic_features: Vec<String>,

    /// Static (per-sequence) covariates, in output order
    #[serde(default)]
    pub static_features: Vec<String>,
}

impl FeatureSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target depths.
    pub fn with_depths<I, D>(mut self, depths: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<f64>,
    {
        self.depths = depths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the dynamic features.
    pub fn with_dynamic_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_features = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the static features.
    pub fn with_static_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_features = names.into_iter().map(Into::into).collect();
        self
    }

    /// Total number of selected columns.
    pub fn total_count(&self) -> usize {
        self.depths.len() + self.dynamic_features.len() + self.static_features.len()
    }
}

/// Column positions resolved against an archive, ready for subsetting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    /// Raw column indices: depths, then dynamic, then static
    pub indices: Vec<usize>,
    /// Number of target columns
    pub n_depths: usize,
    /// Number of dynamic feature columns
    pub n_dynamic: usize,
    /// Number of static feature columns
    pub n_static: usize,
}

impl ResolvedColumns {
    /// Indices of the target columns.
    pub fn depth_indices(&self) -> &[usize] {
        &self.indices[..self.n_depths]
    }

    /// Indices of the dynamic feature columns.
    pub fn dynamic_indices(&self) -> &[usize] {
        &self.indices[self.n_depths..self.n_depths + self.n_dynamic]
    }

    /// Indices of the static feature columns.
    pub fn static_indices(&self) -> &[usize] {
        &self.indices[self.n_depths + self.n_dynamic..]
    }
}
