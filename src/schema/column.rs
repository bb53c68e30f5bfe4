//! Column definitions and the canonical column schema of an archive.
//!
//! This module defines the core types for column metadata:
//! - `ColumnGroup`: which logical block a column belongs to
//! - `ColumnDef`: metadata for a single column
//! - `ColumnSchema`: the ordered column list with name lookup

use super::depth::depth_column_name;
use super::selection::{FeatureSelection, ResolvedColumns};
use crate::error::{Result, SequenceError};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Logical block of the archive's column axis.
///
/// Blocks always appear in this order: targets, dynamic, static.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnGroup {
    /// Observed value at one depth (model output)
    Target,

    /// Covariate varying per timestep (e.g. weather drivers)
    Dynamic,

    /// Covariate constant across a sequence (e.g. site attributes)
    Static,
}

impl ColumnGroup {
    /// Get all groups in layout order.
    pub fn all() -> &'static [ColumnGroup] {
        &[ColumnGroup::Target, ColumnGroup::Dynamic, ColumnGroup::Static]
    }

    /// Get the display name for this group.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnGroup::Target => "target",
            ColumnGroup::Dynamic => "dynamic",
            ColumnGroup::Static => "static",
        }
    }
}

/// Definition of a single archive column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Canonical name (`depth_<d>` for targets, feature name otherwise)
    pub name: String,

    /// Position on the archive's third axis
    pub index: usize,

    /// Block the column belongs to
    pub group: ColumnGroup,

    /// Depth value (targets only)
    pub depth: Option<f64>,
}

/// Ordered list of every column in an archive, with name lookup.
///
/// Positions in this list are the authoritative column indices for the raw
/// `data` array.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    columns: Vec<ColumnDef>,
    name_index: AHashMap<String, usize>,
    group_counts: [usize; 3],
}

impl ColumnSchema {
    /// Build the schema from an archive's column catalog.
    ///
    /// When a name occurs more than once, lookups resolve to its first
    /// position.
    pub fn new(depths: &[f64], dynamic_features: &[String], static_features: &[String]) -> Self {
        let total = depths.len() + dynamic_features.len() + static_features.len();
        let mut columns = Vec::with_capacity(total);

        for &depth in depths {
            columns.push(ColumnDef {
                name: depth_column_name(depth),
                index: columns.len(),
                group: ColumnGroup::Target,
                depth: Some(depth),
            });
        }
        for (names, group) in [
            (dynamic_features, ColumnGroup::Dynamic),
            (static_features, ColumnGroup::Static),
        ] {
            for name in names {
                columns.push(ColumnDef {
                    name: name.clone(),
                    index: columns.len(),
                    group,
                    depth: None,
                });
            }
        }

        let mut name_index = AHashMap::with_capacity(total);
        for column in &columns {
            name_index
                .entry(column.name.clone())
                .or_insert(column.index);
        }

        Self {
            columns,
            name_index,
            group_counts: [depths.len(), dynamic_features.len(), static_features.len()],
        }
    }

    /// Total number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All column definitions in layout order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Column names in layout order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of columns in a group.
    pub fn group_len(&self, group: ColumnGroup) -> usize {
        match group {
            ColumnGroup::Target => self.group_counts[0],
            ColumnGroup::Dynamic => self.group_counts[1],
            ColumnGroup::Static => self.group_counts[2],
        }
    }

    /// All columns in a group.
    pub fn columns_in_group(&self, group: ColumnGroup) -> Vec<&ColumnDef> {
        self.columns.iter().filter(|c| c.group == group).collect()
    }

    /// Check if the schema contains a column name.
    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Get a column by name.
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.name_index.get(name).map(|&idx| &self.columns[idx])
    }

    /// Resolve a column name to its index.
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| SequenceError::not_found(name))
    }

    /// Resolve a depth value to its target column index.
    pub fn resolve_depth(&self, depth: f64) -> Result<usize> {
        self.resolve(&depth_column_name(depth))
    }

    /// Resolve a full selection.
    ///
    /// Fails on the first identifier that is absent, in the order depths,
    /// dynamic features, static features.
    pub fn resolve_selection(&self, selection: &FeatureSelection) -> Result<ResolvedColumns> {
        let mut indices = Vec::with_capacity(selection.total_count());

        for &depth in &selection.depths {
            indices.push(self.resolve_depth(depth)?);
        }
        for name in selection
            .dynamic_features
            .iter()
            .chain(&selection.static_features)
        {
            indices.push(self.resolve(name)?);
        }

        Ok(ResolvedColumns {
            indices,
            n_depths: selection.depths.len(),
            n_dynamic: selection.dynamic_features.len(),
            n_static: selection.static_features.len(),
        })
    }
}
