//! Sequence Archive Module
//!
//! Loads the `.npz` archive produced by the upstream preprocessing stage.
//!
//! # Archive Layout
//!
//! | Entry | Shape | dtype | Meaning |
//! |-------|-------|-------|---------|
//! | `data` | (N, T, C) | float32 / float64 | N sequences × T timesteps × C columns |
//! | `depths_all` | (D,) | int / float | depth of each target column |
//! | `dynamic_features_all` | (F_d,) | `<U*` / `\|S*` | dynamic feature names |
//! | `static_features_all` | (F_s,) | `<U*` / `\|S*` | static feature names |
//!
//! with `C == D + F_d + F_s`. Both `np.savez` and `np.savez_compressed`
//! archives are accepted.
//!
//! The whole `data` array is decoded into memory; float64 archives are
//! narrowed to float32, the element type the batch layer produces.

mod npy;

use crate::error::{Result, SequenceError};
use crate::schema::{ColumnSchema, ResolvedColumns};
use ndarray::{Array1, Array3, Axis, Ix1, Ix3};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Archive entry holding the sequence tensor.
pub const DATA_ENTRY: &str = "data";
/// Archive entry holding the target depths.
pub const DEPTHS_ENTRY: &str = "depths_all";
/// Archive entry holding the dynamic feature names.
pub const DYNAMIC_FEATURES_ENTRY: &str = "dynamic_features_all";
/// Archive entry holding the static feature names.
pub const STATIC_FEATURES_ENTRY: &str = "static_features_all";

/// Shape and column catalog of an archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    /// Number of sequences (first axis)
    pub n_sequences: usize,
    /// Timesteps per sequence (second axis)
    pub sequence_length: usize,
    /// Target depth values
    pub depths: Vec<f64>,
    /// Dynamic feature names
    pub dynamic_features: Vec<String>,
    /// Static feature names
    pub static_features: Vec<String>,
}

impl ArchiveSummary {
    /// Total column count.
    pub fn n_columns(&self) -> usize {
        self.depths.len() + self.dynamic_features.len() + self.static_features.len()
    }
}

/// A fully decoded sequence archive.
#[derive(Debug, Clone)]
pub struct SequenceArchive {
    path: Option<PathBuf>,
    data: Array3<f32>,
    depths: Vec<f64>,
    dynamic_features: Vec<String>,
    static_features: Vec<String>,
}

impl SequenceArchive {
    /// Load and decode an archive from disk.
    ///
    /// # Errors
    ///
    /// - [`SequenceError::ArchiveNotFound`] if `path` does not exist
    /// - [`SequenceError::ArchiveCorrupt`] if it is not a readable `.npz`, an
    ///   entry is missing or has the wrong type, or the column catalog does not
    ///   match the width of `data`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SequenceError::ArchiveNotFound {
                path: path.to_path_buf(),
            },
            _ => SequenceError::corrupt(path, format!("cannot open: {e}")),
        })?;
        let mut zip = ZipArchive::new(file)
            .map_err(|e| SequenceError::corrupt(path, format!("not a zip archive: {e}")))?;

        log::debug!(
            "Opened archive {} ({} entries)",
            path.display(),
            zip.len()
        );

        let data = read_data(path, &read_entry(&mut zip, path, DATA_ENTRY)?)?;
        let depths = read_depths(path, &read_entry(&mut zip, path, DEPTHS_ENTRY)?)?;
        let dynamic_features = read_names(
            path,
            DYNAMIC_FEATURES_ENTRY,
            &read_entry(&mut zip, path, DYNAMIC_FEATURES_ENTRY)?,
        )?;
        let static_features = read_names(
            path,
            STATIC_FEATURES_ENTRY,
            &read_entry(&mut zip, path, STATIC_FEATURES_ENTRY)?,
        )?;

        let mut archive = Self::from_parts(data, depths, dynamic_features, static_features)
            .map_err(|e| SequenceError::corrupt(path, e.to_string()))?;
        archive.path = Some(path.to_path_buf());

        log::debug!(
            "Decoded archive {}: data {:?}, {} depths, {} dynamic, {} static",
            path.display(),
            archive.data.shape(),
            archive.depths.len(),
            archive.dynamic_features.len(),
            archive.static_features.len()
        );

        Ok(archive)
    }

    /// Assemble an archive from in-memory parts.
    ///
    /// # Errors
    ///
    /// [`SequenceError::InvalidLayout`] if the catalog does not partition the
    /// third axis of `data`.
    pub fn from_parts(
        data: Array3<f32>,
        depths: Vec<f64>,
        dynamic_features: Vec<String>,
        static_features: Vec<String>,
    ) -> Result<Self> {
        let width = data.len_of(Axis(2));
        if depths.len() + dynamic_features.len() + static_features.len() != width {
            return Err(SequenceError::InvalidLayout {
                width,
                n_depths: depths.len(),
                n_dynamic: dynamic_features.len(),
                n_static: static_features.len(),
            });
        }

        Ok(Self {
            path: None,
            data,
            depths,
            dynamic_features,
            static_features,
        })
    }

    /// Path the archive was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The raw (sequence, timestep, column) array.
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Target depth values in column order.
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    /// Dynamic feature names in column order.
    pub fn dynamic_features(&self) -> &[String] {
        &self.dynamic_features
    }

    /// Static feature names in column order.
    pub fn static_features(&self) -> &[String] {
        &self.static_features
    }

    /// Number of sequences.
    pub fn n_sequences(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Timesteps per sequence.
    pub fn sequence_length(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Total number of columns.
    pub fn n_columns(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// Canonical column schema (targets, dynamic, static).
    pub fn column_schema(&self) -> ColumnSchema {
        ColumnSchema::new(&self.depths, &self.dynamic_features, &self.static_features)
    }

    /// Canonical column names.
    pub fn column_names(&self) -> Vec<String> {
        self.column_schema()
            .columns()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// Shape and catalog summary.
    pub fn summary(&self) -> ArchiveSummary {
        ArchiveSummary {
            n_sequences: self.n_sequences(),
            sequence_length: self.sequence_length(),
            depths: self.depths.clone(),
            dynamic_features: self.dynamic_features.clone(),
            static_features: self.static_features.clone(),
        }
    }

    /// Copy out the resolved columns, in resolved order.
    pub fn select_columns(&self, columns: &ResolvedColumns) -> Array3<f32> {
        self.data.select(Axis(2), &columns.indices)
    }
}

fn read_entry(zip: &mut ZipArchive<File>, path: &Path, name: &str) -> Result<Vec<u8>> {
    let with_ext = format!("{name}.npy");
    let entry_name = [with_ext.as_str(), name]
        .into_iter()
        .find(|candidate| zip.file_names().any(|f| f == *candidate))
        .map(str::to_string)
        .ok_or_else(|| SequenceError::corrupt(path, format!("missing entry '{name}'")))?;

    let mut entry = zip
        .by_name(&entry_name)
        .map_err(|e| SequenceError::corrupt(path, format!("cannot read entry '{name}': {e}")))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| SequenceError::corrupt(path, format!("cannot inflate entry '{name}': {e}")))?;
    Ok(bytes)
}

fn read_data(path: &Path, bytes: &[u8]) -> Result<Array3<f32>> {
    let npy_err = |e: ndarray_npy::ReadNpyError| {
        SequenceError::corrupt(path, format!("entry '{DATA_ENTRY}': {e}"))
    };

    if let Some(data) = npy::read_as::<f32, Ix3>(bytes).map_err(npy_err)? {
        return Ok(data);
    }
    if let Some(data) = npy::read_as::<f64, Ix3>(bytes).map_err(npy_err)? {
        log::warn!(
            "{}: '{DATA_ENTRY}' is float64, narrowing to float32",
            path.display()
        );
        return Ok(data.mapv(|v| v as f32));
    }

    Err(SequenceError::corrupt(
        path,
        format!("entry '{DATA_ENTRY}' must be float32 or float64"),
    ))
}

fn read_depths(path: &Path, bytes: &[u8]) -> Result<Vec<f64>> {
    let npy_err = |e: ndarray_npy::ReadNpyError| {
        SequenceError::corrupt(path, format!("entry '{DEPTHS_ENTRY}': {e}"))
    };

    macro_rules! try_dtype {
        ($($ty:ty),*) => {
            $(
                if let Some(depths) = npy::read_as::<$ty, Ix1>(bytes).map_err(npy_err)? {
                    return Ok(widen(depths));
                }
            )*
        };
    }

    try_dtype!(f64, f32, i64, i32, i16, i8, u64, u32, u16, u8);

    Err(SequenceError::corrupt(
        path,
        format!("entry '{DEPTHS_ENTRY}' must be a numeric array"),
    ))
}

trait AsDepth: Copy {
    fn as_depth(self) -> f64;
}

macro_rules! impl_as_depth {
    ($($ty:ty),*) => {
        $(impl AsDepth for $ty {
            fn as_depth(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_as_depth!(f64, i64, i32, i16, i8, u64, u32, u16, u8);

// float32 depths keep their shortest float32 decimal form, so 0.1f32 names
// `depth_0.1` rather than `depth_0.10000000149011612`
impl AsDepth for f32 {
    fn as_depth(self) -> f64 {
        self.to_string().parse().unwrap_or(f64::from(self))
    }
}

fn widen<T: AsDepth>(values: Array1<T>) -> Vec<f64> {
    values.iter().map(|&v| v.as_depth()).collect()
}

fn read_names(path: &Path, entry: &str, bytes: &[u8]) -> Result<Vec<String>> {
    npy::read_string_array(bytes)
        .map_err(|reason| SequenceError::corrupt(path, format!("entry '{entry}': {reason}")))
}
