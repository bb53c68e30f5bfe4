//! Shared fixtures: write `.npz` archives the way numpy's `savez` does.
//!
//! Numeric entries go through `ndarray_npy::WriteNpyExt`; name catalogs are
//! written as fixed-width `<U*` / `|S*` arrays, which `ndarray-npy` cannot
//! produce.

#![allow(dead_code)]

use ndarray::{Array, Array3, Dimension};
use ndarray_npy::{WritableElement, WriteNpyExt};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAGIC: &[u8] = b"\x93NUMPY";

// ============================================================================
// .npy encoders
// ============================================================================

/// Encode a numeric array as `.npy` bytes.
pub fn npy_numeric<A, D>(array: &Array<A, D>) -> Vec<u8>
where
    A: WritableElement,
    D: Dimension,
{
    let mut bytes = Vec::new();
    array.write_npy(&mut bytes).unwrap();
    bytes
}

fn npy_with_header(descr: &str, len: usize, payload: &[u8]) -> Vec<u8> {
    npy_with_shape(descr, &format!("({len},)"), payload)
}

/// Encode a payload under an arbitrary header; the shape is not checked.
pub fn npy_with_shape(descr: &str, shape: &str, payload: &[u8]) -> Vec<u8> {
    let mut header =
        format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}");
    let unpadded = MAGIC.len() + 4 + header.len() + 1;
    header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    header.push('\n');

    let mut out = MAGIC.to_vec();
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Encode names as a numpy unicode (`<U*`) array.
pub fn npy_unicode(names: &[&str]) -> Vec<u8> {
    let width = names
        .iter()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0)
        .max(1);

    let mut payload = Vec::with_capacity(names.len() * width * 4);
    for name in names {
        let mut chars: Vec<char> = name.chars().collect();
        chars.resize(width, '\0');
        for c in chars {
            payload.extend_from_slice(&(c as u32).to_le_bytes());
        }
    }
    npy_with_header(&format!("<U{width}"), names.len(), &payload)
}

/// Encode names as a numpy byte-string (`|S*`) array.
pub fn npy_byte_strings(names: &[&str]) -> Vec<u8> {
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0).max(1);

    let mut payload = Vec::with_capacity(names.len() * width);
    for name in names {
        let mut bytes = name.as_bytes().to_vec();
        bytes.resize(width, 0);
        payload.extend_from_slice(&bytes);
    }
    npy_with_header(&format!("|S{width}"), names.len(), &payload)
}

// ============================================================================
// .npz writers
// ============================================================================

/// Write raw `(entry name, .npy bytes)` pairs into a zip container.
pub fn write_entries(path: &Path, entries: &[(&str, Vec<u8>)], compressed: bool) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let method = if compressed {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };
    let options = SimpleFileOptions::default().compression_method(method);

    for (name, bytes) in entries {
        zip.start_file(format!("{name}.npy"), options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Write a well-formed archive.
pub fn write_archive<A>(
    path: &Path,
    data: &Array3<A>,
    depths: &[f64],
    dynamic: &[&str],
    statics: &[&str],
) where
    A: WritableElement,
{
    let depths = Array::from_vec(depths.to_vec());
    write_entries(
        path,
        &[
            ("data", npy_numeric(data)),
            ("depths_all", npy_numeric(&depths)),
            ("dynamic_features_all", npy_unicode(dynamic)),
            ("static_features_all", npy_unicode(statics)),
        ],
        true,
    );
}

// ============================================================================
// Scenario fixtures
// ============================================================================

/// Value stored at (sequence, timestep, column): `s*100 + t*10 + c`.
pub fn encoded_data(n: usize, t: usize, c: usize) -> Array3<f32> {
    Array::from_shape_fn((n, t, c), |(s, t, c)| (s * 100 + t * 10 + c) as f32)
}

/// Lake archive: depths [5, 10], dynamic [wind, cloud], static [area],
/// data shaped (3 sequences, 4 timesteps, 5 columns).
pub struct LakeArchive {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl LakeArchive {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("train.npz");
        write_archive(
            &path,
            &encoded_data(3, 4, 5),
            &[5.0, 10.0],
            &["wind", "cloud"],
            &["area"],
        );
        Self { dir, path }
    }
}
