//! End-to-end tests: archive on disk → dataset → batches.
//!
//! These tests verify:
//! 1. Column selection honours the requested order for every group
//! 2. Sample count and slice widths are independent of the selection
//! 3. Unknown identifiers and bad indices fail without building anything
//! 4. Batching, shuffling and worker gathering agree with each other

mod common;

use common::*;
use ndarray::s;
use sequence_loader::prelude::*;
use sequence_loader::{dataset_from_archive, ExperimentMetadata};
use tempfile::TempDir;

fn lake_selection(depths: &[f64], dynamic: &[&str], statics: &[&str]) -> FeatureSelection {
    FeatureSelection::new()
        .with_depths(depths.iter().copied())
        .with_dynamic_features(dynamic.iter().copied())
        .with_static_features(statics.iter().copied())
}

// ============================================================================
// Column selection
// ============================================================================

#[test]
fn test_lake_scenario() {
    let lake = LakeArchive::new();
    let archive = SequenceArchive::load(&lake.path).unwrap();

    let loader = build_loader(
        &lake.path,
        &["cloud", "wind"],
        &["area"],
        &[10.0],
        &LoaderConfig::new(2, false),
    )
    .unwrap();
    let dataset = loader.dataset();
    assert_eq!(dataset.len(), 3);

    let sample = dataset.get(0).unwrap();
    assert_eq!(sample.dynamic_features.shape(), &[4, 2]);
    assert_eq!(sample.static_features.shape(), &[4, 1]);
    assert_eq!(sample.targets.shape(), &[4, 1]);

    // raw layout: depth_5, depth_10, wind, cloud, area
    assert_eq!(sample.dynamic_features.column(0), archive.data().slice(s![0, .., 3]));
    assert_eq!(sample.dynamic_features.column(1), archive.data().slice(s![0, .., 2]));
    assert_eq!(sample.static_features.column(0), archive.data().slice(s![0, .., 4]));
    assert_eq!(sample.targets.column(0), archive.data().slice(s![0, .., 1]));
}

#[test]
fn test_absent_depth_is_named() {
    let lake = LakeArchive::new();
    let result = SequenceLoaderBuilder::new(&lake.path)
        .depths([99.0])
        .dynamic_features(["wind"])
        .build();

    match result {
        Err(err @ SequenceError::FeatureNotFound { .. }) => {
            assert!(err.to_string().contains("depth_99"), "{err}");
        }
        other => panic!("expected FeatureNotFound, got {other:?}"),
    }
}

#[test]
fn test_size_ignores_selection() {
    let lake = LakeArchive::new();
    let archive = SequenceArchive::load(&lake.path).unwrap();

    let selections = [
        lake_selection(&[5.0], &[], &[]),
        lake_selection(&[], &["wind"], &[]),
        lake_selection(&[], &[], &["area"]),
        lake_selection(&[5.0, 10.0], &["wind", "cloud"], &["area"]),
    ];
    for selection in &selections {
        let dataset = dataset_from_archive(&archive, selection).unwrap();
        assert_eq!(dataset.len(), archive.n_sequences());
    }
}

#[test]
fn test_slice_widths_partition_columns() {
    let lake = LakeArchive::new();
    let archive = SequenceArchive::load(&lake.path).unwrap();
    let dataset = dataset_from_archive(
        &archive,
        &lake_selection(&[5.0, 10.0], &["cloud"], &["area"]),
    )
    .unwrap();

    for i in 0..dataset.len() {
        let sample = dataset.get(i).unwrap();
        assert_eq!(sample.targets.ncols(), 2);
        assert_eq!(sample.dynamic_features.ncols(), 1);
        assert_eq!(sample.static_features.ncols(), 1);

        // targets, dynamic, static is the stored order
        let row = dataset.sequences().slice(s![i, .., ..]);
        assert_eq!(sample.targets, row.slice(s![.., 0..2]));
        assert_eq!(sample.dynamic_features, row.slice(s![.., 2..3]));
        assert_eq!(sample.static_features, row.slice(s![.., 3..4]));
    }
}

#[test]
fn test_reversed_depths_keep_requested_order() {
    let lake = LakeArchive::new();
    let archive = SequenceArchive::load(&lake.path).unwrap();
    let dataset =
        dataset_from_archive(&archive, &lake_selection(&[10.0, 5.0], &[], &[])).unwrap();

    let sample = dataset.get(1).unwrap();
    assert_eq!(sample.targets.column(0), archive.data().slice(s![1, .., 1]));
    assert_eq!(sample.targets.column(1), archive.data().slice(s![1, .., 0]));
}

#[test]
fn test_out_of_range_indices() {
    let lake = LakeArchive::new();
    let dataset = SequenceLoaderBuilder::new(&lake.path)
        .depths([5.0])
        .build_dataset()
        .unwrap();

    let n = dataset.len();
    assert!(matches!(
        dataset.get(n),
        Err(SequenceError::OutOfRange { index, len }) if index == n as i64 && len == n
    ));
    assert!(matches!(
        dataset.get_signed(-1),
        Err(SequenceError::OutOfRange { index: -1, .. })
    ));
}

#[test]
fn test_missing_dynamic_feature_leaves_archive_untouched() {
    let lake = LakeArchive::new();
    let archive = SequenceArchive::load(&lake.path).unwrap();
    let before = archive.data().clone();

    let result = dataset_from_archive(
        &archive,
        &lake_selection(&[5.0], &["wind", "snow"], &["area"]),
    );
    match result {
        Err(SequenceError::FeatureNotFound { name }) => assert_eq!(name, "snow"),
        other => panic!("expected FeatureNotFound, got {other:?}"),
    }
    assert_eq!(archive.data(), &before);
    assert_eq!(archive.column_names().len(), 5);
}

#[test]
fn test_bare_depth_value_is_not_a_feature() {
    let lake = LakeArchive::new();
    let archive = SequenceArchive::load(&lake.path).unwrap();

    // depth columns are only reachable through their `depth_` name
    let result = dataset_from_archive(&archive, &lake_selection(&[], &["10"], &[]));
    assert!(matches!(result, Err(SequenceError::FeatureNotFound { .. })));
}

// ============================================================================
// Batching
// ============================================================================

#[test]
fn test_batch_shapes() {
    let lake = LakeArchive::new();
    let loader = SequenceLoaderBuilder::new(&lake.path)
        .depths([5.0, 10.0])
        .dynamic_features(["wind", "cloud"])
        .static_features(["area"])
        .batch_size(2)
        .build()
        .unwrap();

    let batches: Vec<SequenceBatch> = loader.iter().collect();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].dynamic_features.shape(), &[2, 4, 2]);
    assert_eq!(batches[0].static_features.shape(), &[2, 4, 1]);
    assert_eq!(batches[0].targets.shape(), &[2, 4, 2]);
    assert_eq!(batches[1].len(), 1);
    assert_eq!(batches[1].indices, vec![2]);
}

#[test]
fn test_seeded_shuffle_is_reproducible() {
    let lake = LakeArchive::new();
    let build = || {
        SequenceLoaderBuilder::new(&lake.path)
            .depths([5.0])
            .batch_size(1)
            .shuffle(true)
            .seed(42)
            .build()
            .unwrap()
    };

    let a: Vec<usize> = build().epoch(3).flat_map(|b| b.indices).collect();
    let b: Vec<usize> = build().epoch(3).flat_map(|b| b.indices).collect();
    assert_eq!(a, b);

    let mut sorted = a.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2]);
}

#[test]
fn test_workers_yield_same_batches() {
    let lake = LakeArchive::new();
    let build = |workers: usize| {
        SequenceLoaderBuilder::new(&lake.path)
            .depths([10.0])
            .dynamic_features(["cloud"])
            .batch_size(1)
            .shuffle(true)
            .seed(7)
            .num_workers(workers)
            .build()
            .unwrap()
    };

    let serial: Vec<SequenceBatch> = build(0).epoch(0).collect();
    let parallel: Vec<SequenceBatch> = build(2).epoch(0).collect();
    assert_eq!(serial, parallel);
}

// ============================================================================
// Configuration files
// ============================================================================

#[test]
fn test_build_from_experiment_toml() {
    let lake = LakeArchive::new();
    let config_path = lake.dir.path().join("experiment.toml");

    let config = ExperimentConfig::new(
        &lake.path,
        lake_selection(&[10.0], &["cloud", "wind"], &["area"]),
        LoaderConfig::new(3, false),
    )
    .with_metadata(ExperimentMetadata::new("lake-scenario").with_tag("integration"));
    config.save_toml(&config_path).unwrap();

    let loader = ExperimentConfig::load_toml(&config_path)
        .unwrap()
        .build_loader()
        .unwrap();
    assert_eq!(loader.len(), 1);

    let batch = loader.iter().next().unwrap();
    assert_eq!(batch.dynamic_features.shape(), &[3, 4, 2]);
    // cloud is column 3 in the archive: s*100 + t*10 + 3
    assert_eq!(batch.dynamic_features[[2, 1, 0]], 213.0);
}

#[test]
fn test_build_from_hand_written_toml() {
    let lake = LakeArchive::new();
    let config_path = lake.dir.path().join("hand.toml");
    let text = format!(
        "archive = {:?}\n\n[selection]\ndepths = [5]\nstatic_features = [\"area\"]\n\n[loader]\nbatch_size = 2\nshuffle = true\nseed = 1\n",
        lake.path.display().to_string()
    );
    std::fs::write(&config_path, text).unwrap();

    let loader = ExperimentConfig::load_toml(&config_path)
        .unwrap()
        .build_loader()
        .unwrap();
    assert_eq!(loader.dataset().n_depths(), 1);
    assert_eq!(loader.dataset().n_dynamic(), 0);
    assert_eq!(loader.dataset().n_static(), 1);
    assert_eq!(loader.len(), 2);
}

#[test]
fn test_missing_archive_through_config() {
    let dir = TempDir::new().unwrap();
    let config = ExperimentConfig::new(
        dir.path().join("nowhere.npz"),
        lake_selection(&[5.0], &[], &[]),
        LoaderConfig::default(),
    );
    assert!(matches!(
        config.build_loader(),
        Err(SequenceError::ArchiveNotFound { .. })
    ));
}
