//! Sequence Archive Inspection Tool
//!
//! Describe a `.npz` sequence archive, or build a loader from an experiment
//! config and walk one epoch to check shapes and throughput.
//!
//! # Usage
//!
//! ```bash
//! # Print the archive's layout as JSON
//! cargo run --release --bin inspect_archive -- --describe 2_process/out/mntoha/train.npz
//!
//! # Build the loader described by a config and iterate one epoch
//! cargo run --release --bin inspect_archive -- --config configs/mntoha.toml
//!
//! # Generate sample config
//! cargo run --release --bin inspect_archive -- --generate-config mntoha.toml
//! ```
//!
//! Set `RUST_LOG=debug` to see column resolution and per-epoch batching.

use sequence_loader::{
    ExperimentConfig, ExperimentMetadata, FeatureSelection, LoaderConfig, SequenceArchive,
};
use std::time::Instant;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let require_path = |flag: &str| -> &str {
        match args.get(2) {
            Some(path) => path.as_str(),
            None => {
                eprintln!("Error: {flag} requires a path argument");
                std::process::exit(1);
            }
        }
    };

    match args[1].as_str() {
        "--describe" => describe_archive(require_path("--describe")),
        "--config" => run_from_config(require_path("--config")),
        "--generate-config" => generate_sample_config(require_path("--generate-config")),
        "--help" | "-h" => print_usage(&args[0]),
        other => {
            eprintln!("Unknown argument: {other}");
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        r#"
Sequence Archive Inspection Tool

Usage:
    {program} --describe <archive.npz>     Print archive layout as JSON
    {program} --config <path.toml>         Build loader from config, iterate one epoch
    {program} --generate-config <path>     Generate sample config file
    {program} --help                       Show this help
"#
    );
}

fn describe_archive(path: &str) {
    let archive = match SequenceArchive::load(path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("❌ Failed to load archive: {e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&archive.summary()) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("❌ Failed to serialize summary: {e}");
            std::process::exit(1);
        }
    }
}

fn generate_sample_config(path: &str) {
    let sample = ExperimentConfig::new(
        "/path/to/train.npz",
        FeatureSelection::new()
            .with_depths([0.0, 0.5, 1.0, 1.5, 2.0])
            .with_dynamic_features(["ShortWave", "LongWave", "AirTemp", "RelHum", "WindSpeed"])
            .with_static_features(["area", "lon", "lat", "elevation"]),
        LoaderConfig::new(32, true).with_seed(0),
    )
    .with_metadata(
        ExperimentMetadata::new("mntoha-surface")
            .with_description("Surface temperatures from weather drivers")
            .with_tag("mntoha"),
    );

    match sample.save_toml(path) {
        Ok(()) => {
            println!("✅ Generated sample config: {path}");
            println!("\nEdit the following fields before running:");
            println!("  - archive: Path to the .npz sequence archive");
            println!("  - selection.*: Depths and features present in that archive");
        }
        Err(e) => {
            eprintln!("Error generating config: {e}");
            std::process::exit(1);
        }
    }
}

fn run_from_config(config_path: &str) {
    let config = match ExperimentConfig::load_toml(config_path) {
        Ok(c) => {
            println!("✅ Loaded configuration: {config_path}");
            c
        }
        Err(e) => {
            eprintln!("❌ Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    println!("┌─ Configuration Summary ───────────────────────────────────────┐");
    if let Some(meta) = &config.metadata {
        println!("│ Experiment: {}", meta.name);
    }
    println!("│ Archive:    {}", config.archive.display());
    println!("│ Depths:     {:?}", config.selection.depths);
    println!("│ Dynamic:    {:?}", config.selection.dynamic_features);
    println!("│ Static:     {:?}", config.selection.static_features);
    println!(
        "│ Batching:   size={} shuffle={} workers={} drop_last={}",
        config.loader.batch_size,
        config.loader.shuffle,
        config.loader.num_workers,
        config.loader.drop_last
    );
    println!("└────────────────────────────────────────────────────────────────┘");
    println!();

    let start = Instant::now();
    let loader = match config.build_loader() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ Failed to build loader: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "✅ Built loader in {:.2?}: {} sequences, {} batches per epoch",
        start.elapsed(),
        loader.dataset().len(),
        loader.len()
    );

    let start = Instant::now();
    let mut sequences = 0;
    for (i, batch) in loader.iter().enumerate() {
        if i == 0 {
            println!("   dynamic: {:?}", batch.dynamic_features.shape());
            println!("   static:  {:?}", batch.static_features.shape());
            println!("   targets: {:?}", batch.targets.shape());
        }
        sequences += batch.len();
    }
    println!(
        "✅ Iterated one epoch ({sequences} sequences) in {:.2?}",
        start.elapsed()
    );
}
