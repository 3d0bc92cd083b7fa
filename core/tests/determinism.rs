//! Same seed, same table. Byte for byte.
//!
//! Two generator runs with the same seed must produce identical raw CSV
//! files. Any divergence means a draw moved or a platform RNG crept in.

use finreport_core::{
    config::PipelineConfig,
    generator::{generate, write_raw_csv},
    rng::SeededRng,
};
use tempfile::TempDir;

fn csv_bytes(seed: u64, dir: &TempDir, name: &str) -> Vec<u8> {
    let mut config = PipelineConfig::default().generator;
    config.seed = seed;
    let mut rng = SeededRng::new(seed);
    let records = generate(&config, &mut rng).expect("generate");
    let path = dir.path().join(name);
    write_raw_csv(&path, &records).expect("write csv");
    std::fs::read(&path).expect("read csv")
}

#[test]
fn same_seed_produces_identical_csv() {
    let dir = TempDir::new().unwrap();
    let a = csv_bytes(42, &dir, "a.csv");
    let b = csv_bytes(42, &dir, "b.csv");

    assert!(!a.is_empty());
    assert_eq!(a, b, "CSV output diverged for the same seed");
}

#[test]
fn different_seeds_produce_different_tables() {
    let dir = TempDir::new().unwrap();
    let a = csv_bytes(42, &dir, "a.csv");
    let b = csv_bytes(99, &dir, "b.csv");

    assert_ne!(a, b, "Different seeds produced identical tables; seed is not being used");
}
