//! Tests for dataset build and lookup
//!
//! These tests verify:
//! - Build + lookup round-trips through the key scheme
//! - CaseKeyList persistence and lazy derivation
//! - Dataset length from store statistics
//! - Error paths: unknown keys, loader failures, non-uniform cases

use std::path::Path;

use casevault::{
    build, Config, DataType, DatasetReader, DatasetWriter, LoaderResult, TypedArray, VaultError,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// One 4x4 float32 and one length-2 int64 array, seeded per case
fn two_arrays(seed: u8) -> Vec<TypedArray> {
    let image: Vec<f32> = (0..16).map(|i| (i + seed as i32) as f32).collect();
    let label: Vec<i64> = vec![seed as i64, -(seed as i64)];
    vec![
        TypedArray::from_vec(vec![4, 4], image).unwrap(),
        TypedArray::from_vec(vec![2], label).unwrap(),
    ]
}

fn two_array_loader(key: &str) -> LoaderResult<Vec<TypedArray>> {
    Ok(two_arrays(key.len() as u8))
}

fn build_abc(root: &Path, name: &str) {
    let cases: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    build(root, name, &cases, two_array_loader).unwrap();
}

// =============================================================================
// Build + Lookup Tests
// =============================================================================

#[test]
fn test_lookup_returns_original_arrays() {
    let temp = TempDir::new().unwrap();
    let originals = two_arrays(7);
    let expected = originals.clone();

    let cases = vec!["x".to_string()];
    build(temp.path(), "db", &cases, move |_| Ok(originals.clone())).unwrap();

    let reader = DatasetReader::open(temp.path(), "db").unwrap();
    let arrays = reader.get("x").unwrap();

    assert_eq!(arrays.len(), 2);
    assert_eq!(arrays[0].shape(), &[4, 4]);
    assert_eq!(arrays[0].dtype(), DataType::Float32);
    assert_eq!(arrays[1].shape(), &[2]);
    assert_eq!(arrays[1].dtype(), DataType::Int64);
    assert_eq!(arrays[0].as_bytes(), expected[0].as_bytes());
    assert_eq!(arrays[1].as_bytes(), expected[1].as_bytes());
}

#[test]
fn test_build_writes_key_list_in_input_order() {
    let temp = TempDir::new().unwrap();
    let cases: Vec<String> = ["zeta", "alpha", "mid"].iter().map(|s| s.to_string()).collect();
    build(temp.path(), "db", &cases, two_array_loader).unwrap();

    let reader = DatasetReader::open(temp.path(), "db").unwrap();
    assert_eq!(reader.keys(), &["zeta", "alpha", "mid"]);
}

#[test]
fn test_build_pairs_passes_payload_to_loader() {
    let temp = TempDir::new().unwrap();
    let cases: Vec<(String, Vec<f32>)> = vec![
        ("first".to_string(), vec![1.0, 2.0]),
        ("second".to_string(), vec![3.0, 4.0]),
    ];

    let writer = DatasetWriter::new(temp.path(), "db");
    writer
        .build_pairs(&cases, |payload: &Vec<f32>| {
            Ok(vec![TypedArray::from_vec(vec![2], payload.clone())?])
        })
        .unwrap();

    let reader = DatasetReader::open(temp.path(), "db").unwrap();
    let arrays = reader.get("second").unwrap();
    assert_eq!(arrays[0].to_vec::<f32>().unwrap(), vec![3.0, 4.0]);
}

#[test]
fn test_dataset_length() {
    let temp = TempDir::new().unwrap();
    let cases: Vec<String> = (0..4).map(|i| format!("case{i}")).collect();
    // Every case has exactly m=3 arrays.
    build(temp.path(), "db", &cases, |_| {
        Ok(vec![
            TypedArray::from_vec(vec![2, 2], vec![0f32; 4])?,
            TypedArray::from_vec(vec![2, 2], vec![1f32; 4])?,
            TypedArray::from_vec(vec![2, 2], vec![2f32; 4])?,
        ])
    })
    .unwrap();

    let reader = DatasetReader::open(temp.path(), "db").unwrap();
    assert_eq!(reader.len(), 4);
    assert!(!reader.is_empty());
}

#[test]
fn test_empty_dataset() {
    let temp = TempDir::new().unwrap();
    build(temp.path(), "db", &[], two_array_loader).unwrap();

    let reader = DatasetReader::open(temp.path(), "db").unwrap();
    assert_eq!(reader.len(), 0);
    assert!(reader.is_empty());
    assert!(reader.keys().is_empty());
}

// =============================================================================
// CaseKeyList Tests
// =============================================================================

#[test]
fn test_open_derives_missing_key_list() {
    let temp = TempDir::new().unwrap();
    build_abc(temp.path(), "db");

    // Drop the side file; the reader must rebuild it from a store scan.
    let keys_file = temp.path().join("db_keys.lst");
    std::fs::remove_file(&keys_file).unwrap();

    let first = DatasetReader::open(temp.path(), "db").unwrap();
    let derived: Vec<String> = first.keys().to_vec();
    assert_eq!(derived, vec!["a", "b", "c"]);
    assert!(keys_file.is_file());
    first.close();

    // Second open loads the persisted file and sees the same list.
    let second = DatasetReader::open(temp.path(), "db").unwrap();
    assert_eq!(second.keys(), &derived[..]);
    assert_eq!(second.len(), 3);
}

#[test]
fn test_forget_key_is_cache_only() {
    let temp = TempDir::new().unwrap();
    build_abc(temp.path(), "db");

    let mut reader = DatasetReader::open(temp.path(), "db").unwrap();
    assert!(reader.forget_key("b"));
    assert!(!reader.forget_key("b"));

    assert!(!reader.has_key("b"));
    assert!(matches!(
        reader.get("b"),
        Err(VaultError::KeyNotFound(_))
    ));
    // Store contents and the derived length are untouched.
    assert_eq!(reader.len(), 3);
    reader.close();

    // A fresh handle still sees the key.
    let fresh = DatasetReader::open(temp.path(), "db").unwrap();
    assert!(fresh.has_key("b"));
    assert_eq!(fresh.get("b").unwrap().len(), 2);
}

// =============================================================================
// Error Path Tests
// =============================================================================

#[test]
fn test_get_unknown_key() {
    let temp = TempDir::new().unwrap();
    build_abc(temp.path(), "db");

    let reader = DatasetReader::open(temp.path(), "db").unwrap();
    let result = reader.get("nonexistent");
    assert!(matches!(result, Err(VaultError::KeyNotFound(_))));

    // The failed lookup did not disturb the store.
    assert_eq!(reader.len(), 3);
    assert_eq!(reader.get("a").unwrap().len(), 2);
}

#[test]
fn test_loader_failure_aborts_build() {
    let temp = TempDir::new().unwrap();
    let cases: Vec<String> = ["good", "bad"].iter().map(|s| s.to_string()).collect();

    let result = build(temp.path(), "db", &cases, |key| {
        if key == "bad" {
            Err("unreadable input".into())
        } else {
            Ok(two_arrays(1))
        }
    });

    assert!(matches!(result, Err(VaultError::Loader { .. })));
    // The key list is only written after a complete build.
    assert!(!temp.path().join("db_keys.lst").exists());
}

#[test]
fn test_non_uniform_array_count_is_fatal() {
    let temp = TempDir::new().unwrap();
    let cases: Vec<String> = ["one", "two"].iter().map(|s| s.to_string()).collect();

    let result = build(temp.path(), "db", &cases, |key| {
        let mut arrays = vec![TypedArray::from_vec(vec![2], vec![0f32, 1.0])?];
        if key == "two" {
            arrays.push(TypedArray::from_vec(vec![2], vec![2f32, 3.0])?);
        }
        Ok(arrays)
    });

    assert!(matches!(
        result,
        Err(VaultError::NonUniformCase {
            expected: 1,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn test_newline_in_key_rejected_before_writing() {
    let temp = TempDir::new().unwrap();
    let cases = vec!["ok".to_string(), "bad\nkey".to_string()];

    let result = build(temp.path(), "db", &cases, two_array_loader);

    assert!(matches!(result, Err(VaultError::InvalidKey(_))));
    // Validation runs before the store directory is created.
    assert!(!temp.path().join("db").exists());
}

#[test]
fn test_writer_with_config() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().map_size(512 * 1024).build();
    let writer = DatasetWriter::with_config(temp.path(), "db", config);

    let cases = vec!["k".to_string()];
    writer.build(&cases, two_array_loader).unwrap();

    let reader = DatasetReader::open(temp.path(), "db").unwrap();
    assert_eq!(reader.len(), 1);
    assert_eq!(format!("{reader}"), format!("DatasetReader ({})", temp.path().join("db").display()));
}
