#![allow(dead_code)]

use rcountries::models::RawRecord;
use rcountries::{FlatTable, api, normalize, storage};
use serde_json::Value;
use std::path::PathBuf;

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/europe_sample.json")
}

/// Sixteen European countries in the REST Countries v3.1 shape.
pub fn fixture_records() -> Vec<RawRecord> {
    storage::load_raw_json(fixture_path()).unwrap()
}

pub fn fixture_table() -> FlatTable {
    normalize::flatten_records(&fixture_records())
}

pub fn table_from(v: Value) -> FlatTable {
    normalize::flatten_records(&api::records_from_value(v).unwrap())
}
