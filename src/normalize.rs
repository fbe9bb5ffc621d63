//! Flatten nested country objects into a `FlatTable`.
//!
//! Nested objects become dot-joined column names (`name.common`, `idd.root`).
//! Scalars and arrays are leaves; arrays are kept whole rather than exploded.

use crate::models::{FlatRow, FlatTable, RawRecord};
use indexmap::IndexSet;
use serde_json::Value;

/// Flatten every record and collect the union of leaf paths as columns.
pub fn flatten_records(records: &[RawRecord]) -> FlatTable {
    let mut columns: IndexSet<String> = IndexSet::new();
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let row = flatten_record(record);
        for key in row.keys() {
            if !columns.contains(key) {
                columns.insert(key.clone());
            }
        }
        rows.push(row);
    }
    log::debug!(
        "flattened {} records into {} columns",
        rows.len(),
        columns.len()
    );
    FlatTable {
        columns: columns.into_iter().collect(),
        rows,
    }
}

/// Flatten a single record into `path -> leaf` pairs, preserving key order.
pub fn flatten_record(record: &RawRecord) -> FlatRow {
    let mut out = FlatRow::new();
    for (key, value) in record {
        walk(key.clone(), value, &mut out);
    }
    out
}

fn walk(path: String, value: &Value, out: &mut FlatRow) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                walk(format!("{path}.{key}"), child, out);
            }
        }
        leaf => {
            out.insert(path, leaf.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> RawRecord {
        match v {
            Value::Object(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn nested_paths_are_dot_joined() {
        let r = rec(json!({
            "name": {"common": "Malta", "nativeName": {"mlt": {"common": "Malta"}}},
            "capital": ["Valletta"],
            "population": 525285
        }));
        let row = flatten_record(&r);
        let keys: Vec<&str> = row.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["name.common", "name.nativeName.mlt.common", "capital", "population"]
        );
        assert_eq!(row["capital"], json!(["Valletta"]));
    }

    #[test]
    fn columns_are_union_in_first_seen_order() {
        let records = vec![
            rec(json!({"a": 1, "b": {"c": 2}})),
            rec(json!({"d": true, "a": 3})),
        ];
        let t = flatten_records(&records);
        assert_eq!(t.columns, vec!["a", "b.c", "d"]);
        assert_eq!(t.get(1, "b.c"), None);
        assert_eq!(t.get(1, "d"), Some(&json!(true)));
    }

    #[test]
    fn empty_objects_produce_no_column() {
        let t = flatten_records(&[rec(json!({"currencies": {}, "area": 10.0}))]);
        assert_eq!(t.columns, vec!["area"]);
    }
}
