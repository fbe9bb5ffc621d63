use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One country object exactly as the API returned it.
pub type RawRecord = Map<String, Value>;

/// One flattened country: dot-path column -> leaf value.
pub type FlatRow = IndexMap<String, Value>;

/// Tabular view over flattened records.
///
/// `columns` is the union of every leaf path across all rows, in the order the
/// paths were first seen. A row that lacks a path reads as null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    pub columns: Vec<String>,
    pub rows: Vec<FlatRow>,
}

impl FlatTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Value at (`row`, `column`); `None` when the row lacks the path or holds JSON null.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .filter(|v| !v.is_null())
    }

    /// Remove every column for which `pred` returns true, from the header and all rows.
    pub fn drop_columns_where<F>(&mut self, pred: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        let (dropped, kept): (Vec<String>, Vec<String>) =
            self.columns.drain(..).partition(|c| pred(c.as_str()));
        self.columns = kept;
        for row in &mut self.rows {
            row.retain(|k, _| !pred(k.as_str()));
        }
        dropped
    }

    /// Info-style schema: per column, how many rows hold a value and what kind it is.
    pub fn schema(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .map(|col| {
                let mut non_null = 0usize;
                let mut kind: Option<ColumnKind> = None;
                for row in &self.rows {
                    if let Some(v) = row.get(col).filter(|v| !v.is_null()) {
                        non_null += 1;
                        let k = ColumnKind::of(v);
                        kind = Some(match kind {
                            None => k,
                            Some(prev) => prev.widen(k),
                        });
                    }
                }
                ColumnSummary {
                    name: col.clone(),
                    non_null,
                    kind: kind.unwrap_or(ColumnKind::Object),
                }
            })
            .collect()
    }
}

/// Storage kind inferred for a flat column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Int64,
    Float64,
    Object,
}

impl ColumnKind {
    fn of(v: &Value) -> Self {
        match v {
            Value::Bool(_) => ColumnKind::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => ColumnKind::Int64,
            Value::Number(_) => ColumnKind::Float64,
            _ => ColumnKind::Object,
        }
    }

    /// Common kind of two observed kinds (ints widen to floats, anything else mixed is object).
    fn widen(self, other: Self) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int64, Float64) | (Float64, Int64) => Float64,
            _ => Object,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnKind::Bool => "bool",
            ColumnKind::Int64 => "int64",
            ColumnKind::Float64 => "float64",
            ColumnKind::Object => "object",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub name: String,
    pub non_null: usize,
    pub kind: ColumnKind,
}

/// A country name as it may appear in a record: either the nested
/// `{"common": .., "official": ..}` object or an already-flat value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NameField<'a> {
    Nested(&'a Map<String, Value>),
    Flat(&'a Value),
}

impl<'a> NameField<'a> {
    pub fn from_value(v: &'a Value) -> Self {
        match v {
            Value::Object(map) => NameField::Nested(map),
            other => NameField::Flat(other),
        }
    }

    /// The display name: `common` of a nested name, or the flat value itself.
    pub fn common(&self) -> Option<String> {
        match self {
            NameField::Nested(map) => map.get("common").and_then(value_to_text),
            NameField::Flat(v) => value_to_text(v),
        }
    }
}

/// Render a scalar JSON value as text (strings unquoted); null and containers yield `None`.
pub fn value_to_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Equal-frequency population density class, ordered from sparsest to densest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DensityBin {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl DensityBin {
    pub const ALL: [DensityBin; 5] = [
        DensityBin::VeryLow,
        DensityBin::Low,
        DensityBin::Medium,
        DensityBin::High,
        DensityBin::VeryHigh,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DensityBin::VeryLow => "Very Low",
            DensityBin::Low => "Low",
            DensityBin::Medium => "Medium",
            DensityBin::High => "High",
            DensityBin::VeryHigh => "Very High",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }
}

/// Number of density bins.
pub const BIN_COUNT: usize = DensityBin::ALL.len();

impl fmt::Display for DensityBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cleaned country row (one row = one country, CSV column order).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanRow {
    pub name: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: f64,
    pub area: f64,
    pub pop_density: f64,
    pub density_bin: DensityBin,
}

/// Column names of `CleanRow`, in output order.
pub const CLEAN_COLUMNS: [&str; 7] = [
    "name",
    "region",
    "subregion",
    "population",
    "area",
    "pop_density",
    "density_bin",
];
