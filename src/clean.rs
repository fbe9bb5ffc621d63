//! Turn flattened country records into `CleanRow`s.
//!
//! Steps, in order:
//! 1. drop unused column families (translations, flags, ...)
//! 2. resolve the display name (`name.common`, or a `name` field read via `NameField`)
//! 3. drop the remaining `name.*` sub-columns
//! 4. coerce `population` and `area` to numbers
//! 5. derive `pop_density = population / area`
//! 6. assign equal-frequency `DensityBin`s over all defined densities
//! 7. keep rows with `area > 0` and a defined density
//! 8. project onto the fixed `CleanRow` columns

use crate::models::{BIN_COUNT, CleanRow, DensityBin, FlatTable, NameField, value_to_text};
use crate::stats::quantile_edges;
use serde_json::Value;
use thiserror::Error;

/// Column families removed before any other processing.
pub const DROPPED_COLUMNS: [&str; 11] = [
    "translations",
    "flags",
    "coatOfArms",
    "maps",
    "demonyms",
    "timezones",
    "continents",
    "altSpellings",
    "tld",
    "idd",
    "startOfWeek",
];

const NAME_SUBCOLUMNS: [&str; 3] = ["name.common", "name.official", "name.nativeName"];

#[derive(Debug, Error, PartialEq)]
pub enum CleanError {
    #[error("required column `{0}` is not present in any record")]
    MissingColumn(&'static str),
    #[error("no record has a defined population density; nothing to bin")]
    NoDensities,
    #[error(
        "cannot split {distinct} distinct density value(s) into {bins} equal-frequency bins: \
         quantile edges {edges:?} are not unique"
    )]
    DegenerateBins {
        distinct: usize,
        bins: usize,
        edges: Vec<f64>,
    },
}

/// Result of a cleaning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub rows: Vec<CleanRow>,
    /// Density bin edges, ascending, `BIN_COUNT + 1` entries.
    pub bin_edges: Vec<f64>,
    /// Resolved names for every input record, before filtering.
    pub names: Vec<Option<String>>,
    /// Input rows removed by the `area > 0` / defined-density filter.
    pub filtered_out: usize,
}

/// Run the full cleaning pass over a flattened table.
pub fn clean(table: &FlatTable) -> Result<CleanOutcome, CleanError> {
    let mut table = table.clone();

    let dropped = table.drop_columns_where(is_dropped_column);
    log::debug!("dropped {} unused columns", dropped.len());

    let names = resolve_names(&table);
    table.drop_columns_where(is_name_subcolumn);

    let population =
        numeric_column(&table, "population").ok_or(CleanError::MissingColumn("population"))?;
    let area = numeric_column(&table, "area").ok_or(CleanError::MissingColumn("area"))?;
    let names = names.unwrap_or_else(|| absent_column(&table, "name"));
    let region = text_column(&table, "region").unwrap_or_else(|| absent_column(&table, "region"));
    let subregion =
        text_column(&table, "subregion").unwrap_or_else(|| absent_column(&table, "subregion"));

    let density: Vec<Option<f64>> = population
        .iter()
        .zip(&area)
        .map(|(p, a)| density_of(*p, *a))
        .collect();

    let bin_edges = density_edges(&density)?;
    let bins: Vec<Option<DensityBin>> = density
        .iter()
        .map(|d| d.and_then(|d| assign_bin(d, &bin_edges)))
        .collect();

    let mut rows = Vec::new();
    for i in 0..table.len() {
        let (Some(a), Some(d), Some(bin), Some(p)) = (area[i], density[i], bins[i], population[i])
        else {
            continue;
        };
        if a <= 0.0 {
            continue;
        }
        rows.push(CleanRow {
            name: names[i].clone(),
            region: region[i].clone(),
            subregion: subregion[i].clone(),
            population: p,
            area: a,
            pop_density: d,
            density_bin: bin,
        });
    }
    let filtered_out = table.len() - rows.len();
    log::info!(
        "cleaned {} records: kept {}, filtered {}",
        table.len(),
        rows.len(),
        filtered_out
    );

    Ok(CleanOutcome {
        rows,
        bin_edges,
        names,
        filtered_out,
    })
}

fn is_dropped_column(col: &str) -> bool {
    DROPPED_COLUMNS.iter().any(|d| is_same_or_child(col, d))
}

fn is_name_subcolumn(col: &str) -> bool {
    NAME_SUBCOLUMNS.iter().any(|d| is_same_or_child(col, d))
}

/// `col` equals `family` or is a flattened path beneath it.
fn is_same_or_child(col: &str, family: &str) -> bool {
    col.strip_prefix(family)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Resolve one display name per row.
///
/// `name.common` wins when the table has it. Otherwise a `name` column is read
/// through `NameField`, so nested objects yield their `common` member and flat
/// values are used as they are. `None` when neither column exists.
pub fn resolve_names(table: &FlatTable) -> Option<Vec<Option<String>>> {
    if table.has_column("name.common") {
        return text_column(table, "name.common");
    }
    if table.has_column("name") {
        return Some(
            (0..table.len())
                .map(|i| {
                    table
                        .get(i, "name")
                        .and_then(|v| NameField::from_value(v).common())
                })
                .collect(),
        );
    }
    None
}

/// Lenient numeric coercion: numbers pass through, numeric strings are parsed,
/// anything else is `None`.
pub fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|x| !x.is_nan())
}

/// `population / area`, undefined when either side is missing, area is zero,
/// or the quotient is not finite.
pub fn density_of(population: Option<f64>, area: Option<f64>) -> Option<f64> {
    let (p, a) = (population?, area?);
    if a == 0.0 {
        return None;
    }
    Some(p / a).filter(|d| d.is_finite())
}

fn numeric_column(table: &FlatTable, column: &str) -> Option<Vec<Option<f64>>> {
    table.has_column(column).then(|| {
        (0..table.len())
            .map(|i| table.get(i, column).and_then(coerce_number))
            .collect()
    })
}

fn text_column(table: &FlatTable, column: &str) -> Option<Vec<Option<String>>> {
    table.has_column(column).then(|| {
        (0..table.len())
            .map(|i| table.get(i, column).and_then(value_to_text))
            .collect()
    })
}

/// Optional text column missing from every record: all values undefined.
fn absent_column(table: &FlatTable, column: &str) -> Vec<Option<String>> {
    log::warn!("no record has a `{column}` field; leaving it empty");
    vec![None; table.len()]
}

/// Equal-frequency edges over every defined density.
fn density_edges(density: &[Option<f64>]) -> Result<Vec<f64>, CleanError> {
    let defined: Vec<f64> = density.iter().flatten().copied().collect();
    let bins = BIN_COUNT;
    let edges = quantile_edges(&defined, bins).ok_or(CleanError::NoDensities)?;
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        let mut distinct = defined;
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        return Err(CleanError::DegenerateBins {
            distinct: distinct.len(),
            bins,
            edges,
        });
    }
    Ok(edges)
}

/// Right-closed bins with the lowest edge included: `[e0, e1], (e1, e2], ...`.
pub fn assign_bin(value: f64, edges: &[f64]) -> Option<DensityBin> {
    let (first, last) = (*edges.first()?, *edges.last()?);
    if value < first || value > last {
        return None;
    }
    let idx = edges[1..].partition_point(|e| *e < value);
    DensityBin::from_index(idx)
}
