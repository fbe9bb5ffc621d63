//! One end-to-end run: fetch → normalize → clean → aggregate → visualize.
//!
//! Console output (the human-readable report) goes to the supplied writer;
//! diagnostics go through `log`.

use crate::api::Client;
use crate::clean::{self, CleanOutcome};
use crate::config::PipelineConfig;
use crate::models::{CLEAN_COLUMNS, ColumnSummary, RawRecord};
use crate::normalize::flatten_records;
use crate::stats::{self, DensityPivot, SubregionSummary};
use crate::storage;
use crate::viz::{self, ChartText};
use crate::viz::util::fmt_thousands;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// HTTP status of the fetch; `None` when the payload came from `--input`.
    pub status: Option<u16>,
    pub raw_records: usize,
    pub flat_columns: usize,
    pub clean_rows: usize,
    pub summary: Vec<SubregionSummary>,
    pub pivot: DensityPivot,
    pub written: Vec<PathBuf>,
}

/// Execute the pipeline described by `config`, writing the console report to `out`.
pub fn run<W: Write>(config: &PipelineConfig, out: &mut W) -> Result<RunReport> {
    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("create output dir {}", config.out_dir.display()))?;
    let mut written = Vec::new();

    // 1) Fetch (or load)
    let (status, records) = load_records(config)?;
    if let Some(code) = status {
        writeln!(out, "Status code: {code}")?;
    }
    let raw_path = config.raw_json_path();
    storage::save_raw_json(&records, &raw_path)?;
    log::info!("wrote raw payload to {}", raw_path.display());
    written.push(raw_path);

    // 2) Normalize
    let flat = flatten_records(&records);
    writeln!(out, "=== RAW DATA ===")?;
    write_schema(out, flat.len(), &flat.schema())?;

    // 3) Clean
    let CleanOutcome {
        rows,
        bin_edges,
        names,
        filtered_out,
    } = clean::clean(&flat)?;
    write_names(out, &names, 5)?;
    log::debug!("density bin edges: {bin_edges:?}");
    if filtered_out > 0 {
        log::info!("{filtered_out} record(s) without positive area or density were dropped");
    }
    let csv_path = config.clean_csv_path();
    storage::save_clean_csv(&rows, &csv_path)?;
    log::info!("wrote {} clean rows to {}", rows.len(), csv_path.display());
    written.push(csv_path);

    // 4) Aggregate
    let summary = stats::subregion_summary(&rows);
    let pivot = stats::density_pivot(&rows);
    write_summary(out, &summary)?;

    // 5) Visualize
    if config.skip_charts {
        log::info!("chart rendering skipped");
    } else {
        viz::ensure_fonts_registered(config.font_path())?;
        let region = config.region_title();

        let path = config.histogram_path();
        viz::plot_density_histogram(
            &rows,
            &path,
            &config.figure,
            &ChartText::new(
                format!("Population Density - {region}"),
                "Population Density (people per km²)",
                "Number of Countries",
            ),
        )?;
        log::info!("wrote histogram to {}", path.display());
        written.push(path);

        let path = config.scatter_path();
        viz::plot_area_population_scatter(
            &rows,
            &path,
            &config.figure,
            &ChartText::new(
                format!("Correlation Between Area and Population - {region}"),
                "Area",
                "Population",
            ),
        )?;
        log::info!("wrote scatter plot to {}", path.display());
        written.push(path);

        let path = config.heatmap_path();
        viz::plot_density_heatmap(
            &pivot,
            &path,
            &config.figure,
            &ChartText::new(
                format!("Country Count by Subregion x Density - {region}"),
                "Population Density",
                "Subregion",
            ),
        )?;
        log::info!("wrote heatmap to {}", path.display());
        written.push(path);
    }

    writeln!(out, "{:?}", CLEAN_COLUMNS)?;

    Ok(RunReport {
        status,
        raw_records: records.len(),
        flat_columns: flat.columns.len(),
        clean_rows: rows.len(),
        summary,
        pivot,
        written,
    })
}

fn load_records(config: &PipelineConfig) -> Result<(Option<u16>, Vec<RawRecord>)> {
    match &config.input {
        Some(path) => {
            log::info!("reading raw payload from {}", path.display());
            Ok((None, storage::load_raw_json(path)?))
        }
        None => {
            let client = Client::with_timeout(Duration::from_secs(config.timeout_secs))
                .with_base_url(config.base_url.clone());
            let fetched = client.fetch_region(&config.region)?;
            Ok((Some(fetched.status), fetched.records))
        }
    }
}

/// Info-style table: entry count, then `#  Column  Non-Null Count  Dtype`.
pub fn write_schema<W: Write>(out: &mut W, entries: usize, schema: &[ColumnSummary]) -> Result<()> {
    writeln!(out, "{entries} entries")?;
    writeln!(out, "Data columns (total {} columns):", schema.len())?;
    let width = schema
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Column".len());
    writeln!(out, " #   {:<width$}  Non-Null Count  Dtype", "Column")?;
    for (i, col) in schema.iter().enumerate() {
        writeln!(
            out,
            " {:<3} {:<width$}  {:>5} non-null  {}",
            i, col.name, col.non_null, col.kind
        )?;
    }
    Ok(())
}

/// The first `n` resolved names, one per line.
pub fn write_names<W: Write>(out: &mut W, names: &[Option<String>], n: usize) -> Result<()> {
    writeln!(out, "name")?;
    for (i, name) in names.iter().take(n).enumerate() {
        writeln!(out, "{:<3} {}", i, name.as_deref().unwrap_or("NaN"))?;
    }
    Ok(())
}

/// `subregion  mean_pop  max_pop` table.
pub fn write_summary<W: Write>(out: &mut W, summary: &[SubregionSummary]) -> Result<()> {
    let width = summary
        .iter()
        .map(|s| s.subregion.chars().count())
        .max()
        .unwrap_or(0)
        .max("subregion".len());
    writeln!(out, "{:<width$}  {:>16}  {:>14}", "subregion", "mean_pop", "max_pop")?;
    for s in summary {
        writeln!(
            out,
            "{:<width$}  {:>16}  {:>14}",
            s.subregion,
            format!("{:.2}", s.mean_pop),
            fmt_thousands(s.max_pop)
        )?;
    }
    Ok(())
}
