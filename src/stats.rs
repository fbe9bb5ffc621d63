use crate::models::{BIN_COUNT, CleanRow, DensityBin};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Population statistics for one subregion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubregionSummary {
    pub subregion: String,
    pub count: usize,
    pub mean_pop: f64,
    pub max_pop: f64,
}

/// Mean and max population grouped by subregion, ordered by subregion name.
///
/// Rows without a subregion do not belong to any group and are skipped.
pub fn subregion_summary(rows: &[CleanRow]) -> Vec<SubregionSummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in rows {
        if let Some(sub) = r.subregion.as_deref() {
            groups.entry(sub).or_default().push(r.population);
        }
    }

    groups
        .into_iter()
        .map(|(subregion, pops)| {
            let count = pops.len();
            let mean_pop = pops.iter().sum::<f64>() / count as f64;
            let max_pop = pops.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            SubregionSummary {
                subregion: subregion.to_string(),
                count,
                mean_pop,
                max_pop,
            }
        })
        .collect()
}

/// Country counts per (subregion, density bin).
///
/// Every row has one count per `DensityBin::ALL` entry, zero when the
/// combination never occurs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DensityPivot {
    pub subregions: Vec<String>,
    pub counts: Vec<[u32; BIN_COUNT]>,
}

impl DensityPivot {
    pub fn is_empty(&self) -> bool {
        self.subregions.is_empty()
    }

    pub fn get(&self, subregion: &str, bin: DensityBin) -> Option<u32> {
        let i = self.subregions.iter().position(|s| s == subregion)?;
        self.counts.get(i)?.get(bin.index()).copied()
    }

    pub fn row_total(&self, i: usize) -> u32 {
        self.counts.get(i).map(|r| r.iter().sum()).unwrap_or(0)
    }

    pub fn max_count(&self) -> u32 {
        self.counts
            .iter()
            .flat_map(|r| r.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Cross-tabulate subregion x density bin.
pub fn density_pivot(rows: &[CleanRow]) -> DensityPivot {
    let mut table: BTreeMap<&str, [u32; BIN_COUNT]> = BTreeMap::new();
    for r in rows {
        if let Some(sub) = r.subregion.as_deref() {
            table.entry(sub).or_insert([0; BIN_COUNT])[r.density_bin.index()] += 1;
        }
    }
    let (subregions, counts) = table
        .into_iter()
        .map(|(s, c)| (s.to_string(), c))
        .unzip();
    DensityPivot { subregions, counts }
}

/// Quantile of already **sorted** values using linear interpolation between
/// closest ranks. `q` is clamped to `[0, 1]`. Returns `None` for empty input.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let idx = q * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        let frac = idx - lo as f64;
        Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
    }
}

/// `n + 1` equal-frequency edges (0%, 1/n, ..., 100%) over unsorted values.
pub fn quantile_edges(values: &[f64], n: usize) -> Option<Vec<f64>> {
    if n == 0 {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    (0..=n)
        .map(|i| quantile(&sorted, i as f64 / n as f64))
        .collect()
}

/// Gaussian kernel density estimate evaluated at `at`.
///
/// Bandwidth follows Scott's rule (`sigma * n^(-1/5)`, sample std). Returns
/// `None` with fewer than two samples or zero spread.
pub fn gaussian_kde(samples: &[f64], at: &[f64]) -> Option<Vec<f64>> {
    let n = samples.len();
    if n < 2 {
        return None;
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let sd = var.sqrt();
    if !sd.is_finite() || sd <= 0.0 {
        return None;
    }
    let h = sd * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * h * (2.0 * std::f64::consts::PI).sqrt());
    Some(
        at.iter()
            .map(|x| {
                samples
                    .iter()
                    .map(|xi| {
                        let u = (x - xi) / h;
                        (-0.5 * u * u).exp()
                    })
                    .sum::<f64>()
                    * norm
            })
            .collect(),
    )
}
