//! Run configuration: where to fetch from, where to write, how big the charts are.

use crate::api::{DEFAULT_BASE_URL, DEFAULT_REGION, DEFAULT_TIMEOUT_SECS};
use crate::viz::FigureSpec;
use std::path::{Path, PathBuf};

pub const RAW_JSON_FILE: &str = "q1data_raw.json";
pub const CLEAN_CSV_FILE: &str = "q2data_cleaned.csv";
pub const HISTOGRAM_FILE: &str = "v1_density_hist.png";
pub const SCATTER_FILE: &str = "v2_area_population_scatter.png";
pub const HEATMAP_FILE: &str = "v3_subregion_density_heatmap.png";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub base_url: String,
    pub region: String,
    /// Read a previously saved raw payload instead of calling the API.
    pub input: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub timeout_secs: u64,
    pub figure: FigureSpec,
    /// Font file for chart text; `None` searches the usual system locations.
    pub font: Option<PathBuf>,
    pub skip_charts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            region: DEFAULT_REGION.into(),
            input: None,
            out_dir: PathBuf::from("."),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            figure: FigureSpec::default(),
            font: None,
            skip_charts: false,
        }
    }
}

impl PipelineConfig {
    fn out(&self, file: &str) -> PathBuf {
        self.out_dir.join(file)
    }

    pub fn raw_json_path(&self) -> PathBuf {
        self.out(RAW_JSON_FILE)
    }

    pub fn clean_csv_path(&self) -> PathBuf {
        self.out(CLEAN_CSV_FILE)
    }

    pub fn histogram_path(&self) -> PathBuf {
        self.out(HISTOGRAM_FILE)
    }

    pub fn scatter_path(&self) -> PathBuf {
        self.out(SCATTER_FILE)
    }

    pub fn heatmap_path(&self) -> PathBuf {
        self.out(HEATMAP_FILE)
    }

    pub fn font_path(&self) -> Option<&Path> {
        self.font.as_deref()
    }

    /// Region name as shown in chart titles ("europe" -> "Europe").
    pub fn region_title(&self) -> String {
        let mut chars = self.region.trim().chars();
        match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_write_into_cwd() {
        let c = PipelineConfig::default();
        assert_eq!(c.raw_json_path(), PathBuf::from("./q1data_raw.json"));
        assert_eq!(c.heatmap_path(), PathBuf::from("./v3_subregion_density_heatmap.png"));
        assert_eq!(c.region_title(), "Europe");
    }
}
