//! rcountries
//!
//! Fetch country records for one region from the REST Countries API, flatten and
//! clean them, summarize population by subregion, and chart the result.
//! Pairs with the `rcountries` CLI.
//!
//! ### Pipeline
//! - `api`: one GET of `{base_url}/region/{region}`, parsed into raw records
//! - `normalize`: nested objects flattened into dotted columns
//! - `clean`: drop unused columns, resolve names, compute density and quintile bins
//! - `stats`: subregion summary and subregion x density-bin pivot
//! - `viz`: histogram, scatter and heatmap as PNG or SVG
//!
//! ### Example
//! ```no_run
//! use rcountries::{Client, clean, normalize, stats};
//!
//! let fetched = Client::default().fetch_region("europe")?;
//! let flat = normalize::flatten_records(&fetched.records);
//! let outcome = clean::clean(&flat)?;
//! rcountries::storage::save_clean_csv(&outcome.rows, "q2data_cleaned.csv")?;
//! for s in stats::subregion_summary(&outcome.rows) {
//!     println!("{} {:.2} {}", s.subregion, s.mean_pop, s.max_pop);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod clean;
pub mod config;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::Client;
pub use config::PipelineConfig;
pub use models::{CleanRow, DensityBin, FlatTable};
