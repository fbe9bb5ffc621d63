use anyhow::Result;
use clap::Parser;
use rcountries::api::{DEFAULT_BASE_URL, DEFAULT_REGION, DEFAULT_TIMEOUT_SECS};
use rcountries::viz::{FONT_ENV, FigureSpec};
use rcountries::{PipelineConfig, pipeline};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rcountries",
    version,
    about = "Fetch, clean, summarize & chart REST Countries data for one region"
)]
struct Cli {
    /// Region to fetch (e.g., europe, asia, africa).
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,
    /// API base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Read a saved raw JSON payload instead of calling the API.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Directory for the JSON, CSV and chart outputs.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// TrueType font for chart text (falls back to system fonts).
    #[arg(long, env = FONT_ENV)]
    font: Option<PathBuf>,
    /// Figure width in inches.
    #[arg(long, default_value_t = 10.0)]
    width_in: f64,
    /// Figure height in inches.
    #[arg(long, default_value_t = 6.0)]
    height_in: f64,
    /// Output resolution.
    #[arg(long, default_value_t = 150)]
    dpi: u32,
    /// HTTP timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Write the JSON and CSV only.
    #[arg(long, default_value_t = false)]
    skip_charts: bool,
    /// Debug-level logging.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        if !(self.width_in > 0.0 && self.height_in > 0.0) || self.dpi == 0 {
            anyhow::bail!("figure size and dpi must be positive");
        }
        Ok(PipelineConfig {
            base_url: self.base_url,
            region: self.region,
            input: self.input,
            out_dir: self.out_dir,
            timeout_secs: self.timeout_secs,
            figure: FigureSpec {
                width_in: self.width_in,
                height_in: self.height_in,
                dpi: self.dpi,
            },
            font: self.font,
            skip_charts: self.skip_charts,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = cli.into_config()?;
    let stdout = std::io::stdout();
    let report = pipeline::run(&config, &mut stdout.lock())?;
    for path in &report.written {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
