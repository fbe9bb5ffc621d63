//! Visualization: render the three country charts to **PNG** (or **SVG**).
//!
//! - `plot_density_histogram`: population density distribution, log x-axis, KDE overlay
//! - `plot_area_population_scatter`: area vs population, log-log, colored by subregion
//! - `plot_density_heatmap`: subregion x density bin counts, annotated, YlGnBu scale
//!
//! Output format follows the file extension: `.svg` uses the SVG backend, anything
//! else is written as a bitmap. Text is rendered through the pure-Rust `ab_glyph`
//! path, so a TrueType font must be registered first (see [`ensure_fonts_registered`]).

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use types::{ChartText, FigureSpec, HISTOGRAM_BINS, HISTOGRAM_DENSITY_CUTOFF};

use crate::models::{BIN_COUNT, CleanRow, DensityBin};
use crate::stats::{DensityPivot, gaussian_kde};
use anyhow::{Context, Result, anyhow, bail};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use legend::{draw_color_bar, draw_legend_panel};
use text::{max_text_width_px, truncate_to_width};
use util::{contrasting_text, fmt_tick, log_range, office_color, ylgnbu};

/// Environment variable the CLI reads `--font` from.
pub const FONT_ENV: &str = "RCOUNTRIES_FONT";

/// Well-known locations of a sans-serif TrueType font.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Outcome of the one-time font registration (path used, or why none was found).
static FONT: OnceLock<std::result::Result<PathBuf, String>> = OnceLock::new();

/// Register a "sans-serif" font for the `ab_glyph` text path, once per process.
///
/// Lookup order: `preferred`, then well-known system locations. Required
/// because `ab_glyph` doesn't discover OS fonts. The first call decides; later
/// calls return the same outcome.
pub fn ensure_fonts_registered(preferred: Option<&Path>) -> Result<PathBuf> {
    FONT.get_or_init(|| register_first_font(preferred))
        .clone()
        .map_err(|e| anyhow!(e))
}

fn register_first_font(preferred: Option<&Path>) -> std::result::Result<PathBuf, String> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(p) = preferred {
        candidates.push(p.to_path_buf());
    }
    candidates.extend(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in &candidates {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        // The registry keeps `&'static` font data for the life of the process.
        let data: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match plotters::style::register_font("sans-serif", plotters::style::FontStyle::Normal, data) {
            Ok(()) => {
                log::debug!("registered chart font {}", path.display());
                return Ok(path.clone());
            }
            Err(_) => log::warn!("{} is not a usable font, trying next", path.display()),
        }
    }
    Err(format!(
        "no usable TrueType font found; pass --font or set {FONT_ENV} (tried {} locations)",
        candidates.len()
    ))
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

/// Histogram of population density (`0 < density < 2000`), 30 linear bins on a
/// log-scaled x-axis, with a Gaussian KDE overlay scaled to counts.
pub fn plot_density_histogram<P: AsRef<Path>>(
    rows: &[CleanRow],
    out_path: P,
    figure: &FigureSpec,
    labels: &ChartText,
) -> Result<()> {
    let values: Vec<f64> = rows
        .iter()
        .map(|r| r.pop_density)
        .filter(|d| d.is_finite() && *d > 0.0 && *d < HISTOGRAM_DENSITY_CUTOFF)
        .collect();
    if values.is_empty() {
        bail!("no population densities below {HISTOGRAM_DENSITY_CUTOFF} to plot");
    }
    let hist = Histogram::new(&values, HISTOGRAM_BINS);

    ensure_fonts_registered(None)?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = figure.pixels();
    let rendered = if is_svg(out_path) {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_histogram(root, &hist, &values, figure, labels)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_histogram(root, &hist, &values, figure, labels)
    };
    rendered.with_context(|| format!("render {}", out_path.display()))
}

/// Equal-width binning of positive values.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<u32>,
}

impl Histogram {
    /// `bins` equal-width bins spanning `[min, max]` of `values` (non-empty).
    /// A single distinct value is widened to ±10% so every bin has width.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if (hi - lo).abs() < f64::EPSILON * hi.abs().max(1.0) {
            lo *= 0.9;
            hi *= 1.1;
        }
        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0u32; bins];
        for v in values {
            let i = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[i] += 1;
        }
        Self { lo, hi, counts }
    }

    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.counts.len() as f64
    }

    pub fn edges(&self, i: usize) -> (f64, f64) {
        let w = self.bin_width();
        (self.lo + w * i as f64, self.lo + w * (i + 1) as f64)
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

fn draw_histogram<DB>(
    root: DrawingArea<DB, Shift>,
    hist: &Histogram,
    values: &[f64],
    figure: &FigureSpec,
    labels: &ChartText,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    // KDE on the same support as the bars, scaled from density to counts.
    let grid_n = 200;
    let grid: Vec<f64> = (0..=grid_n)
        .map(|i| hist.lo + (hist.hi - hist.lo) * i as f64 / grid_n as f64)
        .collect();
    let scale = values.len() as f64 * hist.bin_width();
    let kde: Option<Vec<(f64, f64)>> = gaussian_kde(values, &grid).map(|d| {
        grid.iter()
            .zip(d)
            .map(|(x, y)| (*x, y * scale))
            .collect()
    });
    let kde_max = kde
        .as_ref()
        .map(|k| k.iter().map(|(_, y)| *y).fold(0.0, f64::max))
        .unwrap_or(0.0);
    let (y_max, y_labels) = count_axis((hist.max_count() as f64).max(kde_max));

    let mut chart = ChartBuilder::on(&root)
        .margin(figure.pt(10.0))
        .caption(&labels.title, (FontFamily::SansSerif, figure.pt(14.0)))
        .set_label_area_size(LabelAreaPosition::Left, figure.pt(40.0))
        .set_label_area_size(LabelAreaPosition::Bottom, figure.pt(36.0))
        .build_cartesian_2d((hist.lo..hist.hi).log_scale(), 0f64..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .y_labels(y_labels)
        .x_label_formatter(&|v: &f64| fmt_tick(*v))
        .y_label_formatter(&|v: &f64| fmt_tick(*v))
        .label_style((FontFamily::SansSerif, figure.pt(9.0)))
        .axis_desc_style((FontFamily::SansSerif, figure.pt(11.0)))
        .disable_mesh()
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let color = office_color(0);
    chart
        .draw_series(
            hist.counts
                .iter()
                .enumerate()
                .filter(|(_, c)| **c > 0)
                .map(|(i, c)| {
                    let (x0, x1) = hist.edges(i);
                    Rectangle::new([(x0, 0.0), (x1, *c as f64)], color.mix(0.55).filled())
                }),
        )
        .map_err(|e| anyhow!("{:?}", e))?;
    chart
        .draw_series(
            hist.counts
                .iter()
                .enumerate()
                .filter(|(_, c)| **c > 0)
                .map(|(i, c)| {
                    let (x0, x1) = hist.edges(i);
                    Rectangle::new([(x0, 0.0), (x1, *c as f64)], WHITE.stroke_width(1))
                }),
        )
        .map_err(|e| anyhow!("{:?}", e))?;

    if let Some(kde) = kde {
        chart
            .draw_series(LineSeries::new(kde, color.stroke_width(figure.pt(1.5))))
            .map_err(|e| anyhow!("{:?}", e))?;
    } else {
        log::debug!("KDE overlay skipped: fewer than two distinct densities");
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Whole-number top of a count axis with headroom, and a label count small
/// enough that every tick step is a whole count.
pub fn count_axis(max: f64) -> (f64, usize) {
    let top = (max.max(1.0) * 1.08).ceil();
    (top, (top as usize).min(10) + 1)
}

/// Scatter of area (x) against population (y), both log-scaled, one color per
/// subregion, with a legend panel on the right.
pub fn plot_area_population_scatter<P: AsRef<Path>>(
    rows: &[CleanRow],
    out_path: P,
    figure: &FigureSpec,
    labels: &ChartText,
) -> Result<()> {
    let mut groups: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for r in rows {
        if r.area > 0.0 && r.population > 0.0 {
            groups
                .entry(r.subregion.as_deref().unwrap_or("(none)"))
                .or_default()
                .push((r.area, r.population));
        }
    }
    let x_range = log_range(groups.values().flatten().map(|(x, _)| *x), 1.25);
    let y_range = log_range(groups.values().flatten().map(|(_, y)| *y), 1.25);
    let (Some(x_range), Some(y_range)) = (x_range, y_range) else {
        bail!("no rows with positive area and population to plot");
    };
    let series: Vec<(String, RGBAColor, Vec<(f64, f64)>)> = groups
        .into_iter()
        .enumerate()
        .map(|(i, (name, pts))| (name.to_string(), office_color(i), pts))
        .collect();

    ensure_fonts_registered(None)?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = figure.pixels();
    let rendered = if is_svg(out_path) {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_scatter(root, &series, x_range, y_range, figure, labels)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_scatter(root, &series, x_range, y_range, figure, labels)
    };
    rendered.with_context(|| format!("render {}", out_path.display()))
}

#[allow(clippy::type_complexity)]
fn draw_scatter<DB>(
    root: DrawingArea<DB, Shift>,
    series: &[(String, RGBAColor, Vec<(f64, f64)>)],
    (x_lo, x_hi): (f64, f64),
    (y_lo, y_hi): (f64, f64),
    figure: &FigureSpec,
    labels: &ChartText,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (plot_area, legend_area) = root.split_horizontally((80).percent_width());

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(figure.pt(10.0))
        .caption(&labels.title, (FontFamily::SansSerif, figure.pt(14.0)))
        .set_label_area_size(LabelAreaPosition::Left, figure.pt(44.0))
        .set_label_area_size(LabelAreaPosition::Bottom, figure.pt(36.0))
        .build_cartesian_2d((x_lo..x_hi).log_scale(), (y_lo..y_hi).log_scale())
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .x_label_formatter(&|v: &f64| fmt_tick(*v))
        .y_label_formatter(&|v: &f64| fmt_tick(*v))
        .label_style((FontFamily::SansSerif, figure.pt(9.0)))
        .axis_desc_style((FontFamily::SansSerif, figure.pt(11.0)))
        .disable_mesh()
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let radius = figure.pt(3.0) as i32;
    for (_, color, pts) in series {
        chart
            .draw_series(
                pts.iter()
                    .map(|(x, y)| Circle::new((*x, *y), radius, color.mix(0.85).filled())),
            )
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    let items: Vec<(String, RGBAColor)> = series
        .iter()
        .map(|(name, color, _)| (name.clone(), *color))
        .collect();
    legend_area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    draw_legend_panel(
        &legend_area,
        &items,
        "subregion",
        figure.pt(9.0),
        figure.pt(40.0) as i32,
    )?;

    plot_area.present().map_err(|e| anyhow!("{:?}", e))?;
    legend_area.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Annotated heatmap of the density pivot (subregions as rows, bins as columns).
pub fn plot_density_heatmap<P: AsRef<Path>>(
    pivot: &DensityPivot,
    out_path: P,
    figure: &FigureSpec,
    labels: &ChartText,
) -> Result<()> {
    if pivot.is_empty() {
        bail!("density pivot is empty; nothing to plot");
    }

    ensure_fonts_registered(None)?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = figure.pixels();
    let rendered = if is_svg(out_path) {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_heatmap(root, pivot, figure, labels)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_heatmap(root, pivot, figure, labels)
    };
    rendered.with_context(|| format!("render {}", out_path.display()))
}

fn draw_heatmap<DB>(
    root: DrawingArea<DB, Shift>,
    pivot: &DensityPivot,
    figure: &FigureSpec,
    labels: &ChartText,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (plot_area, bar_area) = root.split_horizontally((88).percent_width());

    let n_cols = BIN_COUNT;
    let n_rows = pivot.subregions.len();
    let max = pivot.max_count();
    let label_px = figure.pt(9.0);
    let left_px = (max_text_width_px(pivot.subregions.iter().map(|s| s.as_str()), label_px)
        + figure.pt(8.0))
    .max(figure.pt(30.0))
    .min(size_fraction(plot_area.dim_in_pixel().0, 0.4))
        + figure.pt(16.0);

    let caption_px = figure.pt(14.0);
    let margin_px = figure.pt(10.0);
    let bottom_px = figure.pt(36.0);

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(margin_px)
        .caption(&labels.title, (FontFamily::SansSerif, caption_px))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, bottom_px)
        .build_cartesian_2d(0f64..n_cols as f64, 0f64..n_rows as f64)
        .map_err(|e| anyhow!("{:?}", e))?;

    // Category labels are placed by hand at cell centres, so the mesh draws no ticks.
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_labels(0)
        .x_desc(labels.x_desc.as_str())
        .y_desc(labels.y_desc.as_str())
        .axis_desc_style((FontFamily::SansSerif, figure.pt(11.0)))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let denom = max.max(1) as f64;
    let mut cells = Vec::with_capacity(n_rows * n_cols);
    for (r, counts) in pivot.counts.iter().enumerate() {
        // Row 0 is drawn at the top, like a table.
        let y0 = (n_rows - 1 - r) as f64;
        for (c, count) in counts.iter().enumerate() {
            let fill = ylgnbu(*count as f64 / denom);
            cells.push((c as f64, y0, *count, fill, contrasting_text(fill)));
        }
    }

    chart
        .draw_series(cells.iter().map(|(x0, y0, _, fill, _)| {
            Rectangle::new([(*x0, *y0), (*x0 + 1.0, *y0 + 1.0)], fill.filled())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    let annot_px = figure.pt(10.0);
    chart
        .draw_series(cells.iter().map(|(x0, y0, count, _, text_color)| {
            let style = TextStyle::from((FontFamily::SansSerif, annot_px))
                .pos(Pos::new(HPos::Center, VPos::Center))
                .color(text_color);
            Text::new(format!("{count}"), (*x0 + 0.5, *y0 + 0.5), style)
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    let tick_gap = figure.pt(4.0) as i32;
    let x_style = TextStyle::from((FontFamily::SansSerif, label_px))
        .pos(Pos::new(HPos::Center, VPos::Top))
        .color(&BLACK);
    for bin in DensityBin::ALL {
        let (x, y) = chart.backend_coord(&(bin.index() as f64 + 0.5, 0.0));
        plot_area
            .draw(&Text::new(bin.label(), (x, y + tick_gap), x_style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    let y_style = TextStyle::from((FontFamily::SansSerif, label_px))
        .pos(Pos::new(HPos::Right, VPos::Center))
        .color(&BLACK);
    let name_cap = left_px.saturating_sub(figure.pt(16.0) + tick_gap as u32);
    for (r, name) in pivot.subregions.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(0.0, (n_rows - 1 - r) as f64 + 0.5));
        let text = truncate_to_width(name, label_px, name_cap);
        plot_area
            .draw(&Text::new(text, (x - tick_gap, y), y_style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    bar_area.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    // Line the bar up with the plotting area (caption + margins above, x labels below).
    draw_color_bar(
        &bar_area,
        max,
        label_px,
        margin_px + caption_px + figure.pt(8.0),
        margin_px + bottom_px,
    )?;

    plot_area.present().map_err(|e| anyhow!("{:?}", e))?;
    bar_area.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn size_fraction(px: u32, frac: f64) -> u32 {
    (px as f64 * frac) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::coord::types::RangedCoordf64;

    #[test]
    fn histogram_bins_cover_all_values() {
        let v = [1.0, 2.0, 3.0, 10.0];
        let h = Histogram::new(&v, 3);
        assert_eq!(h.counts.iter().sum::<u32>(), 4);
        assert_eq!(h.counts, vec![3, 0, 1]);
        assert_eq!(h.edges(0).0, 1.0);
        assert!((h.edges(2).1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn single_value_histogram_has_width() {
        let h = Histogram::new(&[50.0, 50.0], 30);
        assert!(h.bin_width() > 0.0);
        assert_eq!(h.counts.iter().sum::<u32>(), 2);
    }

    #[test]
    fn count_axis_ticks_are_whole_and_distinct() {
        for max in 1..=300u32 {
            let (top, n) = count_axis(max as f64);
            assert!(top >= max as f64);
            let ticks = RangedCoordf64::from(0.0..top).key_points(n);
            let labels: Vec<String> = ticks.iter().map(|v| fmt_tick(*v)).collect();
            for (v, l) in ticks.iter().zip(&labels) {
                assert!((v - v.round()).abs() < 1e-9, "max {max}: tick {v} ({l})");
            }
            let mut unique = labels.clone();
            unique.dedup();
            assert_eq!(unique, labels, "max {max}");
        }
    }

    #[test]
    fn svg_extension_is_case_insensitive() {
        assert!(is_svg(Path::new("a/b.SVG")));
        assert!(!is_svg(Path::new("a/b.png")));
        assert!(!is_svg(Path::new("noext")));
    }
}
