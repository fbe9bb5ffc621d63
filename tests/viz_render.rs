mod common;

use rcountries::clean;
use rcountries::stats::{DensityPivot, density_pivot};
use rcountries::viz::{self, ChartText, FigureSpec};
use std::fs;
use std::path::{Path, PathBuf};

/// Rendering needs a TrueType font; skip on hosts without one.
fn fonts_available() -> bool {
    let preferred = std::env::var_os(viz::FONT_ENV).map(PathBuf::from);
    match viz::ensure_fonts_registered(preferred.as_deref()) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("skipping render test: {e}");
            false
        }
    }
}

fn small_figure() -> FigureSpec {
    FigureSpec {
        width_in: 6.0,
        height_in: 4.0,
        dpi: 72,
    }
}

fn labels() -> ChartText {
    ChartText::new("Title - Europe", "x", "y")
}

fn assert_written(path: &Path) {
    let meta = fs::metadata(path).expect("file created");
    assert!(meta.len() > 0, "{} is empty", path.display());
}

#[test]
fn all_three_charts_render_as_png_and_svg() {
    if !fonts_available() {
        return;
    }
    let rows = clean::clean(&common::fixture_table()).unwrap().rows;
    let pivot = density_pivot(&rows);
    let dir = tempfile::tempdir().unwrap();

    for ext in ["png", "svg"] {
        let hist = dir.path().join(format!("hist.{ext}"));
        viz::plot_density_histogram(&rows, &hist, &small_figure(), &labels()).unwrap();
        assert_written(&hist);

        let scatter = dir.path().join(format!("scatter.{ext}"));
        viz::plot_area_population_scatter(&rows, &scatter, &small_figure(), &labels()).unwrap();
        assert_written(&scatter);

        let heat = dir.path().join(format!("heat.{ext}"));
        viz::plot_density_heatmap(&pivot, &heat, &small_figure(), &labels()).unwrap();
        assert_written(&heat);
    }

    let svg = fs::read_to_string(dir.path().join("heat.svg")).unwrap();
    assert!(svg.contains("Title - Europe"));
    assert!(svg.contains("Northern Europe"));
}

/// Contents of `<text>` elements whose opening tag contains `attr`.
fn svg_texts_with(svg: &str, attr: &str) -> Vec<String> {
    svg.split("<text")
        .skip(1)
        .filter_map(|chunk| {
            let (tag, rest) = chunk.split_once('>')?;
            let (body, _) = rest.split_once("</text>")?;
            tag.contains(attr).then(|| body.trim().to_string())
        })
        .collect()
}

#[test]
fn histogram_count_ticks_are_distinct_whole_numbers() {
    if !fonts_available() {
        return;
    }
    let rows = clean::clean(&common::fixture_table()).unwrap().rows;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hist.svg");
    viz::plot_density_histogram(&rows, &path, &small_figure(), &labels()).unwrap();
    let svg = fs::read_to_string(&path).unwrap();

    // Left-axis tick labels are the right-anchored texts.
    let ticks = svg_texts_with(&svg, r#"text-anchor="end""#);
    assert!(ticks.len() >= 2, "no y ticks found: {ticks:?}");
    let values: Vec<u32> = ticks
        .iter()
        .map(|t| t.parse().unwrap_or_else(|_| panic!("non-integer tick {t:?}")))
        .collect();
    assert!(
        values.windows(2).all(|w| w[0] != w[1]),
        "repeated tick labels: {values:?}"
    );
}

#[test]
fn heatmap_labels_every_bin_and_subregion_once() {
    if !fonts_available() {
        return;
    }
    let rows = clean::clean(&common::fixture_table()).unwrap().rows;
    let pivot = density_pivot(&rows);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heat.svg");
    viz::plot_density_heatmap(&pivot, &path, &small_figure(), &labels()).unwrap();
    let svg = fs::read_to_string(&path).unwrap();

    let all = svg_texts_with(&svg, "");
    for label in ["Very Low", "Low", "Medium", "High", "Very High"]
        .into_iter()
        .chain(pivot.subregions.iter().map(|s| s.as_str()))
    {
        let n = all.iter().filter(|t| t.as_str() == label).count();
        assert_eq!(n, 1, "{label} drawn {n} times");
    }
}

#[test]
fn png_has_figure_pixel_size() {
    if !fonts_available() {
        return;
    }
    let rows = clean::clean(&common::fixture_table()).unwrap().rows;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hist.png");
    viz::plot_density_histogram(&rows, &path, &small_figure(), &labels()).unwrap();

    // PNG IHDR: width and height are big-endian u32 at bytes 16..24.
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
    let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
    assert_eq!((w, h), small_figure().pixels());
}

#[test]
fn empty_inputs_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let fig = small_figure();
    assert!(viz::plot_density_histogram(&[], dir.path().join("h.png"), &fig, &labels()).is_err());
    assert!(
        viz::plot_area_population_scatter(&[], dir.path().join("s.png"), &fig, &labels()).is_err()
    );
    let empty = DensityPivot {
        subregions: vec![],
        counts: vec![],
    };
    assert!(viz::plot_density_heatmap(&empty, dir.path().join("m.png"), &fig, &labels()).is_err());
    assert!(!dir.path().join("h.png").exists());
}

#[test]
fn default_figure_is_1500_by_900() {
    assert_eq!(FigureSpec::default().pixels(), (1500, 900));
}
