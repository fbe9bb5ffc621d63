//! Public types and constants for the visualization module.

/// Physical figure size. Output pixels are `inches * dpi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSpec {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl FigureSpec {
    /// Pixel dimensions of the rendered image (at least 1x1).
    pub fn pixels(&self) -> (u32, u32) {
        let px = |inches: f64| ((inches * self.dpi as f64).round() as u32).max(1);
        (px(self.width_in), px(self.height_in))
    }

    /// Scale a size given in points (1/72 in) to pixels, so fonts keep their
    /// physical size when the DPI changes.
    pub fn pt(&self, points: f64) -> u32 {
        ((points * self.dpi as f64 / 72.0).round() as u32).max(1)
    }
}

impl Default for FigureSpec {
    /// 10 x 6 inches at 150 DPI (1500 x 900 px).
    fn default() -> Self {
        Self {
            width_in: 10.0,
            height_in: 6.0,
            dpi: 150,
        }
    }
}

/// Title and axis descriptions of one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartText {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
}

impl ChartText {
    pub fn new(title: impl Into<String>, x_desc: impl Into<String>, y_desc: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_desc: x_desc.into(),
            y_desc: y_desc.into(),
        }
    }
}

/// Densities at or above this value are left out of the histogram.
pub const HISTOGRAM_DENSITY_CUTOFF: f64 = 2000.0;

/// Number of equal-width histogram bins.
pub const HISTOGRAM_BINS: usize = 30;
