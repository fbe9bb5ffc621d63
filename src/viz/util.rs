//! Utility functions for visualization: colors, log-axis ranges, tick label formatting.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// ColorBrewer YlGnBu, 9 classes, light to dark.
const YLGNBU9: [(u8, u8, u8); 9] = [
    (255, 255, 217),
    (237, 248, 177),
    (199, 233, 180),
    (127, 205, 187),
    (65, 182, 196),
    (29, 145, 192),
    (34, 94, 168),
    (37, 52, 148),
    (8, 29, 88),
];

/// Sequential yellow-green-blue color for `t` in `[0, 1]` (clamped), linearly
/// interpolated between the ColorBrewer stops.
pub fn ylgnbu(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (YLGNBU9.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(YLGNBU9.len() - 2);
    let f = scaled - i as f64;
    let (a, b) = (YLGNBU9[i], YLGNBU9[i + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Black or white, whichever reads better on `bg`.
pub fn contrasting_text(bg: RGBColor) -> RGBColor {
    let luma = 0.299 * bg.0 as f64 + 0.587 * bg.1 as f64 + 0.114 * bg.2 as f64;
    if luma < 140.0 { WHITE } else { BLACK }
}

/// Positive `[min, max]` of `values` padded by a factor on each side, suitable
/// for a log axis. Non-positive and non-finite values are ignored.
pub fn log_range(values: impl IntoIterator<Item = f64>, pad: f64) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    let pad = pad.max(1.0);
    let (lo, hi) = (lo / pad, hi * pad);
    if hi / lo < 1.5 {
        Some((lo / 1.5, hi * 1.5))
    } else {
        Some((lo, hi))
    }
}

/// Compact tick label: `1.2B`, `3.4M`, `12,500`, `0.35`.
pub fn fmt_tick(v: f64) -> String {
    let a = v.abs();
    if a >= 1.0e9 {
        trim_fixed(v / 1.0e9, 1) + "B"
    } else if a >= 1.0e6 {
        trim_fixed(v / 1.0e6, 1) + "M"
    } else if a >= 1.0e3 {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else if a >= 1.0 || a == 0.0 {
        trim_fixed(v, 1)
    } else {
        trim_fixed(v, 3)
    }
}

/// Whole number with thousands separators (`83,491,249`); `NA` when not finite.
pub fn fmt_thousands(v: f64) -> String {
    if v.is_finite() {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else {
        "NA".to_string()
    }
}

fn trim_fixed(v: f64, prec: usize) -> String {
    let s = format!("{:.*}", prec, v);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
