//! Legend and color bar panels drawn next to the plotting area.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::truncate_to_width;
use super::util::ylgnbu;

/// Draw a vertical list of `(label, color)` entries, one marker + label per row,
/// starting below an optional title. Labels that do not fit are truncated.
pub fn draw_legend_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBAColor)],
    title: &str,
    font_px: u32,
    top_px: i32,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w, _h) = area.dim_in_pixel();
    let pad: i32 = 8;
    let marker_radius: i32 = (font_px as i32 / 3).max(3);
    let marker_to_text_gap: i32 = 10;
    let line_h: i32 = font_px as i32 + 8;

    let mut y = top_px;
    if !title.is_empty() {
        let style = TextStyle::from((FontFamily::SansSerif, font_px + 2))
            .pos(Pos::new(HPos::Left, VPos::Top))
            .color(&BLACK);
        area.draw(&Text::new(title.to_string(), (pad, y), style))
            .map_err(|e| anyhow!("{:?}", e))?;
        y += line_h + 4;
    }

    let text_x = pad + 2 * marker_radius + marker_to_text_gap;
    let text_cap = (w as i32 - text_x - pad).max(20) as u32;
    let label_style = TextStyle::from((FontFamily::SansSerif, font_px))
        .pos(Pos::new(HPos::Left, VPos::Center))
        .color(&BLACK);

    for (label, color) in items {
        let cy = y + line_h / 2;
        area.draw(&Circle::new(
            (pad + marker_radius, cy),
            marker_radius,
            color.filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        let text = truncate_to_width(label, font_px, text_cap);
        area.draw(&Text::new(text, (text_x, cy), label_style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
        y += line_h;
    }
    Ok(())
}

/// Vertical YlGnBu color bar for counts `0..=max`, with tick labels on the right.
pub fn draw_color_bar<DB>(
    area: &DrawingArea<DB, Shift>,
    max: u32,
    font_px: u32,
    top_px: u32,
    bottom_px: u32,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let upper = max.max(1) as f64;
    let mut bar = ChartBuilder::on(area)
        .margin_top(top_px)
        .margin_bottom(bottom_px)
        .margin_left(8)
        .margin_right(8)
        .set_label_area_size(LabelAreaPosition::Right, font_px * 3)
        .build_cartesian_2d(0f64..1f64, 0f64..upper)
        .map_err(|e| anyhow!("{:?}", e))?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .label_style((FontFamily::SansSerif, font_px))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let steps = 100;
    bar.draw_series((0..steps).map(|i| {
        let y0 = upper * i as f64 / steps as f64;
        let y1 = upper * (i + 1) as f64 / steps as f64;
        let t = (y0 + y1) / 2.0 / upper;
        Rectangle::new([(0.0, y0), (1.0, y1)], ylgnbu(t).filled())
    }))
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
