//! Text measurement and truncation utilities.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) + estimate_text_width_px("…", font_px) > max_px {
            out.pop();
            break;
        }
    }
    if out.is_empty() {
        return String::new();
    }
    out.push('…');
    out
}

/// Widest estimated width among `labels`.
pub fn max_text_width_px<'a>(labels: impl IntoIterator<Item = &'a str>, font_px: u32) -> u32 {
    labels
        .into_iter()
        .map(|s| estimate_text_width_px(s, font_px))
        .max()
        .unwrap_or(0)
}
