use ab_glyph::{Font, PxScale, ScaleFont};

use crate::font::FontHandle;
use crate::primitives::TextStyle;

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Measure text width and height in points using ab_glyph.
///
/// `size_pt` is the em size, matching SVG `font-size`.
pub fn measure_text<F: Font>(font: &F, text: &str, size_pt: f64) -> TextMetrics {
    let scale = font.pt_to_px_scale(size_pt as f32).unwrap_or(PxScale::from(size_pt as f32));
    let scaled = font.as_scaled(scale);

    let mut width: f32 = 0.0;
    let mut prev_glyph_id = None;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = prev_glyph_id {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph_id = Some(glyph_id);
    }

    let ascent = scaled.ascent();
    let height = ascent - scaled.descent();

    TextMetrics { width: width as f64, height: height as f64, ascent: ascent as f64 }
}

/// Measure text with a TextStyle, selecting the bold or regular face.
pub fn measure_styled(fonts: &FontHandle, text: &str, style: &TextStyle) -> TextMetrics {
    measure_text(fonts.select(style.bold), text, style.size)
}
