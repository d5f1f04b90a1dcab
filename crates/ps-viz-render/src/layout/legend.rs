use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// One legend row: a line swatch and its label.
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    /// SVG dash pattern, `None` for solid.
    pub dash: Option<String>,
}

impl LegendEntry {
    pub fn line(label: impl Into<String>, color: Color) -> Self {
        Self { label: label.into(), color, dash: None }
    }
}

/// Where the legend box is anchored inside the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendCorner {
    TopLeft,
    TopRight,
}

/// Draw a framed legend in a corner of the plot area.
pub fn draw_legend(
    canvas: &mut Canvas,
    area: &PlotArea,
    entries: &[LegendEntry],
    font_size: f64,
    corner: LegendCorner,
) {
    if entries.is_empty() {
        return;
    }

    let row_height = font_size + 4.0;
    let swatch_w = 18.0;
    let gap = 6.0;
    let padding = 6.0;

    let text_style =
        TextStyle { size: font_size, baseline: TextBaseline::Central, ..Default::default() };

    let max_w = entries
        .iter()
        .map(|e| canvas.measure_text(&e.label, &text_style).width)
        .fold(0.0_f64, f64::max);

    let legend_w = padding + swatch_w + gap + max_w + padding;
    let legend_h = padding + entries.len() as f64 * row_height + padding;

    let lx = match corner {
        LegendCorner::TopLeft => area.left + 6.0,
        LegendCorner::TopRight => area.right() - legend_w - 6.0,
    };
    let ly = area.top + 6.0;

    let bg = Style {
        fill: Some(Color::rgba(255, 255, 255, 0.85)),
        stroke: Some(Color::rgb(204, 204, 204)),
        stroke_width: 0.6,
    };
    canvas.rect(lx, ly, legend_w, legend_h, &bg);

    for (i, entry) in entries.iter().enumerate() {
        let ey = ly + padding + i as f64 * row_height + row_height / 2.0;
        let sx = lx + padding;
        let ls = LineStyle { color: entry.color, width: 1.5, dash: entry.dash.clone() };
        canvas.line(sx, ey, sx + swatch_w, ey, &ls);
        canvas.text(sx + swatch_w + gap, ey, &entry.label, &text_style);
    }
}
