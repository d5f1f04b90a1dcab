use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::primitives::TextStyle;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Compute margins from tick labels, axis labels and the title.
    pub fn auto(
        canvas: &Canvas,
        y_axis: &Axis,
        x_axis: &Axis,
        title: Option<&str>,
        config: &VizConfig,
    ) -> Self {
        let tick_style = TextStyle { size: config.font.tick_size, ..Default::default() };
        let label_size = config.font.label_size;
        let tick_gap = config.axes.tick_length + 4.0;

        let max_tick_w = y_axis
            .tick_labels
            .iter()
            .map(|l| canvas.measure_text(l, &tick_style).width)
            .fold(0.0_f64, f64::max);
        let mut left = 12.0 + max_tick_w + tick_gap;
        if !y_axis.label.is_empty() {
            left += label_size + 6.0;
        }

        let mut bottom = 12.0 + tick_style.size + tick_gap;
        if !x_axis.label.is_empty() {
            bottom += label_size + 6.0;
        }

        let top = match title {
            Some(t) if !t.is_empty() => config.font.title_size * 1.2 + 16.0,
            _ => 12.0,
        };

        // Room for the last date label hanging past the frame.
        let last_tick_w = x_axis
            .tick_labels
            .last()
            .map(|l| canvas.measure_text(l, &tick_style).width)
            .unwrap_or(0.0);
        let right = (last_tick_w / 2.0).max(15.0);

        let width = canvas.width - left - right;
        let height = canvas.height - top - bottom;

        Self { left, top, width: width.max(50.0), height: height.max(50.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_fits_inside_canvas() {
        let canvas = Canvas::new(460.8, 345.6).unwrap();
        let config = VizConfig::default();
        let x = Axis::auto_linear(0.0, 10.0, 6).with_label("Date");
        let y = Axis::auto_linear(0.0, 25_000.0, 6).with_label("Revenue");
        let with_title = PlotArea::auto(&canvas, &y, &x, Some("Figure"), &config);
        let bare = PlotArea::auto(&canvas, &y, &x, None, &config);

        assert!(with_title.left > 0.0 && with_title.right() < canvas.width);
        assert!(with_title.bottom() < canvas.height);
        assert!(with_title.top > bare.top);
    }
}
