use chrono::NaiveDate;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::{Axis, date_value};
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Draw a box frame with ticks, optional grid, tick labels and axis labels.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    config: &VizConfig,
) {
    let frame_style = LineStyle::solid(Color::BLACK, 0.8);
    let tick_line = LineStyle::solid(Color::BLACK, 0.6);
    let grid_style = LineStyle {
        color: config.grid.color.with_alpha(config.grid.alpha),
        width: 0.5,
        dash: Some("3 3".into()),
    };

    let inward = config.axes.tick_direction == "in";
    let tl = config.axes.tick_length;
    // Signed tick offset pointing away from the frame edge for "out".
    let out = if inward { -tl } else { tl };

    canvas.line(area.left, area.top, area.right(), area.top, &frame_style);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), &frame_style);
    canvas.line(area.left, area.top, area.left, area.bottom(), &frame_style);
    canvas.line(area.right(), area.top, area.right(), area.bottom(), &frame_style);

    let x_label_style = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };
    let label_pad = if inward { 3.0 } else { tl + 3.0 };

    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        if config.grid.show {
            canvas.line(px, area.top, px, area.bottom(), &grid_style);
        }
        canvas.line(px, area.bottom(), px, area.bottom() + out, &tick_line);
        if config.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top - out, &tick_line);
        }
        if let Some(label) = x_axis.tick_labels.get(i) {
            canvas.text(px, area.bottom() + label_pad, label, &x_label_style);
        }
    }

    let y_label_style = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let mut widest = 0.0_f64;

    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        if config.grid.show {
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }
        canvas.line(area.left, py, area.left - out, py, &tick_line);
        if config.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() + out, py, &tick_line);
        }
        if let Some(label) = y_axis.tick_labels.get(i) {
            widest = widest.max(canvas.measure_text(label, &y_label_style).width);
            canvas.text(area.left - label_pad - 1.0, py, label, &y_label_style);
        }
    }

    let label_style = TextStyle {
        size: config.font.label_size,
        anchor: TextAnchor::Middle,
        ..Default::default()
    };

    if !x_axis.label.is_empty() {
        let label_y = area.bottom() + label_pad + config.font.tick_size + 12.0;
        canvas.text(area.left + area.width / 2.0, label_y, &x_axis.label, &label_style);
    }

    if !y_axis.label.is_empty() {
        let label_x = area.left - label_pad - widest - 8.0;
        let label_y = area.top + area.height / 2.0;
        canvas.text_rotated(label_x, label_y, &y_axis.label, &label_style, -90.0);
    }
}

/// Centered figure title above the plot area.
pub fn draw_title(canvas: &mut Canvas, area: &PlotArea, title: &str, config: &VizConfig) {
    if title.is_empty() {
        return;
    }
    let style = TextStyle {
        size: config.font.title_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Alphabetic,
        ..Default::default()
    };
    canvas.text(area.left + area.width / 2.0, area.top - 8.0, title, &style);
}

/// Vertical dashed marker at `x` spanning the plot area.
pub fn draw_vline(canvas: &mut Canvas, area: &PlotArea, x_axis: &Axis, x: f64, color: Color) {
    let px = x_axis.data_to_pixel(x, area.left, area.right());
    if px < area.left || px > area.right() {
        return;
    }
    canvas.line(px, area.top, px, area.bottom(), &LineStyle::dashed(color, 1.0));
}

/// Date x axis over the series, widened to include the treatment marker.
pub fn date_axis(dates: &[NaiveDate], marker: Option<NaiveDate>, config: &VizConfig) -> Axis {
    let bounds = dates.iter().chain(marker.iter()).fold(None, |acc, &d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((std::cmp::min(lo, d), std::cmp::max(hi, d))),
    });
    let axis = match bounds {
        Some((first, last)) => {
            Axis::dates(first, last, config.axes.x_ticks, 0.05, &config.date_format)
        }
        None => Axis::auto_linear(0.0, 1.0, config.axes.x_ticks),
    };
    axis.with_label("Date")
}

/// Split a date series into pixel runs, breaking wherever a value is missing.
pub fn pixel_runs(
    dates: &[NaiveDate],
    values: &[Option<f64>],
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (date, value) in dates.iter().zip(values) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => current.push((
                x_axis.data_to_pixel(date_value(*date), area.left, area.right()),
                y_axis.data_to_pixel(v, area.bottom(), area.top),
            )),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
