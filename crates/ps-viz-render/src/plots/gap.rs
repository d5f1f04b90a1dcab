use ps_viz::LogGapArtifact;

use crate::RenderError;
use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::{Axis, date_value};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{date_axis, draw_axes, draw_title, draw_vline, pixel_runs};
use crate::primitives::*;

pub const TITLE: &str = "Figure 5.3: Log-scale revenue gap over time";
pub const Y_LABEL: &str = "log(rev_control) - log(rev_treat)";

/// Daily log revenue gap with the treatment date and per-period mean levels.
pub fn render(artifact: &LogGapArtifact, config: &VizConfig) -> crate::Result<String> {
    if artifact.is_empty() {
        return Err(RenderError::Empty("no day has both groups observed".into()));
    }

    let (lo, hi) = artifact
        .gap
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &g| (lo.min(g), hi.max(g)));

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)?;

    let x_axis = date_axis(&artifact.dates, artifact.treatment_date, config);
    let y_axis = Axis::auto_linear(lo, hi, config.axes.y_ticks).with_label(Y_LABEL);

    let area = PlotArea::auto(&canvas, &y_axis, &x_axis, Some(TITLE), config);
    draw_title(&mut canvas, &area, TITLE, config);
    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);

    canvas.push_clip(area.left, area.top, area.width, area.height);
    let values: Vec<Option<f64>> = artifact.gap.iter().copied().map(Some).collect();
    let style = LineStyle::solid(config.colors.series, 1.5);
    for run in pixel_runs(&artifact.dates, &values, &area, &x_axis, &y_axis) {
        canvas.polyline(&run, &style);
    }

    if let Some(t) = artifact.treatment_date {
        let tx = date_value(t);
        draw_vline(&mut canvas, &area, &x_axis, tx, config.colors.marker);

        let level = LineStyle::dotted(config.colors.marker, 0.8);
        let first = artifact.dates.first().map_or(tx, |d| date_value(*d));
        let last = artifact.dates.last().map_or(tx, |d| date_value(*d));
        let spans = [(artifact.pre_mean, first, tx), (artifact.post_mean, tx, last)];
        for (mean, from, to) in spans {
            if let Some(m) = mean {
                let py = y_axis.data_to_pixel(m, area.bottom(), area.top);
                let x0 = x_axis.data_to_pixel(from, area.left, area.right());
                let x1 = x_axis.data_to_pixel(to, area.left, area.right());
                canvas.line(x0, py, x1, py, &level);
            }
        }
    }
    canvas.pop_clip();

    Ok(canvas.finish_svg())
}
