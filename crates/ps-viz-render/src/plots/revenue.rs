use ps_viz::RevenueSeriesArtifact;

use crate::RenderError;
use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::{Axis, date_value};
use crate::layout::legend::{LegendCorner, LegendEntry, draw_legend};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{date_axis, draw_axes, draw_title, draw_vline, pixel_runs};
use crate::primitives::*;

pub const TITLE: &str = "Figure 5.2: Average revenue over time";
pub const CONTROL_LABEL: &str = "Control (search stays on)";
pub const TREATED_LABEL: &str = "Treatment (search goes off)";

/// Average daily revenue of control and treated markets, with the treatment date marked.
pub fn render(artifact: &RevenueSeriesArtifact, config: &VizConfig) -> crate::Result<String> {
    let (lo, hi) = artifact
        .value_range()
        .filter(|_| !artifact.is_empty())
        .ok_or_else(|| RenderError::Empty("revenue series has no observed values".into()))?;

    let mut canvas = Canvas::new(config.figure.width, config.figure.height)?;

    let x_axis = date_axis(&artifact.dates, artifact.treatment_date, config);
    let y_axis = Axis::auto_linear(lo, hi, config.axes.y_ticks).with_label("Revenue");

    let area = PlotArea::auto(&canvas, &y_axis, &x_axis, Some(TITLE), config);
    draw_title(&mut canvas, &area, TITLE, config);
    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);

    canvas.push_clip(area.left, area.top, area.width, area.height);
    let series = [
        (&artifact.control, config.colors.control),
        (&artifact.treated, config.colors.treated),
    ];
    for (values, color) in series {
        let style = LineStyle::solid(color, 1.5);
        for run in pixel_runs(&artifact.dates, values, &area, &x_axis, &y_axis) {
            canvas.polyline(&run, &style);
        }
    }
    if let Some(t) = artifact.treatment_date {
        draw_vline(&mut canvas, &area, &x_axis, date_value(t), config.colors.marker);
    }
    canvas.pop_clip();

    let entries = [
        LegendEntry::line(CONTROL_LABEL, config.colors.control),
        LegendEntry::line(TREATED_LABEL, config.colors.treated),
    ];
    draw_legend(&mut canvas, &area, &entries, config.font.legend_size, LegendCorner::TopRight);

    Ok(canvas.finish_svg())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn artifact() -> RevenueSeriesArtifact {
        let dates = (1..=6).map(|d| NaiveDate::from_ymd_opt(2012, 5, d).unwrap()).collect();
        RevenueSeriesArtifact {
            dates,
            control: vec![Some(100.0), Some(110.0), Some(105.0), Some(120.0), None, Some(118.0)],
            treated: vec![Some(90.0), Some(95.0), Some(92.0), Some(80.0), Some(78.0), Some(81.0)],
            treatment_date: NaiveDate::from_ymd_opt(2012, 5, 4),
        }
    }

    #[test]
    fn renders_both_series_with_legend_and_marker() {
        let svg = render(&artifact(), &VizConfig::default()).unwrap();
        assert!(svg.contains(TITLE));
        assert!(svg.contains(CONTROL_LABEL));
        assert!(svg.contains(TREATED_LABEL));
        assert!(svg.contains(">Revenue</text>"));
        assert!(svg.contains(">Date</text>"));
        // control breaks at the missing day
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains("stroke-dasharray=\"6 3\""));
        assert!(svg.contains("2012-05-01"));
    }

    #[test]
    fn no_marker_without_treatment_date() {
        let mut art = artifact();
        art.treatment_date = None;
        let svg = render(&art, &VizConfig::default()).unwrap();
        assert!(!svg.contains("stroke-dasharray=\"6 3\""));
    }

    #[test]
    fn empty_series_is_error() {
        let art = RevenueSeriesArtifact {
            dates: vec![],
            control: vec![],
            treated: vec![],
            treatment_date: None,
        };
        assert!(matches!(render(&art, &VizConfig::default()), Err(RenderError::Empty(_))));
    }
}
