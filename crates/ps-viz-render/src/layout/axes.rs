use chrono::{Datelike, Days, NaiveDate};

/// Axis range with tick generation and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
}

/// Calendar steps (in days) a date axis may use between ticks.
const DAY_STEPS: &[u64] = &[1, 2, 7, 14, 28, 56, 91, 182, 364];

/// Position of a date on a date axis (days since 0001-01-01).
pub fn date_value(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

impl Axis {
    /// Auto-scale linear axis with "nice number" ticks covering the data.
    pub fn auto_linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (nice_min, nice_max, step) = nice_range(data_min, data_max, target_ticks);
        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut k = 0usize;
        loop {
            let v = nice_min + k as f64 * step;
            if v > nice_max + step * 0.01 {
                break;
            }
            ticks.push(v);
            labels.push(format_tick(v, step));
            k += 1;
        }

        Self {
            min: nice_min,
            max: nice_max,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
        }
    }

    /// Date axis spanning `[first, last]` with ticks on whole-day steps from `first`.
    ///
    /// `margin` widens the range on both sides by that fraction of the span.
    pub fn dates(
        first: NaiveDate,
        last: NaiveDate,
        target_ticks: usize,
        margin: f64,
        format: &str,
    ) -> Self {
        let (first, last) = if first <= last { (first, last) } else { (last, first) };
        let span_days = (last - first).num_days().max(0) as u64;
        let rough = span_days as f64 / target_ticks.max(2).saturating_sub(1) as f64;
        let step =
            DAY_STEPS.iter().copied().find(|&s| s as f64 >= rough).unwrap_or(DAY_STEPS[8]);

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut day = Some(first);
        while let Some(d) = day.filter(|d| *d <= last) {
            ticks.push(date_value(d));
            labels.push(d.format(format).to_string());
            day = d.checked_add_days(Days::new(step));
        }

        let pad = (span_days.max(1) as f64) * margin;
        Self {
            min: date_value(first) - pad,
            max: date_value(last) + pad,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        px_min + frac * (px_max - px_min)
    }
}

/// "Nice numbers" algorithm for pleasant tick spacing.
fn nice_range(data_min: f64, data_max: f64, target_ticks: usize) -> (f64, f64, f64) {
    if (data_max - data_min).abs() < 1e-15 {
        let half = if data_min.abs() > 1e-12 { data_min.abs() * 0.1 } else { 1.0 };
        return nice_range(data_min - half, data_max + half, target_ticks);
    }
    let range = data_max - data_min;
    let rough_step = range / (target_ticks.max(2) - 1) as f64;
    let step = nice_step(rough_step);
    let nice_min = (data_min / step).floor() * step;
    let nice_max = (data_max / step).ceil() * step;
    (nice_min, nice_max, step)
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = match frac {
        f if f <= 1.5 => 1.0,
        f if f <= 3.5 => 2.0,
        f if f <= 7.5 => 5.0,
        _ => 10.0,
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    // Snap values within rounding noise of zero so "-0" never shows up.
    let v = if value.abs() < step * 1e-6 { 0.0 } else { value };
    if step >= 1.0 {
        format!("{}", v.round() as i64)
    } else {
        let decimals = (-step.log10().floor()) as usize;
        format!("{v:.decimals$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_linear_covers_data() {
        let ax = Axis::auto_linear(0.13, 9.7, 6);
        assert!(!ax.tick_positions.is_empty());
        assert!(ax.min <= 0.13);
        assert!(ax.max >= 9.7);
        assert_eq!(ax.tick_positions.len(), ax.tick_labels.len());
    }

    #[test]
    fn flat_data_gets_a_range() {
        let ax = Axis::auto_linear(5.0, 5.0, 5);
        assert!(ax.min < 5.0 && ax.max > 5.0);
        let ax = Axis::auto_linear(0.0, 0.0, 5);
        assert!(ax.min < 0.0 && ax.max > 0.0);
    }

    #[test]
    fn data_to_pixel_linear() {
        let ax = Axis::auto_linear(0.0, 100.0, 5);
        let px = ax.data_to_pixel(50.0, 0.0, 500.0);
        assert!((px - 250.0).abs() < 1.0);
    }

    #[test]
    fn tick_labels_without_negative_zero() {
        let ax = Axis::auto_linear(-0.3, 0.3, 7);
        assert!(ax.tick_labels.iter().any(|l| l == "0.0"), "{:?}", ax.tick_labels);
        assert!(!ax.tick_labels.iter().any(|l| l == "-0.0"));
    }

    #[test]
    fn nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
        assert!((nice_step(4.5) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn date_axis_weekly_ticks() {
        let first = NaiveDate::from_ymd_opt(2012, 4, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2012, 7, 22).unwrap();
        let ax = Axis::dates(first, last, 6, 0.0, "%Y-%m-%d");
        assert_eq!(ax.tick_labels[0], "2012-04-01");
        assert_eq!(ax.tick_positions[1] - ax.tick_positions[0], 28.0);
        assert!(*ax.tick_positions.last().unwrap() <= date_value(last));
        assert_eq!(ax.min, date_value(first));
        assert_eq!(ax.max, date_value(last));
    }

    #[test]
    fn date_axis_single_day() {
        let d = NaiveDate::from_ymd_opt(2012, 5, 22).unwrap();
        let ax = Axis::dates(d, d, 6, 0.05, "%b %d");
        assert_eq!(ax.tick_labels, vec!["May 22".to_string()]);
        assert!(ax.min < ax.max);
    }
}
