use crate::color::{Color, okabe_ito};
use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    /// Plain single-panel look: outward ticks, no grid, blue/orange series.
    Classic,
    /// Boxed frame with inward ticks, dashed grid and a colorblind-safe palette.
    Report,
    /// Classic without chrome: no ticks on the far sides, smaller fonts.
    Minimal,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "report" => Self::Report,
            "minimal" => Self::Minimal,
            _ => Self::Classic,
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Classic => classic(),
            Self::Report => report(),
            Self::Minimal => minimal(),
        }
    }
}

fn classic() -> VizConfig {
    VizConfig {
        theme: "classic".into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        colors: ColorsConfig::default(),
        output: OutputConfig::default(),
        date_format: "%Y-%m-%d".into(),
    }
}

fn report() -> VizConfig {
    let palette = okabe_ito();
    VizConfig {
        theme: "report".into(),
        figure: FigureConfig { width: 518.4, height: 302.4 },
        font: FontConfig { title_size: 12.0, label_size: 11.0, tick_size: 8.5, legend_size: 9.0 },
        axes: AxesConfig {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 5.0,
            ..AxesConfig::default()
        },
        grid: GridConfig { show: true, color: Color::hex("#CBD5E1"), alpha: 0.55 },
        colors: ColorsConfig {
            control: palette[0],
            treated: palette[1],
            series: palette[2],
            marker: Color::hex("#111827"),
        },
        output: OutputConfig { dpi: 220 },
        date_format: "%b %d".into(),
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: "minimal".into(),
        font: FontConfig { title_size: 10.5, label_size: 9.0, tick_size: 8.0, legend_size: 8.0 },
        axes: AxesConfig { tick_length: 2.5, x_ticks: 5, y_ticks: 5, ..AxesConfig::default() },
        ..classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_falls_back_to_classic() {
        assert_eq!(BuiltinTheme::parse("REPORT"), BuiltinTheme::Report);
        assert_eq!(BuiltinTheme::parse("unknown"), BuiltinTheme::Classic);
        assert_eq!(BuiltinTheme::Minimal.base_config().theme, "minimal");
    }
}
