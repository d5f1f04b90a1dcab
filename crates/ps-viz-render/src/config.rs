use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Top-level visualization configuration (YAML, JSON or programmatic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub colors: ColorsConfig,
    pub output: OutputConfig,
    /// chrono format string for date tick labels.
    pub date_format: String,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::Classic.base_config()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 460.8,  // 6.4" * 72
            height: 345.6, // 4.8" * 72
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
    pub legend_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { title_size: 12.0, label_size: 10.0, tick_size: 8.5, legend_size: 9.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    /// `"in"` or `"out"`.
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub x_ticks: usize,
    pub y_ticks: usize,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 3.5,
            x_ticks: 6,
            y_ticks: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: false, color: Color::hex("#b0b0b0"), alpha: 0.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Control markets (search stays on).
    pub control: Color,
    /// Treated markets (search goes off).
    pub treated: Color,
    /// Single-series plots (log gap).
    pub series: Color,
    /// Treatment-date marker and reference levels.
    pub marker: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            control: Color::hex("#1f77b4"),
            treated: Color::hex("#ff7f0e"),
            series: Color::hex("#1f77b4"),
            marker: Color::hex("#333333"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dpi: 100 }
    }
}

/// Resolve a VizConfig from an already-parsed document.
///
/// Priority: user overrides → base config of the named `theme` (default `classic`).
/// Only the keys present in `user` are overridden; nested sections merge key by key.
pub fn resolve_value(user: Value) -> crate::Result<VizConfig> {
    let theme = user.get("theme").and_then(Value::as_str).unwrap_or("classic");
    let base = BuiltinTheme::parse(theme).base_config();
    let mut merged =
        serde_yaml_ng::to_value(&base).map_err(|e| crate::RenderError::Config(e.to_string()))?;
    merge_values(&mut merged, user);
    let config: VizConfig = serde_yaml_ng::from_value(merged)
        .map_err(|e| crate::RenderError::Config(e.to_string()))?;
    if config.figure.width <= 0.0 || config.figure.height <= 0.0 {
        return Err(crate::RenderError::Config("figure width and height must be positive".into()));
    }
    if config.output.dpi == 0 {
        return Err(crate::RenderError::Config("output.dpi must be positive".into()));
    }
    Ok(config)
}

fn merge_values(base: &mut Value, user: Value) {
    match (base, user) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(user_map)) => {
            for (key, value) in user_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_yaml(yaml: &str) -> crate::Result<VizConfig> {
        let value: Value = serde_yaml_ng::from_str(yaml)
            .map_err(|e| crate::RenderError::Config(e.to_string()))?;
        resolve_value(value)
    }

    #[test]
    fn default_is_classic() {
        let cfg = resolve_value(Value::Null).unwrap();
        assert_eq!(cfg.theme, "classic");
        assert_eq!(cfg.output.dpi, 100);
    }

    #[test]
    fn theme_base_with_partial_override() {
        let cfg = resolve_yaml("theme: report\nfigure:\n  width: 600\n").unwrap();
        assert_eq!(cfg.theme, "report");
        assert_eq!(cfg.figure.width, 600.0);
        // Untouched keys keep the theme's values.
        let base = BuiltinTheme::Report.base_config();
        assert_eq!(cfg.figure.height, base.figure.height);
        assert_eq!(cfg.grid.show, base.grid.show);
        assert_eq!(cfg.colors.control, base.colors.control);
    }

    #[test]
    fn color_override_and_validation() {
        let cfg = resolve_yaml("colors:\n  treated: '#000000'\n").unwrap();
        assert_eq!(cfg.colors.treated, Color::BLACK);
        assert!(resolve_yaml("colors:\n  treated: nope\n").is_err());
        assert!(resolve_yaml("output:\n  dpi: 0\n").is_err());
        assert!(resolve_yaml("figure: [1, 2\n").is_err());
    }
}
