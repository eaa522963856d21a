//! Final style description handed to the presentation layer.
//!
//! Combines a validated theme with the `[ui]` scaling and font settings.

use serde::Serialize;

use super::types::{ElementRadii, ThemeDocument};
use crate::config::{FontStyle, UiSettings};
use crate::constants::{BASE_FONT_POINT_SIZE, MIN_FONT_POINT_SIZE};

/// Palette roles the window toolkit understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub window: String,
    pub window_text: String,
    pub base: String,
    pub alternate_base: String,
    pub button: String,
    pub button_text: String,
    pub text: String,
    pub link: String,
    pub highlight: String,
    pub tooltip_base: String,
    pub tooltip_text: String,
    pub toolbar: String,
    pub border: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum FontFamily {
    System,
    Serif,
    SansSerif,
    Monospace,
    Named(String),
}

impl FontFamily {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "system" => FontFamily::System,
            "serif" => FontFamily::Serif,
            "sans-serif" => FontFamily::SansSerif,
            "monospace" => FontFamily::Monospace,
            _ => FontFamily::Named(raw.trim().to_string()),
        }
    }
}

/// Maps a configured weight to a CSS-style weight class (100..=900).
///
/// Numeric weights round up to the next class; anything unparsable is normal.
pub fn font_weight(raw: &str) -> u16 {
    match raw.trim().to_ascii_lowercase().as_str() {
        "normal" => 400,
        "bold" => 700,
        "light" => 300,
        other => match other.parse::<u16>() {
            Ok(n) => n.div_ceil(100).clamp(1, 9) * 100,
            Err(_) => 400,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontSpec {
    pub family: FontFamily,
    pub weight: u16,
    pub style: FontStyle,
    pub point_size: i32,
}

/// Widget sizes scaled by `ui.scale_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScaledMetrics {
    pub font_px: i32,
    pub input_min_height: i32,
    pub button_min_height: i32,
    pub button_min_width: i32,
    pub tab_min_height: i32,
    pub tab_min_width: i32,
    pub padding: i32,
}

impl ScaledMetrics {
    fn new(point_size: i32, scale: f64) -> Self {
        let px = |base: i32| (base as f64 * scale) as i32;
        Self {
            font_px: px(point_size),
            input_min_height: px(24),
            button_min_height: px(28),
            button_min_width: px(60),
            tab_min_height: px(30),
            tab_min_width: px(80),
            padding: px(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleDescriptor {
    pub theme_name: String,
    pub palette: Palette,
    pub radii: ElementRadii,
    pub window_radius: u8,
    pub opacity: f64,
    pub font: FontSpec,
    /// `None` when no scaling is configured.
    pub metrics: Option<ScaledMetrics>,
}

impl StyleDescriptor {
    pub fn compose(theme_name: &str, theme: &ThemeDocument, ui: &UiSettings) -> Self {
        let c = &theme.colors;
        let palette = Palette {
            window: c.window_bg.clone(),
            window_text: c.text_color.clone(),
            base: c.url_bar_bg.clone(),
            alternate_base: c.button_bg.clone(),
            button: c.button_bg.clone(),
            button_text: c.text_color.clone(),
            text: c.text_color.clone(),
            link: c.accent.clone(),
            highlight: c.accent.clone(),
            tooltip_base: c.window_bg.clone(),
            tooltip_text: c.text_color.clone(),
            toolbar: c.toolbar_bg.clone(),
            border: c.border_color.clone(),
        };

        let point_size = (BASE_FONT_POINT_SIZE + ui.font_size_adjustment).max(MIN_FONT_POINT_SIZE);
        let font = FontSpec {
            family: FontFamily::parse(&ui.font_family),
            weight: font_weight(&ui.font_weight),
            style: ui.font_style,
            point_size,
        };
        let metrics = ((ui.scale_factor - 1.0).abs() > f64::EPSILON)
            .then(|| ScaledMetrics::new(point_size, ui.scale_factor));

        Self {
            theme_name: theme_name.to_string(),
            palette,
            radii: theme.ui_elements,
            window_radius: theme.window.border_radius,
            opacity: theme.window.opacity,
            font,
            metrics,
        }
    }
}
