//! Theme document types and their schema defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{BORDER_RADIUS_DEFAULT, FALLBACK_THEME};

/// A validated theme: metadata, palette and window styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDocument {
    #[serde(default)]
    pub metadata: ThemeMetadata,
    pub colors: ThemeColors,
    #[serde(default)]
    pub window: WindowStyle,
    #[serde(default)]
    pub ui_elements: ElementRadii,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeMetadata {
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
}

/// Colour roles. Values are opaque strings (`#rrggbb`, named colours, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub window_bg: String,
    pub button_bg: String,
    pub text_color: String,
    pub url_bar_bg: String,
    pub accent: String,
    #[serde(default = "default_tab_bg")]
    pub tab_bg: String,
    #[serde(default = "default_tab_active_bg")]
    pub tab_active_bg: String,
    #[serde(default = "default_tab_hover_bg")]
    pub tab_hover_bg: String,
    /// Empty until validation fills it from `window_bg`.
    #[serde(default)]
    pub toolbar_bg: String,
    #[serde(default = "default_border_color")]
    pub border_color: String,
    #[serde(default = "default_success_color")]
    pub success_color: String,
    #[serde(default = "default_warning_color")]
    pub warning_color: String,
    #[serde(default = "default_error_color")]
    pub error_color: String,
    #[serde(default = "default_info_color")]
    pub info_color: String,
}

fn default_tab_bg() -> String {
    "#f5f5f5".to_string()
}

fn default_tab_active_bg() -> String {
    "#ffffff".to_string()
}

fn default_tab_hover_bg() -> String {
    "#e8e8e8".to_string()
}

fn default_border_color() -> String {
    "#cccccc".to_string()
}

fn default_success_color() -> String {
    "#28a745".to_string()
}

fn default_warning_color() -> String {
    "#ffc107".to_string()
}

fn default_error_color() -> String {
    "#dc3545".to_string()
}

fn default_info_color() -> String {
    "#17a2b8".to_string()
}

/// Window chrome styling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowStyle {
    pub border_radius: u8,
    pub opacity: f64,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            border_radius: BORDER_RADIUS_DEFAULT as u8,
            opacity: 1.0,
        }
    }
}

/// Per-element corner radii in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementRadii {
    pub button_radius: u8,
    pub input_radius: u8,
    pub tab_radius: u8,
    pub menu_radius: u8,
    pub dialog_radius: u8,
    pub toolbar_radius: u8,
}

impl Default for ElementRadii {
    fn default() -> Self {
        Self {
            button_radius: 4,
            input_radius: 4,
            tab_radius: 6,
            menu_radius: 4,
            dialog_radius: 8,
            toolbar_radius: 0,
        }
    }
}

impl ThemeDocument {
    /// The compiled-in light theme used when nothing on disk can be loaded.
    pub fn builtin_light() -> Self {
        Self {
            metadata: ThemeMetadata {
                name: FALLBACK_THEME.to_string(),
                description: "Built-in light theme".to_string(),
                author: "Creature".to_string(),
                version: "1.0".to_string(),
            },
            colors: ThemeColors {
                window_bg: "#ffffff".to_string(),
                button_bg: "#f0f0f0".to_string(),
                text_color: "#000000".to_string(),
                url_bar_bg: "#ffffff".to_string(),
                accent: "#0078d4".to_string(),
                tab_bg: default_tab_bg(),
                tab_active_bg: default_tab_active_bg(),
                tab_hover_bg: default_tab_hover_bg(),
                toolbar_bg: "#ffffff".to_string(),
                border_color: default_border_color(),
                success_color: default_success_color(),
                warning_color: default_warning_color(),
                error_color: default_error_color(),
                info_color: default_info_color(),
            },
            window: WindowStyle::default(),
            ui_elements: ElementRadii::default(),
        }
    }
}
