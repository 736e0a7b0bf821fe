//! Visual styling for the details panel and highlighted markers.
//! Values are CSS strings handed to the host unchanged.

use crate::core::constants::{HIGHLIGHT_Z_INDEX, PANEL_WIDTH_PX};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelStyle {
    pub width_px: i32,
    pub background_color: String,
    /// Slide animation
    pub transition: String,
    pub header_height_px: u32,
    pub header_padding_px: u32,
    pub header_background: String,
    pub header_text_color: String,
    pub close_button_hover_background: String,
    pub close_button_focus_outline: String,
    pub content_padding_px: u32,
    /// Alternating list row backgrounds, even rows first
    pub row_backgrounds: [String; 2],
    pub row_padding_px: u32,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            width_px: PANEL_WIDTH_PX,
            background_color: "#f1f1f1".to_string(),
            transition: "all 0.3s ease".to_string(),
            header_height_px: 20,
            header_padding_px: 10,
            header_background: "#db4437".to_string(),
            header_text_color: "white".to_string(),
            close_button_hover_background: "#f44336".to_string(),
            close_button_focus_outline: "2px solid blue".to_string(),
            content_padding_px: 10,
            row_backgrounds: ["#f1f1f1".to_string(), "#ddd".to_string()],
            row_padding_px: 5,
        }
    }
}

impl PanelStyle {
    pub fn row_background(&self, index: usize) -> &str {
        &self.row_backgrounds[index % 2]
    }
}

/// A partial style update for a marker icon; `None` leaves a property as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub background_color: Option<String>,
    pub border: Option<String>,
    pub border_radius: Option<String>,
    pub z_index: Option<String>,
}

const HIGHLIGHT_TINT: &str = "rgba(255, 255, 255, 0.4)";

impl MarkerStyle {
    /// Selected marker: translucent halo above every other marker
    pub fn highlighted() -> Self {
        Self {
            background_color: Some(HIGHLIGHT_TINT.to_string()),
            border: Some(format!("6px solid {}", HIGHLIGHT_TINT)),
            border_radius: Some("50%".to_string()),
            z_index: Some(HIGHLIGHT_Z_INDEX.to_string()),
        }
    }

    /// Resets everything `highlighted` set
    pub fn cleared() -> Self {
        Self {
            background_color: Some("transparent".to_string()),
            border: Some("initial".to_string()),
            border_radius: Some("initial".to_string()),
            z_index: Some("initial".to_string()),
        }
    }

    /// Only lifts the stacking order back to the highlight level
    pub fn raised() -> Self {
        Self {
            z_index: Some(HIGHLIGHT_Z_INDEX.to_string()),
            ..Self::default()
        }
    }

    /// Applies the properties set in `update` on top of `self`
    pub fn merge(&mut self, update: &MarkerStyle) {
        if let Some(v) = &update.background_color {
            self.background_color = Some(v.clone());
        }
        if let Some(v) = &update.border {
            self.border = Some(v.clone());
        }
        if let Some(v) = &update.border_radius {
            self.border_radius = Some(v.clone());
        }
        if let Some(v) = &update.z_index {
            self.z_index = Some(v.clone());
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.background_color.as_deref() == Some(HIGHLIGHT_TINT)
    }
}
