use serde::{Deserialize, Serialize};

/// Presentation settings handed to the block renderer.
///
/// The layout engine never reads these directly; they only influence the
/// markup handed to the measurement port, and therefore the heights it
/// reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub font_family: String,
    pub heading_font_family: String,
    /// Body font size in CSS pixels.
    pub font_size: f32,
    /// Unitless line height multiplier.
    pub line_height: f32,
    /// Vertical space after each block, in CSS pixels.
    pub block_spacing: f32,
    pub text_color: String,
    pub accent_color: String,
    pub background_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: "Georgia, serif".to_string(),
            heading_font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 16.0,
            line_height: 1.5,
            block_spacing: 12.0,
            text_color: "#1a1a1a".to_string(),
            accent_color: "#b33a3a".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }
}

impl Theme {
    /// Font size for a heading of the given level (1-6).
    pub fn heading_font_size(&self, level: u8) -> f32 {
        let scale = match level {
            1 => 2.0,
            2 => 1.6,
            3 => 1.35,
            4 => 1.15,
            _ => 1.0,
        };
        self.font_size * scale
    }
}
