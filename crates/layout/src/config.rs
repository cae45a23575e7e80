use crate::LayoutError;
use quire_types::Edges;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-section override of the automatic one/two column decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnPreference {
    /// Decide from the section's paragraph length and the global flag.
    #[default]
    Auto,
    One,
    Two,
}

/// Column preferences keyed by section id.
pub type ColumnPreferences = HashMap<String, ColumnPreference>;

/// Geometry and heuristics for a layout run. All lengths are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub page_padding: Edges,
    /// Horizontal space between the two columns of a two-column set.
    pub column_gap: f32,
    /// Space reserved at the top of the first page for the cover.
    pub cover_height: f32,
    pub show_profile_sidebar: bool,
    /// Width taken from the first page's body when the sidebar is shown.
    pub profile_sidebar_width: f32,
    /// Minimum leftover height that justifies opening another column set on
    /// the same page instead of starting a new page.
    pub min_gap: f32,
    /// Trailing whitespace above this height is reported after post-processing.
    pub max_gap: f32,
    /// Scale applied to oversized non-paragraph blocks before forcing them.
    pub shrink_limit: f32,
    /// Extra room an atomic cluster needs beyond its measured height.
    pub atomic_buffer: f32,
    /// A split remainder shorter than this pulls one sentence back with it.
    pub tiny_tail_height: f32,
    /// An image followed by a paragraph shorter than this is kept together.
    pub caption_max_chars: usize,
    /// Headings are clustered with a following paragraph only up to this length.
    pub heading_cluster_max_chars: usize,
    /// Sections with more paragraph characters than this prefer two columns.
    pub two_column_threshold: usize,
    pub force_two_columns: bool,
    pub max_pages: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            // A4 at 96 CSS px per inch.
            page_width: 794.0,
            page_height: 1123.0,
            page_padding: Edges::all(48.0),
            column_gap: 24.0,
            cover_height: 320.0,
            show_profile_sidebar: false,
            profile_sidebar_width: 220.0,
            min_gap: 250.0,
            max_gap: 480.0,
            shrink_limit: 0.6,
            atomic_buffer: 24.0,
            tiny_tail_height: 180.0,
            caption_max_chars: 250,
            heading_cluster_max_chars: 600,
            two_column_threshold: 700,
            force_two_columns: false,
            max_pages: 500,
        }
    }
}

impl LayoutConfig {
    /// Width available to column sets on a regular page.
    pub fn content_width(&self) -> f32 {
        self.page_width - self.page_padding.horizontal()
    }

    /// Height available to spanning elements and column sets on a regular page.
    pub fn content_height(&self) -> f32 {
        self.page_height - self.page_padding.vertical()
    }

    /// Body width of the first page, narrowed by the sidebar when shown.
    pub fn first_page_width(&self, sidebar: bool) -> f32 {
        if sidebar {
            self.content_width() - self.profile_sidebar_width
        } else {
            self.content_width()
        }
    }

    /// Body height of the first page, below the cover.
    pub fn first_page_height(&self) -> f32 {
        self.content_height() - self.cover_height
    }

    /// Width of one column in a set spanning `body_width`.
    pub fn column_width(&self, body_width: f32, two_column: bool) -> f32 {
        if two_column {
            ((body_width - self.column_gap) / 2.0).max(0.0)
        } else {
            body_width
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.content_width() <= 0.0 || self.content_height() <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "page padding leaves no body area on a {}x{} page",
                self.page_width, self.page_height
            )));
        }
        if self.first_page_height() < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "cover height {} exceeds the page body height {}",
                self.cover_height,
                self.content_height()
            )));
        }
        if self.show_profile_sidebar && self.first_page_width(true) <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "profile sidebar width {} leaves no room for the first page body",
                self.profile_sidebar_width
            )));
        }
        if self.column_width(self.content_width(), true) <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "column gap {} leaves no room for two columns",
                self.column_gap
            )));
        }
        if !(self.shrink_limit > 0.0 && self.shrink_limit <= 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "shrink limit must be in (0, 1], got {}",
                self.shrink_limit
            )));
        }
        if self.max_pages == 0 {
            return Err(LayoutError::InvalidConfig("max pages must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_a4_and_valid() {
        let config = LayoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.content_width(), 698.0);
        assert_eq!(config.column_width(698.0, true), 337.0);
        assert_eq!(config.first_page_height(), 1027.0 - 320.0);
    }

    #[test]
    fn rejects_cover_taller_than_page() {
        let config = LayoutConfig {
            cover_height: 5000.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_shrink_limit_out_of_range() {
        let config = LayoutConfig {
            shrink_limit: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{ "forceTwoColumns": true, "minGap": 300 }"#).unwrap();
        assert!(config.force_two_columns);
        assert_eq!(config.min_gap, 300.0);
        assert_eq!(config.page_width, 794.0);
    }
}
