use quire_types::StyleMap;
use std::fmt::Write;

/// Formats a CSS pixel length without trailing zeros.
pub fn px(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}px", rounded)
}

/// Builds an inline `style` attribute from fixed declarations followed by
/// the block's own style map. Later entries win in CSS, so block styles
/// override the defaults. Returns an empty string when there is nothing
/// to declare.
pub fn style_attr(base: &[(&str, String)], overrides: &StyleMap) -> String {
    let mut css = String::new();
    for (key, value) in base {
        let _ = write!(css, "{}:{};", key, value);
    }
    for (key, value) in overrides {
        let _ = write!(css, "{}:{};", key, value);
    }
    if css.is_empty() {
        return String::new();
    }
    format!(" style=\"{}\"", html_escape::encode_double_quoted_attribute(&css))
}

/// Anchor id for a heading, unique only by text.
pub fn anchor_id(text: &str) -> String {
    let slug = slug::slugify(text);
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}
