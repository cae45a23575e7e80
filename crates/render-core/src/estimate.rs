//! A markup-driven height estimator.
//!
//! `EstimatingMeasurer` is a [`MeasurementPort`] that needs no browser: it
//! walks the rendered markup, wraps text greedily using an average glyph
//! width derived from each element's inline `font-size`, and adds fixed
//! heights for media. It is the default oracle of the command line tool and
//! is good enough to produce stable, plausible layouts offline.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use quire_traits::{MeasureError, MeasurementPort};
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*?)(/?)>"#).expect("tag pattern is valid")
});
static FONT_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"font-size:\s*([0-9.]+)px").expect("font-size pattern is valid"));
static LINE_HEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"line-height:\s*([0-9.]+)(px)?").expect("line-height pattern is valid"));
static ZOOM: Lazy<Regex> = Lazy::new(|| Regex::new(r"zoom:\s*([0-9.]+)").expect("zoom pattern is valid"));

/// Font metrics and fixed sizes used by the estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateMetrics {
    pub font_size: f32,
    pub line_height: f32,
    /// Average glyph advance as a fraction of the font size.
    pub char_width_em: f32,
    /// Space added after each block-level element.
    pub block_gap: f32,
    /// Height of an image as a fraction of its width.
    pub image_aspect: f32,
    pub audio_height: f32,
    pub divider_height: f32,
    /// Added to every answer, like the padding a browser probe would add.
    pub safety_padding: f32,
}

impl Default for EstimateMetrics {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 1.5,
            char_width_em: 0.5,
            block_gap: 12.0,
            image_aspect: 0.5625,
            audio_height: 54.0,
            divider_height: 24.0,
            safety_padding: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Font {
    size: f32,
    line_height: f32,
}

struct Frame<'a> {
    tag: &'a str,
    font: Font,
}

#[derive(Debug, Default)]
pub struct EstimatingMeasurer {
    metrics: EstimateMetrics,
}

impl EstimatingMeasurer {
    pub fn new(metrics: EstimateMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &EstimateMetrics {
        &self.metrics
    }

    /// Estimated height of `markup` laid out `width` pixels wide.
    pub fn estimate(&self, markup: &str, width: f32) -> f32 {
        let m = &self.metrics;
        let base = Font {
            size: m.font_size,
            line_height: m.line_height * m.font_size,
        };
        let mut stack: Vec<Frame> = Vec::new();
        let mut pending = String::new();
        let mut row: Vec<String> = Vec::new();
        let mut in_cell = false;
        let mut zoom = None;
        let mut total = 0.0;

        let mut cursor = 0;
        for captures in TAG.captures_iter(markup) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(2)) else {
                continue;
            };
            pending.push_str(&markup[cursor..whole.start()]);
            cursor = whole.end();

            let closing = captures.get(1).is_some_and(|c| !c.as_str().is_empty());
            let self_closing = captures.get(4).is_some_and(|c| !c.as_str().is_empty());
            let attrs = captures.get(3).map_or("", |a| a.as_str());
            let tag = name.as_str();
            let tag_lower = tag.to_ascii_lowercase();
            let font = stack.last().map_or(base, |f| f.font);

            if zoom.is_none() && !closing {
                zoom = Some(
                    ZOOM.captures(attrs)
                        .and_then(|c| c.get(1))
                        .and_then(|z| z.as_str().parse::<f32>().ok())
                        .unwrap_or(1.0),
                );
            }

            if is_cell(&tag_lower) {
                if closing {
                    row.push(std::mem::take(&mut pending));
                    in_cell = false;
                } else {
                    pending.clear();
                    in_cell = true;
                }
            } else if !in_cell && breaks_text(&tag_lower) {
                total += self.text_height(&pending, width, font);
                pending.clear();
            }

            if closing {
                if tag_lower == "tr" {
                    total += self.row_height(&row, width, font);
                    row.clear();
                }
                if ends_block(&tag_lower) {
                    total += m.block_gap;
                }
                if let Some(pos) = stack.iter().rposition(|f| f.tag.eq_ignore_ascii_case(tag)) {
                    stack.truncate(pos);
                }
                continue;
            }

            total += match tag_lower.as_str() {
                "img" => width * m.image_aspect,
                "hr" => m.divider_height,
                "video" | "iframe" => width * 9.0 / 16.0,
                "audio" => m.audio_height,
                _ => 0.0,
            };

            if !self_closing && !is_void(&tag_lower) {
                stack.push(Frame {
                    tag,
                    font: parse_font(attrs, font),
                });
            }
        }
        pending.push_str(&markup[cursor..]);
        total += self.text_height(&pending, width, stack.last().map_or(base, |f| f.font));

        total * zoom.unwrap_or(1.0)
    }

    fn text_height(&self, raw: &str, width: f32, font: Font) -> f32 {
        let decoded = html_escape::decode_html_entities(raw);
        let lines = wrap_lines(&decoded, width, font.size * self.metrics.char_width_em);
        lines as f32 * font.line_height
    }

    fn row_height(&self, cells: &[String], width: f32, font: Font) -> f32 {
        if cells.is_empty() {
            return 0.0;
        }
        let cell_width = width / cells.len() as f32;
        cells
            .iter()
            .map(|cell| self.text_height(cell, cell_width, font).max(font.line_height))
            .fold(0.0, f32::max)
    }
}

/// Number of lines `text` wraps to in `max_width`, breaking at whitespace.
/// Words wider than a line take as many lines as they need.
pub fn wrap_lines(text: &str, max_width: f32, char_width: f32) -> usize {
    if max_width <= 0.0 || char_width <= 0.0 {
        return 0;
    }
    let mut lines = 0;
    let mut line_width = 0.0f32;
    for word in text.split_whitespace() {
        let word_width = word.chars().count() as f32 * char_width;
        if line_width == 0.0 {
            lines += 1;
        } else if line_width + char_width + word_width > max_width {
            lines += 1;
            line_width = 0.0;
        } else {
            line_width += char_width;
        }
        if word_width > max_width {
            let extra = (word_width / max_width).ceil() as usize - 1;
            lines += extra;
            line_width = word_width - extra as f32 * max_width;
        } else {
            line_width += word_width;
        }
    }
    lines
}

fn parse_font(attrs: &str, inherited: Font) -> Font {
    let size = FONT_SIZE
        .captures(attrs)
        .and_then(|c| c.get(1))
        .and_then(|v| v.as_str().parse::<f32>().ok())
        .unwrap_or(inherited.size);
    let line_height = LINE_HEIGHT
        .captures(attrs)
        .and_then(|c| {
            let value = c.get(1)?.as_str().parse::<f32>().ok()?;
            Some(if c.get(2).is_some() { value } else { value * size })
        })
        .unwrap_or(if size == inherited.size {
            inherited.line_height
        } else {
            inherited.line_height / inherited.size * size
        });
    Font { size, line_height }
}

fn is_cell(tag: &str) -> bool {
    matches!(tag, "td" | "th")
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "hr" | "br" | "source" | "input" | "meta" | "link" | "wbr")
}

/// Tags whose boundary ends the current run of text.
fn breaks_text(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "ul" | "ol" | "blockquote" | "cite"
            | "figure" | "figcaption" | "div" | "dl" | "dt" | "dd" | "table" | "tr" | "br" | "hr"
            | "img" | "video" | "audio" | "iframe"
    )
}

/// Tags followed by the block gap when they close.
fn ends_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "blockquote" | "figure"
            | "table" | "dl"
    )
}

#[async_trait]
impl MeasurementPort for EstimatingMeasurer {
    async fn measure(
        &self,
        markup: &str,
        column_width: f32,
        _two_column: bool,
    ) -> Result<f32, MeasureError> {
        if !column_width.is_finite() || column_width <= 0.0 {
            return Err(MeasureError::Failed(format!(
                "cannot measure at column width {}",
                column_width
            )));
        }
        let height = self.estimate(markup, column_width);
        Ok(height.ceil() + self.metrics.safety_padding)
    }

    fn name(&self) -> &'static str {
        "EstimatingMeasurer"
    }
}
