//! HTML rendering of individual content blocks.

use crate::utils::{anchor_id, px, style_attr};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use log::warn;
use quire_traits::BlockRenderer;
use quire_types::{BlockKind, ContentBlock, Theme};
use std::fmt::Write;

/// Renders blocks as self-contained HTML fragments.
///
/// Every fragment carries its own typography inline so that it measures the
/// same in an isolated probe container as it does on the final page.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlBlockRenderer;

impl HtmlBlockRenderer {
    pub fn new() -> Self {
        Self
    }

    fn body_style(theme: &Theme) -> Vec<(&'static str, String)> {
        vec![
            ("margin", format!("0 0 {} 0", px(theme.block_spacing))),
            ("font-family", theme.font_family.clone()),
            ("font-size", px(theme.font_size)),
            ("line-height", theme.line_height.to_string()),
        ]
    }

    fn render_into(out: &mut String, block: &ContentBlock, theme: &Theme) {
        let style = &block.style;
        let body = Self::body_style(theme);
        match &block.kind {
            BlockKind::Heading { text: content, level } => {
                let level = (*level).clamp(1, 6);
                let base = vec![
                    ("margin", format!("0 0 {} 0", px(theme.block_spacing / 2.0))),
                    ("font-family", theme.heading_font_family.clone()),
                    ("font-size", px(theme.heading_font_size(level))),
                    ("line-height", "1.2".to_string()),
                ];
                let _ = write!(
                    out,
                    "<h{level} id=\"{}\"{}>{}</h{level}>",
                    attr(&anchor_id(content)),
                    style_attr(&base, style),
                    text(content)
                );
            }
            BlockKind::Paragraph { text: content } => {
                let _ = write!(out, "<p{}>{}</p>", style_attr(&body, style), text(content));
            }
            BlockKind::Span { text: content } => {
                let _ = write!(out, "<p{}><span>{}</span></p>", style_attr(&body, style), text(content));
            }
            BlockKind::Caption { text: content } => {
                let base = vec![
                    ("margin", format!("0 0 {} 0", px(theme.block_spacing))),
                    ("font-size", px(theme.font_size * 0.85)),
                    ("line-height", theme.line_height.to_string()),
                ];
                let _ = write!(
                    out,
                    "<figcaption{}>{}</figcaption>",
                    style_attr(&base, style),
                    text(content)
                );
            }
            BlockKind::Image { src, caption } => {
                let base = vec![("margin", format!("0 0 {} 0", px(theme.block_spacing)))];
                let _ = write!(
                    out,
                    "<figure{}><img src=\"{}\" alt=\"\" style=\"width:100%;display:block\"/>",
                    style_attr(&base, style),
                    attr(src)
                );
                if let Some(caption) = caption {
                    let _ = write!(out, "<figcaption>{}</figcaption>", text(caption));
                }
                out.push_str("</figure>");
            }
            BlockKind::Quote { text: content, cite } => {
                let mut base = body.clone();
                base.push(("border-left", format!("3px solid {}", theme.accent_color)));
                base.push(("padding-left", px(theme.font_size)));
                let _ = write!(out, "<blockquote{}><p>{}</p>", style_attr(&base, style), text(content));
                if let Some(cite) = cite {
                    let _ = write!(out, "<cite>{}</cite>", text(cite));
                }
                out.push_str("</blockquote>");
            }
            BlockKind::List { items, ordered } => {
                let tag = if *ordered { "ol" } else { "ul" };
                let _ = write!(out, "<{tag}{}>", style_attr(&body, style));
                for item in items {
                    let _ = write!(out, "<li>{}</li>", text(item));
                }
                let _ = write!(out, "</{tag}>");
            }
            BlockKind::ListItem { text: content, ordered, number } => {
                let mut base = body.clone();
                base[0] = ("margin", "0".to_string());
                if *ordered {
                    let _ = write!(
                        out,
                        "<ol start=\"{number}\"{}><li>{}</li></ol>",
                        style_attr(&base, style),
                        text(content)
                    );
                } else {
                    let _ = write!(out, "<ul{}><li>{}</li></ul>", style_attr(&base, style), text(content));
                }
            }
            BlockKind::Table { rows } => {
                let mut base = body.clone();
                base.push(("border-collapse", "collapse".to_string()));
                base.push(("width", "100%".to_string()));
                let _ = write!(out, "<table{}>", style_attr(&base, style));
                for row in rows {
                    out.push_str("<tr>");
                    for cell in row {
                        let _ = write!(out, "<td>{}</td>", text(cell));
                    }
                    out.push_str("</tr>");
                }
                out.push_str("</table>");
            }
            BlockKind::DefinitionList { items } => {
                let _ = write!(out, "<dl{}>", style_attr(&body, style));
                for item in items {
                    let _ = write!(out, "<dt>{}</dt><dd>{}</dd>", text(&item.term), text(&item.definition));
                }
                out.push_str("</dl>");
            }
            BlockKind::Divider => {
                let base = vec![
                    ("margin", format!("{} 0", px(theme.block_spacing))),
                    ("border", "0".to_string()),
                    ("border-top", format!("1px solid {}", theme.accent_color)),
                ];
                let _ = write!(out, "<hr{}/>", style_attr(&base, style));
            }
            BlockKind::Video { src } => {
                let _ = write!(
                    out,
                    "<video src=\"{}\" controls{}></video>",
                    attr(src),
                    style_attr(&[("width", "100%".to_string())], style)
                );
            }
            BlockKind::Audio { src } => {
                let _ = write!(
                    out,
                    "<audio src=\"{}\" controls{}></audio>",
                    attr(src),
                    style_attr(&[("width", "100%".to_string())], style)
                );
            }
            BlockKind::Embed { html } => {
                let _ = write!(out, "<div class=\"embed\"{}>{}</div>", style_attr(&[], style), html);
            }
            BlockKind::Atomic { blocks } => {
                let base = vec![("break-inside", "avoid".to_string())];
                let _ = write!(out, "<div class=\"atomic\"{}>", style_attr(&base, style));
                for member in blocks {
                    Self::render_into(out, member, theme);
                }
                out.push_str("</div>");
            }
            BlockKind::Unknown => {
                warn!("No markup for block of unknown type; rendering nothing");
            }
        }
    }
}

impl BlockRenderer for HtmlBlockRenderer {
    fn render(&self, block: &ContentBlock, theme: &Theme) -> String {
        let mut out = String::new();
        Self::render_into(&mut out, block, theme);
        out
    }

    fn name(&self) -> &'static str {
        "HtmlBlockRenderer"
    }
}
