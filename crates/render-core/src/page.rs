//! Turns the finished virtual page model into final HTML.

use crate::error::RenderError;
use crate::utils::px;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use log::debug;
use quire_layout::{LaidOutArticle, LayoutConfig, PlacedBlock, VColumnSet, VPage};
use quire_traits::BlockRenderer;
use quire_types::{Article, Theme};
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Arc;

/// Emits one `section.page` per virtual page, with the cover and profile
/// sidebar on the first page, spanning elements above the column sets, and
/// every column at the width the engine measured it at.
pub struct Materializer {
    config: LayoutConfig,
    theme: Theme,
    renderer: Arc<dyn BlockRenderer>,
}

impl Materializer {
    pub fn new(config: LayoutConfig, theme: Theme, renderer: Arc<dyn BlockRenderer>) -> Self {
        Self {
            config,
            theme,
            renderer,
        }
    }

    /// A complete standalone document with print CSS.
    pub fn render_document(&self, article: &Article, laid_out: &LaidOutArticle) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
            text(&article.title),
            self.stylesheet()
        );
        for page in &laid_out.pages {
            out.push_str(&self.render_page(article, page));
            out.push('\n');
        }
        out.push_str("</body>\n</html>\n");
        debug!(
            "Materialized {} pages ({} bytes of HTML)",
            laid_out.pages.len(),
            out.len()
        );
        out
    }

    pub fn write_document<W: Write>(
        &self,
        article: &Article,
        laid_out: &LaidOutArticle,
        mut writer: W,
    ) -> Result<(), RenderError> {
        writer.write_all(self.render_document(article, laid_out).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Markup for the page numbered `page_number` (1-based).
    pub fn render_page_number(
        &self,
        article: &Article,
        laid_out: &LaidOutArticle,
        page_number: usize,
    ) -> Result<String, RenderError> {
        let page = laid_out
            .pages
            .iter()
            .find(|p| p.page_number == page_number)
            .ok_or(RenderError::MissingPage(page_number))?;
        Ok(self.render_page(article, page))
    }

    pub fn render_page(&self, article: &Article, page: &VPage) -> String {
        let config = &self.config;
        let mut out = String::new();
        let _ = write!(
            out,
            "<section class=\"page\" data-page=\"{}\" style=\"width:{};height:{};padding:{} {} {} {};\">",
            page.page_number,
            px(config.page_width),
            px(config.page_height),
            px(config.page_padding.top),
            px(config.page_padding.right),
            px(config.page_padding.bottom),
            px(config.page_padding.left),
        );

        if page.is_first_page {
            self.render_cover(&mut out, article);
        }
        out.push_str("<div class=\"page-body\">");
        if page.is_first_page && config.show_profile_sidebar && !article.profiles.is_empty() {
            self.render_profiles(&mut out, article);
        }

        let _ = write!(
            out,
            "<main class=\"page-main\" style=\"width:{};height:{};\">",
            px(page.body_width),
            px(page.body_height)
        );
        if !page.spanning_elements.is_empty() {
            out.push_str("<div class=\"spanning\">");
            for placed in &page.spanning_elements {
                self.render_block(&mut out, placed);
            }
            out.push_str("</div>");
        }
        for set in &page.column_sets {
            self.render_set(&mut out, set);
        }
        out.push_str("</main></div></section>");
        out
    }

    fn render_cover(&self, out: &mut String, article: &Article) {
        let background = article
            .cover_image_ref
            .as_deref()
            .map(|src| format!("background-image:url('{}');", attr(src)))
            .unwrap_or_default();
        let _ = write!(
            out,
            "<header class=\"cover\" style=\"height:{};{}\"><h1 class=\"cover-title\">{}</h1>",
            px(self.config.cover_height),
            background,
            text(&article.title)
        );
        if let Some(date) = &article.date {
            let _ = write!(out, "<time class=\"cover-date\">{}</time>", text(date));
        }
        if let Some(description) = &article.description {
            let _ = write!(out, "<p class=\"cover-description\">{}</p>", text(description));
        }
        out.push_str("</header>");
    }

    fn render_profiles(&self, out: &mut String, article: &Article) {
        let _ = write!(
            out,
            "<aside class=\"profiles\" style=\"width:{};\">",
            px(self.config.profile_sidebar_width)
        );
        for profile in &article.profiles {
            out.push_str("<div class=\"profile\">");
            if let Some(avatar) = &profile.avatar {
                let _ = write!(out, "<img class=\"avatar\" src=\"{}\" alt=\"\"/>", attr(avatar));
            }
            let _ = write!(out, "<strong>{}</strong>", text(&profile.name));
            if let Some(role) = &profile.role {
                let _ = write!(out, "<span class=\"role\">{}</span>", text(role));
            }
            if let Some(bio) = &profile.bio {
                let _ = write!(out, "<p class=\"bio\">{}</p>", text(bio));
            }
            out.push_str("</div>");
        }
        out.push_str("</aside>");
    }

    fn render_set(&self, out: &mut String, set: &VColumnSet) {
        let _ = write!(
            out,
            "<div class=\"column-set\" data-columns=\"{}\" style=\"height:{};gap:{};\">",
            set.columns.len(),
            px(set.height),
            px(self.config.column_gap)
        );
        for column in &set.columns {
            let _ = write!(out, "<div class=\"column\" style=\"width:{};\">", px(column.width));
            for placed in &column.content {
                self.render_block(out, placed);
            }
            out.push_str("</div>");
        }
        out.push_str("</div>");
    }

    fn render_block(&self, out: &mut String, placed: &PlacedBlock) {
        if placed.continuation {
            let block = placed.block.with_style("text-indent", "0");
            out.push_str(&self.renderer.render(&block, &self.theme));
        } else {
            out.push_str(&self.renderer.render(&placed.block, &self.theme));
        }
    }

    fn stylesheet(&self) -> String {
        let config = &self.config;
        let theme = &self.theme;
        format!(
            "@page{{size:{} {};margin:0}}\
             body{{margin:0;background:{};color:{};font-family:{}}}\
             .page{{box-sizing:border-box;overflow:hidden;break-after:page;position:relative}}\
             .cover{{box-sizing:border-box;background-size:cover;background-position:center}}\
             .cover-title{{margin:0;font-family:{}}}\
             .page-body{{display:flex}}\
             .profiles{{flex:none;font-size:{}}}\
             .column-set{{display:flex;overflow:hidden}}\
             .column{{flex:none}}\
             .atomic{{break-inside:avoid}}",
            px(config.page_width),
            px(config.page_height),
            theme.background_color,
            theme.text_color,
            theme.font_family,
            theme.heading_font_family,
            px(theme.font_size * 0.85),
        )
    }
}
