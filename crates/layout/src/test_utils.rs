use crate::config::{ColumnPreference, ColumnPreferences, LayoutConfig};
use crate::engine::PlacementEngine;
use crate::measure::Measurer;
use crate::output::LaidOutArticle;
use crate::page::{PlacedBlock, VPage};
use async_trait::async_trait;
use quire_traits::{BlockRenderer, MeasureError, MeasurementPort};
use quire_types::{Article, ContentBlock, Section, Theme};
use std::sync::Arc;

pub const HEADING_HEIGHT: f32 = 40.0;
pub const IMAGE_HEIGHT: f32 = 300.0;
pub const LINE_HEIGHT: f32 = 24.0;
pub const CHAR_WIDTH: f32 = 8.0;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Renders one `kind:zoom:text` line per block; atomic clusters render one
/// line per member.
pub struct TestRenderer;

impl TestRenderer {
    fn line(block: &ContentBlock, zoom: &str) -> String {
        let text = block.text().unwrap_or_default().replace('\n', " ");
        format!("{}:{}:{}", block.kind_name(), zoom, text)
    }
}

impl BlockRenderer for TestRenderer {
    fn render(&self, block: &ContentBlock, _theme: &Theme) -> String {
        if block.is_unknown() {
            return String::new();
        }
        let zoom = block.style.get("zoom").map(String::as_str).unwrap_or("1");
        block
            .members()
            .iter()
            .map(|member| Self::line(member, zoom))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn name(&self) -> &'static str {
        "TestRenderer"
    }
}

/// Deterministic heights: headings 40px, images 300px, dividers 20px, and
/// text at 8px per character wrapped into 24px lines.
#[derive(Debug)]
pub struct TestMeasurer;

pub fn text_height(chars: usize, width: f32) -> f32 {
    let lines = ((chars as f32 * CHAR_WIDTH) / width).ceil().max(1.0);
    lines * LINE_HEIGHT
}

#[async_trait]
impl MeasurementPort for TestMeasurer {
    async fn measure(
        &self,
        markup: &str,
        column_width: f32,
        _two_column: bool,
    ) -> Result<f32, MeasureError> {
        let mut total = 0.0;
        for line in markup.lines() {
            let mut parts = line.splitn(3, ':');
            let kind = parts.next().unwrap_or_default();
            let zoom: f32 = parts.next().and_then(|z| z.parse().ok()).unwrap_or(1.0);
            let text = parts.next().unwrap_or_default();
            total += match kind {
                "heading" => HEADING_HEIGHT * zoom,
                "image" => IMAGE_HEIGHT * zoom,
                "divider" => 20.0,
                _ => text_height(text.chars().count(), column_width) * zoom,
            };
        }
        Ok(total)
    }

    fn name(&self) -> &'static str {
        "TestMeasurer"
    }
}

pub fn test_measurer() -> Measurer {
    Measurer::new(Arc::new(TestMeasurer), Arc::new(TestRenderer), Theme::default())
}

pub fn create_test_engine(config: LayoutConfig) -> PlacementEngine {
    PlacementEngine::new(config, test_measurer()).unwrap()
}

pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

pub fn run_layout(article: &Article, preferences: &ColumnPreferences) -> LaidOutArticle {
    run_layout_with(LayoutConfig::default(), article, preferences)
}

pub fn run_layout_with(
    config: LayoutConfig,
    article: &Article,
    preferences: &ColumnPreferences,
) -> LaidOutArticle {
    init_logger();
    let engine = create_test_engine(config);
    block_on(engine.generate_layout(article, preferences)).unwrap()
}

/// `n` characters of filler words without sentence punctuation.
pub fn filler(n: usize) -> String {
    let mut text: String = "lorem ipsum dolor sit amet ".chars().cycle().take(n).collect();
    if text.ends_with(' ') {
        text.pop();
        text.push('x');
    }
    text
}

/// `n` sentences of 53 characters each, joined by single spaces.
pub fn sentences(n: usize) -> String {
    (0..n)
        .map(|i| format!("Sentence {:03} fills the column with some steady words.", i))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn section(id: &str, content: Vec<ContentBlock>) -> Section {
    Section {
        id: id.to_string(),
        content,
        ..Default::default()
    }
}

pub fn headed_section(id: &str, level: u8, title: &str, content: Vec<ContentBlock>) -> Section {
    Section {
        id: id.to_string(),
        level: Some(level),
        heading: Some(ContentBlock::heading(level, title)),
        content,
        subsections: Vec::new(),
    }
}

pub fn article(sections: Vec<Section>) -> Article {
    Article {
        title: "Test article".to_string(),
        sections,
        ..Default::default()
    }
}

pub fn prefer(pairs: &[(&str, ColumnPreference)]) -> ColumnPreferences {
    pairs
        .iter()
        .map(|(id, p)| (id.to_string(), *p))
        .collect()
}

/// Every column's content on `page`, in reading order.
pub fn column_blocks(page: &VPage) -> Vec<&PlacedBlock> {
    page.column_sets
        .iter()
        .flat_map(|s| s.columns.iter().flat_map(|c| c.content.iter()))
        .collect()
}

pub fn pages_of_section(result: &LaidOutArticle, section_id: &str) -> Vec<usize> {
    let mut pages: Vec<usize> = result
        .pages
        .iter()
        .filter(|p| p.blocks().any(|b| b.section_id == section_id))
        .map(|p| p.page_number)
        .collect();
    pages.dedup();
    pages
}
