//! Turns the article's section tree into the ordered element stream the
//! placement engine consumes.
//!
//! Besides flattening, this is where blocks that must travel together are
//! clustered into `atomic` blocks, and where lists are broken into one
//! element per item so that long lists can flow across columns.

use crate::config::{ColumnPreference, ColumnPreferences, LayoutConfig};
use log::{debug, warn};
use quire_types::{Article, BlockKind, ContentBlock, Section};
use serde::Serialize;

/// One placement-ready unit of the flattened stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatElement {
    pub block: ContentBlock,
    pub section_id: String,
    /// Inherited from the originating section.
    #[serde(rename = "use2Col")]
    pub two_column: bool,
    /// The section's own level-1 heading.
    pub main_heading: bool,
}

/// Flattens every section of `article` in document order.
pub fn flatten(
    article: &Article,
    preferences: &ColumnPreferences,
    config: &LayoutConfig,
) -> Vec<FlatElement> {
    let mut elements = Vec::new();

    for section in &article.sections {
        let two_column = section_prefers_two_columns(section, preferences.get(&section.id), config);
        let element = |block: ContentBlock, main_heading: bool| FlatElement {
            block,
            section_id: section.id.clone(),
            two_column,
            main_heading,
        };

        if let Some(heading) = &section.heading {
            elements.push(element(heading.clone(), section.level == Some(1)));
        }

        let mut body: Vec<&ContentBlock> = section.body_blocks().collect();
        if let (Some(heading), Some(first)) = (&section.heading, body.first())
            && heading == *first
        {
            debug!("Section '{}' repeats its heading in its content; dropping the copy", section.id);
            body.remove(0);
        }

        elements.extend(
            cluster_blocks(&body, config)
                .into_iter()
                .map(|block| element(block, false)),
        );
    }

    elements
}

/// Decides a section's column count.
///
/// An explicit per-section preference wins; otherwise the global force flag,
/// then the paragraph length threshold.
pub fn section_prefers_two_columns(
    section: &Section,
    preference: Option<&ColumnPreference>,
    config: &LayoutConfig,
) -> bool {
    match preference.copied().unwrap_or_default() {
        ColumnPreference::One => false,
        ColumnPreference::Two => true,
        ColumnPreference::Auto => {
            config.force_two_columns || section.paragraph_chars() > config.two_column_threshold
        }
    }
}

fn cluster_blocks(blocks: &[&ContentBlock], config: &LayoutConfig) -> Vec<ContentBlock> {
    let mut out = Vec::with_capacity(blocks.len());
    let mut i = 0;

    while i < blocks.len() {
        let block = blocks[i];
        match &block.kind {
            BlockKind::Unknown => {
                warn!("Skipping block of unknown type at position {}", i);
                i += 1;
            }
            BlockKind::Heading { .. } => {
                let body = blocks.get(i + 1).copied().filter(|b| !b.is_heading() && !b.is_unknown());
                match body {
                    // The image keeps its caption; the heading rides alone.
                    Some(_) if is_captioned_image(blocks, i + 1, config) => {
                        out.push(block.clone());
                        i += 1;
                    }
                    Some(list) if matches!(list.kind, BlockKind::List { .. }) => {
                        let mut items = expand_list(list).into_iter();
                        match items.next() {
                            Some(first) => out.push(ContentBlock::atomic(vec![block.clone(), first])),
                            None => out.push(block.clone()),
                        }
                        out.extend(items);
                        i += 2;
                    }
                    Some(next) if next.paragraph_len() > config.heading_cluster_max_chars => {
                        out.push(block.clone());
                        i += 1;
                    }
                    Some(next) => {
                        out.push(ContentBlock::atomic(vec![block.clone(), next.clone()]));
                        i += 2;
                    }
                    None => {
                        out.push(block.clone());
                        i += 1;
                    }
                }
            }
            BlockKind::Image { .. } if is_captioned_image(blocks, i, config) => {
                out.push(ContentBlock::atomic(vec![block.clone(), blocks[i + 1].clone()]));
                i += 2;
            }
            BlockKind::List { .. } => {
                out.extend(expand_list(block));
                i += 1;
            }
            _ => {
                out.push(block.clone());
                i += 1;
            }
        }
    }

    out
}

/// An image at `index` directly followed by a caption or a short paragraph.
fn is_captioned_image(blocks: &[&ContentBlock], index: usize, config: &LayoutConfig) -> bool {
    let (Some(image), Some(next)) = (blocks.get(index), blocks.get(index + 1)) else {
        return false;
    };
    if !image.is_image() {
        return false;
    }
    match &next.kind {
        BlockKind::Caption { .. } => true,
        BlockKind::Paragraph { text } => text.chars().count() < config.caption_max_chars,
        _ => false,
    }
}

fn expand_list(list: &ContentBlock) -> Vec<ContentBlock> {
    let BlockKind::List { items, ordered } = &list.kind else {
        return vec![list.clone()];
    };
    items
        .iter()
        .enumerate()
        .map(|(n, text)| ContentBlock {
            kind: BlockKind::ListItem {
                text: text.clone(),
                ordered: *ordered,
                number: n + 1,
            },
            style: list.style.clone(),
        })
        .collect()
}
