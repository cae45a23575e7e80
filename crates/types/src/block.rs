//! The typed content block model produced by the article extractor.
//!
//! Blocks are immutable values. Anything that needs a variation of a block
//! (a split paragraph half, a scaled-down image) builds a new one through the
//! `with_*` helpers instead of mutating in place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Presentation hints attached to a block. Opaque to the layout engine.
pub type StyleMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionItem {
    pub term: String,
    pub definition: String,
}

/// The closed set of block kinds the pipeline understands.
///
/// Kinds the extractor emits that are not listed here deserialize into
/// [`BlockKind::Unknown`] so that a single unexpected block cannot fail the
/// whole article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    Heading {
        text: String,
        level: u8,
    },
    Paragraph {
        text: String,
    },
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Quote {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cite: Option<String>,
    },
    List {
        items: Vec<String>,
        #[serde(default)]
        ordered: bool,
    },
    /// A single list entry. Produced when the flattener expands a `List`.
    #[serde(rename = "li")]
    ListItem {
        text: String,
        #[serde(default)]
        ordered: bool,
        /// 1-based position inside the original list.
        #[serde(default)]
        number: usize,
    },
    Table {
        rows: Vec<Vec<String>>,
    },
    Divider,
    Video {
        src: String,
    },
    Audio {
        src: String,
    },
    Embed {
        html: String,
    },
    DefinitionList {
        items: Vec<DefinitionItem>,
    },
    Span {
        text: String,
    },
    /// Sub-blocks that must always be placed together.
    Atomic {
        blocks: Vec<ContentBlock>,
    },
    Caption {
        text: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(flatten)]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "StyleMap::is_empty")]
    pub style: StyleMap,
}

impl From<BlockKind> for ContentBlock {
    fn from(kind: BlockKind) -> Self {
        Self {
            kind,
            style: StyleMap::new(),
        }
    }
}

impl ContentBlock {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        BlockKind::Heading {
            text: text.into(),
            level: level.clamp(1, 6),
        }
        .into()
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        BlockKind::Paragraph { text: text.into() }.into()
    }

    pub fn image(src: impl Into<String>, caption: Option<String>) -> Self {
        BlockKind::Image {
            src: src.into(),
            caption,
        }
        .into()
    }

    pub fn quote(text: impl Into<String>) -> Self {
        BlockKind::Quote {
            text: text.into(),
            cite: None,
        }
        .into()
    }

    pub fn list(items: Vec<String>, ordered: bool) -> Self {
        BlockKind::List { items, ordered }.into()
    }

    pub fn list_item(text: impl Into<String>, ordered: bool, number: usize) -> Self {
        BlockKind::ListItem {
            text: text.into(),
            ordered,
            number,
        }
        .into()
    }

    pub fn table(rows: Vec<Vec<String>>) -> Self {
        BlockKind::Table { rows }.into()
    }

    pub fn divider() -> Self {
        BlockKind::Divider.into()
    }

    pub fn caption(text: impl Into<String>) -> Self {
        BlockKind::Caption { text: text.into() }.into()
    }

    pub fn atomic(blocks: Vec<ContentBlock>) -> Self {
        BlockKind::Atomic { blocks }.into()
    }

    /// Stable lower-case name of the block kind, matching the JSON `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            BlockKind::Heading { .. } => "heading",
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Image { .. } => "image",
            BlockKind::Quote { .. } => "quote",
            BlockKind::List { .. } => "list",
            BlockKind::ListItem { .. } => "li",
            BlockKind::Table { .. } => "table",
            BlockKind::Divider => "divider",
            BlockKind::Video { .. } => "video",
            BlockKind::Audio { .. } => "audio",
            BlockKind::Embed { .. } => "embed",
            BlockKind::DefinitionList { .. } => "definitionList",
            BlockKind::Span { .. } => "span",
            BlockKind::Atomic { .. } => "atomic",
            BlockKind::Caption { .. } => "caption",
            BlockKind::Unknown => "unknown",
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, BlockKind::Heading { .. })
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, BlockKind::Paragraph { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, BlockKind::Image { .. })
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.kind, BlockKind::Atomic { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, BlockKind::Unknown)
    }

    /// The primary text of text-bearing blocks.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Heading { text, .. }
            | BlockKind::Paragraph { text }
            | BlockKind::Quote { text, .. }
            | BlockKind::ListItem { text, .. }
            | BlockKind::Span { text }
            | BlockKind::Caption { text } => Some(text),
            _ => None,
        }
    }

    /// Character count of paragraph text, or 0 for any other kind.
    pub fn paragraph_len(&self) -> usize {
        match &self.kind {
            BlockKind::Paragraph { text } => text.chars().count(),
            _ => 0,
        }
    }

    /// Sub-blocks of an atomic cluster; a single-element slice otherwise.
    pub fn members(&self) -> &[ContentBlock] {
        match &self.kind {
            BlockKind::Atomic { blocks } => blocks,
            _ => std::slice::from_ref(self),
        }
    }

    /// A copy of this block with `text` replaced. Blocks without text are
    /// returned unchanged.
    pub fn with_text(&self, new_text: impl Into<String>) -> ContentBlock {
        let new_text = new_text.into();
        let kind = match &self.kind {
            BlockKind::Heading { level, .. } => BlockKind::Heading {
                text: new_text,
                level: *level,
            },
            BlockKind::Paragraph { .. } => BlockKind::Paragraph { text: new_text },
            BlockKind::Quote { cite, .. } => BlockKind::Quote {
                text: new_text,
                cite: cite.clone(),
            },
            BlockKind::ListItem { ordered, number, .. } => BlockKind::ListItem {
                text: new_text,
                ordered: *ordered,
                number: *number,
            },
            BlockKind::Span { .. } => BlockKind::Span { text: new_text },
            BlockKind::Caption { .. } => BlockKind::Caption { text: new_text },
            other => other.clone(),
        };
        ContentBlock {
            kind,
            style: self.style.clone(),
        }
    }

    /// A copy of this block with one style entry set.
    pub fn with_style(&self, key: impl Into<String>, value: impl Into<String>) -> ContentBlock {
        let mut style = self.style.clone();
        style.insert(key.into(), value.into());
        ContentBlock {
            kind: self.kind.clone(),
            style,
        }
    }
}
