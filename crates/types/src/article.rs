use crate::block::ContentBlock;
use serde::{Deserialize, Serialize};

/// An author or contributor shown in the first page's profile sidebar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub role: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subsection {
    pub heading: Option<ContentBlock>,
    pub content: Vec<ContentBlock>,
}

/// A top-level section of an article.
///
/// A `None` level marks the introductory section that precedes the first
/// heading. The section's own heading is never repeated inside `content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub level: Option<u8>,
    pub heading: Option<ContentBlock>,
    pub content: Vec<ContentBlock>,
    pub subsections: Vec<Subsection>,
}

impl Section {
    /// Every block of the section in document order, the section heading
    /// excluded: `content` first, then each subsection's heading and content.
    pub fn body_blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content.iter().chain(
            self.subsections
                .iter()
                .flat_map(|sub| sub.heading.iter().chain(sub.content.iter())),
        )
    }

    /// Total character length of all paragraph text, subsections included.
    pub fn paragraph_chars(&self) -> usize {
        self.body_blocks().map(ContentBlock::paragraph_len).sum()
    }
}

/// The structured article returned by the extraction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub cover_image_ref: Option<String>,
    pub profiles: Vec<Profile>,
    pub sections: Vec<Section>,
}
