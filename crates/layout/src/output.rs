//! Output types from the layout engine.

use crate::page::{Placement, VPage};
use serde::Serialize;

/// The result of laying out one article: its pages plus a record of every
/// degraded decision taken along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaidOutArticle {
    pub pages: Vec<VPage>,
    pub diagnostics: LayoutDiagnostics,
}

impl LaidOutArticle {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// A block placed although it did not fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcedPlacement {
    pub page_number: usize,
    pub section_id: String,
    pub kind: &'static str,
    pub overflow: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShrunkBlock {
    pub page_number: usize,
    pub section_id: String,
    pub scale: f32,
}

/// Whitespace left at the bottom of a page after post-processing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    pub page_number: usize,
    pub spare: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDiagnostics {
    pub forced: Vec<ForcedPlacement>,
    pub shrunk: Vec<ShrunkBlock>,
    /// Paragraph splits performed during placement.
    pub splits: usize,
    pub excessive_gaps: Vec<GapReport>,
    pub cache_hits: usize,
    /// Calls that reached the measurement port.
    pub measurements: usize,
}

impl LayoutDiagnostics {
    /// Collects forced and shrunk placements from the final page numbering.
    pub fn collect_placements(&mut self, pages: &[VPage]) {
        self.forced.clear();
        self.shrunk.clear();
        for page in pages {
            for placed in page.blocks() {
                match placed.placement {
                    Placement::Fitted => {}
                    Placement::Shrunk { scale } => self.shrunk.push(ShrunkBlock {
                        page_number: page.page_number,
                        section_id: placed.section_id.clone(),
                        scale,
                    }),
                    Placement::Forced { overflow } => self.forced.push(ForcedPlacement {
                        page_number: page.page_number,
                        section_id: placed.section_id.clone(),
                        kind: placed.block.kind_name(),
                        overflow,
                    }),
                }
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.forced.is_empty() && self.excessive_gaps.is_empty()
    }
}
