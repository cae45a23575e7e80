//! The virtual page model built by the placement engine.
//!
//! A page holds full-width spanning elements followed by a stack of column
//! sets. Each set is a horizontal band of one or two columns sharing the
//! height the set was allotted when it was opened.

use crate::algorithms::{fits, EPSILON};
use crate::config::LayoutConfig;
use crate::LayoutError;
use quire_types::ContentBlock;
use serde::Serialize;

/// How a block ended up in its column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Placement {
    Fitted,
    /// Rendered at `scale` to fit.
    Shrunk { scale: f32 },
    /// Placed although it runs `overflow` pixels past its column.
    Forced { overflow: f32 },
}

/// A block committed to a column or to a page's spanning area.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedBlock {
    pub block: ContentBlock,
    pub section_id: String,
    /// Measured height at the width it was placed at.
    pub height: f32,
    pub prefers_two_columns: bool,
    /// A later part of a split paragraph.
    pub continuation: bool,
    pub placement: Placement,
}

impl PlacedBlock {
    pub fn is_forced(&self) -> bool {
        matches!(self.placement, Placement::Forced { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VColumn {
    pub width: f32,
    pub height: f32,
    pub content: Vec<PlacedBlock>,
    pub content_height: f32,
}

impl VColumn {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            content: Vec::new(),
            content_height: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Vertical space left below the last block. Zero once overfilled.
    pub fn remaining(&self) -> f32 {
        (self.height - self.content_height).max(0.0)
    }

    pub fn push(&mut self, placed: PlacedBlock) {
        self.content_height += placed.height;
        self.content.push(placed);
    }

    pub fn insert_front(&mut self, placed: PlacedBlock) {
        self.content_height += placed.height;
        self.content.insert(0, placed);
    }

    pub fn pop(&mut self) -> Option<PlacedBlock> {
        let placed = self.content.pop()?;
        self.content_height = (self.content_height - placed.height).max(0.0);
        Some(placed)
    }

    pub fn take_front(&mut self) -> Option<PlacedBlock> {
        if self.content.is_empty() {
            return None;
        }
        let placed = self.content.remove(0);
        self.content_height = (self.content_height - placed.height).max(0.0);
        Some(placed)
    }

    /// True when the final block is a bare heading.
    pub fn ends_with_heading(&self) -> bool {
        self.content.last().is_some_and(|p| p.block.is_heading())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VColumnSet {
    pub height: f32,
    pub columns: Vec<VColumn>,
}

impl VColumnSet {
    pub fn new(body_width: f32, height: f32, two_column: bool, config: &LayoutConfig) -> Self {
        let width = config.column_width(body_width, two_column);
        let count = if two_column { 2 } else { 1 };
        Self {
            height,
            columns: (0..count).map(|_| VColumn::new(width, height)).collect(),
        }
    }

    pub fn is_two_column(&self) -> bool {
        self.columns.len() > 1
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(VColumn::is_empty)
    }

    /// Tallest column content.
    pub fn used_height(&self) -> f32 {
        self.columns
            .iter()
            .map(|c| c.content_height)
            .fold(0.0, f32::max)
    }

    /// Height left under the tallest column.
    pub fn spare(&self) -> f32 {
        (self.height - self.used_height()).max(0.0)
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        for column in &mut self.columns {
            column.height = height;
        }
    }

    /// Shrinks the set to the height its content actually uses.
    pub fn shrink_to_content(&mut self) {
        let used = self.used_height();
        if used < self.height {
            self.set_height(used);
        }
    }

    /// Moves trailing blocks of the left column to the top of the right one
    /// for as long as that lowers the set's used height.
    ///
    /// Returns the number of blocks moved.
    pub fn balance(&mut self) -> usize {
        if self.columns.len() != 2 {
            return 0;
        }
        let mut moved = 0;
        loop {
            let (left, right) = self.columns.split_at_mut(1);
            let (left, right) = (&mut left[0], &mut right[0]);
            let Some(last) = left.content.last() else {
                break;
            };
            let before = left.content_height.max(right.content_height);
            let after = (left.content_height - last.height).max(right.content_height + last.height);
            if after + EPSILON >= before || !fits(right.content_height + last.height, right.height) {
                break;
            }
            if let Some(block) = left.pop() {
                right.insert_front(block);
                moved += 1;
            }
        }
        moved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VPage {
    pub page_number: usize,
    pub is_first_page: bool,
    /// Width shared by spanning elements and column sets.
    pub body_width: f32,
    /// Height shared by spanning elements and column sets.
    pub body_height: f32,
    pub spanning_elements: Vec<PlacedBlock>,
    pub column_sets: Vec<VColumnSet>,
}

impl VPage {
    pub fn new(page_number: usize, is_first_page: bool, body_width: f32, body_height: f32) -> Self {
        Self {
            page_number,
            is_first_page,
            body_width,
            body_height,
            spanning_elements: Vec::new(),
            column_sets: Vec::new(),
        }
    }

    pub fn spanning_height(&self) -> f32 {
        self.spanning_elements.iter().map(|p| p.height).sum()
    }

    /// Height not yet allotted to a spanning element or a column set.
    pub fn remaining_height(&self) -> f32 {
        let allotted: f32 = self.column_sets.iter().map(|s| s.height).sum();
        (self.body_height - self.spanning_height() - allotted).max(0.0)
    }

    pub fn has_column_content(&self) -> bool {
        self.column_sets.iter().any(|s| !s.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.spanning_elements.is_empty() && !self.has_column_content()
    }

    /// Every placed block in document order: spanning elements, then each
    /// set's columns left to right.
    pub fn blocks(&self) -> impl Iterator<Item = &PlacedBlock> {
        self.spanning_elements.iter().chain(
            self.column_sets
                .iter()
                .flat_map(|s| s.columns.iter().flat_map(|c| c.content.iter())),
        )
    }
}

/// Position of the column currently receiving content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCursor {
    pub page_idx: usize,
    pub set_idx: usize,
    pub col_idx: usize,
}

/// The page arena and cursor threaded through every placement call.
#[derive(Debug, Clone)]
pub struct LayoutState {
    pub pages: Vec<VPage>,
    pub cursor: LayoutCursor,
    pub splits: usize,
}

impl LayoutState {
    /// Opens the cover-bearing first page with one column set.
    pub fn new(config: &LayoutConfig, sidebar: bool, two_column: bool) -> Self {
        let first = VPage::new(
            1,
            true,
            config.first_page_width(sidebar),
            config.first_page_height(),
        );
        let mut state = Self {
            pages: vec![first],
            cursor: LayoutCursor::default(),
            splits: 0,
        };
        state.open_set(config, two_column);
        state
    }

    pub fn current_page(&self) -> &VPage {
        &self.pages[self.cursor.page_idx]
    }

    pub fn current_page_mut(&mut self) -> &mut VPage {
        &mut self.pages[self.cursor.page_idx]
    }

    pub fn current_set(&self) -> &VColumnSet {
        &self.current_page().column_sets[self.cursor.set_idx]
    }

    pub fn current_set_mut(&mut self) -> &mut VColumnSet {
        let LayoutCursor { page_idx, set_idx, .. } = self.cursor;
        &mut self.pages[page_idx].column_sets[set_idx]
    }

    pub fn current_column(&self) -> &VColumn {
        &self.current_set().columns[self.cursor.col_idx]
    }

    pub fn current_column_mut(&mut self) -> &mut VColumn {
        let col_idx = self.cursor.col_idx;
        &mut self.current_set_mut().columns[col_idx]
    }

    /// Appends a column set below the current page's existing sets, sized to
    /// the page's unallotted height, and moves the cursor into it.
    pub fn open_set(&mut self, config: &LayoutConfig, two_column: bool) {
        let page = self.current_page_mut();
        let set = VColumnSet::new(page.body_width, page.remaining_height(), two_column, config);
        page.column_sets.push(set);
        let set_count = page.column_sets.len();
        self.cursor.set_idx = set_count - 1;
        self.cursor.col_idx = 0;
    }

    /// Replaces the current, still empty, set with one of the other column
    /// count and the same height.
    pub fn reshape_current_set(&mut self, config: &LayoutConfig, two_column: bool) {
        let body_width = self.current_page().body_width;
        let height = self.current_set().height;
        *self.current_set_mut() = VColumnSet::new(body_width, height, two_column, config);
        self.cursor.col_idx = 0;
    }

    /// Starts a fresh page with one column set.
    pub fn open_page(&mut self, config: &LayoutConfig, two_column: bool) -> Result<(), LayoutError> {
        if self.pages.len() >= config.max_pages {
            return Err(LayoutError::PageLimitExceeded(config.max_pages));
        }
        let number = self.pages.len() + 1;
        self.pages.push(VPage::new(
            number,
            false,
            config.content_width(),
            config.content_height(),
        ));
        self.cursor = LayoutCursor {
            page_idx: self.pages.len() - 1,
            set_idx: 0,
            col_idx: 0,
        };
        self.open_set(config, two_column);
        Ok(())
    }
}
