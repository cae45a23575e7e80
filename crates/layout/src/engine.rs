//! The placement engine.
//!
//! Elements are consumed strictly in document order. Each one is measured at
//! the width of the column under the cursor and either appended there or
//! moved on: to the next column, to a new column set on the same page, or to
//! a new page. Paragraphs that cannot fit are split between sentences,
//! other oversized blocks are shrunk, and as a last resort a block is placed
//! anyway and flagged.

use crate::algorithms::{check_fit, fits, EPSILON};
use crate::config::{ColumnPreferences, LayoutConfig};
use crate::flatten::{flatten, FlatElement};
use crate::measure::Measurer;
use crate::output::{LaidOutArticle, LayoutDiagnostics};
use crate::page::{LayoutState, PlacedBlock, Placement};
use crate::postprocess::post_process;
use crate::split::{sentence_spans, split_paragraph};
use crate::LayoutError;
use log::{debug, info, warn};
use quire_types::{Article, ContentBlock};
use std::collections::VecDeque;

/// One pending placement. Splitting a paragraph turns one task into two.
#[derive(Debug, Clone)]
struct Task {
    element: FlatElement,
    /// A split part that was sized to fit; it is never split again.
    retry: bool,
    continuation: bool,
}

impl Task {
    fn fresh(element: FlatElement) -> Self {
        Self {
            element,
            retry: false,
            continuation: false,
        }
    }
}

enum Outcome {
    Placed,
    Split(Task, Task),
}

pub struct PlacementEngine {
    config: LayoutConfig,
    measurer: Measurer,
}

impl PlacementEngine {
    pub fn new(config: LayoutConfig, measurer: Measurer) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self { config, measurer })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn measurer(&self) -> &Measurer {
        &self.measurer
    }

    /// Flattens `article`, places every element and tidies the result.
    pub async fn generate_layout(
        &self,
        article: &Article,
        preferences: &ColumnPreferences,
    ) -> Result<LaidOutArticle, LayoutError> {
        let (hits_before, misses_before) = self.measurer.stats();
        let elements = flatten(article, preferences, &self.config);
        debug!("Flattened '{}' into {} elements", article.title, elements.len());

        let sidebar = self.config.show_profile_sidebar && !article.profiles.is_empty();
        let first_two = elements.first().is_some_and(|e| e.two_column);
        let mut state = LayoutState::new(&self.config, sidebar, first_two);

        for index in 0..elements.len() {
            self.place_element(&mut state, &elements, index).await?;
        }
        self.close_current_set(&mut state).await;

        let mut diagnostics = LayoutDiagnostics {
            splits: state.splits,
            ..Default::default()
        };
        let mut pages = state.pages;
        post_process(&mut pages, &self.config, &self.measurer, &mut diagnostics).await;
        diagnostics.collect_placements(&pages);

        let (hits, misses) = self.measurer.stats();
        diagnostics.cache_hits = hits - hits_before;
        diagnostics.measurements = misses - misses_before;

        info!(
            "Laid out '{}' on {} pages ({} splits, {} shrunk, {} forced, {} measurements)",
            article.title,
            pages.len(),
            diagnostics.splits,
            diagnostics.shrunk.len(),
            diagnostics.forced.len(),
            diagnostics.measurements
        );
        Ok(LaidOutArticle { pages, diagnostics })
    }

    /// Places `elements[index]`, including every part a split produces.
    pub async fn place_element(
        &self,
        state: &mut LayoutState,
        elements: &[FlatElement],
        index: usize,
    ) -> Result<(), LayoutError> {
        let mut queue = VecDeque::from([Task::fresh(elements[index].clone())]);

        while let Some(task) = queue.pop_front() {
            let next = queue.front().map(|t| &t.element).or_else(|| elements.get(index + 1));
            let outcome = self.place_task(state, &task, next).await?;
            if let Outcome::Split(first, rest) = outcome {
                state.splits += 1;
                queue.push_front(rest);
                queue.push_front(first);
            }
        }
        Ok(())
    }

    async fn place_task(
        &self,
        state: &mut LayoutState,
        task: &Task,
        next: Option<&FlatElement>,
    ) -> Result<Outcome, LayoutError> {
        let config = &self.config;
        let element = &task.element;
        let block = &element.block;

        if element.main_heading && element.two_column {
            self.place_spanning(state, task).await?;
            return Ok(Outcome::Placed);
        }
        self.ensure_layout_mode(state, element.two_column).await?;

        loop {
            let two = state.current_set().is_two_column();
            let column = state.current_column();
            let (width, remaining, column_empty) = (column.width, column.remaining(), column.is_empty());
            let height = self.measurer.measure_block(block, width, two).await;

            if !column_empty && !task.retry {
                let joint = self.lookahead_height(element, height, next, width, two).await;
                if let Some(joint) = joint
                    && !fits(joint, remaining)
                {
                    debug!(
                        "Moving {} of section '{}' on: {:.1}px with its follower exceeds {:.1}px left",
                        block.kind_name(),
                        element.section_id,
                        joint,
                        remaining
                    );
                    self.advance(state, element.two_column).await?;
                    continue;
                }
            }

            let required = if block.is_atomic() {
                height + config.atomic_buffer
            } else {
                height
            };
            if fits(required, remaining) {
                let placed = placed_block(task, block.clone(), height, Placement::Fitted);
                state.current_column_mut().push(placed);
                return Ok(Outcome::Placed);
            }

            if block.is_paragraph()
                && !task.retry
                && (column_empty || remaining >= config.tiny_tail_height)
            {
                let split = split_paragraph(
                    &self.measurer,
                    block,
                    remaining,
                    width,
                    two,
                    config.tiny_tail_height,
                )
                .await;
                if let Some((first, rest)) = split {
                    debug!(
                        "Split paragraph of section '{}' to fill {:.1}px on page {}",
                        element.section_id,
                        remaining,
                        state.current_page().page_number
                    );
                    return Ok(Outcome::Split(
                        Task {
                            element: with_block(element, first),
                            retry: true,
                            continuation: task.continuation,
                        },
                        Task {
                            element: with_block(element, rest),
                            retry: false,
                            continuation: true,
                        },
                    ));
                }
            }

            if !column_empty {
                self.advance(state, element.two_column).await?;
                continue;
            }

            // An empty column on a partial page: a full page may still hold it.
            if state.current_set().height + EPSILON < config.content_height() {
                self.close_current_set(state).await;
                state.open_page(config, element.two_column)?;
                continue;
            }

            if !block.is_paragraph() && !task.retry {
                let scale = config.shrink_limit;
                let shrunk = block.with_style("zoom", scale.to_string());
                let shrunk_height = self.measurer.measure_block(&shrunk, width, two).await;
                let shrunk_required = if block.is_atomic() {
                    shrunk_height + config.atomic_buffer
                } else {
                    shrunk_height
                };
                if fits(shrunk_required, remaining) {
                    debug!(
                        "Shrunk {} of section '{}' to {} to fit {:.1}px",
                        block.kind_name(),
                        element.section_id,
                        scale,
                        remaining
                    );
                    let placed = placed_block(task, shrunk, shrunk_height, Placement::Shrunk { scale });
                    state.current_column_mut().push(placed);
                    return Ok(Outcome::Placed);
                }
            }

            let overflow = check_fit(height, remaining).overflow;
            warn!(
                "Forcing {} of section '{}' onto page {}: {:.1}px overflows its column by {:.1}px",
                block.kind_name(),
                element.section_id,
                state.current_page().page_number,
                height,
                overflow
            );
            let placed = placed_block(task, block.clone(), height, Placement::Forced { overflow });
            state.current_column_mut().push(placed);
            return Ok(Outcome::Placed);
        }
    }

    /// Places a two-column section's main heading across the full page width
    /// above a fresh two-column set.
    async fn place_spanning(&self, state: &mut LayoutState, task: &Task) -> Result<(), LayoutError> {
        let config = &self.config;
        let element = &task.element;

        if state.current_page().has_column_content() {
            self.close_current_set(state).await;
            state.open_page(config, true)?;
        }

        let width = state.current_page().body_width;
        let height = self.measurer.measure_block(&element.block, width, false).await;
        let page = state.current_page();
        let budget = page.body_height - page.spanning_height();
        if !page.spanning_elements.is_empty() && !fits(height, budget) {
            state.open_page(config, true)?;
        }

        let page = state.current_page_mut();
        page.column_sets.clear();
        let fit = check_fit(height, page.body_height - page.spanning_height());
        let placement = if fit.fits {
            Placement::Fitted
        } else {
            warn!(
                "Forcing heading of section '{}' across page {}: overflows by {:.1}px",
                element.section_id, page.page_number, fit.overflow
            );
            Placement::Forced {
                overflow: fit.overflow,
            }
        };
        page.spanning_elements
            .push(placed_block(task, element.block.clone(), height, placement));
        state.open_set(config, true);
        Ok(())
    }

    /// Makes sure the set under the cursor has the column count the next
    /// element wants.
    async fn ensure_layout_mode(&self, state: &mut LayoutState, two_column: bool) -> Result<(), LayoutError> {
        let config = &self.config;
        if state.current_set().is_two_column() == two_column {
            return Ok(());
        }
        if state.current_set().is_empty() {
            state.reshape_current_set(config, two_column);
            return Ok(());
        }

        self.close_current_set(state).await;
        let spare = state.current_set().spare();
        if spare > config.min_gap {
            debug!(
                "Switching to {} column(s) below the current set ({:.1}px spare)",
                if two_column { 2 } else { 1 },
                spare
            );
            state.current_set_mut().shrink_to_content();
            state.open_set(config, two_column);
        } else {
            debug!(
                "Switching to {} column(s) on a new page ({:.1}px spare is too little)",
                if two_column { 2 } else { 1 },
                spare
            );
            state.open_page(config, two_column)?;
        }
        Ok(())
    }

    /// Moves the cursor to the next column, a new set below, or a new page.
    async fn advance(&self, state: &mut LayoutState, next_two_column: bool) -> Result<(), LayoutError> {
        let config = &self.config;
        let column_count = state.current_set().columns.len();
        if state.cursor.col_idx + 1 < column_count {
            state.cursor.col_idx += 1;
            return Ok(());
        }

        self.close_current_set(state).await;
        let set = state.current_set();
        let spare = set.spare();
        if spare > config.min_gap && (set.is_two_column() || next_two_column) {
            state.current_set_mut().shrink_to_content();
            state.open_set(config, next_two_column);
        } else {
            state.open_page(config, next_two_column)?;
        }
        Ok(())
    }

    async fn close_current_set(&self, state: &mut LayoutState) {
        let moved = state.current_set_mut().balance();
        if moved > 0 {
            debug!("Balanced column set by moving {} block(s) right", moved);
        }
        let set = state.current_set();
        if set.is_two_column() && set.columns[1].is_empty() {
            self.split_across_columns(state).await;
        }
    }

    /// Splits the last paragraph of a set's left column so that its tail
    /// starts the empty right column, when that lowers the set's used height.
    async fn split_across_columns(&self, state: &mut LayoutState) {
        let set = state.current_set();
        let (left, right) = (&set.columns[0], &set.columns[1]);
        let Some(last) = left.content.last() else {
            return;
        };
        if !last.block.is_paragraph() || last.is_forced() {
            return;
        }
        let above = left.content_height - last.height;
        // Left ends up at half the column content when the first part gets this much.
        let target = (last.height - above) / 2.0;
        if target <= 0.0 {
            return;
        }

        let (width, right_height, before) = (left.width, right.height, left.content_height);
        let split = split_paragraph(
            &self.measurer,
            &last.block,
            target,
            width,
            true,
            self.config.tiny_tail_height,
        )
        .await;
        let Some((first, rest)) = split else {
            return;
        };
        let first_height = self.measurer.measure_block(&first, width, true).await;
        let rest_height = self.measurer.measure_block(&rest, width, true).await;
        let after = (above + first_height).max(rest_height);
        if after + EPSILON >= before || !fits(rest_height, right_height) {
            return;
        }

        let set = state.current_set_mut();
        let Some(last) = set.columns[0].pop() else {
            return;
        };
        set.columns[1].insert_front(PlacedBlock {
            block: rest,
            height: rest_height,
            continuation: true,
            ..last.clone()
        });
        set.columns[0].push(PlacedBlock {
            block: first,
            height: first_height,
            ..last
        });
        state.splits += 1;
        debug!(
            "Split paragraph across columns on page {} ({:.1}px / {:.1}px)",
            state.current_page().page_number,
            first_height,
            rest_height
        );
    }

    /// Combined height of a heading (or image) and the element it should stay
    /// with, when the two form such a pair.
    async fn lookahead_height(
        &self,
        element: &FlatElement,
        height: f32,
        next: Option<&FlatElement>,
        width: f32,
        two_column: bool,
    ) -> Option<f32> {
        let next = next?;
        if next.two_column != element.two_column || next.main_heading {
            return None;
        }
        let block = &element.block;
        let pairs = (block.is_heading() && !next.block.is_heading())
            || (block.is_image() && next.block.is_paragraph());
        if !pairs {
            return None;
        }

        let measured = self.measurer.measure_block(&next.block, width, two_column).await;
        let follower = if next.block.is_paragraph() {
            self.paragraph_lead(&next.block, measured, width, two_column).await
        } else if next.block.is_atomic() {
            measured + self.config.atomic_buffer
        } else {
            measured
        };
        Some(height + follower)
    }

    /// Height a paragraph needs directly below its heading or image. A short
    /// or single-sentence paragraph needs all of it; a longer one its first
    /// sentence and at least the tiny tail, which is what a split there keeps.
    async fn paragraph_lead(
        &self,
        block: &ContentBlock,
        measured: f32,
        width: f32,
        two_column: bool,
    ) -> f32 {
        let tail = self.config.tiny_tail_height;
        if measured <= tail {
            return measured;
        }
        let Some(text) = block.text() else {
            return measured;
        };
        let spans = sentence_spans(text);
        let [(start, end), _, ..] = spans.as_slice() else {
            return measured;
        };
        let first = block.with_text(&text[*start..*end]);
        self.measurer
            .measure_block(&first, width, two_column)
            .await
            .max(tail)
    }
}

fn with_block(element: &FlatElement, block: ContentBlock) -> FlatElement {
    FlatElement {
        block,
        section_id: element.section_id.clone(),
        two_column: element.two_column,
        main_heading: false,
    }
}

fn placed_block(task: &Task, block: ContentBlock, height: f32, placement: Placement) -> PlacedBlock {
    PlacedBlock {
        block,
        section_id: task.element.section_id.clone(),
        height,
        prefers_two_columns: task.element.two_column,
        continuation: task.continuation,
        placement,
    }
}
