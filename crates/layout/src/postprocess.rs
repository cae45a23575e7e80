//! Tidy-up passes run once placement is complete.
//!
//! The passes run in a fixed order: collapsing half-empty two-column sets
//! changes what counts as spare space, and removing blank pages must come
//! after everything that can move content off a page.

use crate::algorithms::{check_fit, fits};
use crate::config::LayoutConfig;
use crate::measure::Measurer;
use crate::output::{GapReport, LayoutDiagnostics};
use crate::page::{Placement, VColumn, VColumnSet, VPage};
use itertools::Itertools;
use log::{debug, warn};

/// Widths closer than this are treated as the same column width.
const WIDTH_TOLERANCE: f32 = 0.5;

pub async fn post_process(
    pages: &mut Vec<VPage>,
    config: &LayoutConfig,
    measurer: &Measurer,
    diagnostics: &mut LayoutDiagnostics,
) {
    collapse_empty_columns(pages, measurer).await;
    fix_orphan_headings(pages);
    close_gaps(pages, config);
    remove_blank_pages(pages);
    report_gaps(pages, config, diagnostics);
}

/// Rewrites two-column sets whose second column stayed empty as a single
/// column spanning the page body. Blocks are re-measured at the full width.
pub async fn collapse_empty_columns(pages: &mut [VPage], measurer: &Measurer) {
    for page in pages.iter_mut() {
        let body_width = page.body_width;
        for set in page.column_sets.iter_mut() {
            if !set.is_two_column() || !set.columns[1].is_empty() {
                continue;
            }
            let left = set.columns.remove(0);
            let mut column = VColumn::new(body_width, set.height);
            for mut placed in left.content {
                placed.height = measurer.measure_block(&placed.block, body_width, false).await;
                if placed.is_forced() {
                    let fit = check_fit(placed.height, column.remaining());
                    placed.placement = if fit.fits {
                        Placement::Fitted
                    } else {
                        Placement::Forced { overflow: fit.overflow }
                    };
                }
                column.push(placed);
            }
            set.columns = vec![column];
            debug!("Collapsed a half-empty column set on page {}", page.page_number);
        }
    }
}

/// Page, set and column index of every column holding content, in reading
/// order.
fn content_columns(pages: &[VPage]) -> Vec<(usize, usize, usize)> {
    let mut positions = Vec::new();
    for (p, page) in pages.iter().enumerate() {
        for (s, set) in page.column_sets.iter().enumerate() {
            for (c, column) in set.columns.iter().enumerate() {
                if !column.is_empty() {
                    positions.push((p, s, c));
                }
            }
        }
    }
    positions
}

fn column(pages: &[VPage], (p, s, c): (usize, usize, usize)) -> &VColumn {
    &pages[p].column_sets[s].columns[c]
}

fn column_mut(pages: &mut [VPage], (p, s, c): (usize, usize, usize)) -> &mut VColumn {
    &mut pages[p].column_sets[s].columns[c]
}

/// Moves headings stranded at the bottom of a column to the top of the next
/// column that has content, when that column can take them.
pub fn fix_orphan_headings(pages: &mut [VPage]) {
    let positions = content_columns(pages);

    for (from, to) in positions.into_iter().tuple_windows() {
        // Spanning elements render above every column set of their page.
        if to.0 != from.0 && pages[from.0 + 1..=to.0].iter().any(|p| !p.spanning_elements.is_empty()) {
            continue;
        }

        loop {
            let source = column(pages, from);
            let target = column(pages, to);
            let Some(heading) = source.content.last().filter(|p| p.block.is_heading()) else {
                break;
            };
            if (source.width - target.width).abs() > WIDTH_TOLERANCE
                || !fits(target.content_height + heading.height, target.height)
            {
                break;
            }
            let Some(heading) = column_mut(pages, from).pop() else {
                break;
            };
            debug!(
                "Moved orphaned heading of section '{}' from page {} to page {}",
                heading.section_id,
                pages[from.0].page_number,
                pages[to.0].page_number
            );
            column_mut(pages, to).insert_front(heading);
        }
    }
}

/// Shrinks an under-filled single-column set at the bottom of a page and
/// pulls the next page's leading blocks up into the freed space.
pub fn close_gaps(pages: &mut [VPage], config: &LayoutConfig) {
    for idx in 0..pages.len().saturating_sub(1) {
        if pages[idx].is_first_page {
            continue;
        }
        let Some(last) = pages[idx].column_sets.last() else {
            continue;
        };
        if last.is_two_column() || last.spare() <= config.min_gap {
            continue;
        }
        let width = last.columns[0].width;

        let next = &pages[idx + 1];
        let Some(next_set) = next.column_sets.iter().find(|s| !s.is_empty()) else {
            continue;
        };
        let leads_two_column = next_set.columns[0]
            .content
            .first()
            .is_some_and(|b| b.prefers_two_columns);
        if !next.spanning_elements.is_empty()
            || next_set.is_two_column()
            || leads_two_column
            || (next_set.columns[0].width - width).abs() > WIDTH_TOLERANCE
        {
            continue;
        }
        let next_set_idx = next.column_sets.iter().position(|s| !s.is_empty()).unwrap_or(0);

        let (head, tail) = pages.split_at_mut(idx + 1);
        let page = &mut head[idx];
        let source = &mut tail[0].column_sets[next_set_idx].columns[0];

        if let Some(last) = page.column_sets.last_mut() {
            last.shrink_to_content();
        }
        let freed = page.remaining_height();
        let mut filler = VColumnSet::new(page.body_width, freed, false, config);
        let column = &mut filler.columns[0];

        while let Some(front) = source.content.first() {
            if !fits(column.content_height + front.height, column.height) {
                break;
            }
            if let Some(block) = source.take_front() {
                column.push(block);
            }
        }
        if column.ends_with_heading()
            && !source.is_empty()
            && let Some(heading) = column.pop()
        {
            source.insert_front(heading);
        }

        if !column.is_empty() {
            debug!(
                "Pulled {} block(s) up onto page {} to close a {:.1}px gap",
                column.content.len(),
                page.page_number,
                freed
            );
            page.column_sets.push(filler);
        }
    }
}

/// Drops empty column sets and pages with nothing on them, then renumbers.
/// The first page always stays for its cover.
pub fn remove_blank_pages(pages: &mut Vec<VPage>) {
    for page in pages.iter_mut() {
        page.column_sets.retain(|s| !s.is_empty());
    }
    let before = pages.len();
    pages.retain(|p| p.is_first_page || !p.is_blank());
    if pages.len() < before {
        debug!("Removed {} blank page(s)", before - pages.len());
    }
    for (i, page) in pages.iter_mut().enumerate() {
        page.page_number = i + 1;
    }
}

/// Unused height at the bottom of `page`.
pub fn trailing_gap(page: &VPage) -> f32 {
    let Some((last, rest)) = page.column_sets.split_last() else {
        return (page.body_height - page.spanning_height()).max(0.0);
    };
    let allotted: f32 = rest.iter().map(|s| s.height).sum();
    (page.body_height - page.spanning_height() - allotted - last.used_height()).max(0.0)
}

fn report_gaps(pages: &[VPage], config: &LayoutConfig, diagnostics: &mut LayoutDiagnostics) {
    diagnostics.excessive_gaps.clear();
    let Some((_, body)) = pages.split_last() else {
        return;
    };
    for page in body {
        let spare = trailing_gap(page);
        if spare > config.max_gap {
            warn!("Page {} ends with {:.1}px of whitespace", page.page_number, spare);
            diagnostics.excessive_gaps.push(GapReport {
                page_number: page.page_number,
                spare,
            });
        }
    }
}
