use crate::algorithms::EPSILON;
use crate::config::{ColumnPreference, LayoutConfig};
use crate::flatten::flatten;
use crate::page::Placement;
use crate::test_utils::*;
use crate::LayoutError;
use quire_types::{Article, ContentBlock, Profile};

#[test]
fn test_short_paragraph_fills_one_column_on_one_page() {
    let article = article(vec![section("intro", vec![ContentBlock::paragraph(filler(50))])]);
    let result = run_layout(&article, &Default::default());

    assert_eq!(result.page_count(), 1);
    let page = &result.pages[0];
    assert!(page.is_first_page);
    assert_eq!(page.column_sets.len(), 1);
    assert_eq!(page.column_sets[0].columns.len(), 1);
    assert_eq!(page.column_sets[0].columns[0].content.len(), 1);
    assert!(result.diagnostics.is_clean());
}

#[test]
fn test_long_section_uses_two_balanced_columns() {
    let content = (0..4).map(|_| ContentBlock::paragraph(filler(200))).collect();
    let article = article(vec![section("dense", content)]);

    let elements = flatten(&article, &Default::default(), &LayoutConfig::default());
    assert!(elements.iter().all(|e| e.two_column));

    let result = run_layout(&article, &Default::default());
    assert_eq!(result.page_count(), 1);
    let set = &result.pages[0].column_sets[0];
    assert_eq!(set.columns.len(), 2);
    assert_eq!(set.columns[0].content.len(), 2);
    assert_eq!(set.columns[1].content.len(), 2);
}

#[test]
fn test_heading_keeps_first_split_part_in_empty_column() {
    let text = sentences(60);
    let article = article(vec![section(
        "s",
        vec![ContentBlock::heading(2, "Background"), ContentBlock::paragraph(text.clone())],
    )]);
    let result = run_layout(&article, &prefer(&[("s", ColumnPreference::One)]));

    assert_eq!(result.page_count(), 2);
    let first = column_blocks(&result.pages[0]);
    assert_eq!(first.len(), 2);
    assert!(first[0].block.is_heading());
    assert!(first[1].block.is_paragraph());
    assert!(!first[1].continuation);

    let second = column_blocks(&result.pages[1]);
    assert_eq!(second.len(), 1);
    assert!(second[0].continuation);

    let rejoined = format!(
        "{} {}",
        first[1].block.text().unwrap(),
        second[0].block.text().unwrap()
    );
    assert_eq!(rejoined, text);
    assert_eq!(result.diagnostics.splits, 1);
}

#[test]
fn test_oversized_paragraph_is_forced_onto_its_own_page() {
    let article = article(vec![section("huge", vec![ContentBlock::paragraph(filler(4000))])]);
    let result = run_layout(&article, &prefer(&[("huge", ColumnPreference::One)]));

    // The cover page stays even though nothing fit under it.
    assert_eq!(result.page_count(), 2);
    assert!(result.pages[0].is_blank());

    let blocks = column_blocks(&result.pages[1]);
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].is_forced());

    let forced = &result.diagnostics.forced;
    assert_eq!(forced.len(), 1);
    assert_eq!(forced[0].page_number, 2);
    assert_eq!(forced[0].kind, "paragraph");
    assert!((forced[0].overflow - (1104.0 - 1027.0)).abs() < EPSILON);
}

#[test]
fn test_oversized_cluster_is_shrunk_before_forcing() {
    let config = LayoutConfig {
        page_height: 400.0,
        cover_height: 100.0,
        ..Default::default()
    };
    let article = article(vec![section(
        "figure",
        vec![ContentBlock::heading(2, "Figure"), ContentBlock::image("a.png", None)],
    )]);
    let result = run_layout_with(config, &article, &Default::default());

    let shrunk = &result.diagnostics.shrunk;
    assert_eq!(shrunk.len(), 1);
    assert_eq!(shrunk[0].page_number, 2);
    assert!(result.diagnostics.forced.is_empty());

    let blocks = column_blocks(&result.pages[1]);
    assert_eq!(blocks[0].block.style.get("zoom").map(String::as_str), Some("0.6"));
    assert!(matches!(blocks[0].placement, Placement::Shrunk { .. }));
}

#[test]
fn test_mode_switch_with_little_spare_starts_new_page() {
    let narrative = (0..4).map(|_| ContentBlock::paragraph(filler(480))).collect();
    let dense = (0..2).map(|_| ContentBlock::paragraph(filler(200))).collect();
    let article = article(vec![section("narrative", narrative), section("dense", dense)]);
    let preferences = prefer(&[
        ("narrative", ColumnPreference::One),
        ("dense", ColumnPreference::Two),
    ]);
    let result = run_layout(&article, &preferences);

    assert_eq!(result.page_count(), 2);
    assert_eq!(pages_of_section(&result, "narrative"), vec![1]);
    assert_eq!(pages_of_section(&result, "dense"), vec![2]);
    assert!(result.pages[1].column_sets[0].is_two_column());
}

#[test]
fn test_mode_switch_with_room_opens_set_on_same_page() {
    let narrative = (0..2).map(|_| ContentBlock::paragraph(filler(480))).collect();
    let dense = (0..2).map(|_| ContentBlock::paragraph(filler(200))).collect();
    let article = article(vec![section("narrative", narrative), section("dense", dense)]);
    let preferences = prefer(&[
        ("narrative", ColumnPreference::One),
        ("dense", ColumnPreference::Two),
    ]);
    let result = run_layout(&article, &preferences);

    assert_eq!(result.page_count(), 1);
    let sets = &result.pages[0].column_sets;
    assert_eq!(sets.len(), 2);
    assert!(!sets[0].is_two_column());
    assert_eq!(sets[0].height, 288.0);
    assert!(sets[1].is_two_column());
}

#[test]
fn test_main_heading_of_two_column_section_spans_page() {
    let content = (0..4).map(|_| ContentBlock::paragraph(filler(200))).collect();
    let article = article(vec![
        section("intro", vec![ContentBlock::paragraph(filler(100))]),
        headed_section("feature", 1, "Feature", content),
    ]);
    let preferences = prefer(&[
        ("intro", ColumnPreference::One),
        ("feature", ColumnPreference::Two),
    ]);
    let result = run_layout(&article, &preferences);

    assert_eq!(pages_of_section(&result, "feature"), vec![2]);
    let page = &result.pages[1];
    assert_eq!(page.spanning_elements.len(), 1);
    assert!(page.spanning_elements[0].block.is_heading());
    assert!(page.column_sets[0].is_two_column());
    assert!(page.column_sets[0].height <= page.body_height - page.spanning_height() + EPSILON);
}

#[test]
fn test_cluster_moves_to_next_page_as_a_whole() {
    let article = article(vec![section(
        "s",
        vec![
            ContentBlock::paragraph(filler(2150)),
            ContentBlock::heading(3, "Chart"),
            ContentBlock::image("c.png", None),
        ],
    )]);
    let result = run_layout(&article, &prefer(&[("s", ColumnPreference::One)]));

    assert_eq!(result.page_count(), 2);
    assert_eq!(column_blocks(&result.pages[0]).len(), 1);
    let moved = column_blocks(&result.pages[1]);
    assert!(moved[0].block.is_atomic());
    assert_eq!(moved[0].block.members().len(), 2);
}

#[test]
fn test_heading_is_not_left_at_column_bottom() {
    let article = article(vec![section(
        "s",
        vec![
            ContentBlock::paragraph(filler(2300)),
            ContentBlock::heading(2, "Next"),
            ContentBlock::paragraph(filler(700)),
        ],
    )]);
    let result = run_layout(&article, &prefer(&[("s", ColumnPreference::One)]));

    assert_eq!(result.page_count(), 2);
    assert_eq!(column_blocks(&result.pages[0]).len(), 1);
    assert!(column_blocks(&result.pages[1])[0].block.is_heading());
    assert_no_orphans(&result);
}

/// `n` sentences of `chars` characters each.
fn long_sentences(n: usize, chars: usize) -> String {
    (0..n)
        .map(|_| format!("{}.", filler(chars - 1)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_heading_moves_on_when_only_tail_room_is_left() {
    // 456px of filler leaves 251px: the heading fits, but each 1218-char
    // sentence below it needs 336px.
    let article = article(vec![section(
        "s",
        vec![
            ContentBlock::paragraph(filler(1600)),
            ContentBlock::heading(2, "Long read"),
            ContentBlock::paragraph(long_sentences(6, 1218)),
        ],
    )]);
    let result = run_layout(&article, &prefer(&[("s", ColumnPreference::One)]));

    assert_no_orphans(&result);
    assert_eq!(column_blocks(&result.pages[0]).len(), 1);
    let second = column_blocks(&result.pages[1]);
    assert!(second[0].block.is_heading());
    assert!(second[1].block.is_paragraph());
    assert!(!second[1].continuation);
}

#[test]
fn test_single_long_paragraph_is_split_across_both_columns() {
    let text = sentences(16);
    let article = article(vec![section("dense", vec![ContentBlock::paragraph(text.clone())])]);

    let elements = flatten(&article, &Default::default(), &LayoutConfig::default());
    assert!(elements[0].two_column);

    let result = run_layout(&article, &Default::default());
    assert_eq!(result.page_count(), 1);
    let set = &result.pages[0].column_sets[0];
    assert_eq!(set.columns.len(), 2);

    let (left, right) = (&set.columns[0].content, &set.columns[1].content);
    assert_eq!(left.len(), 1);
    assert_eq!(right.len(), 1);
    assert!(!left[0].continuation);
    assert!(right[0].continuation);
    // 7 of 16 sentences stay left: 216px against 288px on the right.
    assert_eq!(set.columns[0].content_height, 216.0);
    assert_eq!(set.columns[1].content_height, 288.0);
    assert_eq!(
        format!("{} {}", left[0].block.text().unwrap(), right[0].block.text().unwrap()),
        text
    );
    assert_eq!(result.diagnostics.splits, 1);
}

#[test]
fn test_image_moves_to_next_column_with_its_paragraph() {
    // Left column: 288px of text leaves 419px, enough for the 300px image
    // but not for the 192px paragraph after it.
    let article = article(vec![section(
        "s",
        vec![
            ContentBlock::paragraph(filler(500)),
            ContentBlock::image("map.png", None),
            ContentBlock::paragraph(filler(300)),
        ],
    )]);
    let result = run_layout(&article, &prefer(&[("s", ColumnPreference::Two)]));

    let elements = flatten(&article, &prefer(&[("s", ColumnPreference::Two)]), &LayoutConfig::default());
    assert_eq!(elements.len(), 3);

    assert_eq!(result.page_count(), 1);
    let set = &result.pages[0].column_sets[0];
    assert_eq!(set.columns.len(), 2);
    assert_eq!(set.columns[0].content.len(), 1);
    assert!(set.columns[0].content[0].block.is_paragraph());
    let right = &set.columns[1].content;
    assert_eq!(right.len(), 2);
    assert!(right[0].block.is_image());
    assert!(right[1].block.is_paragraph());
}

fn mixed_article() -> Article {
    article(vec![
        section(
            "intro",
            vec![
                ContentBlock::paragraph(filler(300)),
                ContentBlock::image("hero.png", None),
                ContentBlock::caption("Hero caption"),
            ],
        ),
        headed_section(
            "body",
            1,
            "Body",
            vec![
                ContentBlock::paragraph(sentences(30)),
                ContentBlock::list(vec!["one".into(), "two".into(), "three".into()], false),
                ContentBlock::heading(2, "Sub"),
                ContentBlock::paragraph(filler(150)),
                ContentBlock::paragraph(sentences(40)),
            ],
        ),
        headed_section(
            "tail",
            2,
            "Tail",
            vec![
                ContentBlock::paragraph(filler(500)),
                ContentBlock::divider(),
                ContentBlock::quote("A quote"),
            ],
        ),
    ])
}

fn mixed_preferences() -> crate::config::ColumnPreferences {
    prefer(&[("body", ColumnPreference::Two), ("tail", ColumnPreference::One)])
}

/// Kind and text of a block; atomic clusters join their members' texts.
fn signature(block: &ContentBlock) -> (&'static str, String) {
    let text = block
        .members()
        .iter()
        .map(|m| m.text().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("|");
    (block.kind_name(), text)
}

fn assert_no_orphans(result: &crate::output::LaidOutArticle) {
    let Some((_, body)) = result.pages.split_last() else {
        return;
    };
    for page in body {
        for set in &page.column_sets {
            for column in &set.columns {
                assert!(
                    !column.ends_with_heading(),
                    "page {} has a column ending with a heading",
                    page.page_number
                );
            }
        }
    }
}

#[test]
fn test_output_preserves_document_order() {
    let article = mixed_article();
    let preferences = mixed_preferences();
    let expected: Vec<_> = flatten(&article, &preferences, &LayoutConfig::default())
        .iter()
        .map(|e| signature(&e.block))
        .collect();

    let result = run_layout(&article, &preferences);
    let mut actual: Vec<(&'static str, String)> = Vec::new();
    for page in &result.pages {
        for placed in page.blocks() {
            let (kind, text) = signature(&placed.block);
            if placed.continuation
                && let Some(previous) = actual.last_mut()
            {
                previous.1.push(' ');
                previous.1.push_str(&text);
            } else {
                actual.push((kind, text));
            }
        }
    }

    assert_eq!(actual, expected);
}

#[test]
fn test_columns_respect_allotted_height() {
    let result = run_layout(&mixed_article(), &mixed_preferences());
    for page in &result.pages {
        for set in &page.column_sets {
            for column in &set.columns {
                if column.content.iter().any(|b| b.is_forced()) {
                    continue;
                }
                assert!(
                    column.content_height <= column.height + EPSILON,
                    "page {}: {} > {}",
                    page.page_number,
                    column.content_height,
                    column.height
                );
            }
        }
    }
    assert_no_orphans(&result);
}

#[test]
fn test_layout_is_idempotent() {
    init_logger();
    let engine = create_test_engine(LayoutConfig::default());
    let article = mixed_article();
    let preferences = mixed_preferences();

    let first = block_on(engine.generate_layout(&article, &preferences)).unwrap();
    let second = block_on(engine.generate_layout(&article, &preferences)).unwrap();

    assert_eq!(first.pages, second.pages);
    assert_eq!(second.diagnostics.measurements, 0);
    assert!(second.diagnostics.cache_hits > 0);
}

#[test]
fn test_page_limit_stops_runaway_layout() {
    init_logger();
    let config = LayoutConfig {
        max_pages: 2,
        ..Default::default()
    };
    let engine = create_test_engine(config);
    let content = (0..5).map(|_| ContentBlock::paragraph(filler(2300))).collect();
    let article = article(vec![section("s", content)]);

    let result = block_on(engine.generate_layout(&article, &prefer(&[("s", ColumnPreference::One)])));
    assert!(matches!(result, Err(LayoutError::PageLimitExceeded(2))));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = LayoutConfig {
        page_padding: quire_types::Edges::all(500.0),
        ..Default::default()
    };
    let result = crate::engine::PlacementEngine::new(config, test_measurer());
    assert!(matches!(result, Err(LayoutError::InvalidConfig(_))));
}

#[test]
fn test_profile_sidebar_narrows_first_page() {
    let config = LayoutConfig {
        show_profile_sidebar: true,
        ..Default::default()
    };
    let mut with_profiles = article(vec![section("intro", vec![ContentBlock::paragraph(filler(50))])]);
    with_profiles.profiles.push(Profile {
        name: "A. Writer".to_string(),
        ..Default::default()
    });
    let result = run_layout_with(config.clone(), &with_profiles, &Default::default());
    assert_eq!(result.pages[0].body_width, 698.0 - 220.0);
    assert_eq!(result.pages[0].column_sets[0].columns[0].width, 478.0);

    let without = article(vec![section("intro", vec![ContentBlock::paragraph(filler(50))])]);
    let result = run_layout_with(config, &without, &Default::default());
    assert_eq!(result.pages[0].body_width, 698.0);
}

#[test]
fn test_empty_article_yields_cover_page() {
    let result = run_layout(&article(Vec::new()), &Default::default());
    assert_eq!(result.page_count(), 1);
    assert!(result.pages[0].is_first_page);
}
