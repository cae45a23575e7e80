//! Sentence-level paragraph splitting.
//!
//! A paragraph that cannot fit is cut between sentences: as many leading
//! sentences as fit the space left go into the first part and the rest
//! becomes the second part. Cuts never fall inside a sentence, and the two
//! parts rejoined with one space give back the original text.

use crate::algorithms::fits;
use crate::measure::Measurer;
use once_cell::sync::Lazy;
use quire_types::ContentBlock;
use regex::Regex;

/// Sentence terminators, any closing quotes or brackets, then whitespace.
static SENTENCE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["'\x{201D}\x{2019})\]]*(\s+)"#).expect("sentence pattern is valid"));

/// Byte ranges of each sentence in `text`, surrounding whitespace excluded.
pub fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let trimmed_start = text.len() - text.trim_start().len();
    let trimmed_end = text.trim_end().len();
    if trimmed_start >= trimmed_end {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut start = trimmed_start;
    for captures in SENTENCE_BREAK.captures_iter(&text[..trimmed_end]) {
        let Some(gap) = captures.get(1) else { continue };
        if gap.start() > start {
            spans.push((start, gap.start()));
        }
        start = gap.end();
    }
    if start < trimmed_end {
        spans.push((start, trimmed_end));
    }
    spans
}

/// The sentences of `text`, trimmed.
pub fn sentences(text: &str) -> Vec<&str> {
    sentence_spans(text)
        .into_iter()
        .map(|(s, e)| &text[s..e])
        .collect()
}

/// Text of sentences `from..to` as it appears in the original, inner
/// whitespace included.
fn join(text: &str, spans: &[(usize, usize)], from: usize, to: usize) -> String {
    text[spans[from].0..spans[to - 1].1].to_string()
}

/// Splits `block` so its first part fits in `available` pixels.
///
/// Returns `None` when the block has no text, when it is a single sentence,
/// or when not even its first sentence fits. When the remainder would
/// measure under `tiny_tail` pixels, one more sentence moves into it so the
/// second part is not a stray fragment.
pub async fn split_paragraph(
    measurer: &Measurer,
    block: &ContentBlock,
    available: f32,
    width: f32,
    two_column: bool,
    tiny_tail: f32,
) -> Option<(ContentBlock, ContentBlock)> {
    let text = block.text()?;
    let spans = sentence_spans(text);
    if spans.len() < 2 {
        return None;
    }

    let mut fitting = 0;
    for count in 1..spans.len() {
        let candidate = block.with_text(join(text, &spans, 0, count));
        let height = measurer.measure_block(&candidate, width, two_column).await;
        if !fits(height, available) {
            break;
        }
        fitting = count;
    }
    if fitting == 0 {
        return None;
    }

    if fitting > 1 {
        let rest = block.with_text(join(text, &spans, fitting, spans.len()));
        let rest_height = measurer.measure_block(&rest, width, two_column).await;
        if rest_height < tiny_tail {
            fitting -= 1;
        }
    }

    Some((
        block.with_text(join(text, &spans, 0, fitting)),
        block.with_text(join(text, &spans, fitting, spans.len())),
    ))
}
