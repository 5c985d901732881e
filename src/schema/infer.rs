//! Column count inference from a sample of candidate rows.

use std::collections::HashMap;

use crate::model::Page;
use crate::source::PageTextSource;

/// Shortest record period searched for in one-token-per-line layouts.
const MIN_PERIOD: usize = 2;
/// Longest record period searched for.
const MAX_PERIOD: usize = 10;
/// Full periods a sample needs before a period is trusted.
const MIN_REPEATS: usize = 3;

/// Coarse character class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenShape {
    /// Only ASCII digits, optionally signed
    Digits,
    /// Only letters
    Alpha,
    /// Anything else
    Mixed,
}

/// Classify a token.
pub fn token_shape(token: &str) -> TokenShape {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    if !unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit()) {
        TokenShape::Digits
    } else if !token.is_empty() && token.chars().all(char::is_alphabetic) {
        TokenShape::Alpha
    } else {
        TokenShape::Mixed
    }
}

/// Candidate rows of one page, as the sampler sees them.
///
/// Pages with detected tables contribute their non-blank grid rows; other
/// pages contribute their non-empty lines split on whitespace.
pub fn sample_page_rows(page: &Page) -> Vec<Vec<String>> {
    if page.has_tables() {
        page.table_rows()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| row.iter().map(|cell| cell.trim().to_string()).collect())
            .collect()
    } else {
        page.lines()
            .map(|(_, line)| line.split_whitespace().map(String::from).collect())
            .collect()
    }
}

/// Collect up to `sample_size` candidate rows from the first `max_pages`
/// pages of `source`.
///
/// Pages that fail to decode are skipped.
pub fn sample_rows(source: &PageTextSource, sample_size: usize, max_pages: usize) -> Vec<Vec<String>> {
    let mut sample = Vec::with_capacity(sample_size);
    for page in source.pages().take(max_pages) {
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Skipping page while sampling: {}", e);
                continue;
            }
        };
        for row in sample_page_rows(&page) {
            if sample.len() >= sample_size {
                return sample;
            }
            sample.push(row);
        }
    }
    sample
}

/// Infer the column count of a sample.
///
/// The most frequent token count wins, ties going to the count seen first.
/// When that is one token per row, the token stream is checked for a
/// repeating shape pattern, which is how records laid out one field per
/// line show up. An empty sample yields 1.
pub fn infer_column_count(sample: &[Vec<String>]) -> usize {
    let Some(mode) = modal_count(sample.iter().map(Vec::len).filter(|&n| n > 0)) else {
        return 1;
    };

    if mode == 1 {
        let tokens: Vec<&str> = sample.iter().flatten().map(String::as_str).collect();
        if let Some(period) = detect_period(&tokens) {
            log::debug!("One field per line with record period {}", period);
            return period;
        }
    }
    mode
}

fn modal_count(counts: impl Iterator<Item = usize>) -> Option<usize> {
    let mut tally: HashMap<usize, (usize, usize)> = HashMap::new();
    for (order, count) in counts.enumerate() {
        tally.entry(count).or_insert((0, order)).0 += 1;
    }
    tally
        .into_iter()
        .max_by(|(_, (freq_a, first_a)), (_, (freq_b, first_b))| {
            freq_a.cmp(freq_b).then(first_b.cmp(first_a))
        })
        .map(|(count, _)| count)
}

/// Smallest period whose shape pattern repeats across the whole stream.
///
/// A period made of a single shape repeated is not a record layout and is
/// never reported.
fn detect_period(tokens: &[&str]) -> Option<usize> {
    let shapes: Vec<TokenShape> = tokens.iter().map(|t| token_shape(t)).collect();

    (MIN_PERIOD..=MAX_PERIOD)
        .take_while(|p| p * MIN_REPEATS <= shapes.len())
        .find(|&p| {
            let head = &shapes[..p];
            let uniform = head.iter().all(|s| *s == head[0]);
            !uniform && shapes.iter().enumerate().all(|(i, s)| *s == head[i % p])
        })
}
