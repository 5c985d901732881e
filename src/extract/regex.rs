//! Line-by-line pattern matching.

use ::regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Page, RawRow};

use super::{ExtractionStrategy, PageRows, StrategyKind};

/// ID, category code, signed integer.
pub const CANONICAL_PATTERN: &str = r"^\s*([A-Za-z0-9]+)\s+([A-Za-z]{1,3})\s+(-?\d+)\s*$";

/// Matches each line against an ordered list of patterns.
///
/// The first matching pattern wins. Its capture groups become the row's
/// tokens; a pattern without groups contributes the whitespace-split match.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    patterns: Vec<Regex>,
}

impl RegexExtractor {
    /// Compile `patterns` in order. An empty list is a configuration error.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(Error::Other("regex strategy needs at least one pattern".into()));
        }
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// The canonical three-column pattern alone.
    pub fn canonical() -> Result<Self> {
        Self::new(&[CANONICAL_PATTERN])
    }

    /// Default patterns for a schema of `columns` columns.
    ///
    /// Every count gets a pattern matching exactly that many
    /// whitespace-separated tokens. Three columns try the canonical pattern
    /// first, so ID/category/number lines keep their stricter split.
    pub fn for_columns(columns: usize) -> Result<Self> {
        let generic = token_pattern(columns.max(1));
        if columns == 3 {
            Self::new(&[CANONICAL_PATTERN, generic.as_str()])
        } else {
            Self::new(&[generic])
        }
    }

    /// Configured patterns when given, else the defaults for the schema.
    pub fn for_schema<S: AsRef<str>>(patterns: &[S], columns: usize) -> Result<Self> {
        if patterns.is_empty() {
            Self::for_columns(columns)
        } else {
            Self::new(patterns)
        }
    }

    /// Pattern sources in match order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    /// Tokens of `line` under the first matching pattern.
    pub fn match_line(&self, line: &str) -> Option<Vec<String>> {
        self.patterns.iter().find_map(|re| {
            let caps = re.captures(line)?;
            let tokens = if caps.len() > 1 {
                caps.iter()
                    .skip(1)
                    .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            } else {
                caps.get(0)?
                    .as_str()
                    .split_whitespace()
                    .map(String::from)
                    .collect()
            };
            Some(tokens)
        })
    }
}

/// `^\s*(\S+)\s+(\S+)...\s*$` with `n` groups.
fn token_pattern(n: usize) -> String {
    let mut pattern = String::from(r"^\s*(\S+)");
    for _ in 1..n {
        pattern.push_str(r"\s+(\S+)");
    }
    pattern.push_str(r"\s*$");
    pattern
}

impl ExtractionStrategy for RegexExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Regex
    }

    fn extract(&self, page: &Page) -> Result<PageRows> {
        let mut out = PageRows::default();
        for (number, line) in page.text.lines().enumerate() {
            match self.match_line(line) {
                Some(tokens) => out.rows.push(RawRow::new(tokens, page.index, number + 1)),
                None => out.skipped += 1,
            }
        }
        Ok(out)
    }
}
