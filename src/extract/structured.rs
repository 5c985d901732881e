//! Fixed-size grouping of consecutive lines.

use crate::error::Result;
use crate::model::{Page, RawRow};

use super::{ExtractionStrategy, PageRows, StrategyKind};

/// What a group is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupUnit {
    /// Each non-empty line is one field
    #[default]
    Lines,
    /// Each whitespace token is one field
    Tokens,
}

/// Emits one row per `group_size` consecutive units.
///
/// Groups never overlap. A trailing partial group is dropped and its units
/// counted as skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredExtractor {
    group_size: usize,
    unit: GroupUnit,
}

impl StructuredExtractor {
    /// Group lines `group_size` at a time. A size of zero acts as one.
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size: group_size.max(1),
            unit: GroupUnit::Lines,
        }
    }

    /// Set the grouping unit.
    pub fn with_unit(mut self, unit: GroupUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Units per row.
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Grouping unit.
    pub fn unit(&self) -> GroupUnit {
        self.unit
    }

    /// Units of the page with the line each came from.
    fn units<'a>(&self, page: &'a Page) -> Vec<(usize, &'a str)> {
        match self.unit {
            GroupUnit::Lines => page.lines().collect(),
            GroupUnit::Tokens => page
                .lines()
                .flat_map(|(line, text)| text.split_whitespace().map(move |t| (line, t)))
                .collect(),
        }
    }
}

impl ExtractionStrategy for StructuredExtractor {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Structured
    }

    fn extract(&self, page: &Page) -> Result<PageRows> {
        let units = self.units(page);
        let mut groups = units.chunks_exact(self.group_size);

        let rows = groups
            .by_ref()
            .map(|group| {
                let tokens = group.iter().map(|(_, text)| text.to_string()).collect();
                RawRow::new(tokens, page.index, group[0].0)
            })
            .collect();
        let skipped = groups.remainder().len();

        if skipped > 0 {
            log::debug!(
                "Page {}: dropped trailing partial group of {} unit(s)",
                page.index + 1,
                skipped
            );
        }
        Ok(PageRows { rows, skipped })
    }
}
