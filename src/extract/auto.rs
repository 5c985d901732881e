//! Strategy selection by probing the leading pages.

use serde::Serialize;

use crate::source::PageTextSource;

use super::{StrategyKind, StrategySet};

/// Default number of pages probed.
pub const DEFAULT_PROBE_PAGES: usize = 3;

/// How probe counts turn into a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbePolicy {
    /// Table wins whenever it found any row; otherwise most rows
    #[default]
    TablePreferred,
    /// Most rows overall
    MostRows,
}

/// Row counts per strategy over the probed pages, and the resulting choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    /// Pages actually probed
    pub pages: usize,
    /// Non-empty rows per strategy, in precedence order
    pub counts: Vec<(StrategyKind, usize)>,
    /// The chosen strategy
    pub chosen: StrategyKind,
}

impl ProbeReport {
    /// Rows the given strategy produced while probing.
    pub fn count(&self, kind: StrategyKind) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, n)| *n)
    }
}

/// Picks one concrete strategy for a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSelector {
    probe_pages: usize,
    policy: ProbePolicy,
}

impl Default for AutoSelector {
    fn default() -> Self {
        Self {
            probe_pages: DEFAULT_PROBE_PAGES,
            policy: ProbePolicy::default(),
        }
    }
}

impl AutoSelector {
    /// Create a selector with the given probe size and policy.
    pub fn new(probe_pages: usize, policy: ProbePolicy) -> Self {
        Self {
            probe_pages: probe_pages.max(1),
            policy,
        }
    }

    /// Probe `source` with every strategy in `set` and choose one.
    ///
    /// Pages that fail to decode and strategies that fail on a page count
    /// as zero rows. When nothing produced rows the choice is Regex.
    pub fn select(&self, source: &PageTextSource, set: &StrategySet) -> ProbeReport {
        let mut counts: Vec<(StrategyKind, usize)> =
            StrategyKind::PRECEDENCE.iter().map(|&k| (k, 0)).collect();
        let mut pages = 0;

        for page in source.pages().take(self.probe_pages) {
            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Skipping page while probing: {}", e);
                    continue;
                }
            };
            pages += 1;
            for (kind, total) in counts.iter_mut() {
                match set.get(*kind).extract(&page) {
                    Ok(rows) => *total += rows.non_empty(),
                    Err(e) => log::debug!("{} probe failed on page {}: {}", kind, page.index + 1, e),
                }
            }
        }

        let chosen = self.choose(&counts);
        log::info!(
            "Auto selected {} strategy after probing {} page(s) ({})",
            chosen,
            pages,
            counts
                .iter()
                .map(|(k, n)| format!("{}={}", k, n))
                .collect::<Vec<_>>()
                .join(", ")
        );
        ProbeReport {
            pages,
            counts,
            chosen,
        }
    }

    fn choose(&self, counts: &[(StrategyKind, usize)]) -> StrategyKind {
        if self.policy == ProbePolicy::TablePreferred
            && counts.iter().any(|&(k, n)| k == StrategyKind::Table && n > 0)
        {
            return StrategyKind::Table;
        }
        // First maximum in precedence order
        counts
            .iter()
            .fold(None, |best: Option<(StrategyKind, usize)>, &(k, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((k, n)),
            })
            .filter(|&(_, n)| n > 0)
            .map_or(StrategyKind::Regex, |(k, _)| k)
    }
}
