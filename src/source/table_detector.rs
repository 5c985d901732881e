//! Table detection from text positions (stream mode).
//!
//! Tables are found from alignment alone: spans sharing a baseline form a
//! row, X positions that recur across rows form column edges, and runs of
//! rows that sit on those edges form a table region. No ruling lines are
//! needed, which matches how most record listings are typeset.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::model::TableGrid;

use super::spans::TextSpan;

/// A detected table region.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Column left edges, ascending
    pub columns: Vec<f32>,
    /// Right edge of the widest span in the region
    pub right_x: f32,
    /// Rows of spans, top to bottom
    pub rows: Vec<SpanRow>,
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct SpanRow {
    /// Mean baseline of the row
    pub y: f32,
    /// Spans sorted by X
    pub spans: Vec<TextSpan>,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of consecutive aligned rows
    pub min_rows: usize,
    /// Minimum number of columns
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Baseline tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum share of a row's spans that must sit on column edges
    pub min_alignment_ratio: f32,
    /// Minimum distance between two column edges (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 12,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.5,
            min_column_gap: 15.0,
        }
    }
}

/// Edge positions are bucketed to this many points.
const EDGE_BUCKET: f32 = 5.0;

/// A span counts as aligned within this distance of an edge.
const ALIGN_TOLERANCE: f32 = 5.0;

/// Detects tables in the spans of one page.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect table regions, top to bottom.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        let cfg = &self.config;
        if spans.len() < cfg.min_rows * cfg.min_columns {
            return vec![];
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < cfg.min_rows {
            return vec![];
        }

        let page_columns = self.detect_columns(&rows);
        log::debug!(
            "TableDetector: {} rows, page-level column edges {:?}",
            rows.len(),
            page_columns
        );
        if page_columns.len() < cfg.min_columns {
            return vec![];
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_regions(&rows, &page_columns) {
            let region = rows[start..=end].to_vec();
            let columns = self.detect_columns(&region);

            if columns.len() < cfg.min_columns {
                continue;
            }
            if columns.len() > cfg.max_columns {
                log::debug!(
                    "TableDetector: skipping region, too many columns ({} > {})",
                    columns.len(),
                    cfg.max_columns
                );
                continue;
            }
            if is_list_pattern(&region, columns.len()) {
                log::debug!("TableDetector: skipping region, looks like a list");
                continue;
            }

            let right_x = region
                .iter()
                .flat_map(|r| r.spans.iter())
                .map(TextSpan::right)
                .fold(f32::MIN, f32::max);

            tables.push(DetectedTable {
                columns,
                right_x,
                rows: region,
            });
        }
        tables
    }

    /// Detect tables and convert each to a cell grid.
    pub fn detect_grids(&self, spans: &[TextSpan]) -> Vec<TableGrid> {
        self.detect(spans).iter().map(|t| self.to_grid(t)).collect()
    }

    /// Assign each span of a region to one column and join cell text.
    pub fn to_grid(&self, table: &DetectedTable) -> TableGrid {
        table
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Vec<&str>> = vec![Vec::new(); table.columns.len()];
                for span in &row.spans {
                    let col = column_for(span.x, &table.columns);
                    cells[col].push(span.text.trim());
                }
                cells.into_iter().map(|parts| parts.join(" ")).collect()
            })
            .collect()
    }

    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<SpanRow> {
        let mut sorted = spans.to_vec();
        // Top of page first, then left to right
        sorted.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });

        let mut rows: Vec<SpanRow> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut anchor_y: Option<f32> = None;

        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            match anchor_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(finish_row(std::mem::take(&mut current)));
                    }
                    anchor_y = Some(span.y);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            rows.push(finish_row(current));
        }
        rows
    }

    /// Left edges that recur in enough rows, merged when closer than the gap.
    fn detect_columns(&self, rows: &[SpanRow]) -> Vec<f32> {
        let multi: Vec<&SpanRow> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        let basis: Vec<&SpanRow> = if multi.len() >= self.config.min_rows {
            multi
        } else {
            rows.iter().collect()
        };
        if basis.is_empty() {
            return vec![];
        }

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &basis {
            let buckets: HashSet<i32> = row
                .spans
                .iter()
                .map(|s| (s.x / EDGE_BUCKET).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((basis.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<i32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket)
            .collect();
        edges.sort_unstable();

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges.into_iter().map(|b| b as f32 * EDGE_BUCKET) {
            match merged.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Inclusive row ranges whose spans sit on the column edges.
    fn find_regions(&self, rows: &[SpanRow], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            let aligned = alignment_score(row, columns) >= self.config.min_alignment_ratio
                && row.spans.len() >= self.config.min_columns;
            match (aligned, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    if i - s >= self.config.min_rows {
                        regions.push((s, i - 1));
                    }
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }
        regions
    }
}

fn finish_row(mut spans: Vec<TextSpan>) -> SpanRow {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    SpanRow { y, spans }
}

fn alignment_score(row: &SpanRow, columns: &[f32]) -> f32 {
    if row.spans.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|s| columns.iter().any(|c| (s.x - c).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// The last column whose edge is at or left of `x` (with tolerance).
fn column_for(x: f32, columns: &[f32]) -> usize {
    columns
        .iter()
        .rposition(|&edge| x >= edge - ALIGN_TOLERANCE)
        .unwrap_or(0)
}

/// Bullet lists typeset as "marker + text" look like a two-column table.
///
/// Bare numbers are not markers here: a leading numeric column is the usual
/// record identifier.
fn is_list_pattern(rows: &[SpanRow], column_count: usize) -> bool {
    let markers = rows
        .iter()
        .filter_map(|r| r.spans.first())
        .filter(|s| is_bullet_marker(&s.text) || is_enumeration_marker(&s.text))
        .count();
    column_count == 2 && markers * 2 >= rows.len()
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "\u{2013}" | "\u{2014}" | "\u{2022}" | "\u{00B7}" | "*" | "\u{25CB}" | "\u{25AA}" | "\u{25A0}" | "\u{25CF}" | "\u{25B6}" | "\u{27A4}"
    )
}

/// "1.", "12)", "a." style enumeration markers.
fn is_enumeration_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let Some(body) = cleaned
        .strip_suffix('.')
        .or_else(|| cleaned.strip_suffix(')'))
    else {
        return false;
    };
    !body.is_empty()
        && (body.chars().all(|c| c.is_ascii_digit())
            || (body.chars().count() == 1 && body.chars().all(char::is_alphabetic)))
}
