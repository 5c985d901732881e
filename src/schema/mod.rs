//! Column schema resolution and row alignment.
//!
//! A [`ColumnSchema`] is fixed before the first page is extracted and shared
//! read-only for the rest of the run. It comes from one of three places,
//! picked by [`SchemaConfig::mode`]:
//!
//! - **Explicit**: names and/or a count from configuration.
//! - **Interactive**: the column count is inferred from a sample, then each
//!   column is named through a [`ColumnPrompt`].
//! - **Inferred**: the same sample, with `Column_1..Column_N` names.

mod infer;
mod prompt;

pub use infer::{infer_column_count, sample_page_rows, sample_rows, token_shape, TokenShape};
pub use prompt::{ColumnPrompt, ScriptedPrompt};

use crate::error::{Error, Result};
use crate::model::{DataRecord, RawRow, RejectReason};
use crate::source::PageTextSource;

/// Default number of candidate rows sampled for inference.
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Default number of pages the sampler may read.
pub const DEFAULT_SAMPLE_PAGES: usize = 3;

/// How many times the names may be re-entered before the prompt gives up.
const MAX_NAMING_ROUNDS: usize = 5;

/// The ordered columns of the output CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

impl ColumnSchema {
    /// Create a schema from names. Fails on an empty list.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(Error::Schema("a schema needs at least one column".into()));
        }
        Ok(Self { columns })
    }

    /// `Column_1..Column_N`. A count of zero gives one column.
    pub fn numbered(count: usize) -> Self {
        Self {
            columns: (0..count.max(1)).map(default_column_name).collect(),
        }
    }

    /// Build a schema from explicit configuration.
    ///
    /// Names alone fix the count; a count alone gets numbered names; both
    /// must agree.
    pub fn explicit(names: Option<&[String]>, count: Option<usize>) -> Result<Self> {
        match (names, count) {
            (_, Some(0)) => Err(Error::Schema("column count must be at least 1".into())),
            (Some(names), Some(count)) if names.len() != count => Err(Error::Schema(format!(
                "{} column names given but column count is {}",
                names.len(),
                count
            ))),
            (Some(names), _) => Self::new(names.iter().cloned()),
            (None, Some(count)) => Ok(Self::numbered(count)),
            (None, None) => Err(Error::Schema(
                "explicit schema needs column names or a column count".into(),
            )),
        }
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether the names are the default `Column_1..Column_N`.
    pub fn is_numbered(&self) -> bool {
        self.columns
            .iter()
            .enumerate()
            .all(|(i, name)| *name == default_column_name(i))
    }

    /// Position of the first column with this name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Reconcile a raw row with the column count.
    ///
    /// Short rows are always rejected; long rows follow `policy`.
    pub fn align(
        &self,
        row: &RawRow,
        policy: LengthPolicy,
    ) -> std::result::Result<DataRecord, RejectReason> {
        let expected = self.len();
        let found = row.len();

        if found < expected {
            return Err(RejectReason::TooFewTokens { expected, found });
        }
        if found > expected && policy == LengthPolicy::Reject {
            return Err(RejectReason::TooManyTokens { expected, found });
        }

        let values = row.tokens[..expected]
            .iter()
            .map(|t| t.trim().to_string())
            .collect();
        Ok(DataRecord::new(values, row.page, row.line))
    }
}

/// Default name for column `index` (0-based).
pub fn default_column_name(index: usize) -> String {
    format!("Column_{}", index + 1)
}

/// What to do with rows that have more tokens than columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    /// Keep the leading fields and drop the extras
    #[default]
    Truncate,
    /// Reject the row
    Reject,
}

/// Schema resolution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaMode {
    /// Names and/or count from configuration
    Explicit,
    /// Inferred count, names from the prompt
    Interactive,
    /// Inferred count, numbered names
    Inferred,
}

/// Column configuration.
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    /// Explicit column names, in order
    pub names: Option<Vec<String>>,
    /// Explicit column count
    pub count: Option<usize>,
    /// Ask for column names
    pub interactive: bool,
    /// Candidate rows sampled for inference
    pub sample_size: usize,
    /// Maximum pages the sampler reads
    pub sample_pages: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            names: None,
            count: None,
            interactive: false,
            sample_size: DEFAULT_SAMPLE_SIZE,
            sample_pages: DEFAULT_SAMPLE_PAGES,
        }
    }
}

impl SchemaConfig {
    /// Create a config that infers everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set explicit column names.
    pub fn with_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Set the column count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Enable interactive naming.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Set the inference sample size.
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// The resolution mode this configuration selects.
    ///
    /// Explicit names take precedence over interactive naming. A count
    /// alone with interactive naming asks names for that many columns.
    pub fn mode(&self) -> SchemaMode {
        match (&self.names, self.count, self.interactive) {
            (Some(_), _, _) => SchemaMode::Explicit,
            (None, _, true) => SchemaMode::Interactive,
            (None, Some(_), false) => SchemaMode::Explicit,
            (None, None, false) => SchemaMode::Inferred,
        }
    }

    /// Resolve the schema, sampling `source` when the count must be inferred.
    pub fn resolve(
        &self,
        source: &PageTextSource,
        prompt: Option<&mut dyn ColumnPrompt>,
    ) -> Result<ColumnSchema> {
        let mode = self.mode();
        log::debug!("Resolving schema ({:?})", mode);

        match mode {
            SchemaMode::Explicit => ColumnSchema::explicit(self.names.as_deref(), self.count),
            SchemaMode::Inferred => Ok(ColumnSchema::numbered(self.infer_count(source))),
            SchemaMode::Interactive => {
                let prompt = prompt.ok_or_else(|| {
                    Error::Prompt("interactive naming requested without a prompt".into())
                })?;
                let detected = match self.count {
                    Some(0) => {
                        return Err(Error::Schema("column count must be at least 1".into()))
                    }
                    Some(count) => count,
                    None => self.infer_count(source),
                };
                let count = prompt.confirm_column_count(detected)?;
                if count == 0 {
                    return Err(Error::Schema("column count must be at least 1".into()));
                }
                ColumnSchema::new(ask_names(prompt, count)?)
            }
        }
    }

    fn infer_count(&self, source: &PageTextSource) -> usize {
        let sample = sample_rows(source, self.sample_size, self.sample_pages);
        let count = infer_column_count(&sample);
        log::info!(
            "Detected {} column(s) from {} sampled row(s)",
            count,
            sample.len()
        );
        count
    }
}

/// Ask one name per column, in ascending order, until the prompt confirms.
fn ask_names(prompt: &mut dyn ColumnPrompt, count: usize) -> Result<Vec<String>> {
    for _ in 0..MAX_NAMING_ROUNDS {
        let mut names = Vec::with_capacity(count);
        for index in 0..count {
            let answer = prompt.ask_column_name(index)?;
            let answer = answer.trim();
            names.push(if answer.is_empty() {
                default_column_name(index)
            } else {
                answer.to_string()
            });
        }
        if prompt.confirm_columns(&names)? {
            return Ok(names);
        }
    }
    Err(Error::Prompt(format!(
        "column names not confirmed after {} rounds",
        MAX_NAMING_ROUNDS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryBackend;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn record_source() -> PageTextSource {
        PageTextSource::from_backend(MemoryBackend::from_texts([
            "218915949830 F 21\n218919256808 M 26\n218910000001 F 30",
        ]))
    }

    #[test]
    fn test_explicit_names_only() {
        let schema = ColumnSchema::explicit(Some(&names(&["ID", "Gender", "Age"])), None).unwrap();
        assert_eq!(schema.columns(), &names(&["ID", "Gender", "Age"])[..]);
    }

    #[test]
    fn test_explicit_count_only() {
        let schema = ColumnSchema::explicit(None, Some(2)).unwrap();
        assert_eq!(schema.columns(), &names(&["Column_1", "Column_2"])[..]);
    }

    #[test]
    fn test_explicit_disagreement_is_schema_error() {
        let err = ColumnSchema::explicit(Some(&names(&["A", "B"])), Some(3)).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_explicit_zero_count_is_schema_error() {
        assert!(matches!(
            ColumnSchema::explicit(None, Some(0)),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_is_numbered() {
        assert!(ColumnSchema::numbered(3).is_numbered());
        assert!(!ColumnSchema::new(["ID", "Gender", "Age"]).unwrap().is_numbered());
        assert!(!ColumnSchema::new(["Column_2", "Column_1"]).unwrap().is_numbered());
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let schema = ColumnSchema::new(["x", "x"]).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.index_of("x"), Some(0));
    }

    #[test]
    fn test_align_exact() {
        let schema = ColumnSchema::numbered(3);
        let row = RawRow::from_strs(&["1", "M", "20"], 0, 1);
        let record = schema.align(&row, LengthPolicy::Truncate).unwrap();
        assert_eq!(record.values, names(&["1", "M", "20"]));
    }

    #[test]
    fn test_align_long_row_truncate() {
        let schema = ColumnSchema::numbered(3);
        let row = RawRow::from_strs(&["1", "M", "20", "extra", "text"], 0, 1);
        let record = schema.align(&row, LengthPolicy::Truncate).unwrap();
        assert_eq!(record.values, names(&["1", "M", "20"]));
    }

    #[test]
    fn test_align_long_row_reject() {
        let schema = ColumnSchema::numbered(3);
        let row = RawRow::from_strs(&["1", "M", "20", "extra"], 0, 1);
        assert_eq!(
            schema.align(&row, LengthPolicy::Reject),
            Err(RejectReason::TooManyTokens {
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn test_align_short_row_rejected_under_both_policies() {
        let schema = ColumnSchema::numbered(3);
        let row = RawRow::from_strs(&["1", "M"], 0, 1);
        for policy in [LengthPolicy::Truncate, LengthPolicy::Reject] {
            assert!(matches!(
                schema.align(&row, policy),
                Err(RejectReason::TooFewTokens { .. })
            ));
        }
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(SchemaConfig::new().mode(), SchemaMode::Inferred);
        assert_eq!(SchemaConfig::new().with_count(3).mode(), SchemaMode::Explicit);
        assert_eq!(SchemaConfig::new().interactive().mode(), SchemaMode::Interactive);
        assert_eq!(
            SchemaConfig::new().interactive().with_names(["a"]).mode(),
            SchemaMode::Explicit
        );
    }

    #[test]
    fn test_resolve_inferred() {
        let schema = SchemaConfig::new().resolve(&record_source(), None).unwrap();
        assert_eq!(schema, ColumnSchema::numbered(3));
    }

    #[test]
    fn test_resolve_inferred_empty_document_gives_one_column() {
        let source = PageTextSource::from_backend(MemoryBackend::from_texts([""]));
        let schema = SchemaConfig::new().resolve(&source, None).unwrap();
        assert_eq!(schema.columns(), &names(&["Column_1"])[..]);
    }

    #[test]
    fn test_resolve_interactive_keeps_ask_order() {
        let mut prompt = ScriptedPrompt::new(["ID", "Gender", "Age"]);
        let schema = SchemaConfig::new()
            .interactive()
            .resolve(&record_source(), Some(&mut prompt))
            .unwrap();
        assert_eq!(schema.columns(), &names(&["ID", "Gender", "Age"])[..]);
        assert_eq!(prompt.asked(), &[0, 1, 2]);
    }

    #[test]
    fn test_resolve_interactive_blank_answer_defaults() {
        let mut prompt = ScriptedPrompt::new(["ID", "", "Age"]);
        let schema = SchemaConfig::new()
            .interactive()
            .resolve(&record_source(), Some(&mut prompt))
            .unwrap();
        assert_eq!(schema.columns(), &names(&["ID", "Column_2", "Age"])[..]);
    }

    #[test]
    fn test_resolve_interactive_without_prompt_fails() {
        let err = SchemaConfig::new()
            .interactive()
            .resolve(&record_source(), None)
            .unwrap_err();
        assert!(matches!(err, Error::Prompt(_)));
    }

    #[test]
    fn test_resolve_interactive_uses_configured_count() {
        let mut prompt = ScriptedPrompt::new(["a", "b"]);
        let schema = SchemaConfig::new()
            .interactive()
            .with_count(2)
            .resolve(&record_source(), Some(&mut prompt))
            .unwrap();
        assert_eq!(schema.len(), 2);
    }
}
