//! Conversion options.

use crate::extract::{ExtractionMethod, GroupUnit, ProbePolicy, DEFAULT_PROBE_PAGES};
use crate::schema::{LengthPolicy, SchemaConfig};
use crate::source::SourceOptions;
use crate::validate::{RuleSet, ValidationConfig};

/// Default number of rows between progress notifications within a page.
pub const DEFAULT_PROGRESS_EVERY_ROWS: usize = 1000;

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Extraction strategy, or Auto
    pub method: ExtractionMethod,

    /// Column names, count and resolution mode
    pub schema: SchemaConfig,

    /// Validation rules
    pub validation: ValidationConfig,

    /// Report every rejected row at warn level instead of debug
    pub verbose: bool,

    /// Handling of rows with more tokens than columns
    pub length_policy: LengthPolicy,

    /// Pages probed by Auto
    pub probe_pages: usize,

    /// How Auto turns probe counts into a choice
    pub probe_policy: ProbePolicy,

    /// Regex patterns tried in order (empty = defaults for the schema)
    pub patterns: Vec<String>,

    /// Units per structured record (None = column count)
    pub group_size: Option<usize>,

    /// What a structured record is grouped from
    pub group_unit: GroupUnit,

    /// Password for encrypted documents
    pub password: Option<String>,

    /// Whether to detect tables on each page
    pub detect_tables: bool,

    /// Rows between progress notifications within a page (0 = per page only)
    pub progress_every_rows: usize,

    /// Stop after this many pages (None = whole document)
    pub max_pages: Option<usize>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            method: ExtractionMethod::Auto,
            schema: SchemaConfig::default(),
            validation: ValidationConfig::default(),
            verbose: false,
            length_policy: LengthPolicy::Truncate,
            probe_pages: DEFAULT_PROBE_PAGES,
            probe_policy: ProbePolicy::TablePreferred,
            patterns: Vec::new(),
            group_size: None,
            group_unit: GroupUnit::Lines,
            password: None,
            detect_tables: true,
            progress_every_rows: DEFAULT_PROGRESS_EVERY_ROWS,
            max_pages: None,
        }
    }
}

impl ConvertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extraction method.
    pub fn with_method(mut self, method: ExtractionMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the schema configuration.
    pub fn with_schema(mut self, schema: SchemaConfig) -> Self {
        self.schema = schema;
        self
    }

    /// Use explicit column names.
    pub fn with_columns<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.schema = self.schema.with_names(names);
        self
    }

    /// Use an explicit column count.
    pub fn with_column_count(mut self, count: usize) -> Self {
        self.schema = self.schema.with_count(count);
        self
    }

    /// Ask for column names through the prompt.
    pub fn interactive(mut self) -> Self {
        self.schema = self.schema.interactive();
        self
    }

    /// Set the validation configuration.
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Accept every aligned row.
    pub fn without_validation(mut self) -> Self {
        self.validation.enabled = false;
        self
    }

    /// Set the category codes of the canonical rules.
    pub fn with_categories<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.validation = self.validation.with_categories(codes);
        self
    }

    /// Set the numeric bounds of the canonical rules.
    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.validation = self.validation.with_bounds(min, max);
        self
    }

    /// Replace the default rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.validation = self.validation.with_rules(rules);
        self
    }

    /// Report rejected rows at warn level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the length policy.
    pub fn with_length_policy(mut self, policy: LengthPolicy) -> Self {
        self.length_policy = policy;
        self
    }

    /// Configure Auto probing.
    pub fn with_probe(mut self, pages: usize, policy: ProbePolicy) -> Self {
        self.probe_pages = pages;
        self.probe_policy = policy;
        self
    }

    /// Append a regex pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Set structured grouping.
    pub fn with_grouping(mut self, size: Option<usize>, unit: GroupUnit) -> Self {
        self.group_size = size;
        self.group_unit = unit;
        self
    }

    /// Set the document password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Enable or disable table detection.
    pub fn with_tables(mut self, detect: bool) -> Self {
        self.detect_tables = detect;
        self
    }

    /// Set the in-page progress cadence.
    pub fn with_progress_every(mut self, rows: usize) -> Self {
        self.progress_every_rows = rows;
        self
    }

    /// Limit the number of pages processed.
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }

    /// Options for opening the page source.
    pub fn source_options(&self) -> SourceOptions {
        let mut options = SourceOptions::new().with_tables(self.detect_tables);
        options.password = self.password.clone();
        options.max_pages = self.max_pages;
        options
    }
}
