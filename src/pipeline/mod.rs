//! The conversion run.
//!
//! [`ConversionPipeline::run`] resolves the schema, picks the strategy,
//! writes the header and then streams pages through
//! extract → align → validate → sink. Per-row problems are counted, never
//! raised; only document, schema, configuration and sink failures end the
//! run with an error.

mod options;
mod progress;

pub use options::{ConvertOptions, DEFAULT_PROGRESS_EVERY_ROWS};
pub use progress::{LogProgress, NoProgress, ProgressObserver};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::Level;
use serde::Serialize;

use crate::error::Result;
use crate::extract::{
    AutoSelector, PageRows, ProbeReport, RegexExtractor, StrategySet, StructuredExtractor,
    TableExtractor,
};
use crate::model::{ConversionResult, RowOutcome};
use crate::schema::{ColumnPrompt, ColumnSchema, SchemaMode};
use crate::sink::RecordSink;
use crate::source::PageTextSource;
use crate::validate::{RecordValidator, Validation, Validator};

/// Lifecycle of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started
    Idle,
    /// Resolving the column schema
    SchemaResolving,
    /// Streaming pages
    Extracting,
    /// Run completed (possibly cancelled)
    Finished,
    /// Run aborted with an error
    Failed,
}

/// Shared cancellation flag, checked at every page boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Orchestrates one conversion.
pub struct ConversionPipeline<'a> {
    options: ConvertOptions,
    prompt: Option<&'a mut dyn ColumnPrompt>,
    observer: Option<&'a mut dyn ProgressObserver>,
    validator: Option<Box<dyn Validator + 'a>>,
    cancel: CancelToken,
    state: PipelineState,
    schema: Option<ColumnSchema>,
}

impl<'a> ConversionPipeline<'a> {
    /// Create an idle pipeline.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            prompt: None,
            observer: None,
            validator: None,
            cancel: CancelToken::new(),
            state: PipelineState::Idle,
            schema: None,
        }
    }

    /// Prompt used for interactive column naming.
    pub fn with_prompt(mut self, prompt: &'a mut dyn ColumnPrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Observer notified of progress.
    pub fn with_observer(mut self, observer: &'a mut dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace the rule-based validator.
    pub fn with_validator(mut self, validator: impl Validator + 'a) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Use a cancellation token shared with another thread.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this pipeline.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Options of this pipeline.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The schema resolved by the last run.
    pub fn schema(&self) -> Option<&ColumnSchema> {
        self.schema.as_ref()
    }

    /// Run the conversion. The source is consumed and the document released
    /// when the run ends, whatever the outcome.
    pub fn run(
        &mut self,
        source: PageTextSource,
        sink: &mut dyn RecordSink,
    ) -> Result<ConversionResult> {
        match self.execute(&source, sink) {
            Ok(result) => {
                self.state = PipelineState::Finished;
                Ok(result)
            }
            Err(e) => {
                log::debug!("Conversion failed: {}", e);
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        source: &PageTextSource,
        sink: &mut dyn RecordSink,
    ) -> Result<ConversionResult> {
        self.state = PipelineState::SchemaResolving;
        let prompt = self
            .prompt
            .as_mut()
            .map(|p| &mut **p as &mut dyn ColumnPrompt);
        let schema = self.options.schema.resolve(source, prompt)?;
        log::info!("Columns: {}", schema.columns().join(", "));

        let set = build_strategies(&self.options, schema.len())?;
        let kind = match self.options.method.fixed() {
            Some(kind) => kind,
            None => {
                AutoSelector::new(self.options.probe_pages, self.options.probe_policy)
                    .select(source, &set)
                    .chosen
            }
        };
        let strategy = set.get(kind);

        let built;
        let validator: &dyn Validator = if !self.options.validation.enabled {
            built = RecordValidator::accept_all();
            &built
        } else if let Some(custom) = &self.validator {
            custom.as_ref()
        } else {
            built = RecordValidator::for_schema(&schema, &self.options.validation)?;
            &built
        };

        self.state = PipelineState::Extracting;
        sink.write_header(schema.columns())?;

        let options = &self.options;
        let mut observer = self.observer.as_deref_mut();
        let level = if options.verbose { Level::Warn } else { Level::Debug };
        let total_pages = source.page_count();
        let mut result = ConversionResult::new();
        result.strategy = Some(kind);

        if let Some(obs) = observer.as_deref_mut() {
            obs.on_start(total_pages);
        }

        let mut since_progress = 0usize;
        for index in 0..total_pages {
            if self.cancel.is_cancelled() {
                log::info!("Cancelled before page {}", index + 1);
                result.cancelled = true;
                break;
            }

            let page = match source.page(index) {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Skipping page {}: {}", index + 1, e);
                    result.page_errors += 1;
                    if let Some(obs) = observer.as_deref_mut() {
                        obs.on_page(index, total_pages, result.total_records, result.valid_records);
                    }
                    continue;
                }
            };

            let rows = strategy.extract(&page).unwrap_or_else(|e| {
                log::warn!("{} extraction failed on page {}: {}", kind, index + 1, e);
                result.page_errors += 1;
                PageRows::default()
            });
            result.skipped_lines += rows.skipped;

            for row in &rows.rows {
                let outcome = match schema.align(row, options.length_policy) {
                    Err(reason) => RowOutcome::Rejected(reason),
                    Ok(mut record) => {
                        match validator.validate(&record) {
                            Validation::Valid => {
                                record.valid = true;
                                sink.write_row(&record.values)?;
                                RowOutcome::Accepted
                            }
                            Validation::Invalid { field, reason } => {
                                RowOutcome::ValidationFailed { field, reason }
                            }
                        }
                    }
                };

                match &outcome {
                    RowOutcome::Accepted => {}
                    RowOutcome::Rejected(reason) => log::log!(
                        level,
                        "Page {} line {}: rejected row {:?}: {}",
                        row.page + 1,
                        row.line,
                        row.tokens,
                        reason
                    ),
                    RowOutcome::ValidationFailed { field, reason } => log::log!(
                        level,
                        "Page {} line {}: invalid {}: {}",
                        row.page + 1,
                        row.line,
                        schema.columns().get(*field).map_or("?", String::as_str),
                        reason
                    ),
                }
                result.record(&outcome);

                since_progress += 1;
                if options.progress_every_rows > 0 && since_progress >= options.progress_every_rows {
                    since_progress = 0;
                    if let Some(obs) = observer.as_deref_mut() {
                        obs.on_page(index, total_pages, result.total_records, result.valid_records);
                    }
                }
            }

            result.pages_processed += 1;
            if let Some(obs) = observer.as_deref_mut() {
                obs.on_page(index, total_pages, result.total_records, result.valid_records);
            }
        }

        sink.finish()?;
        log::info!(
            "{} strategy: {} of {} row(s) valid, {} rejected, {} invalid",
            kind,
            result.valid_records,
            result.total_records,
            result.rejected_records,
            result.invalid_records
        );
        if let Some(obs) = observer {
            obs.on_finish(&result);
        }

        self.schema = Some(schema);
        Ok(result)
    }
}

/// The strategies a run chooses from, configured for `columns` columns.
pub fn build_strategies(options: &ConvertOptions, columns: usize) -> Result<StrategySet> {
    Ok(StrategySet {
        structured: StructuredExtractor::new(options.group_size.unwrap_or(columns))
            .with_unit(options.group_unit),
        regex: RegexExtractor::for_schema(&options.patterns, columns)?,
        table: TableExtractor::new(),
    })
}

/// What a document looks like to the engine, without converting it.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    /// Pages in the document (after any page limit)
    pub pages: usize,
    /// Detected tables per page
    pub tables_per_page: Vec<usize>,
    /// Column count from configuration, or inferred
    pub columns: usize,
    /// What Auto would pick
    pub probe: ProbeReport,
}

/// Inspect a document: table counts, column count and the Auto choice.
///
/// Interactive naming is never triggered; an interactive configuration is
/// inspected as if it were inferred.
pub fn inspect(source: &PageTextSource, options: &ConvertOptions) -> Result<Inspection> {
    let mut schema_config = options.schema.clone();
    if schema_config.mode() == SchemaMode::Interactive {
        schema_config.interactive = false;
    }
    let schema = schema_config.resolve(source, None)?;

    let tables_per_page = source
        .pages()
        .map(|page| match page {
            Ok(page) => page.tables.map_or(0, |t| t.iter().filter(|g| !g.is_empty()).count()),
            Err(e) => {
                log::warn!("Skipping page: {}", e);
                0
            }
        })
        .collect();

    let set = build_strategies(options, schema.len())?;
    let probe = AutoSelector::new(options.probe_pages, options.probe_policy).select(source, &set);

    Ok(Inspection {
        pages: source.page_count(),
        tables_per_page,
        columns: schema.len(),
        probe,
    })
}
