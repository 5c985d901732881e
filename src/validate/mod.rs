//! Record validation.
//!
//! The rules a run uses are fixed when the [`RecordValidator`] is built:
//! a caller-supplied [`RuleSet`] if there is one, the canonical rules for a
//! schema of canonical shape (three numbered columns, or `ID, Gender, Age`),
//! or a structural non-empty check otherwise. Any [`Validator`]
//! implementation can stand in for the rule-based one.

mod rules;

pub use rules::{
    FieldKey, FieldRule, RuleSet, CANONICAL_COLUMNS, DEFAULT_CATEGORIES, DEFAULT_MAX, DEFAULT_MIN,
};

use crate::error::Result;
use crate::model::DataRecord;
use crate::schema::ColumnSchema;

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Every rule passed
    Valid,
    /// The first failing field
    Invalid { field: usize, reason: String },
}

impl Validation {
    /// Whether the record passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

/// Decides whether an aligned record is accepted.
pub trait Validator {
    fn validate(&self, record: &DataRecord) -> Validation;
}

/// Validation configuration.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// When false every aligned record is valid
    pub enabled: bool,
    /// Category codes of the canonical rule set
    pub categories: Vec<String>,
    /// Inclusive lower bound of the canonical numeric field
    pub min: i64,
    /// Inclusive upper bound of the canonical numeric field
    pub max: i64,
    /// Caller rules replacing the defaults
    pub rules: Option<RuleSet>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            rules: None,
        }
    }
}

impl ValidationConfig {
    /// Create a config with the default rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept every aligned record.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the category codes.
    pub fn with_categories<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.categories = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the numeric bounds.
    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Use caller rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }
}

/// Rule-based [`Validator`].
#[derive(Debug, Clone)]
pub struct RecordValidator {
    rules: Vec<(usize, FieldRule)>,
    enabled: bool,
}

impl RecordValidator {
    /// Pick and resolve the rules for `schema`.
    pub fn for_schema(schema: &ColumnSchema, config: &ValidationConfig) -> Result<Self> {
        let set = match &config.rules {
            Some(rules) => rules.clone(),
            None if is_canonical_shape(schema) => {
                RuleSet::canonical(config.categories.iter().cloned(), config.min, config.max)
            }
            None => RuleSet::structural(schema.len()),
        };
        log::debug!(
            "Validator: {} rule(s){}",
            set.len(),
            if config.enabled { "" } else { " (disabled)" }
        );
        Ok(Self {
            rules: set.resolve(schema)?,
            enabled: config.enabled,
        })
    }

    /// A validator that accepts everything.
    pub fn accept_all() -> Self {
        Self {
            rules: Vec::new(),
            enabled: false,
        }
    }
}

/// Three columns that are either numbered or named like [`CANONICAL_COLUMNS`].
fn is_canonical_shape(schema: &ColumnSchema) -> bool {
    schema.len() == CANONICAL_COLUMNS.len()
        && (schema.is_numbered()
            || schema
                .columns()
                .iter()
                .zip(CANONICAL_COLUMNS)
                .all(|(name, canonical)| name.trim().eq_ignore_ascii_case(canonical)))
}

impl Validator for RecordValidator {
    fn validate(&self, record: &DataRecord) -> Validation {
        if !self.enabled {
            return Validation::Valid;
        }
        for (field, rule) in &self.rules {
            let value = record.field(*field).unwrap_or("");
            if let Err(reason) = rule.check(value) {
                return Validation::Invalid {
                    field: *field,
                    reason,
                };
            }
        }
        Validation::Valid
    }
}
