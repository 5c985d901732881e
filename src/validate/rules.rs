//! Per-field rules.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Error, Result};
use crate::schema::ColumnSchema;

/// Column names of the canonical shape, compared case-insensitively.
pub const CANONICAL_COLUMNS: [&str; 3] = ["ID", "Gender", "Age"];
/// Default category codes of the canonical rule set.
pub const DEFAULT_CATEGORIES: [&str; 2] = ["M", "F"];
/// Default inclusive lower bound of the canonical numeric field.
pub const DEFAULT_MIN: i64 = 0;
/// Default inclusive upper bound of the canonical numeric field.
pub const DEFAULT_MAX: i64 = 120;

/// Which field a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    /// 0-based column position
    Index(usize),
    /// Column name, resolved against the schema when the validator is built
    Name(String),
}

impl From<usize> for FieldKey {
    fn from(index: usize) -> Self {
        FieldKey::Index(index)
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        FieldKey::Name(name.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        FieldKey::Name(name)
    }
}

type CustomCheck = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A check on one field value.
#[derive(Clone)]
pub enum FieldRule {
    /// Non-empty ASCII decimal digits
    Digits,
    /// One of the listed codes, compared case-insensitively
    OneOf(Vec<String>),
    /// Integer within inclusive bounds
    IntRange { min: i64, max: i64 },
    /// Matches the regular expression
    Pattern(Regex),
    /// Not empty after trimming
    NonEmpty,
    /// Caller-supplied predicate with a label used in failure reasons
    Custom(String, CustomCheck),
}

impl FieldRule {
    /// Build a one-of rule.
    pub fn one_of<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        FieldRule::OneOf(codes.into_iter().map(Into::into).collect())
    }

    /// Compile a pattern rule.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(FieldRule::Pattern(Regex::new(pattern)?))
    }

    /// Wrap a predicate.
    pub fn custom<F>(label: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        FieldRule::Custom(label.into(), Arc::new(check))
    }

    /// Check a value; the error is a human-readable reason.
    pub fn check(&self, value: &str) -> std::result::Result<(), String> {
        let ok = match self {
            FieldRule::Digits => !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()),
            FieldRule::OneOf(codes) => codes.iter().any(|c| c.eq_ignore_ascii_case(value)),
            FieldRule::IntRange { min, max } => match value.parse::<i64>() {
                Ok(n) => (*min..=*max).contains(&n),
                Err(_) => false,
            },
            FieldRule::Pattern(re) => re.is_match(value),
            FieldRule::NonEmpty => !value.trim().is_empty(),
            FieldRule::Custom(_, check) => check(value),
        };
        if ok {
            Ok(())
        } else {
            Err(format!("{:?} is not {}", value, self))
        }
    }
}

impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Digits => write!(f, "all digits"),
            FieldRule::OneOf(codes) => write!(f, "one of {}", codes.join("/")),
            FieldRule::IntRange { min, max } => write!(f, "an integer in {}..={}", min, max),
            FieldRule::Pattern(re) => write!(f, "matching /{}/", re.as_str()),
            FieldRule::NonEmpty => write!(f, "non-empty"),
            FieldRule::Custom(label, _) => write!(f, "{}", label),
        }
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Custom(label, _) => f.debug_tuple("Custom").field(label).finish(),
            other => write!(f, "FieldRule({})", other),
        }
    }
}

/// An ordered list of keyed field rules.
///
/// Rules run in insertion order and a field may carry several.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(FieldKey, FieldRule)>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule.
    pub fn rule(mut self, key: impl Into<FieldKey>, rule: FieldRule) -> Self {
        self.rules.push((key.into(), rule));
        self
    }

    /// ID digits, category code, bounded integer.
    pub fn canonical<S: Into<String>>(
        categories: impl IntoIterator<Item = S>,
        min: i64,
        max: i64,
    ) -> Self {
        Self::new()
            .rule(0, FieldRule::Digits)
            .rule(1, FieldRule::one_of(categories))
            .rule(2, FieldRule::IntRange { min, max })
    }

    /// Every one of `columns` fields non-empty.
    pub fn structural(columns: usize) -> Self {
        (0..columns).fold(Self::new(), |set, i| set.rule(i, FieldRule::NonEmpty))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve keys to positions in `schema`.
    ///
    /// Unknown names and out-of-range indices are schema errors.
    pub(crate) fn resolve(&self, schema: &ColumnSchema) -> Result<Vec<(usize, FieldRule)>> {
        self.rules
            .iter()
            .map(|(key, rule)| {
                let index = match key {
                    FieldKey::Index(i) if *i < schema.len() => *i,
                    FieldKey::Index(i) => {
                        return Err(Error::Schema(format!(
                            "validation rule targets column {} but the schema has {}",
                            i + 1,
                            schema.len()
                        )))
                    }
                    FieldKey::Name(name) => schema.index_of(name).ok_or_else(|| {
                        Error::Schema(format!("validation rule targets unknown column {:?}", name))
                    })?,
                };
                Ok((index, rule.clone()))
            })
            .collect()
    }
}
