//! Interactive column naming.

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Source of column names during interactive schema resolution.
///
/// Names are asked strictly in ascending index order. A blank answer
/// becomes the default `Column_{index + 1}` name.
pub trait ColumnPrompt {
    /// Ask for the name of column `index` (0-based).
    fn ask_column_name(&mut self, index: usize) -> Result<String>;

    /// Offer the detected column count for override.
    fn confirm_column_count(&mut self, detected: usize) -> Result<usize> {
        Ok(detected)
    }

    /// Confirm the final names. Returning `false` asks them all again.
    fn confirm_columns(&mut self, _names: &[String]) -> Result<bool> {
        Ok(true)
    }
}

/// A prompt that answers from a fixed list.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<usize>,
}

impl ScriptedPrompt {
    /// Create a prompt with answers in asking order.
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Column indices asked so far, in order.
    pub fn asked(&self) -> &[usize] {
        &self.asked
    }
}

impl ColumnPrompt for ScriptedPrompt {
    fn ask_column_name(&mut self, index: usize) -> Result<String> {
        self.asked.push(index);
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no answer for column {}", index + 1)))
    }
}
