//! Interactive questions behind an injectable interface.
//!
//! Every question the run asks goes through [`Prompt::ask`], so tests can
//! script answers instead of reading from a terminal.
use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{Context as _, Result};

use crate::error::ActionError;

/// A source of answers to free-text questions.
pub trait Prompt: Send + Sync + std::fmt::Debug {
    /// Ask `question`. An empty answer yields `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer can be read.
    fn ask(&self, question: &str, default: &str) -> Result<String>;
}

/// Ask a yes/no question. Empty or unrecognised input yields `default`.
///
/// # Errors
///
/// Returns an error if the underlying prompt fails.
pub fn confirm(prompt: &dyn Prompt, question: &str, default: bool) -> Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let answer = prompt.ask(&format!("{question} {hint}"), "")?;
    Ok(parse_yes_no(&answer).unwrap_or(default))
}

/// Interpret a yes/no answer. `None` when the answer is empty or unclear.
#[must_use]
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompt that reads from the controlling terminal with [`dialoguer`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&self, question: &str, default: &str) -> Result<String> {
        let mut input = dialoguer::Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        let answer = input
            .interact_text()
            .with_context(|| format!("failed to read answer to: {question}"))?;
        if answer.trim().is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }
}

/// Prompt that replays a fixed list of answers.
///
/// Once the answers run out every question fails with
/// [`ActionError::NoAnswer`]. Every question asked is recorded.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    /// Prompt that answers with `answers`, in order.
    #[must_use]
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far, in order.
    #[must_use]
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Answers not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str, default: &str) -> Result<String> {
        self.asked
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(question.to_string());
        let answer = self
            .answers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| ActionError::NoAnswer(question.to_string()))?;
        if answer.trim().is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }
}
