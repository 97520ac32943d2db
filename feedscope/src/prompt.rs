//! Interactive prompts
//!
//! Handlers never talk to the terminal directly: they ask an
//! [`Interaction`] implementation, so tests can substitute scripted answers.

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

/// Source of answers to interactive questions
pub trait Interaction {
    /// Ask for a secret without echoing it
    fn password(&self, prompt: &str) -> Result<String>;

    /// Ask for a line of text
    fn input(&self, prompt: &str) -> Result<String>;

    /// Ask a yes/no question; the default answer is "no"
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Terminal prompts backed by `dialoguer`
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Interaction for TerminalPrompt {
    fn password(&self, prompt: &str) -> Result<String> {
        Password::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .interact()
            .context("Failed to read password")
    }

    fn input(&self, prompt: &str) -> Result<String> {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .interact_text()
            .context("Failed to read input")
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }
}
