//! Operator prompts.

use crate::error::CliError;
use dialoguer::{Confirm, Password};

/// Source of yes/no answers for confirmation gates.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question; `false` means the operator declined.
    fn confirm(&self, message: &str) -> Result<bool, CliError>;
}

/// Interactive prompter on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> Result<bool, CliError> {
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(|err| CliError::Prompt(err.to_string()))
    }
}

/// Prompter that answers yes to everything (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _message: &str) -> Result<bool, CliError> {
        Ok(true)
    }
}

/// Ask, and turn a "no" into [`CliError::Cancelled`].
///
/// # Errors
///
/// [`CliError::Cancelled`] when declined, [`CliError::Prompt`] when the
/// terminal cannot be read.
pub fn require_confirmation(prompter: &dyn Prompter, message: &str) -> Result<(), CliError> {
    if prompter.confirm(message)? {
        Ok(())
    } else {
        Err(CliError::Cancelled)
    }
}

/// Read the API key with hidden input.
///
/// # Errors
///
/// [`CliError::Prompt`] when the terminal cannot be read.
pub fn read_api_key() -> Result<String, CliError> {
    Password::new()
        .with_prompt("Apikey")
        .interact()
        .map_err(|err| CliError::Prompt(err.to_string()))
}
