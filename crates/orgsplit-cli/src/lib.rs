//! # orgsplit-cli
//!
//! Workflows behind the `orgsplit` binary: device counts, split prechecks,
//! bulk network renames and recombination of split networks.
//!
//! Each subcommand lives in [`commands`] and runs against a
//! [`orgsplit_dashboard::DirectoryApi`] through a [`commands::WorkflowContext`],
//! so the workflows can be driven by a mock or a test server as easily as by
//! the live Dashboard.

#![deny(missing_docs)]

pub mod backup;
pub mod cli;
pub mod commands;
pub mod error;
pub mod orgs;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod table;

pub use cli::{Cli, Command};
pub use commands::{dispatch, WorkflowContext};
pub use error::CliError;
pub use prompt::{AssumeYes, Prompter, TerminalPrompter};
