//! Errors surfaced by the orgsplit workflows.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a workflow returns to the binary's single exit point.
#[derive(Debug, Error)]
pub enum CliError {
    /// No organization matched the given name
    #[error("Could not find organization \"{name}\"")]
    OrganizationNotFound {
        /// Name as typed by the operator
        name: String,
        /// Every organization name the API key can access
        available: Vec<String>,
    },

    /// The name matched several organizations where exactly one is required
    #[error("Organization name \"{name}\" matches {count} organizations, expected exactly one")]
    AmbiguousOrganization {
        /// Name as typed by the operator
        name: String,
        /// Number of matching organizations
        count: usize,
    },

    /// "all" mode selected nothing
    #[error("No organizations selected: {0}")]
    NoOrganizationsSelected(String),

    /// The rename search string was empty
    #[error("The string to find must not be empty")]
    EmptyFindString,

    /// Network listing failed for every selected organization
    #[error("Could not list networks for any of the {0} selected organizations, see the log above")]
    NetworksUnavailable(usize),

    /// No network name contains the search string
    #[error("No networks matched: network names in the given organizations do not contain \"{0}\"")]
    NoMatchingNetworks(String),

    /// No network name ends in a known product suffix
    #[error("No networks matched: network names do not end with one of {0}")]
    NoCombinableNetworks(String),

    /// Every staged mutation failed
    #[error("All {attempted} {operation} operations failed, see the log above")]
    NothingApplied {
        /// Operation name
        operation: &'static str,
        /// Number of attempted mutations
        attempted: usize,
    },

    /// The operator declined a confirmation prompt
    #[error("Cancelled, no changes made")]
    Cancelled,

    /// The Dashboard session could not be established
    #[error("Failed to set up Dashboard session: {0}")]
    Session(#[source] orgsplit_core::Error),

    /// A Dashboard call outside a fan-out batch failed
    #[error(transparent)]
    Dashboard(#[from] orgsplit_core::Error),

    /// A backup file could not be written
    #[error("Failed to write backup file {}: {source}", path.display())]
    Backup {
        /// Target path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Terminal interaction failed
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl CliError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Cancelled => 0,
            _ => 1,
        }
    }
}
