//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use orgsplit_core::client::DEFAULT_BASE_URL;
use std::path::PathBuf;

/// CLI suite of tools for pre and post Dashboard organization split.
#[derive(Debug, Parser)]
#[command(name = "orgsplit", version, about, long_about = None)]
pub struct Cli {
    /// Debug-level logging, including every Dashboard request
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Extra PEM root certificate for api.meraki.com
    #[arg(short = 'c', long = "cert-path", value_name = "PATH", global = true)]
    pub cert_path: Option<PathBuf>,

    /// Dashboard API base URL
    #[arg(long, env = "ORGSPLIT_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Maximum concurrent Dashboard requests per batch
    #[arg(
        long,
        default_value = "10",
        value_parser = clap::value_parser!(u16).range(1..=100),
        global = true
    )]
    pub concurrency: u16,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// API key argument shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct ApiKeyArgs {
    /// API key with access to one or more organizations (prompted when absent)
    #[arg(
        short = 'k',
        long = "apikey",
        value_name = "APIKEY",
        env = "MERAKI_DASHBOARD_API_KEY",
        hide_env_values = true
    )]
    pub api_key: Option<String>,
}

/// Organization selection for subcommands that accept `all`.
#[derive(Debug, Clone, Args)]
pub struct MultiOrgArgs {
    /// Organization name, or "all" for every organization
    #[arg(short = 'o', long = "orgname", value_name = "ORGNAME")]
    pub orgname: String,

    /// With "all": only organizations whose name begins with this string (case sensitive)
    #[arg(short = 'f', long = "filter", value_name = "FILTER")]
    pub filter: Option<String>,
}

/// Organization selection for single-organization subcommands.
#[derive(Debug, Clone, Args)]
pub struct SingleOrgArgs {
    /// Organization name
    #[arg(short = 'o', long = "orgname", value_name = "ORGNAME")]
    pub orgname: String,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Device counts for one or more organizations
    DeviceCount {
        /// API key
        #[command(flatten)]
        key: ApiKeyArgs,
        /// Target organizations
        #[command(flatten)]
        orgs: MultiOrgArgs,
    },

    /// Identify settings that may need to be changed prior to an org split
    Precheck {
        /// API key
        #[command(flatten)]
        key: ApiKeyArgs,
        /// Target organization
        #[command(flatten)]
        org: SingleOrgArgs,
    },

    /// Replace part or all of network names in one or more organizations
    Rename {
        /// API key
        #[command(flatten)]
        key: ApiKeyArgs,
        /// Target organizations
        #[command(flatten)]
        orgs: MultiOrgArgs,
        /// Literal string to find in network names
        find: String,
        /// Replacement for every occurrence
        replace: String,
    },

    /// Recombine networks previously split by product type
    Recombine {
        /// API key
        #[command(flatten)]
        key: ApiKeyArgs,
        /// Target organization
        #[command(flatten)]
        org: SingleOrgArgs,
    },
}

impl Command {
    /// API key given on the command line or in the environment.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        let key = match self {
            Self::DeviceCount { key, .. }
            | Self::Precheck { key, .. }
            | Self::Rename { key, .. }
            | Self::Recombine { key, .. } => key,
        };
        key.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}
