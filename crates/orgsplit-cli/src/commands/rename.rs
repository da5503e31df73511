//! `orgsplit rename FIND REPLACE`: bulk network rename by literal substring.

use super::{fetch_networks, report_failures, select_organizations, WorkflowContext};
use crate::backup::{write_backup, BackupKind};
use crate::error::CliError;
use crate::prompt::require_confirmation;
use crate::report::OrgNetwork;
use crate::table::print_table;
use chrono::Local;
use colored::Colorize;
use orgsplit_core::{fan_out, FanOutItem};
use orgsplit_dashboard::{Network, UpdateNetworkRequest};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

const CONFIRM_RENAME: &str = "Confirm new network names in the table above before continuing. \
     This step cannot be undone without another rename. Continue?";

/// A network about to be renamed.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StagedRename {
    /// Name of the owning organization
    pub organization_name: String,
    /// Name before the rename
    pub old_name: String,
    /// Name after the rename
    pub new_name: String,
    /// Network as fetched before the rename
    #[serde(flatten)]
    pub network: Network,
}

impl FanOutItem for StagedRename {
    fn item_id(&self) -> &str {
        self.network.id.as_str()
    }

    fn item_name(&self) -> &str {
        &self.old_name
    }
}

/// A rename the Dashboard accepted.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenameResult {
    /// What was submitted
    #[serde(flatten)]
    pub staged: StagedRename,
    /// Network as returned by the update call
    pub updated_network: Network,
}

/// Networks selected for renaming.
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePlan {
    /// Networks whose name contains the search string
    pub staged: Vec<StagedRename>,
    /// Networks left alone
    pub unmatched: usize,
}

/// Result of the rename workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameReport {
    /// Renames the Dashboard accepted
    pub renamed: Vec<RenameResult>,
    /// Renames that failed and were skipped
    pub failed: usize,
    /// Networks whose name did not contain the search string
    pub unmatched: usize,
    /// Backup file holding `renamed`
    pub backup: PathBuf,
}

/// Stage a rename for every network whose name contains `find`.
///
/// All occurrences of `find` are replaced.
///
/// # Errors
///
/// [`CliError::EmptyFindString`] for an empty `find`,
/// [`CliError::NoMatchingNetworks`] when no name contains it.
pub fn stage_renames(
    networks: Vec<OrgNetwork>,
    find: &str,
    replace: &str,
) -> Result<RenamePlan, CliError> {
    if find.is_empty() {
        return Err(CliError::EmptyFindString);
    }

    let mut staged = Vec::new();
    let mut unmatched = 0;
    for OrgNetwork {
        organization_name,
        network,
    } in networks
    {
        if network.name.contains(find) {
            staged.push(StagedRename {
                organization_name,
                old_name: network.name.clone(),
                new_name: network.name.replace(find, replace),
                network,
            });
        } else {
            debug!(network = %network.name, find, "Search string not found in network name");
            unmatched += 1;
        }
    }

    if staged.is_empty() {
        return Err(CliError::NoMatchingNetworks(find.to_string()));
    }
    Ok(RenamePlan { staged, unmatched })
}

/// Run the workflow.
///
/// # Errors
///
/// Organization lookup errors, [`CliError::EmptyFindString`],
/// [`CliError::NetworksUnavailable`] when no organization's networks could be
/// listed, [`CliError::NoMatchingNetworks`], [`CliError::Cancelled`],
/// [`CliError::NothingApplied`] when every rename failed, and
/// [`CliError::Backup`].
pub async fn run(
    ctx: &WorkflowContext<'_>,
    orgname: &str,
    filter: Option<&str>,
    find: &str,
    replace: &str,
) -> Result<RenameReport, CliError> {
    if find.is_empty() {
        return Err(CliError::EmptyFindString);
    }
    let orgs = select_organizations(ctx, orgname, filter).await?;

    let names: Vec<&str> = orgs.iter().map(|org| org.name.as_str()).collect();
    println!(
        "{}",
        format!("Getting networks for the following orgs {names:?}")
            .green()
            .bold()
    );
    let fetched = fetch_networks(ctx, &orgs).await;
    if fetched.succeeded() == 0 {
        return Err(CliError::NetworksUnavailable(fetched.total));
    }
    let networks = fetched.items;

    let plan = stage_renames(networks, find, replace)?;
    info!(
        staged = plan.staged.len(),
        unmatched = plan.unmatched,
        "Staged network renames"
    );

    let rows: Vec<Vec<String>> = plan
        .staged
        .iter()
        .map(|s| vec![s.old_name.clone(), s.new_name.clone()])
        .collect();
    print_table(&["Old Name", "New Name"], &rows);

    require_confirmation(ctx.prompter, CONFIRM_RENAME)?;

    let started = Local::now();
    let attempted = plan.staged.len();
    let api = ctx.api;
    let progress = ctx.progress("Renaming networks");
    let outcome = fan_out(
        plan.staged,
        ctx.concurrency,
        progress.as_ref(),
        |staged| async move {
            let request = UpdateNetworkRequest {
                name: staged.new_name.clone(),
            };
            let updated_network = api.update_network(&staged.network.id, &request).await?;
            Ok(vec![RenameResult {
                staged,
                updated_network,
            }])
        },
    )
    .await;
    report_failures("rename", &outcome);

    if outcome.items.is_empty() {
        return Err(CliError::NothingApplied {
            operation: "rename",
            attempted,
        });
    }

    let backup = write_backup(
        &ctx.output_dir,
        orgname,
        BackupKind::Rename,
        &started,
        &outcome.items,
    )?;
    println!(
        "{}",
        format!(
            "Network rename process was successful - output JSON for the operation written to filename \"{}\".",
            backup.display()
        )
        .green()
        .bold()
    );
    println!(
        "{}",
        format!(
            "Renamed {} of {attempted} networks ({} failed).",
            outcome.items.len(),
            outcome.failures.len()
        )
        .green()
    );

    Ok(RenameReport {
        renamed: outcome.items,
        failed: outcome.failures.len(),
        unmatched: plan.unmatched,
        backup,
    })
}
