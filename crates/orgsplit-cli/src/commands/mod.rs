//! Subcommand workflows and the helpers they share.
//!
//! Every workflow follows the same shape: look up organizations, fan out
//! fetches, reshape in memory, confirm, mutate, back up, summarize. Workflows
//! print as they go and return a report; errors go back to `main` untouched.

pub mod device_count;
pub mod precheck;
pub mod recombine;
pub mod rename;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::orgs::{self, OrgSelector};
use crate::progress::batch_progress;
use crate::prompt::Prompter;
use crate::report::{self, OrgNetwork};
use colored::Colorize;
use orgsplit_core::config::DashboardConfig;
use orgsplit_core::{fan_out, FanOutOutcome, ProgressReporter};
use orgsplit_dashboard::{DashboardClient, DirectoryApi, Organization};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Everything a workflow needs besides its own arguments.
pub struct WorkflowContext<'a> {
    /// Dashboard operations
    pub api: &'a dyn DirectoryApi,
    /// Confirmation gates
    pub prompter: &'a dyn Prompter,
    /// Maximum in-flight requests per batch
    pub concurrency: usize,
    /// Directory backups are written to
    pub output_dir: PathBuf,
    /// Draw progress bars
    pub show_progress: bool,
}

impl WorkflowContext<'_> {
    pub(crate) fn progress(&self, label: &str) -> Box<dyn ProgressReporter> {
        batch_progress(label, self.show_progress)
    }
}

/// Build the Dashboard session described by the global flags and run the subcommand.
///
/// # Errors
///
/// Any [`CliError`] returned by session setup or the workflow.
pub async fn dispatch(cli: &Cli, api_key: &str, prompter: &dyn Prompter) -> Result<(), CliError> {
    let config = DashboardConfig::new(cli.base_url.clone())
        .map_err(CliError::Session)?
        .with_api_key(api_key)
        .with_certificate_path(cli.cert_path.clone())
        .with_concurrency(usize::from(cli.concurrency));
    let client = DashboardClient::from_config(&config).map_err(CliError::Session)?;
    debug!(base_url = %client.base_url(), "Dashboard session ready");

    let output_dir = std::env::current_dir().map_err(|err| CliError::Backup {
        path: PathBuf::from("."),
        source: err,
    })?;

    let ctx = WorkflowContext {
        api: &client,
        prompter,
        concurrency: config.maximum_concurrent_requests,
        output_dir,
        show_progress: true,
    };

    match &cli.command {
        Command::DeviceCount { orgs, .. } => {
            device_count::run(&ctx, &orgs.orgname, orgs.filter.as_deref())
                .await
                .map(|_| ())
        }
        Command::Precheck { org, .. } => precheck::run(&ctx, &org.orgname).await.map(|_| ()),
        Command::Rename {
            orgs, find, replace, ..
        } => rename::run(&ctx, &orgs.orgname, orgs.filter.as_deref(), find, replace)
            .await
            .map(|_| ()),
        Command::Recombine { org, .. } => recombine::run(&ctx, &org.orgname).await.map(|_| ()),
    }
}

/// Resolve `--orgname`/`--filter` against the organizations visible to the key.
pub(crate) async fn select_organizations(
    ctx: &WorkflowContext<'_>,
    orgname: &str,
    filter: Option<&str>,
) -> Result<Vec<Organization>, CliError> {
    let selector = OrgSelector::from_args(orgname, filter);
    if selector.ignores_filter(filter) {
        warn!("--filter is ignored when used with a single organization");
        println!(
            "{}",
            "[WARNING] --filter (-f) option is ignored when used with a single organization."
                .yellow()
                .bold()
        );
    }
    lookup_organizations(ctx, &selector).await
}

/// Resolve `--orgname` to exactly one organization.
///
/// "all" is not special here and is matched as a literal name.
pub(crate) async fn select_single_organization(
    ctx: &WorkflowContext<'_>,
    orgname: &str,
) -> Result<Organization, CliError> {
    let matched = lookup_organizations(ctx, &OrgSelector::Named(orgname.to_string())).await?;
    orgs::require_single(matched, orgname)
}

/// When a named organization is missing the operator is offered the list of
/// every accessible organization name before the error is returned.
async fn lookup_organizations(
    ctx: &WorkflowContext<'_>,
    selector: &OrgSelector,
) -> Result<Vec<Organization>, CliError> {
    println!("{}", "Getting org info...".green().bold());
    let all_orgs = ctx
        .api
        .list_organizations()
        .await
        .map_err(CliError::Session)?;

    match orgs::select(all_orgs, selector) {
        Err(CliError::OrganizationNotFound { name, available }) => {
            offer_org_names(ctx, &name, &available)?;
            Err(CliError::OrganizationNotFound { name, available })
        }
        other => other,
    }
}

fn offer_org_names(
    ctx: &WorkflowContext<'_>,
    name: &str,
    available: &[String],
) -> Result<(), CliError> {
    println!(
        "{}",
        format!("[WARNING] Could not find given Organization Name: \"{name}\".").yellow()
    );
    println!(
        "{}",
        "NOTE: Organization names that contain spaces must be wrapped in quotes (e.g. \"Org Name\")"
            .yellow()
    );
    if ctx
        .prompter
        .confirm("Print all org names that this API key has access to?")?
    {
        for org_name in available {
            println!("{}", org_name.green());
        }
    }
    Ok(())
}

/// Fan out network listing over `orgs`, tagged and in organization order.
pub(crate) async fn fetch_networks(
    ctx: &WorkflowContext<'_>,
    orgs: &[Organization],
) -> FanOutOutcome<OrgNetwork> {
    let api = ctx.api;
    let progress = ctx.progress("Fetching networks");
    let mut outcome = fan_out(
        orgs.to_vec(),
        ctx.concurrency,
        progress.as_ref(),
        |org| async move {
            let networks = api.list_organization_networks(&org.id).await?;
            Ok(report::tag_networks(&org, networks))
        },
    )
    .await;
    outcome.items = report::in_org_order(outcome.items, orgs);
    report_failures("organization", &outcome);
    outcome
}

/// Print a one-line warning when part of a batch failed.
pub(crate) fn report_failures<T>(noun: &str, outcome: &FanOutOutcome<T>) {
    if outcome.is_complete() {
        return;
    }
    println!(
        "{}",
        format!(
            "[WARNING] {} of {} {noun} requests failed and were skipped, see the log for details. \
             You may need to re-run with the debug (-d) flag set.",
            outcome.failures.len(),
            outcome.total
        )
        .yellow()
        .bold()
    );
}

#[cfg(test)]
pub(crate) mod testing {
    //! Mock Dashboard and fixtures shared by the workflow tests.

    use super::WorkflowContext;
    use crate::prompt::{AssumeYes, Prompter};
    use async_trait::async_trait;
    use orgsplit_core::ids::{NetworkId, OrganizationId};
    use orgsplit_core::Result;
    use orgsplit_dashboard::{
        ApplianceSettings, CombineNetworksRequest, CombineNetworksResponse, Device,
        DirectoryApi, LicenseOverview, Network, Organization, UpdateNetworkRequest,
    };
    use serde_json::json;
    use std::path::Path;

    mockall::mock! {
        pub Directory {}

        #[async_trait]
        impl DirectoryApi for Directory {
            async fn list_organizations(&self) -> Result<Vec<Organization>>;
            async fn list_organization_networks(&self, org: &OrganizationId) -> Result<Vec<Network>>;
            async fn list_organization_devices(&self, org: &OrganizationId) -> Result<Vec<Device>>;
            async fn get_network_appliance_settings(&self, network: &NetworkId) -> Result<ApplianceSettings>;
            async fn get_organization_licenses_overview(&self, org: &OrganizationId) -> Result<LicenseOverview>;
            async fn update_network(&self, network: &NetworkId, request: &UpdateNetworkRequest) -> Result<Network>;
            async fn combine_organization_networks(&self, org: &OrganizationId, request: &CombineNetworksRequest) -> Result<CombineNetworksResponse>;
        }
    }

    pub fn org(id: &str, name: &str) -> Organization {
        Organization {
            id: OrganizationId::from(id),
            name: name.to_string(),
            url: None,
        }
    }

    pub fn network(id: &str, org_id: &str, name: &str, product_types: &[&str]) -> Network {
        serde_json::from_value(json!({
            "id": id,
            "organizationId": org_id,
            "name": name,
            "productTypes": product_types,
            "timeZone": "America/Los_Angeles",
            "tags": [],
            "isBoundToConfigTemplate": false
        }))
        .unwrap()
    }

    pub fn context<'a>(
        api: &'a MockDirectory,
        prompter: &'a dyn Prompter,
        dir: &Path,
    ) -> WorkflowContext<'a> {
        WorkflowContext {
            api,
            prompter,
            concurrency: 10,
            output_dir: dir.to_path_buf(),
            show_progress: false,
        }
    }

    pub static YES: AssumeYes = AssumeYes;
}
