//! `orgsplit precheck`: read-only org split readiness report.
//!
//! Three independent checks run against one organization: license status,
//! appliance client tracking and configuration template binding. Every check
//! is evaluated even when an earlier one fails, and nothing is changed.

use super::{fetch_networks, report_failures, select_single_organization, WorkflowContext};
use crate::error::CliError;
use crate::prompt::require_confirmation;
use crate::report::{self, NetworkApplianceSetting, OrgNetwork};
use colored::Colorize;
use orgsplit_core::ids::NetworkId;
use orgsplit_core::types::{ClientTrackingMethod, LicenseStatus, ProductType};
use orgsplit_core::{fan_out, Error};
use orgsplit_dashboard::LicenseOverview;
use serde::Serialize;
use tracing::{info, warn};

const NETWORKS_UNAVAILABLE: &str = "Network list could not be retrieved for this org - \
     this check was not performed, verify the networks in dashboard before proceeding with org split.";

/// Outcome of the license check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum LicenseCheck {
    /// License status is `OK`
    Passed,
    /// Licenses have expired
    Expired,
    /// More licenses are required than the organization holds
    Required,
    /// Status missing (`None`) or not one this tool knows
    Unknown(Option<String>),
    /// The license overview could not be fetched
    Unavailable(String),
}

impl LicenseCheck {
    /// Returns true only for [`LicenseCheck::Passed`].
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Classify the license overview fetch.
#[must_use]
pub fn license_check(overview: Result<LicenseOverview, Error>) -> LicenseCheck {
    match overview {
        Ok(overview) => match overview.status {
            Some(LicenseStatus::Ok) => LicenseCheck::Passed,
            Some(LicenseStatus::Expired) => LicenseCheck::Expired,
            Some(LicenseStatus::Required) => LicenseCheck::Required,
            Some(LicenseStatus::Other(raw)) => LicenseCheck::Unknown(Some(raw)),
            None => LicenseCheck::Unknown(None),
        },
        Err(err) => LicenseCheck::Unavailable(err.to_string()),
    }
}

/// Network listed by a failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedNetwork {
    /// Network identifier
    pub id: NetworkId,
    /// Network name
    pub name: String,
}

/// Org split readiness of one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    /// Organization name
    pub organization_name: String,
    /// License check result
    pub license: LicenseCheck,
    /// Appliance networks tracking clients by unique client identifier
    pub unique_client_tracking: Vec<FlaggedNetwork>,
    /// Networks bound to a configuration template
    pub template_bound: Vec<FlaggedNetwork>,
    /// Appliance networks whose settings could not be read
    pub unchecked_appliances: usize,
    /// The network list could not be fetched, so the network checks saw nothing
    pub networks_unavailable: bool,
}

impl ReadinessReport {
    /// Evaluate the three checks from fetched data.
    #[must_use]
    pub fn evaluate(
        organization_name: &str,
        license: LicenseCheck,
        networks: &[OrgNetwork],
        settings: &[NetworkApplianceSetting],
    ) -> Self {
        let unique_client_tracking = settings
            .iter()
            .filter(|s| {
                s.settings.client_tracking_method
                    == Some(ClientTrackingMethod::UniqueClientIdentifier)
            })
            .map(|s| FlaggedNetwork {
                id: s.network_id.clone(),
                name: s.network_name.clone(),
            })
            .collect();

        let template_bound = networks
            .iter()
            .filter(|n| n.network.is_bound_to_config_template)
            .map(|n| FlaggedNetwork {
                id: n.network.id.clone(),
                name: n.network.name.clone(),
            })
            .collect();

        Self {
            organization_name: organization_name.to_string(),
            license,
            unique_client_tracking,
            template_bound,
            unchecked_appliances: 0,
            networks_unavailable: false,
        }
    }

    /// Returns true when every check ran to completion and passed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.license.passed()
            && !self.networks_unavailable
            && self.unchecked_appliances == 0
            && self.unique_client_tracking.is_empty()
            && self.template_bound.is_empty()
    }
}

/// Run the workflow.
///
/// # Errors
///
/// Organization lookup errors and [`CliError::Cancelled`] when the operator
/// declines either prompt.
pub async fn run(ctx: &WorkflowContext<'_>, orgname: &str) -> Result<ReadinessReport, CliError> {
    let org = select_single_organization(ctx, orgname).await?;

    println!("{}", "::PRECHECK MODE::".green().bold());
    println!(
        "{}",
        "This mode will check for issues that may prevent a successful org split.".green()
    );
    println!(
        "{}",
        "No changes will be made to the Dashboard Organization in this mode.".green()
    );
    require_confirmation(ctx.prompter, "Continue?")?;

    println!("{}", "Gathering license information...".green().bold());
    let overview = ctx.api.get_organization_licenses_overview(&org.id).await;
    if let Err(err) = &overview {
        warn!(org_id = %org.id, error = %err, "License overview unavailable");
    }
    let license = license_check(overview);

    println!(
        "{}",
        format!("Getting network info for org {} ...", org.name).green()
    );
    let fetched = fetch_networks(ctx, std::slice::from_ref(&org)).await;
    let networks_unavailable = !fetched.is_complete();
    let networks = fetched.items;

    println!(
        "{}",
        format!(
            "Checking network appliance tracking type for each network in org {} ...",
            org.name
        )
        .green()
    );
    let appliances: Vec<OrgNetwork> = networks
        .iter()
        .filter(|n| n.network.has_product_type(&ProductType::Appliance))
        .cloned()
        .collect();
    let api = ctx.api;
    let progress = ctx.progress("Fetching appliance settings");
    let settings = fan_out(
        appliances,
        ctx.concurrency,
        progress.as_ref(),
        |network| async move {
            let settings = api.get_network_appliance_settings(&network.network.id).await?;
            Ok(vec![report::tag_appliance_settings(&network, settings)])
        },
    )
    .await;
    report_failures("appliance settings", &settings);

    let mut readiness = ReadinessReport::evaluate(&org.name, license, &networks, &settings.items);
    readiness.unchecked_appliances = settings.failures.len();
    readiness.networks_unavailable = networks_unavailable;
    info!(
        org_id = %org.id,
        networks = networks.len(),
        appliances = settings.total,
        networks_unavailable,
        ready = readiness.is_ready(),
        "Precheck evaluated"
    );

    require_confirmation(
        ctx.prompter,
        "All data gathered print Org Split Readiness Report?",
    )?;
    print_report(&readiness);
    Ok(readiness)
}

fn print_report(report: &ReadinessReport) {
    println!("{}", ".:LICENSE STATUS:.".green().bold());
    match &report.license {
        LicenseCheck::Passed => println!("{}", "LICENSE PRECHECK PASSED!".green()),
        LicenseCheck::Expired => warning(
            "WARNING: License EXPIRED on this org, it is not recommended to proceed with org split.",
        ),
        LicenseCheck::Required => warning(
            "WARNING: License REQUIRED for this org, it is not recommended to proceed with org split.",
        ),
        LicenseCheck::Unknown(status) => {
            let found = status
                .as_deref()
                .map_or_else(|| "No license overview status found".to_string(), |s| {
                    format!("Unrecognized license status \"{s}\"")
                });
            warning(&format!(
                "{found} - check license status in dashboard and coordinate with support before proceeding with org split."
            ));
        }
        LicenseCheck::Unavailable(reason) => warning(&format!(
            "License overview could not be retrieved ({reason}) - check license status in dashboard and coordinate with support before proceeding with org split."
        )),
    }

    println!("{}", ".:CLIENT TRACKING STATUS:.".green().bold());
    if report.networks_unavailable {
        warning(NETWORKS_UNAVAILABLE);
    } else if report.unique_client_tracking.is_empty() && report.unchecked_appliances == 0 {
        println!("{}", "CLIENT TRACKING PRECHECK PASSED!".green());
        println!(
            "{}",
            "No networks in this organization are tracking by Unique Client ID. No client tracking changes are needed prior to org split."
                .green()
        );
    } else if !report.unique_client_tracking.is_empty() {
        warning("The following networks are tracking by unique client identifier. They must be changed to track by MAC address before an org split.");
        warning("This setting can be changed in Security & SD-WAN --> Addressing and VLANs");
        print_flagged(&report.unique_client_tracking);
    }
    if report.unchecked_appliances > 0 {
        warning(&format!(
            "{} appliance networks could not be checked, verify their client tracking method in dashboard.",
            report.unchecked_appliances
        ));
    }

    println!("{}", ".:NETWORK TEMPLATE STATUS:.".green().bold());
    if report.networks_unavailable {
        warning(NETWORKS_UNAVAILABLE);
    } else if report.template_bound.is_empty() {
        println!("{}", "NETWORK PRECHECK PASSED!".green());
        println!(
            "{}",
            "No template bound networks found in this org. No changes to network templates are necessary prior to org split."
                .green()
        );
    } else {
        warning("The following networks are bound to configuration templates.");
        warning("Configuration templates must be unbound before an org split. Please work with support as removing configuration templates can change settings.");
        print_flagged(&report.template_bound);
    }
}

fn warning(message: &str) {
    println!("{}", message.yellow().bold());
}

fn print_flagged(networks: &[FlaggedNetwork]) {
    for network in networks {
        warning(&format!(
            "Network Name: {} Network ID: {}",
            network.name, network.id
        ));
    }
}
