//! `orgsplit recombine`: merge networks that an org split divided by product type.
//!
//! A split leaves one network per product type, named `"{base} - {suffix}"`.
//! Networks sharing a base name are grouped and each group is submitted to the
//! combine endpoint. Both the planned groups and the results are written to
//! timestamped backups.

use super::{report_failures, select_single_organization, WorkflowContext};
use crate::backup::{write_backup, BackupKind};
use crate::error::CliError;
use crate::prompt::require_confirmation;
use crate::table::print_table;
use chrono::Local;
use colored::Colorize;
use orgsplit_core::ids::{NetworkId, OrganizationId};
use orgsplit_core::types::ProductType;
use orgsplit_core::{fan_out, FanOutItem};
use orgsplit_dashboard::{CombineNetworksRequest, Network};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Name suffixes a split appends, one per product type.
pub const PRODUCT_SUFFIXES: [&str; 7] = [
    " - appliance",
    " - switch",
    " - wireless",
    " - cellular gateway",
    " - camera",
    " - environmental",
    " - phone",
];

/// Name with a trailing product suffix removed, if it has one.
#[must_use]
pub fn base_name(name: &str) -> Option<&str> {
    PRODUCT_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
}

/// Networks to merge into one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CombinationGroup {
    /// Name of the combined network
    #[serde(rename = "network_name_combined")]
    pub combined_name: String,
    /// Member network ids, in fetch order
    pub network_ids: Vec<NetworkId>,
    /// Member networks as fetched
    pub networks: Vec<Network>,
    /// Enrollment string of the first member
    pub enrollment_string: Option<String>,
    /// Organization of the first member
    pub organization_id: OrganizationId,
}

impl CombinationGroup {
    fn new(combined_name: &str, first: Network) -> Self {
        Self {
            combined_name: combined_name.to_string(),
            network_ids: vec![first.id.clone()],
            enrollment_string: first.enrollment_string.clone(),
            organization_id: first.organization_id.clone(),
            networks: vec![first],
        }
    }

    fn push(&mut self, network: Network) {
        self.network_ids.push(network.id.clone());
        self.networks.push(network);
    }

    /// Request body for the combine call.
    #[must_use]
    pub fn request(&self) -> CombineNetworksRequest {
        CombineNetworksRequest {
            name: self.combined_name.clone(),
            network_ids: self.network_ids.clone(),
            enrollment_string: self.enrollment_string.clone(),
        }
    }

    fn member_names(&self) -> String {
        self.networks
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FanOutItem for CombinationGroup {
    fn item_id(&self) -> &str {
        self.network_ids.first().map_or("", NetworkId::as_str)
    }

    fn item_name(&self) -> &str {
        &self.combined_name
    }
}

/// A group the Dashboard combined.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CombineResult {
    /// Name of the combined network
    pub recombined_network_name: String,
    /// Network produced by the merge
    pub resulting_network: Option<Network>,
    /// Networks merged into it
    pub previous_networks: Vec<Network>,
}

/// Networks grouped for recombination.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingPlan {
    /// Groups in first-seen order
    pub groups: Vec<CombinationGroup>,
    /// Networks that already carry the `combined` product type
    pub already_combined: Vec<String>,
    /// Networks whose name has no product suffix
    pub unmatched: Vec<String>,
}

/// Group networks by base name.
///
/// Combined networks and names without a product suffix are left out and
/// listed in the plan.
#[must_use]
pub fn group_networks(networks: Vec<Network>) -> GroupingPlan {
    let mut groups: Vec<CombinationGroup> = Vec::new();
    let mut already_combined = Vec::new();
    let mut unmatched = Vec::new();

    for network in networks {
        if network.has_product_type(&ProductType::Combined) {
            already_combined.push(network.name);
            continue;
        }
        let Some(base) = base_name(&network.name).map(ToOwned::to_owned) else {
            debug!(network = %network.name, "No product suffix, not combinable");
            unmatched.push(network.name);
            continue;
        };
        match groups.iter_mut().find(|g| {
            g.combined_name == base && g.organization_id == network.organization_id
        }) {
            Some(group) => group.push(network),
            None => groups.push(CombinationGroup::new(&base, network)),
        }
    }

    GroupingPlan {
        groups,
        already_combined,
        unmatched,
    }
}

/// Result of the recombine workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct RecombineReport {
    /// Groups submitted
    pub attempted: usize,
    /// Groups the Dashboard combined
    pub combined: Vec<CombineResult>,
    /// Groups that failed and were skipped
    pub failed: usize,
    /// Backup of the planned groups
    pub to_combine_backup: PathBuf,
    /// Backup of the combine results
    pub combined_backup: PathBuf,
}

/// Run the workflow.
///
/// # Errors
///
/// Organization lookup errors, [`CliError::Dashboard`] when the networks
/// cannot be listed, [`CliError::NoCombinableNetworks`],
/// [`CliError::Cancelled`], [`CliError::NothingApplied`] and
/// [`CliError::Backup`].
pub async fn run(ctx: &WorkflowContext<'_>, orgname: &str) -> Result<RecombineReport, CliError> {
    let org = select_single_organization(ctx, orgname).await?;
    let networks = ctx.api.list_organization_networks(&org.id).await?;
    info!(org_id = %org.id, networks = networks.len(), "Fetched networks");

    let plan = group_networks(networks);
    if !plan.already_combined.is_empty() {
        debug!(count = plan.already_combined.len(), "Skipping combined networks");
    }
    if plan.groups.is_empty() {
        return Err(CliError::NoCombinableNetworks(format!("{PRODUCT_SUFFIXES:?}")));
    }
    for name in &plan.unmatched {
        println!(
            "{}",
            format!("Network \"{name}\" has no product type suffix and will not be combined.")
                .yellow()
        );
    }

    let rows: Vec<Vec<String>> = plan
        .groups
        .iter()
        .map(|g| vec![g.combined_name.clone(), g.member_names()])
        .collect();
    print_table(&["Combined Network", "Previous Networks"], &rows);

    let started = Local::now();
    let to_combine_backup = write_backup(
        &ctx.output_dir,
        orgname,
        BackupKind::ToCombine,
        &started,
        &plan.groups,
    )?;
    println!(
        "{}",
        format!(
            "Writing JSON for networks to combine to backup filename \"{}\".",
            to_combine_backup.display()
        )
        .yellow()
        .bold()
    );
    println!(
        "{}",
        format!(
            "Confirm new network names in the table above or review the file {} before continuing.",
            to_combine_backup.display()
        )
        .yellow()
        .bold()
    );
    println!(
        "{}",
        "This step cannot be undone without another network split operation!"
            .yellow()
            .bold()
    );
    require_confirmation(ctx.prompter, "Continue?")?;

    println!(
        "{}",
        format!("Combining networks for org \"{}\"", org.name).green()
    );
    let attempted = plan.groups.len();
    let api = ctx.api;
    let progress = ctx.progress("Combining networks");
    let outcome = fan_out(
        plan.groups,
        ctx.concurrency,
        progress.as_ref(),
        |group| async move {
            let response = api
                .combine_organization_networks(&group.organization_id, &group.request())
                .await?;
            Ok(vec![CombineResult {
                recombined_network_name: group.combined_name,
                resulting_network: response.resulting_network,
                previous_networks: group.networks,
            }])
        },
    )
    .await;
    report_failures("combine", &outcome);

    if outcome.items.is_empty() {
        return Err(CliError::NothingApplied {
            operation: "combine",
            attempted,
        });
    }

    let combined_backup = write_backup(
        &ctx.output_dir,
        orgname,
        BackupKind::Combined,
        &started,
        &outcome.items,
    )?;

    let rows: Vec<Vec<String>> = outcome
        .items
        .iter()
        .map(|result| {
            let (id, product_types) = result.resulting_network.as_ref().map_or_else(
                || (String::from("-"), String::new()),
                |n| {
                    let types: Vec<&str> = n.product_types.iter().map(ProductType::name).collect();
                    (n.id.to_string(), types.join(", "))
                },
            );
            vec![result.recombined_network_name.clone(), id, product_types]
        })
        .collect();
    print_table(&["Combined Network", "Network ID", "Product Types"], &rows);
    println!(
        "{}",
        format!(
            "Recombine complete, backup filename results are in file \"{}\".",
            combined_backup.display()
        )
        .green()
        .bold()
    );

    Ok(RecombineReport {
        attempted,
        combined: outcome.items,
        failed: outcome.failures.len(),
        to_combine_backup,
        combined_backup,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::prompt::MockPrompter;
    use orgsplit_dashboard::CombineNetworksResponse;

    #[test]
    fn suffix_is_stripped_from_the_end_only() {
        assert_eq!(base_name("Site1 - appliance"), Some("Site1"));
        assert_eq!(base_name("Site1 - cellular gateway"), Some("Site1"));
        assert_eq!(base_name("Lab - switch - switch"), Some("Lab - switch"));
        assert_eq!(base_name("Site1 - switch backup"), None);
        assert_eq!(base_name("HQ"), None);
    }

    #[test]
    fn groups_by_base_name_in_first_seen_order() {
        let plan = group_networks(vec![
            network("N_1", "1", "Site1 - appliance", &["appliance"]),
            network("N_2", "1", "Site2 - wireless", &["wireless"]),
            network("N_3", "1", "Site1 - switch", &["switch"]),
            network("N_4", "1", "Corporate", &["appliance"]),
            network("N_5", "1", "HQ - switch", &["combined", "switch"]),
        ]);

        let summary: Vec<(&str, usize)> = plan
            .groups
            .iter()
            .map(|g| (g.combined_name.as_str(), g.networks.len()))
            .collect();
        assert_eq!(summary, vec![("Site1", 2), ("Site2", 1)]);
        assert_eq!(
            plan.groups[0].network_ids,
            vec![NetworkId::from("N_1"), NetworkId::from("N_3")]
        );
        assert_eq!(plan.unmatched, vec!["Corporate".to_string()]);
        assert_eq!(plan.already_combined, vec!["HQ - switch".to_string()]);
    }

    #[test]
    fn group_takes_enrollment_string_from_first_member() {
        let mut first = network("N_1", "1", "Site1 - appliance", &["appliance"]);
        first.enrollment_string = Some("site1".into());
        let second = network("N_2", "1", "Site1 - switch", &["switch"]);

        let plan = group_networks(vec![first, second]);
        let request = plan.groups[0].request();
        assert_eq!(request.name, "Site1");
        assert_eq!(request.enrollment_string.as_deref(), Some("site1"));

        let value = serde_json::to_value(&plan.groups[0]).unwrap();
        assert_eq!(value["network_name_combined"], "Site1");
        assert_eq!(value["organization_id"], "1");
        assert_eq!(value["network_ids"][1], "N_2");
    }

    #[tokio::test]
    async fn nothing_combinable_writes_no_file() {
        let mut api = MockDirectory::new();
        api.expect_list_organizations()
            .returning(|| Ok(vec![org("1", "Acme")]));
        api.expect_list_organization_networks()
            .returning(|_| Ok(vec![network("N_1", "1", "Corporate", &["appliance"])]));
        api.expect_combine_organization_networks().never();
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&api, &YES, dir.path());

        let err = run(&ctx, "Acme").await.unwrap_err();
        assert!(matches!(err, CliError::NoCombinableNetworks(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn declining_keeps_plan_backup_only() {
        let mut api = MockDirectory::new();
        api.expect_list_organizations()
            .returning(|| Ok(vec![org("1", "Acme")]));
        api.expect_list_organization_networks().returning(|_| {
            Ok(vec![
                network("N_1", "1", "Site1 - appliance", &["appliance"]),
                network("N_2", "1", "Site1 - switch", &["switch"]),
            ])
        });
        api.expect_combine_organization_networks().never();
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().returning(|_| Ok(false));
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&api, &prompter, dir.path());

        let err = run(&ctx, "Acme").await.unwrap_err();
        assert!(matches!(err, CliError::Cancelled));
        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("Acme_to_combine_"));
    }

    #[tokio::test]
    async fn combines_each_group_and_writes_results() {
        let mut api = MockDirectory::new();
        api.expect_list_organizations()
            .returning(|| Ok(vec![org("1", "Acme")]));
        api.expect_list_organization_networks().returning(|_| {
            Ok(vec![
                network("N_1", "1", "Site1 - appliance", &["appliance"]),
                network("N_2", "1", "Site1 - switch", &["switch"]),
                network("N_3", "1", "Site2 - wireless", &["wireless"]),
            ])
        });
        api.expect_combine_organization_networks()
            .withf(|org_id, _| org_id.as_str() == "1")
            .times(2)
            .returning(|_, request| {
                let mut resulting = network("L_9", "1", &request.name, &["appliance", "switch"]);
                resulting.product_types.push(ProductType::Combined);
                Ok(CombineNetworksResponse {
                    resulting_network: Some(resulting),
                })
            });
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&api, &YES, dir.path());

        let report = run(&ctx, "Acme").await.unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.combined.len(), 2);
        assert_eq!(report.failed, 0);

        let written: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&report.combined_backup).unwrap(),
        )
        .unwrap();
        let site1 = written
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["recombined_network_name"] == "Site1")
            .unwrap();
        assert_eq!(site1["previous_networks"].as_array().unwrap().len(), 2);
        assert_eq!(site1["resulting_network"]["name"], "Site1");
        assert!(report.to_combine_backup.exists());
    }
}
