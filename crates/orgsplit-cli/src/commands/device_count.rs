//! `orgsplit device-count`: device totals per product type and organization.

use super::{report_failures, select_organizations, WorkflowContext};
use crate::error::CliError;
use crate::report::{self, OrgDevice};
use crate::table::print_table;
use colored::Colorize;
use orgsplit_core::{fan_out, ItemFailure};
use orgsplit_core::ids::OrganizationId;
use orgsplit_core::types::ProductType;
use orgsplit_dashboard::Organization;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Bucket used for devices that report no product type at all.
const MISSING_PRODUCT_TYPE: &str = "(none)";

/// Total cell of an organization whose inventory could not be fetched.
const FETCH_FAILED: &str = "(fetch failed)";

/// Device counts for one scope.
///
/// Known categories are counted in [`ProductType::DEVICE_CATEGORIES`] order;
/// anything else lands in `unrecognized` and never in the known totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceTally {
    known: [usize; ProductType::DEVICE_CATEGORY_COUNT],
    unrecognized: BTreeMap<String, usize>,
}

impl DeviceTally {
    /// Count one device. Returns false when its type is not a known category.
    pub fn record(&mut self, product_type: Option<&ProductType>) -> bool {
        let position = product_type.and_then(|pt| {
            ProductType::DEVICE_CATEGORIES
                .iter()
                .position(|category| category == pt)
        });
        if let Some(idx) = position {
            self.known[idx] += 1;
            true
        } else {
            let key = product_type.map_or(MISSING_PRODUCT_TYPE, ProductType::name);
            *self.unrecognized.entry(key.to_string()).or_default() += 1;
            false
        }
    }

    /// Count for one known category; zero for anything else.
    #[must_use]
    pub fn count(&self, category: &ProductType) -> usize {
        ProductType::DEVICE_CATEGORIES
            .iter()
            .position(|c| c == category)
            .map_or(0, |idx| self.known[idx])
    }

    /// Total across known categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.known.iter().sum()
    }

    /// Devices whose type is not a known category, by reported type.
    #[must_use]
    pub fn unrecognized(&self) -> &BTreeMap<String, usize> {
        &self.unrecognized
    }

    /// Add another tally into this one.
    pub fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.known.iter_mut().zip(other.known) {
            *mine += theirs;
        }
        for (key, count) in &other.unrecognized {
            *self.unrecognized.entry(key.clone()).or_default() += count;
        }
    }
}

/// Tally of one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgDeviceCount {
    /// Organization identifier
    pub organization_id: OrganizationId,
    /// Organization name
    pub organization_name: String,
    /// Device counts
    pub tally: DeviceTally,
    /// The inventory fetch failed, so `tally` is empty rather than zero
    pub fetch_failed: bool,
}

/// Result of the device-count workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceCountReport {
    /// One entry per selected organization, in selection order
    pub per_org: Vec<OrgDeviceCount>,
    /// Sum over all organizations
    pub overall: DeviceTally,
    /// Organizations whose inventory could not be fetched
    pub failed_orgs: usize,
}

impl DeviceCountReport {
    /// Flag the organizations whose inventory fetch failed.
    pub fn mark_failed(&mut self, failures: &[ItemFailure]) {
        for entry in &mut self.per_org {
            entry.fetch_failed = failures
                .iter()
                .any(|failure| failure.id == entry.organization_id.as_str());
        }
        self.failed_orgs = self.per_org.iter().filter(|e| e.fetch_failed).count();
    }
}

/// Tally tagged devices per organization and overall.
///
/// Every organization in `orgs` appears in the report, with zero counts if it
/// has no devices. A warning is logged once per unknown product type.
#[must_use]
pub fn tally_devices(orgs: &[Organization], devices: &[OrgDevice]) -> DeviceCountReport {
    let mut per_org: Vec<OrgDeviceCount> = orgs
        .iter()
        .map(|org| OrgDeviceCount {
            organization_id: org.id.clone(),
            organization_name: org.name.clone(),
            tally: DeviceTally::default(),
            fetch_failed: false,
        })
        .collect();
    let mut warned = BTreeSet::new();

    for device in devices {
        let Some(entry) = per_org
            .iter_mut()
            .find(|entry| entry.organization_id == device.organization_id)
        else {
            continue;
        };
        let product_type = device.device.product_type.as_ref();
        if !entry.tally.record(product_type) {
            let label = product_type.map_or(MISSING_PRODUCT_TYPE, ProductType::name);
            if warned.insert(label.to_string()) {
                warn!(product_type = label, "Unknown device type, counted as unrecognized");
            }
        }
    }

    let mut overall = DeviceTally::default();
    for entry in &per_org {
        overall.merge(&entry.tally);
    }

    DeviceCountReport {
        per_org,
        overall,
        failed_orgs: 0,
    }
}

/// Run the workflow.
///
/// # Errors
///
/// Organization lookup errors; per-organization fetch failures are reported
/// and skipped.
pub async fn run(
    ctx: &WorkflowContext<'_>,
    orgname: &str,
    filter: Option<&str>,
) -> Result<DeviceCountReport, CliError> {
    let orgs = select_organizations(ctx, orgname, filter).await?;

    let api = ctx.api;
    let progress = ctx.progress("Fetching devices");
    let outcome = fan_out(
        orgs.clone(),
        ctx.concurrency,
        progress.as_ref(),
        |org| async move {
            let devices = api.list_organization_devices(&org.id).await?;
            Ok(report::tag_devices(&org, devices))
        },
    )
    .await;
    report_failures("organization", &outcome);

    let mut report = tally_devices(&orgs, &outcome.items);
    report.mark_failed(&outcome.failures);
    print_report(&report);
    Ok(report)
}

fn print_report(report: &DeviceCountReport) {
    let show_unrecognized = !report.overall.unrecognized().is_empty();

    let categories = ProductType::DEVICE_CATEGORIES;
    let mut headers = vec!["Organization"];
    headers.extend(categories.iter().map(ProductType::name));
    headers.push("Total");
    if show_unrecognized {
        headers.push("Unrecognized");
    }

    let rows: Vec<Vec<String>> = report
        .per_org
        .iter()
        .map(|entry| {
            let mut row = vec![entry.organization_name.clone()];
            if entry.fetch_failed {
                row.extend(vec![String::new(); categories.len()]);
                row.push(FETCH_FAILED.to_string());
                if show_unrecognized {
                    row.push(String::new());
                }
                return row;
            }
            row.extend(
                ProductType::DEVICE_CATEGORIES
                    .iter()
                    .map(|category| entry.tally.count(category).to_string()),
            );
            row.push(entry.tally.total().to_string());
            if show_unrecognized {
                row.push(entry.tally.unrecognized().values().sum::<usize>().to_string());
            }
            row
        })
        .collect();
    println!("{}", "Device counts per organization:".green().bold());
    print_table(&headers, &rows);

    let mut totals: Vec<Vec<String>> = ProductType::DEVICE_CATEGORIES
        .iter()
        .map(|category| {
            vec![
                category.name().to_string(),
                report.overall.count(category).to_string(),
            ]
        })
        .collect();
    totals.push(vec!["total".to_string(), report.overall.total().to_string()]);
    println!(
        "{}",
        format!("Device counts across {} organizations:", report.per_org.len())
            .green()
            .bold()
    );
    print_table(&["Product Type", "Count"], &totals);

    for (product_type, count) in report.overall.unrecognized() {
        println!(
            "{}",
            format!("[WARNING] Unknown device type: \"{product_type}\" ({count} devices).").yellow()
        );
    }
}
