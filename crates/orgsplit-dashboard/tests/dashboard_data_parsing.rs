//! Integration tests for parsing Dashboard data.
//!
//! These tests validate that the orgsplit-dashboard models can correctly
//! deserialize realistic Dashboard API v1 responses.

use orgsplit_core::ids::NetworkId;
use orgsplit_core::types::{ClientTrackingMethod, LicenseStatus, ProductType};
use orgsplit_dashboard::models::{
    ApplianceSettings, Device, LicenseOverview, Network, Organization,
};
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_deserialize_organizations() {
    let json_data = load_fixture("organizations.json");
    let orgs: Vec<Organization> = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize organizations: {}", e));

    assert_eq!(orgs.len(), 3);
    assert_eq!(orgs[0].id.as_str(), "549236");
    assert_eq!(orgs[1].name, "Acme Corp - EMEA");
    assert!(orgs.iter().all(|org| org.url.is_some()));
}

#[test]
fn test_deserialize_networks() {
    let json_data = load_fixture("networks.json");
    let networks: Vec<Network> = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize networks: {}", e));

    assert_eq!(networks.len(), 5);

    let hq = &networks[0];
    assert_eq!(hq.id, NetworkId::from("L_646829496481105433"));
    assert!(hq.has_product_type(&ProductType::Combined));
    assert_eq!(hq.enrollment_string.as_deref(), Some("amsterdam-hq"));
    assert_eq!(hq.tags, vec!["hq", "emea"]);

    let branch = &networks[1];
    assert_eq!(branch.enrollment_string, None);
    assert_eq!(branch.notes, None);

    let retail = &networks[3];
    assert!(retail.is_bound_to_config_template);
    assert!(retail.extra.contains_key("configTemplateId"));
}

#[test]
fn test_networks_preserve_unknown_product_types() {
    let networks: Vec<Network> = serde_json::from_str(&load_fixture("networks.json")).unwrap();
    let warehouse = networks
        .iter()
        .find(|n| n.name == "Warehouse - cellular gateway")
        .expect("warehouse network present");

    assert_eq!(
        warehouse.product_types,
        vec![
            ProductType::CellularGateway,
            ProductType::Other("wirelessController".to_string())
        ]
    );
}

#[test]
fn test_deserialize_devices() {
    let json_data = load_fixture("devices.json");
    let devices: Vec<Device> = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize devices: {}", e));

    assert_eq!(devices.len(), 9);

    let wireless = devices
        .iter()
        .filter(|d| d.product_type == Some(ProductType::Wireless))
        .count();
    assert_eq!(wireless, 2, "Expected two access points in test data");

    let unknown: Vec<_> = devices
        .iter()
        .filter_map(|d| d.product_type.as_ref())
        .filter(|t| t.is_unknown())
        .collect();
    assert_eq!(unknown.len(), 1);

    let phone = devices.iter().find(|d| d.model.as_deref() == Some("MC74")).unwrap();
    assert_eq!(phone.network_id, None);
    assert_eq!(phone.product_type, Some(ProductType::Phone));
}

#[test]
fn test_deserialize_license_overview() {
    let overview: LicenseOverview =
        serde_json::from_str(&load_fixture("license_overview.json")).unwrap();

    assert_eq!(overview.status, Some(LicenseStatus::Required));
    assert_eq!(overview.expiration_date.as_deref(), Some("Feb 8, 2030 UTC"));
    assert_eq!(overview.licensed_device_counts.get("MR"), Some(&20));
}

#[test]
fn test_deserialize_appliance_settings() {
    let settings: ApplianceSettings =
        serde_json::from_str(&load_fixture("appliance_settings.json")).unwrap();

    assert_eq!(
        settings.client_tracking_method,
        Some(ClientTrackingMethod::UniqueClientIdentifier)
    );
    assert_eq!(settings.deployment_mode.as_deref(), Some("routed"));
}
