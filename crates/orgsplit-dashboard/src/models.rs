//! Dashboard data models for organizations, networks, devices and settings.

use orgsplit_core::ids::{DeviceSerial, NetworkId, OrganizationId};
use orgsplit_core::types::{ClientTrackingMethod, LicenseStatus, ProductType};
use orgsplit_core::FanOutItem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Organization visible to the API key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Dashboard URL of the organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FanOutItem for Organization {
    fn item_id(&self) -> &str {
        self.id.as_str()
    }

    fn item_name(&self) -> &str {
        &self.name
    }
}

/// Network representation returned by the Dashboard.
///
/// Fields this tool does not interpret are kept in `extra` so backups retain
/// the full record as the API returned it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Network identifier.
    pub id: NetworkId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Network name.
    pub name: String,
    /// Product types enabled on the network.
    #[serde(default)]
    pub product_types: Vec<ProductType>,
    /// IANA time zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Self-enrollment string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_string: Option<String>,
    /// Dashboard URL of the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Whether the network is bound to a configuration template.
    #[serde(default)]
    pub is_bound_to_config_template: bool,
    /// Remaining fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Network {
    /// Returns true if the network has the given product type enabled.
    #[must_use]
    pub fn has_product_type(&self, product_type: &ProductType) -> bool {
        self.product_types.contains(product_type)
    }
}

impl FanOutItem for Network {
    fn item_id(&self) -> &str {
        self.id.as_str()
    }

    fn item_name(&self) -> &str {
        &self.name
    }
}

/// Device inventory entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Serial number.
    pub serial: DeviceSerial,
    /// Device name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hardware model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// MAC address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// Network the device is claimed into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<NetworkId>,
    /// Product type of the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    /// Firmware version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
}

/// Security appliance settings of a network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceSettings {
    /// How clients are identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_tracking_method: Option<ClientTrackingMethod>,
    /// Routed or passthrough deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_mode: Option<String>,
    /// Dynamic DNS settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_dns: Option<Value>,
}

/// Co-termination license overview of an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LicenseOverview {
    /// Overall license status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LicenseStatus>,
    /// Co-termination date as formatted by the Dashboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    /// Licensed device counts by model family.
    #[serde(default)]
    pub licensed_device_counts: BTreeMap<String, u64>,
}

/// Payload for `PUT /networks/{networkId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNetworkRequest {
    /// New network name.
    pub name: String,
}

/// Payload for `POST /organizations/{organizationId}/networks/combine`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CombineNetworksRequest {
    /// Name of the combined network.
    pub name: String,
    /// Networks to merge.
    pub network_ids: Vec<NetworkId>,
    /// Enrollment string for the combined network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_string: Option<String>,
}

/// Response of the combine operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombineNetworksResponse {
    /// The network produced by the merge.
    #[serde(default)]
    pub resulting_network: Option<Network>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn network_keeps_unknown_fields() {
        let raw = json!({
            "id": "L_1",
            "organizationId": "549236",
            "name": "Branch - appliance",
            "productTypes": ["appliance"],
            "timeZone": "America/Los_Angeles",
            "tags": [],
            "isBoundToConfigTemplate": false,
            "configTemplateId": "L_99"
        });
        let network: Network = serde_json::from_value(raw.clone()).unwrap();
        assert!(network.has_product_type(&ProductType::Appliance));
        assert_eq!(network.extra.get("configTemplateId"), Some(&json!("L_99")));
        assert_eq!(serde_json::to_value(&network).unwrap(), raw);
    }

    #[test]
    fn network_defaults_for_missing_fields() {
        let network: Network = serde_json::from_value(json!({
            "id": "N_2",
            "organizationId": "1",
            "name": "Bare"
        }))
        .unwrap();
        assert!(network.product_types.is_empty());
        assert!(network.tags.is_empty());
        assert!(!network.is_bound_to_config_template);
        assert_eq!(network.enrollment_string, None);
    }

    #[test]
    fn combine_request_omits_missing_enrollment_string() {
        let request = CombineNetworksRequest {
            name: "Site1".into(),
            network_ids: vec![NetworkId::from("N_1"), NetworkId::from("N_2")],
            enrollment_string: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"name": "Site1", "networkIds": ["N_1", "N_2"]})
        );

        let request = CombineNetworksRequest {
            enrollment_string: Some("site1".into()),
            ..request
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap()["enrollmentString"],
            json!("site1")
        );
    }

    #[test]
    fn license_overview_status_may_be_absent() {
        let overview: LicenseOverview =
            serde_json::from_value(json!({"expirationDate": "Feb 8, 2030 UTC"})).unwrap();
        assert_eq!(overview.status, None);
        assert!(overview.licensed_device_counts.is_empty());
    }

    #[test]
    fn fan_out_item_labels() {
        let org = Organization {
            id: OrganizationId::from("42"),
            name: "Acme".into(),
            url: None,
        };
        assert_eq!(org.item_id(), "42");
        assert_eq!(org.item_name(), "Acme");
    }
}
