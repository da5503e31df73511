//! Report builders: tag fetched records with their owning organization.

use orgsplit_core::ids::{NetworkId, OrganizationId};
use orgsplit_core::FanOutItem;
use orgsplit_dashboard::{ApplianceSettings, Device, Network, Organization};
use serde::Serialize;

/// Records that belong to one organization.
pub trait OrgScoped {
    /// Owning organization.
    fn organization_id(&self) -> &OrganizationId;
}

/// A network tagged with its organization's name.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrgNetwork {
    /// Name of the owning organization
    pub organization_name: String,
    /// The network as returned by the Dashboard
    #[serde(flatten)]
    pub network: Network,
}

impl OrgScoped for OrgNetwork {
    fn organization_id(&self) -> &OrganizationId {
        &self.network.organization_id
    }
}

impl FanOutItem for OrgNetwork {
    fn item_id(&self) -> &str {
        self.network.id.as_str()
    }

    fn item_name(&self) -> &str {
        &self.network.name
    }
}

/// A device tagged with its organization.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrgDevice {
    /// Owning organization
    pub organization_id: OrganizationId,
    /// Name of the owning organization
    pub organization_name: String,
    /// The device as returned by the Dashboard
    #[serde(flatten)]
    pub device: Device,
}

impl OrgScoped for OrgDevice {
    fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }
}

/// Appliance settings tagged with the network they were read from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkApplianceSetting {
    /// Owning organization
    pub organization_id: OrganizationId,
    /// Network the settings belong to
    pub network_id: NetworkId,
    /// Name of that network
    pub network_name: String,
    /// The settings as returned by the Dashboard
    #[serde(flatten)]
    pub settings: ApplianceSettings,
}

impl OrgScoped for NetworkApplianceSetting {
    fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }
}

/// Tag every network of `org`.
#[must_use]
pub fn tag_networks(org: &Organization, networks: Vec<Network>) -> Vec<OrgNetwork> {
    networks
        .into_iter()
        .map(|network| OrgNetwork {
            organization_name: org.name.clone(),
            network,
        })
        .collect()
}

/// Tag every device of `org`.
#[must_use]
pub fn tag_devices(org: &Organization, devices: Vec<Device>) -> Vec<OrgDevice> {
    devices
        .into_iter()
        .map(|device| OrgDevice {
            organization_id: org.id.clone(),
            organization_name: org.name.clone(),
            device,
        })
        .collect()
}

/// Tag appliance settings with the network they were read from.
#[must_use]
pub fn tag_appliance_settings(
    network: &OrgNetwork,
    settings: ApplianceSettings,
) -> NetworkApplianceSetting {
    NetworkApplianceSetting {
        organization_id: network.network.organization_id.clone(),
        network_id: network.network.id.clone(),
        network_name: network.network.name.clone(),
        settings,
    }
}

/// Reorder fan-out results to follow the order of `orgs`.
///
/// Fan-out results arrive in completion order; records of one organization
/// keep their relative (page) order.
#[must_use]
pub fn in_org_order<T: OrgScoped>(mut records: Vec<T>, orgs: &[Organization]) -> Vec<T> {
    records.sort_by_key(|record| {
        orgs.iter()
            .position(|org| &org.id == record.organization_id())
            .unwrap_or(usize::MAX)
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org(id: &str, name: &str) -> Organization {
        Organization {
            id: OrganizationId::from(id),
            name: name.to_string(),
            url: None,
        }
    }

    fn network(id: &str, org_id: &str, name: &str) -> Network {
        serde_json::from_value(json!({
            "id": id,
            "organizationId": org_id,
            "name": name,
            "productTypes": ["appliance"]
        }))
        .unwrap()
    }

    #[test]
    fn tagged_network_serializes_flat() {
        let acme = org("1", "Acme");
        let tagged = tag_networks(&acme, vec![network("N_1", "1", "Branch")]);
        let value = serde_json::to_value(&tagged[0]).unwrap();
        assert_eq!(value["organizationName"], "Acme");
        assert_eq!(value["organizationId"], "1");
        assert_eq!(value["id"], "N_1");
        assert_eq!(value["name"], "Branch");
    }

    #[test]
    fn every_device_carries_its_org() {
        let acme = org("1", "Acme");
        let devices: Vec<Device> = serde_json::from_value(json!([
            {"serial": "Q2XX-0001", "productType": "switch"},
            {"serial": "Q2XX-0002", "productType": "wireless"}
        ]))
        .unwrap();
        let tagged = tag_devices(&acme, devices);
        assert!(tagged
            .iter()
            .all(|d| d.organization_id.as_str() == "1" && d.organization_name == "Acme"));
    }

    #[test]
    fn appliance_settings_carry_network() {
        let acme = org("1", "Acme");
        let tagged = tag_networks(&acme, vec![network("N_7", "1", "Retail 7")]);
        let settings: ApplianceSettings =
            serde_json::from_value(json!({"clientTrackingMethod": "IP address"})).unwrap();
        let setting = tag_appliance_settings(&tagged[0], settings);
        assert_eq!(setting.network_id.as_str(), "N_7");
        assert_eq!(setting.network_name, "Retail 7");
        assert_eq!(setting.organization_id.as_str(), "1");
    }

    #[test]
    fn results_follow_org_order() {
        let orgs = vec![org("1", "First"), org("2", "Second")];
        let mut records = tag_networks(&orgs[1], vec![network("N_3", "2", "c")]);
        records.extend(tag_networks(
            &orgs[0],
            vec![network("N_1", "1", "a"), network("N_2", "1", "b")],
        ));

        let ordered = in_org_order(records, &orgs);
        let names: Vec<_> = ordered.iter().map(|n| n.network.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
