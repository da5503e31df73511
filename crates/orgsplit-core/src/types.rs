//! Core Dashboard domain types.
//!
//! Enumerations for product types, client tracking methods and license states.
//! Each one keeps unrecognized wire values verbatim so new platform values show
//! up in reports instead of failing deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Product type of a network or device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    /// Security & SD-WAN appliance
    Appliance,
    /// Switch
    Switch,
    /// Wireless access point
    Wireless,
    /// Camera
    Camera,
    /// Cellular gateway
    CellularGateway,
    /// Environmental sensor
    Sensor,
    /// Phone
    Phone,
    /// Systems manager (MDM)
    SystemsManager,
    /// Marker present on networks that combine several product types
    Combined,
    /// Value not known to this tool
    Other(String),
}

impl ProductType {
    /// Number of device tally categories.
    pub const DEVICE_CATEGORY_COUNT: usize = 7;

    /// Product types counted by the device tally, in report order.
    pub const DEVICE_CATEGORIES: [Self; Self::DEVICE_CATEGORY_COUNT] = [
        Self::CellularGateway,
        Self::Switch,
        Self::Appliance,
        Self::Wireless,
        Self::Sensor,
        Self::Camera,
        Self::Phone,
    ];

    /// Returns the wire name of the product type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Appliance => "appliance",
            Self::Switch => "switch",
            Self::Wireless => "wireless",
            Self::Camera => "camera",
            Self::CellularGateway => "cellularGateway",
            Self::Sensor => "sensor",
            Self::Phone => "phone",
            Self::SystemsManager => "systemsManager",
            Self::Combined => "combined",
            Self::Other(value) => value,
        }
    }

    /// Returns true for values this tool does not recognize.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl From<String> for ProductType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "appliance" => Self::Appliance,
            "switch" => Self::Switch,
            "wireless" => Self::Wireless,
            "camera" => Self::Camera,
            "cellularGateway" => Self::CellularGateway,
            "sensor" => Self::Sensor,
            "phone" => Self::Phone,
            "systemsManager" => Self::SystemsManager,
            "combined" => Self::Combined,
            _ => Self::Other(value),
        }
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        match value {
            ProductType::Other(raw) => raw,
            known => known.name().to_string(),
        }
    }
}

impl FromStr for ProductType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an appliance network identifies clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClientTrackingMethod {
    /// Track by IP address
    IpAddress,
    /// Track by MAC (hardware) address
    MacAddress,
    /// Track by platform-generated unique client identifier
    UniqueClientIdentifier,
    /// Value not known to this tool
    Other(String),
}

impl ClientTrackingMethod {
    /// Returns the wire name of the tracking method.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::IpAddress => "IP address",
            Self::MacAddress => "MAC address",
            Self::UniqueClientIdentifier => "Unique client identifier",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for ClientTrackingMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "IP address" => Self::IpAddress,
            "MAC address" => Self::MacAddress,
            "Unique client identifier" => Self::UniqueClientIdentifier,
            _ => Self::Other(value),
        }
    }
}

impl From<ClientTrackingMethod> for String {
    fn from(value: ClientTrackingMethod) -> Self {
        match value {
            ClientTrackingMethod::Other(raw) => raw,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for ClientTrackingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Organization license status as reported by the license overview.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LicenseStatus {
    /// Licensing is in good standing
    Ok,
    /// Licenses have expired
    Expired,
    /// More licenses are required than are available
    Required,
    /// Value not known to this tool
    Other(String),
}

impl LicenseStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Ok => "OK",
            Self::Expired => "License Expired",
            Self::Required => "License Required",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for LicenseStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OK" => Self::Ok,
            "License Expired" => Self::Expired,
            "License Required" => Self::Required,
            _ => Self::Other(value),
        }
    }
}

impl From<LicenseStatus> for String {
    fn from(value: LicenseStatus) -> Self {
        match value {
            LicenseStatus::Other(raw) => raw,
            known => known.name().to_string(),
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
