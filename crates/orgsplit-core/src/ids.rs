//! Strongly-typed identifier wrappers for Dashboard resources.
//!
//! Dashboard identifiers are opaque strings (`"549236"`, `"L_6468...`", `"Q2XX-XXXX-XXXX"`).
//! Wrapping each kind in its own type prevents passing a network id where an
//! organization id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Macro to generate strongly-typed string identifier types.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Converts into the inner [`String`].
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Parses an identifier, rejecting blank input.
            ///
            /// # Errors
            ///
            /// Returns an error if the string is empty or only whitespace.
            pub fn parse_str(input: &str) -> Result<Self> {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Err(Error::ValidationError(format!(
                        "{} must not be empty",
                        stringify!($name)
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse_str(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

id_type!(OrganizationId, "Organization identifier");
id_type!(NetworkId, "Network identifier");
id_type!(DeviceSerial, "Device serial number");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = OrganizationId::parse_str("  549236 ").unwrap();
        assert_eq!(id.as_str(), "549236");
    }

    #[test]
    fn test_parse_rejects_blank() {
        let err = NetworkId::parse_str("   ").unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
        assert!(err.to_string().contains("NetworkId"));
    }

    #[test]
    fn test_from_str() {
        let id: DeviceSerial = "Q2XX-AAAA-BBBB".parse().unwrap();
        assert_eq!(id.to_string(), "Q2XX-AAAA-BBBB");
    }

    #[test]
    fn test_serde_transparent() {
        let id = NetworkId::new("L_646829496481105433");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"L_646829496481105433\"");

        let back: NetworkId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_into_inner_and_as_ref() {
        let id = OrganizationId::from("42");
        let as_ref: &str = id.as_ref();
        assert_eq!(as_ref, "42");
        assert_eq!(id.into_inner(), "42".to_string());
    }

    #[test]
    fn test_hash_dedup() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(NetworkId::from("N_1"));
        set.insert(NetworkId::from("N_2"));
        set.insert(NetworkId::from("N_1"));
        assert_eq!(set.len(), 2);
    }
}
