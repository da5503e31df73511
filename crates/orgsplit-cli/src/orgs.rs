//! Organization lookup by name or prefix filter.

use crate::error::CliError;
use orgsplit_dashboard::Organization;

/// Keyword that selects every organization.
pub const ALL_ORGANIZATIONS: &str = "all";

/// How the operator chose the target organizations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgSelector {
    /// One organization, matched on its trimmed, case-insensitive name.
    Named(String),
    /// Every organization, optionally restricted to a case-sensitive name prefix.
    All {
        /// Name prefix
        filter: Option<String>,
    },
}

impl OrgSelector {
    /// Interpret the `--orgname` and `--filter` arguments.
    ///
    /// The filter only applies together with `all`; callers should warn when
    /// [`OrgSelector::ignores_filter`] is true.
    #[must_use]
    pub fn from_args(orgname: &str, filter: Option<&str>) -> Self {
        if orgname.trim().eq_ignore_ascii_case(ALL_ORGANIZATIONS) {
            Self::All {
                filter: filter.filter(|f| !f.is_empty()).map(ToOwned::to_owned),
            }
        } else {
            Self::Named(orgname.to_string())
        }
    }

    /// Returns true when a filter was given for a single organization.
    #[must_use]
    pub fn ignores_filter(&self, filter: Option<&str>) -> bool {
        matches!(self, Self::Named(_)) && filter.is_some_and(|f| !f.is_empty())
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Organizations whose normalized name equals the normalized input.
#[must_use]
pub fn match_by_name(orgs: &[Organization], name: &str) -> Vec<Organization> {
    let wanted = normalize(name);
    orgs.iter()
        .filter(|org| normalize(&org.name) == wanted)
        .cloned()
        .collect()
}

/// Apply a selector to the organizations visible to the API key.
///
/// # Errors
///
/// [`CliError::OrganizationNotFound`] when a named organization does not
/// exist, [`CliError::NoOrganizationsSelected`] when `all` mode selects nothing.
pub fn select(orgs: Vec<Organization>, selector: &OrgSelector) -> Result<Vec<Organization>, CliError> {
    match selector {
        OrgSelector::Named(name) => {
            let matched = match_by_name(&orgs, name);
            if matched.is_empty() {
                return Err(CliError::OrganizationNotFound {
                    name: name.clone(),
                    available: orgs.into_iter().map(|org| org.name).collect(),
                });
            }
            Ok(matched)
        }
        OrgSelector::All { filter: Some(prefix) } => {
            let matched: Vec<_> = orgs
                .into_iter()
                .filter(|org| org.name.starts_with(prefix.as_str()))
                .collect();
            if matched.is_empty() {
                return Err(CliError::NoOrganizationsSelected(format!(
                    "no organization name starts with \"{prefix}\""
                )));
            }
            Ok(matched)
        }
        OrgSelector::All { filter: None } => {
            if orgs.is_empty() {
                return Err(CliError::NoOrganizationsSelected(
                    "the API key has no access to any organization".to_string(),
                ));
            }
            Ok(orgs)
        }
    }
}

/// Narrow a selection to exactly one organization.
///
/// # Errors
///
/// [`CliError::AmbiguousOrganization`] when more than one organization matched.
pub fn require_single(mut orgs: Vec<Organization>, name: &str) -> Result<Organization, CliError> {
    match orgs.len() {
        1 => Ok(orgs.remove(0)),
        0 => Err(CliError::NoOrganizationsSelected(format!(
            "nothing matched \"{name}\""
        ))),
        count => Err(CliError::AmbiguousOrganization {
            name: name.to_string(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgsplit_core::ids::OrganizationId;

    fn org(id: &str, name: &str) -> Organization {
        Organization {
            id: OrganizationId::from(id),
            name: name.to_string(),
            url: None,
        }
    }

    fn fleet() -> Vec<Organization> {
        vec![
            org("1", "Acme Corp"),
            org("2", "Acme Corp - EMEA"),
            org("3", " acme corp "),
            org("4", "Lab Sandbox"),
        ]
    }

    #[test]
    fn exact_match_ignores_case_and_padding() {
        let matched = match_by_name(&fleet(), "  ACME CORP");
        let ids: Vec<_> = matched.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn match_is_not_substring() {
        assert!(match_by_name(&fleet(), "Acme").is_empty());
    }

    #[test]
    fn not_found_carries_available_names() {
        let err = select(fleet(), &OrgSelector::Named("Nope".into())).unwrap_err();
        match err {
            CliError::OrganizationNotFound { name, available } => {
                assert_eq!(name, "Nope");
                assert_eq!(available.len(), 4);
                assert!(available.contains(&"Lab Sandbox".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn all_with_filter_is_case_sensitive_prefix() {
        let selector = OrgSelector::from_args("all", Some("Acme"));
        let matched = select(fleet(), &selector).unwrap();
        assert_eq!(matched.len(), 2);

        let selector = OrgSelector::from_args("ALL", Some("acme"));
        assert!(matches!(
            select(fleet(), &selector),
            Err(CliError::NoOrganizationsSelected(_))
        ));
    }

    #[test]
    fn all_without_filter_selects_everything() {
        let selector = OrgSelector::from_args("all", None);
        assert_eq!(selector, OrgSelector::All { filter: None });
        assert_eq!(select(fleet(), &selector).unwrap().len(), 4);

        assert!(select(Vec::new(), &selector).is_err());
    }

    #[test]
    fn filter_ignored_for_named_org() {
        let selector = OrgSelector::from_args("Acme Corp", Some("Lab"));
        assert!(selector.ignores_filter(Some("Lab")));
        assert_eq!(selector, OrgSelector::Named("Acme Corp".into()));
        assert!(!OrgSelector::from_args("all", Some("Lab")).ignores_filter(Some("Lab")));
    }

    #[test]
    fn require_single_rejects_ambiguity() {
        let matched = match_by_name(&fleet(), "acme corp");
        let err = require_single(matched, "acme corp").unwrap_err();
        assert!(matches!(
            err,
            CliError::AmbiguousOrganization { count: 2, .. }
        ));

        let single = require_single(vec![org("4", "Lab Sandbox")], "lab sandbox").unwrap();
        assert_eq!(single.id.as_str(), "4");
    }
}
