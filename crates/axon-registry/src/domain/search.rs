//! # Search Filter
//!
//! Every supplied field must match. An absent field matches everything.

use crate::domain::entities::{CredentialStatus, RegistryEntry};
use serde::{Deserialize, Serialize};

/// Page size when the query does not set one.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Upper bound on page size.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Multi-field registry query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Exact identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npi: Option<String>,
    /// Case-insensitive substring of the display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Case-insensitive exact specialty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    /// Member of the entry's provider type tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    /// Case-insensitive substring of the organization name or any affiliation name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<CredentialStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn npi(mut self, npi: impl Into<String>) -> Self {
        self.npi = Some(npi.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }

    pub fn provider_type(mut self, provider_type: impl Into<String>) -> Self {
        self.provider_type = Some(provider_type.into());
        self
    }

    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn credential_status(mut self, status: CredentialStatus) -> Self {
        self.credential_status = Some(status);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Effective page size after defaulting and clamping.
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .min(MAX_SEARCH_LIMIT)
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// True if `entry` satisfies every supplied field.
    pub fn matches(&self, entry: &RegistryEntry) -> bool {
        if let Some(npi) = &self.npi {
            if entry.npi != *npi {
                return false;
            }
        }

        if let Some(name) = &self.name {
            if !contains_ignore_case(&entry.name, name) {
                return false;
            }
        }

        if let Some(specialty) = &self.specialty {
            match entry.specialty() {
                Some(own) if own.to_lowercase() == specialty.to_lowercase() => {}
                _ => return false,
            }
        }

        if let Some(provider_type) = &self.provider_type {
            if !entry.provider_types().iter().any(|t| t == provider_type) {
                return false;
            }
        }

        if let Some(organization) = &self.organization {
            let own_name = entry
                .organization_name()
                .is_some_and(|n| contains_ignore_case(n, organization));
            let affiliated = entry
                .affiliations()
                .iter()
                .any(|a| contains_ignore_case(&a.organization_name, organization));
            if !own_name && !affiliated {
                return false;
            }
        }

        if let Some(status) = self.credential_status {
            if entry.credential_status != status {
                return false;
            }
        }

        true
    }

    /// Filter `entries` in order, then take one page.
    pub fn apply<'a, I>(&self, entries: I) -> Vec<RegistryEntry>
    where
        I: IntoIterator<Item = &'a RegistryEntry>,
    {
        entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .skip(self.effective_offset())
            .take(self.effective_limit())
            .cloned()
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        EntityKind, IndividualProfile, OrganizationAffiliation, OrganizationProfile,
        REGISTRY_VERSION,
    };
    use chrono::Utc;

    fn entry(npi: &str, name: &str, kind: EntityKind, status: CredentialStatus) -> RegistryEntry {
        let now = Utc::now();
        RegistryEntry {
            npi: npi.into(),
            kind,
            name: name.into(),
            credential_status: status,
            credentials: Vec::new(),
            registered_at: now,
            last_updated: now,
            registry_version: REGISTRY_VERSION.into(),
        }
    }

    fn fixtures() -> Vec<RegistryEntry> {
        vec![
            entry(
                "1245319599",
                "General Hospital",
                EntityKind::Organization(OrganizationProfile {
                    organization_name: Some("General Hospital Network".into()),
                    neuron_endpoint: None,
                }),
                CredentialStatus::Active,
            ),
            entry(
                "1679576722",
                "Dr. Jane Smith",
                EntityKind::Individual(IndividualProfile {
                    provider_types: vec!["physician".into()],
                    specialty: Some("Cardiology".into()),
                    affiliations: Some(vec![OrganizationAffiliation::new(
                        "1245319599",
                        "General Hospital",
                    )]),
                    ..Default::default()
                }),
                CredentialStatus::Active,
            ),
            entry(
                "1376841239",
                "Nurse John Smithers",
                EntityKind::Individual(IndividualProfile {
                    provider_types: vec!["nursing".into()],
                    specialty: Some("Pediatrics".into()),
                    ..Default::default()
                }),
                CredentialStatus::Pending,
            ),
        ]
    }

    fn npis(results: &[RegistryEntry]) -> Vec<&str> {
        results.iter().map(|e| e.npi.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_all_in_order() {
        let all = fixtures();
        let results = SearchQuery::new().apply(&all);
        assert_eq!(npis(&results), ["1245319599", "1679576722", "1376841239"]);
    }

    #[test]
    fn test_name_is_case_insensitive_substring() {
        let all = fixtures();
        let results = SearchQuery::new().name("SMITH").apply(&all);
        assert_eq!(npis(&results), ["1679576722", "1376841239"]);
    }

    #[test]
    fn test_specialty_is_case_insensitive_exact() {
        let all = fixtures();
        assert_eq!(
            npis(&SearchQuery::new().specialty("cardiology").apply(&all)),
            ["1679576722"]
        );
        assert!(SearchQuery::new().specialty("cardio").apply(&all).is_empty());
    }

    #[test]
    fn test_provider_type_membership() {
        let all = fixtures();
        assert_eq!(
            npis(&SearchQuery::new().provider_type("nursing").apply(&all)),
            ["1376841239"]
        );
        // Tags compare exactly.
        assert!(SearchQuery::new().provider_type("Nursing").apply(&all).is_empty());
    }

    #[test]
    fn test_organization_matches_own_name_or_affiliation() {
        let all = fixtures();
        assert_eq!(
            npis(&SearchQuery::new().organization("general hospital").apply(&all)),
            ["1245319599", "1679576722"]
        );
        assert_eq!(
            npis(&SearchQuery::new().organization("network").apply(&all)),
            ["1245319599"]
        );
    }

    #[test]
    fn test_fields_are_anded() {
        let all = fixtures();
        let query = SearchQuery::new()
            .name("smith")
            .credential_status(CredentialStatus::Pending);
        assert_eq!(npis(&query.apply(&all)), ["1376841239"]);
        assert!(SearchQuery::new()
            .npi("1245319599")
            .provider_type("physician")
            .apply(&all)
            .is_empty());
    }

    #[test]
    fn test_pagination_after_filter() {
        let all = fixtures();
        let page = SearchQuery::new().limit(1).offset(1).apply(&all);
        assert_eq!(npis(&page), ["1679576722"]);
        assert!(SearchQuery::new().offset(10).apply(&all).is_empty());
        assert!(SearchQuery::new().limit(0).apply(&all).is_empty());
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(SearchQuery::new().effective_limit(), DEFAULT_SEARCH_LIMIT);
        assert_eq!(SearchQuery::new().limit(500).effective_limit(), MAX_SEARCH_LIMIT);
        assert_eq!(SearchQuery::new().limit(7).effective_limit(), 7);
    }
}
