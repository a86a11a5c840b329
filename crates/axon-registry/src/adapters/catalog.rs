//! # Static Catalog
//!
//! Immutable provider-type and action index, built once at startup and shared
//! by `Arc`. Nothing here is global.

use crate::domain::errors::CatalogError;
use crate::ports::outbound::ProviderCatalog;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Provider type identifiers known without a catalog file.
pub const BUILTIN_PROVIDER_TYPES: &[&str] = &[
    "physician",
    "advanced_practice_provider",
    "nursing",
    "nursing_support",
    "pharmacy",
    "dental",
    "behavioral_mental_health",
    "physical_rehabilitation",
    "occupational_therapy",
    "speech_language",
    "respiratory",
    "audiology",
    "vision_optometry",
    "radiology_imaging",
    "laboratory",
    "surgical",
    "emergency_prehospital",
    "nutrition_dietetics",
    "podiatry",
    "chiropractic",
    "midwifery",
    "genetic_counseling",
    "orthotics_prosthetics",
    "recreational_therapy",
    "creative_arts_therapy",
    "acupuncture_traditional_medicine",
    "massage_bodywork",
    "athletic_training",
    "sleep_medicine",
    "cardiac_vascular_diagnostics",
    "neurodiagnostics",
    "dialysis_nephrology",
    "wound_care",
    "sterile_processing",
    "health_information_coding",
    "community_public_health",
    "home_health_hospice",
    "patient_navigation",
    "lactation",
    "vision_rehabilitation",
    "deaf_hard_of_hearing",
    "anesthesia_technology",
    "clinical_research",
    "organ_tissue",
    "rehabilitation_engineering",
    "kinesiotherapy",
    "child_life",
    "medical_physics",
    "ophthalmic",
];

/// Actions every provider type shares.
pub const BUILTIN_ACTIONS: &[&str] = &[
    "chart.progress_note",
    "chart.communication",
    "educate.patient_education",
    "educate.discharge_instructions",
    "coordinate.referral",
    "coordinate.care_transition",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    provider_types: HashSet<String>,
    actions: HashSet<String>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    provider_types: Vec<CatalogItem>,
    #[serde(default)]
    actions: Vec<CatalogItem>,
}

#[derive(Deserialize)]
struct CatalogItem {
    id: String,
}

impl StaticCatalog {
    /// Catalog from explicit identifier lists.
    pub fn new<T, A>(provider_types: T, actions: A) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            provider_types: provider_types.into_iter().map(Into::into).collect(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// The built-in provider types and shared actions.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_PROVIDER_TYPES.iter().copied(),
            BUILTIN_ACTIONS.iter().copied(),
        )
    }

    /// Parse a catalog document. Items may carry other fields; only `id` is read.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        Self::parse(raw, "<inline>")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let catalog = Self::parse(&raw, &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            provider_types = catalog.provider_types.len(),
            actions = catalog.actions.len(),
            "loaded provider catalog"
        );
        Ok(catalog)
    }

    fn parse(raw: &str, origin: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw).map_err(|e| CatalogError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(
            file.provider_types.into_iter().map(|t| t.id),
            file.actions.into_iter().map(|a| a.id),
        ))
    }

    pub fn provider_type_count(&self) -> usize {
        self.provider_types.len()
    }
}

impl ProviderCatalog for StaticCatalog {
    fn type_exists(&self, type_id: &str) -> bool {
        self.provider_types.contains(type_id)
    }

    fn action_exists(&self, action_id: &str) -> bool {
        self.actions.contains(action_id)
    }
}
