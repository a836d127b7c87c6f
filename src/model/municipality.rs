use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::person::{EducationFacility, SpecialistTreatment};

/// Settlement seat facts. `capacity_total` and `settled_current` are required
/// for scoring; the capacity scorer reports `missing_data` when they are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapacityFacts {
    #[serde(default)]
    pub capacity_total: Option<i64>,

    #[serde(default)]
    pub settled_current: Option<i64>,

    #[serde(default)]
    pub tentative_claim: Option<i64>,
}

/// Workforce history for one profession in one municipality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryEntry {
    /// Employees five years ago (P0, may be 0).
    #[serde(default)]
    pub employees_5y_ago: Option<f64>,

    /// Employees now (P1).
    #[serde(default)]
    pub employees_now: Option<f64>,

    /// Share of the municipality workforce five years ago, in percent.
    #[serde(default)]
    pub pct_workforce_5y_ago: Option<f64>,

    /// Share of the municipality workforce now, in percent.
    #[serde(default)]
    pub pct_workforce_now: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkFacts {
    /// Unemployment in percent, 0..=100.
    #[serde(default)]
    pub unemployment_rate: Option<f64>,

    #[serde(default)]
    pub profession_history: BTreeMap<String, HistoryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthcareFacts {
    #[serde(default)]
    pub has_hospital: bool,

    #[serde(default)]
    pub specialist_facilities: BTreeSet<SpecialistTreatment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EducationFacts {
    #[serde(default)]
    pub has_primary_school: bool,

    #[serde(default)]
    pub has_high_school: bool,

    #[serde(default)]
    pub has_university: bool,

    #[serde(default)]
    pub has_adult_language: bool,
}

impl EducationFacts {
    pub fn offers(&self, facility: EducationFacility) -> bool {
        match facility {
            EducationFacility::PrimarySchool => self.has_primary_school,
            EducationFacility::HighSchool => self.has_high_school,
            EducationFacility::University => self.has_university,
            EducationFacility::AdultLanguage => self.has_adult_language,
        }
    }
}

/// One municipality of a scenario dataset, holding the facts of every module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Municipality {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub neighbors: Vec<String>,

    #[serde(default)]
    pub capacity: CapacityFacts,

    #[serde(default)]
    pub work: WorkFacts,

    #[serde(default)]
    pub healthcare: HealthcareFacts,

    #[serde(default)]
    pub education: EducationFacts,
}

impl Municipality {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Geographic relations supplied with every tiered scoring call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoMaps {
    /// municipality id -> region id
    #[serde(default)]
    pub municipality_region_map: BTreeMap<String, String>,

    /// municipality id -> neighbouring municipality ids
    #[serde(default)]
    pub adjacency_map: BTreeMap<String, Vec<String>>,
}

impl GeoMaps {
    pub fn region_of(&self, municipality_id: &str) -> Option<&str> {
        self.municipality_region_map
            .get(municipality_id)
            .map(String::as_str)
    }

    pub fn neighbors_of(&self, municipality_id: &str) -> &[String] {
        self.adjacency_map
            .get(municipality_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Municipalities belonging to `region_id`, in id order.
    pub fn municipalities_in<'a>(
        &'a self,
        region_id: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.municipality_region_map
            .iter()
            .filter(move |(_, region)| region.as_str() == region_id)
            .map(|(id, _)| id.as_str())
    }
}
