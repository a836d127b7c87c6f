use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::model::{EducationFacility, Relation};

/// Fixed per-module enumeration of subweight ids.
pub trait SubweightId: Copy + Eq + Ord + Debug + 'static {
    /// Every id of the module, in reporting order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
}

/// A raw, unnormalized weight for one sub-criterion of a module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subweight<K> {
    pub id: K,
    pub weight: f64,
}

impl<K> Subweight<K> {
    pub const fn new(id: K, weight: f64) -> Self {
        Self { id, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapacityWeight {
    #[serde(rename = "capacity.core")]
    Core,
}

impl SubweightId for CapacityWeight {
    const ALL: &'static [Self] = &[CapacityWeight::Core];

    fn as_str(&self) -> &'static str {
        "capacity.core"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkWeight {
    #[serde(rename = "work.chance")]
    Chance,
    #[serde(rename = "work.growth")]
    Growth,
}

impl SubweightId for WorkWeight {
    const ALL: &'static [Self] = &[WorkWeight::Chance, WorkWeight::Growth];

    fn as_str(&self) -> &'static str {
        match self {
            WorkWeight::Chance => "work.chance",
            WorkWeight::Growth => "work.growth",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConnectionWeight {
    #[serde(rename = "connection.friend")]
    Friend,
    #[serde(rename = "connection.close_family")]
    CloseFamily,
    #[serde(rename = "connection.relative")]
    Relative,
    #[serde(rename = "connection.workplace")]
    Workplace,
    #[serde(rename = "connection.school_place")]
    SchoolPlace,
}

impl ConnectionWeight {
    pub fn for_relation(relation: Relation) -> Self {
        match relation {
            Relation::Friend => ConnectionWeight::Friend,
            Relation::CloseFamily => ConnectionWeight::CloseFamily,
            Relation::Relative => ConnectionWeight::Relative,
            Relation::Workplace => ConnectionWeight::Workplace,
            Relation::SchoolPlace => ConnectionWeight::SchoolPlace,
        }
    }
}

impl SubweightId for ConnectionWeight {
    const ALL: &'static [Self] = &[
        ConnectionWeight::Friend,
        ConnectionWeight::CloseFamily,
        ConnectionWeight::Relative,
        ConnectionWeight::Workplace,
        ConnectionWeight::SchoolPlace,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ConnectionWeight::Friend => "connection.friend",
            ConnectionWeight::CloseFamily => "connection.close_family",
            ConnectionWeight::Relative => "connection.relative",
            ConnectionWeight::Workplace => "connection.workplace",
            ConnectionWeight::SchoolPlace => "connection.school_place",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthcareWeight {
    #[serde(rename = "healthcare.hospital")]
    Hospital,
    #[serde(rename = "healthcare.specialist")]
    Specialist,
}

impl SubweightId for HealthcareWeight {
    const ALL: &'static [Self] = &[HealthcareWeight::Hospital, HealthcareWeight::Specialist];

    fn as_str(&self) -> &'static str {
        match self {
            HealthcareWeight::Hospital => "healthcare.hospital",
            HealthcareWeight::Specialist => "healthcare.specialist",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationWeight {
    #[serde(rename = "education.primary_school")]
    PrimarySchool,
    #[serde(rename = "education.high_school")]
    HighSchool,
    #[serde(rename = "education.university")]
    University,
    #[serde(rename = "education.adult_language")]
    AdultLanguage,
}

impl EducationWeight {
    pub fn for_facility(facility: EducationFacility) -> Self {
        match facility {
            EducationFacility::PrimarySchool => EducationWeight::PrimarySchool,
            EducationFacility::HighSchool => EducationWeight::HighSchool,
            EducationFacility::University => EducationWeight::University,
            EducationFacility::AdultLanguage => EducationWeight::AdultLanguage,
        }
    }
}

impl SubweightId for EducationWeight {
    const ALL: &'static [Self] = &[
        EducationWeight::PrimarySchool,
        EducationWeight::HighSchool,
        EducationWeight::University,
        EducationWeight::AdultLanguage,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            EducationWeight::PrimarySchool => "education.primary_school",
            EducationWeight::HighSchool => "education.high_school",
            EducationWeight::University => "education.university",
            EducationWeight::AdultLanguage => "education.adult_language",
        }
    }
}

/// Normalize raw weights into shares summing to 1.
///
/// Non-positive and non-finite weights count as 0. If nothing positive remains
/// the shares fall back to a uniform split.
pub fn normalize_shares(raw: &[f64]) -> Vec<f64> {
    let cleaned: Vec<f64> = raw
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    let total: f64 = cleaned.iter().sum();
    if total <= 0.0 {
        let uniform = 1.0 / raw.len().max(1) as f64;
        return vec![uniform; raw.len()];
    }
    cleaned.iter().map(|w| w / total).collect()
}

/// One normalized subweight, keeping the raw weight for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightShare<K> {
    pub id: K,
    pub weight: f64,
    pub normalized: f64,
}

/// Subweights of one module normalized over every id of the module.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedWeights<K> {
    shares: Vec<WeightShare<K>>,
}

impl<K: SubweightId> NormalizedWeights<K> {
    /// Normalize the configured subweights of a module.
    ///
    /// An id missing from `configured` weighs 0; the first entry wins for
    /// duplicated ids. An empty list or one without any positive weight
    /// falls back to the module default, an equal split over all ids.
    pub fn from_configured(configured: &[Subweight<K>]) -> Self {
        let raw: Vec<f64> = K::ALL
            .iter()
            .map(|id| {
                configured
                    .iter()
                    .find(|sw| sw.id == *id)
                    .map(|sw| sw.weight)
                    .unwrap_or(0.0)
            })
            .collect();

        let has_positive = raw.iter().any(|w| w.is_finite() && *w > 0.0);
        let raw = if has_positive { raw } else { vec![1.0; K::ALL.len()] };
        let normalized = normalize_shares(&raw);

        let shares = K::ALL
            .iter()
            .zip(raw.iter().zip(normalized))
            .map(|(id, (weight, normalized))| WeightShare {
                id: *id,
                weight: *weight,
                normalized,
            })
            .collect();

        Self { shares }
    }

    pub fn get(&self, id: K) -> f64 {
        self.shares
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.normalized)
            .unwrap_or(0.0)
    }

    pub fn shares(&self) -> &[WeightShare<K>] {
        &self.shares
    }
}

/// Scoring modules combined by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Capacity,
    WorkOpportunity,
    Connection,
    Healthcare,
    Education,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Capacity,
        ModuleKind::WorkOpportunity,
        ModuleKind::Connection,
        ModuleKind::Healthcare,
        ModuleKind::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Capacity => "capacity",
            ModuleKind::WorkOpportunity => "work_opportunity",
            ModuleKind::Connection => "connection",
            ModuleKind::Healthcare => "healthcare",
            ModuleKind::Education => "education",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "capacity" => Some(ModuleKind::Capacity),
            "work_opportunity" | "workopportunity" | "work" => Some(ModuleKind::WorkOpportunity),
            "connection" => Some(ModuleKind::Connection),
            "healthcare" => Some(ModuleKind::Healthcare),
            "education" => Some(ModuleKind::Education),
            _ => None,
        }
    }
}

/// Top-level weight per module. Missing modules weigh 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleWeights(pub BTreeMap<ModuleKind, f64>);

impl ModuleWeights {
    pub fn new(weights: impl IntoIterator<Item = (ModuleKind, f64)>) -> Self {
        Self(weights.into_iter().collect())
    }

    /// Every module weighted equally.
    pub fn equal() -> Self {
        Self::new(ModuleKind::ALL.iter().map(|k| (*k, 1.0)))
    }

    pub fn get(&self, kind: ModuleKind) -> f64 {
        self.0.get(&kind).copied().unwrap_or(0.0)
    }

    /// Modules with a positive weight, in module order.
    pub fn enabled(&self) -> Vec<ModuleKind> {
        ModuleKind::ALL
            .iter()
            .copied()
            .filter(|k| self.get(*k) > 0.0)
            .collect()
    }

    /// Normalize over `present` modules only (uniform when none is positive).
    pub fn normalized_over(&self, present: &[ModuleKind]) -> BTreeMap<ModuleKind, f64> {
        let raw: Vec<f64> = present.iter().map(|k| self.get(*k)).collect();
        present
            .iter()
            .copied()
            .zip(normalize_shares(&raw))
            .collect()
    }
}

impl Default for ModuleWeights {
    fn default() -> Self {
        Self::equal()
    }
}
