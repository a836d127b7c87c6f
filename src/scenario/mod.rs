//! Input envelope construction from a scenario dataset.
//!
//! Derives the geographic and facility maps once per dataset and builds one
//! scorer input per module for a target municipality. Problems are reported
//! as [`BuildIssue`]s; a module with error-level issues is not scored.

mod builders;

pub use builders::{
    build_capacity_input, build_connection_input, build_education_input, build_healthcare_input,
    build_work_input,
};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::{EducationFacts, GeoMaps, Group, HealthcareFacts, Municipality};
use crate::scoring::ResolvedWeights;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Error,
    Warn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    NoMunicipality,
    MissingCapacityTotal,
    MissingSettledCurrent,
    SettledGtTotal,
    InvalidUnemployment,
    UnknownNeighbor,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::NoMunicipality => "NO_MUNICIPALITY",
            IssueCode::MissingCapacityTotal => "MISSING_CAPACITY_TOTAL",
            IssueCode::MissingSettledCurrent => "MISSING_SETTLED_CURRENT",
            IssueCode::SettledGtTotal => "SETTLED_GT_TOTAL",
            IssueCode::InvalidUnemployment => "INVALID_UNEMPLOYMENT",
            IssueCode::UnknownNeighbor => "UNKNOWN_NEIGHBOR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildIssue {
    pub code: IssueCode,
    pub level: IssueLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,
}

impl BuildIssue {
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            level: IssueLevel::Error,
            message: message.into(),
            field_path: None,
        }
    }

    pub fn warn(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            level: IssueLevel::Warn,
            message: message.into(),
            field_path: None,
        }
    }

    pub fn at(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = Some(field_path.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == IssueLevel::Error
    }
}

impl fmt::Display for BuildIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            IssueLevel::Error => "error",
            IssueLevel::Warn => "warn",
        };
        write!(f, "{} {}: {}", level, self.code.as_str(), self.message)?;
        if let Some(ref path) = self.field_path {
            write!(f, " ({})", path)?;
        }
        Ok(())
    }
}

/// Input of one module plus the issues found while building it.
#[derive(Debug, Clone)]
pub struct BuildResult<T> {
    pub input: Option<T>,
    pub issues: Vec<BuildIssue>,
}

impl<T> BuildResult<T> {
    /// Drop the input when any issue is an error.
    pub(crate) fn finish(input: T, issues: Vec<BuildIssue>) -> Self {
        if issues.iter().any(BuildIssue::is_error) {
            Self {
                input: None,
                issues,
            }
        } else {
            Self {
                input: Some(input),
                issues,
            }
        }
    }

    pub(crate) fn failed(issues: Vec<BuildIssue>) -> Self {
        Self {
            input: None,
            issues,
        }
    }
}

/// Maps derived once per municipality dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioMaps {
    pub geo: GeoMaps,
    pub healthcare: BTreeMap<String, HealthcareFacts>,
    pub education: BTreeMap<String, EducationFacts>,
    /// Neighbour references that were dropped.
    pub issues: Vec<BuildIssue>,
}

impl ScenarioMaps {
    /// Municipalities without a region are left out of the region map;
    /// neighbour ids not present in the dataset are dropped with a warning.
    pub fn from_municipalities(municipalities: &[Municipality]) -> Self {
        let known: BTreeSet<&str> = municipalities.iter().map(|m| m.id.as_str()).collect();
        let mut maps = ScenarioMaps::default();

        for (i, m) in municipalities.iter().enumerate() {
            if let Some(ref region) = m.region {
                maps.geo
                    .municipality_region_map
                    .insert(m.id.clone(), region.clone());
            }

            let mut neighbors = Vec::with_capacity(m.neighbors.len());
            for (j, n) in m.neighbors.iter().enumerate() {
                if known.contains(n.as_str()) {
                    neighbors.push(n.clone());
                } else {
                    maps.issues.push(
                        BuildIssue::warn(
                            IssueCode::UnknownNeighbor,
                            format!("{} lists unknown neighbour {}", m.id, n),
                        )
                        .at(format!("municipalities[{}].neighbors[{}]", i, j)),
                    );
                }
            }
            maps.geo.adjacency_map.insert(m.id.clone(), neighbors);

            maps.healthcare.insert(m.id.clone(), m.healthcare.clone());
            maps.education.insert(m.id.clone(), m.education.clone());
        }

        maps
    }
}

/// Everything the builders read, borrowed from a loaded scenario.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioContext<'a> {
    pub group: &'a Group,
    pub municipalities: &'a [Municipality],
    pub weights: &'a ResolvedWeights,
    pub maps: &'a ScenarioMaps,
}

impl<'a> ScenarioContext<'a> {
    pub fn municipality(&self, id: &str) -> Option<(usize, &'a Municipality)> {
        self.municipalities.iter().enumerate().find(|(_, m)| m.id == id)
    }
}
