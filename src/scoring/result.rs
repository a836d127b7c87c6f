use serde::Serialize;

use super::capacity::CapacityResult;
use super::connection::ConnectionResult;
use super::education::EducationResult;
use super::healthcare::HealthcareResult;
use super::weights::{ModuleKind, SubweightId, WeightShare};
use super::work::WorkResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    Feasible,
    OverflowPenalty,
    Infeasible,
    MissingData,
}

impl ScoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreMode::Feasible => "feasible",
            ScoreMode::OverflowPenalty => "overflow_penalty",
            ScoreMode::Infeasible => "infeasible",
            ScoreMode::MissingData => "missing_data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::HigherBetter => "higher_better",
            Direction::LowerBetter => "lower_better",
        }
    }
}

/// Fields shared by every module result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleScore {
    pub effective_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub max_possible: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    pub mode: ScoreMode,
    pub direction: Direction,
    /// One bullet line per decision point.
    pub explanation: String,
}

impl ModuleScore {
    /// A scored, confident, higher-is-better result.
    pub fn scored(score: f64, explanation: String) -> Self {
        Self {
            effective_score: score,
            score: Some(score),
            max_possible: 100.0,
            confidence: Some(1),
            mode: ScoreMode::Feasible,
            direction: Direction::HigherBetter,
            explanation,
        }
    }

    /// No scorable signal: score 0, ceiling 0, confidence 0.
    pub fn no_signal(explanation: String) -> Self {
        Self {
            effective_score: 0.0,
            score: Some(0.0),
            max_possible: 0.0,
            confidence: Some(0),
            mode: ScoreMode::Feasible,
            direction: Direction::HigherBetter,
            explanation,
        }
    }

    /// Required facts missing: score, ceiling and confidence all 0.
    pub fn missing_data(explanation: String) -> Self {
        Self {
            mode: ScoreMode::MissingData,
            ..Self::no_signal(explanation)
        }
    }

    /// Reported confidence, or 1 when absent and the module has a positive ceiling.
    pub fn effective_confidence(&self) -> u8 {
        self.confidence
            .unwrap_or(if self.max_possible > 0.0 { 1 } else { 0 })
    }
}

/// One sub-criterion line of a module result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscoreRow<K> {
    pub id: K,
    pub weight: f64,
    pub normalized_weight: f64,
    pub score: f64,
    pub contribution: f64,
}

impl<K: SubweightId> SubscoreRow<K> {
    pub fn from_share(share: &WeightShare<K>, score: f64) -> Self {
        Self {
            id: share.id,
            weight: share.weight,
            normalized_weight: share.normalized,
            score,
            contribution: share.normalized * score,
        }
    }
}

/// Bullet-line builder for result explanations.
#[derive(Debug, Default)]
pub struct Explanation {
    lines: Vec<String>,
}

impl Explanation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.lines.push(format!("• {}", text.as_ref()));
        self
    }

    pub fn finish(&self) -> String {
        self.lines.join("\n")
    }
}

/// Round for display in explanation text.
pub(crate) fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Access to the shared base of a module result.
pub trait Scored {
    fn summary(&self) -> &ModuleScore;
}

/// Result of any one module, tagged by module kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "module", rename_all = "snake_case")]
pub enum ModuleResult {
    Capacity(CapacityResult),
    WorkOpportunity(WorkResult),
    Connection(ConnectionResult),
    Healthcare(HealthcareResult),
    Education(EducationResult),
}

impl ModuleResult {
    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleResult::Capacity(_) => ModuleKind::Capacity,
            ModuleResult::WorkOpportunity(_) => ModuleKind::WorkOpportunity,
            ModuleResult::Connection(_) => ModuleKind::Connection,
            ModuleResult::Healthcare(_) => ModuleKind::Healthcare,
            ModuleResult::Education(_) => ModuleKind::Education,
        }
    }
}

impl Scored for ModuleResult {
    fn summary(&self) -> &ModuleScore {
        match self {
            ModuleResult::Capacity(r) => &r.base,
            ModuleResult::WorkOpportunity(r) => &r.base,
            ModuleResult::Connection(r) => &r.base,
            ModuleResult::Healthcare(r) => &r.base,
            ModuleResult::Education(r) => &r.base,
        }
    }
}

impl Scored for ModuleScore {
    fn summary(&self) -> &ModuleScore {
        self
    }
}
