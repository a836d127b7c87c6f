use serde::Serialize;
use std::collections::BTreeMap;

use super::result::{Direction, Scored};
use super::weights::{ModuleKind, ModuleWeights};

/// One module's share of the overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleContribution {
    pub normalized_weight: f64,
    /// Score used for totals; inverted for lower-is-better modules.
    pub impact: f64,
    pub contribution: f64,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub weighted_total: f64,
    pub overall_max_possible: f64,
    pub weights: BTreeMap<ModuleKind, f64>,
    pub contributions: BTreeMap<ModuleKind, ModuleContribution>,
}

impl Aggregate {
    pub fn empty() -> Self {
        Self {
            weighted_total: 0.0,
            overall_max_possible: 0.0,
            weights: BTreeMap::new(),
            contributions: BTreeMap::new(),
        }
    }
}

/// Combine the present module results into one weighted overall score.
///
/// Weights are normalized over the present modules only. A module reporting
/// `lower_better` (capacity in overflow-penalty mode) contributes
/// `100 − effective_score` so the total stays higher-is-better.
/// `overall_max_possible` is `Σ ŵ_m · confidence_m · 100`.
pub fn aggregate_overall<R: Scored>(
    results: &BTreeMap<ModuleKind, R>,
    weights: &ModuleWeights,
) -> Aggregate {
    let present: Vec<ModuleKind> = results.keys().copied().collect();
    let normalized = weights.normalized_over(&present);

    let mut weighted_total = 0.0;
    let mut overall_max_possible = 0.0;
    let mut contributions = BTreeMap::new();

    for (kind, result) in results {
        let summary = result.summary();
        let w = normalized.get(kind).copied().unwrap_or(0.0);
        let impact = match summary.direction {
            Direction::LowerBetter => 100.0 - summary.effective_score,
            Direction::HigherBetter => summary.effective_score,
        };
        let confidence = summary.effective_confidence();

        weighted_total += w * impact;
        overall_max_possible += w * f64::from(confidence) * 100.0;
        contributions.insert(
            *kind,
            ModuleContribution {
                normalized_weight: w,
                impact,
                contribution: w * impact,
                confidence,
            },
        );
    }

    Aggregate {
        weighted_total,
        overall_max_possible,
        weights: normalized,
        contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::result::{ModuleScore, ScoreMode};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn scored(score: f64) -> ModuleScore {
        ModuleScore::scored(score, String::new())
    }

    #[test]
    fn test_two_modules_equal_weight() {
        let results = BTreeMap::from([
            (ModuleKind::Capacity, scored(50.0)),
            (ModuleKind::WorkOpportunity, scored(80.0)),
        ]);
        let weights = ModuleWeights::new([
            (ModuleKind::Capacity, 1.0),
            (ModuleKind::WorkOpportunity, 1.0),
        ]);
        let agg = aggregate_overall(&results, &weights);
        assert!(approx(agg.weighted_total, 65.0));
        assert!(approx(agg.overall_max_possible, 100.0));
    }

    #[test]
    fn test_zero_confidence_lowers_ceiling() {
        let results = BTreeMap::from([
            (ModuleKind::Capacity, scored(50.0)),
            (ModuleKind::Connection, scored(80.0)),
            (ModuleKind::Education, ModuleScore::no_signal(String::new())),
        ]);
        let agg = aggregate_overall(&results, &ModuleWeights::equal());
        assert!((agg.overall_max_possible - 66.67).abs() < 0.01);
        assert!(approx(agg.weighted_total, 130.0 / 3.0));
        assert_eq!(agg.contributions[&ModuleKind::Education].confidence, 0);
    }

    #[test]
    fn test_lower_better_inverted() {
        let mut overflow = scored(15.0);
        overflow.mode = ScoreMode::OverflowPenalty;
        overflow.direction = Direction::LowerBetter;
        let results = BTreeMap::from([(ModuleKind::Capacity, overflow)]);
        let agg = aggregate_overall(&results, &ModuleWeights::equal());
        assert!(approx(agg.weighted_total, 85.0));
        assert!(approx(agg.contributions[&ModuleKind::Capacity].impact, 85.0));
    }

    #[test]
    fn test_weights_normalized_over_present_only() {
        let results = BTreeMap::from([(ModuleKind::Healthcare, scored(40.0))]);
        let weights = ModuleWeights::new([
            (ModuleKind::Healthcare, 1.0),
            (ModuleKind::Capacity, 9.0),
        ]);
        let agg = aggregate_overall(&results, &weights);
        assert!(approx(agg.weights[&ModuleKind::Healthcare], 1.0));
        assert!(approx(agg.weighted_total, 40.0));
    }

    #[test]
    fn test_missing_confidence_defaults_from_max_possible() {
        let mut implicit = scored(60.0);
        implicit.confidence = None;
        let mut empty = ModuleScore::no_signal(String::new());
        empty.confidence = None;
        let results = BTreeMap::from([
            (ModuleKind::Capacity, implicit),
            (ModuleKind::Education, empty),
        ]);
        let agg = aggregate_overall(&results, &ModuleWeights::equal());
        assert!(approx(agg.overall_max_possible, 50.0));
    }

    #[test]
    fn test_no_modules() {
        let results: BTreeMap<ModuleKind, ModuleScore> = BTreeMap::new();
        let agg = aggregate_overall(&results, &ModuleWeights::equal());
        assert_eq!(agg, Aggregate::empty());
    }
}
