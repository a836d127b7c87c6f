use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::result::{round, Direction, Explanation, ModuleScore, ScoreMode, Scored, SubscoreRow};
use super::weights::{CapacityWeight, NormalizedWeights, Subweight};
use crate::model::{CapacityFacts, Group};

/// Default capacity subweights: the single core criterion.
pub const DEFAULT_CAPACITY_SUBWEIGHTS: &[Subweight<CapacityWeight>] =
    &[Subweight::new(CapacityWeight::Core, 1.0)];

/// Capacity scoring switches.
///
/// ```yaml
/// capacity_options:
///   include_tentative: true   # subtract tentative claims from the available seats
///   allow_overflow: false     # score overflow as a penalty instead of 0
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapacityOptions {
    #[serde(default)]
    pub include_tentative: bool,

    #[serde(default)]
    pub allow_overflow: bool,
}

#[derive(Debug, Clone)]
pub struct CapacityInput<'a> {
    pub group: &'a Group,
    pub municipality: &'a CapacityFacts,
    pub options: CapacityOptions,
    pub subweights: &'a [Subweight<CapacityWeight>],
}

/// The core subscore row with the formula that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRow {
    #[serde(flatten)]
    pub row: SubscoreRow<CapacityWeight>,
    pub formula: String,
    pub values: BTreeMap<&'static str, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityResult {
    #[serde(flatten)]
    pub base: ModuleScore,
    pub capacity_score: f64,
    pub group_size: usize,
    pub allow_overflow: bool,
    pub include_tentative: bool,
    pub tentative_claim_used: i64,
    pub available_effect: i64,
    pub remaining_after: i64,
    pub overflow_units: i64,
    pub subscores: Vec<CapacityRow>,
}

impl Scored for CapacityResult {
    fn summary(&self) -> &ModuleScore {
        &self.base
    }
}

/// Score whether the group fits the municipality's remaining settlement seats.
///
/// - Feasible: `S = 100 × (AE − G) / AE`, higher is better.
/// - Overflow allowed: `S = 100 × Overflow / CT`, lower is better.
/// - Overflow disallowed: `S = 0`.
///
/// Missing `capacity_total`/`settled_current`, or a non-positive total, yields
/// `missing_data` with score, ceiling and confidence all 0.
pub fn score_capacity(input: &CapacityInput<'_>) -> CapacityResult {
    let group_size = input.group.effective_size();
    let CapacityOptions {
        include_tentative,
        allow_overflow,
    } = input.options;
    let weights = NormalizedWeights::from_configured(input.subweights);
    let core_share = weights.shares()[0];

    let facts = input.municipality;
    let (capacity_total, settled_current) = match (facts.capacity_total, facts.settled_current) {
        (Some(total), Some(settled)) if total > 0 => (total, settled),
        _ => {
            debug!(
                capacity_total = ?facts.capacity_total,
                settled_current = ?facts.settled_current,
                "capacity: missing required fields"
            );
            return missing_data(input, group_size, core_share.weight, core_share.normalized);
        }
    };

    let g = group_size as i64;
    let tc = if include_tentative {
        facts.tentative_claim.unwrap_or(0)
    } else {
        0
    };
    let available_effect = capacity_total - settled_current - tc;
    let remaining_after = available_effect - g;
    let mut overflow_units = 0;

    let (mode, direction, core_score, formula, values) = if available_effect >= g {
        let denom = if available_effect <= 0 { 1 } else { available_effect };
        let score = 100.0 * remaining_after.max(0) as f64 / denom as f64;
        (
            ScoreMode::Feasible,
            Direction::HigherBetter,
            score,
            "S_core = 100 × (AE − G) / AE",
            BTreeMap::from([
                ("AE", available_effect as f64),
                ("G", g as f64),
                ("AE_minus_G", remaining_after.max(0) as f64),
            ]),
        )
    } else if allow_overflow {
        overflow_units = (g - available_effect.max(0)).max(0);
        let score = 100.0 * overflow_units as f64 / capacity_total as f64;
        (
            ScoreMode::OverflowPenalty,
            Direction::LowerBetter,
            score,
            "S_core = 100 × Overflow / CT",
            BTreeMap::from([
                ("Overflow", overflow_units as f64),
                ("CT", capacity_total as f64),
            ]),
        )
    } else {
        (
            ScoreMode::Infeasible,
            Direction::HigherBetter,
            0.0,
            "S_core = 0 (infeasible; overflow disabled)",
            BTreeMap::from([("AE", available_effect as f64), ("G", g as f64)]),
        )
    };

    let row = SubscoreRow::from_share(&core_share, core_score);
    let capacity_score = row.contribution;
    let effective_score = capacity_score.clamp(0.0, 100.0);

    let mut ex = Explanation::new();
    ex.line(format!(
        "Mode is {} ({}). Allow overflow is {}, include tentative claim is {}.",
        mode.as_str(),
        direction.as_str(),
        allow_overflow,
        include_tentative
    ))
    .line(format!(
        "Inputs: group size {}, capacity total {}, already settled {}, tentative claim used {}.",
        group_size, capacity_total, settled_current, tc
    ))
    .line(format!(
        "Derived: available after adjustment {}, remaining after settlement {}, overflow units {}.",
        available_effect, remaining_after, overflow_units
    ))
    .line(format!(
        "capacity.core: normalized weight {} × {}% = {}%",
        round(row.normalized_weight, 3),
        round(core_score, 1),
        round(row.contribution, 1)
    ))
    .line(format!("Effective score {}%", round(effective_score, 1)));

    debug!(
        mode = mode.as_str(),
        available_effect, remaining_after, overflow_units, effective_score, "capacity scored"
    );

    CapacityResult {
        base: ModuleScore {
            effective_score,
            score: Some(capacity_score),
            max_possible: 100.0,
            confidence: Some(1),
            mode,
            direction,
            explanation: ex.finish(),
        },
        capacity_score,
        group_size,
        allow_overflow,
        include_tentative,
        tentative_claim_used: tc,
        available_effect,
        remaining_after,
        overflow_units,
        subscores: vec![CapacityRow {
            row,
            formula: formula.to_string(),
            values,
        }],
    }
}

fn missing_data(
    input: &CapacityInput<'_>,
    group_size: usize,
    weight: f64,
    normalized_weight: f64,
) -> CapacityResult {
    let facts = input.municipality;
    let show = |v: Option<i64>| v.map_or_else(|| "missing".to_string(), |n| n.to_string());

    let mut ex = Explanation::new();
    ex.line("Capacity: required data missing or invalid. Max possible is 0.")
        .line(format!(
            "capacity total is {}, already settled is {}",
            show(facts.capacity_total),
            show(facts.settled_current)
        ))
        .line(format!(
            "allow overflow is {}, include tentative claim is {}.",
            input.options.allow_overflow, input.options.include_tentative
        ));

    CapacityResult {
        base: ModuleScore::missing_data(ex.finish()),
        capacity_score: 0.0,
        group_size,
        allow_overflow: input.options.allow_overflow,
        include_tentative: input.options.include_tentative,
        tentative_claim_used: 0,
        available_effect: 0,
        remaining_after: 0,
        overflow_units: 0,
        subscores: vec![CapacityRow {
            row: SubscoreRow {
                id: CapacityWeight::Core,
                weight,
                normalized_weight,
                score: 0.0,
                contribution: 0.0,
            },
            formula: "Not computed (missing required fields).".to_string(),
            values: BTreeMap::new(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Person, PersonType};

    fn group_of(n: usize) -> Group {
        Group::new(
            (0..n)
                .map(|i| Person::new(format!("p{}", i), PersonType::AdultWorking))
                .collect(),
        )
    }

    fn facts(total: Option<i64>, settled: Option<i64>, tentative: Option<i64>) -> CapacityFacts {
        CapacityFacts {
            capacity_total: total,
            settled_current: settled,
            tentative_claim: tentative,
        }
    }

    fn score(group: &Group, facts: &CapacityFacts, options: CapacityOptions) -> CapacityResult {
        score_capacity(&CapacityInput {
            group,
            municipality: facts,
            options,
            subweights: DEFAULT_CAPACITY_SUBWEIGHTS,
        })
    }

    #[test]
    fn test_feasible_example() {
        let result = score(
            &group_of(2),
            &facts(Some(10), Some(0), None),
            CapacityOptions::default(),
        );
        assert_eq!(result.base.mode, ScoreMode::Feasible);
        assert_eq!(result.base.direction, Direction::HigherBetter);
        assert!((result.base.effective_score - 80.0).abs() < 1e-9);
        assert_eq!(result.base.max_possible, 100.0);
        assert_eq!(result.base.confidence, Some(1));
        assert_eq!(result.available_effect, 10);
        assert_eq!(result.remaining_after, 8);
    }

    #[test]
    fn test_feasible_scores_stay_in_range() {
        for total in 5..30 {
            for settled in 0..4 {
                for size in 0..4usize {
                    if total > settled + 1 + size as i64 {
                        let options = CapacityOptions {
                            include_tentative: true,
                            allow_overflow: false,
                        };
                        let r = score(
                            &group_of(size),
                            &facts(Some(total), Some(settled), Some(1)),
                            options,
                        );
                        assert_eq!(r.base.mode, ScoreMode::Feasible);
                        assert!(r.base.effective_score >= 0.0 && r.base.effective_score <= 100.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_missing_data() {
        for f in [
            facts(Some(0), Some(0), None),
            facts(Some(10), None, None),
            facts(None, Some(3), None),
        ] {
            let r = score(&group_of(2), &f, CapacityOptions::default());
            assert_eq!(r.base.mode, ScoreMode::MissingData);
            assert_eq!(r.base.max_possible, 0.0);
            assert_eq!(r.base.effective_score, 0.0);
            assert_eq!(r.base.confidence, Some(0));
            assert_eq!(r.subscores[0].formula, "Not computed (missing required fields).");
        }
    }

    #[test]
    fn test_tentative_claim_only_when_included() {
        let f = facts(Some(10), Some(2), Some(4));
        let excluded = score(&group_of(1), &f, CapacityOptions::default());
        assert_eq!(excluded.available_effect, 8);
        assert_eq!(excluded.tentative_claim_used, 0);

        let included = score(
            &group_of(1),
            &f,
            CapacityOptions {
                include_tentative: true,
                allow_overflow: false,
            },
        );
        assert_eq!(included.available_effect, 4);
        assert!((included.base.effective_score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_overflow_penalty() {
        let options = CapacityOptions {
            include_tentative: false,
            allow_overflow: true,
        };
        let r = score(&group_of(5), &facts(Some(20), Some(18), None), options);
        assert_eq!(r.base.mode, ScoreMode::OverflowPenalty);
        assert_eq!(r.base.direction, Direction::LowerBetter);
        assert_eq!(r.overflow_units, 3);
        assert!((r.base.effective_score - 15.0).abs() < 1e-9);
        assert_eq!(r.subscores[0].values["CT"], 20.0);
    }

    #[test]
    fn test_infeasible_without_overflow() {
        let r = score(&group_of(5), &facts(Some(20), Some(18), None), CapacityOptions::default());
        assert_eq!(r.base.mode, ScoreMode::Infeasible);
        assert_eq!(r.base.effective_score, 0.0);
        assert_eq!(r.base.confidence, Some(1));
        assert_eq!(r.base.max_possible, 100.0);
    }

    #[test]
    fn test_explicit_group_size_wins() {
        let group = Group {
            persons: vec![],
            size: Some(4),
        };
        let r = score(&group, &facts(Some(8), Some(0), None), CapacityOptions::default());
        assert_eq!(r.group_size, 4);
        assert!((r.base.effective_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let group = group_of(3);
        let f = facts(Some(12), Some(4), Some(2));
        let a = score(&group, &f, CapacityOptions::default());
        let b = score(&group, &f, CapacityOptions::default());
        assert_eq!(a, b);
    }
}
