mod growth;

pub use growth::{
    compute_thresholds, normalized_growth, AbsScale, AbsThreshold, Change, GrowthBreakdown,
    GrowthFactors, GrowthNormalization, Scenario, ShareScale, ShareThreshold, Thresholds,
};

use serde::Serialize;
use tracing::debug;

use super::eligibility::{confidence_from_eligible, is_work_eligible};
use super::result::{round, Explanation, ModuleScore, Scored, SubscoreRow};
use super::weights::{NormalizedWeights, Subweight, WorkWeight};
use crate::model::{Group, PersonType, WorkFacts};

/// Default work subweights: chance and growth split 50/50.
pub const DEFAULT_WORK_SUBWEIGHTS: &[Subweight<WorkWeight>] = &[
    Subweight::new(WorkWeight::Chance, 0.5),
    Subweight::new(WorkWeight::Growth, 0.5),
];

#[derive(Debug, Clone)]
pub struct WorkInput<'a> {
    pub group: &'a Group,
    pub municipality: &'a WorkFacts,
    pub subweights: &'a [Subweight<WorkWeight>],
    pub normalization: &'a GrowthNormalization,
}

/// Why a person's growth is what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthSource {
    NoProfession,
    NoHistory,
    Normalized,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkPersonTrace {
    pub person_id: String,
    pub person_type: PersonType,
    pub profession: Option<String>,
    pub eligible: bool,
    pub chance: f64,
    pub growth: f64,
    pub growth_source: Option<GrowthSource>,
    pub growth_detail: Option<GrowthBreakdown>,
    pub composite: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkResult {
    #[serde(flatten)]
    pub base: ModuleScore,
    /// Rows carry the mean chance and mean growth over eligible persons.
    pub subscores: Vec<SubscoreRow<WorkWeight>>,
    pub persons: Vec<WorkPersonTrace>,
    pub unemployment_rate: Option<f64>,
    pub thresholds: Option<Thresholds>,
    pub normalization: GrowthNormalization,
}

impl Scored for WorkResult {
    fn summary(&self) -> &ModuleScore {
        &self.base
    }
}

/// `C = clamp(100 − U, 0, 100)`, 0 when unemployment is unknown.
pub fn chance_from_unemployment(unemployment_rate: Option<f64>) -> f64 {
    unemployment_rate.map_or(0.0, |u| (100.0 - u).clamp(0.0, 100.0))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Score employment chance and profession growth for work-eligible persons.
///
/// Per person `S = ŵ_c · chance + ŵ_g · growth`; the group score is the mean
/// of `S` over eligible persons. Thresholds for growth normalization are
/// computed once per municipality over every profession in its history.
pub fn score_work(input: &WorkInput<'_>) -> WorkResult {
    let weights = NormalizedWeights::from_configured(input.subweights);
    let w_chance = weights.get(WorkWeight::Chance);
    let w_growth = weights.get(WorkWeight::Growth);

    let facts = input.municipality;
    let unemployment = facts.unemployment_rate;
    let thresholds = compute_thresholds(&facts.profession_history);
    let chance = chance_from_unemployment(unemployment);

    let persons = &input.group.persons;
    let traces: Vec<WorkPersonTrace> = persons
        .iter()
        .map(|p| {
            if !is_work_eligible(p.person_type) {
                let mut ex = Explanation::new();
                ex.line("Person type is not eligible for work opportunity.");
                return WorkPersonTrace {
                    person_id: p.id.clone(),
                    person_type: p.person_type,
                    profession: p.profession.clone(),
                    eligible: false,
                    chance: 0.0,
                    growth: 0.0,
                    growth_source: None,
                    growth_detail: None,
                    composite: 0.0,
                    explanation: ex.finish(),
                };
            }

            let (growth, source, detail) = match p.profession.as_deref() {
                None => (0.0, GrowthSource::NoProfession, None),
                Some(profession) => match facts.profession_history.get(profession) {
                    None => (0.0, GrowthSource::NoHistory, None),
                    Some(entry) => {
                        let breakdown =
                            normalized_growth(entry, thresholds.as_ref(), input.normalization);
                        let source = if breakdown.factors.is_some() {
                            GrowthSource::Normalized
                        } else {
                            GrowthSource::Fallback
                        };
                        (breakdown.growth, source, Some(breakdown))
                    }
                },
            };
            let composite = w_chance * chance + w_growth * growth;

            let mut ex = Explanation::new();
            ex.line(format!(
                "Chance is 100 minus unemployment {} giving {}%",
                unemployment.map_or_else(|| "not given".to_string(), |u| u.to_string()),
                round(chance, 1)
            ));
            match (source, detail.as_ref().and_then(|d| d.factors.as_ref())) {
                (GrowthSource::NoProfession, _) => {
                    ex.line("No profession given; growth is 0.");
                }
                (GrowthSource::NoHistory, _) => {
                    ex.line(format!(
                        "No history for profession {}; growth is 0.",
                        p.profession.as_deref().unwrap_or_default()
                    ));
                }
                (_, Some(f)) => {
                    ex.line(format!(
                        "Growth for {}: scenario {}, factor {} on {}% gives {}%",
                        p.profession.as_deref().unwrap_or_default(),
                        f.scenario_number,
                        round(f.f_total, 3),
                        round(detail.as_ref().map_or(0.0, |d| d.positive_pct), 1),
                        round(growth, 1)
                    ));
                }
                (_, None) => {
                    ex.line(format!(
                        "Growth for {} without comparable history: capped percentage {}%",
                        p.profession.as_deref().unwrap_or_default(),
                        round(growth, 1)
                    ));
                }
            }
            ex.line(format!(
                "Composite {}% × chance + {}% × growth = {}%",
                round(w_chance * 100.0, 1),
                round(w_growth * 100.0, 1),
                round(composite, 1)
            ));

            WorkPersonTrace {
                person_id: p.id.clone(),
                person_type: p.person_type,
                profession: p.profession.clone(),
                eligible: true,
                chance,
                growth,
                growth_source: Some(source),
                growth_detail: detail,
                composite,
                explanation: ex.finish(),
            }
        })
        .collect();

    let eligible = traces.iter().filter(|t| t.eligible).count();
    let eligible_mean =
        |f: fn(&WorkPersonTrace) -> f64| mean(traces.iter().filter(|t| t.eligible).map(f));

    let subscores: Vec<SubscoreRow<WorkWeight>> = weights
        .shares()
        .iter()
        .map(|share| {
            let avg = match share.id {
                WorkWeight::Chance => eligible_mean(|t| t.chance),
                WorkWeight::Growth => eligible_mean(|t| t.growth),
            };
            SubscoreRow::from_share(share, avg)
        })
        .collect();

    let confidence = confidence_from_eligible(eligible);
    let normalization = input.normalization.clone();
    if confidence == 0 {
        let mut ex = Explanation::new();
        ex.line(
            "No eligible persons for work opportunity. \
             Score is 0. Max possible is 0. Confidence is 0.",
        );
        debug!("work: no eligible persons");
        return WorkResult {
            base: ModuleScore::no_signal(ex.finish()),
            subscores,
            persons: traces,
            unemployment_rate: unemployment,
            thresholds,
            normalization,
        };
    }

    let group_score = eligible_mean(|t| t.composite);

    let mut ex = Explanation::new();
    ex.line("Work opportunity per person. Higher is better.")
        .line(format!(
            "Subweights chance {}% and growth {}%",
            round(w_chance * 100.0, 1),
            round(w_growth * 100.0, 1)
        ));
    match thresholds {
        Some(th) => ex.line(format!(
            "Thresholds: TH_abs {}, TH_pct {}, TH_share {}",
            round(th.th_abs, 2),
            round(th.th_pct, 2),
            round(th.th_share, 2)
        )),
        None => ex.line("Too little history for thresholds; growth uses capped percentages."),
    };
    ex.line(format!(
        "Eligible persons {} of {}. Group score is the mean of person scores: {}%",
        eligible,
        persons.len(),
        round(group_score, 1)
    ));

    debug!(eligible, group_score, "work scored");

    WorkResult {
        base: ModuleScore::scored(group_score, ex.finish()),
        subscores,
        persons: traces,
        unemployment_rate: unemployment,
        thresholds,
        normalization,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HistoryEntry, Person};
    use std::collections::BTreeMap;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn entry(p0: f64, p1: f64) -> HistoryEntry {
        HistoryEntry {
            employees_5y_ago: Some(p0),
            employees_now: Some(p1),
            ..Default::default()
        }
    }

    fn run(group: &Group, facts: &WorkFacts) -> WorkResult {
        let params = GrowthNormalization::default();
        score_work(&WorkInput {
            group,
            municipality: facts,
            subweights: DEFAULT_WORK_SUBWEIGHTS,
            normalization: &params,
        })
    }

    #[test]
    fn test_chance_from_unemployment() {
        assert_eq!(chance_from_unemployment(Some(4.0)), 96.0);
        assert_eq!(chance_from_unemployment(None), 0.0);
        assert_eq!(chance_from_unemployment(Some(120.0)), 0.0);
    }

    #[test]
    fn test_ineligible_group_no_signal() {
        let group = Group::new(vec![
            Person::new("b", PersonType::Baby),
            Person::new("s", PersonType::Senior),
        ]);
        let r = run(&group, &WorkFacts::default());
        assert_eq!(r.base.confidence, Some(0));
        assert_eq!(r.base.max_possible, 0.0);
        assert!(r.persons.iter().all(|t| !t.eligible));
    }

    #[test]
    fn test_full_unemployment_scores_zero_with_confidence() {
        let group = Group::new(vec![Person::new("a", PersonType::AdultNotWorking)]);
        let facts = WorkFacts {
            unemployment_rate: Some(100.0),
            ..Default::default()
        };
        let r = run(&group, &facts);
        assert_eq!(r.base.effective_score, 0.0);
        assert_eq!(r.base.confidence, Some(1));
        assert_eq!(r.base.max_possible, 100.0);
    }

    #[test]
    fn test_growth_fallback_single_history() {
        let group = Group::new(vec![
            Person::new("a", PersonType::AdultWorking).with_profession("nurse"),
            Person::new("c", PersonType::Child),
        ]);
        let facts = WorkFacts {
            unemployment_rate: Some(4.0),
            profession_history: BTreeMap::from([("nurse".to_string(), entry(100.0, 110.0))]),
        };
        let r = run(&group, &facts);
        assert!(r.thresholds.is_none());
        let person = &r.persons[0];
        assert_eq!(person.growth_source, Some(GrowthSource::Fallback));
        assert!(approx(person.growth, 10.0));
        assert!(approx(person.composite, 0.5 * 96.0 + 0.5 * 10.0));
        // child is traced but does not dilute the mean
        assert!(approx(r.base.effective_score, 53.0));
    }

    #[test]
    fn test_missing_profession_or_history() {
        let group = Group::new(vec![
            Person::new("a", PersonType::AdultWorking),
            Person::new("b", PersonType::Student).with_profession("pilot"),
        ]);
        let facts = WorkFacts {
            unemployment_rate: Some(10.0),
            profession_history: BTreeMap::from([("nurse".to_string(), entry(100.0, 110.0))]),
        };
        let r = run(&group, &facts);
        assert_eq!(r.persons[0].growth_source, Some(GrowthSource::NoProfession));
        assert_eq!(r.persons[1].growth_source, Some(GrowthSource::NoHistory));
        assert!(approx(r.base.effective_score, 45.0));
    }

    #[test]
    fn test_normalized_growth_used_with_history() {
        let group = Group::new(vec![
            Person::new("a", PersonType::AdultWorking).with_profession("flat")
        ]);
        let facts = WorkFacts {
            unemployment_rate: Some(0.0),
            profession_history: BTreeMap::from([
                ("big".to_string(), entry(1000.0, 1100.0)),
                ("tiny".to_string(), entry(2.0, 6.0)),
                ("flat".to_string(), entry(100.0, 102.0)),
                ("both".to_string(), entry(200.0, 400.0)),
                ("s1".to_string(), entry(50.0, 51.0)),
                ("s2".to_string(), entry(80.0, 81.0)),
            ]),
        };
        let r = run(&group, &facts);
        let person = &r.persons[0];
        assert_eq!(person.growth_source, Some(GrowthSource::Normalized));
        let detail = person.growth_detail.unwrap();
        assert_eq!(detail.factors.unwrap().scenario, Scenario::Ordinary);
        assert!(approx(person.growth, 4.0 / 7.0));
        assert!(approx(r.base.effective_score, 50.0 + 2.0 / 7.0));
    }

    #[test]
    fn test_subweights_shift_composite() {
        let group = Group::new(vec![
            Person::new("a", PersonType::AdultWorking).with_profession("nurse")
        ]);
        let facts = WorkFacts {
            unemployment_rate: Some(20.0),
            profession_history: BTreeMap::from([("nurse".to_string(), entry(100.0, 150.0))]),
        };
        let params = GrowthNormalization::default();
        let r = score_work(&WorkInput {
            group: &group,
            municipality: &facts,
            subweights: &[
                Subweight::new(WorkWeight::Chance, 3.0),
                Subweight::new(WorkWeight::Growth, 1.0),
            ],
            normalization: &params,
        });
        assert!(approx(r.base.effective_score, 0.75 * 80.0 + 0.25 * 50.0));
        assert!(approx(r.subscores[0].score, 80.0));
    }

    #[test]
    fn test_idempotent() {
        let group = Group::new(vec![
            Person::new("a", PersonType::AdultWorking).with_profession("nurse")
        ]);
        let facts = WorkFacts {
            unemployment_rate: Some(3.0),
            profession_history: BTreeMap::from([
                ("nurse".to_string(), entry(10.0, 14.0)),
                ("cook".to_string(), entry(30.0, 29.0)),
            ]),
        };
        assert_eq!(run(&group, &facts), run(&group, &facts));
    }
}
