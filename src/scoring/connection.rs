use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::eligibility::{allowed_relations, can_have_relation, confidence_from_eligible};
use super::result::{round, Explanation, ModuleScore, Scored, SubscoreRow};
use super::tiering::{locate, Tier};
use super::weights::{ConnectionWeight, NormalizedWeights, Subweight, SubweightId};
use crate::model::{
    ConnectionLocation, GeoMaps, Group, Person, PersonConnection, PersonType, Relation,
};

/// Default connection subweights: equal split over the five relations.
pub const DEFAULT_CONNECTION_SUBWEIGHTS: &[Subweight<ConnectionWeight>] = &[
    Subweight::new(ConnectionWeight::Friend, 1.0),
    Subweight::new(ConnectionWeight::CloseFamily, 1.0),
    Subweight::new(ConnectionWeight::Relative, 1.0),
    Subweight::new(ConnectionWeight::Workplace, 1.0),
    Subweight::new(ConnectionWeight::SchoolPlace, 1.0),
];

const EXACT_SCORE: f64 = 100.0;
const NEIGHBOR_SCORE: f64 = 50.0;
/// A declared municipality elsewhere in the target's region.
const SAME_REGION_SCORE: f64 = 10.0;

/// Base score when a declared region contains the target, by relation.
pub fn region_relation_base(relation: Relation) -> f64 {
    match relation {
        Relation::Friend => 10.0,
        Relation::CloseFamily => 75.0,
        Relation::Relative => 25.0,
        Relation::Workplace => 25.0,
        Relation::SchoolPlace => 25.0,
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionInput<'a> {
    pub group: &'a Group,
    pub target_municipality_id: &'a str,
    pub geo: &'a GeoMaps,
    pub subweights: &'a [Subweight<ConnectionWeight>],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
    Exact,
    Neighbor,
    Region,
    None,
}

impl MatchLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLevel::Exact => "exact",
            MatchLevel::Neighbor => "neighbor",
            MatchLevel::Region => "region",
            MatchLevel::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionPersonTrace {
    pub person_id: String,
    pub person_type: PersonType,
    pub relation: Option<Relation>,
    pub declared: Option<PersonConnection>,
    pub match_level: MatchLevel,
    pub base_score: f64,
    /// Whether this person enters the per-relation averages.
    pub counted: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionResult {
    #[serde(flatten)]
    pub base: ModuleScore,
    pub subscores: Vec<SubscoreRow<ConnectionWeight>>,
    pub persons: Vec<ConnectionPersonTrace>,
    pub relation_counts: BTreeMap<Relation, usize>,
}

impl Scored for ConnectionResult {
    fn summary(&self) -> &ModuleScore {
        &self.base
    }
}

struct Evaluation {
    match_level: MatchLevel,
    base_score: f64,
    counted: bool,
    reason: String,
}

impl Evaluation {
    fn none(reason: impl Into<String>) -> Self {
        Self {
            match_level: MatchLevel::None,
            base_score: 0.0,
            counted: false,
            reason: reason.into(),
        }
    }
}

fn evaluate_person(person: &Person, target: &str, geo: &GeoMaps) -> Evaluation {
    if allowed_relations(person.person_type).is_empty() {
        return Evaluation::none("Person type has no allowed relations; not eligible.");
    }
    let Some(declared) = person.connection.as_ref() else {
        return Evaluation::none("No connection declared.");
    };
    let Some(relation) = declared.relation else {
        return Evaluation::none("Relation not chosen yet.");
    };
    if !can_have_relation(person.person_type, relation) {
        return Evaluation::none(format!(
            "Relation {} is not allowed for this person type and is ignored.",
            relation.as_str()
        ));
    }

    match declared.location() {
        Some(ConnectionLocation::Municipality(declared_id)) => {
            let (match_level, base_score, reason) =
                match locate(target, geo, |m| m == declared_id) {
                    Tier::SelfMunicipality => (
                        MatchLevel::Exact,
                        EXACT_SCORE,
                        "Exact municipality match gives 100.",
                    ),
                    Tier::Neighbor => (
                        MatchLevel::Neighbor,
                        NEIGHBOR_SCORE,
                        "Neighbour municipality match gives 50.",
                    ),
                    Tier::Region => (
                        MatchLevel::Region,
                        SAME_REGION_SCORE,
                        "Same region but another municipality gives 10.",
                    ),
                    Tier::None => (
                        MatchLevel::None,
                        0.0,
                        "Municipality does not match the target, its neighbours or its region.",
                    ),
                };
            Evaluation {
                match_level,
                base_score,
                counted: true,
                reason: reason.to_string(),
            }
        }
        Some(ConnectionLocation::Region(region_id)) => {
            if geo.region_of(target) == Some(region_id) {
                let base_score = region_relation_base(relation);
                Evaluation {
                    match_level: MatchLevel::Region,
                    base_score,
                    counted: true,
                    reason: format!(
                        "Region match with relation {} gives {}.",
                        relation.as_str(),
                        base_score
                    ),
                }
            } else {
                Evaluation {
                    counted: true,
                    ..Evaluation::none(
                        "Region does not contain the target municipality and gives 0.",
                    )
                }
            }
        }
        None => Evaluation::none("Connection has no municipality or region."),
    }
}

fn describe_declared(declared: Option<&PersonConnection>) -> String {
    match declared.and_then(|d| d.location()) {
        Some(ConnectionLocation::Municipality(id)) => format!("municipality={}", id),
        Some(ConnectionLocation::Region(id)) => format!("region={}", id),
        None => "none".to_string(),
    }
}

/// Score geographic and relational affinity of the group to the target.
///
/// Each relation is averaged over the persons declaring it, then relations are
/// combined by normalized subweight: `score = Σ ŵ_r · avg_base_score_r`.
pub fn score_connection(input: &ConnectionInput<'_>) -> ConnectionResult {
    let target = input.target_municipality_id;
    let weights = NormalizedWeights::from_configured(input.subweights);
    let persons = &input.group.persons;

    let traces: Vec<ConnectionPersonTrace> = persons
        .iter()
        .map(|p| {
            let eval = evaluate_person(p, target, input.geo);
            let mut ex = Explanation::new();
            ex.line(format!("Declared: {}", describe_declared(p.connection.as_ref())))
                .line(&eval.reason)
                .line(format!(
                    "Match level {}. Base score {}",
                    eval.match_level.as_str(),
                    round(eval.base_score, 1)
                ));
            ConnectionPersonTrace {
                person_id: p.id.clone(),
                person_type: p.person_type,
                relation: p.connection.as_ref().and_then(|c| c.relation),
                declared: p.connection.clone(),
                match_level: eval.match_level,
                base_score: eval.base_score,
                counted: eval.counted,
                explanation: ex.finish(),
            }
        })
        .collect();

    let mut sums: BTreeMap<Relation, f64> = BTreeMap::new();
    let mut counts: BTreeMap<Relation, usize> = BTreeMap::new();
    for trace in traces.iter().filter(|t| t.counted) {
        if let Some(relation) = trace.relation {
            *sums.entry(relation).or_insert(0.0) += trace.base_score;
            *counts.entry(relation).or_insert(0) += 1;
        }
    }
    let contributors: usize = counts.values().sum();

    let subscores: Vec<SubscoreRow<ConnectionWeight>> = weights
        .shares()
        .iter()
        .map(|share| {
            let relation = Relation::ALL
                .iter()
                .copied()
                .find(|r| ConnectionWeight::for_relation(*r) == share.id);
            let avg = relation
                .and_then(|r| counts.get(&r).map(|n| sums[&r] / *n as f64))
                .unwrap_or(0.0);
            SubscoreRow::from_share(share, avg)
        })
        .collect();

    let confidence = confidence_from_eligible(contributors);
    if confidence == 0 {
        let reason = if persons.is_empty() {
            "No persons in the group. Score is 0. Max possible is 0."
        } else if persons
            .iter()
            .all(|p| allowed_relations(p.person_type).is_empty())
        {
            "No eligible persons for connection (no allowed relations). \
             Score is 0. Max possible is 0. Confidence is 0."
        } else {
            "No person declared a usable connection. \
             Score is 0. Max possible is 0. Confidence is 0."
        };
        debug!(target_municipality = target, "connection: no contributors");
        let mut ex = Explanation::new();
        ex.line(reason);
        return ConnectionResult {
            base: ModuleScore::no_signal(ex.finish()),
            subscores,
            persons: traces,
            relation_counts: counts,
        };
    }

    let score: f64 = subscores.iter().map(|r| r.contribution).sum();

    let mut ex = Explanation::new();
    ex.line("Connection score. Higher is better.")
        .line(format!(
            "Subweights: {}",
            subscores
                .iter()
                .map(|r| format!("{} {}%", r.id.as_str(), round(r.normalized_weight * 100.0, 1)))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .line(format!(
            "Average per relation: {}",
            subscores
                .iter()
                .map(|r| format!("{} {}", r.id.as_str(), round(r.score, 1)))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .line(format!(
            "Persons counted {} of {}. Weighted total {}%",
            contributors,
            persons.len(),
            round(score, 1)
        ));

    debug!(target_municipality = target, contributors, score, "connection scored");

    ConnectionResult {
        base: ModuleScore::scored(score, ex.finish()),
        subscores,
        persons: traces,
        relation_counts: counts,
    }
}
