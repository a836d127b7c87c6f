use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::eligibility::{allowed_education_need, confidence_from_eligible};
use super::result::{round, Explanation, ModuleScore, Scored, SubscoreRow};
use super::tiering::{locate, Tier};
use super::weights::{EducationWeight, NormalizedWeights, Subweight, SubweightId};
use crate::model::{EducationFacility, EducationFacts, GeoMaps, Group, PersonType};

/// Default education subweights: equal across the four facilities.
pub const DEFAULT_EDUCATION_SUBWEIGHTS: &[Subweight<EducationWeight>] = &[
    Subweight::new(EducationWeight::PrimarySchool, 1.0),
    Subweight::new(EducationWeight::HighSchool, 1.0),
    Subweight::new(EducationWeight::University, 1.0),
    Subweight::new(EducationWeight::AdultLanguage, 1.0),
];

#[derive(Debug, Clone)]
pub struct EducationInput<'a> {
    pub group: &'a Group,
    pub target_municipality_id: &'a str,
    pub geo: &'a GeoMaps,
    /// municipality id -> education facts
    pub facilities: &'a BTreeMap<String, EducationFacts>,
    pub subweights: &'a [Subweight<EducationWeight>],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationPersonTrace {
    pub person_id: String,
    pub person_type: PersonType,
    pub education_need: EducationFacility,
    pub tier: Option<Tier>,
    pub score: f64,
    /// False when the need is not allowed for the person type.
    pub counted: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EducationResult {
    #[serde(flatten)]
    pub base: ModuleScore,
    pub subscores: Vec<SubscoreRow<EducationWeight>>,
    pub persons: Vec<EducationPersonTrace>,
    /// Tier per facility needed by at least one counted person.
    pub tiers: BTreeMap<EducationFacility, Tier>,
    pub facility_counts: BTreeMap<EducationFacility, usize>,
}

impl Scored for EducationResult {
    fn summary(&self) -> &ModuleScore {
        &self.base
    }
}

/// Score access to the education facilities the group needs.
///
/// Each facility is averaged over the persons needing it, then facilities are
/// combined by normalized subweight: `score = Σ ŵ_f · avg_f`. A need that is
/// not in the person type's allow-list is traced but ignored.
pub fn score_education(input: &EducationInput<'_>) -> EducationResult {
    let target = input.target_municipality_id;
    let weights = NormalizedWeights::from_configured(input.subweights);
    let persons_all = &input.group.persons;

    let mut tiers: BTreeMap<EducationFacility, Tier> = BTreeMap::new();
    let mut sums: BTreeMap<EducationFacility, f64> = BTreeMap::new();
    let mut counts: BTreeMap<EducationFacility, usize> = BTreeMap::new();
    let mut traces = Vec::new();

    for p in persons_all {
        let Some(need) = p.education_need else {
            continue;
        };

        let mut ex = Explanation::new();
        ex.line(format!("Need: {}", need.as_str()));

        if !allowed_education_need(p.person_type, need) {
            ex.line(format!(
                "{} is not a valid need for {}; ignored.",
                need.as_str(),
                p.person_type.as_str()
            ));
            traces.push(EducationPersonTrace {
                person_id: p.id.clone(),
                person_type: p.person_type,
                education_need: need,
                tier: None,
                score: 0.0,
                counted: false,
                explanation: ex.finish(),
            });
            continue;
        }

        let tier = *tiers.entry(need).or_insert_with(|| {
            locate(target, input.geo, |m| {
                input.facilities.get(m).is_some_and(|f| f.offers(need))
            })
        });
        let score = tier.facility_score();
        *sums.entry(need).or_insert(0.0) += score;
        *counts.entry(need).or_insert(0) += 1;

        ex.line(format!("Tier {} scores {}", tier.as_str(), score));
        traces.push(EducationPersonTrace {
            person_id: p.id.clone(),
            person_type: p.person_type,
            education_need: need,
            tier: Some(tier),
            score,
            counted: true,
            explanation: ex.finish(),
        });
    }

    let included: usize = counts.values().sum();
    let subscores: Vec<SubscoreRow<EducationWeight>> = weights
        .shares()
        .iter()
        .map(|share| {
            let avg = EducationFacility::ALL
                .iter()
                .copied()
                .find(|f| EducationWeight::for_facility(*f) == share.id)
                .and_then(|f| counts.get(&f).map(|n| sums[&f] / *n as f64))
                .unwrap_or(0.0);
            SubscoreRow::from_share(share, avg)
        })
        .collect();

    let confidence = confidence_from_eligible(included);
    if confidence == 0 {
        let mut ex = Explanation::new();
        if persons_all.is_empty() {
            ex.line("No persons in the group. Score is 0. Max possible is 0.");
        } else {
            ex.line(
                "No persons with a valid education need. \
                 Score is 0. Max possible is 0. Confidence is 0.",
            );
        }
        debug!(target_municipality = target, "education: no persons with needs");
        return EducationResult {
            base: ModuleScore::no_signal(ex.finish()),
            subscores,
            persons: traces,
            tiers,
            facility_counts: counts,
        };
    }

    let score: f64 = subscores.iter().map(|r| r.contribution).sum();

    let mut ex = Explanation::new();
    ex.line("Education score. Higher is better.")
        .line(format!("Persons included {} of {}.", included, persons_all.len()))
        .line(format!(
            "Subweights: {}",
            subscores
                .iter()
                .map(|r| format!("{} {}%", r.id.as_str(), round(r.normalized_weight * 100.0, 1)))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .line(format!(
            "Average per facility: {}",
            subscores
                .iter()
                .map(|r| format!("{} {}", r.id.as_str(), round(r.score, 1)))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .line(format!("Weighted total {}%", round(score, 1)));

    debug!(target_municipality = target, included, score, "education scored");

    EducationResult {
        base: ModuleScore::scored(score, ex.finish()),
        subscores,
        persons: traces,
        tiers,
        facility_counts: counts,
    }
}
