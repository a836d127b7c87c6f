use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::eligibility::confidence_from_eligible;
use super::result::{round, Explanation, ModuleScore, Scored, SubscoreRow};
use super::tiering::{locate, Tier};
use super::weights::{HealthcareWeight, NormalizedWeights, Subweight, SubweightId};
use crate::model::{GeoMaps, Group, HealthcareFacts, SpecialistTreatment};

/// Default healthcare subweights: hospital and specialist weighted equally.
pub const DEFAULT_HEALTHCARE_SUBWEIGHTS: &[Subweight<HealthcareWeight>] = &[
    Subweight::new(HealthcareWeight::Hospital, 1.0),
    Subweight::new(HealthcareWeight::Specialist, 1.0),
];

#[derive(Debug, Clone)]
pub struct HealthcareInput<'a> {
    pub group: &'a Group,
    pub target_municipality_id: &'a str,
    pub geo: &'a GeoMaps,
    /// municipality id -> healthcare facts
    pub facilities: &'a BTreeMap<String, HealthcareFacts>,
    pub subweights: &'a [Subweight<HealthcareWeight>],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthcarePersonTrace {
    pub person_id: String,
    pub needs_hospital: bool,
    pub specialist_need: Option<SpecialistTreatment>,
    pub hospital_tier: Option<Tier>,
    pub hospital_score: Option<f64>,
    pub specialist_tier: Option<Tier>,
    pub specialist_score: Option<f64>,
    pub composite: f64,
    pub explanation: String,
}

/// Tiers resolved once per target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthcareTierCache {
    pub hospital: Tier,
    pub specialists: BTreeMap<SpecialistTreatment, Tier>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthcareResult {
    #[serde(flatten)]
    pub base: ModuleScore,
    pub subscores: Vec<SubscoreRow<HealthcareWeight>>,
    pub persons: Vec<HealthcarePersonTrace>,
    pub tiers: Option<HealthcareTierCache>,
}

impl Scored for HealthcareResult {
    fn summary(&self) -> &ModuleScore {
        &self.base
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Score hospital and specialist access for persons with healthcare needs.
///
/// Unlike connection and education, the group score is the mean of per-person
/// composites: each person's needed components are re-weighted among
/// themselves, so a person needing only a hospital is scored on the hospital
/// alone. The per-component averages are reported as subscores but do not
/// form the module score. Keep the two aggregations distinct.
pub fn score_healthcare(input: &HealthcareInput<'_>) -> HealthcareResult {
    let target = input.target_municipality_id;
    let weights = NormalizedWeights::from_configured(input.subweights);
    let w_hospital = weights.get(HealthcareWeight::Hospital);
    let w_specialist = weights.get(HealthcareWeight::Specialist);

    let persons_all = &input.group.persons;
    let persons: Vec<_> = persons_all
        .iter()
        .filter(|p| p.needs_hospital || p.specialist_need.is_some())
        .collect();

    if persons.is_empty() {
        let mut ex = Explanation::new();
        if persons_all.is_empty() {
            ex.line("No persons in the group. Score is 0. Max possible is 0.");
        } else {
            ex.line(
                "No persons with healthcare needs. Score is 0. Max possible is 0. Confidence is 0.",
            );
        }
        debug!(target_municipality = target, "healthcare: no persons with needs");
        return HealthcareResult {
            base: ModuleScore::no_signal(ex.finish()),
            subscores: weights
                .shares()
                .iter()
                .map(|s| SubscoreRow::from_share(s, 0.0))
                .collect(),
            persons: Vec::new(),
            tiers: None,
        };
    }

    let facts = |id: &str| input.facilities.get(id);
    let hospital_tier = locate(target, input.geo, |m| facts(m).is_some_and(|f| f.has_hospital));
    let mut specialist_tiers: BTreeMap<SpecialistTreatment, Tier> = BTreeMap::new();

    let mut traces = Vec::with_capacity(persons.len());
    for p in &persons {
        let hospital_score =
            (p.needs_hospital && w_hospital > 0.0).then(|| hospital_tier.facility_score());

        let specialist_tier = p.specialist_need.map(|treatment| {
            *specialist_tiers.entry(treatment).or_insert_with(|| {
                locate(target, input.geo, |m| {
                    facts(m).is_some_and(|f| f.specialist_facilities.contains(&treatment))
                })
            })
        });
        let specialist_score = specialist_tier
            .filter(|_| w_specialist > 0.0)
            .map(|t| t.facility_score());

        let mut components: Vec<(f64, f64)> = Vec::with_capacity(2);
        if let Some(s) = hospital_score {
            components.push((w_hospital, s));
        }
        if let Some(s) = specialist_score {
            components.push((w_specialist, s));
        }
        let person_weight: f64 = components.iter().map(|(w, _)| w).sum();
        let composite: f64 = if person_weight > 0.0 {
            components.iter().map(|(w, s)| w / person_weight * s).sum()
        } else {
            0.0
        };

        let mut ex = Explanation::new();
        ex.line(format!(
            "Needs: hospital={}, specialist={}",
            if p.needs_hospital { "yes" } else { "no" },
            p.specialist_need.map_or("none", |t| t.as_str())
        ));
        if p.needs_hospital {
            ex.line(format!(
                "Hospital tier {} scores {}",
                hospital_tier.as_str(),
                hospital_score.map_or_else(|| "n/a (weight 0)".to_string(), |s| s.to_string())
            ));
        }
        if let (Some(treatment), Some(tier)) = (p.specialist_need, specialist_tier) {
            ex.line(format!(
                "Specialist '{}' tier {} scores {}",
                treatment.as_str(),
                tier.as_str(),
                specialist_score.map_or_else(|| "n/a (weight 0)".to_string(), |s| s.to_string())
            ));
        }
        ex.line(format!("Person composite {}%", round(composite, 1)));

        traces.push(HealthcarePersonTrace {
            person_id: p.id.clone(),
            needs_hospital: p.needs_hospital,
            specialist_need: p.specialist_need,
            hospital_tier: p.needs_hospital.then_some(hospital_tier),
            hospital_score,
            specialist_tier,
            specialist_score,
            composite,
            explanation: ex.finish(),
        });
    }

    let hospital_scores: Vec<f64> = traces.iter().filter_map(|t| t.hospital_score).collect();
    let specialist_scores: Vec<f64> = traces.iter().filter_map(|t| t.specialist_score).collect();
    let avg_hospital = mean(&hospital_scores);
    let avg_specialist = mean(&specialist_scores);

    let subscores: Vec<SubscoreRow<HealthcareWeight>> = weights
        .shares()
        .iter()
        .map(|share| {
            let avg = match share.id {
                HealthcareWeight::Hospital => avg_hospital,
                HealthcareWeight::Specialist => avg_specialist,
            };
            SubscoreRow::from_share(share, avg)
        })
        .collect();

    let composites: Vec<f64> = traces.iter().map(|t| t.composite).collect();
    let group_score = mean(&composites);
    let confidence = confidence_from_eligible(traces.len());

    let mut ex = Explanation::new();
    ex.line("Healthcare score. Higher is better.")
        .line(format!("Persons included {} of {}.", traces.len(), persons_all.len()))
        .line(format!(
            "Subweights: {}",
            subscores
                .iter()
                .map(|r| format!("{} {}%", r.id.as_str(), round(r.normalized_weight * 100.0, 1)))
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .line(format!(
            "Average hospital {}%. Average specialist {}%",
            round(avg_hospital, 1),
            round(avg_specialist, 1)
        ))
        .line(format!(
            "Group score (mean of person composites) {}%",
            round(group_score, 1)
        ));

    debug!(target_municipality = target, persons = traces.len(), group_score, "healthcare scored");

    let mut base = ModuleScore::scored(group_score, ex.finish());
    base.confidence = Some(confidence);

    HealthcareResult {
        base,
        subscores,
        persons: traces,
        tiers: Some(HealthcareTierCache {
            hospital: hospital_tier,
            specialists: specialist_tiers,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Person, PersonType};
    use std::collections::BTreeSet;

    fn geo() -> GeoMaps {
        GeoMaps {
            municipality_region_map: BTreeMap::from([
                ("m1".to_string(), "r1".to_string()),
                ("m2".to_string(), "r1".to_string()),
                ("m3".to_string(), "r2".to_string()),
            ]),
            adjacency_map: BTreeMap::from([("m1".to_string(), vec!["m3".to_string()])]),
        }
    }

    fn facilities() -> BTreeMap<String, HealthcareFacts> {
        BTreeMap::from([
            (
                "m1".to_string(),
                HealthcareFacts {
                    has_hospital: false,
                    specialist_facilities: BTreeSet::from([SpecialistTreatment::Dialysis]),
                },
            ),
            (
                "m2".to_string(),
                HealthcareFacts {
                    has_hospital: false,
                    specialist_facilities: BTreeSet::from([SpecialistTreatment::Oncology]),
                },
            ),
            (
                "m3".to_string(),
                HealthcareFacts {
                    has_hospital: true,
                    specialist_facilities: BTreeSet::new(),
                },
            ),
        ])
    }

    fn run(group: &Group, subweights: &[Subweight<HealthcareWeight>]) -> HealthcareResult {
        let geo = geo();
        let facilities = facilities();
        score_healthcare(&HealthcareInput {
            group,
            target_municipality_id: "m1",
            geo: &geo,
            facilities: &facilities,
            subweights,
        })
    }

    #[test]
    fn test_composite_renormalizes_needed_components() {
        let group = Group::new(vec![Person::new("p1", PersonType::Senior)
            .needing_hospital()
            .with_specialist_need(SpecialistTreatment::Dialysis)]);
        let r = run(&group, DEFAULT_HEALTHCARE_SUBWEIGHTS);
        let person = &r.persons[0];
        assert_eq!(person.hospital_score, Some(50.0));
        assert_eq!(person.specialist_score, Some(100.0));
        assert!((person.composite - 75.0).abs() < 1e-9);
        assert!((r.base.effective_score - 75.0).abs() < 1e-9);
        assert_eq!(r.base.confidence, Some(1));
    }

    #[test]
    fn test_single_need_not_diluted() {
        let group = Group::new(vec![
            Person::new("p1", PersonType::AdultWorking).needing_hospital(),
            Person::new("p2", PersonType::Child)
                .with_specialist_need(SpecialistTreatment::Oncology),
        ]);
        let r = run(&group, DEFAULT_HEALTHCARE_SUBWEIGHTS);
        assert!((r.persons[0].composite - 50.0).abs() < 1e-9);
        // oncology only in m2, same region as m1
        assert_eq!(r.persons[1].specialist_tier, Some(Tier::Region));
        assert!((r.persons[1].composite - 25.0).abs() < 1e-9);
        assert!((r.base.effective_score - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_specialist_scores_zero() {
        let group = Group::new(vec![
            Person::new("p1", PersonType::Senior).with_specialist_need(SpecialistTreatment::Trauma)
        ]);
        let r = run(&group, DEFAULT_HEALTHCARE_SUBWEIGHTS);
        assert_eq!(r.persons[0].specialist_tier, Some(Tier::None));
        assert_eq!(r.base.effective_score, 0.0);
        assert_eq!(r.base.max_possible, 100.0);
    }

    #[test]
    fn test_no_needs_no_signal() {
        let group = Group::new(vec![Person::new("p1", PersonType::AdultWorking)]);
        let r = run(&group, DEFAULT_HEALTHCARE_SUBWEIGHTS);
        assert_eq!(r.base.confidence, Some(0));
        assert_eq!(r.base.max_possible, 0.0);
        assert!(r.persons.is_empty());
        assert!(r.tiers.is_none());
    }

    #[test]
    fn test_zero_weight_component_disabled() {
        let group = Group::new(vec![Person::new("p1", PersonType::Senior)
            .needing_hospital()
            .with_specialist_need(SpecialistTreatment::Dialysis)]);
        let r = run(
            &group,
            &[
                Subweight::new(HealthcareWeight::Hospital, 1.0),
                Subweight::new(HealthcareWeight::Specialist, 0.0),
            ],
        );
        assert_eq!(r.persons[0].specialist_score, None);
        assert!((r.persons[0].composite - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_tier_cache_reported() {
        let group = Group::new(vec![
            Person::new("p1", PersonType::Senior)
                .with_specialist_need(SpecialistTreatment::Dialysis),
            Person::new("p2", PersonType::Senior)
                .with_specialist_need(SpecialistTreatment::Dialysis),
        ]);
        let r = run(&group, DEFAULT_HEALTHCARE_SUBWEIGHTS);
        let tiers = r.tiers.unwrap();
        assert_eq!(tiers.hospital, Tier::Neighbor);
        assert_eq!(tiers.specialists.len(), 1);
        assert_eq!(tiers.specialists[&SpecialistTreatment::Dialysis], Tier::SelfMunicipality);
    }

    #[test]
    fn test_idempotent() {
        let group = Group::new(vec![
            Person::new("p1", PersonType::Senior)
                .needing_hospital()
                .with_specialist_need(SpecialistTreatment::Oncology),
            Person::new("p2", PersonType::Child)
                .with_specialist_need(SpecialistTreatment::Dialysis),
        ]);
        let a = run(&group, DEFAULT_HEALTHCARE_SUBWEIGHTS);
        let b = run(&group, DEFAULT_HEALTHCARE_SUBWEIGHTS);
        assert_eq!(a, b);
    }
}
