//! Score every municipality of a dataset for one group and rank them.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::scenario::{
    build_capacity_input, build_connection_input, build_education_input, build_healthcare_input,
    build_work_input, BuildIssue, ScenarioContext,
};
use crate::scoring::{
    aggregate_overall, score_capacity, score_connection, score_education, score_healthcare,
    score_work, Aggregate, ModuleKind, ModuleResult, ModuleScore, Scored,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMunicipality {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub modules: BTreeMap<ModuleKind, ModuleResult>,
    pub aggregate: Aggregate,
    /// Enabled modules whose input could not be built.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_modules: Vec<ModuleKind>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<BuildIssue>,
}

impl RankedMunicipality {
    pub fn overall(&self) -> f64 {
        self.aggregate.weighted_total
    }

    /// Effective score of one module, if it was scored.
    pub fn module_score(&self, kind: ModuleKind) -> Option<f64> {
        self.modules.get(&kind).map(|r| r.summary().effective_score)
    }
}

/// Ranking key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Overall,
    Name,
    Module(ModuleKind),
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overall" | "score" => Ok(SortKey::Overall),
            "name" => Ok(SortKey::Name),
            other => ModuleKind::parse(other).map(SortKey::Module).ok_or_else(|| {
                format!(
                    "unknown sort key '{}' (expected overall, name, capacity, \
                     work_opportunity, connection, healthcare or education)",
                    s
                )
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Score one target with every enabled module and aggregate.
///
/// A module whose input cannot be built keeps its weight in the aggregate as
/// missing data, lowering `overall_max_possible`; its issues are kept on the
/// result. Returns `None` for an unknown target.
pub fn score_municipality(ctx: &ScenarioContext<'_>, target: &str) -> Option<RankedMunicipality> {
    let (_, municipality) = ctx.municipality(target)?;
    let mut modules = BTreeMap::new();
    let mut missing_modules = Vec::new();
    let mut issues = Vec::new();

    for kind in ctx.weights.modules.enabled() {
        let result = match kind {
            ModuleKind::Capacity => {
                let built = build_capacity_input(ctx, target);
                issues.extend(built.issues);
                built
                    .input
                    .map(|input| ModuleResult::Capacity(score_capacity(&input)))
            }
            ModuleKind::WorkOpportunity => {
                let built = build_work_input(ctx, target);
                issues.extend(built.issues);
                built
                    .input
                    .map(|input| ModuleResult::WorkOpportunity(score_work(&input)))
            }
            ModuleKind::Connection => {
                let built = build_connection_input(ctx, target);
                issues.extend(built.issues);
                built
                    .input
                    .map(|input| ModuleResult::Connection(score_connection(&input)))
            }
            ModuleKind::Healthcare => {
                let built = build_healthcare_input(ctx, target);
                issues.extend(built.issues);
                built
                    .input
                    .map(|input| ModuleResult::Healthcare(score_healthcare(&input)))
            }
            ModuleKind::Education => {
                let built = build_education_input(ctx, target);
                issues.extend(built.issues);
                built
                    .input
                    .map(|input| ModuleResult::Education(score_education(&input)))
            }
        };
        match result {
            Some(result) => {
                modules.insert(kind, result);
            }
            None => missing_modules.push(kind),
        }
    }

    for issue in &issues {
        warn!(municipality = target, "{}", issue);
    }

    let mut summaries: BTreeMap<ModuleKind, ModuleScore> = modules
        .iter()
        .map(|(kind, result)| (*kind, result.summary().clone()))
        .collect();
    for kind in &missing_modules {
        summaries.insert(
            *kind,
            ModuleScore::missing_data(format!(
                "• {} input could not be built; counted as missing data.",
                kind.as_str()
            )),
        );
    }

    let aggregate = aggregate_overall(&summaries, &ctx.weights.modules);
    debug!(
        municipality = target,
        modules = modules.len(),
        overall = aggregate.weighted_total,
        max_possible = aggregate.overall_max_possible,
        "municipality scored"
    );

    Some(RankedMunicipality {
        id: municipality.id.clone(),
        name: municipality.display_name().to_string(),
        region: municipality.region.clone(),
        modules,
        aggregate,
        missing_modules,
        issues,
    })
}

/// Score every municipality in dataset order.
pub fn rank_municipalities(ctx: &ScenarioContext<'_>) -> Vec<RankedMunicipality> {
    ctx.municipalities
        .iter()
        .filter_map(|m| score_municipality(ctx, &m.id))
        .collect()
}

/// Sort by `key` in `order`; ties break by name ascending.
/// Municipalities without a score for a module key sort last.
pub fn sort_ranked(ranked: &mut [RankedMunicipality], key: SortKey, order: SortOrder) {
    let directed = |ord: Ordering| match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    };

    ranked.sort_by(|a, b| {
        let primary = match key {
            SortKey::Overall => directed(a.overall().total_cmp(&b.overall())),
            SortKey::Name => directed(a.name.cmp(&b.name)),
            SortKey::Module(kind) => match (a.module_score(kind), b.module_score(kind)) {
                (Some(x), Some(y)) => directed(x.total_cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CapacityFacts, EducationFacility, EducationFacts, Group, Municipality, Person,
        PersonConnection, PersonType, Relation, WorkFacts,
    };
    use crate::scenario::ScenarioMaps;
    use crate::scoring::{ModuleWeights, ResolvedWeights, WeightsConfig};

    fn municipality(id: &str, name: &str, total: Option<i64>, unemployment: f64) -> Municipality {
        Municipality {
            id: id.to_string(),
            name: Some(name.to_string()),
            region: Some("r1".to_string()),
            capacity: CapacityFacts {
                capacity_total: total,
                settled_current: Some(0),
                tentative_claim: None,
            },
            work: WorkFacts {
                unemployment_rate: Some(unemployment),
                ..Default::default()
            },
            education: EducationFacts {
                has_primary_school: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn dataset() -> Vec<Municipality> {
        vec![
            municipality("m1", "Bergen", Some(10), 10.0),
            municipality("m2", "Askøy", Some(20), 4.0),
            municipality("m3", "Voss", None, 2.0),
        ]
    }

    fn group() -> Group {
        Group::new(vec![
            Person::new("a", PersonType::AdultWorking)
                .with_connection(PersonConnection::municipality("m1", Relation::CloseFamily)),
            Person::new("c", PersonType::Child)
                .with_education_need(EducationFacility::PrimarySchool),
        ])
    }

    fn rank_with(weights: ResolvedWeights) -> Vec<RankedMunicipality> {
        let municipalities = dataset();
        let maps = ScenarioMaps::from_municipalities(&municipalities);
        let group = group();
        let ctx = ScenarioContext {
            group: &group,
            municipalities: &municipalities,
            weights: &weights,
            maps: &maps,
        };
        rank_municipalities(&ctx)
    }

    #[test]
    fn test_all_municipalities_scored() {
        let ranked = rank_with(WeightsConfig::default().resolve());
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].modules.len(), 5);
        // missing capacity total leaves capacity out for m3
        assert!(!ranked[2].modules.contains_key(&ModuleKind::Capacity));
        assert!(!ranked[2].issues.is_empty());
        assert_eq!(ranked[2].modules.len(), 4);
        assert_eq!(ranked[2].missing_modules, vec![ModuleKind::Capacity]);
        assert!(ranked[2].aggregate.overall_max_possible < 100.0);
    }

    #[test]
    fn test_left_out_module_lowers_ceiling() {
        let mut full = municipality("full", "Full", Some(10), 50.0);
        full.capacity.settled_current = Some(9);
        let nocap = Municipality {
            capacity: CapacityFacts::default(),
            ..municipality("nocap", "Nocap", None, 50.0)
        };
        let municipalities = vec![full, nocap];
        let maps = ScenarioMaps::from_municipalities(&municipalities);
        let group = Group::new(vec![Person::new("a", PersonType::AdultWorking)]);
        let mut weights = WeightsConfig::default().resolve();
        weights.modules = ModuleWeights::new([
            (ModuleKind::Capacity, 1.0),
            (ModuleKind::WorkOpportunity, 1.0),
        ]);
        let ctx = ScenarioContext {
            group: &group,
            municipalities: &municipalities,
            weights: &weights,
            maps: &maps,
        };

        let ranked = rank_municipalities(&ctx);
        // full: capacity 0 (AE 1, G 1), work 25
        assert!((ranked[0].overall() - 12.5).abs() < 1e-9);
        assert!((ranked[0].aggregate.overall_max_possible - 100.0).abs() < 1e-9);
        assert!(ranked[0].missing_modules.is_empty());

        // nocap keeps capacity's half of the weight at 0
        let nocap = &ranked[1];
        assert!(!nocap.modules.contains_key(&ModuleKind::Capacity));
        assert_eq!(nocap.missing_modules, vec![ModuleKind::Capacity]);
        assert!((nocap.overall() - 12.5).abs() < 1e-9);
        assert!((nocap.aggregate.overall_max_possible - 50.0).abs() < 1e-9);
        let capacity = &nocap.aggregate.contributions[&ModuleKind::Capacity];
        assert!((capacity.normalized_weight - 0.5).abs() < 1e-9);
        assert_eq!(capacity.confidence, 0);

        let table = crate::output::format_ranked_table(
            &ranked,
            &weights.modules.enabled(),
            crate::output::Lang::En,
            false,
        );
        let row = table.lines().find(|l| l.contains("Nocap")).unwrap_or_default();
        assert!(row.contains("12.5*"));
        let row = table.lines().find(|l| l.contains("Full")).unwrap_or_default();
        assert!(!row.contains('*'));

        let detail =
            crate::output::format_municipality_detail(nocap, crate::output::Lang::En, false);
        assert!(detail.contains("Overall: 12.5 of max 50.0"));
        assert!(detail.contains("Capacity: - (weight 50%, missing_data)"));
    }

    #[test]
    fn test_zero_weight_module_skipped() {
        let mut weights = WeightsConfig::default().resolve();
        weights.modules = ModuleWeights::new([(ModuleKind::WorkOpportunity, 1.0)]);
        let ranked = rank_with(weights);
        for r in &ranked {
            assert_eq!(r.modules.len(), 1);
            assert!(r.modules.contains_key(&ModuleKind::WorkOpportunity));
        }
        // only the adult is work-eligible: chance 100 - U, growth 0, 50/50
        assert!((ranked[0].overall() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_sort_overall_desc() {
        let mut weights = WeightsConfig::default().resolve();
        weights.modules = ModuleWeights::new([(ModuleKind::WorkOpportunity, 1.0)]);
        let mut ranked = rank_with(weights);
        sort_ranked(&mut ranked, SortKey::Overall, SortOrder::Descending);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m2", "m1"]);
    }

    #[test]
    fn test_sort_ties_by_name() {
        let mut weights = WeightsConfig::default().resolve();
        weights.modules = ModuleWeights::new([(ModuleKind::Education, 1.0)]);
        let mut ranked = rank_with(weights);
        sort_ranked(&mut ranked, SortKey::Overall, SortOrder::Descending);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Askøy", "Bergen", "Voss"]);
    }

    #[test]
    fn test_sort_by_module_missing_last() {
        let mut ranked = rank_with(WeightsConfig::default().resolve());
        sort_ranked(&mut ranked, SortKey::Module(ModuleKind::Capacity), SortOrder::Ascending);
        assert_eq!(ranked.last().map(|r| r.id.as_str()), Some("m3"));
        sort_ranked(&mut ranked, SortKey::Module(ModuleKind::Capacity), SortOrder::Descending);
        assert_eq!(ranked.last().map(|r| r.id.as_str()), Some("m3"));
    }

    #[test]
    fn test_connection_prefers_declared_municipality() {
        let mut weights = WeightsConfig::default().resolve();
        weights.modules = ModuleWeights::new([(ModuleKind::Connection, 1.0)]);
        let mut ranked = rank_with(weights);
        sort_ranked(&mut ranked, SortKey::Overall, SortOrder::Descending);
        assert_eq!(ranked[0].id, "m1");
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("overall".parse::<SortKey>(), Ok(SortKey::Overall));
        assert_eq!(
            "healthcare".parse::<SortKey>(),
            Ok(SortKey::Module(ModuleKind::Healthcare))
        );
        assert!("stars".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_unknown_target_is_none() {
        let municipalities = dataset();
        let maps = ScenarioMaps::from_municipalities(&municipalities);
        let group = group();
        let weights = WeightsConfig::default().resolve();
        let ctx = ScenarioContext {
            group: &group,
            municipalities: &municipalities,
            weights: &weights,
            maps: &maps,
        };
        assert!(score_municipality(&ctx, "m9").is_none());
    }
}
