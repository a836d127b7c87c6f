use super::{BuildIssue, BuildResult, IssueCode, ScenarioContext};
use crate::model::Municipality;
use crate::scoring::{CapacityInput, ConnectionInput, EducationInput, HealthcareInput, WorkInput};

fn lookup<'a, T>(
    ctx: &ScenarioContext<'a>,
    target: &str,
) -> Result<(usize, &'a Municipality), BuildResult<T>> {
    ctx.municipality(target).ok_or_else(|| {
        BuildResult::failed(vec![BuildIssue::error(
            IssueCode::NoMunicipality,
            format!("No municipality with id {}", target),
        )])
    })
}

pub fn build_capacity_input<'a>(
    ctx: &ScenarioContext<'a>,
    target: &str,
) -> BuildResult<CapacityInput<'a>> {
    let (i, m) = match lookup(ctx, target) {
        Ok(found) => found,
        Err(failed) => return failed,
    };
    let cap = &m.capacity;
    let mut issues = Vec::new();

    if cap.capacity_total.map_or(true, |t| t <= 0) {
        issues.push(
            BuildIssue::error(IssueCode::MissingCapacityTotal, "capacity_total must be > 0")
                .at(format!("municipalities[{}].capacity.capacity_total", i)),
        );
    }
    if cap.settled_current.map_or(true, |s| s < 0) {
        issues.push(
            BuildIssue::error(IssueCode::MissingSettledCurrent, "settled_current must be >= 0")
                .at(format!("municipalities[{}].capacity.settled_current", i)),
        );
    }
    if let (Some(total), Some(settled)) = (cap.capacity_total, cap.settled_current) {
        if settled > total {
            issues.push(
                BuildIssue::warn(
                    IssueCode::SettledGtTotal,
                    format!("{} settled exceeds total capacity {}", settled, total),
                )
                .at(format!("municipalities[{}].capacity", i)),
            );
        }
    }

    BuildResult::finish(
        CapacityInput {
            group: ctx.group,
            municipality: cap,
            options: ctx.weights.capacity_options,
            subweights: &ctx.weights.capacity,
        },
        issues,
    )
}

pub fn build_work_input<'a>(ctx: &ScenarioContext<'a>, target: &str) -> BuildResult<WorkInput<'a>> {
    let (i, m) = match lookup(ctx, target) {
        Ok(found) => found,
        Err(failed) => return failed,
    };
    let mut issues = Vec::new();

    if let Some(u) = m.work.unemployment_rate {
        if !(0.0..=100.0).contains(&u) {
            issues.push(
                BuildIssue::error(
                    IssueCode::InvalidUnemployment,
                    format!("unemployment_rate must be within 0..100, got {}", u),
                )
                .at(format!("municipalities[{}].work.unemployment_rate", i)),
            );
        }
    }

    BuildResult::finish(
        WorkInput {
            group: ctx.group,
            municipality: &m.work,
            subweights: &ctx.weights.work,
            normalization: &ctx.weights.growth_normalization,
        },
        issues,
    )
}

pub fn build_connection_input<'a>(
    ctx: &ScenarioContext<'a>,
    target: &str,
) -> BuildResult<ConnectionInput<'a>> {
    let (_, m) = match lookup(ctx, target) {
        Ok(found) => found,
        Err(failed) => return failed,
    };
    BuildResult::finish(
        ConnectionInput {
            group: ctx.group,
            target_municipality_id: &m.id,
            geo: &ctx.maps.geo,
            subweights: &ctx.weights.connection,
        },
        Vec::new(),
    )
}

pub fn build_healthcare_input<'a>(
    ctx: &ScenarioContext<'a>,
    target: &str,
) -> BuildResult<HealthcareInput<'a>> {
    let (_, m) = match lookup(ctx, target) {
        Ok(found) => found,
        Err(failed) => return failed,
    };
    BuildResult::finish(
        HealthcareInput {
            group: ctx.group,
            target_municipality_id: &m.id,
            geo: &ctx.maps.geo,
            facilities: &ctx.maps.healthcare,
            subweights: &ctx.weights.healthcare,
        },
        Vec::new(),
    )
}

pub fn build_education_input<'a>(
    ctx: &ScenarioContext<'a>,
    target: &str,
) -> BuildResult<EducationInput<'a>> {
    let (_, m) = match lookup(ctx, target) {
        Ok(found) => found,
        Err(failed) => return failed,
    };
    BuildResult::finish(
        EducationInput {
            group: ctx.group,
            target_municipality_id: &m.id,
            geo: &ctx.maps.geo,
            facilities: &ctx.maps.education,
            subweights: &ctx.weights.education,
        },
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CapacityFacts, Group, Person, PersonType, WorkFacts};
    use crate::scenario::{IssueLevel, ScenarioMaps};
    use crate::scoring::{ResolvedWeights, WeightsConfig};

    struct Fixture {
        group: Group,
        municipalities: Vec<Municipality>,
        weights: ResolvedWeights,
        maps: ScenarioMaps,
    }

    impl Fixture {
        fn new(municipalities: Vec<Municipality>) -> Self {
            let maps = ScenarioMaps::from_municipalities(&municipalities);
            Self {
                group: Group::new(vec![Person::new("p1", PersonType::AdultWorking)]),
                municipalities,
                weights: WeightsConfig::default().resolve(),
                maps,
            }
        }

        fn ctx(&self) -> ScenarioContext<'_> {
            ScenarioContext {
                group: &self.group,
                municipalities: &self.municipalities,
                weights: &self.weights,
                maps: &self.maps,
            }
        }
    }

    fn with_capacity(total: Option<i64>, settled: Option<i64>) -> Municipality {
        Municipality {
            id: "m1".to_string(),
            capacity: CapacityFacts {
                capacity_total: total,
                settled_current: settled,
                tentative_claim: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_capacity_missing_fields_are_errors() {
        let fx = Fixture::new(vec![with_capacity(None, None)]);
        let built = build_capacity_input(&fx.ctx(), "m1");
        assert!(built.input.is_none());
        let codes: Vec<IssueCode> = built.issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![IssueCode::MissingCapacityTotal, IssueCode::MissingSettledCurrent]
        );
        assert_eq!(
            built.issues[0].field_path.as_deref(),
            Some("municipalities[0].capacity.capacity_total")
        );
    }

    #[test]
    fn test_capacity_settled_above_total_warns() {
        let fx = Fixture::new(vec![with_capacity(Some(5), Some(7))]);
        let built = build_capacity_input(&fx.ctx(), "m1");
        let input = built.input.expect("warnings keep the input");
        assert!(input.options.include_tentative);
        assert_eq!(built.issues.len(), 1);
        assert_eq!(built.issues[0].level, IssueLevel::Warn);
        assert_eq!(built.issues[0].code, IssueCode::SettledGtTotal);
    }

    #[test]
    fn test_unknown_target() {
        let fx = Fixture::new(vec![with_capacity(Some(5), Some(1))]);
        let built = build_education_input(&fx.ctx(), "nowhere");
        assert!(built.input.is_none());
        assert_eq!(built.issues[0].code, IssueCode::NoMunicipality);
    }

    #[test]
    fn test_invalid_unemployment() {
        let m = Municipality {
            id: "m1".to_string(),
            work: WorkFacts {
                unemployment_rate: Some(140.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let fx = Fixture::new(vec![m]);
        let built = build_work_input(&fx.ctx(), "m1");
        assert!(built.input.is_none());
        assert_eq!(built.issues[0].code, IssueCode::InvalidUnemployment);
    }

    #[test]
    fn test_tiered_inputs_share_maps() {
        let fx = Fixture::new(vec![with_capacity(Some(5), Some(1))]);
        let ctx = fx.ctx();
        let conn = build_connection_input(&ctx, "m1").input.unwrap();
        assert_eq!(conn.target_municipality_id, "m1");
        assert_eq!(conn.subweights.len(), 5);
        let health = build_healthcare_input(&ctx, "m1").input.unwrap();
        assert!(health.facilities.contains_key("m1"));
    }
}
