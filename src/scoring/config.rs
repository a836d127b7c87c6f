use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use super::capacity::CapacityOptions;
use super::templates::{default_template, template_by_id, WeightTemplate, DEFAULT_TEMPLATE_ID};
use super::weights::{
    CapacityWeight, ConnectionWeight, EducationWeight, HealthcareWeight, ModuleKind,
    ModuleWeights, NormalizedWeights, Subweight, SubweightId, WorkWeight,
};
use super::work::GrowthNormalization;

/// Weighting section of a scenario.
///
/// Starts from a template (default `standard`); anything given explicitly
/// overrides it. Module weights merge per module, subweight lists replace the
/// template's list for that module.
///
/// Example YAML:
/// ```yaml
/// weights:
///   template: health_focus
///   modules:
///     capacity: 20
///     education: 0        # disables the module
///   connection:
///     - { id: connection.close_family, weight: 3 }
///     - { id: connection.friend, weight: 1 }
///   capacity_options:
///     allow_overflow: true
///   growth_normalization:
///     damp_s4: 0.3
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightsConfig {
    /// Template id: standard, unaccompanied_minors or health_focus
    #[serde(default)]
    pub template: Option<String>,

    /// Top-level module weights; modules left out keep the template weight
    #[serde(default)]
    pub modules: BTreeMap<ModuleKind, f64>,

    #[serde(default)]
    pub capacity: Option<Vec<Subweight<CapacityWeight>>>,

    #[serde(default)]
    pub work: Option<Vec<Subweight<WorkWeight>>>,

    #[serde(default)]
    pub connection: Option<Vec<Subweight<ConnectionWeight>>>,

    #[serde(default)]
    pub healthcare: Option<Vec<Subweight<HealthcareWeight>>>,

    #[serde(default)]
    pub education: Option<Vec<Subweight<EducationWeight>>>,

    #[serde(default)]
    pub capacity_options: Option<CapacityOptions>,

    #[serde(default)]
    pub growth_normalization: Option<GrowthNormalization>,
}

/// Weights after applying the template and overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWeights {
    pub template_id: String,
    pub modules: ModuleWeights,
    pub capacity: Vec<Subweight<CapacityWeight>>,
    pub work: Vec<Subweight<WorkWeight>>,
    pub connection: Vec<Subweight<ConnectionWeight>>,
    pub healthcare: Vec<Subweight<HealthcareWeight>>,
    pub education: Vec<Subweight<EducationWeight>>,
    pub capacity_options: CapacityOptions,
    pub growth_normalization: GrowthNormalization,
}

impl WeightsConfig {
    fn template(&self) -> &'static WeightTemplate {
        match self.template.as_deref() {
            None => default_template(),
            Some(id) => template_by_id(id).unwrap_or_else(|| {
                warn!(template = id, "unknown weight template, using {}", DEFAULT_TEMPLATE_ID);
                default_template()
            }),
        }
    }

    pub fn resolve(&self) -> ResolvedWeights {
        let template = self.template();

        let mut modules = template.module_weights();
        for (kind, weight) in &self.modules {
            modules.0.insert(*kind, *weight);
        }

        ResolvedWeights {
            template_id: template.id.to_string(),
            modules,
            capacity: self.capacity.clone().unwrap_or_else(|| template.capacity.to_vec()),
            work: self.work.clone().unwrap_or_else(|| template.work.to_vec()),
            connection: self
                .connection
                .clone()
                .unwrap_or_else(|| template.connection.to_vec()),
            healthcare: self
                .healthcare
                .clone()
                .unwrap_or_else(|| template.healthcare.to_vec()),
            education: self
                .education
                .clone()
                .unwrap_or_else(|| template.education.to_vec()),
            capacity_options: self.capacity_options.unwrap_or(template.capacity_options),
            growth_normalization: self.growth_normalization.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightExport {
    pub id: &'static str,
    pub weight: f64,
    pub normalized: f64,
}

/// Snapshot of the effective weighting, raw and normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightConfiguration {
    pub generated_at: DateTime<Utc>,
    pub template: String,
    pub modules: Vec<WeightExport>,
    pub subweights: BTreeMap<ModuleKind, Vec<WeightExport>>,
    pub capacity_options: CapacityOptions,
    pub growth_normalization: GrowthNormalization,
}

fn export_subweights<K: SubweightId>(configured: &[Subweight<K>]) -> Vec<WeightExport> {
    NormalizedWeights::from_configured(configured)
        .shares()
        .iter()
        .map(|s| WeightExport {
            id: s.id.as_str(),
            weight: s.weight,
            normalized: s.normalized,
        })
        .collect()
}

impl ResolvedWeights {
    pub fn export(&self, generated_at: DateTime<Utc>) -> WeightConfiguration {
        let normalized = self.modules.normalized_over(&ModuleKind::ALL);
        let modules = ModuleKind::ALL
            .iter()
            .map(|kind| WeightExport {
                id: kind.as_str(),
                weight: self.modules.get(*kind),
                normalized: normalized.get(kind).copied().unwrap_or(0.0),
            })
            .collect();

        let subweights = BTreeMap::from([
            (ModuleKind::Capacity, export_subweights(&self.capacity)),
            (ModuleKind::WorkOpportunity, export_subweights(&self.work)),
            (ModuleKind::Connection, export_subweights(&self.connection)),
            (ModuleKind::Healthcare, export_subweights(&self.healthcare)),
            (ModuleKind::Education, export_subweights(&self.education)),
        ]);

        WeightConfiguration {
            generated_at,
            template: self.template_id.clone(),
            modules,
            subweights,
            capacity_options: self.capacity_options,
            growth_normalization: self.growth_normalization.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_resolves_standard_template() {
        let resolved = WeightsConfig::default().resolve();
        assert_eq!(resolved.template_id, "standard");
        assert_eq!(resolved.modules.get(ModuleKind::Capacity), 25.0);
        assert!(resolved.capacity_options.include_tentative);
        assert_eq!(resolved.connection.len(), 5);
        assert_eq!(resolved.growth_normalization, GrowthNormalization::default());
    }

    #[test]
    fn test_overrides_apply_on_top_of_template() {
        let yaml = r#"
template: health_focus
modules:
  education: 0
  capacity: 30
connection:
  - { id: connection.close_family, weight: 3 }
capacity_options:
  allow_overflow: true
growth_normalization:
  damp_s4: 0.3
"#;
        let config: WeightsConfig = serde_saphyr::from_str(yaml).unwrap();
        let resolved = config.resolve();
        assert_eq!(resolved.template_id, "health_focus");
        assert_eq!(resolved.modules.get(ModuleKind::Capacity), 30.0);
        assert_eq!(resolved.modules.get(ModuleKind::Healthcare), 45.0);
        assert!(!resolved.modules.enabled().contains(&ModuleKind::Education));
        assert_eq!(resolved.connection.len(), 1);
        assert_eq!(resolved.healthcare[0].weight, 55.0);
        assert!(resolved.capacity_options.allow_overflow);
        assert!(!resolved.capacity_options.include_tentative);
        assert_eq!(resolved.growth_normalization.damp_s4, 0.3);
        assert_eq!(resolved.growth_normalization.cap_factor, 1.5);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<WeightsConfig, _> = serde_saphyr::from_str("templat: standard\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_export_normalizes() {
        let resolved = WeightsConfig::default().resolve();
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let export = resolved.export(at);
        assert_eq!(export.generated_at, at);
        let capacity = export.modules.iter().find(|m| m.id == "capacity").unwrap();
        assert!((capacity.normalized - 0.25).abs() < 1e-9);
        let conn = &export.subweights[&ModuleKind::Connection];
        assert_eq!(conn[0].id, "connection.friend");
        assert!((conn[0].normalized - 0.2).abs() < 1e-9);

        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"generated_at\":\"2026-01-02T03:04:05Z\""));
        assert!(json.contains("\"work_opportunity\""));
    }
}
