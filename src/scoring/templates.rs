//! Built-in weight presets.

use super::capacity::CapacityOptions;
use super::weights::{
    CapacityWeight, ConnectionWeight, EducationWeight, HealthcareWeight, ModuleKind,
    ModuleWeights, Subweight, WorkWeight,
};

pub const DEFAULT_TEMPLATE_ID: &str = "standard";

/// A named set of module weights, subweights and capacity options.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub name_nb: &'static str,
    pub description: &'static str,
    pub modules: [(ModuleKind, f64); 5],
    pub capacity: &'static [Subweight<CapacityWeight>],
    pub work: &'static [Subweight<WorkWeight>],
    pub connection: &'static [Subweight<ConnectionWeight>],
    pub healthcare: &'static [Subweight<HealthcareWeight>],
    pub education: &'static [Subweight<EducationWeight>],
    pub capacity_options: CapacityOptions,
}

impl WeightTemplate {
    pub fn module_weights(&self) -> ModuleWeights {
        ModuleWeights::new(self.modules)
    }
}

const fn sw<K>(id: K, weight: f64) -> Subweight<K> {
    Subweight::new(id, weight)
}

const CAPACITY_CORE: &[Subweight<CapacityWeight>] = &[sw(CapacityWeight::Core, 1.0)];

const STANDARD_OPTIONS: CapacityOptions = CapacityOptions {
    include_tentative: true,
    allow_overflow: false,
};

pub const TEMPLATES: &[WeightTemplate] = &[
    WeightTemplate {
        id: "standard",
        name: "Standard settlement",
        name_nb: "Normal bosetting",
        description: "Balanced weighting for ordinary family settlement.",
        modules: [
            (ModuleKind::Capacity, 25.0),
            (ModuleKind::WorkOpportunity, 25.0),
            (ModuleKind::Connection, 20.0),
            (ModuleKind::Healthcare, 15.0),
            (ModuleKind::Education, 15.0),
        ],
        capacity: CAPACITY_CORE,
        work: &[sw(WorkWeight::Chance, 50.0), sw(WorkWeight::Growth, 50.0)],
        connection: &[
            sw(ConnectionWeight::Friend, 20.0),
            sw(ConnectionWeight::CloseFamily, 20.0),
            sw(ConnectionWeight::Relative, 20.0),
            sw(ConnectionWeight::Workplace, 20.0),
            sw(ConnectionWeight::SchoolPlace, 20.0),
        ],
        healthcare: &[
            sw(HealthcareWeight::Hospital, 50.0),
            sw(HealthcareWeight::Specialist, 50.0),
        ],
        education: &[
            sw(EducationWeight::PrimarySchool, 25.0),
            sw(EducationWeight::HighSchool, 25.0),
            sw(EducationWeight::University, 25.0),
            sw(EducationWeight::AdultLanguage, 25.0),
        ],
        capacity_options: STANDARD_OPTIONS,
    },
    WeightTemplate {
        id: "unaccompanied_minors",
        name: "Unaccompanied minors",
        name_nb: "Enslige mindreårige",
        description: "Emphasises family ties, schooling and care over jobs.",
        modules: [
            (ModuleKind::Capacity, 10.0),
            (ModuleKind::WorkOpportunity, 5.0),
            (ModuleKind::Connection, 25.0),
            (ModuleKind::Healthcare, 25.0),
            (ModuleKind::Education, 35.0),
        ],
        capacity: CAPACITY_CORE,
        work: &[sw(WorkWeight::Chance, 60.0), sw(WorkWeight::Growth, 40.0)],
        connection: &[
            sw(ConnectionWeight::Friend, 25.0),
            sw(ConnectionWeight::CloseFamily, 40.0),
            sw(ConnectionWeight::Relative, 25.0),
            sw(ConnectionWeight::Workplace, 5.0),
            sw(ConnectionWeight::SchoolPlace, 5.0),
        ],
        healthcare: &[
            sw(HealthcareWeight::Hospital, 50.0),
            sw(HealthcareWeight::Specialist, 50.0),
        ],
        education: &[
            sw(EducationWeight::PrimarySchool, 45.0),
            sw(EducationWeight::HighSchool, 35.0),
            sw(EducationWeight::University, 10.0),
            sw(EducationWeight::AdultLanguage, 10.0),
        ],
        capacity_options: STANDARD_OPTIONS,
    },
    WeightTemplate {
        id: "health_focus",
        name: "Health focus",
        name_nb: "Helsefokus",
        description: "For groups with significant hospital or specialist needs.",
        modules: [
            (ModuleKind::Capacity, 10.0),
            (ModuleKind::WorkOpportunity, 20.0),
            (ModuleKind::Connection, 15.0),
            (ModuleKind::Healthcare, 45.0),
            (ModuleKind::Education, 10.0),
        ],
        capacity: CAPACITY_CORE,
        work: &[sw(WorkWeight::Chance, 60.0), sw(WorkWeight::Growth, 40.0)],
        connection: &[
            sw(ConnectionWeight::Friend, 20.0),
            sw(ConnectionWeight::CloseFamily, 35.0),
            sw(ConnectionWeight::Relative, 25.0),
            sw(ConnectionWeight::Workplace, 10.0),
            sw(ConnectionWeight::SchoolPlace, 10.0),
        ],
        healthcare: &[
            sw(HealthcareWeight::Hospital, 55.0),
            sw(HealthcareWeight::Specialist, 45.0),
        ],
        education: &[
            sw(EducationWeight::PrimarySchool, 25.0),
            sw(EducationWeight::HighSchool, 25.0),
            sw(EducationWeight::University, 25.0),
            sw(EducationWeight::AdultLanguage, 25.0),
        ],
        capacity_options: STANDARD_OPTIONS,
    },
];

pub fn template_by_id(id: &str) -> Option<&'static WeightTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn default_template() -> &'static WeightTemplate {
    &TEMPLATES[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lookup() {
        assert_eq!(template_by_id("health_focus").map(|t| t.name), Some("Health focus"));
        assert!(template_by_id("nope").is_none());
        assert_eq!(default_template().id, DEFAULT_TEMPLATE_ID);
    }

    #[test]
    fn test_template_module_weights_sum_to_100() {
        for t in TEMPLATES {
            let total: f64 = t.modules.iter().map(|(_, w)| w).sum();
            assert_eq!(total, 100.0, "template {}", t.id);
            assert_eq!(t.module_weights().enabled().len(), 5);
        }
    }

    #[test]
    fn test_template_ids_unique() {
        let mut ids: Vec<&str> = TEMPLATES.iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), TEMPLATES.len());
    }
}
