use std::collections::BTreeSet;

use super::Scenario;
use crate::model::{Group, Municipality};
use crate::scoring::eligibility::{allowed_education_need, can_have_profession, can_have_relation};
use crate::scoring::validate_weights;

fn validate_group(errors: &mut Vec<String>, group: &Group) {
    if let Some(size) = group.size {
        if size != group.persons.len() {
            errors.push(format!(
                "group.size: {} does not match the {} listed persons",
                size,
                group.persons.len()
            ));
        }
    }

    let mut seen = BTreeSet::new();
    for (i, person) in group.persons.iter().enumerate() {
        let path = format!("group.persons[{}]", i);
        let kind = person.person_type.as_str();

        if person.id.trim().is_empty() {
            errors.push(format!("{}.id: must not be empty", path));
        } else if !seen.insert(person.id.as_str()) {
            errors.push(format!("{}.id: duplicate person id '{}'", path, person.id));
        }

        if let Some(ref conn) = person.connection {
            if conn.municipality_id.is_some() && conn.region_id.is_some() {
                errors.push(format!(
                    "{}.connection: give either municipality_id or region_id, not both",
                    path
                ));
            }
            if let Some(relation) = conn.relation {
                if !can_have_relation(person.person_type, relation) {
                    errors.push(format!(
                        "{}.connection.relation: '{}' is not allowed for {}",
                        path,
                        relation.as_str(),
                        kind
                    ));
                }
            }
        }

        if person.profession.is_some() && !can_have_profession(person.person_type) {
            errors.push(format!("{}.profession: {} cannot have a profession", path, kind));
        }

        if let Some(need) = person.education_need {
            if !allowed_education_need(person.person_type, need) {
                errors.push(format!(
                    "{}.education_need: '{}' is not allowed for {}",
                    path,
                    need.as_str(),
                    kind
                ));
            }
        }
    }
}

fn check_non_negative(errors: &mut Vec<String>, path: String, value: Option<f64>) {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            errors.push(format!("{}: must be non-negative, got {}", path, v));
        }
    }
}

fn validate_municipalities(errors: &mut Vec<String>, municipalities: &[Municipality]) {
    let mut seen = BTreeSet::new();
    for (i, m) in municipalities.iter().enumerate() {
        let path = format!("municipalities[{}]", i);

        if m.id.trim().is_empty() {
            errors.push(format!("{}.id: must not be empty", path));
        } else if !seen.insert(m.id.as_str()) {
            errors.push(format!("{}.id: duplicate municipality id '{}'", path, m.id));
        }

        let cap = &m.capacity;
        for (field, value) in [
            ("capacity_total", cap.capacity_total),
            ("settled_current", cap.settled_current),
            ("tentative_claim", cap.tentative_claim),
        ] {
            if let Some(v) = value {
                if v < 0 {
                    errors.push(format!(
                        "{}.capacity.{}: must be non-negative, got {}",
                        path, field, v
                    ));
                }
            }
        }

        if let Some(u) = m.work.unemployment_rate {
            if !(0.0..=100.0).contains(&u) {
                errors.push(format!(
                    "{}.work.unemployment_rate: must be within 0..100, got {}",
                    path, u
                ));
            }
        }

        for (profession, entry) in &m.work.profession_history {
            let entry_path = format!("{}.work.profession_history.{}", path, profession);
            check_non_negative(
                errors,
                format!("{}.employees_5y_ago", entry_path),
                entry.employees_5y_ago,
            );
            check_non_negative(
                errors,
                format!("{}.employees_now", entry_path),
                entry.employees_now,
            );
            check_non_negative(
                errors,
                format!("{}.pct_workforce_5y_ago", entry_path),
                entry.pct_workforce_5y_ago,
            );
            check_non_negative(
                errors,
                format!("{}.pct_workforce_now", entry_path),
                entry.pct_workforce_now,
            );
        }
    }
}

/// Validate a scenario file.
/// Returns all validation errors at once (not just the first).
pub fn validate_scenario(scenario: &Scenario) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    validate_group(&mut errors, &scenario.group);
    validate_municipalities(&mut errors, &scenario.municipalities);
    if let Err(weight_errors) = validate_weights(&scenario.weights) {
        errors.extend(weight_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
