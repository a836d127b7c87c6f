//! Static eligibility tables keyed by person type.

use crate::model::{EducationFacility, PersonType, Relation};

const ALL_RELATIONS: &[Relation] = &Relation::ALL;
const FAMILY_RELATIONS: &[Relation] =
    &[Relation::Friend, Relation::CloseFamily, Relation::Relative];

/// Relations a person of this type may declare.
pub fn allowed_relations(person_type: PersonType) -> &'static [Relation] {
    match person_type {
        PersonType::Baby => &[],
        PersonType::Child | PersonType::Senior => FAMILY_RELATIONS,
        PersonType::HighSchoolPupil
        | PersonType::Student
        | PersonType::AdultWorking
        | PersonType::AdultNotWorking => ALL_RELATIONS,
    }
}

pub fn can_have_relation(person_type: PersonType, relation: Relation) -> bool {
    allowed_relations(person_type).contains(&relation)
}

/// Education facilities a person of this type may need, in canonical facility order.
pub fn education_needs_list(person_type: PersonType) -> &'static [EducationFacility] {
    use EducationFacility::*;
    match person_type {
        PersonType::Baby => &[],
        PersonType::Child => &[PrimarySchool, HighSchool],
        PersonType::HighSchoolPupil => &[HighSchool, University],
        PersonType::Student | PersonType::AdultWorking | PersonType::Senior => {
            &[University, AdultLanguage]
        }
        PersonType::AdultNotWorking => &[HighSchool, University, AdultLanguage],
    }
}

pub fn allowed_education_need(person_type: PersonType, facility: EducationFacility) -> bool {
    education_needs_list(person_type).contains(&facility)
}

pub fn is_work_eligible(person_type: PersonType) -> bool {
    matches!(
        person_type,
        PersonType::HighSchoolPupil
            | PersonType::Student
            | PersonType::AdultWorking
            | PersonType::AdultNotWorking
    )
}

/// High school pupils may already declare a study track, so the set matches work eligibility.
pub fn can_have_profession(person_type: PersonType) -> bool {
    is_work_eligible(person_type)
}

/// Binary module confidence: 1 once any person contributed.
pub fn confidence_from_eligible(eligible: usize) -> u8 {
    if eligible > 0 {
        1
    } else {
        0
    }
}
