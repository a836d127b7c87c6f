use serde::{Deserialize, Serialize};

/// Life-stage category of a person. Drives eligibility in every scoring module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    Baby,
    Child,
    HighSchoolPupil,
    Student,
    AdultWorking,
    AdultNotWorking,
    Senior,
}

impl PersonType {
    pub const ALL: [PersonType; 7] = [
        PersonType::Baby,
        PersonType::Child,
        PersonType::HighSchoolPupil,
        PersonType::Student,
        PersonType::AdultWorking,
        PersonType::AdultNotWorking,
        PersonType::Senior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonType::Baby => "baby",
            PersonType::Child => "child",
            PersonType::HighSchoolPupil => "high_school_pupil",
            PersonType::Student => "student",
            PersonType::AdultWorking => "adult_working",
            PersonType::AdultNotWorking => "adult_not_working",
            PersonType::Senior => "senior",
        }
    }
}

/// Kind of relation a person declares towards a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Friend,
    CloseFamily,
    Relative,
    Workplace,
    SchoolPlace,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::Friend,
        Relation::CloseFamily,
        Relation::Relative,
        Relation::Workplace,
        Relation::SchoolPlace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Friend => "friend",
            Relation::CloseFamily => "close_family",
            Relation::Relative => "relative",
            Relation::Workplace => "workplace",
            Relation::SchoolPlace => "school_place",
        }
    }
}

/// Education facility a person may need access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationFacility {
    PrimarySchool,
    HighSchool,
    University,
    AdultLanguage,
}

impl EducationFacility {
    /// Canonical order, also the order of `education_needs_list`.
    pub const ALL: [EducationFacility; 4] = [
        EducationFacility::PrimarySchool,
        EducationFacility::HighSchool,
        EducationFacility::University,
        EducationFacility::AdultLanguage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EducationFacility::PrimarySchool => "primary_school",
            EducationFacility::HighSchool => "high_school",
            EducationFacility::University => "university",
            EducationFacility::AdultLanguage => "adult_language",
        }
    }
}

/// Specialist treatment catalog offered by municipalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistTreatment {
    Dialysis,
    Rehabilitation,
    PhysicalTherapy,
    MentalHealth,
    Oncology,
    Cardiology,
    Maternity,
    Pediatrics,
    SubstanceAbuse,
    Trauma,
    Orthopedic,
    Respiratory,
}

impl SpecialistTreatment {
    pub const ALL: [SpecialistTreatment; 12] = [
        SpecialistTreatment::Dialysis,
        SpecialistTreatment::Rehabilitation,
        SpecialistTreatment::PhysicalTherapy,
        SpecialistTreatment::MentalHealth,
        SpecialistTreatment::Oncology,
        SpecialistTreatment::Cardiology,
        SpecialistTreatment::Maternity,
        SpecialistTreatment::Pediatrics,
        SpecialistTreatment::SubstanceAbuse,
        SpecialistTreatment::Trauma,
        SpecialistTreatment::Orthopedic,
        SpecialistTreatment::Respiratory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialistTreatment::Dialysis => "dialysis",
            SpecialistTreatment::Rehabilitation => "rehabilitation",
            SpecialistTreatment::PhysicalTherapy => "physical_therapy",
            SpecialistTreatment::MentalHealth => "mental_health",
            SpecialistTreatment::Oncology => "oncology",
            SpecialistTreatment::Cardiology => "cardiology",
            SpecialistTreatment::Maternity => "maternity",
            SpecialistTreatment::Pediatrics => "pediatrics",
            SpecialistTreatment::SubstanceAbuse => "substance_abuse",
            SpecialistTreatment::Trauma => "trauma",
            SpecialistTreatment::Orthopedic => "orthopedic",
            SpecialistTreatment::Respiratory => "respiratory",
        }
    }
}

/// Where a declared connection points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLocation<'a> {
    Municipality(&'a str),
    Region(&'a str),
}

/// A person's single connection: a municipality OR a region, plus the relation.
///
/// The relation is optional because a location may be picked before the
/// relation is known. Setting both locations is rejected by scenario validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
}

impl PersonConnection {
    pub fn municipality(id: impl Into<String>, relation: Relation) -> Self {
        Self {
            municipality_id: Some(id.into()),
            region_id: None,
            relation: Some(relation),
        }
    }

    pub fn region(id: impl Into<String>, relation: Relation) -> Self {
        Self {
            municipality_id: None,
            region_id: Some(id.into()),
            relation: Some(relation),
        }
    }

    /// Declared location; a municipality takes precedence over a region.
    pub fn location(&self) -> Option<ConnectionLocation<'_>> {
        if let Some(ref id) = self.municipality_id {
            Some(ConnectionLocation::Municipality(id))
        } else {
            self.region_id
                .as_deref()
                .map(ConnectionLocation::Region)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Person {
    pub id: String,

    pub person_type: PersonType,

    /// Profession key looked up in a municipality's profession history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<PersonConnection>,

    #[serde(default)]
    pub needs_hospital: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialist_need: Option<SpecialistTreatment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_need: Option<EducationFacility>,
}

impl Person {
    pub fn new(id: impl Into<String>, person_type: PersonType) -> Self {
        Self {
            id: id.into(),
            person_type,
            profession: None,
            connection: None,
            needs_hospital: false,
            specialist_need: None,
            education_need: None,
        }
    }

    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.profession = Some(profession.into());
        self
    }

    pub fn with_connection(mut self, connection: PersonConnection) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn needing_hospital(mut self) -> Self {
        self.needs_hospital = true;
        self
    }

    pub fn with_specialist_need(mut self, treatment: SpecialistTreatment) -> Self {
        self.specialist_need = Some(treatment);
        self
    }

    pub fn with_education_need(mut self, facility: EducationFacility) -> Self {
        self.education_need = Some(facility);
        self
    }
}

/// Persons to be settled together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Group {
    #[serde(default)]
    pub persons: Vec<Person>,

    /// Explicit size; must match `persons.len()` when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl Group {
    pub fn new(persons: Vec<Person>) -> Self {
        Self { persons, size: None }
    }

    /// Size used for seat arithmetic: explicit size, else the person count.
    pub fn effective_size(&self) -> usize {
        self.size.unwrap_or(self.persons.len())
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_location_prefers_municipality() {
        let conn = PersonConnection {
            municipality_id: Some("m1".to_string()),
            region_id: Some("r1".to_string()),
            relation: Some(Relation::Friend),
        };
        assert_eq!(conn.location(), Some(ConnectionLocation::Municipality("m1")));

        let region = PersonConnection::region("r2", Relation::Relative);
        assert_eq!(region.location(), Some(ConnectionLocation::Region("r2")));

        assert_eq!(PersonConnection::default().location(), None);
    }

    #[test]
    fn test_group_effective_size() {
        let group = Group::new(vec![
            Person::new("a", PersonType::AdultWorking),
            Person::new("b", PersonType::Child),
        ]);
        assert_eq!(group.effective_size(), 2);

        let sized = Group {
            persons: vec![],
            size: Some(4),
        };
        assert_eq!(sized.effective_size(), 4);
    }

    #[test]
    fn test_person_parse_yaml() {
        let yaml = r#"
id: p1
person_type: high_school_pupil
profession: developer
connection:
  region_id: r1
  relation: close_family
needs_hospital: true
specialist_need: mental_health
education_need: university
"#;
        let person: Person = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(person.person_type, PersonType::HighSchoolPupil);
        assert_eq!(person.profession.as_deref(), Some("developer"));
        assert_eq!(
            person.connection.as_ref().and_then(|c| c.relation),
            Some(Relation::CloseFamily)
        );
        assert!(person.needs_hospital);
        assert_eq!(person.specialist_need, Some(SpecialistTreatment::MentalHealth));
        assert_eq!(person.education_need, Some(EducationFacility::University));
    }

    #[test]
    fn test_person_minimal_yaml_defaults() {
        let person: Person = serde_saphyr::from_str("id: b1\nperson_type: baby\n").unwrap();
        assert!(!person.needs_hospital);
        assert!(person.connection.is_none());
        assert!(person.education_need.is_none());
    }
}
