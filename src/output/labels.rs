//! Display labels in English and Norwegian (Bokmål).

use crate::model::{EducationFacility, PersonType, Relation, SpecialistTreatment};
use crate::scoring::{ModuleKind, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Lang {
    #[default]
    En,
    Nb,
}

pub fn person_type(lang: Lang, person_type: PersonType) -> &'static str {
    use PersonType::*;
    match (lang, person_type) {
        (Lang::En, Baby) => "baby",
        (Lang::En, Child) => "child",
        (Lang::En, HighSchoolPupil) => "high school pupil",
        (Lang::En, Student) => "student",
        (Lang::En, AdultWorking) => "working adult",
        (Lang::En, AdultNotWorking) => "adult not working",
        (Lang::En, Senior) => "senior",
        (Lang::Nb, Baby) => "baby",
        (Lang::Nb, Child) => "barn",
        (Lang::Nb, HighSchoolPupil) => "videregående elev",
        (Lang::Nb, Student) => "student",
        (Lang::Nb, AdultWorking) => "voksen i arbeid",
        (Lang::Nb, AdultNotWorking) => "voksen uten arbeid",
        (Lang::Nb, Senior) => "senior",
    }
}

pub fn relation(lang: Lang, relation: Relation) -> &'static str {
    use Relation::*;
    match (lang, relation) {
        (Lang::En, Friend) => "friend",
        (Lang::En, CloseFamily) => "close family",
        (Lang::En, Relative) => "relative",
        (Lang::En, Workplace) => "workplace",
        (Lang::En, SchoolPlace) => "school or study place",
        (Lang::Nb, Friend) => "venn",
        (Lang::Nb, CloseFamily) => "nær familie",
        (Lang::Nb, Relative) => "slektning",
        (Lang::Nb, Workplace) => "arbeidsplass",
        (Lang::Nb, SchoolPlace) => "skole/studiested",
    }
}

pub fn education_facility(lang: Lang, facility: EducationFacility) -> &'static str {
    use EducationFacility::*;
    match (lang, facility) {
        (Lang::En, PrimarySchool) => "primary school",
        (Lang::En, HighSchool) => "high school",
        (Lang::En, University) => "university or college",
        (Lang::En, AdultLanguage) => "adult language training",
        (Lang::Nb, PrimarySchool) => "grunnskole",
        (Lang::Nb, HighSchool) => "videregående skole",
        (Lang::Nb, University) => "universitet/høgskole",
        (Lang::Nb, AdultLanguage) => "voksenopplæring språk",
    }
}

pub fn specialist_treatment(lang: Lang, treatment: SpecialistTreatment) -> &'static str {
    use SpecialistTreatment::*;
    match lang {
        Lang::En => match treatment {
            Dialysis => "dialysis",
            Rehabilitation => "rehabilitation",
            PhysicalTherapy => "physical therapy",
            MentalHealth => "mental health",
            Oncology => "oncology (cancer)",
            Cardiology => "cardiology (heart)",
            Maternity => "maternity",
            Pediatrics => "pediatrics (children)",
            SubstanceAbuse => "substance abuse treatment",
            Trauma => "trauma",
            Orthopedic => "orthopedics",
            Respiratory => "respiratory",
        },
        Lang::Nb => match treatment {
            Dialysis => "dialyse",
            Rehabilitation => "rehabilitering",
            PhysicalTherapy => "fysioterapi",
            MentalHealth => "psykisk helse",
            Oncology => "onkologi (kreft)",
            Cardiology => "kardiologi (hjerte)",
            Maternity => "føde/barsel",
            Pediatrics => "pediatri (barn)",
            SubstanceAbuse => "rusbehandling",
            Trauma => "traume",
            Orthopedic => "ortopedi",
            Respiratory => "respiratorisk",
        },
    }
}

/// Short module name used as a column header.
pub fn module(lang: Lang, kind: ModuleKind) -> &'static str {
    use ModuleKind::*;
    match (lang, kind) {
        (Lang::En, Capacity) => "Capacity",
        (Lang::En, WorkOpportunity) => "Work",
        (Lang::En, Connection) => "Connection",
        (Lang::En, Healthcare) => "Health",
        (Lang::En, Education) => "Education",
        (Lang::Nb, Capacity) => "Kapasitet",
        (Lang::Nb, WorkOpportunity) => "Arbeid",
        (Lang::Nb, Connection) => "Tilknytning",
        (Lang::Nb, Healthcare) => "Helse",
        (Lang::Nb, Education) => "Utdanning",
    }
}

pub fn tier(lang: Lang, tier: Tier) -> &'static str {
    match (lang, tier) {
        (Lang::En, Tier::SelfMunicipality) => "in the municipality",
        (Lang::En, Tier::Neighbor) => "in a neighbour municipality",
        (Lang::En, Tier::Region) => "in the region",
        (Lang::En, Tier::None) => "not available",
        (Lang::Nb, Tier::SelfMunicipality) => "i kommunen",
        (Lang::Nb, Tier::Neighbor) => "i nabokommune",
        (Lang::Nb, Tier::Region) => "i regionen",
        (Lang::Nb, Tier::None) => "ikke tilgjengelig",
    }
}

/// Heading words for the table and detail views.
pub fn overall(lang: Lang) -> &'static str {
    match lang {
        Lang::En => "Overall",
        Lang::Nb => "Totalt",
    }
}

pub fn municipality(lang: Lang) -> &'static str {
    match lang {
        Lang::En => "Municipality",
        Lang::Nb => "Kommune",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norwegian_labels() {
        assert_eq!(person_type(Lang::Nb, PersonType::AdultNotWorking), "voksen uten arbeid");
        assert_eq!(relation(Lang::Nb, Relation::SchoolPlace), "skole/studiested");
        assert_eq!(
            education_facility(Lang::Nb, EducationFacility::University),
            "universitet/høgskole"
        );
        assert_eq!(specialist_treatment(Lang::Nb, SpecialistTreatment::Maternity), "føde/barsel");
        assert_eq!(module(Lang::Nb, ModuleKind::WorkOpportunity), "Arbeid");
    }

    #[test]
    fn test_every_treatment_has_both_labels() {
        for t in SpecialistTreatment::ALL {
            assert!(!specialist_treatment(Lang::En, t).is_empty());
            assert!(!specialist_treatment(Lang::Nb, t).is_empty());
        }
    }

    #[test]
    fn test_default_lang_is_english() {
        assert_eq!(Lang::default(), Lang::En);
        assert_eq!(module(Lang::default(), ModuleKind::Healthcare), "Health");
    }
}
