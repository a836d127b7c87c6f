mod municipality;
mod person;

pub use municipality::{
    CapacityFacts, EducationFacts, GeoMaps, HealthcareFacts, HistoryEntry, Municipality, WorkFacts,
};
pub use person::{
    ConnectionLocation, EducationFacility, Group, Person, PersonConnection, PersonType, Relation,
    SpecialistTreatment,
};
