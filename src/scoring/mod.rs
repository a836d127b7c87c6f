//! Multi-criteria suitability scoring: five module scorers and the aggregator.
//!
//! Every scorer is a pure function of its input envelope. Error-like outcomes
//! (missing facts, nobody eligible) come back as data through `mode` and
//! `confidence`, never as errors.

pub mod aggregate;
pub mod capacity;
pub mod config;
pub mod connection;
pub mod education;
pub mod eligibility;
pub mod healthcare;
pub mod result;
pub mod templates;
pub mod tiering;
pub mod validation;
pub mod weights;
pub mod work;

pub use aggregate::{aggregate_overall, Aggregate, ModuleContribution};
pub use capacity::{score_capacity, CapacityInput, CapacityOptions, CapacityResult};
pub use config::{ResolvedWeights, WeightConfiguration, WeightsConfig};
pub use connection::{score_connection, ConnectionInput, ConnectionResult, MatchLevel};
pub use education::{score_education, EducationInput, EducationResult};
pub use healthcare::{score_healthcare, HealthcareInput, HealthcareResult};
pub use result::{Direction, ModuleResult, ModuleScore, ScoreMode, Scored, SubscoreRow};
pub use templates::{template_by_id, WeightTemplate, DEFAULT_TEMPLATE_ID, TEMPLATES};
pub use tiering::Tier;
pub use validation::validate_weights;
pub use weights::{ModuleKind, ModuleWeights, Subweight, SubweightId};
pub use work::{score_work, GrowthNormalization, WorkInput, WorkResult};
