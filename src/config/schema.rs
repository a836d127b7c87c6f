use serde::{Deserialize, Serialize};

use crate::model::{Group, Municipality};
use crate::scoring::WeightsConfig;

/// A scenario file: one group, the candidate municipalities, and how to weigh them.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub group: Group,

    #[serde(default)]
    pub municipalities: Vec<Municipality>,

    #[serde(default)]
    pub weights: WeightsConfig,
}
