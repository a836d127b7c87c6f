//! Geographic need satisfaction tiering shared by connection, healthcare and education.
//!
//! A need is looked up in the target municipality first, then in any of its
//! neighbours, then in any municipality of the target's region. The first
//! match wins; there is no partial credit across tiers.

use serde::Serialize;

use crate::model::GeoMaps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[serde(rename = "self")]
    SelfMunicipality,
    Neighbor,
    Region,
    None,
}

/// Facility tier scores used by healthcare and education.
pub const TIER_SELF: f64 = 100.0;
pub const TIER_NEIGHBOR: f64 = 50.0;
pub const TIER_REGION: f64 = 25.0;

impl Tier {
    pub fn facility_score(&self) -> f64 {
        match self {
            Tier::SelfMunicipality => TIER_SELF,
            Tier::Neighbor => TIER_NEIGHBOR,
            Tier::Region => TIER_REGION,
            Tier::None => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::SelfMunicipality => "self",
            Tier::Neighbor => "neighbor",
            Tier::Region => "region",
            Tier::None => "none",
        }
    }
}

/// Closest tier at which `satisfies` holds, seen from `target`.
pub fn locate<F>(target: &str, geo: &GeoMaps, satisfies: F) -> Tier
where
    F: Fn(&str) -> bool,
{
    if satisfies(target) {
        return Tier::SelfMunicipality;
    }

    if geo.neighbors_of(target).iter().any(|n| satisfies(n.as_str())) {
        return Tier::Neighbor;
    }

    if let Some(region) = geo.region_of(target) {
        if geo
            .municipalities_in(region)
            .any(|m| m != target && satisfies(m))
        {
            return Tier::Region;
        }
    }

    Tier::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn geo() -> GeoMaps {
        GeoMaps {
            municipality_region_map: BTreeMap::from([
                ("m1".to_string(), "r1".to_string()),
                ("m2".to_string(), "r1".to_string()),
                ("m3".to_string(), "r2".to_string()),
            ]),
            adjacency_map: BTreeMap::from([("m1".to_string(), vec!["m3".to_string()])]),
        }
    }

    fn offering(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_locate_self_first() {
        let has = offering(&["m1", "m3", "m2"]);
        assert_eq!(locate("m1", &geo(), |m| has.contains(m)), Tier::SelfMunicipality);
    }

    #[test]
    fn test_locate_neighbor_before_region() {
        let has = offering(&["m3", "m2"]);
        assert_eq!(locate("m1", &geo(), |m| has.contains(m)), Tier::Neighbor);
    }

    #[test]
    fn test_locate_region() {
        let has = offering(&["m2"]);
        assert_eq!(locate("m1", &geo(), |m| has.contains(m)), Tier::Region);
    }

    #[test]
    fn test_locate_none_outside_region() {
        let has = offering(&["m3"]);
        // m3 is not adjacent to m2 and sits in another region
        assert_eq!(locate("m2", &geo(), |m| has.contains(m)), Tier::None);
        assert_eq!(locate("unknown", &geo(), |m| has.contains(m)), Tier::None);
    }

    #[test]
    fn test_facility_scores() {
        assert_eq!(Tier::SelfMunicipality.facility_score(), 100.0);
        assert_eq!(Tier::Neighbor.facility_score(), 50.0);
        assert_eq!(Tier::Region.facility_score(), 25.0);
        assert_eq!(Tier::None.facility_score(), 0.0);
    }
}
