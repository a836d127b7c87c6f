//! Robust growth normalization for profession history.
//!
//! Raw percentage growth is noisy for small professions (1 -> 2 employees is
//! "100%"). Thresholds derived from the municipality's own profession
//! distribution (median + MAD) classify each change into one of four
//! scenarios, which then damp or boost the raw percentage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::HistoryEntry;

/// Reference to the municipality's absolute-change threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsThreshold {
    #[serde(rename = "TH_abs")]
    ThAbs,
}

/// Reference to the share threshold with a 5 percentage point floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareThreshold {
    #[serde(rename = "TH_share_or_5pp")]
    ThShareOr5pp,
}

/// Scale constant: either the computed threshold or a fixed number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AbsScale {
    Threshold(AbsThreshold),
    Fixed(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShareScale {
    Threshold(ShareThreshold),
    Fixed(f64),
}

/// Growth normalization parameters. Missing keys take the defaults.
///
/// Example YAML:
/// ```yaml
/// growth_normalization:
///   tiny_base_threshold: 2
///   beta_boost_s1: 0.4
///   damp_s4: 0.5
///   gamma_share: 0.3
///   cap_factor: 1.5
///   final_cap: 200
///   k_abs_scale: TH_abs
///   k_boost_scale: TH_abs
///   share_scale_mode: TH_share_or_5pp
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowthNormalization {
    /// Professions with fewer employees five years ago count as a tiny base.
    #[serde(alias = "tinyBaseThreshold")]
    pub tiny_base_threshold: f64,

    /// Boost strength for large absolute, small relative changes (scenario 1).
    pub beta_boost_s1: f64,

    /// Damping for large relative, small absolute changes (scenario 4).
    pub damp_s4: f64,

    /// Weight of the structural (workforce share) factor.
    pub gamma_share: f64,

    /// Upper bound of the combined factor.
    pub cap_factor: f64,

    /// Upper bound of the traced adjusted growth.
    pub final_cap: f64,

    pub k_abs_scale: AbsScale,
    pub k_boost_scale: AbsScale,
    pub share_scale_mode: ShareScale,
}

impl Default for GrowthNormalization {
    fn default() -> Self {
        Self {
            tiny_base_threshold: 2.0,
            beta_boost_s1: 0.4,
            damp_s4: 0.5,
            gamma_share: 0.3,
            cap_factor: 1.5,
            final_cap: 200.0,
            k_abs_scale: AbsScale::Threshold(AbsThreshold::ThAbs),
            k_boost_scale: AbsScale::Threshold(AbsThreshold::ThAbs),
            share_scale_mode: ShareScale::Threshold(ShareThreshold::ThShareOr5pp),
        }
    }
}

/// Robust thresholds of one municipality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub th_abs: f64,
    pub th_pct: f64,
    pub th_share: f64,
}

/// Classification of a profession's change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Large absolute change, small relative change: boosted.
    BigAbsSmallPct,
    /// Nothing stands out: neutral.
    Ordinary,
    /// Both large: neutral.
    BothBig,
    /// Large relative change on a small absolute base: damped.
    BigPctSmallAbs,
}

impl Scenario {
    pub fn classify(big_abs: bool, big_pct: bool) -> Self {
        match (big_pct, big_abs) {
            (false, true) => Scenario::BigAbsSmallPct,
            (true, true) => Scenario::BothBig,
            (true, false) => Scenario::BigPctSmallAbs,
            (false, false) => Scenario::Ordinary,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Scenario::BigAbsSmallPct => 1,
            Scenario::Ordinary => 2,
            Scenario::BothBig => 3,
            Scenario::BigPctSmallAbs => 4,
        }
    }
}

/// Change measures of one history entry. Missing values count as 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Change {
    pub p0_raw: f64,
    pub p0_eff: f64,
    pub p1: f64,
    pub delta_n: f64,
    pub recomputed_pct: f64,
    pub delta_share: f64,
}

impl Change {
    pub fn of(entry: &HistoryEntry) -> Self {
        let p0_raw = entry.employees_5y_ago.unwrap_or(0.0);
        let p1 = entry.employees_now.unwrap_or(0.0);
        let p0_eff = if p0_raw == 0.0 { 1.0 } else { p0_raw };
        let delta_n = p1 - p0_eff;
        let share_before = entry.pct_workforce_5y_ago.unwrap_or(0.0);
        let share_now = entry.pct_workforce_now.unwrap_or(0.0);
        Self {
            p0_raw,
            p0_eff,
            p1,
            delta_n,
            recomputed_pct: delta_n / p0_eff * 100.0,
            delta_share: (share_now - share_before).max(0.0),
        }
    }
}

pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// `median + MAD`, or the median alone when MAD is 0. Empty input gives 0.
pub(crate) fn robust_threshold(values: &[f64]) -> f64 {
    let med = median(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - med).abs()).collect();
    let mad = median(&deviations);
    if mad == 0.0 {
        med
    } else {
        med + mad
    }
}

/// Thresholds over every profession in the history.
///
/// At least two entries are needed to compare against; otherwise `None` and
/// growth uses the capped-percentage fallback.
pub fn compute_thresholds(history: &BTreeMap<String, HistoryEntry>) -> Option<Thresholds> {
    if history.len() < 2 {
        return None;
    }
    let changes: Vec<Change> = history.values().map(Change::of).collect();
    let abs: Vec<f64> = changes.iter().map(|c| c.delta_n.abs()).collect();
    let pct: Vec<f64> = changes.iter().map(|c| c.recomputed_pct.abs()).collect();
    let share: Vec<f64> = changes
        .iter()
        .map(|c| c.delta_share)
        .filter(|d| *d > 0.0)
        .collect();

    Some(Thresholds {
        th_abs: robust_threshold(&abs),
        th_pct: robust_threshold(&pct),
        th_share: robust_threshold(&share),
    })
}

/// Every factor applied to one profession's growth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthFactors {
    pub big_abs: bool,
    pub big_pct: bool,
    pub scenario: Scenario,
    pub scenario_number: u8,
    pub tiny_base: bool,
    pub k_abs: f64,
    pub k_boost: f64,
    pub s_share: f64,
    pub f_abs: f64,
    pub f_base: f64,
    pub f_share_raw: f64,
    pub f_struct: f64,
    pub f_scen: f64,
    pub f_total: f64,
    /// `positive_pct × f_total`, uncapped.
    pub adjusted_raw: f64,
    /// `adjusted_raw` capped at `final_cap` for display.
    pub adjusted_capped: f64,
}

/// Growth of one profession with the path that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthBreakdown {
    #[serde(flatten)]
    pub change: Change,
    pub positive_pct: f64,
    /// `None` when the fallback formula was used.
    pub factors: Option<GrowthFactors>,
    pub growth: f64,
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Normalized growth score in 0..=100 for one history entry.
pub fn normalized_growth(
    entry: &HistoryEntry,
    thresholds: Option<&Thresholds>,
    params: &GrowthNormalization,
) -> GrowthBreakdown {
    let change = Change::of(entry);
    let negative = change.recomputed_pct < 0.0;
    let positive_pct = if negative { 0.0 } else { change.recomputed_pct };

    let Some(th) = thresholds else {
        let growth = if negative { 0.0 } else { positive_pct.min(100.0) };
        return GrowthBreakdown {
            change,
            positive_pct,
            factors: None,
            growth,
        };
    };

    let abs_delta = change.delta_n.abs();
    let big_abs = abs_delta >= th.th_abs;
    let big_pct = change.recomputed_pct.abs() >= th.th_pct;
    let scenario = Scenario::classify(big_abs, big_pct);
    let tiny_base = change.p0_raw < params.tiny_base_threshold;

    let scale = |s: AbsScale| match s {
        AbsScale::Threshold(AbsThreshold::ThAbs) => th.th_abs,
        AbsScale::Fixed(v) => v,
    };
    let k_abs = positive_or(scale(params.k_abs_scale), 1.0);
    let k_boost = positive_or(scale(params.k_boost_scale), 1.0);
    let s_share = positive_or(
        match params.share_scale_mode {
            ShareScale::Threshold(ShareThreshold::ThShareOr5pp) => th.th_share.max(5.0),
            ShareScale::Fixed(v) => v,
        },
        5.0,
    );

    let f_abs = abs_delta / (abs_delta + k_abs);
    let f_base = if tiny_base {
        change.p0_raw / params.tiny_base_threshold
    } else {
        1.0
    };
    let f_share_raw = change.delta_share / (change.delta_share + s_share);
    let f_struct = 1.0 + params.gamma_share * f_share_raw;
    let f_scen = match scenario {
        Scenario::BigAbsSmallPct => {
            1.0 + params.beta_boost_s1 * (abs_delta / (abs_delta + k_boost))
        }
        Scenario::BigPctSmallAbs => params.damp_s4 * f_base,
        Scenario::Ordinary | Scenario::BothBig => 1.0,
    };
    let f_total = (f_scen * f_abs * f_struct * f_base).min(params.cap_factor);

    let adjusted_raw = positive_pct * f_total;
    let growth = if negative {
        0.0
    } else {
        adjusted_raw.min(100.0).clamp(0.0, 100.0)
    };

    GrowthBreakdown {
        change,
        positive_pct,
        factors: Some(GrowthFactors {
            big_abs,
            big_pct,
            scenario,
            scenario_number: scenario.number(),
            tiny_base,
            k_abs,
            k_boost,
            s_share,
            f_abs,
            f_base,
            f_share_raw,
            f_struct,
            f_scen,
            f_total,
            adjusted_raw,
            adjusted_capped: adjusted_raw.min(params.final_cap),
        }),
        growth,
    }
}
