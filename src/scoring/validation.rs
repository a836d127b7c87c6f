use super::config::WeightsConfig;
use super::templates::template_by_id;
use super::weights::{Subweight, SubweightId};
use super::work::{AbsScale, ShareScale};

fn check_subweights<K: SubweightId>(
    errors: &mut Vec<String>,
    path: &str,
    subweights: &Option<Vec<Subweight<K>>>,
) {
    let Some(list) = subweights else {
        return;
    };
    for (i, sw) in list.iter().enumerate() {
        if !sw.weight.is_finite() || sw.weight < 0.0 {
            errors.push(format!(
                "{}[{}].weight: must be a non-negative number, got {}",
                path, i, sw.weight
            ));
        }
        if list[..i].iter().any(|earlier| earlier.id == sw.id) {
            errors.push(format!(
                "{}[{}].id: duplicate subweight '{}'",
                path,
                i,
                sw.id.as_str()
            ));
        }
    }
}

/// Validate the weights section of a scenario.
/// Returns all validation errors at once (not just the first).
pub fn validate_weights(config: &WeightsConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref id) = config.template {
        if template_by_id(id).is_none() {
            errors.push(format!(
                "weights.template: unknown template '{}' \
                 (expected standard, unaccompanied_minors or health_focus)",
                id
            ));
        }
    }

    for (kind, weight) in &config.modules {
        if !weight.is_finite() || *weight < 0.0 {
            errors.push(format!(
                "weights.modules.{}: must be a non-negative number, got {}",
                kind.as_str(),
                weight
            ));
        }
    }

    check_subweights(&mut errors, "weights.capacity", &config.capacity);
    check_subweights(&mut errors, "weights.work", &config.work);
    check_subweights(&mut errors, "weights.connection", &config.connection);
    check_subweights(&mut errors, "weights.healthcare", &config.healthcare);
    check_subweights(&mut errors, "weights.education", &config.education);

    if let Some(ref g) = config.growth_normalization {
        let non_negative = [
            ("tiny_base_threshold", g.tiny_base_threshold),
            ("beta_boost_s1", g.beta_boost_s1),
            ("damp_s4", g.damp_s4),
            ("gamma_share", g.gamma_share),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!(
                    "weights.growth_normalization.{}: must be non-negative, got {}",
                    name, value
                ));
            }
        }
        for (name, value) in [("cap_factor", g.cap_factor), ("final_cap", g.final_cap)] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!(
                    "weights.growth_normalization.{}: must be positive, got {}",
                    name, value
                ));
            }
        }
        for (name, scale) in [("k_abs_scale", g.k_abs_scale), ("k_boost_scale", g.k_boost_scale)] {
            if let AbsScale::Fixed(v) = scale {
                if !v.is_finite() || v <= 0.0 {
                    errors.push(format!(
                        "weights.growth_normalization.{}: fixed scale must be positive, got {}",
                        name, v
                    ));
                }
            }
        }
        if let ShareScale::Fixed(v) = g.share_scale_mode {
            if !v.is_finite() || v <= 0.0 {
                errors.push(format!(
                    "weights.growth_normalization.share_scale_mode: \
                     fixed scale must be positive, got {}",
                    v
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
