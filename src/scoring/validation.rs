use super::config::ScoringConfig;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(fraction) = config.pivot_fraction {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            errors.push(format!(
                "scoring.pivot_fraction: must be between 0 and 1, got {}",
                fraction
            ));
        }
    }

    if let Some(multiplier) = config.top_multiplier {
        if !multiplier.is_finite() || multiplier < 1.0 {
            errors.push(format!(
                "scoring.top_multiplier: must be a number >= 1, got {}",
                multiplier
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
