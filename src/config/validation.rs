use super::schema::Config;
use crate::distance::is_zip;
use crate::rates::{rate_warnings, validate_rates};

const MAX_RATE_DECIMALS: u32 = 6;

/// Validate the whole rate file at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let tuning = &config.tuning;

    if !(0.0..=1.0).contains(&tuning.band_position) {
        errors.push(format!(
            "tuning.band_position: must be between 0 and 1 (got {})",
            tuning.band_position
        ));
    }
    if !(tuning.road_circuity.is_finite() && tuning.road_circuity > 0.0) {
        errors.push(format!(
            "tuning.road_circuity: must be positive (got {})",
            tuning.road_circuity
        ));
    }
    if tuning.min_miles < 1 {
        errors.push("tuning.min_miles: must be at least 1".to_string());
    }
    if !(tuning.local_threshold_miles.is_finite() && tuning.local_threshold_miles > 0.0) {
        errors.push(format!(
            "tuning.local_threshold_miles: must be positive (got {})",
            tuning.local_threshold_miles
        ));
    }
    if tuning.rate_decimals > MAX_RATE_DECIMALS {
        errors.push(format!(
            "tuning.rate_decimals: must be at most {} (got {})",
            MAX_RATE_DECIMALS, tuning.rate_decimals
        ));
    }

    if let Err(rate_errors) = validate_rates(&config.rates) {
        errors.extend(rate_errors);
    }

    for (zip, centroid) in &config.centroids {
        if !is_zip(zip.trim()) {
            errors.push(format!("centroids.{}: key must be a 5-digit ZIP code", zip));
        }
        if !(-90.0..=90.0).contains(&centroid.lat) {
            errors.push(format!("centroids.{}.lat: must be within [-90, 90]", zip));
        }
        if !(-180.0..=180.0).contains(&centroid.lng) {
            errors.push(format!("centroids.{}.lng: must be within [-180, 180]", zip));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal problems worth surfacing at startup.
pub fn config_warnings(config: &Config) -> Vec<String> {
    rate_warnings(
        &config.rates,
        config.tuning.band_position,
        config.tuning.rate_decimals,
    )
}
