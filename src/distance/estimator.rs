use serde::Serialize;

use super::centroids::CentroidTable;
use crate::estimate::EngineConfig;

/// Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

const ZIP3_MILES_PER_STEP: u32 = 6;
const ZIP3_BASE_MILES: u32 = 9;

/// How a distance figure was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceConfidence {
    /// Both codes had centroids; haversine times road circuity.
    Centroid,
    /// At least one code lacked a centroid; derived from ZIP3 prefixes.
    Zip3Fallback,
    /// Supplied by the caller.
    Provided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistanceEstimate {
    pub miles: u32,
    pub confidence: DistanceConfidence,
}

/// Great-circle distance in miles between two lat/lng points.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Deterministic placeholder from the first three digits of each code.
/// Callers must pass well-formed 5-digit codes.
pub fn zip3_fallback_miles(zip1: &str, zip2: &str) -> u32 {
    let prefix = |z: &str| z[..3].parse::<u32>().unwrap_or(0);
    prefix(zip1).abs_diff(prefix(zip2)) * ZIP3_MILES_PER_STEP + ZIP3_BASE_MILES
}

/// Exactly five ASCII digits.
pub fn is_zip(s: &str) -> bool {
    s.len() == 5 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Approximate road miles between two postal codes.
///
/// Returns `None` when either code is not a 5-digit ZIP. Codes with
/// centroids use haversine distance times the road circuity factor, rounded
/// and floored at `min_miles`; anything else uses the ZIP3 heuristic and is
/// marked as such.
pub fn estimate_distance(
    centroids: &CentroidTable,
    tuning: &EngineConfig,
    pickup: &str,
    dropoff: &str,
) -> Option<DistanceEstimate> {
    let z1 = pickup.trim();
    let z2 = dropoff.trim();

    if !is_zip(z1) || !is_zip(z2) {
        return None;
    }

    match (centroids.get(z1), centroids.get(z2)) {
        (Some(p1), Some(p2)) => {
            let straight = haversine_miles(p1.lat, p1.lng, p2.lat, p2.lng);
            let road = (straight * tuning.road_circuity).round().max(0.0) as u32;
            Some(DistanceEstimate {
                miles: road.max(tuning.min_miles),
                confidence: DistanceConfidence::Centroid,
            })
        }
        _ => Some(DistanceEstimate {
            miles: zip3_fallback_miles(z1, z2),
            confidence: DistanceConfidence::Zip3Fallback,
        }),
    }
}
