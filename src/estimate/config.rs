use serde::{Deserialize, Serialize};

/// Engine tunables.
///
/// Kept out of module constants so tests and operators can run alternate
/// tunings against the same rate table.
///
/// Example YAML:
/// ```yaml
/// tuning:
///   band_position: 0.75
///   road_circuity: 1.25
///   min_miles: 1
///   local_threshold_miles: 55
///   rate_decimals: 2
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// How deep into each filed band the company prices, 0.0 (band min) to
    /// 1.0 (band max).
    pub band_position: f64,

    /// Multiplier from straight-line centroid distance to road miles.
    pub road_circuity: f64,

    /// Floor for centroid-based distances, in miles.
    pub min_miles: u32,

    /// Moves at or under this distance bill hourly; longer moves bill by
    /// weight and miles.
    pub local_threshold_miles: f64,

    /// Decimal places a derived filed rate is rounded to.
    pub rate_decimals: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            band_position: 0.75,
            road_circuity: 1.25,
            min_miles: 1,
            local_threshold_miles: 55.0,
            rate_decimals: 2,
        }
    }
}
