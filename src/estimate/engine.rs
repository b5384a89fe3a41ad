use super::config::EngineConfig;
use super::factors::{bump_hours_for_access, difficulty_bump};
use super::types::{BillingMode, Bounds, EstimateResult, MoveRequest, PackingAdded};
use crate::distance::{estimate_distance, CentroidTable, DistanceConfidence, DistanceEstimate};
use crate::rates::{self, RateTable};

pub const DEFAULT_CREW: u8 = 3;
pub const DEFAULT_TRUCKS: u8 = 1;

// Line-haul spread around the base cost
const LINEHAUL_LOW: f64 = 0.9;
const LINEHAUL_HIGH: f64 = 1.1;

pub const NOTE_NEED_ZIPS: &str = "Need both ZIP codes to determine local vs. line-haul.";
pub const NOTE_NO_HOURLY_BAND: &str = "No hourly rate configured for selected crew size.";
pub const NOTE_NEED_HOME_SIZE: &str = "Provide home size to estimate hours.";
pub const NOTE_NEED_LINEHAUL_INPUTS: &str =
    "Provide home size and both ZIPs to estimate weight + miles.";
pub const NOTE_NO_LINEHAUL_BAND: &str = "No line-haul band configured for this weight.";
pub const NOTE_ROUGH_DISTANCE: &str =
    "Distance is a rough ZIP-prefix estimate; add centroid data for these ZIPs for a better figure.";

/// Distance the engine works with, whole or fractional miles.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedDistance {
    miles: f64,
    confidence: DistanceConfidence,
}

/// The estimation engine: a loaded rate table, tunables and centroid data.
/// Holds no per-call state, so one instance can serve any number of
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct Estimator {
    rates: RateTable,
    tuning: EngineConfig,
    centroids: CentroidTable,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(RateTable::default(), EngineConfig::default(), CentroidTable::builtin())
    }
}

impl Estimator {
    pub fn new(rates: RateTable, tuning: EngineConfig, centroids: CentroidTable) -> Self {
        Self {
            rates,
            tuning,
            centroids,
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn tuning(&self) -> &EngineConfig {
        &self.tuning
    }

    pub fn centroids(&self) -> &CentroidTable {
        &self.centroids
    }

    /// Approximate road miles between two ZIPs; `None` if either is malformed.
    pub fn distance(&self, pickup: &str, dropoff: &str) -> Option<DistanceEstimate> {
        estimate_distance(&self.centroids, &self.tuning, pickup, dropoff)
    }

    pub fn hourly_rate(&self, crew: u8) -> Option<f64> {
        rates::hourly_rate(
            &self.rates.hourly,
            crew,
            self.tuning.band_position,
            self.tuning.rate_decimals,
        )
    }

    pub fn per_lb_per_mile_rate(&self, weight: u32) -> Option<f64> {
        rates::per_lb_per_mile_rate(
            &self.rates.linehaul,
            weight,
            self.tuning.band_position,
            self.tuning.rate_decimals,
        )
    }

    /// Estimate a move. Never fails: missing input and unconfigured bands
    /// come back as zero ranges with a note saying what is missing.
    pub fn estimate(&self, request: &MoveRequest) -> EstimateResult {
        let distance = self.resolve_distance(request);
        let miles = distance.map(|d| d.miles);
        let is_local = request
            .is_local
            .or_else(|| miles.map(|m| m <= self.tuning.local_threshold_miles));

        let mut result = match is_local {
            None => {
                let mut unknown = EstimateResult::empty(BillingMode::Unknown);
                unknown.notes.push(NOTE_NEED_ZIPS.to_string());
                unknown
            }
            Some(true) => self.estimate_hourly(request, miles),
            Some(false) => self.estimate_linehaul(request, miles),
        };

        if let Some(d) = distance {
            result.distance_miles = Some(d.miles);
            result.distance_confidence = Some(d.confidence);
            if d.confidence == DistanceConfidence::Zip3Fallback {
                result.notes.push(NOTE_ROUGH_DISTANCE.to_string());
            }
        }

        result
    }

    fn resolve_distance(&self, request: &MoveRequest) -> Option<ResolvedDistance> {
        if let Some(miles) = request.distance_miles {
            return Some(ResolvedDistance {
                miles,
                confidence: DistanceConfidence::Provided,
            });
        }
        let pickup = request.pickup_zip.as_deref()?;
        let dropoff = request.dropoff_zip.as_deref()?;
        self.distance(pickup, dropoff).map(|d| ResolvedDistance {
            miles: f64::from(d.miles),
            confidence: d.confidence,
        })
    }

    fn estimate_hourly(&self, request: &MoveRequest, miles: Option<f64>) -> EstimateResult {
        let mut result = EstimateResult::empty(BillingMode::Hourly);

        let crew = request.crew_size.unwrap_or(DEFAULT_CREW);
        let trucks = request.trucks.unwrap_or(DEFAULT_TRUCKS);

        let Some(rate) = self.hourly_rate(crew) else {
            result.notes.push(NOTE_NO_HOURLY_BAND.to_string());
            return result;
        };

        result.hourly_filed_rate = Some(rate);
        result.assumed_crew = Some(crew);
        result.assumed_trucks = Some(trucks);

        let Some(home_size) = request.home_size else {
            // Teaser: one to two hours at the filed rate
            result.base_cost_range = Bounds::new(rate, rate * 2.0);
            result.notes.push(NOTE_NEED_HOME_SIZE.to_string());
            return result;
        };

        let mut hours = bump_hours_for_access(home_size.base_hours(), &request.access);

        if request.packing {
            let entry = self.rates.packing.get(home_size);
            hours = hours.shift(entry.hours_added);
            result.packing_added = Some(PackingAdded {
                hours_added: entry.hours_added,
                materials_range: Some(entry.materials),
            });
        }

        result.hours_range = Some(hours);
        result.base_cost_range = hours.scale(rate).round();

        if let Some(m) = miles {
            result.notes.push(format!("Local move (~{} mi).", m.round()));
        }
        result
    }

    fn estimate_linehaul(&self, request: &MoveRequest, miles: Option<f64>) -> EstimateResult {
        let mut result = EstimateResult::empty(BillingMode::WeightAndMiles);

        let (Some(home_size), Some(miles)) = (request.home_size, miles) else {
            result.notes.push(NOTE_NEED_LINEHAUL_INPUTS.to_string());
            return result;
        };

        let weight = home_size.weight_lbs();
        result.weight_assumption_lbs = Some(weight);

        let Some(rate) = self.per_lb_per_mile_rate(weight) else {
            result.notes.push(NOTE_NO_LINEHAUL_BAND.to_string());
            return result;
        };
        result.per_lb_per_mile_filed_rate = Some(rate);

        let base = f64::from(weight) * miles * rate;
        let bump = difficulty_bump(&request.access, request.packing);
        let materials = request
            .packing
            .then(|| self.rates.packing.get(home_size).materials);
        let extra = materials.unwrap_or(Bounds::ZERO);

        result.base_cost_range = Bounds::new(
            base * LINEHAUL_LOW * bump + extra.low,
            base * LINEHAUL_HIGH * bump + extra.high,
        )
        .round();

        result
            .notes
            .push(format!("Line-haul estimate: ~{} miles.", miles.round()));

        if let Some(range) = materials {
            result.packing_added = Some(PackingAdded {
                hours_added: 0.0,
                materials_range: Some(range),
            });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{AccessFactor, HomeSize};
    use crate::rates::{HourlyBand, LinehaulBand};

    fn local_request(home_size: Option<HomeSize>) -> MoveRequest {
        MoveRequest {
            distance_miles: Some(20.0),
            home_size,
            ..Default::default()
        }
    }

    fn linehaul_request(home_size: HomeSize, miles: f64) -> MoveRequest {
        MoveRequest {
            distance_miles: Some(miles),
            home_size: Some(home_size),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_zips_is_unknown() {
        let result = Estimator::default().estimate(&MoveRequest::default());
        assert_eq!(result.billing, BillingMode::Unknown);
        assert_eq!(result.base_cost_range, Bounds::ZERO);
        assert_eq!(result.notes, vec![NOTE_NEED_ZIPS.to_string()]);
        assert!(result.distance_miles.is_none());
    }

    #[test]
    fn test_one_zip_is_unknown() {
        let request = MoveRequest {
            pickup_zip: Some("98116".to_string()),
            home_size: Some(HomeSize::TwoBed),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.billing, BillingMode::Unknown);
    }

    #[test]
    fn test_malformed_zip_is_unknown() {
        let request = MoveRequest {
            pickup_zip: Some("981".to_string()),
            dropoff_zip: Some("98103".to_string()),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.billing, BillingMode::Unknown);
        assert_eq!(result.notes.len(), 1);
    }

    #[test]
    fn test_local_two_bed_no_extras() {
        let result = Estimator::default().estimate(&local_request(Some(HomeSize::TwoBed)));
        assert_eq!(result.billing, BillingMode::Hourly);
        assert_eq!(result.hourly_filed_rate, Some(235.0));
        assert_eq!(result.assumed_crew, Some(3));
        assert_eq!(result.assumed_trucks, Some(1));
        assert_eq!(result.hours_range, Some(Bounds::new(5.0, 7.0)));
        assert_eq!(result.base_cost_range, Bounds::new(1175.0, 1645.0));
        assert!(result.packing_added.is_none());
        assert_eq!(result.notes, vec!["Local move (~20 mi).".to_string()]);
        assert_eq!(result.distance_confidence, Some(DistanceConfidence::Provided));
    }

    #[test]
    fn test_local_without_home_size_returns_teaser() {
        let result = Estimator::default().estimate(&local_request(None));
        assert_eq!(result.billing, BillingMode::Hourly);
        assert_eq!(result.base_cost_range, Bounds::new(235.0, 470.0));
        assert!(result.hours_range.is_none());
        assert!(result.notes.contains(&NOTE_NEED_HOME_SIZE.to_string()));
    }

    #[test]
    fn test_local_crew_two_studio() {
        let mut request = local_request(Some(HomeSize::Studio));
        request.crew_size = Some(2);
        request.trucks = Some(2);
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.hourly_filed_rate, Some(180.0));
        assert_eq!(result.assumed_trucks, Some(2));
        assert_eq!(result.base_cost_range, Bounds::new(360.0, 720.0));
    }

    #[test]
    fn test_local_stairs_and_packing() {
        let mut request = local_request(Some(HomeSize::TwoBed));
        request.packing = true;
        request.access.insert(AccessFactor::Stairs);
        let result = Estimator::default().estimate(&request);
        // [5, 7] + stairs [0.5, 1] + packing 3
        assert_eq!(result.hours_range, Some(Bounds::new(8.5, 11.0)));
        assert_eq!(result.base_cost_range, Bounds::new(1998.0, 2585.0));
        let packing = result.packing_added.unwrap();
        assert_eq!(packing.hours_added, 3.0);
        assert_eq!(packing.materials_range, Some(Bounds::new(200.0, 325.0)));
    }

    #[test]
    fn test_local_unconfigured_crew() {
        let mut rates = RateTable::default();
        rates.hourly = vec![HourlyBand::new(2, 120.0, 200.0)];
        let estimator = Estimator::new(rates, EngineConfig::default(), CentroidTable::builtin());
        let result = estimator.estimate(&local_request(Some(HomeSize::TwoBed)));
        assert_eq!(result.billing, BillingMode::Hourly);
        assert_eq!(result.base_cost_range, Bounds::ZERO);
        assert!(result.hourly_filed_rate.is_none());
        assert_eq!(result.notes, vec![NOTE_NO_HOURLY_BAND.to_string()]);
    }

    #[test]
    fn test_local_override_rate() {
        let mut rates = RateTable::default();
        rates.hourly[1].override_hourly = Some(200.0);
        let estimator = Estimator::new(rates, EngineConfig::default(), CentroidTable::builtin());
        let result = estimator.estimate(&local_request(Some(HomeSize::TwoBed)));
        assert_eq!(result.hourly_filed_rate, Some(200.0));
        assert_eq!(result.base_cost_range, Bounds::new(1000.0, 1400.0));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let estimator = Estimator::default();
        let at = estimator.estimate(&linehaul_request(HomeSize::TwoBed, 55.0));
        assert_eq!(at.billing, BillingMode::Hourly);
        let over = estimator.estimate(&linehaul_request(HomeSize::TwoBed, 55.5));
        assert_eq!(over.billing, BillingMode::WeightAndMiles);
    }

    #[test]
    fn test_linehaul_two_bed() {
        let result = Estimator::default().estimate(&linehaul_request(HomeSize::TwoBed, 100.0));
        assert_eq!(result.billing, BillingMode::WeightAndMiles);
        assert_eq!(result.weight_assumption_lbs, Some(5000));
        // 0.0035 + 0.75 * 0.0035 at cent precision
        assert_eq!(result.per_lb_per_mile_filed_rate, Some(0.01));
        assert_eq!(result.base_cost_range, Bounds::new(4500.0, 5500.0));
        assert_eq!(result.notes, vec!["Line-haul estimate: ~100 miles.".to_string()]);
        assert!(result.hours_range.is_none());
        assert!(result.assumed_crew.is_none());
    }

    #[test]
    fn test_linehaul_access_and_packing() {
        let mut request = linehaul_request(HomeSize::TwoBed, 100.0);
        request.packing = true;
        request.access.insert(AccessFactor::Stairs);
        let result = Estimator::default().estimate(&request);
        // bump 1 + 0.05 + 0.08; materials [200, 325]
        assert_eq!(result.base_cost_range, Bounds::new(5285.0, 6540.0));
        let packing = result.packing_added.unwrap();
        assert_eq!(packing.hours_added, 0.0);
        assert_eq!(packing.materials_range, Some(Bounds::new(200.0, 325.0)));
    }

    #[test]
    fn test_linehaul_finer_rate_precision() {
        let tuning = EngineConfig {
            rate_decimals: 4,
            ..Default::default()
        };
        let estimator = Estimator::new(RateTable::default(), tuning, CentroidTable::builtin());
        let result = estimator.estimate(&linehaul_request(HomeSize::TwoBed, 100.0));
        assert_eq!(result.per_lb_per_mile_filed_rate, Some(0.0061));
        // 5000 * 100 * 0.0061 = 3050
        assert_eq!(result.base_cost_range, Bounds::new(2745.0, 3355.0));
    }

    #[test]
    fn test_linehaul_without_home_size() {
        let request = MoveRequest {
            distance_miles: Some(120.0),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.billing, BillingMode::WeightAndMiles);
        assert_eq!(result.base_cost_range, Bounds::ZERO);
        assert_eq!(result.notes, vec![NOTE_NEED_LINEHAUL_INPUTS.to_string()]);
    }

    #[test]
    fn test_linehaul_flag_without_distance() {
        let request = MoveRequest {
            is_local: Some(false),
            home_size: Some(HomeSize::OneBed),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.billing, BillingMode::WeightAndMiles);
        assert_eq!(result.notes, vec![NOTE_NEED_LINEHAUL_INPUTS.to_string()]);
    }

    #[test]
    fn test_local_flag_without_distance_omits_mileage_note() {
        let request = MoveRequest {
            is_local: Some(true),
            home_size: Some(HomeSize::TwoBed),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.billing, BillingMode::Hourly);
        assert_eq!(result.base_cost_range, Bounds::new(1175.0, 1645.0));
        assert!(result.notes.is_empty());
    }

    #[test]
    fn test_linehaul_unconfigured_weight() {
        let mut rates = RateTable::default();
        rates.linehaul = vec![LinehaulBand::new(0, 3000, 0.004, 0.008)];
        let estimator = Estimator::new(rates, EngineConfig::default(), CentroidTable::builtin());
        let result = estimator.estimate(&linehaul_request(HomeSize::TwoBed, 100.0));
        assert_eq!(result.weight_assumption_lbs, Some(5000));
        assert!(result.per_lb_per_mile_filed_rate.is_none());
        assert_eq!(result.base_cost_range, Bounds::ZERO);
        assert_eq!(result.notes, vec![NOTE_NO_LINEHAUL_BAND.to_string()]);
    }

    #[test]
    fn test_zips_derive_local_distance() {
        let request = MoveRequest {
            pickup_zip: Some("98116".to_string()),
            dropoff_zip: Some("98103".to_string()),
            home_size: Some(HomeSize::OneBed),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.billing, BillingMode::Hourly);
        assert_eq!(result.distance_miles, Some(9.0));
        assert_eq!(result.distance_confidence, Some(DistanceConfidence::Centroid));
        assert_eq!(result.base_cost_range, Bounds::new(705.0, 1175.0));
        assert_eq!(result.notes, vec!["Local move (~9 mi).".to_string()]);
    }

    #[test]
    fn test_zips_derive_linehaul_distance() {
        let request = MoveRequest {
            pickup_zip: Some("98101".to_string()),
            dropoff_zip: Some("98520".to_string()),
            home_size: Some(HomeSize::ThreeBed),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.billing, BillingMode::WeightAndMiles);
        assert_eq!(result.distance_miles, Some(103.0));
        // 8000 lbs * 103 mi * 0.01
        assert_eq!(result.base_cost_range, Bounds::new(7416.0, 9064.0));
    }

    #[test]
    fn test_fallback_distance_adds_note() {
        let request = MoveRequest {
            pickup_zip: Some("99999".to_string()),
            dropoff_zip: Some("99998".to_string()),
            home_size: Some(HomeSize::Studio),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.distance_miles, Some(9.0));
        assert_eq!(result.distance_confidence, Some(DistanceConfidence::Zip3Fallback));
        assert_eq!(
            result.notes,
            vec!["Local move (~9 mi).".to_string(), NOTE_ROUGH_DISTANCE.to_string()]
        );
    }

    #[test]
    fn test_supplied_distance_wins_over_zips() {
        let request = MoveRequest {
            pickup_zip: Some("98116".to_string()),
            dropoff_zip: Some("98103".to_string()),
            distance_miles: Some(80.0),
            home_size: Some(HomeSize::Studio),
            ..Default::default()
        };
        let result = Estimator::default().estimate(&request);
        assert_eq!(result.billing, BillingMode::WeightAndMiles);
        assert_eq!(result.distance_miles, Some(80.0));
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let mut request = linehaul_request(HomeSize::FourBed, 240.0);
        request.packing = true;
        request.access = AccessFactor::ALL.into_iter().collect();
        let estimator = Estimator::default();
        assert_eq!(estimator.estimate(&request), estimator.estimate(&request));
    }

    #[test]
    fn test_custom_threshold() {
        let tuning = EngineConfig {
            local_threshold_miles: 10.0,
            ..Default::default()
        };
        let estimator = Estimator::new(RateTable::default(), tuning, CentroidTable::builtin());
        let result = estimator.estimate(&local_request(Some(HomeSize::Studio)));
        assert_eq!(result.billing, BillingMode::WeightAndMiles);
    }
}
