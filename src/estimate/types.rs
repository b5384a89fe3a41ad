use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::factors::AccessFactor;
use crate::distance::DistanceConfidence;

/// Inclusive `[low, high]` pair. Serialized as a two-element array so rate
/// files can write `materials: [75, 125]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds { low: 0.0, high: 0.0 };

    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Add `delta.low` to the low bound and `delta.high` to the high bound.
    pub fn widen(self, delta: Bounds) -> Self {
        Self::new(self.low + delta.low, self.high + delta.high)
    }

    /// Shift both bounds by the same amount.
    pub fn shift(self, amount: f64) -> Self {
        Self::new(self.low + amount, self.high + amount)
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.low * factor, self.high * factor)
    }

    pub fn floor_at_zero(self) -> Self {
        Self::new(self.low.max(0.0), self.high.max(0.0))
    }

    /// Round both bounds to whole currency units.
    pub fn round(self) -> Self {
        Self::new(self.low.round(), self.high.round())
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

impl From<Bounds> for (f64, f64) {
    fn from(b: Bounds) -> Self {
        (b.low, b.high)
    }
}

/// Home size category. Drives the assumed shipment weight and base hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HomeSize {
    #[serde(rename = "studio")]
    Studio,
    #[serde(rename = "1-bed")]
    OneBed,
    #[serde(rename = "2-bed")]
    TwoBed,
    #[serde(rename = "3-bed")]
    ThreeBed,
    #[serde(rename = "4-bed")]
    FourBed,
}

impl HomeSize {
    pub const ALL: [HomeSize; 5] = [
        HomeSize::Studio,
        HomeSize::OneBed,
        HomeSize::TwoBed,
        HomeSize::ThreeBed,
        HomeSize::FourBed,
    ];

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "studio" => Ok(HomeSize::Studio),
            "1-bed" => Ok(HomeSize::OneBed),
            "2-bed" => Ok(HomeSize::TwoBed),
            "3-bed" => Ok(HomeSize::ThreeBed),
            "4-bed" => Ok(HomeSize::FourBed),
            _ => bail!(
                "Unknown home size '{}' (expected one of: studio, 1-bed, 2-bed, 3-bed, 4-bed)",
                s
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HomeSize::Studio => "studio",
            HomeSize::OneBed => "1-bed",
            HomeSize::TwoBed => "2-bed",
            HomeSize::ThreeBed => "3-bed",
            HomeSize::FourBed => "4-bed",
        }
    }

    /// Assumed shipment weight in pounds for line-haul billing.
    pub fn weight_lbs(&self) -> u32 {
        match self {
            HomeSize::Studio => 1500,
            HomeSize::OneBed => 3000,
            HomeSize::TwoBed => 5000,
            HomeSize::ThreeBed => 8000,
            HomeSize::FourBed => 11000,
        }
    }

    /// Base labor hours for a local move, before access and packing.
    pub fn base_hours(&self) -> Bounds {
        match self {
            HomeSize::Studio => Bounds::new(2.0, 4.0),
            HomeSize::OneBed => Bounds::new(3.0, 5.0),
            HomeSize::TwoBed => Bounds::new(5.0, 7.0),
            HomeSize::ThreeBed => Bounds::new(7.0, 10.0),
            HomeSize::FourBed => Bounds::new(9.0, 13.0),
        }
    }
}

impl fmt::Display for HomeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine input. Every field is optional so a request can be estimated while
/// it is still being filled in; `distance_miles` and `is_local` are derived
/// from the ZIPs when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveRequest {
    pub pickup_zip: Option<String>,
    pub dropoff_zip: Option<String>,
    pub distance_miles: Option<f64>,
    pub is_local: Option<bool>,
    pub home_size: Option<HomeSize>,
    pub crew_size: Option<u8>,
    pub trucks: Option<u8>,
    pub packing: bool,
    pub access: BTreeSet<AccessFactor>,
}

impl MoveRequest {
    /// Check the fields a caller can get wrong. The engine itself never
    /// rejects a request; this is for front ends that accept raw input.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(crew) = self.crew_size {
            if !(2..=4).contains(&crew) {
                errors.push(format!("crew_size: must be 2, 3 or 4 (got {})", crew));
            }
        }
        if let Some(trucks) = self.trucks {
            if !(1..=2).contains(&trucks) {
                errors.push(format!("trucks: must be 1 or 2 (got {})", trucks));
            }
        }
        if let Some(miles) = self.distance_miles {
            if !miles.is_finite() || miles < 0.0 {
                errors.push(format!("distance_miles: must be a non-negative number (got {})", miles));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BillingMode {
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "weight+miles")]
    WeightAndMiles,
    #[serde(rename = "unknown")]
    Unknown,
}

impl BillingMode {
    pub fn label(&self) -> &'static str {
        match self {
            BillingMode::Hourly => "Hourly (Local)",
            BillingMode::WeightAndMiles => "Weight + Miles (Line-haul)",
            BillingMode::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackingAdded {
    pub hours_added: f64,
    pub materials_range: Option<Bounds>,
}

/// Outcome of one estimate. Pure derived value: the same request against
/// the same table always produces an identical result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResult {
    pub billing: BillingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_filed_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_lb_per_mile_filed_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumed_crew: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumed_trucks: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_assumption_lbs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_range: Option<Bounds>,
    pub base_cost_range: Bounds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packing_added: Option<PackingAdded>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_confidence: Option<DistanceConfidence>,
    pub notes: Vec<String>,
}

impl EstimateResult {
    pub(crate) fn empty(billing: BillingMode) -> Self {
        Self {
            billing,
            hourly_filed_rate: None,
            per_lb_per_mile_filed_rate: None,
            assumed_crew: None,
            assumed_trucks: None,
            weight_assumption_lbs: None,
            hours_range: None,
            base_cost_range: Bounds::ZERO,
            packing_added: None,
            distance_miles: None,
            distance_confidence: None,
            notes: Vec::new(),
        }
    }

    /// Whether locality was determined and a rate could be applied.
    pub fn is_priced(&self) -> bool {
        self.billing != BillingMode::Unknown && self.base_cost_range.high > 0.0
    }
}
