use serde::{Deserialize, Serialize};

use crate::estimate::{Bounds, HomeSize};

/// Filed tariff bands plus the packing tables.
///
/// Loaded once at startup and read-only afterwards. Replace the placeholder
/// numbers with the bands actually on file.
///
/// Example YAML:
/// ```yaml
/// rates:
///   hourly:
///     - { crew: 3, min_hourly: 160, max_hourly: 260, override_hourly: 240 }
///   linehaul:
///     - { weight_min: 0, weight_max: 3000, per_lb_per_mile_min: 0.004, per_lb_per_mile_max: 0.008 }
///   packing:
///     studio: { hours_added: 1, materials: [75, 125] }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RateTable {
    /// Local hourly bands, one per crew size.
    pub hourly: Vec<HourlyBand>,

    /// Line-haul bands. Matched first-to-last, so they must be listed in
    /// ascending weight order without overlaps.
    pub linehaul: Vec<LinehaulBand>,

    pub packing: PackingTable,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            hourly: vec![
                HourlyBand::new(2, 120.0, 200.0),
                HourlyBand::new(3, 160.0, 260.0),
                HourlyBand::new(4, 200.0, 320.0),
            ],
            linehaul: vec![
                LinehaulBand::new(0, 3000, 0.0040, 0.0080),
                LinehaulBand::new(3001, 7000, 0.0035, 0.0070),
                LinehaulBand::new(7001, 12000, 0.0030, 0.0060),
            ],
            packing: PackingTable::default(),
        }
    }
}

/// Hourly band for one crew size ($/hr).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HourlyBand {
    pub crew: u8,
    pub min_hourly: f64,
    pub max_hourly: f64,
    /// Filed hourly rate, used as-is when it lies inside the band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_hourly: Option<f64>,
}

impl HourlyBand {
    pub fn new(crew: u8, min_hourly: f64, max_hourly: f64) -> Self {
        Self {
            crew,
            min_hourly,
            max_hourly,
            override_hourly: None,
        }
    }
}

/// Line-haul band over an inclusive weight bracket ($/lb/mi).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LinehaulBand {
    pub weight_min: u32,
    pub weight_max: u32,
    pub per_lb_per_mile_min: f64,
    pub per_lb_per_mile_max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_per_lb_per_mile: Option<f64>,
}

impl LinehaulBand {
    pub fn new(weight_min: u32, weight_max: u32, rate_min: f64, rate_max: f64) -> Self {
        Self {
            weight_min,
            weight_max,
            per_lb_per_mile_min: rate_min,
            per_lb_per_mile_max: rate_max,
            override_per_lb_per_mile: None,
        }
    }

    pub fn contains(&self, weight: u32) -> bool {
        weight >= self.weight_min && weight <= self.weight_max
    }
}

/// Packing additions for one home size.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackingEntry {
    /// Labor hours added to both ends of a local estimate
    pub hours_added: f64,
    /// Blended materials budget
    pub materials: Bounds,
}

impl PackingEntry {
    pub fn new(hours_added: f64, materials_low: f64, materials_high: f64) -> Self {
        Self {
            hours_added,
            materials: Bounds::new(materials_low, materials_high),
        }
    }
}

/// Packing table keyed by home size. Every size must be present, so a
/// lookup can never miss.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackingTable {
    pub studio: PackingEntry,
    #[serde(rename = "1-bed")]
    pub one_bed: PackingEntry,
    #[serde(rename = "2-bed")]
    pub two_bed: PackingEntry,
    #[serde(rename = "3-bed")]
    pub three_bed: PackingEntry,
    #[serde(rename = "4-bed")]
    pub four_bed: PackingEntry,
}

impl Default for PackingTable {
    fn default() -> Self {
        Self {
            studio: PackingEntry::new(1.0, 75.0, 125.0),
            one_bed: PackingEntry::new(2.0, 125.0, 200.0),
            two_bed: PackingEntry::new(3.0, 200.0, 325.0),
            three_bed: PackingEntry::new(4.0, 300.0, 450.0),
            four_bed: PackingEntry::new(5.0, 400.0, 600.0),
        }
    }
}

impl PackingTable {
    pub fn get(&self, size: HomeSize) -> &PackingEntry {
        match size {
            HomeSize::Studio => &self.studio,
            HomeSize::OneBed => &self.one_bed,
            HomeSize::TwoBed => &self.two_bed,
            HomeSize::ThreeBed => &self.three_bed,
            HomeSize::FourBed => &self.four_bed,
        }
    }
}
