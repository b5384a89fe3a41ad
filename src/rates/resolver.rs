use super::config::{HourlyBand, LinehaulBand};

/// Pick one filed rate inside a `[min, max]` band.
///
/// An override inside the band is used verbatim. Otherwise the rate sits at
/// `position` of the way from min to max, rounded to `decimals` places.
pub fn filed_rate(min: f64, max: f64, override_rate: Option<f64>, position: f64, decimals: u32) -> f64 {
    if let Some(rate) = override_rate {
        if rate >= min && rate <= max {
            return rate;
        }
    }
    round_to(min + position * (max - min), decimals)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Filed hourly rate for an exact crew size, or `None` when no band is
/// configured for it.
pub fn hourly_rate(bands: &[HourlyBand], crew: u8, position: f64, decimals: u32) -> Option<f64> {
    let band = bands.iter().find(|b| b.crew == crew)?;
    Some(filed_rate(
        band.min_hourly,
        band.max_hourly,
        band.override_hourly,
        position,
        decimals,
    ))
}

/// Filed $/lb/mi for a shipment weight. First band containing the weight
/// wins; `None` when the weight falls outside every band.
pub fn per_lb_per_mile_rate(
    bands: &[LinehaulBand],
    weight: u32,
    position: f64,
    decimals: u32,
) -> Option<f64> {
    let band = bands.iter().find(|b| b.contains(weight))?;
    Some(filed_rate(
        band.per_lb_per_mile_min,
        band.per_lb_per_mile_max,
        band.override_per_lb_per_mile,
        position,
        decimals,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateTable;

    #[test]
    fn test_filed_rate_default_position() {
        // 160 + 0.75 * 100
        assert_eq!(filed_rate(160.0, 260.0, None, 0.75, 2), 235.0);
    }

    #[test]
    fn test_filed_rate_rounds_to_cents() {
        assert_eq!(filed_rate(100.0, 100.333, None, 1.0, 2), 100.33);
        assert_eq!(filed_rate(0.0, 10.0, None, 0.3333, 2), 3.33);
    }

    #[test]
    fn test_filed_rate_override_inside_band() {
        assert_eq!(filed_rate(160.0, 260.0, Some(199.99), 0.75, 2), 199.99);
        assert_eq!(filed_rate(160.0, 260.0, Some(160.0), 0.75, 2), 160.0);
        assert_eq!(filed_rate(160.0, 260.0, Some(260.0), 0.75, 2), 260.0);
    }

    #[test]
    fn test_filed_rate_override_outside_band_ignored() {
        assert_eq!(filed_rate(160.0, 260.0, Some(300.0), 0.75, 2), 235.0);
        assert_eq!(filed_rate(160.0, 260.0, Some(0.0), 0.75, 2), 235.0);
    }

    #[test]
    fn test_filed_rate_position_endpoints() {
        assert_eq!(filed_rate(120.0, 200.0, None, 0.0, 2), 120.0);
        assert_eq!(filed_rate(120.0, 200.0, None, 1.0, 2), 200.0);
    }

    #[test]
    fn test_filed_rate_sub_cent_band_at_cent_precision() {
        // 0.0035 + 0.75 * 0.0035 = 0.006125 rounds up to one cent
        assert_eq!(filed_rate(0.0035, 0.0070, None, 0.75, 2), 0.01);
        assert_eq!(filed_rate(0.0035, 0.0070, None, 0.75, 4), 0.0061);
    }

    #[test]
    fn test_hourly_rate_lookup() {
        let table = RateTable::default();
        assert_eq!(hourly_rate(&table.hourly, 2, 0.75, 2), Some(180.0));
        assert_eq!(hourly_rate(&table.hourly, 3, 0.75, 2), Some(235.0));
        assert_eq!(hourly_rate(&table.hourly, 4, 0.75, 2), Some(290.0));
    }

    #[test]
    fn test_hourly_rate_unconfigured_crew() {
        let table = RateTable::default();
        assert_eq!(hourly_rate(&table.hourly, 5, 0.75, 2), None);
        assert_eq!(hourly_rate(&[], 3, 0.75, 2), None);
    }

    #[test]
    fn test_per_lb_per_mile_first_match_wins() {
        let bands = vec![
            LinehaulBand::new(0, 5000, 0.004, 0.004),
            LinehaulBand::new(4000, 9000, 0.002, 0.002),
        ];
        assert_eq!(per_lb_per_mile_rate(&bands, 4500, 0.75, 4), Some(0.004));
        assert_eq!(per_lb_per_mile_rate(&bands, 6000, 0.75, 4), Some(0.002));
    }

    #[test]
    fn test_per_lb_per_mile_outside_bands() {
        let table = RateTable::default();
        assert_eq!(per_lb_per_mile_rate(&table.linehaul, 12001, 0.75, 2), None);
    }

    #[test]
    fn test_per_lb_per_mile_override() {
        let mut band = LinehaulBand::new(0, 3000, 0.004, 0.008);
        band.override_per_lb_per_mile = Some(0.005);
        assert_eq!(per_lb_per_mile_rate(&[band], 1500, 0.75, 2), Some(0.005));
    }
}
