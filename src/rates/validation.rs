use super::config::RateTable;
use super::resolver::filed_rate;
use crate::estimate::HomeSize;

const CREW_SIZES: [u8; 3] = [2, 3, 4];

/// Validate a rate table at load time.
/// Returns all validation errors at once (not just the first).
pub fn validate_rates(table: &RateTable) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Hourly bands: one per crew size, sane bounds
    for (i, band) in table.hourly.iter().enumerate() {
        if !CREW_SIZES.contains(&band.crew) {
            errors.push(format!("rates.hourly[{}].crew: must be 2, 3 or 4 (got {})", i, band.crew));
        }
        check_band(
            &mut errors,
            &format!("rates.hourly[{}]", i),
            band.min_hourly,
            band.max_hourly,
        );
    }
    for crew in CREW_SIZES {
        let count = table.hourly.iter().filter(|b| b.crew == crew).count();
        if count == 0 {
            errors.push(format!("rates.hourly: no band configured for crew size {}", crew));
        } else if count > 1 {
            errors.push(format!("rates.hourly: {} bands configured for crew size {}", count, crew));
        }
    }

    // Line-haul bands: ascending, no overlaps, no gaps
    if table.linehaul.is_empty() {
        errors.push("rates.linehaul: at least one band is required".to_string());
    }
    for (i, band) in table.linehaul.iter().enumerate() {
        if band.weight_min > band.weight_max {
            errors.push(format!(
                "rates.linehaul[{}].weight_min: {} is greater than weight_max {}",
                i, band.weight_min, band.weight_max
            ));
        }
        check_band(
            &mut errors,
            &format!("rates.linehaul[{}]", i),
            band.per_lb_per_mile_min,
            band.per_lb_per_mile_max,
        );
    }
    for (i, pair) in table.linehaul.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.weight_min <= prev.weight_max {
            errors.push(format!(
                "rates.linehaul[{}].weight_min: {} overlaps previous band ending at {}",
                i + 1,
                next.weight_min,
                prev.weight_max
            ));
        } else if next.weight_min != prev.weight_max + 1 {
            errors.push(format!(
                "rates.linehaul[{}].weight_min: gap after previous band ending at {} (expected {})",
                i + 1,
                prev.weight_max,
                prev.weight_max + 1
            ));
        }
    }
    for size in HomeSize::ALL {
        let weight = size.weight_lbs();
        if !table.linehaul.is_empty() && !table.linehaul.iter().any(|b| b.contains(weight)) {
            errors.push(format!(
                "rates.linehaul: no band covers {} lbs (assumed weight for {})",
                weight, size
            ));
        }
    }

    // Packing table
    for size in HomeSize::ALL {
        let entry = table.packing.get(size);
        if entry.hours_added < 0.0 {
            errors.push(format!("rates.packing.{}.hours_added: must be non-negative", size));
        }
        if entry.materials.low < 0.0 || entry.materials.low > entry.materials.high {
            errors.push(format!(
                "rates.packing.{}.materials: expected 0 <= low <= high (got [{}, {}])",
                size, entry.materials.low, entry.materials.high
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_band(errors: &mut Vec<String>, path: &str, min: f64, max: f64) {
    if !min.is_finite() || !max.is_finite() || min < 0.0 {
        errors.push(format!("{}: band rates must be finite and non-negative", path));
    } else if min > max {
        errors.push(format!("{}: min {} is greater than max {}", path, min, max));
    }
}

/// Non-fatal problems: overrides that fall outside their band and will
/// therefore be ignored, and filed rates that rounding to `decimals` places
/// pushes outside their band.
pub fn rate_warnings(table: &RateTable, position: f64, decimals: u32) -> Vec<String> {
    let mut warnings = Vec::new();

    for (i, band) in table.hourly.iter().enumerate() {
        let path = format!("rates.hourly[{}]", i);
        if let Some(rate) = band.override_hourly {
            if rate < band.min_hourly || rate > band.max_hourly {
                warnings.push(format!(
                    "{}.override_hourly: {} is outside [{}, {}] and will be ignored",
                    path, rate, band.min_hourly, band.max_hourly
                ));
            }
        }
        let filed = filed_rate(
            band.min_hourly,
            band.max_hourly,
            band.override_hourly,
            position,
            decimals,
        );
        check_filed_rate(&mut warnings, &path, filed, band.min_hourly, band.max_hourly, decimals);
    }
    for (i, band) in table.linehaul.iter().enumerate() {
        let path = format!("rates.linehaul[{}]", i);
        if let Some(rate) = band.override_per_lb_per_mile {
            if rate < band.per_lb_per_mile_min || rate > band.per_lb_per_mile_max {
                warnings.push(format!(
                    "{}.override_per_lb_per_mile: {} is outside [{}, {}] and will be ignored",
                    path, rate, band.per_lb_per_mile_min, band.per_lb_per_mile_max
                ));
            }
        }
        let filed = filed_rate(
            band.per_lb_per_mile_min,
            band.per_lb_per_mile_max,
            band.override_per_lb_per_mile,
            position,
            decimals,
        );
        check_filed_rate(
            &mut warnings,
            &path,
            filed,
            band.per_lb_per_mile_min,
            band.per_lb_per_mile_max,
            decimals,
        );
    }

    warnings
}

fn check_filed_rate(
    warnings: &mut Vec<String>,
    path: &str,
    filed: f64,
    min: f64,
    max: f64,
    decimals: u32,
) {
    if filed < min || filed > max {
        warnings.push(format!(
            "{}: filed rate {} is outside [{}, {}] after rounding to {} decimals; raise tuning.rate_decimals",
            path, filed, min, max, decimals
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{HourlyBand, LinehaulBand, PackingEntry};

    #[test]
    fn test_default_table_is_valid() {
        assert!(validate_rates(&RateTable::default()).is_ok());
        assert!(rate_warnings(&RateTable::default(), 0.75, 6).is_empty());
    }

    #[test]
    fn test_default_linehaul_rates_rounded_out_of_band_warn() {
        // 0.007 rounds to 0.01 at two decimals, above every default band max
        let warnings = rate_warnings(&RateTable::default(), 0.75, 2);
        assert_eq!(warnings.len(), 3);
        for (i, warning) in warnings.iter().enumerate() {
            assert!(warning.starts_with(&format!("rates.linehaul[{}]: filed rate 0.01", i)));
            assert!(warning.contains("raise tuning.rate_decimals"));
        }
    }

    #[test]
    fn test_enough_decimals_keeps_filed_rates_in_band() {
        assert!(rate_warnings(&RateTable::default(), 0.75, 4).is_empty());
        assert!(rate_warnings(&RateTable::default(), 0.0, 3).is_empty());
    }

    #[test]
    fn test_missing_crew_band() {
        let mut table = RateTable::default();
        table.hourly.retain(|b| b.crew != 4);
        let errors = validate_rates(&table).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("crew size 4"));
    }

    #[test]
    fn test_duplicate_crew_band() {
        let mut table = RateTable::default();
        table.hourly.push(HourlyBand::new(3, 150.0, 250.0));
        let errors = validate_rates(&table).unwrap_err();
        assert!(errors[0].contains("2 bands configured for crew size 3"));
    }

    #[test]
    fn test_invalid_crew_size() {
        let mut table = RateTable::default();
        table.hourly.push(HourlyBand::new(6, 150.0, 250.0));
        let errors = validate_rates(&table).unwrap_err();
        assert!(errors[0].contains("rates.hourly[3].crew"));
    }

    #[test]
    fn test_inverted_hourly_band() {
        let mut table = RateTable::default();
        table.hourly[0].min_hourly = 300.0;
        let errors = validate_rates(&table).unwrap_err();
        assert!(errors[0].contains("rates.hourly[0]"));
        assert!(errors[0].contains("greater than max"));
    }

    #[test]
    fn test_overlapping_linehaul_bands() {
        let mut table = RateTable::default();
        table.linehaul[1].weight_min = 2500;
        let errors = validate_rates(&table).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("rates.linehaul[1].weight_min"));
        assert!(errors[0].contains("overlaps"));
    }

    #[test]
    fn test_gapped_linehaul_bands() {
        let mut table = RateTable::default();
        table.linehaul[2].weight_min = 7500;
        let errors = validate_rates(&table).unwrap_err();
        assert!(errors[0].contains("gap"));
        assert!(errors[0].contains("expected 7001"));
    }

    #[test]
    fn test_linehaul_must_cover_home_sizes() {
        let mut table = RateTable::default();
        table.linehaul[2].weight_max = 10000;
        let errors = validate_rates(&table).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("11000 lbs"));
        assert!(errors[0].contains("4-bed"));
    }

    #[test]
    fn test_empty_linehaul() {
        let mut table = RateTable::default();
        table.linehaul.clear();
        let errors = validate_rates(&table).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("at least one band"));
    }

    #[test]
    fn test_bad_packing_materials() {
        let mut table = RateTable::default();
        table.packing.three_bed = PackingEntry::new(4.0, 500.0, 450.0);
        let errors = validate_rates(&table).unwrap_err();
        assert!(errors[0].contains("rates.packing.3-bed.materials"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut table = RateTable::default();
        table.hourly[0].max_hourly = -1.0; // Error 1
        table.linehaul.push(LinehaulBand::new(12001, 11000, 0.002, 0.004)); // Error 2
        let errors = validate_rates(&table).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_override_outside_band_warns() {
        let mut table = RateTable::default();
        table.hourly[1].override_hourly = Some(300.0);
        table.linehaul[0].override_per_lb_per_mile = Some(0.006);
        let warnings = rate_warnings(&table, 0.75, 4);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("rates.hourly[1].override_hourly"));
        // Still a valid table
        assert!(validate_rates(&table).is_ok());
    }
}
