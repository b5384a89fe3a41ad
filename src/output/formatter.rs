use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use std::time::Duration;
use terminal_size::{terminal_size, Width};

use crate::distance::{DistanceConfidence, DistanceEstimate};
use crate::estimate::{BillingMode, Bounds, EstimateResult, Estimator, HomeSize};

const DISCLAIMER: &str = "Nonbinding; final charges depend on actual conditions on move day.";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Whole-dollar amount with thousands separators: "$1,175"
pub fn currency(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Hourly rate, keeping cents only when there are any: "$235", "$212.50"
pub fn format_hourly_rate(rate: f64) -> String {
    if (rate - rate.round()).abs() < 1e-9 {
        format!("{}/hr", currency(rate))
    } else {
        format!("${:.2}/hr", rate)
    }
}

pub fn format_per_mile_rate(rate: f64) -> String {
    format!("${:.4}/lb/mi", rate)
}

pub fn format_range(range: Bounds) -> String {
    format!("{} – {}", currency(range.low), currency(range.high))
}

/// Labor hours in human form: 5.5 -> "5h 30m"
pub fn format_hours(hours: f64) -> String {
    let secs = (hours.max(0.0) * 3600.0).round() as u64;
    humantime::format_duration(Duration::from_secs(secs)).to_string()
}

pub fn format_hours_range(range: Bounds) -> String {
    format!("{} – {}", format_hours(range.low), format_hours(range.high))
}

/// "~9 miles", with a marker when the figure came from the ZIP3 fallback
pub fn format_distance(miles: Option<f64>, confidence: Option<DistanceConfidence>) -> String {
    match miles {
        None => "—".to_string(),
        Some(m) => match confidence {
            Some(DistanceConfidence::Zip3Fallback) => format!("~{} miles (rough)", m.round()),
            _ => format!("~{} miles", m.round()),
        },
    }
}

/// One line for the `distance` subcommand.
pub fn format_distance_estimate(estimate: Option<DistanceEstimate>) -> String {
    match estimate {
        None => "undetermined (both ZIPs must be 5 digits)".to_string(),
        Some(d) => {
            let source = match d.confidence {
                DistanceConfidence::Centroid => "centroid",
                DistanceConfidence::Zip3Fallback => "zip3-fallback",
                DistanceConfidence::Provided => "provided",
            };
            format!("{} miles ({})", d.miles, source)
        }
    }
}

/// Greedy word wrap. Words longer than `width` are left whole.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn push_notes(out: &mut Vec<String>, notes: &[String], width: Option<usize>) {
    for note in notes {
        let wrapped = match width {
            Some(w) if w > 12 => wrap_text(note, w - 4),
            _ => vec![note.clone()],
        };
        for (i, line) in wrapped.iter().enumerate() {
            let prefix = if i == 0 { "  • " } else { "    " };
            out.push(format!("{}{}", prefix, line));
        }
    }
}

/// Multi-line estimate summary for terminals.
pub fn format_estimate(result: &EstimateResult, use_colors: bool) -> String {
    format_estimate_with_width(result, use_colors, get_terminal_width())
}

fn format_estimate_with_width(
    result: &EstimateResult,
    use_colors: bool,
    width: Option<usize>,
) -> String {
    let mut out = Vec::new();

    let heading = "Estimate Summary";
    out.push(if use_colors {
        heading.bold().to_string()
    } else {
        heading.to_string()
    });

    if result.billing == BillingMode::Unknown {
        out.push("Add both ZIP codes to get started.".to_string());
        push_notes(&mut out, &result.notes, width);
        return out.join("\n");
    }

    out.push(format!("Billing: {}", result.billing.label()));
    out.push(format!(
        "Distance: {}",
        format_distance(result.distance_miles, result.distance_confidence)
    ));

    if let Some(rate) = result.hourly_filed_rate {
        out.push(format!("Filed hourly: {}", format_hourly_rate(rate)));
    }
    if let Some(rate) = result.per_lb_per_mile_filed_rate {
        out.push(format!("Filed rate: {}", format_per_mile_rate(rate)));
    }
    if let (Some(crew), Some(trucks)) = (result.assumed_crew, result.assumed_trucks) {
        let truck_word = if trucks == 1 { "truck" } else { "trucks" };
        out.push(format!("Crew: {} movers, {} {}", crew, trucks, truck_word));
    }
    if let Some(weight) = result.weight_assumption_lbs {
        out.push(format!("Assumed weight: {} lbs", currency(f64::from(weight)).trim_start_matches('$')));
    }
    if let Some(hours) = result.hours_range {
        out.push(format!("Hours: {}", format_hours_range(hours)));
    }
    if let Some(ref packing) = result.packing_added {
        let mut line = String::from("Packing:");
        if packing.hours_added > 0.0 {
            line.push_str(&format!(" +{} labor", format_hours(packing.hours_added)));
        }
        if let Some(materials) = packing.materials_range {
            line.push_str(&format!(" materials {}", format_range(materials)));
        }
        out.push(line);
    }

    let range = format_range(result.base_cost_range);
    out.push(String::new());
    if use_colors {
        out.push(format!("Estimated range: {}", range.bold().green()));
        out.push(DISCLAIMER.dimmed().to_string());
    } else {
        out.push(format!("Estimated range: {}", range));
        out.push(DISCLAIMER.to_string());
    }

    if !result.notes.is_empty() {
        out.push(String::new());
        out.push("Notes:".to_string());
        push_notes(&mut out, &result.notes, width);
    }

    out.join("\n")
}

/// Tab-separated values for scripting
/// Columns: billing, low, high, distance (empty when unknown); no headers, no colors
pub fn format_tsv(result: &EstimateResult) -> String {
    let billing = match result.billing {
        BillingMode::Hourly => "hourly",
        BillingMode::WeightAndMiles => "weight+miles",
        BillingMode::Unknown => "unknown",
    };
    let distance = result
        .distance_miles
        .map(|m| m.round().to_string())
        .unwrap_or_default();
    format!(
        "{}\t{}\t{}\t{}",
        billing,
        result.base_cost_range.low.round() as i64,
        result.base_cost_range.high.round() as i64,
        distance
    )
}

/// JSON envelope for `--format json`.
#[derive(Debug, Serialize)]
pub struct EstimateEnvelope<'a> {
    pub ok: bool,
    pub distance: Option<f64>,
    pub is_local: Option<bool>,
    pub result: &'a EstimateResult,
    pub warnings: Vec<String>,
}

impl<'a> EstimateEnvelope<'a> {
    pub fn new(result: &'a EstimateResult, warnings: Vec<String>) -> Self {
        let is_local = match result.billing {
            BillingMode::Hourly => Some(true),
            BillingMode::WeightAndMiles => Some(false),
            BillingMode::Unknown => None,
        };
        Self {
            ok: true,
            distance: result.distance_miles,
            is_local,
            result,
            warnings,
        }
    }
}

/// JSON body for input or configuration errors.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: String,
    pub issues: Vec<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, issues: Vec<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            issues,
        }
    }
}

/// Filed rates for every configured band, plus the reference tables.
pub fn format_rate_table(estimator: &Estimator, use_colors: bool) -> String {
    let tuning = estimator.tuning();
    let rates = estimator.rates();
    let mut out = Vec::new();

    let section = |title: &str| {
        if use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    };

    out.push(section("Local hourly bands"));
    for band in &rates.hourly {
        let filed = estimator
            .hourly_rate(band.crew)
            .map(format_hourly_rate)
            .unwrap_or_else(|| "—".to_string());
        let marker = if band.override_hourly.is_some() { " (override)" } else { "" };
        out.push(format!(
            "  crew {}  band {} – {}  filed {}{}",
            band.crew,
            currency(band.min_hourly),
            currency(band.max_hourly),
            filed,
            marker
        ));
    }

    out.push(String::new());
    out.push(section("Line-haul bands"));
    for band in &rates.linehaul {
        let filed = estimator
            .per_lb_per_mile_rate(band.weight_min)
            .map(format_per_mile_rate)
            .unwrap_or_else(|| "—".to_string());
        out.push(format!(
            "  {}–{} lbs  band {} – {}  filed {}",
            band.weight_min,
            band.weight_max,
            format_per_mile_rate(band.per_lb_per_mile_min),
            format_per_mile_rate(band.per_lb_per_mile_max),
            filed
        ));
    }

    out.push(String::new());
    out.push(section("Home sizes"));
    for size in HomeSize::ALL {
        let packing = rates.packing.get(size);
        out.push(format!(
            "  {:<7} {:>6} lbs  hours {}  packing +{} / {}",
            size.as_str(),
            size.weight_lbs(),
            format_hours_range(size.base_hours()),
            format_hours(packing.hours_added),
            format_range(packing.materials)
        ));
    }

    out.push(String::new());
    out.push(format!(
        "Band position {:.0}%  local threshold {} mi  road factor {}  {} ZIP centroids",
        tuning.band_position * 100.0,
        tuning.local_threshold_miles,
        tuning.road_circuity,
        estimator.centroids().len()
    ));

    out.join("\n")
}
