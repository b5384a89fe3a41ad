use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::{get_config_path, validate_config, Config};
use crate::rates::HourlyBand;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep prompting until `parse` accepts the input.
fn prompt_parsed<T>(
    message: &str,
    default: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T> {
    loop {
        let input = prompt_with_default(message, default)?;
        match parse(&input) {
            Ok(v) => return Ok(v),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

pub(crate) fn parse_fraction(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if (0.0..=1.0).contains(&v) => Ok(v),
        Ok(_) => Err("must be between 0 and 1".to_string()),
        Err(_) => Err("must be a number between 0 and 1".to_string()),
    }
}

pub(crate) fn parse_positive(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err("must be greater than zero".to_string()),
        Err(_) => Err("must be a positive number".to_string()),
    }
}

/// `none` or an empty answer means no override.
pub(crate) fn parse_override(s: &str) -> Result<Option<f64>, String> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_positive(s).map(Some)
}

fn format_override(rate: Option<f64>) -> String {
    rate.map(|r| r.to_string()).unwrap_or_else(|| "none".to_string())
}

/// Serialize and write a rate file atomically, creating parent directories.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit().context("Failed to save config")?;

    Ok(())
}

/// Run the interactive init wizard to create a rate file.
///
/// If `default_path` is Some, uses that as the suggested rate file path.
/// Otherwise, suggests the default location.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Move Quote Rate Setup");
    println!("=====================");
    println!();
    println!("Hourly bands are the tariff min/max per crew size. The filed rate is");
    println!("taken from inside each band unless you enter an override within it.");
    println!();

    let defaults = Config::default();
    let mut config = Config::default();

    // 1. Band position
    config.tuning.band_position = prompt_parsed(
        "How deep into each band to price (0 = band min, 1 = band max)",
        &defaults.tuning.band_position.to_string(),
        parse_fraction,
    )?;

    // 2. Hourly bands
    let configure_hourly = prompt_yes_no("Enter your own hourly bands? (n keeps placeholders)", true)?;
    if configure_hourly {
        let mut bands = Vec::new();
        for default_band in &defaults.rates.hourly {
            println!();
            println!("Crew of {}:", default_band.crew);
            let min_hourly = prompt_parsed(
                "  Tariff minimum ($/hr)",
                &default_band.min_hourly.to_string(),
                parse_positive,
            )?;
            let max_hourly = prompt_parsed(
                "  Tariff maximum ($/hr)",
                &default_band.max_hourly.max(min_hourly).to_string(),
                |s| match parse_positive(s) {
                    Ok(v) if v < min_hourly => Err(format!("must be at least {}", min_hourly)),
                    other => other,
                },
            )?;
            let override_hourly = prompt_parsed(
                "  Filed rate override ($/hr, or none)",
                &format_override(default_band.override_hourly),
                |s| match parse_override(s) {
                    Ok(Some(v)) if v < min_hourly || v > max_hourly => Err(format!(
                        "must be within [{}, {}]",
                        min_hourly, max_hourly
                    )),
                    other => other,
                },
            )?;
            bands.push(HourlyBand {
                crew: default_band.crew,
                min_hourly,
                max_hourly,
                override_hourly,
            });
        }
        config.rates.hourly = bands;
    }

    // 3. Distance tuning
    println!();
    config.tuning.local_threshold_miles = prompt_parsed(
        "Local (hourly) moves go up to how many miles",
        &defaults.tuning.local_threshold_miles.to_string(),
        parse_positive,
    )?;
    config.tuning.road_circuity = prompt_parsed(
        "Road-distance factor over straight-line distance",
        &defaults.tuning.road_circuity.to_string(),
        parse_positive,
    )?;

    if let Err(errors) = validate_config(&config) {
        println!();
        println!("The resulting configuration is invalid:");
        for error in errors {
            println!("  - {}", error);
        }
        anyhow::bail!("Rate setup aborted");
    }

    // 4. Path
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the rate file be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!("Rate file already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    write_config(&config_path, &config)?;

    println!();
    println!("Rate file written to {}", config_path.display());
    println!("Line-haul bands, packing tables and ZIP centroids can be edited there directly.");
    println!("Run `move-quote rates` to review the filed rates.");

    Ok(())
}
