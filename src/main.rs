use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use move_quote::config::{self, ConfigSource};
use move_quote::output::{self, ErrorEnvelope, EstimateEnvelope};
use move_quote::{stderr_buffer, AccessFactor, Estimator, HomeSize, MoveRequest};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Human,
    Json,
    Tsv,
}

#[derive(Args, Debug, Default)]
struct EstimateArgs {
    /// Pickup ZIP code (5 digits)
    #[arg(long)]
    pickup: Option<String>,

    /// Drop-off ZIP code (5 digits)
    #[arg(long)]
    dropoff: Option<String>,

    /// Home size: studio, 1-bed, 2-bed, 3-bed or 4-bed
    #[arg(long)]
    home_size: Option<String>,

    /// Crew size (defaults to 3)
    #[arg(long, value_parser = clap::value_parser!(u8).range(2..=4))]
    crew: Option<u8>,

    /// Number of trucks (defaults to 1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    trucks: Option<u8>,

    /// Include packing labor and materials
    #[arg(long)]
    packing: bool,

    /// Access factors, comma separated: stairs, elevator, long-carry, parking, none
    #[arg(long, value_delimiter = ',')]
    access: Vec<String>,

    /// Known road distance in miles (skips the ZIP-based estimate)
    #[arg(long)]
    distance: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate a move (default if no subcommand)
    Estimate(EstimateArgs),
    /// Approximate road miles between two ZIP codes
    Distance {
        pickup: String,
        dropoff: String,
    },
    /// Show filed rates for every configured band
    Rates,
    /// Validate the rate file and report warnings
    Check,
    /// Create a rate file interactively
    Init {
        /// Where to write the rate file (defaults to ~/.config/move-quote/rates.yaml)
        #[arg(long)]
        path: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "move-quote")]
#[command(about = "Estimate move costs from filed tariff bands", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to rate file (defaults to ~/.config/move-quote/rates.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Print an error either as a JSON envelope or to stderr, then exit.
fn fail(json: bool, code: i32, error: &str, issues: Vec<String>) -> ! {
    if json {
        let envelope = ErrorEnvelope::new(error, issues);
        match serde_json::to_string_pretty(&envelope) {
            Ok(body) => println!("{}", body),
            Err(e) => eprintln!("{}: {}", error, e),
        }
    } else {
        eprintln!("{}", error);
        for issue in issues {
            eprintln!("  - {}", issue);
        }
    }
    std::process::exit(code);
}

fn build_request(args: &EstimateArgs) -> Result<MoveRequest, Vec<String>> {
    let mut errors = Vec::new();

    let home_size = match args.home_size.as_deref().map(HomeSize::parse) {
        Some(Ok(size)) => Some(size),
        Some(Err(e)) => {
            errors.push(format!("home_size: {}", e));
            None
        }
        None => None,
    };

    let access = match AccessFactor::parse_set(&args.access) {
        Ok(set) => set,
        Err(e) => {
            errors.push(format!("access: {}", e));
            Default::default()
        }
    };

    let request = MoveRequest {
        pickup_zip: args.pickup.clone(),
        dropoff_zip: args.dropoff.clone(),
        distance_miles: args.distance,
        is_local: None,
        home_size,
        crew_size: args.crew,
        trucks: args.trucks,
        packing: args.packing,
        access,
    };

    if let Err(request_errors) = request.validate() {
        errors.extend(request_errors);
    }

    if errors.is_empty() {
        Ok(request)
    } else {
        Err(errors)
    }
}

fn run_estimate(estimator: &Estimator, args: &EstimateArgs, verbose: bool) {
    let json = args.format == OutputFormat::Json;

    let request = match build_request(args) {
        Ok(r) => r,
        Err(issues) => fail(json, EXIT_INPUT, "Invalid input", issues),
    };

    if verbose {
        eprintln!(
            "Request: pickup={} dropoff={} home_size={} crew={} trucks={} packing={} access=[{}]",
            request.pickup_zip.as_deref().unwrap_or("-"),
            request.dropoff_zip.as_deref().unwrap_or("-"),
            request.home_size.map(|s| s.as_str()).unwrap_or("-"),
            request
                .crew_size
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            request
                .trucks
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            request.packing,
            request
                .access
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let result = estimator.estimate(&request);

    if verbose {
        eprintln!(
            "Billing: {} (priced: {}, {} notes)",
            result.billing.label(),
            result.is_priced(),
            result.notes.len()
        );
    }

    match args.format {
        OutputFormat::Human => {
            println!(
                "{}",
                output::format_estimate(&result, output::should_use_colors())
            );
        }
        OutputFormat::Tsv => println!("{}", output::format_tsv(&result)),
        OutputFormat::Json => {
            let envelope = EstimateEnvelope::new(&result, stderr_buffer::take_warnings());
            match serde_json::to_string_pretty(&envelope) {
                Ok(body) => println!("{}", body),
                Err(e) => {
                    eprintln!("Failed to serialize estimate: {}", e);
                    std::process::exit(EXIT_INPUT);
                }
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Estimate(EstimateArgs::default()));
    let start_time = Instant::now();

    if let Commands::Init { path } = &command {
        let default_path = path.as_ref().or(cli.config.as_ref()).map(PathBuf::from);
        if let Err(e) = config::init::run_init_wizard(default_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Warnings go into the JSON envelope instead of stderr
    let json = matches!(&command, Commands::Estimate(args) if args.format == OutputFormat::Json);
    if json {
        stderr_buffer::hold_warnings();
    }

    // Load rate file
    let config_path = cli.config.map(PathBuf::from);
    let loaded = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => fail(json, EXIT_CONFIG, &format!("Config error: {:#}", e), vec![]),
    };

    if cli.verbose {
        match &loaded.source {
            ConfigSource::File(path) => eprintln!("Loaded rate file {}", path.display()),
            ConfigSource::BuiltIn => eprintln!("No rate file found, using built-in placeholder bands"),
        }
        eprintln!(
            "  {} hourly bands, {} line-haul bands, {} extra ZIP centroids",
            loaded.config.rates.hourly.len(),
            loaded.config.rates.linehaul.len(),
            loaded.config.centroids.len()
        );
    }

    // Validate rate file at startup
    if let Err(errors) = config::validate_config(&loaded.config) {
        fail(json, EXIT_CONFIG, "Rate file errors:", errors);
    }
    let warning_count = config::report_warnings(&loaded.config);

    let estimator = loaded.config.estimator();

    match command {
        Commands::Estimate(args) => run_estimate(&estimator, &args, cli.verbose),
        Commands::Distance { pickup, dropoff } => {
            let estimate = estimator.distance(&pickup, &dropoff);
            println!("{}", output::format_distance_estimate(estimate));
            if let Some(d) = estimate {
                let threshold = estimator.tuning().local_threshold_miles;
                let kind = if f64::from(d.miles) <= threshold {
                    "local (hourly)"
                } else {
                    "line-haul (weight + miles)"
                };
                println!("Billing would be {}", kind);
            }
        }
        Commands::Rates => {
            println!(
                "{}",
                output::format_rate_table(&estimator, output::should_use_colors())
            );
        }
        Commands::Check => {
            let source = match &loaded.source {
                ConfigSource::File(path) => path.display().to_string(),
                ConfigSource::BuiltIn => "built-in defaults".to_string(),
            };
            println!("Rate file OK: {} ({} warnings)", source, warning_count);
        }
        // Handled before the rate file is loaded
        Commands::Init { .. } => {}
    }

    if cli.verbose {
        eprintln!("Done in {:?}", start_time.elapsed());
    }

    std::process::exit(EXIT_SUCCESS);
}
