//! pyrind: rate the packaging friendliness of Python project metadata.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use pyrind::cli::{self, OutputFormat, RateConfig, TargetMode};
use pyrind::config::AppConfig;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with data snapshot info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nTargets:",
        "\n  project directories (pyproject.toml, setup.py, *.egg-info)",
        "\n  core-metadata files (PKG-INFO, METADATA)",
        "\n  projects on PyPI",
        "\n\nOutput Formats:",
        "\n  text, json"
    )
}

#[derive(Parser)]
#[command(name = "pyrind")]
#[command(version, long_version = build_long_version())]
#[command(about = "Rate the packaging friendliness of Python project metadata", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Rating at or above the minimum
    1  Error occurred
    2  Rating below the minimum (see --min)

EXAMPLES:
    # Rate the project in the current directory
    pyrind rate .

    # Rate a project on PyPI
    pyrind rate requests

    # CI gate: require a 9 or better, machine-readable output
    pyrind rate . --min 9 -o json

    # Skip checks that need the package index
    pyrind rate . --skip-checks SDist,BusFactor")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "PYRIND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `rate` subcommand
#[derive(Parser)]
struct RateArgs {
    /// Project directory, metadata file, or PyPI project name
    target: String,

    /// Treat the target as a project directory
    #[arg(short, long, conflicts_with_all = ["file", "pypi"])]
    directory: bool,

    /// Treat the target as a core-metadata file (PKG-INFO / METADATA)
    #[arg(short, long, conflicts_with = "pypi")]
    file: bool,

    /// Treat the target as a project name on PyPI
    #[arg(short, long)]
    pypi: bool,

    /// Minimum rating for a clean exit, 1-10 (default: 8)
    #[arg(short = 'n', long)]
    min: Option<u8>,

    /// Check names to skip, separated by commas, spaces, or semicolons
    #[arg(long, value_name = "NAMES")]
    skip_checks: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Print only the final score
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rate a package's metadata
    Rate(RateArgs),

    /// List the registered check names
    Checks,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Refresh the bundled classifier vocabulary snapshot
    #[cfg(feature = "refresh")]
    RefreshVocabulary {
        /// Where to write the snapshot
        #[arg(short, long, default_value = "data/classifiers.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Rate(args) => {
            let file_config = AppConfig::load(cli.config.as_deref())?;
            let config = merge_rate_config(args, &file_config)?;
            let exit_code = cli::run_rate(config)?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }

        Commands::Checks => {
            let exit_code = cli::run_checks()?;
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "pyrind", &mut io::stdout());
            Ok(())
        }

        #[cfg(feature = "refresh")]
        Commands::RefreshVocabulary { output } => {
            let vocabulary = pyrind::vocab::refresh_vocabulary(&output)?;
            eprintln!(
                "Wrote {} classifiers (release {}) to {}",
                vocabulary.len(),
                vocabulary.version(),
                output.display()
            );
            Ok(())
        }
    }
}

/// Fold the config file into the command line; explicit flags win.
fn merge_rate_config(args: RateArgs, file: &AppConfig) -> Result<RateConfig> {
    let mode = if args.directory {
        TargetMode::Directory
    } else if args.file {
        TargetMode::File
    } else if args.pypi {
        TargetMode::PyPi
    } else {
        TargetMode::Auto
    };

    let mut skip_checks = split_check_names(&args.skip_checks);
    if skip_checks.is_empty() {
        skip_checks = file.skip_checks.clone();
    }

    let output = match args.output {
        Some(format) => format,
        None => match file.output.as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        },
    };

    let min_score = args.min.or(file.min_score).unwrap_or(8);
    if !(1..=10).contains(&min_score) {
        anyhow::bail!("--min must be between 1 and 10, got {min_score}");
    }

    Ok(RateConfig {
        target: args.target,
        mode,
        min_score,
        skip_checks,
        output,
        quiet: args.quiet,
    })
}

/// Split repeated `--skip-checks` values on commas, spaces, and semicolons.
fn split_check_names(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split([',', ' ', ';']))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}
