//! The `rate` command handler.

use super::exit_codes;
use crate::checks::CheckRegistry;
use crate::extract::{pkginfo, project};
use crate::model::{Field, MetadataRecord};
use anyhow::{bail, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

const SEPARATOR: &str = "------------------------------";

/// What kind of target the argument names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// Pick by inspecting the filesystem: directory, file, else index name.
    Auto,
    /// A project directory.
    Directory,
    /// A core-metadata file (`PKG-INFO` / `METADATA`).
    File,
    /// A project name on the package index.
    PyPi,
}

/// Output format for the rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    Text,
    /// Machine-readable JSON document.
    Json,
}

/// Rate command configuration.
pub struct RateConfig {
    /// Directory, metadata file, or index project name.
    pub target: String,
    pub mode: TargetMode,
    /// Exit with [`exit_codes::BELOW_MINIMUM`] below this score.
    pub min_score: u8,
    /// Check names to exclude.
    pub skip_checks: Vec<String>,
    pub output: OutputFormat,
    /// Print only the final score.
    pub quiet: bool,
}

/// Run the rate command, returning the desired exit code.
pub fn run_rate(config: RateConfig) -> Result<i32> {
    let registry = CheckRegistry::standard();
    validate_skip_names(&config.skip_checks, &registry)?;

    let record = collect_record(&config)?;

    tracing::info!(package = %config.target, "rating package metadata");
    let rating = registry.rate_with(&record, &config.skip_checks);

    match config.output {
        OutputFormat::Text => print_text_report(&config, &record, &rating),
        OutputFormat::Json => print_json_report(&rating),
    }

    if rating.score < config.min_score {
        return Ok(exit_codes::BELOW_MINIMUM);
    }
    Ok(exit_codes::SUCCESS)
}

/// Reject unknown skip names with a nearest-name hint. The engine would
/// silently ignore them, which on the command line just hides typos.
fn validate_skip_names(skips: &[String], registry: &CheckRegistry) -> Result<()> {
    let known = registry.check_names();
    for skip in skips {
        if known.contains(&skip.as_str()) {
            continue;
        }
        let suggestion = known
            .iter()
            .map(|name| (strsim::jaro_winkler(skip, name), *name))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .filter(|(score, _)| *score > 0.8);
        match suggestion {
            Some((_, name)) => bail!("unknown check `{skip}`; did you mean `{name}`?"),
            None => bail!(
                "unknown check `{skip}`; available checks: {}",
                known.join(", ")
            ),
        }
    }
    Ok(())
}

fn collect_record(config: &RateConfig) -> Result<MetadataRecord> {
    let path = Path::new(&config.target);
    let mode = match config.mode {
        TargetMode::Auto => {
            if path.is_dir() {
                TargetMode::Directory
            } else if path.is_file() {
                TargetMode::File
            } else {
                TargetMode::PyPi
            }
        }
        explicit => explicit,
    };

    let record = match mode {
        TargetMode::Directory => project::collect(absolute(path))?,
        TargetMode::File => pkginfo::collect(absolute(path))?,
        TargetMode::PyPi => collect_from_index(&config.target)?,
        TargetMode::Auto => unreachable!("auto mode resolved above"),
    };
    Ok(record)
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(feature = "index")]
fn collect_from_index(project: &str) -> Result<MetadataRecord> {
    Ok(crate::extract::pypi::collect(project)?)
}

#[cfg(not(feature = "index"))]
fn collect_from_index(project: &str) -> Result<MetadataRecord> {
    bail!("`{project}` is not a directory or file, and this build has no package-index support")
}

fn print_text_report(config: &RateConfig, record: &MetadataRecord, rating: &crate::checks::Rating) {
    if config.quiet {
        println!("{}", rating.score);
        return;
    }
    println!("{SEPARATOR}");
    println!("Checking {}", config.target);
    println!(
        "Found {}",
        record.str_value(Field::Name).unwrap_or("nothing")
    );
    println!("{SEPARATOR}");
    for message in rating.messages() {
        println!("{message}");
    }
    if !rating.problems.is_empty() {
        println!("{SEPARATOR}");
    }
    println!("Final rating: {}/10", rating.score);
    println!("{}", rating.level());
    println!("{SEPARATOR}");
}

fn print_json_report(rating: &crate::checks::Rating) {
    let document = json!({
        "score": rating.score,
        "level": rating.level(),
        "problems": rating.problems,
    });
    // Serialization of a plain value cannot fail.
    println!(
        "{}",
        serde_json::to_string_pretty(&document).unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_skip_names_validate() {
        let registry = CheckRegistry::standard();
        let skips = vec!["BusFactor".to_string(), "SDist".to_string()];
        assert!(validate_skip_names(&skips, &registry).is_ok());
    }

    #[test]
    fn typoed_skip_name_gets_a_suggestion() {
        let registry = CheckRegistry::standard();
        let err = validate_skip_names(&["BusFaktor".to_string()], &registry).unwrap_err();
        assert!(err.to_string().contains("BusFactor"), "{err}");
    }

    #[test]
    fn unrelated_skip_name_lists_available_checks() {
        let registry = CheckRegistry::standard();
        let err = validate_skip_names(&["zzzzzz".to_string()], &registry).unwrap_err();
        assert!(err.to_string().contains("available checks"), "{err}");
    }

    #[test]
    fn directory_mode_rates_a_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"sample\"\nversion = \"1.0\"\n\
             description = \"A sample project for the handler test.\"\n",
        )
        .unwrap();

        let config = RateConfig {
            target: dir.path().display().to_string(),
            mode: TargetMode::Auto,
            min_score: 1,
            skip_checks: Vec::new(),
            output: OutputFormat::Text,
            quiet: true,
        };
        assert_eq!(run_rate(config).unwrap(), exit_codes::SUCCESS);
    }

    #[test]
    fn below_minimum_exits_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"sample\"\nversion = \"1.0\"\n\
             description = \"A sample project for the handler test.\"\n",
        )
        .unwrap();

        let config = RateConfig {
            target: dir.path().display().to_string(),
            mode: TargetMode::Directory,
            min_score: 10,
            skip_checks: Vec::new(),
            output: OutputFormat::Text,
            quiet: true,
        };
        assert_eq!(run_rate(config).unwrap(), exit_codes::BELOW_MINIMUM);
    }
}
