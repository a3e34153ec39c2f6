//! **Rate the packaging friendliness of Python project metadata.**
//!
//! `pyrind` inspects a package's distributable metadata — name, version,
//! descriptions, classifiers, license, authorship, build configuration —
//! and produces a 1-10 quality score plus a list of concrete
//! deficiencies. It answers the question "how annoyed will people be
//! when they try to install and evaluate this package?".
//!
//! ## How it works
//!
//! Metadata from any source is normalized into a
//! [`MetadataRecord`](model::MetadataRecord), a typed key-value view of
//! the core-metadata fields. A [`CheckRegistry`](checks::CheckRegistry)
//! then runs a fixed battery of weighted checks over the record: field
//! presence, PEP 440 version conformance, classifier taxonomy
//! conformance, Python version specificity, licensing consistency,
//! reStructuredText validity, and a handful of signals collected from
//! the filesystem or the package index. The weighted pass/fail results
//! fold into a single score between 0 and 10.
//!
//! ## Modules
//!
//! - **[`model`]**: the [`MetadataRecord`](model::MetadataRecord) and its
//!   collector [`Signals`](model::Signals).
//! - **[`extract`]**: collectors that build records from project
//!   directories, core-metadata files, and the package index.
//! - **[`checks`]**: the rating engine — the check battery, registry,
//!   and score aggregation.
//! - **[`vocab`]**: the canonical classifier vocabulary and the license
//!   code cross-reference derived from it.
//! - **[`version`]**: PEP 440 and legacy PEP 386 version grammars and
//!   specifier-set parsing.
//! - **[`rst`]**: structural reStructuredText validation.
//!
//! ## Getting started
//!
//! ```no_run
//! use pyrind::extract::project;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let record = project::collect("path/to/project")?;
//!     let rating = pyrind::rate(&record);
//!
//!     println!("{}/10", rating.score);
//!     for message in rating.messages() {
//!         println!("{message}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Records can also be built by hand, which is how the test-suite and
//! downstream tooling drive the engine:
//!
//! ```
//! use pyrind::model::{Field, MetadataRecord};
//!
//! let record = MetadataRecord::new()
//!     .with(Field::Name, "demo")
//!     .with(Field::Version, "1.0");
//! let rating = pyrind::rate(&record);
//! assert!(rating.score < 10);
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // # Errors / # Panics doc sections are aspirational for now
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod rst;
pub mod version;
pub mod vocab;

// Re-export main types for convenience
pub use checks::{CheckRegistry, ManifestChecker, Problem, Rating, LEVELS};
pub use config::AppConfig;
pub use error::{ErrorContext, OptionContext, PyrindError, Result};
pub use model::{Field, FieldValue, MetadataRecord, Signals};
pub use vocab::ClassifierVocabulary;

use std::sync::OnceLock;

fn standard_registry() -> &'static CheckRegistry {
    static REGISTRY: OnceLock<CheckRegistry> = OnceLock::new();
    REGISTRY.get_or_init(CheckRegistry::standard)
}

/// Rate a record with the standard check battery.
#[must_use]
pub fn rate(record: &MetadataRecord) -> Rating {
    standard_registry().rate(record)
}

/// Rate a record with the standard battery, excluding the named checks.
#[must_use]
pub fn rate_with<S: AsRef<str>>(record: &MetadataRecord, skip: &[S]) -> Rating {
    standard_registry().rate_with(record, skip)
}
