//! The check registry and the score aggregation.

use super::{
    Author, BuildSystem, BusFactor, Check, CheckManifest, ClassifierVerification, Description,
    DevStatusClassifier, Documentation, FieldPresence, Licensing, ManifestChecker, PepVersion,
    Pyproject, PythonRequires, PythonVersion, SDist, Summary, Url, ValidRst, Verdict,
    VersionIsString, WEIGHT_FULL, WEIGHT_LOW,
};
use crate::model::{Field, MetadataRecord};
use crate::vocab::ClassifierVocabulary;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Score labels, indexed by the final 0-10 score.
pub const LEVELS: [&str; 11] = [
    "This cheese seems to contain no dairy products",
    "Vieux Bologne",
    "Limburger",
    "Gorgonzola",
    "Stilton",
    "Brie",
    "Comté",
    "Jarlsberg",
    "Philadelphia",
    "Cottage Cheese",
    "Your cheese is so fresh most people think it's a cream: Mascarpone",
];

/// Synthetic problem name used when a record carries no data to rate.
const NO_DATA: &str = "NoData";

// ============================================================================
// Results
// ============================================================================

/// One reported deficiency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    /// Name of the check that produced the message.
    pub check: &'static str,
    /// Human-readable explanation.
    pub message: String,
    /// Whether this failure forced the score to 0.
    pub fatal: bool,
}

/// The outcome of rating one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rating {
    /// Final score, 0 through 10.
    pub score: u8,
    /// Deficiencies, in check registration order.
    pub problems: Vec<Problem>,
}

impl Rating {
    /// The problem messages, in registration order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.problems.iter().map(|p| p.message.as_str())
    }

    /// The label for this rating's score.
    #[must_use]
    pub fn level(&self) -> &'static str {
        LEVELS[usize::from(self.score.min(10))]
    }

    fn no_data(message: &str) -> Self {
        Self {
            score: 0,
            problems: vec![Problem {
                check: NO_DATA,
                message: message.to_string(),
                fatal: true,
            }],
        }
    }
}

// ============================================================================
// Registry construction
// ============================================================================

/// Assembles a [`CheckRegistry`], choosing the vocabulary and the
/// optional capabilities it is built with.
///
/// Capability-gated checks are part of the registry only when the
/// capability is supplied; there is no conditional logic at rating time.
#[derive(Default)]
pub struct CheckRegistryBuilder {
    vocabulary: Option<Arc<ClassifierVocabulary>>,
    manifest_checker: Option<Box<dyn ManifestChecker>>,
}

impl CheckRegistryBuilder {
    /// Start from the embedded vocabulary and no optional capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a caller-supplied vocabulary instead of the embedded snapshot.
    #[must_use]
    pub fn vocabulary(mut self, vocabulary: ClassifierVocabulary) -> Self {
        self.vocabulary = Some(Arc::new(vocabulary));
        self
    }

    /// Include the manifest-consistency check, backed by `checker`.
    #[must_use]
    pub fn manifest_checker(mut self, checker: Box<dyn ManifestChecker>) -> Self {
        self.manifest_checker = Some(checker);
        self
    }

    /// Build the registry with the full battery in its fixed order.
    #[must_use]
    pub fn build(self) -> CheckRegistry {
        let vocabulary = self
            .vocabulary
            .unwrap_or_else(|| Arc::new(ClassifierVocabulary::embedded().clone()));

        let mut checks: Vec<Box<dyn Check>> = vec![
            Box::new(FieldPresence::fatal("Name", Field::Name)),
            Box::new(FieldPresence::fatal("Version", Field::Version)),
            Box::new(VersionIsString),
            Box::new(PepVersion),
            Box::new(Summary),
            Box::new(Description),
            Box::new(ClassifierVerification::new(Arc::clone(&vocabulary))),
            Box::new(PythonVersion),
            Box::new(PythonRequires),
            Box::new(FieldPresence::new("Keywords", Field::Keywords, WEIGHT_LOW)),
            Box::new(Author),
            Box::new(FieldPresence::new(
                "AuthorEmail",
                Field::AuthorEmail,
                WEIGHT_FULL,
            )),
            Box::new(Url),
            Box::new(Licensing::new(vocabulary)),
            Box::new(DevStatusClassifier),
            Box::new(BuildSystem),
            Box::new(Pyproject),
            Box::new(SDist),
            Box::new(Documentation),
            Box::new(ValidRst),
            Box::new(BusFactor),
        ];
        if let Some(checker) = self.manifest_checker {
            checks.push(Box::new(CheckManifest::new(checker)));
        }
        CheckRegistry { checks }
    }
}

/// The ordered check battery.
///
/// Registration order is fixed at construction and determines the order
/// of reported problems; the score itself is order-independent.
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRegistry {
    /// The standard battery with the embedded vocabulary and no optional
    /// capabilities.
    #[must_use]
    pub fn standard() -> Self {
        CheckRegistryBuilder::new().build()
    }

    /// Start assembling a customized registry.
    #[must_use]
    pub fn builder() -> CheckRegistryBuilder {
        CheckRegistryBuilder::new()
    }

    /// The registered check names, in registration order.
    #[must_use]
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Rate a record with the full battery.
    #[must_use]
    pub fn rate(&self, record: &MetadataRecord) -> Rating {
        self.rate_with::<&str>(record, &[])
    }

    /// Rate a record, excluding the named checks entirely.
    ///
    /// Skipped checks contribute neither weight nor messages. Unknown
    /// names are ignored.
    #[must_use]
    pub fn rate_with<S: AsRef<str>>(&self, record: &MetadataRecord, skip: &[S]) -> Rating {
        if record.is_empty() {
            let message = if record.signals.build_failure {
                "A build configuration was found, but no package metadata \
                 could be collected from it."
            } else {
                "No package metadata was found; there is nothing to rate."
            };
            return Rating::no_data(message);
        }

        let mut good: u64 = 0;
        let mut bad: u64 = 0;
        let mut fatal = false;
        let mut problems = Vec::new();

        for check in &self.checks {
            let name = check.name();
            if skip.iter().any(|s| s.as_ref() == name) {
                debug!(check = name, "skipped");
                continue;
            }
            match check.test(record) {
                Verdict::Pass { weight } => {
                    good += u64::from(weight);
                }
                Verdict::Fail {
                    weight,
                    message,
                    fatal: is_fatal,
                } => {
                    debug!(check = name, fatal = is_fatal, "failed");
                    if is_fatal {
                        fatal = true;
                    } else {
                        bad += u64::from(weight);
                    }
                    problems.push(Problem {
                        check: name,
                        message,
                        fatal: is_fatal,
                    });
                }
                Verdict::NotApplicable => {}
            }
        }

        if fatal {
            return Rating { score: 0, problems };
        }
        if good + bad == 0 {
            // Every check was skipped or not applicable.
            return Rating::no_data("No checks could be applied to the package metadata.");
        }

        // Floor division maps an all-fail run to 1 and an all-pass run
        // to 10.
        #[allow(clippy::cast_possible_truncation)]
        let score = (good * 9 / (good + bad) + 1) as u8;
        Rating { score, problems }
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_record() -> MetadataRecord {
        MetadataRecord::new()
            .with(Field::Name, "complete")
            .with(Field::Version, "1.0")
            .with(Field::Summary, "This is a test package for the rater.")
            .with(Field::Description, format!("Complete\n========\n\n{}\n", "A long body. ".repeat(12)))
            .with(
                Field::Classifiers,
                vec![
                    "Development Status :: 6 - Mature".to_string(),
                    "Operating System :: OS Independent".to_string(),
                    "Programming Language :: Python :: 3.11".to_string(),
                    "License :: OSI Approved :: MIT License".to_string(),
                ],
            )
            .with(Field::Keywords, vec!["pypi".to_string(), "quality".to_string()])
            .with(Field::Author, "Jane Doe")
            .with(Field::AuthorEmail, "jane@example.org")
            .with(Field::HomePage, "https://example.org")
            .with(Field::License, "MIT")
            .with(Field::RequiresPython, ">=3.8")
    }

    #[test]
    fn complete_record_scores_ten_with_no_problems() {
        let rating = CheckRegistry::standard().rate(&complete_record());
        assert_eq!(rating.problems, Vec::new());
        assert_eq!(rating.score, 10);
        assert_eq!(rating.level(), LEVELS[10]);
    }

    #[test]
    fn minimal_record_scores_two_with_ordered_problems() {
        let record = MetadataRecord::new()
            .with(Field::Name, "minimal")
            .with(Field::Version, "0.1")
            .with(Field::Summary, "tiny");
        let rating = CheckRegistry::standard().rate(&record);

        assert_eq!(rating.score, 2);
        let failed: Vec<&str> = rating.problems.iter().map(|p| p.check).collect();
        assert_eq!(
            failed,
            [
                "Summary",
                "Description",
                "PythonVersion",
                "PythonRequires",
                "Keywords",
                "Author",
                "AuthorEmail",
                "Url",
                "Licensing",
                "DevStatusClassifier",
            ]
        );
        assert!(rating.problems.iter().all(|p| !p.fatal));
    }

    #[test]
    fn missing_name_is_fatal() {
        let record = MetadataRecord::new().with(Field::Version, "1.0");
        let rating = CheckRegistry::standard().rate(&record);
        assert_eq!(rating.score, 0);
        assert!(rating.problems.iter().any(|p| p.fatal));
    }

    #[test]
    fn missing_version_is_fatal() {
        let record = complete_record();
        let mut record = record;
        record.insert(Field::Version, "");
        let rating = CheckRegistry::standard().rate(&record);
        assert_eq!(rating.score, 0);
    }

    #[test]
    fn empty_record_reports_one_message() {
        let rating = CheckRegistry::standard().rate(&MetadataRecord::new());
        assert_eq!(rating.score, 0);
        assert_eq!(rating.problems.len(), 1);
        assert!(rating.problems[0].message.contains("No package metadata"));
    }

    #[test]
    fn empty_record_with_build_failure_signal() {
        let mut record = MetadataRecord::new();
        record.signals.build_failure = true;
        let rating = CheckRegistry::standard().rate(&record);
        assert_eq!(rating.score, 0);
        assert_eq!(rating.problems.len(), 1);
        assert!(rating.problems[0].message.contains("build configuration"));
    }

    #[test]
    fn skipping_checks_removes_their_messages_only() {
        let record = MetadataRecord::new()
            .with(Field::Name, "minimal")
            .with(Field::Version, "0.1")
            .with(Field::Summary, "A small package but with a long enough summary.");
        let registry = CheckRegistry::standard();

        let full = registry.rate(&record);
        let skipped = registry.rate_with(&record, &["Keywords", "Url"]);

        assert!(skipped.problems.len() < full.problems.len());
        for problem in &skipped.problems {
            assert!(full.problems.contains(problem));
        }
        assert!(!skipped.problems.iter().any(|p| p.check == "Keywords"));
    }

    #[test]
    fn unknown_skip_names_are_inert() {
        let registry = CheckRegistry::standard();
        let record = complete_record();
        assert_eq!(registry.rate_with(&record, &["Nonexistent"]), registry.rate(&record));
    }

    #[test]
    fn skipping_everything_yields_the_no_data_outcome() {
        let registry = CheckRegistry::standard();
        let names = registry.check_names();
        let rating = registry.rate_with(&complete_record(), &names);
        assert_eq!(rating.score, 0);
        assert_eq!(rating.problems.len(), 1);
    }

    #[test]
    fn rating_is_idempotent() {
        let registry = CheckRegistry::standard();
        let record = MetadataRecord::new()
            .with(Field::Name, "pkg")
            .with(Field::Version, "1.0a1.2")
            .with(Field::Summary, "Long enough summary text.");
        assert_eq!(registry.rate(&record), registry.rate(&record));
    }

    #[test]
    fn manifest_check_present_only_when_capability_is() {
        let standard = CheckRegistry::standard();
        assert!(!standard.check_names().contains(&"CheckManifest"));

        struct AlwaysConsistent;
        impl ManifestChecker for AlwaysConsistent {
            fn is_consistent(&self, _path: &std::path::Path) -> Result<bool, String> {
                Ok(true)
            }
        }
        let with_manifest = CheckRegistry::builder()
            .manifest_checker(Box::new(AlwaysConsistent))
            .build();
        assert!(with_manifest.check_names().contains(&"CheckManifest"));
    }

    #[test]
    fn check_names_are_stable_and_ordered() {
        let names = CheckRegistry::standard().check_names();
        assert_eq!(names[0], "Name");
        assert_eq!(names[1], "Version");
        assert_eq!(names.last(), Some(&"BusFactor"));
        assert_eq!(names.len(), 21);
    }

    #[test]
    fn levels_cover_all_scores() {
        assert_eq!(LEVELS.len(), 11);
        let rating = Rating {
            score: 0,
            problems: Vec::new(),
        };
        assert_eq!(rating.level(), LEVELS[0]);
    }
}
