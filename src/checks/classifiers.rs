//! Checks over the declared classifier list: taxonomy conformance,
//! Python version specificity, and development status.

use super::metadata::{WEIGHT_FULL, WEIGHT_LOW};
use super::{Check, Verdict};
use crate::model::MetadataRecord;
use crate::vocab::{ClassifierVocabulary, PRIVATE_PREFIX};
use std::sync::Arc;

/// Reduced weight when a major Python version was declared but no minor.
const WEIGHT_MAJOR_ONLY: u32 = 25;

// ============================================================================
// Taxonomy conformance
// ============================================================================

/// Every declared classifier must appear in the canonical vocabulary.
///
/// Classifiers under the `Private ::` namespace are exempt; indexes
/// reserve it for strings that are deliberately not canonical.
pub(crate) struct ClassifierVerification {
    vocabulary: Arc<ClassifierVocabulary>,
}

impl ClassifierVerification {
    pub(crate) fn new(vocabulary: Arc<ClassifierVocabulary>) -> Self {
        Self { vocabulary }
    }
}

impl Check for ClassifierVerification {
    fn name(&self) -> &'static str {
        "ClassifierVerification"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let invalid: Vec<&str> = record
            .classifiers()
            .iter()
            .map(String::as_str)
            .filter(|c| !c.starts_with(PRIVATE_PREFIX) && !self.vocabulary.contains(c))
            .collect();

        if invalid.is_empty() {
            Verdict::pass(WEIGHT_LOW)
        } else {
            Verdict::fail(
                WEIGHT_LOW,
                format!(
                    "Some of your classifiers are not standard: {}.",
                    invalid.join(", ")
                ),
            )
        }
    }
}

// ============================================================================
// Python version specificity
// ============================================================================

/// Looks for `Programming Language :: Python :: X` classifiers.
///
/// A minor version such as `3.11` passes at full weight. Major-only
/// declarations (`2`, `3`) fail with partial credit; no Python classifier
/// at all fails at full weight.
pub(crate) struct PythonVersion;

impl Check for PythonVersion {
    fn name(&self) -> &'static str {
        "PythonVersion"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let mut major_version_specified = false;

        for classifier in record.classifiers() {
            let parts: Vec<&str> = classifier.split("::").map(str::trim).collect();
            if parts.first() != Some(&"Programming Language") || parts.get(1) != Some(&"Python") {
                continue;
            }
            let Some(version) = parts.get(2) else {
                // Python declared, but no version at all.
                continue;
            };
            if version.parse::<f64>().is_err() {
                // Something like "Implementation :: CPython"; not a version.
                continue;
            }
            if version.parse::<i64>().is_err() {
                // A float but not an int, i.e. "3.11" rather than "3".
                // One minor version is enough.
                return Verdict::pass(WEIGHT_FULL);
            }
            major_version_specified = true;
        }

        if major_version_specified {
            Verdict::fail(
                WEIGHT_MAJOR_ONLY,
                "The classifiers should specify what minor versions of Python \
                 you support as well as what major version.",
            )
        } else {
            Verdict::fail(
                WEIGHT_FULL,
                "You should specify what Python versions you support.",
            )
        }
    }
}

// ============================================================================
// Development status
// ============================================================================

/// At least one `Development Status ::` classifier must be declared.
pub(crate) struct DevStatusClassifier;

impl Check for DevStatusClassifier {
    fn name(&self) -> &'static str {
        "DevStatusClassifier"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let declared = record
            .classifiers()
            .iter()
            .any(|c| c.starts_with("Development Status ::"));
        if declared {
            Verdict::pass(WEIGHT_LOW)
        } else {
            Verdict::fail(
                WEIGHT_LOW,
                "Specify a Development Status classifier so users know how \
                 mature the package is.",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;

    fn with_classifiers(classifiers: &[&str]) -> MetadataRecord {
        MetadataRecord::new().with(
            Field::Classifiers,
            classifiers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
        )
    }

    fn verification() -> ClassifierVerification {
        ClassifierVerification::new(Arc::new(ClassifierVocabulary::embedded().clone()))
    }

    #[test]
    fn canonical_classifiers_verify() {
        let check = verification();
        let record = with_classifiers(&[
            "Development Status :: 5 - Production/Stable",
            "Programming Language :: Python :: 3.11",
        ]);
        assert!(check.test(&record).is_pass());
    }

    #[test]
    fn unknown_classifiers_are_reported_by_name() {
        let check = verification();
        let record = with_classifiers(&[
            "Programming Language :: Python :: 3.11",
            "Made Up :: Classifier",
        ]);
        match check.test(&record) {
            Verdict::Fail { message, .. } => {
                assert!(message.contains("Made Up :: Classifier"), "{message}");
                assert!(!message.contains("3.11"), "{message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn private_namespace_is_exempt() {
        let check = verification();
        let record = with_classifiers(&["Private :: Do Not Upload"]);
        assert!(check.test(&record).is_pass());
    }

    #[test]
    fn empty_classifier_list_verifies() {
        assert!(verification().test(&MetadataRecord::new()).is_pass());
    }

    #[test]
    fn minor_python_version_passes() {
        let record = with_classifiers(&[
            "Programming Language :: Python :: 3",
            "Programming Language :: Python :: 3.9",
        ]);
        assert_eq!(PythonVersion.test(&record), Verdict::pass(WEIGHT_FULL));
    }

    #[test]
    fn major_only_fails_at_reduced_weight() {
        let record = with_classifiers(&["Programming Language :: Python :: 3"]);
        match PythonVersion.test(&record) {
            Verdict::Fail {
                weight, message, ..
            } => {
                assert_eq!(weight, WEIGHT_MAJOR_ONLY);
                assert!(message.contains("minor versions"), "{message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn no_python_classifier_fails_at_full_weight() {
        let record = with_classifiers(&["Topic :: Utilities"]);
        match PythonVersion.test(&record) {
            Verdict::Fail { weight, .. } => assert_eq!(weight, WEIGHT_FULL),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn non_version_python_classifiers_are_ignored() {
        let record = with_classifiers(&[
            "Programming Language :: Python",
            "Programming Language :: Python :: Implementation :: CPython",
        ]);
        match PythonVersion.test(&record) {
            Verdict::Fail { weight, .. } => assert_eq!(weight, WEIGHT_FULL),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn development_status_classifier_check() {
        let record = with_classifiers(&["Development Status :: 4 - Beta"]);
        assert!(DevStatusClassifier.test(&record).is_pass());
        assert!(DevStatusClassifier.test(&MetadataRecord::new()).is_fail());
    }
}
