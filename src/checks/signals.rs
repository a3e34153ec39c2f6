//! Checks driven by collector signals rather than metadata fields:
//! build-system health, source distribution availability, documentation,
//! and the owner bus factor.

use super::metadata::{WEIGHT_FULL, WEIGHT_HALF};
use super::{Check, Verdict};
use crate::model::MetadataRecord;

// ============================================================================
// Build-system health
// ============================================================================

/// Negative-only: fails when the collector could not find any way to
/// build the project, not-applicable otherwise. There is no "pass" here;
/// a working build system is simply the absence of the problem.
pub(crate) struct BuildSystem;

impl Check for BuildSystem {
    fn name(&self) -> &'static str {
        "BuildSystem"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        if record.signals.missing_build_system {
            Verdict::fail(
                WEIGHT_FULL,
                "Your project does not have a pyproject.toml or a setup.py; \
                 there is no standard way to build it.",
            )
        } else {
            Verdict::not_applicable()
        }
    }
}

/// Negative-only: fails when the project builds from a setup script
/// without a modern pyproject.toml.
pub(crate) struct Pyproject;

impl Check for Pyproject {
    fn name(&self) -> &'static str {
        "Pyproject"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        if record.signals.missing_pyproject {
            Verdict::fail(
                WEIGHT_HALF,
                "Your project builds from a setup.py without a pyproject.toml; \
                 setup.py-only builds are deprecated.",
            )
        } else {
            Verdict::not_applicable()
        }
    }
}

// ============================================================================
// Index-side signals
// ============================================================================

/// A release on the index should publish a source distribution.
/// Not-applicable when the record did not come from an index lookup.
pub(crate) struct SDist;

impl Check for SDist {
    fn name(&self) -> &'static str {
        "SDist"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        match record.signals.has_sdist {
            None => Verdict::not_applicable(),
            Some(true) => Verdict::pass(WEIGHT_FULL),
            Some(false) => Verdict::fail(
                WEIGHT_FULL,
                "You have no source distribution on PyPI. Uploading one \
                 ensures maximum availability of your package.",
            ),
        }
    }
}

/// Advisory only: weight 0, so the suggestion never moves the score.
pub(crate) struct Documentation;

impl Check for Documentation {
    fn name(&self) -> &'static str {
        "Documentation"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        match record.signals.documentation {
            None => Verdict::not_applicable(),
            Some(true) => Verdict::pass(0),
            Some(false) => Verdict::fail(
                0,
                "You might want to link to your documentation from a \
                 project URL.",
            ),
        }
    }
}

/// Single points of failure are risky: one owner fails at full weight,
/// two at half, three or more pass.
pub(crate) struct BusFactor;

impl Check for BusFactor {
    fn name(&self) -> &'static str {
        "BusFactor"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let Some(owners) = record.signals.owners.as_deref() else {
            return Verdict::not_applicable();
        };
        let message = "You should have three or more owners of the project on PyPI.";
        match owners.len() {
            1 => Verdict::fail(WEIGHT_FULL, message),
            2 => Verdict::fail(WEIGHT_HALF, message),
            _ => Verdict::pass(WEIGHT_FULL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(names: &[&str]) -> MetadataRecord {
        let mut record = MetadataRecord::new();
        record.signals.owners = Some(names.iter().map(ToString::to_string).collect());
        record
    }

    #[test]
    fn build_system_is_negative_only() {
        assert_eq!(
            BuildSystem.test(&MetadataRecord::new()),
            Verdict::NotApplicable
        );

        let mut record = MetadataRecord::new();
        record.signals.missing_build_system = true;
        assert!(BuildSystem.test(&record).is_fail());
    }

    #[test]
    fn pyproject_is_negative_only() {
        assert_eq!(
            Pyproject.test(&MetadataRecord::new()),
            Verdict::NotApplicable
        );

        let mut record = MetadataRecord::new();
        record.signals.missing_pyproject = true;
        match Pyproject.test(&record) {
            Verdict::Fail { weight, .. } => assert_eq!(weight, WEIGHT_HALF),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn sdist_signal_tristate() {
        assert_eq!(SDist.test(&MetadataRecord::new()), Verdict::NotApplicable);

        let mut record = MetadataRecord::new();
        record.signals.has_sdist = Some(true);
        assert!(SDist.test(&record).is_pass());

        record.signals.has_sdist = Some(false);
        assert!(SDist.test(&record).is_fail());
    }

    #[test]
    fn documentation_is_score_neutral() {
        let mut record = MetadataRecord::new();
        record.signals.documentation = Some(false);
        match Documentation.test(&record) {
            Verdict::Fail { weight, .. } => assert_eq!(weight, 0),
            other => panic!("expected failure, got {other:?}"),
        }

        record.signals.documentation = Some(true);
        assert_eq!(Documentation.test(&record), Verdict::pass(0));
    }

    #[test]
    fn bus_factor_severity_grades_with_owner_count() {
        assert_eq!(
            BusFactor.test(&MetadataRecord::new()),
            Verdict::NotApplicable
        );

        match BusFactor.test(&owners(&["alice"])) {
            Verdict::Fail { weight, .. } => assert_eq!(weight, WEIGHT_FULL),
            other => panic!("expected failure, got {other:?}"),
        }
        match BusFactor.test(&owners(&["alice", "bob"])) {
            Verdict::Fail { weight, .. } => assert_eq!(weight, WEIGHT_HALF),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(
            BusFactor.test(&owners(&["alice", "bob", "carol"])),
            Verdict::pass(WEIGHT_FULL)
        );
    }
}
