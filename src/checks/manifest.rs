//! Optional manifest-consistency check.
//!
//! Whether the files in a source tree match what would be distributed is
//! something an external tool knows; the engine only defines the
//! capability seam. A registry built without a [`ManifestChecker`] simply
//! does not contain this check.

use super::metadata::WEIGHT_HALF;
use super::{Check, Verdict};
use crate::model::MetadataRecord;
use std::path::Path;

/// External capability that can compare a source tree against its
/// would-be distribution contents.
pub trait ManifestChecker: Send + Sync {
    /// Returns whether the tree at `path` is consistent with what should
    /// be distributed.
    fn is_consistent(&self, path: &Path) -> Result<bool, String>;
}

pub(crate) struct CheckManifest {
    checker: Box<dyn ManifestChecker>,
}

impl CheckManifest {
    pub(crate) fn new(checker: Box<dyn ManifestChecker>) -> Self {
        Self { checker }
    }
}

impl Check for CheckManifest {
    fn name(&self) -> &'static str {
        "CheckManifest"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let Some(path) = record.signals.source_path.as_deref() else {
            // Nothing on disk to compare against.
            return Verdict::not_applicable();
        };
        match self.checker.is_consistent(path) {
            Ok(true) => Verdict::pass(WEIGHT_HALF),
            Ok(false) => Verdict::fail(
                WEIGHT_HALF,
                "The manifest does not match the files that should be \
                 distributed.",
            ),
            // A broken checker is reported, not propagated.
            Err(err) => Verdict::fail(WEIGHT_HALF, format!("The manifest check failed: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Fixed(Result<bool, String>);

    impl ManifestChecker for Fixed {
        fn is_consistent(&self, _path: &Path) -> Result<bool, String> {
            self.0.clone()
        }
    }

    fn record_with_path() -> MetadataRecord {
        let mut record = MetadataRecord::new();
        record.signals.source_path = Some(PathBuf::from("/tmp/project"));
        record
    }

    #[test]
    fn not_applicable_without_a_source_path() {
        let check = CheckManifest::new(Box::new(Fixed(Ok(false))));
        assert_eq!(check.test(&MetadataRecord::new()), Verdict::NotApplicable);
    }

    #[test]
    fn consistent_tree_passes() {
        let check = CheckManifest::new(Box::new(Fixed(Ok(true))));
        assert!(check.test(&record_with_path()).is_pass());
    }

    #[test]
    fn inconsistent_tree_fails() {
        let check = CheckManifest::new(Box::new(Fixed(Ok(false))));
        assert!(check.test(&record_with_path()).is_fail());
    }

    #[test]
    fn checker_errors_become_ordinary_failures() {
        let check = CheckManifest::new(Box::new(Fixed(Err("tool exploded".to_string()))));
        match check.test(&record_with_path()) {
            Verdict::Fail { message, fatal, .. } => {
                assert!(!fatal);
                assert!(message.contains("tool exploded"), "{message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
