//! The rating engine: a fixed battery of weighted checks over a
//! [`MetadataRecord`](crate::model::MetadataRecord).
//!
//! Each check looks at one aspect of the metadata and produces a
//! [`Verdict`]: pass, fail, or not-applicable. Failing checks contribute
//! their weight to the "bad" accumulator and a human-readable message to
//! the problem list; passing checks contribute to "good"; not-applicable
//! checks contribute nothing. Two checks (name and version presence) are
//! fatal and force the score to 0 when they fail. The
//! [`CheckRegistry`] owns the battery, runs it in a fixed order, and folds
//! the verdicts into a [`Rating`].
//!
//! Checks are stateless: `test` borrows the check and the record, and the
//! verdict carries the message and effective weight with it. Rating the
//! same record twice, or from several threads at once, yields identical
//! results.

mod classifiers;
mod licensing;
mod manifest;
mod markup;
mod metadata;
mod registry;
mod signals;

pub use manifest::ManifestChecker;
pub use registry::{CheckRegistry, CheckRegistryBuilder, Problem, Rating, LEVELS};

use crate::model::MetadataRecord;

// ============================================================================
// Verdicts
// ============================================================================

/// The outcome of running one check against a record.
///
/// A failing verdict carries everything the aggregator needs: the message
/// to report, the weight to count against the score, and whether the
/// failure is fatal. A check whose severity depends on the data (partial
/// version compliance, major-only Python classifiers, the owner count)
/// expresses that by putting a different weight into its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The check passed; `weight` is credited to the good accumulator.
    Pass { weight: u32 },
    /// The check failed.
    Fail {
        weight: u32,
        message: String,
        fatal: bool,
    },
    /// The check's precondition data is absent; it is not counted at all.
    NotApplicable,
}

impl Verdict {
    /// A passing verdict worth `weight`.
    #[must_use]
    pub const fn pass(weight: u32) -> Self {
        Self::Pass { weight }
    }

    /// An ordinary failure worth `weight`.
    pub fn fail(weight: u32, message: impl Into<String>) -> Self {
        Self::Fail {
            weight,
            message: message.into(),
            fatal: false,
        }
    }

    /// A failure that forces the final score to 0.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fail {
            weight: 0,
            message: message.into(),
            fatal: true,
        }
    }

    /// Shorthand for [`Verdict::NotApplicable`].
    #[must_use]
    pub const fn not_applicable() -> Self {
        Self::NotApplicable
    }

    /// Whether this is a passing verdict.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    /// Whether this is a failing verdict, fatal or not.
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

// ============================================================================
// The check contract
// ============================================================================

/// One independently weighted test over a metadata record.
///
/// Implementations must be pure: no state may survive a call to `test`,
/// and the verdict must depend only on the record.
pub trait Check: Send + Sync {
    /// Stable identifier, used in skip lists and problem reports.
    fn name(&self) -> &'static str;

    /// Run the check against a record.
    fn test(&self, record: &MetadataRecord) -> Verdict;
}

pub(crate) use classifiers::{ClassifierVerification, DevStatusClassifier, PythonVersion};
pub(crate) use licensing::Licensing;
pub(crate) use manifest::CheckManifest;
pub(crate) use markup::ValidRst;
pub(crate) use metadata::{
    Author, FieldPresence, PepVersion, PythonRequires, Summary, Url, VersionIsString,
};
pub(crate) use metadata::{Description, WEIGHT_FULL, WEIGHT_LOW};
pub(crate) use signals::{BuildSystem, BusFactor, Documentation, Pyproject, SDist};
