//! Checks over the plain metadata fields: presence, version semantics,
//! description lengths, authorship, and URLs.

use super::{Check, Verdict};
use crate::model::{Field, FieldValue, MetadataRecord};
use crate::version::{self, Conformance};

/// Standard weight tiers, matching the relative importance the score
/// formula expects.
pub(crate) const WEIGHT_FULL: u32 = 100;
pub(crate) const WEIGHT_HALF: u32 = 50;
pub(crate) const WEIGHT_LOW: u32 = 20;

/// Reduced weight for a version that only matches the legacy grammar.
const WEIGHT_LEGACY_VERSION: u32 = 10;

// ============================================================================
// Field presence
// ============================================================================

/// Passes iff a named field is present and non-empty.
///
/// Covers the simple cases (name, version, keywords, author-email); checks
/// with extra logic around presence get their own types below.
pub(crate) struct FieldPresence {
    name: &'static str,
    field: Field,
    weight: u32,
    fatal: bool,
}

impl FieldPresence {
    pub(crate) const fn new(name: &'static str, field: Field, weight: u32) -> Self {
        Self {
            name,
            field,
            weight,
            fatal: false,
        }
    }

    /// A presence check whose failure zeroes the score.
    pub(crate) const fn fatal(name: &'static str, field: Field) -> Self {
        Self {
            name,
            field,
            weight: 0,
            fatal: true,
        }
    }

    fn message(&self) -> String {
        let punctuation = if self.fatal { "!" } else { "." };
        format!(
            "Your package does not have {} data{}",
            self.field, punctuation
        )
    }
}

impl Check for FieldPresence {
    fn name(&self) -> &'static str {
        self.name
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        if record.present(self.field) {
            Verdict::pass(self.weight)
        } else if self.fatal {
            Verdict::fatal(self.message())
        } else {
            Verdict::fail(self.weight, self.message())
        }
    }
}

// ============================================================================
// Version semantics
// ============================================================================

/// Fails when the version value is not carried as a string.
///
/// TOML and JSON sources happily produce `version = 1.0` as a number,
/// which breaks every consumer that compares versions lexically.
pub(crate) struct VersionIsString;

impl Check for VersionIsString {
    fn name(&self) -> &'static str {
        "VersionIsString"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        match record.get(Field::Version) {
            Some(FieldValue::Str(_)) => Verdict::pass(WEIGHT_HALF),
            _ => Verdict::fail(WEIGHT_HALF, "The version number should be a string."),
        }
    }
}

/// Validates the version string against the modern public-version grammar,
/// giving partial credit when only the legacy scheme matches.
pub(crate) struct PepVersion;

impl Check for PepVersion {
    fn name(&self) -> &'static str {
        "PepVersion"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        // Whatever the value's variant, judge its textual rendering; the
        // string-type complaint is VersionIsString's job.
        let version = record
            .get(Field::Version)
            .map(FieldValue::to_text)
            .unwrap_or_default();

        match version::conformance(&version) {
            Conformance::Modern => Verdict::pass(WEIGHT_HALF),
            Conformance::LegacyOnly => Verdict::fail(
                WEIGHT_LEGACY_VERSION,
                "The package's version number complies only with PEP 386 and not PEP 440.",
            ),
            Conformance::NonConforming => Verdict::fail(
                WEIGHT_HALF,
                "The package's version number does not comply with PEP 386 or PEP 440.",
            ),
        }
    }
}

/// Requires a parseable `requires-python` specifier set.
pub(crate) struct PythonRequires;

impl Check for PythonRequires {
    fn name(&self) -> &'static str {
        "PythonRequires"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let Some(requires) = record.str_value(Field::RequiresPython) else {
            return Verdict::fail(
                WEIGHT_HALF,
                "You should specify what Python versions you support with requires-python.",
            );
        };
        if requires.trim().is_empty() {
            return Verdict::fail(
                WEIGHT_HALF,
                "You should specify what Python versions you support with requires-python.",
            );
        }
        match version::parse_specifier_set(requires) {
            Ok(_) => Verdict::pass(WEIGHT_HALF),
            Err(err) => Verdict::fail(
                WEIGHT_HALF,
                format!("The requires-python value is not a valid specifier set: {err}"),
            ),
        }
    }
}

// ============================================================================
// Descriptions
// ============================================================================

/// The short description: fatal when completely absent, a normal failure
/// when present but ten characters or shorter.
pub(crate) struct Summary;

impl Check for Summary {
    fn name(&self) -> &'static str {
        "Summary"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let Some(summary) = record.str_value(Field::Summary).filter(|s| !s.is_empty()) else {
            return Verdict::fatal("The package had no description!");
        };
        if summary.chars().count() > 10 {
            Verdict::pass(WEIGHT_FULL)
        } else {
            Verdict::fail(
                WEIGHT_FULL,
                "The package's description should be longer than 10 characters.",
            )
        }
    }
}

/// The long description must exceed 100 characters. A missing or
/// non-string value counts as length zero.
pub(crate) struct Description;

impl Check for Description {
    fn name(&self) -> &'static str {
        "Description"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let length = record
            .str_value(Field::Description)
            .map_or(0, |text| text.chars().count());
        if length > 100 {
            Verdict::pass(WEIGHT_HALF)
        } else {
            Verdict::fail(WEIGHT_HALF, "The package's long description is quite short.")
        }
    }
}

// ============================================================================
// Authorship and URLs
// ============================================================================

/// Author name presence. An author-email of the form `Name <addr>`
/// already names the author, so it satisfies this check on its own.
pub(crate) struct Author;

impl Author {
    fn email_embeds_name(record: &MetadataRecord) -> bool {
        // "Jane Doe <jane@example.org>" names the author well enough.
        record
            .str_value(Field::AuthorEmail)
            .is_some_and(|email| match (email.find('<'), email.rfind('>')) {
                (Some(open), Some(close)) => open < close,
                _ => false,
            })
    }
}

impl Check for Author {
    fn name(&self) -> &'static str {
        "Author"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        if record.present(Field::Author) || Self::email_embeds_name(record) {
            Verdict::pass(WEIGHT_FULL)
        } else {
            Verdict::fail(WEIGHT_FULL, "Your package does not have author data.")
        }
    }
}

/// A project needs a link: either the home-page field or project URLs.
pub(crate) struct Url;

impl Check for Url {
    fn name(&self) -> &'static str {
        "Url"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        if record.present(Field::HomePage) || record.present(Field::ProjectUrls) {
            Verdict::pass(WEIGHT_LOW)
        } else {
            Verdict::fail(
                WEIGHT_LOW,
                "Your package should have a home-page or project-urls data.",
            )
        }
    }
}
