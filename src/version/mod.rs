//! Version identifier grammars for Python packaging.
//!
//! Two grammars are recognized: the modern public-version grammar from
//! PEP 440 and the older PEP 386 scheme it replaced. The version check
//! gives partial credit for versions that only the legacy grammar accepts,
//! so both are exposed here, plus a light structural analysis used by the
//! specifier parser.

mod specifier;

pub use specifier::{parse_specifier_set, Operator, Specifier, SpecifierError};

use regex::Regex;
use std::sync::OnceLock;

/// PEP 440 public version identifiers.
///
/// Differences from the reference pattern: a pre-release letter must be
/// followed by a number (`1.0a1` is accepted, bare `1.0a` is not), which
/// keeps ambiguous suffixes out of the "compliant" bucket.
const MODERN_GRAMMAR: &str = r"(?xi)
    ^\s*
    v?
    (?:
        (?:(?P<epoch>[0-9]+)!)?                 # epoch
        (?P<release>[0-9]+(?:\.[0-9]+)*)        # release segment
        (?P<pre>                                # pre-release
            [-_.]?
            (?P<pre_l>a|b|c|rc|alpha|beta|pre|preview)
            [-_.]?
            (?P<pre_n>[0-9]+)
        )?
        (?P<post>                               # post release
            (?:-(?P<post_n1>[0-9]+))
            |
            (?:
                [-_.]?
                (?P<post_l>post|rev|r)
                [-_.]?
                (?P<post_n2>[0-9]+)?
            )
        )?
        (?P<dev>                                # dev release
            [-_.]?
            dev
            [-_.]?
            (?P<dev_n>[0-9]+)?
        )?
    )
    (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?   # local version
    \s*$
";

/// PEP 386 version identifiers: at least `N.N`, optional extra `.N`
/// segments, optional pre-release letter with a (possibly dotted) number,
/// optional `.postN` and `.devN`. Case-sensitive, unlike PEP 440.
const LEGACY_GRAMMAR: &str = r"(?x)
    ^
    (?P<version>\d+\.\d+)                   # minimum two segments
    (?P<extraversion>(?:\.\d+)*)
    (?:
        (?P<prerel>[abc]|rc)
        (?P<prerelversion>\d+(?:\.\d+)*)
    )?
    (?P<postdev>(?:\.post\d+)?(?:\.dev\d+)?)?
    $
";

fn modern_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MODERN_GRAMMAR).expect("modern version grammar compiles"))
}

fn legacy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LEGACY_GRAMMAR).expect("legacy version grammar compiles"))
}

/// How a version string relates to the two grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conformance {
    /// Matches PEP 440 (possibly PEP 386 as well).
    Modern,
    /// Matches only the obsolete PEP 386 scheme.
    LegacyOnly,
    /// Matches neither grammar.
    NonConforming,
}

/// Classify a version string against both grammars.
#[must_use]
pub fn conformance(version: &str) -> Conformance {
    if is_modern(version) {
        Conformance::Modern
    } else if is_legacy(version) {
        Conformance::LegacyOnly
    } else {
        Conformance::NonConforming
    }
}

/// Whether a version string is a valid PEP 440 public version identifier.
#[must_use]
pub fn is_modern(version: &str) -> bool {
    modern_re().is_match(version)
}

/// Whether a version string matches the legacy PEP 386 scheme.
#[must_use]
pub fn is_legacy(version: &str) -> bool {
    legacy_re().is_match(version)
}

/// Structural facts about a modern version, for specifier validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VersionShape {
    /// Number of dot-separated components in the release segment.
    pub release_segments: usize,
    /// Whether a `+local` label is attached.
    pub has_local: bool,
}

/// Analyze a version string, returning `None` when it is not modern.
pub(crate) fn analyze(version: &str) -> Option<VersionShape> {
    let caps = modern_re().captures(version)?;
    let release = caps.name("release")?.as_str();
    Some(VersionShape {
        release_segments: release.split('.').count(),
        has_local: caps.name("local").is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_only_versions_are_modern() {
        for v in ["1.0", "1.0.2", "0.1", "1.0.6", "2024.4", "v1.2.3", "10"] {
            assert_eq!(conformance(v), Conformance::Modern, "{v}");
        }
    }

    #[test]
    fn segmented_modern_versions() {
        for v in [
            "2!1.0rc1",
            "1.0.post1",
            "1.0.dev0",
            "1.0a1",
            "1.0.alpha3",
            "1.0-1",
            "1.0r4",
            "1.0+ubuntu.1",
            "1.0rc1.post2.dev3",
            "1.0RC1",
        ] {
            assert_eq!(conformance(v), Conformance::Modern, "{v}");
        }
    }

    #[test]
    fn bare_prerelease_letter_is_not_modern() {
        assert_eq!(conformance("1.0a"), Conformance::NonConforming);
        assert_eq!(conformance("1.0rc"), Conformance::NonConforming);
    }

    #[test]
    fn dotted_prerelease_numbers_are_legacy_only() {
        // PEP 386 allowed `1.0a1.2`; PEP 440 does not.
        assert_eq!(conformance("1.0a1.2"), Conformance::LegacyOnly);
        assert_eq!(conformance("2.5rc1.8"), Conformance::LegacyOnly);
    }

    #[test]
    fn garbage_conforms_to_nothing() {
        for v in ["", "banana", "1.0ab", "one.two", "1..0", "1.0 final", "🦀"] {
            assert_eq!(conformance(v), Conformance::NonConforming, "{v:?}");
        }
    }

    #[test]
    fn legacy_is_case_sensitive() {
        assert!(is_legacy("1.0a1"));
        assert!(!is_legacy("1.0A1"));
        // Modern matching ignores case.
        assert!(is_modern("1.0A1"));
    }

    #[test]
    fn analyze_reports_release_shape() {
        let shape = analyze("1.2.3+local.tag").unwrap();
        assert_eq!(shape.release_segments, 3);
        assert!(shape.has_local);

        let shape = analyze("3").unwrap();
        assert_eq!(shape.release_segments, 1);
        assert!(!shape.has_local);

        assert!(analyze("not-a-version").is_none());
    }
}
