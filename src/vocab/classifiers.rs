//! The classifier vocabulary type and the license code derivation.

use crate::error::{ErrorContext, PyrindError, Result, VocabularyErrorKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::OnceLock;

/// Classifiers under this prefix are reserved for internal use by package
/// indexes and are never validated against the canonical list.
pub const PRIVATE_PREFIX: &str = "Private ::";

const EMBEDDED_JSON: &str = include_str!("../../data/classifiers.json");

/// A versioned snapshot of the canonical classifier list, along with the
/// cross-reference from license codes to the classifiers that satisfy
/// them. This is the output format of the refresh job; the engine only
/// consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierVocabulary {
    version: String,
    classifiers: BTreeSet<String>,
    code_licenses: BTreeMap<String, BTreeSet<String>>,
}

impl ClassifierVocabulary {
    /// Build a vocabulary from a classifier list, deriving the license
    /// code table.
    pub fn new(version: impl Into<String>, classifiers: impl IntoIterator<Item = String>) -> Self {
        let classifiers: BTreeSet<String> = classifiers.into_iter().collect();
        let code_licenses = derive_license_codes(&classifiers);
        Self {
            version: version.into(),
            classifiers,
            code_licenses,
        }
    }

    /// The snapshot compiled into the binary.
    pub fn embedded() -> &'static Self {
        static EMBEDDED: OnceLock<ClassifierVocabulary> = OnceLock::new();
        EMBEDDED.get_or_init(|| {
            serde_json::from_str(EMBEDDED_JSON).expect("embedded classifier vocabulary parses")
        })
    }

    /// Parse a vocabulary from its JSON serialization.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let vocabulary: Self = serde_json::from_str(json)?;
        if vocabulary.classifiers.is_empty() {
            return Err(PyrindError::vocabulary(
                "deserialized vocabulary",
                VocabularyErrorKind::Empty,
            ));
        }
        Ok(vocabulary)
    }

    /// Load a vocabulary snapshot from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| PyrindError::io(path, e))?;
        Self::from_json_str(&json)
            .with_context(|| format!("loading vocabulary from {}", path.display()))
    }

    /// Version of the upstream vocabulary this snapshot was taken from.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether a classifier string is in the canonical list. Exact match;
    /// the private-namespace exemption is the caller's concern.
    #[must_use]
    pub fn contains(&self, classifier: &str) -> bool {
        self.classifiers.contains(classifier)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Iterate over all classifiers in the canonical list.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classifiers.iter().map(String::as_str)
    }

    /// The classifiers that satisfy a license code, if the code is known.
    #[must_use]
    pub fn classifiers_for_code(&self, code: &str) -> Option<&BTreeSet<String>> {
        self.code_licenses.get(code)
    }

    /// All known license codes.
    pub fn license_codes(&self) -> impl Iterator<Item = &str> {
        self.code_licenses.keys().map(String::as_str)
    }
}

fn short_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]*)\)").expect("short code regex compiles"))
}

/// Derive the license code table from a classifier list.
///
/// A license classifier's code is the first parenthesized group in the
/// classifier, e.g. `(GPLv3)`. Codes in the GPL and LGPL families are
/// additionally collected under the generic "GPL" and "LGPL" buckets.
/// Classifiers without a code get one in two known cases: Zope licenses
/// map to "ZPL" and the plain MIT classifier maps to "MIT".
pub(crate) fn derive_license_codes(
    classifiers: &BTreeSet<String>,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut codes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut add = |code: &str, classifier: &str| {
        codes
            .entry(code.to_string())
            .or_default()
            .insert(classifier.to_string());
    };

    for classifier in classifiers {
        if !classifier.starts_with("License") {
            continue;
        }
        if let Some(caps) = short_code_re().captures(classifier) {
            let short = &caps[1];
            add(short, classifier);
            if short.starts_with("GPL") {
                add("GPL", classifier);
            } else if short.starts_with("LGPL") {
                add("LGPL", classifier);
            }
        } else if classifier.contains("Zope") {
            add("ZPL", classifier);
        } else if classifier.contains("MIT License") {
            add("MIT", classifier);
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_vocabulary_loads() {
        let vocab = ClassifierVocabulary::embedded();
        assert!(!vocab.is_empty());
        assert!(!vocab.version().is_empty());
        assert!(vocab.contains("Development Status :: 5 - Production/Stable"));
        assert!(vocab.contains("License :: OSI Approved :: MIT License"));
        assert!(vocab.contains("Programming Language :: Python :: 3.11"));
        assert!(!vocab.contains("Programming Language :: Visual Basic"));
    }

    #[test]
    fn mit_code_maps_to_the_mit_classifier() {
        let vocab = ClassifierVocabulary::embedded();
        let mit = vocab.classifiers_for_code("MIT").unwrap();
        assert!(mit.contains("License :: OSI Approved :: MIT License"));
    }

    #[test]
    fn gpl_bucket_collects_the_whole_family() {
        let vocab = ClassifierVocabulary::embedded();
        let gpl = vocab.classifiers_for_code("GPL").unwrap();
        assert!(gpl.contains("License :: OSI Approved :: GNU General Public License (GPL)"));
        assert!(gpl.contains("License :: OSI Approved :: GNU General Public License v3 (GPLv3)"));
        // The LGPL family is a separate bucket.
        assert!(!gpl
            .iter()
            .any(|c| c.contains("Lesser General Public License")));
        assert!(vocab.classifiers_for_code("LGPL").is_some());
    }

    #[test]
    fn derivation_handles_the_special_cases() {
        let classifiers: BTreeSet<String> = [
            "License :: OSI Approved :: Zope Public License",
            "License :: OSI Approved :: MIT License",
            "License :: OSI Approved :: Apache Software License",
            "License :: OSI Approved :: GNU Lesser General Public License v3 (LGPLv3)",
            "Topic :: Utilities",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        let codes = derive_license_codes(&classifiers);
        assert!(codes["ZPL"].contains("License :: OSI Approved :: Zope Public License"));
        assert!(codes["MIT"].contains("License :: OSI Approved :: MIT License"));
        assert!(codes["LGPL"]
            .contains("License :: OSI Approved :: GNU Lesser General Public License v3 (LGPLv3)"));
        assert!(codes.contains_key("LGPLv3"));
        // Apache has no parenthesized code and no special case.
        assert!(!codes.keys().any(|c| c.contains("Apache")));
        // GPL bucket must not be created by LGPL entries.
        assert!(!codes.contains_key("GPL"));
    }

    #[test]
    fn from_json_str_rejects_empty_vocabularies() {
        let err = ClassifierVocabulary::from_json_str(
            r#"{"version": "0", "classifiers": [], "code_licenses": {}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PyrindError::Vocabulary {
                source: VocabularyErrorKind::Empty,
                ..
            }
        ));
    }

    #[test]
    fn from_json_str_rejects_malformed_json() {
        let err = ClassifierVocabulary::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, PyrindError::Vocabulary { .. }));
    }

    #[test]
    fn vocabulary_round_trips_through_json() {
        let vocab = ClassifierVocabulary::new(
            "2025.1.1",
            ["License :: OSI Approved :: MIT License".to_string()],
        );
        let json = serde_json::to_string(&vocab).unwrap();
        let back = ClassifierVocabulary::from_json_str(&json).unwrap();
        assert_eq!(back.version(), "2025.1.1");
        assert!(back.classifiers_for_code("MIT").is_some());
    }
}
