//! The metadata record: a typed key-value view of a package's core metadata.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Known metadata fields.
///
/// The set mirrors the core-metadata headers that the checks care about.
/// Collectors map whatever source they read (pyproject.toml tables,
/// PKG-INFO headers, index JSON) onto these keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    Name,
    Version,
    /// Short one-line description (the `Summary` header).
    Summary,
    /// Long description body (the `Description` header / readme).
    Description,
    DescriptionContentType,
    Classifiers,
    Keywords,
    Author,
    AuthorEmail,
    Maintainer,
    MaintainerEmail,
    HomePage,
    ProjectUrls,
    License,
    LicenseExpression,
    RequiresPython,
}

impl Field {
    /// Human-readable field name, as used in problem messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Version => "version",
            Self::Summary => "summary",
            Self::Description => "description",
            Self::DescriptionContentType => "description-content-type",
            Self::Classifiers => "classifiers",
            Self::Keywords => "keywords",
            Self::Author => "author",
            Self::AuthorEmail => "author-email",
            Self::Maintainer => "maintainer",
            Self::MaintainerEmail => "maintainer-email",
            Self::HomePage => "home-page",
            Self::ProjectUrls => "project-urls",
            Self::License => "license",
            Self::LicenseExpression => "license-expression",
            Self::RequiresPython => "requires-python",
        }
    }

    /// Map a core-metadata header name (as found in PKG-INFO / METADATA
    /// files) to a field. Header names are case-insensitive; repeated
    /// headers such as `Classifier` map to the list-valued fields.
    #[must_use]
    pub fn from_core_metadata(header: &str) -> Option<Self> {
        match header.to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "version" => Some(Self::Version),
            "summary" => Some(Self::Summary),
            "description" => Some(Self::Description),
            "description-content-type" => Some(Self::DescriptionContentType),
            "classifier" | "classifiers" => Some(Self::Classifiers),
            "keywords" => Some(Self::Keywords),
            "author" => Some(Self::Author),
            "author-email" => Some(Self::AuthorEmail),
            "maintainer" => Some(Self::Maintainer),
            "maintainer-email" => Some(Self::MaintainerEmail),
            "home-page" => Some(Self::HomePage),
            "project-url" | "project-urls" => Some(Self::ProjectUrls),
            "license" => Some(Self::License),
            "license-expression" => Some(Self::LicenseExpression),
            "requires-python" => Some(Self::RequiresPython),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field's value.
///
/// Metadata sources are loosely typed, so values are a small tagged union.
/// The `Number` variant exists because TOML happily yields `version = 1.0`
/// as a float; the version-type check needs to see that it was not a
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    List(Vec<String>),
    Bool(bool),
    Number(f64),
}

impl FieldValue {
    /// Presence semantics: non-empty string, non-empty list, `true`, or
    /// any number.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Bool(b) => *b,
            Self::Number(_) => true,
        }
    }

    /// The string contents, if this is the string variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The list contents, if this is the list variant.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Lexical rendering of the value, used when a check needs to inspect
    /// a value textually regardless of its variant.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::List(items) => items.join(", "),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[&str]> for FieldValue {
    fn from(items: &[&str]) -> Self {
        Self::List(items.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Out-of-band facts about where the metadata came from.
///
/// Collectors set these; checks read them. Keeping them out of the field
/// map means checks never probe string keys for engine-internal state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Signals {
    /// Filesystem location the metadata was collected from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    /// Whether the index has a source distribution for this release.
    /// `None` when the record did not come from an index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_sdist: Option<bool>,
    /// Index-side owner accounts for the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<String>>,
    /// Whether a documentation link was found for the release.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<bool>,
    /// No setup script and no modern build configuration were found.
    pub missing_build_system: bool,
    /// The project builds from a setup script without a pyproject.toml.
    pub missing_pyproject: bool,
    /// A build configuration exists but no usable metadata came out of it.
    pub build_failure: bool,
}

/// A package metadata record, ready to be rated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataRecord {
    fields: IndexMap<Field, FieldValue>,
    /// Collector-provided facts that are not metadata fields themselves.
    pub signals: Signals,
}

impl MetadataRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, replacing any previous value.
    pub fn insert(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.fields.insert(field, value.into());
    }

    /// Builder-style [`insert`](Self::insert), handy in tests and fixtures.
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Raw value of a field, if set at all.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// String value of a field, if set to the string variant.
    #[must_use]
    pub fn str_value(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    /// List value of a field, if set to the list variant.
    #[must_use]
    pub fn list_value(&self, field: Field) -> Option<&[String]> {
        self.get(field).and_then(FieldValue::as_list)
    }

    /// Whether a field is present under the presence semantics of
    /// [`FieldValue::is_present`].
    #[must_use]
    pub fn present(&self, field: Field) -> bool {
        self.get(field).is_some_and(FieldValue::is_present)
    }

    /// The declared classifiers, or an empty slice when unset.
    #[must_use]
    pub fn classifiers(&self) -> &[String] {
        self.list_value(Field::Classifiers).unwrap_or(&[])
    }

    /// True when no fields are set. Signals do not count; a record that
    /// carries only collector signals is still empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over set fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&Field, &FieldValue)> {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_semantics() {
        assert!(FieldValue::from("x").is_present());
        assert!(!FieldValue::from("").is_present());
        assert!(FieldValue::from(vec!["a".to_string()]).is_present());
        assert!(!FieldValue::List(vec![]).is_present());
        assert!(FieldValue::from(true).is_present());
        assert!(!FieldValue::from(false).is_present());
        assert!(FieldValue::from(1.0).is_present());
    }

    #[test]
    fn insert_and_lookup() {
        let mut record = MetadataRecord::new();
        record.insert(Field::Name, "pyrind");
        record.insert(Field::Classifiers, vec!["Private :: Internal".to_string()]);

        assert_eq!(record.str_value(Field::Name), Some("pyrind"));
        assert_eq!(record.classifiers(), ["Private :: Internal"]);
        assert!(record.present(Field::Name));
        assert!(!record.present(Field::Version));
        assert!(!record.is_empty());
    }

    #[test]
    fn empty_record_ignores_signals() {
        let mut record = MetadataRecord::new();
        record.signals.build_failure = true;
        assert!(record.is_empty());
    }

    #[test]
    fn numeric_value_renders_like_toml() {
        assert_eq!(FieldValue::from(1.5).to_text(), "1.5");
        assert_eq!(FieldValue::from(1.0).to_text(), "1");
    }

    #[test]
    fn header_mapping_is_case_insensitive() {
        assert_eq!(
            Field::from_core_metadata("Author-email"),
            Some(Field::AuthorEmail)
        );
        assert_eq!(
            Field::from_core_metadata("CLASSIFIER"),
            Some(Field::Classifiers)
        );
        assert_eq!(Field::from_core_metadata("X-Unknown"), None);
    }
}
