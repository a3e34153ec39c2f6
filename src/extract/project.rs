//! Project-directory collector.
//!
//! Reads the `[project]` table of `pyproject.toml` (PEP 621) and folds it
//! into a metadata record, merging fields the table declares as dynamic
//! from a built `PKG-INFO` when one is lying around. A `setup.py` cannot
//! be collected statically; when a built `PKG-INFO` sits beside it (an
//! unpacked legacy sdist) that is rated instead, and otherwise the result
//! is an empty record with the build-failure signal set so the engine
//! reports why there is nothing to rate.

use super::pkginfo;
use crate::error::{ErrorContext, ExtractErrorKind, PyrindError, Result};
use crate::model::{Field, MetadataRecord};
use std::path::{Path, PathBuf};
use toml::Value;
use tracing::{debug, warn};

/// Collect metadata from a project directory.
pub fn collect(directory: impl AsRef<Path>) -> Result<MetadataRecord> {
    let directory = directory.as_ref();
    let pyproject = directory.join("pyproject.toml");
    let setup_py = directory.join("setup.py");

    let mut record = if pyproject.is_file() {
        let text =
            std::fs::read_to_string(&pyproject).map_err(|e| PyrindError::io(&pyproject, e))?;
        let mut record = parse_pyproject(&text, directory)
            .with_context(|| format!("parsing {}", pyproject.display()))?;
        if record.is_empty() {
            // A pyproject.toml without a [project] table configures the
            // build backend only; the metadata lives in setup.py or
            // setup.cfg and a static collector cannot run those.
            record.signals.build_failure = true;
        }
        record
    } else if setup_py.is_file() {
        debug!(directory = %directory.display(), "setup.py without pyproject.toml");
        if let Some(metadata_file) = find_pkginfo(directory) {
            // Unpacked legacy sdists carry a setup.py next to the built
            // metadata of the distribution they came from. Rate that
            // metadata rather than refusing to run the build.
            let mut record = pkginfo::collect(&metadata_file)?;
            record.signals.missing_pyproject = true;
            record
        } else {
            let mut record = MetadataRecord::new();
            record.signals.missing_pyproject = true;
            record.signals.build_failure = true;
            record
        }
    } else if let Some(metadata_file) = find_pkginfo(directory) {
        // A built metadata file with no build configuration at all.
        let mut record = pkginfo::collect(&metadata_file)?;
        record.signals.missing_build_system = true;
        record
    } else {
        // Nothing recognizable; the engine reports "no data found".
        MetadataRecord::new()
    };

    if !record.is_empty() || record.signals.build_failure {
        record.signals.source_path = Some(directory.to_path_buf());
    }
    Ok(record)
}

/// Parse a `pyproject.toml` document's `[project]` table.
pub fn parse_pyproject(text: &str, directory: &Path) -> Result<MetadataRecord> {
    let document: Value = text.parse::<Value>()?;
    let mut record = MetadataRecord::new();

    let Some(project) = document.get("project").and_then(Value::as_table) else {
        return Ok(record);
    };

    if let Some(name) = project.get("name").and_then(Value::as_str) {
        record.insert(Field::Name, name);
    }
    if let Some(version) = project.get("version") {
        // Preserve the declared type; `version = 1.0` is a real mistake
        // the version-type check exists to catch.
        match version {
            Value::String(s) => record.insert(Field::Version, s.as_str()),
            Value::Integer(n) => {
                #[allow(clippy::cast_precision_loss)]
                record.insert(Field::Version, *n as f64);
            }
            Value::Float(n) => record.insert(Field::Version, *n),
            other => debug!(?other, "ignoring version of unexpected type"),
        }
    }
    if let Some(description) = project.get("description").and_then(Value::as_str) {
        record.insert(Field::Summary, description);
    }
    if let Some(readme) = project.get("readme") {
        read_readme(readme, directory, &mut record)?;
    }
    if let Some(requires) = project.get("requires-python").and_then(Value::as_str) {
        record.insert(Field::RequiresPython, requires);
    }
    if let Some(license) = project.get("license") {
        match license {
            // PEP 639: a bare string is an SPDX expression.
            Value::String(expression) => {
                record.insert(Field::LicenseExpression, expression.as_str());
            }
            Value::Table(table) => {
                if let Some(text) = table.get("text").and_then(Value::as_str) {
                    record.insert(Field::License, text);
                } else if table.contains_key("file") {
                    debug!("license file reference carries no ratable text");
                }
            }
            other => debug!(?other, "ignoring license of unexpected type"),
        }
    }

    if let Some(authors) = project.get("authors").and_then(Value::as_array) {
        fold_people(authors, &mut record, Field::Author, Field::AuthorEmail);
    }
    if let Some(maintainers) = project.get("maintainers").and_then(Value::as_array) {
        fold_people(
            maintainers,
            &mut record,
            Field::Maintainer,
            Field::MaintainerEmail,
        );
    }

    if let Some(keywords) = string_list(project.get("keywords")) {
        record.insert(Field::Keywords, keywords);
    }
    if let Some(classifiers) = string_list(project.get("classifiers")) {
        record.insert(Field::Classifiers, classifiers);
    }

    if let Some(urls) = project.get("urls").and_then(Value::as_table) {
        let mut entries = Vec::new();
        for (label, url) in urls {
            if let Some(url) = url.as_str() {
                if label.eq_ignore_ascii_case("homepage") {
                    record.insert(Field::HomePage, url);
                }
                entries.push(format!("{label}, {url}"));
            }
        }
        if !entries.is_empty() {
            record.insert(Field::ProjectUrls, entries);
        }
    }

    merge_dynamic_fields(project.get("dynamic"), directory, &mut record);

    Ok(record)
}

/// PEP 621 `readme`: either a path string or a table with `file`/`text`
/// and an optional explicit content type.
fn read_readme(readme: &Value, directory: &Path, record: &mut MetadataRecord) -> Result<()> {
    match readme {
        Value::String(path) => {
            let content = read_readme_file(directory, path)?;
            record.insert(Field::Description, content);
            if let Some(content_type) = content_type_for(path) {
                record.insert(Field::DescriptionContentType, content_type);
            }
        }
        Value::Table(table) => {
            if let Some(text) = table.get("text").and_then(Value::as_str) {
                record.insert(Field::Description, text);
            } else if let Some(path) = table.get("file").and_then(Value::as_str) {
                let content = read_readme_file(directory, path)?;
                record.insert(Field::Description, content);
            }
            if let Some(content_type) = table.get("content-type").and_then(Value::as_str) {
                record.insert(Field::DescriptionContentType, content_type);
            }
        }
        other => debug!(?other, "ignoring readme of unexpected type"),
    }
    Ok(())
}

fn read_readme_file(directory: &Path, path: &str) -> Result<String> {
    let full = directory.join(path);
    std::fs::read_to_string(&full).map_err(|_| {
        PyrindError::extract(
            "reading readme",
            ExtractErrorKind::MissingReadme(full.display().to_string()),
        )
    })
}

/// Infer the description content type from the readme's extension, the
/// way build backends do.
fn content_type_for(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "md" => Some("text/markdown"),
        "rst" => Some("text/x-rst"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// Fold a PEP 621 people list into the two core-metadata strings:
/// entries with an email render as `Name <email>` under the email field,
/// name-only entries go under the name field.
fn fold_people(people: &[Value], record: &mut MetadataRecord, name_field: Field, email_field: Field) {
    let mut names = Vec::new();
    let mut emails = Vec::new();
    for person in people {
        let Some(table) = person.as_table() else {
            continue;
        };
        let name = table.get("name").and_then(Value::as_str);
        let email = table.get("email").and_then(Value::as_str);
        match (name, email) {
            (Some(name), Some(email)) => emails.push(format!("{name} <{email}>")),
            (None, Some(email)) => emails.push(email.to_string()),
            (Some(name), None) => names.push(name.to_string()),
            (None, None) => {}
        }
    }
    if !names.is_empty() {
        record.insert(name_field, names.join(", "));
    }
    if !emails.is_empty() {
        record.insert(email_field, emails.join(", "));
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect(),
    )
}

/// Fields listed as `dynamic` are filled in at build time; a previously
/// built PKG-INFO is the only static source for them.
fn merge_dynamic_fields(dynamic: Option<&Value>, directory: &Path, record: &mut MetadataRecord) {
    let Some(dynamic) = dynamic.and_then(Value::as_array) else {
        return;
    };
    if dynamic.is_empty() {
        return;
    }
    let Some(metadata_file) = find_pkginfo(directory) else {
        debug!("dynamic fields declared but no built PKG-INFO found");
        return;
    };
    let built = match pkginfo::collect(&metadata_file) {
        Ok(built) => built,
        Err(err) => {
            warn!(%err, "could not read built metadata for dynamic fields");
            return;
        }
    };
    for entry in dynamic.iter().filter_map(Value::as_str) {
        let Some(field) = pep621_dynamic_field(entry) else {
            continue;
        };
        if record.present(field) {
            continue;
        }
        if let Some(value) = built.get(field) {
            record.insert(field, value.clone());
        }
    }
}

/// Map a PEP 621 dynamic-field name to the record field it fills.
/// The project-table names differ from the core-metadata headers:
/// `description` is the one-line summary and `readme` the long body.
fn pep621_dynamic_field(name: &str) -> Option<Field> {
    match name.to_ascii_lowercase().as_str() {
        "version" => Some(Field::Version),
        "description" => Some(Field::Summary),
        "readme" => Some(Field::Description),
        "keywords" => Some(Field::Keywords),
        "classifiers" => Some(Field::Classifiers),
        "license" => Some(Field::License),
        "requires-python" => Some(Field::RequiresPython),
        "urls" => Some(Field::ProjectUrls),
        _ => None,
    }
}

/// Look for a built core-metadata file in the directory or an egg-info
/// subdirectory.
fn find_pkginfo(directory: &Path) -> Option<PathBuf> {
    let direct = directory.join("PKG-INFO");
    if direct.is_file() {
        return Some(direct);
    }
    let entries = std::fs::read_dir(directory).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_egg_info = path
            .extension()
            .is_some_and(|extension| extension == "egg-info");
        if is_egg_info {
            let candidate = path.join("PKG-INFO");
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValue;
    use std::fs;

    const FULL_PYPROJECT: &str = r#"
[build-system]
requires = ["hatchling"]
build-backend = "hatchling.build"

[project]
name = "complete"
version = "1.0"
description = "This is a test package for the rater."
readme = "README.rst"
requires-python = ">=3.8"
license = { text = "MIT" }
keywords = ["pypi", "quality", "example"]
authors = [
    { name = "Jane Doe", email = "jane@example.org" },
    { name = "Nameless Contributor" },
]
classifiers = [
    "Development Status :: 6 - Mature",
    "Programming Language :: Python :: 3.11",
    "License :: OSI Approved :: MIT License",
]

[project.urls]
Homepage = "https://example.org"
Source = "https://example.org/src"
"#;

    fn write_project(pyproject: &str, readme: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pyproject.toml"), pyproject).unwrap();
        if let Some(readme) = readme {
            fs::write(dir.path().join("README.rst"), readme).unwrap();
        }
        dir
    }

    #[test]
    fn full_project_table_maps_to_core_metadata() {
        let readme = "Complete\n========\n\nA long description body for the test package.\n";
        let dir = write_project(FULL_PYPROJECT, Some(readme));
        let record = collect(dir.path()).unwrap();

        assert_eq!(record.str_value(Field::Name), Some("complete"));
        assert_eq!(record.str_value(Field::Version), Some("1.0"));
        assert_eq!(
            record.str_value(Field::Summary),
            Some("This is a test package for the rater.")
        );
        assert_eq!(record.str_value(Field::Description), Some(readme));
        assert_eq!(
            record.str_value(Field::DescriptionContentType),
            Some("text/x-rst")
        );
        assert_eq!(record.str_value(Field::License), Some("MIT"));
        assert_eq!(record.str_value(Field::Author), Some("Nameless Contributor"));
        assert_eq!(
            record.str_value(Field::AuthorEmail),
            Some("Jane Doe <jane@example.org>")
        );
        assert_eq!(record.str_value(Field::HomePage), Some("https://example.org"));
        assert_eq!(record.classifiers().len(), 3);
        assert_eq!(record.signals.source_path.as_deref(), Some(dir.path()));
        assert!(!record.signals.build_failure);
    }

    #[test]
    fn spdx_license_string_maps_to_expression() {
        let pyproject = "[project]\nname = \"pkg\"\nversion = \"1.0\"\nlicense = \"MIT\"\n";
        let dir = write_project(pyproject, None);
        let record = collect(dir.path()).unwrap();
        assert_eq!(record.str_value(Field::LicenseExpression), Some("MIT"));
        assert!(!record.present(Field::License));
    }

    #[test]
    fn float_version_is_preserved_as_number() {
        let pyproject = "[project]\nname = \"pkg\"\nversion = 1.0\n";
        let dir = write_project(pyproject, None);
        let record = collect(dir.path()).unwrap();
        assert!(matches!(
            record.get(Field::Version),
            Some(FieldValue::Number(_))
        ));
    }

    #[test]
    fn missing_readme_file_is_an_error() {
        let pyproject = "[project]\nname = \"pkg\"\nversion = \"1.0\"\nreadme = \"README.rst\"\n";
        let dir = write_project(pyproject, None);
        let err = collect(dir.path()).unwrap_err();
        assert!(err.to_string().contains("extract"), "{err}");
    }

    #[test]
    fn setup_py_only_directory_signals_build_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setup.py"), "from setuptools import setup\nsetup()\n").unwrap();
        let record = collect(dir.path()).unwrap();
        assert!(record.is_empty());
        assert!(record.signals.build_failure);
        assert!(record.signals.missing_pyproject);
    }

    #[test]
    fn unpacked_sdist_with_setup_py_rates_its_built_metadata() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setup.py"), "from setuptools import setup\nsetup()\n").unwrap();
        fs::write(
            dir.path().join("PKG-INFO"),
            "Name: legacy\nVersion: 1.4\nSummary: Shipped before pyproject existed.\n",
        )
        .unwrap();
        let record = collect(dir.path()).unwrap();
        assert_eq!(record.str_value(Field::Name), Some("legacy"));
        assert_eq!(record.str_value(Field::Version), Some("1.4"));
        assert!(record.signals.missing_pyproject);
        assert!(!record.signals.build_failure);
        assert_eq!(record.signals.source_path.as_deref(), Some(dir.path()));
    }

    #[test]
    fn pyproject_without_project_table_signals_build_failure() {
        let pyproject = "[build-system]\nrequires = [\"setuptools\"]\n";
        let dir = write_project(pyproject, None);
        let record = collect(dir.path()).unwrap();
        assert!(record.is_empty());
        assert!(record.signals.build_failure);
    }

    #[test]
    fn bare_metadata_directory_signals_missing_build_system() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("PKG-INFO"),
            "Name: orphan\nVersion: 1.0\n",
        )
        .unwrap();
        let record = collect(dir.path()).unwrap();
        assert_eq!(record.str_value(Field::Name), Some("orphan"));
        assert!(record.signals.missing_build_system);
    }

    #[test]
    fn unrecognizable_directory_yields_empty_record_without_signals() {
        let dir = tempfile::tempdir().unwrap();
        let record = collect(dir.path()).unwrap();
        assert!(record.is_empty());
        assert!(!record.signals.build_failure);
        assert!(record.signals.source_path.is_none());
    }

    #[test]
    fn dynamic_fields_merge_from_built_metadata() {
        let pyproject =
            "[project]\nname = \"pkg\"\ndynamic = [\"version\", \"description\"]\n";
        let dir = write_project(pyproject, None);
        fs::write(
            dir.path().join("PKG-INFO"),
            "Name: pkg\nVersion: 2.5\nSummary: Built at some point.\n",
        )
        .unwrap();
        let record = collect(dir.path()).unwrap();
        assert_eq!(record.str_value(Field::Version), Some("2.5"));
        assert_eq!(record.str_value(Field::Summary), Some("Built at some point."));
    }
}
