//! Offline job that refreshes the classifier vocabulary snapshot from the
//! package index. Not part of the rating engine; runs from the CLI and in
//! release automation.

use crate::error::{IndexErrorKind, PyrindError, Result};
use crate::vocab::ClassifierVocabulary;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Plain-text list of canonical classifiers, one per line.
const CLASSIFIER_LIST_URL: &str = "https://pypi.org/pypi?%3Aaction=list_classifiers";

/// The canonical list is maintained as a package of its own; its release
/// number versions our snapshot.
const VOCABULARY_PROJECT_URL: &str = "https://pypi.org/pypi/trove-classifiers/json";

const USER_AGENT: &str = concat!("pyrind/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch the canonical classifier list, derive the license code table,
/// and write a fresh snapshot to `output`.
///
/// Returns the vocabulary that was written so callers can report on it.
pub fn refresh_vocabulary(output: &Path) -> Result<ClassifierVocabulary> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| {
            PyrindError::index(
                "building HTTP client",
                IndexErrorKind::NetworkError(e.to_string()),
            )
        })?;

    let classifiers = fetch_classifier_list(&client)?;
    info!(count = classifiers.len(), "fetched classifier list");

    let version = fetch_vocabulary_version(&client)?;
    debug!(version, "upstream vocabulary version");

    let vocabulary = ClassifierVocabulary::new(version, classifiers);
    let mut json = serde_json::to_string_pretty(&vocabulary)?;
    json.push('\n');
    std::fs::write(output, json).map_err(|e| PyrindError::io(output, e))?;
    info!(path = %output.display(), "wrote vocabulary snapshot");

    Ok(vocabulary)
}

fn fetch_classifier_list(client: &reqwest::blocking::Client) -> Result<Vec<String>> {
    let response = client.get(CLASSIFIER_LIST_URL).send().map_err(|e| {
        PyrindError::index(
            "fetching classifier list",
            IndexErrorKind::NetworkError(e.to_string()),
        )
    })?;
    if !response.status().is_success() {
        return Err(PyrindError::index(
            "fetching classifier list",
            IndexErrorKind::ApiError(format!("HTTP {}", response.status())),
        ));
    }
    let body = response.text().map_err(|e| {
        PyrindError::index(
            "reading classifier list",
            IndexErrorKind::NetworkError(e.to_string()),
        )
    })?;

    let classifiers: Vec<String> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect();
    if classifiers.is_empty() {
        return Err(PyrindError::index(
            "classifier list",
            IndexErrorKind::InvalidResponse("empty response body".into()),
        ));
    }
    Ok(classifiers)
}

fn fetch_vocabulary_version(client: &reqwest::blocking::Client) -> Result<String> {
    let response = client.get(VOCABULARY_PROJECT_URL).send().map_err(|e| {
        PyrindError::index(
            "fetching vocabulary version",
            IndexErrorKind::NetworkError(e.to_string()),
        )
    })?;
    if !response.status().is_success() {
        return Err(PyrindError::index(
            "fetching vocabulary version",
            IndexErrorKind::ApiError(format!("HTTP {}", response.status())),
        ));
    }
    let body: serde_json::Value = response.json().map_err(|e| {
        PyrindError::index(
            "decoding vocabulary version",
            IndexErrorKind::InvalidResponse(e.to_string()),
        )
    })?;
    body["info"]["version"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| {
            PyrindError::index(
                "decoding vocabulary version",
                IndexErrorKind::InvalidResponse("missing info.version".into()),
            )
        })
}
