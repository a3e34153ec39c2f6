//! Package-index collector.
//!
//! Fetches a release's metadata from the PyPI JSON API and maps it into a
//! record, plus the index-only signals the engine cannot learn anywhere
//! else: whether a source distribution was uploaded, whether any project
//! URL points at documentation, and who owns the project (via the legacy
//! XML-RPC `package_roles` call, which has no JSON equivalent).

use crate::error::{IndexErrorKind, PyrindError, Result};
use crate::model::{Field, MetadataRecord};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://pypi.org";
const USER_AGENT: &str = concat!("pyrind/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    info: ProjectInfo,
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    name: Option<String>,
    version: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    description_content_type: Option<String>,
    #[serde(default)]
    classifiers: Vec<String>,
    keywords: Option<String>,
    author: Option<String>,
    author_email: Option<String>,
    maintainer: Option<String>,
    maintainer_email: Option<String>,
    home_page: Option<String>,
    project_urls: Option<indexmap::IndexMap<String, String>>,
    license: Option<String>,
    license_expression: Option<String>,
    requires_python: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    packagetype: String,
}

// ============================================================================
// Client
// ============================================================================

/// Blocking client for the package index.
pub struct PyPiClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl PyPiClient {
    /// Client against the public index.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against another index host; tests point this at a local
    /// server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
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
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a project's metadata record from the index.
    pub fn collect(&self, project: &str) -> Result<MetadataRecord> {
        let url = format!("{}/pypi/{}/json", self.base_url, project);
        debug!(url, "fetching project metadata");
        let response = self.client.get(&url).send().map_err(|e| {
            PyrindError::index(
                format!("fetching {project}"),
                IndexErrorKind::NetworkError(e.to_string()),
            )
        })?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PyrindError::index(
                format!("fetching {project}"),
                IndexErrorKind::NotFound(project.to_string()),
            ));
        }
        if !response.status().is_success() {
            return Err(PyrindError::index(
                format!("fetching {project}"),
                IndexErrorKind::ApiError(format!("HTTP {}", response.status())),
            ));
        }
        let parsed: ProjectResponse = response.json().map_err(|e| {
            PyrindError::index(
                format!("decoding {project}"),
                IndexErrorKind::InvalidResponse(e.to_string()),
            )
        })?;

        let mut record = map_info(parsed.info);
        record.signals.has_sdist = Some(
            parsed
                .urls
                .iter()
                .any(|file| file.packagetype == "sdist"),
        );

        // Owner lookup is best-effort; the check goes not-applicable when
        // the legacy endpoint is unavailable.
        match self.fetch_owners(project) {
            Ok(owners) => record.signals.owners = Some(owners),
            Err(err) => warn!(%err, "could not fetch project owners"),
        }

        Ok(record)
    }

    /// The legacy XML-RPC `package_roles` call, the only place the index
    /// exposes owner accounts.
    fn fetch_owners(&self, project: &str) -> Result<Vec<String>> {
        let body = format!(
            "<?xml version=\"1.0\"?>\
             <methodCall>\
             <methodName>package_roles</methodName>\
             <params><param><value><string>{project}</string></value></param></params>\
             </methodCall>"
        );
        let response = self
            .client
            .post(format!("{}/pypi", self.base_url))
            .header("Content-Type", "text/xml")
            .body(body)
            .send()
            .map_err(|e| {
                PyrindError::index(
                    "fetching package roles",
                    IndexErrorKind::NetworkError(e.to_string()),
                )
            })?;
        if !response.status().is_success() {
            return Err(PyrindError::index(
                "fetching package roles",
                IndexErrorKind::ApiError(format!("HTTP {}", response.status())),
            ));
        }
        let text = response.text().map_err(|e| {
            PyrindError::index(
                "reading package roles",
                IndexErrorKind::NetworkError(e.to_string()),
            )
        })?;
        parse_package_roles(&text)
    }
}

/// Map the JSON `info` table onto record fields, eliding the `UNKNOWN`
/// placeholder that old uploads carry.
fn map_info(info: ProjectInfo) -> MetadataRecord {
    let mut record = MetadataRecord::new();
    let mut set = |field: Field, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty() && v != "UNKNOWN") {
            record.insert(field, value);
        }
    };
    set(Field::Name, info.name);
    set(Field::Version, info.version);
    set(Field::Summary, info.summary);
    set(Field::Description, info.description);
    set(Field::DescriptionContentType, info.description_content_type);
    set(Field::Keywords, info.keywords);
    set(Field::Author, info.author);
    set(Field::AuthorEmail, info.author_email);
    set(Field::Maintainer, info.maintainer);
    set(Field::MaintainerEmail, info.maintainer_email);
    set(Field::HomePage, info.home_page);
    set(Field::License, info.license);
    set(Field::LicenseExpression, info.license_expression);
    set(Field::RequiresPython, info.requires_python);

    if !info.classifiers.is_empty() {
        record.insert(Field::Classifiers, info.classifiers);
    }
    if let Some(urls) = info.project_urls {
        let entries: Vec<String> = urls
            .iter()
            .map(|(label, url)| format!("{label}, {url}"))
            .collect();
        if !entries.is_empty() {
            record.signals.documentation = Some(
                urls.keys()
                    .any(|label| label.to_ascii_lowercase().contains("doc")),
            );
            record.insert(Field::ProjectUrls, entries);
        }
    }
    record
}

/// Pull the `[role, user]` pairs out of a `package_roles` XML-RPC
/// response and keep the owners.
fn parse_package_roles(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut strings = Vec::new();
    let mut in_string = false;
    let mut saw_fault = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"string" => in_string = true,
                b"fault" => saw_fault = true,
                _ => {}
            },
            Ok(Event::Text(text)) if in_string => {
                let value = text.unescape().map_err(|e| {
                    PyrindError::index(
                        "decoding package roles",
                        IndexErrorKind::InvalidResponse(e.to_string()),
                    )
                })?;
                strings.push(value.into_owned());
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"string" => in_string = false,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(PyrindError::index(
                    "parsing package roles",
                    IndexErrorKind::InvalidResponse(e.to_string()),
                ));
            }
        }
    }
    if saw_fault {
        return Err(PyrindError::index(
            "package roles",
            IndexErrorKind::ApiError("XML-RPC fault response".into()),
        ));
    }

    // The response is a flat sequence of (role, user) string pairs.
    Ok(strings
        .chunks_exact(2)
        .filter(|pair| pair[0] == "Owner")
        .map(|pair| pair[1].clone())
        .collect())
}

/// One-shot convenience against the public index.
pub fn collect(project: &str) -> Result<MetadataRecord> {
    PyPiClient::new()?.collect(project)
}
