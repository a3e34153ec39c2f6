//! Core-metadata file parsing (`PKG-INFO`, `METADATA`).
//!
//! The format is RFC 822 headers followed by an optional body that holds
//! the long description. Repeated headers (`Classifier`, `Project-URL`)
//! accumulate into list fields, continuation lines are folded, and the
//! placeholder value `UNKNOWN` is treated as absent.

use crate::error::{ExtractErrorKind, PyrindError, Result};
use crate::model::{Field, MetadataRecord};
use std::path::Path;
use tracing::debug;

/// Fields that accumulate one entry per repeated header.
const LIST_FIELDS: [Field; 2] = [Field::Classifiers, Field::ProjectUrls];

/// Read and parse a core-metadata file.
pub fn collect(path: impl AsRef<Path>) -> Result<MetadataRecord> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| PyrindError::io(path, e))?;
    let record = parse(&text)?;
    if record.is_empty() {
        return Err(PyrindError::extract(
            "core-metadata file",
            ExtractErrorKind::EmptyMetadata(path.display().to_string()),
        ));
    }
    Ok(record)
}

/// Parse core-metadata text into a record.
///
/// Unknown headers are skipped with a debug log; they are legal in newer
/// metadata versions and irrelevant to rating.
pub fn parse(text: &str) -> Result<MetadataRecord> {
    let mut record = MetadataRecord::new();
    let mut current: Option<(Field, String)> = None;
    let mut lines = text.lines();

    for line in lines.by_ref() {
        if line.is_empty() {
            // Header section ends; the rest is the description body.
            break;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            // Continuation of the previous header value.
            if let Some((_, value)) = current.as_mut() {
                value.push('\n');
                value.push_str(line.trim_start());
            }
            continue;
        }
        if let Some((field, value)) = current.take() {
            store(&mut record, field, value);
        }
        let Some((name, value)) = line.split_once(':') else {
            debug!(line, "ignoring malformed header line");
            continue;
        };
        match Field::from_core_metadata(name.trim()) {
            Some(field) => current = Some((field, value.trim().to_string())),
            None => debug!(header = name, "ignoring unknown header"),
        }
    }
    if let Some((field, value)) = current.take() {
        store(&mut record, field, value);
    }

    let body: String = lines.collect::<Vec<_>>().join("\n");
    let body = body.trim();
    if !body.is_empty() && !record.present(Field::Description) {
        record.insert(Field::Description, body);
    }

    Ok(record)
}

fn store(record: &mut MetadataRecord, field: Field, value: String) {
    // UNKNOWN is what legacy build tools write for fields the author
    // never set.
    if value.is_empty() || value == "UNKNOWN" {
        return;
    }
    if LIST_FIELDS.contains(&field) {
        let mut items = record.list_value(field).map(<[String]>::to_vec).unwrap_or_default();
        items.push(value);
        record.insert(field, items);
        return;
    }
    if record.present(field) {
        debug!(%field, "ignoring repeated header");
        return;
    }
    record.insert(field, value);
}
