//! Long-description markup validation.

use super::metadata::WEIGHT_HALF;
use super::{Check, Verdict};
use crate::model::{Field, MetadataRecord};
use crate::rst;

/// Validates that the long description renders as well-formed markup.
///
/// Plain text and Markdown cannot fail to render, so an explicit
/// content-type declaring either passes unconditionally. Everything else
/// is treated as reStructuredText, the index default, and run through the
/// structural validator; any diagnostic fails the check.
pub(crate) struct ValidRst;

impl Check for ValidRst {
    fn name(&self) -> &'static str {
        "ValidRst"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        if let Some(content_type) = record.str_value(Field::DescriptionContentType) {
            // "text/markdown; charset=UTF-8" and friends.
            let media_type = content_type
                .split(';')
                .next()
                .unwrap_or(content_type)
                .trim()
                .to_ascii_lowercase();
            if media_type == "text/plain" || media_type == "text/markdown" {
                return Verdict::pass(WEIGHT_HALF);
            }
        }

        let source = record.str_value(Field::Description).unwrap_or("");
        let diagnostics = rst::validate(source);
        if diagnostics.is_empty() {
            Verdict::pass(WEIGHT_HALF)
        } else {
            let rendered: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
            Verdict::fail(
                WEIGHT_HALF,
                format!(
                    "Your long description is not valid reStructuredText:\n{}",
                    rendered.join("\n")
                ),
            )
        }
    }
}
