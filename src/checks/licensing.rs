//! The licensing consistency check.
//!
//! A package can declare its license three ways: the free-text `license`
//! field, the SPDX `license-expression` field, and `License ::`
//! classifiers. The combinations that are ambiguous or contradictory all
//! fail here, and a free-text license that names a known short code must
//! be backed by a matching classifier.

use super::metadata::WEIGHT_HALF;
use super::{Check, Verdict};
use crate::model::{Field, MetadataRecord};
use crate::vocab::ClassifierVocabulary;
use std::sync::Arc;

pub(crate) struct Licensing {
    vocabulary: Arc<ClassifierVocabulary>,
}

impl Licensing {
    pub(crate) fn new(vocabulary: Arc<ClassifierVocabulary>) -> Self {
        Self { vocabulary }
    }
}

impl Check for Licensing {
    fn name(&self) -> &'static str {
        "Licensing"
    }

    fn test(&self, record: &MetadataRecord) -> Verdict {
        let free_text = record
            .str_value(Field::License)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let expression = record
            .str_value(Field::LicenseExpression)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let license_classifiers: Vec<&str> = record
            .classifiers()
            .iter()
            .map(String::as_str)
            .filter(|c| c.starts_with("License ::"))
            .collect();

        if free_text.is_none() && expression.is_none() && license_classifiers.is_empty() {
            return Verdict::fail(WEIGHT_HALF, "Your package does not have license data.");
        }

        // The modern expression field replaces both older declarations;
        // mixing them makes the effective license ambiguous.
        if free_text.is_some() && expression.is_some() {
            return Verdict::fail(
                WEIGHT_HALF,
                "Both license and license-expression are set; the license \
                 field is deprecated, declare the license-expression only.",
            );
        }
        if expression.is_some() && !license_classifiers.is_empty() {
            return Verdict::fail(
                WEIGHT_HALF,
                "Both license-expression and License classifiers are set; \
                 the classifiers are deprecated, declare the \
                 license-expression only.",
            );
        }

        if let Some(expression) = expression {
            return match spdx::Expression::parse(expression) {
                Ok(_) => Verdict::pass(WEIGHT_HALF),
                Err(err) => Verdict::fail(
                    WEIGHT_HALF,
                    format!(
                        "The license-expression is not a valid SPDX expression: {}",
                        err.reason
                    ),
                ),
            };
        }

        if let Some(code) = free_text {
            if let Some(accepted) = self.vocabulary.classifiers_for_code(code) {
                let matched = license_classifiers
                    .iter()
                    .any(|c| accepted.contains(*c));
                if !matched {
                    return Verdict::fail(
                        WEIGHT_HALF,
                        format!(
                            "The license '{code}' specified is not listed in \
                             your classifiers."
                        ),
                    );
                }
            }
            // Free text that is not a known short code cannot be
            // cross-checked; declaring it is still better than nothing.
        }

        Verdict::pass(WEIGHT_HALF)
    }
}
