//! Classifier vocabulary: the canonical classifier list and the license
//! code cross-reference table derived from it.
//!
//! The vocabulary is data, not logic. A versioned snapshot ships embedded
//! in the binary and can be overridden with a newer file at runtime; the
//! `refresh` feature adds the offline job that regenerates the snapshot
//! from the package index.

mod classifiers;
#[cfg(feature = "refresh")]
mod refresh;

pub use classifiers::*;
#[cfg(feature = "refresh")]
pub use refresh::*;
