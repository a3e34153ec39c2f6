//! Typed representation of package metadata.
//!
//! Every metadata source (project directories, core-metadata files, the
//! package index) is normalized into a [`MetadataRecord`] before rating.
//! Fields are an enumerated set with tagged-union values; engine-facing
//! collector facts travel in the separate [`Signals`] struct.

mod record;

pub use record::*;
