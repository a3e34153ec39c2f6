//! Metadata collectors.
//!
//! Each collector reads one kind of source and normalizes it into a
//! [`MetadataRecord`](crate::model::MetadataRecord): a project directory
//! with a `pyproject.toml`, a core-metadata file (`PKG-INFO` /
//! `METADATA`), or a release on the package index. Collection is static;
//! no build backend is ever invoked, and what cannot be determined
//! statically is reported through signals instead.

pub mod pkginfo;
pub mod project;
#[cfg(feature = "index")]
pub mod pypi;
