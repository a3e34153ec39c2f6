//! Unified error types for pyrind.
//!
//! This module provides the error hierarchy for the library, with rich
//! context for debugging and user-friendly messages. Rating itself never
//! fails; errors come from loading metadata, vocabulary data, or the
//! package index.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pyrind operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PyrindError {
    /// Errors while collecting metadata from a project or file
    #[error("Failed to extract metadata: {context}")]
    Extract {
        context: String,
        #[source]
        source: ExtractErrorKind,
    },

    /// Errors while loading the classifier vocabulary
    #[error("Failed to load classifier vocabulary: {context}")]
    Vocabulary {
        context: String,
        #[source]
        source: VocabularyErrorKind,
    },

    /// Errors talking to the package index
    #[error("Package index lookup failed: {context}")]
    Index {
        context: String,
        #[source]
        source: IndexErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific extraction error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExtractErrorKind {
    #[error("Invalid TOML: {0}")]
    InvalidToml(String),

    #[error("Not a file, directory, or project name: {0}")]
    UnknownTarget(String),

    #[error("Readme file referenced by the project table is missing: {0}")]
    MissingReadme(String),

    #[error("Metadata file is empty or has no headers: {0}")]
    EmptyMetadata(String),
}

/// Specific vocabulary error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VocabularyErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Vocabulary contains no classifiers")]
    Empty,
}

/// Specific package-index error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IndexErrorKind {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Project not found on the index: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for pyrind operations
pub type Result<T> = std::result::Result<T, PyrindError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl PyrindError {
    /// Create an extraction error with context
    pub fn extract(context: impl Into<String>, source: ExtractErrorKind) -> Self {
        Self::Extract {
            context: context.into(),
            source,
        }
    }

    /// Create a vocabulary error with context
    pub fn vocabulary(context: impl Into<String>, source: VocabularyErrorKind) -> Self {
        Self::Vocabulary {
            context: context.into(),
            source,
        }
    }

    /// Create a package-index error with context
    pub fn index(context: impl Into<String>, source: IndexErrorKind) -> Self {
        Self::Index {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for PyrindError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for PyrindError {
    fn from(err: serde_json::Error) -> Self {
        Self::vocabulary(
            "JSON deserialization",
            VocabularyErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<toml::de::Error> for PyrindError {
    fn from(err: toml::de::Error) -> Self {
        Self::extract(
            "TOML deserialization",
            ExtractErrorKind::InvalidToml(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// # Example
///
/// ```ignore
/// use pyrind::error::ErrorContext;
///
/// fn load_project(path: &Path) -> Result<MetadataRecord> {
///     let content = std::fs::read_to_string(path)
///         .context("reading pyproject.toml")?;
///
///     parse_pyproject(&content)
///         .with_context(|| format!("parsing project table from {}", path.display()))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    ///
    /// The context string is prepended to the error's existing context,
    /// creating a chain that shows the path through the code.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<PyrindError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: PyrindError, new_ctx: &str) -> PyrindError {
    match err {
        PyrindError::Extract {
            context: existing,
            source,
        } => PyrindError::Extract {
            context: chain_context(new_ctx, &existing),
            source,
        },
        PyrindError::Vocabulary {
            context: existing,
            source,
        } => PyrindError::Vocabulary {
            context: chain_context(new_ctx, &existing),
            source,
        },
        PyrindError::Index {
            context: existing,
            source,
        } => PyrindError::Index {
            context: chain_context(new_ctx, &existing),
            source,
        },
        PyrindError::Io {
            path,
            message,
            source,
        } => PyrindError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        PyrindError::Config(msg) => PyrindError::Config(chain_context(new_ctx, &msg)),
        PyrindError::Validation(msg) => PyrindError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| PyrindError::Validation(context.into()))
    }
}
