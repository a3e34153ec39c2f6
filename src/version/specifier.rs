//! PEP 440 version specifier sets, as used by `requires-python`.
//!
//! The rating engine only needs to know whether a specifier set parses,
//! so this validates structure without implementing version matching.

use super::analyze;
use std::fmt;
use thiserror::Error;

/// Comparison operators allowed in a specifier clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `~=`, compatible release
    Compatible,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `===`, arbitrary string equality
    Arbitrary,
}

impl Operator {
    /// The operator's source spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Arbitrary => "===",
        }
    }

    /// Split a clause into its operator and the remainder.
    /// Longest spellings first so `===` is not read as `==`.
    fn strip(clause: &str) -> Option<(Self, &str)> {
        const TABLE: &[(&str, Operator)] = &[
            ("===", Operator::Arbitrary),
            ("~=", Operator::Compatible),
            ("==", Operator::Equal),
            ("!=", Operator::NotEqual),
            ("<=", Operator::LessEq),
            (">=", Operator::GreaterEq),
            ("<", Operator::Less),
            (">", Operator::Greater),
        ];
        for (token, op) in TABLE {
            if let Some(rest) = clause.strip_prefix(token) {
                return Some((*op, rest));
            }
        }
        None
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed specifier clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub op: Operator,
    pub version: String,
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// Why a specifier set failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpecifierError {
    #[error("empty clause in specifier set")]
    EmptyClause,

    #[error("clause has no comparison operator: `{0}`")]
    MissingOperator(String),

    #[error("invalid version after `{op}`: `{version}`")]
    InvalidVersion { op: Operator, version: String },

    #[error("wildcard versions are only allowed with == and !=: `{0}`")]
    WildcardNotAllowed(String),

    #[error("~= needs a release with at least two segments: `{0}`")]
    CompatibleTooShort(String),

    #[error("local version label is not allowed with {op}: `{version}`")]
    LocalNotAllowed { op: Operator, version: String },
}

/// Parse a comma-separated specifier set such as `>=3.8, <4`.
///
/// An empty or all-whitespace input is a valid, empty set.
pub fn parse_specifier_set(input: &str) -> Result<Vec<Specifier>, SpecifierError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut specifiers = Vec::new();
    for raw in trimmed.split(',') {
        let clause = raw.trim();
        if clause.is_empty() {
            return Err(SpecifierError::EmptyClause);
        }
        let (op, rest) = Operator::strip(clause)
            .ok_or_else(|| SpecifierError::MissingOperator(clause.to_string()))?;
        let version = rest.trim();
        if version.is_empty() {
            return Err(SpecifierError::InvalidVersion {
                op,
                version: String::new(),
            });
        }
        validate_clause(op, version, clause)?;
        specifiers.push(Specifier {
            op,
            version: version.to_string(),
        });
    }
    Ok(specifiers)
}

fn validate_clause(op: Operator, version: &str, clause: &str) -> Result<(), SpecifierError> {
    // `===` compares as an opaque string; any single token goes.
    if op == Operator::Arbitrary {
        if version.contains(char::is_whitespace) {
            return Err(SpecifierError::InvalidVersion {
                op,
                version: version.to_string(),
            });
        }
        return Ok(());
    }

    if let Some(prefix) = version.strip_suffix(".*") {
        if !matches!(op, Operator::Equal | Operator::NotEqual) {
            return Err(SpecifierError::WildcardNotAllowed(clause.to_string()));
        }
        if !is_release_only(prefix) {
            return Err(SpecifierError::InvalidVersion {
                op,
                version: version.to_string(),
            });
        }
        return Ok(());
    }

    let Some(shape) = analyze(version) else {
        return Err(SpecifierError::InvalidVersion {
            op,
            version: version.to_string(),
        });
    };

    match op {
        Operator::Compatible => {
            if shape.release_segments < 2 {
                return Err(SpecifierError::CompatibleTooShort(clause.to_string()));
            }
            if shape.has_local {
                return Err(SpecifierError::LocalNotAllowed {
                    op,
                    version: version.to_string(),
                });
            }
        }
        Operator::Less | Operator::Greater | Operator::LessEq | Operator::GreaterEq => {
            if shape.has_local {
                return Err(SpecifierError::LocalNotAllowed {
                    op,
                    version: version.to_string(),
                });
            }
        }
        Operator::Equal | Operator::NotEqual | Operator::Arbitrary => {}
    }
    Ok(())
}

/// `v?`, optional `N!` epoch, then dot-separated integers and nothing else.
/// This is what may appear before a `.*` wildcard.
fn is_release_only(version: &str) -> bool {
    let rest = if version.starts_with('v') || version.starts_with('V') {
        &version[1..]
    } else {
        version
    };
    let rest = match rest.split_once('!') {
        Some((epoch, tail)) => {
            if epoch.is_empty() || !epoch.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            tail
        }
        None => rest,
    };
    !rest.is_empty()
        && rest
            .split('.')
            .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()))
}
