//! Error types for ruleset generation and detector validation.

use core::fmt;
use std::{error::Error, io};

/// Failures produced while asking the rule oracle for a zone's transitions.
///
/// Every variant is fatal for a generation run: a ruleset with gaps is
/// worse than no ruleset at all.
#[derive(Debug)]
pub enum OracleError {
    /// The oracle process could not be started.
    Spawn(io::Error),
    /// The oracle process ran but exited unsuccessfully.
    Exit { code: Option<i32>, stderr: String },
    /// The oracle printed nothing.
    Empty,
    /// The oracle output was not valid JSON.
    Malformed(serde_json::Error),
    /// The oracle output was JSON, but neither an array nor an object.
    UnexpectedShape(&'static str),
    /// A positional response did not carry one entry per requested year.
    YearCountMismatch { expected: usize, found: usize },
    /// A keyed response named a year that was not requested.
    UnexpectedYear(String),
    /// A keyed response omitted a requested year.
    MissingYear(i32),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "could not start oracle: {e}"),
            Self::Exit { code, stderr } => {
                match code {
                    Some(code) => write!(f, "oracle exited with status {code}")?,
                    None => f.write_str("oracle was terminated by a signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr.trim_end())?;
                }
                Ok(())
            }
            Self::Empty => f.write_str("oracle returned an empty response"),
            Self::Malformed(e) => write!(f, "oracle returned malformed JSON: {e}"),
            Self::UnexpectedShape(kind) => {
                write!(f, "expected a JSON array or object from oracle, found {kind}")
            }
            Self::YearCountMismatch { expected, found } => write!(
                f,
                "oracle returned {found} rule sets for {expected} requested years"
            ),
            Self::UnexpectedYear(key) => write!(f, "oracle returned unrequested year `{key}`"),
            Self::MissingYear(year) => write!(f, "oracle response is missing year {year}"),
        }
    }
}

impl Error for OracleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(e) => Some(e),
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

/// The general error type for `dst_rules` operations.
#[derive(Debug)]
pub enum DstRulesError {
    /// The oracle failed for `zone`.
    Oracle { zone: String, error: OracleError },
    /// The detector could not be run at all for `zone`.
    DetectorInvocation { zone: String, error: io::Error },
    InvalidYearRange { first: i32, last: i32 },
    InvalidNamespace(String),
    /// A zone was listed twice in a generation request.
    DuplicateZone(String),
    Serialize(serde_json::Error),
    Io(io::Error),
}

impl DstRulesError {
    pub(crate) fn oracle(zone: &str, error: OracleError) -> Self {
        Self::Oracle {
            zone: zone.into(),
            error,
        }
    }
}

impl fmt::Display for DstRulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oracle { zone, error } => write!(f, "`{zone}`: {error}"),
            Self::DetectorInvocation { zone, error } => {
                write!(f, "`{zone}`: could not run detector: {error}")
            }
            Self::InvalidYearRange { first, last } => {
                write!(f, "invalid year range {first}..={last}")
            }
            Self::InvalidNamespace(ns) => write!(f, "`{ns}` is not a valid namespace path"),
            Self::DuplicateZone(zone) => write!(f, "zone `{zone}` was requested more than once"),
            Self::Serialize(e) => write!(f, "could not serialize ruleset: {e}"),
            Self::Io(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Error for DstRulesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Oracle { error, .. } => Some(error),
            Self::DetectorInvocation { error, .. } => Some(error),
            Self::Serialize(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DstRulesError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for DstRulesError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
