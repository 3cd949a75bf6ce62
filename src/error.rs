//! Error types for the analysis pipeline.
//!
//! Every error here is fatal to the run that encounters it: there is no
//! retry or skip-and-continue mode. The binary maps whatever surfaces to a
//! single diagnostic line and a non-zero exit.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error returned when a capture file cannot be decoded.
///
/// The capture format is strictly sequential: every declared length governs
/// how many bytes the next read consumes, so a declared length that exceeds
/// the remaining buffer means the file is truncated or the header is lying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A field's declared length exceeds the remaining bytes.
    Truncated {
        /// Name of the field being read when the buffer ran out.
        field: &'static str,
        /// Bytes the field required.
        needed: usize,
        /// Bytes actually remaining.
        available: usize,
    },
    /// Bytes remain after the declared sample block.
    ///
    /// A well-formed capture ends exactly at the last sample; leftover bytes
    /// mean the declared sample count is inconsistent with the file size.
    TrailingBytes {
        /// Number of unconsumed bytes.
        extra: usize,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Truncated {
                field,
                needed,
                available,
            } => write!(
                f,
                "capture truncated while reading '{}': need {} bytes, {} remaining",
                field, needed, available
            ),
            FormatError::TrailingBytes { extra } => {
                write!(f, "capture has {} trailing bytes after sample block", extra)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Error returned when statistics are requested over too few values.
///
/// Returned instead of silently producing NaN or undefined min/max.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptySeriesError {
    /// Minimum number of values the operation needs.
    pub required: usize,
    /// Number of values it was given.
    pub actual: usize,
}

impl fmt::Display for EmptySeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "series too short: need at least {} value(s), got {}",
            self.required, self.actual
        )
    }
}

impl std::error::Error for EmptySeriesError {}

/// Top-level error for the analyze and report pipelines.
#[derive(Debug)]
pub enum AnalysisError {
    /// A required input file is absent.
    MissingInput {
        /// What the file was expected to hold.
        what: &'static str,
        /// Path that was checked.
        path: PathBuf,
    },
    /// A capture file could not be decoded.
    Format(FormatError),
    /// A statistic was requested over an empty or singleton series.
    EmptySeries(EmptySeriesError),
    /// Report assembly could not load a previously exported artifact.
    MissingArtifact {
        /// Fixed artifact file name.
        name: &'static str,
        /// Full path that was tried.
        path: PathBuf,
        /// Why loading failed (absent, unreadable, or malformed).
        reason: String,
    },
    /// The template or document-conversion collaborator failed.
    Render(String),
    /// IO failure (permission, disk full). Not caught locally.
    Io(io::Error),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::MissingInput { what, path } => {
                write!(f, "missing {}: {}", what, path.display())
            }
            AnalysisError::Format(e) => write!(f, "{}", e),
            AnalysisError::EmptySeries(e) => write!(f, "{}", e),
            AnalysisError::MissingArtifact { name, path, reason } => {
                write!(
                    f,
                    "required artifact '{}' not usable at {}: {}",
                    name,
                    path.display(),
                    reason
                )
            }
            AnalysisError::Render(msg) => write!(f, "report rendering failed: {}", msg),
            AnalysisError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Format(e) => Some(e),
            AnalysisError::EmptySeries(e) => Some(e),
            AnalysisError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormatError> for AnalysisError {
    fn from(e: FormatError) -> Self {
        AnalysisError::Format(e)
    }
}

impl From<EmptySeriesError> for AnalysisError {
    fn from(e: EmptySeriesError) -> Self {
        AnalysisError::EmptySeries(e)
    }
}

impl From<io::Error> for AnalysisError {
    fn from(e: io::Error) -> Self {
        AnalysisError::Io(e)
    }
}
