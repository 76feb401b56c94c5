//! Metric sampling error types.

use std::fmt;

/// Error returned when an OS metric cannot be sampled.
#[derive(Debug)]
pub enum ProbeError {
    /// Reading a kernel interface file failed.
    Io {
        path: String,
        error: std::io::Error,
    },
    /// A kernel interface returned data we could not parse.
    Parse {
        source: &'static str,
        message: String,
    },
    /// The OS returned no sample for the metric.
    Unavailable(String),
    /// The metric is not available on this platform.
    Unsupported(&'static str),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Io { path, error } => {
                write!(f, "failed to read {}: {}", path, error)
            }
            ProbeError::Parse { source, message } => {
                write!(f, "failed to parse {}: {}", source, message)
            }
            ProbeError::Unavailable(message) => {
                write!(f, "metric unavailable: {}", message)
            }
            ProbeError::Unsupported(metric) => {
                write!(f, "{} is not supported on this platform", metric)
            }
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Result type alias for metric sampling.
pub type ProbeResult<T> = Result<T, ProbeError>;
