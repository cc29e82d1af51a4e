//! Error types for the edges of the program: terminal I/O, configuration
//! files and the command line.
//!
//! The simulation itself never fails. Degenerate inputs there resolve to an
//! inert or instantaneous result instead of an error value.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error enum for neonburst.
#[derive(Debug)]
pub enum ShowError {
    /// Terminal or file I/O failed.
    Io(io::Error),

    /// A configuration file could not be parsed as TOML.
    ConfigParse {
        /// File that was being read.
        path: PathBuf,
        /// Parser diagnostic.
        source: toml::de::Error,
    },

    /// A configuration value was parsed but is unusable.
    InvalidConfig {
        /// Dotted path of the offending key, e.g. `particles.shell.friction`.
        field: &'static str,
        /// Human-readable description of the accepted range.
        reason: String,
    },

    /// A colour string was not of the form `RRGGBB` / `#RRGGBB`.
    InvalidColor(String),

    /// Bad command-line usage.
    Usage(String),
}

impl fmt::Display for ShowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowError::Io(e) => write!(f, "terminal I/O failed: {}", e),
            ShowError::ConfigParse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            ShowError::InvalidConfig { field, reason } => {
                write!(f, "invalid config value '{}': {}", field, reason)
            }
            ShowError::InvalidColor(raw) => write!(
                f,
                "invalid hex color '{}' (expected RRGGBB, e.g. 1a1b26)",
                raw
            ),
            ShowError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ShowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShowError::Io(e) => Some(e),
            ShowError::ConfigParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for ShowError {
    fn from(e: io::Error) -> Self {
        ShowError::Io(e)
    }
}

/// Convenience alias: a `Result` using `ShowError` as the error type.
pub type ShowResult<T> = Result<T, ShowError>;
