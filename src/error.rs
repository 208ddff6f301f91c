//! Error types for discovery and probing.

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by workspace collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum WorkspaceError {
    /// The workspace was torn down while it was being read.
    ///
    /// Discovery treats this as "nothing to report" and never propagates it.
    #[error("workspace has been disposed")]
    Disposed,
}

/// Typed error variants for a single probe subprocess.
///
/// Most variants are expected while scanning arbitrary folders and only
/// cause the candidate to be skipped; see [`ProbeError::is_soft`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// The executable does not exist.
    #[error("executable not found")]
    NotFound,

    /// The probe did not finish within the configured timeout.
    #[error("probe timed out")]
    Timeout,

    /// The process ran but exited unsuccessfully.
    #[error("probe exited with status {code:?}")]
    NonZeroExit {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// The process output could not be interpreted.
    #[error("malformed probe output")]
    MalformedOutput,

    /// Permission denied launching the executable.
    #[error("permission denied")]
    PermissionDenied,

    /// Any other I/O failure while launching or reading the process.
    #[error("i/o error: {0}")]
    Io(String),
}

impl ProbeError {
    /// Human-readable description of the error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use workspace_env_discovery::ProbeError;
    ///
    /// assert_eq!(ProbeError::Timeout.description(), "Probe timed out");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Executable not found",
            Self::Timeout => "Probe timed out",
            Self::NonZeroExit { .. } => "Probe exited unsuccessfully",
            Self::MalformedOutput => "Failed to parse probe output",
            Self::PermissionDenied => "Permission denied",
            Self::Io(_) => "I/O error during probe",
        }
    }

    /// Whether this failure only disqualifies the candidate.
    ///
    /// Soft failures skip the candidate; everything else aborts the rescan
    /// and is returned to whoever triggered it.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::Timeout | Self::NonZeroExit { .. } | Self::MalformedOutput
        )
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(e.to_string()),
        }
    }
}

/// Errors returned from public discovery operations.
///
/// Only unexpected failures reach callers. When one is returned the cache
/// still holds the last successfully merged results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// Probing a candidate failed in a way that is not a plain rejection.
    #[error("failed to probe {}: {source}", path.display())]
    Probe {
        /// Candidate executable being probed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: ProbeError,
    },
}
