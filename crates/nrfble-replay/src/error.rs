//! Replay error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Script file could not be read.
    #[error("failed to read {path}: {source}", path = .path.display())]
    Io {
        /// Script path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Script (or output) is not valid action JSON.
    #[error("invalid script: {0}")]
    Decode(#[from] serde_json::Error),

    /// A ledger invariant failed after an action.
    #[error("invariant violated at step {step}: {violations}")]
    Invariant {
        /// 0-based index of the offending action.
        step: usize,
        /// All violations, `; ` separated.
        violations: String,
    },
}
