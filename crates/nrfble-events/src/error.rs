//! Error types for the event layer.
//!
//! The ledger itself is total and never fails. Errors only exist at its
//! boundaries: parsing driver/script names into typed values, and
//! validating user edits in the connection update editor.

use thiserror::Error;

use crate::{
    editor::EditorChoice,
    event::{EventId, EventKind},
};

/// Failure to parse a driver or script name into a typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Name is not one of the known event statuses.
    #[error("unknown event status: {0}")]
    UnknownStatus(String),

    /// Name is not one of the known PHY modes.
    #[error("unknown PHY: {0}")]
    UnknownPhy(String),

    /// Name is not one of the known GAP roles.
    #[error("unknown device role: {0}")]
    UnknownRole(String),

    /// Name is not one of the known I/O capabilities.
    #[error("unknown I/O capabilities: {0}")]
    UnknownIoCapabilities(String),

    /// Text is not a sequence of hex digit pairs.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Validation failures reported by the connection update editor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Event does not carry connection parameters.
    #[error("event {id} is a {kind:?}, not a connection update")]
    NotConnectionUpdate {
        /// Id of the offending event.
        id: EventId,
        /// Kind of the offending event.
        kind: EventKind,
    },

    /// Parameters were applied by the peer central and cannot be edited.
    #[error("connection parameters were set by the peer central and are read-only")]
    ReadOnly,

    /// Edited value lies outside the range the SoftDevice accepts.
    #[error("{field} {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Human-readable field name.
        field: &'static str,
        /// Rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },

    /// Choice is not offered for this kind of connection update.
    #[error("{choice:?} is not available for a {kind:?}")]
    ChoiceUnavailable {
        /// Rejected choice.
        choice: EditorChoice,
        /// Kind of the edited event.
        kind: EventKind,
    },
}
