//! Headless connection parameter update editor.
//!
//! Holds the operator's edits for one connection update event and turns the
//! chosen button into either a ledger action or a driver request. The editor
//! offers a single connection interval: on update it is forced onto the
//! SoftDevice by submitting it as both the minimum and maximum interval.
//!
//! Ranges follow the SoftDevice limits. An out-of-range interval is flagged
//! but does not block submission; out-of-range latency or timeout does.

use crate::{
    LedgerAction,
    device::Device,
    error::EditorError,
    event::{BleEvent, EventId, EventKind},
    params::ConnectionParameters,
};

/// Smallest connection interval (ms).
pub const CONN_INTERVAL_MIN: f64 = 7.5;
/// Largest connection interval (ms).
pub const CONN_INTERVAL_MAX: f64 = 4000.0;
/// Connection interval granularity (ms).
pub const CONN_INTERVAL_STEP: f64 = 1.25;
/// Smallest supervision timeout (ms).
pub const CONN_TIMEOUT_MIN: u16 = 100;
/// Largest supervision timeout (ms).
pub const CONN_TIMEOUT_MAX: u16 = 32000;
/// Supervision timeout granularity (ms).
pub const CONN_TIMEOUT_STEP: u16 = 10;
/// Smallest peripheral latency.
pub const CONN_LATENCY_MIN: u16 = 0;
/// Largest peripheral latency.
pub const CONN_LATENCY_MAX: u16 = 499;
/// Peripheral latency granularity.
pub const CONN_LATENCY_STEP: u16 = 1;

/// Inclusive range check.
pub fn is_in_range<T: PartialOrd>(value: T, min: T, max: T) -> bool {
    value >= min && value <= max
}

/// Buttons the editor can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorChoice {
    /// Dismiss a peer request without answering it.
    Ignore,
    /// Refuse a peer peripheral's request.
    Reject,
    /// Acknowledge parameters a peer central already applied.
    Accept,
    /// Drop the link to a peer central.
    Disconnect,
    /// Submit the edited parameters.
    Update,
    /// Abandon a user-initiated update.
    Cancel,
}

const PEER_PERIPHERAL_CHOICES: &[EditorChoice] =
    &[EditorChoice::Ignore, EditorChoice::Reject, EditorChoice::Update];
const PEER_CENTRAL_CHOICES: &[EditorChoice] = &[EditorChoice::Accept, EditorChoice::Disconnect];
const USER_CHOICES: &[EditorChoice] = &[EditorChoice::Update, EditorChoice::Cancel];

/// What the host must do with the operator's choice.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    /// Apply this action to the ledger.
    Ledger(LedgerAction),

    /// Ask the driver to apply new connection parameters.
    UpdateConnectionParams {
        /// Event being answered.
        id: EventId,
        /// Target device.
        device: Device,
        /// Parameters to submit.
        params: ConnectionParameters,
    },

    /// Ask the driver to refuse the request. For a peer central this means
    /// disconnecting.
    RejectConnectionParams {
        /// Event being answered.
        id: EventId,
        /// Target device.
        device: Device,
    },
}

/// Editor state for one connection update event.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionUpdateEditor {
    id: EventId,
    kind: EventKind,
    device: Device,
    requested: ConnectionParameters,
    connection_interval: f64,
    peripheral_latency: u16,
    connection_supervision_timeout: u16,
}

impl ConnectionUpdateEditor {
    /// Open the editor on an event, seeded from its requested parameters.
    ///
    /// The interval starts at the requested minimum.
    pub fn for_event(event: &BleEvent) -> Result<Self, EditorError> {
        let kind = event.kind();
        let requested = event
            .connection_parameters()
            .copied()
            .ok_or(EditorError::NotConnectionUpdate { id: event.id, kind })?;

        Ok(Self {
            id: event.id,
            kind,
            device: event.device.clone(),
            requested,
            connection_interval: requested.min_connection_interval,
            peripheral_latency: requested.peripheral_latency,
            connection_supervision_timeout: requested.connection_supervision_timeout,
        })
    }

    /// Edited event.
    pub fn event_id(&self) -> EventId {
        self.id
    }

    /// Kind of the edited event.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Parameters as originally requested.
    pub fn requested(&self) -> &ConnectionParameters {
        &self.requested
    }

    /// A peer central has already applied its parameters; nothing is
    /// editable.
    pub fn read_only(&self) -> bool {
        self.kind == EventKind::PeerCentralInitiatedConnectionUpdate
    }

    /// Current interval edit (ms).
    pub fn connection_interval(&self) -> f64 {
        self.connection_interval
    }

    /// Current latency edit.
    pub fn peripheral_latency(&self) -> u16 {
        self.peripheral_latency
    }

    /// Current timeout edit (ms).
    pub fn connection_supervision_timeout(&self) -> u16 {
        self.connection_supervision_timeout
    }

    /// Edit the connection interval. Out-of-range values are kept and
    /// flagged.
    pub fn set_connection_interval(&mut self, interval: f64) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.connection_interval = interval;
        Ok(())
    }

    /// Edit the peripheral latency. Out-of-range values are kept and
    /// flagged.
    pub fn set_peripheral_latency(&mut self, latency: u16) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.peripheral_latency = latency;
        Ok(())
    }

    /// Edit the supervision timeout. Out-of-range values are kept and
    /// flagged.
    pub fn set_connection_supervision_timeout(&mut self, timeout: u16) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.connection_supervision_timeout = timeout;
        Ok(())
    }

    /// Whether the interval edit is within SoftDevice limits.
    pub fn is_connection_interval_valid(&self) -> bool {
        is_in_range(self.connection_interval, CONN_INTERVAL_MIN, CONN_INTERVAL_MAX)
    }

    /// Whether the latency edit is within SoftDevice limits.
    pub fn is_peripheral_latency_valid(&self) -> bool {
        is_in_range(self.peripheral_latency, CONN_LATENCY_MIN, CONN_LATENCY_MAX)
    }

    /// Whether the timeout edit is within SoftDevice limits.
    pub fn is_connection_supervision_timeout_valid(&self) -> bool {
        is_in_range(self.connection_supervision_timeout, CONN_TIMEOUT_MIN, CONN_TIMEOUT_MAX)
    }

    /// Whether submitting buttons (Update, Accept) are disabled.
    pub fn is_submit_disabled(&self) -> bool {
        !self.is_peripheral_latency_valid() || !self.is_connection_supervision_timeout_valid()
    }

    /// Check every field, reporting the first one out of range.
    pub fn validate(&self) -> Result<(), EditorError> {
        if !self.is_connection_interval_valid() {
            return Err(EditorError::OutOfRange {
                field: "connection interval",
                value: self.connection_interval,
                min: CONN_INTERVAL_MIN,
                max: CONN_INTERVAL_MAX,
            });
        }
        self.validate_submission()
    }

    /// Buttons offered for this kind of update.
    pub fn choices(&self) -> &'static [EditorChoice] {
        match self.kind {
            EventKind::PeerCentralInitiatedConnectionUpdate => PEER_CENTRAL_CHOICES,
            EventKind::UserInitiatedConnectionUpdate => USER_CHOICES,
            _ => PEER_PERIPHERAL_CHOICES,
        }
    }

    /// Parameters to submit: the chosen interval as both bounds.
    pub fn update_request(&self) -> ConnectionParameters {
        ConnectionParameters::with_fixed_interval(
            self.connection_interval,
            self.peripheral_latency,
            self.connection_supervision_timeout,
        )
    }

    /// Resolve a button press.
    pub fn choose(&self, choice: EditorChoice) -> Result<EditorOutcome, EditorError> {
        if !self.choices().contains(&choice) {
            return Err(EditorError::ChoiceUnavailable { choice, kind: self.kind });
        }

        let outcome = match choice {
            EditorChoice::Ignore => {
                EditorOutcome::Ledger(LedgerAction::IgnoreEvent { id: Some(self.id) })
            },
            EditorChoice::Cancel => {
                EditorOutcome::Ledger(LedgerAction::RemoveEvent { id: Some(self.id) })
            },
            EditorChoice::Accept => {
                self.validate_submission()?;
                EditorOutcome::Ledger(LedgerAction::AcceptEvent { id: Some(self.id) })
            },
            EditorChoice::Reject | EditorChoice::Disconnect => {
                EditorOutcome::RejectConnectionParams { id: self.id, device: self.device.clone() }
            },
            EditorChoice::Update => {
                self.validate_submission()?;
                EditorOutcome::UpdateConnectionParams {
                    id: self.id,
                    device: self.device.clone(),
                    params: self.update_request(),
                }
            },
        };
        Ok(outcome)
    }

    fn ensure_editable(&self) -> Result<(), EditorError> {
        if self.read_only() { Err(EditorError::ReadOnly) } else { Ok(()) }
    }

    fn validate_submission(&self) -> Result<(), EditorError> {
        if !self.is_peripheral_latency_valid() {
            return Err(EditorError::OutOfRange {
                field: "peripheral latency",
                value: f64::from(self.peripheral_latency),
                min: f64::from(CONN_LATENCY_MIN),
                max: f64::from(CONN_LATENCY_MAX),
            });
        }
        if !self.is_connection_supervision_timeout_valid() {
            return Err(EditorError::OutOfRange {
                field: "connection supervision timeout",
                value: f64::from(self.connection_supervision_timeout),
                min: f64::from(CONN_TIMEOUT_MIN),
                max: f64::from(CONN_TIMEOUT_MAX),
            });
        }
        Ok(())
    }
}
