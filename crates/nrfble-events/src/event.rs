//! Ledger events and their lifecycle status.
//!
//! An event is one asynchronous protocol exchange with a remote device:
//! a parameter update, a pairing, or one step of passkey/OOB
//! authentication. Its [`EventPayload`] is a tagged union, so every kind
//! carries exactly the parameters that belong to it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    device::Device,
    error::ParseError,
    keypress::KeypressState,
    params::{AuthKeyParameters, ConnectionParameters, LescOobData, PhyParameters, SecurityParameters},
};

/// Ledger-assigned event identifier. Allocated in increasing order.
pub type EventId = u64;

/// Resolution status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Never assigned to an event in the ledger.
    #[default]
    Unknown,
    /// Awaiting resolution.
    Indeterminate,
    /// Handed to the driver, outcome not yet reported.
    Pending,
    /// Completed successfully.
    Success,
    /// Failed.
    Error,
    /// Dismissed by the user.
    Ignored,
    /// Device disconnected before resolution.
    Disconnected,
}

impl EventStatus {
    /// Status name as used by the driver and in scripts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Indeterminate => "INDETERMINATE",
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Ignored => "IGNORED",
            Self::Disconnected => "DISCONNECTED",
        }
    }

    /// Whether an auth error or success report may still resolve this event.
    pub fn is_unresolved(self) -> bool {
        matches!(self, Self::Indeterminate | Self::Pending)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Self::Unknown),
            "INDETERMINATE" => Ok(Self::Indeterminate),
            "PENDING" => Ok(Self::Pending),
            "SUCCESS" => Ok(Self::Success),
            "ERROR" => Ok(Self::Error),
            "IGNORED" => Ok(Self::Ignored),
            "DISCONNECTED" => Ok(Self::Disconnected),
            other => Err(ParseError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Who asked for a parameter change or pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Origin {
    /// The remote device.
    Peer,
    /// The local operator.
    User,
}

/// Who asked for a connection parameter update.
///
/// Peer requests are split by the remote's role: a peer central applies the
/// parameters itself, a peer peripheral only proposes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionUpdateOrigin {
    /// The remote is central and has updated the parameters.
    PeerCentral,
    /// The remote is peripheral and requests an update.
    PeerPeripheral,
    /// The local operator.
    User,
}

/// Closed set of event kinds, for matching and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum EventKind {
    PeerCentralInitiatedConnectionUpdate,
    PeerPeripheralInitiatedConnectionUpdate,
    UserInitiatedConnectionUpdate,
    PeerInitiatedPhyUpdate,
    UserInitiatedPhyUpdate,
    PeerInitiatedMtuUpdate,
    UserInitiatedMtuUpdate,
    PeerInitiatedDataLengthUpdate,
    UserInitiatedDataLengthUpdate,
    PeerInitiatedPairing,
    UserInitiatedPairing,
    PasskeyDisplay,
    NumericalComparison,
    PasskeyRequest,
    LegacyOobRequest,
    LescOobRequest,
    /// Auth-key request with a key type the ledger has no kind for.
    UnsupportedAuthKeyRequest,
}

impl EventKind {
    /// Whether the local operator created this event.
    pub fn is_user_initiated(self) -> bool {
        matches!(
            self,
            Self::UserInitiatedConnectionUpdate
                | Self::UserInitiatedPhyUpdate
                | Self::UserInitiatedMtuUpdate
                | Self::UserInitiatedDataLengthUpdate
                | Self::UserInitiatedPairing
        )
    }

    /// Whether this is one of the three connection parameter update kinds.
    pub fn is_connection_update(self) -> bool {
        matches!(
            self,
            Self::PeerCentralInitiatedConnectionUpdate
                | Self::PeerPeripheralInitiatedConnectionUpdate
                | Self::UserInitiatedConnectionUpdate
        )
    }
}

/// Kind-specific content of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventPayload {
    /// Connection parameter update.
    ConnectionUpdate {
        /// Requesting side.
        origin: ConnectionUpdateOrigin,
        /// Requested (or seeded) parameters.
        params: ConnectionParameters,
    },
    /// PHY update.
    PhyUpdate {
        /// Requesting side.
        origin: Origin,
        /// Requested PHYs.
        params: PhyParameters,
    },
    /// ATT MTU update.
    MtuUpdate {
        /// Requesting side.
        origin: Origin,
        /// Requested MTU.
        mtu: u16,
    },
    /// Data length update.
    DataLengthUpdate {
        /// Requesting side.
        origin: Origin,
        /// Requested data length in octets.
        data_length: u16,
    },
    /// Pairing.
    Pairing {
        /// Requesting side.
        origin: Origin,
        /// Security parameters.
        params: SecurityParameters,
    },
    /// Show a passkey for the remote to type.
    PasskeyDisplay {
        /// Passkey to display.
        key: AuthKeyParameters,
    },
    /// Ask the user to confirm both sides show the same value.
    NumericalComparison {
        /// Value to compare.
        key: AuthKeyParameters,
    },
    /// Ask the user to type the passkey the remote displays.
    PasskeyRequest,
    /// Ask for legacy out-of-band data.
    LegacyOobRequest,
    /// Exchange LE Secure Connections out-of-band data.
    LescOobRequest {
        /// Our own OOB data, to hand to the remote.
        own_oob_data: LescOobData,
    },
    /// Auth-key request with a key type that has no matching kind.
    UnsupportedAuthKeyRequest {
        /// Key type as reported by the driver.
        key_type: String,
    },
}

impl EventPayload {
    /// Kind of this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ConnectionUpdate { origin, .. } => match origin {
                ConnectionUpdateOrigin::PeerCentral => {
                    EventKind::PeerCentralInitiatedConnectionUpdate
                },
                ConnectionUpdateOrigin::PeerPeripheral => {
                    EventKind::PeerPeripheralInitiatedConnectionUpdate
                },
                ConnectionUpdateOrigin::User => EventKind::UserInitiatedConnectionUpdate,
            },
            Self::PhyUpdate { origin: Origin::Peer, .. } => EventKind::PeerInitiatedPhyUpdate,
            Self::PhyUpdate { origin: Origin::User, .. } => EventKind::UserInitiatedPhyUpdate,
            Self::MtuUpdate { origin: Origin::Peer, .. } => EventKind::PeerInitiatedMtuUpdate,
            Self::MtuUpdate { origin: Origin::User, .. } => EventKind::UserInitiatedMtuUpdate,
            Self::DataLengthUpdate { origin: Origin::Peer, .. } => {
                EventKind::PeerInitiatedDataLengthUpdate
            },
            Self::DataLengthUpdate { origin: Origin::User, .. } => {
                EventKind::UserInitiatedDataLengthUpdate
            },
            Self::Pairing { origin: Origin::Peer, .. } => EventKind::PeerInitiatedPairing,
            Self::Pairing { origin: Origin::User, .. } => EventKind::UserInitiatedPairing,
            Self::PasskeyDisplay { .. } => EventKind::PasskeyDisplay,
            Self::NumericalComparison { .. } => EventKind::NumericalComparison,
            Self::PasskeyRequest => EventKind::PasskeyRequest,
            Self::LegacyOobRequest => EventKind::LegacyOobRequest,
            Self::LescOobRequest { .. } => EventKind::LescOobRequest,
            Self::UnsupportedAuthKeyRequest { .. } => EventKind::UnsupportedAuthKeyRequest,
        }
    }
}

/// One event in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BleEvent {
    /// Ledger-assigned id.
    pub id: EventId,
    /// Device snapshot taken when the event was created.
    pub device: Device,
    /// Kind-specific content.
    pub payload: EventPayload,
    /// Resolution status.
    pub status: EventStatus,
    /// Passkey keypress bookkeeping.
    pub keypress: KeypressState,
}

impl BleEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Whether the event still awaits resolution.
    pub fn is_live(&self) -> bool {
        self.status == EventStatus::Indeterminate
    }

    /// Whether the event concerns `device`.
    pub fn concerns(&self, device: &Device) -> bool {
        self.device.same_device(device)
    }

    /// Requested connection parameters, for connection update events.
    pub fn connection_parameters(&self) -> Option<&ConnectionParameters> {
        match &self.payload {
            EventPayload::ConnectionUpdate { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Passkey to display or compare, for passkey display and numerical
    /// comparison events.
    pub fn passkey(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::PasskeyDisplay { key } | EventPayload::NumericalComparison { key } => {
                Some(key.passkey.as_str())
            },
            _ => None,
        }
    }
}
