//! Commands that drive the event ledger.
//!
//! This module defines [`LedgerAction`], the closed set of inputs accepted by
//! [`crate::EventLedger::handle`]. Actions originate from two sources:
//! - The adapter driver, reporting peer requests and outcomes.
//! - The UI, reporting operator decisions.
//!
//! Both are serialized into one queue before reaching the ledger. The serde
//! tags and field names are the ones the host application dispatches, so a
//! recorded action stream can be replayed verbatim. The short field name
//! `id` is accepted as well for hand-written scripts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    device::Device,
    event::{EventId, EventStatus},
    keypress::KeypressType,
    params::{ConnectionParameters, LescOobData, PhyParameters, SecurityParameters},
};

/// Authentication key type requested by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthKeyType {
    /// Six-digit passkey entry.
    Passkey,
    /// Legacy out-of-band key.
    Oob,
    /// Any other key type, kept verbatim.
    Other(String),
}

impl AuthKeyType {
    /// Driver spelling of this key type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Passkey => "BLE_GAP_AUTH_KEY_TYPE_PASSKEY",
            Self::Oob => "BLE_GAP_AUTH_KEY_TYPE_OOB",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for AuthKeyType {
    fn from(raw: &str) -> Self {
        match raw {
            "BLE_GAP_AUTH_KEY_TYPE_PASSKEY" => Self::Passkey,
            "BLE_GAP_AUTH_KEY_TYPE_OOB" => Self::Oob,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for AuthKeyType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<AuthKeyType> for String {
    fn from(key_type: AuthKeyType) -> Self {
        match key_type {
            AuthKeyType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AuthKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver procedure whose outcome a status report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusSource {
    /// Auth key reply.
    AuthKey,
    /// Pairing procedure.
    Pairing,
    /// Connection parameter update.
    ConnectionParamUpdate,
    /// PHY update.
    PhyUpdate,
    /// MTU exchange.
    MtuUpdate,
    /// Data length update.
    DataLengthUpdate,
}

impl StatusSource {
    /// Status report action for this procedure.
    pub fn report(self, id: Option<EventId>, status: EventStatus) -> LedgerAction {
        let report = StatusReport { id, status };
        match self {
            Self::AuthKey => LedgerAction::AuthKeyStatus(report),
            Self::Pairing => LedgerAction::PairingStatus(report),
            Self::ConnectionParamUpdate => LedgerAction::ConnectionParamUpdateStatus(report),
            Self::PhyUpdate => LedgerAction::PhyUpdateStatus(report),
            Self::MtuUpdate => LedgerAction::MtuUpdateStatus(report),
            Self::DataLengthUpdate => LedgerAction::DataLengthUpdateStatus(report),
        }
    }
}

/// Outcome of a driver procedure started for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Event the procedure belongs to. `None` is ignored.
    #[serde(with = "sentinel_id")]
    pub id: Option<EventId>,
    /// Reported status.
    pub status: EventStatus,
}

/// Inputs processed by the event ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum LedgerAction {
    /// Show or hide the event dialog.
    #[serde(rename = "BLE_EVENT_SHOW_DIALOG")]
    ShowDialog {
        /// New visibility.
        visible: bool,
    },

    /// Drop every event and reset id allocation.
    #[serde(rename = "BLE_EVENT_CLEAR_ALL_EVENTS")]
    ClearAllEvents,

    /// Focus an event. `None` clears the selection.
    #[serde(rename = "BLE_EVENT_SELECT_EVENT_ID")]
    SelectEventId {
        /// Event to select.
        #[serde(rename = "selectedEventId", alias = "id", with = "sentinel_id")]
        id: Option<EventId>,
    },

    /// Operator dismissed an event.
    #[serde(rename = "BLE_EVENT_IGNORE")]
    IgnoreEvent {
        /// Dismissed event. `None` is ignored.
        #[serde(rename = "eventId", alias = "id", with = "sentinel_id")]
        id: Option<EventId>,
    },

    /// Operator accepted an event.
    #[serde(rename = "BLE_EVENT_ACCEPT")]
    AcceptEvent {
        /// Accepted event. `None` is ignored.
        #[serde(rename = "eventId", alias = "id", with = "sentinel_id")]
        id: Option<EventId>,
    },

    /// Operator closed an event.
    #[serde(rename = "BLE_EVENT_REMOVE")]
    RemoveEvent {
        /// Removed event. `None` is ignored.
        #[serde(rename = "eventId", alias = "id", with = "sentinel_id")]
        id: Option<EventId>,
    },

    /// Operator opened a connection parameter update.
    #[serde(rename = "BLE_EVENT_CREATE_USER_INITIATED_CONN_PARAMS_UPDATE_EVENT")]
    CreateUserInitiatedConnParamsUpdate {
        /// Target device.
        device: Device,
    },

    /// Operator opened a PHY update.
    #[serde(rename = "BLE_EVENT_CREATE_USER_INITIATED_PHY_UPDATE_EVENT")]
    CreateUserInitiatedPhyUpdate {
        /// Target device.
        device: Device,
    },

    /// Operator opened an MTU update.
    #[serde(rename = "BLE_EVENT_CREATE_USER_INITIATED_MTU_UPDATE_EVENT")]
    CreateUserInitiatedMtuUpdate {
        /// Target device.
        device: Device,
    },

    /// Operator opened a data length update.
    #[serde(rename = "BLE_EVENT_CREATE_USER_INITIATED_DATA_LENGTH_UPDATE_EVENT")]
    CreateUserInitiatedDataLengthUpdate {
        /// Target device.
        device: Device,
        /// Requested length. `None` uses the configured default.
        #[serde(default)]
        data_length: Option<u16>,
    },

    /// Operator started pairing.
    #[serde(rename = "BLE_EVENT_CREATE_USER_INITIATED_PAIRING_EVENT")]
    CreateUserInitiatedPairing {
        /// Target device.
        device: Device,
        /// Security parameters to propose.
        default_sec_params: SecurityParameters,
    },

    /// Peer requested (or, as central, applied) new connection parameters.
    #[serde(rename = "DEVICE_CONNECTION_PARAM_UPDATE_REQUEST")]
    ConnectionParamUpdateRequest {
        /// Requesting device.
        device: Device,
        /// Requested parameters.
        requested_connection_params: ConnectionParameters,
    },

    /// Peer requested a PHY update.
    #[serde(rename = "DEVICE_PHY_UPDATE_REQUEST")]
    PhyUpdateRequest {
        /// Requesting device.
        device: Device,
        /// Requested PHYs.
        requested_phy_params: PhyParameters,
    },

    /// Peer requested an MTU exchange.
    #[serde(rename = "DEVICE_MTU_UPDATE_REQUEST")]
    MtuUpdateRequest {
        /// Requesting device.
        device: Device,
        /// Requested MTU.
        requested_mtu: u16,
    },

    /// Peer requested a data length update.
    #[serde(rename = "DEVICE_DATA_LENGTH_UPDATE_REQUEST")]
    DataLengthUpdateRequest {
        /// Requesting device.
        device: Device,
        /// Requested data length.
        requested_data_length: u16,
    },

    /// Peer requested pairing.
    #[serde(rename = "DEVICE_SECURITY_REQUEST")]
    SecurityRequest {
        /// Requesting device.
        device: Device,
        /// Peer security parameters.
        params: SecurityParameters,
    },

    /// Driver asks us to display a passkey or comparison value.
    #[serde(rename = "DEVICE_PASSKEY_DISPLAY")]
    PasskeyDisplay {
        /// Peer device.
        device: Device,
        /// Numerical comparison rather than plain display.
        match_request: bool,
        /// Value to show.
        passkey: String,
        /// Peer will send keypress notifications.
        receive_keypress: bool,
    },

    /// We sent a keypress notification for an event.
    #[serde(rename = "DEVICE_PASSKEY_KEYPRESS_SENT")]
    PasskeyKeypressSent {
        /// Event the notification belongs to. `None` is ignored.
        #[serde(rename = "eventId", alias = "id", with = "sentinel_id")]
        id: Option<EventId>,
        /// Notification type.
        keypress_type: KeypressType,
    },

    /// Peer sent a keypress notification.
    #[serde(rename = "DEVICE_PASSKEY_KEYPRESS_RECEIVED")]
    PasskeyKeypressReceived {
        /// Peer device.
        device: Device,
        /// Notification type.
        keypress_type: KeypressType,
    },

    /// Driver asks for an authentication key.
    #[serde(rename = "DEVICE_AUTHKEY_REQUEST")]
    AuthKeyRequest {
        /// Peer device.
        device: Device,
        /// Requested key type.
        key_type: AuthKeyType,
        /// We should send keypress notifications.
        send_keypress: bool,
    },

    /// Driver asks for LE Secure Connections OOB data.
    #[serde(rename = "DEVICE_LESC_OOB_REQUEST")]
    LescOobRequest {
        /// Peer device.
        device: Device,
        /// Our OOB data.
        own_oob_data: LescOobData,
    },

    /// Authentication failed.
    #[serde(rename = "DEVICE_AUTH_ERROR_OCCURED")]
    AuthErrorOccurred {
        /// Affected device, if the driver knows it.
        #[serde(default)]
        device: Option<Device>,
    },

    /// Authentication completed.
    #[serde(rename = "DEVICE_AUTH_SUCCESS_OCCURED")]
    AuthSuccessOccurred {
        /// Affected device, if the driver knows it.
        #[serde(default)]
        device: Option<Device>,
    },

    /// Peer never answered our security request.
    #[serde(rename = "DEVICE_SECURITY_REQUEST_TIMEOUT")]
    SecurityRequestTimedOut {
        /// Affected device, if the driver knows it.
        #[serde(default)]
        device: Option<Device>,
    },

    /// Driver answered an auth key reply.
    #[serde(rename = "DEVICE_AUTHKEY_STATUS")]
    AuthKeyStatus(StatusReport),

    /// Pairing procedure finished or moved on.
    #[serde(rename = "DEVICE_PAIRING_STATUS")]
    PairingStatus(StatusReport),

    /// Connection parameter update finished.
    #[serde(rename = "DEVICE_CONNECTION_PARAM_UPDATE_STATUS")]
    ConnectionParamUpdateStatus(StatusReport),

    /// PHY update finished.
    #[serde(rename = "DEVICE_PHY_UPDATE_STATUS")]
    PhyUpdateStatus(StatusReport),

    /// MTU exchange finished.
    #[serde(rename = "DEVICE_MTU_UPDATE_STATUS")]
    MtuUpdateStatus(StatusReport),

    /// Data length update finished.
    #[serde(rename = "DEVICE_DATA_LENGTH_UPDATE_STATUS")]
    DataLengthUpdateStatus(StatusReport),

    /// Device link dropped.
    #[serde(rename = "DEVICE_DISCONNECTED")]
    DeviceDisconnected {
        /// Disconnected device.
        device: Device,
    },
}

impl LedgerAction {
    /// Whether this action always allocates a new event.
    pub fn creates_event(&self) -> bool {
        matches!(
            self,
            Self::CreateUserInitiatedConnParamsUpdate { .. }
                | Self::CreateUserInitiatedPhyUpdate { .. }
                | Self::CreateUserInitiatedMtuUpdate { .. }
                | Self::CreateUserInitiatedDataLengthUpdate { .. }
                | Self::CreateUserInitiatedPairing { .. }
                | Self::ConnectionParamUpdateRequest { .. }
                | Self::PhyUpdateRequest { .. }
                | Self::MtuUpdateRequest { .. }
                | Self::DataLengthUpdateRequest { .. }
                | Self::SecurityRequest { .. }
                | Self::PasskeyDisplay { .. }
                | Self::AuthKeyRequest { .. }
                | Self::LescOobRequest { .. }
        )
    }

    /// Procedure and outcome, if this is a status report.
    pub fn status_report(&self) -> Option<(StatusSource, StatusReport)> {
        match *self {
            Self::AuthKeyStatus(report) => Some((StatusSource::AuthKey, report)),
            Self::PairingStatus(report) => Some((StatusSource::Pairing, report)),
            Self::ConnectionParamUpdateStatus(report) => {
                Some((StatusSource::ConnectionParamUpdate, report))
            },
            Self::PhyUpdateStatus(report) => Some((StatusSource::PhyUpdate, report)),
            Self::MtuUpdateStatus(report) => Some((StatusSource::MtuUpdate, report)),
            Self::DataLengthUpdateStatus(report) => Some((StatusSource::DataLengthUpdate, report)),
            _ => None,
        }
    }
}

/// Optional event ids on the wire, with `-1` meaning "no event".
pub mod sentinel_id {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::event::EventId;

    /// Write `None` as `-1`.
    pub fn serialize<S: Serializer>(id: &Option<EventId>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_u64(*id),
            None => serializer.serialize_i64(-1),
        }
    }

    /// Read any negative id as `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<EventId>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(from_raw(raw))
    }

    /// Map a signed driver id onto an optional ledger id.
    pub fn from_raw(raw: i64) -> Option<EventId> {
        EventId::try_from(raw).ok()
    }
}
