//! Operations for model-based testing.
//!
//! Operations mirror every ledger action over a deliberately small space of
//! devices and ids, so random sequences keep hitting the same events. They
//! are generated by proptest or decoded from fuzzer input via
//! [`arbitrary::Arbitrary`].

use arbitrary::Arbitrary;
use nrfble_events::{
    AuthKeyType, ConnectionParameters, Device, EventId, EventStatus, KeypressType, LedgerAction,
    LescOobData, PhyParameters, Role, SecurityParameters, StatusSource,
};

/// Number of distinct devices operations address.
pub const DEVICE_COUNT: u8 = 3;

/// Device selector, reduced modulo [`DEVICE_COUNT`].
pub type DeviceSlot = u8;

/// Event id selector (u8 keeps the id space small enough to collide).
pub type ModelEventId = u8;

/// GAP role reported for a connection parameter request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ModelRole {
    /// Peer is central.
    Central,
    /// Peer is peripheral.
    Peripheral,
    /// Role not reported yet.
    Unknown,
}

/// Requested key type for an auth-key request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ModelAuthKey {
    /// Passkey entry.
    Passkey,
    /// Legacy OOB.
    Oob,
    /// A key type with no event kind.
    Unsupported,
}

/// Status a driver report may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ModelStatus {
    /// Handed to the driver.
    Pending,
    /// Completed.
    Success,
    /// Failed.
    Error,
}

/// Driver procedure a status report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ModelSource {
    /// Auth key reply.
    AuthKey,
    /// Pairing.
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

impl ModelSource {
    fn source(self) -> StatusSource {
        match self {
            Self::AuthKey => StatusSource::AuthKey,
            Self::Pairing => StatusSource::Pairing,
            Self::ConnectionParamUpdate => StatusSource::ConnectionParamUpdate,
            Self::PhyUpdate => StatusSource::PhyUpdate,
            Self::MtuUpdate => StatusSource::MtuUpdate,
            Self::DataLengthUpdate => StatusSource::DataLengthUpdate,
        }
    }
}

/// Keypress notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ModelKeypress {
    /// Entry started.
    Start,
    /// Digit entered.
    DigitIn,
    /// Digit erased.
    DigitOut,
    /// Entry cleared.
    Clear,
    /// Entry finished.
    End,
    /// A type the ledger does not recognize.
    Garbage,
}

/// Operations that can be applied to a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
#[allow(missing_docs)]
pub enum Operation {
    ShowDialog { visible: bool },
    ClearAllEvents,
    SelectEvent { id: Option<ModelEventId> },
    IgnoreEvent { id: Option<ModelEventId> },
    AcceptEvent { id: Option<ModelEventId> },
    RemoveEvent { id: Option<ModelEventId> },

    UserConnParamsUpdate { device: DeviceSlot },
    UserPhyUpdate { device: DeviceSlot },
    UserMtuUpdate { device: DeviceSlot },
    UserDataLengthUpdate { device: DeviceSlot, data_length: Option<u8> },
    UserPairing { device: DeviceSlot },

    PeerConnParamsUpdate { device: DeviceSlot, role: ModelRole },
    PeerPhyUpdate { device: DeviceSlot },
    PeerMtuUpdate { device: DeviceSlot, mtu: u16 },
    PeerDataLengthUpdate { device: DeviceSlot, data_length: u8 },
    SecurityRequest { device: DeviceSlot },
    PasskeyDisplay { device: DeviceSlot, numeric: bool, receive_keypress: bool },
    AuthKeyRequest { device: DeviceSlot, key: ModelAuthKey, send_keypress: bool },
    LescOobRequest { device: DeviceSlot },

    KeypressSent { id: Option<ModelEventId>, keypress: ModelKeypress },
    KeypressReceived { device: DeviceSlot, keypress: ModelKeypress },

    AuthError { device: Option<DeviceSlot> },
    AuthSuccess { device: Option<DeviceSlot> },
    SecurityTimeout { device: Option<DeviceSlot> },
    StatusReport { source: ModelSource, id: Option<ModelEventId>, status: ModelStatus },
    Disconnect { device: DeviceSlot },
}

/// Instance id of a device slot.
pub(crate) fn instance_id(slot: DeviceSlot) -> String {
    format!("device-{}", slot % DEVICE_COUNT)
}

fn device(slot: DeviceSlot) -> Device {
    let instance_id = instance_id(slot);
    Device::new(instance_id.clone()).with_address(instance_id)
}

impl ModelRole {
    fn role(self) -> Option<Role> {
        match self {
            Self::Central => Some(Role::Central),
            Self::Peripheral => Some(Role::Peripheral),
            Self::Unknown => None,
        }
    }
}

impl ModelAuthKey {
    fn key_type(self) -> AuthKeyType {
        match self {
            Self::Passkey => AuthKeyType::Passkey,
            Self::Oob => AuthKeyType::Oob,
            Self::Unsupported => AuthKeyType::from("BLE_GAP_AUTH_KEY_TYPE_NONE"),
        }
    }
}

impl ModelStatus {
    /// Ledger status this report carries.
    pub fn status(self) -> EventStatus {
        match self {
            Self::Pending => EventStatus::Pending,
            Self::Success => EventStatus::Success,
            Self::Error => EventStatus::Error,
        }
    }
}

impl ModelKeypress {
    fn keypress_type(self) -> KeypressType {
        match self {
            Self::Start => KeypressType::Start,
            Self::DigitIn => KeypressType::DigitIn,
            Self::DigitOut => KeypressType::DigitOut,
            Self::Clear => KeypressType::Clear,
            Self::End => KeypressType::End,
            Self::Garbage => KeypressType::from("BLE_GAP_KP_NOT_TYPE_GARBAGE"),
        }
    }
}

fn event_id(id: ModelEventId) -> EventId {
    EventId::from(id)
}

impl Operation {
    /// Ledger action this operation stands for.
    pub fn to_action(&self) -> LedgerAction {
        match *self {
            Self::ShowDialog { visible } => LedgerAction::ShowDialog { visible },
            Self::ClearAllEvents => LedgerAction::ClearAllEvents,
            Self::SelectEvent { id } => LedgerAction::SelectEventId { id: id.map(event_id) },
            Self::IgnoreEvent { id } => LedgerAction::IgnoreEvent { id: id.map(event_id) },
            Self::AcceptEvent { id } => LedgerAction::AcceptEvent { id: id.map(event_id) },
            Self::RemoveEvent { id } => LedgerAction::RemoveEvent { id: id.map(event_id) },
            Self::UserConnParamsUpdate { device: slot } => {
                LedgerAction::CreateUserInitiatedConnParamsUpdate { device: device(slot) }
            },
            Self::UserPhyUpdate { device: slot } => {
                LedgerAction::CreateUserInitiatedPhyUpdate { device: device(slot) }
            },
            Self::UserMtuUpdate { device: slot } => {
                LedgerAction::CreateUserInitiatedMtuUpdate { device: device(slot) }
            },
            Self::UserDataLengthUpdate { device: slot, data_length } => {
                LedgerAction::CreateUserInitiatedDataLengthUpdate {
                    device: device(slot),
                    data_length: data_length.map(u16::from),
                }
            },
            Self::UserPairing { device: slot } => LedgerAction::CreateUserInitiatedPairing {
                device: device(slot),
                default_sec_params: SecurityParameters::default(),
            },
            Self::PeerConnParamsUpdate { device: slot, role } => {
                let mut device = device(slot);
                device.role = role.role();
                LedgerAction::ConnectionParamUpdateRequest {
                    device,
                    requested_connection_params: ConnectionParameters::with_fixed_interval(
                        30.0, 0, 4000,
                    ),
                }
            },
            Self::PeerPhyUpdate { device: slot } => LedgerAction::PhyUpdateRequest {
                device: device(slot),
                requested_phy_params: PhyParameters::default(),
            },
            Self::PeerMtuUpdate { device: slot, mtu } => {
                LedgerAction::MtuUpdateRequest { device: device(slot), requested_mtu: mtu }
            },
            Self::PeerDataLengthUpdate { device: slot, data_length } => {
                LedgerAction::DataLengthUpdateRequest {
                    device: device(slot),
                    requested_data_length: u16::from(data_length),
                }
            },
            Self::SecurityRequest { device: slot } => LedgerAction::SecurityRequest {
                device: device(slot),
                params: SecurityParameters::default(),
            },
            Self::PasskeyDisplay { device: slot, numeric, receive_keypress } => {
                LedgerAction::PasskeyDisplay {
                    device: device(slot),
                    match_request: numeric,
                    passkey: "123456".into(),
                    receive_keypress,
                }
            },
            Self::AuthKeyRequest { device: slot, key, send_keypress } => {
                LedgerAction::AuthKeyRequest {
                    device: device(slot),
                    key_type: key.key_type(),
                    send_keypress,
                }
            },
            Self::LescOobRequest { device: slot } => LedgerAction::LescOobRequest {
                device: device(slot),
                own_oob_data: LescOobData::default(),
            },
            Self::KeypressSent { id, keypress } => LedgerAction::PasskeyKeypressSent {
                id: id.map(event_id),
                keypress_type: keypress.keypress_type(),
            },
            Self::KeypressReceived { device: slot, keypress } => {
                LedgerAction::PasskeyKeypressReceived {
                    device: device(slot),
                    keypress_type: keypress.keypress_type(),
                }
            },
            Self::AuthError { device: slot } => {
                LedgerAction::AuthErrorOccurred { device: slot.map(device) }
            },
            Self::AuthSuccess { device: slot } => {
                LedgerAction::AuthSuccessOccurred { device: slot.map(device) }
            },
            Self::SecurityTimeout { device: slot } => {
                LedgerAction::SecurityRequestTimedOut { device: slot.map(device) }
            },
            Self::StatusReport { source, id, status } => {
                source.source().report(id.map(event_id), status.status())
            },
            Self::Disconnect { device: slot } => {
                LedgerAction::DeviceDisconnected { device: device(slot) }
            },
        }
    }
}
