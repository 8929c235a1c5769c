//! BLE event ledger for nRF adapter front-ends.
//!
//! Pure state machine tracking asynchronous BLE protocol exchanges with
//! remote devices (connection parameter, PHY, MTU and data length updates,
//! pairing, passkey and OOB authentication) from request to resolution.
//!
//! # Components
//!
//! - [`EventLedger`]: the state machine (id allocation, selection, sweeps)
//! - [`LedgerAction`]: closed set of driver and UI inputs
//! - [`BleEvent`]: one exchange, with a kind-specific [`EventPayload`]
//! - [`ConnectionUpdateEditor`]: operator-side editing of connection updates

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod config;
mod device;
pub mod editor;
mod effect;
mod error;
mod event;
pub mod hex;
mod keypress;
mod ledger;
mod params;

pub use action::{AuthKeyType, LedgerAction, StatusReport, StatusSource, sentinel_id};
pub use config::{LedgerConfig, MAX_DATA_LENGTH};
pub use device::{DEFAULT_ATT_MTU, Device, Role};
pub use editor::{ConnectionUpdateEditor, EditorChoice, EditorOutcome};
pub use effect::LedgerEffect;
pub use error::{EditorError, ParseError};
pub use event::{
    BleEvent, ConnectionUpdateOrigin, EventId, EventKind, EventPayload, EventStatus, Origin,
};
pub use keypress::{KeypressState, KeypressType};
pub use ledger::EventLedger;
pub use params::{
    AuthKeyParameters, ConnectionParameters, IoCapabilities, LescOobData, Phy, PhyParameters,
    SecurityParameters,
};
