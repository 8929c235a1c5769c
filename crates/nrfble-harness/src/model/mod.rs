//! Reference model for model-based testing.
//!
//! [`ModelLedger`] is a deliberately naive ledger (a flat list scanned
//! linearly) that serves as the oracle. Each [`Operation`] is applied to the
//! model and, translated to a [`nrfble_events::LedgerAction`], to the real
//! ledger; their [`ObservableState`]s must match after every step.

mod ledger;
mod operation;

pub use ledger::{ModelLedger, ObservableState, ObservedEvent};
pub use operation::{
    DEVICE_COUNT, DeviceSlot, ModelAuthKey, ModelEventId, ModelKeypress, ModelRole, ModelSource,
    ModelStatus, Operation,
};
