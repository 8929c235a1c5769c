//! Test harness for the BLE event ledger.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference ledger for model-based testing.
//! Operations are applied to both the model and [`nrfble_events::EventLedger`],
//! and their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all action sequences,
//! not specific scenarios. Use [`InvariantRegistry::standard()`] for the
//! ledger invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod model;

pub use invariants::{
    ClearedLedgerEmpty, CounterMonotonicity, CounterObservation, EventSnapshot, IdsBelowCounter,
    Invariant, InvariantKind, InvariantRegistry, InvariantResult, LedgerSnapshot,
    NoUnknownStatus, ReceivedKeypressOnDisplay, Violation,
};
pub use model::{
    DEVICE_COUNT, DeviceSlot, ModelAuthKey, ModelEventId, ModelKeypress, ModelLedger, ModelRole,
    ModelSource, ModelStatus, ObservableState, ObservedEvent, Operation,
};
