//! Fuzz target for the event ledger state machine
//!
//! # Strategy
//!
//! - Operation sequences over three devices and a small id space, so stale
//!   ids, sentinel ids and cross-device sweeps collide constantly
//! - Every operation is applied to the reference model and the real ledger
//!
//! # Invariants
//!
//! - Model and real ledger agree on observable state after every step
//! - Model and real ledger agree on whether anything changed
//! - Standard ledger invariants hold after every step

#![no_main]

use libfuzzer_sys::fuzz_target;
use nrfble_events::{EventLedger, LedgerAction};
use nrfble_harness::{InvariantRegistry, LedgerSnapshot, ModelLedger, ObservableState, Operation};

fuzz_target!(|ops: Vec<Operation>| {
    let mut model = ModelLedger::new();
    let mut real = EventLedger::default();
    let invariants = InvariantRegistry::standard();
    let mut snapshot = LedgerSnapshot::from_ledger(&real);

    for (step, op) in ops.iter().enumerate() {
        let action = op.to_action();
        let cleared = matches!(action, LedgerAction::ClearAllEvents);

        let model_changed = model.apply(op);
        let real_changed = real.handle(action).is_change();
        assert_eq!(model_changed, real_changed, "effect divergence at step {step}: {op:?}");
        assert_eq!(
            model.observable_state(),
            ObservableState::from_ledger(&real),
            "state divergence at step {step}: {op:?}"
        );

        snapshot.observe(&real, cleared);
        invariants.assert_all(&snapshot, &format!("at step {step}: {op:?}"));
    }
});
