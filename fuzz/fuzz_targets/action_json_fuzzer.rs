//! Fuzz target for action script decoding
//!
//! # Strategy
//!
//! - Arbitrary bytes decoded as a JSON action script
//! - Whatever decodes is replayed through a fresh ledger
//!
//! # Invariants
//!
//! - Decoding never panics on malformed input
//! - Decoded scripts never panic the ledger
//! - Every stored id is below the id counter
//! - The replayed ledger serializes

#![no_main]

use libfuzzer_sys::fuzz_target;
use nrfble_events::{EventLedger, LedgerAction};

fuzz_target!(|data: &[u8]| {
    let Ok(actions) = serde_json::from_slice::<Vec<LedgerAction>>(data) else {
        return;
    };

    let mut ledger = EventLedger::default();
    for action in actions {
        ledger.handle(action);
    }

    for event in ledger.events() {
        assert!(
            event.id < ledger.next_event_id(),
            "event {} at counter {}",
            event.id,
            ledger.next_event_id()
        );
    }
    serde_json::to_string(&ledger).expect("ledger serializes");
});
