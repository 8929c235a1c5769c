//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use nrfble_events::{EventKind, EventStatus};

use super::{Invariant, InvariantKind, InvariantResult, LedgerSnapshot, Violation};

/// Every stored id was handed out by the counter.
///
/// Ids are allocated from `next_event_id`, so every stored id must be
/// strictly below it.
pub struct IdsBelowCounter;

impl Invariant for IdsBelowCounter {
    fn kind(&self) -> InvariantKind {
        InvariantKind::IdsBelowCounter
    }

    fn check(&self, state: &LedgerSnapshot) -> InvariantResult {
        match state.events.iter().find(|event| event.id >= state.next_event_id) {
            Some(event) => Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "event {} stored but next_event_id is {}",
                    event.id, state.next_event_id
                ),
            }),
            None => Ok(()),
        }
    }
}

/// Stored events always carry a real status.
///
/// `Unknown` only exists for events that were never inserted.
pub struct NoUnknownStatus;

impl Invariant for NoUnknownStatus {
    fn kind(&self) -> InvariantKind {
        InvariantKind::NoUnknownStatus
    }

    fn check(&self, state: &LedgerSnapshot) -> InvariantResult {
        match state.events.iter().find(|event| event.status == EventStatus::Unknown) {
            Some(event) => Err(Violation {
                invariant: self.kind(),
                message: format!("event {} ({:?}) has status UNKNOWN", event.id, event.kind),
            }),
            None => Ok(()),
        }
    }
}

/// The id counter never decreases, except to restart on clear.
///
/// Checks the latest step of the counter history; earlier steps were
/// checked as they were observed.
pub struct CounterMonotonicity;

impl Invariant for CounterMonotonicity {
    fn kind(&self) -> InvariantKind {
        InvariantKind::CounterMonotonicity
    }

    fn check(&self, state: &LedgerSnapshot) -> InvariantResult {
        let Some(&[before, after]) = state.counter_history.last_chunk::<2>() else {
            return Ok(());
        };
        if !after.after_clear && after.next_event_id < before.next_event_id {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "next_event_id decreased {} -> {} without a clear",
                    before.next_event_id, after.next_event_id
                ),
            });
        }
        Ok(())
    }
}

/// A clear leaves no events, no selection, and restarts the counter.
pub struct ClearedLedgerEmpty;

impl Invariant for ClearedLedgerEmpty {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ClearedLedgerEmpty
    }

    fn check(&self, state: &LedgerSnapshot) -> InvariantResult {
        if !state.just_cleared() {
            return Ok(());
        }
        if !state.events.is_empty() || state.selected_event_id.is_some() || state.next_event_id != 0
        {
            return Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "after clear: {} events, selection {:?}, next_event_id {}",
                    state.events.len(),
                    state.selected_event_id,
                    state.next_event_id
                ),
            });
        }
        Ok(())
    }
}

/// Keypresses from the peer are only ever recorded on passkey display
/// events that enabled reception.
pub struct ReceivedKeypressOnDisplay;

impl Invariant for ReceivedKeypressOnDisplay {
    fn kind(&self) -> InvariantKind {
        InvariantKind::ReceivedKeypressOnDisplay
    }

    fn check(&self, state: &LedgerSnapshot) -> InvariantResult {
        let offender = state.events.iter().find(|event| {
            let received = event.keypress.start_received || event.keypress.end_received;
            received && (event.kind != EventKind::PasskeyDisplay || !event.keypress.receive_enabled)
        });
        match offender {
            Some(event) => Err(Violation {
                invariant: self.kind(),
                message: format!(
                    "event {} ({:?}) recorded a received keypress without reception enabled",
                    event.id, event.kind
                ),
            }),
            None => Ok(()),
        }
    }
}
