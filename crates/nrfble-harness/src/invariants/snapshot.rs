//! Observable ledger snapshots for invariant checking.
//!
//! Snapshots capture the observable state of a ledger at a point in time.
//! Invariants operate on snapshots rather than the live ledger so that
//! hand-built states can be checked too.

use nrfble_events::{EventId, EventKind, EventLedger, EventStatus, KeypressState};

/// Snapshot of one ledger.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Event dialog is shown.
    pub visible: bool,
    /// Focused event.
    pub selected_event_id: Option<EventId>,
    /// Id the next created event receives.
    pub next_event_id: EventId,
    /// Events in id order.
    pub events: Vec<EventSnapshot>,
    /// Counter values seen so far, oldest first.
    pub counter_history: Vec<CounterObservation>,
}

/// One reading of the id counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterObservation {
    /// Counter value.
    pub next_event_id: EventId,
    /// The action just applied was a clear.
    pub after_clear: bool,
}

/// Snapshot of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSnapshot {
    /// Event id.
    pub id: EventId,
    /// Instance id of the device the event concerns.
    pub instance_id: String,
    /// Event kind.
    pub kind: EventKind,
    /// Resolution status.
    pub status: EventStatus,
    /// Keypress bookkeeping.
    pub keypress: KeypressState,
}

impl LedgerSnapshot {
    /// Snapshot of a ledger with no prior history.
    pub fn from_ledger(ledger: &EventLedger) -> Self {
        let mut snapshot = Self::default();
        snapshot.observe(ledger, false);
        snapshot
    }

    /// Refresh from `ledger` after an action and record the counter.
    ///
    /// `after_clear` marks that the action was a clear, which is the only
    /// time the counter may move backwards.
    pub fn observe(&mut self, ledger: &EventLedger, after_clear: bool) {
        self.visible = ledger.visible();
        self.selected_event_id = ledger.selected_event_id();
        self.next_event_id = ledger.next_event_id();
        self.events = ledger
            .events()
            .map(|event| EventSnapshot {
                id: event.id,
                instance_id: event.device.instance_id.clone(),
                kind: event.kind(),
                status: event.status,
                keypress: event.keypress,
            })
            .collect();
        self.counter_history
            .push(CounterObservation { next_event_id: self.next_event_id, after_clear });
    }

    /// Whether the latest observation followed a clear.
    pub fn just_cleared(&self) -> bool {
        self.counter_history.last().is_some_and(|obs| obs.after_clear)
    }
}
