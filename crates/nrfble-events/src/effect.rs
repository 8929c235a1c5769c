//! Observable result of applying one action to the ledger.
//!
//! The UI uses [`LedgerEffect`] to decide what to re-render; tests use it to
//! assert on transitions without diffing whole ledgers.

use crate::event::{EventId, EventStatus};

/// What changed after [`crate::EventLedger::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEffect {
    /// A new event was inserted, selected and the dialog shown.
    Created(EventId),

    /// Events moved to a new status.
    StatusChanged {
        /// Affected events, in id order.
        ids: Vec<EventId>,
        /// Status they now have.
        status: EventStatus,
    },

    /// Keypress bookkeeping changed on these events.
    KeypressRecorded(Vec<EventId>),

    /// An event was deleted.
    Removed(EventId),

    /// Selection changed. `None` means no selection.
    SelectionChanged(Option<EventId>),

    /// Dialog visibility changed.
    VisibilityChanged(bool),

    /// Every event was dropped and id allocation restarted.
    Cleared,

    /// Nothing matched: stale id, sentinel id, absent device or unknown
    /// keypress type.
    Unchanged,
}

impl LedgerEffect {
    /// Whether the action changed anything.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}
