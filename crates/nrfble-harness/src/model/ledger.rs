//! Model ledger - the oracle.
//!
//! Written straight from the ledger's contract with no shared code: events
//! live in a `Vec` in creation order and every lookup is a linear scan.

use nrfble_events::{EventId, EventKind, EventLedger, EventStatus, KeypressState};
use serde::Serialize;

use super::operation::{ModelAuthKey, ModelKeypress, ModelRole, Operation, instance_id};

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservableState {
    /// Event dialog is shown.
    pub visible: bool,
    /// Focused event.
    pub selected: Option<EventId>,
    /// Id the next created event receives.
    pub next_id: EventId,
    /// Events in id order.
    pub events: Vec<ObservedEvent>,
}

/// Observable part of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservedEvent {
    /// Event id.
    pub id: EventId,
    /// Device instance id.
    pub device: String,
    /// Event kind.
    pub kind: EventKind,
    /// Resolution status.
    pub status: EventStatus,
    /// Keypress bookkeeping.
    pub keypress: KeypressState,
}

impl ObservableState {
    /// Extract the observable state of a real ledger.
    pub fn from_ledger(ledger: &EventLedger) -> Self {
        Self {
            visible: ledger.visible(),
            selected: ledger.selected_event_id(),
            next_id: ledger.next_event_id(),
            events: ledger
                .events()
                .map(|event| ObservedEvent {
                    id: event.id,
                    device: event.device.instance_id.clone(),
                    kind: event.kind(),
                    status: event.status,
                    keypress: event.keypress,
                })
                .collect(),
        }
    }
}

/// Model ledger - the reference implementation.
#[derive(Debug, Clone, Default)]
pub struct ModelLedger {
    visible: bool,
    selected: Option<EventId>,
    next_id: EventId,
    events: Vec<ObservedEvent>,
}

impl ModelLedger {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an operation.
    ///
    /// Returns whether the real ledger is expected to report a change.
    pub fn apply(&mut self, op: &Operation) -> bool {
        match *op {
            Operation::ShowDialog { visible } => {
                self.visible = visible;
                true
            },
            Operation::ClearAllEvents => {
                self.events.clear();
                self.selected = None;
                self.next_id = 0;
                true
            },
            Operation::SelectEvent { id } => {
                self.selected = id.map(EventId::from);
                true
            },
            Operation::IgnoreEvent { id: Some(id) } => {
                self.set_status(id.into(), EventStatus::Ignored)
            },
            Operation::AcceptEvent { id: Some(id) } => {
                self.set_status(id.into(), EventStatus::Success)
            },
            Operation::IgnoreEvent { id: None }
            | Operation::AcceptEvent { id: None }
            | Operation::RemoveEvent { id: None } => false,
            Operation::RemoveEvent { id: Some(id) } => {
                let id = EventId::from(id);
                let was_selected = self.selected == Some(id);
                if was_selected {
                    self.selected = None;
                }
                let before = self.events.len();
                self.events.retain(|event| event.id != id);
                was_selected || self.events.len() != before
            },

            Operation::UserConnParamsUpdate { device } => {
                self.create(device, EventKind::UserInitiatedConnectionUpdate, KeypressState::default())
            },
            Operation::UserPhyUpdate { device } => {
                self.create(device, EventKind::UserInitiatedPhyUpdate, KeypressState::default())
            },
            Operation::UserMtuUpdate { device } => {
                self.create(device, EventKind::UserInitiatedMtuUpdate, KeypressState::default())
            },
            Operation::UserDataLengthUpdate { device, .. } => self.create(
                device,
                EventKind::UserInitiatedDataLengthUpdate,
                KeypressState::default(),
            ),
            Operation::UserPairing { device } => {
                self.create(device, EventKind::UserInitiatedPairing, KeypressState::default())
            },
            Operation::PeerConnParamsUpdate { device, role } => {
                let kind = if role == ModelRole::Central {
                    EventKind::PeerCentralInitiatedConnectionUpdate
                } else {
                    EventKind::PeerPeripheralInitiatedConnectionUpdate
                };
                self.create(device, kind, KeypressState::default())
            },
            Operation::PeerPhyUpdate { device } => {
                self.create(device, EventKind::PeerInitiatedPhyUpdate, KeypressState::default())
            },
            Operation::PeerMtuUpdate { device, .. } => {
                self.create(device, EventKind::PeerInitiatedMtuUpdate, KeypressState::default())
            },
            Operation::PeerDataLengthUpdate { device, .. } => self.create(
                device,
                EventKind::PeerInitiatedDataLengthUpdate,
                KeypressState::default(),
            ),
            Operation::SecurityRequest { device } => {
                self.create(device, EventKind::PeerInitiatedPairing, KeypressState::default())
            },
            Operation::PasskeyDisplay { device, numeric, receive_keypress } => {
                let kind =
                    if numeric { EventKind::NumericalComparison } else { EventKind::PasskeyDisplay };
                let keypress =
                    KeypressState { receive_enabled: receive_keypress, ..KeypressState::default() };
                self.create(device, kind, keypress)
            },
            Operation::AuthKeyRequest { device, key, send_keypress } => {
                let kind = match key {
                    ModelAuthKey::Passkey => EventKind::PasskeyRequest,
                    ModelAuthKey::Oob => EventKind::LegacyOobRequest,
                    ModelAuthKey::Unsupported => EventKind::UnsupportedAuthKeyRequest,
                };
                let keypress =
                    KeypressState { send_enabled: send_keypress, ..KeypressState::default() };
                self.create(device, kind, keypress)
            },
            Operation::LescOobRequest { device } => {
                self.create(device, EventKind::LescOobRequest, KeypressState::default())
            },

            Operation::KeypressSent { id, keypress } => {
                let Some(id) = id.map(EventId::from) else {
                    return false;
                };
                match self.events.iter_mut().find(|event| event.id == id) {
                    Some(event) => apply_sent(&mut event.keypress, keypress),
                    None => false,
                }
            },
            Operation::KeypressReceived { device, keypress } => {
                let device = instance_id(device);
                let mut changed = false;
                for event in &mut self.events {
                    if event.device == device
                        && event.status == EventStatus::Indeterminate
                        && event.kind == EventKind::PasskeyDisplay
                        && event.keypress.receive_enabled
                    {
                        changed |= apply_received(&mut event.keypress, keypress);
                    }
                }
                changed
            },

            Operation::AuthError { device } | Operation::SecurityTimeout { device } => {
                self.sweep_unresolved(device, EventStatus::Error)
            },
            Operation::AuthSuccess { device } => {
                self.sweep_unresolved(device, EventStatus::Success)
            },
            Operation::StatusReport { id, status, .. } => match id {
                Some(id) => self.set_status(id.into(), status.status()),
                None => false,
            },
            Operation::Disconnect { device } => {
                let device = instance_id(device);
                let mut changed = false;
                for event in &mut self.events {
                    if event.device == device && event.status == EventStatus::Indeterminate {
                        event.status = EventStatus::Disconnected;
                        changed = true;
                    }
                }
                changed
            },
        }
    }

    /// Observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        let mut events = self.events.clone();
        events.sort_by_key(|event| event.id);
        ObservableState {
            visible: self.visible,
            selected: self.selected,
            next_id: self.next_id,
            events,
        }
    }

    fn create(&mut self, device: u8, kind: EventKind, keypress: KeypressState) -> bool {
        let id = self.next_id;
        self.events.push(ObservedEvent {
            id,
            device: instance_id(device),
            kind,
            status: EventStatus::Indeterminate,
            keypress,
        });
        self.selected = Some(id);
        self.visible = true;
        self.next_id = self.next_id.saturating_add(1);
        true
    }

    fn set_status(&mut self, id: EventId, status: EventStatus) -> bool {
        match self.events.iter_mut().find(|event| event.id == id) {
            Some(event) => {
                event.status = status;
                true
            },
            None => false,
        }
    }

    fn sweep_unresolved(&mut self, device: Option<u8>, status: EventStatus) -> bool {
        let Some(device) = device.map(instance_id) else {
            return false;
        };
        let mut changed = false;
        for event in &mut self.events {
            let unresolved =
                matches!(event.status, EventStatus::Indeterminate | EventStatus::Pending);
            if event.device == device && unresolved {
                event.status = status;
                changed = true;
            }
        }
        changed
    }
}

fn apply_digits(count: &mut i32, keypress: ModelKeypress) -> bool {
    match keypress {
        ModelKeypress::DigitIn => *count = count.saturating_add(1),
        ModelKeypress::DigitOut => *count = count.saturating_sub(1),
        ModelKeypress::Clear => *count = 0,
        ModelKeypress::Start | ModelKeypress::End | ModelKeypress::Garbage => return false,
    }
    true
}

fn apply_received(state: &mut KeypressState, keypress: ModelKeypress) -> bool {
    match keypress {
        ModelKeypress::Start => state.start_received = true,
        ModelKeypress::End => state.end_received = true,
        other => return apply_digits(&mut state.count, other),
    }
    true
}

fn apply_sent(state: &mut KeypressState, keypress: ModelKeypress) -> bool {
    match keypress {
        ModelKeypress::Start => state.start_sent = true,
        ModelKeypress::End => state.end_sent = true,
        other => return apply_digits(&mut state.count, other),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelSource, ModelStatus};

    #[test]
    fn create_selects_and_counts() {
        let mut model = ModelLedger::new();
        model.apply(&Operation::PeerMtuUpdate { device: 0, mtu: 247 });
        model.apply(&Operation::UserPairing { device: 1 });

        let state = model.observable_state();
        assert_eq!(state.next_id, 2);
        assert_eq!(state.selected, Some(1));
        assert!(state.visible);
        assert_eq!(state.events[1].kind, EventKind::UserInitiatedPairing);
    }

    #[test]
    fn disconnect_spares_pending() {
        let mut model = ModelLedger::new();
        model.apply(&Operation::SecurityRequest { device: 0 });
        model.apply(&Operation::SecurityRequest { device: 0 });
        model.apply(&Operation::StatusReport {
            source: ModelSource::Pairing,
            id: Some(0),
            status: ModelStatus::Pending,
        });

        assert!(model.apply(&Operation::Disconnect { device: 0 }));

        let statuses: Vec<_> = model.observable_state().events.iter().map(|e| e.status).collect();
        assert_eq!(statuses, vec![EventStatus::Pending, EventStatus::Disconnected]);
    }

    #[test]
    fn garbage_keypress_is_no_change() {
        let mut model = ModelLedger::new();
        model.apply(&Operation::PasskeyDisplay { device: 0, numeric: false, receive_keypress: true });

        assert!(!model.apply(&Operation::KeypressReceived {
            device: 0,
            keypress: ModelKeypress::Garbage
        }));
        assert!(model.apply(&Operation::KeypressReceived {
            device: 0,
            keypress: ModelKeypress::DigitIn
        }));
        assert_eq!(model.observable_state().events[0].keypress.count, 1);
    }

    #[test]
    fn matches_fresh_real_ledger() {
        let model = ModelLedger::new();
        assert_eq!(model.observable_state(), ObservableState::from_ledger(&EventLedger::default()));
    }
}
