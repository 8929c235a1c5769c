//! BLE event ledger state machine.
//!
//! This module defines [`EventLedger`], the store of pending and resolved BLE
//! protocol events shown in the event dialog. It is a pure state machine:
//! it consumes [`crate::LedgerAction`] inputs, performs no I/O, and never
//! fails. Stale or sentinel ids, absent devices, and unknown keypress types
//! leave it untouched, because the driver and the UI race benignly (an event
//! can be removed by the user while the driver reports its outcome).
//!
//! # Responsibilities
//!
//! - Allocates event ids from a counter owned by the ledger, restarted only
//!   by [`EventLedger::clear_all_events`].
//! - Selects every new event and shows the dialog.
//! - Resolves events by id (operator decisions, driver status reports) or by
//!   device (disconnects, authentication outcomes).
//! - Tracks passkey keypress notifications in both directions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    AuthKeyType, LedgerAction, LedgerConfig, LedgerEffect, StatusReport, StatusSource,
    action::sentinel_id,
    device::Device,
    event::{BleEvent, ConnectionUpdateOrigin, EventId, EventKind, EventPayload, EventStatus, Origin},
    keypress::{KeypressState, KeypressType},
    params::{
        AuthKeyParameters, ConnectionParameters, LescOobData, PhyParameters, SecurityParameters,
    },
};

/// Event ledger.
///
/// Owns its id counter, so independent ledgers never share ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLedger {
    /// Tunables. Not part of the observable state.
    #[serde(skip)]
    config: LedgerConfig,
    /// Event dialog is shown.
    visible: bool,
    /// Events by id.
    events: BTreeMap<EventId, BleEvent>,
    /// Focused event. `None` if nothing is selected.
    #[serde(with = "sentinel_id")]
    selected_event_id: Option<EventId>,
    /// Id the next created event receives.
    next_event_id: EventId,
}

impl Default for EventLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl EventLedger {
    /// Create an empty ledger.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            visible: false,
            events: BTreeMap::new(),
            selected_event_id: None,
            next_event_id: 0,
        }
    }

    /// Apply one action.
    pub fn handle(&mut self, action: LedgerAction) -> LedgerEffect {
        match action {
            LedgerAction::ShowDialog { visible } => {
                self.show_dialog(visible);
                LedgerEffect::VisibilityChanged(visible)
            },
            LedgerAction::ClearAllEvents => {
                self.clear_all_events();
                LedgerEffect::Cleared
            },
            LedgerAction::SelectEventId { id } => {
                self.select_event_id(id);
                LedgerEffect::SelectionChanged(id)
            },
            LedgerAction::IgnoreEvent { id: Some(id) } => {
                status_effect(self.ignore_event(id), id, EventStatus::Ignored)
            },
            LedgerAction::AcceptEvent { id: Some(id) } => {
                status_effect(self.accept_event(id), id, EventStatus::Success)
            },
            LedgerAction::RemoveEvent { id: Some(id) } => {
                let was_selected = self.selected_event_id == Some(id);
                match self.remove_event(id) {
                    Some(_) => LedgerEffect::Removed(id),
                    // Stale selection of a missing event is still cleared.
                    None if was_selected => LedgerEffect::SelectionChanged(None),
                    None => LedgerEffect::Unchanged,
                }
            },
            LedgerAction::IgnoreEvent { id: None }
            | LedgerAction::AcceptEvent { id: None }
            | LedgerAction::RemoveEvent { id: None } => {
                tracing::debug!("operator action without an event");
                LedgerEffect::Unchanged
            },
            LedgerAction::CreateUserInitiatedConnParamsUpdate { device } => {
                LedgerEffect::Created(self.create_user_initiated_conn_params_update_event(device))
            },
            LedgerAction::CreateUserInitiatedPhyUpdate { device } => {
                LedgerEffect::Created(self.create_user_initiated_phy_update_event(device))
            },
            LedgerAction::CreateUserInitiatedMtuUpdate { device } => {
                LedgerEffect::Created(self.create_user_initiated_mtu_update_event(device))
            },
            LedgerAction::CreateUserInitiatedDataLengthUpdate { device, data_length } => {
                LedgerEffect::Created(
                    self.create_user_initiated_data_length_update_event(device, data_length),
                )
            },
            LedgerAction::CreateUserInitiatedPairing { device, default_sec_params } => {
                LedgerEffect::Created(
                    self.create_user_initiated_pairing_event(device, default_sec_params),
                )
            },
            LedgerAction::ConnectionParamUpdateRequest { device, requested_connection_params } => {
                LedgerEffect::Created(
                    self.connection_update_param_request(device, requested_connection_params),
                )
            },
            LedgerAction::PhyUpdateRequest { device, requested_phy_params } => {
                LedgerEffect::Created(self.phy_update_request(device, requested_phy_params))
            },
            LedgerAction::MtuUpdateRequest { device, requested_mtu } => {
                LedgerEffect::Created(self.mtu_update_request(device, requested_mtu))
            },
            LedgerAction::DataLengthUpdateRequest { device, requested_data_length } => {
                LedgerEffect::Created(self.data_length_update_request(device, requested_data_length))
            },
            LedgerAction::SecurityRequest { device, params } => {
                LedgerEffect::Created(self.security_request(device, params))
            },
            LedgerAction::PasskeyDisplay { device, match_request, passkey, receive_keypress } => {
                LedgerEffect::Created(self.passkey_display(
                    device,
                    match_request,
                    passkey,
                    receive_keypress,
                ))
            },
            LedgerAction::PasskeyKeypressSent { id, keypress_type } => {
                match (id, self.passkey_keypress_sent(id, &keypress_type)) {
                    (Some(id), true) => LedgerEffect::KeypressRecorded(vec![id]),
                    _ => LedgerEffect::Unchanged,
                }
            },
            LedgerAction::PasskeyKeypressReceived { device, keypress_type } => {
                let ids = self.passkey_keypress_received(&device, &keypress_type);
                if ids.is_empty() {
                    LedgerEffect::Unchanged
                } else {
                    LedgerEffect::KeypressRecorded(ids)
                }
            },
            LedgerAction::AuthKeyRequest { device, key_type, send_keypress } => {
                LedgerEffect::Created(self.auth_key_request(device, key_type, send_keypress))
            },
            LedgerAction::LescOobRequest { device, own_oob_data } => {
                LedgerEffect::Created(self.lesc_oob_request(device, own_oob_data))
            },
            LedgerAction::AuthErrorOccurred { device } => {
                sweep_effect(self.auth_error_occurred(device.as_ref()), EventStatus::Error)
            },
            LedgerAction::AuthSuccessOccurred { device } => {
                sweep_effect(self.auth_success_occurred(device.as_ref()), EventStatus::Success)
            },
            LedgerAction::SecurityRequestTimedOut { device } => {
                sweep_effect(self.security_request_timed_out(device.as_ref()), EventStatus::Error)
            },
            LedgerAction::AuthKeyStatus(report) => {
                self.status_report(StatusSource::AuthKey, report)
            },
            LedgerAction::PairingStatus(report) => {
                self.status_report(StatusSource::Pairing, report)
            },
            LedgerAction::ConnectionParamUpdateStatus(report) => {
                self.status_report(StatusSource::ConnectionParamUpdate, report)
            },
            LedgerAction::PhyUpdateStatus(report) => {
                self.status_report(StatusSource::PhyUpdate, report)
            },
            LedgerAction::MtuUpdateStatus(report) => {
                self.status_report(StatusSource::MtuUpdate, report)
            },
            LedgerAction::DataLengthUpdateStatus(report) => {
                self.status_report(StatusSource::DataLengthUpdate, report)
            },
            LedgerAction::DeviceDisconnected { device } => {
                sweep_effect(self.device_disconnected(&device), EventStatus::Disconnected)
            },
        }
    }

    /// Show or hide the event dialog.
    pub fn show_dialog(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Drop every event, clear the selection and restart ids at 0.
    ///
    /// Only call this when no id handed out earlier is still referenced
    /// elsewhere, or new events will alias stale references.
    pub fn clear_all_events(&mut self) {
        tracing::debug!(dropped = self.events.len(), "clearing all events");
        self.events.clear();
        self.selected_event_id = None;
        self.next_event_id = 0;
    }

    /// Focus an event. The id is not checked against the ledger.
    pub fn select_event_id(&mut self, id: Option<EventId>) {
        self.selected_event_id = id;
    }

    /// Mark an event as dismissed by the operator.
    ///
    /// Returns `false` if no such event exists.
    pub fn ignore_event(&mut self, id: EventId) -> bool {
        self.set_status(id, EventStatus::Ignored)
    }

    /// Mark an event as accepted by the operator.
    ///
    /// Returns `false` if no such event exists.
    pub fn accept_event(&mut self, id: EventId) -> bool {
        self.set_status(id, EventStatus::Success)
    }

    /// Set an event's status verbatim, as reported by the driver.
    ///
    /// `None` (the driver's "no event") and unknown ids are ignored.
    pub fn update_event_status(&mut self, id: Option<EventId>, status: EventStatus) -> bool {
        match id {
            Some(id) => self.set_status(id, status),
            None => false,
        }
    }

    fn status_report(&mut self, source: StatusSource, report: StatusReport) -> LedgerEffect {
        let StatusReport { id, status } = report;
        tracing::debug!(?source, ?id, %status, "status report");
        match id {
            Some(id) if self.update_event_status(Some(id), status) => {
                LedgerEffect::StatusChanged { ids: vec![id], status }
            },
            _ => LedgerEffect::Unchanged,
        }
    }

    /// Delete an event. Clears the selection if it pointed at the event.
    ///
    /// The id counter is not affected.
    pub fn remove_event(&mut self, id: EventId) -> Option<BleEvent> {
        if self.selected_event_id == Some(id) {
            self.selected_event_id = None;
        }
        self.events.remove(&id)
    }

    /// Peer requested new connection parameters.
    ///
    /// A peer central has already applied them, a peer peripheral only
    /// proposes them.
    pub fn connection_update_param_request(
        &mut self,
        device: Device,
        requested: ConnectionParameters,
    ) -> EventId {
        let origin = if device.is_central() {
            ConnectionUpdateOrigin::PeerCentral
        } else {
            ConnectionUpdateOrigin::PeerPeripheral
        };
        self.insert(
            device,
            EventPayload::ConnectionUpdate { origin, params: requested },
            KeypressState::default(),
        )
    }

    /// Peer requested a PHY update.
    pub fn phy_update_request(&mut self, device: Device, requested: PhyParameters) -> EventId {
        self.insert(
            device,
            EventPayload::PhyUpdate { origin: Origin::Peer, params: requested },
            KeypressState::default(),
        )
    }

    /// Peer requested an MTU exchange.
    pub fn mtu_update_request(&mut self, device: Device, mtu: u16) -> EventId {
        self.insert(
            device,
            EventPayload::MtuUpdate { origin: Origin::Peer, mtu },
            KeypressState::default(),
        )
    }

    /// Peer requested a data length update.
    pub fn data_length_update_request(&mut self, device: Device, data_length: u16) -> EventId {
        self.insert(
            device,
            EventPayload::DataLengthUpdate { origin: Origin::Peer, data_length },
            KeypressState::default(),
        )
    }

    /// Peer requested pairing.
    pub fn security_request(&mut self, device: Device, params: SecurityParameters) -> EventId {
        self.insert(
            device,
            EventPayload::Pairing { origin: Origin::Peer, params },
            KeypressState::default(),
        )
    }

    /// Driver asks us to display a passkey, or a value for numerical
    /// comparison.
    pub fn passkey_display(
        &mut self,
        device: Device,
        is_numeric_comparison: bool,
        passkey: String,
        receive_keypress: bool,
    ) -> EventId {
        let key = AuthKeyParameters { passkey };
        let payload = if is_numeric_comparison {
            EventPayload::NumericalComparison { key }
        } else {
            EventPayload::PasskeyDisplay { key }
        };
        self.insert(device, payload, KeypressState::receiving(receive_keypress))
    }

    /// Driver asks for an authentication key.
    ///
    /// Key types without a matching kind produce an
    /// [`EventKind::UnsupportedAuthKeyRequest`] event recording the reported
    /// type.
    pub fn auth_key_request(
        &mut self,
        device: Device,
        key_type: AuthKeyType,
        send_keypress: bool,
    ) -> EventId {
        let payload = match key_type {
            AuthKeyType::Passkey => EventPayload::PasskeyRequest,
            AuthKeyType::Oob => EventPayload::LegacyOobRequest,
            AuthKeyType::Other(key_type) => {
                tracing::warn!(%key_type, device = %device.instance_id, "unsupported auth key type");
                EventPayload::UnsupportedAuthKeyRequest { key_type }
            },
        };
        self.insert(device, payload, KeypressState::sending(send_keypress))
    }

    /// Driver asks for LE Secure Connections OOB data.
    pub fn lesc_oob_request(&mut self, device: Device, own_oob_data: LescOobData) -> EventId {
        self.insert(
            device,
            EventPayload::LescOobRequest { own_oob_data },
            KeypressState::default(),
        )
    }

    /// Operator opened a connection parameter update, seeded from the
    /// device's preferred parameters.
    pub fn create_user_initiated_conn_params_update_event(&mut self, device: Device) -> EventId {
        let params = device.connection_parameters;
        self.insert(
            device,
            EventPayload::ConnectionUpdate { origin: ConnectionUpdateOrigin::User, params },
            KeypressState::default(),
        )
    }

    /// Operator opened a PHY update, seeded from the device's current PHYs.
    pub fn create_user_initiated_phy_update_event(&mut self, device: Device) -> EventId {
        let params = PhyParameters { tx_phy: device.tx_phy, rx_phy: device.rx_phy };
        self.insert(
            device,
            EventPayload::PhyUpdate { origin: Origin::User, params },
            KeypressState::default(),
        )
    }

    /// Operator opened an MTU update, seeded from the device's current MTU.
    pub fn create_user_initiated_mtu_update_event(&mut self, device: Device) -> EventId {
        let mtu = device.mtu;
        self.insert(
            device,
            EventPayload::MtuUpdate { origin: Origin::User, mtu },
            KeypressState::default(),
        )
    }

    /// Operator opened a data length update. `None` proposes the configured
    /// default.
    pub fn create_user_initiated_data_length_update_event(
        &mut self,
        device: Device,
        data_length: Option<u16>,
    ) -> EventId {
        let data_length = data_length.unwrap_or(self.config.default_data_length);
        self.insert(
            device,
            EventPayload::DataLengthUpdate { origin: Origin::User, data_length },
            KeypressState::default(),
        )
    }

    /// Operator started pairing with the given default parameters.
    pub fn create_user_initiated_pairing_event(
        &mut self,
        device: Device,
        default_sec_params: SecurityParameters,
    ) -> EventId {
        self.insert(
            device,
            EventPayload::Pairing { origin: Origin::User, params: default_sec_params },
            KeypressState::default(),
        )
    }

    /// Every live event of a disconnected device becomes
    /// [`EventStatus::Disconnected`].
    pub fn device_disconnected(&mut self, device: &Device) -> Vec<EventId> {
        self.sweep(device, |event| event.is_live(), EventStatus::Disconnected)
    }

    /// Every unresolved event of `device` becomes [`EventStatus::Error`].
    ///
    /// Absent devices are ignored.
    pub fn auth_error_occurred(&mut self, device: Option<&Device>) -> Vec<EventId> {
        match device {
            Some(device) => {
                self.sweep(device, |event| event.status.is_unresolved(), EventStatus::Error)
            },
            None => Vec::new(),
        }
    }

    /// Every unresolved event of `device` becomes [`EventStatus::Success`].
    ///
    /// Absent devices are ignored.
    pub fn auth_success_occurred(&mut self, device: Option<&Device>) -> Vec<EventId> {
        match device {
            Some(device) => {
                self.sweep(device, |event| event.status.is_unresolved(), EventStatus::Success)
            },
            None => Vec::new(),
        }
    }

    /// Our security request went unanswered. Same as an auth error.
    pub fn security_request_timed_out(&mut self, device: Option<&Device>) -> Vec<EventId> {
        self.auth_error_occurred(device)
    }

    /// Peer sent a keypress notification.
    ///
    /// Applied to every live passkey display event of the device that has
    /// keypress reception enabled. Returns the updated events.
    pub fn passkey_keypress_received(
        &mut self,
        device: &Device,
        keypress: &KeypressType,
    ) -> Vec<EventId> {
        if let KeypressType::Unrecognized(raw) = keypress {
            tracing::warn!(keypress = %raw, device = %device.instance_id, "unrecognized keypress");
            return Vec::new();
        }

        self.events
            .values_mut()
            .filter(|event| {
                event.is_live()
                    && event.concerns(device)
                    && event.kind() == EventKind::PasskeyDisplay
                    && event.keypress.receive_enabled
            })
            .filter_map(|event| event.keypress.record_received(keypress).then_some(event.id))
            .collect()
    }

    /// We sent a keypress notification for an event.
    ///
    /// `None`, unknown ids and unrecognized types are ignored.
    pub fn passkey_keypress_sent(&mut self, id: Option<EventId>, keypress: &KeypressType) -> bool {
        let Some(id) = id else {
            return false;
        };
        match self.events.get_mut(&id) {
            Some(event) => event.keypress.record_sent(keypress),
            None => {
                tracing::debug!(id, %keypress, "keypress sent for unknown event");
                false
            },
        }
    }

    /// Whether the event dialog is shown.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// All events, in id order.
    pub fn events(&self) -> impl Iterator<Item = &BleEvent> {
        self.events.values()
    }

    /// Event by id.
    pub fn event(&self, id: EventId) -> Option<&BleEvent> {
        self.events.get(&id)
    }

    /// Focused event id. `None` if nothing is selected.
    pub fn selected_event_id(&self) -> Option<EventId> {
        self.selected_event_id
    }

    /// Focused event. `None` if nothing is selected or the selection is
    /// stale.
    pub fn selected_event(&self) -> Option<&BleEvent> {
        self.selected_event_id.and_then(|id| self.events.get(&id))
    }

    /// Id the next created event will receive.
    pub fn next_event_id(&self) -> EventId {
        self.next_event_id
    }

    /// Events concerning `device`, in id order.
    pub fn events_for<'a>(&'a self, device: &'a Device) -> impl Iterator<Item = &'a BleEvent> {
        self.events.values().filter(move |event| event.concerns(device))
    }

    /// Events still awaiting resolution, in id order.
    pub fn live_events(&self) -> impl Iterator<Item = &BleEvent> {
        self.events.values().filter(|event| event.is_live())
    }

    /// Whether any event still awaits resolution.
    pub fn has_live_events(&self) -> bool {
        self.live_events().next().is_some()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the ledger holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn insert(&mut self, device: Device, payload: EventPayload, keypress: KeypressState) -> EventId {
        let id = self.next_event_id;
        tracing::debug!(id, kind = ?payload.kind(), device = %device.instance_id, "event created");

        self.events.insert(
            id,
            BleEvent { id, device, payload, status: EventStatus::Indeterminate, keypress },
        );
        self.selected_event_id = Some(id);
        self.visible = true;
        self.next_event_id = self.next_event_id.saturating_add(1);
        id
    }

    fn set_status(&mut self, id: EventId, status: EventStatus) -> bool {
        match self.events.get_mut(&id) {
            Some(event) => {
                event.status = status;
                true
            },
            None => {
                tracing::debug!(id, %status, "status change for unknown event");
                false
            },
        }
    }

    fn sweep(
        &mut self,
        device: &Device,
        predicate: impl Fn(&BleEvent) -> bool,
        status: EventStatus,
    ) -> Vec<EventId> {
        let ids: Vec<EventId> = self
            .events
            .values_mut()
            .filter(|event| event.concerns(device) && predicate(event))
            .map(|event| {
                event.status = status;
                event.id
            })
            .collect();
        tracing::debug!(device = %device.instance_id, %status, swept = ids.len(), "device sweep");
        ids
    }
}

fn status_effect(changed: bool, id: EventId, status: EventStatus) -> LedgerEffect {
    if changed {
        LedgerEffect::StatusChanged { ids: vec![id], status }
    } else {
        LedgerEffect::Unchanged
    }
}

fn sweep_effect(ids: Vec<EventId>, status: EventStatus) -> LedgerEffect {
    if ids.is_empty() {
        LedgerEffect::Unchanged
    } else {
        LedgerEffect::StatusChanged { ids, status }
    }
}
