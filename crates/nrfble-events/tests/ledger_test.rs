//! Scenario tests for the event ledger driven through `handle`.
//!
//! Each test plays the role of the host application: the driver reports
//! peer requests and outcomes, the operator answers through the UI, and the
//! ledger is inspected the way the event dialog reads it.

use nrfble_events::{
    AuthKeyType, ConnectionParameters, ConnectionUpdateEditor, Device, EditorChoice,
    EditorOutcome, EventKind, EventLedger, EventPayload, EventStatus, KeypressType, LedgerAction,
    LedgerEffect, LescOobData, Phy, PhyParameters, Role, SecurityParameters, StatusSource,
};

fn device(id: &str) -> Device {
    Device::new(id).with_address(format!("{id}-addr"))
}

fn preferred() -> ConnectionParameters {
    ConnectionParameters {
        min_connection_interval: 7.5,
        max_connection_interval: 30.0,
        connection_supervision_timeout: 4000,
        peripheral_latency: 0,
    }
}

/// One action of every creating kind, in a fixed order.
fn every_creation(device: &Device) -> Vec<LedgerAction> {
    vec![
        LedgerAction::CreateUserInitiatedConnParamsUpdate { device: device.clone() },
        LedgerAction::CreateUserInitiatedPhyUpdate { device: device.clone() },
        LedgerAction::CreateUserInitiatedMtuUpdate { device: device.clone() },
        LedgerAction::CreateUserInitiatedDataLengthUpdate {
            device: device.clone(),
            data_length: None,
        },
        LedgerAction::CreateUserInitiatedPairing {
            device: device.clone(),
            default_sec_params: SecurityParameters::default(),
        },
        LedgerAction::ConnectionParamUpdateRequest {
            device: device.clone(),
            requested_connection_params: preferred(),
        },
        LedgerAction::PhyUpdateRequest {
            device: device.clone(),
            requested_phy_params: PhyParameters { tx_phy: Phy::TwoMbps, rx_phy: Phy::TwoMbps },
        },
        LedgerAction::MtuUpdateRequest { device: device.clone(), requested_mtu: 247 },
        LedgerAction::DataLengthUpdateRequest { device: device.clone(), requested_data_length: 27 },
        LedgerAction::SecurityRequest {
            device: device.clone(),
            params: SecurityParameters::default(),
        },
        LedgerAction::PasskeyDisplay {
            device: device.clone(),
            match_request: false,
            passkey: "123456".into(),
            receive_keypress: true,
        },
        LedgerAction::AuthKeyRequest {
            device: device.clone(),
            key_type: AuthKeyType::Passkey,
            send_keypress: true,
        },
        LedgerAction::LescOobRequest {
            device: device.clone(),
            own_oob_data: LescOobData::default(),
        },
    ]
}

#[test]
fn ids_are_dense_in_creation_order() {
    let mut ledger = EventLedger::default();
    let a = device("a");

    let ids: Vec<_> = every_creation(&a)
        .into_iter()
        .map(|action| match ledger.handle(action) {
            LedgerEffect::Created(id) => id,
            other => panic!("expected creation, got {other:?}"),
        })
        .collect();

    let expected: Vec<u64> = (0..ids.len() as u64).collect();
    assert_eq!(ids, expected);
    assert_eq!(ledger.events().map(|e| e.id).collect::<Vec<_>>(), expected);
}

#[test]
fn every_creation_selects_and_shows() {
    let a = device("a");
    for action in every_creation(&a) {
        let mut ledger = EventLedger::default();
        ledger.handle(LedgerAction::MtuUpdateRequest { device: a.clone(), requested_mtu: 100 });
        ledger.handle(LedgerAction::ShowDialog { visible: false });
        ledger.handle(LedgerAction::SelectEventId { id: None });

        let effect = ledger.handle(action);

        assert_eq!(effect, LedgerEffect::Created(1));
        assert!(ledger.visible());
        assert_eq!(ledger.selected_event_id(), Some(1));
        assert_eq!(ledger.selected_event().map(|e| e.status), Some(EventStatus::Indeterminate));
    }
}

#[test]
fn clear_restarts_ids() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    for action in every_creation(&a).into_iter().take(3) {
        ledger.handle(action);
    }

    assert_eq!(ledger.handle(LedgerAction::ClearAllEvents), LedgerEffect::Cleared);
    assert!(ledger.is_empty());
    assert_eq!(ledger.selected_event_id(), None);

    let effect =
        ledger.handle(LedgerAction::MtuUpdateRequest { device: a, requested_mtu: 247 });
    assert_eq!(effect, LedgerEffect::Created(0));
}

#[test]
fn remove_clears_selection_only_when_selected() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    ledger.handle(LedgerAction::MtuUpdateRequest { device: a.clone(), requested_mtu: 247 });
    ledger.handle(LedgerAction::MtuUpdateRequest { device: a, requested_mtu: 185 });

    assert_eq!(ledger.handle(LedgerAction::RemoveEvent { id: Some(0) }), LedgerEffect::Removed(0));
    assert_eq!(ledger.selected_event_id(), Some(1));

    assert_eq!(ledger.handle(LedgerAction::RemoveEvent { id: Some(1) }), LedgerEffect::Removed(1));
    assert_eq!(ledger.selected_event_id(), None);

    assert_eq!(ledger.handle(LedgerAction::RemoveEvent { id: Some(1) }), LedgerEffect::Unchanged);
    assert_eq!(ledger.next_event_id(), 2);
}

#[test]
fn disconnect_sweeps_only_that_device() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    let b = device("b");
    ledger.handle(LedgerAction::MtuUpdateRequest { device: a.clone(), requested_mtu: 247 });
    ledger.handle(LedgerAction::SecurityRequest {
        device: a.clone(),
        params: SecurityParameters::default(),
    });
    ledger.handle(LedgerAction::MtuUpdateRequest { device: b, requested_mtu: 247 });

    let effect = ledger.handle(LedgerAction::DeviceDisconnected { device: a });

    assert_eq!(
        effect,
        LedgerEffect::StatusChanged { ids: vec![0, 1], status: EventStatus::Disconnected }
    );
    assert_eq!(ledger.event(2).map(|e| e.status), Some(EventStatus::Indeterminate));
}

#[test]
fn disconnect_matches_by_instance_id_not_snapshot() {
    let mut ledger = EventLedger::default();
    let before = device("a").with_role(Role::Peripheral);
    ledger.handle(LedgerAction::MtuUpdateRequest { device: before.clone(), requested_mtu: 247 });

    let mut after = before;
    after.mtu = 247;
    after.address = "renamed".into();
    ledger.handle(LedgerAction::DeviceDisconnected { device: after });

    assert_eq!(ledger.event(0).map(|e| e.status), Some(EventStatus::Disconnected));
}

#[test]
fn resolved_events_survive_disconnect() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    ledger.handle(LedgerAction::MtuUpdateRequest { device: a.clone(), requested_mtu: 247 });
    ledger.handle(LedgerAction::MtuUpdateRequest { device: a.clone(), requested_mtu: 185 });
    ledger.handle(LedgerAction::IgnoreEvent { id: Some(0) });

    ledger.handle(LedgerAction::DeviceDisconnected { device: a });

    assert_eq!(ledger.event(0).map(|e| e.status), Some(EventStatus::Ignored));
    assert_eq!(ledger.event(1).map(|e| e.status), Some(EventStatus::Disconnected));
}

#[test]
fn passkey_entry_keypress_flow() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    ledger.handle(LedgerAction::PasskeyDisplay {
        device: a.clone(),
        match_request: false,
        passkey: "123456".into(),
        receive_keypress: true,
    });

    for keypress in [
        KeypressType::Start,
        KeypressType::DigitIn,
        KeypressType::DigitIn,
        KeypressType::DigitOut,
    ] {
        ledger.handle(LedgerAction::PasskeyKeypressReceived {
            device: a.clone(),
            keypress_type: keypress,
        });
    }

    let keypress = ledger.event(0).map(|e| e.keypress);
    assert_eq!(keypress.map(|k| k.count), Some(1));
    assert_eq!(keypress.map(|k| k.start_received), Some(true));
    assert_eq!(keypress.map(|k| k.end_received), Some(false));

    ledger.handle(LedgerAction::PasskeyKeypressReceived {
        device: a.clone(),
        keypress_type: KeypressType::Clear,
    });
    ledger.handle(LedgerAction::PasskeyKeypressReceived {
        device: a,
        keypress_type: KeypressType::End,
    });

    let keypress = ledger.event(0).map(|e| e.keypress);
    assert_eq!(keypress.map(|k| k.count), Some(0));
    assert_eq!(keypress.map(|k| k.end_received), Some(true));
}

#[test]
fn keypress_received_ignores_resolved_displays() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    ledger.handle(LedgerAction::PasskeyDisplay {
        device: a.clone(),
        match_request: false,
        passkey: "123456".into(),
        receive_keypress: true,
    });
    ledger.handle(LedgerAction::AuthSuccessOccurred { device: Some(a.clone()) });

    let effect = ledger.handle(LedgerAction::PasskeyKeypressReceived {
        device: a,
        keypress_type: KeypressType::DigitIn,
    });

    assert_eq!(effect, LedgerEffect::Unchanged);
    assert_eq!(ledger.event(0).map(|e| e.keypress.count), Some(0));
}

#[test]
fn keypress_sent_addresses_event_by_id() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    ledger.handle(LedgerAction::AuthKeyRequest {
        device: a.clone(),
        key_type: AuthKeyType::Passkey,
        send_keypress: true,
    });
    ledger.handle(LedgerAction::AuthKeyRequest {
        device: a,
        key_type: AuthKeyType::Passkey,
        send_keypress: true,
    });

    let effect = ledger.handle(LedgerAction::PasskeyKeypressSent {
        id: Some(1),
        keypress_type: KeypressType::DigitIn,
    });
    ledger.handle(LedgerAction::PasskeyKeypressSent {
        id: Some(1),
        keypress_type: KeypressType::Start,
    });

    assert_eq!(effect, LedgerEffect::KeypressRecorded(vec![1]));
    assert_eq!(ledger.event(0).map(|e| e.keypress.count), Some(0));
    assert_eq!(ledger.event(1).map(|e| e.keypress.count), Some(1));
    assert_eq!(ledger.event(1).map(|e| e.keypress.start_sent), Some(true));
    assert_eq!(ledger.event(1).map(|e| e.keypress.start_received), Some(false));

    let sentinel = ledger.handle(LedgerAction::PasskeyKeypressSent {
        id: None,
        keypress_type: KeypressType::DigitIn,
    });
    assert_eq!(sentinel, LedgerEffect::Unchanged);
}

#[test]
fn auth_key_types_map_to_kinds() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    for key_type in [
        AuthKeyType::Passkey,
        AuthKeyType::Oob,
        AuthKeyType::from("BLE_GAP_AUTH_KEY_TYPE_NONE"),
    ] {
        ledger.handle(LedgerAction::AuthKeyRequest {
            device: a.clone(),
            key_type,
            send_keypress: false,
        });
    }

    let kinds: Vec<_> = ledger.events().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![
        EventKind::PasskeyRequest,
        EventKind::LegacyOobRequest,
        EventKind::UnsupportedAuthKeyRequest,
    ]);
    assert_eq!(
        ledger.event(2).map(|e| &e.payload),
        Some(&EventPayload::UnsupportedAuthKeyRequest {
            key_type: "BLE_GAP_AUTH_KEY_TYPE_NONE".into()
        })
    );
}

#[test]
fn pairing_outcome_from_driver() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    ledger.handle(LedgerAction::CreateUserInitiatedPairing {
        device: a.clone(),
        default_sec_params: SecurityParameters { bond: true, ..SecurityParameters::default() },
    });
    ledger.handle(StatusSource::Pairing.report(Some(0), EventStatus::Pending));

    // Disconnect only sweeps indeterminate events.
    ledger.handle(LedgerAction::DeviceDisconnected { device: a.clone() });
    assert_eq!(ledger.event(0).map(|e| e.status), Some(EventStatus::Pending));

    ledger.handle(LedgerAction::SecurityRequestTimedOut { device: Some(a) });
    assert_eq!(ledger.event(0).map(|e| e.status), Some(EventStatus::Error));
}

#[test]
fn user_initiated_events_seed_from_device() {
    let mut ledger = EventLedger::default();
    let mut a = device("a").with_connection_parameters(preferred());
    a.tx_phy = Phy::OneMbps;
    a.rx_phy = Phy::Coded;
    a.mtu = 185;

    ledger.create_user_initiated_conn_params_update_event(a.clone());
    ledger.create_user_initiated_phy_update_event(a.clone());
    ledger.create_user_initiated_mtu_update_event(a.clone());
    ledger.create_user_initiated_data_length_update_event(a, None);

    let payloads: Vec<_> = ledger.events().map(|e| e.payload.clone()).collect();
    assert_eq!(payloads, vec![
        EventPayload::ConnectionUpdate {
            origin: nrfble_events::ConnectionUpdateOrigin::User,
            params: preferred(),
        },
        EventPayload::PhyUpdate {
            origin: nrfble_events::Origin::User,
            params: PhyParameters { tx_phy: Phy::OneMbps, rx_phy: Phy::Coded },
        },
        EventPayload::MtuUpdate { origin: nrfble_events::Origin::User, mtu: 185 },
        EventPayload::DataLengthUpdate { origin: nrfble_events::Origin::User, data_length: 251 },
    ]);
}

#[test]
fn connection_update_round_trip() {
    let mut ledger = EventLedger::default();
    let a = device("a").with_connection_parameters(preferred());

    let effect = ledger.handle(LedgerAction::CreateUserInitiatedConnParamsUpdate { device: a });
    assert_eq!(effect, LedgerEffect::Created(0));
    assert_eq!(ledger.selected_event_id(), Some(0));
    assert_eq!(ledger.event(0).map(|e| e.status), Some(EventStatus::Indeterminate));

    ledger.handle(LedgerAction::AcceptEvent { id: Some(0) });
    assert_eq!(ledger.event(0).map(|e| e.status), Some(EventStatus::Success));
}

#[test]
fn editor_forces_symmetric_interval() {
    let mut ledger = EventLedger::default();
    let a = device("a").with_role(Role::Peripheral);
    ledger.handle(LedgerAction::ConnectionParamUpdateRequest {
        device: a.clone(),
        requested_connection_params: preferred(),
    });

    let event = ledger.selected_event().cloned().unwrap();
    let mut editor = ConnectionUpdateEditor::for_event(&event).unwrap();
    editor.set_connection_interval(45.0).unwrap();
    editor.set_peripheral_latency(2).unwrap();

    let outcome = editor.choose(EditorChoice::Update).unwrap();
    let EditorOutcome::UpdateConnectionParams { id, params, .. } = outcome else {
        panic!("expected an update request, got {outcome:?}");
    };
    assert_eq!(id, 0);
    assert_eq!(params.min_connection_interval, 45.0);
    assert_eq!(params.max_connection_interval, 45.0);
    assert_eq!(params.peripheral_latency, 2);
    assert_eq!(params.connection_supervision_timeout, 4000);

    // The host reports the driver outcome; the ledger records the
    // parameters it was given verbatim.
    ledger.handle(StatusSource::ConnectionParamUpdate.report(Some(id), EventStatus::Success));
    ledger.handle(LedgerAction::ConnectionParamUpdateRequest {
        device: a,
        requested_connection_params: params,
    });
    let stored = ledger.event(1).and_then(|e| e.connection_parameters().copied());
    assert_eq!(stored, Some(params));
}

#[test]
fn editor_choices_drive_the_ledger() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    ledger.handle(LedgerAction::CreateUserInitiatedConnParamsUpdate { device: a.clone() });
    ledger.handle(LedgerAction::ConnectionParamUpdateRequest {
        device: a.clone().with_role(Role::Peripheral),
        requested_connection_params: preferred(),
    });

    let user = ConnectionUpdateEditor::for_event(ledger.event(0).unwrap()).unwrap();
    let peer = ConnectionUpdateEditor::for_event(ledger.event(1).unwrap()).unwrap();

    let EditorOutcome::Ledger(cancel) = user.choose(EditorChoice::Cancel).unwrap() else {
        panic!("cancel should be a ledger action");
    };
    let EditorOutcome::Ledger(ignore) = peer.choose(EditorChoice::Ignore).unwrap() else {
        panic!("ignore should be a ledger action");
    };
    assert!(matches!(
        peer.choose(EditorChoice::Reject),
        Ok(EditorOutcome::RejectConnectionParams { id: 1, .. })
    ));

    ledger.handle(cancel);
    ledger.handle(ignore);

    assert!(ledger.event(0).is_none());
    assert_eq!(ledger.event(1).map(|e| e.status), Some(EventStatus::Ignored));
}

#[test]
fn peer_central_update_is_accepted_read_only() {
    let mut ledger = EventLedger::default();
    ledger.handle(LedgerAction::ConnectionParamUpdateRequest {
        device: device("a").with_role(Role::Central),
        requested_connection_params: preferred(),
    });

    let editor = ConnectionUpdateEditor::for_event(ledger.event(0).unwrap()).unwrap();
    assert!(editor.read_only());
    assert_eq!(editor.choices(), &[EditorChoice::Accept, EditorChoice::Disconnect]);

    let EditorOutcome::Ledger(accept) = editor.choose(EditorChoice::Accept).unwrap() else {
        panic!("accept should be a ledger action");
    };
    ledger.handle(accept);
    assert_eq!(ledger.event(0).map(|e| e.status), Some(EventStatus::Success));
}

#[test]
fn independent_ledgers_do_not_share_ids() {
    let mut first = EventLedger::default();
    let mut second = EventLedger::default();

    first.handle(LedgerAction::MtuUpdateRequest { device: device("a"), requested_mtu: 247 });
    first.handle(LedgerAction::MtuUpdateRequest { device: device("a"), requested_mtu: 247 });
    let effect =
        second.handle(LedgerAction::MtuUpdateRequest { device: device("b"), requested_mtu: 247 });

    assert_eq!(effect, LedgerEffect::Created(0));
}

#[test]
fn queries_filter_by_device_and_liveness() {
    let mut ledger = EventLedger::default();
    let a = device("a");
    let b = device("b");
    ledger.handle(LedgerAction::MtuUpdateRequest { device: a.clone(), requested_mtu: 247 });
    ledger.handle(LedgerAction::MtuUpdateRequest { device: b.clone(), requested_mtu: 247 });
    ledger.handle(LedgerAction::MtuUpdateRequest { device: a.clone(), requested_mtu: 247 });
    ledger.handle(LedgerAction::AcceptEvent { id: Some(0) });

    assert_eq!(ledger.events_for(&a).map(|e| e.id).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(ledger.live_events().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);

    ledger.handle(LedgerAction::DeviceDisconnected { device: a });
    ledger.handle(LedgerAction::DeviceDisconnected { device: b });
    assert!(!ledger.has_live_events());
    assert_eq!(ledger.len(), 3);
}
