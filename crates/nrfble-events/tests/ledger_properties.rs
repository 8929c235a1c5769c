//! Property tests over arbitrary action sequences.

use nrfble_events::{
    AuthKeyType, Device, EventLedger, EventStatus, KeypressType, LedgerAction, LedgerEffect,
    PhyParameters, SecurityParameters, StatusSource,
};
use proptest::prelude::*;

fn device_strategy() -> impl Strategy<Value = Device> {
    (0u8..3).prop_map(|n| Device::new(format!("dev-{n}")))
}

fn id_strategy() -> impl Strategy<Value = u64> {
    0u64..12
}

fn status_strategy() -> impl Strategy<Value = EventStatus> {
    prop_oneof![
        Just(EventStatus::Pending),
        Just(EventStatus::Success),
        Just(EventStatus::Error),
    ]
}

fn source_strategy() -> impl Strategy<Value = StatusSource> {
    prop_oneof![
        Just(StatusSource::AuthKey),
        Just(StatusSource::Pairing),
        Just(StatusSource::ConnectionParamUpdate),
        Just(StatusSource::PhyUpdate),
        Just(StatusSource::MtuUpdate),
        Just(StatusSource::DataLengthUpdate),
    ]
}

fn keypress_strategy() -> impl Strategy<Value = KeypressType> {
    prop_oneof![
        Just(KeypressType::Start),
        Just(KeypressType::DigitIn),
        Just(KeypressType::DigitOut),
        Just(KeypressType::Clear),
        Just(KeypressType::End),
    ]
}

fn creation_strategy() -> impl Strategy<Value = LedgerAction> {
    prop_oneof![
        device_strategy().prop_map(|device| LedgerAction::MtuUpdateRequest {
            device,
            requested_mtu: 247
        }),
        device_strategy().prop_map(|device| LedgerAction::PhyUpdateRequest {
            device,
            requested_phy_params: PhyParameters::default()
        }),
        device_strategy().prop_map(|device| LedgerAction::SecurityRequest {
            device,
            params: SecurityParameters::default()
        }),
        device_strategy().prop_map(|device| LedgerAction::CreateUserInitiatedMtuUpdate { device }),
        (device_strategy(), any::<bool>()).prop_map(|(device, receive_keypress)| {
            LedgerAction::PasskeyDisplay {
                device,
                match_request: false,
                passkey: "000000".into(),
                receive_keypress,
            }
        }),
        device_strategy().prop_map(|device| LedgerAction::AuthKeyRequest {
            device,
            key_type: AuthKeyType::Passkey,
            send_keypress: true
        }),
    ]
}

fn by_id_strategy() -> impl Strategy<Value = LedgerAction> {
    prop_oneof![
        proptest::option::of(id_strategy()).prop_map(|id| LedgerAction::IgnoreEvent { id }),
        proptest::option::of(id_strategy()).prop_map(|id| LedgerAction::AcceptEvent { id }),
        proptest::option::of(id_strategy()).prop_map(|id| LedgerAction::RemoveEvent { id }),
        proptest::option::of(id_strategy()).prop_map(|id| LedgerAction::SelectEventId { id }),
        (source_strategy(), proptest::option::of(id_strategy()), status_strategy())
            .prop_map(|(source, id, status)| source.report(id, status)),
        (proptest::option::of(id_strategy()), keypress_strategy()).prop_map(
            |(id, keypress_type)| LedgerAction::PasskeyKeypressSent { id, keypress_type }
        ),
    ]
}

fn by_device_strategy() -> impl Strategy<Value = LedgerAction> {
    prop_oneof![
        (device_strategy(), keypress_strategy()).prop_map(|(device, keypress_type)| {
            LedgerAction::PasskeyKeypressReceived { device, keypress_type }
        }),
        device_strategy().prop_map(|device| LedgerAction::DeviceDisconnected { device }),
        proptest::option::of(device_strategy())
            .prop_map(|device| LedgerAction::AuthErrorOccurred { device }),
        proptest::option::of(device_strategy())
            .prop_map(|device| LedgerAction::AuthSuccessOccurred { device }),
        any::<bool>().prop_map(|visible| LedgerAction::ShowDialog { visible }),
        Just(LedgerAction::ClearAllEvents),
    ]
}

fn action_strategy() -> impl Strategy<Value = LedgerAction> {
    prop_oneof![
        3 => creation_strategy(),
        2 => by_id_strategy(),
        2 => by_device_strategy(),
    ]
}

proptest! {
    #[test]
    fn prop_ids_stay_below_counter(actions in prop::collection::vec(action_strategy(), 0..60)) {
        let mut ledger = EventLedger::default();
        for action in actions {
            ledger.handle(action);
            for event in ledger.events() {
                prop_assert!(event.id < ledger.next_event_id());
                prop_assert_ne!(event.status, EventStatus::Unknown);
            }
        }
    }

    #[test]
    fn prop_created_ids_are_strictly_increasing(
        actions in prop::collection::vec(action_strategy(), 0..60),
    ) {
        let mut ledger = EventLedger::default();
        let mut last: Option<u64> = None;
        for action in actions {
            let clears = matches!(action, LedgerAction::ClearAllEvents);
            match ledger.handle(action) {
                LedgerEffect::Created(id) => {
                    if let Some(last) = last {
                        prop_assert!(id > last);
                    }
                    prop_assert_eq!(ledger.selected_event_id(), Some(id));
                    prop_assert!(ledger.visible());
                    last = Some(id);
                },
                _ if clears => last = None,
                _ => {},
            }
        }
    }

    #[test]
    fn prop_counter_never_decreases_without_clear(
        actions in prop::collection::vec(action_strategy(), 0..60),
    ) {
        let mut ledger = EventLedger::default();
        for action in actions {
            let before = ledger.next_event_id();
            let clears = matches!(action, LedgerAction::ClearAllEvents);
            ledger.handle(action);
            if clears {
                prop_assert_eq!(ledger.next_event_id(), 0);
                prop_assert!(ledger.is_empty());
                prop_assert_eq!(ledger.selected_event_id(), None);
            } else {
                prop_assert!(ledger.next_event_id() >= before);
            }
        }
    }

    #[test]
    fn prop_disconnect_leaves_no_live_events_for_device(
        actions in prop::collection::vec(action_strategy(), 0..60),
        target in device_strategy(),
    ) {
        let mut ledger = EventLedger::default();
        for action in actions {
            ledger.handle(action);
        }
        let others: Vec<_> = ledger
            .events()
            .filter(|e| !e.concerns(&target))
            .map(|e| (e.id, e.status))
            .collect();

        ledger.handle(LedgerAction::DeviceDisconnected { device: target.clone() });

        prop_assert!(ledger.events_for(&target).all(|e| e.status != EventStatus::Indeterminate));
        let after: Vec<_> = ledger
            .events()
            .filter(|e| !e.concerns(&target))
            .map(|e| (e.id, e.status))
            .collect();
        prop_assert_eq!(others, after);
    }

    #[test]
    fn prop_unchanged_effect_means_unchanged_state(
        actions in prop::collection::vec(action_strategy(), 0..60),
    ) {
        let mut ledger = EventLedger::default();
        for action in actions {
            let before = ledger.clone();
            if ledger.handle(action) == LedgerEffect::Unchanged {
                prop_assert_eq!(&before, &ledger);
            }
        }
    }

    #[test]
    fn prop_ledger_json_round_trips(actions in prop::collection::vec(action_strategy(), 0..30)) {
        let mut ledger = EventLedger::default();
        for action in actions {
            ledger.handle(action);
        }
        let json = serde_json::to_string(&ledger).unwrap();
        let restored: EventLedger = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored, ledger);
    }
}
