//! The companion drops out mid-session and comes back.

use signrec_protocol::catalog::GestureStateKind;
use signrec_protocol::sync::{GestureState, RecordingConfig, SyncMessage};
use signrec_sync::{LinkMode, SyncEvent};

use crate::helpers::{
    demo_catalog, init_test_tracing, paired_channels, test_store, wait_for_event,
    wait_for_states, EVENT_TIMEOUT_SECS,
};

/// Only the most recent config queued while unreachable is applied on return.
#[tokio::test]
async fn latest_config_wins_after_reconnect() {
    init_test_tracing();
    let store = test_store();
    let mut paired = paired_channels();
    let signer = store.signers.create("Mira").unwrap();
    let catalog = demo_catalog();

    paired.pairing.disconnect();
    wait_for_event(&mut paired.primary, EVENT_TIMEOUT_SECS, |e| {
        *e == SyncEvent::ReachabilityChanged(LinkMode::Unreachable)
    })
    .await;

    for session in ["A", "B"] {
        paired
            .primary
            .send(SyncMessage::RecordingConfig(RecordingConfig::new(
                &signer, session, &catalog,
            )));
    }
    paired.primary.settle().await;

    paired.pairing.reconnect();
    let event = wait_for_event(&mut paired.companion, EVENT_TIMEOUT_SECS, |e| {
        matches!(e, SyncEvent::RecordingConfigured(_))
    })
    .await;
    match event {
        SyncEvent::RecordingConfigured(config) => assert_eq!(config.session_id, "B"),
        other => panic!("unexpected event: {other:?}"),
    }
}

/// Progress made while the primary is unreachable lands once it returns.
#[tokio::test]
async fn offline_progress_reaches_primary() {
    init_test_tracing();
    let store = test_store();
    let mut paired = paired_channels();
    let signer = store.signers.create("Mira").unwrap();

    paired
        .primary
        .send(SyncMessage::RecordingConfig(RecordingConfig::new(
            &signer,
            "A",
            &demo_catalog(),
        )));
    wait_for_event(&mut paired.companion, EVENT_TIMEOUT_SECS, |e| {
        matches!(e, SyncEvent::RecordingConfigured(_))
    })
    .await;

    paired.pairing.disconnect();
    paired
        .companion
        .send(SyncMessage::GestureState(GestureState {
            gesture_id: "NE".to_string(),
            state: GestureStateKind::Recorded,
        }));
    paired.companion.settle().await;
    assert_eq!(
        paired.primary.gesture_states().borrow().get("NE"),
        Some(&GestureStateKind::ToRecord)
    );

    paired.pairing.reconnect();
    let mut board = paired.primary.gesture_states();
    let states = wait_for_states(&mut board, EVENT_TIMEOUT_SECS, |m| {
        m.get("NE") == Some(&GestureStateKind::Recorded)
    })
    .await;
    assert_eq!(states.get("DA"), Some(&GestureStateKind::ToRecord));
}
