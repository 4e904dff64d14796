//! A full session: configure, capture, store, review and stop.

use signrec_protocol::catalog::GestureStateKind;
use signrec_protocol::sync::{GestureState, RecordingConfig, StopRecording, SyncMessage};
use signrec_sync::SyncEvent;

use crate::helpers::{
    demo_catalog, init_test_tracing, paired_channels, save_capture, test_store, wait_for_event,
    wait_for_states, EVENT_TIMEOUT_SECS,
};

fn progress(gesture_id: &str, state: GestureStateKind) -> SyncMessage {
    SyncMessage::GestureState(GestureState {
        gesture_id: gesture_id.to_string(),
        state,
    })
}

/// The primary configures a session for a new signer, the companion records
/// two gestures, and the stored captures group by gesture.
#[tokio::test]
async fn session_is_recorded_and_stored() {
    init_test_tracing();
    let store = test_store();
    let mut paired = paired_channels();

    let signer = store.signers.create("Mira Petrović").unwrap();
    let catalog = demo_catalog();
    paired
        .primary
        .send(SyncMessage::RecordingConfig(RecordingConfig::new(
            &signer, "A", &catalog,
        )));

    let event = wait_for_event(&mut paired.companion, EVENT_TIMEOUT_SECS, |e| {
        matches!(e, SyncEvent::RecordingConfigured(_))
    })
    .await;
    let SyncEvent::RecordingConfigured(config) = event else {
        panic!("unexpected event: {event:?}");
    };
    assert_eq!(config.signer_id, signer.id);
    assert_eq!(config.signer_name, "Mira Petrović");
    assert_eq!(config.gestures.len(), 3);
    assert_eq!(config.tech_legend.len(), 2);

    let mut board = paired.primary.gesture_states();
    for gesture in ["DA", "NE"] {
        paired
            .companion
            .send(progress(gesture, GestureStateKind::Recording));
        wait_for_states(&mut board, EVENT_TIMEOUT_SECS, |m| {
            m.get(gesture) == Some(&GestureStateKind::Recording)
        })
        .await;

        for rep in 1..=2 {
            save_capture(&store, &signer, gesture, rep, &config.session_id);
        }

        paired
            .companion
            .send(progress(gesture, GestureStateKind::Recorded));
        wait_for_states(&mut board, EVENT_TIMEOUT_SECS, |m| {
            m.get(gesture) == Some(&GestureStateKind::Recorded)
        })
        .await;
    }

    let states = paired.primary.gesture_states().borrow().clone();
    assert_eq!(states.get("HVALA"), Some(&GestureStateKind::ToRecord));

    let groups = store
        .recordings
        .list_gesture_groups(&signer, Some("A"))
        .unwrap();
    let summary: Vec<(&str, usize)> = groups
        .iter()
        .map(|g| (g.gesture.as_str(), g.count()))
        .collect();
    assert_eq!(summary, vec![("DA", 2), ("NE", 2)]);

    paired.primary.send(SyncMessage::Stop(StopRecording {
        signer_id: signer.id.clone(),
        session_id: "A".to_string(),
    }));
    wait_for_event(&mut paired.companion, EVENT_TIMEOUT_SECS, |e| {
        matches!(e, SyncEvent::RecordingStopped(_))
    })
    .await;
    paired.primary.settle().await;

    // Stopping does not touch stored captures or the board.
    assert_eq!(store.recordings.list_recordings(&signer).unwrap().len(), 4);
    assert_eq!(paired.primary.gesture_states().borrow().clone(), states);
}

/// Discarding a take removes only that gesture's captures in that session.
#[tokio::test]
async fn retake_discards_one_gesture_in_one_session() {
    init_test_tracing();
    let store = test_store();

    let signer = store.signers.create("Noor").unwrap();
    for session in ["A", "B"] {
        save_capture(&store, &signer, "DA", 1, session);
        save_capture(&store, &signer, "NE", 1, session);
    }

    let removed = store
        .recordings
        .delete_gesture_in_session(&signer, "DA", "B")
        .unwrap();
    assert_eq!(removed, 1);

    let in_b: Vec<String> = store
        .recordings
        .list_gesture_groups(&signer, Some("B"))
        .unwrap()
        .into_iter()
        .map(|g| g.gesture)
        .collect();
    assert_eq!(in_b, vec!["NE"]);
    assert_eq!(
        store
            .recordings
            .list_gesture_groups(&signer, Some("A"))
            .unwrap()
            .len(),
        2
    );
}

/// A signer found again by id after a restart sees the same sessions.
#[tokio::test]
async fn signer_survives_reopen() {
    init_test_tracing();
    let store = test_store();

    let created = store.signers.create("Ana/Marija").unwrap();
    save_capture(&store, &created, "DA", 1, "A");
    save_capture(&store, &created, "DA", 1, "C");

    let reopened = signrec_store::SignerRepository::new(store.signers.base_dir());
    let found = reopened.find(&created.id).unwrap();
    assert_eq!(found.name, "Ana_Marija");
    assert_eq!(found, created);

    let sessions: Vec<String> = store
        .recordings
        .list_sessions(&found)
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(sessions, vec!["A", "C"]);
}
