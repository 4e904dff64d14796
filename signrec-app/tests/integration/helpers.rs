//! Shared helpers for end-to-end recording scenarios.
//!
//! Channel utilities are re-exported from `signrec_sync::testing`.

use std::collections::BTreeMap;

use signrec_protocol::catalog::{CatalogGesture, GestureCatalog, LegendEntry};
use signrec_protocol::recording::Meta;
use signrec_protocol::signer::Signer;
use signrec_store::{RecordingStore, SignerRepository};
use tempfile::TempDir;

pub use signrec_sync::testing::{
    init_test_tracing, paired_channels, wait_for_event, wait_for_states, EVENT_TIMEOUT_SECS,
};

/// Storage rooted in a throwaway directory.
pub struct TestStore {
    _tmp: TempDir,
    pub signers: SignerRepository,
    pub recordings: RecordingStore,
}

pub fn test_store() -> TestStore {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let base = tmp.path().join("signers");
    let signers = SignerRepository::new(&base);
    signers.ensure_base_dir().expect("failed to create base dir");
    TestStore {
        recordings: RecordingStore::new(&base),
        signers,
        _tmp: tmp,
    }
}

/// Two flat-hand gestures and one fist gesture.
pub fn demo_catalog() -> GestureCatalog {
    let gesture = |id: &str, name: &str, technique: &str| CatalogGesture {
        id: id.to_string(),
        localized_name: name.to_string(),
        technique_id: technique.to_string(),
    };
    let mut legend = BTreeMap::new();
    legend.insert(
        "T1".to_string(),
        LegendEntry {
            name: "Flat hand".to_string(),
            icon: "hand.flat".to_string(),
        },
    );
    legend.insert(
        "T2".to_string(),
        LegendEntry {
            name: "Fist".to_string(),
            icon: "hand.fist".to_string(),
        },
    );
    GestureCatalog {
        gestures: vec![
            gesture("DA", "yes", "T1"),
            gesture("NE", "no", "T1"),
            gesture("HVALA", "thanks", "T2"),
        ],
        legend,
    }
}

/// Save one capture for `gesture` the way the capture side names files.
pub fn save_capture(
    store: &TestStore,
    signer: &Signer,
    gesture: &str,
    rep: u32,
    session: &str,
) -> std::path::PathBuf {
    let meta = Meta {
        user: "1".to_string(),
        gesture: gesture.to_string(),
        rep: format!("{rep:02}"),
        session: session.to_string(),
        timestamp: format!("20250101-0000{rep:02}"),
    };
    store
        .recordings
        .save(b"t,ax,ay,az\n0,0.1,0.2,9.8\n", &meta.file_name(), signer)
        .expect("failed to save capture")
}
