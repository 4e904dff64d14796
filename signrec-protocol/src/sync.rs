//! Messages exchanged between the primary device and the companion wearable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogGesture, GestureCatalog, GestureStateKind, LegendEntry};
use crate::signer::{Signer, SignerId};

/// Pushed primary → companion to start a recording session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    pub signer_id: SignerId,
    pub signer_name: String,
    pub session_id: String,
    pub gestures: Vec<CatalogGesture>,
    pub tech_legend: BTreeMap<String, LegendEntry>,
}

impl RecordingConfig {
    /// Build a config carrying the full catalog for a signer's session.
    pub fn new(signer: &Signer, session_id: impl Into<String>, catalog: &GestureCatalog) -> Self {
        Self {
            signer_id: signer.id.clone(),
            signer_name: signer.name.clone(),
            session_id: session_id.into(),
            gestures: catalog.gestures.clone(),
            tech_legend: catalog.legend.clone(),
        }
    }
}

/// Sent companion → primary as recording progresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureState {
    pub gesture_id: String,
    pub state: GestureStateKind,
}

/// Ends the recording session on the companion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRecording {
    pub signer_id: SignerId,
    pub session_id: String,
}

/// Every message shape carried over the sync channel.
///
/// The postcard variant index is the message discriminator and stands in for
/// the `mode` field of the companion's dictionary shape: `RecordingConfig` is
/// `"record"`, `Stop` is `"stop-recording"`. [`kind`](Self::kind) returns
/// those names. A payload with an unknown index fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMessage {
    /// `mode = "record"`.
    RecordingConfig(RecordingConfig),
    GestureState(GestureState),
    /// `mode = "stop-recording"`.
    Stop(StopRecording),
}

impl SyncMessage {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::RecordingConfig(_) => "record",
            SyncMessage::GestureState(_) => "gesture-state",
            SyncMessage::Stop(_) => "stop-recording",
        }
    }
}

/// Serialize a `SyncMessage` to compact binary via postcard.
pub fn encode_sync_message(msg: &SyncMessage) -> Result<Vec<u8>, postcard::Error> {
    postcard::to_allocvec(msg)
}

/// Deserialize a `SyncMessage` from postcard bytes.
pub fn decode_sync_message(data: &[u8]) -> Result<SyncMessage, postcard::Error> {
    postcard::from_bytes(data)
}
