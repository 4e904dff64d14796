//! Gesture catalog types.
//!
//! The catalog is loaded elsewhere and handed around read-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One catalog gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogGesture {
    /// Short gesture code, as used in recording filenames.
    pub id: String,
    pub localized_name: String,
    pub technique_id: String,
}

/// Legend entry describing one capture technique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub name: String,
    /// Reference to the technique icon resource.
    pub icon: String,
}

/// Static table of gestures plus the per-technique legend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureCatalog {
    pub gestures: Vec<CatalogGesture>,
    pub legend: BTreeMap<String, LegendEntry>,
}

impl GestureCatalog {
    /// Look up a gesture by id.
    pub fn gesture(&self, id: &str) -> Option<&CatalogGesture> {
        self.gestures.iter().find(|g| g.id == id)
    }

    /// Legend entry for the technique a gesture uses.
    pub fn technique_of(&self, gesture_id: &str) -> Option<&LegendEntry> {
        let gesture = self.gesture(gesture_id)?;
        self.legend.get(&gesture.technique_id)
    }
}

/// Recording progress of one gesture within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureStateKind {
    ToRecord,
    Recording,
    Recorded,
}
