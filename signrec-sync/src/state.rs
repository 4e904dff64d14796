//! Process-wide gesture-state board.
//!
//! Holds the latest [`GestureStateKind`] per gesture id. The channel event
//! loop is the only writer; everything else observes through a
//! `watch::Receiver`.

use std::collections::BTreeMap;

use signrec_protocol::catalog::{CatalogGesture, GestureStateKind};
use tokio::sync::watch;

/// Gesture id → current recording state.
pub type GestureStateMap = BTreeMap<String, GestureStateKind>;

/// Write side of the board, owned by the event loop.
pub(crate) struct GestureStateBoard {
    tx: watch::Sender<GestureStateMap>,
}

impl GestureStateBoard {
    /// Create an empty board.
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(GestureStateMap::new());
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<GestureStateMap> {
        self.tx.subscribe()
    }

    /// Reset the board to every session gesture waiting to be recorded.
    pub(crate) fn seed(&self, gestures: &[CatalogGesture]) {
        let fresh: GestureStateMap = gestures
            .iter()
            .map(|g| (g.id.clone(), GestureStateKind::ToRecord))
            .collect();
        tracing::debug!(gestures = fresh.len(), "gesture states seeded");
        self.tx.send_replace(fresh);
    }

    /// Record one gesture's state. Returns `true` if it changed.
    pub(crate) fn apply(&self, gesture_id: &str, state: GestureStateKind) -> bool {
        self.tx.send_if_modified(|map| {
            if map.get(gesture_id) == Some(&state) {
                return false;
            }
            map.insert(gesture_id.to_string(), state);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture(id: &str) -> CatalogGesture {
        CatalogGesture {
            id: id.to_string(),
            localized_name: id.to_lowercase(),
            technique_id: "T1".to_string(),
        }
    }

    #[test]
    fn starts_empty() {
        let board = GestureStateBoard::new();
        assert!(board.subscribe().borrow().is_empty());
    }

    #[test]
    fn seed_replaces_previous_session() {
        let board = GestureStateBoard::new();
        let rx = board.subscribe();

        board.apply("OLD", GestureStateKind::Recorded);
        board.seed(&[gesture("DA"), gesture("NE")]);

        let map = rx.borrow();
        assert_eq!(map.len(), 2);
        assert_eq!(map["DA"], GestureStateKind::ToRecord);
        assert!(!map.contains_key("OLD"));
    }

    #[test]
    fn apply_notifies_only_on_change() {
        let board = GestureStateBoard::new();
        let mut rx = board.subscribe();

        assert!(board.apply("DA", GestureStateKind::Recording));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!board.apply("DA", GestureStateKind::Recording));
        assert!(!rx.has_changed().unwrap());

        assert!(board.apply("DA", GestureStateKind::Recorded));
        assert_eq!(rx.borrow_and_update()["DA"], GestureStateKind::Recorded);
    }

    #[test]
    fn unknown_gesture_ids_are_still_tracked() {
        let board = GestureStateBoard::new();
        board.seed(&[gesture("DA")]);
        board.apply("XX", GestureStateKind::Recording);
        assert_eq!(board.subscribe().borrow()["XX"], GestureStateKind::Recording);
    }
}
