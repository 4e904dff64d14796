//! Simulated pairing controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tokio::sync::{mpsc, watch};

use crate::link::LinkMode;

use super::link::SimLink;

/// Which end of the pairing a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Primary,
    Companion,
}

impl Side {
    /// The other end of the pairing.
    pub fn peer(self) -> Side {
        match self {
            Side::Primary => Side::Companion,
            Side::Companion => Side::Primary,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Primary => 0,
            Side::Companion => 1,
        }
    }
}

/// Shared interior of the simulated pairing.
pub(crate) struct SimPairingInner {
    /// Connectivity mode, seen identically by both ends.
    pub(crate) mode_tx: watch::Sender<LinkMode>,
    /// Inbound payload queues, indexed by receiving side.
    inboxes: [mpsc::UnboundedSender<Bytes>; 2],
    /// Pending context slots, indexed by receiving side.
    pending: Mutex<[Option<Bytes>; 2]>,
    /// When set, every direct send fails after dispatch.
    pub(crate) fail_sends: AtomicBool,
}

impl SimPairingInner {
    /// Deliver a payload straight to a side's inbox.
    pub(crate) fn deliver(&self, to: Side, payload: Bytes) -> bool {
        self.inboxes[to.index()].send(payload).is_ok()
    }

    /// Replace the pending context destined for `to`.
    ///
    /// Returns `true` if an earlier context was overwritten.
    pub(crate) fn replace_pending(&self, to: Side, payload: Bytes) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending[to.index()].replace(payload).is_some()
    }

    fn take_pending(&self, to: Side) -> Option<Bytes> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending[to.index()].take()
    }

    fn peek_pending(&self, to: Side) -> Option<Bytes> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending[to.index()].clone()
    }
}

/// Controller for an in-process primary/companion pairing.
///
/// Both ends start reachable. Connectivity is switched from the test with
/// [`disconnect`](Self::disconnect), [`reconnect`](Self::reconnect), and
/// [`unpair`](Self::unpair).
#[derive(Clone)]
pub struct SimPairing {
    inner: Arc<SimPairingInner>,
}

impl SimPairing {
    /// Create a pairing and its two links: `(controller, primary, companion)`.
    pub fn new() -> (Self, SimLink, SimLink) {
        let (mode_tx, _mode_rx) = watch::channel(LinkMode::Reachable);
        let (primary_tx, primary_rx) = mpsc::unbounded_channel();
        let (companion_tx, companion_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(SimPairingInner {
            mode_tx,
            inboxes: [primary_tx, companion_tx],
            pending: Mutex::new([None, None]),
            fail_sends: AtomicBool::new(false),
        });

        let primary = SimLink::new(Side::Primary, inner.clone(), primary_rx);
        let companion = SimLink::new(Side::Companion, inner.clone(), companion_rx);

        tracing::debug!("sim pairing created");
        (Self { inner }, primary, companion)
    }

    /// Current connectivity mode.
    pub fn mode(&self) -> LinkMode {
        *self.inner.mode_tx.borrow()
    }

    /// Drop the connection; sends fall back to the pending context.
    pub fn disconnect(&self) {
        tracing::info!("sim pairing disconnected");
        self.inner.mode_tx.send_replace(LinkMode::Unreachable);
    }

    /// Restore the connection and hand each side its pending context.
    pub fn reconnect(&self) {
        tracing::info!("sim pairing reconnected");
        self.inner.mode_tx.send_replace(LinkMode::Reachable);
        for side in [Side::Primary, Side::Companion] {
            if let Some(context) = self.inner.take_pending(side) {
                tracing::debug!(?side, size = context.len(), "delivering pending context");
                if !self.inner.deliver(side, context) {
                    tracing::debug!(?side, "pending context receiver gone");
                }
            }
        }
    }

    /// Remove the pairing entirely.
    pub fn unpair(&self) {
        tracing::info!("sim pairing removed");
        self.inner.mode_tx.send_replace(LinkMode::Unavailable);
    }

    /// Make every subsequent direct send fail (or succeed again).
    pub fn set_fail_sends(&self, fail: bool) {
        self.inner.fail_sends.store(fail, Ordering::Relaxed);
    }

    /// Inspect the pending context waiting for `to` without consuming it.
    pub fn pending_context(&self, to: Side) -> Option<Bytes> {
        self.inner.peek_pending(to)
    }
}
