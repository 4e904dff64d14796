//! Simulated companion link implementing the [`CompanionLink`] trait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Result};
use bytes::Bytes;
use tokio::sync::{mpsc, watch};

use crate::link::{CompanionLink, LinkMode};

use super::pairing::{Side, SimPairingInner};

/// Counters for one end of a simulated pairing.
#[derive(Debug, Default)]
pub struct LinkMetrics {
    pub messages_sent: AtomicU64,
    pub messages_failed: AtomicU64,
    pub contexts_updated: AtomicU64,
    pub contexts_overwritten: AtomicU64,
}

/// One end of a [`SimPairing`](super::SimPairing).
pub struct SimLink {
    side: Side,
    inner: Arc<SimPairingInner>,
    incoming: Mutex<Option<mpsc::UnboundedReceiver<Bytes>>>,
    metrics: LinkMetrics,
}

impl SimLink {
    pub(crate) fn new(
        side: Side,
        inner: Arc<SimPairingInner>,
        incoming: mpsc::UnboundedReceiver<Bytes>,
    ) -> Self {
        Self {
            side,
            inner,
            incoming: Mutex::new(Some(incoming)),
            metrics: LinkMetrics::default(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn metrics(&self) -> &LinkMetrics {
        &self.metrics
    }
}

impl CompanionLink for SimLink {
    fn watch_mode(&self) -> watch::Receiver<LinkMode> {
        self.inner.mode_tx.subscribe()
    }

    async fn send_message(&self, payload: Bytes) -> Result<()> {
        let mode = *self.inner.mode_tx.borrow();
        if mode != LinkMode::Reachable {
            self.metrics.messages_failed.fetch_add(1, Ordering::Relaxed);
            bail!("companion not reachable: {mode:?}");
        }
        if self.inner.fail_sends.load(Ordering::Relaxed) {
            self.metrics.messages_failed.fetch_add(1, Ordering::Relaxed);
            bail!("simulated delivery failure");
        }
        if !self.inner.deliver(self.side.peer(), payload) {
            self.metrics.messages_failed.fetch_add(1, Ordering::Relaxed);
            bail!("companion inbox closed");
        }

        self.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(side = ?self.side, "sim message delivered");
        Ok(())
    }

    fn update_pending_context(&self, payload: Bytes) -> Result<()> {
        let overwritten = self.inner.replace_pending(self.side.peer(), payload);
        self.metrics.contexts_updated.fetch_add(1, Ordering::Relaxed);
        if overwritten {
            self.metrics
                .contexts_overwritten
                .fetch_add(1, Ordering::Relaxed);
        }
        tracing::trace!(side = ?self.side, overwritten, "sim pending context updated");
        Ok(())
    }

    fn take_incoming(&self) -> Option<mpsc::UnboundedReceiver<Bytes>> {
        self.incoming
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
