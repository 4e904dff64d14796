//! Abstract pairing link to the companion device.
//!
//! Defines the [`CompanionLink`] trait implemented by the platform pairing
//! layer and by `sim::SimLink` (behind `test-util`) for testing.

use std::future::Future;

use anyhow::Result;
use bytes::Bytes;
use tokio::sync::{mpsc, watch};

/// Connectivity mode reported by the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// No paired companion, or the companion app is not installed.
    Unavailable,
    /// The companion is connected; messages go out directly.
    Reachable,
    /// Paired but not connected; messages go to the pending context.
    Unreachable,
}

/// Pairing link to the companion device.
pub trait CompanionLink: Send + Sync {
    /// Subscribe to connectivity mode changes.
    ///
    /// The current value is the mode the next send is dispatched under.
    fn watch_mode(&self) -> watch::Receiver<LinkMode>;

    /// Send a payload directly to the reachable companion.
    ///
    /// Completes when the link reports the outcome. No retries.
    fn send_message(&self, payload: Bytes) -> impl Future<Output = Result<()>> + Send;

    /// Replace the single-slot pending context delivered on reconnection.
    fn update_pending_context(&self, payload: Bytes) -> Result<()>;

    /// Take the stream of payloads arriving from the companion.
    ///
    /// Returns `None` if the receiver has already been taken.
    fn take_incoming(&self) -> Option<mpsc::UnboundedReceiver<Bytes>>;
}
