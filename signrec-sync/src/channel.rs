//! Sync channel lifecycle: dispatch by link mode, incoming decode, state board.
//!
//! All mutable state lives on one event loop task. Callers hand messages to
//! [`SyncChannel::send`], which returns immediately; send outcomes, link mode
//! changes, and incoming payloads are all folded back into that loop before
//! anything reaches the gesture-state board or the event stream.

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use signrec_protocol::sync::{
    decode_sync_message, encode_sync_message, GestureState, RecordingConfig, StopRecording,
    SyncMessage,
};
use tokio::sync::{mpsc, oneshot, watch};

use crate::link::{CompanionLink, LinkMode};
use crate::state::{GestureStateBoard, GestureStateMap};

/// Events emitted by the channel to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The primary pushed a session configuration.
    RecordingConfigured(RecordingConfig),
    /// The primary ended the session.
    RecordingStopped(StopRecording),
    /// The companion reported progress on one gesture.
    GestureStateChanged(GestureState),
    /// The link switched connectivity mode.
    ReachabilityChanged(LinkMode),
    /// A direct send failed after dispatch. Not retried.
    DeliveryFailed { kind: &'static str, error: String },
}

/// Requests from the application layer to the event loop.
enum Command {
    Send(SyncMessage),
    Settle(oneshot::Sender<()>),
}

/// An encoded message waiting for its direct send.
struct Outbound {
    kind: &'static str,
    payload: Bytes,
}

/// Outcome of a failed direct send, reported back from the send loop.
struct DeliveryFailure {
    kind: &'static str,
    error: String,
}

/// Best-effort message channel to the companion device.
pub struct SyncChannel {
    cmd_tx: mpsc::UnboundedSender<Command>,
    event_rx: Option<mpsc::UnboundedReceiver<SyncEvent>>,
    states: watch::Receiver<GestureStateMap>,
    shutdown_tx: watch::Sender<bool>,
}

impl SyncChannel {
    /// Start the channel over a companion link.
    ///
    /// Takes the link's incoming stream; fails if it was already taken.
    pub fn start<L: CompanionLink + 'static>(link: Arc<L>) -> Result<Self> {
        let incoming = link
            .take_incoming()
            .context("companion link incoming stream already taken")?;

        let board = GestureStateBoard::new();
        let states = board.subscribe();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(Self::event_loop(
            link,
            incoming,
            board,
            cmd_rx,
            event_tx,
            shutdown_rx,
        ));

        tracing::info!("sync channel started");

        Ok(Self {
            cmd_tx,
            event_rx: Some(event_rx),
            states,
            shutdown_tx,
        })
    }

    /// Hand a message to the channel. Returns immediately.
    ///
    /// Delivery is decided by the link mode when the event loop picks the
    /// message up: a direct send while reachable, an overwrite of the pending
    /// context while unreachable, nothing while unavailable.
    pub fn send(&self, msg: SyncMessage) {
        if self.cmd_tx.send(Command::Send(msg)).is_err() {
            tracing::warn!("sync channel closed, message dropped");
        }
    }

    /// Wait until every message passed to [`send`](Self::send) before this
    /// call has been dispatched.
    pub async fn settle(&self) {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Settle(tx)).is_err() {
            return;
        }
        let _ = rx.await;
    }

    /// Subscribe to the gesture-state board.
    pub fn gesture_states(&self) -> watch::Receiver<GestureStateMap> {
        self.states.clone()
    }

    /// Take the event receiver out of the channel.
    ///
    /// Returns `None` if the receiver has already been taken.
    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<SyncEvent>> {
        self.event_rx.take()
    }

    /// Receive the next channel event.
    ///
    /// Pends forever if the receiver was taken via `take_event_receiver()`.
    pub async fn recv_event(&mut self) -> Option<SyncEvent> {
        match &mut self.event_rx {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Signal the event loop to shut down.
    pub fn leave(&self) {
        tracing::info!("leaving sync channel");
        let _ = self.shutdown_tx.send(true);
    }

    async fn event_loop<L: CompanionLink + 'static>(
        link: Arc<L>,
        mut incoming: mpsc::UnboundedReceiver<Bytes>,
        board: GestureStateBoard,
        mut cmd_rx: mpsc::UnboundedReceiver<Command>,
        event_tx: mpsc::UnboundedSender<SyncEvent>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut mode_rx = link.watch_mode();
        let (report_tx, mut report_rx) = mpsc::unbounded_channel::<DeliveryFailure>();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Outbound>();
        tokio::spawn(Self::send_loop(Arc::clone(&link), outbound_rx, report_tx));
        let mut incoming_open = true;
        let mut mode_open = true;

        tracing::debug!(mode = ?*mode_rx.borrow(), "sync event loop started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::info!("sync event loop shutting down");
                        break;
                    }
                }

                Some(failure) = report_rx.recv() => {
                    tracing::warn!(
                        kind = failure.kind,
                        error = %failure.error,
                        "direct send to companion failed"
                    );
                    let _ = event_tx.send(SyncEvent::DeliveryFailed {
                        kind: failure.kind,
                        error: failure.error,
                    });
                }

                changed = mode_rx.changed(), if mode_open => {
                    match changed {
                        Ok(()) => {
                            let mode = *mode_rx.borrow_and_update();
                            tracing::info!(?mode, "companion link mode changed");
                            let _ = event_tx.send(SyncEvent::ReachabilityChanged(mode));
                        }
                        Err(_) => {
                            tracing::debug!("link mode stream closed");
                            mode_open = false;
                        }
                    }
                }

                payload = incoming.recv(), if incoming_open => {
                    match payload {
                        Some(payload) => Self::handle_incoming(&payload, &board, &event_tx),
                        None => {
                            tracing::debug!("companion incoming stream closed");
                            incoming_open = false;
                        }
                    }
                }

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(Command::Send(msg)) => {
                            let mode = *mode_rx.borrow();
                            Self::dispatch(&link, mode, msg, &board, &outbound_tx);
                        }
                        Some(Command::Settle(done)) => {
                            let _ = done.send(());
                        }
                        None => {
                            tracing::debug!("all channel handles dropped");
                            break;
                        }
                    }
                }
            }
        }
    }

    fn dispatch<L: CompanionLink + 'static>(
        link: &Arc<L>,
        mode: LinkMode,
        msg: SyncMessage,
        board: &GestureStateBoard,
        outbound_tx: &mpsc::UnboundedSender<Outbound>,
    ) {
        match &msg {
            SyncMessage::RecordingConfig(config) => board.seed(&config.gestures),
            SyncMessage::GestureState(state) => {
                board.apply(&state.gesture_id, state.state);
            }
            SyncMessage::Stop(_) => {}
        }

        let kind = msg.kind();
        let payload = match encode_sync_message(&msg) {
            Ok(data) => Bytes::from(data),
            Err(e) => {
                tracing::warn!(kind, error = %e, "failed to encode sync message");
                return;
            }
        };

        match mode {
            LinkMode::Reachable => {
                tracing::debug!(kind, size = payload.len(), "sending to companion");
                if outbound_tx.send(Outbound { kind, payload }).is_err() {
                    tracing::warn!(kind, "send loop gone, message dropped");
                }
            }
            LinkMode::Unreachable => match link.update_pending_context(payload) {
                Ok(()) => {
                    tracing::debug!(kind, "companion unreachable, pending context replaced");
                }
                Err(e) => {
                    tracing::warn!(kind, error = %e, "failed to update pending context");
                }
            },
            LinkMode::Unavailable => {
                tracing::warn!(kind, "companion unavailable, message dropped");
            }
        }
    }

    /// Direct sends, one at a time in dispatch order.
    ///
    /// Ends once the event loop drops its sender and the queue is drained.
    async fn send_loop<L: CompanionLink + 'static>(
        link: Arc<L>,
        mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
        report_tx: mpsc::UnboundedSender<DeliveryFailure>,
    ) {
        while let Some(Outbound { kind, payload }) = outbound_rx.recv().await {
            if let Err(e) = link.send_message(payload).await {
                let _ = report_tx.send(DeliveryFailure {
                    kind,
                    error: e.to_string(),
                });
            }
        }
        tracing::debug!("send loop stopped");
    }

    fn handle_incoming(
        payload: &[u8],
        board: &GestureStateBoard,
        event_tx: &mpsc::UnboundedSender<SyncEvent>,
    ) {
        let msg = match decode_sync_message(payload) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    size = payload.len(),
                    error = %e,
                    "ignoring unrecognized sync payload"
                );
                return;
            }
        };

        match msg {
            SyncMessage::RecordingConfig(config) => {
                tracing::info!(
                    signer_id = %config.signer_id,
                    session_id = %config.session_id,
                    gestures = config.gestures.len(),
                    "recording config received"
                );
                board.seed(&config.gestures);
                let _ = event_tx.send(SyncEvent::RecordingConfigured(config));
            }
            SyncMessage::GestureState(state) => {
                tracing::debug!(
                    gesture_id = %state.gesture_id,
                    state = ?state.state,
                    "gesture state received"
                );
                board.apply(&state.gesture_id, state.state);
                let _ = event_tx.send(SyncEvent::GestureStateChanged(state));
            }
            SyncMessage::Stop(stop) => {
                tracing::info!(
                    signer_id = %stop.signer_id,
                    session_id = %stop.session_id,
                    "stop recording received"
                );
                let _ = event_tx.send(SyncEvent::RecordingStopped(stop));
            }
        }
    }
}

impl Drop for SyncChannel {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
