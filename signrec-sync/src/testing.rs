//! Shared test utilities for signrec sync tests.
//!
//! Available behind the `test-util` feature or in `#[cfg(test)]` within
//! signrec-sync.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::channel::{SyncChannel, SyncEvent};
use crate::sim::{SimLink, SimPairing};
use crate::state::GestureStateMap;

/// Default timeout for an expected event, in seconds.
pub const EVENT_TIMEOUT_SECS: u64 = 2;

/// How long to listen when asserting that nothing arrives.
pub const QUIET_PERIOD_MS: u64 = 100;

/// Initialise a tracing subscriber for tests.
///
/// Respects the `RUST_LOG` environment variable, defaults to `debug`.
/// Safe to call multiple times.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// A running primary and companion channel over one simulated pairing.
pub struct PairedChannels {
    pub pairing: SimPairing,
    pub primary: SyncChannel,
    pub companion: SyncChannel,
    pub primary_link: Arc<SimLink>,
    pub companion_link: Arc<SimLink>,
}

/// Start a channel on each end of a fresh, reachable pairing.
///
/// Must be called from within a tokio runtime.
pub fn paired_channels() -> PairedChannels {
    let (pairing, primary_link, companion_link) = SimPairing::new();
    let primary_link = Arc::new(primary_link);
    let companion_link = Arc::new(companion_link);
    let primary = SyncChannel::start(primary_link.clone()).expect("primary channel start failed");
    let companion =
        SyncChannel::start(companion_link.clone()).expect("companion channel start failed");
    PairedChannels {
        pairing,
        primary,
        companion,
        primary_link,
        companion_link,
    }
}

/// Wait for the first event matching `pred`, discarding others.
///
/// Panics if the timeout is reached.
pub async fn wait_for_event<F>(
    channel: &mut SyncChannel,
    timeout_secs: u64,
    mut pred: F,
) -> SyncEvent
where
    F: FnMut(&SyncEvent) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);
    loop {
        match tokio::time::timeout_at(deadline, channel.recv_event()).await {
            Ok(Some(event)) if pred(&event) => return event,
            Ok(Some(event)) => {
                tracing::trace!(?event, "skipping event while waiting");
            }
            Ok(None) => panic!("channel closed while waiting for event"),
            Err(_) => panic!("timed out waiting for event (after {timeout_secs}s)"),
        }
    }
}

/// Assert that no event matching `pred` arrives within the quiet period.
pub async fn expect_no_event<F>(channel: &mut SyncChannel, mut pred: F)
where
    F: FnMut(&SyncEvent) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_millis(QUIET_PERIOD_MS);
    loop {
        match tokio::time::timeout_at(deadline, channel.recv_event()).await {
            Ok(Some(event)) if pred(&event) => panic!("unexpected event: {event:?}"),
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => return,
        }
    }
}

/// Wait until the gesture-state board satisfies `pred`.
///
/// Panics if the timeout is reached.
pub async fn wait_for_states<F>(
    states: &mut watch::Receiver<GestureStateMap>,
    timeout_secs: u64,
    pred: F,
) -> GestureStateMap
where
    F: FnMut(&GestureStateMap) -> bool,
{
    let result = tokio::time::timeout(Duration::from_secs(timeout_secs), states.wait_for(pred))
        .await
        .map(|waited| waited.map(|map| map.clone()));
    match result {
        Ok(Ok(map)) => map,
        Ok(Err(_)) => panic!("gesture-state board closed"),
        Err(_) => panic!(
            "timed out waiting for gesture states, last seen {:?}",
            *states.borrow()
        ),
    }
}
