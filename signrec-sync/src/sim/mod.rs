//! In-process pairing simulation for testing.
//!
//! Provides [`SimPairing`] to create a primary/companion pair of
//! [`SimLink`]s that exchange payloads over in-process channels, with
//! switchable connectivity and an inspectable pending-context slot per side.
//!
//! # Example
//!
//! ```ignore
//! let (pairing, primary, companion) = SimPairing::new();
//! pairing.disconnect();
//! primary.update_pending_context(Bytes::from("config"))?;
//! pairing.reconnect(); // companion receives "config"
//! ```

mod link;
mod pairing;

pub use link::{LinkMetrics, SimLink};
pub use pairing::{Side, SimPairing};
