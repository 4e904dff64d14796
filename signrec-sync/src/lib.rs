//! Device sync channel: direct sends while the companion is reachable,
//! a single overwritten pending context while it is not.

pub mod channel;
pub mod link;
pub mod state;

#[cfg(any(test, feature = "test-util"))]
pub mod sim;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use channel::{SyncChannel, SyncEvent};
pub use link::{CompanionLink, LinkMode};
pub use state::GestureStateMap;
