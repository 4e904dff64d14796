//! Integration tests covering a primary and companion end-to-end.

mod helpers;

mod offline_companion;
mod recording_session;
