//! Shared types, filename codecs, and wire formats for signrec.

pub mod catalog;
pub mod recording;
pub mod signer;
pub mod sync;
