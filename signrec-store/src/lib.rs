//! Signer directories and the recording files inside them.

pub mod error;
pub mod recordings;
pub mod signers;

pub use error::StoreError;
pub use recordings::{GestureGroup, RecordingFile, RecordingStore};
pub use signers::SignerRepository;
