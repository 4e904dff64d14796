//! Signer identity and the directory-name codec.
//!
//! A signer's directory name is a composite key: `<id>__<name>`, with path
//! separators in the name replaced so the name can never add path segments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the id and the name in a signer directory name.
pub const DIR_NAME_DELIMITER: &str = "__";

/// Number of random bytes in a freshly generated signer id.
const ID_BYTES: usize = 16;

/// Opaque, stable signer identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignerId(pub String);

impl SignerId {
    /// Generate a fresh random id, encoded as lowercase hex.
    pub fn generate() -> Self {
        let bytes: [u8; ID_BYTES] = rand::random();
        Self(data_encoding::HEXLOWER.encode(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recording subject owning one directory of capture files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    pub id: SignerId,
    pub name: String,
    dir_name: String,
}

impl Signer {
    /// Build a signer whose directory name is derived from id and name.
    ///
    /// The name is stored sanitized, matching what a listing decodes back.
    pub fn new(id: SignerId, name: impl Into<String>) -> Self {
        let name = sanitize_name(&name.into());
        let dir_name = encode_dir_name(&id, &name);
        Self { id, name, dir_name }
    }

    /// Build a signer from a directory name found on disk.
    ///
    /// The directory name is kept verbatim, so a legacy directory without the
    /// delimiter still resolves to itself.
    pub fn from_dir_name(dir_name: &str) -> Self {
        let (id, name) = decode_dir_name(dir_name);
        Self {
            id,
            name,
            dir_name: dir_name.to_string(),
        }
    }

    /// Name of the directory holding this signer's recordings.
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }
}

/// Replace path separator characters so a name is a single path segment.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// Encode a signer id and name into a directory name.
pub fn encode_dir_name(id: &SignerId, name: &str) -> String {
    format!("{}{DIR_NAME_DELIMITER}{}", id.0, sanitize_name(name))
}

/// Split a directory name into id and name on the first delimiter.
///
/// A name without the delimiter is used as both id and name.
pub fn decode_dir_name(dir_name: &str) -> (SignerId, String) {
    match dir_name.split_once(DIR_NAME_DELIMITER) {
        Some((id, name)) => (SignerId(id.to_string()), name.to_string()),
        None => (SignerId(dir_name.to_string()), dir_name.to_string()),
    }
}
