//! Recording filename codec.
//!
//! Every capture file carries its metadata in its name:
//! `u<user>_g<gesture>_r<rep>_s<session>_<timestamp>.csv`. A name either
//! decodes to exactly one [`Meta`] or is rejected; no field is ever taken
//! from its position alone without its tag matching.

/// Extension every recording file carries.
pub const RECORDING_EXTENSION: &str = ".csv";

/// Separator between the tagged tokens.
pub const TOKEN_DELIMITER: char = '_';

/// Number of tokens a recording name is split into.
const TOKEN_COUNT: usize = 5;

/// Tag characters for the first four tokens, in order.
const TAGS: [char; 4] = ['u', 'g', 'r', 's'];

/// Metadata decoded from a recording filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Meta {
    /// Capturing device or user identifier.
    pub user: String,
    /// Catalog gesture id.
    pub gesture: String,
    /// Repetition index, kept as the raw token.
    pub rep: String,
    /// Session identifier, scoped to one signer.
    pub session: String,
    /// Capture time token. Not parsed.
    pub timestamp: String,
}

impl Meta {
    /// Decode a filename into its metadata.
    ///
    /// Returns `None` if the extension is missing, fewer than five tokens are
    /// present, any of the first four tokens lacks its tag or is empty after
    /// the tag, or the timestamp is empty.
    pub fn decode(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(RECORDING_EXTENSION)?;
        let tokens: Vec<&str> = stem.splitn(TOKEN_COUNT, TOKEN_DELIMITER).collect();
        if tokens.len() < TOKEN_COUNT {
            return None;
        }

        let mut fields = TAGS
            .iter()
            .zip(&tokens)
            .map(|(tag, token)| strip_tag(token, *tag));

        let user = fields.next()??;
        let gesture = fields.next()??;
        let rep = fields.next()??;
        let session = fields.next()??;

        let timestamp = tokens[4];
        if timestamp.is_empty() {
            return None;
        }

        Some(Self {
            user: user.to_string(),
            gesture: gesture.to_string(),
            rep: rep.to_string(),
            session: session.to_string(),
            timestamp: timestamp.to_string(),
        })
    }

    /// Encode the metadata back into a recording filename.
    ///
    /// Fields are written as-is; a field containing the delimiter produces a
    /// name that will not decode.
    pub fn file_name(&self) -> String {
        format!(
            "u{}_g{}_r{}_s{}_{}{RECORDING_EXTENSION}",
            self.user, self.gesture, self.rep, self.session, self.timestamp
        )
    }
}

/// Whether a directory entry name carries the recording extension.
pub fn is_recording_file(file_name: &str) -> bool {
    file_name.ends_with(RECORDING_EXTENSION)
}

fn strip_tag(token: &str, tag: char) -> Option<&str> {
    let value = token.strip_prefix(tag)?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Meta {
        Meta {
            user: "1".to_string(),
            gesture: "DA".to_string(),
            rep: "01".to_string(),
            session: "A".to_string(),
            timestamp: "20250101-000000".to_string(),
        }
    }

    #[test]
    fn decode_well_formed_name() {
        let meta = Meta::decode("u1_gDA_r01_sA_20250101-000000.csv").unwrap();
        assert_eq!(meta, sample());
    }

    #[test]
    fn file_name_decodes_back() {
        let meta = sample();
        assert_eq!(meta.file_name(), "u1_gDA_r01_sA_20250101-000000.csv");
        assert_eq!(Meta::decode(&meta.file_name()), Some(meta));
    }

    #[test]
    fn timestamp_keeps_trailing_delimiters() {
        let meta = Meta::decode("u1_gNE_r02_sB_2025_01_01.csv").unwrap();
        assert_eq!(meta.gesture, "NE");
        assert_eq!(meta.timestamp, "2025_01_01");
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(Meta::decode("u1_gDA_r01_sA_20250101").is_none());
        assert!(Meta::decode("u1_gDA_r01_sA_20250101.CSV").is_none());
        assert!(Meta::decode("u1_gDA_r01_sA_20250101.csv.tmp").is_none());
    }

    #[test]
    fn rejects_too_few_tokens() {
        assert!(Meta::decode("u1_gDA_r01_sA.csv").is_none());
        assert!(Meta::decode("u1_gDA.csv").is_none());
        assert!(Meta::decode(".csv").is_none());
    }

    #[test]
    fn rejects_mismatched_tags() {
        // Session and rep swapped.
        assert!(Meta::decode("u1_gDA_sA_r01_20250101.csv").is_none());
        // Missing user token shifts every field left.
        assert!(Meta::decode("gDA_r01_sA_20250101_x.csv").is_none());
        assert!(Meta::decode("x1_gDA_r01_sA_20250101.csv").is_none());
        assert!(Meta::decode("U1_gDA_r01_sA_20250101.csv").is_none());
    }

    #[test]
    fn rejects_empty_tagged_values() {
        assert!(Meta::decode("u_gDA_r01_sA_20250101.csv").is_none());
        assert!(Meta::decode("u1_g_r01_sA_20250101.csv").is_none());
        assert!(Meta::decode("u1_gDA_r_sA_20250101.csv").is_none());
        assert!(Meta::decode("u1_gDA_r01_s_20250101.csv").is_none());
    }

    #[test]
    fn rejects_empty_timestamp() {
        assert!(Meta::decode("u1_gDA_r01_sA_.csv").is_none());
    }

    #[test]
    fn extension_filter() {
        assert!(is_recording_file("u1_gDA_r01_sA_1.csv"));
        assert!(is_recording_file("notes.csv"));
        assert!(!is_recording_file("notes.txt"));
        assert!(!is_recording_file(".tmpAbc123"));
    }
}
