//! Opaque pagination cursors.
//!
//! Wire form: URL-safe base64 (no padding) of `v1:<offset>:<fingerprint>`.
//! The fingerprint hashes the filtered, ordered id sequence the cursor was cut
//! from, so a cursor replayed against a different set is detected.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::Error;

const VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub offset: usize,
    pub fingerprint: String,
}

impl Cursor {
    pub fn new(offset: usize, fingerprint: impl Into<String>) -> Self {
        Self { offset, fingerprint: fingerprint.into() }
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{VERSION}:{}:{}", self.offset, self.fingerprint))
    }

    /// Parse a cursor string.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the string is not a cursor this adapter issued.
    pub fn decode(raw: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidInput(format!("cursor: malformed value {raw:?}"));

        let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).map_err(|_| invalid())?;
        let text = String::from_utf8(bytes).map_err(|_| invalid())?;

        let mut parts = text.splitn(3, ':');
        let (Some(VERSION), Some(offset), Some(fingerprint)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let offset = offset.parse::<usize>().map_err(|_| invalid())?;
        if fingerprint.len() != 16 || !fingerprint.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        Ok(Self { offset, fingerprint: fingerprint.to_string() })
    }
}

/// First 16 hex chars of SHA-256 over the id sequence.
pub fn fingerprint<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update([0u8]);
    }
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(16);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_accepts_issued_cursor() {
        let fp = fingerprint(["a", "b", "c"]);
        let cursor = Cursor::new(2, fp.clone());
        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded.offset, 2);
        assert_eq!(decoded.fingerprint, fp);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let mut samples: Vec<String> = vec!["".into(), "!!!".into(), "MTA".into()];
        samples.extend(
            ["v2:1:0123456789abcdef", "v1:x:0123456789abcdef", "v1:1:short", "v1:-1:0123456789abcdef"]
                .iter()
                .map(|s| URL_SAFE_NO_PAD.encode(s)),
        );

        for raw in &samples {
            assert!(matches!(Cursor::decode(raw), Err(Error::InvalidInput(_))), "{raw:?}");
        }
    }

    #[test]
    fn test_fingerprint_depends_on_order_and_boundaries() {
        assert_eq!(fingerprint(["a", "b"]), fingerprint(["a", "b"]));
        assert_ne!(fingerprint(["a", "b"]), fingerprint(["b", "a"]));
        assert_ne!(fingerprint(["ab"]), fingerprint(["a", "b"]));
        assert_eq!(fingerprint(["a"]).len(), 16);
    }
}
