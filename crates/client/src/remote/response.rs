//! Page body decoding and normalization.

use std::io::Read;

use minutes_core::{Error, FetchWarnings, Meeting, Normalized};
use serde::Deserialize;
use serde_json::Value;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Raw page as served by `/v2/get-documents`.
#[derive(Debug, Deserialize)]
pub struct RawPage {
    pub docs: Vec<Value>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl RawPage {
    /// Parse a decompressed page body.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the body is not a JSON object with a `docs` array.
    pub fn parse(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(|e| Error::Parse(format!("invalid documents page: {e}")))
    }

    /// Normalize every document, skipping (and counting) the malformed ones.
    pub fn normalize_into(&self, out: &mut Vec<Meeting>, warnings: &mut FetchWarnings) {
        for raw in &self.docs {
            match Meeting::from_raw(raw) {
                Normalized::Meeting(m) => out.push(*m),
                Normalized::NotAMeeting => {}
                Normalized::Malformed(reason) => {
                    tracing::warn!(%reason, "skipping malformed document");
                    warnings.skipped_documents += 1;
                }
            }
        }
    }
}

/// Undo transport compression by sniffing the gzip magic bytes.
///
/// Bodies already decoded by the HTTP client (declared `Content-Encoding`) pass
/// through untouched, as do plain JSON bodies.
pub fn decode_body(body: &[u8]) -> Result<Vec<u8>, Error> {
    if !body.starts_with(&GZIP_MAGIC) {
        return Ok(body.to_vec());
    }

    let mut out = Vec::new();
    flate2::read::GzDecoder::new(body)
        .read_to_end(&mut out)
        .map_err(|e| Error::Parse(format!("gzip body could not be decompressed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_plain_and_gzip() {
        let plain = br#"{"docs":[]}"#;
        assert_eq!(decode_body(plain).unwrap(), plain.to_vec());
        assert_eq!(decode_body(&gzip(plain)).unwrap(), plain.to_vec());
    }

    #[test]
    fn test_decode_corrupt_gzip() {
        let mut bytes = gzip(br#"{"docs":[]}"#);
        bytes.truncate(6);
        assert!(matches!(decode_body(&bytes), Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_page() {
        let page = RawPage::parse(br#"{"docs":[{"id":"a"}],"total":1}"#).unwrap();
        assert_eq!(page.docs.len(), 1);
        assert_eq!(page.total, Some(1));

        let page = RawPage::parse(br#"{"docs":[]}"#).unwrap();
        assert!(page.total.is_none());

        assert!(matches!(RawPage::parse(br#"{"docs":{}}"#), Err(Error::Parse(_))));
        assert!(matches!(RawPage::parse(b"<html>"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_normalize_skips_malformed() {
        let page = RawPage::parse(
            br#"{"docs":[
                {"id":"a","created_at":"2025-09-01T10:00:00Z"},
                {"title":"no id"},
                {"id":"n","type":"note","created_at":"2025-09-01T10:00:00Z"},
                {"id":"b","created_at":"2025-08-01T10:00:00Z"}
            ]}"#,
        )
        .unwrap();

        let mut out = Vec::new();
        let mut warnings = FetchWarnings::default();
        page.normalize_into(&mut out, &mut warnings);

        assert_eq!(out.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(warnings.skipped_documents, 1);
    }
}
