//! Document-listing request body.

use minutes_core::PageKey;
use serde::Serialize;

/// JSON body for `POST /v2/get-documents`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DocumentsRequest {
    pub limit: u32,
    pub offset: u32,
    pub include_last_viewed_panel: bool,
}

impl From<&PageKey> for DocumentsRequest {
    fn from(key: &PageKey) -> Self {
        Self { limit: key.limit, offset: key.offset, include_last_viewed_panel: key.include_last_viewed_panel }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_wire_fields() {
        let key = PageKey { limit: 100, offset: 200, include_last_viewed_panel: true };
        let body = serde_json::to_value(DocumentsRequest::from(&key)).unwrap();
        assert_eq!(body, serde_json::json!({"limit": 100, "offset": 200, "include_last_viewed_panel": true}));
    }
}
