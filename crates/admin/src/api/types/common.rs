//! Shared backend shapes.

use serde::{Deserialize, Serialize};

use storedesk_core::ImageId;

/// Paging envelope returned by every list endpoint.
///
/// `page` is zero-based on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub total_elements: usize,
    #[serde(default)]
    pub total_pages: usize,
}

impl<T> PageEnvelope<T> {
    /// Whether this is the final page of the listing.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.content.is_empty() || self.page + 1 >= self.total_pages
    }
}

/// An uploaded image as the backend references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: ImageId,
    pub url: String,
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_last_page() {
        let envelope: PageEnvelope<u32> = serde_json::from_str(
            r#"{"content":[1,2],"page":1,"size":2,"totalElements":4,"totalPages":2}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert!(envelope.is_last());

        let envelope: PageEnvelope<u32> = serde_json::from_str(
            r#"{"content":[1,2],"page":0,"size":2,"totalElements":4,"totalPages":2}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert!(!envelope.is_last());
    }

    #[test]
    fn test_envelope_missing_metadata_is_single_page() {
        let envelope: PageEnvelope<u32> =
            serde_json::from_str(r#"{"content":[7]}"#).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(envelope.content, vec![7]);
        assert!(envelope.is_last());
    }
}
