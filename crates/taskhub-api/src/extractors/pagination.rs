//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};

use taskhub_core::types::pagination::PageRequest;

/// Query parameters for paginated endpoints.
///
/// Deserialized with `Query<PaginationParams>`; conversion through
/// [`PageRequest::new`] clamps the page size so a crafted query cannot
/// request an unbounded `LIMIT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-based, default 1).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (default 25).
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    25
}

impl PaginationParams {
    /// Converts to a clamped `PageRequest`.
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_query_is_empty() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 25);
    }

    #[test]
    fn test_oversized_page_size_is_clamped() {
        let params = PaginationParams {
            page: 0,
            page_size: 10_000,
        };
        let page = params.into_page_request();
        assert_eq!(page.page, 1);
        assert!(page.page_size <= 100);
    }
}
