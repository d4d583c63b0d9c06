//! Page selection and paged result envelopes for list endpoints.

use serde::{Deserialize, Serialize};

/// Page size applied when the caller does not send one.
const DEFAULT_PAGE_SIZE: u64 = 25;
/// Hard cap on `page_size`; larger requests are clamped, not rejected.
const MAX_PAGE_SIZE: u64 = 100;

/// Which slice of a listing the caller wants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Build a request with `page` floored to 1 and `page_size` clamped
    /// to `1..=100`.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip in the query.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.page_size
    }

    /// Rows to fetch in the query.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the counts clients need to render pagers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Rows matching the query across all pages.
    pub total_items: u64,
    /// Page count; an empty result still reports one page.
    pub total_pages: u64,
    /// True when a higher page number exists.
    pub has_next: bool,
    /// True when `page > 1`.
    pub has_previous: bool,
}

impl<T: Serialize> PageResponse<T> {
    /// Wrap `items` with paging metadata derived from the query counts.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            total_items.div_ceil(page_size)
        };
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
