//! Pagination types for list endpoints.
//!
//! The post service returns Spring Data pages; page numbers are 0-based.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_PAGE_SIZE: u32 = 10;
/// Maximum page size.
const MAX_PAGE_SIZE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (0-based).
    pub page: u32,
    /// Number of items per page.
    pub size: u32,
}

impl PageRequest {
    /// Create a new page request, clamping the size to the accepted range.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Render as query parameters.
    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper: `{ content[], totalPages, totalElements, number }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items on this page.
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u64,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total_elements: u64,
    /// Current page number (0-based).
    #[serde(default)]
    pub number: u64,
}

impl<T> Page<T> {
    /// Whether there is a next page.
    pub fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }

    /// Whether there is a previous page.
    pub fn has_previous(&self) -> bool {
        self.number > 0
    }
}
