//! # Pagination
//!
//! Page arithmetic for the drug list.
//!
//! ```text
//!   total_count = 12, PAGE_SIZE = 5
//!
//!   page 1          page 2          page 3
//!   ┌─────────┐     ┌─────────┐     ┌─────────┐
//!   │ 0 .. 4  │     │ 5 .. 9  │     │ 10 .. 11│
//!   └─────────┘     └─────────┘     └─────────┘
//!   offset 0        offset 5        offset 10
//!
//!   ?page=0 or ?page=abc → 1        ?page=9 → 3
//! ```
//!
//! An empty result still has one (empty) page, so the template always has a
//! current page to show.

use serde::Serialize;

use crate::PAGE_SIZE;

/// Reads the `page` query parameter. Absent or unparsable means page 1.
///
/// Values below 1 are kept here and raised to 1 by [`Pagination::new`].
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(1)
}

/// One resolved page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page, 1-based and within `1..=total_pages`.
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub offset: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Pagination {
    /// Resolves `requested` against `total_count` with [`PAGE_SIZE`].
    pub fn new(total_count: i64, requested: i64) -> Self {
        Self::with_page_size(total_count, requested, PAGE_SIZE)
    }

    pub fn with_page_size(total_count: i64, requested: i64, page_size: i64) -> Self {
        let page_size = page_size.max(1);
        let total_count = total_count.max(0);

        let total_pages = if total_count == 0 {
            1
        } else {
            (total_count + page_size - 1) / page_size
        };
        let page = requested.clamp(1, total_pages);

        Pagination {
            page,
            page_size,
            total_count,
            total_pages,
            offset: (page - 1) * page_size,
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }

    /// Rows to fetch for this page.
    #[inline]
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// `1..=total_pages`, for the page links.
    pub fn page_numbers(&self) -> Vec<i64> {
        (1..=self.total_pages).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
