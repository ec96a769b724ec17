/// Page size used when a request asks for fewer than one item per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A 1-based page of results.
///
/// Out-of-range values are coerced rather than rejected: a page below 1 is
/// page 1, and a page size below 1 is [DEFAULT_PAGE_SIZE].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: if page_size < 1 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Number of items to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}
