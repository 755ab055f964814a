//! Offset pagination types shared by repositories and handlers.

/// A request for one page of results. Pages are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Page numbers below 1 are clamped to the first page. Pages whose
    /// offset would not fit a signed 64-bit row offset are clamped to the
    /// furthest addressable page, which is always empty.
    pub fn new(page: u64, per_page: u64) -> Self {
        let per_page = per_page.clamp(1, i64::MAX as u64);
        let max_page = i64::MAX as u64 / per_page;
        Self {
            page: page.clamp(1, max_page),
            per_page,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.per_page).max(1)
    }
}
