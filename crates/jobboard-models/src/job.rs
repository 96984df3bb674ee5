//! Job listing filters and pagination.

use serde::{Deserialize, Serialize};

use crate::utils::parse_int_prefix;

/// Page size used when `limit` is present but unusable.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Filters applied to a job listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring searched in title, summary and category.
    pub search: Option<String>,
}

impl JobFilter {
    /// Build a filter from raw query values.
    ///
    /// Empty values are dropped, and the search term is trimmed.
    pub fn new(category: Option<String>, search: Option<String>) -> Self {
        Self {
            category: category.filter(|c| !c.is_empty()),
            search: search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// A 1-based page of a sorted listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Create a window, flooring both values at 1.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Parse `page` and `limit` query values.
    ///
    /// Pagination only applies when both are present and non-empty. An
    /// unparsable or zero page becomes 1; an unparsable or zero limit becomes
    /// [`DEFAULT_PAGE_LIMIT`]. Negative values floor at 1.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Option<Self> {
        let page = page.filter(|p| !p.is_empty())?;
        let limit = limit.filter(|l| !l.is_empty())?;

        let page = parse_int_prefix(page).filter(|p| *p != 0).unwrap_or(1);
        let limit = parse_int_prefix(limit)
            .filter(|l| *l != 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT as i64);

        Some(Self::new(page.max(1) as u64, limit.max(1) as u64))
    }

    /// Number of ranked items preceding this page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results together with the size of the full filtered set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPage<T> {
    pub data: Vec<T>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_drops_empty_values() {
        let filter = JobFilter::new(Some(String::new()), Some("   ".to_string()));
        assert_eq!(filter, JobFilter::default());

        let filter = JobFilter::new(Some("Design".to_string()), Some("  rust ".to_string()));
        assert_eq!(filter.category.as_deref(), Some("Design"));
        assert_eq!(filter.search.as_deref(), Some("rust"));
    }

    #[test]
    fn test_window_requires_both_values() {
        assert_eq!(PageWindow::from_query(Some("1"), None), None);
        assert_eq!(PageWindow::from_query(None, Some("10")), None);
        assert_eq!(PageWindow::from_query(Some(""), Some("10")), None);
        assert!(PageWindow::from_query(Some("1"), Some("10")).is_some());
    }

    #[test]
    fn test_window_defaults_and_floors() {
        assert_eq!(
            PageWindow::from_query(Some("abc"), Some("xyz")),
            Some(PageWindow { page: 1, limit: 10 })
        );
        assert_eq!(
            PageWindow::from_query(Some("0"), Some("0")),
            Some(PageWindow { page: 1, limit: 10 })
        );
        assert_eq!(
            PageWindow::from_query(Some("-2"), Some("-5")),
            Some(PageWindow { page: 1, limit: 1 })
        );
        assert_eq!(
            PageWindow::from_query(Some("3"), Some("25")),
            Some(PageWindow { page: 3, limit: 25 })
        );
    }

    #[test]
    fn test_consecutive_pages_are_contiguous() {
        for limit in 1..=12u64 {
            let first = PageWindow::new(1, limit);
            let second = PageWindow::new(2, limit);

            assert_eq!(first.skip(), 0);
            assert_eq!(second.skip(), first.skip() + first.limit);
            // Both windows together cover exactly the first 2L ranks.
            assert_eq!(second.skip() + second.limit, 2 * limit);
        }
    }

    #[test]
    fn test_skip_saturates() {
        let window = PageWindow::new(u64::MAX, u64::MAX);
        assert_eq!(window.skip(), u64::MAX);
    }
}
