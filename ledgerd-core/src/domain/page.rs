//! Pagination request/response envelope

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// A caller-supplied page selector. Absent or out-of-range values fall back
/// to page 1 / limit 10; the limit is capped at 100.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page(&self) -> i64 {
        match self.page {
            Some(p) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        }
    }

    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(l) if (1..=MAX_LIMIT).contains(&l) => l,
            _ => DEFAULT_LIMIT,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit() - 1) / self.limit()
        }
    }
}

/// One page of results plus the counts a paginated UI needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub page: i64,
    pub limit: i64,
    /// Count before filters are applied.
    pub total: i64,
    /// Count after filters are applied.
    pub filtered_total: i64,
    pub total_page: i64,
}

impl<T> Page<T> {
    pub fn new(list: Vec<T>, request: &PageRequest, total: i64, filtered_total: i64) -> Self {
        Self {
            list,
            page: request.page(),
            limit: request.limit(),
            total,
            filtered_total,
            total_page: request.total_pages(filtered_total),
        }
    }

    /// Convert the items, keeping the envelope.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            list: self.list.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            filtered_total: self.filtered_total,
            total_page: self.total_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_caps() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(0, 5000);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_offset_and_total_pages() {
        let req = PageRequest::new(3, 20);
        assert_eq!(req.offset(), 40);
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(41), 3);
        assert_eq!(req.total_pages(40), 2);
    }

    #[test]
    fn test_map_keeps_envelope() {
        let req = PageRequest::new(1, 2);
        let page = Page::new(vec![1, 2], &req, 7, 5).map(|n| n.to_string());
        assert_eq!(page.list, vec!["1", "2"]);
        assert_eq!(page.total, 7);
        assert_eq!(page.filtered_total, 5);
        assert_eq!(page.total_page, 3);
    }
}
