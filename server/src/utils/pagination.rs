//! Pagination types for list endpoints

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

/// Page/limit query parameters with sane defaults
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    /// Clamp to valid ranges; limit capped at 100
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: PageQuery, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + page.limit - 1) / page.limit
        };
        Self {
            items,
            page: page.page,
            limit: page.limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_out_of_range_values() {
        let q = PageQuery { page: 0, limit: 500 }.normalized();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 100);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn computes_total_pages_with_remainder() {
        let q = PageQuery { page: 1, limit: 20 };
        let p = Paginated::new(vec![1, 2, 3], q, 41);
        assert_eq!(p.total_pages, 3);

        let empty: Paginated<i32> = Paginated::new(vec![], q, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
