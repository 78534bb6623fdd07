//! Page-number pagination for list endpoints.
//!
//! A page parameter that is missing or not an integer resolves to the first
//! page, and one past either end resolves to the last page.
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    pub count: i64,
}

impl PageWindow {
    pub fn resolve(raw_page: Option<&str>, count: i64, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = if count <= 0 {
            1
        } else {
            (count + per_page - 1) / per_page
        };
        let number = match raw_page.and_then(|p| p.trim().parse::<i64>().ok()) {
            None => 1,
            Some(n) if n < 1 || n > num_pages => num_pages,
            Some(n) => n,
        };
        Self {
            number,
            num_pages,
            per_page,
            count,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.number < self.num_pages,
            has_previous: self.number > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_garbage_page_is_first() {
        assert_eq!(PageWindow::resolve(None, 30, 12).number, 1);
        assert_eq!(PageWindow::resolve(Some("abc"), 30, 12).number, 1);
    }

    #[test]
    fn test_out_of_range_page_is_last() {
        let window = PageWindow::resolve(Some("9"), 30, 12);
        assert_eq!(window.num_pages, 3);
        assert_eq!(window.number, 3);
        assert_eq!(window.offset(), 24);

        assert_eq!(PageWindow::resolve(Some("0"), 30, 12).number, 3);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let window = PageWindow::resolve(Some("2"), 0, 10);
        assert_eq!(window.num_pages, 1);
        assert_eq!(window.number, 1);

        let page = window.into_page(Vec::<i32>::new());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_middle_page_flags() {
        let page = PageWindow::resolve(Some("2"), 25, 10).into_page(vec![1, 2, 3]);
        assert!(page.has_next);
        assert!(page.has_previous);
    }
}
