/// Pagination helper shared by all stores
///
/// Stores work with zero-indexed `offset`/`limit` windows and return a
/// [`PageSlice`] holding the rows plus the total number of matching active
/// rows. Callers that think in 1-indexed pages build a [`PageRequest`], use its
/// offset and limit for the store call, and wrap the result with
/// [`PageRequest::envelope`], which echoes `page` and `per_page` back.
///
/// # Example
///
/// ```
/// use usermanagement_shared::pagination::{PageRequest, PageSlice};
///
/// let request = PageRequest::new(3, 10).unwrap();
/// assert_eq!(request.offset(), 20);
///
/// let page = request.envelope(PageSlice { items: vec!["a", "b"], total: 22 });
/// assert_eq!(page.page, 3);
/// assert_eq!(page.per_page, 10);
/// assert_eq!(page.total, 22);
/// ```

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Largest `limit` a store accepts for a single list call
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Rows returned by a store list operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSlice<T> {
    /// Rows inside the requested window
    pub items: Vec<T>,

    /// Total number of matching active rows, not just this window
    pub total: i64,
}

/// 1-indexed page coordinates supplied by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

/// Response envelope for a page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    #[serde(rename = "perPage")]
    pub per_page: u32,
}

impl PageRequest {
    /// Validates and builds a page request
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if `page` is 0, or if `per_page` is
    /// 0 or above [`MAX_PAGE_SIZE`].
    pub fn new(page: u32, per_page: u32) -> StoreResult<Self> {
        if page < 1 || per_page == 0 || i64::from(per_page) > MAX_PAGE_SIZE {
            return Err(StoreError::validation(format!(
                "page {} or per page {} is not valid",
                page, per_page
            )));
        }

        Ok(Self { page, per_page })
    }

    /// Zero-indexed row offset: `per_page * (page - 1)`
    ///
    /// Saturates at `i64::MAX` for coordinates built without [`PageRequest::new`].
    pub fn offset(&self) -> i64 {
        i64::from(self.per_page).saturating_mul(i64::from(self.page) - 1)
    }

    /// Row limit for the store call
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Wraps a store result with this request's page coordinates
    pub fn envelope<T>(&self, slice: PageSlice<T>) -> Paginated<T> {
        Paginated {
            items: slice.items,
            total: slice.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

impl<T> Paginated<T> {
    /// Number of pages needed to cover `total` rows
    pub fn total_pages(&self) -> i64 {
        let per_page = i64::from(self.per_page.max(1));
        (self.total + per_page - 1) / per_page
    }

    /// Whether a page after this one has rows
    pub fn has_next(&self) -> bool {
        i64::from(self.page) < self.total_pages()
    }

    /// Converts the items while keeping the page coordinates
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Checks a zero-indexed window before any storage access
///
/// # Errors
///
/// Returns [`StoreError::Validation`] when `limit` is 0 or above
/// [`MAX_PAGE_SIZE`], or when `offset` is negative.
pub fn validate_window(offset: i64, limit: i64) -> StoreResult<()> {
    if limit <= 0 || limit > MAX_PAGE_SIZE {
        return Err(StoreError::validation(format!("limit {} is not valid", limit)));
    }
    if offset < 0 {
        return Err(StoreError::validation(format!("offset {} is not valid", offset)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_offset_computation() {
        assert_eq!(PageRequest::new(1, 10).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(2, 10).unwrap().offset(), 10);
        assert_eq!(PageRequest::new(5, 25).unwrap().offset(), 100);
    }

    #[test]
    fn test_largest_accepted_page_offset() {
        let request = PageRequest::new(u32::MAX, 1000).unwrap();
        assert_eq!(request.offset(), 1000 * (i64::from(u32::MAX) - 1));
        assert!(validate_window(request.offset(), request.limit()).is_ok());
    }

    #[test]
    fn test_rejects_per_page_above_max() {
        assert!(PageRequest::new(1, 1000).is_ok());
        assert_eq!(PageRequest::new(1, 1001).unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(
            PageRequest::new(u32::MAX, u32::MAX).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_offset_saturates_for_unchecked_coordinates() {
        let request = PageRequest {
            page: u32::MAX,
            per_page: u32::MAX,
        };
        assert_eq!(request.offset(), i64::MAX);
    }

    #[test]
    fn test_rejects_zero_page_and_per_page() {
        assert_eq!(PageRequest::new(0, 10).unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(PageRequest::new(1, 0).unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_validate_window() {
        assert!(validate_window(0, 1).is_ok());
        assert!(validate_window(0, MAX_PAGE_SIZE).is_ok());
        assert!(validate_window(0, 0).is_err());
        assert!(validate_window(0, MAX_PAGE_SIZE + 1).is_err());
        assert!(validate_window(-1, 10).is_err());
    }

    #[test]
    fn test_envelope_echoes_coordinates() {
        let request = PageRequest::new(2, 10).unwrap();
        let page = request.envelope(PageSlice {
            items: vec![1, 2, 3],
            total: 13,
        });

        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total, 13);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 10);
        assert_eq!(page.total_pages(), 2);
        assert!(!page.has_next());
    }

    #[test]
    fn test_envelope_serializes_per_page_in_camel_case() {
        let page = PageRequest::new(1, 10).unwrap().envelope(PageSlice {
            items: Vec::<u8>::new(),
            total: 0,
        });
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["perPage"], 10);
        assert_eq!(json["page"], 1);
        assert_eq!(json["total"], 0);
    }

    #[test]
    fn test_map_keeps_coordinates() {
        let page = Paginated {
            items: vec![1, 2],
            total: 30,
            page: 1,
            per_page: 2,
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.total, 30);
        assert!(mapped.has_next());
    }
}
