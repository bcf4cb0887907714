//! Keyset pagination.
//!
//! Listings are ordered by ascending ID. A page asks for `first` rows with an
//! ID greater than `after`; the store fetches one extra row to learn whether
//! another page exists.

/// Entities that can be paged by their integer key.
pub trait Keyed {
    fn key(&self) -> i32;
}

/// A request for one page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of rows to return (at least 1).
    pub first: usize,
    /// Return only rows whose key is greater than this.
    pub after: Option<i32>,
}

impl PageRequest {
    /// Every matching row in a single page.
    pub const UNBOUNDED: Self = Self {
        first: usize::MAX,
        after: None,
    };

    #[must_use]
    pub const fn new(first: usize, after: Option<i32>) -> Self {
        Self { first, after }
    }

    /// Number of rows to fetch from the store, one more than requested.
    #[must_use]
    pub fn fetch_limit(&self) -> i64 {
        i64::try_from(self.first.saturating_add(1)).unwrap_or(i64::MAX)
    }

    /// Whether `key` comes after the cursor.
    #[must_use]
    pub fn admits(&self, key: i32) -> bool {
        self.after.is_none_or(|after| key > after)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    /// Build a page from a fetch of up to `first + 1` rows.
    #[must_use]
    pub fn from_overfetch(mut items: Vec<T>, first: usize) -> Self {
        let has_next_page = items.len() > first;
        items.truncate(first);
        Self {
            items,
            has_next_page,
        }
    }
}

impl<T: Keyed> Page<T> {
    /// Key of the last item, used as the next `after`.
    #[must_use]
    pub fn end_key(&self) -> Option<i32> {
        self.items.last().map(Keyed::key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Keyed for i32 {
        fn key(&self) -> i32 {
            *self
        }
    }

    #[test]
    fn test_overfetch_sets_has_next_page() {
        let page = Page::from_overfetch(vec![1, 2, 3], 2);
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.has_next_page);
        assert_eq!(page.end_key(), Some(2));
    }

    #[test]
    fn test_short_fetch_is_last_page() {
        let page = Page::from_overfetch(vec![7], 2);
        assert_eq!(page.items, vec![7]);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_admits_is_exclusive() {
        let req = PageRequest::new(10, Some(5));
        assert!(!req.admits(5));
        assert!(req.admits(6));
        assert!(PageRequest::new(10, None).admits(i32::MIN));
        assert_eq!(req.fetch_limit(), 11);
    }
}
