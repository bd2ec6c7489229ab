//! Client-side listing helpers: search matching and pagination.

use serde::Serialize;

/// Rows per page in the back-office listings.
pub const ADMIN_PAGE_SIZE: usize = 10;

/// Case-insensitive substring match on an optional field.
///
/// A missing field never matches. `needle` is expected lowercased and trimmed
/// by the caller (once per query rather than once per row).
pub fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// One page of a filtered listing (1-based page numbers).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `items` into the requested page.
///
/// `page` is clamped into `1..=total_pages`; an empty listing yields a single
/// empty page. A `page_size` of zero is treated as one.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let size = page_size.max(1);
    let total_pages = items.len().div_ceil(size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * size;
    let end = (start + size).min(items.len());

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn contains_ci_ignores_case_and_missing_fields() {
        assert!(contains_ci(Some("Ácido Cítrico"), "cítrico"));
        assert!(contains_ci(Some("Glicerina"), "GLIC".to_lowercase().as_str()));
        assert!(!contains_ci(None, ""));
    }

    #[test]
    fn paginates_twenty_three_rows_in_pages_of_ten() {
        let rows: Vec<u32> = (1..=23).collect();

        let first = paginate(&rows, 1, 10);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = paginate(&rows, 3, 10);
        assert_eq!(last.items, vec![21, 22, 23]);
        assert!(!last.has_next());
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let rows: Vec<u32> = (1..=5).collect();
        let page = paginate(&rows, 99, 2);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, vec![5]);
    }

    #[test]
    fn empty_listing_has_one_empty_page() {
        let page = paginate::<u32>(&[], 1, 10);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    proptest! {
        /// Property: concatenating every page reproduces the listing.
        #[test]
        fn pages_cover_listing_exactly(len in 0usize..200, size in 1usize..25) {
            let rows: Vec<usize> = (0..len).collect();
            let total = paginate(&rows, 1, size).total_pages;
            let joined: Vec<usize> = (1..=total)
                .flat_map(|p| paginate(&rows, p, size).items)
                .collect();
            prop_assert_eq!(joined, rows);
        }
    }
}
