//! Client-side listing helpers.
//!
//! List pages fetch a store's full collection once and then search, sort and
//! paginate it in memory on every request. The functions here are the
//! synchronous part of that: no I/O, no allocation beyond the returned page.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Page size used when a caller asks for zero items per page.
pub const DEFAULT_PER_PAGE: usize = 20;

/// Sort direction for list pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc` (case-insensitive). Anything else yields `None`.
    #[must_use]
    pub fn from_param(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Query-string form.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The opposite direction, used for header toggle links.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Apply this direction to an ascending comparison result.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// One page of an in-memory list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Current page, 1-based.
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
    /// Items across all pages.
    pub total_items: usize,
    /// Number of pages; at least 1 even for an empty list.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based index of the first item on this page (0 when empty).
    #[must_use]
    pub const fn first_index(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page (0 when empty).
    #[must_use]
    pub fn last_index(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            self.first_index() + self.items.len() - 1
        }
    }

    /// Page numbers within `radius` of the current page, for pager links.
    #[must_use]
    pub fn window(&self, radius: usize) -> Vec<usize> {
        let start = self.page.saturating_sub(radius).max(1);
        let end = (self.page + radius).min(self.total_pages);
        (start..=end).collect()
    }

    /// Transform the items while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Slice one page out of `items`.
///
/// `page` is 1-based and clamped into `[1, total_pages]`, so a stale link to
/// page 9 of a list that shrank to 3 pages shows page 3.
///
/// ```
/// use storedesk_core::paginate;
///
/// let page = paginate((1..=45).collect::<Vec<_>>(), 3, 20);
/// assert_eq!(page.items, (41..=45).collect::<Vec<_>>());
/// assert_eq!(page.total_pages, 3);
/// ```
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 {
        DEFAULT_PER_PAGE
    } else {
        per_page
    };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

/// Case-insensitive substring search across several fields.
///
/// An empty (or whitespace-only) needle matches everything.
#[must_use]
pub fn matches_search(needle: &str, haystacks: &[&str]) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_first_and_last_pages() {
        let items: Vec<u32> = (1..=45).collect();

        let first = paginate(items.clone(), 1, 20);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_prev());
        assert!(first.has_next());
        assert_eq!((first.first_index(), first.last_index()), (1, 20));

        let last = paginate(items, 3, 20);
        assert_eq!(last.items, vec![41, 42, 43, 44, 45]);
        assert!(last.has_prev());
        assert!(!last.has_next());
        assert_eq!((last.first_index(), last.last_index()), (41, 45));
    }

    #[test]
    fn test_paginate_clamps_out_of_range() {
        let items: Vec<u32> = (1..=10).collect();
        assert_eq!(paginate(items.clone(), 0, 4).page, 1);

        let clamped = paginate(items, 99, 4);
        assert_eq!(clamped.page, 3);
        assert_eq!(clamped.items, vec![9, 10]);
    }

    #[test]
    fn test_paginate_empty_list_has_one_page() {
        let page = paginate(Vec::<u32>::new(), 5, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);
        assert_eq!((page.first_index(), page.last_index()), (0, 0));
        assert!(!page.has_next());
    }

    #[test]
    fn test_paginate_zero_per_page_uses_default() {
        let page = paginate((0..50).collect::<Vec<u32>>(), 1, 0);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
        assert_eq!(page.items.len(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_window() {
        let page = paginate((0..100).collect::<Vec<u32>>(), 5, 10);
        assert_eq!(page.window(2), vec![3, 4, 5, 6, 7]);

        let first = paginate((0..100).collect::<Vec<u32>>(), 1, 10);
        assert_eq!(first.window(2), vec![1, 2, 3]);

        let last = paginate((0..100).collect::<Vec<u32>>(), 10, 10);
        assert_eq!(last.window(2), vec![8, 9, 10]);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = paginate(vec![1, 2, 3], 1, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search("", &["anything"]));
        assert!(matches_search("  ", &[]));
        assert!(matches_search("mug", &["Ceramic MUG", "kitchen"]));
        assert!(matches_search("KITCH", &["Ceramic mug", "kitchen"]));
        assert!(!matches_search("plate", &["Ceramic mug", "kitchen"]));
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::from_param("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::from_param("sideways"), None);
        assert_eq!(SortDirection::Asc.reversed(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
    }
}
