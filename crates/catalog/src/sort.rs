//! Sorting and pagination of resolved view entries.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use miniforge_core::DomainError;

use crate::resolver::ViewEntry;

/// Number of cards per catalog page.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Shopper-selectable ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
        }
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            other => Err(DomainError::validation(format!("unknown sort key: {other}"))),
        }
    }
}

/// Order entries by `key`. Sorting is stable.
///
/// `Newest` reads ids as numbers and puts the highest first, but only when
/// *every* id parses; a single non-numeric id switches the whole list to an
/// ascending string comparison so that the ordering stays total.
///
/// Open product question: the direction flip on mixed ids looks like a
/// workaround rather than an intended ordering, but it is kept as is.
pub fn sort(mut entries: Vec<ViewEntry>, key: SortKey) -> Vec<ViewEntry> {
    match key {
        SortKey::PriceAsc => entries.sort_by_key(ViewEntry::price),
        SortKey::PriceDesc => entries.sort_by(|a, b| b.price().cmp(&a.price())),
        SortKey::Newest => {
            let numeric: Option<Vec<f64>> = entries.iter().map(|e| e.id().as_number()).collect();
            match numeric {
                Some(numbers) => {
                    let mut keyed: Vec<(f64, ViewEntry)> = numbers.into_iter().zip(entries).collect();
                    keyed.sort_by(|(a, _), (b, _)| b.total_cmp(a));
                    entries = keyed.into_iter().map(|(_, entry)| entry).collect();
                }
                None => entries.sort_by(|a, b| a.id().as_str().cmp(b.id().as_str())),
            }
        }
    }
    entries
}

/// One page of a sorted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
}

/// Number of pages needed for `len` entries; at least 1 for any non-zero page size.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size).max(1)
}

/// Slice out 1-based page `page_index`.
///
/// Out-of-range pages (including 0) yield an empty slice; clamping is the
/// caller's job.
pub fn paginate<T>(sorted: Vec<T>, page_size: usize, page_index: usize) -> Page<T> {
    let total_pages = total_pages(sorted.len(), page_size);
    if page_index == 0 || page_size == 0 {
        return Page {
            items: Vec::new(),
            total_pages,
        };
    }
    let items = sorted
        .into_iter()
        .skip((page_index - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();
    Page { items, total_pages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniforge_products::Product;

    fn entries(ids: &[&str]) -> Vec<ViewEntry> {
        ids.iter()
            .map(|id| ViewEntry::standalone(Product::new(*id, "Mini", 0)))
            .collect()
    }

    fn ids(entries: &[ViewEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id().as_str()).collect()
    }

    #[test]
    fn newest_sorts_numeric_ids_descending() {
        let sorted = sort(entries(&["2", "10", "7"]), SortKey::Newest);
        assert_eq!(ids(&sorted), vec!["10", "7", "2"]);
    }

    #[test]
    fn newest_falls_back_to_ascending_strings() {
        let sorted = sort(entries(&["a", "10", "2"]), SortKey::Newest);
        assert_eq!(ids(&sorted), vec!["10", "2", "a"]);
    }

    #[test]
    fn price_orders_are_stable() {
        let list = vec![
            ViewEntry::standalone(Product::new("1", "A", 300)),
            ViewEntry::standalone(Product::new("2", "B", 100)),
            ViewEntry::standalone(Product::new("3", "C", 300)),
        ];
        assert_eq!(ids(&sort(list.clone(), SortKey::PriceAsc)), vec!["2", "1", "3"]);
        assert_eq!(ids(&sort(list, SortKey::PriceDesc)), vec!["1", "3", "2"]);
    }

    #[test]
    fn pagination_math() {
        let list: Vec<usize> = (0..23).collect();
        let page = paginate(list.clone(), 9, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, vec![18, 19, 20, 21, 22]);

        let first = paginate(list, 9, 1);
        assert_eq!(first.items.len(), 9);
    }

    #[test]
    fn empty_list_still_has_one_page() {
        let page = paginate(Vec::<u8>::new(), 9, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn out_of_range_pages_are_empty_not_errors() {
        let list: Vec<usize> = (0..5).collect();
        assert!(paginate(list.clone(), 9, 2).items.is_empty());
        assert!(paginate(list.clone(), 9, 0).items.is_empty());
        assert_eq!(paginate(list, 0, 1).total_pages, 0);
    }

    #[test]
    fn sort_keys_parse_from_wire_names() {
        for key in [SortKey::Newest, SortKey::PriceAsc, SortKey::PriceDesc] {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("cheapest".parse::<SortKey>().is_err());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: walking every page visits each entry exactly once.
            #[test]
            fn pages_partition_the_list(len in 0usize..60, page_size in 1usize..12) {
                let list: Vec<usize> = (0..len).collect();
                let pages = total_pages(len, page_size);
                let mut seen = Vec::new();
                for index in 1..=pages {
                    seen.extend(paginate(list.clone(), page_size, index).items);
                }
                prop_assert_eq!(seen, list);
            }
        }
    }
}
