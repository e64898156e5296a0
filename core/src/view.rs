//! Derived views over the item list: filter, search, pagination.
//!
//! These are recomputed on every read; nothing here is cached.

use crate::types::{FilterMode, TodoItem};

/// Items passing `filter`, then containing `query` (case-insensitive). An
/// empty query matches everything.
pub fn filter_items<'a>(items: &'a [TodoItem], filter: FilterMode, query: &str) -> Vec<&'a TodoItem> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| filter.matches(item))
        .filter(|item| needle.is_empty() || item.text.to_lowercase().contains(&needle))
        .collect()
}

pub fn page_count(filtered_len: usize, page_size: usize) -> usize {
    filtered_len.div_ceil(page_size.max(1))
}

/// The 1-based `page` of `filtered`; empty once `page` runs past the end.
pub fn page_slice<T>(filtered: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= filtered.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(filtered.len());
    &filtered[start..end]
}
