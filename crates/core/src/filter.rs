//! Local narrowing and paging of attention results.
//!
//! [`visible`] is the pure derivation. [`FilterEngine`] memoizes it for a
//! given result generation and filter text, and [`paginate`] slices the view
//! into pages for display.

use crate::model::AttentionEvent;

/// Events whose item code contains `code_filter`, compared case-insensitively.
///
/// Order is preserved and the source is never touched. An empty filter keeps
/// every event.
pub fn visible<'a>(all: &'a [AttentionEvent], code_filter: &str) -> Vec<&'a AttentionEvent> {
    matching_indices(all, code_filter)
        .into_iter()
        .map(|i| &all[i])
        .collect()
}

fn matching_indices(all: &[AttentionEvent], code_filter: &str) -> Vec<usize> {
    if code_filter.is_empty() {
        return (0..all.len()).collect();
    }
    let needle = code_filter.to_lowercase();
    all.iter()
        .enumerate()
        .filter(|(_, event)| event.item_code.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// Memoized [`visible`] keyed by (result generation, filter text).
///
/// Callers bump the generation whenever the underlying list is replaced.
#[derive(Debug, Default)]
pub struct FilterEngine {
    cached: Option<CachedView>,
}

#[derive(Debug)]
struct CachedView {
    generation: u64,
    filter: String,
    indices: Vec<usize>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view<'a>(
        &mut self,
        generation: u64,
        all: &'a [AttentionEvent],
        code_filter: &str,
    ) -> Vec<&'a AttentionEvent> {
        let stale = match &self.cached {
            Some(c) => c.generation != generation || c.filter != code_filter,
            None => true,
        };
        if stale {
            self.cached = Some(CachedView {
                generation,
                filter: code_filter.to_string(),
                indices: matching_indices(all, code_filter),
            });
        }

        self.cached
            .as_ref()
            .map(|c| c.indices.iter().filter_map(|&i| all.get(i)).collect())
            .unwrap_or_default()
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

/// One page of a derived view.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based index of this page, after clamping.
    pub index: usize,
    /// Always at least 1.
    pub count: usize,
    pub total: usize,
}

/// Slices `items` into the page at `page_index`.
///
/// An index past the end clamps to the last page. An empty list yields one
/// empty page. A zero page size is treated as one item per page.
pub fn paginate<T>(items: &[T], page_size: usize, page_index: usize) -> Page<'_, T> {
    let size = page_size.max(1);
    let count = items.len().div_ceil(size).max(1);
    let index = page_index.min(count - 1);
    let start = (index * size).min(items.len());
    let end = (start + size).min(items.len());

    Page {
        items: &items[start..end],
        index,
        count,
        total: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::attention;

    fn sample() -> Vec<AttentionEvent> {
        vec![
            attention("10", "Z001"),
            attention("11", "ab-77"),
            attention("12", "X1AB"),
            attention("13", "99213"),
        ]
    }

    fn codes(view: &[&AttentionEvent]) -> Vec<String> {
        view.iter().map(|a| a.item_code.clone()).collect()
    }

    #[test]
    fn empty_filter_is_identity() {
        let all = sample();
        let before = all.clone();
        let view = visible(&all, "");

        assert_eq!(view.len(), all.len());
        assert!(view.iter().zip(all.iter()).all(|(v, a)| *v == a));
        assert_eq!(all, before, "source list must not change");
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let all = sample();
        assert_eq!(codes(&visible(&all, "ab")), vec!["ab-77", "X1AB"]);
        assert_eq!(visible(&all, "ab"), visible(&all, "AB"));
        assert!(visible(&all, "nothing").is_empty());
    }

    #[test]
    fn filtering_preserves_original_order() {
        let all = vec![
            attention("3", "K2"),
            attention("1", "K1"),
            attention("2", "K3"),
        ];
        let view = visible(&all, "k");
        let visits: Vec<&str> = view.iter().map(|a| a.visit_id.as_str()).collect();
        assert_eq!(visits, vec!["3", "1", "2"]);
    }

    #[test]
    fn engine_recomputes_on_generation_or_filter_change() {
        let mut engine = FilterEngine::new();
        let first = sample();
        assert_eq!(engine.view(1, &first, "z").len(), 1);
        assert_eq!(engine.view(1, &first, "").len(), 4);

        let replaced = vec![attention("20", "Z9"), attention("21", "Z8")];
        assert_eq!(engine.view(2, &replaced, "z").len(), 2);
        assert_eq!(codes(&engine.view(2, &replaced, "z")), vec!["Z9", "Z8"]);
    }

    #[test]
    fn paginate_slices_and_clamps() {
        let items: Vec<u32> = (0..30).collect();

        let first = paginate(&items, 13, 0);
        assert_eq!(first.items.len(), 13);
        assert_eq!(first.count, 3);
        assert_eq!(first.total, 30);

        let last = paginate(&items, 13, 2);
        assert_eq!(last.items, &[26, 27, 28, 29]);

        let clamped = paginate(&items, 13, 99);
        assert_eq!(clamped.index, 2);
        assert_eq!(clamped.items, last.items);
    }

    #[test]
    fn paginate_empty_list_yields_single_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 25, 3);
        assert_eq!(page.index, 0);
        assert_eq!(page.count, 1);
        assert!(page.items.is_empty());
    }
}
