//! Search projection over the pending set and the load-state predicate.
//!
//! Both are pure functions of the engine's state and are recomputed on every
//! render; nothing here is stored.

use crate::store::PendingDescription;

/// Which of the three top-level views the presentation should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No fetch has completed yet, or one is running.
    Loading,
    /// The last fetch returned no items.
    Empty,
    /// The last fetch returned at least one item.
    Ready,
    /// The last fetch failed; its error takes the place of the list.
    Failed,
}

/// Returns the items whose product name or description contains `search_term`,
/// ignoring case. An empty term matches everything. Order is preserved.
pub fn filter_items<'a>(
    items: &'a [PendingDescription],
    search_term: &str,
) -> Vec<&'a PendingDescription> {
    let needle = search_term.to_lowercase();
    items.iter().filter(|item| matches(item, &needle)).collect()
}

// `needle` must already be lowercased.
fn matches(item: &PendingDescription, needle: &str) -> bool {
    needle.is_empty()
        || item.product_name().to_lowercase().contains(needle)
        || item.description_text().to_lowercase().contains(needle)
}

/// Whether the last fetch (if any) produced something to show.
pub fn has_results(last_fetch: Option<&[PendingDescription]>) -> bool {
    last_fetch.is_some_and(|items| !items.is_empty())
}

/// Picks the view to render. Independent of the search term.
pub fn load_state(loading: bool, last_fetch: Option<&[PendingDescription]>) -> LoadState {
    if loading {
        return LoadState::Loading;
    }
    match last_fetch {
        None => LoadState::Loading,
        Some(_) if has_results(last_fetch) => LoadState::Ready,
        Some(_) => LoadState::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::pending;

    fn catalog() -> Vec<PendingDescription> {
        vec![
            pending("1", "Linen Trousers", Some("Relaxed fit in natural beige.")),
            pending("2", "Cotton Shirt", Some("A crisp shirt in Ocean BLUE.")),
            pending("3", "Wool Scarf", None),
        ]
    }

    fn ids(items: &[&PendingDescription]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn empty_term_matches_everything() {
        let items = catalog();
        assert_eq!(ids(&filter_items(&items, "")), vec!["1", "2", "3"]);
    }

    #[test]
    fn matches_description_case_insensitively() {
        let items = catalog();
        let visible = filter_items(&items, "blue");
        assert_eq!(ids(&visible), vec!["2"]);
        assert_eq!(visible[0], &items[1]);
    }

    #[test]
    fn matches_product_name() {
        let items = catalog();
        assert_eq!(ids(&filter_items(&items, "SCARF")), vec!["3"]);
    }

    #[test]
    fn absent_description_is_treated_as_empty() {
        let items = catalog();
        assert!(filter_items(&items, "beige").iter().all(|i| i.id == "1"));
        assert!(filter_items(&items, "nothing like this").is_empty());
    }

    #[test]
    fn filtering_preserves_order() {
        let items = vec![
            pending("a", "Red Cap", None),
            pending("b", "Blue Cap", None),
            pending("c", "Green Cap", None),
            pending("d", "Cap Rack", Some("holds every cap")),
        ];
        assert_eq!(ids(&filter_items(&items, "cap")), vec!["a", "b", "c", "d"]);
        assert_eq!(ids(&filter_items(&items, "re")), vec!["a", "c"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let items = catalog();
        for term in ["", "s", "shirt", "IN", "zzz"] {
            let once: Vec<PendingDescription> =
                filter_items(&items, term).into_iter().cloned().collect();
            let twice: Vec<PendingDescription> =
                filter_items(&once, term).into_iter().cloned().collect();
            assert_eq!(once, twice, "term {term:?}");
        }
    }

    #[test]
    fn result_is_subsequence_of_matching_items() {
        let items = catalog();
        let term = "in";
        let expected: Vec<&PendingDescription> = items
            .iter()
            .filter(|i| {
                i.product_name().to_lowercase().contains(term)
                    || i.description_text().to_lowercase().contains(term)
            })
            .collect();
        assert_eq!(filter_items(&items, "iN"), expected);
    }

    #[test]
    fn has_results_distinguishes_absent_empty_and_populated() {
        let items = catalog();
        assert!(!has_results(None));
        assert!(!has_results(Some(&[][..])));
        assert!(has_results(Some(items.as_slice())));
    }

    #[test]
    fn load_state_ignores_search_term() {
        let items = catalog();
        assert_eq!(load_state(false, None), LoadState::Loading);
        assert_eq!(load_state(true, Some(items.as_slice())), LoadState::Loading);
        assert_eq!(load_state(false, Some(&[][..])), LoadState::Empty);
        assert_eq!(load_state(false, Some(items.as_slice())), LoadState::Ready);
    }
}
