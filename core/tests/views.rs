//! Property tests for the derived views and the id counter.

use proptest::prelude::*;
use todo_store::view::{filter_items, page_count, page_slice};
use todo_store::{FilterMode, MemoryStorage, PersistedState, Storage, StoreConfig, TodoItem, TodoStore};

fn arb_items() -> impl Strategy<Value = Vec<TodoItem>> {
    prop::collection::vec(("[a-zA-Z ]{0,12}", any::<bool>()), 0..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (text, completed))| TodoItem {
                id: i as u64 + 1,
                text,
                completed,
                user_id: 1,
            })
            .collect()
    })
}

fn arb_filter() -> impl Strategy<Value = FilterMode> {
    prop_oneof![
        Just(FilterMode::All),
        Just(FilterMode::Completed),
        Just(FilterMode::Pending),
    ]
}

proptest! {
    #[test]
    fn filtered_items_match_mode_and_query(
        items in arb_items(),
        filter in arb_filter(),
        query in "[a-zA-Z]{0,2}",
    ) {
        let filtered = filter_items(&items, filter, &query);
        let needle = query.to_lowercase();

        for item in &filtered {
            match filter {
                FilterMode::Completed => { prop_assert!(item.completed); }
                FilterMode::Pending => { prop_assert!(!item.completed); }
                FilterMode::All => {}
            }
            prop_assert!(item.text.to_lowercase().contains(&needle));
        }

        let expected = items
            .iter()
            .filter(|i| filter.matches(i) && i.text.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn pages_partition_the_filtered_items(
        items in arb_items(),
        filter in arb_filter(),
        page_size in 1usize..12,
    ) {
        let filtered = filter_items(&items, filter, "");
        let pages = page_count(filtered.len(), page_size);
        prop_assert_eq!(pages, (filtered.len() + page_size - 1) / page_size);

        let mut seen = Vec::new();
        for page in 1..=pages + 1 {
            let slice = page_slice(&filtered, page, page_size);
            prop_assert!(slice.len() <= page_size);
            if page > pages {
                prop_assert!(slice.is_empty());
            }
            seen.extend(slice.iter().map(|i| i.id));
        }
        let all: Vec<u64> = filtered.iter().map(|i| i.id).collect();
        prop_assert_eq!(seen, all);
    }

    #[test]
    fn store_page_items_stay_within_filtered_set(
        items in arb_items(),
        filter in arb_filter(),
        page in 1usize..8,
        page_size in 1usize..8,
    ) {
        let storage = MemoryStorage::new();
        let persisted = PersistedState { items, next_id: 1, page_size };
        storage.save("todo", &serde_json::to_string(&persisted).unwrap()).unwrap();

        let store = TodoStore::new(&StoreConfig::default(), NoTransport, storage);
        store.set_filter(filter);
        store.set_page(page);

        let filtered = store.filtered_items();
        let page_items = store.page_items();
        prop_assert!(page_items.len() <= page_size);
        prop_assert!(page_items.iter().all(|i| filtered.contains(i)));
        prop_assert_eq!(store.page_count(), filtered.len().div_ceil(page_size));
        // Restored counter is past every persisted id.
        prop_assert!(store.items().iter().all(|i| i.id < store.next_id()));
    }
}

/// Views never touch the network.
struct NoTransport;

impl todo_store::Transport for NoTransport {
    async fn execute(
        &self,
        _request: todo_store::HttpRequest,
    ) -> Result<todo_store::HttpResponse, todo_store::TransportError> {
        unreachable!("views issue no requests")
    }
}
