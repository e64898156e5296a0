//! The todo store: local collection state reconciled with the remote
//! resource.
//!
//! # Design
//! All operations take `&self`. State lives in a `RefCell` that is borrowed
//! only between awaits, never across one, so several operations can be in
//! flight at once on a single thread (`tokio::join!`, a `LocalSet`) and each
//! sees the others' writes as soon as they happen. Nothing serializes two
//! operations on the same id: the last write to the vector wins.
//!
//! Remote failures never leave an operation. They are logged at the boundary
//! and folded into an `Outcome`; local state is then either unchanged or, for
//! `toggle`, restored to its pre-toggle value.
//!
//! Every mutation ends with an explicit `persist`, which writes
//! `{items, nextId, pageSize}` under the store key. Persistence failures are
//! logged and otherwise ignored.

use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;

use tracing::{debug, error, warn};

use crate::client::TodoClient;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::http::{HttpRequest, HttpResponse};
use crate::storage::{PersistedState, Storage};
use crate::transport::Transport;
use crate::types::{CreateTodo, FilterMode, Outcome, TodoId, TodoItem, UpdateTodo};
use crate::view;

/// Everything the store knows locally. Only `items`, `next_id` and
/// `page_size` are persisted.
#[derive(Debug)]
struct CollectionState {
    /// Insertion order; manually added items are prepended.
    items: Vec<TodoItem>,
    /// Always greater than every id in `items`.
    next_id: TodoId,
    is_loading: bool,
    filter: FilterMode,
    search_query: String,
    /// 1-based.
    page: usize,
    page_size: usize,
}

impl CollectionState {
    fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            is_loading: false,
            filter: FilterMode::All,
            search_query: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    fn persisted(&self) -> PersistedState {
        PersistedState {
            items: self.items.clone(),
            next_id: self.next_id,
            page_size: self.page_size,
        }
    }

    /// Nothing is applied when an id leaves no room for the counter.
    fn restore(&mut self, persisted: PersistedState) -> Result<(), StoreError> {
        let items = dedupe_ids(persisted.items);
        let floor = match max_id(&items) {
            Some(max) => successor(max)?,
            None => 1,
        };
        self.items = items;
        self.next_id = persisted.next_id.max(floor);
        self.page_size = persisted.page_size.max(1);
        Ok(())
    }

    fn position(&self, id: TodoId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn provision_id(&mut self) -> Result<TodoId, StoreError> {
        let mut id = self.next_id;
        while self.position(id).is_some() {
            id = successor(id)?;
        }
        self.next_id = successor(id)?;
        Ok(id)
    }

    /// Swaps in a fetched collection and moves the counter past it.
    fn replace_items(&mut self, items: Vec<TodoItem>) -> Result<usize, StoreError> {
        let items = dedupe_ids(items);
        if let Some(max) = max_id(&items) {
            self.next_id = successor(max)?;
        }
        self.items = items;
        Ok(self.items.len())
    }

    /// Prepends a created item, re-keying it when its id is already taken.
    fn insert_created(&mut self, mut item: TodoItem) -> Result<(), StoreError> {
        if self.position(item.id).is_some() {
            let provisional = self.provision_id()?;
            warn!(
                remote_id = item.id,
                id = provisional,
                "server returned an id already in use, assigning a provisional id"
            );
            item.id = provisional;
        }
        self.next_id = self.next_id.max(successor(item.id)?);
        self.items.insert(0, item);
        Ok(())
    }
}

fn successor(id: TodoId) -> Result<TodoId, StoreError> {
    id.checked_add(1).ok_or(StoreError::IdOverflow(id))
}

fn max_id(items: &[TodoItem]) -> Option<TodoId> {
    items.iter().map(|item| item.id).max()
}

/// Keeps the first occurrence of every id.
fn dedupe_ids(items: Vec<TodoItem>) -> Vec<TodoItem> {
    let mut seen = HashSet::with_capacity(items.len());
    let before = items.len();
    let items: Vec<TodoItem> = items.into_iter().filter(|item| seen.insert(item.id)).collect();
    if items.len() != before {
        warn!(dropped = before - items.len(), "dropped todos with duplicate ids");
    }
    items
}

/// Holds `is_loading` for as long as it lives, so every exit path clears it,
/// including the refresh future being dropped mid-flight.
struct LoadingGuard<'a> {
    state: &'a RefCell<CollectionState>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(state: &'a RefCell<CollectionState>) -> Self {
        state.borrow_mut().is_loading = true;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().is_loading = false;
    }
}

pub struct TodoStore<T, S> {
    client: TodoClient,
    transport: T,
    storage: S,
    key: String,
    user_id: u64,
    state: RefCell<CollectionState>,
}

impl<T: Transport, S: Storage> TodoStore<T, S> {
    /// Builds an empty store and restores whatever `storage` holds under
    /// `config.store_key`.
    pub fn new(config: &StoreConfig, transport: T, storage: S) -> Self {
        let store = Self {
            client: TodoClient::new(&config.base_url),
            transport,
            storage,
            key: config.store_key.clone(),
            user_id: config.user_id,
            state: RefCell::new(CollectionState::new(config.page_size)),
        };
        store.load();
        store
    }

    // ------------------------------------------------------------------
    // Remote operations
    // ------------------------------------------------------------------

    /// Replaces the collection with the remote one. On failure the current
    /// items are kept.
    pub async fn refresh_all(&self) -> Outcome {
        let _loading = LoadingGuard::enter(&self.state);
        let fetched = self.fetch_all().await;
        match fetched.and_then(|items| self.state.borrow_mut().replace_items(items)) {
            Ok(count) => {
                self.persist();
                debug!(count, "refreshed todos");
                Outcome::Applied
            }
            Err(err) => {
                error!(error = %err, decode = err.is_decode(), "failed to fetch todos");
                Outcome::Unchanged
            }
        }
    }

    /// Creates a todo remotely and prepends the confirmed item. Blank text is
    /// ignored without issuing a request.
    pub async fn add(&self, text: &str) -> Outcome {
        if text.trim().is_empty() {
            debug!("ignoring blank todo");
            return Outcome::Skipped;
        }
        let created = self.create_remote(text).await;
        match created.and_then(|item| self.state.borrow_mut().insert_created(item)) {
            Ok(()) => {
                self.persist();
                Outcome::Applied
            }
            Err(err) => {
                error!(error = %err, decode = err.is_decode(), "failed to add todo");
                Outcome::Unchanged
            }
        }
    }

    /// Flips `completed` right away, then confirms remotely.
    ///
    /// The flip happens when `toggle` is called, before the returned future
    /// is first polled. If the update fails the item goes back to its
    /// pre-toggle value. The future may be awaited or spawned on a local
    /// task set and forgotten. Dropping it unpolled sends no request, so the
    /// flip stays in place (and persisted) with nothing to revert it.
    pub fn toggle(&self, id: TodoId) -> impl Future<Output = Outcome> + '_ {
        let previous = self.flip_completed(id);
        async move {
            let Some(previous) = previous else {
                debug!(id, "toggle of unknown todo ignored");
                return Outcome::Skipped;
            };
            match self.send_completed(id, !previous).await {
                Ok(()) => Outcome::Applied,
                Err(err) => {
                    error!(id, error = %err, "failed to toggle todo, reverting");
                    self.restore_completed(id, previous);
                    Outcome::Reverted
                }
            }
        }
    }

    /// Updates the text remotely, then swaps in the confirmed item.
    pub async fn edit(&self, id: TodoId, new_text: &str) -> Outcome {
        let update = UpdateTodo {
            todo: Some(new_text.to_string()),
            completed: None,
        };
        match self.update_remote(id, &update).await {
            Ok(mut confirmed) => {
                confirmed.id = id;
                let replaced = {
                    let mut state = self.state.borrow_mut();
                    match state.position(id) {
                        Some(index) => {
                            state.items[index] = confirmed;
                            true
                        }
                        None => false,
                    }
                };
                if !replaced {
                    debug!(id, "edited todo is no longer present");
                    return Outcome::Skipped;
                }
                self.persist();
                Outcome::Applied
            }
            Err(err) => {
                error!(id, error = %err, decode = err.is_decode(), "failed to edit todo");
                Outcome::Unchanged
            }
        }
    }

    /// Deletes remotely; the item leaves local state only once the delete
    /// has succeeded.
    pub async fn remove(&self, id: TodoId) -> Outcome {
        match self.delete_remote(id).await {
            Ok(()) => {
                self.state.borrow_mut().items.retain(|item| item.id != id);
                self.persist();
                Outcome::Applied
            }
            Err(err) => {
                error!(id, error = %err, "failed to remove todo");
                Outcome::Unchanged
            }
        }
    }

    // ------------------------------------------------------------------
    // Local operations
    // ------------------------------------------------------------------

    /// Empties the collection locally. No request is made.
    pub fn clear(&self) {
        self.state.borrow_mut().items.clear();
        self.persist();
    }

    pub fn set_filter(&self, filter: FilterMode) {
        self.state.borrow_mut().filter = filter;
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.state.borrow_mut().search_query = query.into();
    }

    /// Clamped to 1.
    pub fn set_page(&self, page: usize) {
        self.state.borrow_mut().page = page.max(1);
    }

    /// Clamped to 1. Persisted.
    pub fn set_page_size(&self, page_size: usize) {
        self.state.borrow_mut().page_size = page_size.max(1);
        self.persist();
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn items(&self) -> Vec<TodoItem> {
        self.state.borrow().items.clone()
    }

    pub fn get(&self, id: TodoId) -> Option<TodoItem> {
        self.state.borrow().items.iter().find(|item| item.id == id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn next_id(&self) -> TodoId {
        self.state.borrow().next_id
    }

    pub fn filter(&self) -> FilterMode {
        self.state.borrow().filter
    }

    pub fn search_query(&self) -> String {
        self.state.borrow().search_query.clone()
    }

    pub fn page(&self) -> usize {
        self.state.borrow().page
    }

    pub fn page_size(&self) -> usize {
        self.state.borrow().page_size
    }

    pub fn filtered_items(&self) -> Vec<TodoItem> {
        let state = self.state.borrow();
        view::filter_items(&state.items, state.filter, &state.search_query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn page_count(&self) -> usize {
        let state = self.state.borrow();
        let filtered = view::filter_items(&state.items, state.filter, &state.search_query);
        view::page_count(filtered.len(), state.page_size)
    }

    pub fn page_items(&self) -> Vec<TodoItem> {
        let state = self.state.borrow();
        let filtered = view::filter_items(&state.items, state.filter, &state.search_query);
        view::page_slice(&filtered, state.page, state.page_size)
            .iter()
            .map(|item| (*item).clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn flip_completed(&self, id: TodoId) -> Option<bool> {
        let previous = {
            let mut state = self.state.borrow_mut();
            let item = state.items.iter_mut().find(|item| item.id == id)?;
            let previous = item.completed;
            item.completed = !previous;
            previous
        };
        self.persist();
        Some(previous)
    }

    fn restore_completed(&self, id: TodoId, completed: bool) {
        let restored = {
            let mut state = self.state.borrow_mut();
            match state.items.iter_mut().find(|item| item.id == id) {
                Some(item) => {
                    item.completed = completed;
                    true
                }
                None => false,
            }
        };
        if restored {
            self.persist();
        } else {
            debug!(id, "todo removed before toggle failed, nothing to revert");
        }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, StoreError> {
        Ok(self.transport.execute(request).await?)
    }

    async fn fetch_all(&self) -> Result<Vec<TodoItem>, StoreError> {
        let response = self.round_trip(self.client.build_list_todos()).await?;
        let todos = self.client.parse_list_todos(response)?;
        Ok(todos.into_iter().map(TodoItem::from).collect())
    }

    async fn create_remote(&self, text: &str) -> Result<TodoItem, StoreError> {
        let input = CreateTodo {
            todo: text.to_string(),
            completed: false,
            user_id: self.user_id,
        };
        let request = self.client.build_create_todo(&input)?;
        let response = self.round_trip(request).await?;
        Ok(self.client.parse_create_todo(response)?.into())
    }

    async fn update_remote(&self, id: TodoId, update: &UpdateTodo) -> Result<TodoItem, StoreError> {
        let request = self.client.build_update_todo(id, update)?;
        let response = self.round_trip(request).await?;
        Ok(self.client.parse_update_todo(response)?.into())
    }

    async fn send_completed(&self, id: TodoId, completed: bool) -> Result<(), StoreError> {
        let update = UpdateTodo {
            todo: None,
            completed: Some(completed),
        };
        let request = self.client.build_update_todo(id, &update)?;
        let response = self.round_trip(request).await?;
        self.client.parse_update_ack(response)?;
        Ok(())
    }

    async fn delete_remote(&self, id: TodoId) -> Result<(), StoreError> {
        let response = self.round_trip(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)?;
        Ok(())
    }

    fn load(&self) {
        let restored = self.read_persisted().and_then(|persisted| match persisted {
            Some(persisted) => {
                let count = persisted.items.len();
                self.state.borrow_mut().restore(persisted)?;
                Ok(Some(count))
            }
            None => Ok(None),
        });
        match restored {
            Ok(Some(count)) => debug!(key = %self.key, count, "restored persisted todos"),
            Ok(None) => {}
            Err(err) => warn!(key = %self.key, error = %err, "ignoring unreadable persisted state"),
        }
    }

    fn read_persisted(&self) -> Result<Option<PersistedState>, StoreError> {
        let Some(raw) = self.storage.load(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn persist(&self) {
        if let Err(err) = self.write_persisted() {
            warn!(key = %self.key, error = %err, "failed to persist todos");
        }
    }

    fn write_persisted(&self) -> Result<(), StoreError> {
        let snapshot = self.state.borrow().persisted();
        let raw = serde_json::to_string(&snapshot)?;
        self.storage.save(&self.key, &raw)?;
        Ok(())
    }
}
