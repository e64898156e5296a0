//! Domain and wire types for the todo store.
//!
//! # Design
//! `TodoItem` is the local shape the store keeps and persists. `RemoteTodo`
//! mirrors the remote resource's record (`todo` instead of `text`, camelCase
//! `userId`) and is only ever converted at the client boundary. The wire DTOs
//! are defined independently from the mock-server crate; integration tests
//! catch schema drift.

use serde::{Deserialize, Serialize};

/// Identifier of a todo item, assigned by the remote resource or provisioned
/// locally from the store's id counter.
pub type TodoId = u64;

/// A todo item as held by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    /// Owner tag carried through from the remote record.
    pub user_id: u64,
}

/// A todo record as the remote resource serializes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteTodo {
    pub id: TodoId,
    pub todo: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "userId", default)]
    pub user_id: u64,
}

impl From<RemoteTodo> for TodoItem {
    fn from(remote: RemoteTodo) -> Self {
        Self {
            id: remote.id,
            text: remote.todo,
            completed: remote.completed,
            user_id: remote.user_id,
        }
    }
}

/// Envelope returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoList {
    pub todos: Vec<RemoteTodo>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub limit: usize,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub todo: String,
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

/// Request payload for a partial update. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Which items the filtered view keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Completed,
    Pending,
}

impl FilterMode {
    pub fn matches(self, item: &TodoItem) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Completed => item.completed,
            FilterMode::Pending => !item.completed,
        }
    }
}

/// What an operation did to local state. Remote failures are reported here
/// rather than returned as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The remote call succeeded and local state reflects it.
    Applied,
    /// Nothing to do: blank input, unknown id, or the item vanished before
    /// the response arrived. No remote call was needed or its result was
    /// discarded.
    Skipped,
    /// The remote call failed and local state was left as it was.
    Unchanged,
    /// The remote call failed and an optimistic local write was rolled back.
    Reverted,
}
