//! In-process emulation of the dummyjson todo resource.
//!
//! Serves the same routes and record shape as `https://dummyjson.com/todos`
//! so the store can be exercised end-to-end without touching the public API.
//! Unlike the public service, created todos are actually kept and later
//! updates/deletes are applied to them.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub todo: String,
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

/// Envelope returned by `GET /todos`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TodoList {
    pub todos: Vec<Todo>,
    pub total: usize,
    pub skip: usize,
    pub limit: usize,
}

/// Body returned by `DELETE /todos/{id}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeletedTodo {
    #[serde(flatten)]
    pub todo: Todo,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
}

#[derive(Deserialize)]
pub struct CreateTodo {
    pub todo: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub todo: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListParams {
    /// `0` (or absent) means "no limit".
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

#[derive(Debug)]
pub struct MockDb {
    todos: BTreeMap<u64, Todo>,
    next_id: u64,
}

impl MockDb {
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            todos: todos.into_iter().map(|t| (t.id, t)).collect(),
            next_id,
        }
    }
}

pub type Db = Arc<RwLock<MockDb>>;

/// An empty todo resource.
pub fn app() -> Router {
    app_with_todos(Vec::new())
}

/// A todo resource pre-populated with `todos`. New ids continue after the
/// highest seeded id.
pub fn app_with_todos(todos: Vec<Todo>) -> Router {
    let db: Db = Arc::new(RwLock::new(MockDb::with_todos(todos)));
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/add", post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

/// A handful of records shaped like the public API's fixtures.
pub fn sample_todos() -> Vec<Todo> {
    [
        (1, "Do something nice for someone you care about", false, 152),
        (2, "Memorize a poem", true, 13),
        (3, "Watch a classic movie", true, 68),
        (4, "Watch a documentary", false, 84),
        (5, "Invest in cryptocurrency", false, 163),
    ]
    .into_iter()
    .map(|(id, todo, completed, user_id)| Todo {
        id,
        todo: todo.to_string(),
        completed,
        user_id,
    })
    .collect()
}

async fn list_todos(State(db): State<Db>, Query(params): Query<ListParams>) -> Json<TodoList> {
    let db = db.read().await;
    let total = db.todos.len();
    let take = if params.limit == 0 { total } else { params.limit };
    let todos: Vec<Todo> = db
        .todos
        .values()
        .skip(params.skip)
        .take(take)
        .cloned()
        .collect();
    tracing::debug!(count = todos.len(), total, "list todos");
    Json(TodoList {
        limit: todos.len(),
        todos,
        total,
        skip: params.skip,
    })
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> (StatusCode, Json<Todo>) {
    let mut db = db.write().await;
    let todo = Todo {
        id: db.next_id,
        todo: input.todo,
        completed: input.completed,
        user_id: input.user_id,
    };
    db.next_id += 1;
    db.todos.insert(todo.id, todo.clone());
    tracing::debug!(id = todo.id, "created todo");
    (StatusCode::CREATED, Json(todo))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut db = db.write().await;
    let todo = db.todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(text) = input.todo {
        todo.todo = text;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    tracing::debug!(id, "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<DeletedTodo>, StatusCode> {
    let mut db = db.write().await;
    let todo = db.todos.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    tracing::debug!(id, "deleted todo");
    Ok(Json(DeletedTodo {
        todo,
        is_deleted: true,
    }))
}
