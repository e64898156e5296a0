use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_todos, sample_todos, DeletedTodo, Todo, TodoList};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(empty_request("GET", "/todos?limit=0")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let list: TodoList = body_json(resp).await;
    assert!(list.todos.is_empty());
    assert_eq!(list.total, 0);
}

#[tokio::test]
async fn list_todos_limit_zero_returns_everything() {
    let resp = app_with_todos(sample_todos())
        .oneshot(empty_request("GET", "/todos?limit=0"))
        .await
        .unwrap();

    let list: TodoList = body_json(resp).await;
    assert_eq!(list.todos.len(), 5);
    assert_eq!(list.total, 5);
    assert_eq!(list.todos[0].id, 1);
}

#[tokio::test]
async fn list_todos_honours_skip_and_limit() {
    let resp = app_with_todos(sample_todos())
        .oneshot(empty_request("GET", "/todos?limit=2&skip=1"))
        .await
        .unwrap();

    let list: TodoList = body_json(resp).await;
    let ids: Vec<u64> = list.todos.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(list.total, 5);
    assert_eq!(list.skip, 1);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/todos/add",
            r#"{"todo":"Buy milk","completed":false,"userId":5}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 1);
    assert_eq!(todo.todo, "Buy milk");
    assert_eq!(todo.user_id, 5);
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_todo_continues_after_seeded_ids() {
    let resp = app_with_todos(sample_todos())
        .oneshot(json_request("POST", "/todos/add", r#"{"todo":"Next","userId":5}"#))
        .await
        .unwrap();

    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 6);
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/todos/add", r#"{"not_todo":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update ---

#[tokio::test]
async fn update_todo_non_numeric_id_returns_400() {
    let resp = app()
        .oneshot(json_request("PUT", "/todos/not-a-number", r#"{"todo":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/todos/42", r#"{"todo":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_todo_applies_only_present_fields() {
    let resp = app_with_todos(sample_todos())
        .oneshot(json_request("PUT", "/todos/2", r#"{"completed":false}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.todo, "Memorize a poem");
    assert!(!todo.completed);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/todos/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_todo_returns_deleted_record() {
    let resp = app_with_todos(sample_todos())
        .oneshot(empty_request("DELETE", "/todos/3"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: DeletedTodo = body_json(resp).await;
    assert_eq!(deleted.todo.id, 3);
    assert!(deleted.is_deleted);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos/add", r#"{"todo":"Lifecycle","userId":5}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    let uri = format!("/todos/{}", created.id);

    // listed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos?limit=0"))
        .await
        .unwrap();
    let list: TodoList = body_json(resp).await;
    assert_eq!(list.todos, vec![created.clone()]);

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &uri, r#"{"todo":"Renamed","completed":true}"#))
        .await
        .unwrap();
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.todo, "Renamed");
    assert!(updated.completed);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // update after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", &uri, r#"{"completed":false}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());

    // list is empty again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos?limit=0"))
        .await
        .unwrap();
    let list: TodoList = body_json(resp).await;
    assert!(list.todos.is_empty());
}
