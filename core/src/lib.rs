//! Client-side todo store reconciling optimistic local state with a remote
//! todo resource.
//!
//! # Overview
//! `TodoStore` owns the in-memory collection, applies local-first mutations,
//! reconciles them with the remote resource, and mirrors a subset of its
//! state to durable storage. Filtering, search and pagination are derived
//! views recomputed on every read.
//!
//! # Design
//! - `TodoClient` is stateless: it builds `HttpRequest` values and parses
//!   `HttpResponse` values without touching the network.
//! - `Transport` executes requests (`ReqwestTransport` in production, scripted
//!   transports in tests); `Storage` holds the persisted subset
//!   (`MemoryStorage`, `FileStorage`).
//! - Remote failures are logged with `tracing` and reported as an `Outcome`,
//!   never returned as errors from store operations.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod storage;
pub mod store;
pub mod transport;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use config::StoreConfig;
pub use error::{ApiError, ConfigError, StorageError, StoreError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use storage::{FileStorage, MemoryStorage, PersistedState, Storage};
pub use store::TodoStore;
pub use transport::{ReqwestTransport, Transport};
pub use types::{CreateTodo, FilterMode, Outcome, RemoteTodo, TodoId, TodoItem, TodoList, UpdateTodo};
