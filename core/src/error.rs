//! Error types for the todo store.
//!
//! # Design
//! `ApiError` covers everything that can go wrong interpreting a response
//! (status, body decoding) or encoding a request. `NotFound` gets a dedicated
//! variant because callers frequently distinguish "the resource does not
//! exist" from "the server returned an unexpected status." `TransportError`
//! is reserved for failures to complete the round-trip at all.
//!
//! `StoreError` unifies these for the store's internal plumbing. The store's
//! public operations never return it: failures are logged and folded into an
//! `Outcome`.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// The request never produced a response (connection, DNS, body read).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("reading response body failed: {0}")]
    Body(String),

    #[error("transport setup failed: {0}")]
    Setup(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("persisted state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An id so large the counter cannot move past it.
    #[error("todo id {0} leaves no room for the id counter")]
    IdOverflow(u64),
}

impl StoreError {
    /// True when the response arrived but its body could not be decoded or
    /// carried an unusable id.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            StoreError::Api(ApiError::DeserializationError(_)) | StoreError::IdOverflow(_)
        )
    }
}
