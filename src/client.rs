// File: src/client.rs
pub mod cert;
pub mod core;

pub use self::core::RestClient;

use crate::model::{Event, EventDraft, EventId};
use async_trait::async_trait;
use http::StatusCode;
use thiserror::Error;

/// Path of the event collection, relative to the configured server origin.
pub const EVENTS_PATH: &str = "/api/events";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: http::uri::InvalidUri,
    },
    #[error("could not build request: {0}")]
    Request(#[from] http::Error),
    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("could not read response body: {0}")]
    Body(String),
    #[error("server answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("tls setup failed: {0}")]
    Tls(String),
    #[error("no connection to the server: {0}")]
    Unavailable(String),
}

/// The remote collection. One method per endpoint.
#[async_trait]
pub trait EventApi: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError>;

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError>;

    async fn update_event(&self, id: &EventId, draft: &EventDraft) -> Result<Event, ApiError>;

    /// The response body is ignored; only the status matters.
    async fn delete_event(&self, id: &EventId) -> Result<(), ApiError>;
}
