//! Request/response exchange with the chat backend.
//!
//! The backend is an opaque boundary: one `POST {api_url}/api/chat` per turn,
//! no authentication and no retries. Callers decide what to do on failure.

pub mod error;
pub mod http;
pub mod types;

pub use error::ClientError;
pub use http::HttpChatClient;
pub use types::{ChatRequest, ChatResponse, Link};

use std::sync::Arc;

use async_trait::async_trait;

/// Performs one backend exchange.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send a turn and wait for the reply.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or a
    /// malformed body.
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;
}

#[async_trait]
impl<T: ChatClient + ?Sized> ChatClient for Arc<T> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        (**self).send(request).await
    }
}
