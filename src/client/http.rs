//! `reqwest`-backed chat client.

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::config::ChatConfig;

use super::error::ClientError;
use super::types::{ChatRequest, ChatResponse};
use super::ChatClient;

/// Path of the chat endpoint relative to the configured base URL.
const CHAT_PATH: &str = "/api/chat";
/// Longest error body kept in [`ClientError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for `POST {api_url}/api/chat`.
pub struct HttpChatClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpChatClient {
    /// Build a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns an error if the endpoint URL is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: &ChatConfig) -> Result<Self, ClientError> {
        let endpoint = endpoint_url(&config.api_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// The resolved chat endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        debug!(
            session_id = %request.session_id,
            history = request.conversation_history.len(),
            "Sending chat request to {}",
            self.endpoint
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            warn!("Chat backend returned {status}");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}

/// Append the chat path to the base URL, keeping any base path prefix.
fn endpoint_url(api_url: &str) -> Result<Url, url::ParseError> {
    let base = api_url.trim().trim_end_matches('/');
    Url::parse(&format!("{base}{CHAT_PATH}"))
}
