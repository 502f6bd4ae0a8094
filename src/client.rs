//! HTTP client for the chat endpoint.

use async_trait::async_trait;
use url::Url;

use crate::error::{ChatError, Result};
use crate::protocol::{ChatRequest, ChatResponse};

/// Default path of the chat endpoint.
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";

/// Sends one conversation to the backend and returns its answer.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// [`ChatClient`] over `POST {base_url}{chat_path}` with a JSON body.
///
/// No timeout is applied: an endpoint that never answers keeps the request
/// pending.
///
/// # Example
///
/// ```rust,no_run
/// use chat_widget::client::{ChatClient, HttpChatClient};
/// use chat_widget::protocol::ChatRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpChatClient::new("http://localhost:3000", "/api/chat")?;
/// let response = client.send(&ChatRequest::single_turn("Hello!")).await?;
/// println!("{:?}", response.result);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpChatClient {
    /// Create a client for `chat_path` on `base_url`.
    pub fn new(base_url: impl AsRef<str>, chat_path: &str) -> Result<Self> {
        Self::with_client(base_url, chat_path, reqwest::Client::new())
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        chat_path: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let endpoint = Url::parse(base_url.as_ref())?.join(chat_path)?;
        Ok(Self { endpoint, http })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(endpoint = %self.endpoint, "Posting chat request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(ChatResponse::from_slice(&body)?)
    }
}
