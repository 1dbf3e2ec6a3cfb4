//! Pull-based sync client.
//!
//! The client never holds authoritative state. It fetches the document,
//! mutates a local copy, and pushes the result back wholesale. Whether to
//! retry a failed push is up to the caller.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::api::{ActivateRequest, ActivateResponse, SESSION_HEADER};
use crate::error::ErrorBody;
use crate::types::*;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server rejected request ({status}): {code}: {msg}")]
    Rejected {
        status: StatusCode,
        code: String,
        msg: String,
    },
}

impl ClientError {
    /// Server error code, if the server answered at all
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { code, .. } => Some(code.as_str()),
            ClientError::Http(_) => None,
        }
    }
}

pub struct SyncClient {
    base_url: String,
    session_id: SessionId,
    /// Set once this session has supplied the correct secret
    unlocked: bool,
    client: reqwest::Client,
}

impl SyncClient {
    /// Client with a freshly generated session id
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_session(base_url, ulid::Ulid::new().to_string())
    }

    pub fn with_session(
        base_url: impl Into<String>,
        session_id: impl Into<SessionId>,
    ) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: session_id.into(),
            unlocked: false,
            client,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Local view of whether this session holds the activation
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Whether this session is the activator according to `doc`
    pub fn is_activator(&self, doc: &ServerState) -> bool {
        crate::activation::is_activator(doc, &self.session_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a success body or turn the error body into `ClientError::Rejected`
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        let (code, msg) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.code, body.msg),
            Err(_) => ("HTTP_ERROR".to_string(), text),
        };
        Err(ClientError::Rejected { status, code, msg })
    }

    /// GET the current document
    pub async fn fetch(&self) -> ClientResult<ServerState> {
        let response = self.client.get(self.url("/api/state")).send().await?;
        Self::decode(response).await
    }

    /// PUT a partial document and get back the merged result
    pub async fn push(&self, patch: &StatePatch) -> ClientResult<ServerState> {
        let response = self
            .client
            .put(self.url("/api/state"))
            .json(patch)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Try the shared secret. A wrong secret is `Ok(false)`, not an error,
    /// and locks this client again.
    pub async fn activate(&mut self, secret: &str) -> ClientResult<bool> {
        let response = self
            .client
            .post(self.url("/api/activate"))
            .header(SESSION_HEADER, &self.session_id)
            .json(&ActivateRequest {
                secret: secret.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(session = %self.session_id, "Activation rejected by server");
            self.unlocked = false;
            return Ok(false);
        }

        let activated: ActivateResponse = Self::decode(response).await?;
        self.unlocked = activated.activated;
        Ok(self.unlocked)
    }

    /// Ask the server to pick
    pub async fn pick(&self) -> ClientResult<PickOutcome> {
        let response = self.client.post(self.url("/api/pick")).send().await?;
        Self::decode(response).await
    }

    /// Fetch, apply `f` to the local copy, and re-persist the list and cooldown.
    ///
    /// Anything another client wrote between the fetch and the push is lost.
    pub async fn mutate<F>(&self, f: F) -> ClientResult<ServerState>
    where
        F: FnOnce(&mut ServerState),
    {
        let mut doc = self.fetch().await?;
        f(&mut doc);
        self.push(&StatePatch {
            restaurants: Some(doc.restaurants),
            cooldown_weeks: Some(doc.cooldown_weeks),
            activated_by: None,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = SyncClient::with_session("http://localhost:6574/", "s1").unwrap();
        assert_eq!(client.url("/api/state"), "http://localhost:6574/api/state");
        assert_eq!(client.session_id(), "s1");
        assert!(!client.is_unlocked());
    }

    #[test]
    fn test_new_generates_distinct_sessions() {
        let a = SyncClient::new("http://localhost").unwrap();
        let b = SyncClient::new("http://localhost").unwrap();
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn test_is_activator_reads_document() {
        let client = SyncClient::with_session("http://localhost", "s1").unwrap();
        let doc = ServerState {
            activated_by: Some("s1".to_string()),
            ..Default::default()
        };
        assert!(client.is_activator(&doc));
        assert!(!client.is_activator(&ServerState::default()));
    }
}
