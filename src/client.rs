//! # Rate-Limited Remote-Call Client
//!
//! This module provides the client used to issue embedding and
//! chat-completion requests against an OpenAI-compatible endpoint while
//! staying under a requests-per-minute ceiling.
//!
//! ## Key Components
//!
//! - `Client`: the rate-limited client with `embed` and `complete` operations
//! - `RateBudget`: per-call-type concurrency cap and pacing interval
//! - `EngineHooks`: boxed function slots handed to a retrieval engine
//!
//! ## Behavior
//!
//! Each call type (embedding vs. completion) owns an independent budget: a
//! concurrency cap on in-flight dispatches and a minimum spacing between
//! successive dispatch starts. Throttling responses (HTTP 429) are absorbed
//! transparently with server-suggested or exponential backoff, up to a fixed
//! attempt ceiling; any other error surfaces immediately. Backoff sleeps
//! happen with the concurrency slot released, so a throttled caller never
//! starves the rest.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

pub mod budget;
pub mod hooks;
mod types;

pub use budget::RateBudget;
pub use hooks::{CompletionFn, EmbeddingFn, EngineHooks};

use types::{
    ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse,
};

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which remote endpoint a call targets
///
/// The two endpoints have separate rate ceilings, so each kind owns its own
/// budget and last-dispatch timestamp.
#[derive(Debug, Clone, Copy)]
enum CallKind {
    Embedding,
    Completion,
}

/// Rate-limited client for an OpenAI-compatible inference endpoint
///
/// Clones share the underlying budgets, so all callers of a call type are
/// paced together regardless of how many handles exist.
#[derive(Clone)]
pub struct Client {
    http: ReqwestClient,
    config: ClientConfig,
    embedding_budget: RateBudget,
    completion_budget: RateBudget,
}

impl Client {
    /// Create a new client from a configuration
    pub fn new(config: ClientConfig) -> Self {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let embedding_budget = RateBudget::new(
            config.embedding_budget.max_concurrency,
            config.embedding_budget.min_interval,
        );
        let completion_budget = RateBudget::new(
            config.completion_budget.max_concurrency,
            config.completion_budget.min_interval,
        );

        Self {
            http,
            config,
            embedding_budget,
            completion_budget,
        }
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Embed a batch of texts
    ///
    /// Returns one vector per input text, in input order, each with the
    /// configured dimensionality.
    #[instrument(skip(self, texts), fields(batch = texts.len()), level = "debug")]
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(Error::InvalidRequest("embedding batch is empty".to_string()));
        }

        let request = EmbeddingRequest { input: texts };
        let response: EmbeddingResponse = self.call(CallKind::Embedding, &request).await?;

        let mut data = response.data;
        data.sort_by_key(|item| item.index);

        if data.len() != texts.len() {
            return Err(Error::UnexpectedResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }
        for item in &data {
            if item.embedding.len() != self.config.embedding_dimensions {
                return Err(Error::UnexpectedResponse(format!(
                    "expected {}-dimensional embedding, got {}",
                    self.config.embedding_dimensions,
                    item.embedding.len()
                )));
            }
        }

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }

    /// Generate a completion for a single prompt
    #[instrument(skip(self, prompt), level = "debug")]
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.is_empty() {
            return Err(Error::InvalidRequest("prompt is empty".to_string()));
        }

        let request = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response: ChatResponse = self.call(CallKind::Completion, &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                Error::UnexpectedResponse("completion response has no choices".to_string())
            })
    }

    /// Shared retry loop for both call types
    ///
    /// Throttling retries up to the attempt ceiling, waiting out the
    /// server-suggested duration when one was given and `2^attempt` seconds
    /// otherwise. Every other error is terminal for this invocation.
    async fn call<T, B>(&self, kind: CallKind, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let (budget, url) = match kind {
            CallKind::Embedding => (&self.embedding_budget, &self.config.embed_url),
            CallKind::Completion => (&self.completion_budget, &self.config.completion_url),
        };

        let mut attempt: u32 = 0;
        loop {
            // The permit is scoped to the dispatch: it is dropped before any
            // backoff sleep so the cap only governs in-flight request density.
            let outcome = {
                let _permit = budget.admit().await?;
                self.dispatch(url, body).await
            };

            match outcome {
                Err(Error::Throttled { retry_after_secs }) => {
                    let wait_secs = retry_after_secs.unwrap_or_else(|| 2u64.pow(attempt));
                    attempt += 1;
                    if attempt >= self.config.max_attempts {
                        return Err(Error::RetriesExhausted {
                            attempts: attempt,
                            last_wait_secs: wait_secs,
                        });
                    }
                    warn!(
                        ?kind,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        wait_secs,
                        "throttled by endpoint, backing off"
                    );
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                }
                other => return other,
            }
        }
    }

    /// Perform a single dispatch and classify the response
    async fn dispatch<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        debug!("Sending POST request to {}", url);
        let response = self
            .http
            .post(url)
            .header("api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(Error::Throttled { retry_after_secs });
        }

        let response_text = response.text().await.map_err(Error::Http)?;

        if status.is_success() {
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                Error::UnexpectedResponse(format!("Failed to parse response: {}", e))
            })
        } else {
            error!("API error: {} - {}", status, response_text);
            Err(Error::Api {
                status_code: status.as_u16(),
                message: response_text,
            })
        }
    }
}
