//! LightRAG runner
//!
//! Drives an already-indexed LightRAG API server through its `/query`
//! endpoint, running every benchmark question in each of the four retrieval
//! modes. A failed query is recorded as an `ERROR: …` cell rather than
//! aborting the run, so a single bad mode never costs a whole benchmark.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::report::{EngineRun, elapsed_secs};

/// Retrieval modes LightRAG is queried in, in run order
pub const LIGHTRAG_MODES: [&str; 4] = ["naive", "local", "global", "hybrid"];

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    response: String,
}

/// Client for a running LightRAG API server
pub struct LightRagRunner {
    http: reqwest::Client,
    base_url: String,
}

impl LightRagRunner {
    /// Create a runner for the server at `base_url`
    ///
    /// No request timeout is set: global-mode queries over a large corpus can
    /// legitimately run for minutes.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Run one question in one mode
    #[instrument(skip(self, question), level = "debug")]
    pub async fn query(&self, question: &str, mode: &str) -> Result<String> {
        let request = QueryRequest {
            query: question,
            mode,
        };
        let response = self
            .http
            .post(format!("{}/query", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            return Err(Error::Engine(format!(
                "lightrag server returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: QueryResponse = serde_json::from_str(&body).map_err(|e| {
            Error::UnexpectedResponse(format!("Failed to parse lightrag response: {}", e))
        })?;
        Ok(parsed.response)
    }

    /// Run every question through every mode, timing each query
    pub async fn run(&self, questions: &[&str]) -> EngineRun {
        info!("Running {} questions through LightRAG", questions.len());
        let mut results = EngineRun::new();

        for question in questions {
            for mode in LIGHTRAG_MODES {
                info!(mode, question = question.chars().take(70).collect::<String>().as_str(), "querying LightRAG");
                let start = Instant::now();
                let answer = match self.query(question, mode).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        warn!(mode, "LightRAG query failed: {}", e);
                        format!("ERROR: {}", e)
                    }
                };
                let seconds = elapsed_secs(start);
                info!(mode, seconds, answer_chars = answer.len(), "LightRAG answered");
                results.record(question, mode, answer, seconds);
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_query_returns_response_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"response\": \"Sun Wukong is the Monkey King.\"}")
            .expect(1)
            .create_async()
            .await;

        let runner = LightRagRunner::new(server.url());
        let answer = runner.query("Who is Sun Wukong?", "hybrid").await.unwrap();
        assert_eq!(answer, "Sun Wukong is the Monkey King.");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_becomes_engine_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/query")
            .with_status(500)
            .with_body("storage not initialized")
            .create_async()
            .await;

        let runner = LightRagRunner::new(server.url());
        let result = runner.query("Who is Sun Wukong?", "naive").await;
        assert!(matches!(result, Err(Error::Engine(_))));
    }

    #[tokio::test]
    async fn test_run_records_errors_and_continues() {
        let mut server = Server::new_async().await;
        // Every mode fails; the run must still produce a full grid.
        let _mock = server
            .mock("POST", "/query")
            .with_status(503)
            .with_body("unavailable")
            .expect(4)
            .create_async()
            .await;

        let runner = LightRagRunner::new(server.url());
        let results = runner.run(&["only question"]).await;

        assert_eq!(results.len(), LIGHTRAG_MODES.len());
        for mode in LIGHTRAG_MODES {
            let record = results.get("only question", mode).unwrap();
            assert!(record.answer.starts_with("ERROR:"), "{}", record.answer);
        }
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let runner = LightRagRunner::new("http://localhost:9621/");
        assert_eq!(runner.base_url, "http://localhost:9621");
    }
}
