//! Function slots injected into a retrieval engine
//!
//! A retrieval engine consumes the client through two injected async
//! functions: one that embeds a batch of texts and one that completes a
//! prompt. [`EngineHooks`] bundles the pair together with the embedding
//! dimensionality the engine needs to size its vector store.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::client::Client;
use crate::error::Result;

/// Boxed async embedding function: batch of texts in, one vector per text out
pub type EmbeddingFn =
    Arc<dyn Fn(Vec<String>) -> BoxFuture<'static, Result<Vec<Vec<f32>>>> + Send + Sync>;

/// Boxed async completion function: prompt in, model response text out
pub type CompletionFn = Arc<dyn Fn(String) -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// The full boundary a retrieval engine sees
pub struct EngineHooks {
    pub embedding: EmbeddingFn,
    pub completion: CompletionFn,

    /// Dimensionality of the vectors `embedding` produces
    pub embedding_dimensions: usize,
}

impl Client {
    /// Produce the injected function slots for a retrieval engine
    ///
    /// Both slots clone the client, so every call they make is paced against
    /// the same shared budgets as direct callers.
    pub fn hooks(&self) -> EngineHooks {
        let embedding_client = self.clone();
        let completion_client = self.clone();
        let embedding_dimensions = self.config().embedding_dimensions;

        EngineHooks {
            embedding: Arc::new(move |texts: Vec<String>| {
                let client = embedding_client.clone();
                Box::pin(async move { client.embed(&texts).await })
            }),
            completion: Arc::new(move |prompt: String| {
                let client = completion_client.clone();
                Box::pin(async move { client.complete(&prompt).await })
            }),
            embedding_dimensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::config::{CallBudget, ClientConfig};
    use mockito::Server;
    use std::time::Duration;

    #[tokio::test]
    async fn test_hooks_route_through_shared_client() {
        let mut server = Server::new_async().await;
        let _embed_mock = server
            .mock("POST", "/embed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"data\": [{\"embedding\": [0.5, 0.5], \"index\": 0}]}")
            .create_async()
            .await;
        let _chat_mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"choices\": [{\"message\": {\"content\": \"hooked\"}}]}")
            .create_async()
            .await;

        let config = ClientConfig::new(
            format!("{}/embed", server.url()),
            format!("{}/chat", server.url()),
            "test-key",
        )
        .embedding_dimensions(2)
        .embedding_budget(CallBudget::new(1, Duration::from_millis(1)))
        .completion_budget(CallBudget::new(1, Duration::from_millis(1)));

        let hooks = Client::new(config).hooks();
        assert_eq!(hooks.embedding_dimensions, 2);

        let vectors = (hooks.embedding)(vec!["text".to_string()]).await.unwrap();
        assert_eq!(vectors, vec![vec![0.5, 0.5]]);

        let answer = (hooks.completion)("a question".to_string()).await.unwrap();
        assert_eq!(answer, "hooked");
    }
}
