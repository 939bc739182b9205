//! # Client Configuration Module
//!
//! Configuration for the rate-limited remote-call client. Each call type
//! (embedding and completion) carries its own admission settings, since the
//! two endpoints typically have different rate ceilings.
//!
//! The defaults match an Azure OpenAI deployment with a 720 RPM embedding
//! limit and a 1000 RPM completion limit: 2 concurrent embedding calls spaced
//! 90 ms apart (~667 RPM) and 4 concurrent completion calls spaced 60 ms
//! apart (~800 RPM).

use std::time::Duration;

/// Admission settings for one call type
#[derive(Debug, Clone)]
pub struct CallBudget {
    /// Maximum number of simultaneously in-flight calls
    pub max_concurrency: usize,

    /// Minimum elapsed time between successive dispatch starts
    pub min_interval: Duration,
}

impl CallBudget {
    pub fn new(max_concurrency: usize, min_interval: Duration) -> Self {
        Self {
            max_concurrency,
            min_interval,
        }
    }
}

/// Configuration for the rate-limited client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the embeddings endpoint
    pub embed_url: String,

    /// Full URL of the chat-completions endpoint
    pub completion_url: String,

    /// API key, sent as the `api-key` request header
    pub api_key: String,

    /// Dimensionality of the embedding vectors
    pub embedding_dimensions: usize,

    /// Admission settings for embedding calls
    pub embedding_budget: CallBudget,

    /// Admission settings for completion calls
    pub completion_budget: CallBudget,

    /// Maximum number of dispatch attempts under sustained throttling
    pub max_attempts: u32,
}

impl ClientConfig {
    /// Create a configuration with default budgets for the given endpoints
    pub fn new(
        embed_url: impl Into<String>,
        completion_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            embed_url: embed_url.into(),
            completion_url: completion_url.into(),
            api_key: api_key.into(),
            embedding_dimensions: 3072,
            embedding_budget: CallBudget::new(2, Duration::from_millis(90)),
            completion_budget: CallBudget::new(4, Duration::from_millis(60)),
            max_attempts: 5,
        }
    }

    /// Create a configuration from environment variables
    ///
    /// Reads `RAGDIFF_EMBED_URL`, `RAGDIFF_COMPLETION_URL`, and
    /// `AZURE_OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        let embed_url = std::env::var("RAGDIFF_EMBED_URL")
            .expect("RAGDIFF_EMBED_URL environment variable must be set");
        let completion_url = std::env::var("RAGDIFF_COMPLETION_URL")
            .expect("RAGDIFF_COMPLETION_URL environment variable must be set");
        let api_key = std::env::var("AZURE_OPENAI_API_KEY")
            .expect("AZURE_OPENAI_API_KEY environment variable must be set");
        Self::new(embed_url, completion_url, api_key)
    }

    /// Set the embedding dimensionality
    pub fn embedding_dimensions(mut self, dimensions: usize) -> Self {
        self.embedding_dimensions = dimensions;
        self
    }

    /// Set the embedding admission budget
    pub fn embedding_budget(mut self, budget: CallBudget) -> Self {
        self.embedding_budget = budget;
        self
    }

    /// Set the completion admission budget
    pub fn completion_budget(mut self, budget: CallBudget) -> Self {
        self.completion_budget = budget;
        self
    }

    /// Set the maximum number of dispatch attempts
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}
