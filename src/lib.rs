//! # ragdiff - LightRAG vs GraphRAG comparison harness
//!
//! This crate benchmarks two retrieval-augmented-generation systems over a
//! fixed corpus and question set: LightRAG (a lightweight graph retriever,
//! queried through its API server) and Microsoft GraphRAG (a
//! community-detection retriever, queried through its CLI). Both engines are
//! external and unmodified; this crate supplies the plumbing around them.
//!
//! ## Features
//!
//! - Rate-limited embedding and completion client with throttle-aware retry,
//!   independent per-call-type concurrency caps and pacing intervals
//! - Injectable function slots (`EngineHooks`) for a retrieval engine that
//!   wants to call back into the rate-limited client
//! - Runners for both engines that record answer text and latency per
//!   question and retrieval mode, tolerating per-query failures
//! - Bulk loader for GraphRAG's exported entity/relationship/community
//!   tables into Neo4j
//! - JSON persistence of per-engine and combined comparison results
//!
//! ## Example
//!
//! ```rust,no_run
//! use ragdiff::client::Client;
//! use ragdiff::config::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new(
//!         "https://example.openai.azure.com/openai/deployments/embed/embeddings",
//!         "https://example.openai.azure.com/openai/deployments/chat/chat/completions",
//!         "api-key",
//!     );
//!     let client = Client::new(config);
//!
//!     let vectors = client.embed(&["some text".to_string()]).await?;
//!     println!("embedded into {} dimensions", vectors[0].len());
//!     Ok(())
//! }
//! ```

mod error;

pub mod client;
pub mod config;
pub mod graph_store;
pub mod graphrag;
pub mod lightrag;
pub mod questions;
pub mod report;

pub use error::{Error, Result};

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::client::{Client, EngineHooks};
    pub use crate::config::{CallBudget, ClientConfig};
    pub use crate::error::{Error, Result};
}
