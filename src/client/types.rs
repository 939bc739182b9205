//! Wire types for the OpenAI-compatible embeddings and chat endpoints

use serde::{Deserialize, Serialize};

/// Request body for the embeddings endpoint
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub input: &'a [String],
}

/// Response body for the embeddings endpoint
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingItem>,
}

/// One embedding vector, tagged with its position in the input batch
#[derive(Debug, Deserialize)]
pub struct EmbeddingItem {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: Vec<ChatMessage<'a>>,
}

/// A single chat message
#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Response body for the chat-completions endpoint
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: String,
}
