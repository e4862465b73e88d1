//! Embedding generation via the OpenAI embeddings API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::BaseEmbeddingService;

/// Dimension of the vectors produced by text-embedding-3-small. The embedding
/// columns are declared vector(1536), so any other dimension is rejected here
/// rather than at the database.
pub const EMBEDDING_DIM: usize = 1536;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const INPUT_PREVIEW_LEN: usize = 50;

/// Embedding provider failure. Never fatal to a reindex run: the caller logs
/// it and skips the record. Each variant carries a short preview of the
/// offending input for diagnostics.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Transport failure (connection, timeout, TLS)
    #[error("Network error for input '{preview}...': {message}")]
    Network { preview: String, message: String },

    /// Non-2xx response (auth failure, rate limit, invalid input)
    #[error("API error {status} for input '{preview}...': {body}")]
    Api {
        status: u16,
        preview: String,
        body: String,
    },

    /// Malformed or dimensionally wrong response
    #[error("Parse error for input '{preview}...': {message}")]
    Parse { preview: String, message: String },
}

/// First ~50 characters of an embedding input, for error context.
pub fn input_preview(text: &str) -> String {
    text.chars().take(INPUT_PREVIEW_LEN).collect()
}

/// Replace newlines with spaces before submission. The provider treats raw
/// newlines as token boundaries, which skews the embedding.
pub fn normalize_embedding_input(text: &str) -> String {
    text.replace('\n', " ")
}

/// Embedding service backed by the OpenAI embeddings API.
pub struct EmbeddingService {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingService {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl BaseEmbeddingService for EmbeddingService {
    async fn generate(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = normalize_embedding_input(text);
        let preview = input_preview(&input);

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&EmbeddingRequest {
                model: self.model.clone(),
                input,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::Network {
                preview: preview.clone(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status,
                preview,
                body,
            });
        }

        let embedding_response: EmbeddingResponse =
            response.json().await.map_err(|e| EmbeddingError::Parse {
                preview: preview.clone(),
                message: e.to_string(),
            })?;

        let embedding = embedding_response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Parse {
                preview: preview.clone(),
                message: "No embedding returned".to_string(),
            })?
            .embedding;

        if embedding.len() != EMBEDDING_DIM {
            return Err(EmbeddingError::Parse {
                preview,
                message: format!(
                    "Invalid embedding dimension: expected {}, got {}",
                    EMBEDDING_DIM,
                    embedding.len()
                ),
            });
        }

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newlines_are_replaced_with_spaces() {
        let input = "Title: Welder\nDescription: MIG and TIG\nwork on site";
        let normalized = normalize_embedding_input(input);

        assert!(!normalized.contains('\n'));
        assert_eq!(normalized, "Title: Welder Description: MIG and TIG work on site");
    }

    #[test]
    fn normalization_leaves_plain_text_alone() {
        assert_eq!(normalize_embedding_input("no newlines here"), "no newlines here");
    }

    #[test]
    fn preview_truncates_long_input() {
        let long = "x".repeat(300);
        assert_eq!(input_preview(&long).len(), 50);
    }

    #[test]
    fn preview_keeps_short_input_whole() {
        assert_eq!(input_preview("short"), "short");
    }

    #[test]
    fn error_display_carries_the_preview() {
        let err = EmbeddingError::Api {
            status: 429,
            preview: "Title: Welder. Description:".to_string(),
            body: "rate limited".to_string(),
        };
        let message = err.to_string();

        assert!(message.contains("429"));
        assert!(message.contains("Title: Welder"));
    }

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_generate_embedding() {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let service = EmbeddingService::new(api_key, "text-embedding-3-small".to_string());

        let embedding = service
            .generate("Title: Welder. Description: MIG and TIG work in Dammam")
            .await
            .expect("Failed to generate embedding");

        assert_eq!(embedding.len(), 1536);
        println!("Generated embedding with {} dimensions", embedding.len());
    }
}
