//! Model provider boundary.
//!
//! A provider takes one request (model, instruction, user content, optional
//! response schema or search augmentation) and returns text. Retry policy is
//! not its concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An image sent inline with the user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

/// A single generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub user_text: String,
    pub images: Vec<InlineImage>,
    /// JSON schema for a schema-constrained response.
    pub response_schema: Option<serde_json::Value>,
    /// Ground the answer with web search. Incompatible with `response_schema`.
    pub search_augmentation: bool,
    pub thinking_budget: Option<u32>,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            user_text: user_text.into(),
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_images(mut self, images: Vec<InlineImage>) -> Self {
        self.images = images;
        self
    }

    pub fn with_response_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_search_augmentation(mut self) -> Self {
        self.search_augmentation = true;
        self
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    /// Rejects requests the provider cannot serve.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "model identifier is empty".to_string(),
            ));
        }
        if self.search_augmentation && self.response_schema.is_some() {
            return Err(ProviderError::InvalidRequest(
                "response schema and search augmentation cannot be combined".to_string(),
            ));
        }
        Ok(())
    }
}

/// A web source the model grounded its answer on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub text: String,
    pub grounding: Vec<GroundingSource>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            grounding: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("No API key configured for the model provider")]
    MissingCredential,

    #[error("Provider request failed{}: {message}", http_status_suffix(status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("Provider returned no content")]
    EmptyResponse,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }
}

fn http_status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

/// The external model, treated as a black box.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Sends one request and returns the response text.
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError>;
}
