//! Generator boundary and request identity

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_content::ContentAddresser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{GeneratorError, Result};

/// What the provider is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    DocumentAnalysis,
    Summary,
    Flashcards,
    Quiz,
    InterviewQuestions,
    InterviewFeedback,
}

/// A request to a content generator
///
/// Everything that influences the output belongs in here; two requests that
/// serialize identically are considered interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub kind: GenerationKind,
    /// Source material: document text, CV, or the interview transcript
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
}

impl GenerationRequest {
    pub fn new(kind: GenerationKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
            instructions: None,
            model: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(GeneratorError::InvalidRequest(
                "input must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Provider output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub provider: String,
    /// Structured result as returned by the provider
    pub body: Value,
    pub generated_at: DateTime<Utc>,
}

/// An AI provider producing study material
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Stable provider name, part of the cache key
    fn provider(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent>;
}

/// Deterministic cache key for `request` sent to `provider`.
///
/// The request is fingerprinted in canonical key order, so parameter maps
/// built in different orders yield the same key.
pub fn cache_key(provider: &str, request: &GenerationRequest) -> Result<String> {
    let fingerprint = ContentAddresser::new().fingerprint(provider, request)?;
    Ok(fingerprint.into_string())
}
