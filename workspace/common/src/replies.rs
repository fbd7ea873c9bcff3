use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Success envelope of the chatbot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ChatbotReply {
    pub success: bool,
    /// Answer text with surrounding whitespace trimmed
    pub result: String,
}

/// Success envelope of the portfolio-generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GeneratedPortfolioReply {
    pub success: bool,
    /// Portfolio document exactly as produced by the generation job
    #[schema(value_type = Object)]
    pub portfolio: serde_json::Value,
}

/// Success envelope of the histogram endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HistogramReply {
    pub success: bool,
    pub message: String,
}

/// Success envelope of the explanation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExplanationReply {
    pub success: bool,
    pub explanation: String,
}

/// Success envelope of the recommendations endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RecommendationReply {
    pub success: bool,
    pub recommendations: String,
}

/// Failure envelope shared by every enveloped relay endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RelayFailure {
    /// Always false
    pub success: bool,
    /// Best-effort error message
    pub error: String,
    /// Extra context, typically the job's stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RelayFailure {
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
        }
    }
}

/// Failure body of the portfolio-processing endpoint, which is not enveloped.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PredictionFailure {
    pub error: String,
}

impl PredictionFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
