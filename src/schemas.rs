use crate::assistant::AssistantClient;
use crate::config::Settings;
use chrono::{DateTime, Utc};
use common::{
    AnalysisResult, ChatbotReply, ExplainRequest, ExplanationReply, GeneratedPortfolioReply,
    HistogramReply, ImpactfulEvent, PortfolioEntry, PredictionFailure, QueryRequest,
    RecommendationReply, RecommendationRequest, RelayFailure,
};
use relay::JobRunner;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Runs the analysis scripts
    pub runner: JobRunner,
    /// `None` while no API key is configured
    pub assistant: Option<AssistantClient>,
    /// Most recent successful portfolio analysis, input of the histogram job
    pub latest_result: Arc<RwLock<Option<Value>>>,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Whether each job script is present
    pub scripts: BTreeMap<String, bool>,
    /// Whether event explanations are available
    pub assistant_configured: bool,
    pub checked_at: DateTime<Utc>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::chatbot::chatbot,
        crate::handlers::chatbot::generate_portfolio,
        crate::handlers::histogram::generate_histogram,
        crate::handlers::portfolio::process_portfolio,
        crate::handlers::explain::explain_event,
        crate::handlers::recommendations::recommend_changes,
    ),
    components(
        schemas(
            HealthResponse,
            QueryRequest,
            PortfolioEntry,
            ExplainRequest,
            RecommendationRequest,
            AnalysisResult,
            ImpactfulEvent,
            ChatbotReply,
            GeneratedPortfolioReply,
            HistogramReply,
            ExplanationReply,
            RecommendationReply,
            RelayFailure,
            PredictionFailure,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "assistant", description = "Chatbot and portfolio generation"),
        (name = "analysis", description = "Portfolio analysis and charts"),
    ),
    info(
        title = "SectorLens API",
        description = "Portfolio sector-risk analysis: relays requests to the analysis scripts explains market events and suggests portfolio changes",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
