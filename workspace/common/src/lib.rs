//! Common transport-layer types shared between the server and the dashboard.
//! These structs mirror the relay endpoints' request/response payloads so the
//! presentation layer can deserialize API responses without duplicating shapes.

mod analysis;
mod portfolio;
mod replies;

pub use analysis::{AnalysisResult, HIGH_RISK_NEGATIVE_THRESHOLD, ImpactfulEvent, RiskLevel};
pub use portfolio::{ExplainRequest, PortfolioEntry, QueryRequest, RecommendationRequest};
pub use replies::{
    ChatbotReply, ExplanationReply, GeneratedPortfolioReply, HistogramReply, PredictionFailure,
    RecommendationReply, RelayFailure,
};
