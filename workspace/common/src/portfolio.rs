use crate::analysis::ImpactfulEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

/// One holding submitted by the user.
///
/// Quantities stay strings end to end: the prediction script is the only
/// consumer that interprets them. Tickers are not required to be unique.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PortfolioEntry {
    /// Stock ticker symbol (e.g., "AAPL")
    pub ticker: String,
    /// Number of shares, as entered
    pub quantity: String,
}

impl PortfolioEntry {
    pub fn new(ticker: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            quantity: quantity.into(),
        }
    }
}

/// Free-text query forwarded to the chatbot and portfolio-generation jobs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct QueryRequest {
    /// User prompt, written verbatim into the job's input file
    #[validate(length(min = 1))]
    pub query: String,
}

/// Request for an AI explanation of one impactful event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct ExplainRequest {
    /// Headline of the event to explain
    #[validate(length(min = 1))]
    pub event: String,
    /// Portfolio the explanation should refer to
    #[serde(default)]
    pub portfolio: Vec<PortfolioEntry>,
    /// Sector predictions (percent) of the current analysis
    #[serde(default)]
    pub sector_predictions: BTreeMap<String, f64>,
}

/// Request for general recommendations on an analysed portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct RecommendationRequest {
    /// Portfolio the recommendations are for
    #[validate(length(min = 1))]
    pub portfolio: Vec<PortfolioEntry>,
    /// Sector predictions (percent) of the current analysis
    #[serde(default)]
    pub sector_predictions: BTreeMap<String, f64>,
    #[serde(default)]
    pub growing_sectors: Vec<String>,
    #[serde(default)]
    pub declining_sectors: Vec<String>,
    /// Impactful events of the current analysis
    #[serde(default)]
    pub events: Vec<ImpactfulEvent>,
}
