use crate::config::AssistantSettings;
use common::{ExplainRequest, PortfolioEntry, RecommendationRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument, trace};

pub const NO_EXPLANATION: &str = "No explanation available.";
pub const NO_RECOMMENDATIONS: &str = "No recommendations available.";

/// Error types for the assistant client
#[derive(Error, Debug)]
pub enum AssistantError {
    /// The request could not be sent or the reply could not be read
    #[error("Assistant request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Assistant API returned status {status}")]
    Upstream { status: u16 },
}

/// Client for the chat-completion API that explains market events and
/// suggests portfolio changes.
#[derive(Clone)]
pub struct AssistantClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl fmt::Debug for AssistantClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: u8,
    stream: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl AssistantClient {
    /// Build a client, or `None` when no API key is configured.
    pub fn from_settings(settings: &AssistantSettings) -> Result<Option<Self>, AssistantError> {
        let Some(api_key) = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .user_agent(concat!("sectorlens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Some(Self {
            http,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key: api_key.to_string(),
        }))
    }

    /// Ask the model how `request.event` affects the portfolio.
    #[instrument(skip(self, request), fields(event = %request.event))]
    pub async fn explain(&self, request: &ExplainRequest) -> Result<String, AssistantError> {
        self.complete(&explain_prompt(request), NO_EXPLANATION).await
    }

    /// Ask the model for general recommendations on the analysed portfolio.
    #[instrument(skip(self, request), fields(entries = request.portfolio.len()))]
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<String, AssistantError> {
        self.complete(&recommendation_prompt(request), NO_RECOMMENDATIONS)
            .await
    }

    /// Send a single-message completion; `fallback` stands in for an empty reply.
    async fn complete(&self, prompt: &str, fallback: &str) -> Result<String, AssistantError> {
        trace!("Assistant prompt: {}", prompt);

        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0,
            stream: false,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Assistant API answered with status {}", status);
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
            });
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty());

        match content {
            Some(content) => {
                debug!("Assistant replied with {} bytes", content.len());
                Ok(strip_heading(&content))
            }
            None => {
                debug!("Assistant reply carried no content");
                Ok(fallback.to_string())
            }
        }
    }
}

fn portfolio_summary(portfolio: &[PortfolioEntry]) -> String {
    portfolio
        .iter()
        .map(|entry| format!("{} ({} shares)", entry.ticker, entry.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

fn sector_summary(predictions: &BTreeMap<String, f64>) -> String {
    predictions
        .iter()
        .map(|(sector, prediction)| format!("{}: {:.2}%", sector, prediction))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt sent for one event.
pub fn explain_prompt(request: &ExplainRequest) -> String {
    format!(
        "Explain how the event \"{}\" might impact the portfolio and the sectors. \
         The portfolio contains the following assets: {}. \
         The sector predictions are as follows: {}.",
        request.event,
        portfolio_summary(&request.portfolio),
        sector_summary(&request.sector_predictions)
    )
}

/// Prompt sent for portfolio recommendations.
pub fn recommendation_prompt(request: &RecommendationRequest) -> String {
    let events = request
        .events
        .iter()
        .map(|event| format!("Event: \"{}\" with an impact of {:.2}%", event.event, event.impact))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on the following portfolio, sector predictions, and recent events, \
         provide general investment recommendations:\n\
         Portfolio: {}.\n\
         Sector Predictions: {}.\n\
         Growing Sectors: {}.\n\
         Declining Sectors: {}.\n\
         Recent Events:\n{}.",
        portfolio_summary(&request.portfolio),
        sector_summary(&request.sector_predictions),
        request.growing_sectors.join(", "),
        request.declining_sectors.join(", "),
        events
    )
}

/// Drop the first two lines, where the model repeats a heading.
pub fn strip_heading(content: &str) -> String {
    content.split('\n').skip(2).collect::<Vec<_>>().join("\n")
}
