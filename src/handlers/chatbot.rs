use crate::handlers::failures::{EXECUTION_FAILED, RelayRejection, relay_failure};
use crate::jobs;
use crate::schemas::AppState;
use axum::{extract::State, response::Json};
use axum_valid::Valid;
use common::{ChatbotReply, GeneratedPortfolioReply, QueryRequest, RelayFailure};
use serde_json::Value;
use tracing::{debug, info, instrument, trace};

/// Answer a free-text question about the markets
#[utoipa::path(
    post,
    path = "/api/chatbot",
    tag = "assistant",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Answer produced", body = ChatbotReply),
        (status = 400, description = "Empty query"),
        (status = 422, description = "Missing query"),
        (status = 500, description = "Script failed or produced no answer", body = RelayFailure)
    )
)]
#[instrument(skip(state))]
pub async fn chatbot(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<QueryRequest>>,
) -> Result<Json<ChatbotReply>, RelayRejection> {
    trace!("Entering chatbot function");
    debug!("Chatbot query of {} bytes", request.query.len());

    let job = jobs::CHATBOT.job_with_input(&state.settings, request.query);
    let outcome = state
        .runner
        .run(&job)
        .await
        .map_err(|e| relay_failure(e, EXECUTION_FAILED))?;
    let answer = outcome
        .text()
        .map_err(|e| relay_failure(e, EXECUTION_FAILED))?
        .trim()
        .to_string();

    info!("Chatbot answered in {:?}", outcome.elapsed);
    Ok(Json(ChatbotReply {
        success: true,
        result: answer,
    }))
}

/// Generate a portfolio suggestion from a description
#[utoipa::path(
    post,
    path = "/api/generate-portfolio",
    tag = "assistant",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Portfolio generated", body = GeneratedPortfolioReply),
        (status = 400, description = "Empty query"),
        (status = 422, description = "Missing query"),
        (status = 500, description = "Script failed or produced no portfolio", body = RelayFailure)
    )
)]
#[instrument(skip(state))]
pub async fn generate_portfolio(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<QueryRequest>>,
) -> Result<Json<GeneratedPortfolioReply>, RelayRejection> {
    trace!("Entering generate_portfolio function");

    let job = jobs::GENERATE_PORTFOLIO.job_with_input(&state.settings, request.query);
    let outcome = state
        .runner
        .run(&job)
        .await
        .map_err(|e| relay_failure(e, EXECUTION_FAILED))?;
    let portfolio: Value = outcome
        .json()
        .map_err(|e| relay_failure(e, EXECUTION_FAILED))?;

    info!("Portfolio generated in {:?}", outcome.elapsed);
    Ok(Json(GeneratedPortfolioReply {
        success: true,
        portfolio,
    }))
}
