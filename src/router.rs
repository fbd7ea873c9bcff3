use crate::handlers::{
    chatbot::{chatbot, generate_portfolio},
    explain::explain_event,
    health::health_check,
    histogram::generate_histogram,
    portfolio::process_portfolio,
    recommendations::recommend_changes,
};
use crate::schemas::{ApiDoc, AppState};
use anyhow::Result;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Extra time allowed on top of the job timeout before a request is cut off
const REQUEST_GRACE: Duration = Duration::from_secs(10);

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(state.settings.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);
    let request_timeout = state.settings.job_timeout() + REQUEST_GRACE;
    let assets = ServeDir::new(&state.settings.assets_dir);

    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Script-backed endpoints
        .route("/api/chatbot", post(chatbot))
        .route("/api/generate-portfolio", post(generate_portfolio))
        .route("/api/generate-histogram", get(generate_histogram))
        .route("/api/portfolio/process", post(process_portfolio))
        // Assistant-backed analysis
        .route("/api/explain", post(explain_event))
        .route("/api/recommendations", post(recommend_changes))
        // Published charts
        .nest_service("/assets", assets)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(cors),
        )
        .with_state(state);

    Ok(router)
}
