// Sales Insights - Web Server
// Report as JSON + FAQ endpoint, with Axum

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use sales_insights::{load_csv, AppConfig, ChangeStatus, SalesReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shared application state (read-only)
#[derive(Clone)]
struct AppState {
    report: Arc<SalesReport>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

#[derive(Deserialize)]
struct FaqQuery {
    #[serde(default)]
    q: String,
}

/// FAQ response
#[derive(Serialize)]
struct FaqResponse {
    question: String,
    answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
}

/// Change section response (status + banner text for the page)
#[derive(Serialize)]
struct ChangeResponse {
    banner: String,
    change: ChangeStatus,
}

fn faq_response(report: &SalesReport, question: String) -> FaqResponse {
    match report.faq.best_match(&question) {
        Some(m) => FaqResponse {
            answer: m.answer.to_string(),
            matched_question: Some(m.question.to_string()),
            score: Some(m.score),
            question,
        },
        None => FaqResponse {
            answer: report.answer(&question).to_string(),
            matched_question: None,
            score: None,
            question,
        },
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/report - Full report
async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.as_ref().clone()))
}

/// GET /api/daily - Daily sales counts
async fn get_daily(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.daily.clone()))
}

/// GET /api/gender - Sales by gender
async fn get_gender(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.gender.clone()))
}

/// GET /api/dayparts - Sales by daypart
async fn get_dayparts(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.dayparts.clone()))
}

/// GET /api/change - Change detection result
async fn get_change(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(ChangeResponse {
        banner: state.report.change_banner(),
        change: state.report.change.clone(),
    }))
}

/// GET /api/faq?q=... - Answer a free-text question
async fn get_faq(State(state): State<AppState>, Query(query): Query<FaqQuery>) -> impl IntoResponse {
    Json(ApiResponse::ok(faq_response(&state.report, query.q)))
}

/// GET /api/ask/:question - Same as /api/faq with the question in the path
async fn get_ask(State(state): State<AppState>, Path(question): Path<String>) -> impl IntoResponse {
    // Decode URL-encoded question
    let decoded = urlencoding::decode(&question)
        .unwrap_or_else(|_| question.clone().into())
        .into_owned();

    Json(ApiResponse::ok(faq_response(&state.report, decoded)))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

fn router(report: SalesReport) -> Router {
    let state = AppState {
        report: Arc::new(report),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/report", get(get_report))
        .route("/daily", get(get_daily))
        .route("/gender", get(get_gender))
        .route("/dayparts", get(get_dayparts))
        .route("/change", get(get_change))
        .route("/faq", get(get_faq))
        .route("/ask/:question", get(get_ask))
        .with_state(state);

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = AppConfig::load().unwrap_or_default();
    let data_path = cfg.data_path_or_default();

    let transactions = match load_csv(&data_path) {
        Ok(t) => t,
        Err(e) => {
            error!(path = %data_path.display(), error = %e, "failed to load sales data");
            return Err(e.into());
        }
    };

    let report = SalesReport::build(&transactions);
    let app = router(report);

    // Start server
    let addr = cfg.server_addr_or_default();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "server running");
    info!("API: http://{}/api/report", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
