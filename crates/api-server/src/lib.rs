//! HTTP API over the corporation registry, statement normalization and
//! narrative analysis.

pub mod analysis_routes;
pub mod company_routes;
pub mod financial_routes;
pub mod statement_cache;


use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use corp_registry::RegistryStore;
use dart_core::{DartError, NarrativeGenerator, StatementSource};
use gemini_client::{GeminiClient, GeminiConfig};
use opendart_client::OpenDartClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use statement_cache::StatementCache;

/// How long a normalized statement is served from memory.
pub const STATEMENT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct AppState {
    pub store: RegistryStore,
    pub statements: Arc<dyn StatementSource>,
    /// `None` when no generator is configured; analysis requests get 503.
    pub narrator: Option<Arc<dyn NarrativeGenerator>>,
    pub statement_cache: Arc<StatementCache>,
}

impl AppState {
    pub fn new(
        store: RegistryStore,
        statements: Arc<dyn StatementSource>,
        narrator: Option<Arc<dyn NarrativeGenerator>>,
    ) -> Self {
        Self {
            store,
            statements,
            narrator,
            statement_cache: Arc::new(StatementCache::new(STATEMENT_CACHE_TTL)),
        }
    }
}

/// JSON envelope used by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    /// The registry or the narrative service failed or reported an error.
    Upstream(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AppError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<DartError> for AppError {
    fn from(err: DartError) -> Self {
        if err.is_not_found() {
            return match err {
                DartError::Source { message, .. } => AppError::NotFound(message),
                other => AppError::NotFound(other.to_string()),
            };
        }

        match err {
            DartError::InvalidRequest(msg) => AppError::BadRequest(msg),
            // Registry messages are passed through untouched
            DartError::Source { message, .. } => AppError::Upstream(message),
            DartError::Api(msg) => AppError::Upstream(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, msg)
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
}

impl Config {
    /// `DATABASE_URL`, `BIND_ADDR`, `PORT`
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a number, got '{}'", p))?,
            Err(_) => 5000,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:corpcode.db".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        company_routes::search_company,
        company_routes::get_company,
        financial_routes::financial_data,
        financial_routes::available_years,
        financial_routes::report_types,
        analysis_routes::ai_analysis,
    ),
    tags(
        (name = "Companies", description = "Corporation registry lookups"),
        (name = "Financials", description = "Normalized financial statements"),
        (name = "Analysis", description = "AI-assisted statement analysis"),
    )
)]
pub struct ApiDoc;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub companies: i64,
    pub ai_analysis: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health and registry size")),
    tag = "Companies"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<ApiResponse<HealthStatus>>, AppError> {
    let companies = state.store.count().await?;
    Ok(Json(ApiResponse::success(HealthStatus {
        status: "ok",
        companies,
        ai_analysis: state.narrator.is_some(),
    })))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(company_routes::company_routes())
        .merge(financial_routes::financial_routes())
        .merge(analysis_routes::analysis_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_server=info,corp_registry=info,statement_analysis=info,opendart_client=info,gemini_client=info,tower_http=info".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    let store = RegistryStore::new(&config.database_url).await?;
    tracing::info!("Registry opened with {} companies", store.count().await?);

    let statements: Arc<dyn StatementSource> = Arc::new(OpenDartClient::from_env()?);

    let narrator: Option<Arc<dyn NarrativeGenerator>> = match GeminiConfig::from_env() {
        Ok(gemini) => {
            tracing::info!("AI analysis enabled (model {})", gemini.model);
            Some(Arc::new(GeminiClient::new(gemini)))
        }
        Err(e) => {
            tracing::warn!("AI analysis disabled: {}", e);
            None
        }
    };

    let app = build_router(AppState::new(store, statements, narrator));

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
