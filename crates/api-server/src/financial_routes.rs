//! Financial Statement API Routes
//!
//! Fetches a company's statement from OpenDART, normalizes it and serves the
//! canonical structure. Reference listings for years and report types.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use dart_core::{available_years as years_since_first_disclosure, CanonicalStatement, ReportCode, StatementRequest};
use serde::{Deserialize, Serialize};
use statement_analysis::normalize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct StatementQuery {
    #[serde(default)]
    pub corp_code: String,
    #[serde(default)]
    pub year: String,
    /// Defaults to the annual report (11011)
    #[serde(default)]
    pub report_code: Option<String>,
}

impl StatementQuery {
    pub fn to_request(&self) -> Result<StatementRequest, AppError> {
        let year: i32 = self
            .year
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("year must be a 4-digit number, got '{}'", self.year)))?;

        let report_code = match self.report_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code.parse::<ReportCode>()?,
            _ => ReportCode::default(),
        };

        Ok(StatementRequest::new(&self.corp_code, year, report_code)?)
    }
}

#[derive(Serialize)]
pub struct ReportType {
    pub code: &'static str,
    pub label: &'static str,
}

pub fn financial_routes() -> Router<AppState> {
    Router::new()
        .route("/api/financial_data", get(financial_data))
        .route("/api/available_years", get(available_years))
        .route("/api/report_types", get(report_types))
}

/// Normalized statement for `request`, served from the cache when fresh.
/// Failed fetches are never cached.
pub(crate) async fn load_statement(
    state: &AppState,
    request: &StatementRequest,
) -> Result<CanonicalStatement, AppError> {
    if let Some(statement) = state.statement_cache.get(request) {
        tracing::debug!("Statement cache hit for {} {}", request.corp_code, request.year);
        return Ok(statement);
    }

    let raw = state.statements.fetch_statement(request).await?;
    let statement = normalize(&raw)?;
    state.statement_cache.insert(request.clone(), statement.clone());

    Ok(statement)
}

#[utoipa::path(
    get,
    path = "/api/financial_data",
    params(StatementQuery),
    responses(
        (status = 200, description = "Normalized financial statement"),
        (status = 400, description = "Invalid corp_code, year or report_code"),
        (status = 404, description = "No statement filed for the period"),
        (status = 502, description = "OpenDART error")
    ),
    tag = "Financials"
)]
pub async fn financial_data(
    State(state): State<AppState>,
    Query(query): Query<StatementQuery>,
) -> Result<Json<ApiResponse<CanonicalStatement>>, AppError> {
    let request = query.to_request()?;
    let statement = load_statement(&state, &request).await?;
    Ok(Json(ApiResponse::success(statement)))
}

#[utoipa::path(
    get,
    path = "/api/available_years",
    responses((status = 200, description = "Business years with statement data")),
    tag = "Financials"
)]
pub async fn available_years() -> Json<ApiResponse<Vec<i32>>> {
    Json(ApiResponse::success(years_since_first_disclosure(Utc::now().year())))
}

#[utoipa::path(
    get,
    path = "/api/report_types",
    responses((status = 200, description = "Report codes and their labels")),
    tag = "Financials"
)]
pub async fn report_types() -> Json<ApiResponse<Vec<ReportType>>> {
    let types = ReportCode::ALL
        .into_iter()
        .map(|r| ReportType {
            code: r.code(),
            label: r.label(),
        })
        .collect();
    Json(ApiResponse::success(types))
}
