//! AI Analysis API Routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use statement_analysis::{analyze_company, AnalysisReport};

use crate::financial_routes::{load_statement, StatementQuery};
use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AnalysisQuery {
    #[serde(default)]
    pub corp_code: String,
    /// Display name used in the prompt; looked up in the registry when absent
    #[serde(default)]
    pub corp_name: Option<String>,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub report_code: Option<String>,
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/api/ai_analysis", get(ai_analysis))
}

#[utoipa::path(
    get,
    path = "/api/ai_analysis",
    params(AnalysisQuery),
    responses(
        (status = 200, description = "Narrative analysis with the metrics it is based on"),
        (status = 502, description = "OpenDART or the narrative service failed"),
        (status = 503, description = "No narrative generator configured")
    ),
    tag = "Analysis"
)]
pub async fn ai_analysis(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<ApiResponse<AnalysisReport>>, AppError> {
    let narrator = state
        .narrator
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("AI analysis is not configured".to_string()))?;

    let request = StatementQuery {
        corp_code: query.corp_code.clone(),
        year: query.year.clone(),
        report_code: query.report_code.clone(),
    }
    .to_request()?;

    let company_name = match query.corp_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => state
            .store
            .get(&request.corp_code)
            .await?
            .map(|c| c.corp_name)
            .unwrap_or_else(|| request.corp_code.clone()),
    };

    let statement = load_statement(&state, &request).await?;
    let report = analyze_company(narrator.as_ref(), &company_name, &statement).await?;

    Ok(Json(ApiResponse::success(report)))
}
