//! Company Registry API Routes
//!
//! Name search and corp_code lookups against the local registry.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use corp_registry::CorpIdentity;
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct SearchResults {
    pub results: Vec<CorpIdentity>,
    pub count: usize,
}

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/api/search_company", get(search_company))
        .route("/api/company/:corp_code", get(get_company))
}

#[utoipa::path(
    get,
    path = "/api/search_company",
    params(SearchQuery),
    responses((status = 200, description = "Companies whose name contains the query")),
    tag = "Companies"
)]
pub async fn search_company(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResults>>, AppError> {
    let results = state.store.search(&query.q, query.limit).await?;

    Ok(Json(ApiResponse::success(SearchResults {
        count: results.len(),
        results,
    })))
}

#[utoipa::path(
    get,
    path = "/api/company/{corp_code}",
    params(("corp_code" = String, Path, description = "8-digit registry code")),
    responses(
        (status = 200, description = "Company identity"),
        (status = 404, description = "Unknown corp_code")
    ),
    tag = "Companies"
)]
pub async fn get_company(
    State(state): State<AppState>,
    Path(corp_code): Path<String>,
) -> Result<Json<ApiResponse<CorpIdentity>>, AppError> {
    let company = state
        .store
        .get(&corp_code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No company with corp_code {}", corp_code)))?;

    Ok(Json(ApiResponse::success(company)))
}
