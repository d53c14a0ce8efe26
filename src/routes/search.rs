//! Free-text search endpoint

use axum::{extract::State, Json};

use crate::bridge::query::{self, SearchResults};
use crate::error::Result;
use crate::request::NormalizedBody;
use crate::state::AppState;

/// POST /mcp/search
pub async fn search(
    State(state): State<AppState>,
    NormalizedBody(request): NormalizedBody,
) -> Result<Json<SearchResults>> {
    let results = state.run(query::search(state.scope(), &request)).await?;
    Ok(Json(results))
}
