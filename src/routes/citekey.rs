//! Citation key lookup endpoint

use axum::{extract::State, Json};

use crate::bridge::citekey::{self, CitekeyMatch};
use crate::error::Result;
use crate::request::NormalizedBody;
use crate::state::AppState;

/// POST /mcp/citekey
pub async fn resolve_citekey(
    State(state): State<AppState>,
    NormalizedBody(request): NormalizedBody,
) -> Result<Json<CitekeyMatch>> {
    let found = state
        .run(citekey::resolve_citekey(
            state.scope(),
            state.citekey_index(),
            &request,
        ))
        .await?;

    tracing::debug!("Resolved citekey {} to {}", found.citekey, found.item.key);
    Ok(Json(found))
}
