//! Child listing endpoint

use axum::{extract::State, Json};

use crate::bridge::children::{self, ChildrenListing};
use crate::error::Result;
use crate::request::NormalizedBody;
use crate::state::AppState;

/// POST /mcp/children
pub async fn list_children(
    State(state): State<AppState>,
    NormalizedBody(request): NormalizedBody,
) -> Result<Json<ChildrenListing>> {
    let listing = state
        .run(children::list_children(state.scope(), &request))
        .await?;
    Ok(Json(listing))
}
