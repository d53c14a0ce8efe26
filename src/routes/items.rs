//! Item lookup and listing endpoints

use axum::{extract::State, Json};

use crate::bridge::detail::{self, ItemDetail};
use crate::bridge::query::{self, ItemListing};
use crate::error::{BridgeError, Result};
use crate::request::NormalizedBody;
use crate::state::AppState;

/// POST /mcp/item
pub async fn get_item(
    State(state): State<AppState>,
    NormalizedBody(request): NormalizedBody,
) -> Result<Json<ItemDetail>> {
    let item = state.run(detail::get_item(state.scope(), &request)).await?;
    Ok(Json(item))
}

/// POST /mcp/items
///
/// Every filter is optional, so an unreadable body just means defaults.
pub async fn list_items(
    State(state): State<AppState>,
    body: std::result::Result<NormalizedBody, BridgeError>,
) -> Result<Json<ItemListing>> {
    let request = match body {
        Ok(NormalizedBody(request)) => request,
        Err(e) => {
            tracing::debug!("Ignoring unreadable listing body: {}", e);
            Default::default()
        }
    };

    let listing = state
        .run(query::list_top_level(state.scope(), &request))
        .await?;
    Ok(Json(listing))
}
