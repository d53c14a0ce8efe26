//! Route table for the bridge server
//!
//! Built once at startup and owned by the server; dropping the router drops
//! the routes.

pub mod annotations;
pub mod children;
pub mod citekey;
pub mod items;
pub mod ping;
pub mod search;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the bridge router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/mcp/ping", get(ping::ping))
        .route("/mcp/annotations", post(annotations::create_annotation))
        .route("/mcp/item", post(items::get_item))
        .route("/mcp/items", post(items::list_items))
        .route("/mcp/search", post(search::search))
        .route("/mcp/children", post(children::list_children))
        .route("/mcp/citekey", post(citekey::resolve_citekey))
        .with_state(state)
}
