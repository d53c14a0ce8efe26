//! Query translation
//!
//! Turns free-text queries and "list everything top-level" requests into store
//! searches. The id list is truncated to the requested limit before any item
//! is fetched, so the work done is proportional to the limit rather than to the
//! size of the library.

use serde::Serialize;

use super::summary::ItemSummary;
use super::LibraryScope;
use crate::error::{BridgeError, Result};
use crate::request::BridgeRequest;
use crate::store::SearchQuery;

pub const DEFAULT_SEARCH_LIMIT: usize = 25;
pub const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub results: Vec<ItemSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemListing {
    pub items: Vec<ItemSummary>,
    pub total: usize,
}

/// Free-text search over everything the store indexes
///
/// `query` (or its short form `q`) is required. Only regular items are
/// returned, so a page of hits that includes notes or annotations yields
/// fewer than `limit` results.
pub async fn search(scope: LibraryScope<'_>, request: &BridgeRequest) -> Result<SearchResults> {
    let query = request
        .text("query")
        .or_else(|| request.text("q"))
        .ok_or(BridgeError::MissingField("query"))?;
    let limit = request.limit(DEFAULT_SEARCH_LIMIT);

    let mut ids = scope
        .store
        .search(&SearchQuery::new(scope.library_id).quick_search(&query))
        .await?;
    ids.truncate(limit);

    let items = scope.store.get_many(&ids).await?;
    let results: Vec<ItemSummary> = items
        .iter()
        .filter(|item| item.is_regular_item())
        .map(ItemSummary::from_item)
        .collect();

    tracing::debug!(
        "Search {:?} (limit {}) matched {} items",
        query,
        limit,
        results.len()
    );

    let total = results.len();
    Ok(SearchResults { results, total })
}

/// Top-level items of the library, in store order
pub async fn list_top_level(
    scope: LibraryScope<'_>,
    request: &BridgeRequest,
) -> Result<ItemListing> {
    let limit = request.limit(DEFAULT_LIST_LIMIT);

    let mut ids = scope
        .store
        .search(&SearchQuery::top_level(scope.library_id))
        .await?;
    ids.truncate(limit);

    let items: Vec<ItemSummary> = scope
        .store
        .get_many(&ids)
        .await?
        .iter()
        .map(ItemSummary::from_item)
        .collect();

    let total = items.len();
    Ok(ItemListing { items, total })
}
