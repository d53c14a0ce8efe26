//! Citation key resolution
//!
//! A citekey is resolved through the optional citation-key index first. When
//! the index is absent, fails, or has no entry, the regular items of the
//! library are scanned for a marker in their `extra` field:
//!
//! - `Citation Key: <citekey>` (case-sensitive)
//! - `citekey: <citekey>` (case-insensitive)
//!
//! The first match in store order wins.

use serde::Serialize;

use super::summary::{AttachmentSummary, ItemSummary};
use super::LibraryScope;
use crate::error::{BridgeError, Result};
use crate::request::BridgeRequest;
use crate::store::{ChildKind, CitekeyIndex, Item, SearchQuery};

#[derive(Debug, Clone, Serialize)]
pub struct CitekeyMatch {
    #[serde(flatten)]
    pub item: ItemSummary,
    pub citekey: String,
    /// PDF attachments only
    pub attachments: Vec<AttachmentSummary>,
}

/// Resolve the `citekey` field of a request to an item
pub async fn resolve_citekey(
    scope: LibraryScope<'_>,
    index: Option<&dyn CitekeyIndex>,
    request: &BridgeRequest,
) -> Result<CitekeyMatch> {
    let citekey = request.require("citekey")?;

    let item = match lookup_indexed(scope, index, &citekey).await {
        Some(item) => item,
        None => scan_extra_fields(scope, &citekey)
            .await?
            .ok_or_else(|| BridgeError::citekey_not_found(citekey.as_str()))?,
    };

    let attachments = scope
        .store
        .children(item.id, ChildKind::Attachments)
        .await?
        .iter()
        .map(AttachmentSummary::from_item)
        .filter(AttachmentSummary::is_pdf)
        .collect();

    Ok(CitekeyMatch {
        item: ItemSummary::from_item(&item),
        citekey,
        attachments,
    })
}

/// Primary path. Any failure counts as a miss so the fallback still runs.
async fn lookup_indexed(
    scope: LibraryScope<'_>,
    index: Option<&dyn CitekeyIndex>,
    citekey: &str,
) -> Option<Item> {
    let index = index?;

    let id = match index.find(citekey).await {
        Ok(id) => id?,
        Err(e) => {
            tracing::warn!("Citekey index lookup failed for {}: {}", citekey, e);
            return None;
        }
    };

    match scope.store.get(id).await {
        Ok(Some(item)) if item.library_id == scope.library_id => Some(item),
        Ok(_) => {
            tracing::debug!("Citekey {} points at item {} outside the library", citekey, id);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to fetch item {} for citekey {}: {}", id, citekey, e);
            None
        }
    }
}

/// Fallback path: first regular item whose `extra` field carries the citekey
async fn scan_extra_fields(scope: LibraryScope<'_>, citekey: &str) -> Result<Option<Item>> {
    let ids = scope
        .store
        .search(&SearchQuery::top_level(scope.library_id))
        .await?;

    for id in ids {
        if let Some(item) = scope.store.get(id).await? {
            if extra_mentions_citekey(item.field("extra"), citekey) {
                return Ok(Some(item));
            }
        }
    }

    Ok(None)
}

pub fn extra_mentions_citekey(extra: &str, citekey: &str) -> bool {
    extra.contains(&format!("Citation Key: {}", citekey))
        || extra
            .to_lowercase()
            .contains(&format!("citekey: {}", citekey.to_lowercase()))
}
