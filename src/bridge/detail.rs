//! Single item lookup

use serde::Serialize;

use super::summary::AttachmentSummary;
use super::LibraryScope;
use crate::error::{BridgeError, Result};
use crate::request::BridgeRequest;
use crate::store::{ChildKind, Creator, Item, ItemId};

/// Full record of one item
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub id: ItemId,
    pub key: String,
    pub item_type: String,
    pub title: String,
    pub date_added: String,
    pub date_modified: String,
    #[serde(flatten)]
    pub bibliographic: Option<BibliographicDetail>,
    #[serde(flatten)]
    pub file: Option<FileDetail>,
}

/// Present on regular items
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BibliographicDetail {
    pub creators: Vec<Creator>,
    pub date: String,
    pub abstract_note: String,
    pub url: String,
    #[serde(rename = "DOI")]
    pub doi: String,
    pub extra: String,
    pub attachments: Vec<AttachmentSummary>,
}

/// Present on attachments
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetail {
    pub content_type: String,
    pub path: Option<String>,
    #[serde(rename = "parentItemID")]
    pub parent_item_id: Option<ItemId>,
}

/// Look up the item named by `key`
pub async fn get_item(scope: LibraryScope<'_>, request: &BridgeRequest) -> Result<ItemDetail> {
    let key = request.require("key")?;

    let item = scope
        .store
        .get_by_key(scope.library_id, &key)
        .await?
        .ok_or_else(|| BridgeError::item_not_found(key.as_str()))?;

    let bibliographic = if item.is_regular_item() {
        let attachments = scope
            .store
            .children(item.id, ChildKind::Attachments)
            .await?
            .iter()
            .map(AttachmentSummary::from_item)
            .collect();
        Some(bibliographic_detail(&item, attachments))
    } else {
        None
    };

    let file = item.is_attachment().then(|| FileDetail {
        content_type: item.content_type().to_string(),
        path: item.file_path().map(str::to_string),
        parent_item_id: item.parent_id,
    });

    Ok(ItemDetail {
        id: item.id,
        key: item.key.clone(),
        item_type: item.item_type.clone(),
        title: item.field("title").to_string(),
        date_added: item.date_added.clone(),
        date_modified: item.date_modified.clone(),
        bibliographic,
        file,
    })
}

fn bibliographic_detail(item: &Item, attachments: Vec<AttachmentSummary>) -> BibliographicDetail {
    BibliographicDetail {
        creators: item.creators.clone(),
        date: item.field("date").to_string(),
        abstract_note: item.field("abstractNote").to_string(),
        url: item.field("url").to_string(),
        doi: item.field("DOI").to_string(),
        extra: item.field("extra").to_string(),
        attachments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::fixtures;
    use crate::store::LibraryId;
    use serde_json::json;

    fn request(value: serde_json::Value) -> BridgeRequest {
        BridgeRequest::new(value.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_regular_item_detail() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "On Computable Numbers", "Citation Key: turing1936").await;
        let pdf = fixtures::attachment(&store, article.id, "paper", "application/pdf").await;
        fixtures::attachment(&store, article.id, "snapshot", "text/html").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let detail = get_item(scope, &request(json!({ "key": article.key })))
            .await
            .unwrap();
        let value = serde_json::to_value(&detail).unwrap();

        assert_eq!(value["title"], "On Computable Numbers");
        assert_eq!(value["itemType"], "journalArticle");
        assert_eq!(value["extra"], "Citation Key: turing1936");
        assert_eq!(value["DOI"], "");
        assert_eq!(value["attachments"].as_array().unwrap().len(), 2);
        assert_eq!(value["attachments"][0]["key"], pdf.key.as_str());
        assert!(value.get("contentType").is_none());
        assert!(value.get("parentItemID").is_none());
    }

    #[tokio::test]
    async fn test_attachment_detail() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "Paper", "").await;
        let pdf = fixtures::attachment(&store, article.id, "paper", "application/pdf").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let detail = get_item(scope, &request(json!({ "key": pdf.key })))
            .await
            .unwrap();
        let value = serde_json::to_value(&detail).unwrap();

        assert_eq!(value["contentType"], "application/pdf");
        assert_eq!(value["parentItemID"], article.id);
        assert_eq!(value["title"], "paper");
        assert!(value.get("creators").is_none());
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let store = fixtures::store().await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        match get_item(scope, &request(json!({ "key": "GONE2345" }))).await {
            Err(BridgeError::NotFound { what, value, .. }) => {
                assert_eq!(what, "Item not found");
                assert_eq!(value, "GONE2345");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }
}
