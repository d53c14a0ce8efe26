//! Hierarchy walking
//!
//! Lists what hangs below an item: attachments and notes under a regular item,
//! annotations under an attachment.

use serde::Serialize;

use super::summary::{AnnotationSummary, AttachmentSummary, ChildSummary, NoteSummary};
use super::LibraryScope;
use crate::error::{BridgeError, Result};
use crate::request::BridgeRequest;
use crate::store::ChildKind;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenListing {
    pub parent_key: String,
    pub children: Vec<ChildSummary>,
}

/// Children of the item named by `key`, in the store's child order
pub async fn list_children(
    scope: LibraryScope<'_>,
    request: &BridgeRequest,
) -> Result<ChildrenListing> {
    let key = request.require("key")?;

    let item = scope
        .store
        .get_by_key(scope.library_id, &key)
        .await?
        .ok_or_else(|| BridgeError::item_not_found(key.as_str()))?;

    let mut children = Vec::new();

    // Both checks run; kind flags are not assumed to be exclusive
    if item.is_regular_item() {
        for attachment in scope.store.children(item.id, ChildKind::Attachments).await? {
            children.push(ChildSummary::Attachment(AttachmentSummary::from_item(
                &attachment,
            )));
        }
        for note in scope.store.children(item.id, ChildKind::Notes).await? {
            children.push(ChildSummary::Note(NoteSummary::from_item(&note)));
        }
    }

    if item.is_attachment() {
        for annotation in scope.store.children(item.id, ChildKind::Annotations).await? {
            children.push(ChildSummary::Annotation(AnnotationSummary::from_item(
                &annotation,
            )));
        }
    }

    Ok(ChildrenListing {
        parent_key: key,
        children,
    })
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
    async fn test_regular_item_lists_attachments_then_notes() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "Paper", "").await;
        let note = fixtures::note(&store, article.id, "<p>summary</p>").await;
        let pdf = fixtures::attachment(&store, article.id, "paper", "application/pdf").await;
        let html = fixtures::attachment(&store, article.id, "snapshot", "text/html").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let listing = list_children(scope, &request(json!({ "key": article.key })))
            .await
            .unwrap();

        assert_eq!(listing.parent_key, article.key);
        let keys: Vec<_> = listing
            .children
            .iter()
            .map(|child| match child {
                ChildSummary::Attachment(a) => a.key.as_str(),
                ChildSummary::Note(n) => n.key.as_str(),
                ChildSummary::Annotation(a) => a.key.as_str(),
            })
            .collect();
        assert_eq!(keys, vec![pdf.key.as_str(), html.key.as_str(), note.key.as_str()]);

        match &listing.children[0] {
            ChildSummary::Attachment(a) => {
                assert_eq!(a.content_type, "application/pdf");
                assert_eq!(a.path.as_deref(), Some("/library/storage/paper.bin"));
            }
            other => panic!("expected an attachment, got {:?}", other),
        }
        match &listing.children[2] {
            ChildSummary::Note(n) => assert_eq!(n.note, "<p>summary</p>"),
            other => panic!("expected a note, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_attachment_lists_annotations_in_reading_order() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "Paper", "").await;
        let pdf = fixtures::attachment(&store, article.id, "paper", "application/pdf").await;
        fixtures::highlight(&store, pdf.id, "00009|000000|00000", "late").await;
        fixtures::highlight(&store, pdf.id, "00001|000000|00000", "early").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let listing = list_children(scope, &request(json!({ "key": pdf.key })))
            .await
            .unwrap();

        let texts: Vec<_> = listing
            .children
            .iter()
            .filter_map(|child| match child {
                ChildSummary::Annotation(a) => Some(a.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_note_has_no_children() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "Paper", "").await;
        let note = fixtures::note(&store, article.id, "n").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let listing = list_children(scope, &request(json!({ "key": note.key })))
            .await
            .unwrap();
        assert!(listing.children.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_key_and_missing_key() {
        let store = fixtures::store().await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        assert!(matches!(
            list_children(scope, &request(json!({ "key": "NOPE2345" }))).await,
            Err(BridgeError::NotFound { .. })
        ));
        assert!(matches!(
            list_children(scope, &BridgeRequest::default()).await,
            Err(BridgeError::MissingField("key"))
        ));
    }
}
