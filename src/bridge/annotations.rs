//! Annotation creation
//!
//! Builds a complete annotation record from the partial description external
//! callers send: defaults the type and color, synthesizes the ordering key,
//! serializes the position payload, and hands the record to the store.

use serde::Serialize;

use super::sort_index::{serialize_position, synthesize_sort_index};
use super::LibraryScope;
use crate::error::{BridgeError, Result};
use crate::request::BridgeRequest;
use crate::store::{AnnotationData, Item, ItemId, NewItem};

pub const DEFAULT_ANNOTATION_TYPE: &str = "highlight";
pub const DEFAULT_COLOR: &str = "#ffd400";

/// Summary of a freshly persisted annotation
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAnnotation {
    pub id: ItemId,
    pub key: String,
    pub parent_item_key: String,
    #[serde(rename = "type")]
    pub annotation_type: String,
    pub text: String,
    pub color: String,
    pub page_label: String,
}

impl CreatedAnnotation {
    fn new(annotation: Item, parent_item_key: String) -> Result<Self> {
        let data = annotation.annotation.ok_or_else(|| {
            BridgeError::Internal(format!(
                "store returned annotation {} without annotation data",
                annotation.key
            ))
        })?;

        Ok(Self {
            id: annotation.id,
            key: annotation.key,
            parent_item_key,
            annotation_type: data.annotation_type,
            text: data.text,
            color: data.color,
            page_label: data.page_label,
        })
    }
}

/// Annotation fields read from a request, with defaults applied
pub fn annotation_fields(request: &BridgeRequest) -> AnnotationData {
    let page_label = request.text("pageLabel");
    let position = request.get("position");
    let sort_index = synthesize_sort_index(
        request.text("sortIndex").as_deref(),
        position,
        page_label.as_deref(),
    );

    AnnotationData {
        annotation_type: request
            .text("annotationType")
            .unwrap_or_else(|| DEFAULT_ANNOTATION_TYPE.to_string()),
        text: request.text("text").unwrap_or_default(),
        comment: request.text("comment").unwrap_or_default(),
        color: request
            .text("color")
            .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        page_label: page_label.unwrap_or_default(),
        sort_index,
        position: serialize_position(position),
    }
}

/// Create an annotation under the item named by `parentItemKey`
///
/// Returns only after the store has persisted the record, so the annotation is
/// already visible to subsequent child listings of the parent.
pub async fn create_annotation(
    scope: LibraryScope<'_>,
    request: &BridgeRequest,
) -> Result<CreatedAnnotation> {
    let parent_key = request.require("parentItemKey")?;

    let parent = scope
        .store
        .get_by_key(scope.library_id, &parent_key)
        .await?
        .ok_or_else(|| BridgeError::parent_not_found(parent_key.as_str()))?;

    let record = NewItem::annotation(parent.library_id, parent.id, annotation_fields(request));
    let annotation = scope.store.create(record).await?;

    tracing::info!(
        "Created annotation: {} on item {}",
        annotation.key,
        parent_key
    );

    CreatedAnnotation::new(annotation, parent_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::children::list_children;
    use crate::bridge::fixtures;
    use crate::bridge::summary::ChildSummary;
    use crate::store::{ItemStore, LibraryId};
    use serde_json::json;

    fn request(value: serde_json::Value) -> BridgeRequest {
        BridgeRequest::new(value.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_defaults_applied() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "Paper", "").await;
        let pdf = fixtures::attachment(&store, article.id, "paper", "application/pdf").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let created = create_annotation(scope, &request(json!({ "parentItemKey": pdf.key })))
            .await
            .unwrap();

        assert_eq!(created.annotation_type, "highlight");
        assert_eq!(created.color, "#ffd400");
        assert_eq!(created.parent_item_key, pdf.key);

        let stored = store.get(created.id).await.unwrap().unwrap();
        let data = stored.annotation.unwrap();
        assert_eq!(data.sort_index, "00000|000000|00000");
        assert_eq!(data.color, "#ffd400");
        assert_eq!(stored.parent_id, Some(pdf.id));
    }

    #[tokio::test]
    async fn test_missing_parent_key() {
        let store = fixtures::store().await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let result = create_annotation(scope, &request(json!({ "text": "orphan" }))).await;
        assert!(matches!(result, Err(BridgeError::MissingField("parentItemKey"))));
    }

    #[tokio::test]
    async fn test_unknown_parent_is_not_found() {
        let store = fixtures::store().await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let result =
            create_annotation(scope, &request(json!({ "parentItemKey": "ZZZZ9999" }))).await;
        match result {
            Err(BridgeError::NotFound { value, .. }) => assert_eq!(value, "ZZZZ9999"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_page_label_drives_sort_index() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "Paper", "").await;
        let pdf = fixtures::attachment(&store, article.id, "paper", "application/pdf").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let created = create_annotation(
            scope,
            &request(json!({ "parentItemKey": pdf.key, "pageLabel": 5, "text": "p5" })),
        )
        .await
        .unwrap();

        assert_eq!(created.page_label, "5");
        let stored = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.annotation.unwrap().sort_index, "00004|000000|00000");
    }

    #[tokio::test]
    async fn test_round_trip_through_children() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "Paper", "").await;
        let pdf = fixtures::attachment(&store, article.id, "paper", "application/pdf").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let position = json!({ "pageIndex": 2, "rects": [[72.0, 600.5, 300.25, 612.0]] });
        let created = create_annotation(
            scope,
            &request(json!({
                "parentItemKey": pdf.key,
                "annotationType": "underline",
                "text": "the key finding",
                "comment": "check the appendix",
                "color": "#2ea8e5",
                "pageLabel": "3",
                "position": position.clone(),
            })),
        )
        .await
        .unwrap();

        let listing = list_children(scope, &request(json!({ "key": pdf.key })))
            .await
            .unwrap();
        assert_eq!(listing.children.len(), 1);

        match &listing.children[0] {
            ChildSummary::Annotation(ann) => {
                assert_eq!(ann.key, created.key);
                assert_eq!(ann.annotation_type, "underline");
                assert_eq!(ann.text, "the key finding");
                assert_eq!(ann.comment, "check the appendix");
                assert_eq!(ann.color, "#2ea8e5");
                assert_eq!(ann.page_label, "3");
                assert_eq!(ann.sort_index, "00002|000000|00000");
                let stored: serde_json::Value = serde_json::from_str(&ann.position).unwrap();
                assert_eq!(stored, position);
            }
            other => panic!("expected an annotation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_explicit_sort_index_and_string_position_kept_verbatim() {
        let store = fixtures::store().await;
        let article = fixtures::article(&store, "Paper", "").await;
        let pdf = fixtures::attachment(&store, article.id, "paper", "application/pdf").await;
        let scope = LibraryScope::new(&store, LibraryId::USER);

        let created = create_annotation(
            scope,
            &request(json!({
                "parentItemKey": pdf.key,
                "sortIndex": "00010|000450|00012",
                "position": "{\"pageIndex\":10}",
            })),
        )
        .await
        .unwrap();

        let data = store.get(created.id).await.unwrap().unwrap().annotation.unwrap();
        assert_eq!(data.sort_index, "00010|000450|00012");
        assert_eq!(data.position, "{\"pageIndex\":10}");
    }
}
