//! JSON projections of store items
//!
//! Responses never carry whole items. Each operation picks one of these
//! shapes.

use serde::Serialize;

use crate::store::{Creator, Item, ItemId};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Compact record for a regular item, used by search and listing
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: ItemId,
    pub key: String,
    pub item_type: String,
    pub title: String,
    pub creators: Vec<Creator>,
    pub date: String,
    pub extra: String,
}

impl ItemSummary {
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id,
            key: item.key.clone(),
            item_type: item.item_type.clone(),
            title: item.field("title").to_string(),
            creators: item.creators.clone(),
            date: item.field("date").to_string(),
            extra: item.field("extra").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSummary {
    pub id: ItemId,
    pub key: String,
    pub title: String,
    pub content_type: String,
    pub path: Option<String>,
}

impl AttachmentSummary {
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id,
            key: item.key.clone(),
            title: item.field("title").to_string(),
            content_type: item.content_type().to_string(),
            path: item.file_path().map(str::to_string),
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NoteSummary {
    pub id: ItemId,
    pub key: String,
    pub note: String,
}

impl NoteSummary {
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id,
            key: item.key.clone(),
            note: item.note.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSummary {
    pub id: ItemId,
    pub key: String,
    pub annotation_type: String,
    pub text: String,
    pub comment: String,
    pub color: String,
    pub page_label: String,
    pub sort_index: String,
    pub position: String,
}

impl AnnotationSummary {
    pub fn from_item(item: &Item) -> Self {
        let data = item.annotation.clone().unwrap_or_default();
        Self {
            id: item.id,
            key: item.key.clone(),
            annotation_type: data.annotation_type,
            text: data.text,
            comment: data.comment,
            color: data.color,
            page_label: data.page_label,
            sort_index: data.sort_index,
            position: data.position,
        }
    }
}

/// A child record, tagged with its `itemType`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "itemType", rename_all = "lowercase")]
pub enum ChildSummary {
    Attachment(AttachmentSummary),
    Note(NoteSummary),
    Annotation(AnnotationSummary),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_child_summary_is_tagged_by_item_type() {
        let note = ChildSummary::Note(NoteSummary {
            id: 4,
            key: "NOTE2345".to_string(),
            note: "<p>Read again</p>".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            json!({ "itemType": "note", "id": 4, "key": "NOTE2345", "note": "<p>Read again</p>" })
        );
    }

    #[test]
    fn test_attachment_without_file_has_null_path() {
        let attachment = ChildSummary::Attachment(AttachmentSummary {
            id: 2,
            key: "LINK2345".to_string(),
            title: "Snapshot".to_string(),
            content_type: "text/html".to_string(),
            path: None,
        });

        let value = serde_json::to_value(&attachment).unwrap();
        assert_eq!(value["itemType"], "attachment");
        assert_eq!(value["contentType"], "text/html");
        assert!(value["path"].is_null());
    }
}
