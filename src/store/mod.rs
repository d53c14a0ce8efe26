//! Item store abstraction
//!
//! The bridge never persists anything itself. Every read and write goes through
//! an [`ItemStore`], which owns the library's item graph (regular items,
//! attachments, notes and annotations). A SQLite-backed implementation lives in
//! [`sqlite`].

mod schema;
pub mod sqlite;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sqlite::{SqliteCitekeyIndex, SqliteItemStore};

/// Internal item id, stable for the lifetime of the store
pub type ItemId = i64;

/// Library scope that every operation runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryId(pub i64);

impl LibraryId {
    /// The user's personal library
    pub const USER: LibraryId = LibraryId(1);
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by an item store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("{0}")]
    Backend(String),
}

/// Coarse classification of an item, derived from its item type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Regular,
    Attachment,
    Note,
    Annotation,
}

impl ItemKind {
    pub fn from_item_type(item_type: &str) -> Self {
        match item_type {
            "attachment" => ItemKind::Attachment,
            "note" => ItemKind::Note,
            "annotation" => ItemKind::Annotation,
            _ => ItemKind::Regular,
        }
    }
}

/// A creator (author, editor, ...) of a regular item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub creator_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Single-field name, used instead of first/last for institutions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Creator {
    pub fn person(creator_type: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            creator_type: creator_type.to_string(),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            name: None,
        }
    }

    pub fn single(creator_type: &str, name: &str) -> Self {
        Self {
            creator_type: creator_type.to_string(),
            first_name: None,
            last_name: None,
            name: Some(name.to_string()),
        }
    }
}

/// File data carried by attachment items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentData {
    pub content_type: String,
    pub path: Option<String>,
}

/// Fields carried by annotation items
///
/// Unset text fields read back as empty strings, the same way the field
/// getters of the store behave for regular fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationData {
    pub annotation_type: String,
    pub text: String,
    pub comment: String,
    pub color: String,
    pub page_label: String,
    /// Ordering key, `NNNNN|NNNNNN|NNNNN`
    pub sort_index: String,
    /// Serialized position payload
    pub position: String,
}

/// An item as held by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub key: String,
    pub library_id: LibraryId,
    pub item_type: String,
    pub parent_id: Option<ItemId>,
    pub date_added: String,
    pub date_modified: String,
    pub fields: BTreeMap<String, String>,
    pub creators: Vec<Creator>,
    pub attachment: Option<AttachmentData>,
    pub note: Option<String>,
    pub annotation: Option<AnnotationData>,
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        ItemKind::from_item_type(&self.item_type)
    }

    pub fn is_regular_item(&self) -> bool {
        self.kind() == ItemKind::Regular
    }

    pub fn is_attachment(&self) -> bool {
        self.kind() == ItemKind::Attachment
    }

    /// Field value, empty when the field is unset
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn content_type(&self) -> &str {
        self.attachment
            .as_ref()
            .map(|a| a.content_type.as_str())
            .unwrap_or("")
    }

    pub fn file_path(&self) -> Option<&str> {
        self.attachment.as_ref().and_then(|a| a.path.as_deref())
    }
}

/// A record to create and persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub library_id: LibraryId,
    pub item_type: String,
    pub parent_id: Option<ItemId>,
    pub fields: BTreeMap<String, String>,
    pub creators: Vec<Creator>,
    pub attachment: Option<AttachmentData>,
    pub note: Option<String>,
    pub annotation: Option<AnnotationData>,
}

impl NewItem {
    fn bare(library_id: LibraryId, item_type: &str, parent_id: Option<ItemId>) -> Self {
        Self {
            library_id,
            item_type: item_type.to_string(),
            parent_id,
            fields: BTreeMap::new(),
            creators: Vec::new(),
            attachment: None,
            note: None,
            annotation: None,
        }
    }

    /// A regular bibliographic item such as `journalArticle` or `book`
    pub fn regular(library_id: LibraryId, item_type: &str) -> Self {
        Self::bare(library_id, item_type, None)
    }

    pub fn attachment(
        library_id: LibraryId,
        parent_id: Option<ItemId>,
        content_type: &str,
        path: Option<&str>,
    ) -> Self {
        let mut item = Self::bare(library_id, "attachment", parent_id);
        item.attachment = Some(AttachmentData {
            content_type: content_type.to_string(),
            path: path.map(str::to_string),
        });
        item
    }

    pub fn note(library_id: LibraryId, parent_id: Option<ItemId>, note: &str) -> Self {
        let mut item = Self::bare(library_id, "note", parent_id);
        item.note = Some(note.to_string());
        item
    }

    pub fn annotation(library_id: LibraryId, parent_id: ItemId, data: AnnotationData) -> Self {
        let mut item = Self::bare(library_id, "annotation", Some(parent_id));
        item.annotation = Some(data);
        item
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_creator(mut self, creator: Creator) -> Self {
        self.creators.push(creator);
        self
    }
}

/// Which children of an item to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Attachments,
    Notes,
    Annotations,
}

impl ChildKind {
    pub fn item_type(self) -> &'static str {
        match self {
            ChildKind::Attachments => "attachment",
            ChildKind::Notes => "note",
            ChildKind::Annotations => "annotation",
        }
    }
}

/// A single search condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Matches any indexed text of the item
    QuickSearch(String),
    /// Excludes items of the given item type
    ItemTypeIsNot(String),
}

/// Conditions combined with AND, scoped to one library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub library_id: LibraryId,
    pub conditions: Vec<Condition>,
}

impl SearchQuery {
    pub fn new(library_id: LibraryId) -> Self {
        Self {
            library_id,
            conditions: Vec::new(),
        }
    }

    pub fn quick_search(mut self, text: &str) -> Self {
        self.conditions.push(Condition::QuickSearch(text.to_string()));
        self
    }

    pub fn item_type_is_not(mut self, item_type: &str) -> Self {
        self.conditions
            .push(Condition::ItemTypeIsNot(item_type.to_string()));
        self
    }

    /// Regular items only: excludes attachments, notes and annotations
    pub fn top_level(library_id: LibraryId) -> Self {
        Self::new(library_id)
            .item_type_is_not("attachment")
            .item_type_is_not("note")
            .item_type_is_not("annotation")
    }
}

/// The library's item graph
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch an item by its key within a library
    async fn get_by_key(&self, library_id: LibraryId, key: &str) -> StoreResult<Option<Item>>;

    /// Fetch an item by internal id
    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Fetch several items, preserving the order of `ids` and skipping missing ones
    async fn get_many(&self, ids: &[ItemId]) -> StoreResult<Vec<Item>> {
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self.get(*id).await? {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Children of one kind, in the store's native order
    async fn children(&self, parent_id: ItemId, kind: ChildKind) -> StoreResult<Vec<Item>>;

    /// Ids of the items matching every condition, in the store's native order
    async fn search(&self, query: &SearchQuery) -> StoreResult<Vec<ItemId>>;

    /// Create and durably persist a record. Returns once the record is visible
    /// to subsequent reads.
    async fn create(&self, record: NewItem) -> StoreResult<Item>;
}

/// Optional index mapping citation keys to item ids
#[async_trait]
pub trait CitekeyIndex: Send + Sync {
    async fn find(&self, citekey: &str) -> StoreResult<Option<ItemId>>;
}
