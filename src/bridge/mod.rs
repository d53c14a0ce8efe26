//! Annotation and query bridge
//!
//! Translates normalized requests into item store calls and shapes the results
//! back into JSON-ready records:
//!
//! - `annotations`: create annotations with synthesized ordering keys
//! - `query`: free-text search and top-level listing
//! - `children`: attachments, notes and annotations under an item
//! - `citekey`: citation key resolution with a textual fallback
//! - `detail`: single item lookup
//!
//! Operations are stateless. Each one borrows the store for the duration of a
//! request and keeps nothing afterwards.

pub mod annotations;
pub mod children;
pub mod citekey;
pub mod detail;
pub mod query;
pub mod sort_index;
pub mod summary;

use crate::store::{ItemStore, LibraryId};

/// The store and library a request operates on
#[derive(Clone, Copy)]
pub struct LibraryScope<'a> {
    pub store: &'a dyn ItemStore,
    pub library_id: LibraryId,
}

impl<'a> LibraryScope<'a> {
    pub fn new(store: &'a dyn ItemStore, library_id: LibraryId) -> Self {
        Self { store, library_id }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small library builders shared by the bridge tests

    use crate::store::{
        AnnotationData, Creator, Item, ItemId, ItemStore, LibraryId, NewItem, SqliteItemStore,
    };

    pub async fn store() -> SqliteItemStore {
        SqliteItemStore::in_memory().await.unwrap()
    }

    pub async fn article(store: &SqliteItemStore, title: &str, extra: &str) -> Item {
        store
            .create(
                NewItem::regular(LibraryId::USER, "journalArticle")
                    .with_field("title", title)
                    .with_field("date", "2020-03-01")
                    .with_field("extra", extra)
                    .with_creator(Creator::person("author", "Ada", "Smith")),
            )
            .await
            .unwrap()
    }

    pub async fn attachment(
        store: &SqliteItemStore,
        parent: ItemId,
        title: &str,
        content_type: &str,
    ) -> Item {
        let path = format!("/library/storage/{}.bin", title);
        store
            .create(
                NewItem::attachment(LibraryId::USER, Some(parent), content_type, Some(&path))
                    .with_field("title", title),
            )
            .await
            .unwrap()
    }

    pub async fn note(store: &SqliteItemStore, parent: ItemId, body: &str) -> Item {
        store
            .create(NewItem::note(LibraryId::USER, Some(parent), body))
            .await
            .unwrap()
    }

    pub async fn highlight(store: &SqliteItemStore, parent: ItemId, sort_index: &str, text: &str) -> Item {
        store
            .create(NewItem::annotation(
                LibraryId::USER,
                parent,
                AnnotationData {
                    annotation_type: "highlight".to_string(),
                    text: text.to_string(),
                    color: "#ffd400".to_string(),
                    sort_index: sort_index.to_string(),
                    ..Default::default()
                },
            ))
            .await
            .unwrap()
    }
}
