//! SQLite-backed item store
//!
//! Keeps the item graph in a handful of tables (see `schema.rs`) and implements
//! [`ItemStore`] and [`CitekeyIndex`] on top of a sqlx pool.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use super::schema::initialize_schema;
use super::{
    AnnotationData, AttachmentData, ChildKind, CitekeyIndex, Condition, Creator, Item, ItemId,
    ItemKind, ItemStore, LibraryId, NewItem, SearchQuery, StoreError, StoreResult,
};

/// Upper bound on the ids a single search returns
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Characters item keys are drawn from
const KEY_ALPHABET: &[u8] = b"23456789ABCDEFGHIJKLMNPQRSTUVWXYZ";
const KEY_LENGTH: usize = 8;

const ITEM_COLUMNS: &str =
    "i.id, i.library_id, i.key, i.item_type, i.parent_id, i.date_added, i.date_modified";

/// Item store persisted in SQLite
#[derive(Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
    max_results: usize,
}

impl SqliteItemStore {
    /// Open (or create) the database at `database_url` and initialize the schema
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::new(pool).await
    }

    /// Private in-memory database, mostly useful for tests
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // A second connection would see a different, empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        Self::new(pool).await
    }

    /// Wrap an existing pool, creating the tables if needed
    pub async fn new(pool: SqlitePool) -> StoreResult<Self> {
        initialize_schema(&pool).await?;
        Ok(Self {
            pool,
            max_results: DEFAULT_MAX_RESULTS,
        })
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn hydrate(&self, row: ItemRow) -> StoreResult<Item> {
        let fields = sqlx::query_as::<_, FieldRow>(
            "SELECT field, value FROM item_fields WHERE item_id = ? ORDER BY field",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|f| (f.field, f.value))
        .collect();

        let creators = sqlx::query_as::<_, CreatorRow>(
            r#"
            SELECT creator_type, first_name, last_name, name
            FROM item_creators
            WHERE item_id = ?
            ORDER BY order_index
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(CreatorRow::into_creator)
        .collect();

        let mut item = Item {
            id: row.id,
            key: row.key,
            library_id: LibraryId(row.library_id),
            item_type: row.item_type,
            parent_id: row.parent_id,
            date_added: row.date_added,
            date_modified: row.date_modified,
            fields,
            creators,
            attachment: None,
            note: None,
            annotation: None,
        };

        match item.kind() {
            ItemKind::Attachment => {
                item.attachment = sqlx::query_as::<_, AttachmentRow>(
                    "SELECT content_type, path FROM item_attachments WHERE item_id = ?",
                )
                .bind(item.id)
                .fetch_optional(&self.pool)
                .await?
                .map(|a| AttachmentData {
                    content_type: a.content_type,
                    path: a.path,
                });
            }
            ItemKind::Note => {
                item.note = sqlx::query_as::<_, (String,)>(
                    "SELECT note FROM item_notes WHERE item_id = ?",
                )
                .bind(item.id)
                .fetch_optional(&self.pool)
                .await?
                .map(|(note,)| note);
            }
            ItemKind::Annotation => {
                item.annotation = sqlx::query_as::<_, AnnotationRow>(
                    r#"
                    SELECT annotation_type, text, comment, color, page_label, sort_index, position
                    FROM item_annotations
                    WHERE item_id = ?
                    "#,
                )
                .bind(item.id)
                .fetch_optional(&self.pool)
                .await?
                .map(AnnotationRow::into_data);
            }
            ItemKind::Regular => {}
        }

        Ok(item)
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn get_by_key(&self, library_id: LibraryId, key: &str) -> StoreResult<Option<Item>> {
        let sql = format!(
            "SELECT {} FROM items i WHERE i.library_id = ? AND i.key = ?",
            ITEM_COLUMNS
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(library_id.0)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let sql = format!("SELECT {} FROM items i WHERE i.id = ?", ITEM_COLUMNS);
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn children(&self, parent_id: ItemId, kind: ChildKind) -> StoreResult<Vec<Item>> {
        let sql = match kind {
            // Annotations come back in reading order
            ChildKind::Annotations => format!(
                r#"
                SELECT {} FROM items i
                LEFT JOIN item_annotations a ON a.item_id = i.id
                WHERE i.parent_id = ? AND i.item_type = ?
                ORDER BY a.sort_index, i.id
                "#,
                ITEM_COLUMNS
            ),
            ChildKind::Attachments | ChildKind::Notes => format!(
                "SELECT {} FROM items i WHERE i.parent_id = ? AND i.item_type = ? ORDER BY i.id",
                ITEM_COLUMNS
            ),
        };

        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(parent_id)
            .bind(kind.item_type())
            .fetch_all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(self.hydrate(row).await?);
        }
        Ok(items)
    }

    async fn search(&self, query: &SearchQuery) -> StoreResult<Vec<ItemId>> {
        let mut sql = String::from("SELECT i.id FROM items i WHERE i.library_id = ?");
        let mut binds: Vec<String> = Vec::new();

        for condition in &query.conditions {
            match condition {
                Condition::QuickSearch(text) => {
                    sql.push_str(QUICK_SEARCH_CLAUSE);
                    let pattern = format!("%{}%", escape_like(text));
                    binds.extend(std::iter::repeat(pattern).take(QUICK_SEARCH_BINDS));
                }
                Condition::ItemTypeIsNot(item_type) => {
                    sql.push_str(" AND i.item_type <> ?");
                    binds.push(item_type.clone());
                }
            }
        }

        sql.push_str(" ORDER BY i.id LIMIT ?");

        let mut q = sqlx::query_as::<_, (i64,)>(&sql).bind(query.library_id.0);
        for value in binds {
            q = q.bind(value);
        }
        let limit = i64::try_from(self.max_results).unwrap_or(i64::MAX);
        let rows = q.bind(limit).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn create(&self, record: NewItem) -> StoreResult<Item> {
        let kind = ItemKind::from_item_type(&record.item_type);
        if kind == ItemKind::Annotation && (record.annotation.is_none() || record.parent_id.is_none()) {
            return Err(StoreError::InvalidRecord(
                "annotation requires annotation data and a parent".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if let Some(parent_id) = record.parent_id {
            let parent = sqlx::query_as::<_, (i64,)>(
                "SELECT id FROM items WHERE id = ? AND library_id = ?",
            )
            .bind(parent_id)
            .bind(record.library_id.0)
            .fetch_optional(&mut *tx)
            .await?;
            if parent.is_none() {
                return Err(StoreError::InvalidRecord(format!(
                    "parent item {} does not exist in library {}",
                    parent_id, record.library_id.0
                )));
            }
        }

        let key = loop {
            let candidate = generate_key();
            let taken = sqlx::query_as::<_, (i64,)>(
                "SELECT id FROM items WHERE library_id = ? AND key = ?",
            )
            .bind(record.library_id.0)
            .bind(&candidate)
            .fetch_optional(&mut *tx)
            .await?;
            if taken.is_none() {
                break candidate;
            }
        };

        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let id = sqlx::query(
            r#"
            INSERT INTO items (library_id, key, item_type, parent_id, date_added, date_modified)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.library_id.0)
        .bind(&key)
        .bind(&record.item_type)
        .bind(record.parent_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (field, value) in &record.fields {
            sqlx::query("INSERT INTO item_fields (item_id, field, value) VALUES (?, ?, ?)")
                .bind(id)
                .bind(field)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        for (order_index, creator) in record.creators.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO item_creators (item_id, order_index, creator_type, first_name, last_name, name)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(order_index as i64)
            .bind(&creator.creator_type)
            .bind(&creator.first_name)
            .bind(&creator.last_name)
            .bind(&creator.name)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(attachment) = &record.attachment {
            sqlx::query("INSERT INTO item_attachments (item_id, content_type, path) VALUES (?, ?, ?)")
                .bind(id)
                .bind(&attachment.content_type)
                .bind(&attachment.path)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(note) = &record.note {
            sqlx::query("INSERT INTO item_notes (item_id, note) VALUES (?, ?)")
                .bind(id)
                .bind(note)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(annotation) = &record.annotation {
            sqlx::query(
                r#"
                INSERT INTO item_annotations (
                    item_id, annotation_type, text, comment, color,
                    page_label, sort_index, position
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(&annotation.annotation_type)
            .bind(&annotation.text)
            .bind(&annotation.comment)
            .bind(&annotation.color)
            .bind(&annotation.page_label)
            .bind(&annotation.sort_index)
            .bind(&annotation.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!("Persisted {} item {} ({})", record.item_type, key, id);

        self.get(id)
            .await?
            .ok_or_else(|| StoreError::InvalidRecord(format!("item {} vanished after commit", id)))
    }
}

/// Citation key index stored alongside the items
#[derive(Clone)]
pub struct SqliteCitekeyIndex {
    pool: SqlitePool,
}

impl SqliteCitekeyIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Point `citekey` at `item_id`, replacing any previous assignment
    pub async fn assign(&self, citekey: &str, item_id: ItemId) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO citekeys (citekey, item_id) VALUES (?, ?)
            ON CONFLICT(citekey) DO UPDATE SET item_id = excluded.item_id
            "#,
        )
        .bind(citekey)
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CitekeyIndex for SqliteCitekeyIndex {
    async fn find(&self, citekey: &str) -> StoreResult<Option<ItemId>> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT item_id FROM citekeys WHERE citekey = ?")
            .bind(citekey)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(id,)| id))
    }
}

// Fields, creators, note bodies and annotation text all count as indexed text
const QUICK_SEARCH_CLAUSE: &str = r#"
    AND (
        EXISTS (SELECT 1 FROM item_fields f
                WHERE f.item_id = i.id AND f.value LIKE ? ESCAPE '\')
        OR EXISTS (SELECT 1 FROM item_creators c
                   WHERE c.item_id = i.id
                   AND (COALESCE(c.first_name, '') || ' ' || COALESCE(c.last_name, '') || ' ' || COALESCE(c.name, '')) LIKE ? ESCAPE '\')
        OR EXISTS (SELECT 1 FROM item_notes n
                   WHERE n.item_id = i.id AND n.note LIKE ? ESCAPE '\')
        OR EXISTS (SELECT 1 FROM item_annotations a
                   WHERE a.item_id = i.id AND (a.text LIKE ? ESCAPE '\' OR a.comment LIKE ? ESCAPE '\'))
    )"#;
const QUICK_SEARCH_BINDS: usize = 5;

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn generate_key() -> String {
    Uuid::new_v4().as_bytes()[..KEY_LENGTH]
        .iter()
        .map(|b| KEY_ALPHABET[*b as usize % KEY_ALPHABET.len()] as char)
        .collect()
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    library_id: i64,
    key: String,
    item_type: String,
    parent_id: Option<i64>,
    date_added: String,
    date_modified: String,
}

#[derive(sqlx::FromRow)]
struct FieldRow {
    field: String,
    value: String,
}

#[derive(sqlx::FromRow)]
struct CreatorRow {
    creator_type: String,
    first_name: Option<String>,
    last_name: Option<String>,
    name: Option<String>,
}

impl CreatorRow {
    fn into_creator(self) -> Creator {
        Creator {
            creator_type: self.creator_type,
            first_name: self.first_name,
            last_name: self.last_name,
            name: self.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AttachmentRow {
    content_type: String,
    path: Option<String>,
}

#[derive(sqlx::FromRow)]
struct AnnotationRow {
    annotation_type: String,
    text: String,
    comment: String,
    color: String,
    page_label: String,
    sort_index: String,
    position: String,
}

impl AnnotationRow {
    fn into_data(self) -> AnnotationData {
        AnnotationData {
            annotation_type: self.annotation_type,
            text: self.text,
            comment: self.comment,
            color: self.color,
            page_label: self.page_label,
            sort_index: self.sort_index,
            position: self.position,
        }
    }
}
