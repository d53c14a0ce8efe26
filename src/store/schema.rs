//! SQLite schema for the item store

use sqlx::SqlitePool;

use super::StoreResult;

/// Initialize the item store schema
pub async fn initialize_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Every node of the item graph
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    library_id INTEGER NOT NULL,
    key TEXT NOT NULL,
    item_type TEXT NOT NULL,
    parent_id INTEGER REFERENCES items(id) ON DELETE CASCADE,
    date_added TEXT NOT NULL,
    date_modified TEXT NOT NULL,

    UNIQUE(library_id, key)
);

CREATE INDEX IF NOT EXISTS idx_items_parent ON items(parent_id);
CREATE INDEX IF NOT EXISTS idx_items_type ON items(item_type);

-- Bibliographic fields (title, date, extra, DOI, ...)
CREATE TABLE IF NOT EXISTS item_fields (
    item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    field TEXT NOT NULL,
    value TEXT NOT NULL,

    PRIMARY KEY(item_id, field)
);

CREATE TABLE IF NOT EXISTS item_creators (
    item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    order_index INTEGER NOT NULL,
    creator_type TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    name TEXT,

    PRIMARY KEY(item_id, order_index)
);

CREATE TABLE IF NOT EXISTS item_attachments (
    item_id INTEGER PRIMARY KEY REFERENCES items(id) ON DELETE CASCADE,
    content_type TEXT NOT NULL DEFAULT '',
    path TEXT
);

CREATE TABLE IF NOT EXISTS item_notes (
    item_id INTEGER PRIMARY KEY REFERENCES items(id) ON DELETE CASCADE,
    note TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS item_annotations (
    item_id INTEGER PRIMARY KEY REFERENCES items(id) ON DELETE CASCADE,
    annotation_type TEXT NOT NULL,
    text TEXT NOT NULL DEFAULT '',
    comment TEXT NOT NULL DEFAULT '',
    color TEXT NOT NULL DEFAULT '',
    page_label TEXT NOT NULL DEFAULT '',
    -- Fixed-width NNNNN|NNNNNN|NNNNN, sorts lexicographically
    sort_index TEXT NOT NULL,
    position TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_annotations_sort ON item_annotations(sort_index);

-- Citation key index
CREATE TABLE IF NOT EXISTS citekeys (
    citekey TEXT PRIMARY KEY,
    item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE
);
"#;
