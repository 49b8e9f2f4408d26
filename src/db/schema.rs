//! Database schema and migrations for anonfs.

/// Database migrations, applied in order and tracked in `schema_version`.
pub const MIGRATIONS: &[&str] = &[
    // v1: namespace nodes
    r#"
-- One row per file or directory of the virtual namespace.
-- `parent` is the full path of the containing directory ('' for the root);
-- `parent_id` repeats the same link by id as an integrity check.
-- `deleted_at` is a soft-delete marker; removal is always a hard delete, so
-- it stays NULL for every live row.
CREATE TABLE nodes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    full_path   TEXT NOT NULL UNIQUE,
    category    TEXT NOT NULL CHECK (category IN ('directory', 'file')),
    size        TEXT NOT NULL,
    parent      TEXT NOT NULL,
    parent_id   INTEGER REFERENCES nodes(id) ON DELETE CASCADE,
    url         TEXT NOT NULL DEFAULT '',
    deleted_at  TEXT,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX idx_nodes_parent_name ON nodes(parent, name);
CREATE INDEX idx_nodes_parent_id ON nodes(parent_id);
"#,
];
