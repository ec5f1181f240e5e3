//! SQL DDL for initializing the database schema.
//! Every statement is `IF NOT EXISTS`, so applying it repeatedly is a no-op.

/// SQLite schema includes:
/// - `comment_threads` table (optional unique slug, closed flag, auto-close time)
/// - `comments` table (one row per comment, owned by a thread)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Threads
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comment_threads (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    slug TEXT NULL,
    closed INTEGER NOT NULL DEFAULT 0,
    auto_closes_at TEXT NULL -- UTC, YYYY-MM-DDTHH:MM:SS
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_comment_threads_slug ON comment_threads(slug);

-- ---------------------------------------------------------------------------
-- Comments
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    thread_id INTEGER NOT NULL REFERENCES comment_threads(id),
    author_name TEXT NOT NULL,
    author_email TEXT NOT NULL,
    body TEXT NOT NULL,
    hidden INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL -- UTC, YYYY-MM-DDTHH:MM:SS
);

CREATE INDEX IF NOT EXISTS idx_comments_thread_id ON comments(thread_id);
"#;
