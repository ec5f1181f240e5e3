use crate::db::{DbThread, ThreadKey};
use chrono::{DateTime, Utc};
use commentengine_schema::{CommentView, ThreadView, parse_timestamp};

/// A thread row with its effective `closed` state resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadHeader {
    pub id: i64,
    pub slug: Option<String>,
    pub closed: bool,
    pub auto_closes_at: Option<String>,
}

impl ThreadHeader {
    pub fn from_row(row: DbThread, now: DateTime<Utc>) -> Self {
        let auto_closed = row
            .auto_closes_at
            .as_deref()
            .and_then(parse_timestamp)
            .is_some_and(|at| at < now);

        Self {
            id: row.id,
            slug: row.slug,
            closed: row.closed || auto_closed,
            auto_closes_at: row.auto_closes_at,
        }
    }

    pub fn into_view(self, comments: Vec<CommentView>) -> ThreadView {
        ThreadView {
            id: self.id,
            slug: self.slug,
            closed: self.closed,
            auto_closes_at: self.auto_closes_at,
            comments,
        }
    }
}

/// Identifiers starting with a digit address the primary key; anything else is a slug.
///
/// A digit-led identifier that is not a whole `i64` matches nothing.
pub fn thread_key(id_or_slug: &str) -> Option<ThreadKey> {
    if id_or_slug.is_empty() {
        return None;
    }
    if id_or_slug.starts_with(|c: char| c.is_ascii_digit()) {
        return id_or_slug.parse::<i64>().ok().map(ThreadKey::Id);
    }
    Some(ThreadKey::Slug(id_or_slug.to_string()))
}
