/// Row payload for a new thread. Timestamps are already normalized.
#[derive(Debug, Clone, Default)]
pub struct ThreadCreate {
    pub slug: Option<String>,
    pub auto_closes_at: Option<String>,
}

/// Row payload for a validated comment.
#[derive(Debug, Clone)]
pub struct CommentCreate {
    pub thread_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub body: String,
    pub hidden: bool,
    pub created_at: String,
}

/// How a thread is addressed: numeric primary key or slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadKey {
    Id(i64),
    Slug(String),
}
