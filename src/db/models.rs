use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DbThread {
    pub id: i64,
    pub slug: Option<String>,
    /// Stored flag only; the effective state also depends on `auto_closes_at`.
    pub closed: bool,
    pub auto_closes_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DbComment {
    pub id: i64,
    pub thread_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub body: String,
    pub hidden: bool,
    pub created_at: String,
}
