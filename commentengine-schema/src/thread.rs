use serde::{Deserialize, Serialize};

/// Public shape of a thread returned by `GET {base}/threads/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThreadView {
    pub id: i64,
    pub slug: Option<String>,
    /// Stored flag OR an elapsed `auto_closes_at`, evaluated at read time.
    pub closed: bool,
    pub auto_closes_at: Option<String>,
    #[serde(default)]
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentView {
    pub author_name: String,
    pub author_email: String,
    pub body: String,
    pub created_at: String,
}
