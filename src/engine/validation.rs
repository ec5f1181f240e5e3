use crate::config::EngineConfig;
use commentengine_schema::{CommentParams, FieldErrors};
use regex::Regex;
use std::sync::LazyLock;

pub const BLANK: &str = "cannot be blank";
pub const INVALID: &str = "is not valid";
pub const CLOSED: &str = "is closed";

/// local-part, `@`, host containing a dot; no whitespace anywhere.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Submitted fields with surrounding whitespace removed and absent fields empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanComment {
    pub author_name: String,
    pub author_email: String,
    pub body: String,
}

impl From<CommentParams> for CleanComment {
    fn from(params: CommentParams) -> Self {
        fn clean(v: Option<String>) -> String {
            v.map(|s| s.trim().to_string()).unwrap_or_default()
        }
        Self {
            author_name: clean(params.author_name),
            author_email: clean(params.author_email),
            body: clean(params.body),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Collects every failing rule; an empty result means the comment may be stored.
pub fn validate(comment: &CleanComment, thread_closed: bool, rules: &EngineConfig) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if rules.name_required && comment.author_name.is_empty() {
        errors.add("author_name", BLANK);
    }

    if comment.author_email.is_empty() {
        if rules.email_required {
            errors.add("author_email", BLANK);
        }
    } else if !is_valid_email(&comment.author_email) {
        errors.add("author_email", INVALID);
    }

    if comment.body.is_empty() {
        errors.add("body", BLANK);
    }

    if thread_closed {
        errors.add("thread", CLOSED);
    }

    errors
}
