use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw `comment` parameters as submitted by a client.
///
/// Every field is optional on the wire; blank handling is left to validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommentParams {
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl CommentParams {
    /// Overlay `other` on top of `self`, field by field.
    pub fn merge(self, other: CommentParams) -> Self {
        Self {
            author_name: other.author_name.or(self.author_name),
            author_email: other.author_email.or(self.author_email),
            body: other.body.or(self.body),
        }
    }

    /// Assign a field by its wire name. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "author_name" => self.author_name = Some(value),
            "author_email" => self.author_email = Some(value),
            "body" => self.body = Some(value),
            _ => {}
        }
    }
}

/// JSON envelope: `{"comment": {...}}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommentSubmission {
    #[serde(default)]
    pub comment: Option<CommentParams>,
}

/// Field name -> error message, e.g. `{"body":"cannot be blank"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SuccessBody {
    pub success: bool,
}

impl Default for SuccessBody {
    fn default() -> Self {
        Self { success: true }
    }
}
