//! Thread and comment repositories on top of the store actor.

mod thread;
pub mod validation;

pub use thread::{ThreadHeader, thread_key};

use crate::config::EngineConfig;
use crate::db::{self, CommentCreate, StoreHandle, ThreadCreate};
use crate::error::EngineError;
use crate::utils::logging::with_pretty_json_debug;
use crate::utils::time::format_timestamp;
use chrono::Utc;
use commentengine_schema::{CommentParams, CommentView, FieldErrors, NewThread, ThreadView};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;
use validation::CleanComment;

/// Result of a comment submission that reached an existing thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    Created { id: i64 },
    Rejected(FieldErrors),
}

/// Shared handle to the comment engine. Clones share one store.
#[derive(Clone)]
pub struct CommentEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    store: OnceCell<StoreHandle>,
}

impl CommentEngine {
    /// Validates `config`. The database is not touched until first use.
    pub fn new(mut config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                store: OnceCell::new(),
            }),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn base(&self) -> &str {
        &self.inner.config.base
    }

    /// Lazily spawns the store. Concurrent first callers await the same
    /// initialization; a failed attempt is retried on the next call.
    pub async fn store(&self) -> Result<&StoreHandle, EngineError> {
        self.inner
            .store
            .get_or_try_init(|| db::spawn(&self.inner.config.database))
            .await
    }

    pub async fn create_thread(&self, new_thread: NewThread) -> Result<i64, EngineError> {
        let slug = new_thread
            .slug
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let create = ThreadCreate {
            slug,
            auto_closes_at: new_thread.auto_closes_at.map(format_timestamp),
        };
        self.store().await?.create_thread(create).await
    }

    pub async fn find_thread_header(
        &self,
        id_or_slug: &str,
    ) -> Result<Option<ThreadHeader>, EngineError> {
        let Some(key) = thread_key(id_or_slug) else {
            return Ok(None);
        };
        let row = self.store().await?.find_thread(key).await?;
        Ok(row.map(|row| ThreadHeader::from_row(row, Utc::now())))
    }

    /// Thread plus its visible comments, oldest first.
    pub async fn find_thread(&self, id_or_slug: &str) -> Result<ThreadView, EngineError> {
        let header = self
            .find_thread_header(id_or_slug)
            .await?
            .ok_or(EngineError::NotFound)?;

        let comments = self
            .store()
            .await?
            .list_visible_comments(header.id)
            .await?
            .into_iter()
            .map(|c| CommentView {
                author_name: c.author_name,
                author_email: c.author_email,
                body: c.body,
                created_at: c.created_at,
            })
            .collect();

        Ok(header.into_view(comments))
    }

    pub async fn create_comment(
        &self,
        id_or_slug: &str,
        params: CommentParams,
    ) -> Result<CommentOutcome, EngineError> {
        let header = self
            .find_thread_header(id_or_slug)
            .await?
            .ok_or(EngineError::NotFound)?;

        let comment = CleanComment::from(params);
        let errors = validation::validate(&comment, header.closed, &self.inner.config);
        if !errors.is_empty() {
            with_pretty_json_debug(&errors, |pretty| {
                debug!(thread.id = header.id, errors = %pretty, "Comment rejected");
            });
            return Ok(CommentOutcome::Rejected(errors));
        }

        let create = CommentCreate {
            thread_id: header.id,
            author_name: comment.author_name,
            author_email: comment.author_email,
            body: comment.body,
            hidden: !self.inner.config.auto_approve,
            created_at: format_timestamp(Utc::now()),
        };
        let id = self.store().await?.create_comment(create).await?;
        Ok(CommentOutcome::Created { id })
    }
}
