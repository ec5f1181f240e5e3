use crate::db::create::{CommentCreate, ThreadCreate, ThreadKey};
use crate::db::models::{DbComment, DbThread};
use crate::db::schema::SQLITE_INIT;
use crate::error::EngineError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub enum StoreMessage {
    /// Insert a thread and return its id.
    CreateThread(ThreadCreate, RpcReplyPort<Result<i64, EngineError>>),

    /// Look up a thread by id or slug.
    FindThread(ThreadKey, RpcReplyPort<Result<Option<DbThread>, EngineError>>),

    /// Non-hidden comments of a thread, oldest first.
    ListVisibleComments(i64, RpcReplyPort<Result<Vec<DbComment>, EngineError>>),

    /// Number of comments of a thread, hidden ones included.
    CountComments(i64, RpcReplyPort<Result<i64, EngineError>>),

    /// Insert a validated comment and return its id.
    CreateComment(CommentCreate, RpcReplyPort<Result<i64, EngineError>>),
}

#[derive(Clone)]
pub struct StoreHandle {
    actor: ActorRef<StoreMessage>,
}

impl StoreHandle {
    pub async fn create_thread(&self, create: ThreadCreate) -> Result<i64, EngineError> {
        ractor::call!(self.actor, StoreMessage::CreateThread, create)
            .map_err(|e| EngineError::Actor(format!("Store CreateThread RPC failed: {e}")))?
    }

    pub async fn find_thread(&self, key: ThreadKey) -> Result<Option<DbThread>, EngineError> {
        ractor::call!(self.actor, StoreMessage::FindThread, key)
            .map_err(|e| EngineError::Actor(format!("Store FindThread RPC failed: {e}")))?
    }

    pub async fn list_visible_comments(
        &self,
        thread_id: i64,
    ) -> Result<Vec<DbComment>, EngineError> {
        ractor::call!(self.actor, StoreMessage::ListVisibleComments, thread_id).map_err(|e| {
            EngineError::Actor(format!("Store ListVisibleComments RPC failed: {e}"))
        })?
    }

    pub async fn count_comments(&self, thread_id: i64) -> Result<i64, EngineError> {
        ractor::call!(self.actor, StoreMessage::CountComments, thread_id)
            .map_err(|e| EngineError::Actor(format!("Store CountComments RPC failed: {e}")))?
    }

    pub async fn create_comment(&self, create: CommentCreate) -> Result<i64, EngineError> {
        ractor::call!(self.actor, StoreMessage::CreateComment, create)
            .map_err(|e| EngineError::Actor(format!("Store CreateComment RPC failed: {e}")))?
    }
}

struct StoreState {
    pool: SqlitePool,
}

struct StoreActor;

#[ractor::async_trait]
impl Actor for StoreActor {
    type Msg = StoreMessage;
    type State = StoreState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = connect_options(&database)
            .map_err(|e| ActorProcessingErr::from(format!("invalid database target: {e}")))?;

        // One connection for the process lifetime; the actor mailbox serializes access.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!(database = %database, "Comment store initialized");
        Ok(StoreState { pool })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.pool.close().await;
        Ok(())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            StoreMessage::CreateThread(create, reply) => {
                let res = self.create_thread(&state.pool, create).await;
                let _ = reply.send(res);
            }
            StoreMessage::FindThread(key, reply) => {
                let res = self.find_thread(&state.pool, key).await;
                let _ = reply.send(res);
            }
            StoreMessage::ListVisibleComments(thread_id, reply) => {
                let res = self.list_visible_comments(&state.pool, thread_id).await;
                let _ = reply.send(res);
            }
            StoreMessage::CountComments(thread_id, reply) => {
                let res = self.count_comments(&state.pool, thread_id).await;
                let _ = reply.send(res);
            }
            StoreMessage::CreateComment(create, reply) => {
                let res = self.create_comment(&state.pool, create).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl StoreActor {
    async fn create_thread(
        &self,
        pool: &SqlitePool,
        create: ThreadCreate,
    ) -> Result<i64, EngineError> {
        let id: i64 = sqlx::query_scalar(
            r#"
        INSERT INTO comment_threads (slug, closed, auto_closes_at)
        VALUES (?, 0, ?)
        RETURNING id
        "#,
        )
        .bind(create.slug.as_deref())
        .bind(create.auto_closes_at.as_deref())
        .fetch_one(pool)
        .await?;

        debug!(thread.id = id, thread.slug = ?create.slug, "Thread created");
        Ok(id)
    }

    async fn find_thread(
        &self,
        pool: &SqlitePool,
        key: ThreadKey,
    ) -> Result<Option<DbThread>, EngineError> {
        let row = match key {
            ThreadKey::Id(id) => {
                sqlx::query_as::<_, DbThread>(
                    r#"
            SELECT id, slug, closed, auto_closes_at
            FROM comment_threads
            WHERE id = ?
            "#,
                )
                .bind(id)
                .fetch_optional(pool)
                .await?
            }
            ThreadKey::Slug(slug) => {
                sqlx::query_as::<_, DbThread>(
                    r#"
            SELECT id, slug, closed, auto_closes_at
            FROM comment_threads
            WHERE slug = ?
            "#,
                )
                .bind(slug)
                .fetch_optional(pool)
                .await?
            }
        };

        Ok(row)
    }

    async fn list_visible_comments(
        &self,
        pool: &SqlitePool,
        thread_id: i64,
    ) -> Result<Vec<DbComment>, EngineError> {
        let rows = sqlx::query_as::<_, DbComment>(
            r#"
        SELECT id, thread_id, author_name, author_email, body, hidden, created_at
        FROM comments
        WHERE thread_id = ? AND hidden = 0
        ORDER BY created_at ASC, id ASC
        "#,
        )
        .bind(thread_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn count_comments(&self, pool: &SqlitePool, thread_id: i64) -> Result<i64, EngineError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE thread_id = ?")
            .bind(thread_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    async fn create_comment(
        &self,
        pool: &SqlitePool,
        create: CommentCreate,
    ) -> Result<i64, EngineError> {
        let id: i64 = sqlx::query_scalar(
            r#"
        INSERT INTO comments (
            thread_id, author_name, author_email, body, hidden, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
        )
        .bind(create.thread_id)
        .bind(create.author_name)
        .bind(create.author_email)
        .bind(create.body)
        .bind(create.hidden)
        .bind(create.created_at)
        .fetch_one(pool)
        .await?;

        debug!(
            comment.id = id,
            thread.id = create.thread_id,
            hidden = create.hidden,
            "Comment stored"
        );
        Ok(id)
    }
}

/// `sqlite:` URLs are parsed as-is; anything else is treated as a file path.
fn connect_options(database: &str) -> Result<SqliteConnectOptions, EngineError> {
    let opts = if database.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(database)?
    } else {
        SqliteConnectOptions::new().filename(database)
    };

    Ok(opts
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal))
}

/// Spawn the store actor. Resolves once the connection is open and the schema applied.
pub async fn spawn(database: &str) -> Result<StoreHandle, EngineError> {
    let (actor, _jh) = ractor::Actor::spawn(None, StoreActor, database.to_string())
        .await
        .map_err(|e| EngineError::Actor(format!("failed to spawn store actor: {e}")))?;

    Ok(StoreHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), EngineError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
