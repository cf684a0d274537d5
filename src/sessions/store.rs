use super::types::{ChatMessage, Session};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use uuid::Uuid;

/// Async session persistence contract.
///
/// Implementations own their consistency model; callers only see message
/// lists and whole sessions, never storage rows.
pub trait SessionStore: Send + Sync {
    fn create_session<'a>(
        &'a self,
        user_id: &'a str,
        website_url: &'a str,
        website_title: &'a str,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Session>> + Send + 'a>>;

    fn get_session<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Session>>> + Send + 'a>>;

    /// Replace the stored message list and bump `updated_at`. Returns false
    /// when no session with this id exists.
    fn update_messages<'a>(
        &'a self,
        id: &'a str,
        messages: &'a [ChatMessage],
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

    /// Sessions for one user, most recently updated first.
    fn list_sessions<'a>(
        &'a self,
        user_id: &'a str,
        limit: usize,
        offset: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Session>>> + Send + 'a>>;

    fn delete_session<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

    fn delete_all_sessions<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>>;
}

/// SQLite-backed session store using the sqlx async pool.
///
/// Messages live inside the session row as a JSON column. Sessions here are
/// whole-document reads and writes, so a child table would only add joins.
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Create a new store with an existing pool and run migrations.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chat_sessions (
                 id TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL,
                 website_url TEXT NOT NULL,
                 website_title TEXT NOT NULL,
                 language TEXT NOT NULL,
                 messages TEXT NOT NULL,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .context("create chat_sessions table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_sessions_user_updated
                 ON chat_sessions(user_id, updated_at DESC)",
        )
        .execute(&pool)
        .await
        .context("create chat_sessions index")?;

        Ok(Self { pool })
    }

    /// Open (or create) a database file and run migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("open session database at {}", path.display()))?;
        Self::new(pool).await
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("invalid stored timestamp: {raw}"))
}

fn map_session_row(row: &SqliteRow) -> Result<Session> {
    let messages_raw: String = row.try_get("messages")?;
    let messages: Vec<ChatMessage> =
        serde_json::from_str(&messages_raw).context("deserialize session messages")?;
    let created_raw: String = row.try_get("created_at")?;
    let updated_raw: String = row.try_get("updated_at")?;

    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        website_url: row.try_get("website_url")?,
        website_title: row.try_get("website_title")?,
        language: row.try_get("language")?,
        messages,
        created_at: parse_timestamp(&created_raw)?,
        updated_at: parse_timestamp(&updated_raw)?,
    })
}

const SESSION_COLUMNS: &str =
    "id, user_id, website_url, website_title, language, messages, created_at, updated_at";

impl SessionStore for SqliteSessionStore {
    fn create_session<'a>(
        &'a self,
        user_id: &'a str,
        website_url: &'a str,
        website_title: &'a str,
        language: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Session>> + Send + 'a>> {
        Box::pin(async move {
            let session_id = Uuid::new_v4().to_string();
            let now = Utc::now();
            let timestamp = now.to_rfc3339();

            sqlx::query(
                "INSERT INTO chat_sessions \
                     (id, user_id, website_url, website_title, language, messages, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, '[]', $6, $6)",
            )
            .bind(&session_id)
            .bind(user_id)
            .bind(website_url)
            .bind(website_title)
            .bind(language)
            .bind(&timestamp)
            .execute(&self.pool)
            .await
            .context("insert session")?;

            Ok(Session {
                id: session_id,
                user_id: user_id.to_string(),
                website_url: website_url.to_string(),
                website_title: website_title.to_string(),
                language: language.to_string(),
                messages: Vec::new(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    fn get_session<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Session>>> + Send + 'a>> {
        Box::pin(async move {
            let row = sqlx::query(&format!(
                "SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("query session by id")?;

            row.map(|r| map_session_row(&r)).transpose()
        })
    }

    fn update_messages<'a>(
        &'a self,
        id: &'a str,
        messages: &'a [ChatMessage],
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            let payload = serde_json::to_string(messages).context("serialize messages")?;
            let timestamp = Utc::now().to_rfc3339();

            let result = sqlx::query(
                "UPDATE chat_sessions
                 SET messages = $1, updated_at = $2
                 WHERE id = $3",
            )
            .bind(&payload)
            .bind(&timestamp)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("update session messages")?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn list_sessions<'a>(
        &'a self,
        user_id: &'a str,
        limit: usize,
        offset: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Session>>> + Send + 'a>> {
        Box::pin(async move {
            #[allow(clippy::cast_possible_wrap)]
            let limit_i64 = limit as i64;
            #[allow(clippy::cast_possible_wrap)]
            let offset_i64 = offset as i64;

            let rows = sqlx::query(&format!(
                "SELECT {SESSION_COLUMNS}
                 FROM chat_sessions
                 WHERE user_id = $1
                 ORDER BY updated_at DESC
                 LIMIT $2 OFFSET $3"
            ))
            .bind(user_id)
            .bind(limit_i64)
            .bind(offset_i64)
            .fetch_all(&self.pool)
            .await
            .context("list sessions")?;

            rows.iter().map(map_session_row).collect()
        })
    }

    fn delete_session<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM chat_sessions WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .context("delete session")?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn delete_all_sessions<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + 'a>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM chat_sessions WHERE user_id = $1")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .context("delete sessions for user")?;

            #[allow(clippy::cast_possible_truncation)]
            Ok(result.rows_affected() as usize)
        })
    }
}
