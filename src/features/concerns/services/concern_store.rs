use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::concerns::models::{Concern, ConcernChanges, NewConcern};

/// Persistence for concerns. Ids and timestamps are assigned by the store.
#[async_trait]
pub trait ConcernStore: Send + Sync {
    async fn create(&self, concern: NewConcern) -> Result<Concern>;

    async fn get(&self, id: i64) -> Result<Option<Concern>>;

    /// One page in review order (unresolved first, then oldest first) and the
    /// total number of concerns
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Concern>, i64)>;

    /// `None` when no concern has this id
    async fn update(&self, id: i64, changes: ConcernChanges) -> Result<Option<Concern>>;
}

const CONCERN_COLUMNS: &str = "id, reporter, ip, headers, document, comment, status, \
     resolved, resolution, resolver, created, modified";

/// PostgreSQL-backed concern store
pub struct PgConcernStore {
    pool: PgPool,
}

impl PgConcernStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConcernStore for PgConcernStore {
    async fn create(&self, concern: NewConcern) -> Result<Concern> {
        let query = format!(
            r#"
            INSERT INTO concerns (reporter, ip, headers, document, comment, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CONCERN_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Concern>(&query)
            .bind(concern.reporter)
            .bind(concern.ip)
            .bind(concern.headers)
            .bind(concern.document)
            .bind(concern.comment)
            .bind(concern.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert concern: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn get(&self, id: i64) -> Result<Option<Concern>> {
        let query = format!("SELECT {CONCERN_COLUMNS} FROM concerns WHERE id = $1");

        sqlx::query_as::<_, Concern>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get concern by ID: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Concern>, i64)> {
        let query = format!(
            r#"
            SELECT {CONCERN_COLUMNS}
            FROM concerns
            ORDER BY resolved ASC, created ASC, id ASC
            LIMIT $1 OFFSET $2
            "#
        );

        let concerns = sqlx::query_as::<_, Concern>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list concerns: {:?}", e);
                AppError::Database(e)
            })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM concerns")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count concerns: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((concerns, total))
    }

    async fn update(&self, id: i64, changes: ConcernChanges) -> Result<Option<Concern>> {
        let query = format!(
            r#"
            UPDATE concerns SET
                status = $2,
                resolved = $3,
                resolution = $4,
                comment = COALESCE($5, comment),
                document = COALESCE($6, document),
                resolver = $7,
                modified = now()
            WHERE id = $1
            RETURNING {CONCERN_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Concern>(&query)
            .bind(id)
            .bind(changes.status.as_str())
            .bind(changes.resolved)
            .bind(changes.resolution)
            .bind(changes.comment)
            .bind(changes.document)
            .bind(changes.resolver)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update concern {}: {:?}", id, e);
                AppError::Database(e)
            })
    }
}
