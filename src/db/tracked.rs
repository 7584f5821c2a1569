//! Per-user tracking store.
//!
//! Atomic per-record create/update/delete keyed by (user, title), plus the
//! joined listing the board hydrates from. The Postgres implementation also
//! owns the shared catalog: creating a tracking record for a title the
//! catalog has never seen pulls full detail from the metadata provider and
//! persists it first.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{Card, Genre, MediaKind, TrackedMedia, TrackedRecord, UserId, WatchStatus};
use crate::services::MetadataProvider;

/// Persistence collaborator for the board
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrackedStore: Send + Sync {
    /// All of the user's tracked titles with their catalog metadata
    async fn list_tracked(&self, user: &UserId) -> AppResult<Vec<TrackedRecord>>;

    /// Moves an existing record to a new status; `NotFound` when the user
    /// does not track the title
    async fn set_status(
        &self,
        user: &UserId,
        title_id: i64,
        status: WatchStatus,
    ) -> AppResult<TrackedRecord>;

    /// Removes a record; `NotFound` when absent
    async fn delete_tracked(&self, user: &UserId, title_id: i64) -> AppResult<()>;

    /// Creates a record, upserting the catalog entry on the way;
    /// `Conflict` when (user, title) is already tracked
    async fn create_tracked(&self, user: &UserId, card: &Card) -> AppResult<TrackedRecord>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgTrackedStore {
    pool: PgPool,
    provider: Arc<dyn MetadataProvider>,
}

#[derive(sqlx::FromRow)]
struct TrackedRow {
    media_id: i64,
    status: String,
    sort_order: i32,
    title: String,
    kind: String,
    poster_path: String,
}

#[derive(sqlx::FromRow)]
struct GenreRow {
    media_id: i64,
    id: i32,
    name: String,
}

impl PgTrackedStore {
    pub fn new(pool: PgPool, provider: Arc<dyn MetadataProvider>) -> Self {
        Self { pool, provider }
    }

    fn row_to_record(row: TrackedRow, genres: Vec<Genre>) -> AppResult<TrackedRecord> {
        let status = WatchStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown status in db: {}", row.status)))?;
        let kind = MediaKind::parse(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown media kind in db: {}", row.kind)))?;

        Ok(TrackedRecord {
            title_id: row.media_id,
            status,
            order: row.sort_order,
            media: TrackedMedia {
                id: row.media_id,
                title: row.title,
                kind,
                poster_path: row.poster_path,
                genres,
            },
        })
    }

    /// Genres for a set of catalog entries, grouped by media id
    async fn load_genres(&self, media_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Genre>>> {
        let rows: Vec<GenreRow> = sqlx::query_as(
            r#"
            SELECT mg.media_id, g.id, g.name
            FROM media_genres mg
            JOIN genres g ON g.id = mg.genre_id
            WHERE mg.media_id = ANY($1)
            ORDER BY g.id
            "#,
        )
        .bind(media_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_media: HashMap<i64, Vec<Genre>> = HashMap::new();
        for row in rows {
            by_media.entry(row.media_id).or_default().push(Genre {
                id: row.id,
                name: row.name,
            });
        }

        Ok(by_media)
    }

    async fn fetch_record(&self, user: &UserId, title_id: i64) -> AppResult<TrackedRecord> {
        let row: Option<TrackedRow> = sqlx::query_as(
            r#"
            SELECT um.media_id, um.status, um.sort_order, m.title, m.kind, m.poster_path
            FROM user_media um
            JOIN media m ON m.id = um.media_id
            WHERE um.user_id = $1 AND um.media_id = $2
            "#,
        )
        .bind(user.as_str())
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| {
            AppError::NotFound(format!("Title {} is not tracked by user", title_id))
        })?;

        let mut genres = self.load_genres(&[title_id]).await?;
        Self::row_to_record(row, genres.remove(&title_id).unwrap_or_default())
    }

    /// Ensures the shared catalog knows the title, fetching detail from the
    /// metadata provider when it does not
    async fn ensure_catalog_entry(&self, kind: MediaKind, title_id: i64) -> AppResult<()> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM media WHERE id = $1")
            .bind(title_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_some() {
            return Ok(());
        }

        let detail = self.provider.get_title_detail(kind, title_id).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO media (id, title, kind, poster_path, last_updated)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(detail.id)
        .bind(&detail.title)
        .bind(kind.as_str())
        .bind(&detail.poster_path)
        .execute(&mut *tx)
        .await?;

        for genre in &detail.genres {
            sqlx::query(
                r#"
                INSERT INTO genres (id, name)
                VALUES ($1, $2)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(genre.id)
            .bind(&genre.name)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO media_genres (media_id, genre_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(detail.id)
            .bind(genre.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            title_id,
            kind = %kind,
            genres = detail.genres.len(),
            "Catalog entry created from metadata provider"
        );

        Ok(())
    }
}

#[async_trait::async_trait]
impl TrackedStore for PgTrackedStore {
    async fn list_tracked(&self, user: &UserId) -> AppResult<Vec<TrackedRecord>> {
        let rows: Vec<TrackedRow> = sqlx::query_as(
            r#"
            SELECT um.media_id, um.status, um.sort_order, m.title, m.kind, m.poster_path
            FROM user_media um
            JOIN media m ON m.id = um.media_id
            WHERE um.user_id = $1
            ORDER BY um.added_at
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        let media_ids: Vec<i64> = rows.iter().map(|r| r.media_id).collect();
        let mut genres = self.load_genres(&media_ids).await?;

        rows.into_iter()
            .map(|row| {
                let g = genres.remove(&row.media_id).unwrap_or_default();
                Self::row_to_record(row, g)
            })
            .collect()
    }

    async fn set_status(
        &self,
        user: &UserId,
        title_id: i64,
        status: WatchStatus,
    ) -> AppResult<TrackedRecord> {
        let result = sqlx::query(
            r#"
            UPDATE user_media
            SET status = $3
            WHERE user_id = $1 AND media_id = $2
            "#,
        )
        .bind(user.as_str())
        .bind(title_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Title {} is not tracked by user",
                title_id
            )));
        }

        tracing::debug!(user = %user, title_id, status = %status, "Tracking status updated");

        self.fetch_record(user, title_id).await
    }

    async fn delete_tracked(&self, user: &UserId, title_id: i64) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_media
            WHERE user_id = $1 AND media_id = $2
            "#,
        )
        .bind(user.as_str())
        .bind(title_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Title {} is not tracked by user",
                title_id
            )));
        }

        tracing::debug!(user = %user, title_id, "Tracking record deleted");

        Ok(())
    }

    async fn create_tracked(&self, user: &UserId, card: &Card) -> AppResult<TrackedRecord> {
        self.ensure_catalog_entry(card.media_kind, card.id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO user_media (user_id, media_id, status, sort_order, added_at)
            VALUES ($1, $2, $3, $4, now())
            "#,
        )
        .bind(user.as_str())
        .bind(card.id)
        .bind(card.status.as_str())
        .bind(card.order)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(AppError::Conflict(format!(
                    "Title {} is already tracked by user",
                    card.id
                )));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user = %user, title_id = card.id, status = %card.status, "Tracking record created");

        self.fetch_record(user, card.id).await
    }
}
