//! Repository for the `videos` table.

use annotator_core::submission::NewVideoGraph;
use annotator_core::types::DbId;
use sqlx::PgPool;

use crate::models::video::{UpdateVideo, Video, VideoDeleteSummary, VideoWithCounts};

/// Column list for videos queries.
pub(crate) const COLUMNS: &str = "id, url, title, annotator, description, topic, duration, \
    notes, status, created_at, updated_at";

/// Column list with the derived query count, for `FROM videos v`.
const COUNTED_COLUMNS: &str = "v.id, v.url, v.title, v.annotator, v.description, v.topic, \
    v.duration, v.notes, v.status, v.created_at, v.updated_at, \
    (SELECT COUNT(*) FROM queries q WHERE q.video_id = v.id) AS query_count";

/// Provides CRUD operations for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a validated video row (without its children) inside `tx`.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewVideoGraph,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos
                (url, title, annotator, description, topic, duration, notes, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(&input.url)
            .bind(&input.title)
            .bind(&input.annotator)
            .bind(&input.description)
            .bind(&input.topic)
            .bind(input.duration)
            .bind(&input.notes)
            .bind(&input.status)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a video by ID, with its query count.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VideoWithCounts>, sqlx::Error> {
        let query = format!("SELECT {COUNTED_COLUMNS} FROM videos v WHERE v.id = $1");
        sqlx::query_as::<_, VideoWithCounts>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a video with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM videos WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List videos in insertion order, optionally filtered by annotator.
    pub async fn list(
        pool: &PgPool,
        annotator: Option<&str>,
    ) -> Result<Vec<VideoWithCounts>, sqlx::Error> {
        let query = format!(
            "SELECT {COUNTED_COLUMNS} FROM videos v
             WHERE ($1::TEXT IS NULL OR v.annotator = $1)
             ORDER BY v.created_at ASC, v.id ASC"
        );
        sqlx::query_as::<_, VideoWithCounts>(&query)
            .bind(annotator)
            .fetch_all(pool)
            .await
    }

    /// Update a video. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                url = COALESCE($2, url),
                title = COALESCE($3, title),
                annotator = COALESCE($4, annotator),
                description = COALESCE($5, description),
                topic = COALESCE($6, topic),
                duration = COALESCE($7, duration),
                notes = COALESCE($8, notes),
                status = COALESCE($9, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(&input.url)
            .bind(&input.title)
            .bind(&input.annotator)
            .bind(&input.description)
            .bind(&input.topic)
            .bind(input.duration)
            .bind(&input.notes)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Set the workflow status of a video.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("UPDATE videos SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a video with all of its queries and their annotations.
    ///
    /// Children are removed before the parent inside one transaction, so
    /// readers see either the whole graph or none of it. Returns `None` if
    /// the video does not exist (nothing is changed).
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VideoDeleteSummary>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let annotations = sqlx::query(
            "DELETE FROM annotations
             WHERE query_id IN (SELECT id FROM queries WHERE video_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let queries = sqlx::query("DELETE FROM queries WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let video = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if video.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(VideoDeleteSummary {
            queries_deleted: queries.rows_affected(),
            annotations_deleted: annotations.rows_affected(),
        }))
    }
}
