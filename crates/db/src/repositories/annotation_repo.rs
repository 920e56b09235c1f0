//! Repository for the `annotations` table.

use annotator_core::submission::NewAnnotation;
use annotator_core::types::DbId;
use sqlx::PgPool;

use crate::models::annotation::{Annotation, UpdateAnnotation};

/// Column list for annotations queries.
const COLUMNS: &str = "id, query_id, start_timestamp, end_timestamp, notes, is_annotated, \
    created_at, updated_at";

/// Provides CRUD operations for annotations.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// Insert an annotation inside `tx`.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        query_id: DbId,
        input: &NewAnnotation,
    ) -> Result<Annotation, sqlx::Error> {
        let query = format!(
            "INSERT INTO annotations (query_id, start_timestamp, end_timestamp, notes, is_annotated)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(query_id)
            .bind(&input.start_timestamp)
            .bind(&input.end_timestamp)
            .bind(&input.notes)
            .bind(&input.is_annotated)
            .fetch_one(&mut **tx)
            .await
    }

    /// Create an annotation under a query.
    pub async fn create(
        pool: &PgPool,
        query_id: DbId,
        input: &NewAnnotation,
    ) -> Result<Annotation, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row = Self::insert_tx(&mut tx, query_id, input).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Find an annotation by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM annotations WHERE id = $1");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a query's annotations in insertion order.
    pub async fn list_by_query(
        pool: &PgPool,
        query_id: DbId,
    ) -> Result<Vec<Annotation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM annotations
             WHERE query_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(query_id)
            .fetch_all(pool)
            .await
    }

    /// Update an annotation. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAnnotation,
    ) -> Result<Option<Annotation>, sqlx::Error> {
        let query = format!(
            "UPDATE annotations SET
                start_timestamp = COALESCE($2, start_timestamp),
                end_timestamp = COALESCE($3, end_timestamp),
                notes = COALESCE($4, notes),
                is_annotated = COALESCE($5, is_annotated)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .bind(&input.start_timestamp)
            .bind(&input.end_timestamp)
            .bind(&input.notes)
            .bind(&input.is_annotated)
            .fetch_optional(pool)
            .await
    }

    /// Set the `is_annotated` flag.
    pub async fn set_annotated(
        pool: &PgPool,
        id: DbId,
        is_annotated: &str,
    ) -> Result<Option<Annotation>, sqlx::Error> {
        let query =
            format!("UPDATE annotations SET is_annotated = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Annotation>(&query)
            .bind(id)
            .bind(is_annotated)
            .fetch_optional(pool)
            .await
    }

    /// Delete an annotation by ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM annotations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
