//! Repository for the `queries` table.

use annotator_core::submission::NewQuery;
use annotator_core::types::DbId;
use sqlx::PgPool;

use crate::models::query::{Query, QueryWithCounts};
use crate::repositories::AnnotationRepo;

/// Column list for queries queries.
const COLUMNS: &str = "id, video_id, query_text, status, query_types, created_at, updated_at";

/// Column list with the derived annotation count, for `FROM queries q`.
const COUNTED_COLUMNS: &str = "q.id, q.video_id, q.query_text, q.status, q.query_types, \
    q.created_at, q.updated_at, \
    (SELECT COUNT(*) FROM annotations a WHERE a.query_id = q.id) AS annotation_count";

/// Validated field changes for [`QueryRepo::update`].
#[derive(Debug, Clone, Default)]
pub struct QueryChanges {
    pub query_text: Option<String>,
    pub query_types: Option<Vec<String>>,
    pub status: Option<String>,
}

/// Provides CRUD operations for queries.
pub struct QueryRepo;

impl QueryRepo {
    /// Insert a query and its nested annotations inside `tx`.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        video_id: DbId,
        input: &NewQuery,
    ) -> Result<Query, sqlx::Error> {
        let query = format!(
            "INSERT INTO queries (video_id, query_text, status, query_types)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, Query>(&query)
            .bind(video_id)
            .bind(&input.query_text)
            .bind(&input.status)
            .bind(&input.query_types)
            .fetch_one(&mut **tx)
            .await?;

        for annotation in &input.annotations {
            AnnotationRepo::insert_tx(tx, row.id, annotation).await?;
        }

        Ok(row)
    }

    /// Create a query (with any nested annotations) under a video.
    pub async fn create(
        pool: &PgPool,
        video_id: DbId,
        input: &NewQuery,
    ) -> Result<Query, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row = Self::insert_tx(&mut tx, video_id, input).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Find a query by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Query>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM queries WHERE id = $1");
        sqlx::query_as::<_, Query>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a query with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM queries WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List a video's queries in insertion order, with annotation counts.
    pub async fn list_by_video(
        pool: &PgPool,
        video_id: DbId,
    ) -> Result<Vec<QueryWithCounts>, sqlx::Error> {
        let query = format!(
            "SELECT {COUNTED_COLUMNS} FROM queries q
             WHERE q.video_id = $1
             ORDER BY q.created_at ASC, q.id ASC"
        );
        sqlx::query_as::<_, QueryWithCounts>(&query)
            .bind(video_id)
            .fetch_all(pool)
            .await
    }

    /// Update a query. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &QueryChanges,
    ) -> Result<Option<Query>, sqlx::Error> {
        let query = format!(
            "UPDATE queries SET
                query_text = COALESCE($2, query_text),
                query_types = COALESCE($3, query_types),
                status = COALESCE($4, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Query>(&query)
            .bind(id)
            .bind(&changes.query_text)
            .bind(&changes.query_types)
            .bind(&changes.status)
            .fetch_optional(pool)
            .await
    }

    /// Set the workflow status of a query.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Query>, sqlx::Error> {
        let query = format!("UPDATE queries SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Query>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Append a type to the query's set unless already present.
    pub async fn add_type(
        pool: &PgPool,
        id: DbId,
        query_type: &str,
    ) -> Result<Option<Query>, sqlx::Error> {
        let query = format!(
            "UPDATE queries SET query_types = CASE
                WHEN $2 = ANY(query_types) THEN query_types
                ELSE array_append(query_types, $2)
             END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Query>(&query)
            .bind(id)
            .bind(query_type)
            .fetch_optional(pool)
            .await
    }

    /// Remove a type from the query's set.
    ///
    /// The guard runs in the same statement as the write: returns `None`
    /// (and changes nothing) when the query is missing, does not carry the
    /// type, or the type is its last one.
    pub async fn remove_type(
        pool: &PgPool,
        id: DbId,
        query_type: &str,
    ) -> Result<Option<Query>, sqlx::Error> {
        let query = format!(
            "UPDATE queries SET query_types = array_remove(query_types, $2)
             WHERE id = $1
               AND $2 = ANY(query_types)
               AND cardinality(query_types) > 1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Query>(&query)
            .bind(id)
            .bind(query_type)
            .fetch_optional(pool)
            .await
    }

    /// Delete a query and its annotations in one transaction.
    ///
    /// Returns the number of annotations removed, or `None` if the query
    /// does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let annotations = sqlx::query("DELETE FROM annotations WHERE query_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM queries WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(annotations.rows_affected()))
    }
}
