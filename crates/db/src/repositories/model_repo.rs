//! Repository for the `generated_models` table.
//!
//! Rows are keyed by the provider task id. Lifecycle writes
//! (`mark_terminal`, `upsert_result`) are idempotent so repeated status
//! polls and concurrent browser sessions are safe. Lookup helpers that
//! take a `user_id` deliberately conflate "absent" with "not owned".

use sqlx::PgPool;

use crate::models::generated_model::{
    AdminModelRow, CreateGeneratedModel, GeneratedModel, RatingStats,
};

/// Column list for `generated_models` queries.
const COLUMNS: &str = "id, user_id, service_type, model_url, thumbnail_url, prompt, \
    credits_cost, status, rating, comment, created_at, updated_at";

/// Column list for admin rows joined with the owning user.
const ADMIN_COLUMNS: &str = "gm.id, gm.user_id, gm.service_type, gm.model_url, \
    gm.thumbnail_url, gm.prompt, gm.credits_cost, gm.status, gm.rating, gm.comment, \
    gm.created_at, gm.updated_at, u.email AS user_email, u.created_at AS user_created_at";

/// CRUD and lifecycle operations for generated model records.
pub struct ModelRepo;

impl ModelRepo {
    /// Insert a new model record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneratedModel,
    ) -> Result<GeneratedModel, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_models
                (id, user_id, service_type, model_url, thumbnail_url, prompt,
                 credits_cost, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedModel>(&query)
            .bind(&input.id)
            .bind(&input.user_id)
            .bind(&input.service_type)
            .bind(&input.model_url)
            .bind(&input.thumbnail_url)
            .bind(&input.prompt)
            .bind(input.credits_cost)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Insert a record, or refresh result fields when the caller
    /// already has a row for this task id.
    ///
    /// Returns `None` when the task id belongs to a different user --
    /// the record is neither inserted nor updated in that case.
    pub async fn upsert_result(
        pool: &PgPool,
        input: &CreateGeneratedModel,
    ) -> Result<Option<GeneratedModel>, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_models
                (id, user_id, service_type, model_url, thumbnail_url, prompt,
                 credits_cost, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO UPDATE
             SET model_url = EXCLUDED.model_url,
                 thumbnail_url = EXCLUDED.thumbnail_url,
                 status = EXCLUDED.status,
                 updated_at = NOW()
             WHERE generated_models.user_id = EXCLUDED.user_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedModel>(&query)
            .bind(&input.id)
            .bind(&input.user_id)
            .bind(&input.service_type)
            .bind(&input.model_url)
            .bind(&input.thumbnail_url)
            .bind(&input.prompt)
            .bind(input.credits_cost)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Write a terminal status (and result URLs, when present) onto a
    /// record. Keyed by task id and safe to apply more than once.
    ///
    /// Returns `true` if a row was updated.
    pub async fn mark_terminal(
        pool: &PgPool,
        task_id: &str,
        status: &str,
        model_url: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generated_models
             SET status = $2,
                 model_url = COALESCE($3, model_url),
                 thumbnail_url = COALESCE($4, thumbnail_url),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(task_id)
        .bind(status)
        .bind(model_url)
        .bind(thumbnail_url)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a user's records, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GeneratedModel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_models
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, GeneratedModel>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of records owned by a user.
    pub async fn count_for_user(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM generated_models WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Find a record by task id regardless of owner.
    pub async fn find_by_id(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<GeneratedModel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generated_models WHERE id = $1");
        sqlx::query_as::<_, GeneratedModel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a record owned by `user_id`. Absent and not-owned are
    /// indistinguishable by design.
    pub async fn find_owned(
        pool: &PgPool,
        id: &str,
        user_id: &str,
    ) -> Result<Option<GeneratedModel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generated_models WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, GeneratedModel>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a record owned by `user_id`. Returns `true` if deleted.
    pub async fn delete_owned(pool: &PgPool, id: &str, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM generated_models WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach a rating and optional comment to an owned record.
    ///
    /// No state restriction: a record may be rated before completion.
    /// Returns `None` when the record is absent or not owned.
    pub async fn set_rating(
        pool: &PgPool,
        id: &str,
        user_id: &str,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Option<GeneratedModel>, sqlx::Error> {
        let query = format!(
            "UPDATE generated_models
             SET rating = $3, comment = $4, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedModel>(&query)
            .bind(id)
            .bind(user_id)
            .bind(rating)
            .bind(comment)
            .fetch_optional(pool)
            .await
    }

    /// Find an existing reuse of the same result by the same user.
    ///
    /// The duplicate key is the `(model_url, prompt)` pair; `prompt`
    /// comparison treats two NULLs as equal.
    pub async fn find_reuse_duplicate(
        pool: &PgPool,
        user_id: &str,
        model_url: &str,
        prompt: Option<&str>,
    ) -> Result<Option<GeneratedModel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_models
             WHERE user_id = $1 AND model_url = $2 AND prompt IS NOT DISTINCT FROM $3
             LIMIT 1"
        );
        sqlx::query_as::<_, GeneratedModel>(&query)
            .bind(user_id)
            .bind(model_url)
            .bind(prompt)
            .fetch_optional(pool)
            .await
    }

    /// Completed records with a prompt and result URL, newest first:
    /// the candidate set for similarity search.
    pub async fn list_completed_with_prompts(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Vec<GeneratedModel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_models
             WHERE user_id = $1
               AND status = 'COMPLETED'
               AND model_url IS NOT NULL
               AND prompt IS NOT NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, GeneratedModel>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    // ---- admin ----

    /// List all records joined with their owners, newest first.
    pub async fn list_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AdminModelRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ADMIN_COLUMNS}
             FROM generated_models gm
             JOIN users u ON u.id = gm.user_id
             ORDER BY gm.created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, AdminModelRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of records across all users.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM generated_models")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Rating aggregates across all records: how many are rated and
    /// their average rating, rounded to two decimals (0 when none).
    pub async fn rating_stats(pool: &PgPool) -> Result<RatingStats, sqlx::Error> {
        sqlx::query_as::<_, RatingStats>(
            "SELECT COUNT(*) AS total_rated_models,
                    COALESCE(ROUND(AVG(rating)::numeric, 2), 0)::float8 AS average_rating
             FROM generated_models
             WHERE rating IS NOT NULL",
        )
        .fetch_one(pool)
        .await
    }
}
