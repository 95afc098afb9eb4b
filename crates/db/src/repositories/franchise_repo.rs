//! Repository for the `franchises` table and its movie associations.

use moviechars_core::reconcile::{reconcile_movies, ReconcileError, ReconcileOutcome};
use moviechars_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::Character;
use crate::models::franchise::{CreateFranchise, Franchise, UpdateFranchise};
use crate::models::movie::Movie;
use crate::repositories::character_repo::COLUMNS_PREFIXED as CHARACTER_COLUMNS;
use crate::repositories::movie_link_store::PgMovieLinkStore;
use crate::repositories::movie_repo::COLUMNS as MOVIE_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides CRUD operations for franchises.
pub struct FranchiseRepo;

impl FranchiseRepo {
    /// Insert a new franchise, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFranchise) -> Result<Franchise, sqlx::Error> {
        let query = format!(
            "INSERT INTO franchises (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Franchise>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a franchise by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Franchise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM franchises WHERE id = $1");
        sqlx::query_as::<_, Franchise>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a franchise with the given ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM franchises WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List all franchises ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<Franchise>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM franchises ORDER BY id");
        sqlx::query_as::<_, Franchise>(&query).fetch_all(pool).await
    }

    /// Replace every editable field of a franchise.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFranchise,
    ) -> Result<Option<Franchise>, sqlx::Error> {
        let query = format!(
            "UPDATE franchises SET
                name = $2,
                description = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Franchise>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a franchise by ID. Its movies are detached, not deleted.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM franchises WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Movie association
    // -----------------------------------------------------------------------

    /// IDs of the movies linked to a franchise, ascending.
    pub async fn movie_ids(pool: &PgPool, franchise_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM movies WHERE franchise_id = $1 ORDER BY id")
            .bind(franchise_id)
            .fetch_all(pool)
            .await
    }

    /// Movies linked to a franchise. Empty if the franchise does not exist.
    pub async fn list_movies(pool: &PgPool, franchise_id: DbId) -> Result<Vec<Movie>, sqlx::Error> {
        let query =
            format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE franchise_id = $1 ORDER BY id");
        sqlx::query_as::<_, Movie>(&query)
            .bind(franchise_id)
            .fetch_all(pool)
            .await
    }

    /// Distinct characters appearing in any movie of the franchise.
    pub async fn list_characters(
        pool: &PgPool,
        franchise_id: DbId,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT {CHARACTER_COLUMNS}
             FROM characters c
             JOIN movie_characters mc ON mc.character_id = c.id
             JOIN movies m ON m.id = mc.movie_id
             WHERE m.franchise_id = $1
             ORDER BY c.id"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(franchise_id)
            .fetch_all(pool)
            .await
    }

    /// Replace the franchise's movie set with `movie_ids` in one transaction.
    ///
    /// Fails with `NotFound` if the franchise is missing and with
    /// `InvalidReference` if any movie ID is unknown; in both cases nothing
    /// is written.
    pub async fn reconcile_movies(
        pool: &PgPool,
        franchise_id: DbId,
        movie_ids: &[DbId],
    ) -> Result<ReconcileOutcome, ReconcileError<sqlx::Error>> {
        let mut tx = pool.begin().await.map_err(ReconcileError::Store)?;

        let outcome = {
            let mut store = PgMovieLinkStore::new(&mut *tx);
            reconcile_movies(&mut store, franchise_id, movie_ids).await?
        };

        tx.commit().await.map_err(ReconcileError::Store)?;

        tracing::info!(
            franchise_id,
            attached = outcome.attached.len(),
            detached = outcome.detached.len(),
            unchanged = outcome.unchanged.len(),
            "Reconciled franchise movies"
        );
        Ok(outcome)
    }
}
