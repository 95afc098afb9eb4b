//! Repository for the `movies` table and the `movie_characters` junction.

use std::collections::BTreeSet;

use moviechars_core::reconcile::{dedupe_ids, missing_ids, ReconcileError, MOVIE_ENTITY};
use moviechars_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::Character;
use crate::models::movie::{CreateMovie, Movie, UpdateMovie};
use crate::repositories::character_repo::COLUMNS_PREFIXED as CHARACTER_COLUMNS;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, title, genre, release_year, director, picture_url, \
    trailer_url, franchise_id, created_at, updated_at";

/// Entity label for character references in junction errors.
const CHARACTER_ENTITY: &str = "Character";

/// Provides CRUD operations for movies and their character associations.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a new movie, returning the created row.
    ///
    /// An unknown `franchise_id` surfaces as a foreign key violation.
    pub async fn create(pool: &PgPool, input: &CreateMovie) -> Result<Movie, sqlx::Error> {
        let query = format!(
            "INSERT INTO movies
                (title, genre, release_year, director, picture_url, trailer_url, franchise_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(&input.title)
            .bind(&input.genre)
            .bind(input.release_year)
            .bind(&input.director)
            .bind(&input.picture_url)
            .bind(&input.trailer_url)
            .bind(input.franchise_id)
            .fetch_one(pool)
            .await
    }

    /// Find a movie by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a movie with the given ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM movies WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List all movies ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<Movie>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM movies ORDER BY id");
        sqlx::query_as::<_, Movie>(&query).fetch_all(pool).await
    }

    /// Replace every editable field of a movie, including its franchise link.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMovie,
    ) -> Result<Option<Movie>, sqlx::Error> {
        let query = format!(
            "UPDATE movies SET
                title = $2,
                genre = $3,
                release_year = $4,
                director = $5,
                picture_url = $6,
                trailer_url = $7,
                franchise_id = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.genre)
            .bind(input.release_year)
            .bind(&input.director)
            .bind(&input.picture_url)
            .bind(&input.trailer_url)
            .bind(input.franchise_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a movie by ID. Its character links go with it.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Character association
    // -----------------------------------------------------------------------

    /// IDs of the characters appearing in a movie, ascending.
    pub async fn character_ids(pool: &PgPool, movie_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT character_id FROM movie_characters WHERE movie_id = $1 ORDER BY character_id",
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
    }

    /// Characters appearing in a movie. Empty if the movie does not exist.
    pub async fn list_characters(
        pool: &PgPool,
        movie_id: DbId,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {CHARACTER_COLUMNS}
             FROM characters c
             JOIN movie_characters mc ON mc.character_id = c.id
             WHERE mc.movie_id = $1
             ORDER BY c.id"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(movie_id)
            .fetch_all(pool)
            .await
    }

    /// Replace all character associations for a movie.
    ///
    /// Every character ID is checked before the junction rows are touched;
    /// unknown IDs fail with `InvalidReference` and nothing is written.
    pub async fn set_characters(
        pool: &PgPool,
        movie_id: DbId,
        character_ids: &[DbId],
    ) -> Result<(), ReconcileError<sqlx::Error>> {
        let mut tx = pool.begin().await.map_err(ReconcileError::Store)?;

        let movie: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM movies WHERE id = $1 FOR UPDATE")
                .bind(movie_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(ReconcileError::Store)?;
        if movie.is_none() {
            return Err(ReconcileError::NotFound {
                entity: MOVIE_ENTITY,
                id: movie_id,
            });
        }

        let target = dedupe_ids(character_ids);
        let requested: Vec<DbId> = target.iter().copied().collect();
        let existing: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM characters WHERE id = ANY($1)")
                .bind(&requested)
                .fetch_all(&mut *tx)
                .await
                .map_err(ReconcileError::Store)?;
        let existing: BTreeSet<DbId> = existing.into_iter().collect();
        let missing = missing_ids(&target, &existing);
        if !missing.is_empty() {
            return Err(ReconcileError::InvalidReference {
                entity: CHARACTER_ENTITY,
                ids: missing,
            });
        }

        // Delete existing
        sqlx::query("DELETE FROM movie_characters WHERE movie_id = $1")
            .bind(movie_id)
            .execute(&mut *tx)
            .await
            .map_err(ReconcileError::Store)?;

        // Insert new associations
        for character_id in &requested {
            sqlx::query("INSERT INTO movie_characters (movie_id, character_id) VALUES ($1, $2)")
                .bind(movie_id)
                .bind(character_id)
                .execute(&mut *tx)
                .await
                .map_err(ReconcileError::Store)?;
        }

        tx.commit().await.map_err(ReconcileError::Store)?;
        tracing::info!(movie_id, characters = requested.len(), "Replaced movie characters");
        Ok(())
    }
}
