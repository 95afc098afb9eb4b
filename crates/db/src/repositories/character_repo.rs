//! Repository for the `characters` table.

use moviechars_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::{Character, CreateCharacter, UpdateCharacter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, full_name, alias, gender, picture_url, created_at, updated_at";

/// Same columns qualified with the `c` alias, for JOIN queries.
pub(crate) const COLUMNS_PREFIXED: &str =
    "c.id, c.full_name, c.alias, c.gender, c.picture_url, c.created_at, c.updated_at";

/// Provides CRUD operations for characters.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (full_name, alias, gender, picture_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(&input.full_name)
            .bind(&input.alias)
            .bind(&input.gender)
            .bind(&input.picture_url)
            .fetch_one(pool)
            .await
    }

    /// Find a character by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all characters ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters ORDER BY id");
        sqlx::query_as::<_, Character>(&query)
            .fetch_all(pool)
            .await
    }

    /// Replace every editable field of a character.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                full_name = $2,
                alias = $3,
                gender = $4,
                picture_url = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.alias)
            .bind(&input.gender)
            .bind(&input.picture_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a character by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// IDs of the movies a character appears in, ascending.
    pub async fn movie_ids(pool: &PgPool, character_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT movie_id FROM movie_characters WHERE character_id = $1 ORDER BY movie_id",
        )
        .bind(character_id)
        .fetch_all(pool)
        .await
    }
}
