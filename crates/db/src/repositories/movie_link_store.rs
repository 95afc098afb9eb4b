//! Postgres implementation of the franchise/movie link store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use moviechars_core::reconcile::MovieLinkStore;
use moviechars_core::types::DbId;
use sqlx::PgConnection;

/// [`MovieLinkStore`] over a single connection, normally an open transaction.
///
/// The franchise row is locked `FOR UPDATE`, so a concurrent reconciliation
/// of the same franchise waits for this one to commit. Movie rows are locked
/// by [`MovieLinkStore::lock_movies`] in a single ordered statement; the later
/// reads run against rows this transaction already holds.
pub struct PgMovieLinkStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgMovieLinkStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl MovieLinkStore for PgMovieLinkStore<'_> {
    type Error = sqlx::Error;

    async fn franchise_exists(&mut self, franchise_id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM franchises WHERE id = $1 FOR UPDATE")
                .bind(franchise_id)
                .fetch_optional(&mut *self.conn)
                .await?;
        Ok(row.is_some())
    }

    async fn lock_movies(
        &mut self,
        franchise_id: DbId,
        movie_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let locked: Vec<DbId> = sqlx::query_scalar(
            "SELECT id FROM movies
             WHERE id = ANY($1) OR franchise_id = $2
             ORDER BY id
             FOR UPDATE",
        )
        .bind(movie_ids)
        .bind(franchise_id)
        .fetch_all(&mut *self.conn)
        .await?;
        tracing::debug!(franchise_id, rows = locked.len(), "Locked movie rows");
        Ok(())
    }

    async fn existing_movie_ids(
        &mut self,
        movie_ids: &[DbId],
    ) -> Result<BTreeSet<DbId>, sqlx::Error> {
        let ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM movies WHERE id = ANY($1)")
                .bind(movie_ids)
                .fetch_all(&mut *self.conn)
                .await?;
        Ok(ids.into_iter().collect())
    }

    async fn franchise_movie_ids(
        &mut self,
        franchise_id: DbId,
    ) -> Result<BTreeSet<DbId>, sqlx::Error> {
        let ids: Vec<DbId> =
            sqlx::query_scalar("SELECT id FROM movies WHERE franchise_id = $1")
                .bind(franchise_id)
                .fetch_all(&mut *self.conn)
                .await?;
        Ok(ids.into_iter().collect())
    }

    async fn set_movie_franchise(
        &mut self,
        movie_ids: &[DbId],
        franchise_id: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query("UPDATE movies SET franchise_id = $2 WHERE id = ANY($1)")
            .bind(movie_ids)
            .bind(franchise_id)
            .execute(&mut *self.conn)
            .await?;
        tracing::debug!(
            rows = result.rows_affected(),
            ?franchise_id,
            "Updated movie franchise links"
        );
        Ok(())
    }
}
