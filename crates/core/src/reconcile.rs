//! Franchise/movie association reconciliation.
//!
//! Replaces the set of movies linked to a franchise with a target set.
//! Every requested movie id is validated before anything is written, so a
//! request naming an unknown movie leaves the store untouched. Movies that
//! are attached here are taken from whatever franchise owned them before.
//!
//! The store is reached through [`MovieLinkStore`]; callers are expected to
//! run [`reconcile_movies`] against a store bound to a single transaction so
//! the detach and attach batches persist together. Every movie row the call
//! may touch is locked in one step before anything is read or written, so
//! two reconciliations swapping movies between franchises cannot deadlock.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Persistence operations needed to reconcile a franchise's movies.
#[async_trait]
pub trait MovieLinkStore: Send {
    type Error: Send;

    /// Whether the franchise row exists.
    async fn franchise_exists(&mut self, franchise_id: DbId) -> Result<bool, Self::Error>;

    /// Lock every movie in `movie_ids` plus every movie currently linked to
    /// the franchise, in ascending id order, until the unit of work ends.
    async fn lock_movies(
        &mut self,
        franchise_id: DbId,
        movie_ids: &[DbId],
    ) -> Result<(), Self::Error>;

    /// The subset of `movie_ids` that exist as movie rows.
    async fn existing_movie_ids(
        &mut self,
        movie_ids: &[DbId],
    ) -> Result<BTreeSet<DbId>, Self::Error>;

    /// Ids of the movies currently linked to the franchise.
    async fn franchise_movie_ids(
        &mut self,
        franchise_id: DbId,
    ) -> Result<BTreeSet<DbId>, Self::Error>;

    /// Point every movie in `movie_ids` at `franchise_id` (or clear the link
    /// when `None`).
    async fn set_movie_franchise(
        &mut self,
        movie_ids: &[DbId],
        franchise_id: Option<DbId>,
    ) -> Result<(), Self::Error>;
}

// ---------------------------------------------------------------------------
// Errors and outcome
// ---------------------------------------------------------------------------

/// Entity label used in reconciliation errors for the owning franchise.
pub const FRANCHISE_ENTITY: &str = "Franchise";
/// Entity label used in reconciliation errors for referenced movies.
pub const MOVIE_ENTITY: &str = "Movie";

/// Failure modes of a set replacement such as [`reconcile_movies`].
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError<E> {
    /// The row whose association set is being replaced does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Sorted, deduplicated list of the referenced ids that do not exist.
    #[error("Invalid {entity} id(s): {ids:?}")]
    InvalidReference {
        entity: &'static str,
        ids: Vec<DbId>,
    },

    #[error("Store error: {0}")]
    Store(E),
}

impl<E> ReconcileError<E> {
    /// Split into the domain error, or the underlying store error.
    pub fn into_core(self) -> Result<CoreError, E> {
        match self {
            Self::NotFound { entity, id } => Ok(CoreError::NotFound { entity, id }),
            Self::InvalidReference { entity, ids } => {
                Ok(CoreError::InvalidReference { entity, ids })
            }
            Self::Store(err) => Err(err),
        }
    }
}

/// The diff between a franchise's current movies and the requested set.
///
/// All lists are sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Linked by this call (possibly taken from another franchise).
    pub attached: Vec<DbId>,
    /// Unlinked by this call. The movie rows themselves are kept.
    pub detached: Vec<DbId>,
    /// Already linked and left alone.
    pub unchanged: Vec<DbId>,
}

impl ReconcileOutcome {
    /// True when the franchise already had exactly the requested movies.
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Collapse a request list into a set, dropping duplicates.
pub fn dedupe_ids(ids: &[DbId]) -> BTreeSet<DbId> {
    ids.iter().copied().collect()
}

/// Ids in `requested` that are absent from `existing`, ascending.
pub fn missing_ids(requested: &BTreeSet<DbId>, existing: &BTreeSet<DbId>) -> Vec<DbId> {
    requested.difference(existing).copied().collect()
}

/// Compute which movies to attach, detach, and leave alone.
pub fn diff_movie_sets(current: &BTreeSet<DbId>, target: &BTreeSet<DbId>) -> ReconcileOutcome {
    ReconcileOutcome {
        attached: target.difference(current).copied().collect(),
        detached: current.difference(target).copied().collect(),
        unchanged: current.intersection(target).copied().collect(),
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Make the franchise's movie set exactly `target_movie_ids` (deduplicated).
///
/// An empty target detaches every movie from the franchise. No write is
/// issued when the franchise already matches the target.
pub async fn reconcile_movies<S>(
    store: &mut S,
    franchise_id: DbId,
    target_movie_ids: &[DbId],
) -> Result<ReconcileOutcome, ReconcileError<S::Error>>
where
    S: MovieLinkStore + ?Sized,
{
    if !store
        .franchise_exists(franchise_id)
        .await
        .map_err(ReconcileError::Store)?
    {
        return Err(ReconcileError::NotFound {
            entity: FRANCHISE_ENTITY,
            id: franchise_id,
        });
    }

    let target = dedupe_ids(target_movie_ids);
    let requested: Vec<DbId> = target.iter().copied().collect();

    store
        .lock_movies(franchise_id, &requested)
        .await
        .map_err(ReconcileError::Store)?;

    if !target.is_empty() {
        let existing = store
            .existing_movie_ids(&requested)
            .await
            .map_err(ReconcileError::Store)?;
        let missing = missing_ids(&target, &existing);
        if !missing.is_empty() {
            return Err(ReconcileError::InvalidReference {
                entity: MOVIE_ENTITY,
                ids: missing,
            });
        }
    }

    let current = store
        .franchise_movie_ids(franchise_id)
        .await
        .map_err(ReconcileError::Store)?;
    let outcome = diff_movie_sets(&current, &target);

    if !outcome.detached.is_empty() {
        store
            .set_movie_franchise(&outcome.detached, None)
            .await
            .map_err(ReconcileError::Store)?;
    }
    if !outcome.attached.is_empty() {
        store
            .set_movie_franchise(&outcome.attached, Some(franchise_id))
            .await
            .map_err(ReconcileError::Store)?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use assert_matches::assert_matches;

    use super::*;

    /// In-memory store: movie id -> owning franchise.
    #[derive(Debug, Default, Clone)]
    struct MemoryStore {
        franchises: BTreeSet<DbId>,
        movies: BTreeMap<DbId, Option<DbId>>,
        writes: usize,
        fail_writes: bool,
        calls: Vec<&'static str>,
        locked: BTreeSet<DbId>,
    }

    impl MemoryStore {
        fn with(franchises: &[DbId], movies: &[(DbId, Option<DbId>)]) -> Self {
            Self {
                franchises: franchises.iter().copied().collect(),
                movies: movies.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn linked(&self, franchise_id: DbId) -> BTreeSet<DbId> {
            self.movies
                .iter()
                .filter(|(_, owner)| **owner == Some(franchise_id))
                .map(|(id, _)| *id)
                .collect()
        }
    }

    #[async_trait]
    impl MovieLinkStore for MemoryStore {
        type Error = &'static str;

        async fn franchise_exists(&mut self, franchise_id: DbId) -> Result<bool, Self::Error> {
            self.calls.push("franchise_exists");
            Ok(self.franchises.contains(&franchise_id))
        }

        async fn lock_movies(
            &mut self,
            franchise_id: DbId,
            movie_ids: &[DbId],
        ) -> Result<(), Self::Error> {
            self.calls.push("lock_movies");
            let mut rows = self.linked(franchise_id);
            rows.extend(
                movie_ids
                    .iter()
                    .copied()
                    .filter(|id| self.movies.contains_key(id)),
            );
            self.locked.extend(rows);
            Ok(())
        }

        async fn existing_movie_ids(
            &mut self,
            movie_ids: &[DbId],
        ) -> Result<BTreeSet<DbId>, Self::Error> {
            self.calls.push("existing_movie_ids");
            Ok(movie_ids
                .iter()
                .copied()
                .filter(|id| self.movies.contains_key(id))
                .collect())
        }

        async fn franchise_movie_ids(
            &mut self,
            franchise_id: DbId,
        ) -> Result<BTreeSet<DbId>, Self::Error> {
            self.calls.push("franchise_movie_ids");
            Ok(self.linked(franchise_id))
        }

        async fn set_movie_franchise(
            &mut self,
            movie_ids: &[DbId],
            franchise_id: Option<DbId>,
        ) -> Result<(), Self::Error> {
            self.calls.push("set_movie_franchise");
            if self.fail_writes {
                return Err("storage unavailable");
            }
            self.writes += 1;
            for id in movie_ids {
                self.movies.insert(*id, franchise_id);
            }
            Ok(())
        }
    }

    fn set(ids: &[DbId]) -> BTreeSet<DbId> {
        ids.iter().copied().collect()
    }

    // -- pure helpers --

    #[test]
    fn diff_splits_attach_detach_unchanged() {
        let outcome = diff_movie_sets(&set(&[1, 2, 3]), &set(&[2, 3, 4, 5]));
        assert_eq!(outcome.attached, vec![4, 5]);
        assert_eq!(outcome.detached, vec![1]);
        assert_eq!(outcome.unchanged, vec![2, 3]);
        assert!(!outcome.is_noop());
    }

    #[test]
    fn diff_of_equal_sets_is_noop() {
        let outcome = diff_movie_sets(&set(&[7, 8]), &set(&[8, 7]));
        assert!(outcome.is_noop());
        assert_eq!(outcome.unchanged, vec![7, 8]);
    }

    #[test]
    fn missing_ids_are_sorted() {
        assert_eq!(missing_ids(&set(&[9, 1, 5]), &set(&[5])), vec![1, 9]);
        assert!(missing_ids(&set(&[]), &set(&[1])).is_empty());
    }

    #[test]
    fn dedupe_collapses_duplicates() {
        assert_eq!(dedupe_ids(&[3, 1, 1, 3, 2]), set(&[1, 2, 3]));
    }

    // -- reconcile_movies --

    #[tokio::test]
    async fn reconcile_sets_exact_target() {
        let mut store = MemoryStore::with(
            &[1],
            &[(10, Some(1)), (11, Some(1)), (12, None), (13, None)],
        );

        let outcome = reconcile_movies(&mut store, 1, &[11, 12, 13]).await.unwrap();

        assert_eq!(store.linked(1), set(&[11, 12, 13]));
        assert_eq!(outcome.attached, vec![12, 13]);
        assert_eq!(outcome.detached, vec![10]);
        // Detached movies are kept, just unlinked.
        assert_eq!(store.movies.get(&10), Some(&None));
    }

    #[tokio::test]
    async fn unknown_movie_leaves_store_unchanged() {
        let mut store = MemoryStore::with(&[1], &[(10, Some(1)), (11, None)]);
        let before = store.movies.clone();

        let err = reconcile_movies(&mut store, 1, &[11, 99, 98]).await.unwrap_err();

        assert_matches!(
            err,
            ReconcileError::InvalidReference { entity: "Movie", ids } if ids == vec![98, 99]
        );
        assert_eq!(store.movies, before);
        assert_eq!(store.writes, 0);
    }

    #[tokio::test]
    async fn missing_franchise_is_reported() {
        let mut store = MemoryStore::with(&[1], &[(10, None)]);

        let err = reconcile_movies(&mut store, 2, &[10]).await.unwrap_err();

        assert_matches!(err, ReconcileError::NotFound { entity: "Franchise", id: 2 });
        assert_eq!(store.movies.get(&10), Some(&None));
    }

    #[tokio::test]
    async fn reconcile_is_idempotent() {
        let mut store = MemoryStore::with(&[1], &[(10, Some(1)), (11, None), (12, None)]);

        reconcile_movies(&mut store, 1, &[11, 12]).await.unwrap();
        let after_first = store.movies.clone();
        let writes_after_first = store.writes;

        let second = reconcile_movies(&mut store, 1, &[11, 12]).await.unwrap();

        assert!(second.is_noop());
        assert_eq!(store.movies, after_first);
        assert_eq!(store.writes, writes_after_first);
    }

    #[tokio::test]
    async fn empty_target_detaches_everything() {
        let mut store = MemoryStore::with(&[1, 2], &[(10, Some(1)), (11, Some(1)), (12, Some(2))]);

        let outcome = reconcile_movies(&mut store, 1, &[]).await.unwrap();

        assert!(store.linked(1).is_empty());
        assert_eq!(outcome.detached, vec![10, 11]);
        // Other franchises are not touched.
        assert_eq!(store.linked(2), set(&[12]));
    }

    #[tokio::test]
    async fn attaching_takes_movie_from_other_franchise() {
        let mut store = MemoryStore::with(&[1, 2], &[(10, Some(1)), (11, Some(1))]);

        reconcile_movies(&mut store, 2, &[10]).await.unwrap();

        assert_eq!(store.linked(2), set(&[10]));
        assert_eq!(store.linked(1), set(&[11]));
    }

    #[tokio::test]
    async fn duplicate_ids_behave_like_unique_ids() {
        let seed = MemoryStore::with(&[1], &[(1, None), (2, None), (3, Some(1))]);

        let mut with_dupes = seed.clone();
        let mut without = seed;
        let a = reconcile_movies(&mut with_dupes, 1, &[1, 1, 2]).await.unwrap();
        let b = reconcile_movies(&mut without, 1, &[1, 2]).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(with_dupes.movies, without.movies);
        assert_eq!(with_dupes.linked(1), set(&[1, 2]));
    }

    #[tokio::test]
    async fn locks_old_and_new_movies_before_reading() {
        let mut store = MemoryStore::with(
            &[1, 2],
            &[(10, Some(1)), (11, Some(2)), (12, None), (13, Some(2))],
        );

        reconcile_movies(&mut store, 1, &[11, 12]).await.unwrap();

        assert_eq!(store.locked, set(&[10, 11, 12]));
        assert_eq!(
            store.calls[..4],
            [
                "franchise_exists",
                "lock_movies",
                "existing_movie_ids",
                "franchise_movie_ids"
            ]
        );
    }

    #[tokio::test]
    async fn empty_target_still_locks_linked_movies() {
        let mut store = MemoryStore::with(&[1], &[(10, Some(1)), (11, None)]);

        reconcile_movies(&mut store, 1, &[]).await.unwrap();

        assert_eq!(store.locked, set(&[10]));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let mut store = MemoryStore::with(&[1], &[(10, None)]);
        store.fail_writes = true;

        let err = reconcile_movies(&mut store, 1, &[10]).await.unwrap_err();

        assert_matches!(err, ReconcileError::Store("storage unavailable"));
    }

    #[test]
    fn into_core_keeps_domain_errors() {
        let err: ReconcileError<&str> = ReconcileError::InvalidReference {
            entity: MOVIE_ENTITY,
            ids: vec![4],
        };
        assert_matches!(
            err.into_core(),
            Ok(CoreError::InvalidReference { entity: "Movie", ids }) if ids == vec![4]
        );

        let err: ReconcileError<&str> = ReconcileError::Store("down");
        assert_matches!(err.into_core(), Err("down"));
    }
}
