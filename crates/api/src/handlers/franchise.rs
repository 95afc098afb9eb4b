//! Handlers for the `/franchises` resource.
//!
//! Besides plain CRUD, a franchise exposes its movies and the characters
//! appearing in them, and accepts a full replacement of its movie set.

use axum::extract::State;
use axum::http::{HeaderName, StatusCode};
use axum::Json;
use moviechars_core::error::CoreError;
use moviechars_core::types::DbId;
use moviechars_db::models::character::CharacterRead;
use moviechars_db::models::franchise::{
    CreateFranchise, Franchise, FranchiseRead, UpdateFranchise,
};
use moviechars_db::models::movie::MovieRead;
use moviechars_db::repositories::FranchiseRepo;
use moviechars_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::character::character_reads;
use crate::handlers::movie::movie_reads;
use crate::handlers::{ensure_matching_id, location};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Franchise",
        id,
    })
}

async fn to_read(pool: &DbPool, franchise: Franchise) -> AppResult<FranchiseRead> {
    let movies = FranchiseRepo::movie_ids(pool, franchise.id).await?;
    Ok(FranchiseRead::from_row(franchise, movies))
}

/// GET /api/v1/franchises
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<FranchiseRead>>> {
    let franchises = FranchiseRepo::list(&state.pool).await?;
    let mut result = Vec::with_capacity(franchises.len());
    for franchise in franchises {
        result.push(to_read(&state.pool, franchise).await?);
    }
    Ok(Json(result))
}

/// GET /api/v1/franchises/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<FranchiseRead>> {
    let franchise = FranchiseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(to_read(&state.pool, franchise).await?))
}

/// POST /api/v1/franchises
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateFranchise>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<FranchiseRead>)> {
    input.validate()?;
    let franchise = FranchiseRepo::create(&state.pool, &input).await?;
    tracing::info!(franchise_id = franchise.id, "Franchise created");
    Ok((
        StatusCode::CREATED,
        location(format!("/api/v1/franchises/{}", franchise.id)),
        Json(FranchiseRead::from_row(franchise, Vec::new())),
    ))
}

/// PUT /api/v1/franchises/{id}
///
/// Replaces every field. The body `id` must match the path.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateFranchise>,
) -> AppResult<StatusCode> {
    ensure_matching_id(id, input.id)?;
    input.validate()?;
    FranchiseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/franchises/{id}
///
/// The franchise's movies are detached, not deleted.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if FranchiseRepo::delete(&state.pool, id).await? {
        tracing::info!(franchise_id = id, "Franchise deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Movies sub-resource
// ---------------------------------------------------------------------------

/// GET /api/v1/franchises/{id}/movies
///
/// If the franchise is deleted between the existence check and the fetch,
/// the fetch simply returns an empty list.
pub async fn list_movies(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Vec<MovieRead>>> {
    if !FranchiseRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }
    let movies = FranchiseRepo::list_movies(&state.pool, id).await?;
    Ok(Json(movie_reads(&state.pool, movies).await?))
}

/// PUT /api/v1/franchises/{id}/movies
///
/// Body is the complete list of movie ids the franchise should own.
/// Unknown movie ids yield 400 and leave every association unchanged.
pub async fn update_movies(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(movie_ids): AppJson<Vec<DbId>>,
) -> AppResult<StatusCode> {
    FranchiseRepo::reconcile_movies(&state.pool, id, &movie_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Characters sub-resource
// ---------------------------------------------------------------------------

/// GET /api/v1/franchises/{id}/characters
pub async fn list_characters(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Vec<CharacterRead>>> {
    if !FranchiseRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }
    let characters = FranchiseRepo::list_characters(&state.pool, id).await?;
    Ok(Json(character_reads(&state.pool, characters).await?))
}
