//! Handlers for the `/movies` resource.
//!
//! Characters sub-resource:
//! `/movies/{id}/characters`

use axum::extract::State;
use axum::http::{HeaderName, StatusCode};
use axum::Json;
use moviechars_core::error::CoreError;
use moviechars_core::types::DbId;
use moviechars_db::models::character::CharacterRead;
use moviechars_db::models::movie::{CreateMovie, Movie, MovieRead, UpdateMovie};
use moviechars_db::repositories::MovieRepo;
use moviechars_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::character::character_reads;
use crate::handlers::{ensure_matching_id, location};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Movie",
        id,
    })
}

/// Attach character ids to each movie row.
pub(crate) async fn movie_reads(pool: &DbPool, movies: Vec<Movie>) -> AppResult<Vec<MovieRead>> {
    let mut result = Vec::with_capacity(movies.len());
    for movie in movies {
        let characters = MovieRepo::character_ids(pool, movie.id).await?;
        result.push(MovieRead::from_row(movie, characters));
    }
    Ok(result)
}

/// GET /api/v1/movies
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<MovieRead>>> {
    let movies = MovieRepo::list(&state.pool).await?;
    Ok(Json(movie_reads(&state.pool, movies).await?))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<MovieRead>> {
    let movie = MovieRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let characters = MovieRepo::character_ids(&state.pool, id).await?;
    Ok(Json(MovieRead::from_row(movie, characters)))
}

/// POST /api/v1/movies
///
/// An unknown `franchise_id` is rejected by the foreign key (400).
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateMovie>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<MovieRead>)> {
    input.validate()?;
    let movie = MovieRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        location(format!("/api/v1/movies/{}", movie.id)),
        Json(MovieRead::from_row(movie, Vec::new())),
    ))
}

/// PUT /api/v1/movies/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateMovie>,
) -> AppResult<StatusCode> {
    ensure_matching_id(id, input.id)?;
    input.validate()?;
    MovieRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/movies/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if MovieRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Characters sub-resource
// ---------------------------------------------------------------------------

/// GET /api/v1/movies/{id}/characters
pub async fn list_characters(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Vec<CharacterRead>>> {
    if !MovieRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }
    let characters = MovieRepo::list_characters(&state.pool, id).await?;
    Ok(Json(character_reads(&state.pool, characters).await?))
}

/// PUT /api/v1/movies/{id}/characters
///
/// Body is the complete list of character ids appearing in the movie.
pub async fn update_characters(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(character_ids): AppJson<Vec<DbId>>,
) -> AppResult<StatusCode> {
    MovieRepo::set_characters(&state.pool, id, &character_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}
