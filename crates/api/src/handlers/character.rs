//! Handlers for the `/characters` resource.

use axum::extract::State;
use axum::http::{HeaderName, StatusCode};
use axum::Json;
use moviechars_core::error::CoreError;
use moviechars_core::types::DbId;
use moviechars_db::models::character::{
    Character, CharacterRead, CreateCharacter, UpdateCharacter,
};
use moviechars_db::repositories::CharacterRepo;
use moviechars_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::{ensure_matching_id, location};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Character",
        id,
    })
}

/// Attach movie ids to each character row.
pub(crate) async fn character_reads(
    pool: &DbPool,
    characters: Vec<Character>,
) -> AppResult<Vec<CharacterRead>> {
    let mut result = Vec::with_capacity(characters.len());
    for character in characters {
        let movies = CharacterRepo::movie_ids(pool, character.id).await?;
        result.push(CharacterRead::from_row(character, movies));
    }
    Ok(result)
}

/// GET /api/v1/characters
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<CharacterRead>>> {
    let characters = CharacterRepo::list(&state.pool).await?;
    Ok(Json(character_reads(&state.pool, characters).await?))
}

/// GET /api/v1/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<CharacterRead>> {
    let character = CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let movies = CharacterRepo::movie_ids(&state.pool, id).await?;
    Ok(Json(CharacterRead::from_row(character, movies)))
}

/// POST /api/v1/characters
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCharacter>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<CharacterRead>)> {
    input.validate()?;
    let character = CharacterRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        location(format!("/api/v1/characters/{}", character.id)),
        Json(CharacterRead::from_row(character, Vec::new())),
    ))
}

/// PUT /api/v1/characters/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCharacter>,
) -> AppResult<StatusCode> {
    ensure_matching_id(id, input.id)?;
    input.validate()?;
    CharacterRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/characters/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if CharacterRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
