//! Route definitions for the `/franchises` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::franchise;
use crate::state::AppState;

/// Routes mounted at `/franchises`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> update
/// DELETE /{id}                 -> delete
///
/// GET    /{id}/movies          -> list_movies
/// PUT    /{id}/movies          -> update_movies
/// GET    /{id}/characters      -> list_characters
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(franchise::list).post(franchise::create))
        .route(
            "/{id}",
            get(franchise::get_by_id)
                .put(franchise::update)
                .delete(franchise::delete),
        )
        .route(
            "/{id}/movies",
            get(franchise::list_movies).put(franchise::update_movies),
        )
        .route("/{id}/characters", get(franchise::list_characters))
}
