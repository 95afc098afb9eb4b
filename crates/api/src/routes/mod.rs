pub mod character;
pub mod franchise;
pub mod health;
pub mod movie;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /franchises                                      list, create
/// /franchises/{id}                                 get, replace, delete
/// /franchises/{id}/movies                          list, replace movie set
/// /franchises/{id}/characters                      list (through movies)
///
/// /movies                                          list, create
/// /movies/{id}                                     get, replace, delete
/// /movies/{id}/characters                          list, replace character set
///
/// /characters                                      list, create
/// /characters/{id}                                 get, replace, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/franchises", franchise::router())
        .nest("/movies", movie::router())
        .nest("/characters", character::router())
}
