pub mod character;
pub mod franchise;
pub mod movie;

use axum::http::header::LOCATION;
use axum::http::HeaderName;
use moviechars_core::types::DbId;

use crate::error::{AppError, AppResult};

/// `Location` header pointing at a newly created resource.
pub(crate) fn location(path: String) -> [(HeaderName, String); 1] {
    [(LOCATION, path)]
}

/// Reject a full-replace body whose `id` disagrees with the path.
pub(crate) fn ensure_matching_id(path_id: DbId, body_id: DbId) -> AppResult<()> {
    if path_id != body_id {
        return Err(AppError::BadRequest(format!(
            "Path id {path_id} does not match body id {body_id}"
        )));
    }
    Ok(())
}
