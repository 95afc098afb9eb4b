//! Franchise entity model and DTOs.

use moviechars_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A franchise row from the `franchises` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Franchise {
    pub id: DbId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new franchise.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFranchise {
    #[validate(length(max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub description: Option<String>,
}

/// DTO for replacing a franchise. Every field is written; omitted optional
/// fields are cleared.
///
/// `id` must match the id in the request path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFranchise {
    pub id: DbId,
    #[validate(length(max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub description: Option<String>,
}

/// Response shape for a franchise: its fields plus the ids of its movies.
#[derive(Debug, Clone, Serialize)]
pub struct FranchiseRead {
    pub id: DbId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub movies: Vec<DbId>,
}

impl FranchiseRead {
    pub fn from_row(franchise: Franchise, movies: Vec<DbId>) -> Self {
        Self {
            id: franchise.id,
            name: franchise.name,
            description: franchise.description,
            movies,
        }
    }
}
