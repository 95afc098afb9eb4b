//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod character_repo;
pub mod franchise_repo;
pub mod movie_link_store;
pub mod movie_repo;

pub use character_repo::CharacterRepo;
pub use franchise_repo::FranchiseRepo;
pub use movie_link_store::PgMovieLinkStore;
pub use movie_repo::MovieRepo;
