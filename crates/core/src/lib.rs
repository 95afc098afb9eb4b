//! Domain types, errors and pure logic for the movie characters API.
//!
//! Nothing in this crate touches the database directly; persistence is
//! reached through the [`reconcile::MovieLinkStore`] trait.

pub mod error;
pub mod reconcile;
pub mod types;
