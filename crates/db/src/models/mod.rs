//! Row models and request/response DTOs, one module per table.

pub mod character;
pub mod franchise;
pub mod movie;
