//! Shared building blocks for the taskboard crates: logging bootstrap,
//! runtime environment checks, pagination and small HTTP payload types.

pub mod types;
pub mod utils;
pub mod pagination;
pub mod env;
