//! Service layer: listing, CRUD and reporting on top of `models`.
//! - Every list goes through the shared search/sort builder in [`query`].
//! - Writes validate the full input before touching the store.
//! - Multi-row deletes run inside one transaction.

pub mod errors;
pub mod query;
pub mod category_service;
pub mod priority_service;
pub mod task_service;
pub mod subtask_service;
pub mod note_service;
pub mod dashboard;
pub mod seed;
#[cfg(test)]
pub mod test_support;
