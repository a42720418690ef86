//! sea-orm entities for the task board: reference tables (`category`,
//! `priority`), the `task` aggregate and its `subtask`/`note` children.

pub mod errors;
pub mod db;
pub mod validation;
pub mod status;
pub mod category;
pub mod priority;
pub mod task;
pub mod subtask;
pub mod note;

#[cfg(test)]
mod tests;
