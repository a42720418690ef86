use std::sync::Arc;

use chrono::FixedOffset;
use models::status::StatusSet;
use sea_orm::DatabaseConnection;

/// Shared by every handler. The pool is the only mutable resource behind it.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub statuses: Arc<StatusSet>,
    /// Server time zone; naive form date-times are read in it.
    pub tz: FixedOffset,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, statuses: StatusSet, tz: FixedOffset) -> Self {
        Self { db, statuses: Arc::new(statuses), tz }
    }
}
