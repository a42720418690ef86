use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{category, errors, note, priority, subtask, validation};

pub const TITLE_MAX_CHARS: usize = 200;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: String,
    pub deadline: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub priority_id: Option<i32>,
    pub category_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Priority,
    Category,
    Subtask,
    Note,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Priority => Entity::belongs_to(priority::Entity)
                .from(Column::PriorityId)
                .to(priority::Column::Id)
                .into(),
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
            Relation::Subtask => Entity::has_many(subtask::Entity).into(),
            Relation::Note => Entity::has_many(note::Entity).into(),
        }
    }
}

impl Related<priority::Entity> for Entity {
    fn to() -> RelationDef { Relation::Priority.def() }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl Related<subtask::Entity> for Entity {
    fn to() -> RelationDef { Relation::Subtask.def() }
}

impl Related<note::Entity> for Entity {
    fn to() -> RelationDef { Relation::Note.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<String, errors::ModelError> {
    validation::required_text("title", title, Some(TITLE_MAX_CHARS))
}

pub fn validate_description(description: &str) -> Result<String, errors::ModelError> {
    validation::required_text("description", description, None)
}

const NAIVE_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse a deadline from user input.
///
/// RFC 3339 instants keep their own offset. Naive date-times (as submitted by
/// `datetime-local` form fields) are interpreted in the server time zone `tz`.
pub fn parse_deadline(raw: &str, tz: FixedOffset) -> Result<DateTime<FixedOffset>, errors::ModelError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(errors::ModelError::Validation("deadline required".into()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return tz
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| errors::ModelError::Validation(format!("deadline `{raw}` is ambiguous")));
        }
    }
    Err(errors::ModelError::Validation(format!("deadline `{raw}` is not a valid date-time")))
}
