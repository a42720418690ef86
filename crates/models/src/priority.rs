use sea_orm::{entity::prelude::*, NotSet, Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

use crate::{errors, task, validation};

pub const NAME_MAX_CHARS: usize = 100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "priority")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Task,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Task => Entity::has_many(task::Entity).into() }
    }
}

impl Related<task::Entity> for Entity {
    fn to() -> RelationDef { Relation::Task.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<String, errors::ModelError> {
    validation::required_text("name", name, Some(NAME_MAX_CHARS))
}

pub async fn create(db: &DatabaseConnection, name: &str) -> Result<Model, errors::ModelError> {
    let name = validate_name(name)?;
    let am = ActiveModel { id: NotSet, name: Set(name) };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Return the priority called `name`, creating it when missing.
pub async fn get_or_create(db: &DatabaseConnection, name: &str) -> Result<Model, errors::ModelError> {
    let name = validate_name(name)?;
    if let Some(found) = Entity::find().filter(Column::Name.eq(name.as_str())).one(db).await? {
        return Ok(found);
    }
    create(db, &name).await
}
