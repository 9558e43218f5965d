use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Title given to a network until its owner renames it.
pub const DEFAULT_TITLE: &str = "Новая сеть";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "networks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub guid: String,
    pub author_id: i32,
    pub title: String,
    pub share_mode: bool,
    pub network: String, // JSON string
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::simulates::Entity")]
    Simulates,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::simulates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Simulates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
