use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub test_id: Option<i32>,
    pub section_id: Option<i32>,
    pub user_id: Option<i32>,
    pub created_on: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session_questions::Entity")]
    SessionQuestions,
}

impl Related<super::session_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionQuestions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
