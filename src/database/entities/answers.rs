use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An answer option. `variant` is used by multiple-choice questions,
/// `position` by ordering questions and `left`/`right` by matching ones.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub question_id: Option<i32>,
    pub variant: Option<String>,
    pub is_correct: bool,
    pub position: Option<i32>,
    pub left: Option<String>,
    pub right: Option<String>,
    pub is_deleted: bool,
    pub created_on: ChronoDateTimeUtc,
    pub updated_on: Option<ChronoDateTimeUtc>,
    pub created_by_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::questions::Entity",
        from = "Column::QuestionId",
        to = "super::questions::Column::Id"
    )]
    Questions,
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
