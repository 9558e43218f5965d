use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A question as answered within a quiz session. Rows without a
/// `quiz_session_id` are templates, and `max_score == 0` means the answer has
/// not been graded yet.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub quiz_session_id: Option<i32>,
    pub question_id: i32,
    pub network_guid: Option<String>,
    pub score: i32,
    pub max_score: i32,
    pub is_correct: Option<bool>,
    pub created_on: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quiz_sessions::Entity",
        from = "Column::QuizSessionId",
        to = "super::quiz_sessions::Column::Id"
    )]
    QuizSessions,
    #[sea_orm(
        belongs_to = "super::questions::Entity",
        from = "Column::QuestionId",
        to = "super::questions::Column::Id"
    )]
    Questions,
}

impl Related<super::quiz_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizSessions.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
