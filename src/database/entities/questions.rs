use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `None` means the question is not filed under any section.
    pub section_id: Option<i32>,
    /// HTML-escaped question text.
    pub text: String,
    pub explanation: Option<String>,
    pub question_type: i32,
    pub category_id: Option<i32>,
    pub is_deleted: bool,
    pub created_on: ChronoDateTimeUtc,
    pub updated_on: Option<ChronoDateTimeUtc>,
    pub created_by_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sections::Entity",
        from = "Column::SectionId",
        to = "super::sections::Column::Id"
    )]
    Sections,
    #[sea_orm(
        belongs_to = "super::question_categories::Entity",
        from = "Column::CategoryId",
        to = "super::question_categories::Column::Id"
    )]
    QuestionCategories,
    #[sea_orm(has_many = "super::answers::Entity")]
    Answers,
    #[sea_orm(has_many = "super::session_questions::Entity")]
    SessionQuestions,
}

impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sections.def()
    }
}

impl Related<super::question_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionCategories.def()
    }
}

impl Related<super::answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl Related<super::session_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionQuestions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
