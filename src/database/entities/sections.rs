use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub test_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Minutes allowed for the section.
    pub timer: Option<i32>,
    pub is_exam: bool,
    /// Moscow local time; only meaningful together with `is_exam`.
    pub results_available_from: Option<ChronoDateTime>,
    pub meta: bool,
    pub is_deleted: bool,
    pub created_on: ChronoDateTimeUtc,
    pub updated_on: Option<ChronoDateTimeUtc>,
    pub created_by_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quiz_tests::Entity",
        from = "Column::TestId",
        to = "super::quiz_tests::Column::Id"
    )]
    Tests,
    #[sea_orm(has_many = "super::questions::Entity")]
    Questions,
}

impl Related<super::quiz_tests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tests.def()
    }
}

impl Related<super::questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
