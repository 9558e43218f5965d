use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tests::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Tests::Name).string().not_null())
                    .col(ColumnDef::new(Tests::Description).text())
                    .col(ColumnDef::new(Tests::IsReady).boolean().not_null().default(false))
                    .col(ColumnDef::new(Tests::IsRetakeable).boolean().not_null().default(false))
                    .col(ColumnDef::new(Tests::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Tests::CreatedOn).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Tests::UpdatedOn).timestamp_with_time_zone())
                    .col(ColumnDef::new(Tests::CreatedById).integer())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sections::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Sections::TestId).integer().not_null())
                    .col(ColumnDef::new(Sections::Name).string().not_null())
                    .col(ColumnDef::new(Sections::Description).text())
                    .col(ColumnDef::new(Sections::Timer).integer())
                    .col(ColumnDef::new(Sections::IsExam).boolean().not_null().default(false))
                    .col(ColumnDef::new(Sections::ResultsAvailableFrom).date_time())
                    .col(ColumnDef::new(Sections::Meta).boolean().not_null().default(false))
                    .col(ColumnDef::new(Sections::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Sections::CreatedOn).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Sections::UpdatedOn).timestamp_with_time_zone())
                    .col(ColumnDef::new(Sections::CreatedById).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sections_test_id")
                            .from(Sections::Table, Sections::TestId)
                            .to(Tests::Table, Tests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuestionCategories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QuestionCategories::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(QuestionCategories::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Questions::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Questions::SectionId).integer())
                    .col(ColumnDef::new(Questions::Text).text().not_null())
                    .col(ColumnDef::new(Questions::Explanation).text())
                    .col(ColumnDef::new(Questions::QuestionType).integer().not_null().default(0))
                    .col(ColumnDef::new(Questions::CategoryId).integer())
                    .col(ColumnDef::new(Questions::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Questions::CreatedOn).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Questions::UpdatedOn).timestamp_with_time_zone())
                    .col(ColumnDef::new(Questions::CreatedById).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_questions_section_id")
                            .from(Questions::Table, Questions::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_questions_category_id")
                            .from(Questions::Table, Questions::CategoryId)
                            .to(QuestionCategories::Table, QuestionCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Answers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Answers::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Answers::QuestionId).integer())
                    .col(ColumnDef::new(Answers::Variant).text())
                    .col(ColumnDef::new(Answers::IsCorrect).boolean().not_null().default(false))
                    .col(ColumnDef::new(Answers::Position).integer())
                    .col(ColumnDef::new(Answers::Left).text())
                    .col(ColumnDef::new(Answers::Right).text())
                    .col(ColumnDef::new(Answers::IsDeleted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Answers::CreatedOn).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Answers::UpdatedOn).timestamp_with_time_zone())
                    .col(ColumnDef::new(Answers::CreatedById).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answers_question_id")
                            .from(Answers::Table, Answers::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuizSessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QuizSessions::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(QuizSessions::TestId).integer())
                    .col(ColumnDef::new(QuizSessions::SectionId).integer())
                    .col(ColumnDef::new(QuizSessions::UserId).integer())
                    .col(ColumnDef::new(QuizSessions::CreatedOn).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SessionQuestions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SessionQuestions::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(SessionQuestions::QuizSessionId).integer())
                    .col(ColumnDef::new(SessionQuestions::QuestionId).integer().not_null())
                    .col(ColumnDef::new(SessionQuestions::NetworkGuid).string())
                    .col(ColumnDef::new(SessionQuestions::Score).integer().not_null().default(0))
                    .col(ColumnDef::new(SessionQuestions::MaxScore).integer().not_null().default(0))
                    .col(ColumnDef::new(SessionQuestions::IsCorrect).boolean())
                    .col(ColumnDef::new(SessionQuestions::CreatedOn).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_questions_quiz_session_id")
                            .from(SessionQuestions::Table, SessionQuestions::QuizSessionId)
                            .to(QuizSessions::Table, QuizSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_questions_question_id")
                            .from(SessionQuestions::Table, SessionQuestions::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        // The check views look up ungraded answers per question
        manager
            .create_index(
                Index::create()
                    .name("idx_session_questions_question_id")
                    .table(SessionQuestions::Table)
                    .col(SessionQuestions::QuestionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SessionQuestions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(QuizSessions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Answers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(QuestionCategories::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Sections::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tests::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Tests {
    Table,
    Id,
    Name,
    Description,
    IsReady,
    IsRetakeable,
    IsDeleted,
    CreatedOn,
    UpdatedOn,
    CreatedById,
}

#[derive(DeriveIden)]
enum Sections {
    Table,
    Id,
    TestId,
    Name,
    Description,
    Timer,
    IsExam,
    ResultsAvailableFrom,
    Meta,
    IsDeleted,
    CreatedOn,
    UpdatedOn,
    CreatedById,
}

#[derive(DeriveIden)]
enum QuestionCategories {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Questions {
    Table,
    Id,
    SectionId,
    Text,
    Explanation,
    QuestionType,
    CategoryId,
    IsDeleted,
    CreatedOn,
    UpdatedOn,
    CreatedById,
}

#[derive(DeriveIden)]
enum Answers {
    Table,
    Id,
    QuestionId,
    Variant,
    IsCorrect,
    Position,
    Left,
    Right,
    IsDeleted,
    CreatedOn,
    UpdatedOn,
    CreatedById,
}

#[derive(DeriveIden)]
enum QuizSessions {
    Table,
    Id,
    TestId,
    SectionId,
    UserId,
    CreatedOn,
}

#[derive(DeriveIden)]
enum SessionQuestions {
    Table,
    Id,
    QuizSessionId,
    QuestionId,
    NetworkGuid,
    Score,
    MaxScore,
    IsCorrect,
    CreatedOn,
}
