//! The quiz tables exposed in the admin panel.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use serde::Deserialize;
use serde_json::{json, Value};

use super::format::{self, nullable};
use super::picker::Picker;
use super::view::{into_row, ColumnSpec, ModelView, Row};
use crate::database::entities::{
    answers, question_categories, questions, quiz_tests, sections, session_questions, users,
};
use crate::errors::{AdminError, AdminResult};
use crate::markup::{normalize_escaped, normalize_optional, unescape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    Practice = 0,
    MultipleChoice = 1,
    Ordering = 2,
    Matching = 3,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Practice => "Практическое задание",
            QuestionType::MultipleChoice => "С вариантами ответов",
            QuestionType::Ordering => "На сортировку",
            QuestionType::Matching => "На сопоставление",
        }
    }

    /// Label for a stored value; unknown values show as blank.
    pub fn label_for(value: i32) -> &'static str {
        QuestionType::try_from(value).map_or("", QuestionType::label)
    }
}

impl TryFrom<i32> for QuestionType {
    type Error = AdminError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(QuestionType::Practice),
            1 => Ok(QuestionType::MultipleChoice),
            2 => Ok(QuestionType::Ordering),
            3 => Ok(QuestionType::Matching),
            other => Err(AdminError::Validation(format!(
                "question_type: {} is not a valid choice",
                other
            ))),
        }
    }
}

fn required(field: &str, value: String) -> AdminResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AdminError::Validation(format!(
            "{}: This field is required.",
            field
        )));
    }
    Ok(trimmed.to_string())
}

fn picked(field: &str, id: Option<i32>) -> AdminResult<i32> {
    id.ok_or_else(|| AdminError::Validation(format!("{}: This field is required.", field)))
}

// Test

pub struct TestView;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_ready: bool,
    #[serde(default)]
    pub is_retakeable: bool,
}

const TEST_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::sortable("name", "Название"),
    ColumnSpec::new("description", "Описание"),
    ColumnSpec::new("is_ready", "Тест готов"),
    ColumnSpec::new("is_retakeable", "Можно перепроходить"),
    ColumnSpec::sortable("created_on", "Дата создания"),
    ColumnSpec::sortable("created_by_id", "Автор"),
];

#[async_trait]
impl ModelView for TestView {
    type Entity = quiz_tests::Entity;
    type Model = quiz_tests::Model;
    type Active = quiz_tests::ActiveModel;
    type Form = TestForm;

    const SLUG: &'static str = "test";
    const TITLE: &'static str = "Тесты";

    fn columns(&self) -> &'static [ColumnSpec] {
        TEST_COLUMNS
    }

    fn id_column(&self) -> quiz_tests::Column {
        quiz_tests::Column::Id
    }

    fn id(&self, model: &quiz_tests::Model) -> i32 {
        model.id
    }

    fn created_by(&self, model: &quiz_tests::Model) -> Option<i32> {
        model.created_by_id
    }

    fn stamp_created(&self, active: &mut quiz_tests::ActiveModel, user: &users::Model) {
        active.created_by_id = Set(Some(user.id));
        active.created_on = Set(Utc::now());
        active.is_deleted = Set(false);
    }

    fn stamp_updated(&self, active: &mut quiz_tests::ActiveModel) {
        active.updated_on = Set(Some(Utc::now()));
    }

    async fn apply_form(
        &self,
        _db: &DatabaseConnection,
        _user: &users::Model,
        form: TestForm,
        active: &mut quiz_tests::ActiveModel,
    ) -> AdminResult<()> {
        active.name = Set(required("name", form.name)?);
        active.description = Set(form.description);
        active.is_ready = Set(form.is_ready);
        active.is_retakeable = Set(form.is_retakeable);
        Ok(())
    }

    async fn format_row(&self, db: &DatabaseConnection, model: &quiz_tests::Model) -> AdminResult<Row> {
        let author = format::creator_nick(db, model.created_by_id).await?;
        Ok(into_row(json!({
            "id": model.id,
            "name": model.name,
            "description": nullable(model.description.clone()),
            "is_ready": model.is_ready,
            "is_retakeable": model.is_retakeable,
            "created_on": format::datetime(&model.created_on),
            "created_by_id": author,
        })))
    }
}

// Section

pub struct SectionView;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionForm {
    pub test_id: Value,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timer: Option<i32>,
    #[serde(default)]
    pub is_exam: bool,
    /// `d-m-Y H:M`, Moscow time
    #[serde(default)]
    pub results_available_from: Option<String>,
    #[serde(default)]
    pub meta: bool,
}

const SECTION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::sortable("test_id", "Раздел теста"),
    ColumnSpec::sortable("name", "Название"),
    ColumnSpec::new("description", "Описание"),
    ColumnSpec::new("timer", "Время на прохождение (в минутах)"),
    ColumnSpec::new("is_exam", "Контрольная работа"),
    ColumnSpec::new("results_available_from", "Открыть результаты с"),
    ColumnSpec::sortable("created_on", "Дата создания"),
    ColumnSpec::sortable("created_by_id", "Автор"),
    ColumnSpec::new("meta", "Мета раздел"),
];

#[async_trait]
impl ModelView for SectionView {
    type Entity = sections::Entity;
    type Model = sections::Model;
    type Active = sections::ActiveModel;
    type Form = SectionForm;

    const SLUG: &'static str = "section";
    const TITLE: &'static str = "Разделы";

    fn columns(&self) -> &'static [ColumnSpec] {
        SECTION_COLUMNS
    }

    fn id_column(&self) -> sections::Column {
        sections::Column::Id
    }

    fn id(&self, model: &sections::Model) -> i32 {
        model.id
    }

    fn created_by(&self, model: &sections::Model) -> Option<i32> {
        model.created_by_id
    }

    fn pickers(&self) -> &'static [(&'static str, Picker)] {
        &[("test_id", Picker::OwnTests)]
    }

    fn stamp_created(&self, active: &mut sections::ActiveModel, user: &users::Model) {
        active.created_by_id = Set(Some(user.id));
        active.created_on = Set(Utc::now());
        active.is_deleted = Set(false);
    }

    fn stamp_updated(&self, active: &mut sections::ActiveModel) {
        active.updated_on = Set(Some(Utc::now()));
    }

    async fn apply_form(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        form: SectionForm,
        active: &mut sections::ActiveModel,
    ) -> AdminResult<()> {
        let test_id = Picker::OwnTests
            .resolve(db, user, "test_id", &form.test_id)
            .await?;
        let results_available_from =
            format::parse_section_datetime(form.results_available_from.as_deref())?;

        active.test_id = Set(picked("test_id", test_id)?);
        active.name = Set(required("name", form.name)?);
        active.description = Set(form.description);
        active.timer = Set(form.timer);
        active.is_exam = Set(form.is_exam);
        active.results_available_from = Set(results_available_from);
        active.meta = Set(form.meta);
        Ok(())
    }

    async fn format_row(&self, db: &DatabaseConnection, model: &sections::Model) -> AdminResult<Row> {
        let test = format::test_name(db, model.test_id).await?;
        let author = format::creator_nick(db, model.created_by_id).await?;
        Ok(into_row(json!({
            "id": model.id,
            "test_id": test,
            "name": model.name,
            "description": nullable(model.description.clone()),
            "timer": nullable(model.timer),
            "is_exam": model.is_exam,
            "results_available_from": model
                .results_available_from
                .as_ref()
                .map_or_else(|| json!(""), format::naive_datetime),
            "created_on": format::datetime(&model.created_on),
            "created_by_id": author,
            "meta": model.meta,
        })))
    }
}

// Question

pub struct QuestionView;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionForm {
    #[serde(default)]
    pub section_id: Value,
    pub text: String,
    #[serde(default)]
    pub explanation: Option<String>,
    pub question_type: i32,
    pub category_id: Value,
}

const QUESTION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::sortable("section_id", "Вопрос раздела"),
    ColumnSpec::new("text", "Текст вопроса"),
    ColumnSpec::new("explanation", "Пояснение"),
    ColumnSpec::new("question_type", "Тип вопроса"),
    ColumnSpec::sortable("created_on", "Дата создания"),
    ColumnSpec::sortable("created_by_id", "Автор"),
    ColumnSpec::new("category_id", "Категория"),
];

#[async_trait]
impl ModelView for QuestionView {
    type Entity = questions::Entity;
    type Model = questions::Model;
    type Active = questions::ActiveModel;
    type Form = QuestionForm;

    const SLUG: &'static str = "question";
    const TITLE: &'static str = "Вопросы";

    fn columns(&self) -> &'static [ColumnSpec] {
        QUESTION_COLUMNS
    }

    fn id_column(&self) -> questions::Column {
        questions::Column::Id
    }

    fn id(&self, model: &questions::Model) -> i32 {
        model.id
    }

    fn created_by(&self, model: &questions::Model) -> Option<i32> {
        model.created_by_id
    }

    fn pickers(&self) -> &'static [(&'static str, Picker)] {
        &[
            ("section_id", Picker::OwnSections),
            ("category_id", Picker::Categories),
        ]
    }

    fn stamp_created(&self, active: &mut questions::ActiveModel, user: &users::Model) {
        active.created_by_id = Set(Some(user.id));
        active.created_on = Set(Utc::now());
        active.is_deleted = Set(false);
    }

    fn stamp_updated(&self, active: &mut questions::ActiveModel) {
        active.updated_on = Set(Some(Utc::now()));
    }

    async fn apply_form(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        form: QuestionForm,
        active: &mut questions::ActiveModel,
    ) -> AdminResult<()> {
        let question_type = QuestionType::try_from(form.question_type)?;
        let section_id = Picker::OwnSections
            .resolve(db, user, "section_id", &form.section_id)
            .await?;
        let category_id = Picker::Categories
            .resolve(db, user, "category_id", &form.category_id)
            .await?;

        active.section_id = Set(section_id);
        active.category_id = Set(Some(picked("category_id", category_id)?));
        active.text = Set(normalize_escaped(&required("text", form.text)?));
        active.explanation = Set(form.explanation);
        active.question_type = Set(question_type as i32);
        Ok(())
    }

    async fn format_row(&self, db: &DatabaseConnection, model: &questions::Model) -> AdminResult<Row> {
        let section = format::section_name(db, model.section_id).await?;
        let author = format::creator_nick(db, model.created_by_id).await?;
        Ok(into_row(json!({
            "id": model.id,
            "section_id": section,
            "text": unescape(&model.text),
            "explanation": nullable(model.explanation.clone()),
            "question_type": QuestionType::label_for(model.question_type),
            "created_on": format::datetime(&model.created_on),
            "created_by_id": author,
            "category_id": nullable(model.category_id),
        })))
    }
}

// Answer

pub struct AnswerView;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerForm {
    pub question_id: Value,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
}

const ANSWER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::sortable("question_id", "Вопрос"),
    ColumnSpec::new("variant", "Вариант ответа"),
    ColumnSpec::new("is_correct", "Is Correct"),
    ColumnSpec::new("position", "Позиция ответа"),
    ColumnSpec::new("left", "Левая часть"),
    ColumnSpec::new("right", "Правая часть"),
    ColumnSpec::sortable("created_by_id", "Автор"),
];

#[async_trait]
impl ModelView for AnswerView {
    type Entity = answers::Entity;
    type Model = answers::Model;
    type Active = answers::ActiveModel;
    type Form = AnswerForm;

    const SLUG: &'static str = "answer";
    const TITLE: &'static str = "Ответы";

    fn columns(&self) -> &'static [ColumnSpec] {
        ANSWER_COLUMNS
    }

    fn id_column(&self) -> answers::Column {
        answers::Column::Id
    }

    fn id(&self, model: &answers::Model) -> i32 {
        model.id
    }

    fn created_by(&self, model: &answers::Model) -> Option<i32> {
        model.created_by_id
    }

    fn pickers(&self) -> &'static [(&'static str, Picker)] {
        &[("question_id", Picker::Questions)]
    }

    fn stamp_created(&self, active: &mut answers::ActiveModel, user: &users::Model) {
        active.created_by_id = Set(Some(user.id));
        active.created_on = Set(Utc::now());
        active.is_deleted = Set(false);
    }

    fn stamp_updated(&self, active: &mut answers::ActiveModel) {
        active.updated_on = Set(Some(Utc::now()));
    }

    async fn apply_form(
        &self,
        db: &DatabaseConnection,
        user: &users::Model,
        form: AnswerForm,
        active: &mut answers::ActiveModel,
    ) -> AdminResult<()> {
        let question_id = Picker::Questions
            .resolve(db, user, "question_id", &form.question_id)
            .await?;

        active.question_id = Set(Some(picked("question_id", question_id)?));
        active.variant = Set(normalize_optional(form.variant));
        active.is_correct = Set(form.is_correct);
        active.position = Set(form.position);
        active.left = Set(normalize_optional(form.left));
        active.right = Set(normalize_optional(form.right));
        Ok(())
    }

    async fn format_row(&self, db: &DatabaseConnection, model: &answers::Model) -> AdminResult<Row> {
        let question = format::answer_question_text(db, model.question_id).await?;
        let author = format::creator_nick(db, model.created_by_id).await?;
        Ok(into_row(json!({
            "id": model.id,
            "question_id": question,
            "variant": nullable(model.variant.clone()),
            "is_correct": model.is_correct,
            "position": nullable(model.position),
            "left": nullable(model.left.clone()),
            "right": nullable(model.right.clone()),
            "created_by_id": author,
        })))
    }
}

// QuestionCategory

pub struct QuestionCategoryView;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionCategoryForm {
    pub name: String,
}

const QUESTION_CATEGORY_COLUMNS: &[ColumnSpec] = &[ColumnSpec::sortable("name", "Название")];

#[async_trait]
impl ModelView for QuestionCategoryView {
    type Entity = question_categories::Entity;
    type Model = question_categories::Model;
    type Active = question_categories::ActiveModel;
    type Form = QuestionCategoryForm;

    const SLUG: &'static str = "questioncategory";
    const TITLE: &'static str = "Категории вопросов";
    const OWNED: bool = false;

    fn columns(&self) -> &'static [ColumnSpec] {
        QUESTION_CATEGORY_COLUMNS
    }

    fn id_column(&self) -> question_categories::Column {
        question_categories::Column::Id
    }

    fn id(&self, model: &question_categories::Model) -> i32 {
        model.id
    }

    async fn apply_form(
        &self,
        _db: &DatabaseConnection,
        _user: &users::Model,
        form: QuestionCategoryForm,
        active: &mut question_categories::ActiveModel,
    ) -> AdminResult<()> {
        active.name = Set(required("name", form.name)?);
        Ok(())
    }

    async fn format_row(
        &self,
        _db: &DatabaseConnection,
        model: &question_categories::Model,
    ) -> AdminResult<Row> {
        Ok(into_row(json!({ "id": model.id, "name": model.name })))
    }
}

// SessionQuestion

/// Graded answers from quiz sessions. Rows are created by quiz sessions and
/// graded by the check service, so the panel only edits them.
pub struct SessionQuestionView;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionQuestionForm {
    #[serde(default)]
    pub network_guid: Option<String>,
    pub score: i32,
    pub max_score: i32,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

const SESSION_QUESTION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::sortable("id", "ID записи"),
    ColumnSpec::sortable("quiz_session_id", "Сессия"),
    ColumnSpec::sortable("question_id", "Вопрос (ID)"),
    ColumnSpec::new("question_text", "Текст вопроса"),
    ColumnSpec::sortable("is_correct", "Ответ верный"),
    ColumnSpec::sortable("score", "Набрано баллов"),
    ColumnSpec::sortable("max_score", "Максимум"),
];

#[async_trait]
impl ModelView for SessionQuestionView {
    type Entity = session_questions::Entity;
    type Model = session_questions::Model;
    type Active = session_questions::ActiveModel;
    type Form = SessionQuestionForm;

    const SLUG: &'static str = "sessionquestion";
    const TITLE: &'static str = "Ответы в сессиях";
    const CAN_CREATE: bool = false;
    const CAN_DELETE: bool = false;
    const OWNED: bool = false;

    fn columns(&self) -> &'static [ColumnSpec] {
        SESSION_QUESTION_COLUMNS
    }

    fn id_column(&self) -> session_questions::Column {
        session_questions::Column::Id
    }

    fn id(&self, model: &session_questions::Model) -> i32 {
        model.id
    }

    async fn apply_form(
        &self,
        _db: &DatabaseConnection,
        _user: &users::Model,
        form: SessionQuestionForm,
        active: &mut session_questions::ActiveModel,
    ) -> AdminResult<()> {
        if form.score < 0 || form.max_score < 0 {
            return Err(AdminError::Validation(
                "score and max_score must not be negative".to_string(),
            ));
        }
        active.network_guid = Set(form.network_guid.filter(|g| !g.trim().is_empty()));
        active.score = Set(form.score);
        active.max_score = Set(form.max_score);
        active.is_correct = Set(form.is_correct);
        Ok(())
    }

    async fn format_row(
        &self,
        db: &DatabaseConnection,
        model: &session_questions::Model,
    ) -> AdminResult<Row> {
        let question_text = format::session_question_text(db, model.question_id).await?;
        Ok(into_row(json!({
            "id": model.id,
            "quiz_session_id": nullable(model.quiz_session_id),
            "question_id": model.question_id,
            "question_text": question_text,
            "is_correct": nullable(model.is_correct),
            "score": model.score,
            "max_score": model.max_score,
        })))
    }
}
