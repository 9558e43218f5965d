//! Admin panel endpoints.
//!
//! The CRUD handlers are shared by every view; the router mounts them once
//! per registered view and hands the view over as an [`Extension`].

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::admin::picker::parse_picker_id;
use crate::admin::{AdminView, Choice, ListPage, ListQuery, Row, ViewInfo};
use crate::errors::{AdminError, AdminResult};
use crate::server::app::AppState;
use crate::server::extract::AdminUser;
use crate::services::CheckReport;

pub const CHECK_BY_QUESTION_PATH: &str = "/admin/sessionquestion/check-by-question/";
pub const CREATE_CHECK_TASK_PATH: &str = "/admin/createchecktask/";

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminTool {
    pub path: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminIndex {
    pub user: String,
    pub views: Vec<ViewInfo>,
    pub tools: Vec<AdminTool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckByQuestionForm {
    /// Question id, bare or as `<Question N>`
    #[schema(value_type = String)]
    pub question_id: Value,
    /// Requirements document, JSON text
    pub requirements: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateCheckTaskForm {
    /// One network GUID per line
    pub guids: String,
    /// Requirements document, JSON text
    pub requirements: String,
}

fn form(payload: Result<Json<Value>, JsonRejection>) -> AdminResult<Value> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AdminError::Validation(rejection.body_text()))
}

#[utoipa::path(
    get,
    path = "/admin/",
    responses((status = 200, description = "Registered admin views", body = AdminIndex))
)]
pub async fn index(State(state): State<AppState>, AdminUser(user): AdminUser) -> Json<AdminIndex> {
    Json(AdminIndex {
        user: user.nick,
        views: state.admin.views().iter().map(|view| view.info()).collect(),
        tools: vec![
            AdminTool {
                path: CHECK_BY_QUESTION_PATH,
                title: "Проверка по вопросу",
            },
            AdminTool {
                path: CREATE_CHECK_TASK_PATH,
                title: "Проверка по списку GUID",
            },
        ],
    })
}

pub async fn list(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Extension(view): Extension<Arc<dyn AdminView>>,
    Query(query): Query<ListQuery>,
) -> AdminResult<Json<ListPage>> {
    Ok(Json(view.list(&state.db, &query).await?))
}

pub async fn get(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Extension(view): Extension<Arc<dyn AdminView>>,
    Path(id): Path<i32>,
) -> AdminResult<Json<Row>> {
    Ok(Json(view.get(&state.db, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Extension(view): Extension<Arc<dyn AdminView>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AdminResult<Response> {
    let row = view.create(&state.db, &user, form(payload)?).await?;
    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Extension(view): Extension<Arc<dyn AdminView>>,
    Path(id): Path<i32>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AdminResult<Json<Row>> {
    Ok(Json(view.update(&state.db, &user, id, form(payload)?).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Extension(view): Extension<Arc<dyn AdminView>>,
    Path(id): Path<i32>,
) -> AdminResult<StatusCode> {
    view.delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn choices(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Extension(view): Extension<Arc<dyn AdminView>>,
    Path(field): Path<String>,
) -> AdminResult<Json<Vec<Choice>>> {
    Ok(Json(view.choices(&state.db, &user, &field).await?))
}

#[utoipa::path(
    get,
    path = "/admin/sessionquestion/check-by-question/",
    responses((status = 200, description = "Questions that can be checked", body = Vec<Choice>))
)]
pub async fn check_by_question_form(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
) -> AdminResult<Json<Vec<Choice>>> {
    Ok(Json(state.checks.question_choices().await?))
}

#[utoipa::path(
    post,
    path = "/admin/sessionquestion/check-by-question/",
    request_body = CheckByQuestionForm,
    responses(
        (status = 200, description = "Submission report", body = CheckReport),
        (status = 422, description = "Unknown question")
    )
)]
pub async fn check_by_question(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Json(form): Json<CheckByQuestionForm>,
) -> AdminResult<Json<CheckReport>> {
    let question_id = match &form.question_id {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => parse_picker_id(s),
        _ => None,
    }
    .ok_or_else(|| AdminError::Validation("Not a valid choice".to_string()))?;

    let report = state
        .checks
        .check_by_question(question_id, &form.requirements)
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/admin/createchecktask/",
    responses((status = 200, description = "Empty form", body = CreateCheckTaskForm))
)]
pub async fn create_check_task_form(AdminUser(_user): AdminUser) -> Json<CreateCheckTaskForm> {
    Json(CreateCheckTaskForm::default())
}

#[utoipa::path(
    post,
    path = "/admin/createchecktask/",
    request_body = CreateCheckTaskForm,
    responses((status = 200, description = "Submission report", body = CheckReport))
)]
pub async fn create_check_task(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Json(form): Json<CreateCheckTaskForm>,
) -> AdminResult<Json<CheckReport>> {
    let report = state
        .checks
        .create_check_task(&form.guids, &form.requirements)
        .await?;
    Ok(Json(report))
}
