//! Admin panel API tests
//!
//! Access gate, generic CRUD, pickers and the bulk check tools

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use chrono::Utc;
use miminet::database::entities::{
    answers, networks, questions, quiz_sessions, session_questions, users,
};
use miminet::database::setup_database;
use miminet::server::app::{create_app, AppState};
use miminet::services::{CheckSubmission, InMemoryCheckTaskQueue};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

struct TestApp {
    server: TestServer,
    db: DatabaseConnection,
    state: AppState,
    queue: Arc<InMemoryCheckTaskQueue>,
    _temp_file: NamedTempFile,
}

async fn setup_test_app() -> Result<TestApp> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    let queue = Arc::new(InMemoryCheckTaskQueue::new());
    let state = AppState::new(db.clone(), queue.clone());
    let server = TestServer::new(create_app(state.clone(), None)?)?;

    Ok(TestApp {
        server,
        db,
        state,
        queue,
        _temp_file: temp_file,
    })
}

/// Insert a user and return a session id for them.
async fn sign_in(app: &TestApp, nick: &str, role: i32) -> Result<String> {
    let user = users::ActiveModel {
        nick: Set(nick.to_string()),
        email: Set(None),
        password_hash: Set(bcrypt::hash("password", 4)?),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await?;
    Ok(app.state.auth.open_session(&user).await?.session_id)
}

fn as_session(request: TestRequest, session: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static("x-session-id"),
        HeaderValue::from_str(session).expect("session ids are header-safe"),
    )
}

async fn create_test(app: &TestApp, session: &str, name: &str) -> Result<i64> {
    let response = as_session(app.server.post("/admin/test/new"), session)
        .json(&json!({"name": name, "description": "Основы"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let row: Value = response.json();
    Ok(row["id"].as_i64().unwrap_or_default())
}

async fn create_category(app: &TestApp, session: &str, name: &str) -> Result<i64> {
    let response = as_session(app.server.post("/admin/questioncategory/new"), session)
        .json(&json!({"name": name}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let row: Value = response.json();
    Ok(row["id"].as_i64().unwrap_or_default())
}

async fn insert_network(app: &TestApp, guid: &str, document: Value) -> Result<()> {
    let author = users::Entity::find()
        .one(&app.db)
        .await?
        .expect("a user was signed in");
    let now = Utc::now();
    networks::ActiveModel {
        guid: Set(guid.to_string()),
        author_id: Set(author.id),
        title: Set("Сеть".to_string()),
        share_mode: Set(false),
        network: Set(document.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&app.db)
    .await?;
    Ok(())
}

async fn insert_question(app: &TestApp, text: &str) -> Result<questions::Model> {
    Ok(questions::ActiveModel {
        section_id: Set(None),
        text: Set(text.to_string()),
        explanation: Set(None),
        question_type: Set(0),
        category_id: Set(None),
        is_deleted: Set(false),
        created_on: Set(Utc::now()),
        updated_on: Set(None),
        created_by_id: Set(None),
        ..Default::default()
    }
    .insert(&app.db)
    .await?)
}

async fn insert_session_answer(
    app: &TestApp,
    question_id: i32,
    guid: Option<&str>,
    max_score: i32,
) -> Result<session_questions::Model> {
    let session = quiz_sessions::ActiveModel {
        test_id: Set(None),
        section_id: Set(None),
        user_id: Set(None),
        created_on: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await?;

    Ok(session_questions::ActiveModel {
        quiz_session_id: Set(Some(session.id)),
        question_id: Set(question_id),
        network_guid: Set(guid.map(str::to_string)),
        score: Set(0),
        max_score: Set(max_score),
        is_correct: Set(None),
        created_on: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await?)
}

/// A template row: attached to a question but to no quiz session.
async fn insert_template_answer(
    app: &TestApp,
    question_id: i32,
    guid: &str,
) -> Result<session_questions::Model> {
    Ok(session_questions::ActiveModel {
        quiz_session_id: Set(None),
        question_id: Set(question_id),
        network_guid: Set(Some(guid.to_string())),
        score: Set(0),
        max_score: Set(0),
        is_correct: Set(None),
        created_on: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await?)
}

fn message_texts(report: &Value) -> Vec<&str> {
    report["messages"]
        .as_array()
        .map(|m| m.iter().filter_map(|m| m["message"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_admin_gate() -> Result<()> {
    let app = setup_test_app().await?;
    let student = sign_in(&app, "student", 0).await?;

    let response = app.server.get("/admin/").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).map(|v| v.as_bytes()), Some(&b"/auth/login"[..]));

    for path in ["/admin/", "/admin/test/", "/admin/createchecktask/"] {
        let response = as_session(app.server.get(path), &student).await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER, "{}", path);
    }

    let response = as_session(app.server.post("/admin/test/new"), &student)
        .json(&json!({"name": "x"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    Ok(())
}

#[tokio::test]
async fn test_admin_index() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;

    let response = as_session(app.server.get("/admin/"), &admin).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["user"], "tutor");
    let slugs: Vec<&str> = body["views"]
        .as_array()
        .map(|views| views.iter().filter_map(|v| v["slug"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(
        slugs,
        vec!["test", "section", "question", "answer", "questioncategory", "sessionquestion"]
    );
    assert_eq!(body["tools"].as_array().map(Vec::len), Some(2));

    Ok(())
}

#[tokio::test]
async fn test_test_crud() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;

    let id = create_test(&app, &admin, "Сети").await?;

    let response = as_session(app.server.get(&format!("/admin/test/{}", id)), &admin).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let row: Value = response.json();
    assert_eq!(row["name"], "Сети");
    assert_eq!(row["created_by_id"], "tutor");
    assert_eq!(row["is_ready"], false);

    let response = as_session(app.server.post(&format!("/admin/test/{}/edit", id)), &admin)
        .json(&json!({"name": "Сети 2", "is_ready": true}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let row: Value = response.json();
    assert_eq!(row["name"], "Сети 2");
    assert_eq!(row["description"], "");
    assert_eq!(row["is_ready"], true);

    create_test(&app, &admin, "Адресация").await?;
    let response = as_session(app.server.get("/admin/test/"), &admin)
        .add_query_param("sort", "name")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let page: Value = response.json();
    assert_eq!(page["total"], 2);
    assert_eq!(page["rows"][0]["name"], "Адресация");
    assert_eq!(page["columns"][0]["label"], "Название");

    let response = as_session(app.server.post(&format!("/admin/test/{}/delete", id)), &admin).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    let response = as_session(app.server.get(&format!("/admin/test/{}", id)), &admin).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_forms_are_validated() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;

    let response = as_session(app.server.post("/admin/test/new"), &admin)
        .json(&json!({"name": "Сети", "is_deleted": true}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = as_session(app.server.post("/admin/test/new"), &admin)
        .json(&json!({"name": "   "}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = as_session(app.server.get("/admin/test/"), &admin).await;
    let page: Value = response.json();
    assert_eq!(page["total"], 0);

    Ok(())
}

#[tokio::test]
async fn test_foreign_records_cannot_be_edited() -> Result<()> {
    let app = setup_test_app().await?;
    let alice = sign_in(&app, "alice", 1).await?;
    let bob = sign_in(&app, "bob", 1).await?;

    let id = create_test(&app, &alice, "Сети").await?;

    let response = as_session(app.server.post(&format!("/admin/test/{}/edit", id)), &bob)
        .json(&json!({"name": "Чужой"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = as_session(app.server.get(&format!("/admin/test/{}", id)), &bob).await;
    let row: Value = response.json();
    assert_eq!(row["name"], "Сети");

    Ok(())
}

#[tokio::test]
async fn test_section_picker_offers_own_tests_only() -> Result<()> {
    let app = setup_test_app().await?;
    let alice = sign_in(&app, "alice", 1).await?;
    let bob = sign_in(&app, "bob", 1).await?;

    let own = create_test(&app, &alice, "Сети").await?;
    let foreign = create_test(&app, &bob, "Чужой").await?;

    let response = as_session(app.server.get("/admin/section/choices/test_id"), &alice).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let choices: Value = response.json();
    assert_eq!(
        choices,
        json!([{"value": own.to_string(), "label": "Сети, Основы (alice)"}])
    );

    let response = as_session(app.server.post("/admin/section/new"), &alice)
        .json(&json!({"test_id": foreign, "name": "IP"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["message"], "test_id: Not a valid choice");

    let response = as_session(app.server.post("/admin/section/new"), &alice)
        .json(&json!({
            "test_id": own.to_string(),
            "name": "IP",
            "results_available_from": "01-09-2024 10:30"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let row: Value = response.json();
    assert_eq!(row["test_id"], "Сети");
    assert_eq!(row["results_available_from"], "2024-09-01 10:30:00");

    let response = as_session(app.server.get("/admin/section/choices/nope"), &alice).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_question_text_is_stored_escaped() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;
    let category = create_category(&app, &admin, "Маршрутизация").await?;

    let response = as_session(app.server.post("/admin/question/new"), &admin)
        .json(&json!({
            "section_id": "",
            "text": "Что делает <b>ping</b>?",
            "question_type": 1,
            "category_id": category
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let row: Value = response.json();
    assert_eq!(row["section_id"], "Без раздела");
    assert_eq!(row["text"], "Что делает <b>ping</b>?");
    assert_eq!(row["question_type"], "С вариантами ответов");

    let id = row["id"].as_i64().unwrap_or_default() as i32;
    let stored = questions::Entity::find_by_id(id)
        .one(&app.db)
        .await?
        .expect("question exists");
    assert_eq!(stored.text, "Что делает &lt;b&gt;ping&lt;&#x2F;b&gt;?");

    let response = as_session(app.server.post("/admin/question/new"), &admin)
        .json(&json!({"text": "Без категории", "question_type": 0, "category_id": null}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = as_session(app.server.post("/admin/question/new"), &admin)
        .json(&json!({"text": "Тип?", "question_type": 7, "category_id": category}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}

#[tokio::test]
async fn test_session_questions_are_edit_only() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;
    let question = insert_question(&app, "Настройте VLAN").await?;
    let entry = insert_session_answer(&app, question.id, None, 0).await?;

    let response = as_session(app.server.post("/admin/sessionquestion/new"), &admin)
        .json(&json!({"score": 1, "max_score": 1}))
        .await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);

    let response = as_session(
        app.server.post(&format!("/admin/sessionquestion/{}/delete", entry.id)),
        &admin,
    )
    .await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);

    let response = as_session(
        app.server.post(&format!("/admin/sessionquestion/{}/edit", entry.id)),
        &admin,
    )
    .json(&json!({"score": 3, "max_score": 5, "is_correct": false}))
    .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let row: Value = response.json();
    assert_eq!(row["score"], 3);
    assert_eq!(row["question_text"], "Настройте VLAN");

    Ok(())
}

#[tokio::test]
async fn test_check_by_question() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;
    let question = insert_question(&app, "Настройте VLAN").await?;
    insert_network(&app, "net-1", json!({"nodes": [{"data": {"id": "h1"}}], "edges": []})).await?;

    let good = insert_session_answer(&app, question.id, Some("net-1"), 0).await?;
    insert_session_answer(&app, question.id, Some("gone"), 0).await?;
    insert_session_answer(&app, question.id, Some("net-1"), 10).await?;

    let response = as_session(
        app.server.get("/admin/sessionquestion/check-by-question/"),
        &admin,
    )
    .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let choices: Value = response.json();
    assert_eq!(choices[0]["value"], question.id.to_string());

    let response = as_session(
        app.server.post("/admin/sessionquestion/check-by-question/"),
        &admin,
    )
    .json(&json!({
        "question_id": format!("<Question {}>", question.id),
        "requirements": r#"{"ping": ["h1"]}"#
    }))
    .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["submitted"], 1);
    let messages: Vec<&str> = report["messages"]
        .as_array()
        .map(|m| m.iter().filter_map(|m| m["message"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(
        messages,
        vec![
            "Сеть с GUID gone не найдена.",
            "Запросы на проверку отправлены для 1 записей."
        ]
    );

    let submissions = app.queue.submissions().await;
    assert_eq!(submissions.len(), 1);
    assert!(matches!(
        &submissions[0],
        CheckSubmission::Single { record_id, requirements, .. }
            if *record_id == good.id && requirements == &json!({"ping": ["h1"]})
    ));

    let response = as_session(
        app.server.post("/admin/sessionquestion/check-by-question/"),
        &admin,
    )
    .json(&json!({"question_id": 9999, "requirements": "{}"}))
    .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}

#[tokio::test]
async fn test_create_check_task() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;
    insert_network(&app, "net-1", json!({"nodes": [], "edges": []})).await?;
    insert_network(&app, "net-2", json!({"nodes": [], "edges": []})).await?;

    let response = as_session(app.server.post("/admin/createchecktask/"), &admin)
        .json(&json!({"guids": "net-1\nmissing\n", "requirements": "{}"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["submitted"], 0);
    assert_eq!(report["messages"][0]["level"], "error");
    assert_eq!(
        report["messages"][0]["message"],
        "Ошибка: Сеть с GUID missing не найдена."
    );
    assert!(app.queue.submissions().await.is_empty());

    let response = as_session(app.server.post("/admin/createchecktask/"), &admin)
        .json(&json!({"guids": " net-1 \n\n net-2", "requirements": "{\"a\": 1}"}))
        .await;
    let report: Value = response.json();
    assert_eq!(report["submitted"], 2);
    assert_eq!(report["messages"][0]["message"], "Задача проверки успешно создана.");

    let submissions = app.queue.submissions().await;
    assert_eq!(submissions.len(), 1);
    match &submissions[0] {
        CheckSubmission::Batch { networks, .. } => {
            let guids: Vec<&str> = networks.iter().map(|(_, guid)| guid.as_str()).collect();
            assert_eq!(guids, vec!["net-1", "net-2"]);
        }
        other => panic!("expected a batch, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_answer_picker_stores_bare_question_id() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;
    let category = create_category(&app, &admin, "Транспорт").await?;

    let response = as_session(app.server.post("/admin/question/new"), &admin)
        .json(&json!({
            "section_id": "",
            "text": "Какой порт у SSH?",
            "question_type": 1,
            "category_id": category
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let question: Value = response.json();
    let question_id = question["id"].as_i64().unwrap_or_default() as i32;

    let response = as_session(app.server.get("/admin/answer/choices/question_id"), &admin).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let choices: Value = response.json();
    assert_eq!(
        choices,
        json!([{"value": question_id.to_string(), "label": "Какой порт у SSH? (tutor)"}])
    );

    let response = as_session(app.server.post("/admin/answer/new"), &admin)
        .json(&json!({
            "question_id": format!("<Question {}>", question_id),
            "variant": "a<b",
            "is_correct": true,
            "left": "x & y",
            "right": "&lt;22&gt;"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let row: Value = response.json();
    assert_eq!(row["question_id"], "Какой порт у SSH?");
    let answer_id = row["id"].as_i64().unwrap_or_default() as i32;

    let stored = answers::Entity::find_by_id(answer_id)
        .one(&app.db)
        .await?
        .expect("answer exists");
    assert_eq!(stored.question_id, Some(question_id));
    assert_eq!(stored.variant.as_deref(), Some("a&lt;b"));
    assert_eq!(stored.left.as_deref(), Some("x &amp; y"));
    assert_eq!(stored.right.as_deref(), Some("&lt;22&gt;"));

    let response = as_session(app.server.post(&format!("/admin/answer/{}/edit", answer_id)), &admin)
        .json(&json!({"question_id": question_id, "variant": "22"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let stored = answers::Entity::find_by_id(answer_id)
        .one(&app.db)
        .await?
        .expect("answer exists");
    assert_eq!(stored.question_id, Some(question_id));
    assert_eq!(stored.variant.as_deref(), Some("22"));

    let response = as_session(app.server.post("/admin/answer/new"), &admin)
        .json(&json!({"question_id": "<Question 9999>", "variant": "x"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    Ok(())
}

#[tokio::test]
async fn test_malformed_requirements_submit_nothing() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;
    let question = insert_question(&app, "Настройте VLAN").await?;
    insert_network(&app, "net-1", json!({"nodes": [], "edges": []})).await?;
    insert_session_answer(&app, question.id, Some("net-1"), 0).await?;

    let response = as_session(
        app.server.post("/admin/sessionquestion/check-by-question/"),
        &admin,
    )
    .json(&json!({"question_id": question.id, "requirements": "{\"x\":1"}))
    .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["submitted"], 0);
    assert_eq!(report["messages"][0]["level"], "error");
    assert_eq!(message_texts(&report), vec!["Некорректный JSON в requirements."]);
    assert!(app.queue.submissions().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_check_by_question_submits_each_session_answer() -> Result<()> {
    let app = setup_test_app().await?;
    let admin = sign_in(&app, "tutor", 1).await?;
    let question = insert_question(&app, "Настройте VLAN").await?;
    insert_network(&app, "net-1", json!({"nodes": [], "edges": []})).await?;
    insert_network(&app, "net-2", json!({"nodes": [], "edges": []})).await?;

    let first = insert_session_answer(&app, question.id, Some("net-1"), 0).await?;
    let second = insert_session_answer(&app, question.id, Some("net-2"), 0).await?;
    let template = insert_template_answer(&app, question.id, "net-1").await?;

    let response = as_session(
        app.server.post("/admin/sessionquestion/check-by-question/"),
        &admin,
    )
    .json(&json!({"question_id": question.id.to_string(), "requirements": "{}"}))
    .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["submitted"], 2);
    assert_eq!(
        message_texts(&report),
        vec!["Запросы на проверку отправлены для 2 записей."]
    );

    let record_ids: Vec<i32> = app
        .queue
        .submissions()
        .await
        .iter()
        .filter_map(|submission| match submission {
            CheckSubmission::Single { record_id, .. } => Some(*record_id),
            CheckSubmission::Batch { .. } => None,
        })
        .collect();
    assert_eq!(record_ids, vec![first.id, second.id]);

    let untouched = session_questions::Entity::find()
        .filter(session_questions::Column::QuizSessionId.is_null())
        .all(&app.db)
        .await?;
    assert_eq!(untouched.len(), 1);
    assert_eq!(untouched[0].id, template.id);

    Ok(())
}
