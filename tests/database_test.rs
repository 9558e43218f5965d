//! Database functionality tests
//!
//! Tests for migrations, entity operations and referential actions

use anyhow::Result;
use chrono::Utc;
use miminet::database::entities::*;
use miminet::database::setup_database;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tempfile::NamedTempFile;

/// Create a test database connection with migrations
async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, temp_file))
}

async fn insert_user(db: &DatabaseConnection, nick: &str, role: i32) -> Result<users::Model> {
    let user = users::ActiveModel {
        nick: Set(nick.to_string()),
        email: Set(None),
        password_hash: Set("not-a-real-hash".to_string()),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

async fn insert_network(db: &DatabaseConnection, author: &users::Model, guid: &str) -> Result<networks::Model> {
    let now = Utc::now();
    let network = networks::ActiveModel {
        guid: Set(guid.to_string()),
        author_id: Set(author.id),
        title: Set(networks::DEFAULT_TITLE.to_string()),
        share_mode: Set(false),
        network: Set(r#"{"nodes":[],"edges":[]}"#.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(network.insert(db).await?)
}

#[tokio::test]
async fn test_database_migrations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    assert!(users::Entity::find().all(&db).await?.is_empty());
    assert!(user_sessions::Entity::find().all(&db).await?.is_empty());
    assert!(networks::Entity::find().all(&db).await?.is_empty());
    assert!(simulates::Entity::find().all(&db).await?.is_empty());
    assert!(quiz_tests::Entity::find().all(&db).await?.is_empty());
    assert!(sections::Entity::find().all(&db).await?.is_empty());
    assert!(question_categories::Entity::find().all(&db).await?.is_empty());
    assert!(questions::Entity::find().all(&db).await?.is_empty());
    assert!(answers::Entity::find().all(&db).await?.is_empty());
    assert!(quiz_sessions::Entity::find().all(&db).await?.is_empty());
    assert!(session_questions::Entity::find().all(&db).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_network_crud_operations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = insert_user(&db, "alice", 0).await?;

    let network = insert_network(&db, &user, "guid-1").await?;
    assert_eq!(network.title, "Новая сеть");
    assert!(!network.share_mode);

    let found = networks::Entity::find()
        .filter(networks::Column::Guid.eq("guid-1"))
        .one(&db)
        .await?
        .expect("Network should exist");
    assert_eq!(found.id, network.id);

    let mut update: networks::ActiveModel = found.into();
    update.title = Set("Офис".to_string());
    update.share_mode = Set(true);
    let updated = update.update(&db).await?;
    assert_eq!(updated.title, "Офис");
    assert!(updated.share_mode);

    networks::Entity::delete_by_id(network.id).exec(&db).await?;
    assert!(networks::Entity::find_by_id(network.id).one(&db).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_network_guid_is_unique() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = insert_user(&db, "alice", 0).await?;

    insert_network(&db, &user, "same").await?;
    assert!(insert_network(&db, &user, "same").await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_deleting_network_removes_simulations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = insert_user(&db, "alice", 0).await?;
    let network = insert_network(&db, &user, "guid-1").await?;

    let simulate = simulates::ActiveModel {
        network_id: Set(network.id),
        packets: Set(None),
        ready: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    simulate.insert(&db).await?;

    networks::Entity::delete_by_id(network.id).exec(&db).await?;

    let remaining = simulates::Entity::find()
        .filter(simulates::Column::NetworkId.eq(network.id))
        .all(&db)
        .await?;
    assert!(remaining.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_quiz_hierarchy() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let user = insert_user(&db, "tutor", 1).await?;
    let now = Utc::now();

    let test = quiz_tests::ActiveModel {
        name: Set("Сети".to_string()),
        description: Set(None),
        is_ready: Set(true),
        is_retakeable: Set(false),
        is_deleted: Set(false),
        created_on: Set(now),
        updated_on: Set(None),
        created_by_id: Set(Some(user.id)),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let section = sections::ActiveModel {
        test_id: Set(test.id),
        name: Set("IP".to_string()),
        description: Set(None),
        timer: Set(Some(15)),
        is_exam: Set(false),
        results_available_from: Set(None),
        meta: Set(false),
        is_deleted: Set(false),
        created_on: Set(now),
        updated_on: Set(None),
        created_by_id: Set(Some(user.id)),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let question = questions::ActiveModel {
        section_id: Set(Some(section.id)),
        text: Set("Маска /24?".to_string()),
        explanation: Set(None),
        question_type: Set(1),
        category_id: Set(None),
        is_deleted: Set(false),
        created_on: Set(now),
        updated_on: Set(None),
        created_by_id: Set(Some(user.id)),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    // Removing the section leaves the question without one
    sections::Entity::delete_by_id(section.id).exec(&db).await?;
    let question = questions::Entity::find_by_id(question.id)
        .one(&db)
        .await?
        .expect("Question should survive its section");
    assert_eq!(question.section_id, None);

    Ok(())
}
