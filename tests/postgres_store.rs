//! PostgreSQL store tests. Need a reachable server configured in
//! `configuration.yaml`; run with `cargo test -- --ignored`.

use sqlx::{Connection, Executor, PgConnection, PgPool};
use token_rotation::auth::TokenDigest;
use token_rotation::configuration::{get_configuration, DatabaseSettings};
use token_rotation::error::StoreError;
use token_rotation::store::{PostgresStore, RefreshRecord, RefreshRecordStore};

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

async fn spawn_store() -> PostgresStore {
    let configuration = get_configuration().expect("Failed to read configuration.");
    let mut database = configuration
        .database
        .expect("database section required for postgres tests");
    database.database_name = uuid::Uuid::new_v4().to_string();
    PostgresStore::new(configure_database(&database).await)
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn create_then_find_by_digest() {
    let store = spawn_store().await;
    let digest = TokenDigest::of("refresh-1");

    let id = store
        .create(&RefreshRecord::issued("user-42", digest))
        .await
        .unwrap();
    let found = store.find_by_digest(&digest).await.unwrap();

    assert_eq!(found.id, Some(id));
    assert_eq!(found.subject, "user-42");
    assert_eq!(found.token_digest, digest);
    assert!(!found.used);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_digest_is_conflict() {
    let store = spawn_store().await;
    let record = RefreshRecord::issued("user-42", TokenDigest::of("refresh-1"));

    store.create(&record).await.unwrap();
    assert!(matches!(store.create(&record).await, Err(StoreError::Conflict)));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn mark_used_is_compare_and_set() {
    let store = spawn_store().await;
    let id = store
        .create(&RefreshRecord::issued("user-42", TokenDigest::of("refresh-1")))
        .await
        .unwrap();

    store.mark_used(id).await.unwrap();
    assert!(matches!(store.mark_used(id).await, Err(StoreError::AlreadyUsed)));
    assert!(matches!(
        store.mark_used(uuid::Uuid::new_v4()).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn find_by_subject_and_missing_digest() {
    let store = spawn_store().await;
    store
        .create(&RefreshRecord::issued("alice", TokenDigest::of("r1")))
        .await
        .unwrap();
    store
        .create(&RefreshRecord::issued("alice", TokenDigest::of("r2")))
        .await
        .unwrap();

    assert_eq!(store.find_by_subject("alice").await.unwrap().len(), 2);
    assert!(store.find_by_subject("bob").await.unwrap().is_empty());
    assert!(matches!(
        store.find_by_digest(&TokenDigest::of("r3")).await,
        Err(StoreError::NotFound)
    ));
}
