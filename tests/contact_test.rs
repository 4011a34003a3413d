//! Contact-message tests: the upsert-by-email dedupe.

mod common;

use orbit::errors::AppError;
use orbit::models::contact;

use common::setup_test_db;

#[tokio::test]
async fn one_row_per_email() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let first = contact::upsert(pool, "Budi", "budi@test.com", "First question")
        .await
        .unwrap();
    let second = contact::upsert(pool, "Budi Santoso", "budi@test.com", "Updated question")
        .await
        .unwrap();
    assert_eq!(first, second);

    let messages = contact::find_all(pool).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].name, "Budi Santoso");
    assert_eq!(messages[0].message, "Updated question");

    db.close().await;
}

#[tokio::test]
async fn different_emails_get_separate_rows() {
    let db = setup_test_db().await;
    let pool = db.pool();

    contact::upsert(pool, "Budi", "budi@test.com", "Hello").await.unwrap();
    contact::upsert(pool, "Sari", "sari@test.com", "Hi there").await.unwrap();

    assert_eq!(contact::find_all(pool).await.unwrap().len(), 2);

    db.close().await;
}

#[tokio::test]
async fn delete_removes_the_message() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let id = contact::upsert(pool, "Budi", "budi@test.com", "Hello").await.unwrap();
    contact::delete(pool, id).await.unwrap();
    assert!(contact::find_all(pool).await.unwrap().is_empty());

    let err = contact::delete(pool, id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    db.close().await;
}
