//! Profile and innovator-approval tests.

mod common;

use orbit::auth::password;
use orbit::errors::AppError;
use orbit::models::profile::{self, NewProfile};

use common::{create_test_innovation, create_test_innovator, setup_test_db, TEST_PASSWORD};

fn new_profile(name: &str) -> NewProfile {
    NewProfile {
        full_name: name.to_string(),
        phone: "085555".to_string(),
        institution: "Universitas Test".to_string(),
        bio: "Working on appropriate technology".to_string(),
    }
}

#[tokio::test]
async fn registration_starts_pending() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let hash = password::hash_password(TEST_PASSWORD).unwrap();
    let profile_id =
        profile::create_account(pool, "dewi@test.com", &hash, &new_profile("Dewi Lestari"))
            .await
            .unwrap();

    let auth = profile::find_auth_by_email(pool, "dewi@test.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(auth.profile_id, profile_id);
    assert_eq!(auth.status, "pending");
    assert!(!auth.is_admin);
    assert!(password::verify_password(TEST_PASSWORD, &auth.password).unwrap());

    let pending = profile::list_pending(pool).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].full_name, "Dewi Lestari");
    assert_eq!(pending[0].email, "dewi@test.com");

    db.close().await;
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let hash = password::hash_password(TEST_PASSWORD).unwrap();
    profile::create_account(pool, "dupe@test.com", &hash, &new_profile("First"))
        .await
        .unwrap();
    let err = profile::create_account(pool, "dupe@test.com", &hash, &new_profile("Second"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("duplicate key"));

    db.close().await;
}

#[tokio::test]
async fn approval_is_guarded_and_terminal() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let hash = password::hash_password(TEST_PASSWORD).unwrap();
    let profile_id =
        profile::create_account(pool, "guard@test.com", &hash, &new_profile("Guarded"))
            .await
            .unwrap();

    profile::approve(pool, profile_id).await.unwrap();
    let auth = profile::find_auth_by_email(pool, "guard@test.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(auth.status, "approved");

    // Resolving again conflicts, in either direction
    let err = profile::approve(pool, profile_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    let err = profile::reject(pool, profile_id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = profile::approve(pool, profile_id + 999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    db.close().await;
}

#[tokio::test]
async fn directory_lists_approved_innovators_with_counts() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let approved = create_test_innovator(pool, "dir").await;
    create_test_innovation(pool, approved, "Solar Dryer").await;
    create_test_innovation(pool, approved, "Water Filter").await;

    // A pending registration must not appear
    let hash = password::hash_password(TEST_PASSWORD).unwrap();
    profile::create_account(pool, "hidden@test.com", &hash, &new_profile("Hidden"))
        .await
        .unwrap();

    // Neither does the admin account
    profile::seed_admin(pool, "admin@test.com", &hash, "Administrator")
        .await
        .unwrap();

    let directory = profile::directory(pool).await.unwrap();
    assert_eq!(directory.len(), 1);
    assert_eq!(directory[0].id, approved);
    assert_eq!(directory[0].innovation_count, 2);

    db.close().await;
}

#[tokio::test]
async fn seed_admin_is_idempotent_and_approved() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let hash = password::hash_password("first-secret").unwrap();
    profile::seed_admin(pool, "admin@test.com", &hash, "Administrator")
        .await
        .unwrap();

    // Second seed with a different hash must not overwrite the account
    let other = password::hash_password("second-secret").unwrap();
    profile::seed_admin(pool, "admin@test.com", &other, "Administrator")
        .await
        .unwrap();

    let auth = profile::find_auth_by_email(pool, "admin@test.com")
        .await
        .unwrap()
        .unwrap();
    assert!(auth.is_admin);
    assert_eq!(auth.status, "approved");
    assert!(password::verify_password("first-secret", &auth.password).unwrap());

    db.close().await;
}
