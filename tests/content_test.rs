//! News, event, and banner model tests.

mod common;

use chrono::{Duration, Utc};

use orbit::errors::AppError;
use orbit::models::{banner, event, news};
use orbit::models::event::NewEvent;
use orbit::storage::{BlobStore, MemoryBlobStore};

use common::setup_test_db;

#[tokio::test]
async fn news_crud_and_cover_handling() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    let id = news::create(pool, "Launch", "We are live", Some("news/cover1.png"))
        .await
        .unwrap();
    blob.put("news/cover1.png", b"x", "image/png").await.unwrap();

    let item = news::find_by_id(pool, &blob, id).await.unwrap().unwrap();
    assert_eq!(item.title, "Launch");
    assert_eq!(item.image_url.as_deref(), Some("/uploads/news/cover1.png"));

    // Updating without a new cover keeps the stored key
    news::update(pool, id, "Launch v2", "Still live", None).await.unwrap();
    let item = news::find_by_id(pool, &blob, id).await.unwrap().unwrap();
    assert_eq!(item.title, "Launch v2");
    assert_eq!(item.image_key.as_deref(), Some("news/cover1.png"));

    // Updating with a new cover swaps the key
    news::update(pool, id, "Launch v3", "Still live", Some("news/cover2.png"))
        .await
        .unwrap();
    let item = news::find_by_id(pool, &blob, id).await.unwrap().unwrap();
    assert_eq!(item.image_key.as_deref(), Some("news/cover2.png"));

    // Deleting removes the row and the cover blob
    blob.put("news/cover2.png", b"y", "image/png").await.unwrap();
    news::delete(pool, &blob, id).await.unwrap();
    assert!(news::find_by_id(pool, &blob, id).await.unwrap().is_none());
    assert!(!blob.contains("news/cover2.png").await);

    db.close().await;
}

#[tokio::test]
async fn news_lists_newest_first() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    news::create(pool, "Older", "body", None).await.unwrap();
    let newer = news::create(pool, "Newer", "body", None).await.unwrap();

    // Force distinct publish times
    sqlx::query("UPDATE news SET published_at = published_at + interval '1 hour' WHERE id = $1")
        .bind(newer)
        .execute(pool)
        .await
        .unwrap();

    let items = news::find_all(pool, &blob).await.unwrap();
    assert_eq!(items[0].title, "Newer");

    let latest = news::find_latest(pool, &blob, 1).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].title, "Newer");

    db.close().await;
}

#[tokio::test]
async fn events_order_upcoming_before_past() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    let soon = NewEvent {
        title: "Soon".to_string(),
        description: "Upcoming workshop".to_string(),
        location: "Surabaya".to_string(),
        starts_at: Utc::now() + Duration::days(2),
        ends_at: None,
    };
    let later = NewEvent {
        title: "Later".to_string(),
        description: "Expo".to_string(),
        location: "Malang".to_string(),
        starts_at: Utc::now() + Duration::days(30),
        ends_at: None,
    };
    let past = NewEvent {
        title: "Past".to_string(),
        description: "Old meetup".to_string(),
        location: String::new(),
        starts_at: Utc::now() - Duration::days(10),
        ends_at: None,
    };

    event::create(pool, &later, None).await.unwrap();
    event::create(pool, &past, None).await.unwrap();
    event::create(pool, &soon, None).await.unwrap();

    let events = event::find_all(pool, &blob).await.unwrap();
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Soon", "Later", "Past"]);
    assert!(events[0].upcoming);
    assert!(!events[2].upcoming);

    db.close().await;
}

#[tokio::test]
async fn event_update_and_delete() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    let new = NewEvent {
        title: "Demo Day".to_string(),
        description: "Pitch session".to_string(),
        location: "Surabaya".to_string(),
        starts_at: Utc::now() + Duration::days(7),
        ends_at: Some(Utc::now() + Duration::days(7) + Duration::hours(3)),
    };
    let id = event::create(pool, &new, Some("events/banner.png")).await.unwrap();
    blob.put("events/banner.png", b"x", "image/png").await.unwrap();

    let edited = NewEvent {
        title: "Demo Day 2".to_string(),
        ..new
    };
    event::update(pool, id, &edited, None).await.unwrap();

    let found = event::find_by_id(pool, &blob, id).await.unwrap().unwrap();
    assert_eq!(found.title, "Demo Day 2");
    assert_eq!(found.image_url.as_deref(), Some("/uploads/events/banner.png"));
    assert!(found.ends_at.is_some());

    event::delete(pool, &blob, id).await.unwrap();
    assert!(event::find_by_id(pool, &blob, id).await.unwrap().is_none());
    assert!(!blob.contains("events/banner.png").await);

    let err = event::delete(pool, &blob, id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    db.close().await;
}

#[tokio::test]
async fn banners_filter_on_active_and_respect_sort_order() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    let second = banner::create(pool, "Second", "banners/b2.png", None, 2).await.unwrap();
    let first = banner::create(
        pool,
        "First",
        "banners/b1.png",
        Some("https://orbit.example"),
        1,
    )
    .await
    .unwrap();
    let hidden = banner::create(pool, "Hidden", "banners/b3.png", None, 0).await.unwrap();
    banner::set_active(pool, hidden, false).await.unwrap();

    let active = banner::find_active(pool, &blob).await.unwrap();
    let titles: Vec<&str> = active.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(active[0].image_url, "/uploads/banners/b1.png");
    assert_eq!(active[0].link_url.as_deref(), Some("https://orbit.example"));

    assert_eq!(banner::find_all(pool, &blob).await.unwrap().len(), 3);

    blob.put("banners/b1.png", b"x", "image/png").await.unwrap();
    banner::delete(pool, &blob, first).await.unwrap();
    assert!(!blob.contains("banners/b1.png").await);
    assert_eq!(banner::find_all(pool, &blob).await.unwrap().len(), 2);

    let _ = second;
    db.close().await;
}
