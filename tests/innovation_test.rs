//! Innovation model tests: CRUD, catalog filtering, images, categories.

mod common;

use orbit::errors::AppError;
use orbit::models::{category, innovation};
use orbit::models::innovation::{CatalogFilter, NewInnovation};
use orbit::storage::{BlobStore, MemoryBlobStore};

use common::{create_test_innovation, create_test_innovator, setup_test_db};

#[tokio::test]
async fn create_and_read_back() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let owner = create_test_innovator(pool, "crud").await;
    let id = create_test_innovation(pool, owner, "Solar Dryer").await;

    let found = innovation::find_by_id(pool, id).await.unwrap().unwrap();
    assert_eq!(found.title, "Solar Dryer");
    assert_eq!(found.origin, "Surabaya");
    assert_eq!(found.profile_id, owner);
    assert_eq!(found.web_url.as_deref(), Some("https://original.example"));

    assert!(innovation::find_by_id(pool, id + 999).await.unwrap().is_none());

    db.close().await;
}

#[tokio::test]
async fn update_overwrites_all_editable_fields() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let owner = create_test_innovator(pool, "edit").await;
    let id = create_test_innovation(pool, owner, "Old Title").await;

    let edited = NewInnovation {
        title: "New Title".to_string(),
        overview: "New overview".to_string(),
        features: "New features".to_string(),
        potential_application: "New application".to_string(),
        unique_value: "New value".to_string(),
        origin: "Malang".to_string(),
        tiktok_url: None,
        instagram_url: None,
        youtube_url: Some("https://youtube.com/@orbit".to_string()),
        facebook_url: None,
        web_url: None,
        profile_id: owner,
    };
    innovation::update(pool, id, &edited).await.unwrap();

    let found = innovation::find_by_id(pool, id).await.unwrap().unwrap();
    assert_eq!(found.title, "New Title");
    assert_eq!(found.origin, "Malang");
    assert_eq!(found.youtube_url.as_deref(), Some("https://youtube.com/@orbit"));
    assert!(found.web_url.is_none());

    let err = innovation::update(pool, id + 999, &edited).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    db.close().await;
}

#[tokio::test]
async fn catalog_search_and_category_filter() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    let owner = create_test_innovator(pool, "catalog").await;
    let dryer = create_test_innovation(pool, owner, "Solar Dryer").await;
    let filter = create_test_innovation(pool, owner, "Water Filter").await;

    let agri = category::create(pool, "Agriculture", "").await.unwrap();
    innovation::set_categories(pool, dryer, &[agri]).await.unwrap();

    let all = innovation::list(pool, &blob, &CatalogFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let searched = innovation::list(
        pool,
        &blob,
        &CatalogFilter {
            q: Some("solar".to_string()),
            category: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].id, dryer);

    let by_category = innovation::list(
        pool,
        &blob,
        &CatalogFilter {
            q: None,
            category: Some(agri),
        },
    )
    .await
    .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, dryer);

    let both = innovation::list(
        pool,
        &blob,
        &CatalogFilter {
            q: Some("filter".to_string()),
            category: Some(agri),
        },
    )
    .await
    .unwrap();
    assert!(both.is_empty());
    let _ = filter;

    db.close().await;
}

#[tokio::test]
async fn detail_resolves_images_owner_and_categories() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    let owner = create_test_innovator(pool, "detail").await;
    let id = create_test_innovation(pool, owner, "Cocoa Grader").await;

    blob.put("innovations/c1.png", b"x", "image/png").await.unwrap();
    innovation::add_images(pool, id, &["innovations/c1.png".to_string()])
        .await
        .unwrap();
    let agri = category::create(pool, "Food Tech", "").await.unwrap();
    innovation::set_categories(pool, id, &[agri]).await.unwrap();

    let detail = innovation::find_detail(pool, &blob, id).await.unwrap().unwrap();
    assert_eq!(detail.owner_name, "Innovator detail");
    assert_eq!(detail.images.len(), 1);
    assert_eq!(detail.images[0].url, "/uploads/innovations/c1.png");
    assert_eq!(detail.categories.len(), 1);
    assert_eq!(detail.categories[0].name, "Food Tech");

    db.close().await;
}

#[tokio::test]
async fn remove_image_detaches_row_and_blob() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    let owner = create_test_innovator(pool, "rmimg").await;
    let id = create_test_innovation(pool, owner, "Mini Tractor").await;

    blob.put("innovations/gone.png", b"x", "image/png").await.unwrap();
    innovation::add_images(pool, id, &["innovations/gone.png".to_string()])
        .await
        .unwrap();

    innovation::remove_image(pool, &blob, id, "innovations/gone.png")
        .await
        .unwrap();
    assert!(innovation::image_keys(pool, id).await.unwrap().is_empty());
    assert!(!blob.contains("innovations/gone.png").await);

    let err = innovation::remove_image(pool, &blob, id, "innovations/gone.png")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    db.close().await;
}

#[tokio::test]
async fn delete_removes_images_and_blobs() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let blob = MemoryBlobStore::new();

    let owner = create_test_innovator(pool, "delete").await;
    let id = create_test_innovation(pool, owner, "Salt Harvester").await;

    blob.put("innovations/d1.png", b"x", "image/png").await.unwrap();
    innovation::add_images(pool, id, &["innovations/d1.png".to_string()])
        .await
        .unwrap();

    innovation::delete(pool, &blob, id).await.unwrap();
    assert!(innovation::find_by_id(pool, id).await.unwrap().is_none());
    assert!(!blob.contains("innovations/d1.png").await);

    let err = innovation::delete(pool, &blob, id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    db.close().await;
}

#[tokio::test]
async fn set_categories_replaces_joins() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let owner = create_test_innovator(pool, "cats").await;
    let id = create_test_innovation(pool, owner, "Hydroponic Rack").await;

    let a = category::create(pool, "Agritech", "").await.unwrap();
    let b = category::create(pool, "Energy", "").await.unwrap();

    innovation::set_categories(pool, id, &[a, b]).await.unwrap();
    assert_eq!(innovation::categories_of(pool, id).await.unwrap().len(), 2);

    innovation::set_categories(pool, id, &[b]).await.unwrap();
    let cats = innovation::categories_of(pool, id).await.unwrap();
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].name, "Energy");

    innovation::set_categories(pool, id, &[]).await.unwrap();
    assert!(innovation::categories_of(pool, id).await.unwrap().is_empty());

    db.close().await;
}

#[tokio::test]
async fn category_names_are_unique() {
    let db = setup_test_db().await;
    let pool = db.pool();

    category::create(pool, "Agritech", "farm tools").await.unwrap();
    let err = category::create(pool, "Agritech", "again").await.unwrap_err();
    assert!(err.to_string().contains("duplicate key"));

    db.close().await;
}
