use bytes::Bytes;
use portfolio_site::backend::Credentials;
use portfolio_site::object_store::{LocalStore, ObjectStore, ObjectStoreError, PutOptions};

#[tokio::test]
async fn test_local_store_put_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let data = Bytes::from("jpeg bytes");
    let stored = store
        .put(
            &Credentials::Anon,
            "media",
            "food/1-ramen.jpg",
            data.clone(),
            &PutOptions::new("image/jpeg"),
        )
        .await
        .unwrap();
    assert_eq!(stored, "food/1-ramen.jpg");

    let retrieved = store.get("media", "food/1-ramen.jpg").await.unwrap();
    assert_eq!(retrieved, data);
    assert!(dir.path().join("media/food/1-ramen.jpg").is_file());
}

#[tokio::test]
async fn test_local_store_refuses_overwrite_without_upsert() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    let options = PutOptions::new("image/png");

    store
        .put(&Credentials::Anon, "media", "car/a.png", Bytes::from("one"), &options)
        .await
        .unwrap();
    let second = store
        .put(&Credentials::Anon, "media", "car/a.png", Bytes::from("two"), &options)
        .await;
    assert!(matches!(second, Err(ObjectStoreError::AlreadyExists(_))));
}

#[tokio::test]
async fn test_local_store_upsert_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    let options = PutOptions {
        upsert: true,
        cache_control: Some(3600),
        ..PutOptions::new("image/jpeg")
    };

    store
        .put(&Credentials::Anon, "anime-covers", "abc/cover.jpg", Bytes::from("old"), &options)
        .await
        .unwrap();
    store
        .put(&Credentials::Anon, "anime-covers", "abc/cover.jpg", Bytes::from("new"), &options)
        .await
        .unwrap();

    let data = store.get("anime-covers", "abc/cover.jpg").await.unwrap();
    assert_eq!(data, Bytes::from("new"));
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let result = store.get("media", "missing.jpg").await;
    assert!(matches!(result, Err(ObjectStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_local_store_rejects_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("files")).unwrap();

    let result = store.get("media", "../secret.txt").await;
    assert!(matches!(result, Err(ObjectStoreError::InvalidPath(_))));

    let result = store
        .put(
            &Credentials::Anon,
            "..",
            "x.jpg",
            Bytes::from("x"),
            &PutOptions::new("image/jpeg"),
        )
        .await;
    assert!(matches!(result, Err(ObjectStoreError::InvalidPath(_))));
}

#[test]
fn test_local_store_public_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    assert_eq!(
        store.public_url("anime-covers", "abc/cover.jpg"),
        "/storage/v1/object/public/anime-covers/abc/cover.jpg"
    );
}
