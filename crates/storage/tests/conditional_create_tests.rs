mod common;

use common::{all_backends, gzip_options, json_object};
use std::sync::Arc;
use updates_storage::{PutOptions, StorageError};

#[tokio::test]
async fn test_conditional_create_never_overwrites() {
    let (backends, _dir) = all_backends().await;

    for store in backends {
        let key = "v1/latest/2021/03/01/11112222-3333-4444-5555-666677778888.json";

        let created = store
            .put_if_not_exists(key, json_object("first"), &gzip_options())
            .await
            .unwrap();
        assert!(created, "{}: first write should create", store.backend_name());

        let created = store
            .put_if_not_exists(key, json_object("second"), &PutOptions::default())
            .await
            .unwrap();
        assert!(!created, "{}: second write should not create", store.backend_name());

        let object = store.get_object(key).await.unwrap();
        assert_eq!(object.data, json_object("first"), "{}", store.backend_name());
        assert_eq!(object.meta.content_type.as_deref(), Some("application/json"));
        assert_eq!(object.meta.content_encoding.as_deref(), Some("gzip"));
    }
}

#[tokio::test]
async fn test_concurrent_conditional_creates_have_one_winner() {
    let (backends, _dir) = all_backends().await;

    for store in backends {
        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .put_if_not_exists("race/key.json", json_object(&i.to_string()), &gzip_options())
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1, "{}", store.backend_name());
    }
}

#[tokio::test]
async fn test_put_replaces_existing_object() {
    let (backends, _dir) = all_backends().await;

    for store in backends {
        store
            .put("v1/latest.json", json_object("old"), &PutOptions::default())
            .await
            .unwrap();
        store
            .put(
                "v1/latest.json",
                json_object("new"),
                &PutOptions::default().with_content_type("application/json"),
            )
            .await
            .unwrap();

        let object = store.get_object("v1/latest.json").await.unwrap();
        assert_eq!(object.data, json_object("new"));
        assert_eq!(object.meta.content_type.as_deref(), Some("application/json"));
    }
}

#[tokio::test]
async fn test_missing_objects_report_not_found() {
    let (backends, _dir) = all_backends().await;

    for store in backends {
        assert!(!store.exists("nothing/here").await.unwrap());
        assert!(matches!(
            store.get_object("nothing/here").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.head("nothing/here").await,
            Err(StorageError::NotFound(_))
        ));
        store.health_check().await.unwrap();
    }
}
