use std::sync::Arc;
use std::time::Duration;

use mongodb::bson::doc;
use rstest::*;
use tokio_util::sync::CancellationToken;

use crate::core::client::database::{DatabaseError, DocumentFilter, DocumentStore, MockDocumentStore};
use crate::core::client::InMemoryDocumentStore;
use crate::tests::common::{legacy_products, memory_store, orchestrator_for, FaultyStore};

#[rstest]
#[tokio::test]
async fn test_everything_at_target_is_a_clean_no_op(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("contacts", [doc! { "id": 1, "schemaVersion": 3 }]).await;
    memory_store.insert_many("products", [doc! { "id": 1, "schemaVersion": 2 }]).await;
    memory_store.insert_many("users", [doc! { "id": 1 }]).await;

    let run = orchestrator_for(memory_store, &[]).run_all(&CancellationToken::new()).await;

    assert_eq!(run.total_documents_upgraded, 0);
    assert!(run.collections_upgraded.is_empty());
    assert!(run.errors.is_empty());
    assert!(run.step_descriptions.is_empty());
    assert!(run.is_clean());
}

#[rstest]
#[tokio::test]
async fn test_second_run_upgrades_nothing(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(4)).await;
    memory_store.insert_many("contacts", [doc! { "id": 1 }, doc! { "id": 2, "schemaVersion": 2 }]).await;
    let orchestrator = orchestrator_for(memory_store, &[]);

    let first = orchestrator.run_all(&CancellationToken::new()).await;
    assert_eq!(first.total_documents_upgraded, 4 + 3);
    assert!(first.is_clean());

    let second = orchestrator.run_all(&CancellationToken::new()).await;
    assert_eq!(second.total_documents_upgraded, 0);
    assert!(second.collections_upgraded.is_empty());
}

#[rstest]
#[case(1)]
#[case(4)]
#[tokio::test]
async fn test_results_follow_registry_order(#[case] max_concurrency: usize, memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(2)).await;
    memory_store.insert_many("contacts", [doc! { "id": 1 }]).await;

    let run = orchestrator_for(memory_store, &[])
        .with_max_concurrency(max_concurrency)
        .run_all(&CancellationToken::new())
        .await;

    assert_eq!(run.collections_upgraded, vec!["contacts".to_string(), "products".to_string()]);
    assert_eq!(
        run.step_descriptions,
        vec![
            "contacts: v1 -> v2 (1/1 upgraded)".to_string(),
            "contacts: v2 -> v3 (1/1 upgraded)".to_string(),
            "products: v1 -> v2 (2/2 upgraded)".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_collection_access_error_does_not_stop_run() {
    let mut store = MockDocumentStore::new();
    store.expect_min_schema_version().returning(|collection| {
        if collection == "products" {
            Err(DatabaseError::Unavailable("connection reset".to_string()))
        } else {
            Ok(None)
        }
    });
    store.expect_find().never();
    store.expect_update_one().never();

    let run = orchestrator_for(Arc::new(store), &[]).run_all(&CancellationToken::new()).await;

    assert_eq!(run.errors.len(), 1);
    assert_eq!(run.errors[0], "Collection 'products' could not be accessed: Database unavailable: connection reset");
    assert!(!run.cancelled);
}

#[tokio::test]
async fn test_find_failure_is_a_collection_error() {
    let mut store = MockDocumentStore::new();
    store.expect_min_schema_version().returning(|collection| Ok((collection == "products").then_some(1)));
    store.expect_count().returning(|_, _| Ok(3));
    store.expect_find().times(1).returning(|_, _| Err(DatabaseError::Unavailable("cursor lost".to_string())));

    let result = orchestrator_for(Arc::new(store), &[]).run_collection("products", &CancellationToken::new()).await;

    assert_eq!(result.documents_upgraded, 0);
    assert!(result.step_results.is_empty());
    assert_eq!(result.errors, vec!["Collection 'products' could not be accessed: Database unavailable: cursor lost"]);
}

#[rstest]
#[tokio::test]
async fn test_cancelled_before_start(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(3)).await;
    let token = CancellationToken::new();
    token.cancel();

    let run = orchestrator_for(memory_store.clone(), &[]).run_all(&token).await;

    assert!(run.cancelled);
    assert!(!run.is_clean());
    assert_eq!(run.total_documents_upgraded, 0);
    assert!(run.errors.is_empty());
    assert_eq!(memory_store.documents("products").await, legacy_products(3));
}

#[rstest]
#[tokio::test]
async fn test_generous_deadline_completes(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(3)).await;

    let run = orchestrator_for(memory_store, &[])
        .run_all_with_deadline(Duration::from_secs(60), &CancellationToken::new())
        .await;

    assert!(run.is_clean());
    assert_eq!(run.total_documents_upgraded, 3);
}

#[rstest]
#[tokio::test]
async fn test_expired_deadline_cancels_run(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(3)).await;
    let orchestrator = orchestrator_for(memory_store, &[]);
    let parent = CancellationToken::new();
    parent.cancel();

    let run = orchestrator.run_all_with_deadline(Duration::from_secs(60), &parent).await;

    assert!(run.cancelled);
    assert_eq!(run.total_documents_upgraded, 0);
}

#[rstest]
#[tokio::test]
async fn test_panicking_collection_is_reported_as_aborted(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(2)).await;
    let store = Arc::new(FaultyStore::panicking_on(memory_store.clone(), "carts"));

    let run = orchestrator_for(store, &[]).run_all(&CancellationToken::new()).await;

    assert_eq!(
        run.errors,
        vec!["Upgrade task for collection 'carts' did not complete: task panicked or was aborted".to_string()]
    );
    assert_eq!(run.collections_upgraded, vec!["products".to_string()]);
    assert_eq!(run.total_documents_upgraded, 2);
    assert!(!run.cancelled);
}

#[rstest]
#[tokio::test]
async fn test_deadline_timer_cancels_slow_run(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(50)).await;
    let store = Arc::new(FaultyStore::slow_writes(memory_store.clone(), Duration::from_millis(20)));

    let run = orchestrator_for(store, &[])
        .run_all_with_deadline(Duration::from_millis(100), &CancellationToken::new())
        .await;

    assert!(run.cancelled);
    assert!(run.errors.is_empty());
    assert!(run.total_documents_upgraded < 50, "upgraded {}", run.total_documents_upgraded);
    let remaining = memory_store.count("products", DocumentFilter::SchemaVersion(1)).await.unwrap();
    assert_eq!(remaining, 50 - run.total_documents_upgraded);
}
