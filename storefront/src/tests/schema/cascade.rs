use std::sync::Arc;

use mongodb::bson::{doc, Bson};
use rstest::*;
use tokio_util::sync::CancellationToken;

use crate::core::client::database::DocumentStore;
use crate::core::client::{DocumentFilter, InMemoryDocumentStore};
use crate::schema::revisions::contacts_0002::ContactsAdminNotes;
use crate::schema::step::run_step;
use crate::schema::{StepContext, StepOutcome};
use crate::tests::common::{legacy_products, memory_store, orchestrator_for, FaultyStore};

#[rstest]
#[tokio::test]
async fn test_contacts_cascade_from_missing_and_v2(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store
        .insert_many(
            "contacts",
            [
                doc! { "id": "a", "email": "a@example.com", "adminNotes": ["fix shipped"] },
                doc! { "id": "b", "email": "b@example.com", "schemaVersion": 2, "adminNotes": [] },
            ],
        )
        .await;

    let orchestrator = orchestrator_for(memory_store.clone(), &[]);
    let result = orchestrator.run_collection("contacts", &CancellationToken::new()).await;

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.starting_version, Some(1));
    assert_eq!(result.documents_upgraded, 3);
    assert_eq!(result.step_results.len(), 2);
    assert_eq!(result.step_results[0].documents_upgraded, 1);
    assert_eq!(result.step_results[1].documents_upgraded, 2);

    let a = memory_store.get("contacts", &Bson::String("a".to_string())).await.unwrap();
    assert_eq!(a.get_i32("schemaVersion").unwrap(), 3);
    let note = a.get_array("adminNotes").unwrap()[0].as_document().unwrap().clone();
    assert_eq!(note.get_i32("adminId").unwrap(), 1);
    assert_eq!(note.get_str("note").unwrap(), "fix shipped");
    assert!(note.get_datetime("createdAt").is_ok());
    assert_eq!(a.get("adminId"), Some(&Bson::Null));
    assert_eq!(a.get_str("status").unwrap(), "new");

    let b = memory_store.get("contacts", &Bson::String("b".to_string())).await.unwrap();
    assert_eq!(b.get_i32("schemaVersion").unwrap(), 3);
    assert_eq!(b.get("adminId"), Some(&Bson::Null));
}

#[rstest]
#[tokio::test]
async fn test_unparseable_price_defaults_to_zero(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", [doc! { "id": 1, "price": "abc", "stock": 4 }]).await;

    let result = orchestrator_for(memory_store.clone(), &[]).run_collection("products", &CancellationToken::new()).await;

    assert!(result.errors.is_empty());
    assert_eq!(result.documents_upgraded, 1);
    let product = memory_store.get("products", &Bson::Int32(1)).await.unwrap();
    assert_eq!(product.get_f64("price").unwrap(), 0.0);
    assert_eq!(product.get_i64("stock").unwrap(), 4);
    assert_eq!(product.get_i32("schemaVersion").unwrap(), 2);
}

#[rstest]
#[tokio::test]
async fn test_one_failed_write_does_not_stop_siblings(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(10)).await;
    memory_store.insert_many("contacts", [doc! { "id": 1, "adminNotes": ["hello"] }]).await;
    let store = Arc::new(FaultyStore::failing_writes(memory_store.clone(), [7]));

    let run = orchestrator_for(store, &[]).run_all(&CancellationToken::new()).await;

    assert_eq!(run.errors.len(), 1);
    assert!(run.errors[0].contains("Document 7 in 'products'"), "{}", run.errors[0]);
    assert!(run.step_descriptions.contains(&"products: v1 -> v2 (9/10 upgraded)".to_string()));
    assert_eq!(run.collections_upgraded, vec!["contacts".to_string(), "products".to_string()]);
    assert_eq!(run.total_documents_upgraded, 9 + 2);

    let seventh = memory_store.get("products", &Bson::Int32(7)).await.unwrap();
    assert!(!seventh.contains_key("schemaVersion"));
    let contact = memory_store.get("contacts", &Bson::Int32(1)).await.unwrap();
    assert_eq!(contact.get_i32("schemaVersion").unwrap(), 3);
}

#[rstest]
#[tokio::test]
async fn test_failed_document_is_retried_by_next_run(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(3)).await;
    let faulty = Arc::new(FaultyStore::failing_writes(memory_store.clone(), [2]));
    let first = orchestrator_for(faulty, &[]).run_all(&CancellationToken::new()).await;
    assert_eq!(first.total_documents_upgraded, 2);

    let second = orchestrator_for(memory_store.clone(), &[]).run_all(&CancellationToken::new()).await;
    assert_eq!(second.total_documents_upgraded, 1);
    assert!(second.is_clean());
}

#[rstest]
#[tokio::test]
async fn test_step_transform_error_is_recorded(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store
        .insert_many(
            "contacts",
            [doc! { "id": 1, "adminNotes": [42] }, doc! { "id": 2, "adminNotes": ["fine"] }],
        )
        .await;

    let result = orchestrator_for(memory_store.clone(), &[]).run_collection("contacts", &CancellationToken::new()).await;

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Document 1 in 'contacts' could not be upgraded to v2"));
    let broken = memory_store.get("contacts", &Bson::Int32(1)).await.unwrap();
    assert!(!broken.contains_key("schemaVersion"));
    let fine = memory_store.get("contacts", &Bson::Int32(2)).await.unwrap();
    assert_eq!(fine.get_i32("schemaVersion").unwrap(), 3);
}

#[rstest]
#[tokio::test]
async fn test_document_without_key_is_reported(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", [doc! { "_id": "internal-1", "price": 3 }]).await;

    let result = orchestrator_for(memory_store, &[]).run_collection("products", &CancellationToken::new()).await;

    assert_eq!(result.documents_upgraded, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("_id=\"internal-1\""), "{}", result.errors[0]);
    assert!(result.errors[0].contains("no stable key field 'id'"));
}

#[rstest]
#[tokio::test]
async fn test_absent_step_is_a_no_op(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("reviews", [doc! { "id": 1, "rating": 5 }]).await;

    let result =
        orchestrator_for(memory_store.clone(), &[("reviews", 2)]).run_collection("reviews", &CancellationToken::new()).await;

    assert!(result.errors.is_empty());
    assert_eq!(result.documents_upgraded, 0);
    assert_eq!(result.step_results.len(), 1);
    assert_eq!(result.step_results[0].outcome, StepOutcome::Absent);
    assert_eq!(result.step_results[0].describe(), "reviews: v1 -> v2 (no step registered)");

    let review = memory_store.get("reviews", &Bson::Int32(1)).await.unwrap();
    assert!(!review.contains_key("schemaVersion"));
}

#[rstest]
#[tokio::test]
async fn test_absent_steps_leave_documents_in_place(memory_store: Arc<InMemoryDocumentStore>) {
    // No step exists past contacts v3; nothing is eligible for v4 -> v5 once v3 -> v4 is skipped
    memory_store.insert_many("contacts", [doc! { "id": 1, "schemaVersion": 3 }]).await;

    let result =
        orchestrator_for(memory_store.clone(), &[("contacts", 5)]).run_collection("contacts", &CancellationToken::new()).await;

    assert!(result.errors.is_empty());
    assert_eq!(result.step_results.len(), 1);
    assert_eq!(result.step_results[0].to_version, 4);
    assert_eq!(memory_store.count("contacts", DocumentFilter::SchemaVersion(3)).await.unwrap(), 1);
}

#[rstest]
#[tokio::test]
async fn test_unreadable_version_is_never_touched(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store
        .insert_many("products", [doc! { "id": 1, "schemaVersion": "1", "price": "2" }, doc! { "id": 2, "price": "2" }])
        .await;

    let result = orchestrator_for(memory_store.clone(), &[]).run_collection("products", &CancellationToken::new()).await;

    assert_eq!(result.documents_upgraded, 1);
    let untouched = memory_store.get("products", &Bson::Int32(1)).await.unwrap();
    assert_eq!(untouched.get_str("schemaVersion").unwrap(), "1");
    assert_eq!(untouched.get_str("price").unwrap(), "2");
}

#[rstest]
#[tokio::test]
async fn test_cancellation_between_documents(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store.insert_many("products", legacy_products(5)).await;
    let token = CancellationToken::new();
    let store = Arc::new(FaultyStore::cancelling_after_first_write(memory_store.clone(), token.clone()));

    let result = orchestrator_for(store, &[]).run_collection("products", &token).await;

    assert!(result.cancelled);
    assert_eq!(result.documents_upgraded, 1);
    assert_eq!(result.step_results[0].documents_processed, 1);
    assert!(result.step_results[0].interrupted);
    assert!(result.errors.is_empty());
    assert_eq!(memory_store.count("products", DocumentFilter::SchemaVersion(1)).await.unwrap(), 4);
}

#[rstest]
#[tokio::test]
async fn test_stale_snapshot_never_moves_version_backwards(memory_store: Arc<InMemoryDocumentStore>) {
    let current = doc! {
        "id": 1,
        "schemaVersion": 3,
        "adminNotes": [{ "adminId": 1, "note": "old" }, { "adminId": 4, "note": "new" }],
        "adminId": 4,
    };
    memory_store.insert_many("contacts", [current.clone()]).await;
    let store = FaultyStore::serving_snapshot(memory_store.clone(), vec![doc! { "id": 1, "adminNotes": ["old"] }]);

    let result = run_step(&ContactsAdminNotes, &store, &StepContext::new(CancellationToken::new())).await.unwrap();

    assert_eq!(result.documents_processed, 1);
    assert_eq!(result.documents_upgraded, 0);
    assert_eq!(result.documents_skipped, 1);
    assert!(result.errors.is_empty());
    assert_eq!(memory_store.get("contacts", &Bson::Int32(1)).await.unwrap(), current);
}
