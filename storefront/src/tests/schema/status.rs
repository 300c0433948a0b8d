use std::collections::BTreeMap;
use std::sync::Arc;

use mongodb::bson::doc;
use rstest::*;
use tokio_util::sync::CancellationToken;

use crate::core::client::database::{DatabaseError, MockDocumentStore};
use crate::core::client::InMemoryDocumentStore;
use crate::schema::UpgradeError;
use crate::tests::common::{memory_store, orchestrator_for};

#[rstest]
#[tokio::test]
async fn test_status_reports_distribution(memory_store: Arc<InMemoryDocumentStore>) {
    memory_store
        .insert_many("contacts", [doc! { "id": 1 }, doc! { "id": 2, "schemaVersion": 2 }, doc! { "id": 3, "schemaVersion": 3 }])
        .await;
    let orchestrator = orchestrator_for(memory_store, &[]);

    let report = orchestrator.schema_status().await.unwrap();

    assert_eq!(report.len(), 6);
    let contacts = &report["contacts"];
    assert_eq!(contacts.current_target_version, 3);
    assert_eq!(contacts.total_documents, 3);
    assert_eq!(contacts.min_version, Some(1));
    assert_eq!(contacts.version_distribution, BTreeMap::from([(1, 1), (2, 1), (3, 1)]));
    assert!(contacts.needs_migration);

    let users = &report["users"];
    assert_eq!(users.total_documents, 0);
    assert_eq!(users.min_version, None);
    assert!(!users.needs_migration);

    orchestrator.run_all(&CancellationToken::new()).await;
    let report = orchestrator.schema_status().await.unwrap();
    assert!(!report["contacts"].needs_migration);
    assert_eq!(report["contacts"].version_distribution, BTreeMap::from([(3, 3)]));
}

#[tokio::test]
async fn test_status_surfaces_store_errors() {
    let mut store = MockDocumentStore::new();
    store.expect_count().returning(|_, _| Err(DatabaseError::Unavailable("timeout".to_string())));
    store.expect_version_distribution().returning(|_| Ok(BTreeMap::new()));

    let err = orchestrator_for(Arc::new(store), &[]).schema_status().await.unwrap_err();
    assert!(matches!(err, UpgradeError::CollectionAccess { .. }));
}

#[test]
fn test_status_serializes_camel_case() {
    let status = crate::schema::CollectionSchemaStatus {
        current_target_version: 2,
        total_documents: 5,
        min_version: Some(1),
        version_distribution: BTreeMap::from([(1, 2), (2, 3)]),
        needs_migration: true,
    };
    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["currentTargetVersion"], 2);
    assert_eq!(json["versionDistribution"]["1"], 2);
    assert_eq!(json["needsMigration"], true);
}
