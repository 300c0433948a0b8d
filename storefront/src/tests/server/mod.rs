use std::sync::Arc;

use mongodb::bson::{doc, Bson};
use reqwest::StatusCode;
use rstest::*;

use crate::core::client::database::{DatabaseError, MockDocumentStore};
use crate::core::client::InMemoryDocumentStore;
use crate::core::config::Config;
use crate::schema::{CollectionUpgradeResult, SchemaStatusReport, UpgradeRunResult};
use crate::server::setup_server;
use crate::server::types::ApiResponse;
use crate::tests::common::{legacy_products, memory_store, test_config};

async fn start_server(config: Arc<Config>) -> String {
    let (address, _handle) = setup_server(config).await.expect("Failed to start server");
    format!("http://{}", address)
}

async fn seeded_server(store: Arc<InMemoryDocumentStore>, admin_enabled: bool) -> (String, Arc<Config>) {
    store.insert_many("contacts", [doc! { "id": 1, "adminNotes": ["called"] }]).await;
    store.insert_many("products", legacy_products(2)).await;
    let config = test_config(store, admin_enabled);
    (start_server(config.clone()).await, config)
}

#[rstest]
#[tokio::test]
async fn test_health_and_readiness(memory_store: Arc<InMemoryDocumentStore>) {
    let (url, config) = seeded_server(memory_store, false).await;
    let client = reqwest::Client::new();

    let health = client.get(format!("{}/health", url)).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.unwrap(), "OK");

    let ready = client.get(format!("{}/ready", url)).send().await.unwrap();
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);

    config.mark_ready();
    let ready = client.get(format!("{}/ready", url)).send().await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_unreachable_store() {
    let mut store = MockDocumentStore::new();
    store.expect_health_check().returning(|| Err(DatabaseError::Unavailable("connection refused".to_string())));
    let url = start_server(test_config(Arc::new(store), false)).await;

    let health = reqwest::get(format!("{}/health", url)).await.unwrap();

    assert_eq!(health.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.text().await.unwrap(), "Document store unavailable");
}

#[rstest]
#[case("GET", "/admin/schema/status")]
#[case("POST", "/admin/schema/upgrade")]
#[case("POST", "/admin/schema/upgrade/contacts")]
#[tokio::test]
async fn test_admin_routes_forbidden_when_disabled(
    #[case] method: &str,
    #[case] path: &str,
    memory_store: Arc<InMemoryDocumentStore>,
) {
    let (url, _config) = seeded_server(memory_store.clone(), false).await;
    let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap();

    let response = reqwest::Client::new().request(method, format!("{}{}", url, path)).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(!body.success);
    let contact = memory_store.get("contacts", &Bson::Int32(1)).await.unwrap();
    assert!(!contact.contains_key("schemaVersion"));
}

#[rstest]
#[tokio::test]
async fn test_admin_run_all_upgrades(memory_store: Arc<InMemoryDocumentStore>) {
    let (url, _config) = seeded_server(memory_store.clone(), true).await;

    let response = reqwest::Client::new().post(format!("{}/admin/schema/upgrade", url)).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<UpgradeRunResult> = response.json().await.unwrap();
    assert!(body.success);
    let run = body.data.unwrap();
    assert_eq!(run.total_documents_upgraded, 2 + 2);
    assert_eq!(run.collections_upgraded, vec!["contacts".to_string(), "products".to_string()]);
    assert!(run.errors.is_empty());

    let product = memory_store.get("products", &Bson::Int32(2)).await.unwrap();
    assert_eq!(product.get_i32("schemaVersion").unwrap(), 2);
}

#[rstest]
#[tokio::test]
async fn test_admin_run_collection_upgrade(memory_store: Arc<InMemoryDocumentStore>) {
    let (url, _config) = seeded_server(memory_store.clone(), true).await;
    let client = reqwest::Client::new();

    let response = client.post(format!("{}/admin/schema/upgrade/contacts", url)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<CollectionUpgradeResult> = response.json().await.unwrap();
    let result = body.data.unwrap();
    assert_eq!(result.collection, "contacts");
    assert_eq!(result.documents_upgraded, 2);

    let product = memory_store.get("products", &Bson::Int32(1)).await.unwrap();
    assert!(!product.contains_key("schemaVersion"));

    let unknown = client.post(format!("{}/admin/schema/upgrade/reviews", url)).send().await.unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn test_admin_schema_status(memory_store: Arc<InMemoryDocumentStore>) {
    let (url, _config) = seeded_server(memory_store, true).await;

    let response = reqwest::Client::new().get(format!("{}/admin/schema/status", url)).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<SchemaStatusReport> = response.json().await.unwrap();
    let report = body.data.unwrap();
    assert!(report["products"].needs_migration);
    assert_eq!(report["products"].total_documents, 2);
    assert!(!report["wishlists"].needs_migration);
}

#[rstest]
#[tokio::test]
async fn test_unknown_route_is_404(memory_store: Arc<InMemoryDocumentStore>) {
    let (url, _config) = seeded_server(memory_store, true).await;
    let response = reqwest::get(format!("{}/does-not-exist", url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
