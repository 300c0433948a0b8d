use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::super::error::SchemaRouteError;
use super::super::types::{ApiResponse, SchemaRouteResult};
use crate::core::config::Config;

pub(super) fn schema_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/status", get(handle_schema_status))
        .route("/upgrade", post(handle_run_all_upgrades))
        .route("/upgrade/:collection", post(handle_run_collection_upgrade))
        .with_state(config)
}

fn ensure_admin_enabled(config: &Config) -> Result<(), SchemaRouteError> {
    if config.server_config().admin_enabled {
        Ok(())
    } else {
        Err(SchemaRouteError::AdminDisabled)
    }
}

/// GET /admin/schema/status
async fn handle_schema_status(State(config): State<Arc<Config>>) -> SchemaRouteResult {
    ensure_admin_enabled(&config)?;

    match config.upgrade_orchestrator().schema_status().await {
        Ok(report) => Ok(Json(ApiResponse::success_with_data(report, None)).into_response()),
        Err(e) => {
            error!(error = %e, "Admin: schema status failed");
            Err(SchemaRouteError::StoreUnavailable(e.to_string()))
        }
    }
}

/// POST /admin/schema/upgrade
async fn handle_run_all_upgrades(State(config): State<Arc<Config>>) -> SchemaRouteResult {
    ensure_admin_enabled(&config)?;
    info!("Admin: run all schema upgrades");

    let orchestrator = config.upgrade_orchestrator();
    let cancellation = CancellationToken::new();
    let result = match config.upgrade_config().timeout {
        Some(timeout) => orchestrator.run_all_with_deadline(timeout, &cancellation).await,
        None => orchestrator.run_all(&cancellation).await,
    };

    if !result.is_clean() {
        warn!(errors = result.errors.len(), cancelled = result.cancelled, "Admin: schema upgrade finished with errors");
    }
    let message = format!("{} document(s) upgraded", result.total_documents_upgraded);
    Ok(Json(ApiResponse::success_with_data(result, Some(message))).into_response())
}

/// POST /admin/schema/upgrade/{collection}
async fn handle_run_collection_upgrade(
    State(config): State<Arc<Config>>,
    Path(collection): Path<String>,
) -> SchemaRouteResult {
    ensure_admin_enabled(&config)?;
    if !config.registry().contains(&collection) {
        return Err(SchemaRouteError::UnknownCollection(collection));
    }
    info!(collection = %collection, "Admin: run collection schema upgrade");

    let result = config.upgrade_orchestrator().run_collection(&collection, &CancellationToken::new()).await;
    let message = format!("{} document(s) upgraded", result.documents_upgraded);
    Ok(Json(ApiResponse::success_with_data(result, Some(message))).into_response())
}
