use std::path::Path;
use std::sync::Arc;

use clap::Parser as _;
use dotenvy::dotenv;
use storefront::cli::{Cli, Commands, MigrateCmd, RunCmd, StatusCmd};
use storefront::config::{ConfigBuilder, StorefrontConfig};
use storefront::core::config::Config;
use storefront::schema::UpgradeRunResult;
use storefront::server::setup_server;
use storefront::utils::logging::init_logging;
use storefront::{StorefrontError, StorefrontResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    init_logging()?;
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Commands::Run { run_command } => run_storefront(run_command).await,
        Commands::Migrate { migrate_command } => migrate(migrate_command).await,
        Commands::Status { status_command } => status(status_command).await,
    };

    if let Err(e) = &outcome {
        error!(error = %e, error_chain = ?e, "Storefront command failed");
    }
    Ok(outcome?)
}

fn config_builder(config_file: Option<&Path>) -> StorefrontResult<ConfigBuilder> {
    Ok(ConfigBuilder::new().with_optional_config_file(config_file)?)
}

async fn build_config(builder: ConfigBuilder) -> StorefrontResult<Arc<Config>> {
    let config: StorefrontConfig = builder.build()?;
    debug!(?config, "Configuration loaded");
    Ok(Arc::new(Config::setup(&config).await?))
}

async fn run_all(config: &Config, cancellation: &CancellationToken) -> UpgradeRunResult {
    let orchestrator = config.upgrade_orchestrator();
    match config.upgrade_config().timeout {
        Some(timeout) => orchestrator.run_all_with_deadline(timeout, cancellation).await,
        None => orchestrator.run_all(cancellation).await,
    }
}

/// Serves HTTP, runs pending upgrades, then flips readiness and waits for Ctrl-C
async fn run_storefront(run_cmd: &RunCmd) -> StorefrontResult<()> {
    info!("Starting storefront service");
    let builder = config_builder(run_cmd.config_file.as_deref())?
        .with_database_overrides(&run_cmd.database_args)
        .with_server_overrides(&run_cmd.server_args)
        .with_upgrade_overrides(&run_cmd.upgrade_args)
        .with_startup_upgrade(!run_cmd.skip_startup_upgrade);
    let config = build_config(builder).await?;

    let (address, server_handle) = setup_server(config.clone()).await?;
    debug!(%address, "Application router initialized");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl+c");
        }
        signal_token.cancel();
    });

    if config.upgrade_config().run_on_startup {
        let result = run_all(&config, &shutdown).await;
        if !result.is_clean() {
            warn!(errors = ?result.errors, cancelled = result.cancelled, "Start-up schema upgrade finished with errors");
        }
    } else {
        info!("Start-up schema upgrade disabled");
    }
    config.mark_ready();
    info!("Storefront service ready");

    shutdown.cancelled().await;
    server_handle.shutdown().await.map_err(|e| StorefrontError::ServerError(e.to_string()))?;
    info!("Storefront service shutting down");
    Ok(())
}

/// One-shot upgrade run, printed as JSON
#[allow(clippy::print_stdout)]
async fn migrate(migrate_cmd: &MigrateCmd) -> StorefrontResult<()> {
    let builder = config_builder(migrate_cmd.config_file.as_deref())?
        .with_database_overrides(&migrate_cmd.database_args)
        .with_upgrade_overrides(&migrate_cmd.upgrade_args);
    let config = build_config(builder).await?;
    let cancellation = CancellationToken::new();

    let error_count = match &migrate_cmd.collection {
        Some(collection) => {
            let result = config.upgrade_orchestrator().run_collection(collection, &cancellation).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            result.errors.len()
        }
        None => {
            let result = run_all(&config, &cancellation).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            result.errors.len()
        }
    };

    if migrate_cmd.fail_on_errors && error_count > 0 {
        return Err(StorefrontError::UpgradeFailed(error_count));
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn status(status_cmd: &StatusCmd) -> StorefrontResult<()> {
    let builder = config_builder(status_cmd.config_file.as_deref())?.with_database_overrides(&status_cmd.database_args);
    let config = build_config(builder).await?;

    let report = config.upgrade_orchestrator().schema_status().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
