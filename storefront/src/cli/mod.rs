use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod database;
pub mod server;
pub mod upgrade;

use database::DatabaseCliArgs;
use server::ServerCliArgs;
use upgrade::UpgradeCliArgs;

#[derive(Parser, Debug)]
#[command(
    name = "storefront",
    about = "Storefront admin backend",
    long_about = "Storefront admin backend.\n\n\
    Stored documents are upgraded to the schema versions expected by this build \
    before the service reports ready.",
    after_help = "Examples:\n  \
    storefront run --config-file storefront.yaml\n  \
    storefront migrate --collection contacts\n  \
    storefront status --database-type memory"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the storefront service
    #[command(long_about = "Start the HTTP service.\n\n\
        Pending schema upgrades run first unless schema.run_on_startup is false; \
        /ready answers 503 until they finish.")]
    Run {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
    /// Upgrade stored documents once and print the result
    Migrate {
        #[command(flatten)]
        migrate_command: Box<MigrateCmd>,
    },
    /// Print the schema version spread of every registered collection
    Status {
        #[command(flatten)]
        status_command: Box<StatusCmd>,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct RunCmd {
    /// Path to YAML configuration file
    ///
    /// Values given on the command line or through the environment override the file.
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub database_args: DatabaseCliArgs,

    #[clap(flatten)]
    pub server_args: ServerCliArgs,

    #[clap(flatten)]
    pub upgrade_args: UpgradeCliArgs,

    /// Skip the upgrade run at start-up.
    #[arg(env = "STOREFRONT_SKIP_STARTUP_UPGRADE", long, default_value_t = false)]
    pub skip_startup_upgrade: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct MigrateCmd {
    /// Path to YAML configuration file
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub database_args: DatabaseCliArgs,

    #[clap(flatten)]
    pub upgrade_args: UpgradeCliArgs,

    /// Only upgrade this collection.
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Exit with an error when the run recorded any error.
    #[arg(long, default_value_t = false)]
    pub fail_on_errors: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusCmd {
    /// Path to YAML configuration file
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[clap(flatten)]
    pub database_args: DatabaseCliArgs,
}
