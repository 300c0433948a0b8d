pub mod database;
pub mod service;
pub mod upgrade;

pub use database::{DatabaseArgs, DatabaseParams};
pub use service::ServerParams;
pub use upgrade::UpgradeParams;
