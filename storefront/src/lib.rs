pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod schema;
pub mod server;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod tests;

// Re-export commonly used items
pub use error::{StorefrontError, StorefrontResult};
