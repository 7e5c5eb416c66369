//! Press Core - shared error, logging, configuration and types
//!
//! Every other crate in the workspace builds on the definitions in here

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
