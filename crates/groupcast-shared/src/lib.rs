//! # Groupcast Shared
//!
//! Configuration, telemetry and application errors shared by every groupcast crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;

pub use config::AppConfig;
pub use error::AppError;
