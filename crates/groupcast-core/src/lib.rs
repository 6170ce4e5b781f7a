//! # Groupcast Core
//!
//! Domain types, ports and the selection/dispatch/deletion services that keep the local
//! group list consistent with the remote store.

pub mod domain;
pub mod error;
pub mod ports;
pub mod repositories;
pub mod services;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
pub use session::{GroupSession, SessionSnapshot};
