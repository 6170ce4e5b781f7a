//! # Groupcast Core - Domain Module
//!
//! Entities and pure state for the group selection workflow.

pub mod dispatch;
pub mod group;
pub mod selection;

pub use dispatch::{DispatchPayload, DispatchStatus, HostPassthrough};
pub use group::{ExternalGroupId, Group, GroupKey};
pub use selection::{Removal, SelectionSnapshot, SelectionState};
