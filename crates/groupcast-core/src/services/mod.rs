//! Domain services (business logic)

pub mod deletion_service;
pub mod dispatch_service;
pub mod selection_service;

pub use deletion_service::{DeletionError, DeletionOutcome, DeletionPhase, DeletionService};
pub use dispatch_service::{DispatchError, DispatchService, DispatchTiming};
pub use selection_service::{SelectionService, WriteOutcome};
