//! Group repository trait (port)

use async_trait::async_trait;

use crate::domain::{Group, GroupKey};
use crate::error::DomainError;

/// Remote record store holding the groups.
///
/// Implementations report failures through `Result`; the selection service turns them into
/// logged, non-propagating outcomes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Group>, DomainError>;
    async fn update_selection(&self, id: GroupKey, selected: bool) -> Result<(), DomainError>;
    async fn update_all_selections(&self, selected: bool) -> Result<(), DomainError>;
    async fn delete_by_ids(&self, ids: &[GroupKey]) -> Result<(), DomainError>;
}
