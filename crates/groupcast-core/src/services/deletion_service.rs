// ============================================================================
// Groupcast Core - Deletion Service
// File: crates/groupcast-core/src/services/deletion_service.rs
// ============================================================================
//! Two-phase deletion: stage, then confirm or cancel.
//!
//! Nothing is deleted without a confirmation. Local removal only happens after the store
//! accepted the delete, so a failed delete leaves the list exactly as it was.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::GroupKey;
use crate::repositories::GroupRepository;
use crate::services::SelectionService;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeletionError {
    #[error("Please select at least one group to delete")]
    NothingSelected,

    #[error("No deletion is awaiting confirmation")]
    NotPending,

    #[error("A deletion is already being committed")]
    CommitInProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeletionPhase {
    #[default]
    Idle,
    PendingConfirmation(Vec<GroupKey>),
    Committing(Vec<GroupKey>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted { removed: usize },
    Failed,
}

pub struct DeletionService<R: GroupRepository> {
    selection: Arc<SelectionService<R>>,
    phase: Mutex<DeletionPhase>,
}

impl<R: GroupRepository> DeletionService<R> {
    pub fn new(selection: Arc<SelectionService<R>>) -> Self {
        Self {
            selection,
            phase: Mutex::new(DeletionPhase::Idle),
        }
    }

    pub fn phase(&self) -> DeletionPhase {
        self.phase.lock().clone()
    }

    /// Ids waiting for confirmation, if any.
    pub fn pending(&self) -> Option<Vec<GroupKey>> {
        match &*self.phase.lock() {
            DeletionPhase::PendingConfirmation(ids) => Some(ids.clone()),
            _ => None,
        }
    }

    /// Stage `ids` for deletion. Duplicates are collapsed, order is kept.
    pub fn stage_for_deletion(
        &self,
        ids: impl IntoIterator<Item = GroupKey>,
    ) -> Result<usize, DeletionError> {
        let mut seen = HashSet::new();
        let ids: Vec<GroupKey> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            warn!("Delete rejected: no groups selected");
            return Err(DeletionError::NothingSelected);
        }

        let mut phase = self.phase.lock();
        if matches!(*phase, DeletionPhase::Committing(_)) {
            warn!("Delete rejected: a previous deletion is still being committed");
            return Err(DeletionError::CommitInProgress);
        }

        let count = ids.len();
        info!("Staged {} groups for deletion, awaiting confirmation", count);
        *phase = DeletionPhase::PendingConfirmation(ids);
        Ok(count)
    }

    /// Stage every currently selected group.
    pub fn stage_selected(&self) -> Result<usize, DeletionError> {
        self.stage_for_deletion(self.selection.selected_ids())
    }

    /// Drop a pending confirmation. Returns false when there was nothing to cancel.
    pub fn cancel(&self) -> bool {
        let mut phase = self.phase.lock();
        match *phase {
            DeletionPhase::PendingConfirmation(_) => {
                *phase = DeletionPhase::Idle;
                info!("Deletion cancelled");
                true
            }
            _ => false,
        }
    }

    /// Commit the staged deletion.
    pub async fn confirm(&self) -> Result<DeletionOutcome, DeletionError> {
        let ids = {
            let mut phase = self.phase.lock();
            match std::mem::take(&mut *phase) {
                DeletionPhase::PendingConfirmation(ids) => {
                    *phase = DeletionPhase::Committing(ids.clone());
                    ids
                }
                other => {
                    *phase = other;
                    return Err(DeletionError::NotPending);
                }
            }
        };

        let result = self.selection.repository().delete_by_ids(&ids).await;
        *self.phase.lock() = DeletionPhase::Idle;

        match result {
            Ok(()) => {
                let removal = self.selection.remove_groups(&ids);
                info!(
                    "Deleted {} groups, {} remaining",
                    removal.removed, removal.remaining
                );
                if removal.remaining == 0 && self.selection.edit_mode() {
                    self.selection.exit_edit_mode().await;
                }
                Ok(DeletionOutcome::Deleted {
                    removed: removal.removed,
                })
            }
            Err(e) => {
                error!("Failed to delete groups from database: {}", e);
                Ok(DeletionOutcome::Failed)
            }
        }
    }
}
