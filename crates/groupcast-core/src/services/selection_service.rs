// ============================================================================
// Groupcast Core - Selection Service
// File: crates/groupcast-core/src/services/selection_service.rs
// ============================================================================
//! Selection state machine: owns the working list and keeps it in step with the store.
//!
//! Local state is updated optimistically before any remote call and is never rolled back
//! for selection changes. Remote failures are logged and reported as `WriteOutcome::Failed`.
//!
//! Single-record writes are serialized per group. A toggle that is overtaken by a newer
//! toggle of the same group while waiting for its turn skips its write, so the store ends up
//! with the last value the user chose.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

use crate::domain::{ExternalGroupId, GroupKey, Removal, SelectionSnapshot, SelectionState};
use crate::error::DomainError;
use crate::repositories::GroupRepository;

/// What happened to the remote side of a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Synced,
    /// A newer change to the same group took over before this write started.
    Superseded,
    Failed,
}

pub struct SelectionService<R: GroupRepository> {
    repo: Arc<R>,
    state: RwLock<SelectionState>,
    write_lanes: Mutex<HashMap<GroupKey, Arc<AsyncMutex<()>>>>,
}

impl<R: GroupRepository> SelectionService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            state: RwLock::new(SelectionState::new()),
            write_lanes: Mutex::new(HashMap::new()),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Fetch the full list. On failure the previous list stays in place.
    pub async fn load(&self) -> bool {
        debug!("Fetching groups from store");

        match self.repo.list().await {
            Ok(groups) => {
                let mut state = self.state.write();
                let dropped = state.replace_groups(groups);
                if dropped > 0 {
                    warn!("Store returned {} duplicate group rows, kept first occurrence", dropped);
                }
                info!("Loaded {} groups", state.groups().len());
                true
            }
            Err(e) => {
                error!("Error loading groups: {}", e);
                self.state.write().finish_loading();
                false
            }
        }
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.state.write().set_search_text(text);
    }

    /// Set one group's flag locally, then push it to the store.
    pub async fn toggle_selection(
        &self,
        id: GroupKey,
        selected: bool,
    ) -> Result<WriteOutcome, DomainError> {
        let revision = self
            .state
            .write()
            .set_selected(id, selected)
            .ok_or_else(|| {
                warn!("Toggle rejected: group {} is not in the list", id);
                DomainError::GroupNotFound(id)
            })?;

        let lane = self.write_lane(id);
        let outcome = {
            let _turn = lane.lock().await;
            let current = self.state.read().revision(id);
            if current != Some(revision) {
                debug!("Write for group {} superseded by a newer change", id);
                WriteOutcome::Superseded
            } else {
                match self.repo.update_selection(id, selected).await {
                    Ok(()) => WriteOutcome::Synced,
                    Err(e) => {
                        error!("Error updating group {}: {}", id, e);
                        WriteOutcome::Failed
                    }
                }
            }
        };
        self.release_lane(id, lane);

        Ok(outcome)
    }

    /// Flip select-all, apply it to every group and push one bulk update.
    ///
    /// With no groups loaded there is nothing to flip and no remote call is made.
    pub async fn toggle_select_all(&self) -> WriteOutcome {
        let value = {
            let mut state = self.state.write();
            if state.groups().is_empty() {
                debug!("Select-all ignored: no groups loaded");
                return WriteOutcome::Synced;
            }
            state.toggle_all()
        };
        info!("Setting every group selection to {}", value);
        self.bulk_write(value).await
    }

    pub fn enter_edit_mode(&self) {
        self.state.write().set_edit_mode(true);
    }

    /// Leave edit mode. Always clears every selection, locally and remotely.
    pub async fn exit_edit_mode(&self) -> WriteOutcome {
        {
            let mut state = self.state.write();
            state.set_edit_mode(false);
            state.clear_all();
        }
        self.bulk_write(false).await
    }

    /// Drop groups already deleted remotely.
    pub(crate) fn remove_groups(&self, ids: &[GroupKey]) -> Removal {
        self.state.write().remove(ids)
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.state.read().snapshot()
    }

    pub fn selected_ids(&self) -> Vec<GroupKey> {
        self.state.read().selected_ids()
    }

    pub fn selected_group_ids(&self) -> Vec<ExternalGroupId> {
        self.state.read().selected_group_ids()
    }

    pub fn select_all(&self) -> bool {
        self.state.read().select_all()
    }

    pub fn edit_mode(&self) -> bool {
        self.state.read().edit_mode()
    }

    pub fn contains(&self, id: GroupKey) -> bool {
        self.state.read().contains(id)
    }

    async fn bulk_write(&self, selected: bool) -> WriteOutcome {
        match self.repo.update_all_selections(selected).await {
            Ok(()) => WriteOutcome::Synced,
            Err(e) => {
                error!("Error updating all groups: {}", e);
                WriteOutcome::Failed
            }
        }
    }

    fn write_lane(&self, id: GroupKey) -> Arc<AsyncMutex<()>> {
        let mut lanes = self.write_lanes.lock();
        Arc::clone(lanes.entry(id).or_default())
    }

    fn release_lane(&self, id: GroupKey, lane: Arc<AsyncMutex<()>>) {
        let mut lanes = self.write_lanes.lock();
        // Only the map and this caller still hold it: nobody is queued.
        if Arc::strong_count(&lane) == 2 {
            lanes.remove(&id);
        }
    }
}
