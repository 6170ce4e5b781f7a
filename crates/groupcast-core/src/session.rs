//! Session facade handed to the presentation layer.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{DispatchStatus, GroupKey, SelectionSnapshot};
use crate::ports::{HostBridge, WebhookSender};
use crate::repositories::GroupRepository;
use crate::services::{DeletionService, DispatchService, DispatchTiming, SelectionService};

/// Everything the presentation layer needs to render one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub selection: SelectionSnapshot,
    pub dispatch_status: DispatchStatus,
    pub pending_deletion: Option<Vec<GroupKey>>,
}

/// One user session: the selection state machine plus the workflows built on top of it.
pub struct GroupSession<R: GroupRepository, W: WebhookSender + 'static> {
    selection: Arc<SelectionService<R>>,
    dispatch: DispatchService<R, W>,
    deletion: DeletionService<R>,
}

impl<R: GroupRepository, W: WebhookSender + 'static> GroupSession<R, W> {
    pub fn new(
        repo: Arc<R>,
        webhook: Option<Arc<W>>,
        host: Option<Arc<dyn HostBridge>>,
        timing: DispatchTiming,
    ) -> Self {
        let selection = Arc::new(SelectionService::new(repo));
        Self {
            dispatch: DispatchService::new(Arc::clone(&selection), webhook, host, timing),
            deletion: DeletionService::new(Arc::clone(&selection)),
            selection,
        }
    }

    pub fn selection(&self) -> &SelectionService<R> {
        &self.selection
    }

    pub fn dispatch(&self) -> &DispatchService<R, W> {
        &self.dispatch
    }

    pub fn deletion(&self) -> &DeletionService<R> {
        &self.deletion
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            selection: self.selection.snapshot(),
            dispatch_status: self.dispatch.status(),
            pending_deletion: self.deletion.pending(),
        }
    }
}
