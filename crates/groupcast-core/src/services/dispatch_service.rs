// ============================================================================
// Groupcast Core - Dispatch Service
// File: crates/groupcast-core/src/services/dispatch_service.rs
// ============================================================================
//! Sends the external ids of the selected groups to the webhook.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{DispatchPayload, DispatchStatus, HostPassthrough};
use crate::ports::{HostBridge, WebhookSender};
use crate::repositories::GroupRepository;
use crate::services::SelectionService;

/// Reasons a send is refused before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Please select at least one group")]
    NothingSelected,

    #[error("Webhook URL is not configured")]
    WebhookNotConfigured,

    #[error("A dispatch is already in progress")]
    AlreadySending,
}

/// Delays applied after a successful send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTiming {
    /// Inside the host app: wait this long, then close the view.
    pub close_delay: Duration,
    /// Outside the host app: wait this long, then return to `Idle`.
    pub reset_delay: Duration,
}

impl Default for DispatchTiming {
    fn default() -> Self {
        Self {
            close_delay: Duration::from_secs(1),
            reset_delay: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Default)]
struct DispatchState {
    status: DispatchStatus,
    /// Bumped on every send that reaches the network, so a stale reset timer can tell it
    /// has been overtaken.
    epoch: u64,
}

pub struct DispatchService<R: GroupRepository, W: WebhookSender> {
    selection: Arc<SelectionService<R>>,
    webhook: Option<Arc<W>>,
    host: Option<Arc<dyn HostBridge>>,
    timing: DispatchTiming,
    state: Arc<Mutex<DispatchState>>,
}

impl<R: GroupRepository, W: WebhookSender + 'static> DispatchService<R, W> {
    pub fn new(
        selection: Arc<SelectionService<R>>,
        webhook: Option<Arc<W>>,
        host: Option<Arc<dyn HostBridge>>,
        timing: DispatchTiming,
    ) -> Self {
        if webhook.is_none() {
            warn!("No webhook configured, sending will be refused");
        }
        if host.is_some() {
            info!("Host context detected, view will close after a successful send");
        }

        Self {
            selection,
            webhook,
            host,
            timing,
            state: Arc::new(Mutex::new(DispatchState::default())),
        }
    }

    pub fn status(&self) -> DispatchStatus {
        self.state.lock().status
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    /// Send the selected groups.
    ///
    /// Refusals come back as `Err` and never touch the network. A delivery failure is not an
    /// error here: it yields `Ok(DispatchStatus::Failed)`.
    pub async fn send(&self) -> Result<DispatchStatus, DispatchError> {
        let (webhook, payload, epoch) = {
            let mut state = self.state.lock();
            if state.status == DispatchStatus::Sending {
                warn!("Send ignored: a dispatch is already in progress");
                return Err(DispatchError::AlreadySending);
            }

            let group_ids = self.selection.selected_group_ids();
            if group_ids.is_empty() {
                warn!("Send rejected: no groups selected");
                return Err(DispatchError::NothingSelected);
            }

            let Some(webhook) = self.webhook.clone() else {
                error!("Webhook URL not found in configuration");
                state.status = DispatchStatus::Failed;
                return Err(DispatchError::WebhookNotConfigured);
            };

            let host = self
                .host
                .as_ref()
                .map(|host| HostPassthrough::from_raw(host.context()));

            state.status = DispatchStatus::Sending;
            state.epoch += 1;
            (webhook, DispatchPayload::new(group_ids, host), state.epoch)
        };

        info!(
            "Sending {} group ids to webhook (host context: {})",
            payload.group_ids.len(),
            payload.host.is_some()
        );

        match webhook.deliver(&payload).await {
            Ok(()) => {
                info!("Webhook accepted dispatch");
                self.state.lock().status = DispatchStatus::Success;
                self.schedule_follow_up(epoch);
                Ok(DispatchStatus::Success)
            }
            Err(e) => {
                error!("Error sending message: {}", e);
                self.state.lock().status = DispatchStatus::Failed;
                Ok(DispatchStatus::Failed)
            }
        }
    }

    fn schedule_follow_up(&self, epoch: u64) {
        match &self.host {
            Some(host) => {
                let host = Arc::clone(host);
                let delay = self.timing.close_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    info!("Closing host view");
                    host.close();
                });
            }
            None => {
                let state = Arc::clone(&self.state);
                let delay = self.timing.reset_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let mut state = state.lock();
                    if state.epoch == epoch && state.status == DispatchStatus::Success {
                        state.status = DispatchStatus::Idle;
                        debug!("Dispatch status reset to idle");
                    }
                });
            }
        }
    }
}
