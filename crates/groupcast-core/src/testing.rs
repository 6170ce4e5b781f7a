//! In-memory fakes for service tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::domain::{DispatchPayload, Group, GroupKey};
use crate::error::DomainError;
use crate::ports::WebhookSender;
use crate::repositories::GroupRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Update(GroupKey, bool),
    UpdateAll(bool),
    Delete(Vec<GroupKey>),
}

/// Store backed by a vector, with switchable failures and an optional gate that holds
/// single-record updates until released.
#[derive(Default)]
pub struct FakeGroupRepository {
    rows: Mutex<Vec<Group>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_list: AtomicBool,
    fail_writes: AtomicBool,
    fail_delete: AtomicBool,
    update_gate: Option<Semaphore>,
}

impl FakeGroupRepository {
    pub fn with_rows(rows: Vec<Group>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn gated(rows: Vec<Group>) -> Self {
        Self {
            rows: Mutex::new(rows),
            update_gate: Some(Semaphore::new(0)),
            ..Default::default()
        }
    }

    pub fn release_updates(&self, count: usize) {
        if let Some(gate) = &self.update_gate {
            gate.add_permits(count);
        }
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != StoreCall::List)
            .collect()
    }

    pub fn rows(&self) -> Vec<Group> {
        self.rows.lock().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }

    fn outage() -> DomainError {
        DomainError::StoreError("store unavailable".to_string())
    }
}

#[async_trait]
impl GroupRepository for FakeGroupRepository {
    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        self.record(StoreCall::List);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        Ok(self.rows())
    }

    async fn update_selection(&self, id: GroupKey, selected: bool) -> Result<(), DomainError> {
        if let Some(gate) = &self.update_gate {
            gate.acquire()
                .await
                .map_err(|e| DomainError::StoreError(e.to_string()))?
                .forget();
        }
        self.record(StoreCall::Update(id, selected));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        if let Some(row) = self.rows.lock().iter_mut().find(|g| g.id == id) {
            row.selected = selected;
        }
        Ok(())
    }

    async fn update_all_selections(&self, selected: bool) -> Result<(), DomainError> {
        self.record(StoreCall::UpdateAll(selected));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        for row in self.rows.lock().iter_mut() {
            row.selected = selected;
        }
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[GroupKey]) -> Result<(), DomainError> {
        self.record(StoreCall::Delete(ids.to_vec()));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        self.rows.lock().retain(|g| !ids.contains(&g.id));
        Ok(())
    }
}

/// Webhook that records payloads; optionally holds every delivery until released.
#[derive(Default)]
pub struct FakeWebhook {
    payloads: Mutex<Vec<DispatchPayload>>,
    reject_with: Mutex<Option<u16>>,
    gate: Option<Semaphore>,
}

impl FakeWebhook {
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Default::default()
        }
    }

    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    pub fn reject_with(&self, status: Option<u16>) {
        *self.reject_with.lock() = status;
    }

    pub fn payloads(&self) -> Vec<DispatchPayload> {
        self.payloads.lock().clone()
    }
}

#[async_trait]
impl WebhookSender for FakeWebhook {
    async fn deliver(&self, payload: &DispatchPayload) -> Result<(), DomainError> {
        self.payloads.lock().push(payload.clone());
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| DomainError::WebhookError(e.to_string()))?
                .forget();
        }
        let rejection = *self.reject_with.lock();
        match rejection {
            Some(status) => Err(DomainError::WebhookRejected {
                status,
                reason: "rejected by fake".to_string(),
            }),
            None => Ok(()),
        }
    }
}

pub fn sample_groups() -> Vec<Group> {
    vec![
        Group::new(1, 101, "Alpha Team"),
        Group::new(2, 202, "Beta Squad"),
        Group::new(3, 303, "Gamma Crew"),
    ]
}
