use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::WorkflowError;
use crate::models::approval::{ApprovalRequest, ApprovalStatus, Decision};

/// Keyed store of in-flight approval requests.
///
/// Lives for the lifetime of the process and is unbounded: decided requests
/// stay in the map so a repeated click can be answered with the recorded
/// outcome. Only undeliverable requests are removed. Each entry is guarded by the
/// DashMap shard lock, so the `pending -> approved|rejected` transition in
/// [`ApprovalStore::decide`] happens at most once per request even when the
/// approver clicks twice in quick succession.
#[derive(Clone, Default)]
pub struct ApprovalStore {
    requests: Arc<DashMap<Uuid, ApprovalRequest>>,
}

impl ApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, request: ApprovalRequest) {
        self.requests.insert(request.id, request);
    }

    pub fn get(&self, id: &Uuid) -> Option<ApprovalRequest> {
        self.requests.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &Uuid) -> Option<ApprovalRequest> {
        self.requests.remove(id).map(|(_, request)| request)
    }

    /// Resolve a pending request. Only the recorded approver may decide, and
    /// only once.
    pub fn decide(
        &self,
        id: &Uuid,
        decided_by: &str,
        decision: Decision,
    ) -> Result<ApprovalRequest, WorkflowError> {
        let mut entry = self
            .requests
            .get_mut(id)
            .ok_or(WorkflowError::UnknownRequest(*id))?;

        if entry.approver_id != decided_by {
            return Err(WorkflowError::NotApprover {
                id: *id,
                user: decided_by.to_string(),
            });
        }
        if entry.status != ApprovalStatus::Pending {
            return Err(WorkflowError::AlreadyDecided {
                id: *id,
                status: entry.status,
            });
        }

        entry.status = decision.resolved_status();
        entry.decided_by = Some(decided_by.to_string());
        entry.decided_at = Some(chrono::Utc::now());
        Ok(entry.value().clone())
    }

    /// Requests still awaiting a decision, oldest first.
    pub fn pending(&self) -> Vec<ApprovalRequest> {
        let mut pending: Vec<ApprovalRequest> = self
            .requests
            .iter()
            .filter(|entry| entry.status == ApprovalStatus::Pending)
            .map(|entry| entry.value().clone())
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
