//! Durable, addressable collection of requisitions
//!
//! Records live in their own sled tree keyed by request id. `update` is the
//! only mutation path: it runs the mutator on a decoded copy and publishes the
//! result with a compare-and-swap against the bytes it read, retrying when a
//! concurrent writer got there first. Distinct records never contend.
use super::chain::ApprovalChain;
use super::directory::UserIdentity;
use super::error::WorkflowError;
use super::requisition::Requisition;
use super::resolver::can_act_at_stage;
use super::utils;
use std::sync::Arc;
use tracing::debug;

const RECORDS_TREE: &str = "requisitions";

#[derive(Clone)]
pub struct RequisitionStore {
    instance: Arc<sled::Db>,
    records: sled::Tree,
}

impl RequisitionStore {
    pub fn new(instance: Arc<sled::Db>) -> Result<Self, WorkflowError> {
        let records = instance.open_tree(RECORDS_TREE)?;
        Ok(Self { instance, records })
    }

    /// Persist a new record. A blank id is replaced with a generated one; an
    /// explicit id that is already taken fails with `DuplicateId`.
    pub fn create(&self, mut requisition: Requisition) -> Result<String, WorkflowError> {
        if requisition.request_id.is_empty() {
            requisition.request_id =
                utils::new_request_id().map_err(|e| WorkflowError::Identifier(e.to_string()))?;
        }
        requisition.sequence = self.instance.generate_id()?;

        let bytes = requisition.encode()?;
        let id = requisition.request_id;
        match self
            .records
            .compare_and_swap(id.as_bytes(), None as Option<&[u8]>, Some(bytes))?
        {
            Ok(()) => Ok(id),
            Err(_) => Err(WorkflowError::DuplicateId(id)),
        }
    }

    pub fn get(&self, request_id: &str) -> Result<Requisition, WorkflowError> {
        let bytes = self
            .records
            .get(request_id.as_bytes())?
            .ok_or_else(|| WorkflowError::NotFound(request_id.to_string()))?;
        Requisition::decode(&bytes)
    }

    /// Read-modify-write a single record. If `mutator` fails nothing is
    /// written and its error is returned. The mutator may run more than once
    /// under contention, each time against the latest committed record.
    pub fn update<F>(&self, request_id: &str, mut mutator: F) -> Result<Requisition, WorkflowError>
    where
        F: FnMut(&mut Requisition) -> Result<(), WorkflowError>,
    {
        loop {
            let current = self
                .records
                .get(request_id.as_bytes())?
                .ok_or_else(|| WorkflowError::NotFound(request_id.to_string()))?;

            let mut next = Requisition::decode(&current)?;
            mutator(&mut next)?;
            let bytes = next.encode()?;

            match self
                .records
                .compare_and_swap(request_id.as_bytes(), Some(&current), Some(bytes))?
            {
                Ok(()) => return Ok(next),
                Err(_) => {
                    debug!(request_id, "requisition changed underneath update, retrying");
                }
            }
        }
    }

    /// Every record in store order
    pub fn list_all(&self) -> Result<Vec<Requisition>, WorkflowError> {
        let mut all = self
            .records
            .iter()
            .values()
            .map(|bytes| Requisition::decode(&bytes?))
            .collect::<Result<Vec<_>, _>>()?;
        all.sort_by_key(|r| r.sequence);
        Ok(all)
    }

    /// Non-finalized requisitions whose current stage `user` may act on.
    /// Superusers see every pending record.
    pub fn list_pending_for_approver(
        &self,
        user: &UserIdentity,
        chain: &ApprovalChain,
    ) -> Result<Vec<Requisition>, WorkflowError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|r| !r.is_finalized())
            .filter(|r| can_act_at_stage(user, r.current_approval_stage as usize, chain))
            .collect())
    }

    /// Requisitions raised by `staff_id`, oldest submission first
    pub fn list_for_requester(&self, staff_id: &str) -> Result<Vec<Requisition>, WorkflowError> {
        let mut mine: Vec<_> = self
            .list_all()?
            .into_iter()
            .filter(|r| r.requester.staff_id == staff_id)
            .collect();
        mine.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then(a.sequence.cmp(&b.sequence))
        });
        Ok(mine)
    }
}
