//! Read-only projections for dashboards, notifications and reports
use super::chain::ApprovalChain;
use super::directory::UserIdentity;
use super::error::WorkflowError;
use super::requisition::{ApprovalStatus, HistoryEntry, RequestType, Requisition};
use super::store::RequisitionStore;

/// What a requisition is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageDisplay {
    Awaiting {
        role_name: String,
        department: String,
        grade_level: String,
    },
    Finalized(ApprovalStatus),
}

impl StageDisplay {
    pub fn label(&self) -> String {
        match self {
            StageDisplay::Awaiting { role_name, .. } => role_name.clone(),
            StageDisplay::Finalized(_) => "Finalized".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequisitionSummary {
    pub request_id: String,
    pub request_type: RequestType,
    pub item_description: String,
    pub total_amount: i64,
    pub final_status: ApprovalStatus,
    pub current_stage: StageDisplay,
}

pub struct RequisitionQueries<'a> {
    store: &'a RequisitionStore,
    chain: &'a ApprovalChain,
}

impl<'a> RequisitionQueries<'a> {
    pub fn new(store: &'a RequisitionStore, chain: &'a ApprovalChain) -> Self {
        Self { store, chain }
    }

    pub fn pending_action_count(&self, user: &UserIdentity) -> Result<usize, WorkflowError> {
        Ok(self.store.list_pending_for_approver(user, self.chain)?.len())
    }

    pub fn history(&self, request_id: &str) -> Result<Vec<HistoryEntry>, WorkflowError> {
        Ok(self.store.get(request_id)?.approval_history)
    }

    pub fn current_stage(&self, request_id: &str) -> Result<StageDisplay, WorkflowError> {
        let requisition = self.store.get(request_id)?;
        self.stage_display(&requisition)
    }

    pub fn summaries_for_requester(
        &self,
        staff_id: &str,
    ) -> Result<Vec<RequisitionSummary>, WorkflowError> {
        self.store
            .list_for_requester(staff_id)?
            .into_iter()
            .map(|r| {
                Ok(RequisitionSummary {
                    current_stage: self.stage_display(&r)?,
                    request_id: r.request_id,
                    request_type: r.request_type,
                    item_description: r.item_description,
                    total_amount: r.total_amount,
                    final_status: r.final_status,
                })
            })
            .collect()
    }

    fn stage_display(&self, requisition: &Requisition) -> Result<StageDisplay, WorkflowError> {
        if requisition.is_finalized() {
            return Ok(StageDisplay::Finalized(requisition.final_status));
        }
        let stage = self
            .chain
            .stage_at(requisition.current_approval_stage as usize)?;
        Ok(StageDisplay::Awaiting {
            role_name: stage.role_name.clone(),
            department: stage.department.clone(),
            grade_level: stage.grade_level.clone(),
        })
    }
}

/// Audit lines in decision order, for report and PDF renderers
pub fn format_history(requisition: &Requisition) -> Vec<String> {
    requisition
        .approval_history
        .iter()
        .map(|entry| {
            let comment = if entry.comment.trim().is_empty() {
                "No comment."
            } else {
                entry.comment.as_str()
            };
            format!(
                "{} by {} on {}: {}. Comment: {}",
                entry.stage_role,
                entry.approver_name,
                entry.timestamp.to_datetime_utc().format("%Y-%m-%d %H:%M:%S"),
                ApprovalStatus::from(entry.decision).label(),
                comment
            )
        })
        .collect()
}
