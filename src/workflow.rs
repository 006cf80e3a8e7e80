//! Approval state machine
//!
//! | State                 | Approve                   | Reject   |
//! |-----------------------|---------------------------|----------|
//! | Pending(k), k + 1 < N | Pending(k + 1)            | Rejected |
//! | Pending(N - 1)        | Approved                  | Rejected |
//! | Approved / Rejected   | AlreadyFinalized          | AlreadyFinalized |
//!
//! Every successful decision appends exactly one history entry.
use super::chain::ApprovalChain;
use super::directory::UserIdentity;
use super::error::WorkflowError;
use super::requisition::{ApprovalStatus, Decision, HistoryEntry, Requisition, TimeStamp};
use super::resolver::can_act_at_stage;
use chrono::Utc;

/// Where a decision left the requisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced { to_stage: usize },
    Approved,
    Rejected,
}

/// Record the outcome of an empty chain: nothing to route through, so the
/// requisition is approved on submission.
pub fn approve_without_chain(requisition: &mut Requisition) {
    requisition.final_status = ApprovalStatus::Approved;
    requisition.finalized_at = Some(TimeStamp::new());
}

/// Apply `decision` by `user` to the requisition's current stage. On error the
/// record is untouched.
pub fn apply_decision(
    requisition: &mut Requisition,
    chain: &ApprovalChain,
    user: &UserIdentity,
    decision: Decision,
    comment: &str,
    at: TimeStamp<Utc>,
) -> Result<Transition, WorkflowError> {
    if requisition.is_finalized() {
        return Err(WorkflowError::AlreadyFinalized {
            request_id: requisition.request_id.clone(),
            status: requisition.final_status,
        });
    }

    let stage_index = requisition.current_approval_stage as usize;
    let stage = chain.stage_at(stage_index)?;
    if !can_act_at_stage(user, stage_index, chain) {
        return Err(WorkflowError::Unauthorized {
            request_id: requisition.request_id.clone(),
            staff_id: user.staff_id.clone(),
            stage_role: stage.role_name.clone(),
        });
    }

    requisition.approval_history.push(HistoryEntry {
        stage_index: requisition.current_approval_stage,
        stage_role: stage.role_name.clone(),
        approver_staff_id: user.staff_id.clone(),
        approver_name: user.name.clone(),
        decision,
        comment: comment.to_string(),
        timestamp: at.clone(),
    });
    if let Some(status) = requisition.stage_statuses.get_mut(stage_index) {
        *status = decision.into();
    }

    let transition = match decision {
        Decision::Reject => {
            requisition.final_status = ApprovalStatus::Rejected;
            requisition.finalized_at = Some(at);
            Transition::Rejected
        }
        Decision::Approve if stage_index + 1 < chain.len() => {
            requisition.current_approval_stage += 1;
            Transition::Advanced {
                to_stage: stage_index + 1,
            }
        }
        Decision::Approve => {
            requisition.final_status = ApprovalStatus::Approved;
            requisition.finalized_at = Some(at);
            Transition::Approved
        }
    };

    Ok(transition)
}
