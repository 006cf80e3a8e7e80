//! Service layer API for requisition workflow operations
use super::chain::ApprovalChain;
use super::config::PortalConfig;
use super::directory::{UserDirectory, UserIdentity};
use super::draft::RequisitionDraft;
use super::error::WorkflowError;
use super::finance::{ExpenseBudgets, WhtSchedule};
use super::query::RequisitionQueries;
use super::requisition::{Decision, Requisition, TimeStamp};
use super::resolver::eligible_approvers;
use super::store::RequisitionStore;
use super::workflow::{self, Transition};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct RequisitionService {
    store: RequisitionStore,
    chain: ApprovalChain,
    budgets: ExpenseBudgets,
    wht_rates: WhtSchedule,
    directory: Arc<dyn UserDirectory>,
}

impl RequisitionService {
    pub fn new(
        store: RequisitionStore,
        chain: ApprovalChain,
        budgets: ExpenseBudgets,
        wht_rates: WhtSchedule,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            store,
            chain,
            budgets,
            wht_rates,
            directory,
        }
    }

    /// Open the database named in `config` and build the chain, budget table
    /// and rate set from it
    pub fn open(config: &PortalConfig, directory: Arc<dyn UserDirectory>) -> anyhow::Result<Self> {
        let chain = config.approval_chain()?;
        let wht_rates = config.wht_schedule()?;
        let db = Arc::new(sled::open(&config.database_path)?);
        let store = RequisitionStore::new(db)?;
        Ok(Self::new(
            store,
            chain,
            config.expense_budgets(),
            wht_rates,
            directory,
        ))
    }

    pub fn chain(&self) -> &ApprovalChain {
        &self.chain
    }

    pub fn queries(&self) -> RequisitionQueries<'_> {
        RequisitionQueries::new(&self.store, &self.chain)
    }

    /// Submit a new requisition for approval
    pub fn submit(
        &self,
        requester: &UserIdentity,
        draft: RequisitionDraft,
    ) -> Result<Requisition, WorkflowError> {
        let mut requisition =
            match draft.finalise(requester, &self.budgets, &self.wht_rates, self.chain.len()) {
                Ok(r) => r,
                Err(e) => {
                    warn!(staff_id = %requester.staff_id, error = %e, "requisition rejected at submission");
                    return Err(e);
                }
            };

        if self.chain.is_empty() {
            warn!(
                staff_id = %requester.staff_id,
                "approval chain is empty, requisition approved on submission"
            );
            workflow::approve_without_chain(&mut requisition);
        } else {
            // fail fast when nobody can ever pick up the first stage
            let first = self.chain.stage_at(0)?;
            if eligible_approvers(self.directory.as_ref(), first).is_empty() {
                error!(
                    role = %first.role_name,
                    department = %first.department,
                    grade_level = %first.grade_level,
                    "no eligible approver for the first approval stage"
                );
                return Err(WorkflowError::NoEligibleApprover {
                    role_name: first.role_name.clone(),
                    department: first.department.clone(),
                    grade_level: first.grade_level.clone(),
                });
            }
        }

        if requisition.is_over_budget() {
            warn!(
                expense_line = %requisition.expense_line,
                budget_balance = requisition.budget_balance,
                "requisition exceeds the budgeted amount for its expense line"
            );
        }

        let request_id = self.store.create(requisition)?;
        let requisition = self.store.get(&request_id)?;
        info!(
            request_id = %requisition.request_id,
            staff_id = %requisition.requester.staff_id,
            total_amount = requisition.total_amount,
            net_amount_payable = requisition.net_amount_payable,
            "requisition submitted"
        );

        Ok(requisition)
    }

    /// Approve or reject the requisition's current stage as `user`
    pub fn decide(
        &self,
        request_id: &str,
        user: &UserIdentity,
        decision: Decision,
        comment: &str,
    ) -> Result<Requisition, WorkflowError> {
        let mut transition = None;
        let result = self.store.update(request_id, |req| {
            transition = Some(workflow::apply_decision(
                req,
                &self.chain,
                user,
                decision,
                comment,
                TimeStamp::new(),
            )?);
            Ok(())
        });

        let requisition = match result {
            Ok(r) => r,
            Err(e) => {
                match &e {
                    WorkflowError::Unauthorized { .. } | WorkflowError::AlreadyFinalized { .. } => {
                        warn!(request_id, staff_id = %user.staff_id, error = %e, "decision refused")
                    }
                    _ => warn!(request_id, error = %e, "decision failed"),
                }
                return Err(e);
            }
        };

        match transition {
            Some(Transition::Advanced { to_stage }) => {
                info!(request_id, staff_id = %user.staff_id, stage = to_stage, "requisition advanced");
                self.warn_if_vacant(request_id, to_stage);
            }
            Some(Transition::Approved) => {
                info!(request_id, staff_id = %user.staff_id, "requisition fully approved")
            }
            Some(Transition::Rejected) => {
                info!(request_id, staff_id = %user.staff_id, "requisition rejected")
            }
            None => {}
        }

        Ok(requisition)
    }

    /// Like `decide`, resolving the acting user from the directory on every call
    pub fn decide_as(
        &self,
        request_id: &str,
        staff_id: &str,
        decision: Decision,
        comment: &str,
    ) -> Result<Requisition, WorkflowError> {
        let user = self
            .directory
            .lookup(staff_id)
            .ok_or_else(|| WorkflowError::UnknownUser(staff_id.to_string()))?;
        self.decide(request_id, &user, decision, comment)
    }

    pub fn get(&self, request_id: &str) -> Result<Requisition, WorkflowError> {
        self.store.get(request_id)
    }

    pub fn list_pending_for(&self, user: &UserIdentity) -> Result<Vec<Requisition>, WorkflowError> {
        self.store.list_pending_for_approver(user, &self.chain)
    }

    pub fn list_by_requester(&self, staff_id: &str) -> Result<Vec<Requisition>, WorkflowError> {
        self.store.list_for_requester(staff_id)
    }

    // a later stage nobody holds leaves the record pending until an admin steps in
    fn warn_if_vacant(&self, request_id: &str, stage_index: usize) {
        if let Ok(stage) = self.chain.stage_at(stage_index) {
            if eligible_approvers(self.directory.as_ref(), stage).is_empty() {
                warn!(
                    request_id,
                    role = %stage.role_name,
                    department = %stage.department,
                    grade_level = %stage.grade_level,
                    "next approval stage has no eligible approver"
                );
            }
        }
    }
}
