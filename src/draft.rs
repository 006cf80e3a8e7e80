//! Builder for requisitions before they are submitted
use super::directory::UserIdentity;
use super::error::{FieldError, WorkflowError};
use super::finance::{ExpenseBudgets, WhtSchedule, compute_totals, wht_on_labor};
use super::requisition::{
    ApprovalStatus, RequestType, Requester, Requisition, TimeStamp, VendorDetails,
};

/// Also used as the submission payload. Amounts are minor units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequisitionDraft {
    request_id: Option<String>,
    request_type: Option<RequestType>,
    item_description: String,
    justification: String,
    expense_line: Option<String>,
    material_cost: i64,
    labor_cost: i64,
    wht_percentage: u8,
    vendor: VendorDetails,
    document_ref: Option<String>,
}

impl RequisitionDraft {
    /// Construct a new builder object, this becomes the basis for a submission
    pub fn new() -> Self {
        Self::default()
    }
    /// Use a caller-chosen id instead of a generated one
    pub fn set_request_id(mut self, id: &str) -> Self {
        self.request_id = Some(id.to_string());
        self
    }
    pub fn set_request_type(mut self, request_type: RequestType) -> Self {
        self.request_type = Some(request_type);
        self
    }
    pub fn set_item_description(mut self, text: &str) -> Self {
        self.item_description = text.to_string();
        self
    }
    pub fn set_justification(mut self, text: &str) -> Self {
        self.justification = text.to_string();
        self
    }
    pub fn set_expense_line(mut self, line: &str) -> Self {
        self.expense_line = Some(line.to_string());
        self
    }
    pub fn set_material_cost(mut self, amount: i64) -> Self {
        self.material_cost = amount;
        self
    }
    pub fn set_labor_cost(mut self, amount: i64) -> Self {
        self.labor_cost = amount;
        self
    }
    pub fn set_wht_percentage(mut self, percentage: u8) -> Self {
        self.wht_percentage = percentage;
        self
    }
    pub fn set_vendor(mut self, name: &str, account_name: &str, account_no: &str, bank: &str) -> Self {
        self.vendor = VendorDetails {
            name: name.to_string(),
            account_name: account_name.to_string(),
            account_no: account_no.to_string(),
            bank: bank.to_string(),
        };
        self
    }
    pub fn set_document_ref(mut self, reference: &str) -> Self {
        self.document_ref = Some(reference.to_string());
        self
    }

    /// Every field problem, in form order. Empty means the draft can be submitted.
    pub fn validate(
        &self,
        requester: &UserIdentity,
        budgets: &ExpenseBudgets,
        schedule: &WhtSchedule,
    ) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let mut require = |value: &str, field: &'static str| {
            if value.trim().is_empty() {
                errors.push(FieldError::Missing(field));
            }
        };

        require(&requester.staff_id, "Requester staff id");
        require(&requester.name, "Requester name");
        require(&requester.department, "Requester department");
        require(&self.item_description, "Item description");
        require(&self.justification, "Justification");
        require(&self.vendor.name, "Vendor name");
        require(&self.vendor.account_name, "Vendor account name");
        require(&self.vendor.account_no, "Vendor account number");
        require(&self.vendor.bank, "Vendor bank");

        if self.request_type.is_none() {
            errors.push(FieldError::Missing("Request type"));
        }
        match self.expense_line.as_deref() {
            None | Some("") => errors.push(FieldError::Missing("Expense line")),
            Some(line) if budgets.budget_for(line).is_none() => {
                errors.push(FieldError::UnknownExpenseLine(line.to_string()))
            }
            Some(_) => {}
        }
        if self.material_cost < 0 {
            errors.push(FieldError::Negative {
                field: "Material cost",
                value: self.material_cost,
            });
        }
        if self.labor_cost < 0 {
            errors.push(FieldError::Negative {
                field: "Labor cost",
                value: self.labor_cost,
            });
        }
        // None when a cost is negative, Some(None) on overflow
        let total = (self.material_cost >= 0 && self.labor_cost >= 0)
            .then(|| self.material_cost.checked_add(self.labor_cost));
        match total {
            Some(None) => errors.push(FieldError::Overflow("Total amount")),
            Some(Some(0)) => errors.push(FieldError::ZeroTotal),
            _ => {}
        }
        if !schedule.contains(self.wht_percentage) {
            errors.push(FieldError::UnsupportedWhtRate(self.wht_percentage));
        }
        let budget = self
            .expense_line
            .as_deref()
            .and_then(|l| budgets.budget_for(l))
            .filter(|_| schedule.contains(self.wht_percentage));
        if let (Some(Some(total)), Some(budget)) = (total, budget) {
            let net = wht_on_labor(self.labor_cost, self.wht_percentage)
                .ok()
                .and_then(|wht| total.checked_sub(wht));
            if net.and_then(|net| budget.checked_sub(net)).is_none() {
                errors.push(FieldError::Overflow("Budget balance"));
            }
        }

        errors
    }

    /// Validates and derives the financial fields. The returned record is
    /// Pending at stage 0 with one Pending status per stage; the id is empty
    /// unless one was set explicitly.
    pub fn finalise(
        self,
        requester: &UserIdentity,
        budgets: &ExpenseBudgets,
        schedule: &WhtSchedule,
        stage_count: usize,
    ) -> Result<Requisition, WorkflowError> {
        let errors = self.validate(requester, budgets, schedule);
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        // validate() guarantees both are present
        let (Some(request_type), Some(expense_line)) = (self.request_type, self.expense_line) else {
            return Err(WorkflowError::Validation(vec![FieldError::Missing(
                "Request type",
            )]));
        };
        let budgeted_amount = budgets
            .budget_for(&expense_line)
            .ok_or_else(|| {
                WorkflowError::Validation(vec![FieldError::UnknownExpenseLine(expense_line.clone())])
            })?;
        let totals = compute_totals(
            self.material_cost,
            self.labor_cost,
            self.wht_percentage,
            budgeted_amount,
            schedule,
        )
        .map_err(|e| WorkflowError::Validation(e.fields().to_vec()))?;

        Ok(Requisition {
            request_id: self.request_id.unwrap_or_default(),
            sequence: 0,
            requester: Requester {
                staff_id: requester.staff_id.clone(),
                name: requester.name.clone(),
                department: requester.department.clone(),
            },
            request_type,
            item_description: self.item_description,
            justification: self.justification,
            expense_line,
            budgeted_amount,
            material_cost: self.material_cost,
            labor_cost: self.labor_cost,
            total_amount: totals.total_amount,
            wht_percentage: self.wht_percentage,
            wht_amount: totals.wht_amount,
            net_amount_payable: totals.net_amount_payable,
            budget_balance: totals.budget_balance,
            vendor: self.vendor,
            document_ref: self.document_ref,
            submitted_at: TimeStamp::new(),
            current_approval_stage: 0,
            final_status: ApprovalStatus::Pending,
            stage_statuses: vec![ApprovalStatus::Pending; stage_count],
            approval_history: Vec::new(),
            finalized_at: None,
        })
    }
}
