//! Cost, withholding tax and budget arithmetic
//!
//! All amounts are integer minor units. Withholding tax is charged on labour
//! only and rounded half-up to the nearest minor unit.
use super::error::{FieldError, WorkflowError};
use std::collections::BTreeMap;

/// Derived financial fields of a requisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total_amount: i64,
    pub wht_amount: i64,
    pub net_amount_payable: i64,
    pub budget_balance: i64,
}

impl Totals {
    pub fn is_over_budget(&self) -> bool {
        self.budget_balance < 0
    }
}

/// The discrete withholding tax rates a requisition may select, in whole percent.
/// Every rate is at most 100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhtSchedule {
    rates: Vec<u8>,
}

impl WhtSchedule {
    pub fn new(mut rates: Vec<u8>) -> Result<Self, WorkflowError> {
        if let Some(&bad) = rates.iter().find(|&&r| r > 100) {
            return Err(WorkflowError::InvalidInput(FieldError::WhtRateOutOfRange(bad)));
        }
        rates.sort_unstable();
        rates.dedup();
        Ok(Self { rates })
    }
    pub fn contains(&self, percentage: u8) -> bool {
        self.rates.binary_search(&percentage).is_ok()
    }
    pub fn rates(&self) -> &[u8] {
        &self.rates
    }
}

impl Default for WhtSchedule {
    fn default() -> Self {
        Self {
            rates: vec![0, 5, 10, 15],
        }
    }
}

/// Expense line to budgeted amount, read-only to the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseBudgets {
    lines: BTreeMap<String, i64>,
}

impl ExpenseBudgets {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_line(mut self, line: &str, budgeted_amount: i64) -> Self {
        self.lines.insert(line.to_string(), budgeted_amount);
        self
    }
    pub fn budget_for(&self, line: &str) -> Option<i64> {
        self.lines.get(line).copied()
    }
    pub fn lines(&self) -> impl Iterator<Item = (&str, i64)> {
        self.lines.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, i64)> for ExpenseBudgets {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

/// Withholding tax on a labour cost, rounded half-up
pub fn wht_on_labor(labor_cost: i64, wht_percentage: u8) -> Result<i64, FieldError> {
    let scaled = i128::from(labor_cost) * i128::from(wht_percentage);
    let rounded = (scaled + 50).div_euclid(100);
    i64::try_from(rounded).map_err(|_| FieldError::Overflow("WHT amount"))
}

pub fn compute_totals(
    material_cost: i64,
    labor_cost: i64,
    wht_percentage: u8,
    budgeted_amount: i64,
    schedule: &WhtSchedule,
) -> Result<Totals, WorkflowError> {
    if material_cost < 0 {
        return Err(WorkflowError::InvalidInput(FieldError::Negative {
            field: "Material cost",
            value: material_cost,
        }));
    }
    if labor_cost < 0 {
        return Err(WorkflowError::InvalidInput(FieldError::Negative {
            field: "Labor cost",
            value: labor_cost,
        }));
    }
    if !schedule.contains(wht_percentage) {
        return Err(WorkflowError::InvalidInput(
            FieldError::UnsupportedWhtRate(wht_percentage),
        ));
    }

    let total_amount = material_cost
        .checked_add(labor_cost)
        .ok_or(WorkflowError::InvalidInput(FieldError::Overflow("Total amount")))?;
    let wht_amount = wht_on_labor(labor_cost, wht_percentage).map_err(WorkflowError::InvalidInput)?;
    // schedule rates are at most 100, so wht never exceeds labour
    let net_amount_payable = total_amount - wht_amount;
    let budget_balance = budgeted_amount
        .checked_sub(net_amount_payable)
        .ok_or(WorkflowError::InvalidInput(FieldError::Overflow("Budget balance")))?;

    Ok(Totals {
        total_amount,
        wht_amount,
        net_amount_payable,
        budget_balance,
    })
}
