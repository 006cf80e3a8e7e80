//! Error taxonomy for the requisition workflow
use super::requisition::ApprovalStatus;

/// A single problem with a submitted field
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
    #[error("Total amount must be greater than zero")]
    ZeroTotal,
    #[error("Withholding tax rate {0}% is not one of the configured rates")]
    UnsupportedWhtRate(u8),
    #[error("Withholding tax rate {0}% is above 100%")]
    WhtRateOutOfRange(u8),
    #[error("Expense line '{0}' has no budget entry")]
    UnknownExpenseLine(String),
    #[error("{0} overflowed the supported amount range")]
    Overflow(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid input: {0}")]
    InvalidInput(FieldError),
    #[error("Requisition failed validation: {}", join_fields(.0))]
    Validation(Vec<FieldError>),
    #[error("Requisition {0} was not found")]
    NotFound(String),
    #[error("Requisition id {0} is already in use")]
    DuplicateId(String),
    #[error("Requisition {request_id} is already {status:?}")]
    AlreadyFinalized {
        request_id: String,
        status: ApprovalStatus,
    },
    #[error("{staff_id} may not act as {stage_role} on requisition {request_id}")]
    Unauthorized {
        request_id: String,
        staff_id: String,
        stage_role: String,
    },
    #[error("Nobody holds {department}/{grade_level} to approve as {role_name}")]
    NoEligibleApprover {
        role_name: String,
        department: String,
        grade_level: String,
    },
    #[error("Stage {index} is out of range for a chain of {len} stages")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid approval chain: {0}")]
    InvalidChain(String),
    #[error("No user with staff id {0} in the directory")]
    UnknownUser(String),
    #[error("Failed to generate a requisition id: {0}")]
    Identifier(String),
    #[error("Failed to encode or decode a requisition: {0}")]
    Codec(String),
    #[error(transparent)]
    Storage(#[from] sled::Error),
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl WorkflowError {
    /// Field problems carried by a validation failure, empty for every other kind
    pub fn fields(&self) -> &[FieldError] {
        match self {
            WorkflowError::Validation(fields) => fields,
            WorkflowError::InvalidInput(field) => std::slice::from_ref(field),
            _ => &[],
        }
    }
}
