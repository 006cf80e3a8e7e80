//! Requisition record, approval history and status types
use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

// ordered by instant, Utc itself is not Ord
impl Ord for TimeStamp<Utc> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for TimeStamp<Utc> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// Overall and per-stage status. Pending is the only non-terminal value.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApprovalStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Approved,
    #[n(2)]
    Rejected,
}

impl ApprovalStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
    pub fn label(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    #[n(0)]
    Approve,
    #[n(1)]
    Reject,
}

impl From<Decision> for ApprovalStatus {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    #[n(0)]
    Opex,
    #[n(1)]
    Capex,
}

impl RequestType {
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::Opex => "OPEX (Operating Expenditure)",
            RequestType::Capex => "CAPEX (Capital Expenditure)",
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    #[n(0)]
    pub staff_id: String,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub department: String,
}

// opaque to the workflow, only checked for presence
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorDetails {
    #[n(0)]
    pub name: String,
    #[n(1)]
    pub account_name: String,
    #[n(2)]
    pub account_no: String,
    #[n(3)]
    pub bank: String,
}

/// One decision recorded against a requisition
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    #[n(0)]
    pub stage_index: u32,
    #[n(1)]
    pub stage_role: String,
    #[n(2)]
    pub approver_staff_id: String,
    #[n(3)]
    pub approver_name: String,
    #[n(4)]
    pub decision: Decision,
    #[n(5)]
    pub comment: String,
    #[n(6)]
    pub timestamp: TimeStamp<Utc>,
}

// amounts are minor currency units (kobo)
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Requisition {
    #[n(0)]
    pub request_id: String,
    #[n(1)]
    pub sequence: u64, // assigned by the store, breaks submission-time ties
    #[n(2)]
    pub requester: Requester,
    #[n(3)]
    pub request_type: RequestType,
    #[n(4)]
    pub item_description: String,
    #[n(5)]
    pub justification: String,
    #[n(6)]
    pub expense_line: String,
    #[n(7)]
    pub budgeted_amount: i64, // frozen at submission
    #[n(8)]
    pub material_cost: i64,
    #[n(9)]
    pub labor_cost: i64,
    #[n(10)]
    pub total_amount: i64,
    #[n(11)]
    pub wht_percentage: u8,
    #[n(12)]
    pub wht_amount: i64,
    #[n(13)]
    pub net_amount_payable: i64,
    #[n(14)]
    pub budget_balance: i64,
    #[n(15)]
    pub vendor: VendorDetails,
    #[n(16)]
    pub document_ref: Option<String>,
    #[n(17)]
    pub submitted_at: TimeStamp<Utc>,
    #[n(18)]
    pub current_approval_stage: u32,
    #[n(19)]
    pub final_status: ApprovalStatus,
    #[n(20)]
    pub stage_statuses: Vec<ApprovalStatus>, // indexed by stage number
    #[n(21)]
    pub approval_history: Vec<HistoryEntry>,
    #[n(22)]
    pub finalized_at: Option<TimeStamp<Utc>>,
}

impl Requisition {
    pub fn is_finalized(&self) -> bool {
        self.final_status.is_final()
    }
    pub fn stage_status(&self, index: usize) -> Option<ApprovalStatus> {
        self.stage_statuses.get(index).copied()
    }
    pub fn is_over_budget(&self) -> bool {
        self.budget_balance < 0
    }
    pub(crate) fn encode(&self) -> Result<Vec<u8>, crate::error::WorkflowError> {
        minicbor::to_vec(self).map_err(|e| crate::error::WorkflowError::Codec(e.to_string()))
    }
    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, crate::error::WorkflowError> {
        minicbor::decode(bytes).map_err(|e| crate::error::WorkflowError::Codec(e.to_string()))
    }
}
