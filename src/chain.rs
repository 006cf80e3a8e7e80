//! The ordered routing table every requisition follows
use super::error::WorkflowError;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalStageSpec {
    pub role_name: String,
    pub department: String,
    pub grade_level: String,
}

impl ApprovalStageSpec {
    pub fn new(role_name: &str, department: &str, grade_level: &str) -> Self {
        Self {
            role_name: role_name.to_string(),
            department: department.to_string(),
            grade_level: grade_level.to_string(),
        }
    }
    pub fn matches(&self, department: &str, grade_level: &str) -> bool {
        self.department == department && self.grade_level == grade_level
    }
}

/// Immutable once built. Stage `i` must be approved before stage `i + 1` is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApprovalChain {
    stages: Vec<ApprovalStageSpec>,
}

impl ApprovalChain {
    /// Fails when two stages share a (department, grade level) pair
    pub fn new(stages: Vec<ApprovalStageSpec>) -> Result<Self, WorkflowError> {
        let mut seen = HashSet::new();
        if let Some(dup) = stages
            .iter()
            .find(|s| !seen.insert((s.department.clone(), s.grade_level.clone())))
        {
            return Err(WorkflowError::InvalidChain(format!(
                "{}/{} is bound to more than one stage",
                dup.department, dup.grade_level
            )));
        }
        Ok(Self { stages })
    }
    pub fn len(&self) -> usize {
        self.stages.len()
    }
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
    pub fn stage_at(&self, index: usize) -> Result<&ApprovalStageSpec, WorkflowError> {
        self.stages.get(index).ok_or(WorkflowError::IndexOutOfRange {
            index,
            len: self.stages.len(),
        })
    }
    pub fn position_of(&self, department: &str, grade_level: &str) -> Option<usize> {
        self.stages
            .iter()
            .position(|s| s.matches(department, grade_level))
    }
}
