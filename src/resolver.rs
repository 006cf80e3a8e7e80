//! Who may act at a given stage
//!
//! This is the only place the superuser override is honoured.
use super::chain::{ApprovalChain, ApprovalStageSpec};
use super::directory::{UserDirectory, UserIdentity};

pub fn can_act_at_stage(user: &UserIdentity, stage_index: usize, chain: &ApprovalChain) -> bool {
    if user.is_superuser {
        return true;
    }
    chain
        .stage_at(stage_index)
        .map(|stage| stage.matches(&user.department, &user.grade_level))
        .unwrap_or(false)
}

/// Directory users whose role matches `stage`. The superuser override does not
/// count: a stage with no holders is vacant even if an admin could step in.
pub fn eligible_approvers(directory: &dyn UserDirectory, stage: &ApprovalStageSpec) -> Vec<UserIdentity> {
    directory.holders_of(&stage.department, &stage.grade_level)
}
