//! Read-only view of the staff directory
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub staff_id: String,
    pub name: String,
    pub department: String,
    pub grade_level: String,
    pub is_superuser: bool,
}

impl UserIdentity {
    pub fn new(staff_id: &str, name: &str, department: &str, grade_level: &str) -> Self {
        Self {
            staff_id: staff_id.to_string(),
            name: name.to_string(),
            department: department.to_string(),
            grade_level: grade_level.to_string(),
            is_superuser: false,
        }
    }
    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }
}

/// Lookup supplied by the profile subsystem. Results must reflect the
/// directory at call time, never a cached copy.
pub trait UserDirectory: Send + Sync {
    fn lookup(&self, staff_id: &str) -> Option<UserIdentity>;
    /// Everyone currently holding a (department, grade level) role
    fn holders_of(&self, department: &str, grade_level: &str) -> Vec<UserIdentity>;
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: HashMap<String, UserIdentity>,
}

impl InMemoryDirectory {
    pub fn new(users: impl IntoIterator<Item = UserIdentity>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.staff_id.clone(), u)).collect(),
        }
    }
}

impl UserDirectory for InMemoryDirectory {
    fn lookup(&self, staff_id: &str) -> Option<UserIdentity> {
        self.users.get(staff_id).cloned()
    }

    fn holders_of(&self, department: &str, grade_level: &str) -> Vec<UserIdentity> {
        let mut holders: Vec<_> = self
            .users
            .values()
            .filter(|u| u.department == department && u.grade_level == grade_level)
            .cloned()
            .collect();
        holders.sort_by(|a, b| a.staff_id.cmp(&b.staff_id));
        holders
    }
}
