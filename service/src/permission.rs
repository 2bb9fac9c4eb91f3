use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Employee,
    ReportingManager,
    Hr,
    Admin,
}

impl Role {
    pub fn can_review(&self) -> bool {
        !matches!(self, Role::Employee)
    }

    pub fn sees_organization(&self) -> bool {
        matches!(self, Role::Hr | Role::Admin)
    }
}

/// The signed in user on whose behalf an operation runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerContext {
    pub user_id: Arc<str>,
    pub display_name: Arc<str>,
    pub role: Role,
}

impl ViewerContext {
    pub fn is_employee(&self, employee_id: &str) -> bool {
        self.user_id.as_ref() == employee_id
    }
}
