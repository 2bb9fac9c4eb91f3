use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

/// A time entry as the backend delivers it.
///
/// Date, category, leave type and status are kept as the raw strings the
/// backend sends; the service layer turns them into typed values.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeEntryEntity {
    pub id: Option<Uuid>,
    pub employee_id: Arc<str>,
    pub employee_name: Arc<str>,
    pub date: Arc<str>,
    pub category: Arc<str>,
    pub leave_type: Option<Arc<str>>,
    pub total_hours: f32,
    pub billable: bool,
    pub project_id: Option<Arc<str>>,
    pub project_name: Option<Arc<str>>,
    pub task_id: Option<Arc<str>>,
    pub task_description: Option<Arc<str>>,
    pub onsite_offshore: Option<Arc<str>>,
    pub billing_location: Option<Arc<str>>,
    pub notes: Option<Arc<str>>,
    pub status: Arc<str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaveWeekEntity {
    pub week_start: Arc<str>,
    pub entries: Arc<[TimeEntryEntity]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalEntity {
    pub reviewer_id: Arc<str>,
    pub comments: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectionEntity {
    pub reviewer_id: Arc<str>,
    pub reason: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewDecisionEntity {
    Approve(ApprovalEntity),
    Reject(RejectionEntity),
}

#[automock]
#[async_trait]
pub trait TimeEntryDao {
    async fn find_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError>;

    async fn find_by_reporting_manager(
        &self,
        manager_id: &str,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError>;

    async fn find_all(&self) -> Result<Arc<[TimeEntryEntity]>, DaoError>;

    /// Persists one week. Entries with an id are updates, the others inserts.
    async fn save_week(
        &self,
        batch: &SaveWeekEntity,
        process: &str,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError>;

    async fn approve(
        &self,
        id: Uuid,
        approval: &ApprovalEntity,
        process: &str,
    ) -> Result<(), DaoError>;

    async fn reject(
        &self,
        id: Uuid,
        rejection: &RejectionEntity,
        process: &str,
    ) -> Result<(), DaoError>;

    /// Whether [`TimeEntryDao::review_batch`] is available on this backend.
    fn supports_batch_review(&self) -> bool;

    /// Applies one decision to all ids in a single request.
    async fn review_batch(
        &self,
        ids: &[Uuid],
        decision: &ReviewDecisionEntity,
        process: &str,
    ) -> Result<(), DaoError>;
}
