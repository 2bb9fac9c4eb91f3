use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaveEntity {
    pub id: Option<Uuid>,
    pub employee_id: Arc<str>,
    pub leave_type: Arc<str>,
    pub start_date: Arc<str>,
    pub end_date: Arc<str>,
    pub status: Arc<str>,
}

#[automock]
#[async_trait]
pub trait LeaveDao {
    async fn find_approved_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Arc<[LeaveEntity]>, DaoError>;
}
