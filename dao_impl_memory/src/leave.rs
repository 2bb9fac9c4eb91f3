use std::sync::Arc;

use async_trait::async_trait;
use dao::{DaoError, LeaveEntity};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::MemoryBackendError;

#[derive(Default)]
struct LeaveStore {
    leaves: Vec<LeaveEntity>,
    unavailable: bool,
}

#[derive(Default)]
pub struct LeaveDaoImpl {
    store: Mutex<LeaveStore>,
}

impl LeaveDaoImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, mut leave: LeaveEntity) -> LeaveEntity {
        leave.id.get_or_insert_with(Uuid::new_v4);
        self.store.lock().await.leaves.push(leave.clone());
        leave
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        self.store.lock().await.unavailable = unavailable;
    }
}

#[async_trait]
impl dao::LeaveDao for LeaveDaoImpl {
    async fn find_approved_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Arc<[LeaveEntity]>, DaoError> {
        let store = self.store.lock().await;
        if store.unavailable {
            return Err(MemoryBackendError::Unavailable.into());
        }
        Ok(store
            .leaves
            .iter()
            .filter(|leave| {
                leave.employee_id.as_ref() == employee_id
                    && leave.status.eq_ignore_ascii_case("APPROVED")
            })
            .cloned()
            .collect())
    }
}
