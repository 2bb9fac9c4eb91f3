use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    time_entry::{ApprovalEntity, RejectionEntity, ReviewDecisionEntity, SaveWeekEntity},
    DaoError, TimeEntryEntity,
};
use timesheet_utils::{parse_calendar_date, TimesheetWeek};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::MemoryBackendError;

#[derive(Default)]
struct TimeEntryStore {
    entries: Vec<TimeEntryEntity>,
    /// Employee id to reporting manager id.
    managers: HashMap<Arc<str>, Arc<str>>,
    unavailable: bool,
    refused_reviews: HashSet<Uuid>,
}

impl TimeEntryStore {
    fn check_available(&self) -> Result<(), DaoError> {
        if self.unavailable {
            Err(MemoryBackendError::Unavailable.into())
        } else {
            Ok(())
        }
    }

    fn set_status(&mut self, id: Uuid, status: &str) -> Result<(), DaoError> {
        if self.refused_reviews.contains(&id) {
            return Err(MemoryBackendError::ReviewRefused(id).into());
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == Some(id))
            .ok_or(DaoError::EntityNotFound(id))?;
        entry.status = status.into();
        Ok(())
    }
}

pub struct TimeEntryDaoImpl {
    store: Mutex<TimeEntryStore>,
    batch_review: bool,
}

impl TimeEntryDaoImpl {
    pub fn new(batch_review: bool) -> Self {
        Self {
            store: Mutex::new(TimeEntryStore::default()),
            batch_review,
        }
    }

    pub async fn insert(&self, mut entry: TimeEntryEntity) -> TimeEntryEntity {
        entry.id.get_or_insert_with(Uuid::new_v4);
        self.store.lock().await.entries.push(entry.clone());
        entry
    }

    pub async fn assign_manager(&self, employee_id: &str, manager_id: &str) {
        self.store
            .lock()
            .await
            .managers
            .insert(employee_id.into(), manager_id.into());
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        self.store.lock().await.unavailable = unavailable;
    }

    /// Makes every later approve or reject of `id` fail.
    pub async fn refuse_review(&self, id: Uuid) {
        self.store.lock().await.refused_reviews.insert(id);
    }

    pub async fn entries(&self) -> Arc<[TimeEntryEntity]> {
        self.store.lock().await.entries.iter().cloned().collect()
    }
}

fn invalid_batch(message: String) -> DaoError {
    DaoError::InvalidBatch(message.into())
}

fn in_week(entry: &TimeEntryEntity, week: &TimesheetWeek) -> bool {
    parse_calendar_date(&entry.date)
        .map(|date| week.contains(date))
        .unwrap_or(false)
}

#[async_trait]
impl dao::TimeEntryDao for TimeEntryDaoImpl {
    async fn find_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError> {
        let store = self.store.lock().await;
        store.check_available()?;
        Ok(store
            .entries
            .iter()
            .filter(|entry| entry.employee_id.as_ref() == employee_id)
            .cloned()
            .collect())
    }

    async fn find_by_reporting_manager(
        &self,
        manager_id: &str,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError> {
        let store = self.store.lock().await;
        store.check_available()?;
        Ok(store
            .entries
            .iter()
            .filter(|entry| {
                store
                    .managers
                    .get(&entry.employee_id)
                    .is_some_and(|manager| manager.as_ref() == manager_id)
            })
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Arc<[TimeEntryEntity]>, DaoError> {
        let store = self.store.lock().await;
        store.check_available()?;
        Ok(store.entries.iter().cloned().collect())
    }

    async fn save_week(
        &self,
        batch: &SaveWeekEntity,
        process: &str,
    ) -> Result<Arc<[TimeEntryEntity]>, DaoError> {
        let mut store = self.store.lock().await;
        store.check_available()?;

        let week_start = parse_calendar_date(&batch.week_start)
            .map_err(|err| invalid_batch(format!("week start {}: {}", batch.week_start, err)))?;
        let week = TimesheetWeek::starting(week_start)
            .map_err(|err| invalid_batch(err.to_string()))?;
        for entry in batch.entries.iter() {
            if !in_week(entry, &week) {
                return Err(invalid_batch(format!(
                    "entry dated {} is outside of {}",
                    entry.date, week
                )));
            }
            if let Some(id) = entry.id {
                if !store.entries.iter().any(|stored| stored.id == Some(id)) {
                    return Err(DaoError::EntityNotFound(id));
                }
            }
        }

        // The batch replaces the submitted employees' entries of that week.
        let employees: HashSet<&str> = batch
            .entries
            .iter()
            .map(|entry| entry.employee_id.as_ref())
            .collect();
        let kept_ids: HashSet<Uuid> = batch.entries.iter().filter_map(|entry| entry.id).collect();
        store.entries.retain(|stored| {
            !(employees.contains(stored.employee_id.as_ref())
                && in_week(stored, &week)
                && !stored.id.is_some_and(|id| kept_ids.contains(&id)))
        });

        let mut saved = Vec::with_capacity(batch.entries.len());
        for entry in batch.entries.iter() {
            let mut entry = entry.clone();
            match entry.id {
                Some(id) => {
                    if let Some(stored) = store.entries.iter_mut().find(|s| s.id == Some(id)) {
                        *stored = entry.clone();
                    }
                }
                None => {
                    entry.id = Some(Uuid::new_v4());
                    store.entries.push(entry.clone());
                }
            }
            saved.push(entry);
        }
        debug!(
            "{} saved {} entries for week {}",
            process,
            saved.len(),
            week
        );
        Ok(saved.into())
    }

    async fn approve(
        &self,
        id: Uuid,
        _approval: &ApprovalEntity,
        process: &str,
    ) -> Result<(), DaoError> {
        let mut store = self.store.lock().await;
        store.check_available()?;
        debug!("{} approves {}", process, id);
        store.set_status(id, "APPROVED")
    }

    async fn reject(
        &self,
        id: Uuid,
        _rejection: &RejectionEntity,
        process: &str,
    ) -> Result<(), DaoError> {
        let mut store = self.store.lock().await;
        store.check_available()?;
        debug!("{} rejects {}", process, id);
        store.set_status(id, "REJECTED")
    }

    fn supports_batch_review(&self) -> bool {
        self.batch_review
    }

    async fn review_batch(
        &self,
        ids: &[Uuid],
        decision: &ReviewDecisionEntity,
        process: &str,
    ) -> Result<(), DaoError> {
        let mut store = self.store.lock().await;
        store.check_available()?;
        if let Some(id) = ids.iter().find(|id| store.refused_reviews.contains(*id)) {
            return Err(MemoryBackendError::ReviewRefused(*id).into());
        }
        if let Some(id) = ids
            .iter()
            .find(|id| !store.entries.iter().any(|entry| entry.id == Some(**id)))
        {
            return Err(DaoError::EntityNotFound(*id));
        }
        let status = match decision {
            ReviewDecisionEntity::Approve(_) => "APPROVED",
            ReviewDecisionEntity::Reject(_) => "REJECTED",
        };
        debug!("{} sets {} entries to {}", process, ids.len(), status);
        for id in ids {
            store.set_status(*id, status)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao::TimeEntryDao;

    fn entry(employee_id: &str, date: &str) -> TimeEntryEntity {
        TimeEntryEntity {
            id: None,
            employee_id: employee_id.into(),
            employee_name: format!("{} name", employee_id).into(),
            date: date.into(),
            category: "PROJECT".into(),
            leave_type: None,
            total_hours: 8.0,
            billable: true,
            project_id: Some("P-1".into()),
            project_name: None,
            task_id: Some("T-1".into()),
            task_description: None,
            onsite_offshore: None,
            billing_location: None,
            notes: None,
            status: "PENDING".into(),
        }
    }

    #[tokio::test]
    async fn test_save_week_upserts_and_replaces() {
        let dao = TimeEntryDaoImpl::new(true);
        let monday = dao.insert(entry("EMP-1", "2024-06-03")).await;
        let tuesday = dao.insert(entry("EMP-1", "2024-06-04")).await;
        let next_week = dao.insert(entry("EMP-1", "2024-06-10")).await;
        let other = dao.insert(entry("EMP-2", "2024-06-04")).await;

        let mut updated = monday.clone();
        updated.total_hours = 6.0;
        let batch = SaveWeekEntity {
            week_start: "2024-06-01".into(),
            entries: [updated, entry("EMP-1", "2024-06-05")].into(),
        };
        let saved = dao.save_week(&batch, "test").await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].id, monday.id);
        assert!(saved[1].id.is_some());

        let stored = dao.entries().await;
        assert_eq!(stored.len(), 4);
        assert!(stored.iter().all(|e| e.id != tuesday.id));
        assert!(stored.iter().any(|e| e.id == next_week.id));
        assert!(stored.iter().any(|e| e.id == other.id));
        assert!(stored
            .iter()
            .any(|e| e.id == monday.id && e.total_hours == 6.0));
    }

    #[tokio::test]
    async fn test_save_week_rejects_entries_outside_week() {
        let dao = TimeEntryDaoImpl::new(true);
        let batch = SaveWeekEntity {
            week_start: "2024-06-01".into(),
            entries: [entry("EMP-1", "2024-06-08")].into(),
        };
        assert!(matches!(
            dao.save_week(&batch, "test").await,
            Err(DaoError::InvalidBatch(_))
        ));

        let batch = SaveWeekEntity {
            week_start: "2024-06-03".into(),
            entries: [entry("EMP-1", "2024-06-03")].into(),
        };
        assert!(matches!(
            dao.save_week(&batch, "test").await,
            Err(DaoError::InvalidBatch(_))
        ));
        assert!(dao.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_review() {
        let dao = TimeEntryDaoImpl::new(false);
        let first = dao.insert(entry("EMP-1", "2024-06-03")).await;
        let second = dao.insert(entry("EMP-1", "2024-06-04")).await;
        let approval = ApprovalEntity {
            reviewer_id: "MGR-1".into(),
            comments: None,
        };
        dao.approve(first.id.unwrap(), &approval, "test").await.unwrap();
        dao.refuse_review(second.id.unwrap()).await;
        assert!(matches!(
            dao.approve(second.id.unwrap(), &approval, "test").await,
            Err(DaoError::BackendError(_))
        ));
        let missing = Uuid::new_v4();
        assert!(matches!(
            dao.approve(missing, &approval, "test").await,
            Err(DaoError::EntityNotFound(id)) if id == missing
        ));
        let stored = dao.entries().await;
        assert_eq!(stored[0].status.as_ref(), "APPROVED");
        assert_eq!(stored[1].status.as_ref(), "PENDING");
    }

    #[tokio::test]
    async fn test_review_batch_is_all_or_nothing() {
        let dao = TimeEntryDaoImpl::new(true);
        let first = dao.insert(entry("EMP-1", "2024-06-03")).await;
        let second = dao.insert(entry("EMP-1", "2024-06-04")).await;
        dao.refuse_review(second.id.unwrap()).await;
        let decision = ReviewDecisionEntity::Reject(RejectionEntity {
            reviewer_id: "MGR-1".into(),
            reason: "Wrong project".into(),
        });
        let ids = [first.id.unwrap(), second.id.unwrap()];
        assert!(dao.review_batch(&ids, &decision, "test").await.is_err());
        assert!(dao
            .entries()
            .await
            .iter()
            .all(|e| e.status.as_ref() == "PENDING"));

        dao.review_batch(&ids[..1], &decision, "test").await.unwrap();
        assert_eq!(dao.entries().await[0].status.as_ref(), "REJECTED");
    }

    #[tokio::test]
    async fn test_reporting_manager_scope() {
        let dao = TimeEntryDaoImpl::new(true);
        dao.insert(entry("EMP-1", "2024-06-03")).await;
        dao.insert(entry("EMP-2", "2024-06-03")).await;
        dao.assign_manager("EMP-1", "MGR-1").await;

        let entries = dao.find_by_reporting_manager("MGR-1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].employee_id.as_ref(), "EMP-1");
        assert_eq!(dao.find_all().await.unwrap().len(), 2);

        dao.set_unavailable(true).await;
        assert!(dao.find_all().await.is_err());
    }
}
