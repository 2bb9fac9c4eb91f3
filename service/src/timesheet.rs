use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::Date;
use uuid::Uuid;

use crate::permission::ViewerContext;
use crate::time_entry::TimeEntry;
use crate::week::{DataQualityNote, SkippedEntry, Week};
use crate::week_editor::WeekEditor;
use crate::ServiceError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TeamScope {
    /// Every employee, for HR and admins.
    Organization,
    ReportingManager(Arc<str>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeekListing {
    pub weeks: Arc<[Week]>,
    pub skipped: Arc<[SkippedEntry]>,
    pub notes: Arc<[DataQualityNote]>,
    /// Set when the backend could not be reached. `weeks` is empty then.
    pub backend_error: Option<Arc<str>>,
}

impl WeekListing {
    pub fn failed(error: impl ToString) -> Self {
        Self {
            weeks: Arc::new([]),
            skipped: Arc::new([]),
            notes: Arc::new([]),
            backend_error: Some(error.to_string().into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OpenedWeek {
    /// Generation of the request which produced this week.
    pub generation: u64,
    pub editor: WeekEditor,
    pub skipped: Arc<[SkippedEntry]>,
    pub backend_error: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SavedWeek {
    pub week_start: Date,
    pub entries: Arc<[TimeEntry]>,
    pub skipped: Arc<[SkippedEntry]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve { comments: Option<Arc<str>> },
    Reject { reason: Arc<str> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryReviewResult {
    pub entry_id: Uuid,
    /// Backend message if the decision could not be recorded.
    pub error: Option<Arc<str>>,
}

impl EntryReviewResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub decision: ReviewDecision,
    pub results: Arc<[EntryReviewResult]>,
    pub batched: bool,
}

impl ReviewOutcome {
    pub fn failed(&self) -> impl Iterator<Item = &EntryReviewResult> {
        self.results.iter().filter(|result| !result.is_ok())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &EntryReviewResult> {
        self.results.iter().filter(|result| result.is_ok())
    }

    /// True once anything changed on the backend, even on partial failure.
    pub fn needs_refresh(&self) -> bool {
        self.succeeded().next().is_some()
    }
}

#[automock]
#[async_trait]
pub trait TimesheetService {
    async fn list_personal_weeks(
        &self,
        employee_id: &str,
        join_date: Option<Date>,
        viewer: ViewerContext,
    ) -> Result<WeekListing, ServiceError>;

    async fn list_team_weeks(
        &self,
        scope: &TeamScope,
        viewer: ViewerContext,
    ) -> Result<WeekListing, ServiceError>;

    /// Loads a week into an editor. Fails with [`ServiceError::StaleRequest`]
    /// if another `open_week` was started before this one finished.
    async fn open_week(
        &self,
        employee_id: &str,
        employee_name: &str,
        week_start: Date,
        viewer: ViewerContext,
    ) -> Result<OpenedWeek, ServiceError>;

    async fn save_week(
        &self,
        editor: &WeekEditor,
        viewer: ViewerContext,
    ) -> Result<SavedWeek, ServiceError>;

    async fn approve_week(
        &self,
        week_entries: &[TimeEntry],
        comments: Option<Arc<str>>,
        viewer: ViewerContext,
    ) -> Result<ReviewOutcome, ServiceError>;

    async fn reject_week(
        &self,
        week_entries: &[TimeEntry],
        reason: Arc<str>,
        viewer: ViewerContext,
    ) -> Result<ReviewOutcome, ServiceError>;
}
