use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dao::{
    time_entry::{ApprovalEntity, RejectionEntity, ReviewDecisionEntity, SaveWeekEntity},
    LeaveDao, TimeEntryDao,
};
use service::{
    clock::ClockService,
    config::ConfigService,
    leave::ApprovedLeave,
    permission::ViewerContext,
    time_entry::{EntryStatus, TimeEntry},
    timesheet::{
        EntryReviewResult, OpenedWeek, ReviewDecision, ReviewOutcome, SavedWeek, TeamScope,
        TimesheetService, WeekListing,
    },
    week::{AggregationOptions, SkippedEntry},
    week_editor::{EditorMode, WeekEditor, WeekEditorParams},
    ServiceError, ValidationFailureItem,
};
use time::Date;
use timesheet_utils::TimesheetWeek;
use tokio::join;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::gen_service_impl;
use crate::week_aggregator::aggregate_weeks;

const TIMESHEET_SERVICE_PROCESS: &str = "timesheet-service";

gen_service_impl! {
    struct TimesheetServiceImpl: TimesheetService = TimesheetServiceDeps {
        TimeEntryDao: TimeEntryDao = time_entry_dao,
        LeaveDao: LeaveDao = leave_dao,
        ClockService: ClockService = clock_service,
        ConfigService: ConfigService = config_service,
    }
    state {
        open_generation: AtomicU64,
    }
}

impl<Deps: TimesheetServiceDeps> TimesheetServiceImpl<Deps> {
    fn listing(
        &self,
        records: &[dao::TimeEntryEntity],
        reference_start: Option<Date>,
        partition_by_employee: bool,
    ) -> WeekListing {
        let aggregation = aggregate_weeks(
            records,
            &AggregationOptions {
                reference_start,
                today: self.clock_service.date_now(),
                partition_by_employee,
            },
        );
        WeekListing {
            weeks: aggregation.weeks,
            skipped: aggregation.skipped,
            notes: aggregation.notes,
            backend_error: None,
        }
    }

    async fn review(
        &self,
        week_entries: &[TimeEntry],
        decision: ReviewDecision,
        viewer: &ViewerContext,
    ) -> Result<ReviewOutcome, ServiceError> {
        if !viewer.role.can_review()
            || week_entries
                .iter()
                .any(|entry| viewer.is_employee(&entry.employee_id))
        {
            return Err(ServiceError::Forbidden);
        }
        let ids: Vec<Uuid> = week_entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Pending)
            .filter_map(|entry| entry.id)
            .collect();
        if ids.is_empty() {
            return Err(ServiceError::validation(ValidationFailureItem::MissingValue(
                "pending entries".into(),
            )));
        }

        let entity = match &decision {
            ReviewDecision::Approve { comments } => ReviewDecisionEntity::Approve(ApprovalEntity {
                reviewer_id: viewer.user_id.clone(),
                comments: comments.clone(),
            }),
            ReviewDecision::Reject { reason } => ReviewDecisionEntity::Reject(RejectionEntity {
                reviewer_id: viewer.user_id.clone(),
                reason: reason.clone(),
            }),
        };

        let batched = self.time_entry_dao.supports_batch_review();
        let results: Vec<EntryReviewResult> = if batched {
            let error: Option<Arc<str>> = self
                .time_entry_dao
                .review_batch(&ids, &entity, TIMESHEET_SERVICE_PROCESS)
                .await
                .err()
                .map(|err| err.to_string().into());
            ids.iter()
                .map(|id| EntryReviewResult {
                    entry_id: *id,
                    error: error.clone(),
                })
                .collect()
        } else {
            let mut results = Vec::with_capacity(ids.len());
            for id in ids {
                let result = match &entity {
                    ReviewDecisionEntity::Approve(approval) => {
                        self.time_entry_dao
                            .approve(id, approval, TIMESHEET_SERVICE_PROCESS)
                            .await
                    }
                    ReviewDecisionEntity::Reject(rejection) => {
                        self.time_entry_dao
                            .reject(id, rejection, TIMESHEET_SERVICE_PROCESS)
                            .await
                    }
                };
                results.push(EntryReviewResult {
                    entry_id: id,
                    error: result.err().map(|err| err.to_string().into()),
                });
            }
            results
        };

        let outcome = ReviewOutcome {
            decision,
            results: results.into(),
            batched,
        };
        let failed = outcome.failed().count();
        if failed > 0 {
            warn!(
                "{} of {} review decisions by {} failed",
                failed,
                outcome.results.len(),
                viewer.user_id
            );
        } else {
            info!(
                "{} recorded {} review decisions",
                viewer.user_id,
                outcome.results.len()
            );
        }
        Ok(outcome)
    }
}

#[async_trait]
impl<Deps: TimesheetServiceDeps> TimesheetService for TimesheetServiceImpl<Deps> {
    #[instrument(skip(self))]
    async fn list_personal_weeks(
        &self,
        employee_id: &str,
        join_date: Option<Date>,
        viewer: ViewerContext,
    ) -> Result<WeekListing, ServiceError> {
        if !viewer.is_employee(employee_id) && !viewer.role.can_review() {
            return Err(ServiceError::Forbidden);
        }
        match self.time_entry_dao.find_by_employee(employee_id).await {
            Ok(records) => Ok(self.listing(&records, join_date, false)),
            Err(err) => {
                error!("Loading time entries of {} failed: {}", employee_id, err);
                Ok(WeekListing::failed(err))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_team_weeks(
        &self,
        scope: &TeamScope,
        viewer: ViewerContext,
    ) -> Result<WeekListing, ServiceError> {
        let records = match scope {
            TeamScope::Organization => {
                if !viewer.role.sees_organization() {
                    return Err(ServiceError::Forbidden);
                }
                self.time_entry_dao.find_all().await
            }
            TeamScope::ReportingManager(manager_id) => {
                if !viewer.role.sees_organization()
                    && !(viewer.role.can_review() && viewer.is_employee(manager_id))
                {
                    return Err(ServiceError::Forbidden);
                }
                self.time_entry_dao
                    .find_by_reporting_manager(manager_id)
                    .await
            }
        };
        match records {
            Ok(records) => Ok(self.listing(&records, None, true)),
            Err(err) => {
                error!("Loading team time entries for {:?} failed: {}", scope, err);
                Ok(WeekListing::failed(err))
            }
        }
    }

    #[instrument(skip(self))]
    async fn open_week(
        &self,
        employee_id: &str,
        employee_name: &str,
        week_start: Date,
        viewer: ViewerContext,
    ) -> Result<OpenedWeek, ServiceError> {
        let is_owner = viewer.is_employee(employee_id);
        if !is_owner && !viewer.role.can_review() {
            return Err(ServiceError::Forbidden);
        }
        let week = TimesheetWeek::starting(week_start)?;
        let generation = self.open_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let config = self.config_service.get_config().await?;

        let (records, leaves) = join!(
            self.time_entry_dao.find_by_employee(employee_id),
            self.leave_dao.find_approved_by_employee(employee_id),
        );

        let mut backend_error: Option<Arc<str>> = None;
        let (entries, skipped): (Arc<[TimeEntry]>, Arc<[SkippedEntry]>) = match records {
            Ok(records) => {
                let listing = self.listing(&records, None, false);
                let entries = listing
                    .weeks
                    .iter()
                    .find(|listed| listed.start == week.start())
                    .map(|listed| listed.entries.clone())
                    .unwrap_or_else(|| Arc::new([]));
                (entries, listing.skipped)
            }
            Err(err) => {
                error!("Loading week {} of {} failed: {}", week, employee_id, err);
                backend_error = Some(err.to_string().into());
                (Arc::new([]), Arc::new([]))
            }
        };
        let approved_leaves: Arc<[ApprovedLeave]> = match leaves {
            Ok(leaves) => leaves
                .iter()
                .filter_map(|leave| match ApprovedLeave::try_from(leave) {
                    Ok(leave) => Some(leave),
                    Err(reason) => {
                        warn!("Ignoring leave {:?}: {}", leave.id, reason);
                        None
                    }
                })
                .collect(),
            Err(err) => {
                error!("Loading leaves of {} failed: {}", employee_id, err);
                if backend_error.is_none() {
                    backend_error = Some(err.to_string().into());
                }
                Arc::new([])
            }
        };

        let mode = if !is_owner {
            EditorMode::Review
        } else if !entries.is_empty()
            && entries
                .iter()
                .all(|entry| entry.status == EntryStatus::Approved)
        {
            EditorMode::ReadOnly
        } else {
            EditorMode::Edit
        };

        let editor = WeekEditor::hydrate(WeekEditorParams {
            employee_id: employee_id.into(),
            employee_name: employee_name.into(),
            week_start: week.start(),
            entries,
            approved_leaves,
            mode,
            rules: (&config).into(),
        })?;

        if self.open_generation.load(Ordering::SeqCst) != generation {
            info!("Dropping week {} of {}, superseded", week, employee_id);
            return Err(ServiceError::StaleRequest(generation));
        }
        Ok(OpenedWeek {
            generation,
            editor,
            skipped,
            backend_error,
        })
    }

    #[instrument(skip(self, editor))]
    async fn save_week(
        &self,
        editor: &WeekEditor,
        viewer: ViewerContext,
    ) -> Result<SavedWeek, ServiceError> {
        if !viewer.is_employee(editor.employee_id()) {
            return Err(ServiceError::Forbidden);
        }
        let payload = editor.build_save_payload()?;
        let saved = self
            .time_entry_dao
            .save_week(&SaveWeekEntity::from(&payload), TIMESHEET_SERVICE_PROCESS)
            .await?;

        let mut entries = Vec::with_capacity(saved.len());
        let mut skipped = Vec::new();
        for (index, entity) in saved.iter().enumerate() {
            match TimeEntry::try_from(entity) {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    warn!("Backend returned an unreadable entry {}: {}", index, reason);
                    skipped.push(SkippedEntry {
                        index,
                        entry_id: entity.id,
                        employee_id: entity.employee_id.clone(),
                        reason,
                    });
                }
            }
        }
        info!(
            "Saved week {} of {} with {} entries",
            editor.week(),
            editor.employee_id(),
            payload.entries.len()
        );
        Ok(SavedWeek {
            week_start: payload.week_start,
            entries: entries.into(),
            skipped: skipped.into(),
        })
    }

    #[instrument(skip(self, week_entries))]
    async fn approve_week(
        &self,
        week_entries: &[TimeEntry],
        comments: Option<Arc<str>>,
        viewer: ViewerContext,
    ) -> Result<ReviewOutcome, ServiceError> {
        let comments = comments.filter(|comments| !comments.trim().is_empty());
        self.review(week_entries, ReviewDecision::Approve { comments }, &viewer)
            .await
    }

    #[instrument(skip(self, week_entries))]
    async fn reject_week(
        &self,
        week_entries: &[TimeEntry],
        reason: Arc<str>,
        viewer: ViewerContext,
    ) -> Result<ReviewOutcome, ServiceError> {
        if reason.trim().is_empty() {
            return Err(ServiceError::validation(ValidationFailureItem::MissingValue(
                "reason".into(),
            )));
        }
        self.review(week_entries, ReviewDecision::Reject { reason }, &viewer)
            .await
    }
}
