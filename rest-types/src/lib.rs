//! JSON shapes exchanged with the timesheet backend.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryTO {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub employee_id: Arc<str>,
    #[serde(default)]
    pub employee_name: Arc<str>,
    /// Calendar date, optionally with a time suffix which is ignored.
    pub date: Arc<str>,
    pub category: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<Arc<str>>,
    pub total_hours: f32,
    #[serde(default)]
    pub billable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onsite_offshore: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_location: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Arc<str>>,
    pub status: Arc<str>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedLeaveTO {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub employee_id: Arc<str>,
    pub leave_type: Arc<str>,
    pub start_date: Arc<str>,
    pub end_date: Arc<str>,
    pub status: Arc<str>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveWeekTO {
    pub week_start: Arc<str>,
    pub entries: Arc<[TimeEntryTO]>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApproveEntryTO {
    pub reviewer_id: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Arc<str>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RejectEntryTO {
    pub reviewer_id: Arc<str>,
    pub reason: Arc<str>,
}

/// Body of the batch review call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "decision")]
pub enum ReviewBatchTO {
    Approve {
        ids: Arc<[Uuid]>,
        #[serde(flatten)]
        approval: ApproveEntryTO,
    },
    Reject {
        ids: Arc<[Uuid]>,
        #[serde(flatten)]
        rejection: RejectEntryTO,
    },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeekStatusTO {
    Approved,
    Pending,
    Rejected,
    #[serde(rename = "Not Filled")]
    NotFilled,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryHoursTO {
    pub billable_hrs: f32,
    pub non_billable_hrs: f32,
    pub time_off_hrs: f32,
    pub trutime_hrs: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWeekTO {
    pub employee_id: Arc<str>,
    pub employee_name: Arc<str>,
    pub status: WeekStatusTO,
    #[serde(flatten)]
    pub hours: CategoryHoursTO,
    pub entries: Arc<[TimeEntryTO]>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekTO {
    pub start: Date,
    pub end: Date,
    pub start_display: Arc<str>,
    pub end_display: Arc<str>,
    pub status: WeekStatusTO,
    #[serde(flatten)]
    pub hours: CategoryHoursTO,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<Arc<[EmployeeWeekTO]>>,
    pub entries: Arc<[TimeEntryTO]>,
}

#[cfg(feature = "service-impl")]
mod conversions {
    use dao::{
        time_entry::{ApprovalEntity, RejectionEntity, ReviewDecisionEntity, SaveWeekEntity},
        LeaveEntity, TimeEntryEntity,
    };
    use service::time_entry::TimeEntry;
    use service::week::{CategoryHours, EmployeeWeek, Week, WeekBreakdown, WeekStatus};

    use super::*;

    impl From<&TimeEntryEntity> for TimeEntryTO {
        fn from(entity: &TimeEntryEntity) -> Self {
            Self {
                id: entity.id,
                employee_id: entity.employee_id.clone(),
                employee_name: entity.employee_name.clone(),
                date: entity.date.clone(),
                category: entity.category.clone(),
                leave_type: entity.leave_type.clone(),
                total_hours: entity.total_hours,
                billable: entity.billable,
                project_id: entity.project_id.clone(),
                project_name: entity.project_name.clone(),
                task_id: entity.task_id.clone(),
                task_description: entity.task_description.clone(),
                onsite_offshore: entity.onsite_offshore.clone(),
                billing_location: entity.billing_location.clone(),
                notes: entity.notes.clone(),
                status: entity.status.clone(),
            }
        }
    }
    impl From<&TimeEntryTO> for TimeEntryEntity {
        fn from(entry: &TimeEntryTO) -> Self {
            Self {
                id: entry.id,
                employee_id: entry.employee_id.clone(),
                employee_name: entry.employee_name.clone(),
                date: entry.date.clone(),
                category: entry.category.clone(),
                leave_type: entry.leave_type.clone(),
                total_hours: entry.total_hours,
                billable: entry.billable,
                project_id: entry.project_id.clone(),
                project_name: entry.project_name.clone(),
                task_id: entry.task_id.clone(),
                task_description: entry.task_description.clone(),
                onsite_offshore: entry.onsite_offshore.clone(),
                billing_location: entry.billing_location.clone(),
                notes: entry.notes.clone(),
                status: entry.status.clone(),
            }
        }
    }
    impl From<&TimeEntry> for TimeEntryTO {
        fn from(entry: &TimeEntry) -> Self {
            (&TimeEntryEntity::from(entry)).into()
        }
    }

    impl From<&ApprovedLeaveTO> for LeaveEntity {
        fn from(leave: &ApprovedLeaveTO) -> Self {
            Self {
                id: leave.id,
                employee_id: leave.employee_id.clone(),
                leave_type: leave.leave_type.clone(),
                start_date: leave.start_date.clone(),
                end_date: leave.end_date.clone(),
                status: leave.status.clone(),
            }
        }
    }

    impl From<&SaveWeekEntity> for SaveWeekTO {
        fn from(batch: &SaveWeekEntity) -> Self {
            Self {
                week_start: batch.week_start.clone(),
                entries: batch.entries.iter().map(TimeEntryTO::from).collect(),
            }
        }
    }

    impl From<&ApprovalEntity> for ApproveEntryTO {
        fn from(approval: &ApprovalEntity) -> Self {
            Self {
                reviewer_id: approval.reviewer_id.clone(),
                comments: approval.comments.clone(),
            }
        }
    }
    impl From<&RejectionEntity> for RejectEntryTO {
        fn from(rejection: &RejectionEntity) -> Self {
            Self {
                reviewer_id: rejection.reviewer_id.clone(),
                reason: rejection.reason.clone(),
            }
        }
    }

    impl ReviewBatchTO {
        pub fn new(ids: &[Uuid], decision: &ReviewDecisionEntity) -> Self {
            match decision {
                ReviewDecisionEntity::Approve(approval) => ReviewBatchTO::Approve {
                    ids: ids.into(),
                    approval: approval.into(),
                },
                ReviewDecisionEntity::Reject(rejection) => ReviewBatchTO::Reject {
                    ids: ids.into(),
                    rejection: rejection.into(),
                },
            }
        }
    }

    impl From<WeekStatus> for WeekStatusTO {
        fn from(status: WeekStatus) -> Self {
            match status {
                WeekStatus::Approved => WeekStatusTO::Approved,
                WeekStatus::Pending => WeekStatusTO::Pending,
                WeekStatus::Rejected => WeekStatusTO::Rejected,
                WeekStatus::NotFilled => WeekStatusTO::NotFilled,
            }
        }
    }

    impl From<&CategoryHours> for CategoryHoursTO {
        fn from(hours: &CategoryHours) -> Self {
            Self {
                billable_hrs: hours.billable_hrs,
                non_billable_hrs: hours.non_billable_hrs,
                time_off_hrs: hours.time_off_hrs,
                trutime_hrs: hours.trutime_hrs,
            }
        }
    }

    impl From<&EmployeeWeek> for EmployeeWeekTO {
        fn from(employee: &EmployeeWeek) -> Self {
            Self {
                employee_id: employee.employee_id.clone(),
                employee_name: employee.employee_name.clone(),
                status: employee.status.into(),
                hours: (&employee.hours).into(),
                entries: employee.entries.iter().map(TimeEntryTO::from).collect(),
            }
        }
    }

    impl From<&Week> for WeekTO {
        fn from(week: &Week) -> Self {
            Self {
                start: week.start,
                end: week.end,
                start_display: week.start_display.clone(),
                end_display: week.end_display.clone(),
                status: week.status.into(),
                hours: (&week.breakdown.hours()).into(),
                employees: match &week.breakdown {
                    WeekBreakdown::Flat(_) => None,
                    WeekBreakdown::PerEmployee(employees) => {
                        Some(employees.iter().map(EmployeeWeekTO::from).collect())
                    }
                },
                entries: week.entries.iter().map(TimeEntryTO::from).collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn entry() -> TimeEntryTO {
        TimeEntryTO {
            id: None,
            employee_id: "EMP-1".into(),
            employee_name: "Asha Rao".into(),
            date: "2024-06-03".into(),
            category: "LEAVE".into(),
            leave_type: Some("S".into()),
            total_hours: 8.0,
            billable: false,
            project_id: None,
            project_name: None,
            task_id: None,
            task_description: None,
            onsite_offshore: None,
            billing_location: None,
            notes: None,
            status: "PENDING".into(),
        }
    }

    #[test]
    fn test_save_week_shape() {
        let save = SaveWeekTO {
            week_start: "2024-06-01".into(),
            entries: [entry()].into(),
        };
        assert_eq!(
            serde_json::to_value(&save).unwrap(),
            json!({
                "weekStart": "2024-06-01",
                "entries": [{
                    "employeeId": "EMP-1",
                    "employeeName": "Asha Rao",
                    "date": "2024-06-03",
                    "category": "LEAVE",
                    "leaveType": "S",
                    "totalHours": 8.0,
                    "billable": false,
                    "status": "PENDING"
                }]
            })
        );
    }

    #[test]
    fn test_backend_entry_with_sparse_fields() {
        let parsed: TimeEntryTO = serde_json::from_value(json!({
            "id": "6b1f8e0a-3c2d-4e5f-8a9b-0c1d2e3f4a5b",
            "employeeId": "EMP-1",
            "date": "2024-06-03T00:00:00.000Z",
            "category": "PROJECT",
            "totalHours": 7.5,
            "projectId": "P-1",
            "status": "APPROVED"
        }))
        .unwrap();
        assert!(parsed.id.is_some());
        assert_eq!(parsed.employee_name.as_ref(), "");
        assert_eq!(parsed.project_id.as_deref(), Some("P-1"));
        assert!(!parsed.billable);
    }

    #[test]
    fn test_review_shapes() {
        let approve = ApproveEntryTO {
            reviewer_id: "MGR-1".into(),
            comments: None,
        };
        assert_eq!(
            serde_json::to_value(&approve).unwrap(),
            json!({ "reviewerId": "MGR-1" })
        );
        let batch = ReviewBatchTO::Reject {
            ids: Arc::from([Uuid::nil()]),
            rejection: RejectEntryTO {
                reviewer_id: "MGR-1".into(),
                reason: "Wrong task".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "decision": "reject",
                "ids": ["00000000-0000-0000-0000-000000000000"],
                "reviewerId": "MGR-1",
                "reason": "Wrong task"
            })
        );
    }

    #[test]
    fn test_week_shape() {
        let week = WeekTO {
            start: date!(2024 - 06 - 01),
            end: date!(2024 - 06 - 07),
            start_display: "Jun 01, 2024".into(),
            end_display: "Jun 07, 2024".into(),
            status: WeekStatusTO::NotFilled,
            hours: CategoryHoursTO::default(),
            employees: None,
            entries: Arc::new([]),
        };
        assert_eq!(
            serde_json::to_value(&week).unwrap(),
            json!({
                "start": "2024-06-01",
                "end": "2024-06-07",
                "startDisplay": "Jun 01, 2024",
                "endDisplay": "Jun 07, 2024",
                "status": "Not Filled",
                "billableHrs": 0.0,
                "nonBillableHrs": 0.0,
                "timeOffHrs": 0.0,
                "trutimeHrs": 0.0,
                "entries": []
            })
        );
    }

    #[cfg(feature = "service-impl")]
    #[test]
    fn test_week_from_service() {
        use service::time_entry::TimeEntry;
        use service::week::{CategoryHours, Week, WeekBreakdown, WeekStatus};

        let entity = dao::TimeEntryEntity::from(&entry());
        let time_entry = TimeEntry::try_from(&entity).unwrap();
        let week = Week {
            start: date!(2024 - 06 - 01),
            end: date!(2024 - 06 - 07),
            start_display: "Jun 01, 2024".into(),
            end_display: "Jun 07, 2024".into(),
            status: WeekStatus::Pending,
            breakdown: WeekBreakdown::Flat([&time_entry].into_iter().collect::<CategoryHours>()),
            entries: [time_entry].into(),
        };
        let to = WeekTO::from(&week);
        assert_eq!(to.status, WeekStatusTO::Pending);
        assert_eq!(to.hours.time_off_hrs, 8.0);
        assert_eq!(to.employees, None);
        assert_eq!(to.entries[0].leave_type.as_deref(), Some("S"));
    }
}
