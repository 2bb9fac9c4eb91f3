use std::sync::Arc;

use dao::LeaveEntity;
use time::Date;
use timesheet_utils::parse_calendar_date;
use uuid::Uuid;

use crate::time_entry::{EntryRejection, LeaveType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    fn parse(raw: &str) -> Result<Self, EntryRejection> {
        match raw.trim().to_uppercase().as_str() {
            "PENDING" => Ok(LeaveStatus::Pending),
            "APPROVED" => Ok(LeaveStatus::Approved),
            "REJECTED" => Ok(LeaveStatus::Rejected),
            "CANCELLED" | "CANCELED" => Ok(LeaveStatus::Cancelled),
            _ => Err(EntryRejection::UnknownStatus(raw.into())),
        }
    }
}

/// A leave request as far as the timesheet grid cares about it.
#[derive(Clone, Debug, PartialEq)]
pub struct ApprovedLeave {
    pub id: Option<Uuid>,
    pub employee_id: Arc<str>,
    pub leave_type: LeaveType,
    pub start_date: Date,
    pub end_date: Date,
    pub status: LeaveStatus,
}

impl ApprovedLeave {
    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }

    /// Inclusive on both ends.
    pub fn covers(&self, date: Date) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

impl TryFrom<&LeaveEntity> for ApprovedLeave {
    type Error = EntryRejection;

    fn try_from(entity: &LeaveEntity) -> Result<Self, Self::Error> {
        let start_date = parse_calendar_date(&entity.start_date)
            .map_err(|_| EntryRejection::UnparseableDate(entity.start_date.clone()))?;
        let end_date = parse_calendar_date(&entity.end_date)
            .map_err(|_| EntryRejection::UnparseableDate(entity.end_date.clone()))?;
        Ok(Self {
            id: entity.id,
            employee_id: entity.employee_id.clone(),
            leave_type: LeaveType::parse(&entity.leave_type)?,
            start_date,
            end_date,
            status: LeaveStatus::parse(&entity.status)?,
        })
    }
}
