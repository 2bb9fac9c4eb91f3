//! Typed time entries.
//!
//! The backend delivers categories, leave types and statuses as loose
//! strings. They are mapped onto closed enums here; a record that does not
//! fit is rejected with an [`EntryRejection`] instead of being guessed.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use dao::TimeEntryEntity;
use thiserror::Error;
use time::Date;
use timesheet_utils::{format_iso_date, parse_calendar_date, TimesheetWeek};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LeaveType {
    Sick,
    Casual,
    Earned,
}

impl LeaveType {
    pub const ALL: [LeaveType; 3] = [LeaveType::Sick, LeaveType::Casual, LeaveType::Earned];

    pub fn code(&self) -> &'static str {
        match self {
            LeaveType::Sick => "S",
            LeaveType::Casual => "C",
            LeaveType::Earned => "E",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, EntryRejection> {
        match normalize_label(raw).as_str() {
            "S" | "SICK" | "SICK LEAVE" => Ok(LeaveType::Sick),
            "C" | "CASUAL" | "CASUAL LEAVE" => Ok(LeaveType::Casual),
            "E" | "EARNED" | "EARNED LEAVE" => Ok(LeaveType::Earned),
            _ => Err(EntryRejection::UnknownLeaveType(raw.into())),
        }
    }
}

impl Display for LeaveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                LeaveType::Sick => "Sick leave",
                LeaveType::Casual => "Casual leave",
                LeaveType::Earned => "Earned leave",
            }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryCategory {
    Project,
    TruTime,
    Holiday,
    Leave(LeaveType),
    TimeOff,
}

impl EntryCategory {
    pub fn parse(raw: &str, leave_type: Option<&str>) -> Result<Self, EntryRejection> {
        match normalize_label(raw).as_str() {
            "PROJECT" => Ok(EntryCategory::Project),
            "TRUTIME" | "TRU TIME" | "SWIPE" => Ok(EntryCategory::TruTime),
            "HOLIDAY" => Ok(EntryCategory::Holiday),
            "TIMEOFF" | "TIME OFF" => Ok(EntryCategory::TimeOff),
            "LEAVE" => match leave_type.map(str::trim).filter(|l| !l.is_empty()) {
                Some(leave_type) => Ok(EntryCategory::Leave(LeaveType::parse(leave_type)?)),
                None => Err(EntryRejection::MissingLeaveType),
            },
            "SICK LEAVE" => Ok(EntryCategory::Leave(LeaveType::Sick)),
            "CASUAL LEAVE" => Ok(EntryCategory::Leave(LeaveType::Casual)),
            "EARNED LEAVE" => Ok(EntryCategory::Leave(LeaveType::Earned)),
            _ => Err(EntryRejection::UnknownCategory(raw.into())),
        }
    }

    /// Canonical backend label.
    pub fn label(&self) -> &'static str {
        match self {
            EntryCategory::Project => "PROJECT",
            EntryCategory::TruTime => "TRUTIME",
            EntryCategory::Holiday => "HOLIDAY",
            EntryCategory::Leave(_) => "LEAVE",
            EntryCategory::TimeOff => "TIMEOFF",
        }
    }

    pub fn leave_type(&self) -> Option<LeaveType> {
        match self {
            EntryCategory::Leave(leave_type) => Some(*leave_type),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn parse(raw: &str) -> Result<Self, EntryRejection> {
        match normalize_label(raw).as_str() {
            "PENDING" => Ok(EntryStatus::Pending),
            "APPROVED" => Ok(EntryStatus::Approved),
            "REJECTED" => Ok(EntryStatus::Rejected),
            _ => Err(EntryRejection::UnknownStatus(raw.into())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "PENDING",
            EntryStatus::Approved => "APPROVED",
            EntryStatus::Rejected => "REJECTED",
        }
    }
}

/// Why a backend record could not be turned into a [`TimeEntry`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EntryRejection {
    #[error("unparseable date {0:?}")]
    UnparseableDate(Arc<str>),
    #[error("unknown category {0:?}")]
    UnknownCategory(Arc<str>),
    #[error("leave entry without leave type")]
    MissingLeaveType,
    #[error("unknown leave type {0:?}")]
    UnknownLeaveType(Arc<str>),
    #[error("unknown status {0:?}")]
    UnknownStatus(Arc<str>),
    #[error("invalid hours {0}")]
    InvalidHours(f32),
}

/// Descriptive fields that travel with project work.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct WorkDescription {
    pub project_id: Option<Arc<str>>,
    pub project_name: Option<Arc<str>>,
    pub task_id: Option<Arc<str>>,
    pub task_description: Option<Arc<str>>,
    pub onsite_offshore: Option<Arc<str>>,
    pub billing_location: Option<Arc<str>>,
    pub notes: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimeEntry {
    pub id: Option<Uuid>,
    pub employee_id: Arc<str>,
    pub employee_name: Arc<str>,
    pub date: Date,
    pub category: EntryCategory,
    pub total_hours: f32,
    pub billable: bool,
    pub description: WorkDescription,
    pub status: EntryStatus,
}

impl TimeEntry {
    pub fn week(&self) -> TimesheetWeek {
        TimesheetWeek::containing(self.date)
    }

    /// Types a backend record.
    ///
    /// Only an unreadable date or non-finite hours reject the record. Labels
    /// outside the closed tables fall back so the hours stay counted, and each
    /// fallback is returned as a note: an unknown category counts as project
    /// work, a leave without a known leave type as time off, and an unknown
    /// status as approved.
    pub fn from_record(
        entity: &TimeEntryEntity,
    ) -> Result<(Self, Vec<EntryRejection>), EntryRejection> {
        let date = parse_calendar_date(&entity.date)
            .map_err(|_| EntryRejection::UnparseableDate(entity.date.clone()))?;
        if !entity.total_hours.is_finite() {
            return Err(EntryRejection::InvalidHours(entity.total_hours));
        }

        let mut notes = Vec::new();
        let category = match EntryCategory::parse(&entity.category, entity.leave_type.as_deref()) {
            Ok(category) => category,
            Err(
                reason @ (EntryRejection::MissingLeaveType | EntryRejection::UnknownLeaveType(_)),
            ) => {
                notes.push(reason);
                EntryCategory::TimeOff
            }
            Err(reason) => {
                notes.push(reason);
                EntryCategory::Project
            }
        };
        let status = EntryStatus::parse(&entity.status).unwrap_or_else(|reason| {
            notes.push(reason);
            EntryStatus::Approved
        });
        if entity.total_hours < 0.0 {
            notes.push(EntryRejection::InvalidHours(entity.total_hours));
        }

        let entry = Self {
            id: entity.id,
            employee_id: entity.employee_id.clone(),
            employee_name: entity.employee_name.clone(),
            date,
            category,
            total_hours: entity.total_hours,
            billable: category == EntryCategory::Project && entity.billable,
            description: WorkDescription {
                project_id: entity.project_id.clone(),
                project_name: entity.project_name.clone(),
                task_id: entity.task_id.clone(),
                task_description: entity.task_description.clone(),
                onsite_offshore: entity.onsite_offshore.clone(),
                billing_location: entity.billing_location.clone(),
                notes: entity.notes.clone(),
            },
            status,
        };
        Ok((entry, notes))
    }
}

impl TryFrom<&TimeEntryEntity> for TimeEntry {
    type Error = EntryRejection;

    fn try_from(entity: &TimeEntryEntity) -> Result<Self, Self::Error> {
        Self::from_record(entity).map(|(entry, _)| entry)
    }
}
impl TryFrom<TimeEntryEntity> for TimeEntry {
    type Error = EntryRejection;

    fn try_from(entity: TimeEntryEntity) -> Result<Self, Self::Error> {
        Self::try_from(&entity)
    }
}

impl From<&TimeEntry> for TimeEntryEntity {
    fn from(entry: &TimeEntry) -> Self {
        Self {
            id: entry.id,
            employee_id: entry.employee_id.clone(),
            employee_name: entry.employee_name.clone(),
            date: format_iso_date(entry.date).into(),
            category: entry.category.label().into(),
            leave_type: entry.category.leave_type().map(|l| l.code().into()),
            total_hours: entry.total_hours,
            billable: entry.billable,
            project_id: entry.description.project_id.clone(),
            project_name: entry.description.project_name.clone(),
            task_id: entry.description.task_id.clone(),
            task_description: entry.description.task_description.clone(),
            onsite_offshore: entry.description.onsite_offshore.clone(),
            billing_location: entry.description.billing_location.clone(),
            notes: entry.description.notes.clone(),
            status: entry.status.label().into(),
        }
    }
}
timesheet_utils::derive_from_reference!(TimeEntry, TimeEntryEntity);

fn normalize_label(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    pub fn entity(date: &str, category: &str, leave_type: Option<&str>) -> TimeEntryEntity {
        TimeEntryEntity {
            id: None,
            employee_id: "EMP-1".into(),
            employee_name: "Asha Rao".into(),
            date: date.into(),
            category: category.into(),
            leave_type: leave_type.map(Arc::from),
            total_hours: 8.0,
            billable: true,
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
    fn test_category_labels() {
        assert_eq!(
            EntryCategory::parse("PROJECT", None).unwrap(),
            EntryCategory::Project
        );
        assert_eq!(
            EntryCategory::parse(" truTime ", None).unwrap(),
            EntryCategory::TruTime
        );
        assert_eq!(
            EntryCategory::parse("time_off", None).unwrap(),
            EntryCategory::TimeOff
        );
        assert_eq!(
            EntryCategory::parse("LEAVE", Some("c")).unwrap(),
            EntryCategory::Leave(LeaveType::Casual)
        );
        assert_eq!(
            EntryCategory::parse("Sick-Leave", None).unwrap(),
            EntryCategory::Leave(LeaveType::Sick)
        );
    }

    #[test]
    fn test_unknown_labels_are_rejected() {
        assert_eq!(
            EntryCategory::parse("OVERTIME", None),
            Err(EntryRejection::UnknownCategory("OVERTIME".into()))
        );
        assert_eq!(
            EntryCategory::parse("LEAVE", None),
            Err(EntryRejection::MissingLeaveType)
        );
        assert_eq!(
            EntryCategory::parse("LEAVE", Some("X")),
            Err(EntryRejection::UnknownLeaveType("X".into()))
        );
        // A label merely containing "leave" is not a leave.
        assert!(EntryCategory::parse("LEAVE REQUEST NOTE", None).is_err());
    }

    #[test]
    fn test_entity_conversion() {
        let entry = TimeEntry::try_from(&entity("2024-06-03T00:00:00Z", "PROJECT", None)).unwrap();
        assert_eq!(entry.date, date!(2024 - 06 - 03));
        assert_eq!(entry.category, EntryCategory::Project);
        assert_eq!(entry.status, EntryStatus::Pending);
        assert!(entry.billable);
        assert_eq!(entry.week().start(), date!(2024 - 06 - 01));
    }

    #[test]
    fn test_billable_only_for_project() {
        let entry = TimeEntry::try_from(&entity("2024-06-03", "HOLIDAY", None)).unwrap();
        assert!(!entry.billable);
    }

    #[test]
    fn test_entity_conversion_rejections() {
        assert_eq!(
            TimeEntry::try_from(&entity("06/03/2024", "PROJECT", None)),
            Err(EntryRejection::UnparseableDate("06/03/2024".into()))
        );
        let mut not_a_number = entity("2024-06-03", "PROJECT", None);
        not_a_number.total_hours = f32::NAN;
        assert!(matches!(
            TimeEntry::try_from(&not_a_number),
            Err(EntryRejection::InvalidHours(_))
        ));
    }

    #[test]
    fn test_unknown_labels_fall_back_with_notes() {
        let (leave, notes) = TimeEntry::from_record(&entity("2024-06-03", "LEAVE", None)).unwrap();
        assert_eq!(leave.category, EntryCategory::TimeOff);
        assert_eq!(notes, vec![EntryRejection::MissingLeaveType]);

        let (overtime, notes) =
            TimeEntry::from_record(&entity("2024-06-04", "OVERTIME", None)).unwrap();
        assert_eq!(overtime.category, EntryCategory::Project);
        assert!(overtime.billable);
        assert_eq!(notes, vec![EntryRejection::UnknownCategory("OVERTIME".into())]);

        let mut submitted = entity("2024-06-05", "HOLIDAY", None);
        submitted.status = "SUBMITTED".into();
        let (submitted, notes) = TimeEntry::from_record(&submitted).unwrap();
        assert_eq!(submitted.status, EntryStatus::Approved);
        assert_eq!(notes, vec![EntryRejection::UnknownStatus("SUBMITTED".into())]);

        let mut negative = entity("2024-06-06", "PROJECT", None);
        negative.total_hours = -1.0;
        let (negative, notes) = TimeEntry::from_record(&negative).unwrap();
        assert_eq!(negative.total_hours, -1.0);
        assert_eq!(notes, vec![EntryRejection::InvalidHours(-1.0)]);

        let (clean, notes) = TimeEntry::from_record(&entity("2024-06-07", "PROJECT", None)).unwrap();
        assert_eq!(clean.category, EntryCategory::Project);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_entity_from_entry_uses_canonical_labels() {
        let entry = TimeEntry::try_from(&entity("2024-06-04", "sick leave", None)).unwrap();
        let back = TimeEntryEntity::from(&entry);
        assert_eq!(back.date.as_ref(), "2024-06-04");
        assert_eq!(back.category.as_ref(), "LEAVE");
        assert_eq!(back.leave_type.as_deref(), Some("S"));
        assert_eq!(back.status.as_ref(), "PENDING");
        assert!(!back.billable);
    }
}
