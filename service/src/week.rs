use std::fmt::{Display, Formatter};
use std::sync::Arc;

use time::Date;
use uuid::Uuid;

use crate::time_entry::{EntryCategory, EntryRejection, EntryStatus, TimeEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeekStatus {
    Approved,
    Pending,
    Rejected,
    NotFilled,
}

impl WeekStatus {
    /// Pending beats rejected, rejected beats approved.
    pub fn derive<'a>(statuses: impl IntoIterator<Item = &'a EntryStatus>) -> Self {
        let mut result = None;
        for status in statuses {
            match status {
                EntryStatus::Pending => return WeekStatus::Pending,
                EntryStatus::Rejected => result = Some(WeekStatus::Rejected),
                EntryStatus::Approved => {
                    result.get_or_insert(WeekStatus::Approved);
                }
            }
        }
        result.unwrap_or(WeekStatus::NotFilled)
    }
}

impl Display for WeekStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WeekStatus::Approved => "Approved",
                WeekStatus::Pending => "Pending",
                WeekStatus::Rejected => "Rejected",
                WeekStatus::NotFilled => "Not Filled",
            }
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CategoryHours {
    pub billable_hrs: f32,
    pub non_billable_hrs: f32,
    pub time_off_hrs: f32,
    /// Attendance hours, informational only.
    pub trutime_hrs: f32,
}

impl CategoryHours {
    pub fn add(&mut self, entry: &TimeEntry) {
        match entry.category {
            EntryCategory::TruTime => self.trutime_hrs += entry.total_hours,
            EntryCategory::Holiday | EntryCategory::TimeOff | EntryCategory::Leave(_) => {
                self.time_off_hrs += entry.total_hours
            }
            EntryCategory::Project => {
                if entry.billable {
                    self.billable_hrs += entry.total_hours
                } else {
                    self.non_billable_hrs += entry.total_hours
                }
            }
        }
    }

    pub fn total(&self) -> f32 {
        self.billable_hrs + self.non_billable_hrs + self.time_off_hrs + self.trutime_hrs
    }
}

impl<'a> FromIterator<&'a TimeEntry> for CategoryHours {
    fn from_iter<T: IntoIterator<Item = &'a TimeEntry>>(iter: T) -> Self {
        let mut hours = CategoryHours::default();
        for entry in iter {
            hours.add(entry);
        }
        hours
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmployeeWeek {
    pub employee_id: Arc<str>,
    pub employee_name: Arc<str>,
    pub status: WeekStatus,
    pub hours: CategoryHours,
    pub entries: Arc<[TimeEntry]>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WeekBreakdown {
    Flat(CategoryHours),
    PerEmployee(Arc<[EmployeeWeek]>),
}

impl WeekBreakdown {
    pub fn hours(&self) -> CategoryHours {
        match self {
            WeekBreakdown::Flat(hours) => *hours,
            WeekBreakdown::PerEmployee(employees) => {
                employees
                    .iter()
                    .fold(CategoryHours::default(), |acc, employee| CategoryHours {
                        billable_hrs: acc.billable_hrs + employee.hours.billable_hrs,
                        non_billable_hrs: acc.non_billable_hrs + employee.hours.non_billable_hrs,
                        time_off_hrs: acc.time_off_hrs + employee.hours.time_off_hrs,
                        trutime_hrs: acc.trutime_hrs + employee.hours.trutime_hrs,
                    })
            }
        }
    }
}

/// Aggregated view over one Saturday-to-Friday span.
#[derive(Clone, Debug, PartialEq)]
pub struct Week {
    pub start: Date,
    pub end: Date,
    pub start_display: Arc<str>,
    pub end_display: Arc<str>,
    pub status: WeekStatus,
    pub breakdown: WeekBreakdown,
    pub entries: Arc<[TimeEntry]>,
}

impl Week {
    pub fn total_hours(&self) -> f32 {
        self.breakdown.hours().total()
    }

    pub fn employee(&self, employee_id: &str) -> Option<&EmployeeWeek> {
        match &self.breakdown {
            WeekBreakdown::Flat(_) => None,
            WeekBreakdown::PerEmployee(employees) => employees
                .iter()
                .find(|employee| employee.employee_id.as_ref() == employee_id),
        }
    }

    pub fn pending_entry_ids(&self) -> Arc<[Uuid]> {
        self.entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Pending)
            .filter_map(|entry| entry.id)
            .collect()
    }
}

/// A backend record left out of an aggregation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedEntry {
    /// Position in the input slice.
    pub index: usize,
    pub entry_id: Option<Uuid>,
    pub employee_id: Arc<str>,
    pub reason: EntryRejection,
}

/// A record that was counted, but only after falling back on one of its labels.
#[derive(Clone, Debug, PartialEq)]
pub struct DataQualityNote {
    /// Position in the input slice.
    pub index: usize,
    pub entry_id: Option<Uuid>,
    pub employee_id: Arc<str>,
    pub issue: EntryRejection,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeekAggregation {
    /// Most recent week first.
    pub weeks: Arc<[Week]>,
    pub skipped: Arc<[SkippedEntry]>,
    pub notes: Arc<[DataQualityNote]>,
}

impl WeekAggregation {
    pub fn week_starting(&self, start: Date) -> Option<&Week> {
        self.weeks.iter().find(|week| week.start == start)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregationOptions {
    /// Seeds empty weeks back to this date, e.g. the join date.
    pub reference_start: Option<Date>,
    pub today: Date,
    pub partition_by_employee: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_precedence() {
        use EntryStatus::*;
        assert_eq!(WeekStatus::derive(&[Approved, Approved]), WeekStatus::Approved);
        assert_eq!(WeekStatus::derive(&[Approved, Rejected]), WeekStatus::Rejected);
        assert_eq!(
            WeekStatus::derive(&[Rejected, Approved, Pending]),
            WeekStatus::Pending
        );
        assert_eq!(WeekStatus::derive(&[Pending, Rejected]), WeekStatus::Pending);
        assert_eq!(WeekStatus::derive(&[] as &[EntryStatus]), WeekStatus::NotFilled);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(WeekStatus::NotFilled.to_string(), "Not Filled");
        assert_eq!(WeekStatus::Pending.to_string(), "Pending");
    }
}
