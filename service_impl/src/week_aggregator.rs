use std::collections::HashMap;

use dao::TimeEntryEntity;
use service::time_entry::TimeEntry;
use service::week::{
    AggregationOptions, CategoryHours, DataQualityNote, EmployeeWeek, SkippedEntry, Week,
    WeekAggregation, WeekBreakdown, WeekStatus,
};
use timesheet_utils::{format_display_date, TimesheetWeek};
use tracing::{debug, warn};

pub trait IteratorExt {
    fn collect_to_hash_map_by<K, F>(self, f: F) -> HashMap<K, Vec<Self::Item>>
    where
        Self: Iterator + Sized,
        K: Eq + std::hash::Hash,
        F: Fn(&Self::Item) -> K,
    {
        self.fold(HashMap::new(), |mut map, item| {
            map.entry(f(&item)).or_insert_with(Vec::new).push(item);
            map
        })
    }
}
impl<T> IteratorExt for T where T: Iterator {}

/// Groups backend records into Saturday-anchored weeks.
///
/// Records without a readable date are reported in
/// [`WeekAggregation::skipped`] and never counted. Records counted under a
/// fallback label are reported in [`WeekAggregation::notes`].
pub fn aggregate_weeks(records: &[TimeEntryEntity], options: &AggregationOptions) -> WeekAggregation {
    let mut skipped = Vec::new();
    let mut notes = Vec::new();
    let mut entries = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match TimeEntry::from_record(record) {
            Ok((entry, issues)) => {
                for issue in issues {
                    warn!(
                        "Counting time entry {} ({:?}) of {} with a fallback: {}",
                        index, record.id, record.employee_id, issue
                    );
                    notes.push(DataQualityNote {
                        index,
                        entry_id: record.id,
                        employee_id: record.employee_id.clone(),
                        issue,
                    });
                }
                entries.push(entry);
            }
            Err(reason) => {
                warn!(
                    "Skipping time entry {} ({:?}) of {}: {}",
                    index, record.id, record.employee_id, reason
                );
                skipped.push(SkippedEntry {
                    index,
                    entry_id: record.id,
                    employee_id: record.employee_id.clone(),
                    reason,
                });
            }
        }
    }

    let mut by_week = entries.into_iter().collect_to_hash_map_by(TimeEntry::week);
    if let Some(reference_start) = options.reference_start {
        let last = TimesheetWeek::containing(options.today);
        for week in TimesheetWeek::containing(reference_start).iter_until(&last) {
            by_week.entry(week).or_default();
        }
    }

    let mut weeks: Vec<Week> = by_week
        .into_iter()
        .map(|(week, mut entries)| {
            entries.sort_by_key(|entry| entry.date);
            build_week(week, entries, options.partition_by_employee)
        })
        .collect();
    weeks.sort_by(|a, b| b.start.cmp(&a.start));

    debug!(
        "Aggregated {} records into {} weeks, {} skipped, {} notes",
        records.len(),
        weeks.len(),
        skipped.len(),
        notes.len()
    );

    WeekAggregation {
        weeks: weeks.into(),
        skipped: skipped.into(),
        notes: notes.into(),
    }
}

fn build_week(week: TimesheetWeek, entries: Vec<TimeEntry>, partition_by_employee: bool) -> Week {
    let status = WeekStatus::derive(entries.iter().map(|entry| &entry.status));
    let breakdown = if partition_by_employee {
        let mut employees: Vec<EmployeeWeek> = entries
            .iter()
            .cloned()
            .collect_to_hash_map_by(|entry| entry.employee_id.clone())
            .into_iter()
            .map(|(employee_id, entries)| EmployeeWeek {
                employee_name: entries[0].employee_name.clone(),
                employee_id,
                status: WeekStatus::derive(entries.iter().map(|entry| &entry.status)),
                hours: entries.iter().collect::<CategoryHours>(),
                entries: entries.into(),
            })
            .collect();
        employees.sort_by(|a, b| {
            a.employee_name
                .cmp(&b.employee_name)
                .then_with(|| a.employee_id.cmp(&b.employee_id))
        });
        WeekBreakdown::PerEmployee(employees.into())
    } else {
        WeekBreakdown::Flat(entries.iter().collect())
    };

    Week {
        start: week.start(),
        end: week.end(),
        start_display: format_display_date(week.start()).into(),
        end_display: format_display_date(week.end()).into(),
        status,
        breakdown,
        entries: entries.into(),
    }
}
