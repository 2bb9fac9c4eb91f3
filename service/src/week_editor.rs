//! Editable grid for a single week.
//!
//! A [`WeekEditor`] is hydrated from the entries of one employee and week.
//! Every row is a [`Track`] with seven [`DayCell`]s, Saturday to Friday. At
//! most one track may carry hours on any given day, and a week can only be
//! submitted when its total matches the configured weekly hours exactly.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use time::Date;
use timesheet_utils::{DayOfWeek, TimesheetWeek};
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::leave::ApprovedLeave;
use crate::time_entry::{EntryCategory, EntryStatus, LeaveType, TimeEntry, WorkDescription};
use crate::{ServiceError, ValidationFailureItem};

pub const DAYS_PER_WEEK: usize = 7;
const MAX_HOURS_PER_DAY: f32 = 24.0;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectKey {
    pub project_id: Arc<str>,
    pub task_id: Arc<str>,
}

impl From<&WorkDescription> for ProjectKey {
    fn from(description: &WorkDescription) -> Self {
        Self {
            project_id: description.project_id.clone().unwrap_or_else(|| "".into()),
            task_id: description.task_id.clone().unwrap_or_else(|| "".into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Track {
    Project(ProjectKey),
    TruTime,
    Holiday,
    Leave(LeaveType),
    TimeOff,
}

impl Track {
    pub const FIXED: [Track; 6] = [
        Track::TruTime,
        Track::Holiday,
        Track::Leave(LeaveType::Sick),
        Track::Leave(LeaveType::Casual),
        Track::Leave(LeaveType::Earned),
        Track::TimeOff,
    ];

    pub fn for_entry(entry: &TimeEntry) -> Self {
        match entry.category {
            EntryCategory::Project => Track::Project((&entry.description).into()),
            EntryCategory::TruTime => Track::TruTime,
            EntryCategory::Holiday => Track::Holiday,
            EntryCategory::Leave(leave_type) => Track::Leave(leave_type),
            EntryCategory::TimeOff => Track::TimeOff,
        }
    }

    pub fn category(&self) -> EntryCategory {
        match self {
            Track::Project(_) => EntryCategory::Project,
            Track::TruTime => EntryCategory::TruTime,
            Track::Holiday => EntryCategory::Holiday,
            Track::Leave(leave_type) => EntryCategory::Leave(*leave_type),
            Track::TimeOff => EntryCategory::TimeOff,
        }
    }
}

impl Display for Track {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Track::Project(key) => write!(f, "Project {} / {}", key.project_id, key.task_id),
            Track::TruTime => write!(f, "TruTime"),
            Track::Holiday => write!(f, "Holiday"),
            Track::Leave(leave_type) => write!(f, "Leave ({})", leave_type.code()),
            Track::TimeOff => write!(f, "Time off"),
        }
    }
}

/// Metadata copied onto every entry of a project row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRow {
    pub description: WorkDescription,
    pub billable: bool,
}

impl ProjectRow {
    pub fn key(&self) -> ProjectKey {
        (&self.description).into()
    }
}

impl From<&TimeEntry> for ProjectRow {
    fn from(entry: &TimeEntry) -> Self {
        Self {
            description: entry.description.clone(),
            billable: entry.billable,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    pub date: Date,
    /// Raw text as typed, empty for no hours.
    pub value: Arc<str>,
    /// Persisted entry this cell was hydrated from.
    pub entry_id: Option<Uuid>,
    pub locked_by_leave: bool,
    pub weekend_locked: bool,
}

impl DayCell {
    fn empty(date: Date) -> Self {
        Self {
            date,
            value: "".into(),
            entry_id: None,
            locked_by_leave: false,
            weekend_locked: DayOfWeek::from(date.weekday()).is_weekend(),
        }
    }

    pub fn hours(&self) -> f32 {
        parse_hours(&self.value).unwrap_or(0.0)
    }

    fn hundredths(&self) -> i64 {
        hundredths(self.hours())
    }

    pub fn has_hours(&self) -> bool {
        self.hundredths() > 0
    }

    pub fn is_locked(&self) -> bool {
        self.locked_by_leave || self.weekend_locked
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditableRow {
    pub track: Track,
    pub project: Option<ProjectRow>,
    pub cells: [DayCell; DAYS_PER_WEEK],
}

impl EditableRow {
    fn new(track: Track, project: Option<ProjectRow>, week: &TimesheetWeek) -> Self {
        let days = week.days();
        Self {
            track,
            project,
            cells: std::array::from_fn(|offset| DayCell::empty(days[offset])),
        }
    }

    pub fn cell(&self, day: DayOfWeek) -> &DayCell {
        &self.cells[day.week_offset() as usize]
    }

    pub fn total_hours(&self) -> f32 {
        self.cells.iter().map(DayCell::hundredths).sum::<i64>() as f32 / 100.0
    }

    fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| !cell.has_hours())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorMode {
    Edit,
    /// Nothing can change, e.g. an approved week.
    ReadOnly,
    /// Someone else's week: inputs are disabled, approve and reject are offered.
    Review,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorRules {
    pub required_weekly_hours: f32,
    pub leave_autofill_hours: f32,
    /// Auto-fill approved leave on Saturday and Sunday too. Off by default, so
    /// a leave covering a whole week fills five working days, not seven, and
    /// weekend cells stay locked.
    pub leave_on_weekends: bool,
}

impl From<&Config> for EditorRules {
    fn from(config: &Config) -> Self {
        Self {
            required_weekly_hours: config.required_weekly_hours,
            leave_autofill_hours: config.leave_autofill_hours,
            leave_on_weekends: config.leave_on_weekends,
        }
    }
}

impl Default for EditorRules {
    fn default() -> Self {
        (&Config::default()).into()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnplacedReason {
    OtherEmployee,
    OutsideWeek,
    /// The cell was already taken by another entry.
    DuplicateCell,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnplacedEntry {
    pub entry: TimeEntry,
    pub reason: UnplacedReason,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutofilledCell {
    pub leave_type: LeaveType,
    pub date: Date,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HydrationReport {
    pub unplaced: Vec<UnplacedEntry>,
    pub autofilled: Vec<AutofilledCell>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayConflict {
    pub date: Date,
    pub tracks: Vec<Track>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaveWeekPayload {
    pub week_start: Date,
    pub entries: Arc<[TimeEntry]>,
}

impl From<&SaveWeekPayload> for dao::time_entry::SaveWeekEntity {
    fn from(payload: &SaveWeekPayload) -> Self {
        Self {
            week_start: timesheet_utils::format_iso_date(payload.week_start).into(),
            entries: payload
                .entries
                .iter()
                .map(dao::TimeEntryEntity::from)
                .collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WeekEditorParams {
    pub employee_id: Arc<str>,
    pub employee_name: Arc<str>,
    pub week_start: Date,
    pub entries: Arc<[TimeEntry]>,
    pub approved_leaves: Arc<[ApprovedLeave]>,
    pub mode: EditorMode,
    pub rules: EditorRules,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeekEditor {
    employee_id: Arc<str>,
    employee_name: Arc<str>,
    week: TimesheetWeek,
    mode: EditorMode,
    rules: EditorRules,
    rows: Vec<EditableRow>,
    entries: Arc<[TimeEntry]>,
    report: HydrationReport,
}

impl WeekEditor {
    pub fn hydrate(params: WeekEditorParams) -> Result<Self, ServiceError> {
        let week = TimesheetWeek::starting(params.week_start)?;
        let mut report = HydrationReport::default();

        let mut placeable = Vec::new();
        for entry in params.entries.iter() {
            if entry.employee_id != params.employee_id {
                report.unplaced.push(UnplacedEntry {
                    entry: entry.clone(),
                    reason: UnplacedReason::OtherEmployee,
                });
            } else if !week.contains(entry.date) {
                report.unplaced.push(UnplacedEntry {
                    entry: entry.clone(),
                    reason: UnplacedReason::OutsideWeek,
                });
            } else {
                placeable.push(entry.clone());
            }
        }

        let mut rows: Vec<EditableRow> = Vec::new();
        for entry in placeable
            .iter()
            .filter(|entry| entry.category == EntryCategory::Project)
        {
            let track = Track::for_entry(entry);
            if !rows.iter().any(|row| row.track == track) {
                rows.push(EditableRow::new(track, Some(entry.into()), &week));
            }
        }
        for track in Track::FIXED {
            rows.push(EditableRow::new(track, None, &week));
        }

        let mut entries = Vec::with_capacity(placeable.len());
        for entry in placeable {
            let track = Track::for_entry(&entry);
            let offset = week.offset_of(entry.date);
            let cell = rows
                .iter_mut()
                .find(|row| row.track == track)
                .zip(offset)
                .map(|(row, offset)| &mut row.cells[offset as usize]);
            match cell {
                Some(cell) if cell.entry_id.is_none() && !cell.has_hours() => {
                    cell.value = format_hours(entry.total_hours);
                    cell.entry_id = entry.id;
                    cell.weekend_locked = false;
                    entries.push(entry);
                }
                _ => report.unplaced.push(UnplacedEntry {
                    entry,
                    reason: UnplacedReason::DuplicateCell,
                }),
            }
        }

        for leave in params
            .approved_leaves
            .iter()
            .filter(|leave| leave.is_approved() && leave.employee_id == params.employee_id)
        {
            let Some(row) = rows
                .iter_mut()
                .find(|row| row.track == Track::Leave(leave.leave_type))
            else {
                continue;
            };
            for cell in row.cells.iter_mut() {
                let weekend = DayOfWeek::from(cell.date.weekday()).is_weekend();
                if !leave.covers(cell.date) || (weekend && !params.rules.leave_on_weekends) {
                    continue;
                }
                cell.value = format_hours(params.rules.leave_autofill_hours);
                cell.locked_by_leave = true;
                cell.weekend_locked = false;
                report.autofilled.push(AutofilledCell {
                    leave_type: leave.leave_type,
                    date: cell.date,
                });
            }
        }

        debug!(
            "Hydrated week {} for {}: {} placed, {} unplaced, {} leave days",
            week,
            params.employee_id,
            entries.len(),
            report.unplaced.len(),
            report.autofilled.len()
        );

        Ok(Self {
            employee_id: params.employee_id,
            employee_name: params.employee_name,
            week,
            mode: params.mode,
            rules: params.rules,
            rows,
            entries: entries.into(),
            report,
        })
    }

    pub fn employee_id(&self) -> &Arc<str> {
        &self.employee_id
    }

    pub fn employee_name(&self) -> &Arc<str> {
        &self.employee_name
    }

    pub fn week(&self) -> TimesheetWeek {
        self.week
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn rules(&self) -> &EditorRules {
        &self.rules
    }

    pub fn rows(&self) -> &[EditableRow] {
        &self.rows
    }

    pub fn row(&self, track: &Track) -> Option<&EditableRow> {
        self.rows.iter().find(|row| &row.track == track)
    }

    /// Entries the grid was hydrated from.
    pub fn entries(&self) -> &Arc<[TimeEntry]> {
        &self.entries
    }

    pub fn report(&self) -> &HydrationReport {
        &self.report
    }

    pub fn is_cell_editable(&self, track: &Track, day: DayOfWeek) -> bool {
        self.mode == EditorMode::Edit
            && self
                .row(track)
                .map(|row| !row.cell(day).is_locked())
                .unwrap_or(false)
    }

    /// Writes `value` into a cell. A rejected write leaves the grid untouched.
    pub fn set_cell(&mut self, track: &Track, day: DayOfWeek, value: &str) -> Result<(), ServiceError> {
        if self.mode != EditorMode::Edit {
            return Err(ServiceError::ReadOnly);
        }
        let offset = day.week_offset() as usize;
        let row_index = self.row_index(track)?;
        let cell = &self.rows[row_index].cells[offset];
        if cell.is_locked() {
            return Err(ServiceError::CellLocked {
                track: track.clone(),
                day: cell.date,
            });
        }

        let value = value.trim();
        let hours = parse_hours(value).ok_or_else(|| {
            ServiceError::validation(ValidationFailureItem::InvalidValue(
                format!("{:?} is not a valid number of hours", value).into(),
            ))
        })?;
        if hours > MAX_HOURS_PER_DAY {
            return Err(ServiceError::validation(
                ValidationFailureItem::InvalidValue(
                    format!("{} exceeds {} hours per day", value, MAX_HOURS_PER_DAY).into(),
                ),
            ));
        }
        if hundredths(hours) > 0 {
            if let Some(existing) = self
                .rows
                .iter()
                .enumerate()
                .find(|(index, row)| *index != row_index && row.cells[offset].has_hours())
                .map(|(_, row)| row.track.clone())
            {
                return Err(ServiceError::TrackConflict {
                    day: cell.date,
                    existing,
                });
            }
        }

        self.rows[row_index].cells[offset].value = value.into();
        Ok(())
    }

    pub fn clear_cell(&mut self, track: &Track, day: DayOfWeek) -> Result<(), ServiceError> {
        self.set_cell(track, day, "")
    }

    pub fn add_project_row(&mut self, project: ProjectRow) -> Result<(), ServiceError> {
        if self.mode != EditorMode::Edit {
            return Err(ServiceError::ReadOnly);
        }
        let key = project.key();
        if key.project_id.trim().is_empty() {
            return Err(ServiceError::validation(ValidationFailureItem::MissingValue(
                "project_id".into(),
            )));
        }
        if key.task_id.trim().is_empty() {
            return Err(ServiceError::validation(ValidationFailureItem::MissingValue(
                "task_id".into(),
            )));
        }
        let track = Track::Project(key);
        if self.rows.iter().any(|row| row.track == track) {
            return Err(ServiceError::validation(ValidationFailureItem::Duplicate(
                track.to_string().into(),
            )));
        }

        let position = self
            .rows
            .iter()
            .position(|row| !matches!(row.track, Track::Project(_)))
            .unwrap_or(self.rows.len());
        self.rows
            .insert(position, EditableRow::new(track, Some(project), &self.week));
        Ok(())
    }

    pub fn remove_project_row(&mut self, key: &ProjectKey) -> Result<(), ServiceError> {
        if self.mode != EditorMode::Edit {
            return Err(ServiceError::ReadOnly);
        }
        let track = Track::Project(key.clone());
        let row_index = self.row_index(&track)?;
        if !self.rows[row_index].is_empty() {
            return Err(ServiceError::validation(
                ValidationFailureItem::ModificationNotAllowed(track.to_string().into()),
            ));
        }
        self.rows.remove(row_index);
        Ok(())
    }

    pub fn total_hours(&self) -> f32 {
        self.total_hundredths() as f32 / 100.0
    }

    pub fn day_total(&self, day: DayOfWeek) -> f32 {
        self.rows
            .iter()
            .map(|row| row.cell(day).hundredths())
            .sum::<i64>() as f32
            / 100.0
    }

    pub fn track_total(&self, track: &Track) -> f32 {
        self.row(track).map(EditableRow::total_hours).unwrap_or(0.0)
    }

    /// Days on which more than one track carries hours.
    pub fn conflicts(&self) -> Vec<DayConflict> {
        self.week
            .days()
            .iter()
            .enumerate()
            .filter_map(|(offset, date)| {
                let tracks: Vec<Track> = self
                    .rows
                    .iter()
                    .filter(|row| row.cells[offset].has_hours())
                    .map(|row| row.track.clone())
                    .collect();
                if tracks.len() > 1 {
                    Some(DayConflict {
                        date: *date,
                        tracks,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.mode != EditorMode::Edit {
            return Err(ServiceError::ReadOnly);
        }
        if let Some(conflict) = self.conflicts().into_iter().next() {
            return Err(ServiceError::TrackConflict {
                day: conflict.date,
                existing: conflict.tracks[0].clone(),
            });
        }
        let total = self.total_hundredths();
        if total != hundredths(self.rules.required_weekly_hours) {
            return Err(ServiceError::WeeklyTotalMismatch {
                expected: self.rules.required_weekly_hours,
                actual: total as f32 / 100.0,
            });
        }
        Ok(())
    }

    /// One entry per filled cell, keeping persisted ids so the backend updates
    /// instead of inserting.
    pub fn build_save_payload(&self) -> Result<SaveWeekPayload, ServiceError> {
        self.validate()?;
        let entries: Arc<[TimeEntry]> = self
            .rows
            .iter()
            .flat_map(|row| {
                row.cells
                    .iter()
                    .filter(|cell| cell.has_hours())
                    .map(move |cell| self.entry_for(row, cell))
            })
            .collect();
        Ok(SaveWeekPayload {
            week_start: self.week.start(),
            entries,
        })
    }

    /// Hydrated entries still waiting for a decision.
    pub fn pending_entry_ids(&self) -> Arc<[Uuid]> {
        self.entries
            .iter()
            .filter(|entry| entry.status == EntryStatus::Pending)
            .filter_map(|entry| entry.id)
            .collect()
    }

    fn entry_for(&self, row: &EditableRow, cell: &DayCell) -> TimeEntry {
        TimeEntry {
            id: cell.entry_id,
            employee_id: self.employee_id.clone(),
            employee_name: self.employee_name.clone(),
            date: cell.date,
            category: row.track.category(),
            total_hours: cell.hundredths() as f32 / 100.0,
            billable: row.project.as_ref().map(|p| p.billable).unwrap_or(false),
            description: row
                .project
                .as_ref()
                .map(|p| p.description.clone())
                .unwrap_or_default(),
            status: EntryStatus::Pending,
        }
    }

    fn row_index(&self, track: &Track) -> Result<usize, ServiceError> {
        self.rows
            .iter()
            .position(|row| &row.track == track)
            .ok_or_else(|| {
                ServiceError::validation(ValidationFailureItem::InvalidValue(
                    format!("No row for {}", track).into(),
                ))
            })
    }

    fn total_hundredths(&self) -> i64 {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .map(DayCell::hundredths)
            .sum()
    }
}

pub fn format_hours(hours: f32) -> Arc<str> {
    format!("{:.2}", hours).into()
}

fn parse_hours(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f32>()
        .ok()
        .filter(|hours| hours.is_finite() && *hours >= 0.0)
}

fn hundredths(hours: f32) -> i64 {
    (hours as f64 * 100.0).round() as i64
}
