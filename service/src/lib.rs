use std::sync::Arc;

use thiserror::Error;
use time::Date;
use timesheet_utils::TimesheetDateUtilsError;

pub mod clock;
pub mod config;
pub mod leave;
pub mod permission;
pub mod time_entry;
pub mod timesheet;
pub mod week;
pub mod week_editor;

use week_editor::Track;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ValidationFailureItem {
    InvalidValue(Arc<str>),
    MissingValue(Arc<str>),
    Duplicate(Arc<str>),
    ModificationNotAllowed(Arc<str>),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Backend error: {0}")]
    BackendError(#[from] dao::DaoError),

    #[error("Forbidden")]
    Forbidden,

    #[error("Validation error: {0:?}")]
    ValidationError(Arc<[ValidationFailureItem]>),

    #[error("{existing} already holds hours on {day}")]
    TrackConflict { day: Date, existing: Track },

    #[error("Weekly total must be exactly {expected:.2} hours, current total is {actual:.2} hours")]
    WeeklyTotalMismatch { expected: f32, actual: f32 },

    #[error("{track} on {day} cannot be edited")]
    CellLocked { track: Track, day: Date },

    #[error("Week is read only")]
    ReadOnly,

    #[error("Request {0} was superseded by a newer request")]
    StaleRequest(u64),

    #[error("Date error: {0}")]
    DateError(#[from] TimesheetDateUtilsError),
}

impl ServiceError {
    pub fn validation(item: ValidationFailureItem) -> Self {
        Self::ValidationError(Arc::from([item]))
    }
}
