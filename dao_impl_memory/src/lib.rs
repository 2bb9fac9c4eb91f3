//! In-process stand-in for the timesheet backend.
//!
//! Keeps entries and leaves in memory and answers the same contracts as the
//! HTTP backend, including batch validation against the week start. Outages
//! and refused review calls can be switched on to exercise failure paths.

use thiserror::Error;
use uuid::Uuid;

pub mod leave;
pub mod time_entry;

pub use leave::LeaveDaoImpl;
pub use time_entry::TimeEntryDaoImpl;

#[derive(Debug, Error)]
pub enum MemoryBackendError {
    #[error("Backend unavailable")]
    Unavailable,

    #[error("Review of entry {0} refused")]
    ReviewRefused(Uuid),
}

impl From<MemoryBackendError> for dao::DaoError {
    fn from(err: MemoryBackendError) -> Self {
        dao::DaoError::BackendError(Box::new(err))
    }
}
