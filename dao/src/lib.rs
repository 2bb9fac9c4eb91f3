use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub mod leave;
pub mod time_entry;

pub use leave::{LeaveDao, LeaveEntity, MockLeaveDao};
pub use time_entry::{MockTimeEntryDao, TimeEntryDao, TimeEntryEntity};

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Backend request failed: {0}")]
    BackendError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Entity {0} not found")]
    EntityNotFound(Uuid),

    #[error("Backend rejected the batch: {0}")]
    InvalidBatch(Arc<str>),
}
