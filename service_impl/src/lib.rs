pub mod clock;
pub mod config;
pub mod macros;
pub mod timesheet;
pub mod week_aggregator;


pub use clock::ClockServiceImpl;
pub use config::ConfigServiceImpl;
pub use timesheet::{TimesheetServiceDeps, TimesheetServiceImpl};
pub use week_aggregator::aggregate_weeks;
