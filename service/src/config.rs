use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Exact weekly total a week must reach before it can be submitted.
    pub required_weekly_hours: f32,
    /// Hours written into a leave cell covered by an approved leave.
    pub leave_autofill_hours: f32,
    /// Whether approved leave also fills Saturday and Sunday.
    pub leave_on_weekends: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            required_weekly_hours: 40.0,
            leave_autofill_hours: 8.0,
            leave_on_weekends: false,
        }
    }
}

#[automock]
#[async_trait]
pub trait ConfigService {
    async fn get_config(&self) -> Result<Config, ServiceError>;
}
