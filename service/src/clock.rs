use mockall::automock;

/// Source of "today" for everything that depends on the current date.
#[automock]
pub trait ClockService {
    fn date_now(&self) -> time::Date;
}
